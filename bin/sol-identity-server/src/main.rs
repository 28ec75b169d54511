//! Solara Identity Gateway Server
//!
//! REST facade over the Auth0 Management API:
//! - User APIs: create (with credential-setup ticket), list, get, role
//!   updates, delete
//! - Role APIs: create, list, get, update (details + permissions), delete
//! - Health endpoints and Swagger UI
//!
//! ## Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `SOL_AUTH0_DOMAIN` | - | Auth0 tenant base URL (required) |
//! | `SOL_AUTH0_CLIENT_ID` | - | M2M application client id (required) |
//! | `SOL_AUTH0_CLIENT_SECRET` | - | M2M application client secret (required) |
//! | `SOL_AUTH0_API_IDENTIFIER` | - | API gateway resource server identifier (required) |
//! | `SOL_AUTH0_CONNECTION` | `Username-Password-Authentication` | Default connection for new users |
//! | `SOL_API_PORT` | `8080` | HTTP API port |
//! | `RUST_LOG` | `info` | Log level |

use anyhow::{Context, Result};
use axum::Router;
use secrecy::SecretString;
use std::sync::Arc;
use tokio::{net::TcpListener, signal};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;
use utoipa_axum::router::OpenApiRouter;
use utoipa_swagger_ui::SwaggerUi;

use sol_identity::role::api::{roles_router, RolesState};
use sol_identity::shared::health_api::health_router;
use sol_identity::user::api::{users_router, UsersState};
use sol_identity::{Auth0Config, Auth0Management, RoleService, TokenCache, UserService};

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_or_parse<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn env_required(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("missing required environment variable {key}"))
}

#[tokio::main]
async fn main() -> Result<()> {
    sol_common::logging::init_logging("sol-identity-server");

    info!("Starting Solara Identity Gateway");

    // Configuration from environment
    let api_port: u16 = env_or_parse("SOL_API_PORT", 8080);
    let config = Auth0Config {
        domain: env_required("SOL_AUTH0_DOMAIN")?,
        client_id: env_required("SOL_AUTH0_CLIENT_ID")?,
        client_secret: SecretString::new(env_required("SOL_AUTH0_CLIENT_SECRET")?),
        api_gateway_identifier: env_required("SOL_AUTH0_API_IDENTIFIER")?,
        default_connection: env_or("SOL_AUTH0_CONNECTION", "Username-Password-Authentication"),
    };

    // Management API client with its token cache
    let token_cache = Arc::new(TokenCache::new(config.clone()));
    let management = Arc::new(Auth0Management::new(config.clone(), token_cache)?);
    info!(domain = %config.domain, "Auth0 management client initialized");

    // Orchestrators
    let user_service = Arc::new(UserService::new(
        management.clone(),
        config.default_connection.clone(),
    ));
    let role_service = Arc::new(RoleService::new(
        management,
        config.api_gateway_identifier.clone(),
    ));

    let users_state = UsersState {
        service: user_service,
    };
    let roles_state = RolesState {
        service: role_service,
    };

    let (router, mut openapi) = OpenApiRouter::new()
        .nest("/api/users", users_router(users_state))
        .nest("/api/roles", roles_router(roles_state))
        .split_for_parts();

    openapi.info.title = "Solara Identity Gateway API".to_string();
    openapi.info.version = env!("CARGO_PKG_VERSION").to_string();
    openapi.info.description =
        Some("User and role management backed by the Auth0 Management API".to_string());

    let app = Router::new()
        .merge(router)
        .merge(health_router())
        .merge(SwaggerUi::new("/swagger-ui").url("/q/openapi", openapi))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        );

    let api_addr = format!("0.0.0.0:{}", api_port);
    info!("API server listening on http://{}", api_addr);

    let listener = TcpListener::bind(&api_addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Solara Identity Gateway shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c().await.expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
