//! Structured logging configuration.
//!
//! JSON output for production (`LOG_FORMAT=json`), human-readable text
//! otherwise. Log levels come from `RUST_LOG` (default: info), e.g.
//! `RUST_LOG=sol_identity=debug,tower_http=info`.
//!
//! ```rust,ignore
//! sol_common::logging::init_logging("sol-identity-server");
//! tracing::info!(user_id = %id, "user created");
//! ```

use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
};

/// Initialize the global tracing subscriber for a service.
///
/// Must be called once, before any tracing macro. The service name is
/// currently informational only; filtering is driven by `RUST_LOG`.
pub fn init_logging(_service_name: &str) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let json = std::env::var("LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    if json {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(
                fmt::layer()
                    .json()
                    .with_current_span(true)
                    .with_span_list(true)
                    .with_target(true)
                    .flatten_event(true)
                    .with_span_events(FmtSpan::CLOSE),
            )
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().with_target(true).with_ansi(true))
            .init();
    }
}
