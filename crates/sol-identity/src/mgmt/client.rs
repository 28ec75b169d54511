//! Auth0 Management API HTTP client.
//!
//! Thin, retry-free wrapper: every call fetches a currently valid token
//! from the [`TokenCache`], issues one request, and maps non-success
//! responses to [`IdentityError::Management`] tagged with the operation
//! name. Failure policy (compensation, fallbacks) lives in the
//! orchestrators, not here.

use async_trait::async_trait;
use reqwest::Method;
use secrecy::ExposeSecret;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, instrument};

use crate::shared::error::{IdentityError, Result};
use super::{
    Auth0Config, ManagementApi, ManagementPage, ManagementRole, ManagementUser, NewUser,
    PasswordTicketRequest, ResourceScope, RolePermission, RoleUpdate, TokenCache,
};

/// Error body returned by the Management API.
#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: String,
}

/// Totals-enabled user list response.
#[derive(Debug, Deserialize)]
struct UsersPageBody {
    users: Vec<ManagementUser>,
    start: Option<u32>,
    limit: Option<u32>,
    total: u64,
}

/// Totals-enabled role list response.
#[derive(Debug, Deserialize)]
struct RolesPageBody {
    roles: Vec<ManagementRole>,
    start: Option<u32>,
    limit: Option<u32>,
    total: u64,
}

#[derive(Debug, Deserialize)]
struct ResourceServerBody {
    #[serde(default)]
    scopes: Vec<ResourceScope>,
}

#[derive(Debug, Deserialize)]
struct TicketBody {
    ticket: String,
}

/// Authenticated client for the Auth0 Management API v2.
pub struct Auth0Management {
    http_client: reqwest::Client,
    token_cache: Arc<TokenCache>,
    config: Auth0Config,
}

impl Auth0Management {
    /// Creates a new Management API client.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client cannot be built.
    pub fn new(config: Auth0Config, token_cache: Arc<TokenCache>) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| {
                IdentityError::configuration(format!("failed to create HTTP client: {e}"))
            })?;

        Ok(Self {
            http_client,
            token_cache,
            config,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.api_base(), path)
    }

    /// Issues one authenticated request and checks the response status.
    #[instrument(skip(self, body), fields(operation = operation))]
    async fn send(
        &self,
        operation: &'static str,
        method: Method,
        url: String,
        body: Option<serde_json::Value>,
    ) -> Result<reqwest::Response> {
        let token = self.token_cache.get_token().await?;

        let mut request = self.http_client.request(method, &url).bearer_auth(&token);
        if let Some(ref b) = body {
            request = request.json(b);
        }

        let response = request.send().await?;
        let status = response.status();

        if status.is_success() {
            return Ok(response);
        }

        let text = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ApiErrorBody>(&text)
            .map(|e| e.message)
            .unwrap_or(text);
        debug!(operation, status = status.as_u16(), "Management API call rejected");

        Err(IdentityError::management(
            operation,
            Some(status.as_u16()),
            message,
        ))
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        operation: &'static str,
        url: String,
    ) -> Result<T> {
        let response = self.send(operation, Method::GET, url, None).await?;
        Ok(response.json().await?)
    }
}

/// Maps a 404 from a single-entity call to a typed not-found error.
fn or_not_found(err: IdentityError, entity_type: &str, id: &str) -> IdentityError {
    match err {
        IdentityError::Management {
            status: Some(404), ..
        } => IdentityError::not_found(entity_type, id),
        other => other,
    }
}

#[async_trait]
impl ManagementApi for Auth0Management {
    async fn create_user(&self, new_user: &NewUser) -> Result<ManagementUser> {
        let body = json!({
            "email": new_user.email,
            "connection": new_user.connection,
            "password": new_user.password.expose_secret(),
            "email_verified": false,
        });

        let response = self
            .send("create_user", Method::POST, self.url("/users"), Some(body))
            .await?;
        Ok(response.json().await?)
    }

    async fn get_user(&self, user_id: &str) -> Result<ManagementUser> {
        let url = self.url(&format!("/users/{}", urlencoding::encode(user_id)));
        self.get_json("get_user", url)
            .await
            .map_err(|e| or_not_found(e, "User", user_id))
    }

    async fn list_users(&self, page: u32, size: u32) -> Result<ManagementPage<ManagementUser>> {
        let url = self.url(&format!(
            "/users?page={page}&per_page={size}&include_totals=true"
        ));
        let body: UsersPageBody = self.get_json("list_users", url).await?;
        Ok(ManagementPage {
            items: body.users,
            start: body.start,
            limit: body.limit,
            total: body.total,
        })
    }

    async fn delete_user(&self, user_id: &str) -> Result<()> {
        let url = self.url(&format!("/users/{}", urlencoding::encode(user_id)));
        self.send("delete_user", Method::DELETE, url, None)
            .await
            .map_err(|e| or_not_found(e, "User", user_id))?;
        Ok(())
    }

    async fn list_user_roles(&self, user_id: &str) -> Result<Vec<ManagementRole>> {
        let url = self.url(&format!("/users/{}/roles", urlencoding::encode(user_id)));
        self.get_json("list_user_roles", url)
            .await
            .map_err(|e| or_not_found(e, "User", user_id))
    }

    async fn add_user_roles(&self, user_id: &str, role_ids: &[String]) -> Result<()> {
        let url = self.url(&format!("/users/{}/roles", urlencoding::encode(user_id)));
        self.send(
            "add_user_roles",
            Method::POST,
            url,
            Some(json!({ "roles": role_ids })),
        )
        .await?;
        Ok(())
    }

    async fn remove_user_roles(&self, user_id: &str, role_ids: &[String]) -> Result<()> {
        let url = self.url(&format!("/users/{}/roles", urlencoding::encode(user_id)));
        self.send(
            "remove_user_roles",
            Method::DELETE,
            url,
            Some(json!({ "roles": role_ids })),
        )
        .await?;
        Ok(())
    }

    async fn create_role(&self, name: &str, description: &str) -> Result<ManagementRole> {
        let body = json!({ "name": name, "description": description });
        let response = self
            .send("create_role", Method::POST, self.url("/roles"), Some(body))
            .await?;
        Ok(response.json().await?)
    }

    async fn get_role(&self, role_id: &str) -> Result<ManagementRole> {
        let url = self.url(&format!("/roles/{}", urlencoding::encode(role_id)));
        self.get_json("get_role", url)
            .await
            .map_err(|e| or_not_found(e, "Role", role_id))
    }

    async fn list_roles(&self, page: u32, size: u32) -> Result<ManagementPage<ManagementRole>> {
        let url = self.url(&format!(
            "/roles?page={page}&per_page={size}&include_totals=true"
        ));
        let body: RolesPageBody = self.get_json("list_roles", url).await?;
        Ok(ManagementPage {
            items: body.roles,
            start: body.start,
            limit: body.limit,
            total: body.total,
        })
    }

    async fn update_role(&self, role_id: &str, update: &RoleUpdate) -> Result<ManagementRole> {
        let url = self.url(&format!("/roles/{}", urlencoding::encode(role_id)));
        let body = serde_json::to_value(update)?;
        let response = self
            .send("update_role", Method::PATCH, url, Some(body))
            .await
            .map_err(|e| or_not_found(e, "Role", role_id))?;
        Ok(response.json().await?)
    }

    async fn delete_role(&self, role_id: &str) -> Result<()> {
        let url = self.url(&format!("/roles/{}", urlencoding::encode(role_id)));
        self.send("delete_role", Method::DELETE, url, None)
            .await
            .map_err(|e| or_not_found(e, "Role", role_id))?;
        Ok(())
    }

    async fn list_role_permissions(&self, role_id: &str) -> Result<Vec<RolePermission>> {
        let url = self.url(&format!(
            "/roles/{}/permissions",
            urlencoding::encode(role_id)
        ));
        self.get_json("list_role_permissions", url)
            .await
            .map_err(|e| or_not_found(e, "Role", role_id))
    }

    async fn add_role_permissions(
        &self,
        role_id: &str,
        permissions: &[RolePermission],
    ) -> Result<()> {
        let url = self.url(&format!(
            "/roles/{}/permissions",
            urlencoding::encode(role_id)
        ));
        self.send(
            "add_role_permissions",
            Method::POST,
            url,
            Some(json!({ "permissions": permissions })),
        )
        .await?;
        Ok(())
    }

    async fn get_resource_server_scopes(&self, identifier: &str) -> Result<Vec<ResourceScope>> {
        let url = self.url(&format!(
            "/resource-servers/{}",
            urlencoding::encode(identifier)
        ));
        let body: ResourceServerBody = self
            .get_json("get_resource_server_scopes", url)
            .await
            .map_err(|e| or_not_found(e, "ResourceServer", identifier))?;
        Ok(body.scopes)
    }

    async fn create_password_change_ticket(
        &self,
        request: &PasswordTicketRequest,
    ) -> Result<String> {
        let body = serde_json::to_value(request)?;
        let response = self
            .send(
                "create_password_change_ticket",
                Method::POST,
                self.url("/tickets/password-change"),
                Some(body),
            )
            .await?;
        let ticket: TicketBody = response.json().await?;
        Ok(ticket.ticket)
    }
}
