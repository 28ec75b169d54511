//! Remote Identity Client
//!
//! The gateway owns no user or role state; everything durable lives in the
//! identity provider. This module defines the [`ManagementApi`] seam the
//! orchestrators call through, the wire-level entity types, and the Auth0
//! implementation with its client-credentials token cache.

use async_trait::async_trait;
use secrecy::SecretString;
use serde::{Deserialize, Serialize};

use crate::shared::error::Result;

pub mod auth;
pub mod client;

pub use auth::TokenCache;
pub use client::Auth0Management;

/// Configuration for the Auth0 Management API connection.
#[derive(Debug, Clone)]
pub struct Auth0Config {
    /// Tenant domain base URL (e.g. "https://solara.eu.auth0.com")
    pub domain: String,
    /// Machine-to-machine application client id
    pub client_id: String,
    /// Machine-to-machine application client secret
    pub client_secret: SecretString,
    /// Identifier of the API gateway resource server whose scopes back
    /// role permissions
    pub api_gateway_identifier: String,
    /// Connection (realm) new user accounts are created in when the
    /// request does not name one
    pub default_connection: String,
}

impl Auth0Config {
    /// Base URL of the Management API v2 for this tenant.
    pub fn api_base(&self) -> String {
        format!("{}/api/v2", self.domain.trim_end_matches('/'))
    }

    /// Audience value expected by the token endpoint.
    pub fn audience(&self) -> String {
        format!("{}/api/v2/", self.domain.trim_end_matches('/'))
    }

    /// URL of the OAuth2 token endpoint.
    pub fn token_url(&self) -> String {
        format!("{}/oauth/token", self.domain.trim_end_matches('/'))
    }
}

/// A user as the provider reports it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ManagementUser {
    #[serde(rename = "user_id")]
    pub id: String,
    pub email: Option<String>,
    /// Display name; absent for accounts that never set one
    pub name: Option<String>,
    pub picture: Option<String>,
    pub last_login: Option<chrono::DateTime<chrono::Utc>>,
}

/// Payload for creating a user account.
#[derive(Debug)]
pub struct NewUser {
    pub email: String,
    /// Provider connection (realm) the account lives in
    pub connection: String,
    /// Temporary credential; zeroized on drop
    pub password: SecretString,
}

/// A role as the provider reports it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ManagementRole {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
}

/// Partial update of a role's details. `None` fields are left untouched.
#[derive(Debug, Default, Serialize)]
pub struct RoleUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl RoleUpdate {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.description.is_none()
    }
}

/// A permission assigned to a role: a scope name plus the resource server
/// that declares it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RolePermission {
    #[serde(rename = "permission_name")]
    pub name: String,
    pub resource_server_identifier: String,
}

/// A scope declared by a resource server. Referenced, never created here.
#[derive(Debug, Clone, Deserialize)]
pub struct ResourceScope {
    pub value: String,
    pub description: Option<String>,
}

/// One page of a totals-enabled list response.
#[derive(Debug, Clone)]
pub struct ManagementPage<T> {
    pub items: Vec<T>,
    /// Offset of the first item, as reported by the provider
    pub start: Option<u32>,
    /// Page size, as reported by the provider
    pub limit: Option<u32>,
    pub total: u64,
}

/// Request for a one-time credential-setup (password change) ticket.
#[derive(Debug, Serialize)]
pub struct PasswordTicketRequest {
    pub user_id: String,
    pub result_url: String,
    pub mark_email_as_verified: bool,
    #[serde(rename = "includeEmailInRedirect")]
    pub include_email_in_redirect: bool,
    pub ttl_sec: u32,
}

/// Authenticated client for the identity provider's management API.
///
/// Implementations must hand every call a currently valid credential; the
/// orchestrators never cache tokens or clients across calls.
#[async_trait]
pub trait ManagementApi: Send + Sync {
    async fn create_user(&self, new_user: &NewUser) -> Result<ManagementUser>;
    async fn get_user(&self, user_id: &str) -> Result<ManagementUser>;
    async fn list_users(&self, page: u32, size: u32) -> Result<ManagementPage<ManagementUser>>;
    async fn delete_user(&self, user_id: &str) -> Result<()>;

    async fn list_user_roles(&self, user_id: &str) -> Result<Vec<ManagementRole>>;
    async fn add_user_roles(&self, user_id: &str, role_ids: &[String]) -> Result<()>;
    async fn remove_user_roles(&self, user_id: &str, role_ids: &[String]) -> Result<()>;

    async fn create_role(&self, name: &str, description: &str) -> Result<ManagementRole>;
    async fn get_role(&self, role_id: &str) -> Result<ManagementRole>;
    async fn list_roles(&self, page: u32, size: u32) -> Result<ManagementPage<ManagementRole>>;
    async fn update_role(&self, role_id: &str, update: &RoleUpdate) -> Result<ManagementRole>;
    async fn delete_role(&self, role_id: &str) -> Result<()>;

    async fn list_role_permissions(&self, role_id: &str) -> Result<Vec<RolePermission>>;
    async fn add_role_permissions(
        &self,
        role_id: &str,
        permissions: &[RolePermission],
    ) -> Result<()>;

    async fn get_resource_server_scopes(&self, identifier: &str) -> Result<Vec<ResourceScope>>;

    async fn create_password_change_ticket(
        &self,
        request: &PasswordTicketRequest,
    ) -> Result<String>;
}
