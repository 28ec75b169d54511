//! User Orchestrator
//!
//! Sequences the multi-step user workflows against the Management API and
//! owns their compensating actions:
//!
//! - account creation rolls back (deletes the account) when a later step
//!   in the same flow fails
//! - role updates re-add previously removed roles when the addition half
//!   of the diff fails
//!
//! Compensation is best effort: its own failure is logged and never masks
//! the original error. Nothing is retried.

use chrono::{DateTime, Utc};
use futures::future::join_all;
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, error, info, warn};
use utoipa::ToSchema;

use crate::mgmt::{ManagementApi, ManagementRole, ManagementUser, NewUser, PasswordTicketRequest};
use crate::shared::api_common::PaginatedResponse;
use crate::shared::error::{IdentityError, Result};
use crate::shared::sorting::compare_display_names;
use super::password::{generate_temporary_password, TEMP_PASSWORD_LENGTH};

/// Credential-setup ticket validity: 24 hours.
const TICKET_TTL_SECONDS: u32 = 86_400;

/// Command for the create-user workflow.
#[derive(Debug, Clone)]
pub struct CreateUserCommand {
    pub email: String,
    /// Provider connection (realm) the account is created in; falls back
    /// to the configured default when absent
    pub connection: Option<String>,
    /// Roles to assign right after creation; may be empty
    pub role_ids: Vec<String>,
    /// Where the credential-setup ticket redirects after completion
    pub result_url: String,
}

/// Reference to a role assigned to a user.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RoleRef {
    pub id: String,
    pub name: String,
}

impl From<ManagementRole> for RoleRef {
    fn from(role: ManagementRole) -> Self {
        Self {
            id: role.id,
            name: role.name,
        }
    }
}

/// User summary with its current role assignment, always re-fetched from
/// the provider (there is no local cache).
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserWithRoles {
    pub id: String,
    pub email: Option<String>,
    pub name: Option<String>,
    pub picture: Option<String>,
    pub last_login: Option<DateTime<Utc>>,
    pub roles: Vec<RoleRef>,
}

impl UserWithRoles {
    fn from_parts(user: ManagementUser, roles: Vec<RoleRef>) -> Self {
        Self {
            id: user.id,
            email: user.email,
            name: user.name,
            picture: user.picture,
            last_login: user.last_login,
            roles,
        }
    }
}

/// Orchestrates user management against the remote identity provider.
pub struct UserService {
    mgmt: Arc<dyn ManagementApi>,
    default_connection: String,
}

impl UserService {
    pub fn new(mgmt: Arc<dyn ManagementApi>, default_connection: impl Into<String>) -> Self {
        Self {
            mgmt,
            default_connection: default_connection.into(),
        }
    }

    /// Creates a user account, assigns its initial roles, and returns a
    /// one-time credential-setup link.
    ///
    /// Any failure after the account exists triggers a compensating
    /// delete of the partially created account; the original error is
    /// surfaced either way.
    pub async fn create_user(&self, command: CreateUserCommand) -> Result<String> {
        let password = generate_temporary_password(TEMP_PASSWORD_LENGTH);
        let connection = command
            .connection
            .clone()
            .unwrap_or_else(|| self.default_connection.clone());
        let new_user = NewUser {
            email: command.email.clone(),
            connection,
            password,
        };

        let created = self.mgmt.create_user(&new_user).await?;
        // Zeroize the temporary credential now that the remote call has it
        drop(new_user);
        info!(user_id = %created.id, email = %command.email, "created remote user account");

        match self.finish_create(&created.id, &command).await {
            Ok(ticket_url) => Ok(ticket_url),
            Err(e) => {
                error!(
                    user_id = %created.id,
                    error = %e,
                    "user creation flow failed after account creation, rolling back"
                );
                self.attempt_user_rollback(&created.id).await;
                Err(IdentityError::workflow(
                    format!("failed to complete user creation for {}", command.email),
                    e,
                ))
            }
        }
    }

    /// Steps 3-4 of the create flow: role assignment and ticket issuance.
    async fn finish_create(&self, user_id: &str, command: &CreateUserCommand) -> Result<String> {
        if command.role_ids.is_empty() {
            debug!(user_id, "no initial roles requested, skipping assignment");
        } else {
            self.mgmt.add_user_roles(user_id, &command.role_ids).await?;
            info!(user_id, roles = ?command.role_ids, "assigned initial roles");
        }

        let ticket_url = self
            .mgmt
            .create_password_change_ticket(&PasswordTicketRequest {
                user_id: user_id.to_string(),
                result_url: command.result_url.clone(),
                // The user verifies their address by completing the ticket
                mark_email_as_verified: false,
                // Keep the email out of the redirect URL
                include_email_in_redirect: false,
                ttl_sec: TICKET_TTL_SECONDS,
            })
            .await?;
        info!(user_id, "issued credential-setup ticket");

        Ok(ticket_url)
    }

    /// Compensating action for a failed create flow. Best effort only.
    async fn attempt_user_rollback(&self, user_id: &str) {
        warn!(user_id, "rollback: deleting partially created user");
        match self.mgmt.delete_user(user_id).await {
            Ok(()) => info!(user_id, "rollback successful: deleted user"),
            Err(e) => error!(user_id, error = %e, "rollback failed: could not delete user"),
        }
    }

    /// Lists one page of users with their roles, sorted by display name
    /// (nulls first, case-insensitive, stable).
    ///
    /// A per-user role-fetch failure downgrades that user to an empty
    /// role list instead of failing the page.
    pub async fn list_users(
        &self,
        page: u32,
        size: u32,
    ) -> Result<PaginatedResponse<UserWithRoles>> {
        let remote_page = self.mgmt.list_users(page, size).await?;
        let total = remote_page.total;

        // Role fetches per item are independent; run them concurrently.
        let mut users: Vec<UserWithRoles> = join_all(
            remote_page
                .items
                .into_iter()
                .map(|user| self.enrich_user(user)),
        )
        .await;

        // Stable sort: ties keep provider order
        users.sort_by(|a, b| compare_display_names(a.name.as_deref(), b.name.as_deref()));

        Ok(PaginatedResponse::new(users, page, size, total))
    }

    async fn enrich_user(&self, user: ManagementUser) -> UserWithRoles {
        let roles = match self.mgmt.list_user_roles(&user.id).await {
            Ok(roles) => roles.into_iter().map(RoleRef::from).collect(),
            Err(e) => {
                warn!(
                    user_id = %user.id,
                    error = %e,
                    "failed to fetch roles for user, returning empty role list"
                );
                Vec::new()
            }
        };
        UserWithRoles::from_parts(user, roles)
    }

    /// Fetches a single user with roles. Unlike the list path, a
    /// role-fetch failure propagates here.
    pub async fn get_user(&self, user_id: &str) -> Result<UserWithRoles> {
        let user = self.mgmt.get_user(user_id).await?;
        let roles = self.mgmt.list_user_roles(user_id).await?;
        Ok(UserWithRoles::from_parts(
            user,
            roles.into_iter().map(RoleRef::from).collect(),
        ))
    }

    pub async fn delete_user(&self, user_id: &str) -> Result<()> {
        self.mgmt.delete_user(user_id).await?;
        info!(user_id, "deleted remote user");
        Ok(())
    }

    /// Reconciles a user's role assignment with the desired set.
    ///
    /// Removals are applied before additions, and no-op calls are skipped
    /// entirely. If the additions fail after removals succeeded, the
    /// removed roles are re-added (best effort) and the original error is
    /// returned.
    pub async fn update_user_roles(&self, user_id: &str, desired: Vec<String>) -> Result<()> {
        let current: Vec<String> = self
            .mgmt
            .list_user_roles(user_id)
            .await?
            .into_iter()
            .map(|r| r.id)
            .collect();

        let (to_add, to_remove) = diff_roles(&current, &desired);
        if to_add.is_empty() && to_remove.is_empty() {
            debug!(user_id, "role assignment already matches desired set");
            return Ok(());
        }

        let mut removed: Vec<String> = Vec::new();
        if !to_remove.is_empty() {
            self.mgmt.remove_user_roles(user_id, &to_remove).await?;
            info!(user_id, roles = ?to_remove, "removed roles from user");
            removed = to_remove;
        }

        if !to_add.is_empty() {
            if let Err(e) = self.mgmt.add_user_roles(user_id, &to_add).await {
                error!(
                    user_id,
                    roles = ?to_add,
                    error = %e,
                    "failed to add roles, initiating rollback"
                );
                if !removed.is_empty() {
                    self.attempt_role_restore(user_id, &removed).await;
                }
                return Err(IdentityError::workflow(
                    format!("failed to update roles for user {user_id}, rollback attempted"),
                    e,
                ));
            }
            info!(user_id, roles = ?to_add, "added roles to user");
        }

        Ok(())
    }

    /// Compensating action for a failed role update: re-add what was
    /// removed. Best effort only.
    async fn attempt_role_restore(&self, user_id: &str, removed: &[String]) {
        warn!(user_id, roles = ?removed, "rollback: re-adding previously removed roles");
        match self.mgmt.add_user_roles(user_id, removed).await {
            Ok(()) => info!(user_id, "rollback successful: re-added removed roles"),
            Err(e) => error!(user_id, error = %e, "rollback failed: could not re-add roles"),
        }
    }
}

/// Computes the role diff: `to_add = desired - current`,
/// `to_remove = current - desired`, both preserving input order.
fn diff_roles(current: &[String], desired: &[String]) -> (Vec<String>, Vec<String>) {
    let to_add = desired
        .iter()
        .filter(|id| !current.contains(id))
        .cloned()
        .collect();
    let to_remove = current
        .iter()
        .filter(|id| !desired.contains(id))
        .cloned()
        .collect();
    (to_add, to_remove)
}
