//! Role orchestration against the Management API.
//!
//! Roles and their permissions live entirely in the provider. Permission
//! names are resolved against the scopes declared by the configured API
//! gateway resource server; names that match no declared scope are
//! dropped with a warning rather than failing the update.

use futures::future::join_all;
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info, warn};
use utoipa::ToSchema;

use crate::mgmt::{ManagementApi, ManagementRole, ResourceScope, RolePermission, RoleUpdate};
use crate::shared::api_common::PaginatedResponse;
use crate::shared::error::Result;
use crate::shared::sorting::compare_display_names;

/// A role with its resolved permission names.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RoleWithPermissions {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub permissions: Vec<String>,
}

impl RoleWithPermissions {
    fn from_parts(role: ManagementRole, permissions: Vec<String>) -> Self {
        Self {
            id: role.id,
            name: role.name,
            description: role.description,
            permissions,
        }
    }
}

/// Partial role update. `None` fields are left untouched; the details
/// PATCH is skipped entirely when neither name nor description changes.
#[derive(Debug, Default)]
pub struct RoleDetailsUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    /// Desired permission names; `None` leaves permissions untouched
    pub permission_names: Option<Vec<String>>,
}

/// Orchestrates role management against the remote identity provider.
pub struct RoleService {
    mgmt: Arc<dyn ManagementApi>,
    /// Resource server whose scopes back role permissions
    api_gateway_identifier: String,
}

impl RoleService {
    pub fn new(mgmt: Arc<dyn ManagementApi>, api_gateway_identifier: impl Into<String>) -> Self {
        Self {
            mgmt,
            api_gateway_identifier: api_gateway_identifier.into(),
        }
    }

    /// Creates a role and returns it re-fetched through the single-role
    /// path, so the response reflects what the provider actually stored.
    pub async fn create_role(&self, name: &str, description: &str) -> Result<RoleWithPermissions> {
        let created = self.mgmt.create_role(name, description).await?;
        info!(role_id = %created.id, name, "created remote role");
        self.get_role(&created.id).await
    }

    /// Fetches a single role with its permissions. A permission-fetch
    /// failure propagates here, unlike the list path.
    pub async fn get_role(&self, role_id: &str) -> Result<RoleWithPermissions> {
        let role = self.mgmt.get_role(role_id).await?;
        let permissions = self.mgmt.list_role_permissions(role_id).await?;
        Ok(RoleWithPermissions::from_parts(
            role,
            permissions.into_iter().map(|p| p.name).collect(),
        ))
    }

    /// Lists one page of roles with their permissions, sorted by name
    /// (case-insensitive, stable). Page metadata is derived from what the
    /// provider reports rather than from the request.
    pub async fn list_roles(
        &self,
        page: u32,
        size: u32,
    ) -> Result<PaginatedResponse<RoleWithPermissions>> {
        let remote_page = self.mgmt.list_roles(page, size).await?;
        let total = remote_page.total;
        let (current_page, page_size, total_pages) = derive_page_metadata(
            remote_page.start,
            remote_page.limit,
            remote_page.items.len(),
            total,
        );

        let mut roles: Vec<RoleWithPermissions> = join_all(
            remote_page
                .items
                .into_iter()
                .map(|role| self.enrich_role(role)),
        )
        .await;

        roles.sort_by(|a, b| compare_display_names(Some(&a.name), Some(&b.name)));

        Ok(PaginatedResponse {
            data: roles,
            page: current_page,
            size: page_size,
            total,
            total_pages,
        })
    }

    async fn enrich_role(&self, role: ManagementRole) -> RoleWithPermissions {
        let permissions = match self.mgmt.list_role_permissions(&role.id).await {
            Ok(permissions) => permissions.into_iter().map(|p| p.name).collect(),
            Err(e) => {
                warn!(
                    role_id = %role.id,
                    error = %e,
                    "failed to fetch permissions for role, returning empty list"
                );
                Vec::new()
            }
        };
        RoleWithPermissions::from_parts(role, permissions)
    }

    /// Applies a partial update: role details first (skipped when empty),
    /// then permission replacement (skipped when absent), then a final
    /// re-fetch so the response reflects provider state.
    pub async fn update_role(
        &self,
        role_id: &str,
        update: RoleDetailsUpdate,
    ) -> Result<RoleWithPermissions> {
        let details = RoleUpdate {
            name: update.name,
            description: update.description,
        };
        if details.is_empty() {
            debug!(role_id, "no detail changes requested, skipping role update call");
        } else {
            self.mgmt.update_role(role_id, &details).await?;
            info!(role_id, "updated role details");
        }

        if let Some(names) = update.permission_names {
            let scopes = self
                .mgmt
                .get_resource_server_scopes(&self.api_gateway_identifier)
                .await?;
            let permissions = resolve_scope_names(&names, &scopes, &self.api_gateway_identifier);
            if permissions.is_empty() {
                debug!(role_id, "no resolvable permissions requested, skipping assignment");
            } else {
                self.mgmt.add_role_permissions(role_id, &permissions).await?;
                info!(role_id, count = permissions.len(), "assigned role permissions");
            }
        }

        self.get_role(role_id).await
    }

    pub async fn delete_role(&self, role_id: &str) -> Result<()> {
        self.mgmt.delete_role(role_id).await?;
        info!(role_id, "deleted remote role");
        Ok(())
    }
}

/// Derives pagination metadata from what the provider reported.
///
/// The page size is the provider's `limit` when present, otherwise the
/// item count of the returned page. With a zero size the page index
/// degrades to 0 and total pages to 1 (or 0 when there is nothing at all).
fn derive_page_metadata(
    start: Option<u32>,
    limit: Option<u32>,
    item_count: usize,
    total: u64,
) -> (u32, u32, u32) {
    let size = limit.unwrap_or(item_count as u32);
    let page = start.unwrap_or(0) / size.max(1);
    let total_pages = if size > 0 {
        ((total as f64) / (size as f64)).ceil() as u32
    } else if total > 0 {
        1
    } else {
        0
    };
    (page, size, total_pages)
}

/// Resolves requested permission names against the scopes the resource
/// server declares. Unmatched names are dropped with a warning.
fn resolve_scope_names(
    requested: &[String],
    available: &[ResourceScope],
    resource_server_identifier: &str,
) -> Vec<RolePermission> {
    requested
        .iter()
        .filter_map(|name| {
            if available.iter().any(|scope| &scope.value == name) {
                Some(RolePermission {
                    name: name.clone(),
                    resource_server_identifier: resource_server_identifier.to_string(),
                })
            } else {
                warn!(
                    permission = %name,
                    resource_server = resource_server_identifier,
                    "requested permission matches no declared scope, dropping"
                );
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scope(value: &str) -> ResourceScope {
        ResourceScope {
            value: value.to_string(),
            description: None,
        }
    }

    #[test]
    fn test_derive_page_metadata() {
        let (page, size, total_pages) = derive_page_metadata(Some(10), Some(10), 10, 25);
        assert_eq!(page, 1);
        assert_eq!(size, 10);
        assert_eq!(total_pages, 3);
    }

    #[test]
    fn test_derive_page_metadata_size_from_item_count() {
        let (page, size, total_pages) = derive_page_metadata(Some(0), None, 5, 5);
        assert_eq!(page, 0);
        assert_eq!(size, 5);
        assert_eq!(total_pages, 1);
    }

    #[test]
    fn test_derive_page_metadata_empty_page_nonzero_total() {
        // Zero size with items still in the collection: one logical page
        let (page, size, total_pages) = derive_page_metadata(Some(0), None, 0, 3);
        assert_eq!(page, 0);
        assert_eq!(size, 0);
        assert_eq!(total_pages, 1);
    }

    #[test]
    fn test_derive_page_metadata_empty_collection() {
        let (page, size, total_pages) = derive_page_metadata(None, None, 0, 0);
        assert_eq!(page, 0);
        assert_eq!(size, 0);
        assert_eq!(total_pages, 0);
    }

    #[test]
    fn test_resolve_scope_names_drops_unmatched() {
        let available = vec![scope("read:users"), scope("write:users")];
        let requested = vec![
            "read:users".to_string(),
            "admin:everything".to_string(),
            "write:users".to_string(),
        ];

        let resolved = resolve_scope_names(&requested, &available, "https://api.solara.dev");
        let names: Vec<&str> = resolved.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["read:users", "write:users"]);
        assert!(resolved
            .iter()
            .all(|p| p.resource_server_identifier == "https://api.solara.dev"));
    }

    #[test]
    fn test_resolve_scope_names_all_unmatched() {
        let available = vec![scope("read:users")];
        let requested = vec!["nope".to_string()];
        assert!(resolve_scope_names(&requested, &available, "api").is_empty());
    }
}
