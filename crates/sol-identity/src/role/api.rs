//! Roles API
//!
//! REST endpoints for role management.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;
use std::sync::Arc;
use utoipa::ToSchema;
use utoipa_axum::{router::OpenApiRouter, routes};

use crate::role::service::{RoleDetailsUpdate, RoleService, RoleWithPermissions};
use crate::shared::api_common::{PaginatedResponse, PaginationParams, SuccessResponse};
use crate::shared::error::IdentityError;

/// Create role request
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateRoleRequest {
    /// Role name
    pub name: String,

    /// Description
    #[serde(default)]
    pub description: Option<String>,
}

/// Update role request
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateRoleRequest {
    /// New role name
    pub name: Option<String>,

    /// New description
    pub description: Option<String>,

    /// Desired permission names; omit to leave permissions untouched
    pub permissions: Option<Vec<String>>,
}

/// Roles service state
#[derive(Clone)]
pub struct RolesState {
    pub service: Arc<RoleService>,
}

/// Create a new role
#[utoipa::path(
    post,
    path = "",
    tag = "roles",
    operation_id = "postApiRoles",
    request_body = CreateRoleRequest,
    responses(
        (status = 200, description = "Role created", body = RoleWithPermissions),
        (status = 400, description = "Validation error"),
        (status = 502, description = "Provider call failed")
    )
)]
pub async fn create_role(
    State(state): State<RolesState>,
    Json(req): Json<CreateRoleRequest>,
) -> Result<Json<RoleWithPermissions>, IdentityError> {
    if req.name.trim().is_empty() {
        return Err(IdentityError::validation("name must not be empty"));
    }

    let role = state
        .service
        .create_role(&req.name, req.description.as_deref().unwrap_or(""))
        .await?;
    Ok(Json(role))
}

/// List roles with their permissions
#[utoipa::path(
    get,
    path = "",
    tag = "roles",
    operation_id = "getApiRoles",
    params(PaginationParams),
    responses(
        (status = 200, description = "One page of roles, sorted by name", body = PaginatedResponse<RoleWithPermissions>),
        (status = 502, description = "Provider call failed")
    )
)]
pub async fn list_roles(
    State(state): State<RolesState>,
    Query(params): Query<PaginationParams>,
) -> Result<Json<PaginatedResponse<RoleWithPermissions>>, IdentityError> {
    let page = state.service.list_roles(params.page(), params.size()).await?;
    Ok(Json(page))
}

/// Get role by ID
#[utoipa::path(
    get,
    path = "/{role_id}",
    tag = "roles",
    operation_id = "getApiRolesByRoleId",
    params(
        ("role_id" = String, Path, description = "Provider role ID")
    ),
    responses(
        (status = 200, description = "Role found", body = RoleWithPermissions),
        (status = 404, description = "Role not found")
    )
)]
pub async fn get_role(
    State(state): State<RolesState>,
    Path(role_id): Path<String>,
) -> Result<Json<RoleWithPermissions>, IdentityError> {
    let role = state.service.get_role(&role_id).await?;
    Ok(Json(role))
}

/// Update role details and permissions
#[utoipa::path(
    put,
    path = "/{role_id}",
    tag = "roles",
    operation_id = "putApiRolesByRoleId",
    params(
        ("role_id" = String, Path, description = "Provider role ID")
    ),
    request_body = UpdateRoleRequest,
    responses(
        (status = 200, description = "Role updated", body = RoleWithPermissions),
        (status = 404, description = "Role not found"),
        (status = 502, description = "Provider call failed")
    )
)]
pub async fn update_role(
    State(state): State<RolesState>,
    Path(role_id): Path<String>,
    Json(req): Json<UpdateRoleRequest>,
) -> Result<Json<RoleWithPermissions>, IdentityError> {
    let role = state
        .service
        .update_role(
            &role_id,
            RoleDetailsUpdate {
                name: req.name,
                description: req.description,
                permission_names: req.permissions,
            },
        )
        .await?;
    Ok(Json(role))
}

/// Delete role
#[utoipa::path(
    delete,
    path = "/{role_id}",
    tag = "roles",
    operation_id = "deleteApiRolesByRoleId",
    params(
        ("role_id" = String, Path, description = "Provider role ID")
    ),
    responses(
        (status = 200, description = "Role deleted", body = SuccessResponse),
        (status = 404, description = "Role not found")
    )
)]
pub async fn delete_role(
    State(state): State<RolesState>,
    Path(role_id): Path<String>,
) -> Result<Json<SuccessResponse>, IdentityError> {
    state.service.delete_role(&role_id).await?;
    Ok(Json(SuccessResponse::ok()))
}

/// Create roles router
pub fn roles_router(state: RolesState) -> OpenApiRouter {
    OpenApiRouter::new()
        .routes(routes!(create_role, list_roles))
        .routes(routes!(get_role, update_role, delete_role))
        .with_state(state)
}
