//! Users API
//!
//! REST endpoints for user management. Every operation is served by a
//! round trip to the identity provider; nothing is cached locally.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;
use utoipa_axum::{router::OpenApiRouter, routes};

use crate::shared::api_common::{PaginatedResponse, PaginationParams, SuccessResponse};
use crate::shared::error::IdentityError;
use crate::user::service::{CreateUserCommand, UserService, UserWithRoles};

/// Create user request
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserRequest {
    /// Email address for the new account
    pub email: String,

    /// Provider connection to create the account in; defaults to the
    /// configured connection
    pub connection: Option<String>,

    /// Roles to assign right after creation
    #[serde(default)]
    pub role_ids: Vec<String>,

    /// Where the credential-setup link redirects after completion
    pub result_url: String,
}

/// Create user response: the one-time credential-setup link
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserResponse {
    pub ticket_url: String,
}

/// Update user roles request
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserRequest {
    /// Desired role assignment; `null` and `[]` both mean "no roles"
    pub role_ids: Option<Vec<String>>,
}

/// Users service state
#[derive(Clone)]
pub struct UsersState {
    pub service: Arc<UserService>,
}

/// Create a new user
#[utoipa::path(
    post,
    path = "",
    tag = "users",
    operation_id = "postApiUsers",
    request_body = CreateUserRequest,
    responses(
        (status = 200, description = "User created, returns credential-setup link", body = CreateUserResponse),
        (status = 400, description = "Validation error"),
        (status = 502, description = "Provider call failed")
    )
)]
pub async fn create_user(
    State(state): State<UsersState>,
    Json(req): Json<CreateUserRequest>,
) -> Result<Json<CreateUserResponse>, IdentityError> {
    if req.email.trim().is_empty() {
        return Err(IdentityError::validation("email must not be empty"));
    }
    if req.result_url.trim().is_empty() {
        return Err(IdentityError::validation("resultUrl must not be empty"));
    }

    let ticket_url = state
        .service
        .create_user(CreateUserCommand {
            email: req.email,
            connection: req.connection,
            role_ids: req.role_ids,
            result_url: req.result_url,
        })
        .await?;

    Ok(Json(CreateUserResponse { ticket_url }))
}

/// List users with their roles
#[utoipa::path(
    get,
    path = "",
    tag = "users",
    operation_id = "getApiUsers",
    params(PaginationParams),
    responses(
        (status = 200, description = "One page of users, sorted by display name", body = PaginatedResponse<UserWithRoles>),
        (status = 502, description = "Provider call failed")
    )
)]
pub async fn list_users(
    State(state): State<UsersState>,
    Query(params): Query<PaginationParams>,
) -> Result<Json<PaginatedResponse<UserWithRoles>>, IdentityError> {
    let page = state.service.list_users(params.page(), params.size()).await?;
    Ok(Json(page))
}

/// Get user by ID
#[utoipa::path(
    get,
    path = "/{user_id}",
    tag = "users",
    operation_id = "getApiUsersByUserId",
    params(
        ("user_id" = String, Path, description = "Provider user ID")
    ),
    responses(
        (status = 200, description = "User found", body = UserWithRoles),
        (status = 404, description = "User not found")
    )
)]
pub async fn get_user(
    State(state): State<UsersState>,
    Path(user_id): Path<String>,
) -> Result<Json<UserWithRoles>, IdentityError> {
    let user = state.service.get_user(&user_id).await?;
    Ok(Json(user))
}

/// Update a user's role assignment
#[utoipa::path(
    put,
    path = "/{user_id}",
    tag = "users",
    operation_id = "putApiUsersByUserId",
    params(
        ("user_id" = String, Path, description = "Provider user ID")
    ),
    request_body = UpdateUserRequest,
    responses(
        (status = 200, description = "Roles updated", body = SuccessResponse),
        (status = 404, description = "User not found"),
        (status = 502, description = "Provider call failed, rollback attempted")
    )
)]
pub async fn update_user(
    State(state): State<UsersState>,
    Path(user_id): Path<String>,
    Json(req): Json<UpdateUserRequest>,
) -> Result<Json<SuccessResponse>, IdentityError> {
    let desired = req.role_ids.unwrap_or_default();
    state.service.update_user_roles(&user_id, desired).await?;
    Ok(Json(SuccessResponse::ok()))
}

/// Delete user
#[utoipa::path(
    delete,
    path = "/{user_id}",
    tag = "users",
    operation_id = "deleteApiUsersByUserId",
    params(
        ("user_id" = String, Path, description = "Provider user ID")
    ),
    responses(
        (status = 200, description = "User deleted", body = SuccessResponse),
        (status = 404, description = "User not found")
    )
)]
pub async fn delete_user(
    State(state): State<UsersState>,
    Path(user_id): Path<String>,
) -> Result<Json<SuccessResponse>, IdentityError> {
    state.service.delete_user(&user_id).await?;
    Ok(Json(SuccessResponse::ok()))
}

/// Create users router
pub fn users_router(state: UsersState) -> OpenApiRouter {
    OpenApiRouter::new()
        .routes(routes!(create_user, list_users))
        .routes(routes!(get_user, update_user, delete_user))
        .with_state(state)
}
