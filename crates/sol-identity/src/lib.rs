//! Solara Identity Gateway
//!
//! Backend facade that lets the Solara API gateway administer users, roles,
//! and permissions by delegating to the Auth0 Management API. Nothing is
//! persisted locally: every read re-fetches provider state, and multi-step
//! writes run fixed compensating actions when a later step fails.
//!
//! ## Module Organization
//!
//! - `mgmt` - Remote identity client: the [`ManagementApi`] trait, its
//!   Auth0 implementation, and the client-credentials token cache
//! - `user` - User orchestrator (create-with-rollback, role diffing) + API
//! - `role` - Role orchestrator (scope resolution, permission replace) + API
//! - `shared` - Error type, pagination DTOs, sorting, health endpoints

pub mod mgmt;
pub mod role;
pub mod shared;
pub mod user;

// Re-export common types
pub use shared::error::{IdentityError, Result};
pub use mgmt::{Auth0Config, Auth0Management, ManagementApi, TokenCache};
pub use user::service::UserService;
pub use role::service::RoleService;
