//! Role Orchestrator
//!
//! Role management over the identity provider, including permission
//! (scope) resolution against the API gateway resource server.

pub mod api;
pub mod service;

pub use service::{RoleDetailsUpdate, RoleService, RoleWithPermissions};
