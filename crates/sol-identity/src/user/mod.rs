//! User aggregate: orchestrator, temporary credentials, REST API.

pub mod api;
pub mod password;
pub mod service;

pub use service::{CreateUserCommand, RoleRef, UserService, UserWithRoles};
