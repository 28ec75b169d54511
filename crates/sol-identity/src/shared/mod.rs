//! Shared infrastructure: errors, pagination, sorting, health.

pub mod api_common;
pub mod error;
pub mod health_api;
pub mod sorting;
