//! Shared infrastructure for Solara services.
//!
//! Currently this only carries the logging bootstrap; service-specific
//! types live in the service crates themselves.

pub mod logging;
