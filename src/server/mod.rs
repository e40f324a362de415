//! Loopback HTTP endpoint.
//!
//! CHANGELOG:
//! - 10/18/2026 - Initial module structure

pub mod routes;
pub mod service;

pub use routes::{code_routes, serve};
pub use service::CodeService;
