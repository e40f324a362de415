//! Read-only access to the macOS Messages database.
//!
//! CHANGELOG:
//! - 10/18/2026 - Added message source adapter
//! - 10/18/2026 - Initial module structure

pub mod blob_parser;
pub mod connection;
pub mod queries;
pub mod source;
