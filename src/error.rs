//! Error types for the message store and configuration.
//!
//! Code extraction has no error type: every input maps to an
//! `ExtractionStatus`. Failures here mean "could not check", never "no code".
//!
//! CHANGELOG:
//! - 10/18/2026 - Separate access errors from missing files
//! - 10/18/2026 - Initial store and config errors

use std::net::SocketAddr;
use std::path::PathBuf;

/// Failure to read the message store.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Messages database not found at {}", path.display())]
    NotFound { path: PathBuf },

    #[error("Cannot access Messages database at {} (grant Full Disk Access?): {source}", path.display())]
    Access {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to open Messages database at {}: {source}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    #[error("Messages database query failed: {0}")]
    Query(#[from] rusqlite::Error),
}

/// Invalid startup configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },

    #[error("Listen address {0} is not a loopback address")]
    NonLoopback(SocketAddr),
}
