//! Startup configuration.
//!
//! Layered as defaults, then `IMESSAGE_OTP_*` environment variables, then CLI
//! flags (applied by the binary).
//!
//! CHANGELOG:
//! - 10/18/2026 - Initial implementation

use std::net::{Ipv4Addr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

use crate::db::connection::default_db_path;
use crate::error::ConfigError;
use crate::extract::{KeywordSet, DEFAULT_KEYWORDS};

pub const ENV_DB: &str = "IMESSAGE_OTP_DB";
pub const ENV_WINDOW_SECS: &str = "IMESSAGE_OTP_WINDOW_SECS";
pub const ENV_LISTEN: &str = "IMESSAGE_OTP_LISTEN";
pub const ENV_KEYWORDS: &str = "IMESSAGE_OTP_KEYWORDS";

/// Default port the endpoint listens on.
pub const DEFAULT_PORT: u16 = 65530;

/// Default recency window in seconds.
pub const DEFAULT_WINDOW_SECS: u64 = 60;

/// Server configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Location of the Messages database.
    pub store_path: PathBuf,
    /// Only messages newer than this many seconds are considered.
    pub window_seconds: u64,
    /// Bind address; must be loopback.
    pub listen_address: SocketAddr,
    /// Trigger substrings marking a verification message.
    pub keywords: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            store_path: default_db_path(),
            window_seconds: DEFAULT_WINDOW_SECS,
            listen_address: SocketAddr::from((Ipv4Addr::LOCALHOST, DEFAULT_PORT)),
            keywords: DEFAULT_KEYWORDS.iter().map(|k| k.to_string()).collect(),
        }
    }
}

impl ServerConfig {
    /// Defaults overridden by the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Defaults overridden by whatever `lookup` returns for each variable.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(path) = lookup(ENV_DB) {
            config.store_path = expand_path(&path);
        }

        if let Some(raw) = lookup(ENV_WINDOW_SECS) {
            config.window_seconds = raw.trim().parse().map_err(|e| ConfigError::InvalidValue {
                key: ENV_WINDOW_SECS.to_string(),
                message: format!("{raw:?}: {e}"),
            })?;
        }

        if let Some(raw) = lookup(ENV_LISTEN) {
            config.listen_address = raw.trim().parse().map_err(|e| ConfigError::InvalidValue {
                key: ENV_LISTEN.to_string(),
                message: format!("{raw:?}: {e}"),
            })?;
        }

        if let Some(raw) = lookup(ENV_KEYWORDS) {
            config.keywords = raw
                .split(',')
                .map(|k| k.trim().to_string())
                .filter(|k| !k.is_empty())
                .collect();
        }

        Ok(config)
    }

    /// Reject settings the server cannot honour.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.window_seconds == 0 {
            return Err(ConfigError::InvalidValue {
                key: "window_seconds".to_string(),
                message: "must be at least 1".to_string(),
            });
        }
        if !self.listen_address.ip().is_loopback() {
            return Err(ConfigError::NonLoopback(self.listen_address));
        }
        Ok(())
    }

    pub fn window(&self) -> Duration {
        Duration::from_secs(self.window_seconds)
    }

    pub fn keyword_set(&self) -> KeywordSet {
        KeywordSet::new(&self.keywords)
    }
}

/// Expand a leading `~` in a user-supplied path.
pub fn expand_path(raw: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(raw.trim()).into_owned())
}
