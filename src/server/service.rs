//! Code lookup service: message source plus extractor.
//!
//! Shared by the HTTP handler and the one-shot `check` command.
//!
//! CHANGELOG:
//! - 10/18/2026 - Initial implementation

use std::sync::Arc;
use std::time::Duration;

use tracing::debug;

use crate::config::ServerConfig;
use crate::db::source::{ChatDb, MessageSource};
use crate::error::StoreError;
use crate::extract::{CodeExtractor, ExtractionResult};

/// Looks up the latest message and extracts its code.
#[derive(Clone)]
pub struct CodeService {
    source: Arc<dyn MessageSource>,
    extractor: Arc<CodeExtractor>,
    window: Duration,
}

impl CodeService {
    pub fn new(source: Arc<dyn MessageSource>, extractor: CodeExtractor, window: Duration) -> Self {
        Self {
            source,
            extractor: Arc::new(extractor),
            window,
        }
    }

    /// Service reading `chat.db` with the configured window and keywords.
    pub fn from_config(config: &ServerConfig) -> Self {
        Self::new(
            Arc::new(ChatDb::new(&config.store_path)),
            CodeExtractor::new(config.keyword_set()),
            config.window(),
        )
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// Fetch and classify the latest message. Blocks on SQLite.
    ///
    /// Store failures are returned as errors, never as a status.
    pub fn lookup(&self) -> Result<ExtractionResult, StoreError> {
        let latest = self.source.fetch_latest(self.window)?;
        let result = self.extractor.extract(latest.as_ref());
        debug!(status = ?result.status(), "extraction finished");
        Ok(result)
    }
}
