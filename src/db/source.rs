//! Latest-message lookup over Messages.db.
//!
//! Every call opens its own read-only connection and drops it before
//! returning, so concurrent callers never share SQLite state.
//!
//! CHANGELOG:
//! - 10/18/2026 - Window is open-ended towards the future
//! - 10/18/2026 - attributedBody fallback for NULL text
//! - 10/18/2026 - Initial implementation

use chrono::{DateTime, Utc};
use rusqlite::{Connection, OptionalExtension};
use std::path::PathBuf;
use std::time::Duration;
use tracing::debug;

use super::{blob_parser, connection, queries};
use crate::error::StoreError;

/// A message as read from the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub text: String,
    pub timestamp: DateTime<Utc>,
}

/// Read-only accessor for the newest message.
pub trait MessageSource: Send + Sync {
    /// Newest message with a timestamp after `now - window`.
    fn fetch_latest(&self, window: Duration) -> Result<Option<Message>, StoreError>;
}

/// `MessageSource` backed by the Messages `chat.db` file.
#[derive(Debug, Clone)]
pub struct ChatDb {
    path: PathBuf,
}

impl ChatDb {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Same as `fetch_latest` with an explicit reference time.
    pub fn fetch_latest_at(
        &self,
        now: DateTime<Utc>,
        window: Duration,
    ) -> Result<Option<Message>, StoreError> {
        let conn = connection::open_db(&self.path)?;
        latest_in_window(&conn, now, window)
    }
}

impl MessageSource for ChatDb {
    fn fetch_latest(&self, window: Duration) -> Result<Option<Message>, StoreError> {
        self.fetch_latest_at(Utc::now(), window)
    }
}

/// Query the newest message on an open connection.
pub fn latest_in_window(
    conn: &Connection,
    now: DateTime<Utc>,
    window: Duration,
) -> Result<Option<Message>, StoreError> {
    let window = chrono::Duration::from_std(window).unwrap_or(chrono::Duration::MAX);
    let cutoff = now.checked_sub_signed(window).unwrap_or(DateTime::<Utc>::MIN_UTC);
    let cutoff_cocoa = queries::datetime_to_cocoa(cutoff);

    let row = conn
        .query_row(
            queries::LATEST_MESSAGE_IN_WINDOW,
            [cutoff_cocoa],
            |row| {
                Ok((
                    row.get::<_, Option<String>>(0)?,  // text
                    row.get::<_, Option<Vec<u8>>>(1)?, // attributedBody
                    row.get::<_, i64>(2)?,             // date
                ))
            },
        )
        .optional()?;

    let Some((text, attributed_body, date)) = row else {
        debug!(cutoff = %cutoff, "no message in window");
        return Ok(None);
    };

    let text = message_text(text, attributed_body.as_deref());
    // Only dates past i64 nanoseconds overflow chrono; treat them as now.
    let timestamp = queries::cocoa_to_datetime(date).unwrap_or(now);

    Ok(Some(Message { text, timestamp }))
}

/// Body from the `text` column, else from the `attributedBody` blob.
fn message_text(text: Option<String>, attributed_body: Option<&[u8]>) -> String {
    match text {
        Some(t) if !t.is_empty() => t,
        _ => attributed_body
            .and_then(blob_parser::extract_text_from_blob)
            .unwrap_or_default(),
    }
}
