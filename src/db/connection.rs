//! SQLite connection management for Messages.db.
//!
//! CHANGELOG:
//! - 10/18/2026 - Report stat failures as access errors
//! - 10/18/2026 - Configurable path, typed errors
//! - 10/18/2026 - Initial read-only open

use rusqlite::{Connection, OpenFlags};
use std::path::{Path, PathBuf};

use crate::error::StoreError;

/// Default Messages.db path.
pub fn default_db_path() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("Library")
        .join("Messages")
        .join("chat.db")
}

/// Open a read-only connection. Closed when the returned value is dropped.
pub fn open_db(path: &Path) -> Result<Connection, StoreError> {
    // `exists()` folds permission errors (no Full Disk Access) into "missing".
    match path.try_exists() {
        Ok(true) => {}
        Ok(false) => {
            return Err(StoreError::NotFound {
                path: path.to_path_buf(),
            })
        }
        Err(source) => {
            return Err(StoreError::Access {
                path: path.to_path_buf(),
                source,
            })
        }
    }

    Connection::open_with_flags(
        path,
        OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
    )
    .map_err(|source| StoreError::Open {
        path: path.to_path_buf(),
        source,
    })
}
