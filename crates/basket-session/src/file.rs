//! # File Store
//!
//! A `SessionStore` keeping its slots in a single JSON file.
//!
//! ## Record Layout
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │  session file (JSON object)                                         │
//! │                                                                     │
//! │  {                                                                  │
//! │    "Cart":          "<snapshot blob>",                              │
//! │    "wishlist.cart": "<snapshot blob>"                               │
//! │  }                                                                  │
//! │                                                                     │
//! │  One file holds every storage key a host uses; each cart only       │
//! │  touches its own slot.                                              │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! A missing file reads as an empty record (fresh session). Non-JSON
//! content fails with `StoreError::Corrupt` rather than being silently
//! replaced; recovering a damaged session file is a host decision.

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::PathBuf;

use tracing::debug;

use basket_core::session::{SessionStore, StoreError, StoreResult};

// =============================================================================
// File Store
// =============================================================================

/// File-backed session store.
///
/// ## Durability Model
/// Every `set` rewrites the whole record; the record is re-read before
/// each operation so several stores may point at one file within a
/// single-process host. There is no cross-process locking; one process
/// owns a session file at a time, matching the one-cart-per-session
/// confinement the cart itself requires.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    /// Creates a store over the given session file path.
    ///
    /// The file is not created until the first `set`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        FileStore { path: path.into() }
    }

    /// The session file this store reads and writes.
    pub fn path(&self) -> &PathBuf {
        &self.path
    }

    fn read_record(&self) -> StoreResult<HashMap<String, String>> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            // Fresh session: nothing was ever flushed
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(HashMap::new()),
            Err(err) => return Err(StoreError::Io(err)),
        };

        serde_json::from_str(&raw).map_err(|err| {
            StoreError::Corrupt(format!(
                "session file {} is not a valid record: {err}",
                self.path.display()
            ))
        })
    }
}

impl SessionStore for FileStore {
    fn get(&self, key: &str) -> StoreResult<Option<String>> {
        let mut record = self.read_record()?;
        Ok(record.remove(key))
    }

    fn set(&mut self, key: &str, blob: String) -> StoreResult<()> {
        let mut record = self.read_record()?;
        record.insert(key.to_string(), blob);

        let raw = serde_json::to_string(&record)
            .map_err(|err| StoreError::Backend(format!("session record encode failed: {err}")))?;
        fs::write(&self.path, raw)?;

        debug!(path = %self.path.display(), key, "session record flushed");
        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
