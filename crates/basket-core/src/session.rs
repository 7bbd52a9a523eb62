//! # Session Store Contract
//!
//! The persistence seam between a cart and whatever keeps session state
//! alive between requests.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                    Session Store Seam                               │
//! │                                                                     │
//! │  Cart ──► serialized snapshot ──► SessionStore::set(key, blob)     │
//! │  Cart ◄── decoded snapshot    ◄── SessionStore::get(key)           │
//! │                                                                     │
//! │  Implementations:                                                   │
//! │  • MemoryStore (this crate)  - shared in-process slots              │
//! │  • FileStore (basket-session) - JSON record on disk                 │
//! │  • Host-provided             - web session, Redis, …                │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The cart writes a single configurable key and only ever feeds a store
//! blobs produced by its own serializer. Store failures are fatal to the
//! current operation and propagate to the caller unmodified.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use thiserror::Error;

// =============================================================================
// Store Error
// =============================================================================

/// Session store failures.
///
/// Backends wrap their native failures in these variants; the cart
/// forwards them without retrying.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Reading or writing the backing medium failed.
    #[error("session I/O failed: {0}")]
    Io(#[from] std::io::Error),

    /// The backing record exists but cannot be understood.
    ///
    /// ## When This Occurs
    /// - A session file holds non-JSON content
    /// - The record was written by an incompatible version
    #[error("session record is corrupt: {0}")]
    Corrupt(String),

    /// The backend itself failed (lock poisoning, remote rejection, …).
    #[error("session backend failed: {0}")]
    Backend(String),
}

/// Result type for session store operations.
pub type StoreResult<T> = Result<T, StoreError>;

// =============================================================================
// Session Store Trait
// =============================================================================

/// A key-value blob store holding serialized cart snapshots.
///
/// ## Contract
/// - `get` returns the blob previously written under `key`, or `None`
///   if nothing was ever written there
/// - `set` replaces the blob under `key`
/// - keys are opaque to the store; the cart derives them from its
///   configuration
///
/// ## Blocking
/// Both operations are direct, blocking, in-process calls. An async
/// backend must be bridged by the host before it reaches the cart.
pub trait SessionStore {
    /// Reads the blob stored under `key`, if any.
    fn get(&self, key: &str) -> StoreResult<Option<String>>;

    /// Writes `blob` under `key`, replacing any previous value.
    fn set(&mut self, key: &str, blob: String) -> StoreResult<()>;
}

// =============================================================================
// Memory Store
// =============================================================================

/// In-process session store backed by shared slots.
///
/// ## Shared Handles
/// Cloning a `MemoryStore` yields another handle onto the same slots, so
/// a host (or a test) can keep a handle while a cart owns one:
///
/// ```rust
/// use basket_core::session::{MemoryStore, SessionStore};
///
/// let mut store = MemoryStore::new();
/// let observer = store.clone();
///
/// store.set("Cart", "{}".to_string()).unwrap();
/// assert_eq!(observer.get("Cart").unwrap().as_deref(), Some("{}"));
/// ```
///
/// The interior mutex exists so multiple handles may share slots, not to
/// support concurrent mutation of one cart. A poisoned lock surfaces as
/// `StoreError::Backend` rather than a panic.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    slots: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if no key has ever been written.
    pub fn is_empty(&self) -> StoreResult<bool> {
        let slots = self
            .slots
            .lock()
            .map_err(|_| StoreError::Backend("memory store mutex poisoned".to_string()))?;
        Ok(slots.is_empty())
    }
}

impl SessionStore for MemoryStore {
    fn get(&self, key: &str) -> StoreResult<Option<String>> {
        let slots = self
            .slots
            .lock()
            .map_err(|_| StoreError::Backend("memory store mutex poisoned".to_string()))?;
        Ok(slots.get(key).cloned())
    }

    fn set(&mut self, key: &str, blob: String) -> StoreResult<()> {
        let mut slots = self
            .slots
            .lock()
            .map_err(|_| StoreError::Backend("memory store mutex poisoned".to_string()))?;
        slots.insert(key.to_string(), blob);
        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
