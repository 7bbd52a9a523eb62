//! # Error Types
//!
//! Domain-specific error types for basket-core.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                      Error Propagation                              │
//! │                                                                     │
//! │  StoreError (session backend)                                       │
//! │       │                                                             │
//! │       ▼                                                             │
//! │  CartError (this module) ← adds the cart-level failure classes      │
//! │       │                                                             │
//! │       ▼                                                             │
//! │  Host maps to its own error surface (HTTP status, UI message, …)    │
//! │                                                                     │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (product id, modification id)
//! 3. Errors are enum variants, never String
//! 4. No operation is retried internally; store failures propagate as-is

use thiserror::Error;

use crate::session::StoreError;

// =============================================================================
// Cart Error
// =============================================================================

/// Cart operation errors.
///
/// These errors represent lookup failures, snapshot corruption, or
/// propagated session-store failures. They should be caught by the host
/// and translated to user-facing messages.
#[derive(Debug, Error)]
pub enum CartError {
    /// The (product, modification) pair is not in the cart.
    ///
    /// ## When This Occurs
    /// - Removing an entry that was never added
    /// - Removing an entry twice
    #[error("no cart entry for product '{product_id}' with modification '{modification_id}'")]
    ItemNotFound {
        product_id: String,
        modification_id: String,
    },

    /// A persisted snapshot could not be decoded.
    ///
    /// ## When This Occurs
    /// - The session slot holds a blob written by something else
    /// - The blob was truncated or hand-edited
    ///
    /// The cart's item store is left untouched when this fires; a failed
    /// decode never produces a partially-populated cart.
    #[error("cart snapshot is corrupt or incompatible: {0}")]
    Deserialization(#[from] serde_json::Error),

    /// A snapshot was produced by an incompatible envelope layout.
    #[error("cart snapshot version {found} is not supported (expected {expected})")]
    SnapshotVersion { found: u32, expected: u32 },

    /// The session store failed; the underlying error is unmodified.
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl CartError {
    /// Creates an ItemNotFound error for a (product, modification) pair.
    pub fn not_found(product_id: impl Into<String>, modification_id: impl Into<String>) -> Self {
        CartError::ItemNotFound {
            product_id: product_id.into(),
            modification_id: modification_id.into(),
        }
    }
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CartError.
pub type CartResult<T> = Result<T, CartError>;

// =============================================================================
// Unit Tests
// =============================================================================
