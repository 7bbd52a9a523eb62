//! # basket-session: Session Storage Layer for Basket
//!
//! File-backed implementation of basket-core's `SessionStore` contract.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                      Basket Data Flow                               │
//! │                                                                     │
//! │  Cart mutation (add / update / remove)                              │
//! │       │                                                             │
//! │       ▼                                                             │
//! │  ┌───────────────────────────────────────────────────────────────┐ │
//! │  │                basket-session (THIS CRATE)                    │ │
//! │  │                                                               │ │
//! │  │   FileStore ── one JSON record per file ── storage key slots  │ │
//! │  │                                                               │ │
//! │  └───────────────────────────────────────────────────────────────┘ │
//! │       │                                                             │
//! │       ▼                                                             │
//! │  session file on disk (survives process restarts)                   │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use basket_core::Cart;
//! use basket_session::FileStore;
//!
//! let store = FileStore::new("./session/cart.json");
//! let mut cart = Cart::new(store)?;   // rehydrates from disk
//! cart.add(product, "size-m", 1)?;    // flushed back to disk
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod file;

// =============================================================================
// Re-exports
// =============================================================================

pub use file::FileStore;
