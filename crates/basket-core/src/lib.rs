//! # basket-core: Pure Cart Logic for Basket
//!
//! This crate is the **heart** of Basket. It contains the whole cart
//! model as pure, synchronous code with zero file or network I/O.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                       Basket Architecture                           │
//! │                                                                     │
//! │  ┌───────────────────────────────────────────────────────────────┐ │
//! │  │                      Host Application                         │ │
//! │  │     request handler ──► cart per session ──► response         │ │
//! │  └──────────────────────────────┬────────────────────────────────┘ │
//! │                                 │                                   │
//! │  ┌──────────────────────────────▼────────────────────────────────┐ │
//! │  │              ★ basket-core (THIS CRATE) ★                     │ │
//! │  │                                                               │ │
//! │  │  ┌─────────┐ ┌─────────┐ ┌─────────┐ ┌─────────┐ ┌────────┐ │ │
//! │  │  │  money  │ │ product │ │  cart   │ │ events  │ │session │ │ │
//! │  │  │  Money  │ │ traits  │ │  Cart   │ │ registry│ │ trait  │ │ │
//! │  │  └─────────┘ └─────────┘ └─────────┘ └─────────┘ └────────┘ │ │
//! │  │                                                               │ │
//! │  │  NO FILE I/O • NO NETWORK • NO ASYNC • SYNCHRONOUS CALLS     │ │
//! │  └──────────────────────────────┬────────────────────────────────┘ │
//! │                                 │                                   │
//! │  ┌──────────────────────────────▼────────────────────────────────┐ │
//! │  │             basket-session (Storage Layer)                    │ │
//! │  │          file-backed SessionStore implementation              │ │
//! │  └───────────────────────────────────────────────────────────────┘ │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`cart`] - The cart itself: item store, mutations, cost, snapshots
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`product`] - Capability traits products implement to ride in a cart
//! - [`events`] - Observer registry for mutations and cost calculation
//! - [`session`] - Session store contract plus the in-memory store
//! - [`error`] - Domain error types
//!
//! ## Design Principles
//!
//! 1. **Explicit wiring**: the session store is injected at construction,
//!    never looked up from ambient state
//! 2. **Synchronous dispatch**: observers run inline before the mutating
//!    call returns
//! 3. **Integer money**: all monetary values are cents (i64)
//! 4. **Typed errors**: all failures are enum variants, never strings or
//!    panics
//!
//! ## Example Usage
//!
//! ```rust,ignore
//! use basket_core::{Cart, MemoryStore, Money};
//!
//! let mut cart = Cart::new(MemoryStore::new())?;
//!
//! cart.events().on_cost_calculation(|calc| {
//!     calc.add_discount(Money::from_cents(150));
//! });
//!
//! cart.add(product, "size-m", 2)?;
//! let total = cart.cost(true);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod cart;
pub mod error;
pub mod events;
pub mod money;
pub mod product;
pub mod session;

// =============================================================================
// Re-exports for Convenience
// =============================================================================
// These allow users to do `use basket_core::Cart` instead of
// `use basket_core::cart::Cart`

pub use cart::{Cart, CartConfig};
pub use error::{CartError, CartResult};
pub use events::{
    CartAction, CartActionEvent, CartEvents, CartTopic, CostCalculation, CostHooks, CostScope,
};
pub use money::Money;
pub use product::{itemized_cost, CartModification, CartProduct};
pub use session::{MemoryStore, SessionStore, StoreError, StoreResult};

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Session slot a cart uses when no storage key is configured.
///
/// ## Why a constant?
/// Hosts running one cart per session never think about keys; hosts
/// running several carts (wishlist, quote, basket) override per cart via
/// `CartConfig::storage_key`.
pub const DEFAULT_STORAGE_KEY: &str = "Cart";

/// Snapshot envelope version accepted by `Cart::set_serialized`.
///
/// Bumped when the envelope layout changes shape; decode rejects any
/// other version instead of guessing at field meanings.
pub const SNAPSHOT_VERSION: u32 = 1;
