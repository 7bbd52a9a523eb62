//! # Product Capabilities
//!
//! The traits a product representation must satisfy to ride in a cart,
//! plus the default cost computation.
//!
//! ## Identity
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │              (product id, modification id) = identity               │
//! │                                                                     │
//! │  "SKU-42" + "size-m"  ──► one cart entry                            │
//! │  "SKU-42" + "size-xl" ──► a different cart entry                    │
//! │                                                                     │
//! │  The same product in two sizes occupies two lines; quantity         │
//! │  accumulation only ever happens within one identity pair.           │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Products are created by the host (catalog rows, API payloads, …) and
//! adopted by the cart on `add`. The cart stamps the modification id and
//! mutates the quantity in place; everything else on the product is the
//! host's business.

use crate::events::{CostCalculation, CostHooks};
use crate::money::Money;

// =============================================================================
// Capability Traits
// =============================================================================

/// A line item the cart can adopt.
///
/// Implementors must also be `serde::Serialize` + `DeserializeOwned` to
/// travel in snapshots; the cart's impl blocks carry those bounds so the
/// trait itself stays minimal.
pub trait CartProduct {
    /// Stable product identifier. Half of the entry's identity key.
    fn id(&self) -> &str;

    /// The modification this entry was stored under. The other half of
    /// the identity key; stamped by the cart on insert.
    fn modification_id(&self) -> &str;

    /// Stamps the modification identity on the product.
    fn set_modification(&mut self, modification_id: &str);

    /// Units of this entry currently in the cart.
    fn quantity(&self) -> i64;

    /// Replaces the quantity. Called by the cart only.
    fn set_quantity(&mut self, quantity: i64);

    /// Unit price in minor currency units.
    fn price(&self) -> Money;

    /// This entry's cost contribution: price × quantity.
    ///
    /// The default runs no observers; implementations that want
    /// observer-adjustable item costs call [`itemized_cost`] with their
    /// own hooks instead. When `with_discount` is requested the result
    /// is floored at zero, matching the observer-driven path.
    fn cost(&self, with_discount: bool) -> Money {
        let base = self.price().multiply_quantity(self.quantity());
        if with_discount {
            base.less_discount(Money::zero())
        } else {
            base
        }
    }
}

/// A product variant (size, color, …) supplying the modification half of
/// the identity key.
pub trait CartModification {
    fn id(&self) -> &str;
}

/// Plain strings work as modification references.
impl CartModification for str {
    fn id(&self) -> &str {
        self
    }
}

impl CartModification for String {
    fn id(&self) -> &str {
        self
    }
}

// =============================================================================
// Observer-Adjustable Item Cost
// =============================================================================

/// Computes an item's cost, routing an item-scoped cost event through
/// `hooks` so observers can grant a discount.
///
/// Base cost is `price × quantity`. Observers always run; the discount
/// is applied (and the result floored at zero) only when `with_discount`
/// is true.
///
/// ## Example
/// ```rust,ignore
/// let mut hooks = CostHooks::new();
/// hooks.subscribe(|calc| calc.add_discount(Money::from_cents(50)));
///
/// let discounted = itemized_cost(&item, &mut hooks, true);
/// ```
pub fn itemized_cost<I>(item: &I, hooks: &mut CostHooks, with_discount: bool) -> Money
where
    I: CartProduct + ?Sized,
{
    let base = item.price().multiply_quantity(item.quantity());
    let mut event = CostCalculation::for_item(item.id(), item.modification_id(), base);
    hooks.dispatch(&mut event);
    if with_discount {
        event.discounted_total()
    } else {
        base
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
