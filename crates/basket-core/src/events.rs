//! # Cart Events
//!
//! Observer registry for cart mutations and cost calculation.
//!
//! ## Dispatch Model
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                     Event Dispatch Flow                             │
//! │                                                                     │
//! │  cart.add(...)                                                      │
//! │       │                                                             │
//! │       ├──► emit(ProductAdd)  ──► handlers registered for the topic  │
//! │       └──► emit(CartChange)  ──► handlers registered for the topic  │
//! │                                                                     │
//! │  cart.cost(...)                                                     │
//! │       └──► emit_cost(CostCalculation) ──► cost observers mutate     │
//! │                                           discount_value inline     │
//! │                                                                     │
//! │  Dispatch is synchronous: observers run on the calling thread       │
//! │  before the triggering call returns.                                │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The cart owns its registry; nothing is inherited from a framework and
//! no ambient bus is consulted. Observers must not re-enter the cart's
//! mutating methods while a dispatch is in flight (the borrow rules make
//! this a compile error for safe code).

use std::collections::HashMap;
use std::fmt;

use crate::money::Money;

// =============================================================================
// Topics and Actions
// =============================================================================

/// Subscription topics for cart action observers.
///
/// `CartChange` fires on every mutation in addition to the specific
/// topic, so a single subscription can watch the whole cart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CartTopic {
    /// A product was put into the cart (fresh insert or accumulation).
    ProductAdd,
    /// A product's quantity was replaced.
    ProductUpdate,
    /// A product is about to be removed; fires before the removal so
    /// observers can still read the doomed item.
    BeforeProductRemove,
    /// Any cart mutation: add, update, remove, remove-all.
    CartChange,
}

/// The action a dispatched event describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CartAction {
    Add,
    Update,
    BeforeRemove,
    RemoveAll,
}

/// Payload handed to action observers.
///
/// `product` is the affected line item, or `None` for whole-cart actions
/// (`RemoveAll`). For `BeforeRemove` the item is still in the cart when
/// observers run.
#[derive(Debug)]
pub struct CartActionEvent<'a, I> {
    pub action: CartAction,
    pub product: Option<&'a I>,
}

// =============================================================================
// Cost Calculation
// =============================================================================

/// Identifies which computation a cost event belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CostScope {
    /// The cart-level total.
    Cart,
    /// A single line item's cost.
    Item {
        product_id: String,
        modification_id: String,
    },
}

/// Mutable payload of a cost-calculation event.
///
/// Observers read `base_cost` and raise `discount_value`; the caller
/// applies the discount only when it was requested. Observers always run,
/// even when the discount will be discarded, so they must not treat an
/// invocation as proof that the discount took effect.
#[derive(Debug, Clone)]
pub struct CostCalculation {
    pub scope: CostScope,
    pub base_cost: Money,
    pub discount_value: Money,
}

impl CostCalculation {
    /// Creates a cart-scoped cost event with no discount.
    pub fn for_cart(base_cost: Money) -> Self {
        CostCalculation {
            scope: CostScope::Cart,
            base_cost,
            discount_value: Money::zero(),
        }
    }

    /// Creates an item-scoped cost event with no discount.
    pub fn for_item(
        product_id: impl Into<String>,
        modification_id: impl Into<String>,
        base_cost: Money,
    ) -> Self {
        CostCalculation {
            scope: CostScope::Item {
                product_id: product_id.into(),
                modification_id: modification_id.into(),
            },
            base_cost,
            discount_value: Money::zero(),
        }
    }

    /// Adds to the accumulated discount. Multiple observers stack.
    pub fn add_discount(&mut self, amount: Money) {
        self.discount_value += amount;
    }

    /// The base cost less the accumulated discount, floored at zero.
    pub fn discounted_total(&self) -> Money {
        self.base_cost.less_discount(self.discount_value)
    }
}

// =============================================================================
// Handler Storage
// =============================================================================

type ActionHandler<I> = Box<dyn for<'a> FnMut(&CartActionEvent<'a, I>)>;
type CostHandler = Box<dyn FnMut(&mut CostCalculation)>;

/// Registry of cost-calculation observers.
///
/// Kept separate from the action registry so item implementations can
/// run their own cost observers (see `product::itemized_cost`) without
/// dragging in the item-typed half of the machinery.
#[derive(Default)]
pub struct CostHooks {
    handlers: Vec<CostHandler>,
}

impl CostHooks {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a cost observer. Observers run in registration order.
    pub fn subscribe<F>(&mut self, handler: F)
    where
        F: FnMut(&mut CostCalculation) + 'static,
    {
        self.handlers.push(Box::new(handler));
    }

    pub(crate) fn dispatch(&mut self, event: &mut CostCalculation) {
        for handler in &mut self.handlers {
            handler(event);
        }
    }

    /// Number of registered observers.
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    /// True when no observer is registered.
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

impl fmt::Debug for CostHooks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CostHooks")
            .field("handlers", &self.handlers.len())
            .finish()
    }
}

// =============================================================================
// Cart Events
// =============================================================================

/// The observer registry a cart owns.
///
/// ## Usage
/// ```rust,ignore
/// cart.events().on(CartTopic::CartChange, |event| {
///     println!("cart changed: {:?}", event.action);
/// });
/// cart.events().on_cost_calculation(|calc| {
///     calc.add_discount(Money::from_cents(150));
/// });
/// ```
pub struct CartEvents<I> {
    actions: HashMap<CartTopic, Vec<ActionHandler<I>>>,
    cost: CostHooks,
}

impl<I> CartEvents<I> {
    /// Creates an empty registry.
    pub fn new() -> Self {
        CartEvents {
            actions: HashMap::new(),
            cost: CostHooks::new(),
        }
    }

    /// Registers an action observer for one topic.
    ///
    /// Handlers for a topic run in registration order. To watch every
    /// mutation, subscribe to `CartTopic::CartChange`.
    pub fn on<F>(&mut self, topic: CartTopic, handler: F)
    where
        F: for<'a> FnMut(&CartActionEvent<'a, I>) + 'static,
    {
        self.actions
            .entry(topic)
            .or_default()
            .push(Box::new(handler));
    }

    /// Registers a cost-calculation observer.
    pub fn on_cost_calculation<F>(&mut self, handler: F)
    where
        F: FnMut(&mut CostCalculation) + 'static,
    {
        self.cost.subscribe(handler);
    }

    /// The cost registry, for callers that compute item-level costs.
    pub fn cost_hooks_mut(&mut self) -> &mut CostHooks {
        &mut self.cost
    }

    pub(crate) fn emit(&mut self, topic: CartTopic, event: &CartActionEvent<'_, I>) {
        if let Some(handlers) = self.actions.get_mut(&topic) {
            for handler in handlers {
                handler(event);
            }
        }
    }

    pub(crate) fn emit_cost(&mut self, event: &mut CostCalculation) {
        self.cost.dispatch(event);
    }
}

impl<I> Default for CartEvents<I> {
    fn default() -> Self {
        Self::new()
    }
}

impl<I> fmt::Debug for CartEvents<I> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let action_count: usize = self.actions.values().map(Vec::len).sum();
        f.debug_struct("CartEvents")
            .field("action_handlers", &action_count)
            .field("cost_handlers", &self.cost.len())
            .finish()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
