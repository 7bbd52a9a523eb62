//! # Cart
//!
//! The shopping cart: a two-level item store with observer events and
//! session persistence.
//!
//! ## Cart Operations Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                      Cart Operations                                │
//! │                                                                     │
//! │  Host Action               Cart Method            Store Change      │
//! │  ───────────               ───────────            ────────────      │
//! │                                                                     │
//! │  Put product ────────────► add() ───────────────► qty += n          │
//! │                                                    (or fresh entry) │
//! │  Change quantity ────────► update() ────────────► qty = n           │
//! │                                                    (≤0 removes)     │
//! │  Remove line ────────────► remove() ────────────► entry dropped     │
//! │                                                                     │
//! │  Empty cart ─────────────► remove_all() ────────► store cleared     │
//! │                                                                     │
//! │  Every mutation: fire events, then flush to the session store       │
//! │  when auto-persist is on.                                           │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Item Store Shape
//! Items live in `BTreeMap<product_id, BTreeMap<modification_id, I>>`.
//! Key order makes iteration deterministic across runs for equal key
//! sets, which is what the state hash depends on. No inner map is ever
//! left empty: dropping the last modification drops the product key.
//!
//! ## Request Scoping
//! One cart per logical session at a time. Construction rehydrates from
//! the injected store (when auto-persist is on); each mutation flushes
//! back. Observers run inline on the calling thread.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::debug;

use crate::error::{CartError, CartResult};
use crate::events::{CartAction, CartActionEvent, CartEvents, CartTopic, CostCalculation};
use crate::money::Money;
use crate::product::{CartModification, CartProduct};
use crate::session::SessionStore;
use crate::{DEFAULT_STORAGE_KEY, SNAPSHOT_VERSION};

// =============================================================================
// Configuration
// =============================================================================

/// Cart configuration.
///
/// ## Example
/// ```rust,ignore
/// let config = CartConfig::new()
///     .storage_key("checkout.cart")
///     .auto_persist(false);
/// let cart = Cart::with_config(store, config)?;
/// ```
#[derive(Debug, Clone)]
pub struct CartConfig {
    /// When true (default) the cart loads itself from the session store
    /// at construction and flushes after every mutation. When false the
    /// host drives `load_from_session`/`save_to_session` itself.
    pub auto_persist: bool,

    /// Session slot the cart reads and writes.
    /// Default: `"Cart"`.
    pub storage_key: String,
}

impl CartConfig {
    /// Creates the default configuration.
    pub fn new() -> Self {
        CartConfig {
            auto_persist: true,
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
        }
    }

    /// Sets whether the cart persists automatically.
    pub fn auto_persist(mut self, enabled: bool) -> Self {
        self.auto_persist = enabled;
        self
    }

    /// Sets the session slot the cart uses.
    pub fn storage_key(mut self, key: impl Into<String>) -> Self {
        self.storage_key = key.into();
        self
    }
}

impl Default for CartConfig {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Snapshot Envelope
// =============================================================================

type ItemStore<I> = BTreeMap<String, BTreeMap<String, I>>;

/// Borrowing half of the snapshot envelope, used on the encode path so
/// the item store is not cloned per flush.
#[derive(Serialize)]
struct SnapshotRef<'a, I> {
    version: u32,
    saved_at: DateTime<Utc>,
    items: &'a ItemStore<I>,
}

#[derive(Deserialize)]
struct Snapshot<I> {
    version: u32,
    saved_at: DateTime<Utc>,
    items: ItemStore<I>,
}

// =============================================================================
// Cart
// =============================================================================

/// The shopping cart.
///
/// ## Invariants
/// - `(product id, modification id)` identifies at most one entry
/// - `update` with quantity ≤ 0 removes the entry; `add` never removes
///   (a negative `add` decrements and may leave a negative quantity;
///   hosts that want the removal rule go through `update`)
/// - dropping the last modification under a product drops the product key
///
/// ## Type Parameters
/// - `I`: the host's product representation; must be serde-capable so it
///   can travel in snapshots
/// - `S`: the session store the cart persists through
#[derive(Debug)]
pub struct Cart<I, S> {
    items: ItemStore<I>,
    events: CartEvents<I>,
    store: S,
    config: CartConfig,
}

impl<I, S> Cart<I, S>
where
    I: CartProduct + Serialize + DeserializeOwned,
    S: SessionStore,
{
    /// Creates a cart with the default configuration, rehydrating any
    /// snapshot already in the store.
    pub fn new(store: S) -> CartResult<Self> {
        Self::with_config(store, CartConfig::default())
    }

    /// Creates a cart with an explicit configuration.
    ///
    /// ## Behavior
    /// With auto-persist on, a snapshot already sitting under the
    /// configured storage key is decoded into the cart before this
    /// returns; a corrupt snapshot fails construction rather than
    /// producing a silently empty cart.
    pub fn with_config(store: S, config: CartConfig) -> CartResult<Self> {
        let mut cart = Cart {
            items: BTreeMap::new(),
            events: CartEvents::new(),
            store,
            config,
        };
        if cart.config.auto_persist {
            cart.load_from_session()?;
        }
        Ok(cart)
    }

    /// The active configuration.
    pub fn config(&self) -> &CartConfig {
        &self.config
    }

    /// The observer registry. Subscribe here before mutating.
    pub fn events(&mut self) -> &mut CartEvents<I> {
        &mut self.events
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    /// Puts a product into the cart.
    ///
    /// ## Behavior
    /// - entry already present: the quantity argument is **added** to the
    ///   existing quantity and the modification id is re-stamped; the
    ///   incoming product object is discarded
    /// - fresh entry: the quantity is set on the product, the
    ///   modification id stamped, and the product adopted into the store
    /// - quantity may be any integer; a negative value decrements. No
    ///   removal happens here even if the result is ≤ 0; only `update`
    ///   enforces that rule
    ///
    /// Fires `ProductAdd` then `CartChange` with the resulting entry,
    /// then persists when auto-persist is on.
    pub fn add<M>(&mut self, mut product: I, modification: &M, quantity: i64) -> CartResult<()>
    where
        M: CartModification + ?Sized,
    {
        let product_id = product.id().to_string();
        let modification_id = modification.id().to_string();

        if let Some(existing) = self
            .items
            .get_mut(&product_id)
            .and_then(|mods| mods.get_mut(&modification_id))
        {
            existing.set_quantity(existing.quantity() + quantity);
            existing.set_modification(&modification_id);
        } else {
            product.set_quantity(quantity);
            product.set_modification(&modification_id);
            self.items
                .entry(product_id.clone())
                .or_default()
                .insert(modification_id.clone(), product);
        }

        debug!(
            product_id = %product_id,
            modification_id = %modification_id,
            quantity,
            "product added to cart"
        );
        self.emit_for(
            &product_id,
            &modification_id,
            CartTopic::ProductAdd,
            CartAction::Add,
        );
        self.persist_if_enabled()
    }

    /// Replaces an entry's quantity.
    ///
    /// ## Behavior
    /// - quantity ≤ 0: delegates to `remove`; only remove's events fire
    /// - entry present: quantity is **replaced** (not added)
    /// - entry missing: behaves like a fresh insert with the given
    ///   quantity
    ///
    /// Fires `ProductUpdate` then `CartChange`, then persists.
    pub fn update<M>(&mut self, product: I, modification: &M, quantity: i64) -> CartResult<()>
    where
        M: CartModification + ?Sized,
    {
        if quantity <= 0 {
            return self.remove(&product, modification);
        }

        let product_id = product.id().to_string();
        let modification_id = modification.id().to_string();

        if let Some(existing) = self
            .items
            .get_mut(&product_id)
            .and_then(|mods| mods.get_mut(&modification_id))
        {
            existing.set_quantity(quantity);
        } else {
            let mut product = product;
            product.set_quantity(quantity);
            product.set_modification(&modification_id);
            self.items
                .entry(product_id.clone())
                .or_default()
                .insert(modification_id.clone(), product);
        }

        debug!(
            product_id = %product_id,
            modification_id = %modification_id,
            quantity,
            "cart quantity updated"
        );
        self.emit_for(
            &product_id,
            &modification_id,
            CartTopic::ProductUpdate,
            CartAction::Update,
        );
        self.persist_if_enabled()
    }

    /// Removes the entry for a product and modification.
    ///
    /// Fails with `CartError::ItemNotFound` when the pair is not in the
    /// cart; nothing fires and nothing persists on that path.
    pub fn remove<M>(&mut self, product: &I, modification: &M) -> CartResult<()>
    where
        M: CartModification + ?Sized,
    {
        self.remove_by_id(product.id(), modification.id())
    }

    /// Removes an entry by its identity key.
    ///
    /// ## Behavior
    /// Fires `BeforeProductRemove` then `CartChange` **before** the
    /// removal, so observers can still read the doomed entry. Dropping
    /// the last modification under a product drops the product key too.
    pub fn remove_by_id(&mut self, product_id: &str, modification_id: &str) -> CartResult<()> {
        if !self.has_product(product_id, modification_id) {
            return Err(CartError::not_found(product_id, modification_id));
        }

        self.emit_for(
            product_id,
            modification_id,
            CartTopic::BeforeProductRemove,
            CartAction::BeforeRemove,
        );

        if let Some(mods) = self.items.get_mut(product_id) {
            mods.remove(modification_id);
            if mods.is_empty() {
                self.items.remove(product_id);
            }
        }

        debug!(
            product_id = %product_id,
            modification_id = %modification_id,
            "product removed from cart"
        );
        self.persist_if_enabled()
    }

    /// Removes every entry.
    ///
    /// Fires a single `CartChange` with no item payload, then persists.
    pub fn remove_all(&mut self) -> CartResult<()> {
        self.items.clear();

        let event = CartActionEvent {
            action: CartAction::RemoveAll,
            product: None,
        };
        self.events.emit(CartTopic::CartChange, &event);

        debug!("cart cleared");
        self.persist_if_enabled()
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// Returns the entry for a product and modification, if present.
    pub fn product_by_id(&self, product_id: &str, modification_id: &str) -> Option<&I> {
        self.items
            .get(product_id)
            .and_then(|mods| mods.get(modification_id))
    }

    /// Checks whether an entry exists for the pair.
    pub fn has_product(&self, product_id: &str, modification_id: &str) -> bool {
        self.product_by_id(product_id, modification_id).is_some()
    }

    /// All entries, flattened in product-then-modification key order.
    pub fn items(&self) -> Vec<&I> {
        self.items.values().flat_map(|mods| mods.values()).collect()
    }

    /// True when the cart holds no entries.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Total quantity across all entries.
    pub fn count(&self) -> i64 {
        self.items
            .values()
            .flat_map(|mods| mods.values())
            .map(|item| item.quantity())
            .sum()
    }

    /// Pure sum of per-item costs; fires no events.
    ///
    /// Both readings of the per-item toggle are exposed: `false` sums the
    /// raw price × quantity contributions, `true` asks each item for its
    /// own discounted cost. `cost()` builds on the `false` reading;
    /// cart-level observers own all discounting there, so summing
    /// already-discounted item costs would apply item discounts twice.
    pub fn base_cost(&self, with_item_discount: bool) -> Money {
        self.items
            .values()
            .flat_map(|mods| mods.values())
            .fold(Money::zero(), |total, item| {
                total + item.cost(with_item_discount)
            })
    }

    /// Total cart cost with observer-adjustable discount.
    ///
    /// ## Behavior
    /// The cart-scoped `CostCalculation` event fires **unconditionally**;
    /// observers may raise `discount_value` on it. When `with_discount`
    /// is true the result is `max(0, base − discount)`; when false the
    /// unmodified base is returned and the observers' work is discarded.
    pub fn cost(&mut self, with_discount: bool) -> Money {
        let base = self.base_cost(false);

        let mut calc = CostCalculation::for_cart(base);
        self.events.emit_cost(&mut calc);

        if with_discount {
            calc.discounted_total()
        } else {
            base
        }
    }

    /// Stable digest of the cart state.
    ///
    /// Hashes the ordered (id, modification id, quantity, price) tuples,
    /// so two carts with the same entries hash equally no matter what
    /// call sequence built them, and any quantity or price change shows
    /// up. Useful for cheap changed-since-snapshot checks.
    pub fn hash(&self) -> String {
        let mut hasher = Sha256::new();
        for item in self.items.values().flat_map(|mods| mods.values()) {
            // NUL separators keep adjacent string fields from running together
            hasher.update(item.id().as_bytes());
            hasher.update([0u8]);
            hasher.update(item.modification_id().as_bytes());
            hasher.update([0u8]);
            hasher.update(item.quantity().to_le_bytes());
            hasher.update(item.price().cents().to_le_bytes());
        }
        hex::encode(hasher.finalize())
    }

    // =========================================================================
    // Snapshots & Session Bridge
    // =========================================================================

    /// Encodes the full item store as an opaque snapshot blob.
    pub fn serialized(&self) -> CartResult<String> {
        let snapshot = SnapshotRef {
            version: SNAPSHOT_VERSION,
            saved_at: Utc::now(),
            items: &self.items,
        };
        Ok(serde_json::to_string(&snapshot)?)
    }

    /// Replaces the item store from a snapshot blob.
    ///
    /// ## Behavior
    /// The blob is fully decoded and version-checked before the store is
    /// touched; a failing blob leaves the cart exactly as it was.
    pub fn set_serialized(&mut self, blob: &str) -> CartResult<()> {
        let snapshot: Snapshot<I> = serde_json::from_str(blob)?;
        if snapshot.version != SNAPSHOT_VERSION {
            return Err(CartError::SnapshotVersion {
                found: snapshot.version,
                expected: SNAPSHOT_VERSION,
            });
        }

        debug!(saved_at = %snapshot.saved_at, "cart snapshot decoded");
        self.items = snapshot.items;
        Ok(())
    }

    /// Loads the cart from its session slot. Absent slot is a no-op.
    pub fn load_from_session(&mut self) -> CartResult<()> {
        if let Some(blob) = self.store.get(&self.config.storage_key)? {
            self.set_serialized(&blob)?;
            debug!(storage_key = %self.config.storage_key, "cart loaded from session");
        }
        Ok(())
    }

    /// Flushes the cart to its session slot.
    pub fn save_to_session(&mut self) -> CartResult<()> {
        let blob = self.serialized()?;
        self.store.set(&self.config.storage_key, blob)?;
        debug!(storage_key = %self.config.storage_key, "cart saved to session");
        Ok(())
    }

    // =========================================================================
    // Internals
    // =========================================================================

    /// Emits `topic` then `CartChange` with the entry under the key pair
    /// as payload. Missing entries emit nothing.
    fn emit_for(
        &mut self,
        product_id: &str,
        modification_id: &str,
        topic: CartTopic,
        action: CartAction,
    ) {
        if let Some(item) = self
            .items
            .get(product_id)
            .and_then(|mods| mods.get(modification_id))
        {
            let event = CartActionEvent {
                action,
                product: Some(item),
            };
            self.events.emit(topic, &event);
            self.events.emit(CartTopic::CartChange, &event);
        }
    }

    fn persist_if_enabled(&mut self) -> CartResult<()> {
        if self.config.auto_persist {
            self.save_to_session()?;
        }
        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::MemoryStore;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct TestProduct {
        id: String,
        modification_id: String,
        quantity: i64,
        price_cents: i64,
    }

    impl CartProduct for TestProduct {
        fn id(&self) -> &str {
            &self.id
        }

        fn modification_id(&self) -> &str {
            &self.modification_id
        }

        fn set_modification(&mut self, modification_id: &str) {
            self.modification_id = modification_id.to_string();
        }

        fn quantity(&self) -> i64 {
            self.quantity
        }

        fn set_quantity(&mut self, quantity: i64) {
            self.quantity = quantity;
        }

        fn price(&self) -> Money {
            Money::from_cents(self.price_cents)
        }
    }

    fn test_product(id: &str, price_cents: i64) -> TestProduct {
        TestProduct {
            id: id.to_string(),
            modification_id: String::new(),
            quantity: 0,
            price_cents,
        }
    }

    fn offline_cart() -> Cart<TestProduct, MemoryStore> {
        Cart::with_config(MemoryStore::new(), CartConfig::new().auto_persist(false)).unwrap()
    }

    #[test]
    fn test_add_accumulates_quantity() {
        let mut cart = offline_cart();

        cart.add(test_product("P", 999), "M", 2).unwrap();
        cart.add(test_product("P", 999), "M", 3).unwrap();

        assert_eq!(cart.product_by_id("P", "M").unwrap().quantity, 5);
        assert_eq!(cart.items().len(), 1);
    }

    #[test]
    fn test_add_stamps_modification() {
        let mut cart = offline_cart();
        cart.add(test_product("P", 999), "size-m", 1).unwrap();

        let stored = cart.product_by_id("P", "size-m").unwrap();
        assert_eq!(stored.modification_id, "size-m");
        assert_eq!(stored.quantity, 1);
    }

    #[test]
    fn test_add_negative_decrements_without_removal() {
        let mut cart = offline_cart();
        cart.add(test_product("P", 999), "M", 2).unwrap();
        cart.add(test_product("P", 999), "M", -5).unwrap();

        // add never enforces the ≤0 rule; the entry stays, negative
        assert_eq!(cart.product_by_id("P", "M").unwrap().quantity, -3);
        assert!(cart.has_product("P", "M"));
    }

    #[test]
    fn test_update_replaces_quantity() {
        let mut cart = offline_cart();
        cart.add(test_product("P", 999), "M", 5).unwrap();
        cart.update(test_product("P", 999), "M", 2).unwrap();

        assert_eq!(cart.product_by_id("P", "M").unwrap().quantity, 2);
    }

    #[test]
    fn test_update_zero_removes_entry_and_product_key() {
        let mut cart = offline_cart();
        cart.add(test_product("P", 999), "M", 3).unwrap();
        cart.update(test_product("P", 999), "M", 0).unwrap();

        assert!(!cart.has_product("P", "M"));
        assert!(cart.is_empty());
    }

    #[test]
    fn test_update_missing_inserts() {
        let mut cart = offline_cart();
        cart.update(test_product("P", 500), "M", 4).unwrap();

        let stored = cart.product_by_id("P", "M").unwrap();
        assert_eq!(stored.quantity, 4);
        assert_eq!(stored.modification_id, "M");
    }

    #[test]
    fn test_update_with_current_quantity_is_a_no_op() {
        let mut cart = offline_cart();
        cart.add(test_product("P", 300), "M", 2).unwrap();

        let cost_before = cart.cost(false);
        let count_before = cart.count();

        cart.update(test_product("P", 300), "M", 2).unwrap();

        assert_eq!(cart.cost(false), cost_before);
        assert_eq!(cart.count(), count_before);
    }

    #[test]
    fn test_remove_missing_fails_and_fires_nothing() {
        let mut cart = offline_cart();
        let fired = Rc::new(RefCell::new(0));
        let counter = Rc::clone(&fired);
        cart.events()
            .on(CartTopic::CartChange, move |_| *counter.borrow_mut() += 1);

        let err = cart.remove_by_id("ghost", "none").unwrap_err();
        assert!(matches!(err, CartError::ItemNotFound { .. }));
        assert_eq!(*fired.borrow(), 0);
    }

    #[test]
    fn test_remove_observers_see_doomed_item() {
        let mut cart = offline_cart();
        cart.add(test_product("P", 450), "M", 2).unwrap();

        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        cart.events().on(CartTopic::BeforeProductRemove, move |event| {
            let item = event.product.expect("payload present");
            sink.borrow_mut().push((item.id.clone(), item.quantity));
        });

        cart.remove_by_id("P", "M").unwrap();

        assert_eq!(*seen.borrow(), vec![("P".to_string(), 2)]);
        assert!(!cart.has_product("P", "M"));
    }

    #[test]
    fn test_remove_keeps_sibling_modifications() {
        let mut cart = offline_cart();
        cart.add(test_product("P", 999), "size-m", 1).unwrap();
        cart.add(test_product("P", 999), "size-xl", 1).unwrap();

        cart.remove_by_id("P", "size-m").unwrap();

        assert!(!cart.has_product("P", "size-m"));
        assert!(cart.has_product("P", "size-xl"));
    }

    #[test]
    fn test_remove_all_clears() {
        let mut cart = offline_cart();
        cart.add(test_product("A", 100), "M", 1).unwrap();
        cart.add(test_product("B", 200), "M", 2).unwrap();

        let payloads = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&payloads);
        cart.events().on(CartTopic::CartChange, move |event| {
            sink.borrow_mut()
                .push((event.action, event.product.is_some()));
        });

        cart.remove_all().unwrap();

        assert!(cart.is_empty());
        assert_eq!(cart.count(), 0);
        assert!(cart.items().is_empty());
        // One change event, no item payload
        assert_eq!(*payloads.borrow(), vec![(CartAction::RemoveAll, false)]);
    }

    #[test]
    fn test_add_fires_specific_topic_then_cart_change() {
        let mut cart = offline_cart();
        let order = Rc::new(RefCell::new(Vec::new()));

        let adds = Rc::clone(&order);
        cart.events()
            .on(CartTopic::ProductAdd, move |_| adds.borrow_mut().push("add"));
        let changes = Rc::clone(&order);
        cart.events().on(CartTopic::CartChange, move |_| {
            changes.borrow_mut().push("change")
        });

        cart.add(test_product("P", 100), "M", 1).unwrap();

        assert_eq!(*order.borrow(), vec!["add", "change"]);
    }

    #[test]
    fn test_count_sums_quantities() {
        let mut cart = offline_cart();
        cart.add(test_product("A", 100), "M", 2).unwrap();
        cart.add(test_product("B", 200), "M", 3).unwrap();

        assert_eq!(cart.count(), 5);
    }

    #[test]
    fn test_cost_with_discount_clamps_at_zero() {
        let mut cart = offline_cart();
        cart.add(test_product("P", 10), "M", 1).unwrap();

        cart.events()
            .on_cost_calculation(|calc| calc.add_discount(Money::from_cents(15)));

        assert_eq!(cart.cost(true).cents(), 0);
        assert_eq!(cart.cost(false).cents(), 10);
    }

    #[test]
    fn test_cost_observers_fire_even_without_discount() {
        let mut cart = offline_cart();
        cart.add(test_product("P", 100), "M", 2).unwrap();

        let fired = Rc::new(RefCell::new(0));
        let counter = Rc::clone(&fired);
        cart.events().on_cost_calculation(move |calc| {
            *counter.borrow_mut() += 1;
            calc.add_discount(Money::from_cents(50));
        });

        // The false branch discards the discount but still runs observers
        assert_eq!(cart.cost(false).cents(), 200);
        assert_eq!(*fired.borrow(), 1);
        assert_eq!(cart.cost(true).cents(), 150);
        assert_eq!(*fired.borrow(), 2);
    }

    #[test]
    fn test_base_cost_exposes_both_readings() {
        let mut cart = offline_cart();
        cart.add(test_product("P", 250), "M", 2).unwrap();
        cart.add(test_product("Q", 100), "M", -1).unwrap();

        // Raw sum keeps the negative contribution
        assert_eq!(cart.base_cost(false).cents(), 400);
        // Per-item discounted reading floors each item at zero
        assert_eq!(cart.base_cost(true).cents(), 500);
    }

    #[test]
    fn test_hash_is_stable_across_call_sequences() {
        let mut a = offline_cart();
        a.add(test_product("P", 999), "M", 2).unwrap();
        a.add(test_product("P", 999), "M", 3).unwrap();
        a.add(test_product("Q", 500), "M", 1).unwrap();

        let mut b = offline_cart();
        b.add(test_product("Q", 500), "M", 1).unwrap();
        b.add(test_product("P", 999), "M", 5).unwrap();

        assert_eq!(a.hash(), b.hash());
    }

    #[test]
    fn test_hash_changes_with_quantity_and_price() {
        let mut cart = offline_cart();
        cart.add(test_product("P", 999), "M", 2).unwrap();
        let before = cart.hash();

        cart.update(test_product("P", 999), "M", 3).unwrap();
        let after_quantity = cart.hash();
        assert_ne!(before, after_quantity);

        cart.remove_by_id("P", "M").unwrap();
        cart.add(test_product("P", 998), "M", 3).unwrap();
        assert_ne!(after_quantity, cart.hash());
    }

    #[test]
    fn test_serialization_round_trips() {
        let mut cart = offline_cart();
        cart.add(test_product("P", 999), "size-m", 2).unwrap();
        cart.add(test_product("Q", 500), "size-xl", 1).unwrap();

        let blob = cart.serialized().unwrap();
        let mut restored = offline_cart();
        restored.set_serialized(&blob).unwrap();

        assert_eq!(restored.count(), cart.count());
        assert_eq!(restored.hash(), cart.hash());
        assert_eq!(
            restored.product_by_id("P", "size-m"),
            cart.product_by_id("P", "size-m")
        );
    }

    #[test]
    fn test_corrupt_blob_fails_without_touching_store() {
        let mut cart = offline_cart();
        cart.add(test_product("P", 999), "M", 2).unwrap();

        let err = cart.set_serialized("definitely not json").unwrap_err();
        assert!(matches!(err, CartError::Deserialization(_)));

        // The failed decode left the cart as it was
        assert_eq!(cart.count(), 2);
    }

    #[test]
    fn test_unsupported_snapshot_version_is_rejected() {
        let mut cart = offline_cart();
        let blob = r#"{"version":99,"saved_at":"2024-01-01T00:00:00Z","items":{}}"#;

        let err = cart.set_serialized(blob).unwrap_err();
        assert!(matches!(
            err,
            CartError::SnapshotVersion {
                found: 99,
                expected: SNAPSHOT_VERSION,
            }
        ));
    }

    #[test]
    fn test_auto_persist_rehydrates_second_cart() {
        let store = MemoryStore::new();

        let mut first: Cart<TestProduct, MemoryStore> = Cart::new(store.clone()).unwrap();
        first.add(test_product("P", 999), "M", 2).unwrap();
        first.add(test_product("Q", 500), "M", 1).unwrap();

        let second: Cart<TestProduct, MemoryStore> = Cart::new(store).unwrap();
        assert_eq!(second.count(), 3);
        assert_eq!(second.hash(), first.hash());
    }

    #[test]
    fn test_disabled_auto_persist_leaves_store_untouched() {
        let store = MemoryStore::new();
        let mut cart: Cart<TestProduct, MemoryStore> =
            Cart::with_config(store.clone(), CartConfig::new().auto_persist(false)).unwrap();

        cart.add(test_product("P", 999), "M", 2).unwrap();
        assert!(store.is_empty().unwrap());

        cart.save_to_session().unwrap();
        assert!(!store.is_empty().unwrap());
    }

    #[test]
    fn test_custom_storage_key() {
        let store = MemoryStore::new();
        let config = CartConfig::new().storage_key("kiosk-7.cart");
        let mut cart: Cart<TestProduct, MemoryStore> =
            Cart::with_config(store.clone(), config).unwrap();

        cart.add(test_product("P", 100), "M", 1).unwrap();

        assert!(store.get("kiosk-7.cart").unwrap().is_some());
        assert!(store.get(DEFAULT_STORAGE_KEY).unwrap().is_none());
    }
}
