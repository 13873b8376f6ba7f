//! # Cart Store
//!
//! Session-owned shopping cart. The store is handed by reference to
//! whichever view needs it; views that only observe register a callback
//! with [`CartStore::subscribe`] and re-read on every [`CartEvent`].
//!
//! Quantities are clamped, never rejected:
//! - `add_item` stores `requested` clamped to `[min_order, stock]`
//!   (the minimum wins when stock is below it);
//! - `update_quantity` only enforces the minimum;
//! - `increment` / `decrement` step by one inside `[min_order, stock]`.

use crate::checkout::{BuyerInfo, CheckoutPayload, PayloadItem};
use crate::product::{Product, ProductId, UnitType};
use rust_decimal::Decimal;
use serde::Serialize;
use std::fmt;
use tracing::debug;

/// Clamp `requested` into `[min, max]`; `min` wins if the range is empty
pub fn clamp_quantity(requested: Decimal, min: Decimal, max: Decimal) -> Decimal {
    requested.min(max).max(min)
}

/// Sum that stops at `Decimal::MAX` instead of overflowing
pub(crate) fn saturating_sum(values: impl IntoIterator<Item = Decimal>) -> Decimal {
    values.into_iter().fold(Decimal::ZERO, |acc, value| {
        acc.checked_add(value).unwrap_or(Decimal::MAX)
    })
}

/// One product selected for purchase
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LineItem {
    pub product_id: ProductId,
    pub name: String,
    pub image_url: String,
    #[serde(serialize_with = "rust_decimal::serde::float::serialize")]
    pub price_per_unit: Decimal,
    pub unit_type: UnitType,
    #[serde(serialize_with = "rust_decimal::serde::float::serialize")]
    pub min_order_quantity: Decimal,
    /// Stock reported when the line was last added
    #[serde(serialize_with = "rust_decimal::serde::float::serialize")]
    pub stock: Decimal,
    #[serde(serialize_with = "rust_decimal::serde::float::serialize")]
    pub quantity: Decimal,
}

impl LineItem {
    fn from_product(product: &Product, quantity: Decimal) -> Self {
        Self {
            product_id: product.id,
            name: product.name.clone(),
            image_url: product.image_url.clone(),
            price_per_unit: product.price_per_unit,
            unit_type: product.unit_type,
            min_order_quantity: product.min_order_quantity,
            stock: product.stock,
            quantity,
        }
    }

    /// Price of this line, capped at `Decimal::MAX`
    pub fn total(&self) -> Decimal {
        self.price_per_unit
            .checked_mul(self.quantity)
            .unwrap_or(Decimal::MAX)
    }
}

/// Externally visible cart states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CartState {
    Empty,
    Populated,
}

/// Change notification delivered to subscribers
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CartEvent {
    ItemAdded {
        product_id: ProductId,
        #[serde(serialize_with = "rust_decimal::serde::float::serialize")]
        quantity: Decimal,
    },
    QuantityChanged {
        product_id: ProductId,
        #[serde(serialize_with = "rust_decimal::serde::float::serialize")]
        quantity: Decimal,
    },
    ItemRemoved {
        product_id: ProductId,
    },
    Cleared,
}

/// Handle returned by [`CartStore::subscribe`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

impl SubscriptionId {
    pub fn as_u64(&self) -> u64 {
        self.0
    }

    pub fn from_u64(raw: u64) -> Self {
        SubscriptionId(raw)
    }
}

type Subscriber = Box<dyn Fn(&CartEvent, &CartStore)>;

/// The shopping cart for one browsing session
#[derive(Default)]
pub struct CartStore {
    items: Vec<LineItem>,
    subscribers: Vec<(SubscriptionId, Subscriber)>,
    next_subscription: u64,
}

impl fmt::Debug for CartStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CartStore")
            .field("items", &self.items)
            .field("subscribers", &self.subscribers.len())
            .finish()
    }
}

impl CartStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Put `product` in the cart with `quantity`, clamped to
    /// `[min_order, stock]`. An existing line is rebuilt from `product`
    /// (price, minimum, stock, display fields) and its quantity replaced.
    pub fn add_item(&mut self, product: &Product, quantity: Decimal) {
        let stored = clamp_quantity(quantity, product.min_order_quantity, product.stock);
        if stored != quantity {
            debug!(
                "Clamped quantity for product {}: requested={}, stored={}",
                product.id, quantity, stored
            );
        }

        let event = match self.position(product.id) {
            Some(idx) => {
                let refreshed = LineItem::from_product(product, stored);
                let line = &mut self.items[idx];
                // A stock-only refresh is not reported
                let changed = *line
                    != LineItem {
                        stock: line.stock,
                        ..refreshed.clone()
                    };
                *line = refreshed;
                if !changed {
                    return;
                }
                CartEvent::QuantityChanged {
                    product_id: product.id,
                    quantity: stored,
                }
            }
            None => {
                self.items.push(LineItem::from_product(product, stored));
                CartEvent::ItemAdded {
                    product_id: product.id,
                    quantity: stored,
                }
            }
        };

        debug!("Cart: {:?}", event);
        self.notify(&event);
    }

    /// Set a line's quantity, raised to its minimum order if needed.
    /// No upper bound is applied here. Absent ids are ignored.
    pub fn update_quantity(&mut self, product_id: ProductId, quantity: Decimal) {
        let Some(idx) = self.position(product_id) else {
            return;
        };
        let line = &self.items[idx];
        let stored = quantity.max(line.min_order_quantity);
        self.set_quantity(idx, stored);
    }

    /// Step a line up by one unit, never past its stock
    pub fn increment(&mut self, product_id: ProductId) {
        let Some(idx) = self.position(product_id) else {
            return;
        };
        let line = &self.items[idx];
        if line.quantity >= line.stock {
            return;
        }
        let stored = line
            .quantity
            .checked_add(Decimal::ONE)
            .map_or(line.stock, |next| next.min(line.stock));
        self.set_quantity(idx, stored);
    }

    /// Step a line down by one unit, never below its minimum order
    pub fn decrement(&mut self, product_id: ProductId) {
        let Some(idx) = self.position(product_id) else {
            return;
        };
        let line = &self.items[idx];
        if line.quantity <= line.min_order_quantity {
            return;
        }
        let stored = (line.quantity - Decimal::ONE).max(line.min_order_quantity);
        self.set_quantity(idx, stored);
    }

    /// Drop a line; absent ids are ignored
    pub fn remove_item(&mut self, product_id: ProductId) {
        let Some(idx) = self.position(product_id) else {
            return;
        };
        self.items.remove(idx);
        let event = CartEvent::ItemRemoved { product_id };
        debug!("Cart: {:?}", event);
        self.notify(&event);
    }

    /// Empty the cart
    pub fn clear(&mut self) {
        if self.items.is_empty() {
            return;
        }
        self.items.clear();
        debug!("Cart cleared");
        self.notify(&CartEvent::Cleared);
    }

    /// Sum of `price_per_unit * quantity` over all lines, capped at
    /// `Decimal::MAX`
    pub fn total(&self) -> Decimal {
        saturating_sum(self.items.iter().map(LineItem::total))
    }

    /// Build the order snapshot for `buyer`
    pub fn to_checkout_payload(&self, buyer: &BuyerInfo) -> CheckoutPayload {
        let items = self
            .items
            .iter()
            .map(|line| PayloadItem {
                id: line.product_id,
                quantity: line.quantity,
                unit_price: line.price_per_unit,
            })
            .collect();
        CheckoutPayload::new(buyer, items)
    }

    pub fn item(&self, product_id: ProductId) -> Option<&LineItem> {
        self.items.iter().find(|line| line.product_id == product_id)
    }

    /// Lines in the order they were added
    pub fn items(&self) -> &[LineItem] {
        &self.items
    }

    /// Number of distinct lines
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Sum of quantities across lines
    pub fn item_count(&self) -> Decimal {
        saturating_sum(self.items.iter().map(|line| line.quantity))
    }

    pub fn state(&self) -> CartState {
        if self.items.is_empty() {
            CartState::Empty
        } else {
            CartState::Populated
        }
    }

    /// Register an observer called after every effective change
    pub fn subscribe<F>(&mut self, callback: F) -> SubscriptionId
    where
        F: Fn(&CartEvent, &CartStore) + 'static,
    {
        self.next_subscription += 1;
        let id = SubscriptionId(self.next_subscription);
        self.subscribers.push((id, Box::new(callback)));
        id
    }

    /// Remove an observer; returns false if it was not registered
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|(sub, _)| *sub != id);
        self.subscribers.len() != before
    }

    fn position(&self, product_id: ProductId) -> Option<usize> {
        self.items.iter().position(|line| line.product_id == product_id)
    }

    fn set_quantity(&mut self, idx: usize, quantity: Decimal) {
        let line = &mut self.items[idx];
        if line.quantity == quantity {
            return;
        }
        line.quantity = quantity;
        let event = CartEvent::QuantityChanged {
            product_id: line.product_id,
            quantity,
        };
        debug!("Cart: {:?}", event);
        self.notify(&event);
    }

    fn notify(&self, event: &CartEvent) {
        for (_, callback) in &self.subscribers {
            callback(event, self);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn dec(value: i64) -> Decimal {
        Decimal::new(value, 0)
    }

    fn product(id: i64, price: i64, min: Decimal, stock: i64) -> Product {
        Product::new(id, format!("Product {}", id), dec(price), UnitType::Kg)
            .with_min_order(min)
            .with_stock(dec(stock))
    }

    #[test]
    fn test_add_update_remove_scenario() {
        let mut cart = CartStore::new();
        assert_eq!(cart.state(), CartState::Empty);

        cart.add_item(&product(1, 60, dec(1), 100), dec(2));
        assert_eq!(cart.state(), CartState::Populated);
        assert_eq!(cart.total(), dec(120));

        cart.update_quantity(ProductId(1), Decimal::new(5, 1));
        assert_eq!(cart.item(ProductId(1)).unwrap().quantity, dec(1));
        assert_eq!(cart.total(), dec(60));

        cart.remove_item(ProductId(1));
        assert_eq!(cart.state(), CartState::Empty);
        assert_eq!(cart.total(), Decimal::ZERO);
    }

    #[test]
    fn test_add_clamps_to_min_and_stock() {
        let mut cart = CartStore::new();
        cart.add_item(&product(1, 10, dec(2), 5), dec(9));
        cart.add_item(&product(2, 10, dec(2), 5), Decimal::new(5, 1));

        assert_eq!(cart.item(ProductId(1)).unwrap().quantity, dec(5));
        assert_eq!(cart.item(ProductId(2)).unwrap().quantity, dec(2));
    }

    #[test]
    fn test_min_wins_when_stock_below_min() {
        let mut cart = CartStore::new();
        cart.add_item(&product(1, 10, dec(3), 1), dec(2));
        assert_eq!(cart.item(ProductId(1)).unwrap().quantity, dec(3));
    }

    #[test]
    fn test_add_existing_replaces_quantity() {
        let mut cart = CartStore::new();
        let spinach = product(4, 30, dec(1), 50);
        cart.add_item(&spinach, dec(2));
        cart.add_item(&spinach, dec(7));

        assert_eq!(cart.len(), 1);
        assert_eq!(cart.item(ProductId(4)).unwrap().quantity, dec(7));
        assert_eq!(cart.item_count(), dec(7));
    }

    #[test]
    fn test_readd_refreshes_price_and_minimum() {
        let mut cart = CartStore::new();
        cart.add_item(&product(1, 10, dec(2), 50), dec(5));
        cart.add_item(&product(1, 99, dec(1), 50), dec(1));

        let line = cart.item(ProductId(1)).unwrap();
        assert_eq!(line.quantity, dec(1));
        assert_eq!(line.min_order_quantity, dec(1));
        assert_eq!(line.price_per_unit, dec(99));
        assert_eq!(cart.total(), dec(99));

        let buyer = BuyerInfo::new("Asha", "9876543210", "12 Market Road", "UPI");
        let payload = cart.to_checkout_payload(&buyer);
        assert_eq!(payload.items()[0].unit_price, dec(99));
    }

    #[test]
    fn test_readd_with_raised_minimum_lifts_quantity() {
        let mut cart = CartStore::new();
        cart.add_item(&product(1, 10, dec(1), 50), dec(2));
        cart.add_item(&product(1, 10, dec(4), 50), dec(2));

        let line = cart.item(ProductId(1)).unwrap();
        assert_eq!(line.quantity, dec(4));
        assert_eq!(line.min_order_quantity, dec(4));
    }

    #[test]
    fn test_stock_only_refresh_is_silent() {
        let mut cart = CartStore::new();
        let count = Rc::new(RefCell::new(0));
        let sink = Rc::clone(&count);
        cart.add_item(&product(1, 10, dec(1), 50), dec(2));
        cart.subscribe(move |_, _| *sink.borrow_mut() += 1);

        cart.add_item(&product(1, 10, dec(1), 8), dec(2));
        assert_eq!(*count.borrow(), 0);
        assert_eq!(cart.item(ProductId(1)).unwrap().stock, dec(8));

        cart.add_item(&product(1, 12, dec(1), 8), dec(2));
        assert_eq!(*count.borrow(), 1);
    }

    #[test]
    fn test_totals_saturate_instead_of_overflowing() {
        let mut cart = CartStore::new();
        cart.add_item(&product(1, 60, dec(1), 100), dec(2));
        cart.add_item(&product(2, 5, dec(1), 100), dec(1));
        cart.update_quantity(ProductId(1), Decimal::MAX);
        cart.update_quantity(ProductId(2), Decimal::MAX);

        assert_eq!(cart.item(ProductId(1)).unwrap().total(), Decimal::MAX);
        assert_eq!(cart.total(), Decimal::MAX);
        assert_eq!(cart.item_count(), Decimal::MAX);

        let buyer = BuyerInfo::new("Asha", "9876543210", "12 Market Road", "UPI");
        assert_eq!(cart.to_checkout_payload(&buyer).total(), Decimal::MAX);

        cart.increment(ProductId(1));
        assert_eq!(cart.item(ProductId(1)).unwrap().quantity, Decimal::MAX);
    }

    #[test]
    fn test_update_has_no_ceiling() {
        let mut cart = CartStore::new();
        cart.add_item(&product(1, 10, dec(1), 5), dec(2));
        cart.update_quantity(ProductId(1), dec(40));
        assert_eq!(cart.item(ProductId(1)).unwrap().quantity, dec(40));
    }

    #[test]
    fn test_missing_ids_are_noops() {
        let mut cart = CartStore::new();
        cart.add_item(&product(1, 10, dec(1), 5), dec(2));
        let before = cart.items().to_vec();

        cart.remove_item(ProductId(99));
        cart.remove_item(ProductId(99));
        cart.update_quantity(ProductId(99), dec(3));
        cart.increment(ProductId(99));
        cart.decrement(ProductId(99));

        assert_eq!(cart.items(), before.as_slice());
    }

    #[test]
    fn test_increment_and_decrement_bounds() {
        let mut cart = CartStore::new();
        cart.add_item(&product(1, 10, Decimal::new(15, 1), 3), Decimal::new(15, 1));

        cart.decrement(ProductId(1));
        assert_eq!(cart.item(ProductId(1)).unwrap().quantity, Decimal::new(15, 1));

        cart.increment(ProductId(1));
        assert_eq!(cart.item(ProductId(1)).unwrap().quantity, Decimal::new(25, 1));
        cart.increment(ProductId(1));
        assert_eq!(cart.item(ProductId(1)).unwrap().quantity, dec(3));
        cart.increment(ProductId(1));
        assert_eq!(cart.item(ProductId(1)).unwrap().quantity, dec(3));

        cart.decrement(ProductId(1));
        cart.decrement(ProductId(1));
        assert_eq!(cart.item(ProductId(1)).unwrap().quantity, Decimal::new(15, 1));
    }

    #[test]
    fn test_increment_never_lowers_quantity_above_stock() {
        let mut cart = CartStore::new();
        cart.add_item(&product(1, 10, dec(1), 5), dec(2));
        cart.update_quantity(ProductId(1), dec(8));
        cart.increment(ProductId(1));
        assert_eq!(cart.item(ProductId(1)).unwrap().quantity, dec(8));
    }

    #[test]
    fn test_clear() {
        let mut cart = CartStore::new();
        cart.add_item(&product(1, 10, dec(1), 5), dec(2));
        cart.add_item(&product(2, 15, dec(1), 5), dec(1));
        cart.clear();

        assert!(cart.is_empty());
        assert_eq!(cart.state(), CartState::Empty);
        assert_eq!(cart.total(), Decimal::ZERO);
    }

    #[test]
    fn test_items_keep_insertion_order() {
        let mut cart = CartStore::new();
        for id in [3, 1, 2] {
            cart.add_item(&product(id, 10, dec(1), 5), dec(1));
        }
        let ids: Vec<i64> = cart.items().iter().map(|l| l.product_id.0).collect();
        assert_eq!(ids, vec![3, 1, 2]);
    }

    #[test]
    fn test_subscribers_see_effective_changes_only() {
        let mut cart = CartStore::new();
        let seen: Rc<RefCell<Vec<(CartEvent, Decimal)>>> = Rc::default();
        let sink = Rc::clone(&seen);
        let id = cart.subscribe(move |event, store| {
            sink.borrow_mut().push((event.clone(), store.total()));
        });

        let okra = product(1, 20, dec(1), 10);
        cart.add_item(&okra, dec(2));
        cart.add_item(&okra, dec(2));
        cart.update_quantity(ProductId(1), dec(3));
        cart.remove_item(ProductId(42));
        cart.clear();
        cart.clear();

        let seen_events = seen.borrow();
        assert_eq!(
            *seen_events,
            vec![
                (
                    CartEvent::ItemAdded {
                        product_id: ProductId(1),
                        quantity: dec(2)
                    },
                    dec(40)
                ),
                (
                    CartEvent::QuantityChanged {
                        product_id: ProductId(1),
                        quantity: dec(3)
                    },
                    dec(60)
                ),
                (CartEvent::Cleared, Decimal::ZERO),
            ]
        );
        drop(seen_events);

        assert!(cart.unsubscribe(id));
        assert!(!cart.unsubscribe(id));
        cart.add_item(&okra, dec(1));
        assert_eq!(seen.borrow().len(), 3);
    }

    #[test]
    fn test_event_serialization() {
        let event = CartEvent::QuantityChanged {
            product_id: ProductId(5),
            quantity: Decimal::new(25, 1),
        };
        assert_eq!(
            serde_json::to_value(&event).unwrap(),
            serde_json::json!({ "type": "quantity_changed", "product_id": 5, "quantity": 2.5 })
        );
    }

    #[derive(Debug, Clone)]
    enum Op {
        Add {
            id: i64,
            revision: i64,
            quantity_tenths: i64,
        },
        Update { id: i64, quantity_tenths: i64 },
        Remove { id: i64 },
        Increment { id: i64 },
        Decrement { id: i64 },
    }

    fn op_strategy() -> impl Strategy<Value = Op> {
        prop_oneof![
            (1..6i64, 0..3i64, -50..500i64).prop_map(|(id, revision, q)| Op::Add {
                id,
                revision,
                quantity_tenths: q,
            }),
            (1..6i64, -50..500i64).prop_map(|(id, q)| Op::Update { id, quantity_tenths: q }),
            (1..6i64).prop_map(|id| Op::Remove { id }),
            (1..6i64).prop_map(|id| Op::Increment { id }),
            (1..6i64).prop_map(|id| Op::Decrement { id }),
        ]
    }

    /// Catalog with fractional prices and minimums; each revision of a
    /// product moves its price and minimum up or down
    fn catalog_product(id: i64, revision: i64) -> Product {
        let price = Decimal::new(id * 1234 + 5 + revision * 4321, 2);
        let min_tenths = match revision {
            0 => id * 5,
            1 => id * 2,
            _ => id * 9,
        };
        Product::new(id, format!("Item {}", id), price, UnitType::Kg)
            .with_min_order(Decimal::new(min_tenths, 1))
            .with_stock(dec(id * 7))
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 500,
            ..ProptestConfig::default()
        })]

        /// Property: invariants hold after any operation sequence
        #[test]
        fn cart_invariants_hold(ops in prop::collection::vec(op_strategy(), 0..40)) {
            let mut cart = CartStore::new();

            for op in ops {
                match op {
                    Op::Add { id, revision, quantity_tenths } => {
                        let product = catalog_product(id, revision);
                        cart.add_item(&product, Decimal::new(quantity_tenths, 1));
                        let line = cart.item(product.id).unwrap();
                        prop_assert_eq!(line.price_per_unit, product.price_per_unit);
                        prop_assert_eq!(line.min_order_quantity, product.min_order_quantity);
                    }
                    Op::Update { id, quantity_tenths } => {
                        cart.update_quantity(ProductId(id), Decimal::new(quantity_tenths, 1));
                    }
                    Op::Remove { id } => cart.remove_item(ProductId(id)),
                    Op::Increment { id } => cart.increment(ProductId(id)),
                    Op::Decrement { id } => cart.decrement(ProductId(id)),
                }

                let expected: Decimal = cart
                    .items()
                    .iter()
                    .map(|line| line.price_per_unit * line.quantity)
                    .sum();
                prop_assert_eq!(cart.total(), expected);

                for line in cart.items() {
                    prop_assert!(line.quantity >= line.min_order_quantity);
                }

                let mut ids: Vec<ProductId> = cart.items().iter().map(|l| l.product_id).collect();
                ids.sort();
                ids.dedup();
                prop_assert_eq!(ids.len(), cart.len());
            }

            cart.clear();
            prop_assert_eq!(cart.total(), Decimal::ZERO);
            prop_assert_eq!(cart.state(), CartState::Empty);
        }
    }
}
