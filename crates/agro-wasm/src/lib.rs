//! # agro-wasm
//!
//! WebAssembly bindings for the agrofix cart store.
//!
//! The page creates one `WasmCart` per session and passes it to every
//! view. Views that only display the cart register a callback with
//! `subscribe`; the callback receives a snapshot (`event`, `items`,
//! `total`, `state`) so it never has to call back into the cart while a
//! mutation is in progress.
//!
//! ## Usage (JavaScript)
//!
//! ```javascript
//! import init, { WasmCart } from 'agrofix-wasm';
//!
//! await init();
//!
//! const cart = new WasmCart();
//! cart.subscribe(({ items, total }) => renderBadge(items.length, total));
//!
//! cart.addItem(productFromApi, 2);
//! const payload = cart.checkoutPayload({
//!   name: 'Asha', contact: '9876543210', address: '12 Market Road',
//!   payment_method: 'Cash on Delivery',
//! });
//! const ack = await (await fetch('/api/orders', { method: 'POST', body: JSON.stringify(payload) })).json();
//! cart.applyOrderResponse(ack);
//! ```
//!
//! ## Building
//!
//! ```bash
//! wasm-pack build crates/agro-wasm --target web
//! ```

use agro_core::{
    format_rupees, normalize_payment_method as normalize_token, BuyerInfo, CartEvent, CartState,
    CartStore, LineItem, OrderAck, Product, ProductId, SubscriptionId,
};
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::Decimal;
use serde::Serialize;
use std::fmt::Display;
use wasm_bindgen::prelude::*;

fn js_error(err: impl Display) -> JsValue {
    JsValue::from_str(&err.to_string())
}

fn to_decimal(value: f64) -> Result<Decimal, JsValue> {
    Decimal::from_f64(value).ok_or_else(|| js_error(format!("Invalid quantity: {}", value)))
}

/// Largest integer a JS number holds exactly (`Number.MAX_SAFE_INTEGER`)
const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_991.0;

/// Product ids arrive as JS numbers; only exact integers are accepted
fn parse_product_id(raw: f64) -> Option<ProductId> {
    if raw.fract() != 0.0 || raw.abs() > MAX_SAFE_INTEGER {
        return None;
    }
    Some(ProductId(raw as i64))
}

fn product_id(raw: f64) -> Result<ProductId, JsValue> {
    parse_product_id(raw).ok_or_else(|| js_error(format!("Invalid product id: {}", raw)))
}

/// What a subscriber sees after each change
#[derive(Serialize)]
struct CartSnapshot<'a> {
    event: &'a CartEvent,
    items: &'a [LineItem],
    #[serde(serialize_with = "rust_decimal::serde::float::serialize")]
    total: Decimal,
    state: CartState,
}

impl<'a> CartSnapshot<'a> {
    fn capture(event: &'a CartEvent, store: &'a CartStore) -> Self {
        Self {
            event,
            items: store.items(),
            total: store.total(),
            state: store.state(),
        }
    }
}

/// Session cart exposed to JavaScript
#[wasm_bindgen]
#[derive(Debug, Default)]
pub struct WasmCart {
    store: CartStore,
}

#[wasm_bindgen]
impl WasmCart {
    #[wasm_bindgen(constructor)]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a product descriptor as served by `GET /api/products`
    #[wasm_bindgen(js_name = addItem)]
    pub fn add_item(&mut self, product: JsValue, quantity: f64) -> Result<(), JsValue> {
        let product: Product = serde_wasm_bindgen::from_value(product)
            .map_err(|e| js_error(format!("Invalid product: {}", e)))?;
        self.store.add_item(&product, to_decimal(quantity)?);
        Ok(())
    }

    #[wasm_bindgen(js_name = updateQuantity)]
    pub fn update_quantity(&mut self, id: f64, quantity: f64) -> Result<(), JsValue> {
        self.store
            .update_quantity(product_id(id)?, to_decimal(quantity)?);
        Ok(())
    }

    pub fn increment(&mut self, id: f64) -> Result<(), JsValue> {
        self.store.increment(product_id(id)?);
        Ok(())
    }

    pub fn decrement(&mut self, id: f64) -> Result<(), JsValue> {
        self.store.decrement(product_id(id)?);
        Ok(())
    }

    #[wasm_bindgen(js_name = removeItem)]
    pub fn remove_item(&mut self, id: f64) -> Result<(), JsValue> {
        self.store.remove_item(product_id(id)?);
        Ok(())
    }

    pub fn clear(&mut self) {
        self.store.clear();
    }

    pub fn total(&self) -> f64 {
        self.store.total().to_f64().unwrap_or_default()
    }

    /// Total formatted for display, e.g. `₹120`
    #[wasm_bindgen(js_name = totalDisplay)]
    pub fn total_display(&self) -> String {
        format_rupees(self.store.total())
    }

    /// Line items in insertion order
    pub fn items(&self) -> Result<JsValue, JsValue> {
        serde_wasm_bindgen::to_value(self.store.items()).map_err(js_error)
    }

    pub fn len(&self) -> usize {
        self.store.len()
    }

    #[wasm_bindgen(js_name = isEmpty)]
    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    /// Body for `POST /api/orders`.
    ///
    /// `buyer` is `{ name, contact, address, payment_method }`; blank
    /// fields and an empty cart are refused.
    #[wasm_bindgen(js_name = checkoutPayload)]
    pub fn checkout_payload(&self, buyer: JsValue) -> Result<JsValue, JsValue> {
        let buyer: BuyerInfo = serde_wasm_bindgen::from_value(buyer)
            .map_err(|e| js_error(format!("Invalid buyer details: {}", e)))?;
        buyer.validate().map_err(js_error)?;
        if self.store.is_empty() {
            return Err(js_error("Your cart is empty"));
        }
        let payload = self.store.to_checkout_payload(&buyer);
        serde_wasm_bindgen::to_value(&payload).map_err(js_error)
    }

    /// Feed the `POST /api/orders` response back in.
    ///
    /// Clears the cart and returns the server message on success; on
    /// rejection the cart is untouched and the buyer-facing message is
    /// thrown.
    #[wasm_bindgen(js_name = applyOrderResponse)]
    pub fn apply_order_response(&mut self, response: JsValue) -> Result<Option<String>, JsValue> {
        let ack: OrderAck = serde_wasm_bindgen::from_value(response)
            .map_err(|e| js_error(format!("Invalid order response: {}", e)))?;
        match ack.into_result() {
            Ok(receipt) => {
                self.store.clear();
                Ok(receipt.message)
            }
            Err(err) => Err(js_error(err.user_message())),
        }
    }

    /// Register `callback(snapshot)`; returns an id for `unsubscribe`
    pub fn subscribe(&mut self, callback: js_sys::Function) -> f64 {
        let id = self.store.subscribe(move |event, store| {
            let snapshot = CartSnapshot::capture(event, store);
            match serde_wasm_bindgen::to_value(&snapshot) {
                Ok(value) => {
                    if let Err(thrown) = callback.call1(&JsValue::NULL, &value) {
                        web_sys::console::error_2(&JsValue::from_str("Cart subscriber threw"), &thrown);
                    }
                }
                Err(e) => log(&format!("Failed to serialize cart snapshot: {}", e)),
            }
        });
        id.as_u64() as f64
    }

    pub fn unsubscribe(&mut self, id: f64) -> bool {
        self.store.unsubscribe(SubscriptionId::from_u64(id as u64))
    }
}

/// `"Cash on Delivery"` → `"cash_on_delivery"`
#[wasm_bindgen(js_name = normalizePaymentMethod)]
pub fn normalize_payment_method(label: &str) -> String {
    normalize_token(label)
}

/// Format an amount in rupees for display
#[wasm_bindgen(js_name = formatPrice)]
pub fn format_price(amount: f64) -> String {
    format_rupees(Decimal::from_f64(amount).unwrap_or_default())
}

/// Log to browser console
#[wasm_bindgen]
pub fn log(message: &str) {
    web_sys::console::log_1(&JsValue::from_str(message));
}

/// Get library version
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}
