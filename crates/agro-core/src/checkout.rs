//! # Checkout
//!
//! Buyer details, the immutable checkout payload snapshot, and the
//! submitter that posts it and clears the cart on success.

use crate::api::StorefrontApi;
use crate::cart::{saturating_sum, CartStore};
use crate::error::{StoreError, StoreResult};
use crate::product::ProductId;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::{debug, info, warn};

/// Turn a payment-method label into the API token.
///
/// Lowercases and replaces every run of whitespace with a single `_`
/// ("Cash on Delivery" -> "cash_on_delivery").
pub fn normalize_payment_method(label: &str) -> String {
    let mut token = String::with_capacity(label.len());
    let mut in_space = false;
    for ch in label.chars() {
        if ch.is_whitespace() {
            if !in_space {
                token.push('_');
                in_space = true;
            }
        } else {
            token.extend(ch.to_lowercase());
            in_space = false;
        }
    }
    token
}

/// Payment methods offered at checkout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    CashOnDelivery,
    Upi,
    Card,
}

impl PaymentMethod {
    pub const ALL: [PaymentMethod; 3] = [
        PaymentMethod::CashOnDelivery,
        PaymentMethod::Upi,
        PaymentMethod::Card,
    ];

    /// Label shown in the checkout form
    pub fn label(&self) -> &'static str {
        match self {
            PaymentMethod::CashOnDelivery => "Cash on Delivery",
            PaymentMethod::Upi => "UPI",
            PaymentMethod::Card => "Card",
        }
    }

    /// Normalized token sent to the API
    pub fn token(&self) -> String {
        normalize_payment_method(self.label())
    }
}

impl Default for PaymentMethod {
    fn default() -> Self {
        PaymentMethod::CashOnDelivery
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for PaymentMethod {
    type Err = StoreError;

    /// Accepts either the label or the token
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let token = normalize_payment_method(s.trim());
        PaymentMethod::ALL
            .into_iter()
            .find(|m| m.token() == token)
            .ok_or_else(|| StoreError::InvalidRequest(format!("unknown payment method: {}", s)))
    }
}

/// Buyer-supplied checkout fields
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuyerInfo {
    pub name: String,
    /// Phone number; also the key for order tracking
    pub contact: String,
    pub address: String,
    /// Payment-method label as picked in the form
    pub payment_method: String,
}

impl BuyerInfo {
    pub fn new(
        name: impl Into<String>,
        contact: impl Into<String>,
        address: impl Into<String>,
        payment_method: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            contact: contact.into(),
            address: address.into(),
            payment_method: payment_method.into(),
        }
    }

    /// Reject blank fields before a payload is built
    pub fn validate(&self) -> StoreResult<()> {
        let fields = [
            ("name", &self.name),
            ("contact", &self.contact),
            ("address", &self.address),
            ("payment method", &self.payment_method),
        ];
        for (field, value) in fields {
            if value.trim().is_empty() {
                return Err(StoreError::InvalidRequest(format!(
                    "buyer {} is required",
                    field
                )));
            }
        }
        Ok(())
    }
}

/// One line of the checkout payload
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PayloadItem {
    pub id: ProductId,
    #[serde(serialize_with = "rust_decimal::serde::float::serialize")]
    pub quantity: Decimal,
    /// Per-unit price the buyer saw, for server-side verification
    #[serde(
        rename = "price_per_kg",
        serialize_with = "rust_decimal::serde::float::serialize"
    )]
    pub unit_price: Decimal,
}

/// Snapshot posted to `POST /api/orders`.
///
/// Only [`CartStore::to_checkout_payload`] builds one; there are no setters.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CheckoutPayload {
    buyer_name: String,
    buyer_contact: String,
    delivery_address: String,
    payment_method: String,
    items: Vec<PayloadItem>,
}

impl CheckoutPayload {
    pub(crate) fn new(buyer: &BuyerInfo, items: Vec<PayloadItem>) -> Self {
        Self {
            buyer_name: buyer.name.clone(),
            buyer_contact: buyer.contact.clone(),
            delivery_address: buyer.address.clone(),
            payment_method: normalize_payment_method(&buyer.payment_method),
            items,
        }
    }

    pub fn buyer_name(&self) -> &str {
        &self.buyer_name
    }

    pub fn buyer_contact(&self) -> &str {
        &self.buyer_contact
    }

    pub fn delivery_address(&self) -> &str {
        &self.delivery_address
    }

    pub fn payment_method(&self) -> &str {
        &self.payment_method
    }

    pub fn items(&self) -> &[PayloadItem] {
        &self.items
    }

    /// Total as the client computed it, capped at `Decimal::MAX`
    pub fn total(&self) -> Decimal {
        saturating_sum(self.items.iter().map(|item| {
            item.unit_price
                .checked_mul(item.quantity)
                .unwrap_or(Decimal::MAX)
        }))
    }
}

/// Response body of `POST /api/orders`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderAck {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl OrderAck {
    /// `success: false` becomes [`StoreError::OrderRejected`]
    pub fn into_result(self) -> StoreResult<OrderReceipt> {
        if self.success {
            Ok(OrderReceipt {
                message: self.message,
            })
        } else {
            Err(StoreError::OrderRejected {
                message: self.message.unwrap_or_else(|| "unknown error".to_string()),
            })
        }
    }
}

/// Accepted order
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct OrderReceipt {
    pub message: Option<String>,
}

/// Place an order for everything in `cart`.
///
/// The cart is cleared only after the API accepts the order; any failure
/// leaves it exactly as it was. The exclusive borrow keeps the cart frozen
/// while the request is in flight.
pub async fn submit_checkout<A>(
    api: &A,
    cart: &mut CartStore,
    buyer: &BuyerInfo,
) -> StoreResult<OrderReceipt>
where
    A: StorefrontApi + ?Sized,
{
    buyer.validate()?;
    if cart.is_empty() {
        return Err(StoreError::InvalidRequest("cart is empty".to_string()));
    }

    let payload = cart.to_checkout_payload(buyer);
    debug!(
        "Submitting order: {} items, total={}, payment={}",
        payload.items().len(),
        payload.total(),
        payload.payment_method()
    );

    match api.place_order(&payload).await {
        Ok(receipt) => {
            info!("Order placed for {}", payload.buyer_contact());
            cart.clear();
            Ok(receipt)
        }
        Err(e) => {
            warn!("Order submission failed, cart kept: {}", e);
            Err(e)
        }
    }
}
