//! # Marketplace API Traits
//!
//! The seam between storefront logic and the transport that reaches the
//! marketplace backend. Checkout and the order pages only ever see these
//! traits; `agro-client` provides the HTTP implementation and tests plug
//! in fakes.
//!
//! ```text
//! ┌──────────────────────────┐   ┌──────────────────────────┐
//! │  StorefrontApi (trait)   │   │     AdminApi (trait)     │
//! │  ├── list_products()     │   │  ├── list_all_orders()   │
//! │  ├── place_order()       │   │  ├── add_product()       │
//! │  └── orders_for_phone()  │   │  ├── delete_product()    │
//! │                          │   │  └── update_order_status()│
//! └────────────▲─────────────┘   └────────────▲─────────────┘
//!              └──────────────┬───────────────┘
//!                     ┌───────┴───────┐
//!                     │ AgrofixClient │
//!                     └───────────────┘
//! ```

use crate::checkout::{CheckoutPayload, OrderReceipt};
use crate::error::StoreResult;
use crate::order::{Order, OrderStatus};
use crate::product::{NewProduct, Product, ProductId};
use async_trait::async_trait;

/// Buyer-facing marketplace operations
#[async_trait]
pub trait StorefrontApi: Send + Sync {
    /// Fetch the product catalog.
    ///
    /// Entries that fail validation are rejected, never handed to the cart.
    async fn list_products(&self) -> StoreResult<Vec<Product>>;

    /// Submit an order.
    ///
    /// # Returns
    /// An `OrderReceipt` when the API acknowledges with `success: true`,
    /// `StoreError::OrderRejected` when it answers `success: false`.
    async fn place_order(&self, payload: &CheckoutPayload) -> StoreResult<OrderReceipt>;

    /// Orders placed with the given contact phone
    async fn orders_for_phone(&self, phone: &str) -> StoreResult<Vec<Order>>;

    /// Backend name (for logging)
    fn backend_name(&self) -> &'static str {
        "agrofix"
    }
}

/// Operations behind the admin login
#[async_trait]
pub trait AdminApi: Send + Sync {
    async fn list_all_orders(&self) -> StoreResult<Vec<Order>>;

    async fn add_product(&self, product: &NewProduct) -> StoreResult<()>;

    async fn delete_product(&self, id: ProductId) -> StoreResult<()>;

    async fn update_order_status(&self, order_id: i64, status: &OrderStatus) -> StoreResult<()>;
}
