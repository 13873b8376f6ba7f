//! # agro-core
//!
//! Core types and traits for the agrofix fresh-produce storefront.
//!
//! This crate provides:
//! - `CartStore` for the session cart, with change subscriptions
//! - `Product` and `ProductCatalog` for the catalog
//! - `BuyerInfo`, `CheckoutPayload` and `submit_checkout` for the order flow
//! - `Order`, `StatusFilter`, `OrderSort` for the order pages
//! - `StorefrontApi` / `AdminApi` traits for the marketplace backend
//! - `StoreError` for typed error handling
//!
//! ## Example
//!
//! ```rust,ignore
//! use agro_core::{BuyerInfo, CartStore, Product, UnitType, submit_checkout};
//! use rust_decimal::Decimal;
//!
//! let mut cart = CartStore::new();
//! let tomato = Product::new(1, "Tomato", Decimal::new(40, 0), UnitType::Kg)
//!     .with_stock(Decimal::new(100, 0));
//! cart.add_item(&tomato, Decimal::new(2, 0));
//!
//! let buyer = BuyerInfo::new("Asha", "9876543210", "12 Market Road", "Cash on Delivery");
//! let receipt = submit_checkout(&client, &mut cart, &buyer).await?;
//! ```

pub mod api;
pub mod cart;
pub mod checkout;
pub mod error;
pub mod order;
pub mod product;

// Re-exports for convenience
pub use api::{AdminApi, StorefrontApi};
pub use cart::{clamp_quantity, CartEvent, CartState, CartStore, LineItem, SubscriptionId};
pub use checkout::{
    normalize_payment_method, submit_checkout, BuyerInfo, CheckoutPayload, OrderAck,
    OrderReceipt, PayloadItem, PaymentMethod,
};
pub use error::{StoreError, StoreResult};
pub use order::{arrange_orders, Order, OrderLine, OrderSort, OrderStatus, StatusCounts, StatusFilter};
pub use product::{format_rupees, NewProduct, Product, ProductCatalog, ProductId, UnitType};

/// Re-exported so downstream crates share one decimal type
pub use rust_decimal::Decimal;
