//! # agro-client
//!
//! HTTP client for the agrofix marketplace backend.
//!
//! `AgrofixClient` implements both API traits from `agro-core`:
//!
//! 1. **StorefrontApi** - catalog, order placement, order tracking by phone
//! 2. **AdminApi** - all orders, product create/delete, status updates
//!    (sends `username` / `password` headers from configuration)
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use agro_client::{AgrofixClient, ClientConfig};
//! use agro_core::{submit_checkout, StorefrontApi};
//!
//! let client = AgrofixClient::new(ClientConfig::load("config/agrofix.toml")?)?;
//! let products = client.list_products().await?;
//!
//! let receipt = submit_checkout(&client, &mut cart, &buyer).await?;
//! ```

pub mod client;
pub mod config;

// Re-exports
pub use client::AgrofixClient;
pub use config::{AdminCredentials, ClientConfig, DEFAULT_API_URL, DEFAULT_TIMEOUT_SECS};
