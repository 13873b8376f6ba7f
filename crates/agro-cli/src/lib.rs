//! # agro-cli
//!
//! Terminal front-end for the agrofix storefront.
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `products` | List available products |
//! | `orders --phone P` | Track orders for a phone number |
//! | `checkout --item ID=QTY ...` | Build a cart and place an order |
//! | `admin orders` | List all orders |
//! | `admin add-product --file F` | Create a product from JSON |
//! | `admin delete-product ID` | Delete a product |
//! | `admin set-status ORDER_ID STATUS` | Update an order's status |

pub mod cli;
pub mod commands;

pub use cli::{AdminCommand, Cli, Command};
