//! # Storefront Error Types
//!
//! Typed error handling for the agrofix storefront client.
//! Cart operations never fail; everything that talks to the marketplace
//! API returns `Result<T, StoreError>`.

use thiserror::Error;

/// Core error type for catalog, checkout and order operations
#[derive(Debug, Error)]
pub enum StoreError {
    /// Configuration errors (missing API URL, missing admin credentials)
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Invalid request data (blank buyer fields, empty cart)
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Product descriptor failed validation at the boundary
    #[error("Invalid product {product_id}: {reason}")]
    InvalidProduct { product_id: String, reason: String },

    /// The API answered `{ success: false }` for an order
    #[error("Order rejected: {message}")]
    OrderRejected { message: String },

    /// Non-2xx response from the marketplace API
    #[error("API error [{status}]: {message}")]
    Api { status: u16, message: String },

    /// Network/HTTP error communicating with the API
    #[error("Network error: {0}")]
    NetworkError(String),

    /// Requested resource does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl StoreError {
    /// Returns true if repeating the same request could succeed
    pub fn is_retryable(&self) -> bool {
        match self {
            StoreError::NetworkError(_) => true,
            StoreError::Api { status, .. } => *status >= 500 || *status == 429,
            _ => false,
        }
    }

    /// Message suitable for showing to the buyer after a failed checkout
    pub fn user_message(&self) -> String {
        match self {
            StoreError::OrderRejected { message } => {
                format!("Failed to place order: {}", message)
            }
            StoreError::InvalidRequest(reason) => reason.clone(),
            other => format!("Error placing order: {}", other),
        }
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        StoreError::Serialization(err.to_string())
    }
}

/// Result type alias for storefront operations
pub type StoreResult<T> = Result<T, StoreError>;
