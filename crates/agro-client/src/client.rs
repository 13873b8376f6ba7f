//! # Marketplace HTTP Client
//!
//! reqwest implementation of `StorefrontApi` and `AdminApi` against the
//! agrofix backend.

use crate::config::ClientConfig;
use agro_core::{
    AdminApi, CheckoutPayload, NewProduct, Order, OrderAck, OrderReceipt, OrderStatus, Product,
    ProductId, StoreError, StoreResult, StorefrontApi,
};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, error, info, instrument, warn};

/// Client for the agrofix marketplace API
#[derive(Debug, Clone)]
pub struct AgrofixClient {
    config: ClientConfig,
    client: Client,
}

impl AgrofixClient {
    /// Create a client with the configured timeout
    pub fn new(config: ClientConfig) -> StoreResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| StoreError::Configuration(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self { config, client })
    }

    /// Attach admin headers, or fail before anything is sent
    fn with_admin(&self, request: RequestBuilder) -> StoreResult<RequestBuilder> {
        let creds = self.config.admin_credentials()?;
        Ok(request
            .header("username", &creds.username)
            .header("password", &creds.password))
    }

    async fn send(request: RequestBuilder) -> StoreResult<Response> {
        request
            .send()
            .await
            .map_err(|e| StoreError::NetworkError(e.to_string()))
    }
}

/// Read the body, mapping non-2xx answers to typed errors
async fn read_body(response: Response) -> StoreResult<String> {
    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|e| StoreError::NetworkError(e.to_string()))?;

    if status.is_success() {
        return Ok(body);
    }

    error!("Agrofix API error: status={}, body={}", status, body);

    let message = serde_json::from_str::<ApiErrorResponse>(&body)
        .ok()
        .and_then(|e| e.message.or(e.error))
        .unwrap_or_else(|| format!("HTTP {}: {}", status, body));

    if status == StatusCode::NOT_FOUND {
        return Err(StoreError::NotFound(message));
    }

    Err(StoreError::Api {
        status: status.as_u16(),
        message,
    })
}

async fn read_json<T: DeserializeOwned>(response: Response) -> StoreResult<T> {
    let body = read_body(response).await?;
    serde_json::from_str(&body).map_err(|e| {
        StoreError::Serialization(format!("Failed to parse agrofix response: {}", e))
    })
}

#[async_trait]
impl StorefrontApi for AgrofixClient {
    #[instrument(skip(self))]
    async fn list_products(&self) -> StoreResult<Vec<Product>> {
        let url = self.config.endpoint("/api/products");
        let response = Self::send(self.client.get(&url)).await?;
        let envelope: ProductsEnvelope = read_json(response).await?;

        if !envelope.success {
            return Err(StoreError::Api {
                status: 200,
                message: envelope
                    .message
                    .unwrap_or_else(|| "failed to fetch products".to_string()),
            });
        }

        let products: Vec<Product> = decode_entries(envelope.data, "product");
        Ok(products)
    }

    #[instrument(skip(self, payload), fields(items = payload.items().len()))]
    async fn place_order(&self, payload: &CheckoutPayload) -> StoreResult<OrderReceipt> {
        let url = self.config.endpoint("/api/orders");
        let response = Self::send(self.client.post(&url).json(payload)).await?;

        // Rejections may arrive as 4xx with the same envelope
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| StoreError::NetworkError(e.to_string()))?;

        match serde_json::from_str::<OrderAck>(&body) {
            Ok(ack) => {
                let receipt = ack.into_result()?;
                info!("Order accepted by {}", self.backend_name());
                Ok(receipt)
            }
            Err(_) if !status.is_success() => {
                error!("Agrofix API error: status={}, body={}", status, body);
                Err(StoreError::Api {
                    status: status.as_u16(),
                    message: format!("HTTP {}: {}", status, body),
                })
            }
            Err(e) => Err(StoreError::Serialization(format!(
                "Failed to parse order response: {}",
                e
            ))),
        }
    }

    #[instrument(skip(self))]
    async fn orders_for_phone(&self, phone: &str) -> StoreResult<Vec<Order>> {
        let url = self.config.endpoint("/api/user/orders");
        let request = self.client.get(&url).query(&[("phone", phone)]);
        let envelope: OrdersEnvelope = read_json(Self::send(request).await?).await?;
        Ok(decode_entries(envelope.orders.unwrap_or_default(), "order"))
    }
}

#[async_trait]
impl AdminApi for AgrofixClient {
    #[instrument(skip(self))]
    async fn list_all_orders(&self) -> StoreResult<Vec<Order>> {
        let url = self.config.endpoint("/api/admin/orders");
        let request = self.with_admin(self.client.get(&url))?;
        let envelope: OrdersEnvelope = read_json(Self::send(request).await?).await?;
        Ok(decode_entries(envelope.orders.unwrap_or_default(), "order"))
    }

    #[instrument(skip(self, product), fields(name = %product.name))]
    async fn add_product(&self, product: &NewProduct) -> StoreResult<()> {
        product.validate()?;
        let url = self.config.endpoint("/api/products");
        let request = self.with_admin(self.client.post(&url).json(product))?;
        read_body(Self::send(request).await?).await?;
        info!("Added product '{}'", product.name);
        Ok(())
    }

    #[instrument(skip(self))]
    async fn delete_product(&self, id: ProductId) -> StoreResult<()> {
        let url = self.config.endpoint(&format!("/api/products/{}", id));
        let request = self.with_admin(self.client.delete(&url))?;
        read_body(Self::send(request).await?).await?;
        info!("Deleted product {}", id);
        Ok(())
    }

    #[instrument(skip(self))]
    async fn update_order_status(&self, order_id: i64, status: &OrderStatus) -> StoreResult<()> {
        let url = self
            .config
            .endpoint(&format!("/api/admin/orders/{}/status", order_id));
        let body = StatusUpdate {
            status: status.as_str(),
        };
        let request = self.with_admin(self.client.put(&url).json(&body))?;
        read_body(Self::send(request).await?).await?;
        info!("Order {} updated to \"{}\"", order_id, status);
        Ok(())
    }
}

/// Decode each listing entry on its own, dropping the ones that do not parse
fn decode_entries<T: DeserializeOwned>(raw: Vec<serde_json::Value>, kind: &str) -> Vec<T> {
    let fetched = raw.len();
    let decoded: Vec<T> = raw
        .into_iter()
        .filter_map(|entry| match serde_json::from_value::<T>(entry) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!("Rejected {} from listing: {}", kind, e);
                None
            }
        })
        .collect();

    debug!(
        "Fetched {} {}s ({} rejected)",
        decoded.len(),
        kind,
        fetched - decoded.len()
    );
    decoded
}

// =============================================================================
// Agrofix API Types
// =============================================================================

fn default_success() -> bool {
    true
}

#[derive(Debug, Deserialize)]
struct ProductsEnvelope {
    #[serde(default = "default_success")]
    success: bool,
    #[serde(default)]
    data: Vec<serde_json::Value>,
    #[serde(default)]
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OrdersEnvelope {
    #[serde(default)]
    orders: Option<Vec<serde_json::Value>>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorResponse {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Serialize)]
struct StatusUpdate<'a> {
    status: &'a str,
}
