//! # Product Types
//!
//! Catalog types for the agrofix storefront.
//! Products come from `GET /api/products`; numeric fields arrive either as
//! JSON numbers or as numeric strings and are validated on the way in.

use crate::error::{StoreError, StoreResult};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Product identifier assigned by the marketplace API
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductId(pub i64);

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl FromStr for ProductId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse().map(ProductId)
    }
}

impl From<i64> for ProductId {
    fn from(id: i64) -> Self {
        ProductId(id)
    }
}

/// Selling unit of a product
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnitType {
    #[serde(alias = "KG", alias = "Kg")]
    Kg,
    #[serde(alias = "Bunch")]
    Bunch,
    #[serde(alias = "Unit")]
    Unit,
}

impl UnitType {
    pub fn as_str(&self) -> &'static str {
        match self {
            UnitType::Kg => "kg",
            UnitType::Bunch => "bunch",
            UnitType::Unit => "unit",
        }
    }
}

impl Default for UnitType {
    fn default() -> Self {
        UnitType::Kg
    }
}

impl fmt::Display for UnitType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UnitType {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "kg" => Ok(UnitType::Kg),
            "bunch" => Ok(UnitType::Bunch),
            "unit" => Ok(UnitType::Unit),
            other => Err(StoreError::InvalidRequest(format!(
                "unknown unit type: {}",
                other
            ))),
        }
    }
}

/// Format an amount in rupees for display (e.g., "₹120", "₹62.5")
pub fn format_rupees(amount: Decimal) -> String {
    format!("₹{}", amount.normalize())
}

/// A product in the catalog
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawProduct")]
pub struct Product {
    pub id: ProductId,

    /// Display name
    pub name: String,

    #[serde(default)]
    pub description: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,

    #[serde(default)]
    pub image_url: String,

    /// Free-text price line shown on the card (e.g., "₹30 per bunch")
    #[serde(default)]
    pub price_details: String,

    /// Price per selling unit
    #[serde(
        rename = "price_per_kg",
        serialize_with = "rust_decimal::serde::float::serialize"
    )]
    pub price_per_unit: Decimal,

    /// Units currently in stock
    #[serde(rename = "stock_kg", serialize_with = "rust_decimal::serde::float::serialize")]
    pub stock: Decimal,

    /// Smallest quantity that may be ordered
    #[serde(
        rename = "min_order_kg",
        serialize_with = "rust_decimal::serde::float::serialize"
    )]
    pub min_order_quantity: Decimal,

    #[serde(default)]
    pub unit_type: UnitType,

    /// Bulk discount blurb (e.g., "10% off on 10kg+")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bulk_discount: Option<String>,

    /// Whether the product can currently be added to a cart
    #[serde(default = "default_true")]
    pub availability: bool,
}

fn default_true() -> bool {
    true
}

impl Product {
    /// Create an available product with required fields
    pub fn new(
        id: impl Into<ProductId>,
        name: impl Into<String>,
        price_per_unit: Decimal,
        unit_type: UnitType,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: String::new(),
            category: None,
            image_url: String::new(),
            price_details: String::new(),
            price_per_unit,
            stock: Decimal::ZERO,
            min_order_quantity: Decimal::ONE,
            unit_type,
            bulk_discount: None,
            availability: true,
        }
    }

    /// Builder: set stock
    pub fn with_stock(mut self, stock: Decimal) -> Self {
        self.stock = stock;
        self
    }

    /// Builder: set minimum order quantity
    pub fn with_min_order(mut self, min: Decimal) -> Self {
        self.min_order_quantity = min;
        self
    }

    /// Whether the product can be put in a cart right now
    pub fn is_purchasable(&self) -> bool {
        self.availability && self.stock > Decimal::ZERO
    }

    /// Check the numeric invariants the cart relies on
    pub fn validate(&self) -> StoreResult<()> {
        check_fields(
            &self.id.to_string(),
            &self.name,
            self.price_per_unit,
            self.stock,
            self.min_order_quantity,
        )
    }
}

fn check_fields(
    id: &str,
    name: &str,
    price: Decimal,
    stock: Decimal,
    min_order: Decimal,
) -> StoreResult<()> {
    let invalid = |reason: &str| StoreError::InvalidProduct {
        product_id: id.to_string(),
        reason: reason.to_string(),
    };

    if name.trim().is_empty() {
        return Err(invalid("name is empty"));
    }
    if price < Decimal::ZERO {
        return Err(invalid("price must not be negative"));
    }
    if stock < Decimal::ZERO {
        return Err(invalid("stock must not be negative"));
    }
    if min_order <= Decimal::ZERO {
        return Err(invalid("minimum order must be positive"));
    }
    Ok(())
}

/// Wire shape of a product before validation
#[derive(Debug, Deserialize)]
struct RawProduct {
    id: ProductId,
    name: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    category: Option<String>,
    #[serde(default)]
    image_url: Option<String>,
    #[serde(default)]
    price_details: Option<String>,
    price_per_kg: Decimal,
    #[serde(default)]
    stock_kg: Decimal,
    #[serde(default = "default_min_order")]
    min_order_kg: Decimal,
    #[serde(default)]
    unit_type: UnitType,
    #[serde(default)]
    bulk_discount: Option<String>,
    #[serde(default = "default_true")]
    availability: bool,
}

fn default_min_order() -> Decimal {
    Decimal::ONE
}

impl TryFrom<RawProduct> for Product {
    type Error = StoreError;

    fn try_from(raw: RawProduct) -> Result<Self, Self::Error> {
        let product = Product {
            id: raw.id,
            name: raw.name,
            description: raw.description.unwrap_or_default(),
            category: raw.category.filter(|c| !c.is_empty()),
            image_url: raw.image_url.unwrap_or_default(),
            price_details: raw.price_details.unwrap_or_default(),
            price_per_unit: raw.price_per_kg,
            stock: raw.stock_kg,
            min_order_quantity: raw.min_order_kg,
            unit_type: raw.unit_type,
            bulk_discount: raw.bulk_discount.filter(|d| !d.is_empty()),
            availability: raw.availability,
        };
        product.validate()?;
        Ok(product)
    }
}

/// Admin payload for `POST /api/products`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewProduct {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub image_url: String,
    #[serde(default)]
    pub price_details: String,
    #[serde(serialize_with = "rust_decimal::serde::float::serialize")]
    pub price_per_kg: Decimal,
    #[serde(serialize_with = "rust_decimal::serde::float::serialize")]
    pub stock_kg: Decimal,
    #[serde(serialize_with = "rust_decimal::serde::float::serialize")]
    pub min_order_kg: Decimal,
    #[serde(default)]
    pub bulk_discount: String,
    #[serde(default)]
    pub unit_type: UnitType,
    #[serde(default = "default_true")]
    pub availability: bool,
}

impl NewProduct {
    pub fn validate(&self) -> StoreResult<()> {
        check_fields(
            "<new>",
            &self.name,
            self.price_per_kg,
            self.stock_kg,
            self.min_order_kg,
        )
    }
}

/// Product catalog as fetched from the API
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProductCatalog {
    pub products: Vec<Product>,
}

impl ProductCatalog {
    pub fn new(products: Vec<Product>) -> Self {
        Self { products }
    }

    /// Find a product by ID
    pub fn get(&self, id: ProductId) -> Option<&Product> {
        self.products.iter().find(|p| p.id == id)
    }

    /// Products that can be added to a cart
    pub fn available_products(&self) -> impl Iterator<Item = &Product> {
        self.products.iter().filter(|p| p.availability)
    }

    pub fn len(&self) -> usize {
        self.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }
}
