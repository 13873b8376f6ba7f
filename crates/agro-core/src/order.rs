//! # Order Types
//!
//! Orders as returned by the tracking and admin endpoints, plus the
//! filter/sort/count helpers both order pages are built on.

use crate::error::StoreError;
use crate::product::{format_rupees, UnitType};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// Fulfilment status of a placed order
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum OrderStatus {
    Pending,
    Confirmed,
    Delivered,
    /// Any status this client does not know about
    Other(String),
}

impl OrderStatus {
    pub fn as_str(&self) -> &str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Confirmed => "confirmed",
            OrderStatus::Delivered => "delivered",
            OrderStatus::Other(raw) => raw,
        }
    }
}

impl Default for OrderStatus {
    fn default() -> Self {
        OrderStatus::Pending
    }
}

impl From<String> for OrderStatus {
    fn from(raw: String) -> Self {
        match raw.trim().to_lowercase().as_str() {
            "pending" => OrderStatus::Pending,
            "confirmed" => OrderStatus::Confirmed,
            "delivered" => OrderStatus::Delivered,
            _ => OrderStatus::Other(raw),
        }
    }
}

impl From<OrderStatus> for String {
    fn from(status: OrderStatus) -> Self {
        status.as_str().to_string()
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = StoreError;

    /// Strict parse: only the statuses an admin can assign
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match OrderStatus::from(s.to_string()) {
            OrderStatus::Other(raw) => Err(StoreError::InvalidRequest(format!(
                "unknown order status '{}' (expected pending, confirmed or delivered)",
                raw
            ))),
            known => Ok(known),
        }
    }
}

/// One line of an order's cart summary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderLine {
    pub product_name: String,
    pub quantity: Decimal,
    /// `None` when the backend sent no unit or one this client does not know
    #[serde(default, deserialize_with = "lenient_unit")]
    pub unit_type: Option<UnitType>,
    #[serde(rename = "price_per_kg")]
    pub unit_price: Decimal,
    pub total_price: Decimal,
}

impl OrderLine {
    /// Unit label for display; empty when unknown
    pub fn unit_label(&self) -> &'static str {
        self.unit_type.map_or("", |unit| unit.as_str())
    }
}

fn lenient_unit<'de, D>(deserializer: D) -> Result<Option<UnitType>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<Value>::deserialize(deserializer)?;
    Ok(raw
        .as_ref()
        .and_then(Value::as_str)
        .and_then(|unit| unit.parse().ok()))
}

/// A placed order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: i64,
    pub buyer_name: String,
    pub buyer_contact: String,
    pub delivery_address: String,
    /// Normalized token, e.g. `cash_on_delivery`
    pub payment_method: String,
    #[serde(default)]
    pub status: OrderStatus,
    pub total_amount: Decimal,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub cart_summary: Vec<OrderLine>,
}

impl Order {
    /// `cash_on_delivery` → `cash on delivery`
    pub fn payment_method_label(&self) -> String {
        self.payment_method.replace('_', " ")
    }

    pub fn total_display(&self) -> String {
        format_rupees(self.total_amount)
    }
}

/// Which orders a listing shows
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum StatusFilter {
    #[default]
    All,
    Only(OrderStatus),
}

impl StatusFilter {
    pub fn matches(&self, order: &Order) -> bool {
        match self {
            StatusFilter::All => true,
            StatusFilter::Only(status) => order.status == *status,
        }
    }
}

impl FromStr for StatusFilter {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("all") {
            return Ok(StatusFilter::All);
        }
        s.parse().map(StatusFilter::Only)
    }
}

/// Ordering applied to an order listing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OrderSort {
    #[default]
    Newest,
    Oldest,
    HighestAmount,
    LowestAmount,
    /// Status name A-Z
    StatusAsc,
    StatusDesc,
}

impl OrderSort {
    fn compare(&self, a: &Order, b: &Order) -> Ordering {
        match self {
            OrderSort::Newest => b.created_at.cmp(&a.created_at),
            OrderSort::Oldest => a.created_at.cmp(&b.created_at),
            OrderSort::HighestAmount => b.total_amount.cmp(&a.total_amount),
            OrderSort::LowestAmount => a.total_amount.cmp(&b.total_amount),
            OrderSort::StatusAsc => a.status.as_str().cmp(b.status.as_str()),
            OrderSort::StatusDesc => b.status.as_str().cmp(a.status.as_str()),
        }
    }
}

impl FromStr for OrderSort {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "newest" => Ok(OrderSort::Newest),
            "oldest" => Ok(OrderSort::Oldest),
            "highestAmount" | "amount-desc" => Ok(OrderSort::HighestAmount),
            "lowestAmount" | "amount-asc" => Ok(OrderSort::LowestAmount),
            "statusAsc" | "status" => Ok(OrderSort::StatusAsc),
            "statusDesc" => Ok(OrderSort::StatusDesc),
            other => Err(StoreError::InvalidRequest(format!(
                "unknown sort order '{}'",
                other
            ))),
        }
    }
}

/// Filter then stable-sort `orders`
pub fn arrange_orders<'a>(
    orders: &'a [Order],
    filter: &StatusFilter,
    sort: OrderSort,
) -> Vec<&'a Order> {
    let mut shown: Vec<&Order> = orders.iter().filter(|o| filter.matches(o)).collect();
    shown.sort_by(|a, b| sort.compare(a, b));
    shown
}

/// Per-status order counts shown on the filter tabs
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatusCounts {
    pub all: usize,
    pub pending: usize,
    pub confirmed: usize,
    pub delivered: usize,
}

impl StatusCounts {
    pub fn tally(orders: &[Order]) -> Self {
        orders.iter().fold(
            StatusCounts {
                all: orders.len(),
                ..Default::default()
            },
            |mut counts, order| {
                match order.status {
                    OrderStatus::Pending => counts.pending += 1,
                    OrderStatus::Confirmed => counts.confirmed += 1,
                    OrderStatus::Delivered => counts.delivered += 1,
                    OrderStatus::Other(_) => {}
                }
                counts
            },
        )
    }
}
