use chrono::{DateTime, Utc};
use merx_directory::Customer;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Per-customer order count. Customers with no orders appear with a zero.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CustomerOrderCount {
    pub customer: Customer,
    pub order_count: i64,
}

/// One row per order item, flattened across Order -> Customer and
/// OrderItem -> Product for display. Not a stored structure.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct OrderDetail {
    pub order_id: i64,
    pub customer_name: String,
    pub product_name: String,
    pub quantity: i64,
    pub unit_price: Decimal,
    pub placed_at: DateTime<Utc>,
}
