use async_trait::async_trait;
use chrono::{DateTime, Utc};
use merx_core::DomainResult;

use crate::models::{NewOrderItem, Order, OrderItem};

/// Repository trait for order data access
#[async_trait]
pub trait OrderRepository: Send + Sync {
    /// Insert an order with its items and decrement each product's stock by
    /// the ordered quantity, all in one transaction. The order total is
    /// computed from the inserted item rows, never taken from the caller.
    /// Any stock that would go negative fails the whole call with
    /// InsufficientStock and leaves every table untouched.
    async fn create(
        &self,
        customer_id: i64,
        placed_at: DateTime<Utc>,
        items: Vec<NewOrderItem>,
    ) -> DomainResult<(Order, Vec<OrderItem>)>;

    async fn get(&self, id: i64) -> DomainResult<Option<(Order, Vec<OrderItem>)>>;

    /// A customer's orders, oldest first.
    async fn list_for_customer(&self, customer_id: i64) -> DomainResult<Vec<Order>>;

    /// All orders, ordered by id.
    async fn list(&self) -> DomainResult<Vec<Order>>;

    /// All order items across all orders, ordered by id.
    async fn list_items(&self) -> DomainResult<Vec<OrderItem>>;
}
