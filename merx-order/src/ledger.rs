use std::sync::Arc;

use chrono::Utc;
use merx_catalog::ProductRepository;
use merx_core::{DomainError, DomainResult};
use merx_directory::CustomerRepository;
use tracing::info;

use crate::models::{NewOrderItem, Order, OrderItem, OrderLine};
use crate::repository::OrderRepository;

/// The authoritative record of orders and their items. Validates referential
/// integrity against the directory and the catalog, snapshots prices, and
/// hands the assembled order to the store as one atomic write.
pub struct OrderLedger {
    customers: Arc<dyn CustomerRepository>,
    products: Arc<dyn ProductRepository>,
    orders: Arc<dyn OrderRepository>,
}

impl OrderLedger {
    pub fn new(
        customers: Arc<dyn CustomerRepository>,
        products: Arc<dyn ProductRepository>,
        orders: Arc<dyn OrderRepository>,
    ) -> Self {
        Self {
            customers,
            products,
            orders,
        }
    }

    /// Place an order. All validation happens before any write: the customer
    /// must exist, every product must exist, every quantity must be positive.
    /// Each item's unit price is the product's current price at this moment;
    /// later price changes never touch it. Stock decrements and inserts are
    /// atomic at the store, so failure leaves no partial state.
    pub async fn create_order(
        &self,
        customer_id: i64,
        lines: &[OrderLine],
    ) -> DomainResult<(Order, Vec<OrderItem>)> {
        self.customers
            .find(customer_id)
            .await?
            .ok_or(DomainError::UnknownCustomer(customer_id))?;

        let mut items = Vec::with_capacity(lines.len());
        for line in lines {
            if line.quantity <= 0 {
                return Err(DomainError::InvalidQuantity(line.quantity));
            }
            let product = self
                .products
                .find(line.product_id)
                .await?
                .ok_or(DomainError::UnknownProduct(line.product_id))?;

            items.push(NewOrderItem {
                product_id: product.id,
                quantity: line.quantity,
                unit_price: product.price,
            });
        }

        let (order, items) = self.orders.create(customer_id, Utc::now(), items).await?;

        info!(
            "Placed order {} for customer {} (total {})",
            order.id, order.customer_id, order.total_amount
        );
        Ok((order, items))
    }

    pub async fn get_order(&self, id: i64) -> DomainResult<(Order, Vec<OrderItem>)> {
        self.orders
            .get(id)
            .await?
            .ok_or(DomainError::NotFound { entity: "order", id })
    }

    /// A customer's orders, oldest first. Unknown customers simply have none.
    pub async fn list_orders_for_customer(&self, customer_id: i64) -> DomainResult<Vec<Order>> {
        self.orders.list_for_customer(customer_id).await
    }
}
