use std::collections::HashMap;
use std::sync::Arc;

use merx_catalog::{Product, ProductRepository};
use merx_core::{money, DomainResult};
use merx_directory::CustomerRepository;
use merx_order::OrderRepository;
use rust_decimal::Decimal;
use tracing::debug;

use crate::views::{CustomerOrderCount, OrderDetail};

/// Read-only aggregations over the ledger, the directory, and the catalog.
/// Aggregates over empty data return zero or empty, never an error.
pub struct ReportingEngine {
    customers: Arc<dyn CustomerRepository>,
    products: Arc<dyn ProductRepository>,
    orders: Arc<dyn OrderRepository>,
}

impl ReportingEngine {
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

    /// Sum of total_amount over all orders; zero when none exist.
    pub async fn total_revenue(&self) -> DomainResult<Decimal> {
        let orders = self.orders.list().await?;
        Ok(orders.iter().map(|o| o.total_amount).sum())
    }

    /// Arithmetic mean of order totals, rounded to currency precision.
    /// None when there are no orders.
    pub async fn average_order_value(&self) -> DomainResult<Option<Decimal>> {
        let orders = self.orders.list().await?;
        if orders.is_empty() {
            return Ok(None);
        }

        let total: Decimal = orders.iter().map(|o| o.total_amount).sum();
        let mean = money::to_cents(total / Decimal::from(orders.len() as i64));
        Ok(Some(mean))
    }

    /// Order count for every registered customer, zero-order customers
    /// included. Ordered by customer id.
    pub async fn order_counts_by_customer(&self) -> DomainResult<Vec<CustomerOrderCount>> {
        let customers = self.customers.list().await?;
        let orders = self.orders.list().await?;

        let mut counts: HashMap<i64, i64> = HashMap::new();
        for order in &orders {
            *counts.entry(order.customer_id).or_insert(0) += 1;
        }

        debug!("Counted {} orders across {} customers", orders.len(), customers.len());

        Ok(customers
            .into_iter()
            .map(|customer| {
                let order_count = counts.get(&customer.id).copied().unwrap_or(0);
                CustomerOrderCount {
                    customer,
                    order_count,
                }
            })
            .collect())
    }

    /// Products whose stock has fallen below the threshold; delegates to the
    /// catalog's threshold scan.
    pub async fn low_stock_products(&self, threshold: i64) -> DomainResult<Vec<Product>> {
        self.products.below_stock(threshold).await
    }

    /// One row per order item, joined with its order's customer and its
    /// product. Rows follow item insertion order.
    pub async fn order_details(&self) -> DomainResult<Vec<OrderDetail>> {
        let customers = self.customers.list().await?;
        let products = self.products.list().await?;
        let orders = self.orders.list().await?;
        let items = self.orders.list_items().await?;

        let customer_names: HashMap<i64, String> =
            customers.into_iter().map(|c| (c.id, c.name)).collect();
        let product_names: HashMap<i64, String> =
            products.into_iter().map(|p| (p.id, p.name)).collect();
        let order_index: HashMap<i64, (i64, chrono::DateTime<chrono::Utc>)> = orders
            .into_iter()
            .map(|o| (o.id, (o.customer_id, o.placed_at)))
            .collect();

        let mut rows = Vec::with_capacity(items.len());
        for item in items {
            // Items are owned by their order and reference a live product;
            // a dangling row would mean the store broke integrity, so skip it.
            let Some((customer_id, placed_at)) = order_index.get(&item.order_id).copied() else {
                continue;
            };
            let Some(customer_name) = customer_names.get(&customer_id) else {
                continue;
            };
            let Some(product_name) = product_names.get(&item.product_id) else {
                continue;
            };

            rows.push(OrderDetail {
                order_id: item.order_id,
                customer_name: customer_name.clone(),
                product_name: product_name.clone(),
                quantity: item.quantity,
                unit_price: item.unit_price,
                placed_at,
            });
        }

        Ok(rows)
    }
}
