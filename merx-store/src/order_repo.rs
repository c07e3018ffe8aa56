use async_trait::async_trait;
use chrono::{DateTime, Utc};
use merx_core::{DomainError, DomainResult};
use merx_order::{NewOrderItem, Order, OrderItem, OrderRepository};
use rust_decimal::Decimal;
use sqlx::PgPool;
use tracing::warn;

use crate::backend;

pub struct PgOrderRepository {
    pool: PgPool,
}

impl PgOrderRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct OrderRow {
    id: i64,
    customer_id: i64,
    placed_at: DateTime<Utc>,
    total_amount: Decimal,
}

impl From<OrderRow> for Order {
    fn from(row: OrderRow) -> Self {
        Order {
            id: row.id,
            customer_id: row.customer_id,
            placed_at: row.placed_at,
            total_amount: row.total_amount,
        }
    }
}

#[derive(sqlx::FromRow)]
struct OrderItemRow {
    id: i64,
    order_id: i64,
    product_id: i64,
    quantity: i64,
    unit_price: Decimal,
}

impl From<OrderItemRow> for OrderItem {
    fn from(row: OrderItemRow) -> Self {
        OrderItem {
            id: row.id,
            order_id: row.order_id,
            product_id: row.product_id,
            quantity: row.quantity,
            unit_price: row.unit_price,
        }
    }
}

#[async_trait]
impl OrderRepository for PgOrderRepository {
    async fn create(
        &self,
        customer_id: i64,
        placed_at: DateTime<Utc>,
        items: Vec<NewOrderItem>,
    ) -> DomainResult<(Order, Vec<OrderItem>)> {
        let mut tx = self.pool.begin().await.map_err(backend)?;

        let (order_id,): (i64,) = sqlx::query_as(
            "INSERT INTO orders (customer_id, placed_at, total_amount) VALUES ($1, $2, 0) RETURNING id",
        )
        .bind(customer_id)
        .bind(placed_at)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db) if db.is_foreign_key_violation() => {
                DomainError::UnknownCustomer(customer_id)
            }
            _ => backend(e),
        })?;

        let mut rows = Vec::with_capacity(items.len());
        for item in &items {
            // Guarded decrement serializes concurrent orders on the same
            // product; zero affected rows means the guard (or the id) failed.
            // Returning early drops the transaction and rolls everything back.
            let updated =
                sqlx::query("UPDATE products SET stock = stock - $2 WHERE id = $1 AND stock >= $2")
                    .bind(item.product_id)
                    .bind(item.quantity)
                    .execute(&mut *tx)
                    .await
                    .map_err(backend)?;

            if updated.rows_affected() == 0 {
                let available: Option<(i64,)> =
                    sqlx::query_as("SELECT stock FROM products WHERE id = $1")
                        .bind(item.product_id)
                        .fetch_optional(&mut *tx)
                        .await
                        .map_err(backend)?;

                return Err(match available {
                    Some((stock,)) => {
                        warn!(
                            "Rejected order for customer {}: product {} has {} in stock, {} requested",
                            customer_id, item.product_id, stock, item.quantity
                        );
                        DomainError::InsufficientStock {
                            product_id: item.product_id,
                            requested: item.quantity,
                            available: stock,
                        }
                    }
                    None => DomainError::UnknownProduct(item.product_id),
                });
            }

            let row = sqlx::query_as::<_, OrderItemRow>(
                "INSERT INTO order_items (order_id, product_id, quantity, unit_price) \
                 VALUES ($1, $2, $3, $4) RETURNING id, order_id, product_id, quantity, unit_price",
            )
            .bind(order_id)
            .bind(item.product_id)
            .bind(item.quantity)
            .bind(item.unit_price)
            .fetch_one(&mut *tx)
            .await
            .map_err(backend)?;

            rows.push(row.into());
        }

        // Total is derived from the item rows inside the same transaction,
        // never taken from the caller.
        let order = sqlx::query_as::<_, OrderRow>(
            "UPDATE orders SET total_amount = \
               (SELECT COALESCE(SUM(quantity * unit_price), 0) FROM order_items WHERE order_id = $1) \
             WHERE id = $1 RETURNING id, customer_id, placed_at, total_amount",
        )
        .bind(order_id)
        .fetch_one(&mut *tx)
        .await
        .map_err(backend)?;

        tx.commit().await.map_err(backend)?;

        Ok((order.into(), rows))
    }

    async fn get(&self, id: i64) -> DomainResult<Option<(Order, Vec<OrderItem>)>> {
        let order = sqlx::query_as::<_, OrderRow>(
            "SELECT id, customer_id, placed_at, total_amount FROM orders WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(backend)?;

        let Some(order) = order else {
            return Ok(None);
        };

        let items = sqlx::query_as::<_, OrderItemRow>(
            "SELECT id, order_id, product_id, quantity, unit_price FROM order_items \
             WHERE order_id = $1 ORDER BY id",
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await
        .map_err(backend)?;

        Ok(Some((
            order.into(),
            items.into_iter().map(OrderItem::from).collect(),
        )))
    }

    async fn list_for_customer(&self, customer_id: i64) -> DomainResult<Vec<Order>> {
        let rows = sqlx::query_as::<_, OrderRow>(
            "SELECT id, customer_id, placed_at, total_amount FROM orders \
             WHERE customer_id = $1 ORDER BY placed_at ASC, id ASC",
        )
        .bind(customer_id)
        .fetch_all(&self.pool)
        .await
        .map_err(backend)?;

        Ok(rows.into_iter().map(Order::from).collect())
    }

    async fn list(&self) -> DomainResult<Vec<Order>> {
        let rows = sqlx::query_as::<_, OrderRow>(
            "SELECT id, customer_id, placed_at, total_amount FROM orders ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(backend)?;

        Ok(rows.into_iter().map(Order::from).collect())
    }

    async fn list_items(&self) -> DomainResult<Vec<OrderItem>> {
        let rows = sqlx::query_as::<_, OrderItemRow>(
            "SELECT id, order_id, product_id, quantity, unit_price FROM order_items ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(backend)?;

        Ok(rows.into_iter().map(OrderItem::from).collect())
    }
}
