use async_trait::async_trait;
use chrono::{DateTime, Utc};
use merx_catalog::{NewProduct, Product, ProductRepository};
use merx_core::{DomainError, DomainResult};
use rust_decimal::Decimal;
use sqlx::PgPool;
use tracing::warn;

use crate::backend;

pub struct PgProductRepository {
    pool: PgPool,
}

impl PgProductRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct ProductRow {
    id: i64,
    name: String,
    description: Option<String>,
    price: Decimal,
    stock: i64,
    created_at: DateTime<Utc>,
}

impl From<ProductRow> for Product {
    fn from(row: ProductRow) -> Self {
        Product {
            id: row.id,
            name: row.name,
            description: row.description,
            price: row.price,
            stock: row.stock,
            created_at: row.created_at,
        }
    }
}

const PRODUCT_COLUMNS: &str = "id, name, description, price, stock, created_at";

#[async_trait]
impl ProductRepository for PgProductRepository {
    async fn insert(&self, new: NewProduct) -> DomainResult<Product> {
        let row = sqlx::query_as::<_, ProductRow>(
            "INSERT INTO products (name, description, price, stock) VALUES ($1, $2, $3, $4) \
             RETURNING id, name, description, price, stock, created_at",
        )
        .bind(&new.name)
        .bind(&new.description)
        .bind(new.price)
        .bind(new.stock)
        .fetch_one(&self.pool)
        .await
        .map_err(backend)?;

        Ok(row.into())
    }

    async fn find(&self, id: i64) -> DomainResult<Option<Product>> {
        let row = sqlx::query_as::<_, ProductRow>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(backend)?;

        Ok(row.map(Product::from))
    }

    async fn list(&self) -> DomainResult<Vec<Product>> {
        let rows = sqlx::query_as::<_, ProductRow>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products ORDER BY id"
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(backend)?;

        Ok(rows.into_iter().map(Product::from).collect())
    }

    async fn adjust_stock(&self, id: i64, delta: i64) -> DomainResult<Product> {
        // One guarded statement; zero rows means the guard (or the id) failed.
        let row = sqlx::query_as::<_, ProductRow>(
            "UPDATE products SET stock = stock + $2 WHERE id = $1 AND stock + $2 >= 0 \
             RETURNING id, name, description, price, stock, created_at",
        )
        .bind(id)
        .bind(delta)
        .fetch_optional(&self.pool)
        .await
        .map_err(backend)?;

        if let Some(row) = row {
            return Ok(row.into());
        }

        let current: Option<(i64,)> = sqlx::query_as("SELECT stock FROM products WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(backend)?;

        match current {
            Some((stock,)) => {
                warn!("Rejected stock adjustment on product {}: {} + {}", id, stock, delta);
                Err(DomainError::InsufficientStock {
                    product_id: id,
                    requested: -delta,
                    available: stock,
                })
            }
            None => Err(DomainError::NotFound {
                entity: "product",
                id,
            }),
        }
    }

    async fn below_stock(&self, threshold: i64) -> DomainResult<Vec<Product>> {
        let rows = sqlx::query_as::<_, ProductRow>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE stock < $1"
        ))
        .bind(threshold)
        .fetch_all(&self.pool)
        .await
        .map_err(backend)?;

        Ok(rows.into_iter().map(Product::from).collect())
    }
}
