use std::sync::Arc;

use merx_core::{money, DomainError, DomainResult};
use rust_decimal::Decimal;
use tracing::info;

use crate::product::{NewProduct, Product};
use crate::repository::ProductRepository;

/// Owns the product catalog: entry validation, stock adjustment, threshold scans
pub struct Catalog {
    repo: Arc<dyn ProductRepository>,
}

impl Catalog {
    pub fn new(repo: Arc<dyn ProductRepository>) -> Self {
        Self { repo }
    }

    /// Add a product. The price is normalized to two decimal places before
    /// it is persisted.
    pub async fn add(
        &self,
        name: &str,
        description: Option<&str>,
        price: Decimal,
        stock: i64,
    ) -> DomainResult<Product> {
        if price < Decimal::ZERO {
            return Err(DomainError::InvalidPrice(price));
        }
        if stock < 0 {
            return Err(DomainError::InvalidStock(stock));
        }

        let product = self
            .repo
            .insert(NewProduct {
                name: name.to_string(),
                description: description.map(str::to_string),
                price: money::to_cents(price),
                stock,
            })
            .await?;

        info!("Added product {} ({} @ {})", product.id, product.name, product.price);
        Ok(product)
    }

    pub async fn find(&self, id: i64) -> DomainResult<Product> {
        self.repo
            .find(id)
            .await?
            .ok_or(DomainError::NotFound {
                entity: "product",
                id,
            })
    }

    /// Restock (positive delta) or draw down (negative delta) a product.
    pub async fn adjust_stock(&self, id: i64, delta: i64) -> DomainResult<Product> {
        self.repo.adjust_stock(id, delta).await
    }

    /// Products whose stock has fallen below the threshold.
    pub async fn low_stock(&self, threshold: i64) -> DomainResult<Vec<Product>> {
        self.repo.below_stock(threshold).await
    }
}
