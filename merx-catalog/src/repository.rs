use async_trait::async_trait;
use merx_core::DomainResult;

use crate::product::{NewProduct, Product};

/// Repository trait for product catalog access
#[async_trait]
pub trait ProductRepository: Send + Sync {
    async fn insert(&self, new: NewProduct) -> DomainResult<Product>;

    async fn find(&self, id: i64) -> DomainResult<Option<Product>>;

    /// All products, ordered by id.
    async fn list(&self) -> DomainResult<Vec<Product>>;

    /// Apply a stock delta atomically; fails with InsufficientStock when the
    /// resulting stock would be negative, NotFound for an unknown id.
    async fn adjust_stock(&self, id: i64, delta: i64) -> DomainResult<Product>;

    /// Products with stock strictly below the threshold. No ordering guarantee.
    async fn below_stock(&self, threshold: i64) -> DomainResult<Vec<Product>>;
}
