use async_trait::async_trait;
use merx_core::DomainResult;

use crate::customer::{Customer, NewCustomer};

/// Repository trait for customer data access
#[async_trait]
pub trait CustomerRepository: Send + Sync {
    /// Persist a new customer; fails with DuplicateEmail on a taken address.
    async fn insert(&self, new: NewCustomer) -> DomainResult<Customer>;

    async fn find(&self, id: i64) -> DomainResult<Option<Customer>>;

    /// All customers, ordered by id.
    async fn list(&self) -> DomainResult<Vec<Customer>>;
}
