use std::sync::Arc;

use merx_core::{DomainError, DomainResult};
use tracing::info;

use crate::customer::{Customer, NewCustomer};
use crate::repository::CustomerRepository;

/// Owns customer registration and lookup
pub struct CustomerDirectory {
    repo: Arc<dyn CustomerRepository>,
}

impl CustomerDirectory {
    pub fn new(repo: Arc<dyn CustomerRepository>) -> Self {
        Self { repo }
    }

    /// Register a new customer. Email uniqueness is enforced by the store.
    pub async fn register(&self, name: &str, email: &str) -> DomainResult<Customer> {
        let customer = self
            .repo
            .insert(NewCustomer {
                name: name.to_string(),
                email: email.to_string(),
            })
            .await?;

        info!("Registered customer {} ({})", customer.id, customer.email);
        Ok(customer)
    }

    pub async fn find(&self, id: i64) -> DomainResult<Customer> {
        self.repo
            .find(id)
            .await?
            .ok_or(DomainError::NotFound {
                entity: "customer",
                id,
            })
    }

    pub async fn list(&self) -> DomainResult<Vec<Customer>> {
        self.repo.list().await
    }
}
