pub mod app_config;
pub mod catalog_repo;
pub mod customer_repo;
pub mod database;
pub mod mem;
pub mod order_repo;

pub use catalog_repo::PgProductRepository;
pub use customer_repo::PgCustomerRepository;
pub use database::DbClient;
pub use mem::MemStore;
pub use order_repo::PgOrderRepository;

use merx_core::DomainError;

pub(crate) fn backend(err: sqlx::Error) -> DomainError {
    DomainError::Backend(err.to_string())
}
