pub mod money;

use rust_decimal::Decimal;

/// Failures surfaced by the directory, catalog, ledger, and stores
#[derive(Debug, thiserror::Error)]
pub enum DomainError {
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: i64 },

    #[error("Email already registered: {0}")]
    DuplicateEmail(String),

    #[error("Price must not be negative: {0}")]
    InvalidPrice(Decimal),

    #[error("Stock must not be negative: {0}")]
    InvalidStock(i64),

    #[error("Quantity must be positive: {0}")]
    InvalidQuantity(i64),

    #[error("Unknown customer: {0}")]
    UnknownCustomer(i64),

    #[error("Insufficient stock for product {product_id}: requested {requested}, available {available}")]
    InsufficientStock {
        product_id: i64,
        requested: i64,
        available: i64,
    },

    #[error("Unknown product: {0}")]
    UnknownProduct(i64),

    #[error("Storage backend error: {0}")]
    Backend(String),
}

pub type DomainResult<T> = Result<T, DomainError>;
