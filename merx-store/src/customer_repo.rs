use async_trait::async_trait;
use chrono::{DateTime, Utc};
use merx_core::{DomainError, DomainResult};
use merx_directory::{Customer, CustomerRepository, NewCustomer};
use sqlx::PgPool;

use crate::backend;

pub struct PgCustomerRepository {
    pool: PgPool,
}

impl PgCustomerRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct CustomerRow {
    id: i64,
    name: String,
    email: String,
    created_at: DateTime<Utc>,
}

impl From<CustomerRow> for Customer {
    fn from(row: CustomerRow) -> Self {
        Customer {
            id: row.id,
            name: row.name,
            email: row.email,
            created_at: row.created_at,
        }
    }
}

#[async_trait]
impl CustomerRepository for PgCustomerRepository {
    async fn insert(&self, new: NewCustomer) -> DomainResult<Customer> {
        let row = sqlx::query_as::<_, CustomerRow>(
            "INSERT INTO customers (name, email) VALUES ($1, $2) RETURNING id, name, email, created_at",
        )
        .bind(&new.name)
        .bind(&new.email)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                DomainError::DuplicateEmail(new.email.clone())
            }
            _ => backend(e),
        })?;

        Ok(row.into())
    }

    async fn find(&self, id: i64) -> DomainResult<Option<Customer>> {
        let row = sqlx::query_as::<_, CustomerRow>(
            "SELECT id, name, email, created_at FROM customers WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(backend)?;

        Ok(row.map(Customer::from))
    }

    async fn list(&self) -> DomainResult<Vec<Customer>> {
        let rows = sqlx::query_as::<_, CustomerRow>(
            "SELECT id, name, email, created_at FROM customers ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(backend)?;

        Ok(rows.into_iter().map(Customer::from).collect())
    }
}
