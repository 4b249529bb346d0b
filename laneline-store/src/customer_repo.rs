use chrono::{DateTime, Utc};
use sqlx::PgPool;

use laneline_core::Customer;

use crate::error::StoreError;

pub struct CustomerRepository {
    pool: PgPool,
}

#[derive(sqlx::FromRow)]
struct CustomerRow {
    email: String,
    name: String,
    phone: Option<String>,
    updated_at: DateTime<Utc>,
}

impl CustomerRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Opportunistic contact-directory write, keyed by email.
    pub async fn upsert(
        &self,
        email: &str,
        name: &str,
        phone: Option<&str>,
    ) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT INTO customers (email, name, phone, updated_at) \
             VALUES ($1, $2, $3, NOW()) \
             ON CONFLICT (email) DO UPDATE \
             SET name = EXCLUDED.name, \
                 phone = COALESCE(EXCLUDED.phone, customers.phone), \
                 updated_at = NOW()",
        )
        .bind(email)
        .bind(name)
        .bind(phone)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    pub async fn find_by_email(&self, email: &str) -> Result<Option<Customer>, StoreError> {
        let row: Option<CustomerRow> = sqlx::query_as(
            "SELECT email, name, phone, updated_at FROM customers WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|r| Customer {
            email: r.email,
            name: r.name,
            phone: r.phone,
            updated_at: r.updated_at,
        }))
    }
}
