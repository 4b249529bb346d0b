use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use laneline_core::{Package, PackageStatus, Program};

use crate::error::StoreError;

pub struct PackageRepository {
    pool: PgPool,
}

/// Insert input; id and timestamps are assigned here.
#[derive(Debug, Clone)]
pub struct NewPackage {
    pub code: String,
    pub program: Program,
    pub lessons_total: i32,
    pub amount_paid_cents: i32,
    pub payment_reference: Option<String>,
    pub status: PackageStatus,
    pub customer_email: Option<String>,
    pub customer_name: Option<String>,
}

#[derive(sqlx::FromRow)]
struct PackageRow {
    id: Uuid,
    code: String,
    program: String,
    lessons_total: i32,
    lessons_remaining: i32,
    amount_paid_cents: i32,
    payment_reference: Option<String>,
    status: String,
    customer_email: Option<String>,
    customer_name: Option<String>,
    customer_phone: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<PackageRow> for Package {
    type Error = StoreError;

    fn try_from(row: PackageRow) -> Result<Self, StoreError> {
        let program = Program::parse(&row.program)
            .ok_or_else(|| StoreError::Corrupt(format!("unknown program {:?}", row.program)))?;
        let status = PackageStatus::parse(&row.status)
            .ok_or_else(|| StoreError::Corrupt(format!("unknown package status {:?}", row.status)))?;
        Ok(Package {
            id: row.id,
            code: row.code,
            program,
            lessons_total: row.lessons_total,
            lessons_remaining: row.lessons_remaining,
            amount_paid_cents: row.amount_paid_cents,
            payment_reference: row.payment_reference,
            status,
            customer_email: row.customer_email,
            customer_name: row.customer_name,
            customer_phone: row.customer_phone,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

const PACKAGE_COLUMNS: &str = "id, code, program, lessons_total, lessons_remaining, \
     amount_paid_cents, payment_reference, status, customer_email, customer_name, \
     customer_phone, created_at, updated_at";

impl PackageRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// One row per call; lessons_remaining starts equal to lessons_total.
    pub async fn insert(&self, new: &NewPackage) -> Result<Package, StoreError> {
        let sql = format!(
            "INSERT INTO packages \
             (id, code, program, lessons_total, lessons_remaining, amount_paid_cents, \
              payment_reference, status, customer_email, customer_name) \
             VALUES ($1, $2, $3, $4, $4, $5, $6, $7, $8, $9) \
             RETURNING {PACKAGE_COLUMNS}"
        );
        let row: PackageRow = sqlx::query_as(&sql)
            .bind(Uuid::new_v4())
            .bind(&new.code)
            .bind(new.program.as_str())
            .bind(new.lessons_total)
            .bind(new.amount_paid_cents)
            .bind(&new.payment_reference)
            .bind(new.status.as_str())
            .bind(&new.customer_email)
            .bind(&new.customer_name)
            .fetch_one(&self.pool)
            .await?;

        row.try_into()
    }

    pub async fn find_by_code(&self, code: &str) -> Result<Option<Package>, StoreError> {
        let sql = format!("SELECT {PACKAGE_COLUMNS} FROM packages WHERE code = $1");
        let row: Option<PackageRow> = sqlx::query_as(&sql)
            .bind(code)
            .fetch_optional(&self.pool)
            .await?;

        row.map(Package::try_from).transpose()
    }

    pub async fn find_by_payment_reference(
        &self,
        reference: &str,
    ) -> Result<Option<Package>, StoreError> {
        let sql = format!("SELECT {PACKAGE_COLUMNS} FROM packages WHERE payment_reference = $1");
        let row: Option<PackageRow> = sqlx::query_as(&sql)
            .bind(reference)
            .fetch_optional(&self.pool)
            .await?;

        row.map(Package::try_from).transpose()
    }

    /// Idempotent status flip; re-applying to an already-paid package changes
    /// nothing. Returns whether a row matched.
    pub async fn mark_paid(&self, id: Uuid) -> Result<bool, StoreError> {
        let result = sqlx::query(
            "UPDATE packages SET status = 'paid', updated_at = NOW() WHERE id = $1",
        )
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn mark_cancelled_by_reference(&self, reference: &str) -> Result<bool, StoreError> {
        let result = sqlx::query(
            "UPDATE packages SET status = 'cancelled', updated_at = NOW() \
             WHERE payment_reference = $1",
        )
        .bind(reference)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Backfill contact details learned from the payment record. Only fills
    /// what the event carried; existing values are overwritten on purpose
    /// (the processor's billing details are fresher than a checkout form).
    pub async fn backfill_customer(
        &self,
        id: Uuid,
        email: &str,
        name: Option<&str>,
        phone: Option<&str>,
    ) -> Result<(), StoreError> {
        sqlx::query(
            "UPDATE packages SET customer_email = $2, \
             customer_name = COALESCE($3, customer_name), \
             customer_phone = COALESCE($4, customer_phone), \
             updated_at = NOW() WHERE id = $1",
        )
        .bind(id)
        .bind(email)
        .bind(name)
        .bind(phone)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    pub async fn count(&self) -> Result<i64, StoreError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM packages")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}
