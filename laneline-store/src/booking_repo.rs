use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use laneline_core::{Booking, BookingStatus, NewBooking};

use crate::error::{ConflictKind, StoreError};

pub struct BookingRepository {
    pool: PgPool,
}

#[derive(sqlx::FromRow)]
struct InsertedBooking {
    id: Uuid,
    created_at: DateTime<Utc>,
}

impl BookingRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find_existing(
        &self,
        time_slot_id: Uuid,
        package_code: &str,
        student_name: &str,
    ) -> Result<Option<Uuid>, StoreError> {
        let id: Option<Uuid> = sqlx::query_scalar(
            "SELECT id FROM bookings \
             WHERE time_slot_id = $1 AND package_code = $2 AND student_name = $3",
        )
        .bind(time_slot_id)
        .bind(package_code)
        .bind(student_name)
        .fetch_optional(&self.pool)
        .await?;

        Ok(id)
    }

    /// The three-way atomic unit: seat increment, lesson decrement, booking
    /// insert - one transaction. The conditional WHERE clauses are the real
    /// capacity/credit checks; handler-side reads are advisory only, so a
    /// losing racer rolls back here instead of overbooking.
    ///
    /// Returns the booking and the package's remaining lesson count.
    pub async fn create_booking(
        &self,
        new: &NewBooking,
    ) -> Result<(Booking, i32), StoreError> {
        let mut tx = self.pool.begin().await?;

        let seat = sqlx::query(
            "UPDATE time_slots \
             SET current_enrollment = current_enrollment + 1 \
             WHERE id = $1 AND status = 'available' \
               AND current_enrollment < max_capacity",
        )
        .bind(new.time_slot_id)
        .execute(&mut *tx)
        .await?;

        if seat.rows_affected() == 0 {
            let exists: bool =
                sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM time_slots WHERE id = $1)")
                    .bind(new.time_slot_id)
                    .fetch_one(&mut *tx)
                    .await?;
            tx.rollback().await?;
            let kind = if exists {
                ConflictKind::SlotFull
            } else {
                ConflictKind::SlotMissing
            };
            return Err(StoreError::Conflict(kind));
        }

        let remaining: Option<i32> = sqlx::query_scalar(
            "UPDATE packages \
             SET lessons_remaining = lessons_remaining - 1, updated_at = NOW() \
             WHERE code = $1 AND lessons_remaining > 0 \
             RETURNING lessons_remaining",
        )
        .bind(&new.package_code)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(remaining) = remaining else {
            tx.rollback().await?;
            return Err(StoreError::Conflict(ConflictKind::PackageSpent));
        };

        let inserted: InsertedBooking = match sqlx::query_as(
            "INSERT INTO bookings \
             (id, time_slot_id, package_code, student_name, student_birthdate, \
              customer_name, customer_email, customer_phone, notes, status) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10) \
             RETURNING id, created_at",
        )
        .bind(Uuid::new_v4())
        .bind(new.time_slot_id)
        .bind(&new.package_code)
        .bind(&new.student_name)
        .bind(new.student_birthdate)
        .bind(&new.customer_name)
        .bind(&new.customer_email)
        .bind(&new.customer_phone)
        .bind(&new.notes)
        .bind(BookingStatus::Confirmed.as_str())
        .fetch_one(&mut *tx)
        .await
        {
            Ok(row) => row,
            Err(sqlx::Error::Database(db)) if db.is_unique_violation() => {
                tx.rollback().await?;
                return Err(StoreError::Conflict(ConflictKind::DuplicateBooking));
            }
            Err(e) => {
                tx.rollback().await?;
                return Err(e.into());
            }
        };

        tx.commit().await?;

        let booking = Booking {
            id: inserted.id,
            time_slot_id: new.time_slot_id,
            package_code: new.package_code.clone(),
            student_name: new.student_name.clone(),
            student_birthdate: new.student_birthdate,
            customer_name: new.customer_name.clone(),
            customer_email: new.customer_email.clone(),
            customer_phone: new.customer_phone.clone(),
            notes: new.notes.clone(),
            status: BookingStatus::Confirmed,
            created_at: inserted.created_at,
        };

        Ok((booking, remaining))
    }

    pub async fn count(&self) -> Result<i64, StoreError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM bookings")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}
