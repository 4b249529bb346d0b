use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use sqlx::{PgPool, Postgres, QueryBuilder};
use tracing::warn;
use uuid::Uuid;

use laneline_core::{Program, SlotStatus, TimeSlot};
use laneline_schedule::NewSlot;

use crate::error::StoreError;

pub struct SlotRepository {
    pool: PgPool,
}

/// Result of a bulk generation run. `inserted` counts rows actually written;
/// rows already present (conflict-ignored) and rows lost to failed batches
/// account for the difference from `generated`.
#[derive(Debug, Clone, Copy)]
pub struct InsertOutcome {
    pub generated: usize,
    pub inserted: u64,
}

#[derive(sqlx::FromRow)]
struct SlotRow {
    id: Uuid,
    date: NaiveDate,
    start_time: NaiveTime,
    end_time: NaiveTime,
    lesson_type: String,
    group_number: i32,
    max_capacity: i32,
    current_enrollment: i32,
    status: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<SlotRow> for TimeSlot {
    type Error = StoreError;

    fn try_from(row: SlotRow) -> Result<Self, StoreError> {
        let lesson_type = Program::parse(&row.lesson_type).ok_or_else(|| {
            StoreError::Corrupt(format!("unknown lesson type {:?}", row.lesson_type))
        })?;
        let status = SlotStatus::parse(&row.status)
            .ok_or_else(|| StoreError::Corrupt(format!("unknown slot status {:?}", row.status)))?;
        Ok(TimeSlot {
            id: row.id,
            date: row.date,
            start_time: row.start_time,
            end_time: row.end_time,
            lesson_type,
            group_number: row.group_number,
            max_capacity: row.max_capacity,
            current_enrollment: row.current_enrollment,
            status,
            created_at: row.created_at,
        })
    }
}

const SLOT_COLUMNS: &str = "id, date, start_time, end_time, lesson_type, group_number, \
     max_capacity, current_enrollment, status, created_at";

impl SlotRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Bulk insert with conflict-ignore on the schedule key, in batches. A
    /// batch that fails is logged and skipped so one transient error cannot
    /// sink the whole generation run.
    pub async fn insert_slots(
        &self,
        slots: &[NewSlot],
        batch_size: usize,
    ) -> Result<InsertOutcome, StoreError> {
        let mut inserted = 0u64;

        for batch in slots.chunks(batch_size.max(1)) {
            let mut builder: QueryBuilder<Postgres> = QueryBuilder::new(
                "INSERT INTO time_slots \
                 (id, date, start_time, end_time, lesson_type, group_number, \
                  max_capacity, current_enrollment, status) ",
            );
            builder.push_values(batch, |mut b, slot| {
                b.push_bind(Uuid::new_v4())
                    .push_bind(slot.date)
                    .push_bind(slot.start_time)
                    .push_bind(slot.end_time)
                    .push_bind(slot.lesson_type.as_str())
                    .push_bind(slot.group_number)
                    .push_bind(slot.max_capacity)
                    .push_bind(0i32)
                    .push_bind(SlotStatus::Available.as_str());
            });
            builder.push(
                " ON CONFLICT (date, start_time, lesson_type, group_number) DO NOTHING",
            );

            match builder.build().execute(&self.pool).await {
                Ok(result) => inserted += result.rows_affected(),
                Err(e) => {
                    warn!("slot batch insert failed, continuing: {}", e);
                }
            }
        }

        Ok(InsertOutcome {
            generated: slots.len(),
            inserted,
        })
    }

    /// Slots for a program inside [from, to], bookable status only, ordered
    /// for calendar rendering. Fullness is filtered by the caller.
    pub async fn find_available(
        &self,
        program: Program,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<TimeSlot>, StoreError> {
        let sql = format!(
            "SELECT {SLOT_COLUMNS} FROM time_slots \
             WHERE lesson_type = $1 AND status = 'available' \
               AND date >= $2 AND date <= $3 \
             ORDER BY date ASC, start_time ASC, group_number ASC"
        );
        let rows: Vec<SlotRow> = sqlx::query_as(&sql)
            .bind(program.as_str())
            .bind(from)
            .bind(to)
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter().map(TimeSlot::try_from).collect()
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<TimeSlot>, StoreError> {
        let sql = format!("SELECT {SLOT_COLUMNS} FROM time_slots WHERE id = $1");
        let row: Option<SlotRow> = sqlx::query_as(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(TimeSlot::try_from).transpose()
    }

    pub async fn count(&self) -> Result<i64, StoreError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM time_slots")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}
