use axum::{
    extract::{Query, State},
    Json,
};
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use laneline_core::{Program, TimeSlot};
use laneline_schedule::{filter_open, resolve_window};

use crate::error::AppError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct AvailabilityQuery {
    pub program: Option<String>,
    pub date: Option<NaiveDate>,
    pub month: Option<String>,
}

/// Slot as rendered on the calendar. Field names match the storage columns
/// the widget has always consumed.
#[derive(Debug, Serialize)]
pub struct SlotResponse {
    pub id: Uuid,
    pub date: NaiveDate,
    pub start_time: String,
    pub end_time: String,
    pub lesson_type: Program,
    pub group_number: i32,
    pub max_capacity: i32,
    pub current_enrollment: i32,
}

impl From<TimeSlot> for SlotResponse {
    fn from(slot: TimeSlot) -> Self {
        Self {
            id: slot.id,
            date: slot.date,
            start_time: slot.start_time.format("%H:%M:%S").to_string(),
            end_time: slot.end_time.format("%H:%M:%S").to_string(),
            lesson_type: slot.lesson_type,
            group_number: slot.group_number,
            max_capacity: slot.max_capacity,
            current_enrollment: slot.current_enrollment,
        }
    }
}

/// GET /v1/availability?program=&date=&month=
/// Open slots for a program; exact date, calendar month, or the default
/// forward window. An empty list means nothing available, not an error.
pub async fn get_availability(
    State(state): State<AppState>,
    Query(query): Query<AvailabilityQuery>,
) -> Result<Json<Vec<SlotResponse>>, AppError> {
    let program_str = query
        .program
        .ok_or_else(|| AppError::Validation("Program parameter is required".to_string()))?;
    let program = Program::parse(&program_str)
        .ok_or_else(|| AppError::Validation(format!("Unknown program: {program_str}")))?;

    let today = Utc::now().date_naive();
    let (from, to) = resolve_window(query.date, query.month.as_deref(), today)?;

    let slots = state.slots.find_available(program, from, to).await?;
    let total = slots.len();
    let open = filter_open(slots);
    tracing::debug!(
        "availability {} {}..{}: {} slots, {} open",
        program,
        from,
        to,
        total,
        open.len()
    );

    Ok(Json(open.into_iter().map(SlotResponse::from).collect()))
}
