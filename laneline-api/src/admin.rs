use axum::{
    extract::{Json, State},
};
use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use laneline_schedule::generate_slots;

use crate::error::AppError;
use crate::state::AppState;

// ============================================================================
// Slot initialization
// ============================================================================

/// Fallback start for a fresh install: the first Sunday of the published
/// schedule.
const DEFAULT_SEASON_START: (i32, u32, u32) = (2025, 10, 5);

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitializeSlotsRequest {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub admin_key: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InitializeSlotsResponse {
    pub success: bool,
    pub message: String,
    pub total_slots: usize,
    pub inserted: u64,
}

/// POST /v1/admin/slots/initialize
/// Expand the weekly template over a date range. Safe to re-run over
/// overlapping ranges; existing days gain no rows.
pub async fn initialize_slots(
    State(state): State<AppState>,
    Json(req): Json<InitializeSlotsRequest>,
) -> Result<Json<InitializeSlotsResponse>, AppError> {
    if req.admin_key.as_deref() != Some(state.rules.admin_key.as_str()) {
        return Err(AppError::Unauthorized("Unauthorized".to_string()));
    }

    let (y, m, d) = DEFAULT_SEASON_START;
    let start = req
        .start_date
        .unwrap_or_else(|| NaiveDate::from_ymd_opt(y, m, d).expect("valid season start"));
    let end = req
        .end_date
        .unwrap_or_else(|| start + Duration::days(state.rules.generation_horizon_days));
    if end < start {
        return Err(AppError::Validation("endDate must not precede startDate".to_string()));
    }

    tracing::info!("Generating time slots from {} to {}", start, end);
    let slots = generate_slots(start, end);

    let outcome = state
        .slots
        .insert_slots(&slots, state.rules.slot_batch_size)
        .await?;

    tracing::info!(
        "Generated {} time slots, {} newly inserted",
        outcome.generated,
        outcome.inserted
    );

    Ok(Json(InitializeSlotsResponse {
        success: true,
        message: format!("Successfully created {} time slots", outcome.inserted),
        total_slots: outcome.generated,
        inserted: outcome.inserted,
    }))
}

// ============================================================================
// Health
// ============================================================================

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub database: DatabaseHealth,
    pub payments: PaymentsHealth,
}

#[derive(Debug, Serialize)]
pub struct DatabaseHealth {
    pub connected: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub packages: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_slots: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bookings: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct PaymentsHealth {
    pub test_mode: bool,
}

/// GET /v1/health
/// Degraded dependencies are reported in the body, never as an error status.
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let counts = async {
        let packages = state.packages.count().await?;
        let time_slots = state.slots.count().await?;
        let bookings = state.bookings.count().await?;
        Ok::<_, laneline_store::StoreError>((packages, time_slots, bookings))
    }
    .await;

    let database = match counts {
        Ok((packages, time_slots, bookings)) => DatabaseHealth {
            connected: true,
            packages: Some(packages),
            time_slots: Some(time_slots),
            bookings: Some(bookings),
        },
        Err(e) => {
            tracing::warn!("Health check database probe failed: {}", e);
            DatabaseHealth {
                connected: false,
                packages: None,
                time_slots: None,
                bookings: None,
            }
        }
    };

    let status = if database.connected { "ok" } else { "degraded" };

    Json(HealthResponse {
        status,
        database,
        payments: PaymentsHealth {
            test_mode: state.payments.is_test_mode(),
        },
    })
}
