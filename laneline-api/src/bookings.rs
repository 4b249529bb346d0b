use axum::{
    extract::{Json, State},
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use laneline_core::{Booking, NewBooking, TimeSlot};

use crate::availability::SlotResponse;
use crate::error::AppError;
use crate::mail;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBookingRequest {
    pub package_code: Option<String>,
    pub time_slot_id: Option<Uuid>,
    pub student_name: Option<String>,
    pub student_birthdate: Option<NaiveDate>,
    pub customer_name: Option<String>,
    pub customer_email: Option<String>,
    pub customer_phone: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingResponse {
    pub success: bool,
    pub booking_id: Uuid,
    pub lessons_remaining: i32,
    pub booking: BookingDetail,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingDetail {
    pub id: Uuid,
    pub package_code: String,
    pub student_name: String,
    pub customer_name: String,
    pub customer_email: String,
    pub status: String,
    pub time_slot: SlotResponse,
}

fn required(value: Option<String>, field: &str) -> Result<String, AppError> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(AppError::Validation(format!("Missing required field: {field}"))),
    }
}

/// POST /v1/bookings
/// Validates the package and slot, then writes the booking and both counter
/// mutations as one transaction. The pre-checks below give precise errors;
/// the storage layer re-validates them atomically, so a racing request
/// cannot overbook even when both pass the pre-checks.
pub async fn create_booking(
    State(state): State<AppState>,
    Json(req): Json<CreateBookingRequest>,
) -> Result<Json<BookingResponse>, AppError> {
    let package_code = required(req.package_code, "packageCode")?;
    let student_name = required(req.student_name, "studentName")?;
    let customer_name = required(req.customer_name, "customerName")?;
    let customer_email = required(req.customer_email, "customerEmail")?;
    let time_slot_id = req
        .time_slot_id
        .ok_or_else(|| AppError::Validation("Missing required field: timeSlotId".to_string()))?;

    // 1. Package must be payable and have lessons left.
    let package = state
        .packages
        .find_by_code(&package_code)
        .await?
        .ok_or_else(|| {
            AppError::InvalidPackage(
                "Invalid package code or payment not yet confirmed. Please try again in a moment."
                    .to_string(),
            )
        })?;
    package
        .booking_eligibility(chrono::Utc::now())
        .map_err(|denied| AppError::InvalidPackage(denied.to_string()))?;

    // 2. Slot must exist and have a seat.
    let slot = state
        .slots
        .find_by_id(time_slot_id)
        .await?
        .ok_or_else(|| AppError::Validation("Invalid time slot".to_string()))?;
    if !slot.has_space() {
        return Err(AppError::SlotFull("This time slot is full".to_string()));
    }

    // 3. Duplicate-submission guard.
    if state
        .bookings
        .find_existing(time_slot_id, &package_code, &student_name)
        .await?
        .is_some()
    {
        return Err(AppError::DuplicateBooking(
            "This student is already booked for this time slot".to_string(),
        ));
    }

    // 4. The atomic part: insert + both counter updates.
    let new_booking = NewBooking {
        time_slot_id,
        package_code,
        student_name,
        student_birthdate: req.student_birthdate,
        customer_name,
        customer_email,
        customer_phone: req.customer_phone,
        notes: req.notes,
    };
    let (booking, lessons_remaining) = state.bookings.create_booking(&new_booking).await?;

    // 5. Secondary effects; failures logged, never rolled back.
    if let Err(e) = state
        .customers
        .upsert(
            &booking.customer_email,
            &booking.customer_name,
            booking.customer_phone.as_deref(),
        )
        .await
    {
        tracing::warn!("Customer upsert failed for {}: {}", booking.customer_email, e);
    }
    send_confirmations(&state, &booking, &slot).await;

    Ok(Json(BookingResponse {
        success: true,
        booking_id: booking.id,
        lessons_remaining,
        booking: BookingDetail {
            id: booking.id,
            package_code: booking.package_code.clone(),
            student_name: booking.student_name.clone(),
            customer_name: booking.customer_name.clone(),
            customer_email: booking.customer_email.clone(),
            status: booking.status.as_str().to_string(),
            time_slot: SlotResponse::from(slot),
        },
    }))
}

async fn send_confirmations(state: &AppState, booking: &Booking, slot: &TimeSlot) {
    for message in mail::booking_confirmations(booking, slot, state.mailer.operator_email()) {
        if let Err(e) = state.mailer.send(message).await {
            tracing::warn!("Booking confirmation email failed: {:#}", e);
        }
    }
}
