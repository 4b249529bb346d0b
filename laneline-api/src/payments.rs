use axum::{
    extract::{Json, State},
};
use serde::{Deserialize, Serialize};

use laneline_core::package::{generate_package_code, PackageStatus};
use laneline_core::payment::IntentMetadata;
use laneline_core::Program;
use laneline_store::NewPackage;

use crate::error::AppError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateIntentRequest {
    pub amount: Option<i32>,
    pub program: Option<String>,
    pub lessons: Option<i32>,
    pub customer_email: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateIntentResponse {
    pub client_secret: Option<String>,
    pub package_code: String,
    pub test_mode: bool,
}

/// POST /v1/payments/intent
/// Create a provider payment intent and record the pending package it will
/// pay for. The package code is generated up front and travels in the intent
/// metadata so the confirmation event can be reconciled independently.
pub async fn create_payment_intent(
    State(state): State<AppState>,
    Json(req): Json<CreateIntentRequest>,
) -> Result<Json<CreateIntentResponse>, AppError> {
    let (Some(amount), Some(program_str), Some(lessons)) = (req.amount, req.program, req.lessons)
    else {
        return Err(AppError::Validation(
            "amount, program, and lessons are required".to_string(),
        ));
    };
    let program = Program::parse(&program_str)
        .ok_or_else(|| AppError::Validation(format!("Unknown program: {program_str}")))?;
    if amount <= 0 || lessons <= 0 {
        return Err(AppError::Validation(
            "amount and lessons must be positive".to_string(),
        ));
    }

    let code = generate_package_code(program, lessons, chrono::Utc::now(), &mut rand::thread_rng());

    let metadata = IntentMetadata {
        program,
        lessons,
        customer_email: req.customer_email.clone(),
        package_code: code.clone(),
    };
    let intent = state
        .payments
        .create_intent(amount, &state.currency, &metadata)
        .await?;

    let test_mode = state.payments.is_test_mode();

    // In test mode the webhook is usually not wired up, so the package is
    // recorded as paid immediately.
    let status = if test_mode {
        PackageStatus::Paid
    } else {
        PackageStatus::Pending
    };

    let new_package = NewPackage {
        code: code.clone(),
        program,
        lessons_total: lessons,
        amount_paid_cents: amount,
        payment_reference: Some(intent.id.clone()),
        status,
        customer_email: req.customer_email,
        customer_name: None,
    };

    // Non-fatal: the intent already exists at the provider and carries the
    // code in its metadata, so the record can be reconciled later.
    if let Err(e) = state.packages.insert(&new_package).await {
        tracing::error!("Failed to persist package {} for intent {}: {}", code, intent.id, e);
    }

    Ok(Json(CreateIntentResponse {
        client_secret: intent.client_secret,
        package_code: code,
        test_mode,
    }))
}
