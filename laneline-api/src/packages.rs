use axum::{
    extract::{Json, Query, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};

use laneline_core::package::{generate_free_code, generate_test_code, PackageStatus};
use laneline_core::pricing::package_price_cents;
use laneline_core::{Customer, Program};
use laneline_store::NewPackage;

use crate::error::AppError;
use crate::state::AppState;

// ============================================================================
// Validation
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct ValidateQuery {
    pub code: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ValidateResponse {
    pub valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub program: Option<Program>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lessons_total: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lessons_remaining: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer: Option<Customer>,
}

impl ValidateResponse {
    fn invalid(error: &str) -> Self {
        Self {
            valid: false,
            error: Some(error.to_string()),
            program: None,
            lessons_total: None,
            lessons_remaining: None,
            customer: None,
        }
    }
}

/// GET /v1/packages/validate?code=
/// Pending packages are invalid here by design: the widget polls this
/// endpoint with bounded retries while the payment confirmation lands.
pub async fn validate_package(
    State(state): State<AppState>,
    Query(query): Query<ValidateQuery>,
) -> Result<(StatusCode, Json<ValidateResponse>), AppError> {
    let code = query
        .code
        .ok_or_else(|| AppError::Validation("Package code is required".to_string()))?;

    let package = state.packages.find_by_code(&code).await?;

    let package = match package.filter(|p| p.status == PackageStatus::Paid) {
        Some(p) => p,
        None => {
            return Ok((
                StatusCode::NOT_FOUND,
                Json(ValidateResponse::invalid("Invalid or expired package code")),
            ));
        }
    };

    if package.lessons_remaining <= 0 {
        return Ok((
            StatusCode::BAD_REQUEST,
            Json(ValidateResponse::invalid("This package has no remaining lessons")),
        ));
    }

    let customer = match &package.customer_email {
        Some(email) => state.customers.find_by_email(email).await.unwrap_or_else(|e| {
            tracing::warn!("Customer lookup failed for {}: {}", email, e);
            None
        }),
        None => None,
    };

    Ok((
        StatusCode::OK,
        Json(ValidateResponse {
            valid: true,
            error: None,
            program: Some(package.program),
            lessons_total: Some(package.lessons_total),
            lessons_remaining: Some(package.lessons_remaining),
            customer,
        }),
    ))
}

// ============================================================================
// Free / promotional packages
// ============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateFreePackageRequest {
    pub program: Option<String>,
    pub promo_code: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateFreePackageResponse {
    pub success: bool,
    pub package_code: String,
    pub message: String,
}

/// POST /v1/packages/free
/// Promotional single-lesson package; no payment confirmation is expected,
/// so the package is paid from the start.
pub async fn create_free_package(
    State(state): State<AppState>,
    Json(req): Json<CreateFreePackageRequest>,
) -> Result<Json<CreateFreePackageResponse>, AppError> {
    let (Some(program_str), Some(promo_code)) = (req.program, req.promo_code) else {
        return Err(AppError::Validation("program and promoCode are required".to_string()));
    };
    let program = Program::parse(&program_str)
        .ok_or_else(|| AppError::Validation(format!("Unknown program: {program_str}")))?;

    let code = generate_free_code(chrono::Utc::now(), &mut rand::thread_rng());

    let new_package = NewPackage {
        code: code.clone(),
        program,
        lessons_total: 1,
        amount_paid_cents: 0,
        payment_reference: Some(format!("promo_{promo_code}")),
        status: PackageStatus::Paid,
        customer_email: None,
        customer_name: None,
    };
    state.packages.insert(&new_package).await?;

    Ok(Json(CreateFreePackageResponse {
        success: true,
        package_code: code,
        message: "Free lesson package created successfully".to_string(),
    }))
}

// ============================================================================
// Admin: test packages
// ============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTestPackageRequest {
    pub program: Option<String>,
    pub lessons: Option<i32>,
    pub customer_email: Option<String>,
    pub admin_key: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TestPackageSummary {
    pub code: String,
    pub program: Program,
    pub lessons: i32,
    pub price_cents: i32,
    pub status: PackageStatus,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTestPackageResponse {
    pub success: bool,
    pub package: TestPackageSummary,
    pub message: String,
}

/// POST /v1/admin/packages/test
pub async fn create_test_package(
    State(state): State<AppState>,
    Json(req): Json<CreateTestPackageRequest>,
) -> Result<Json<CreateTestPackageResponse>, AppError> {
    if req.admin_key.as_deref() != Some(state.rules.admin_key.as_str()) {
        return Err(AppError::Unauthorized("Unauthorized".to_string()));
    }

    let (Some(program_str), Some(lessons)) = (req.program, req.lessons) else {
        return Err(AppError::Validation("Program and lessons are required".to_string()));
    };
    let program = Program::parse(&program_str)
        .ok_or_else(|| AppError::Validation(format!("Unknown program: {program_str}")))?;
    let price_cents = package_price_cents(program, lessons)
        .ok_or_else(|| AppError::Validation("Invalid program or lesson count".to_string()))?;

    let now = chrono::Utc::now();
    let code = generate_test_code(program, lessons, now, &mut rand::thread_rng());

    let new_package = NewPackage {
        code: code.clone(),
        program,
        lessons_total: lessons,
        amount_paid_cents: price_cents,
        payment_reference: Some(format!("test_{}", now.timestamp_millis())),
        status: PackageStatus::Paid,
        customer_email: Some(req.customer_email.unwrap_or_else(|| "test@example.com".to_string())),
        customer_name: Some("Test Customer".to_string()),
    };
    state.packages.insert(&new_package).await?;

    Ok(Json(CreateTestPackageResponse {
        success: true,
        package: TestPackageSummary {
            code: code.clone(),
            program,
            lessons,
            price_cents,
            status: PackageStatus::Paid,
        },
        message: format!("Test package created successfully. Use code \"{code}\" to book lessons."),
    }))
}
