use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use laneline_core::payment::PaymentError;
use laneline_store::{ConflictKind, StoreError};

#[derive(Debug)]
pub enum AppError {
    /// Missing or malformed request fields.
    Validation(String),
    /// Package missing, unpaid, cancelled, or out of lessons.
    InvalidPackage(String),
    /// No seats left in the requested slot.
    SlotFull(String),
    /// Same (slot, package, student) already booked.
    DuplicateBooking(String),
    NotFound(String),
    Unauthorized(String),
    /// Payment processor / email provider failure. Details logged, not exposed.
    Upstream(anyhow::Error),
    /// Data store failure on a core write or read.
    Persistence(StoreError),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::Validation(msg)
            | AppError::InvalidPackage(msg)
            | AppError::SlotFull(msg)
            | AppError::DuplicateBooking(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg),
            AppError::Upstream(err) => {
                tracing::error!("Upstream dependency error: {:#}", err);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error".to_string())
            }
            AppError::Persistence(err) => {
                tracing::error!("Storage error: {}", err);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error".to_string())
            }
        };

        let body = Json(json!({
            "error": error_message,
        }));

        (status, body).into_response()
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err.conflict() {
            Some(ConflictKind::SlotFull) => AppError::SlotFull(err.to_string()),
            Some(ConflictKind::SlotMissing) => AppError::Validation(err.to_string()),
            Some(ConflictKind::PackageSpent) => AppError::InvalidPackage(err.to_string()),
            Some(ConflictKind::DuplicateBooking) => AppError::DuplicateBooking(err.to_string()),
            None => AppError::Persistence(err),
        }
    }
}

impl From<PaymentError> for AppError {
    fn from(err: PaymentError) -> Self {
        AppError::Upstream(err.into())
    }
}

impl From<laneline_schedule::WindowError> for AppError {
    fn from(err: laneline_schedule::WindowError) -> Self {
        AppError::Validation(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn conflicts_map_to_domain_errors() {
        let err: AppError = StoreError::Conflict(ConflictKind::SlotFull).into();
        assert!(matches!(err, AppError::SlotFull(_)));

        let err: AppError = StoreError::Conflict(ConflictKind::DuplicateBooking).into();
        assert!(matches!(err, AppError::DuplicateBooking(_)));

        let err: AppError = StoreError::Conflict(ConflictKind::PackageSpent).into();
        assert!(matches!(err, AppError::InvalidPackage(_)));
    }

    #[test]
    fn database_errors_stay_internal() {
        let err: AppError = StoreError::Database(sqlx::Error::PoolClosed).into();
        assert!(matches!(err, AppError::Persistence(_)));
    }
}
