use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    Confirmed,
}

impl BookingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Confirmed => "confirmed",
        }
    }
}

/// A single student's reservation against one time slot, debiting one lesson
/// from a package.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Booking {
    pub id: Uuid,
    pub time_slot_id: Uuid,
    pub package_code: String,
    pub student_name: String,
    pub student_birthdate: Option<NaiveDate>,
    pub customer_name: String,
    pub customer_email: String,
    pub customer_phone: Option<String>,
    pub notes: Option<String>,
    pub status: BookingStatus,
    pub created_at: DateTime<Utc>,
}

/// Input to the booking writer, after request-level validation.
#[derive(Debug, Clone)]
pub struct NewBooking {
    pub time_slot_id: Uuid,
    pub package_code: String,
    pub student_name: String,
    pub student_birthdate: Option<NaiveDate>,
    pub customer_name: String,
    pub customer_email: String,
    pub customer_phone: Option<String>,
    pub notes: Option<String>,
}
