use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Denormalized contact directory keyed by email. Upserted opportunistically
/// on purchase and booking; never authoritative.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Customer {
    pub email: String,
    pub name: String,
    pub phone: Option<String>,
    pub updated_at: DateTime<Utc>,
}
