use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::program::Program;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SlotStatus {
    Available,
    Blocked,
}

impl SlotStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SlotStatus::Available => "available",
            SlotStatus::Blocked => "blocked",
        }
    }

    pub fn parse(s: &str) -> Option<SlotStatus> {
        match s {
            "available" => Some(SlotStatus::Available),
            "blocked" => Some(SlotStatus::Blocked),
            _ => None,
        }
    }
}

/// One bookable (date, time, program, parallel-group) unit with fixed
/// capacity. Unique per (date, start_time, lesson_type, group_number).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimeSlot {
    pub id: Uuid,
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub lesson_type: Program,
    pub group_number: i32,
    pub max_capacity: i32,
    pub current_enrollment: i32,
    pub status: SlotStatus,
    pub created_at: DateTime<Utc>,
}

impl TimeSlot {
    pub fn has_space(&self) -> bool {
        self.current_enrollment < self.max_capacity
    }
}
