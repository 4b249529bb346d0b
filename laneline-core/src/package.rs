use chrono::{DateTime, Duration, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::program::Program;

/// Single-lesson packages may be booked while their payment confirmation is
/// still in flight, for this long after creation.
pub const PENDING_GRACE_SECONDS: i64 = 5 * 60;

const CODE_CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PackageStatus {
    Pending,
    Paid,
    Cancelled,
}

impl PackageStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PackageStatus::Pending => "pending",
            PackageStatus::Paid => "paid",
            PackageStatus::Cancelled => "cancelled",
        }
    }

    pub fn parse(s: &str) -> Option<PackageStatus> {
        match s {
            "pending" => Some(PackageStatus::Pending),
            "paid" => Some(PackageStatus::Paid),
            "cancelled" => Some(PackageStatus::Cancelled),
            _ => None,
        }
    }
}

/// A prepaid or promotional bundle of lessons identified by a unique code.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Package {
    pub id: Uuid,
    pub code: String,
    pub program: Program,
    pub lessons_total: i32,
    pub lessons_remaining: i32,
    pub amount_paid_cents: i32,
    pub payment_reference: Option<String>,
    pub status: PackageStatus,
    pub customer_email: Option<String>,
    pub customer_name: Option<String>,
    pub customer_phone: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum BookingDenied {
    #[error("Invalid package code or payment not yet confirmed. Please try again in a moment.")]
    NotPayable,

    #[error("No remaining lessons in this package")]
    Exhausted,
}

impl Package {
    /// Whether this package can back a booking right now.
    ///
    /// Paid packages qualify. A pending package qualifies only if it is a
    /// single-lesson purchase created within the last five minutes - an
    /// allowance for payment-confirmation latency, not a general bypass.
    pub fn booking_eligibility(&self, now: DateTime<Utc>) -> Result<(), BookingDenied> {
        let payable = match self.status {
            PackageStatus::Paid => true,
            PackageStatus::Pending => {
                self.lessons_total == 1
                    && now - self.created_at <= Duration::seconds(PENDING_GRACE_SECONDS)
            }
            PackageStatus::Cancelled => false,
        };

        if !payable {
            return Err(BookingDenied::NotPayable);
        }
        if self.lessons_remaining <= 0 {
            return Err(BookingDenied::Exhausted);
        }
        Ok(())
    }
}

fn random_suffix(rng: &mut impl Rng, len: usize) -> String {
    (0..len)
        .map(|_| CODE_CHARSET[rng.gen_range(0..CODE_CHARSET.len())] as char)
        .collect()
}

/// Purchase code: program prefix, lesson count, timestamp fragment, random
/// suffix, e.g. `SPL-6L-847201-K3X`. Uniqueness comes from entropy; the
/// storage layer still carries a unique constraint on the column.
pub fn generate_package_code(
    program: Program,
    lessons: i32,
    now: DateTime<Utc>,
    rng: &mut impl Rng,
) -> String {
    let millis = now.timestamp_millis().to_string();
    let fragment = &millis[millis.len().saturating_sub(6)..];
    format!(
        "{}-{}L-{}-{}",
        program.code_prefix(),
        lessons,
        fragment,
        random_suffix(rng, 3)
    )
}

/// Promotional code for free single-lesson packages, e.g. `FREE-1759680000000-A1B2C`.
pub fn generate_free_code(now: DateTime<Utc>, rng: &mut impl Rng) -> String {
    format!("FREE-{}-{}", now.timestamp_millis(), random_suffix(rng, 5))
}

/// Admin-issued test package code.
pub fn generate_test_code(
    program: Program,
    lessons: i32,
    now: DateTime<Utc>,
    rng: &mut impl Rng,
) -> String {
    format!("TEST-{}", generate_package_code(program, lessons, now, rng))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn package(status: PackageStatus, total: i32, remaining: i32, age_secs: i64) -> Package {
        let now = Utc.with_ymd_and_hms(2025, 10, 5, 12, 0, 0).unwrap();
        Package {
            id: Uuid::new_v4(),
            code: "SPL-6L-000000-AAA".to_string(),
            program: Program::Splashlet,
            lessons_total: total,
            lessons_remaining: remaining,
            amount_paid_cents: 22200,
            payment_reference: Some("pi_test".to_string()),
            status,
            customer_email: None,
            customer_name: None,
            customer_phone: None,
            created_at: now - Duration::seconds(age_secs),
            updated_at: now - Duration::seconds(age_secs),
        }
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 10, 5, 12, 0, 0).unwrap()
    }

    #[test]
    fn paid_package_with_lessons_is_bookable() {
        let pkg = package(PackageStatus::Paid, 6, 3, 3600);
        assert_eq!(pkg.booking_eligibility(now()), Ok(()));
    }

    #[test]
    fn pending_multi_lesson_package_is_rejected() {
        let pkg = package(PackageStatus::Pending, 6, 6, 10);
        assert_eq!(pkg.booking_eligibility(now()), Err(BookingDenied::NotPayable));
    }

    #[test]
    fn fresh_pending_single_lesson_gets_grace() {
        let pkg = package(PackageStatus::Pending, 1, 1, 60);
        assert_eq!(pkg.booking_eligibility(now()), Ok(()));
    }

    #[test]
    fn stale_pending_single_lesson_is_rejected() {
        let pkg = package(PackageStatus::Pending, 1, 1, PENDING_GRACE_SECONDS + 1);
        assert_eq!(pkg.booking_eligibility(now()), Err(BookingDenied::NotPayable));
    }

    #[test]
    fn exhausted_package_is_rejected() {
        let pkg = package(PackageStatus::Paid, 4, 0, 3600);
        assert_eq!(pkg.booking_eligibility(now()), Err(BookingDenied::Exhausted));
    }

    #[test]
    fn cancelled_package_is_rejected() {
        let pkg = package(PackageStatus::Cancelled, 4, 4, 3600);
        assert_eq!(pkg.booking_eligibility(now()), Err(BookingDenied::NotPayable));
    }

    #[test]
    fn purchase_code_shape() {
        let mut rng = rand::thread_rng();
        let code = generate_package_code(Program::Droplet, 4, now(), &mut rng);
        let parts: Vec<&str> = code.split('-').collect();
        assert_eq!(parts.len(), 4);
        assert_eq!(parts[0], "DRO");
        assert_eq!(parts[1], "4L");
        assert_eq!(parts[2].len(), 6);
        assert_eq!(parts[3].len(), 3);
        assert!(parts[3].chars().all(|c| c.is_ascii_uppercase() || c.is_ascii_digit()));
    }

    #[test]
    fn free_code_shape() {
        let mut rng = rand::thread_rng();
        let code = generate_free_code(now(), &mut rng);
        assert!(code.starts_with("FREE-"));
        assert_eq!(code.split('-').count(), 3);
    }

    #[test]
    fn generated_codes_do_not_collide_in_practice() {
        let mut rng = rand::thread_rng();
        let codes: std::collections::HashSet<String> = (0..200)
            .map(|_| generate_package_code(Program::Strokelet, 8, now(), &mut rng))
            .collect();
        // Same timestamp fragment, so distinctness rides on the random suffix.
        assert!(codes.len() > 190);
    }

    #[test]
    fn status_round_trips() {
        for status in [PackageStatus::Pending, PackageStatus::Paid, PackageStatus::Cancelled] {
            assert_eq!(PackageStatus::parse(status.as_str()), Some(status));
        }
    }
}
