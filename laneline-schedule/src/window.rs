use chrono::{Datelike, Duration, NaiveDate};

use laneline_core::TimeSlot;

/// Forward-looking window used when neither a date nor a month is given.
pub const DEFAULT_WINDOW_DAYS: i64 = 30;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum WindowError {
    #[error("invalid month value: {0}")]
    InvalidMonth(String),
}

fn month_bounds(year: i32, month: u32) -> (NaiveDate, NaiveDate) {
    let first = NaiveDate::from_ymd_opt(year, month, 1).expect("valid first of month");
    let next = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)
    }
    .expect("valid first of next month");
    (first, next - Duration::days(1))
}

/// Resolve the availability date range: an exact date wins, then a month
/// (`YYYY-MM`, or any date within the month), then the default forward
/// window from today.
pub fn resolve_window(
    date: Option<NaiveDate>,
    month: Option<&str>,
    today: NaiveDate,
) -> Result<(NaiveDate, NaiveDate), WindowError> {
    if let Some(d) = date {
        return Ok((d, d));
    }

    if let Some(m) = month {
        let parsed = NaiveDate::parse_from_str(&format!("{m}-01"), "%Y-%m-%d")
            .or_else(|_| NaiveDate::parse_from_str(m, "%Y-%m-%d"))
            .map_err(|_| WindowError::InvalidMonth(m.to_string()))?;
        return Ok(month_bounds(parsed.year(), parsed.month()));
    }

    Ok((today, today + Duration::days(DEFAULT_WINDOW_DAYS)))
}

/// Drop slots with no seats left. Full slots stay in storage for
/// record-keeping but are never shown to callers.
pub fn filter_open(slots: Vec<TimeSlot>) -> Vec<TimeSlot> {
    slots.into_iter().filter(|s| s.has_space()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveTime, Utc};
    use laneline_core::{Program, SlotStatus};
    use uuid::Uuid;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn exact_date_wins_over_month() {
        let window =
            resolve_window(Some(date(2025, 10, 5)), Some("2025-11"), date(2025, 9, 1)).unwrap();
        assert_eq!(window, (date(2025, 10, 5), date(2025, 10, 5)));
    }

    #[test]
    fn month_expands_to_calendar_bounds() {
        let window = resolve_window(None, Some("2025-10"), date(2025, 9, 1)).unwrap();
        assert_eq!(window, (date(2025, 10, 1), date(2025, 10, 31)));

        // A full date inside the month works too.
        let window = resolve_window(None, Some("2025-02-14"), date(2025, 1, 1)).unwrap();
        assert_eq!(window, (date(2025, 2, 1), date(2025, 2, 28)));
    }

    #[test]
    fn december_rolls_into_next_year() {
        let window = resolve_window(None, Some("2025-12"), date(2025, 11, 1)).unwrap();
        assert_eq!(window, (date(2025, 12, 1), date(2025, 12, 31)));
    }

    #[test]
    fn garbage_month_is_an_error() {
        let err = resolve_window(None, Some("October"), date(2025, 9, 1)).unwrap_err();
        assert_eq!(err, WindowError::InvalidMonth("October".to_string()));
    }

    #[test]
    fn default_window_is_thirty_days_forward() {
        let today = date(2025, 10, 5);
        let window = resolve_window(None, None, today).unwrap();
        assert_eq!(window, (today, date(2025, 11, 4)));
    }

    fn slot(enrollment: i32, capacity: i32) -> TimeSlot {
        TimeSlot {
            id: Uuid::new_v4(),
            date: date(2025, 10, 5),
            start_time: NaiveTime::from_hms_opt(15, 0, 0).unwrap(),
            end_time: NaiveTime::from_hms_opt(15, 30, 0).unwrap(),
            lesson_type: Program::Droplet,
            group_number: 1,
            max_capacity: capacity,
            current_enrollment: enrollment,
            status: SlotStatus::Available,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn filter_open_drops_only_full_slots() {
        let open = filter_open(vec![slot(0, 8), slot(7, 8), slot(8, 8), slot(3, 3)]);
        assert_eq!(open.len(), 2);
        assert!(open.iter().all(|s| s.current_enrollment < s.max_capacity));
    }
}
