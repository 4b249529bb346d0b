//! The fixed weekly lesson template.
//!
//! Class days are Sunday (3-5 PM) and Monday (5-7 PM), split into 30-minute
//! windows. Each window runs a fixed set of parallel groups per program with
//! a fixed capacity per group.

use chrono::Weekday;

use laneline_core::Program;

/// Parallel groups of one program inside a single time window.
#[derive(Debug, Clone, Copy)]
pub struct Offering {
    pub program: Program,
    pub groups: i32,
    pub capacity: i32,
}

/// One 30-minute window on a class day. Times are (hour, minute), local.
#[derive(Debug, Clone, Copy)]
pub struct SessionTemplate {
    pub start: (u32, u32),
    pub end: (u32, u32),
    pub offerings: &'static [Offering],
}

#[derive(Debug, Clone, Copy)]
pub struct DayTemplate {
    pub weekday: Weekday,
    pub sessions: &'static [SessionTemplate],
}

const SPLASH_STROKE: &[Offering] = &[
    Offering { program: Program::Splashlet, groups: 2, capacity: 4 },
    Offering { program: Program::Strokelet, groups: 2, capacity: 3 },
];

// The 3:00 window is the only one the Droplet (parent-and-tot) track runs in,
// alongside a single group of each older track.
const SUNDAY_OPENING: &[Offering] = &[
    Offering { program: Program::Droplet, groups: 1, capacity: 8 },
    Offering { program: Program::Splashlet, groups: 1, capacity: 4 },
    Offering { program: Program::Strokelet, groups: 1, capacity: 3 },
];

pub const WEEKLY_TEMPLATE: &[DayTemplate] = &[
    DayTemplate {
        weekday: Weekday::Sun,
        sessions: &[
            SessionTemplate { start: (15, 0), end: (15, 30), offerings: SUNDAY_OPENING },
            SessionTemplate { start: (15, 30), end: (16, 0), offerings: SPLASH_STROKE },
            SessionTemplate { start: (16, 0), end: (16, 30), offerings: SPLASH_STROKE },
            SessionTemplate { start: (16, 30), end: (17, 0), offerings: SPLASH_STROKE },
        ],
    },
    DayTemplate {
        weekday: Weekday::Mon,
        sessions: &[
            SessionTemplate { start: (17, 0), end: (17, 30), offerings: SPLASH_STROKE },
            SessionTemplate { start: (17, 30), end: (18, 0), offerings: SPLASH_STROKE },
            SessionTemplate { start: (18, 0), end: (18, 30), offerings: SPLASH_STROKE },
            SessionTemplate { start: (18, 30), end: (19, 0), offerings: SPLASH_STROKE },
        ],
    },
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn template_covers_exactly_two_class_days() {
        let days: Vec<Weekday> = WEEKLY_TEMPLATE.iter().map(|d| d.weekday).collect();
        assert_eq!(days, vec![Weekday::Sun, Weekday::Mon]);
    }

    #[test]
    fn droplet_only_runs_in_the_sunday_opening_window() {
        let mut droplet_windows = 0;
        for day in WEEKLY_TEMPLATE {
            for session in day.sessions {
                if session.offerings.iter().any(|o| o.program == Program::Droplet) {
                    droplet_windows += 1;
                    assert_eq!(day.weekday, Weekday::Sun);
                    assert_eq!(session.start, (15, 0));
                }
            }
        }
        assert_eq!(droplet_windows, 1);
    }

    #[test]
    fn windows_are_half_hour_and_contiguous_per_day() {
        for day in WEEKLY_TEMPLATE {
            for pair in day.sessions.windows(2) {
                assert_eq!(pair[0].end, pair[1].start);
            }
            for session in day.sessions {
                let start = session.start.0 * 60 + session.start.1;
                let end = session.end.0 * 60 + session.end.1;
                assert_eq!(end - start, 30);
            }
        }
    }
}
