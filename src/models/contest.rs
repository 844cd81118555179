//! Contest model

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::config::WindowMode;

/// Contest database model
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Contest {
    pub id: i64,
    pub title: String,
    pub start_time: DateTime<Utc>,
    pub duration_minutes: i32,
    pub created_at: DateTime<Utc>,
}

impl Contest {
    /// End of the scoring window
    pub fn end_time(&self) -> DateTime<Utc> {
        self.start_time + Duration::minutes(i64::from(self.duration_minutes))
    }

    /// Get status of the contest at `now`
    pub fn status_at(&self, now: DateTime<Utc>) -> ContestStatus {
        if now < self.start_time {
            ContestStatus::Upcoming
        } else if now <= self.end_time() {
            ContestStatus::Ongoing
        } else {
            ContestStatus::Ended
        }
    }

    /// Submissions are accepted once the contest has started
    pub fn has_started(&self, now: DateTime<Utc>) -> bool {
        now >= self.start_time
    }

    /// Time range whose submissions count toward standings
    pub fn window(&self, mode: WindowMode) -> SubmissionWindow {
        match mode {
            WindowMode::Contest => SubmissionWindow {
                start: Some(self.start_time),
                end: Some(self.end_time()),
            },
            WindowMode::Open => SubmissionWindow::default(),
        }
    }
}

/// Contest status enum
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContestStatus {
    Upcoming,
    Ongoing,
    Ended,
}

impl std::fmt::Display for ContestStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Upcoming => write!(f, "upcoming"),
            Self::Ongoing => write!(f, "ongoing"),
            Self::Ended => write!(f, "ended"),
        }
    }
}

/// Inclusive time filter; `None` leaves that side open
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SubmissionWindow {
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
}

impl SubmissionWindow {
    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        self.start.is_none_or(|start| at >= start) && self.end.is_none_or(|end| at <= end)
    }
}

/// Fields needed to create a contest
#[derive(Debug, Clone)]
pub struct NewContest {
    pub title: String,
    pub start_time: DateTime<Utc>,
    pub duration_minutes: i32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn contest() -> Contest {
        Contest {
            id: 1,
            title: "Weekly".to_string(),
            start_time: Utc.with_ymd_and_hms(2024, 5, 1, 10, 0, 0).unwrap(),
            duration_minutes: 60,
            created_at: Utc.with_ymd_and_hms(2024, 4, 1, 0, 0, 0).unwrap(),
        }
    }

    #[test]
    fn test_window_bounds_are_inclusive() {
        let c = contest();
        let window = c.window(WindowMode::Contest);
        assert!(window.contains(c.start_time));
        assert!(window.contains(c.end_time()));
        assert!(!window.contains(c.end_time() + Duration::seconds(1)));
        assert!(!window.contains(c.start_time - Duration::seconds(1)));
    }

    #[test]
    fn test_open_window_accepts_everything() {
        let c = contest();
        let window = c.window(WindowMode::Open);
        assert!(window.contains(c.start_time - Duration::days(3)));
        assert!(window.contains(c.end_time() + Duration::days(3)));
    }

    #[test]
    fn test_status() {
        let c = contest();
        assert_eq!(c.status_at(c.start_time - Duration::minutes(1)), ContestStatus::Upcoming);
        assert_eq!(c.status_at(c.start_time + Duration::minutes(30)), ContestStatus::Ongoing);
        assert_eq!(c.status_at(c.end_time() + Duration::minutes(1)), ContestStatus::Ended);
        assert!(!c.has_started(c.start_time - Duration::seconds(1)));
    }
}
