//! Contest response DTOs

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::models::{Contest, ContestStatus, Problem};

/// Contest response
#[derive(Debug, Serialize)]
pub struct ContestResponse {
    #[serde(flatten)]
    pub contest: Contest,
    pub end_time: DateTime<Utc>,
    pub status: ContestStatus,
}

impl ContestResponse {
    pub fn at(contest: Contest, now: DateTime<Utc>) -> Self {
        Self {
            end_time: contest.end_time(),
            status: contest.status_at(now),
            contest,
        }
    }
}

/// Contest with its problems
#[derive(Debug, Serialize)]
pub struct ContestDetailResponse {
    #[serde(flatten)]
    pub contest: ContestResponse,
    pub problems: Vec<Problem>,
}
