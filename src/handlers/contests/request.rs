//! Contest request DTOs

use chrono::{DateTime, Utc};
use serde::Deserialize;
use validator::Validate;

use crate::{
    constants::{MAX_CONTEST_TITLE_LENGTH, MAX_PROBLEM_TITLE_LENGTH},
    models::{NewContest, ProblemUpdate},
    utils::time::deserialize_datetime,
};

/// Create or update contest request
#[derive(Debug, Deserialize, Validate)]
pub struct ContestRequest {
    #[validate(length(min = 1, max = MAX_CONTEST_TITLE_LENGTH))]
    pub title: String,

    /// RFC 3339, or a UTC `YYYY-MM-DD[ HH:MM[:SS]]` with `T` or space
    #[serde(deserialize_with = "deserialize_datetime")]
    pub start_time: DateTime<Utc>,

    #[validate(range(min = 1))]
    pub duration_minutes: i32,
}

impl From<ContestRequest> for NewContest {
    fn from(request: ContestRequest) -> Self {
        Self {
            title: request.title,
            start_time: request.start_time,
            duration_minutes: request.duration_minutes,
        }
    }
}

/// List contests query parameters
#[derive(Debug, Default, Deserialize)]
pub struct ListContestsQuery {
    /// Only contests that have not started yet
    #[serde(default)]
    pub upcoming: bool,
}

/// Add problem to contest request
#[derive(Debug, Deserialize, Validate)]
pub struct AddProblemRequest {
    #[validate(length(min = 1, max = MAX_PROBLEM_TITLE_LENGTH))]
    pub title: String,

    #[serde(default)]
    pub statement: String,

    /// Corpus file on the judge host
    #[validate(length(min = 1))]
    pub test_case_path: String,

    /// Defaults to one past the contest's highest number
    #[validate(range(min = 1))]
    pub problem_number: Option<i32>,
}

/// Update problem request; omitted fields keep their value
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateProblemRequest {
    #[validate(length(min = 1, max = MAX_PROBLEM_TITLE_LENGTH))]
    pub title: Option<String>,

    pub statement: Option<String>,

    #[validate(length(min = 1))]
    pub test_case_path: Option<String>,

    #[validate(range(min = 1))]
    pub problem_number: Option<i32>,
}

impl From<UpdateProblemRequest> for ProblemUpdate {
    fn from(request: UpdateProblemRequest) -> Self {
        Self {
            title: request.title,
            statement: request.statement,
            test_case_path: request.test_case_path,
            problem_number: request.problem_number,
        }
    }
}
