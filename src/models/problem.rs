//! Problem model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Problem database model
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Problem {
    pub id: i64,
    pub contest_id: i64,
    pub title: String,
    pub statement: String,
    /// Location of the test-case corpus on the judge host
    #[serde(skip_serializing)]
    pub test_case_path: String,
    /// Display ordinal, also the standings column label
    pub problem_number: i32,
    pub created_at: DateTime<Utc>,
}

/// Fields needed to create a problem
#[derive(Debug, Clone)]
pub struct NewProblem {
    pub contest_id: i64,
    pub title: String,
    pub statement: String,
    pub test_case_path: String,
    pub problem_number: i32,
}

/// Partial problem update; `None` keeps the stored value
#[derive(Debug, Clone, Default)]
pub struct ProblemUpdate {
    pub title: Option<String>,
    pub statement: Option<String>,
    pub test_case_path: Option<String>,
    pub problem_number: Option<i32>,
}
