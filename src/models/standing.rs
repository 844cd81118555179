//! Standings rows
//!
//! These are never persisted; they are rebuilt from submissions on every request
//! or stream wake-up.

use serde::{Deserialize, Serialize};

/// State of one standings cell
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum AttemptStatus {
    #[default]
    #[serde(rename = "")]
    Unattempted,
    #[serde(rename = "+")]
    Solved,
    #[serde(rename = "-")]
    Failed,
}

/// One user's attempts on one problem
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProblemAttempt {
    pub problem_number: i32,
    pub status: AttemptStatus,
    pub count: u32,
}

/// One standings row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserStanding {
    pub rank: u32,
    pub user_id: i64,
    pub user_name: String,
    pub solved: u32,
    /// Seconds from contest start to each first accepted submission, summed
    pub penalty: i64,
    pub problems: Vec<ProblemAttempt>,
}

impl UserStanding {
    /// Empty row with one unattempted cell per problem number
    pub fn new(user_id: i64, user_name: String, problem_numbers: &[i32]) -> Self {
        Self {
            rank: 0,
            user_id,
            user_name,
            solved: 0,
            penalty: 0,
            problems: problem_numbers
                .iter()
                .map(|&problem_number| ProblemAttempt {
                    problem_number,
                    status: AttemptStatus::Unattempted,
                    count: 0,
                })
                .collect(),
        }
    }
}
