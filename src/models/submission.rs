//! Submission model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::judge::JudgeStatus;

/// Submission database model
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Submission {
    pub id: i64,
    pub user_id: i64,
    pub problem_id: i64,
    pub contest_id: i64,
    pub language: String,
    pub source_code: String,
    /// Stored form of a [`JudgeStatus`]
    pub status: String,
    pub message: String,
    pub created_at: DateTime<Utc>,
}

impl Submission {
    /// Parsed status, `None` for values written by something else
    pub fn judge_status(&self) -> Option<JudgeStatus> {
        JudgeStatus::from_str(&self.status)
    }

    pub fn is_pass(&self) -> bool {
        self.judge_status() == Some(JudgeStatus::Pass)
    }

    pub fn is_pending(&self) -> bool {
        self.judge_status() == Some(JudgeStatus::Pending)
    }
}

/// Fields needed to persist a fresh submission
#[derive(Debug, Clone)]
pub struct NewSubmission {
    pub user_id: i64,
    pub problem_id: i64,
    pub contest_id: i64,
    pub language: String,
    pub source_code: String,
}

/// Submission joined with the submitter's name and the problem title
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, PartialEq, Eq)]
pub struct SubmissionView {
    pub id: i64,
    pub user_id: i64,
    pub user_name: String,
    pub problem_id: i64,
    pub problem_title: String,
    pub language: String,
    pub source_code: String,
    pub status: String,
    pub message: String,
    pub created_at: DateTime<Utc>,
}

/// Filter for submission list queries; results are newest first
#[derive(Debug, Clone, Copy, Default)]
pub struct SubmissionFilter {
    pub user_id: Option<i64>,
    pub contest_id: Option<i64>,
    pub limit: Option<i64>,
}
