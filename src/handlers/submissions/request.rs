//! Submission request DTOs

use serde::Deserialize;
use validator::Validate;

use crate::{constants::MAX_SOURCE_CODE_SIZE, services::SubmissionDraft};

/// Create submission request
#[derive(Debug, Deserialize, Validate)]
pub struct CreateSubmissionRequest {
    pub problem_id: i64,

    /// Language tag passed through to the compile and run programs
    #[validate(length(min = 1, max = 16))]
    pub language: String,

    #[validate(length(min = 1, max = MAX_SOURCE_CODE_SIZE))]
    pub source_code: String,
}

impl From<CreateSubmissionRequest> for SubmissionDraft {
    fn from(request: CreateSubmissionRequest) -> Self {
        Self {
            problem_id: request.problem_id,
            language: request.language,
            source_code: request.source_code,
        }
    }
}
