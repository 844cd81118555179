//! Business logic services

pub mod contest_service;
pub mod dead_letters;
pub mod standings_service;
pub mod submission_service;

pub use contest_service::ContestService;
pub use dead_letters::{DeadLetter, DeadLetterLog};
pub use standings_service::StandingsService;
pub use submission_service::{SubmissionDraft, SubmissionService};
