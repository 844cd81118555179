//! Dead-letter log for judging tasks that could not record a verdict

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, PoisonError};

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::constants::DEAD_LETTER_CAPACITY;

/// A submission whose judging task failed outside the judging pipeline
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeadLetter {
    pub submission_id: i64,
    pub reason: String,
    pub recorded_at: DateTime<Utc>,
}

/// Bounded in-process log; the oldest entries are evicted first
#[derive(Clone)]
pub struct DeadLetterLog {
    entries: Arc<Mutex<VecDeque<DeadLetter>>>,
    capacity: usize,
}

impl Default for DeadLetterLog {
    fn default() -> Self {
        Self::with_capacity(DEAD_LETTER_CAPACITY)
    }
}

impl DeadLetterLog {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Arc::new(Mutex::new(VecDeque::with_capacity(capacity))),
            capacity: capacity.max(1),
        }
    }

    pub fn record(&self, submission_id: i64, reason: impl Into<String>) -> DeadLetter {
        let letter = DeadLetter {
            submission_id,
            reason: reason.into(),
            recorded_at: Utc::now(),
        };

        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        if entries.len() == self.capacity {
            entries.pop_front();
        }
        entries.push_back(letter.clone());

        letter
    }

    /// Newest first
    pub fn entries(&self) -> Vec<DeadLetter> {
        let entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries.iter().rev().cloned().collect()
    }
}
