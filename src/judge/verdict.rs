//! Verdict types and classification logic

use serde::{Deserialize, Serialize};

/// Terminal (or pending) classification of a submission
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JudgeStatus {
    /// Waiting for the judging task
    Pending,
    /// Every test case matched
    Pass,
    /// Wrong output on some test case, or a malformed test case
    Fail,
    /// Source did not build
    CompileError,
    TimeLimitExceeded,
    MemoryLimitExceeded,
    /// Non-zero exit that is not a recognized limit violation
    RuntimeError,
    /// The sandboxed process could not be started
    ExecutionError,
    /// Judge-side problem not attributable to the submitter
    Error,
}

impl JudgeStatus {
    /// Get status as its stored string
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Pass => "pass",
            Self::Fail => "fail",
            Self::CompileError => "compile_error",
            Self::TimeLimitExceeded => "time_limit_exceeded",
            Self::MemoryLimitExceeded => "memory_limit_exceeded",
            Self::RuntimeError => "runtime_error",
            Self::ExecutionError => "execution_error",
            Self::Error => "error",
        }
    }

    /// Parse status from its stored string
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(Self::Pending),
            "pass" => Some(Self::Pass),
            "fail" => Some(Self::Fail),
            "compile_error" => Some(Self::CompileError),
            "time_limit_exceeded" => Some(Self::TimeLimitExceeded),
            "memory_limit_exceeded" => Some(Self::MemoryLimitExceeded),
            "runtime_error" => Some(Self::RuntimeError),
            "execution_error" => Some(Self::ExecutionError),
            "error" => Some(Self::Error),
            _ => None,
        }
    }
}

impl std::fmt::Display for JudgeStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Result of judging one submission
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Verdict {
    pub status: JudgeStatus,
    pub message: String,
}

impl Verdict {
    pub fn new(status: JudgeStatus, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn pass() -> Self {
        Self::new(JudgeStatus::Pass, "")
    }

    /// Wrong output on test case `index` (1-based)
    pub fn wrong_answer(index: usize, input: &str, actual: &str, expected: &str) -> Self {
        Self::new(
            JudgeStatus::Fail,
            format!(
                "Failed on test case {index}\n\nInput:\n```text\n{input}\n```\n\nOutput:\n```text\n{actual}\n```\n\nExpected:\n```text\n{expected}\n```"
            ),
        )
    }
}

/// Exit codes the sandbox reserves for limit violations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExitCodes {
    pub timeout: i32,
    pub memory: i32,
}

impl ExitCodes {
    /// Classify a non-zero exit code
    pub fn classify(&self, exit_code: i32) -> JudgeStatus {
        if exit_code == self.timeout {
            JudgeStatus::TimeLimitExceeded
        } else if exit_code == self.memory {
            JudgeStatus::MemoryLimitExceeded
        } else {
            JudgeStatus::RuntimeError
        }
    }
}

/// Cut diagnostic text to `limit` characters, marking the cut with `...`
pub fn truncate_diagnostic(text: &str, limit: usize) -> String {
    match text.char_indices().nth(limit) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CODES: ExitCodes = ExitCodes {
        timeout: 124,
        memory: 137,
    };

    #[test]
    fn test_status_round_trips_through_storage_form() {
        for status in [
            JudgeStatus::Pending,
            JudgeStatus::Pass,
            JudgeStatus::Fail,
            JudgeStatus::CompileError,
            JudgeStatus::TimeLimitExceeded,
            JudgeStatus::MemoryLimitExceeded,
            JudgeStatus::RuntimeError,
            JudgeStatus::ExecutionError,
            JudgeStatus::Error,
        ] {
            assert_eq!(JudgeStatus::from_str(status.as_str()), Some(status));
        }
        assert_eq!(JudgeStatus::from_str("accepted"), None);
    }

    #[test]
    fn test_exit_code_classification() {
        assert_eq!(CODES.classify(124), JudgeStatus::TimeLimitExceeded);
        assert_eq!(CODES.classify(137), JudgeStatus::MemoryLimitExceeded);
        assert_eq!(CODES.classify(1), JudgeStatus::RuntimeError);
        assert_eq!(CODES.classify(139), JudgeStatus::RuntimeError);
    }

    #[test]
    fn test_truncate_diagnostic() {
        assert_eq!(truncate_diagnostic("short", 200), "short");
        let long = "x".repeat(250);
        let cut = truncate_diagnostic(&long, 200);
        assert_eq!(cut.len(), 203);
        assert!(cut.ends_with("..."));
        // multi-byte characters are never split
        assert_eq!(truncate_diagnostic("ééé", 2), "éé...");
        assert_eq!(truncate_diagnostic(&"y".repeat(200), 200), "y".repeat(200));
    }

    #[test]
    fn test_wrong_answer_message_embeds_index_and_data() {
        let verdict = Verdict::wrong_answer(3, "1 2", "4", "3");
        assert_eq!(verdict.status, JudgeStatus::Fail);
        assert!(verdict.message.starts_with("Failed on test case 3\n"));
        assert!(verdict.message.contains("Input:\n```text\n1 2\n```"));
        assert!(verdict.message.contains("Output:\n```text\n4\n```"));
        assert!(verdict.message.contains("Expected:\n```text\n3\n```"));
    }

    #[test]
    fn test_serde_uses_storage_names() {
        let json = serde_json::to_string(&Verdict::pass()).unwrap();
        assert_eq!(json, r#"{"status":"pass","message":""}"#);
    }
}
