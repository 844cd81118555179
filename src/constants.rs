//! Application-wide constants
//!
//! This module contains all constant values used throughout the application.
//! Constants are grouped by their purpose for better organization.

// =============================================================================
// SERVER DEFAULTS
// =============================================================================

/// Default server host address
pub const DEFAULT_SERVER_HOST: &str = "0.0.0.0";

/// Default server port
pub const DEFAULT_SERVER_PORT: u16 = 2931;

// =============================================================================
// DATABASE DEFAULTS
// =============================================================================

/// Default maximum database connections in the pool
pub const DEFAULT_DATABASE_MAX_CONNECTIONS: u32 = 20;

// =============================================================================
// JUDGE DEFAULTS
// =============================================================================

/// Default compile program
pub const DEFAULT_COMPILE_SCRIPT: &str = "scripts/compile.sh";

/// Default run program
pub const DEFAULT_RUN_SCRIPT: &str = "scripts/run.sh";

/// Exit code reported by the sandbox when the time limit is hit
pub const DEFAULT_TIMEOUT_EXIT_CODE: i32 = 124;

/// Exit code reported by the sandbox when the process was killed (OOM)
pub const DEFAULT_MEMORY_EXIT_CODE: i32 = 137;

/// Diagnostic text longer than this is cut and suffixed with `...`
pub const DEFAULT_MESSAGE_LIMIT: usize = 200;

/// 0 means every submission gets its own judging task immediately
pub const DEFAULT_JUDGE_MAX_CONCURRENCY: usize = 0;

/// Dead-letter entries kept in memory
pub const DEAD_LETTER_CAPACITY: usize = 256;

/// Separates test cases inside a corpus file
pub const CASE_SEPARATOR: &str = "#TEST_CASE_SEP#";

/// Separates input from expected output inside one test case
pub const FIELD_SEPARATOR: &str = "#IN_OUT_SEP#";

// =============================================================================
// REALTIME DEFAULTS
// =============================================================================

/// Per-subscriber signal buffer
pub const DEFAULT_BROKER_BUFFER: usize = 16;

/// Seconds between SSE keep-alive comments
pub const SSE_KEEP_ALIVE_SECS: u64 = 15;

/// Payload carried by every wake-up signal
pub const NEW_SUBMISSION_SIGNAL: &str = "new submission";

// =============================================================================
// SUPPORTED LANGUAGES
// =============================================================================

/// Language tags understood by the compile and run programs
pub mod languages {
    pub const PYTHON: &str = "py";
    pub const KOTLIN: &str = "kt";
    pub const JAVASCRIPT: &str = "js";
    pub const C: &str = "c";
    pub const CPP: &str = "cpp";

    /// All supported language tags
    pub const ALL: &[&str] = &[PYTHON, KOTLIN, JAVASCRIPT, C, CPP];
}

// =============================================================================
// USER ROLES
// =============================================================================

/// User role identifiers
pub mod roles {
    pub const ADMIN: &str = "admin";
    pub const PARTICIPANT: &str = "participant";
}

// =============================================================================
// SUBMISSION LISTS
// =============================================================================

/// Contest-wide submission lists are capped at this many rows
pub const CONTEST_SUBMISSIONS_LIMIT: i64 = 200;

/// Shown instead of source code to viewers who may not read it
pub const HIDDEN_SOURCE: &str = "Not Available";

// =============================================================================
// API VERSIONING
// =============================================================================

/// API base path
pub const API_BASE_PATH: &str = "/api/v1";

// =============================================================================
// VALIDATION
// =============================================================================

/// Maximum request body size in bytes (2 MB)
pub const MAX_REQUEST_BODY_SIZE: usize = 2 * 1024 * 1024;

/// Maximum source code size in bytes (1 MB)
pub const MAX_SOURCE_CODE_SIZE: u64 = 1024 * 1024;

/// Maximum contest title length
pub const MAX_CONTEST_TITLE_LENGTH: u64 = 256;

/// Maximum problem title length
pub const MAX_PROBLEM_TITLE_LENGTH: u64 = 256;
