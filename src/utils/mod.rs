//! Utility functions

pub mod time;
pub mod validation;

pub use time::{now_utc, parse_datetime};
pub use validation::validate_language;
