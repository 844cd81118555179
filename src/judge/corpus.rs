//! Test-case corpus parsing
//!
//! A corpus is a flat text file. Cases are separated by
//! [`CASE_SEPARATOR`]; inside a case, input and expected output are separated
//! by [`FIELD_SEPARATOR`]. Whitespace around every field is insignificant and
//! blank segments (for example after a trailing separator) are skipped.
//!
//! Neither token is escaped, so test data containing a separator is
//! undefined behavior.

use std::path::Path;

use tokio::fs;

use crate::constants::{CASE_SEPARATOR, FIELD_SEPARATOR};

/// Input/expected-output pair
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestCase {
    /// 1-based position in the corpus
    pub index: usize,
    pub input: String,
    pub expected_output: String,
}

/// Corpus loading errors
#[derive(Debug, thiserror::Error)]
pub enum CorpusError {
    #[error("test case file error")]
    Read(#[source] std::io::Error),

    #[error("test case {index}: invalid format")]
    InvalidFormat { index: usize },
}

/// Split corpus text into ordered test cases
pub fn parse(content: &str) -> Result<Vec<TestCase>, CorpusError> {
    let mut cases = Vec::new();

    for segment in content.split(CASE_SEPARATOR) {
        let segment = segment.trim();
        if segment.is_empty() {
            continue;
        }

        let index = cases.len() + 1;
        let fields: Vec<&str> = segment.split(FIELD_SEPARATOR).collect();
        let [input, expected_output] = fields.as_slice() else {
            return Err(CorpusError::InvalidFormat { index });
        };

        cases.push(TestCase {
            index,
            input: input.trim().to_string(),
            expected_output: expected_output.trim().to_string(),
        });
    }

    Ok(cases)
}

/// Read and parse the corpus at `path`
pub async fn load(path: &Path) -> Result<Vec<TestCase>, CorpusError> {
    let content = fs::read_to_string(path).await.map_err(CorpusError::Read)?;
    parse(&content)
}
