//! Judging pipeline
//!
//! `sandbox` talks to the external compile/run programs, `corpus` parses the
//! test-case file, `engine` drives one submission through both and `verdict`
//! holds the resulting classification.

pub mod corpus;
pub mod engine;
pub mod sandbox;
pub mod verdict;

pub use engine::Judge;
pub use sandbox::{CompileOutcome, RunOutput, Sandbox, SandboxError, ScriptSandbox};
pub use verdict::{JudgeStatus, Verdict};
