//! Judging engine
//!
//! Compiles a submission once, then runs it against every test case in
//! corpus order, stopping at the first failure.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, warn};

use crate::config::JudgeConfig;

use super::corpus::{self, CorpusError, TestCase};
use super::sandbox::{CompileOutcome, RunOutput, Sandbox};
use super::verdict::{truncate_diagnostic, ExitCodes, JudgeStatus, Verdict};

/// Removes the compiled artifact and its build directory when judging ends,
/// whatever the outcome
struct ArtifactGuard {
    artifact: PathBuf,
    build_dir: Option<PathBuf>,
}

impl ArtifactGuard {
    fn path(&self) -> &Path {
        &self.artifact
    }
}

impl Drop for ArtifactGuard {
    fn drop(&mut self) {
        if let Some(dir) = &self.build_dir {
            remove(dir, std::fs::remove_dir_all(dir));
        }
        // compilers that ignore the build dir leave the artifact elsewhere
        if !self.build_dir.as_ref().is_some_and(|dir| self.artifact.starts_with(dir)) {
            remove(&self.artifact, std::fs::remove_file(&self.artifact));
        }
    }
}

fn remove(path: &Path, result: std::io::Result<()>) {
    if let Err(e) = result {
        if e.kind() != std::io::ErrorKind::NotFound {
            warn!(path = %path.display(), error = %e, "Failed to remove build output");
        }
    }
}

impl From<CorpusError> for Verdict {
    fn from(err: CorpusError) -> Self {
        match err {
            CorpusError::Read(_) => Verdict::new(JudgeStatus::Error, err.to_string()),
            CorpusError::InvalidFormat { .. } => Verdict::new(JudgeStatus::Fail, err.to_string()),
        }
    }
}

/// Judging engine
#[derive(Clone)]
pub struct Judge {
    sandbox: Arc<dyn Sandbox>,
    exit_codes: ExitCodes,
    message_limit: usize,
}

impl Judge {
    pub fn new(sandbox: Arc<dyn Sandbox>, config: &JudgeConfig) -> Self {
        Self {
            sandbox,
            exit_codes: ExitCodes {
                timeout: config.timeout_exit_code,
                memory: config.memory_exit_code,
            },
            message_limit: config.message_limit,
        }
    }

    /// Judge `source_code` against the corpus at `corpus_path`
    ///
    /// Never fails: every problem, including judge-side ones, is expressed
    /// in the returned verdict.
    pub async fn judge(&self, source_code: &str, corpus_path: &Path, language: &str) -> Verdict {
        let artifact = match self.sandbox.compile(source_code, language).await {
            Ok(CompileOutcome::Compiled { artifact, build_dir }) => {
                ArtifactGuard { artifact, build_dir }
            }
            Ok(CompileOutcome::Failed { stderr }) => {
                return Verdict::new(JudgeStatus::CompileError, stderr);
            }
            Err(e) => {
                warn!(language = %language, error = %e, "Compiler could not be launched");
                return Verdict::new(JudgeStatus::ExecutionError, e.to_string());
            }
        };

        let cases = match corpus::load(corpus_path).await {
            Ok(cases) => cases,
            Err(e) => {
                warn!(corpus = %corpus_path.display(), error = %e, "Unusable test-case corpus");
                return e.into();
            }
        };

        self.run_cases(artifact.path(), &cases, language).await
    }

    async fn run_cases(&self, artifact: &Path, cases: &[TestCase], language: &str) -> Verdict {
        for case in cases {
            let output = match self.sandbox.run(artifact, &case.input, language).await {
                Ok(output) => output,
                Err(e) => {
                    warn!(case = case.index, error = %e, "Run could not be launched");
                    return Verdict::new(JudgeStatus::ExecutionError, e.to_string());
                }
            };

            if !output.success() {
                debug!(case = case.index, exit_code = output.exit_code, "Run exited abnormally");
                return self.classify_exit(&output);
            }

            let actual = output.stdout.trim();
            if actual != case.expected_output {
                debug!(case = case.index, "Wrong answer");
                return Verdict::wrong_answer(case.index, &case.input, actual, &case.expected_output);
            }
        }

        Verdict::pass()
    }

    fn classify_exit(&self, output: &RunOutput) -> Verdict {
        Verdict::new(
            self.exit_codes.classify(output.exit_code),
            truncate_diagnostic(&output.stderr, self.message_limit),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::judge::sandbox::{python_available, MockSandbox, SandboxError, ScriptSandbox};
    use std::io::Write;

    const CORPUS: &str = "1 2#IN_OUT_SEP#3#TEST_CASE_SEP#2 2#IN_OUT_SEP#4#TEST_CASE_SEP#5 5#IN_OUT_SEP#10";

    fn corpus_file(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{content}").unwrap();
        file
    }

    fn compiling_sandbox() -> MockSandbox {
        let mut sandbox = MockSandbox::new();
        sandbox.expect_compile().times(1).returning(|_, _| {
            Ok(CompileOutcome::Compiled {
                artifact: PathBuf::from("/nonexistent/artifact"),
                build_dir: None,
            })
        });
        sandbox
    }

    fn ok(stdout: &str) -> RunOutput {
        RunOutput {
            stdout: stdout.to_string(),
            ..RunOutput::default()
        }
    }

    fn judge(sandbox: MockSandbox) -> Judge {
        Judge::new(Arc::new(sandbox), &JudgeConfig::default())
    }

    /// Adds the two numbers on the input line
    fn add(input: &str) -> String {
        let sum: i64 = input.split_whitespace().map(|n| n.parse::<i64>().unwrap()).sum();
        format!("{sum}\n")
    }

    #[tokio::test]
    async fn test_all_cases_pass() {
        let mut sandbox = compiling_sandbox();
        sandbox
            .expect_run()
            .times(3)
            .returning(|_, input, _| Ok(ok(&add(input))));
        let corpus = corpus_file(CORPUS);

        let verdict = judge(sandbox).judge("src", corpus.path(), "py").await;
        assert_eq!(verdict, Verdict::pass());
    }

    #[tokio::test]
    async fn test_wrong_answer_stops_at_first_mismatch() {
        let mut sandbox = compiling_sandbox();
        sandbox.expect_run().times(2).returning(|_, input, _| {
            if input == "2 2" {
                Ok(ok("5\n"))
            } else {
                Ok(ok(&add(input)))
            }
        });
        let corpus = corpus_file(CORPUS);

        let verdict = judge(sandbox).judge("src", corpus.path(), "py").await;
        assert_eq!(verdict.status, JudgeStatus::Fail);
        assert!(verdict.message.starts_with("Failed on test case 2\n"));
        assert!(verdict.message.contains("```text\n5\n```"));
    }

    #[tokio::test]
    async fn test_compile_error_runs_nothing() {
        let mut sandbox = MockSandbox::new();
        sandbox.expect_compile().returning(|_, _| {
            Ok(CompileOutcome::Failed {
                stderr: "main.c:1: error".to_string(),
            })
        });
        sandbox.expect_run().never();
        let corpus = corpus_file(CORPUS);

        let verdict = judge(sandbox).judge("src", corpus.path(), "c").await;
        assert_eq!(verdict, Verdict::new(JudgeStatus::CompileError, "main.c:1: error"));
    }

    #[tokio::test]
    async fn test_compiler_launch_failure() {
        let mut sandbox = MockSandbox::new();
        sandbox.expect_compile().returning(|_, _| {
            Err(SandboxError::Launch {
                program: "compile.sh".to_string(),
                source: std::io::Error::from(std::io::ErrorKind::NotFound),
            })
        });
        let corpus = corpus_file(CORPUS);

        let verdict = judge(sandbox).judge("src", corpus.path(), "c").await;
        assert_eq!(verdict.status, JudgeStatus::ExecutionError);
        assert!(verdict.message.contains("compile.sh"));
    }

    #[tokio::test]
    async fn test_limit_exit_codes_win_over_correct_output() {
        for (code, status) in [
            (124, JudgeStatus::TimeLimitExceeded),
            (137, JudgeStatus::MemoryLimitExceeded),
            (1, JudgeStatus::RuntimeError),
        ] {
            let mut sandbox = compiling_sandbox();
            sandbox.expect_run().times(1).returning(move |_, input, _| {
                Ok(RunOutput {
                    stdout: add(input),
                    stderr: "e".repeat(300),
                    exit_code: code,
                })
            });
            let corpus = corpus_file(CORPUS);

            let verdict = judge(sandbox).judge("src", corpus.path(), "py").await;
            assert_eq!(verdict.status, status);
            assert_eq!(verdict.message, format!("{}...", "e".repeat(200)));
        }
    }

    #[tokio::test]
    async fn test_run_launch_failure() {
        let mut sandbox = compiling_sandbox();
        sandbox.expect_run().returning(|_, _, _| {
            Err(SandboxError::Io {
                what: "input file",
                source: std::io::Error::other("disk full"),
            })
        });
        let corpus = corpus_file(CORPUS);

        let verdict = judge(sandbox).judge("src", corpus.path(), "py").await;
        assert_eq!(verdict.status, JudgeStatus::ExecutionError);
        assert!(verdict.message.contains("disk full"));
    }

    #[tokio::test]
    async fn test_unreadable_corpus_is_judge_error() {
        let mut sandbox = compiling_sandbox();
        sandbox.expect_run().never();

        let verdict = judge(sandbox)
            .judge("src", Path::new("/no/such/corpus.txt"), "py")
            .await;
        assert_eq!(verdict, Verdict::new(JudgeStatus::Error, "test case file error"));
    }

    #[tokio::test]
    async fn test_malformed_case_fails_before_running() {
        let mut sandbox = compiling_sandbox();
        sandbox.expect_run().never();
        let corpus = corpus_file("1#IN_OUT_SEP#1#TEST_CASE_SEP#broken");

        let verdict = judge(sandbox).judge("src", corpus.path(), "py").await;
        assert_eq!(verdict, Verdict::new(JudgeStatus::Fail, "test case 2: invalid format"));
    }

    #[tokio::test]
    async fn test_artifact_removed_after_judging() {
        let artifact = tempfile::NamedTempFile::new().unwrap().into_temp_path().keep().unwrap();
        let artifact_for_mock = artifact.clone();
        assert!(artifact.exists());

        let mut sandbox = MockSandbox::new();
        sandbox.expect_compile().returning(move |_, _| {
            Ok(CompileOutcome::Compiled {
                artifact: artifact_for_mock.clone(),
                build_dir: None,
            })
        });
        sandbox.expect_run().returning(|_, _, _| {
            Ok(RunOutput {
                exit_code: 1,
                ..RunOutput::default()
            })
        });
        let corpus = corpus_file(CORPUS);

        let verdict = judge(sandbox).judge("src", corpus.path(), "py").await;
        assert_eq!(verdict.status, JudgeStatus::RuntimeError);
        assert!(!artifact.exists());
    }

    #[tokio::test]
    async fn test_build_dir_removed_after_judging() {
        let build_dir = tempfile::tempdir().unwrap().keep();
        std::fs::create_dir(build_dir.join("__pycache__")).unwrap();
        std::fs::write(build_dir.join("main.py"), "print(3)").unwrap();
        let dir_for_mock = build_dir.clone();

        let mut sandbox = MockSandbox::new();
        sandbox.expect_compile().returning(move |_, _| {
            Ok(CompileOutcome::Compiled {
                artifact: dir_for_mock.join("main.py"),
                build_dir: Some(dir_for_mock.clone()),
            })
        });
        sandbox.expect_run().returning(|_, _, _| Ok(ok("3")));
        let corpus = corpus_file("1 2#IN_OUT_SEP#3");

        let verdict = judge(sandbox).judge("src", corpus.path(), "py").await;
        assert_eq!(verdict, Verdict::pass());
        assert!(!build_dir.exists());
    }

    #[tokio::test]
    async fn test_bundled_scripts_leave_nothing_behind() {
        if !python_available() {
            return;
        }
        let scripts = Path::new(env!("CARGO_MANIFEST_DIR")).join("scripts");
        let work_dir = tempfile::tempdir().unwrap();
        let sandbox = ScriptSandbox::new(
            scripts.join("compile.sh"),
            scripts.join("run.sh"),
            work_dir.path().into(),
        );
        let corpus = corpus_file(CORPUS);

        let verdict = Judge::new(Arc::new(sandbox), &JudgeConfig::default())
            .judge(
                "print(sum(map(int, input().split())))",
                corpus.path(),
                "py",
            )
            .await;

        assert_eq!(verdict, Verdict::pass());
        let leftovers: Vec<_> = std::fs::read_dir(work_dir.path())
            .unwrap()
            .map(|entry| entry.unwrap().file_name())
            .collect();
        assert!(leftovers.is_empty(), "left behind: {leftovers:?}");
    }
}
