//! Compile/run adapter
//!
//! The sandbox itself lives outside this process. [`ScriptSandbox`] speaks the
//! command-line protocol of the compile and run programs:
//!
//! * `<compile_script> <source-file> <language>` prints the artifact path on
//!   stdout and diagnostics on stderr; a non-zero exit is a compile error.
//!   `JUDGE_BUILD_DIR` names a fresh directory the compiler writes into; it
//!   is removed together with the artifact once judging ends.
//! * `<run_script> <artifact> <input-file> <language>` exits with the
//!   program's status; the sandbox reports limit violations through
//!   reserved exit codes.

use std::io;
use std::os::unix::process::ExitStatusExt;
use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Stdio};

use async_trait::async_trait;
use tempfile::{NamedTempFile, TempDir};
use tokio::process::Command;

use crate::config::JudgeConfig;

/// Environment variable naming the per-compile build directory
pub const BUILD_DIR_ENV: &str = "JUDGE_BUILD_DIR";

/// Outcome of a compile call that managed to launch the compiler
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompileOutcome {
    Compiled {
        artifact: PathBuf,
        /// Directory owning the artifact and any build by-products
        build_dir: Option<PathBuf>,
    },
    Failed { stderr: String },
}

/// Captured output of one run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunOutput {
    pub stdout: String,
    pub stderr: String,
    /// Process exit code; death by signal `s` is reported as `128 + s`
    pub exit_code: i32,
}

impl RunOutput {
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }
}

/// Adapter failures (the sandboxed program never ran)
#[derive(Debug, thiserror::Error)]
pub enum SandboxError {
    #[error("failed to launch {program}: {source}")]
    Launch {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("failed to prepare {what}: {source}")]
    Io {
        what: &'static str,
        #[source]
        source: io::Error,
    },

    #[error("compiler succeeded but reported no artifact")]
    MissingArtifact,
}

/// Port to the external compile/run programs
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Sandbox: Send + Sync {
    /// Build `source_code`; the returned artifact belongs to the caller
    async fn compile(
        &self,
        source_code: &str,
        language: &str,
    ) -> Result<CompileOutcome, SandboxError>;

    /// Execute a compiled artifact with `input` on stdin-equivalent
    async fn run(
        &self,
        artifact: &Path,
        input: &str,
        language: &str,
    ) -> Result<RunOutput, SandboxError>;
}

/// [`Sandbox`] backed by the configured compile and run programs
#[derive(Debug, Clone)]
pub struct ScriptSandbox {
    compile_script: PathBuf,
    run_script: PathBuf,
    work_dir: PathBuf,
}

impl ScriptSandbox {
    pub fn new(compile_script: PathBuf, run_script: PathBuf, work_dir: PathBuf) -> Self {
        Self {
            compile_script,
            run_script,
            work_dir,
        }
    }

    pub fn from_config(config: &JudgeConfig) -> Self {
        Self::new(
            config.compile_script.clone(),
            config.run_script.clone(),
            config.work_dir.clone(),
        )
    }

    /// Write `content` to a fresh file under the work dir, removed on drop
    async fn stage(
        &self,
        prefix: &str,
        suffix: &str,
        content: &str,
        what: &'static str,
    ) -> Result<NamedTempFile, SandboxError> {
        let file = tempfile::Builder::new()
            .prefix(prefix)
            .suffix(suffix)
            .tempfile_in(&self.work_dir)
            .map_err(|source| SandboxError::Io { what, source })?;

        tokio::fs::write(file.path(), content)
            .await
            .map_err(|source| SandboxError::Io { what, source })?;

        Ok(file)
    }

    /// Fresh build directory under the work dir; removed on drop unless kept
    fn build_dir(&self) -> Result<TempDir, SandboxError> {
        tempfile::Builder::new()
            .prefix("build-")
            .tempdir_in(&self.work_dir)
            .map_err(|source| SandboxError::Io {
                what: "build directory",
                source,
            })
    }
}

#[async_trait]
impl Sandbox for ScriptSandbox {
    async fn compile(
        &self,
        source_code: &str,
        language: &str,
    ) -> Result<CompileOutcome, SandboxError> {
        let source = self
            .stage("source-", &format!(".{language}"), source_code, "source file")
            .await?;
        let build_dir = self.build_dir()?;

        let output = Command::new(&self.compile_script)
            .arg(source.path())
            .arg(language)
            .env(BUILD_DIR_ENV, build_dir.path())
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|source| SandboxError::Launch {
                program: self.compile_script.display().to_string(),
                source,
            })?;

        if !output.status.success() {
            tracing::debug!(
                language = %language,
                exit_code = exit_code(output.status),
                "Compilation failed"
            );
            return Ok(CompileOutcome::Failed {
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            });
        }

        let artifact = String::from_utf8_lossy(&output.stdout).trim().to_string();
        if artifact.is_empty() {
            return Err(SandboxError::MissingArtifact);
        }

        Ok(CompileOutcome::Compiled {
            artifact: PathBuf::from(artifact),
            build_dir: Some(build_dir.keep()),
        })
    }

    async fn run(
        &self,
        artifact: &Path,
        input: &str,
        language: &str,
    ) -> Result<RunOutput, SandboxError> {
        let input_file = self.stage("input-", ".txt", input, "input file").await?;

        let output = Command::new(&self.run_script)
            .arg(artifact)
            .arg(input_file.path())
            .arg(language)
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|source| SandboxError::Launch {
                program: self.run_script.display().to_string(),
                source,
            })?;

        Ok(RunOutput {
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            exit_code: exit_code(output.status),
        })
    }
}

fn exit_code(status: ExitStatus) -> i32 {
    status
        .code()
        .or_else(|| status.signal().map(|signal| 128 + signal))
        .unwrap_or(-1)
}

/// `python3` is the only toolchain the bundled scripts need for `py`
#[cfg(test)]
pub(crate) fn python_available() -> bool {
    std::process::Command::new("python3")
        .arg("--version")
        .output()
        .is_ok_and(|output| output.status.success())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::os::unix::fs::PermissionsExt;

    fn script(dir: &Path, name: &str, body: &str) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
        path
    }

    #[tokio::test]
    async fn test_compile_reports_artifact_in_build_dir() {
        let dir = tempfile::tempdir().unwrap();
        let compile = script(
            dir.path(),
            "compile.sh",
            r#"cp "$1" "$JUDGE_BUILD_DIR/main.py" && echo "$JUDGE_BUILD_DIR/main.py""#,
        );
        let sandbox = ScriptSandbox::new(compile, dir.path().join("run.sh"), dir.path().into());

        let outcome = sandbox.compile("print(1)", "py").await.unwrap();
        let (artifact, build_dir) = match outcome {
            CompileOutcome::Compiled {
                artifact,
                build_dir: Some(build_dir),
            } => (artifact, build_dir),
            other => panic!("expected a successful compile, got {other:?}"),
        };
        assert_eq!(fs::read_to_string(&artifact).unwrap(), "print(1)");
        assert_eq!(artifact.parent(), Some(build_dir.as_path()));
        assert_eq!(build_dir.parent(), Some(dir.path()));
    }

    #[tokio::test]
    async fn test_compile_failure_captures_stderr_and_cleans_up() {
        let dir = tempfile::tempdir().unwrap();
        let scripts = tempfile::tempdir().unwrap();
        let compile = script(
            scripts.path(),
            "compile.sh",
            "touch \"$JUDGE_BUILD_DIR/partial.o\"\necho 'syntax error' >&2\nexit 1",
        );
        let sandbox = ScriptSandbox::new(compile, scripts.path().join("run.sh"), dir.path().into());

        let outcome = sandbox.compile("oops", "c").await.unwrap();
        assert_eq!(
            outcome,
            CompileOutcome::Failed {
                stderr: "syntax error\n".to_string()
            }
        );
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_missing_compiler_is_a_launch_error() {
        let dir = tempfile::tempdir().unwrap();
        let sandbox = ScriptSandbox::new(
            dir.path().join("absent.sh"),
            dir.path().join("run.sh"),
            dir.path().into(),
        );

        let err = sandbox.compile("x", "py").await.unwrap_err();
        assert!(matches!(err, SandboxError::Launch { .. }));
    }

    #[tokio::test]
    async fn test_run_passes_input_file_and_exit_code() {
        let dir = tempfile::tempdir().unwrap();
        let run = script(dir.path(), "run.sh", "cat \"$2\"\necho \"$3\" >&2\nexit 124");
        let sandbox = ScriptSandbox::new(dir.path().join("compile.sh"), run, dir.path().into());

        let output = sandbox
            .run(Path::new("/bin/true"), "1 2 3", "kt")
            .await
            .unwrap();
        assert_eq!(output.stdout, "1 2 3");
        assert_eq!(output.stderr, "kt\n");
        assert_eq!(output.exit_code, 124);
        assert!(!output.success());
    }

    #[tokio::test]
    async fn test_signal_death_maps_to_128_plus_signal() {
        let dir = tempfile::tempdir().unwrap();
        let run = script(dir.path(), "run.sh", "kill -9 $$");
        let sandbox = ScriptSandbox::new(dir.path().join("compile.sh"), run, dir.path().into());

        let output = sandbox.run(Path::new("/bin/true"), "", "c").await.unwrap();
        assert_eq!(output.exit_code, 137);
    }

    #[tokio::test]
    async fn test_bundled_run_script_reports_memory_exhaustion() {
        if !python_available() {
            return;
        }
        let scripts = Path::new(env!("CARGO_MANIFEST_DIR")).join("scripts");
        let dir = tempfile::tempdir().unwrap();
        let program = dir.path().join("main.py");
        fs::write(&program, "data = bytearray(8 * 1024 * 1024 * 1024)\nprint(len(data))\n").unwrap();
        let sandbox = ScriptSandbox::new(
            scripts.join("compile.sh"),
            scripts.join("run.sh"),
            dir.path().into(),
        );

        let output = sandbox.run(&program, "", "py").await.unwrap();
        assert_eq!(output.exit_code, 137);
        assert!(output.stderr.contains("MemoryError"));

        fs::write(&program, "raise SystemExit(3)\n").unwrap();
        let output = sandbox.run(&program, "", "py").await.unwrap();
        assert_eq!(output.exit_code, 3);
    }
}
