//! Stage and commit a single file.
//!
//! Runs two shell invocations in the directory containing the file:
//! 1. `git add "<path>"`
//! 2. `git commit -m "<message>"`
//!
//! Nothing is rolled back if staging succeeds and committing fails; the file
//! stays in the index for the next attempt.

use std::path::Path;
use std::process::Stdio;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::debug;

use crate::error::{CommitError, CommitStage};

/// Captured result of one shell invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GitOutput {
    /// Exit code, `None` when killed by a signal.
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl GitOutput {
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }

    /// Human-readable failure detail: exit code plus stderr, or stdout when
    /// stderr is empty (`nothing to commit` goes to stdout).
    fn failure_detail(&self) -> String {
        let text = if self.stderr.trim().is_empty() {
            self.stdout.trim()
        } else {
            self.stderr.trim()
        };
        let status = self
            .code
            .map_or("terminated by signal".to_string(), |c| format!("exit code {c}"));

        if text.is_empty() {
            status
        } else {
            format!("{status}: {text}")
        }
    }
}

/// Runs a rendered git command line.
///
/// This abstraction allows mocking the process in tests.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait GitRunner: Send + Sync {
    async fn run(&self, command_line: &str, cwd: &Path) -> std::io::Result<GitOutput>;
}

/// Runs command lines through the platform shell.
pub struct ShellRunner;

#[async_trait]
impl GitRunner for ShellRunner {
    async fn run(&self, command_line: &str, cwd: &Path) -> std::io::Result<GitOutput> {
        let mut command = if cfg!(windows) {
            let mut c = Command::new("cmd");
            c.arg("/C").arg(command_line);
            c
        } else {
            let mut c = Command::new("sh");
            c.arg("-c").arg(command_line);
            c
        };

        let output = command
            .current_dir(cwd)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await?;

        Ok(GitOutput {
            code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        })
    }
}

/// Performs the stage+commit sequence for one file.
pub struct CommitExecutor<R = ShellRunner> {
    runner: R,
}

impl CommitExecutor<ShellRunner> {
    pub fn new() -> Self {
        Self {
            runner: ShellRunner,
        }
    }
}

impl Default for CommitExecutor<ShellRunner> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: GitRunner> CommitExecutor<R> {
    pub fn with_runner(runner: R) -> Self {
        Self { runner }
    }

    /// Stage `file_path` and commit it with `message`.
    ///
    /// Fails once, with the stage that broke. No retry.
    pub async fn commit(&self, file_path: &Path, message: &str) -> Result<(), CommitError> {
        let file_path = file_path.canonicalize().map_err(|e| {
            CommitError::new(
                CommitStage::Add,
                format!("{} does not exist: {e}", file_path.display()),
            )
        })?;
        if message.trim().is_empty() {
            return Err(CommitError::new(
                CommitStage::Commit,
                "commit message is empty",
            ));
        }

        let cwd = file_path.parent().unwrap_or(Path::new("/"));

        self.run_stage(CommitStage::Add, &add_command_line(&file_path), cwd)
            .await?;
        self.run_stage(CommitStage::Commit, &commit_command_line(message), cwd)
            .await
    }

    async fn run_stage(
        &self,
        stage: CommitStage,
        command_line: &str,
        cwd: &Path,
    ) -> Result<(), CommitError> {
        debug!("git {}: {}", stage, command_line);

        let output = self
            .runner
            .run(command_line, cwd)
            .await
            .map_err(|e| CommitError::new(stage, format!("failed to launch git: {e}")))?;

        if !output.success() {
            return Err(CommitError::new(stage, output.failure_detail()));
        }

        Ok(())
    }
}

/// `git add "<path>"`
pub fn add_command_line(file_path: &Path) -> String {
    format!(
        "git add \"{}\"",
        escape_double_quoted(&file_path.to_string_lossy())
    )
}

/// `git commit -m "<message>"`
pub fn commit_command_line(message: &str) -> String {
    format!("git commit -m \"{}\"", escape_double_quoted(message))
}

/// Escape text for use inside a double-quoted shell argument.
///
/// `"` is always backslash-escaped. POSIX shells also expand `\`, `$` and
/// `` ` `` inside double quotes, so those are escaped on Unix too.
pub fn escape_double_quoted(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        if needs_escape(ch) {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}

#[cfg(unix)]
fn needs_escape(ch: char) -> bool {
    matches!(ch, '"' | '\\' | '$' | '`')
}

#[cfg(not(unix))]
fn needs_escape(ch: char) -> bool {
    ch == '"'
}
