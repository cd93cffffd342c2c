//! Error types for vibecommit modules using thiserror.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// Errors from LLM command providers.
///
/// These never escape the message composer: every variant degrades to the
/// fallback message.
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("Failed to list available commands: {0}")]
    ListFailed(String),

    #[error("Command '{0}' is not registered")]
    UnknownCommand(String),

    #[error("Failed to spawn '{program}' for command '{command_id}': {source}")]
    SpawnFailed {
        command_id: String,
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Command '{command_id}' exited with code {code}: {stderr}")]
    NonZeroExit {
        command_id: String,
        code: i32,
        stderr: String,
    },

    #[error("Command '{command_id}' reported an error: {message}")]
    ExecutionFailed { command_id: String, message: String },
}

/// The step of the stage+commit sequence that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitStage {
    Add,
    Commit,
}

impl CommitStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            CommitStage::Add => "add",
            CommitStage::Commit => "commit",
        }
    }
}

impl fmt::Display for CommitStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors from the stage+commit sequence.
#[derive(Error, Debug)]
#[error("git {stage} failed: {detail}")]
pub struct CommitError {
    pub stage: CommitStage,
    pub detail: String,
}

impl CommitError {
    pub fn new(stage: CommitStage, detail: impl Into<String>) -> Self {
        Self {
            stage,
            detail: detail.into(),
        }
    }
}

/// Errors from loading settings.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read settings file {path}: {source}")]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse settings file {path}: {source}")]
    ParseFailed {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// Errors from the persisted enable/disable toggle.
#[derive(Error, Debug)]
pub enum StateError {
    #[error("Failed to read toggle state {path}: {source}")]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Toggle state {path} is corrupt: {source}")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to write toggle state {path}: {source}")]
    WriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Errors surfaced by the host-integration layer.
#[derive(Error, Debug)]
pub enum HostError {
    #[error("{} is not inside a git work tree", .0.display())]
    NotInRepository(PathBuf),

    #[error("Failed to open repository: {0}")]
    OpenRepository(#[source] git2::Error),

    #[error("Cannot resolve {path}: {source}")]
    InvalidPath {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    State(#[from] StateError),

    #[error("Git commit failed: {0}")]
    Commit(#[from] CommitError),
}
