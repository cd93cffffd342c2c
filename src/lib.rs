//! vibecommit - auto-commit files on save.
//!
//! # Overview
//!
//! Every save of a file in a repository where vibecommit is switched on is
//! staged and committed on its own. The commit message comes from an LLM
//! command when one is configured and available, otherwise from a
//! deterministic template (`chore(vibe): <timestamp> updated <path>`).

pub mod compose;
pub mod config;
pub mod error;
pub mod git;
pub mod host;
pub mod provider;

// Re-export commonly used types
pub use compose::{CommitMessage, MessageComposer, MessageSource};
pub use config::{ComposerConfig, Settings};
pub use error::{CommitError, CommitStage, ConfigError, HostError, ProviderError, StateError};
pub use git::{ChangedFile, CommitExecutor, Workspace};
pub use host::{Host, SaveHandler, SaveOutcome};
pub use provider::{CommandProvider, ExternalCommandProvider};
