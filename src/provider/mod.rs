//! LLM command providers.
//!
//! The composer never talks to an LLM directly. It asks a [`CommandProvider`]
//! which command ids exist and invokes the first known one.

pub mod subprocess;

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;

use crate::error::ProviderError;

pub use subprocess::ExternalCommandProvider;

/// Primary commit-message command id.
pub const PRIMARY_COMMAND: &str = "github.copilot.generateCommitMessage";

/// Secondary synonym, used only when the primary id is unavailable.
pub const SECONDARY_COMMAND: &str = "github.copilot.git.generateCommitMessage";

/// Known command ids in priority order. First available wins.
pub const CANDIDATE_COMMANDS: &[&str] = &[PRIMARY_COMMAND, SECONDARY_COMMAND];

/// Something that can run a named command and hand back a string.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CommandProvider: Send + Sync {
    /// Ids of every command this environment can run right now.
    async fn list_available_commands(&self) -> Result<HashSet<String>, ProviderError>;

    /// Run a command. `None` means it ran but produced no message.
    async fn invoke(&self, command_id: &str) -> Result<Option<String>, ProviderError>;
}

#[async_trait]
impl<T: CommandProvider + ?Sized> CommandProvider for Arc<T> {
    async fn list_available_commands(&self) -> Result<HashSet<String>, ProviderError> {
        (**self).list_available_commands().await
    }

    async fn invoke(&self, command_id: &str) -> Result<Option<String>, ProviderError> {
        (**self).invoke(command_id).await
    }
}

/// Pick the highest-priority candidate present in `available`.
pub fn select_command(available: &HashSet<String>) -> Option<&'static str> {
    CANDIDATE_COMMANDS
        .iter()
        .copied()
        .find(|id| available.contains(*id))
}
