//! The save handler: toggle check, compose, commit.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, error, info};

use crate::compose::{CommitMessage, MessageComposer};
use crate::config::Settings;
use crate::error::HostError;
use crate::git::{ChangedFile, CommitExecutor, GitRunner, ShellRunner, Workspace};
use crate::provider::{CommandProvider, ExternalCommandProvider};

use super::bus::SaveListener;
use super::state::ToggleState;

/// What happened to one save notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveOutcome {
    /// The toggle is off; nothing was done.
    Disabled,
    Committed {
        file: ChangedFile,
        message: CommitMessage,
    },
}

/// Commits saved files while the toggle is on.
///
/// Settings and the toggle are re-read on every notification.
pub struct SaveHandler<R = ShellRunner> {
    executor: CommitExecutor<R>,
    provider: Option<Arc<dyn CommandProvider>>,
}

impl SaveHandler<ShellRunner> {
    /// Handler using the shell for git and the configured external commands
    /// for the LLM path.
    pub fn new() -> Self {
        Self {
            executor: CommitExecutor::new(),
            provider: None,
        }
    }
}

impl Default for SaveHandler<ShellRunner> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: GitRunner> SaveHandler<R> {
    pub fn with_executor(executor: CommitExecutor<R>) -> Self {
        Self {
            executor,
            provider: None,
        }
    }

    /// Use `provider` instead of the settings-driven external commands.
    pub fn with_provider(mut self, provider: Arc<dyn CommandProvider>) -> Self {
        self.provider = Some(provider);
        self
    }

    /// Handle one save of `path`.
    pub async fn handle(&self, path: &Path) -> Result<SaveOutcome, HostError> {
        let workspace = Workspace::discover(path)?;

        if !ToggleState::for_workspace(&workspace).is_enabled()? {
            debug!("VibeCommit is off, ignoring save of {}", path.display());
            return Ok(SaveOutcome::Disabled);
        }

        let (file, message) = self.compose_in(&workspace, path).await?;

        match self
            .executor
            .commit(file.absolute_path(), message.as_str())
            .await
        {
            Ok(()) => {
                info!("Committed {}", file.relative_path());
                Ok(SaveOutcome::Committed { file, message })
            }
            Err(e) => {
                error!("Git commit failed: {}", e);
                Err(e.into())
            }
        }
    }

    /// The message a save of `path` would be committed with. Ignores the toggle.
    pub async fn preview(&self, path: &Path) -> Result<(ChangedFile, CommitMessage), HostError> {
        let workspace = Workspace::discover(path)?;
        self.compose_in(&workspace, path).await
    }

    async fn compose_in(
        &self,
        workspace: &Workspace,
        path: &Path,
    ) -> Result<(ChangedFile, CommitMessage), HostError> {
        let file = workspace.changed_file(path)?;
        let settings = Settings::load(workspace.root())?;

        let provider: Arc<dyn CommandProvider> = match &self.provider {
            Some(provider) => Arc::clone(provider),
            None => Arc::new(ExternalCommandProvider::new(
                settings.provider_commands(),
                workspace.root(),
            )),
        };

        let message = MessageComposer::new(provider)
            .compose(&file, &settings.composer())
            .await;

        if message.is_llm() {
            info!("Commit message generated via LLM");
        }

        Ok((file, message))
    }
}

#[async_trait]
impl<R: GitRunner> SaveListener for SaveHandler<R> {
    async fn on_saved(&self, path: &Path) -> Result<SaveOutcome, HostError> {
        self.handle(path).await
    }
}
