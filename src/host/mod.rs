//! Host integration: the toggle, the status indicator and save notifications.
//!
//! [`Host`] owns all process-wide state. It is created by [`Host::activate`]
//! (toggle read-or-default, status shown, save handler registered) and torn
//! down by [`Host::deactivate`], after which no notifications are delivered.

pub mod bus;
pub mod handler;
pub mod state;
pub mod status;
pub mod watch;

use std::future::Future;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use tracing::info;

use crate::config::Settings;
use crate::error::HostError;
use crate::git::Workspace;

pub use bus::{SaveBus, SaveListener};
pub use handler::{SaveHandler, SaveOutcome};
pub use state::ToggleState;
pub use status::{StatusIndicator, status_text, toggle_announcement};
pub use watch::Watcher;

/// An activated host bound to one repository.
pub struct Host {
    workspace: Workspace,
    toggle: ToggleState,
    status: StatusIndicator,
    bus: SaveBus,
}

impl Host {
    /// Activate for the repository containing `path` with the default
    /// save handler.
    pub fn activate(path: &Path) -> Result<Self, HostError> {
        Self::activate_with(path, Arc::new(SaveHandler::new()))
    }

    /// Activate with a custom save listener.
    pub fn activate_with(path: &Path, listener: Arc<dyn SaveListener>) -> Result<Self, HostError> {
        let workspace = Workspace::discover(path)?;
        let toggle = ToggleState::for_workspace(&workspace);
        let status = StatusIndicator::new(toggle.is_enabled()?);

        let mut bus = SaveBus::new();
        bus.subscribe(listener);

        info!("VibeCommit active in {}", workspace.root().display());

        Ok(Self {
            workspace,
            toggle,
            status,
            bus,
        })
    }

    pub fn workspace(&self) -> &Workspace {
        &self.workspace
    }

    pub fn status(&self) -> &StatusIndicator {
        &self.status
    }

    /// Flip the toggle, persist it and refresh the status. Returns the new value.
    pub fn toggle(&mut self) -> Result<bool, HostError> {
        let enabled = self.toggle.toggle()?;
        self.status.update(enabled);
        info!("{}", toggle_announcement(enabled));
        Ok(enabled)
    }

    pub fn set_enabled(&mut self, enabled: bool) -> Result<(), HostError> {
        self.toggle.set_enabled(enabled)?;
        self.status.update(enabled);
        info!("{}", toggle_announcement(enabled));
        Ok(())
    }

    /// Deliver a "document saved" notification.
    pub async fn document_saved(&self, path: &Path) -> Vec<Result<SaveOutcome, HostError>> {
        self.bus.publish(path).await
    }

    /// Poll the work tree for saves until `shutdown` resolves.
    pub async fn watch<F>(&self, shutdown: F) -> Result<(), HostError>
    where
        F: Future<Output = ()>,
    {
        let settings = Settings::load(self.workspace.root())?;
        let watcher = Watcher::new(
            self.workspace.root(),
            Duration::from_millis(settings.watch.interval_ms.max(1)),
            settings.watch.ignore,
        );
        watcher.run(&self.bus, shutdown).await;
        Ok(())
    }

    pub fn deactivate(self) {
        info!("VibeCommit deactivated");
    }
}
