//! Persisted enable/disable toggle.
//!
//! Stored per repository as `<git-dir>/vibecommit.json`. A missing file means
//! disabled.

use std::io::Write;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;
use tracing::debug;

use crate::error::StateError;
use crate::git::Workspace;

/// State file name inside the git directory.
pub const STATE_FILE: &str = "vibecommit.json";

#[derive(Debug, Default, Serialize, Deserialize)]
struct PersistedState {
    #[serde(default)]
    enabled: bool,
}

/// Handle on the persisted toggle. Every read goes to disk.
#[derive(Debug, Clone)]
pub struct ToggleState {
    path: PathBuf,
}

impl ToggleState {
    pub fn for_workspace(workspace: &Workspace) -> Self {
        Self::at(workspace.git_dir().join(STATE_FILE))
    }

    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_enabled(&self) -> Result<bool, StateError> {
        Ok(self.read()?.enabled)
    }

    /// Persist `enabled` atomically (temp file + rename).
    pub fn set_enabled(&self, enabled: bool) -> Result<(), StateError> {
        let write_failed = |source: std::io::Error| StateError::WriteFailed {
            path: self.path.clone(),
            source,
        };

        let dir = self.path.parent().unwrap_or(Path::new("."));
        let mut file = NamedTempFile::new_in(dir).map_err(write_failed)?;

        let json = serde_json::to_string_pretty(&PersistedState { enabled })
            .map_err(|e| write_failed(e.into()))?;
        file.write_all(json.as_bytes()).map_err(write_failed)?;
        file.persist(&self.path).map_err(|e| write_failed(e.error))?;

        debug!("Toggle state {} -> {}", self.path.display(), enabled);
        Ok(())
    }

    /// Flip the toggle and return the new value.
    pub fn toggle(&self) -> Result<bool, StateError> {
        let enabled = !self.is_enabled()?;
        self.set_enabled(enabled)?;
        Ok(enabled)
    }

    fn read(&self) -> Result<PersistedState, StateError> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Ok(PersistedState::default());
            }
            Err(source) => {
                return Err(StateError::ReadFailed {
                    path: self.path.clone(),
                    source,
                });
            }
        };

        serde_json::from_str(&content).map_err(|source| StateError::Corrupt {
            path: self.path.clone(),
            source,
        })
    }
}
