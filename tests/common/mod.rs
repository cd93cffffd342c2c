//! Shared test utilities for integration tests.
//!
//! Not all functions are used by every test file, but they're shared across tests.
#![allow(dead_code)]

use std::collections::HashSet;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use async_trait::async_trait;
use git2::Repository;

use vibecommit::ProviderError;
use vibecommit::config::{INCLUDE_TIMESTAMP_ENV_VAR, MESSAGE_PREFIX_ENV_VAR, USE_LLM_ENV_VAR};
use vibecommit::provider::CommandProvider;

/// Run `test` with the VIBECOMMIT_* settings overrides unset.
pub async fn without_env_overrides<F: Future>(test: F) -> F::Output {
    with_prefix_override(None, test).await
}

/// Run `test` with `VIBECOMMIT_MESSAGE_PREFIX` set to `prefix` and the
/// other overrides unset.
pub async fn with_prefix_override<F: Future>(prefix: Option<&str>, test: F) -> F::Output {
    temp_env::async_with_vars(
        [
            (USE_LLM_ENV_VAR, None),
            (MESSAGE_PREFIX_ENV_VAR, prefix),
            (INCLUDE_TIMESTAMP_ENV_VAR, None),
        ],
        test,
    )
    .await
}

/// A test git repository builder for integration tests.
pub struct TestRepo {
    pub dir: tempfile::TempDir,
    pub repo: Repository,
}

impl TestRepo {
    /// Create a new empty git repository in a temp directory, with a local
    /// identity so `git commit` works without global config.
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("Failed to create temp directory");
        let repo = Repository::init(dir.path()).expect("Failed to init git repo");

        let mut config = repo.config().expect("Failed to open repo config");
        config
            .set_str("user.name", "Test User")
            .expect("Failed to set user.name");
        config
            .set_str("user.email", "test@example.com")
            .expect("Failed to set user.email");
        config
            .set_bool("commit.gpgsign", false)
            .expect("Failed to disable signing");

        Self { dir, repo }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Write `content` to `relative`, creating parent directories.
    pub fn write(&self, relative: &str, content: &str) -> PathBuf {
        let path = self.dir.path().join(relative);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("Failed to create parent dirs");
        }
        std::fs::write(&path, content).expect("Failed to write test file");
        path
    }

    /// Message of the HEAD commit, without the trailing newline.
    pub fn head_message(&self) -> Option<String> {
        let commit = self.repo.head().ok()?.peel_to_commit().ok()?;
        commit.message().map(|m| m.trim_end().to_string())
    }

    /// Number of commits reachable from HEAD.
    pub fn commit_count(&self) -> usize {
        let Ok(mut walk) = self.repo.revwalk() else {
            return 0;
        };
        if walk.push_head().is_err() {
            return 0;
        }
        walk.count()
    }

    /// Paths touched by the HEAD commit.
    pub fn head_files(&self) -> Vec<String> {
        let commit = self
            .repo
            .head()
            .and_then(|h| h.peel_to_commit())
            .expect("No HEAD commit");
        let tree = commit.tree().expect("Failed to read tree");
        let parent_tree = commit.parent(0).ok().and_then(|p| p.tree().ok());

        let diff = self
            .repo
            .diff_tree_to_tree(parent_tree.as_ref(), Some(&tree), None)
            .expect("Failed to diff");

        diff.deltas()
            .filter_map(|d| d.new_file().path().map(|p| p.to_string_lossy().replace('\\', "/")))
            .collect()
    }

    /// Switch auto-commit on for this repository.
    pub fn enable(&self) {
        let workspace = vibecommit::Workspace::discover(self.path()).expect("Failed to discover");
        vibecommit::host::ToggleState::for_workspace(&workspace)
            .set_enabled(true)
            .expect("Failed to enable");
    }
}

/// Provider with a fixed command list and a fixed answer.
pub struct FakeProvider {
    pub available: Vec<String>,
    pub answer: Result<Option<String>, String>,
    pub invoked: Mutex<Vec<String>>,
}

impl FakeProvider {
    pub fn answering(available: &[&str], answer: &str) -> Self {
        Self {
            available: available.iter().map(|s| s.to_string()).collect(),
            answer: Ok(Some(answer.to_string())),
            invoked: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(available: &[&str], error: &str) -> Self {
        Self {
            available: available.iter().map(|s| s.to_string()).collect(),
            answer: Err(error.to_string()),
            invoked: Mutex::new(Vec::new()),
        }
    }

    pub fn invocations(&self) -> Vec<String> {
        self.invoked.lock().unwrap().clone()
    }
}

#[async_trait]
impl CommandProvider for FakeProvider {
    async fn list_available_commands(&self) -> Result<HashSet<String>, ProviderError> {
        Ok(self.available.iter().cloned().collect())
    }

    async fn invoke(&self, command_id: &str) -> Result<Option<String>, ProviderError> {
        self.invoked.lock().unwrap().push(command_id.to_string());
        self.answer
            .clone()
            .map_err(|message| ProviderError::ExecutionFailed {
                command_id: command_id.to_string(),
                message,
            })
    }
}
