//! Polling work-tree watcher.
//!
//! Stands in for an editor's save notifications: every tick the work tree is
//! scanned and each file whose modification time changed (or that appeared)
//! is published on the bus, one at a time.

use std::collections::HashMap;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use git2::Repository;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};
use walkdir::{DirEntry, WalkDir};

use super::bus::SaveBus;

/// Modification times of every file under a root.
pub type Snapshot = HashMap<PathBuf, SystemTime>;

/// Scan `root`, skipping `.git`, any directory named in `ignore` and, when
/// `root` is a repository, every path its ignore rules exclude.
///
/// Entries that vanish or cannot be read mid-scan are skipped.
pub fn scan(root: &Path, ignore: &[String]) -> Snapshot {
    let repo = Repository::open(root).ok();

    WalkDir::new(root)
        .into_iter()
        .filter_entry(|entry| {
            !is_ignored(entry, ignore) && !is_git_ignored(repo.as_ref(), root, entry)
        })
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(e) => {
                debug!("Skipping unreadable entry: {}", e);
                None
            }
        })
        .filter(|entry| entry.file_type().is_file())
        .filter_map(|entry| {
            let modified = entry.metadata().ok()?.modified().ok()?;
            Some((entry.into_path(), modified))
        })
        .collect()
}

fn is_ignored(entry: &DirEntry, ignore: &[String]) -> bool {
    if entry.depth() == 0 || !entry.file_type().is_dir() {
        return false;
    }
    let name = entry.file_name().to_string_lossy();
    name == ".git" || ignore.iter().any(|i| *i == name)
}

fn is_git_ignored(repo: Option<&Repository>, root: &Path, entry: &DirEntry) -> bool {
    let Some(repo) = repo else {
        return false;
    };
    let Ok(relative) = entry.path().strip_prefix(root) else {
        return false;
    };
    if relative.as_os_str().is_empty() {
        return false;
    }
    repo.is_path_ignored(relative).unwrap_or(false)
}

/// Files that are new or modified in `next` relative to `previous`, sorted.
pub fn changed_since(previous: &Snapshot, next: &Snapshot) -> Vec<PathBuf> {
    let mut changed: Vec<PathBuf> = next
        .iter()
        .filter(|(path, modified)| previous.get(*path) != Some(*modified))
        .map(|(path, _)| path.clone())
        .collect();
    changed.sort();
    changed
}

/// Polls a work tree and publishes saves.
pub struct Watcher {
    root: PathBuf,
    interval: Duration,
    ignore: Vec<String>,
}

impl Watcher {
    pub fn new(root: impl Into<PathBuf>, interval: Duration, ignore: Vec<String>) -> Self {
        Self {
            root: root.into(),
            interval,
            ignore,
        }
    }

    /// Poll until `shutdown` resolves.
    ///
    /// Changes present before the first scan are not published.
    pub async fn run<F>(&self, bus: &SaveBus, shutdown: F)
    where
        F: Future<Output = ()>,
    {
        let mut snapshot = scan(&self.root, &self.ignore);
        info!(
            "Watching {} ({} files, every {}ms)",
            self.root.display(),
            snapshot.len(),
            self.interval.as_millis()
        );

        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                _ = &mut shutdown => {
                    info!("Watcher stopped");
                    return;
                }
                _ = ticker.tick() => {
                    let next = scan(&self.root, &self.ignore);
                    for path in changed_since(&snapshot, &next) {
                        debug!("Saved: {}", path.display());
                        for result in bus.publish(&path).await {
                            if let Err(e) = result {
                                warn!("{}: {}", path.display(), e);
                            }
                        }
                    }
                    snapshot = next;
                }
            }
        }
    }
}
