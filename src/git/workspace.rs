//! Repository discovery for saved files.

use std::path::{Component, Path, PathBuf};

use git2::{ErrorCode, Repository};

use crate::error::HostError;

/// A file that was just saved, located inside its repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangedFile {
    absolute_path: PathBuf,
    relative_path: String,
}

impl ChangedFile {
    pub fn new(absolute_path: impl Into<PathBuf>, relative_path: impl Into<String>) -> Self {
        Self {
            absolute_path: absolute_path.into(),
            relative_path: relative_path.into(),
        }
    }

    pub fn absolute_path(&self) -> &Path {
        &self.absolute_path
    }

    /// Path relative to the work tree root, `/`-separated.
    pub fn relative_path(&self) -> &str {
        &self.relative_path
    }
}

/// A non-bare repository: its work tree root and git directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Workspace {
    root: PathBuf,
    git_dir: PathBuf,
}

impl Workspace {
    /// Find the repository containing `path` (a file or directory).
    ///
    /// Relative paths resolve against the current directory, so a bare file
    /// name works.
    pub fn discover(path: &Path) -> Result<Self, HostError> {
        let absolute = canonicalize(path)?;
        let start = if absolute.is_file() {
            absolute.parent().unwrap_or(absolute.as_path())
        } else {
            absolute.as_path()
        };

        let repo = Repository::discover(start).map_err(|e| match e.code() {
            ErrorCode::NotFound => HostError::NotInRepository(path.to_path_buf()),
            _ => HostError::OpenRepository(e),
        })?;

        let workdir = repo
            .workdir()
            .ok_or_else(|| HostError::NotInRepository(path.to_path_buf()))?;

        Ok(Self {
            root: canonicalize(workdir)?,
            git_dir: canonicalize(repo.path())?,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn git_dir(&self) -> &Path {
        &self.git_dir
    }

    /// Describe a saved file relative to this work tree.
    pub fn changed_file(&self, path: &Path) -> Result<ChangedFile, HostError> {
        let absolute = canonicalize(path)?;

        let relative = absolute
            .strip_prefix(&self.root)
            .map_err(|_| HostError::NotInRepository(absolute.clone()))?;

        let relative_path = relative
            .components()
            .filter_map(|c| match c {
                Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
                _ => None,
            })
            .collect::<Vec<_>>()
            .join("/");

        if relative_path.is_empty() {
            return Err(HostError::NotInRepository(absolute));
        }

        Ok(ChangedFile {
            absolute_path: absolute,
            relative_path,
        })
    }
}

fn canonicalize(path: &Path) -> Result<PathBuf, HostError> {
    path.canonicalize().map_err(|source| HostError::InvalidPath {
        path: path.to_path_buf(),
        source,
    })
}
