//! Git operations: locating the repository for a saved file and running the
//! stage+commit sequence.

pub mod executor;
pub mod workspace;

pub use executor::{CommitExecutor, GitOutput, GitRunner, ShellRunner, escape_double_quoted};
pub use workspace::{ChangedFile, Workspace};
