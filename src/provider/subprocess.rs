//! Provider backed by external programs.

use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};
use std::process::Stdio;

use async_trait::async_trait;
use serde::Deserialize;
use tokio::process::Command;
use tracing::debug;

use crate::config::CommandSpec;
use crate::error::ProviderError;

use super::CommandProvider;

/// Runs LLM command ids as subprocesses.
///
/// A command is available when its program resolves on `PATH`. Programs run
/// in `working_dir` so they can inspect the repository themselves.
pub struct ExternalCommandProvider {
    commands: BTreeMap<String, CommandSpec>,
    working_dir: PathBuf,
}

impl ExternalCommandProvider {
    pub fn new(commands: BTreeMap<String, CommandSpec>, working_dir: impl Into<PathBuf>) -> Self {
        Self {
            commands,
            working_dir: working_dir.into(),
        }
    }

    pub fn working_dir(&self) -> &Path {
        &self.working_dir
    }
}

#[async_trait]
impl CommandProvider for ExternalCommandProvider {
    async fn list_available_commands(&self) -> Result<HashSet<String>, ProviderError> {
        let available = self
            .commands
            .iter()
            .filter(|(id, spec)| {
                let found = which::which(&spec.program).is_ok();
                if !found {
                    debug!("{} unavailable: '{}' not on PATH", id, spec.program);
                }
                found
            })
            .map(|(id, _)| id.clone())
            .collect();

        Ok(available)
    }

    async fn invoke(&self, command_id: &str) -> Result<Option<String>, ProviderError> {
        let spec = self
            .commands
            .get(command_id)
            .ok_or_else(|| ProviderError::UnknownCommand(command_id.to_string()))?;

        debug!("Running {} via '{}'", command_id, spec.program);

        let output = Command::new(&spec.program)
            .args(&spec.args)
            .current_dir(&self.working_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|source| ProviderError::SpawnFailed {
                command_id: command_id.to_string(),
                program: spec.program.clone(),
                source,
            })?;

        if !output.status.success() {
            return Err(ProviderError::NonZeroExit {
                command_id: command_id.to_string(),
                code: output.status.code().unwrap_or(-1),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        parse_output(command_id, &String::from_utf8_lossy(&output.stdout))
    }
}

/// Claude CLI JSON envelope (`--output-format json`).
#[derive(Deserialize)]
struct CliEnvelope {
    result: String,
    #[serde(default)]
    is_error: bool,
}

/// Turn raw stdout into an optional message.
///
/// JSON envelopes are unwrapped; anything else is taken as plain text.
/// Whitespace-only output means no message.
fn parse_output(command_id: &str, stdout: &str) -> Result<Option<String>, ProviderError> {
    let text = match serde_json::from_str::<CliEnvelope>(stdout.trim()) {
        Ok(envelope) if envelope.is_error => {
            return Err(ProviderError::ExecutionFailed {
                command_id: command_id.to_string(),
                message: envelope.result,
            });
        }
        Ok(envelope) => envelope.result,
        Err(_) => stdout.to_string(),
    };

    let text = text.trim();
    if text.is_empty() {
        Ok(None)
    } else {
        Ok(Some(text.to_string()))
    }
}
