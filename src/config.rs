//! Settings loading.
//!
//! Settings live in `.vibecommit.toml` at the repository root. Every key is
//! optional. Environment variables override the file:
//!
//! - `VIBECOMMIT_USE_LLM`
//! - `VIBECOMMIT_MESSAGE_PREFIX`
//! - `VIBECOMMIT_INCLUDE_TIMESTAMP`
//!
//! Settings are read fresh for every save, so edits apply to the next commit.

use std::collections::BTreeMap;
use std::env;
use std::path::Path;

use serde::Deserialize;
use tracing::{debug, warn};

use crate::error::ConfigError;
use crate::provider::{PRIMARY_COMMAND, SECONDARY_COMMAND};

/// Settings file name, relative to the repository root.
pub const SETTINGS_FILE: &str = ".vibecommit.toml";

pub const USE_LLM_ENV_VAR: &str = "VIBECOMMIT_USE_LLM";
pub const MESSAGE_PREFIX_ENV_VAR: &str = "VIBECOMMIT_MESSAGE_PREFIX";
pub const INCLUDE_TIMESTAMP_ENV_VAR: &str = "VIBECOMMIT_INCLUDE_TIMESTAMP";

pub const DEFAULT_MESSAGE_PREFIX: &str = "chore(vibe)";
const DEFAULT_WATCH_INTERVAL_MS: u64 = 1000;

/// Prompt handed to the default LLM commands.
pub const DEFAULT_LLM_PROMPT: &str = "Write a single-line conventional commit message \
    describing the uncommitted changes in this git repository. \
    Reply with the commit message only.";

/// Snapshot of the options the message composer reads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComposerConfig {
    pub use_llm: bool,
    pub message_prefix: String,
    pub include_timestamp: bool,
}

impl Default for ComposerConfig {
    fn default() -> Self {
        Self {
            use_llm: false,
            message_prefix: DEFAULT_MESSAGE_PREFIX.to_string(),
            include_timestamp: true,
        }
    }
}

/// External program backing an LLM command id.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CommandSpec {
    pub program: String,
    #[serde(default)]
    pub args: Vec<String>,
}

impl CommandSpec {
    pub fn new(program: impl Into<String>, args: &[&str]) -> Self {
        Self {
            program: program.into(),
            args: args.iter().map(|a| a.to_string()).collect(),
        }
    }
}

/// Polling watcher options.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct WatchSettings {
    pub interval_ms: u64,
    /// Directory names skipped while scanning. `.git` is always skipped.
    pub ignore: Vec<String>,
}

impl Default for WatchSettings {
    fn default() -> Self {
        Self {
            interval_ms: DEFAULT_WATCH_INTERVAL_MS,
            ignore: vec!["target".to_string(), "node_modules".to_string()],
        }
    }
}

/// Full settings file contents.
///
/// The composer keys also accept their camelCase names.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Settings {
    #[serde(alias = "useLLM")]
    pub use_llm: bool,
    #[serde(alias = "messagePrefix")]
    pub message_prefix: String,
    #[serde(alias = "includeTimestamp")]
    pub include_timestamp: bool,
    /// User command entries; merged over the built-in table.
    pub commands: BTreeMap<String, CommandSpec>,
    pub watch: WatchSettings,
}

impl Default for Settings {
    fn default() -> Self {
        let composer = ComposerConfig::default();
        Self {
            use_llm: composer.use_llm,
            message_prefix: composer.message_prefix,
            include_timestamp: composer.include_timestamp,
            commands: BTreeMap::new(),
            watch: WatchSettings::default(),
        }
    }
}

impl Settings {
    /// Load settings for the repository rooted at `repo_root`.
    ///
    /// A missing settings file yields defaults. Environment overrides are
    /// applied after the file.
    pub fn load(repo_root: &Path) -> Result<Self, ConfigError> {
        let path = repo_root.join(SETTINGS_FILE);

        let mut settings = if path.is_file() {
            let content =
                std::fs::read_to_string(&path).map_err(|source| ConfigError::ReadFailed {
                    path: path.clone(),
                    source,
                })?;
            Self::from_toml(&content).map_err(|source| ConfigError::ParseFailed {
                path: path.clone(),
                source,
            })?
        } else {
            debug!("No settings file at {}, using defaults", path.display());
            Self::default()
        };

        settings.apply_env_overrides();

        Ok(settings)
    }

    /// Parse settings from TOML text without env overrides.
    pub fn from_toml(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    fn apply_env_overrides(&mut self) {
        if let Some(value) = read_bool_env(USE_LLM_ENV_VAR) {
            self.use_llm = value;
        }
        if let Ok(prefix) = env::var(MESSAGE_PREFIX_ENV_VAR)
            && !prefix.is_empty()
        {
            self.message_prefix = prefix;
        }
        if let Some(value) = read_bool_env(INCLUDE_TIMESTAMP_ENV_VAR) {
            self.include_timestamp = value;
        }
    }

    /// The options the composer reads, as an immutable snapshot.
    pub fn composer(&self) -> ComposerConfig {
        ComposerConfig {
            use_llm: self.use_llm,
            message_prefix: self.message_prefix.clone(),
            include_timestamp: self.include_timestamp,
        }
    }

    /// Built-in command table with user entries layered on top.
    pub fn provider_commands(&self) -> BTreeMap<String, CommandSpec> {
        let mut table = default_commands();
        table.extend(self.commands.clone());
        table
    }
}

/// Built-in LLM commands: Claude Code for the primary id, Codex for the
/// secondary one.
pub fn default_commands() -> BTreeMap<String, CommandSpec> {
    BTreeMap::from([
        (
            PRIMARY_COMMAND.to_string(),
            CommandSpec::new("claude", &["-p", DEFAULT_LLM_PROMPT]),
        ),
        (
            SECONDARY_COMMAND.to_string(),
            CommandSpec::new("codex", &["exec", DEFAULT_LLM_PROMPT]),
        ),
    ])
}

/// Read a boolean environment variable.
///
/// Logs a warning and returns `None` if the variable is set to something
/// that is not a recognizable boolean.
fn read_bool_env(name: &str) -> Option<bool> {
    match env::var(name) {
        Ok(v) if !v.is_empty() => match parse_bool(&v) {
            Some(value) => Some(value),
            None => {
                warn!("Invalid {} value '{}', ignoring", name, v);
                None
            }
        },
        _ => None,
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
