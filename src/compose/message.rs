//! LLM-or-fallback commit message composition.
//!
//! The LLM path is best-effort: any failure, or an empty answer, drops to a
//! deterministic message built from the configured prefix, an optional
//! timestamp and the file path.

use std::fmt;

use chrono::{DateTime, SecondsFormat, Utc};
use tracing::{debug, info, warn};

use crate::config::ComposerConfig;
use crate::git::ChangedFile;
use crate::provider::{CommandProvider, select_command};

/// Where a commit message came from.
///
/// A missing provider and a failing provider both yield `Fallback`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageSource {
    Llm { command_id: String },
    Fallback,
}

/// A composed commit message. Never empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitMessage {
    text: String,
    source: MessageSource,
}

impl CommitMessage {
    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn source(&self) -> &MessageSource {
        &self.source
    }

    pub fn is_llm(&self) -> bool {
        matches!(self.source, MessageSource::Llm { .. })
    }

    pub fn into_string(self) -> String {
        self.text
    }
}

impl fmt::Display for CommitMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// Composes commit messages using a [`CommandProvider`] for the LLM path.
pub struct MessageComposer<P> {
    provider: P,
}

impl<P: CommandProvider> MessageComposer<P> {
    pub fn new(provider: P) -> Self {
        Self { provider }
    }

    /// Compose a message for `file` with the current time.
    pub async fn compose(&self, file: &ChangedFile, config: &ComposerConfig) -> CommitMessage {
        self.compose_at(file, config, Utc::now()).await
    }

    /// Compose a message for `file`, stamping fallbacks with `now`.
    ///
    /// Never fails. With `use_llm` off the provider is not consulted.
    pub async fn compose_at(
        &self,
        file: &ChangedFile,
        config: &ComposerConfig,
        now: DateTime<Utc>,
    ) -> CommitMessage {
        if config.use_llm
            && let Some(message) = self.try_llm().await
        {
            return message;
        }

        fallback_message(file, config, now)
    }

    async fn try_llm(&self) -> Option<CommitMessage> {
        let available = match self.provider.list_available_commands().await {
            Ok(available) => available,
            Err(e) => {
                warn!("Could not list LLM commands, using fallback: {}", e);
                return None;
            }
        };

        let Some(command_id) = select_command(&available) else {
            info!("No LLM commit message command available, using fallback");
            return None;
        };

        match self.provider.invoke(command_id).await {
            Ok(Some(text)) if !text.trim().is_empty() => Some(CommitMessage {
                text,
                source: MessageSource::Llm {
                    command_id: command_id.to_string(),
                },
            }),
            Ok(_) => {
                debug!("{} returned no message, using fallback", command_id);
                None
            }
            Err(e) => {
                warn!("{} failed, using fallback: {}", command_id, e);
                None
            }
        }
    }
}

/// Build the deterministic message:
/// `<prefix>: [<timestamp> ]updated <relative path>`.
pub fn fallback_message(
    file: &ChangedFile,
    config: &ComposerConfig,
    now: DateTime<Utc>,
) -> CommitMessage {
    let timestamp = if config.include_timestamp {
        format!("{} ", format_timestamp(now))
    } else {
        String::new()
    };

    CommitMessage {
        text: format!(
            "{}: {}updated {}",
            config.message_prefix,
            timestamp,
            file.relative_path()
        ),
        source: MessageSource::Fallback,
    }
}

/// ISO-8601 UTC with milliseconds, e.g. `2026-10-19T08:30:00.000Z`.
pub fn format_timestamp(now: DateTime<Utc>) -> String {
    now.to_rfc3339_opts(SecondsFormat::Millis, true)
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use chrono::TimeZone;

    use super::*;
    use crate::error::ProviderError;
    use crate::provider::{MockCommandProvider, PRIMARY_COMMAND, SECONDARY_COMMAND};

    fn file() -> ChangedFile {
        ChangedFile::new("/work/repo/a.ts", "a.ts")
    }

    fn config(use_llm: bool, include_timestamp: bool) -> ComposerConfig {
        ComposerConfig {
            use_llm,
            message_prefix: "chore(vibe)".to_string(),
            include_timestamp,
        }
    }

    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 19, 8, 30, 5).unwrap()
    }

    fn ids(list: &[&str]) -> HashSet<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    fn composer(mock: MockCommandProvider) -> MessageComposer<MockCommandProvider> {
        MessageComposer::new(mock)
    }

    #[test]
    fn test_fallback_without_timestamp() {
        let message = fallback_message(&file(), &config(false, false), fixed_now());
        assert_eq!(message.as_str(), "chore(vibe): updated a.ts");
        assert_eq!(message.source(), &MessageSource::Fallback);
    }

    #[test]
    fn test_fallback_with_timestamp() {
        let message = fallback_message(&file(), &config(false, true), fixed_now());
        assert_eq!(
            message.as_str(),
            "chore(vibe): 2026-10-19T08:30:05.000Z updated a.ts"
        );
    }

    #[test]
    fn test_fallback_timestamp_round_trips_as_iso8601() {
        let message = fallback_message(&file(), &config(false, true), fixed_now());
        let token = message
            .as_str()
            .strip_prefix("chore(vibe): ")
            .and_then(|rest| rest.strip_suffix(" updated a.ts"))
            .unwrap();
        let parsed = DateTime::parse_from_rfc3339(token).unwrap();
        assert_eq!(parsed.with_timezone(&Utc), fixed_now());
    }

    #[test]
    fn test_fallback_keeps_quotes_unescaped() {
        let file = ChangedFile::new("/r/say \"hi\".md", "say \"hi\".md");
        let message = fallback_message(&file, &config(false, false), fixed_now());
        assert_eq!(message.as_str(), "chore(vibe): updated say \"hi\".md");
    }

    #[tokio::test]
    async fn test_llm_disabled_never_consults_provider() {
        let mut mock = MockCommandProvider::new();
        mock.expect_list_available_commands().never();
        mock.expect_invoke().never();

        let message = composer(mock)
            .compose_at(&file(), &config(false, false), fixed_now())
            .await;

        assert_eq!(message.as_str(), "chore(vibe): updated a.ts");
    }

    #[tokio::test]
    async fn test_llm_primary_message_used_verbatim() {
        let mut mock = MockCommandProvider::new();
        mock.expect_list_available_commands()
            .times(1)
            .returning(|| Ok(ids(&[PRIMARY_COMMAND])));
        mock.expect_invoke().times(1).returning(|id| {
            assert_eq!(id, PRIMARY_COMMAND);
            Ok(Some("fix bug".to_string()))
        });

        let message = composer(mock)
            .compose_at(&file(), &config(true, true), fixed_now())
            .await;

        assert_eq!(message.as_str(), "fix bug");
        assert_eq!(
            message.source(),
            &MessageSource::Llm {
                command_id: PRIMARY_COMMAND.to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_llm_primary_wins_over_secondary() {
        let mut mock = MockCommandProvider::new();
        mock.expect_list_available_commands()
            .returning(|| Ok(ids(&[SECONDARY_COMMAND, PRIMARY_COMMAND])));
        mock.expect_invoke().times(1).returning(|id| {
            assert_eq!(id, PRIMARY_COMMAND);
            Ok(Some("primary".to_string()))
        });

        let message = composer(mock)
            .compose_at(&file(), &config(true, false), fixed_now())
            .await;

        assert_eq!(message.as_str(), "primary");
    }

    #[tokio::test]
    async fn test_llm_secondary_used_when_primary_missing() {
        let mut mock = MockCommandProvider::new();
        mock.expect_list_available_commands()
            .returning(|| Ok(ids(&[SECONDARY_COMMAND])));
        mock.expect_invoke().times(1).returning(|id| {
            assert_eq!(id, SECONDARY_COMMAND);
            Ok(Some("secondary".to_string()))
        });

        let message = composer(mock)
            .compose_at(&file(), &config(true, false), fixed_now())
            .await;

        assert_eq!(message.as_str(), "secondary");
    }

    #[tokio::test]
    async fn test_llm_no_known_command_falls_back() {
        let mut mock = MockCommandProvider::new();
        mock.expect_list_available_commands()
            .returning(|| Ok(ids(&["some.other.command"])));
        mock.expect_invoke().never();

        let message = composer(mock)
            .compose_at(&file(), &config(true, false), fixed_now())
            .await;

        assert_eq!(message.as_str(), "chore(vibe): updated a.ts");
        assert!(!message.is_llm());
    }

    #[tokio::test]
    async fn test_llm_listing_failure_falls_back() {
        let mut mock = MockCommandProvider::new();
        mock.expect_list_available_commands()
            .returning(|| Err(ProviderError::ListFailed("host gone".to_string())));
        mock.expect_invoke().never();

        let message = composer(mock)
            .compose_at(&file(), &config(true, false), fixed_now())
            .await;

        assert_eq!(message.as_str(), "chore(vibe): updated a.ts");
    }

    #[tokio::test]
    async fn test_llm_invoke_error_falls_back() {
        let mut mock = MockCommandProvider::new();
        mock.expect_list_available_commands()
            .returning(|| Ok(ids(&[PRIMARY_COMMAND])));
        mock.expect_invoke().returning(|id| {
            Err(ProviderError::NonZeroExit {
                command_id: id.to_string(),
                code: 1,
                stderr: "boom".to_string(),
            })
        });

        let message = composer(mock)
            .compose_at(&file(), &config(true, true), fixed_now())
            .await;

        assert_eq!(
            message.as_str(),
            "chore(vibe): 2026-10-19T08:30:05.000Z updated a.ts"
        );
    }

    #[tokio::test]
    async fn test_llm_none_falls_back() {
        let mut mock = MockCommandProvider::new();
        mock.expect_list_available_commands()
            .returning(|| Ok(ids(&[PRIMARY_COMMAND])));
        mock.expect_invoke().returning(|_| Ok(None));

        let message = composer(mock)
            .compose_at(&file(), &config(true, false), fixed_now())
            .await;

        assert_eq!(message.as_str(), "chore(vibe): updated a.ts");
    }

    #[tokio::test]
    async fn test_llm_blank_message_falls_back() {
        let mut mock = MockCommandProvider::new();
        mock.expect_list_available_commands()
            .returning(|| Ok(ids(&[PRIMARY_COMMAND])));
        mock.expect_invoke().returning(|_| Ok(Some("  \n".to_string())));

        let message = composer(mock)
            .compose_at(&file(), &config(true, false), fixed_now())
            .await;

        assert_eq!(message.as_str(), "chore(vibe): updated a.ts");
        assert!(!message.as_str().is_empty());
    }
}
