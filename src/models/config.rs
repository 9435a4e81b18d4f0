//! Application configuration structures.

use std::fmt;
use std::fs;
use std::path::Path;

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

/// Root application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Careers page and extraction settings
    #[serde(default)]
    pub source: SourceConfig,

    /// Saved state settings
    #[serde(default)]
    pub storage: StorageConfig,

    /// Telegram delivery settings
    #[serde(default)]
    pub notifier: NotifierConfig,

    /// Log output settings
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Built-in daily schedule
    #[serde(default)]
    pub schedule: ScheduleConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Load configuration, using defaults when the file does not exist.
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self> {
        match Self::load(path) {
            Err(AppError::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            other => other,
        }
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        url::Url::parse(&self.source.url)
            .map_err(|e| AppError::validation(format!("source.url is invalid: {e}")))?;
        url::Url::parse(&self.source.origin)
            .map_err(|e| AppError::validation(format!("source.origin is invalid: {e}")))?;
        if self.source.table_id.trim().is_empty() {
            return Err(AppError::validation("source.table_id is empty"));
        }
        if self.source.user_agent.trim().is_empty() {
            return Err(AppError::validation("source.user_agent is empty"));
        }
        regex::Regex::new(&self.source.title_pattern)
            .map_err(|e| AppError::validation(format!("source.title_pattern is invalid: {e}")))?;
        if self.storage.state_file.trim().is_empty() {
            return Err(AppError::validation("storage.state_file is empty"));
        }
        url::Url::parse(&self.notifier.api_base)
            .map_err(|e| AppError::validation(format!("notifier.api_base is invalid: {e}")))?;
        self.schedule.time()?;
        Ok(())
    }
}

/// Careers page location and table layout.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Careers listing page
    #[serde(default = "defaults::url")]
    pub url: String,

    /// Site origin used for parent-relative links
    #[serde(default = "defaults::origin")]
    pub origin: String,

    /// Element id of the campus table
    #[serde(default = "defaults::table_id")]
    pub table_id: String,

    /// Titles must match this pattern to be kept
    #[serde(default = "defaults::title_pattern")]
    pub title_pattern: String,

    /// User-Agent header for HTTP requests
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            url: defaults::url(),
            origin: defaults::origin(),
            table_id: defaults::table_id(),
            title_pattern: defaults::title_pattern(),
            user_agent: defaults::user_agent(),
        }
    }
}

/// When the saved state is rewritten.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SavePolicy {
    /// Only when a new title appears
    #[default]
    OnNew,
    /// Whenever titles appear, disappear, or their fields drift
    OnChange,
}

/// Saved state settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// State file name, relative to the storage directory
    #[serde(default = "defaults::state_file")]
    pub state_file: String,

    #[serde(default)]
    pub save_policy: SavePolicy,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            state_file: defaults::state_file(),
            save_policy: SavePolicy::default(),
        }
    }
}

/// Telegram Bot API settings. Credentials live in [`TelegramCredentials`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotifierConfig {
    #[serde(default = "defaults::api_base")]
    pub api_base: String,

    #[serde(default = "defaults::parse_mode")]
    pub parse_mode: String,
}

impl Default for NotifierConfig {
    fn default() -> Self {
        Self {
            api_base: defaults::api_base(),
            parse_mode: defaults::parse_mode(),
        }
    }
}

/// Log output settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default filter when `RUST_LOG` is unset
    #[serde(default = "defaults::log_level")]
    pub level: String,

    /// Append-only log file, relative to the storage directory
    #[serde(default = "defaults::log_file")]
    pub file: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: defaults::log_level(),
            file: defaults::log_file(),
        }
    }
}

/// Built-in daily schedule.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleConfig {
    /// Local time of day, `HH:MM`
    #[serde(default = "defaults::schedule_at")]
    pub at: String,
}

impl ScheduleConfig {
    /// Parse the configured time of day.
    pub fn time(&self) -> Result<NaiveTime> {
        parse_time_of_day(&self.at)
    }
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            at: defaults::schedule_at(),
        }
    }
}

/// Parse an `HH:MM` time of day.
pub fn parse_time_of_day(s: &str) -> Result<NaiveTime> {
    NaiveTime::parse_from_str(s.trim(), "%H:%M")
        .map_err(|e| AppError::validation(format!("invalid time of day '{s}': {e}")))
}

/// Bot credentials, read once from the process environment.
#[derive(Clone, PartialEq, Eq)]
pub struct TelegramCredentials {
    pub bot_token: String,
    pub chat_id: String,
}

impl TelegramCredentials {
    pub const TOKEN_VAR: &'static str = "BOT_TOKEN";
    pub const CHAT_VAR: &'static str = "CHAT_ID";

    /// Read `BOT_TOKEN` and `CHAT_ID` from the environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read credentials through an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let read = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .ok_or_else(|| AppError::config(format!("{key} is not set")))
        };

        Ok(Self {
            bot_token: read(Self::TOKEN_VAR)?,
            chat_id: read(Self::CHAT_VAR)?,
        })
    }
}

impl fmt::Debug for TelegramCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TelegramCredentials")
            .field("bot_token", &"<redacted>")
            .field("chat_id", &self.chat_id)
            .finish()
    }
}

mod defaults {
    pub fn url() -> String {
        "https://www.mun.ca/hr/careers/external-job-postings/".into()
    }
    pub fn origin() -> String {
        "https://www.mun.ca".into()
    }
    pub fn table_id() -> String {
        "scope-STJ".into()
    }
    pub fn title_pattern() -> String {
        "Band Level [1-5]".into()
    }
    pub fn user_agent() -> String {
        "Mozilla/5.0 (compatible; jobwatch/0.1)".into()
    }
    pub fn state_file() -> String {
        "jobs.json".into()
    }
    pub fn api_base() -> String {
        "https://api.telegram.org".into()
    }
    pub fn parse_mode() -> String {
        "Markdown".into()
    }
    pub fn log_level() -> String {
        "info".into()
    }
    pub fn log_file() -> Option<String> {
        Some("scraper.log".into())
    }
    pub fn schedule_at() -> String {
        "09:00".into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validate_default_config_ok() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn validate_rejects_bad_pattern() {
        let mut config = Config::default();
        config.source.title_pattern = "Band Level [1-".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_empty_table_id() {
        let mut config = Config::default();
        config.source.table_id = " ".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_bad_schedule() {
        let mut config = Config::default();
        config.schedule.at = "25:99".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let config: Config = toml::from_str(
            r#"
            [storage]
            save_policy = "on_change"

            [schedule]
            at = "07:30"
            "#,
        )
        .unwrap();

        assert_eq!(config.storage.save_policy, SavePolicy::OnChange);
        assert_eq!(config.storage.state_file, "jobs.json");
        assert_eq!(config.source.table_id, "scope-STJ");
        assert_eq!(
            config.schedule.time().unwrap(),
            NaiveTime::from_hms_opt(7, 30, 0).unwrap()
        );
    }

    #[test]
    fn load_or_default_tolerates_missing_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let config = Config::load_or_default(dir.path().join("config.toml")).unwrap();
        assert_eq!(config.source.table_id, "scope-STJ");
    }

    #[test]
    fn load_or_default_rejects_broken_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[storage\nstate_file = 1").unwrap();
        assert!(matches!(Config::load_or_default(&path), Err(AppError::Toml(_))));

        std::fs::write(&path, "[storage]\nstate_file = \"state.json\"").unwrap();
        assert_eq!(Config::load_or_default(&path).unwrap().storage.state_file, "state.json");
    }

    #[test]
    fn credentials_require_both_vars() {
        let missing = TelegramCredentials::from_lookup(|k| {
            (k == TelegramCredentials::TOKEN_VAR).then(|| "123:abc".to_string())
        });
        assert!(matches!(missing, Err(AppError::Config(_))));

        let creds = TelegramCredentials::from_lookup(|k| match k {
            "BOT_TOKEN" => Some("123:abc".to_string()),
            "CHAT_ID" => Some(" 42 ".to_string()),
            _ => None,
        })
        .unwrap();
        assert_eq!(creds.chat_id, "42");
    }

    #[test]
    fn credentials_debug_hides_token() {
        let creds = TelegramCredentials {
            bot_token: "123:secret".to_string(),
            chat_id: "42".to_string(),
        };
        let shown = format!("{creds:?}");
        assert!(!shown.contains("secret"));
        assert!(shown.contains("42"));
    }
}
