//! Settings and credentials for the homework status poller.
//!
//! Tunables live in an optional JSON settings file where every field has a
//! default. Credentials never live in that file: they come from the process
//! environment and are re-checked at the top of every poll cycle.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{PollerError, Result};

/// The default settings file name.
pub const SETTINGS_FILE_NAME: &str = "hwbot.json";

/// Environment variable holding the homework API token.
pub const PRACTICUM_TOKEN_VAR: &str = "PRACTICUM_TOKEN";

/// Environment variable holding the chat bot token.
pub const TELEGRAM_TOKEN_VAR: &str = "TELEGRAM_TOKEN";

/// Environment variable holding the chat identifier.
pub const TELEGRAM_CHAT_ID_VAR: &str = "TELEGRAM_CHAT_ID";

fn default_endpoint() -> String {
    "https://practicum.yandex.ru/api/user_api/homework_statuses/".to_string()
}

fn default_telegram_api_url() -> String {
    "https://api.telegram.org".to_string()
}

/// Ten minutes between cycles.
const fn default_retry_period_secs() -> u64 {
    600
}

/// One day of history.
const fn default_lookback_secs() -> i64 {
    86_400
}

const fn default_request_timeout_secs() -> u64 {
    30
}

fn default_log_file() -> String {
    ".log".to_string()
}

const fn default_log_max_bytes() -> u64 {
    10_000
}

/// Tunable settings for the poller.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    /// Homework statuses endpoint.
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// Base URL of the Telegram Bot API.
    #[serde(default = "default_telegram_api_url")]
    pub telegram_api_url: String,

    /// Seconds to sleep between poll cycles.
    #[serde(default = "default_retry_period_secs")]
    pub retry_period_secs: u64,

    /// How far back the time window reaches, in seconds before startup.
    #[serde(default = "default_lookback_secs")]
    pub lookback_secs: i64,

    /// Per-request HTTP timeout in seconds.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Path of the rotating log file.
    #[serde(default = "default_log_file")]
    pub log_file: String,

    /// Size cap of the log file before it is rotated.
    #[serde(default = "default_log_max_bytes")]
    pub log_max_bytes: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            telegram_api_url: default_telegram_api_url(),
            retry_period_secs: default_retry_period_secs(),
            lookback_secs: default_lookback_secs(),
            request_timeout_secs: default_request_timeout_secs(),
            log_file: default_log_file(),
            log_max_bytes: default_log_max_bytes(),
        }
    }
}

impl Settings {
    /// Loads settings from a specific file path.
    ///
    /// If the file does not exist, returns the defaults.
    ///
    /// # Errors
    ///
    /// Returns `PollerError::ConfigParse` if the file exists but cannot be
    /// read or is not valid JSON, and `PollerError::ConfigValidation` if the
    /// parsed values are out of range.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let contents = match std::fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                let settings = Self::default();
                settings.validate()?;
                return Ok(settings);
            }
            Err(e) => {
                return Err(PollerError::config_parse(
                    path,
                    format!("failed to read file: {e}"),
                ));
            }
        };

        let settings: Self = serde_json::from_str(&contents)
            .map_err(|e| PollerError::config_parse(path, e.to_string()))?;
        settings.validate()?;
        Ok(settings)
    }

    /// Loads `hwbot.json` from the given directory, or the defaults.
    pub fn load_from_dir(dir: &Path) -> Result<Self> {
        Self::load_from_file(&dir.join(SETTINGS_FILE_NAME))
    }

    /// Validates the settings values.
    ///
    /// # Errors
    ///
    /// Returns `PollerError::ConfigValidation` if any check fails.
    pub fn validate(&self) -> Result<()> {
        if self.endpoint.trim().is_empty() {
            return Err(PollerError::config_validation(
                "endpoint must not be empty",
                "Provide the homework statuses URL in your hwbot.json",
            ));
        }

        if self.telegram_api_url.trim().is_empty() {
            return Err(PollerError::config_validation(
                "telegramApiUrl must not be empty",
                "Remove telegramApiUrl from your hwbot.json to use the default",
            ));
        }

        if self.retry_period_secs == 0 {
            return Err(PollerError::config_validation(
                "retryPeriodSecs must be greater than 0",
                "Set retryPeriodSecs to at least 1 second in your hwbot.json",
            ));
        }

        if self.lookback_secs <= 0 {
            return Err(PollerError::config_validation(
                "lookbackSecs must be greater than 0",
                "Set lookbackSecs to at least 1 second in your hwbot.json",
            ));
        }

        if self.request_timeout_secs == 0 {
            return Err(PollerError::config_validation(
                "requestTimeoutSecs must be greater than 0",
                "Set requestTimeoutSecs to at least 1 second in your hwbot.json",
            ));
        }

        if self.log_file.trim().is_empty() {
            return Err(PollerError::config_validation(
                "logFile must not be empty",
                "Provide a log file path in your hwbot.json",
            ));
        }

        if self.log_max_bytes == 0 {
            return Err(PollerError::config_validation(
                "logMaxBytes must be greater than 0",
                "Set logMaxBytes to at least 1 in your hwbot.json",
            ));
        }

        Ok(())
    }

    /// Interval between poll cycles.
    #[must_use]
    pub const fn retry_period(&self) -> Duration {
        Duration::from_secs(self.retry_period_secs)
    }

    /// Per-request HTTP timeout.
    #[must_use]
    pub const fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Lower bound of the time window, as Unix seconds, relative to `now`.
    #[must_use]
    pub const fn window_start(&self, now: i64) -> i64 {
        now.saturating_sub(self.lookback_secs)
    }
}

/// The three secrets the poller needs.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    /// Homework API token.
    pub practicum_token: String,
    /// Chat bot token.
    pub telegram_token: String,
    /// Chat identifier messages are sent to.
    pub telegram_chat_id: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("practicum_token", &"<redacted>")
            .field("telegram_token", &"<redacted>")
            .field("telegram_chat_id", &self.telegram_chat_id)
            .finish()
    }
}

impl Credentials {
    /// Builds credentials from a variable lookup.
    ///
    /// Absent and empty values are both treated as missing, and every missing
    /// name is reported at once.
    ///
    /// # Errors
    ///
    /// Returns `PollerError::MissingCredentials` naming each missing variable.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut missing = Vec::new();
        let mut read = |name: &'static str| match lookup(name) {
            Some(value) if !value.is_empty() => value,
            _ => {
                missing.push(name);
                String::new()
            }
        };

        let practicum_token = read(PRACTICUM_TOKEN_VAR);
        let telegram_token = read(TELEGRAM_TOKEN_VAR);
        let telegram_chat_id = read(TELEGRAM_CHAT_ID_VAR);

        if !missing.is_empty() {
            return Err(PollerError::missing_credentials(missing));
        }

        Ok(Self {
            practicum_token,
            telegram_token,
            telegram_chat_id,
        })
    }

    /// Reads credentials from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }
}

/// Source of credentials, consulted at the top of every poll cycle.
pub trait CredentialSource: Send + Sync {
    /// Returns the current credentials or the names of those missing.
    fn credentials(&self) -> Result<Credentials>;
}

/// Reads credentials from the process environment on every call.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnvCredentials;

impl CredentialSource for EnvCredentials {
    fn credentials(&self) -> Result<Credentials> {
        Credentials::from_env()
    }
}

impl CredentialSource for Credentials {
    fn credentials(&self) -> Result<Credentials> {
        Ok(self.clone())
    }
}
