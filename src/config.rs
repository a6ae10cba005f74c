//! Configuration and settings management
//!
//! Loads settings from configuration files and environment variables and
//! defines the Telegram delivery constants.

use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Hard upper bound Telegram puts on a single text message.
pub const TELEGRAM_MESSAGE_HARD_LIMIT: usize = 4096;

/// Maximum attempts for a single Telegram API call.
pub const TELEGRAM_API_MAX_RETRIES: usize = 3;
/// Initial backoff between Telegram API retries.
pub const TELEGRAM_API_INITIAL_BACKOFF_MS: u64 = 500;
/// Upper bound on the backoff between Telegram API retries.
pub const TELEGRAM_API_MAX_BACKOFF_MS: u64 = 4000;

/// Application settings loaded from config files and environment variables
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Settings {
    /// Telegram Bot API token
    #[serde(default)]
    pub telegram_token: String,

    /// Fallback key for the token, read from `BOT_TOKEN`
    #[serde(default, skip_serializing)]
    pub bot_token: Option<String>,

    /// Path to the catalog source (JSON or YAML)
    #[serde(default = "default_catalog_path")]
    pub catalog_path: String,

    /// Maximum characters per outgoing message chunk
    #[serde(default = "default_max_message_len")]
    pub max_message_len: usize,

    /// Pause between consecutive chunk sends, in milliseconds
    #[serde(default = "default_chunk_delay_ms")]
    pub chunk_delay_ms: u64,

    /// Port of the liveness HTTP endpoint
    #[serde(default = "default_port")]
    pub port: u16,

    /// Idle time after which a conversation's navigation state is dropped
    #[serde(default = "default_session_idle_secs")]
    pub session_idle_secs: u64,

    /// Maximum number of conversations kept in the state store
    #[serde(default = "default_session_max_entries")]
    pub session_max_entries: u64,
}

fn default_catalog_path() -> String {
    "content/sections.json".to_string()
}

const fn default_max_message_len() -> usize {
    3500
}

const fn default_chunk_delay_ms() -> u64 {
    300
}

const fn default_port() -> u16 {
    8000
}

const fn default_session_idle_secs() -> u64 {
    24 * 60 * 60
}

const fn default_session_max_entries() -> u64 {
    100_000
}

/// Build the layered configuration source.
///
/// Order (later wins): `config/default`, `config/{RUN_MODE}`, `config/local`,
/// `APP__*` environment variables, plain environment variables.
///
/// # Errors
///
/// Returns a `ConfigError` if any present source cannot be read.
pub fn build_config() -> Result<Config, ConfigError> {
    let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

    Config::builder()
        .add_source(File::with_name("config/default").required(false))
        .add_source(File::with_name(&format!("config/{run_mode}")).required(false))
        // Not checked into git
        .add_source(File::with_name("config/local").required(false))
        .add_source(Environment::with_prefix("APP").separator("__"))
        // Environment::default() maps UPPER_SNAKE_CASE onto snake_case keys
        .add_source(Environment::default().ignore_empty(true))
        .build()
}

impl Settings {
    /// Create new settings by loading from files and the environment
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use guide_bot::config::Settings;
    ///
    /// let settings = Settings::new().expect("Failed to load configuration");
    /// ```
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if loading fails or no token is configured.
    pub fn new() -> Result<Self, ConfigError> {
        Self::from_config(build_config()?)
    }

    /// Deserialize settings and resolve the bot token.
    ///
    /// `telegram_token` wins over `bot_token` when both are set.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::NotFound` if neither key holds a token.
    pub fn from_config(config: Config) -> Result<Self, ConfigError> {
        let mut settings: Self = config.try_deserialize()?;
        if settings.telegram_token.trim().is_empty() {
            settings.telegram_token = settings
                .bot_token
                .take()
                .filter(|token| !token.trim().is_empty())
                .ok_or_else(|| ConfigError::NotFound("telegram_token".into()))?;
        }
        Ok(settings)
    }

    /// Chunk length limit clamped to what Telegram accepts.
    #[must_use]
    pub fn message_limit(&self) -> usize {
        self.max_message_len.clamp(1, TELEGRAM_MESSAGE_HARD_LIMIT)
    }

    /// Pause between consecutive chunk sends.
    #[must_use]
    pub const fn chunk_delay(&self) -> Duration {
        Duration::from_millis(self.chunk_delay_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn from_overrides(pairs: &[(&str, &str)]) -> Result<Settings, ConfigError> {
        let mut builder = Config::builder();
        for (key, value) in pairs {
            builder = builder.set_override(*key, *value)?;
        }
        Settings::from_config(builder.build()?)
    }

    #[test]
    fn test_defaults_applied() -> Result<(), ConfigError> {
        let settings = from_overrides(&[("telegram_token", "dummy")])?;

        assert_eq!(settings.catalog_path, "content/sections.json");
        assert_eq!(settings.max_message_len, 3500);
        assert_eq!(settings.chunk_delay(), Duration::from_millis(300));
        assert_eq!(settings.port, 8000);
        assert_eq!(settings.session_idle_secs, 86_400);
        Ok(())
    }

    #[test]
    fn test_overrides_parsed_from_strings() -> Result<(), ConfigError> {
        let settings = from_overrides(&[
            ("telegram_token", "dummy"),
            ("max_message_len", "1200"),
            ("chunk_delay_ms", "0"),
            ("port", "9090"),
        ])?;

        assert_eq!(settings.message_limit(), 1200);
        assert_eq!(settings.chunk_delay(), Duration::ZERO);
        assert_eq!(settings.port, 9090);
        Ok(())
    }

    #[test]
    fn test_bot_token_alias() -> Result<(), ConfigError> {
        let settings = from_overrides(&[("bot_token", "123:abc")])?;
        assert_eq!(settings.telegram_token, "123:abc");
        Ok(())
    }

    #[test]
    fn test_both_token_keys_prefer_telegram_token() -> Result<(), ConfigError> {
        let same = from_overrides(&[("telegram_token", "123:abc"), ("bot_token", "123:abc")])?;
        assert_eq!(same.telegram_token, "123:abc");

        let differ = from_overrides(&[("telegram_token", "123:abc"), ("bot_token", "456:def")])?;
        assert_eq!(differ.telegram_token, "123:abc");
        Ok(())
    }

    #[test]
    fn test_empty_telegram_token_falls_back() -> Result<(), ConfigError> {
        let settings = from_overrides(&[("telegram_token", ""), ("bot_token", "123:abc")])?;
        assert_eq!(settings.telegram_token, "123:abc");
        Ok(())
    }

    #[test]
    fn test_missing_token_is_error() {
        assert!(matches!(
            from_overrides(&[("port", "9090")]),
            Err(ConfigError::NotFound(key)) if key == "telegram_token"
        ));
        assert!(from_overrides(&[("bot_token", "  ")]).is_err());
    }

    #[test]
    fn test_message_limit_clamped() -> Result<(), ConfigError> {
        let huge = from_overrides(&[("telegram_token", "t"), ("max_message_len", "100000")])?;
        assert_eq!(huge.message_limit(), TELEGRAM_MESSAGE_HARD_LIMIT);

        let zero = from_overrides(&[("telegram_token", "t"), ("max_message_len", "0")])?;
        assert_eq!(zero.message_limit(), 1);
        Ok(())
    }
}
