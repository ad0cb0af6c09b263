//! Runtime configuration, environment-driven with usable defaults.

use crate::limit::RateLimitConfig;
use anyhow::{Context, Result};
use std::path::PathBuf;
use std::time::Duration;
use url::Url;

#[derive(Debug, Clone)]
pub struct Config {
    /// Chat-completion endpoint the session POSTs to.
    pub endpoint: Url,
    /// Where the conversation record lives between sessions.
    pub history_path: PathBuf,
    pub locale: String,
    pub rate: RateLimitConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            endpoint: Url::parse("http://127.0.0.1:8787/api/chat")
                .expect("default endpoint is a valid URL"),
            history_path: PathBuf::from("chat_history.json"),
            locale: crate::locale::DEFAULT_LOCALE.to_string(),
            rate: RateLimitConfig::default(),
        }
    }
}

impl Config {
    /// Build from environment variables (a `.env` file is honored), falling
    /// back to defaults field by field.
    ///
    /// Recognized variables: `CHAT_ENDPOINT`, `CHAT_HISTORY_PATH`,
    /// `CHAT_LOCALE`, `CHAT_RATE_LIMIT`, `CHAT_RATE_WINDOW_MS`.
    pub fn from_env() -> Result<Self> {
        dotenv::dotenv().ok();

        let mut config = Self::default();
        if let Ok(raw) = std::env::var("CHAT_ENDPOINT") {
            config.endpoint = Url::parse(&raw).context("CHAT_ENDPOINT is not a valid URL")?;
        }
        if let Ok(raw) = std::env::var("CHAT_HISTORY_PATH") {
            config.history_path = PathBuf::from(raw);
        }
        if let Ok(raw) = std::env::var("CHAT_LOCALE") {
            config.locale = raw;
        }
        if let Ok(raw) = std::env::var("CHAT_RATE_LIMIT") {
            config.rate.max_sends = raw.parse().context("CHAT_RATE_LIMIT is not a number")?;
        }
        if let Ok(raw) = std::env::var("CHAT_RATE_WINDOW_MS") {
            let ms: u64 = raw.parse().context("CHAT_RATE_WINDOW_MS is not a number")?;
            config.rate.window = Duration::from_millis(ms);
        }
        Ok(config)
    }
}
