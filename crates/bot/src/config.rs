use std::{fmt, path::PathBuf, time::Duration};

use chrono_tz::Tz;
use serde::Deserialize;
use thiserror::Error;
use url::Url;

pub const DEFAULT_TZ: &str = "Asia/Jakarta";
pub const DEFAULT_DATA_DIR: &str = "data";
pub const DEFAULT_STORE_TIMEOUT_SECS: u64 = 20;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required configuration: {}", .0.join(", "))]
    Missing(Vec<&'static str>),
    #[error("TZ '{0}' is not a known time zone")]
    InvalidTimeZone(String),
    #[error("GS_WEBAPP_URL '{value}' is not a valid URL")]
    InvalidUrl {
        value: String,
        #[source]
        source: url::ParseError,
    },
    #[error("STORE_TIMEOUT_SECS '{0}' must be a positive number of seconds")]
    InvalidTimeout(String),
    #[error(transparent)]
    Source(#[from] config::ConfigError),
}

/// Values as found in `bot.toml` and the environment, before validation.
/// Environment keys are matched case-insensitively (`BOT_TOKEN` → `bot_token`).
#[derive(Debug, Default, Deserialize)]
pub struct RawSettings {
    pub bot_token: Option<String>,
    pub gs_webapp_url: Option<String>,
    pub tz: Option<String>,
    pub data_dir: Option<String>,
    pub store_timeout_secs: Option<String>,
}

impl RawSettings {
    pub fn gather() -> Result<Self, ConfigError> {
        let raw = config::Config::builder()
            .add_source(config::File::with_name("bot").required(false))
            .add_source(config::Environment::default())
            .build()?
            .try_deserialize()?;
        Ok(raw)
    }
}

pub struct Settings {
    pub bot_token: String,
    pub store_url: Url,
    pub tz: Tz,
    pub data_dir: PathBuf,
    pub store_timeout: Duration,
}

impl fmt::Debug for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Settings")
            .field("bot_token", &"<redacted>")
            .field("store_url", &self.store_url.as_str())
            .field("tz", &self.tz)
            .field("data_dir", &self.data_dir)
            .field("store_timeout", &self.store_timeout)
            .finish()
    }
}

impl Settings {
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_raw(RawSettings::gather()?)
    }

    pub fn from_raw(raw: RawSettings) -> Result<Self, ConfigError> {
        let bot_token = present(raw.bot_token);
        let store_url = present(raw.gs_webapp_url);
        let (bot_token, store_url) = match (bot_token, store_url) {
            (Some(token), Some(url)) => (token, url),
            (token, url) => {
                let mut missing = Vec::new();
                if token.is_none() {
                    missing.push("BOT_TOKEN");
                }
                if url.is_none() {
                    missing.push("GS_WEBAPP_URL");
                }
                return Err(ConfigError::Missing(missing));
            }
        };
        let store_url = Url::parse(&store_url).map_err(|source| ConfigError::InvalidUrl {
            value: store_url.clone(),
            source,
        })?;

        let tz_name = present(raw.tz).unwrap_or_else(|| DEFAULT_TZ.to_string());
        let tz = tz_name
            .parse::<Tz>()
            .map_err(|_| ConfigError::InvalidTimeZone(tz_name.clone()))?;

        let data_dir = present(raw.data_dir).unwrap_or_else(|| DEFAULT_DATA_DIR.to_string());

        let timeout_secs = match present(raw.store_timeout_secs) {
            None => DEFAULT_STORE_TIMEOUT_SECS,
            Some(value) => value
                .parse::<u64>()
                .ok()
                .filter(|secs| *secs > 0)
                .ok_or_else(|| ConfigError::InvalidTimeout(value.clone()))?,
        };

        Ok(Self {
            bot_token,
            store_url,
            tz,
            data_dir: PathBuf::from(data_dir),
            store_timeout: Duration::from_secs(timeout_secs),
        })
    }
}

fn present(value: Option<String>) -> Option<String> {
    value
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
