//! Startup configuration.
//!
//! Credentials come from the environment when all of them are set, otherwise
//! from a JSON file. Cadences can be overridden from the environment in both
//! cases. Any missing value is fatal.

use std::env;
use std::fmt;
use std::fs;
use std::path::Path;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Deserializer};
use tracing::info;

const CONFIG_PATH_VAR: &str = "TGTG_WATCH_CONFIG";
const DEFAULT_CONFIG_PATH: &str = "config.json";
const MAX_INTERVAL_SECS: u64 = 365 * 24 * 60 * 60;

#[derive(Clone, Deserialize)]
pub struct TgtgCredentials {
    pub access_token: String,
    // Not sent anywhere yet, the client only uses the access token.
    pub refresh_token: String,
    #[serde(deserialize_with = "string_or_number")]
    pub user_id: String,
}

#[derive(Clone, Deserialize)]
pub struct TelegramSettings {
    pub bot_token: String,
    #[serde(rename = "bot_chatID", deserialize_with = "string_or_number")]
    pub chat_id: String,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct ScheduleSettings {
    #[serde(default = "default_check_interval_secs")]
    pub check_interval_secs: u64,
    #[serde(default = "default_heartbeat_interval_secs")]
    pub heartbeat_interval_secs: u64,
}

const fn default_check_interval_secs() -> u64 {
    60
}

const fn default_heartbeat_interval_secs() -> u64 {
    24 * 60 * 60
}

impl Default for ScheduleSettings {
    fn default() -> Self {
        Self {
            check_interval_secs: default_check_interval_secs(),
            heartbeat_interval_secs: default_heartbeat_interval_secs(),
        }
    }
}

impl ScheduleSettings {
    pub fn check_interval(&self) -> Duration {
        Duration::from_secs(self.check_interval_secs)
    }

    pub fn heartbeat_interval(&self) -> Duration {
        Duration::from_secs(self.heartbeat_interval_secs)
    }

    fn apply_overrides(&mut self, lookup: &impl Fn(&str) -> Option<String>) -> Result<()> {
        if let Some(raw) = lookup("CHECK_INTERVAL_SECS") {
            self.check_interval_secs = raw
                .trim()
                .parse()
                .with_context(|| format!("CHECK_INTERVAL_SECS is not a number: {raw:?}"))?;
        }
        if let Some(raw) = lookup("HEARTBEAT_INTERVAL_SECS") {
            self.heartbeat_interval_secs = raw
                .trim()
                .parse()
                .with_context(|| format!("HEARTBEAT_INTERVAL_SECS is not a number: {raw:?}"))?;
        }
        Ok(())
    }
}

/// Application configuration
#[derive(Clone, Deserialize)]
pub struct Config {
    pub tgtg: TgtgCredentials,
    pub telegram: TelegramSettings,
    #[serde(default)]
    pub schedule: ScheduleSettings,
}

impl Config {
    /// Load configuration from the process environment
    pub fn load() -> Result<Self> {
        Self::load_with(|key| env::var(key).ok())
    }

    fn load_with(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = match Self::from_lookup(&lookup) {
            Some(config) => {
                info!("🔑 Credentials loaded from environment");
                config
            }
            None => {
                let path = lookup(CONFIG_PATH_VAR).unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string());
                info!("No credentials in environment, reading {}", path);
                let config = Self::from_file(Path::new(&path))?;
                info!("🔑 Credentials loaded from {}", path);
                config
            }
        };

        config.schedule.apply_overrides(&lookup)?;
        config.validate()?;
        Ok(config)
    }

    /// Build from environment-style lookups, `None` unless every secret is set
    fn from_lookup(lookup: &impl Fn(&str) -> Option<String>) -> Option<Self> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        Some(Self {
            tgtg: TgtgCredentials {
                access_token: get("TGTG_ACCESS_TOKEN")?,
                refresh_token: get("TGTG_REFRESH_TOKEN")?,
                user_id: get("TGTG_USER_ID")?,
            },
            telegram: TelegramSettings {
                bot_token: get("TELEGRAM_BOT_TOKEN")?,
                chat_id: get("TELEGRAM_BOT_CHATID")?,
            },
            schedule: ScheduleSettings::default(),
        })
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::from_json(&raw).with_context(|| format!("Invalid config file {}", path.display()))
    }

    pub fn from_json(raw: &str) -> Result<Self> {
        serde_json::from_str(raw).context("Failed to parse config JSON")
    }

    fn validate(&self) -> Result<()> {
        let required = [
            ("tgtg.access_token", &self.tgtg.access_token),
            ("tgtg.refresh_token", &self.tgtg.refresh_token),
            ("tgtg.user_id", &self.tgtg.user_id),
            ("telegram.bot_token", &self.telegram.bot_token),
            ("telegram.bot_chatID", &self.telegram.chat_id),
        ];
        for (name, value) in required {
            if value.trim().is_empty() {
                bail!("Missing required setting {}", name);
            }
        }

        let cadences = [
            ("Check interval", self.schedule.check_interval_secs),
            ("Heartbeat interval", self.schedule.heartbeat_interval_secs),
        ];
        for (name, secs) in cadences {
            if secs == 0 {
                bail!("{} must be at least one second", name);
            }
            if secs > MAX_INTERVAL_SECS {
                bail!("{} of {}s is longer than a year", name, secs);
            }
        }
        Ok(())
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("tgtg_user_id", &self.tgtg.user_id)
            .field("telegram_chat_id", &self.telegram.chat_id)
            .field("schedule", &self.schedule)
            .finish_non_exhaustive()
    }
}

fn string_or_number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Number(i64),
    }

    Ok(match Raw::deserialize(deserializer)? {
        Raw::Text(s) => s,
        Raw::Number(n) => n.to_string(),
    })
}
