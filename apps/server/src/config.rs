//! Application configuration.
//!
//! Precedence: CLI flags > environment > config file > defaults. Secrets
//! normally arrive through the environment (`.env` is honored).

use coinwatch_alerts::SmsConfig;
use coinwatch_core::WatchFilter;
use coinwatch_feeds::{FeedConfig, LoginCredentials};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config file: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("missing required setting: {0}")]
    Missing(&'static str),
}

/// Application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Ticker-site account and refresh period.
    pub source: SourceSettings,
    /// SMS account settings.
    pub sms: SmsConfig,
    /// Watch list and thresholds.
    pub watch: WatchSettings,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            source: SourceSettings::default(),
            sms: SmsConfig::default(),
            watch: WatchSettings::default(),
        }
    }
}

/// Ticker-site settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceSettings {
    /// Login user id.
    pub username: String,
    /// Login password.
    pub password: String,
    /// Seconds between session refresh attempts.
    pub refresh_secs: u64,
}

impl Default for SourceSettings {
    fn default() -> Self {
        Self {
            username: String::new(),
            password: String::new(),
            refresh_secs: 3600 * 12,
        }
    }
}

/// Watch list and notification thresholds.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WatchSettings {
    /// Coin identifiers to watch.
    pub coins: Vec<String>,
    /// Notify at or above this percent-change.
    pub high: f64,
    /// Notify at or below this percent-change.
    pub low: f64,
    /// Minimum percent-point swing that forces a notification; 0 disables.
    pub amplitude: f64,
    /// Minimum seconds between notifications for the same coin.
    pub renotify_secs: i64,
    /// Scrape interval in seconds.
    pub tick_secs: u64,
    /// Use the reduced threshold-only decision mode.
    pub threshold_only: bool,
}

impl Default for WatchSettings {
    fn default() -> Self {
        Self {
            coins: Vec::new(),
            high: 3.0,
            low: -2.0,
            amplitude: 1.0,
            renotify_secs: 3600,
            tick_secs: 2,
            threshold_only: false,
        }
    }
}

impl AppConfig {
    /// Load from a JSON file; a missing file yields the defaults.
    pub fn load(path: &str) -> Result<Self, ConfigError> {
        if !Path::new(path).exists() {
            return Ok(Self::default());
        }
        let raw = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    /// Apply environment overrides for account secrets.
    pub fn apply_env(&mut self) {
        if let Ok(user) = std::env::var("COINWATCH_USER") {
            self.source.username = user;
        }
        if let Ok(pass) = std::env::var("COINWATCH_PASS") {
            self.source.password = pass;
        }
        if let Ok(id) = std::env::var("COINWATCH_SMS_ACCESS_ID") {
            self.sms.access_id = id;
        }
        if let Ok(key) = std::env::var("COINWATCH_SMS_ACCESS_KEY") {
            self.sms.access_key = key;
        }
        if let Ok(phone) = std::env::var("COINWATCH_PHONE") {
            self.sms.phone = phone;
        }
    }

    /// Reject configurations the loops cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.source.username.is_empty() {
            return Err(ConfigError::Missing("source.username"));
        }
        if self.source.password.is_empty() {
            return Err(ConfigError::Missing("source.password"));
        }
        if self.watch.coins.is_empty() {
            return Err(ConfigError::Missing("watch.coins"));
        }
        if self.sms.access_id.is_empty() {
            return Err(ConfigError::Missing("sms.access_id"));
        }
        if self.sms.access_key.is_empty() {
            return Err(ConfigError::Missing("sms.access_key"));
        }
        if self.sms.phone.is_empty() {
            return Err(ConfigError::Missing("sms.phone"));
        }
        Ok(())
    }

    pub fn watch_filter(&self) -> WatchFilter {
        WatchFilter {
            coins: self.watch.coins.clone(),
            high: self.watch.high,
            low: self.watch.low,
            amplitude: (self.watch.amplitude > 0.0).then_some(self.watch.amplitude),
            renotify_secs: self.watch.renotify_secs,
        }
    }

    pub fn feed_config(&self) -> FeedConfig {
        FeedConfig::default()
    }

    pub fn credentials(&self) -> LoginCredentials {
        LoginCredentials::new(&self.source.username, &self.source.password)
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_secs(self.watch.tick_secs.max(1))
    }

    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.source.refresh_secs.max(60))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn complete() -> AppConfig {
        let mut config = AppConfig::default();
        config.source.username = "user".to_string();
        config.source.password = "pass".to_string();
        config.watch.coins = vec!["BTC".to_string()];
        config.sms.access_id = "id".to_string();
        config.sms.access_key = "key".to_string();
        config.sms.phone = "13800000000".to_string();
        config
    }

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.watch.high, 3.0);
        assert_eq!(config.watch.low, -2.0);
        assert_eq!(config.watch.amplitude, 1.0);
        assert_eq!(config.watch.renotify_secs, 3600);
        assert_eq!(config.watch.tick_secs, 2);
        assert_eq!(config.source.refresh_secs, 43200);
    }

    #[test]
    fn test_missing_file_yields_defaults() {
        let config = AppConfig::load("/nonexistent/coinwatch.json").unwrap();
        assert_eq!(config.watch.high, 3.0);
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let path = std::env::temp_dir().join(format!("coinwatch-test-{}.json", std::process::id()));
        std::fs::write(&path, r#"{"watch":{"coins":["BTC"],"high":5.0}}"#).unwrap();

        let config = AppConfig::load(path.to_str().unwrap()).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(config.watch.coins, vec!["BTC".to_string()]);
        assert_eq!(config.watch.high, 5.0);
        // Untouched sections fall back to defaults.
        assert_eq!(config.watch.low, -2.0);
        assert_eq!(config.source.refresh_secs, 43200);
    }

    #[test]
    fn test_validate_reports_first_missing_field() {
        let config = AppConfig::default();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Missing("source.username"))
        ));
        assert!(complete().validate().is_ok());
    }

    #[test]
    fn test_watch_filter_amplitude_mapping() {
        let mut config = complete();
        config.watch.amplitude = 0.0;
        assert_eq!(config.watch_filter().amplitude, None);

        config.watch.amplitude = 1.5;
        assert_eq!(config.watch_filter().amplitude, Some(1.5));
    }

    #[test]
    fn test_tick_interval_floor() {
        let mut config = complete();
        config.watch.tick_secs = 0;
        assert_eq!(config.tick_interval(), Duration::from_secs(1));
    }
}
