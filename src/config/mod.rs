//! Application settings
//!
//! Settings are constructed exactly once: each binary entry point calls
//! [`Settings::load`] at startup and passes the value (or its sections) by
//! reference from there on. Nothing reads configuration ambiently after
//! startup, and no global settings instance exists.

use std::time::Duration;

use serde::Deserialize;

/// Root settings, loaded from optional `config/default` and `config/local`
/// files plus `MEMOFRESH__`-prefixed environment variables (for example
/// `MEMOFRESH__CACHE__TTL_SECS=120`).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub logging: LoggingSettings,
    #[serde(default)]
    pub cache: CacheSettings,
    #[serde(default)]
    pub metrics: MetricsSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSettings {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default)]
    pub format: LogFormat,
}

#[derive(Debug, Clone, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Memoization cache settings.
#[derive(Debug, Clone, Deserialize)]
pub struct CacheSettings {
    /// Time-to-live for cached entries, in seconds. Zero is rejected when
    /// a wrapper is built from these settings.
    #[serde(default = "default_ttl_secs")]
    pub ttl_secs: u64,
    /// Store kind: `unbounded` (default) or `bounded`.
    #[serde(default = "default_store")]
    pub store: String,
    /// Maximum resident entries; required for the bounded store.
    #[serde(default)]
    pub capacity: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MetricsSettings {
    /// Install the Prometheus recorder at startup.
    #[serde(default)]
    pub enabled: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_ttl_secs() -> u64 {
    300
}

fn default_store() -> String {
    "unbounded".to_string()
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::default(),
        }
    }
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            ttl_secs: default_ttl_secs(),
            store: default_store(),
            capacity: None,
        }
    }
}

impl Default for MetricsSettings {
    fn default() -> Self {
        Self { enabled: false }
    }
}

impl CacheSettings {
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }
}

impl Settings {
    pub fn load() -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name("config/local").required(false))
            .add_source(
                config::Environment::with_prefix("MEMOFRESH")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}
