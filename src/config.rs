use config::{Config, Environment, File};
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;
use validator::{Validate, ValidationError};

/// Default values for configuration
const DEFAULT_LOG_LEVEL: &str = "info";
const DEFAULT_ENV: &str = "development";
const DEFAULT_CRITICAL_RATIO: f64 = 0.5;
const DEFAULT_EVENT_CHANNEL_CAPACITY: usize = 100;
const DEFAULT_CACHE_TTL_SECS: u64 = 300;
const CONFIG_DIR: &str = "config";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("configuration source error: {0}")]
    Source(#[from] config::ConfigError),

    #[error("configuration validation failed: {0}")]
    Invalid(#[from] validator::ValidationErrors),
}

/// Stock classification thresholds.
#[derive(Clone, Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct StockConfig {
    /// Fraction of `min_stock` at or below which an item is critical.
    #[serde(default = "default_critical_ratio")]
    #[validate(custom = "validate_critical_ratio")]
    pub critical_ratio: f64,
}

impl Default for StockConfig {
    fn default() -> Self {
        Self {
            critical_ratio: default_critical_ratio(),
        }
    }
}

/// Event pipeline configuration.
#[derive(Clone, Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct EventConfig {
    /// Bounded capacity of the mutation-event channel.
    #[serde(default = "default_event_channel_capacity")]
    #[validate(range(min = 1))]
    pub channel_capacity: usize,
}

impl Default for EventConfig {
    fn default() -> Self {
        Self {
            channel_capacity: default_event_channel_capacity(),
        }
    }
}

/// Query cache configuration.
#[derive(Clone, Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct CacheConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// TTL for cached query results in seconds; `None` caches until
    /// invalidated.
    #[serde(default = "default_cache_ttl")]
    pub default_ttl_secs: Option<u64>,
}

impl CacheConfig {
    pub fn ttl(&self) -> Option<Duration> {
        self.default_ttl_secs.map(Duration::from_secs)
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            default_ttl_secs: default_cache_ttl(),
        }
    }
}

/// Application configuration with validation.
#[derive(Clone, Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct AppConfig {
    /// Application environment
    #[serde(default = "default_environment")]
    pub environment: String,

    /// Logging level
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Log in JSON format (structured logging)
    #[serde(default)]
    pub log_json: bool,

    #[serde(default)]
    #[validate]
    pub stock: StockConfig,

    #[serde(default)]
    #[validate]
    pub events: EventConfig,

    #[serde(default)]
    #[validate]
    pub cache: CacheConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            environment: default_environment(),
            log_level: default_log_level(),
            log_json: false,
            stock: StockConfig::default(),
            events: EventConfig::default(),
            cache: CacheConfig::default(),
        }
    }
}

impl AppConfig {
    /// Layered load: `config/default`, then `config/{environment}`, then
    /// `BINDERY_*` environment variables. All sources are optional; defaults
    /// cover everything.
    pub fn load() -> Result<Self, ConfigError> {
        let environment =
            std::env::var("BINDERY_ENVIRONMENT").unwrap_or_else(|_| DEFAULT_ENV.to_string());

        let cfg = Config::builder()
            .add_source(File::with_name(&format!("{}/default", CONFIG_DIR)).required(false))
            .add_source(
                File::with_name(&format!("{}/{}", CONFIG_DIR, environment)).required(false),
            )
            .add_source(Environment::with_prefix("BINDERY").separator("__"))
            .build()?;

        let app: AppConfig = cfg.try_deserialize()?;
        app.validate()?;
        Ok(app)
    }
}

fn validate_critical_ratio(ratio: f64) -> Result<(), ValidationError> {
    if ratio > 0.0 && ratio <= 1.0 {
        Ok(())
    } else {
        Err(ValidationError::new("critical_ratio_out_of_range"))
    }
}

fn default_critical_ratio() -> f64 {
    DEFAULT_CRITICAL_RATIO
}

fn default_event_channel_capacity() -> usize {
    DEFAULT_EVENT_CHANNEL_CAPACITY
}

fn default_cache_ttl() -> Option<u64> {
    Some(DEFAULT_CACHE_TTL_SECS)
}

fn default_environment() -> String {
    DEFAULT_ENV.to_string()
}

fn default_log_level() -> String {
    DEFAULT_LOG_LEVEL.to_string()
}

fn default_true() -> bool {
    true
}
