use crate::error::{GeoradarError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

pub const DEFAULT_RANGE_THRESHOLD_KM: f64 = 1.0;
pub const DEFAULT_POLLING_INTERVAL_MS: u64 = 15_000;
pub const DEFAULT_TEMPORAL_WINDOW_MINUTES: u32 = 15;
pub const DEFAULT_FIRST_FIX_TIMEOUT_MS: u64 = 10_000;
pub const DEFAULT_COOLDOWN_INTERVAL_MS: u64 = 5 * 60 * 1000;
pub const DEFAULT_REMINDER_INTERVAL_MS: u64 = DEFAULT_POLLING_INTERVAL_MS;

/// Configuration source for tracking where values come from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConfigSource {
    /// Default value
    Default,
    /// Loaded from config file
    File,
    /// Loaded from environment variable
    Environment,
    /// Provided via CLI argument
    Cli,
}

impl ConfigSource {
    /// Returns the precedence level (higher = higher priority)
    pub fn precedence(&self) -> u8 {
        match self {
            ConfigSource::Default => 0,
            ConfigSource::File => 1,
            ConfigSource::Environment => 2,
            ConfigSource::Cli => 3,
        }
    }
}

/// A configuration value with its source
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigValue<T> {
    pub value: T,
    pub source: ConfigSource,
}

impl<T> ConfigValue<T> {
    pub fn new(value: T, source: ConfigSource) -> Self {
        Self { value, source }
    }

    /// Update the value if the new source has higher precedence
    pub fn update(&mut self, value: T, source: ConfigSource) {
        if source.precedence() > self.source.precedence() {
            self.value = value;
            self.source = source;
        }
    }
}

/// Tunables consumed by the polling engine
#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    /// Inclusive proximity radius
    pub range_threshold_km: f64,

    /// Period of the evaluation timer
    pub polling_interval: Duration,

    /// Width of the temporal window on either kind of signal
    pub temporal_window_minutes: u32,

    /// Deadline for the first fix when polling starts
    pub first_fix_timeout: Duration,

    /// Minimum gap between routine notifications for one signal
    pub cooldown_interval: Duration,

    /// Minimum gap between reminders while a signal is inside its temporal window
    pub reminder_interval: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            range_threshold_km: DEFAULT_RANGE_THRESHOLD_KM,
            polling_interval: Duration::from_millis(DEFAULT_POLLING_INTERVAL_MS),
            temporal_window_minutes: DEFAULT_TEMPORAL_WINDOW_MINUTES,
            first_fix_timeout: Duration::from_millis(DEFAULT_FIRST_FIX_TIMEOUT_MS),
            cooldown_interval: Duration::from_millis(DEFAULT_COOLDOWN_INTERVAL_MS),
            reminder_interval: Duration::from_millis(DEFAULT_REMINDER_INTERVAL_MS),
        }
    }
}

impl EngineConfig {
    /// Reject values the engine cannot run with
    pub fn validate(&self) -> Result<()> {
        if !self.range_threshold_km.is_finite() || self.range_threshold_km <= 0.0 {
            return Err(GeoradarError::ConfigInvalid {
                key: "range_threshold_km".to_string(),
                reason: format!("must be a positive number, got {}", self.range_threshold_km),
            });
        }

        if self.polling_interval.is_zero() {
            return Err(GeoradarError::ConfigInvalid {
                key: "polling_interval_ms".to_string(),
                reason: "must be greater than zero".to_string(),
            });
        }

        if self.temporal_window_minutes == 0 {
            return Err(GeoradarError::ConfigInvalid {
                key: "temporal_window_minutes".to_string(),
                reason: "must be greater than zero".to_string(),
            });
        }

        if self.first_fix_timeout.is_zero() {
            return Err(GeoradarError::ConfigInvalid {
                key: "first_fix_timeout_ms".to_string(),
                reason: "must be greater than zero".to_string(),
            });
        }

        if self.cooldown_interval.is_zero() {
            return Err(GeoradarError::ConfigInvalid {
                key: "cooldown_interval_ms".to_string(),
                reason: "must be greater than zero".to_string(),
            });
        }

        if self.reminder_interval.is_zero() {
            return Err(GeoradarError::ConfigInvalid {
                key: "reminder_interval_ms".to_string(),
                reason: "must be greater than zero".to_string(),
            });
        }

        Ok(())
    }
}

/// Layered configuration for GeoRadar
#[derive(Debug, Clone)]
pub struct LayeredConfig {
    pub range_threshold_km: ConfigValue<f64>,
    pub polling_interval_ms: ConfigValue<u64>,
    pub temporal_window_minutes: ConfigValue<u32>,
    pub first_fix_timeout_ms: ConfigValue<u64>,
    pub cooldown_interval_ms: ConfigValue<u64>,
    pub reminder_interval_ms: ConfigValue<u64>,
    pub catalog_url: ConfigValue<Option<String>>,
}

impl LayeredConfig {
    /// Create a new configuration with default values
    pub fn with_defaults() -> Self {
        Self {
            range_threshold_km: ConfigValue::new(DEFAULT_RANGE_THRESHOLD_KM, ConfigSource::Default),
            polling_interval_ms: ConfigValue::new(
                DEFAULT_POLLING_INTERVAL_MS,
                ConfigSource::Default,
            ),
            temporal_window_minutes: ConfigValue::new(
                DEFAULT_TEMPORAL_WINDOW_MINUTES,
                ConfigSource::Default,
            ),
            first_fix_timeout_ms: ConfigValue::new(
                DEFAULT_FIRST_FIX_TIMEOUT_MS,
                ConfigSource::Default,
            ),
            cooldown_interval_ms: ConfigValue::new(
                DEFAULT_COOLDOWN_INTERVAL_MS,
                ConfigSource::Default,
            ),
            reminder_interval_ms: ConfigValue::new(
                DEFAULT_REMINDER_INTERVAL_MS,
                ConfigSource::Default,
            ),
            catalog_url: ConfigValue::new(None, ConfigSource::Default),
        }
    }

    /// Load configuration from a TOML file
    pub fn load_from_file<P: AsRef<Path>>(mut self, path: P) -> Result<Self> {
        let content =
            fs::read_to_string(path.as_ref()).map_err(|e| GeoradarError::ConfigInvalid {
                key: "file".to_string(),
                reason: format!("Failed to read config file: {}", e),
            })?;

        let file_config: FileConfig =
            toml::from_str(&content).map_err(|e| GeoradarError::ConfigInvalid {
                key: "file".to_string(),
                reason: format!("Failed to parse TOML: {}", e),
            })?;

        if let Some(range) = file_config.range_threshold_km {
            self.range_threshold_km.update(range, ConfigSource::File);
        }

        if let Some(interval) = file_config.polling_interval_ms {
            self.polling_interval_ms.update(interval, ConfigSource::File);
        }

        if let Some(window) = file_config.temporal_window_minutes {
            self.temporal_window_minutes.update(window, ConfigSource::File);
        }

        if let Some(timeout) = file_config.first_fix_timeout_ms {
            self.first_fix_timeout_ms.update(timeout, ConfigSource::File);
        }

        if let Some(cooldown) = file_config.cooldown_interval_ms {
            self.cooldown_interval_ms.update(cooldown, ConfigSource::File);
        }

        if let Some(reminder) = file_config.reminder_interval_ms {
            self.reminder_interval_ms.update(reminder, ConfigSource::File);
        }

        if let Some(url) = file_config.catalog_url {
            self.catalog_url.update(Some(url), ConfigSource::File);
        }

        Ok(self)
    }

    /// Load configuration from environment variables
    pub fn load_from_env(mut self) -> Self {
        if let Some(range) = parse_env::<f64>("GEORADAR_RANGE_KM", "a distance in kilometers") {
            self.range_threshold_km.update(range, ConfigSource::Environment);
        }

        if let Some(interval) =
            parse_env::<u64>("GEORADAR_POLL_INTERVAL_MS", "an integer number of milliseconds")
        {
            self.polling_interval_ms.update(interval, ConfigSource::Environment);
        }

        if let Some(window) =
            parse_env::<u32>("GEORADAR_TEMPORAL_WINDOW_MIN", "an integer number of minutes")
        {
            self.temporal_window_minutes.update(window, ConfigSource::Environment);
        }

        if let Some(timeout) =
            parse_env::<u64>("GEORADAR_FIRST_FIX_TIMEOUT_MS", "an integer number of milliseconds")
        {
            self.first_fix_timeout_ms.update(timeout, ConfigSource::Environment);
        }

        if let Some(cooldown) =
            parse_env::<u64>("GEORADAR_COOLDOWN_MS", "an integer number of milliseconds")
        {
            self.cooldown_interval_ms.update(cooldown, ConfigSource::Environment);
        }

        if let Some(reminder) =
            parse_env::<u64>("GEORADAR_REMINDER_INTERVAL_MS", "an integer number of milliseconds")
        {
            self.reminder_interval_ms.update(reminder, ConfigSource::Environment);
        }

        if let Ok(url) = env::var("GEORADAR_CATALOG_URL") {
            self.catalog_url.update(Some(url), ConfigSource::Environment);
        }

        self
    }

    /// Update configuration from CLI arguments
    pub fn update_from_cli(&mut self, overrides: CliConfigOverrides) {
        if let Some(range) = overrides.range_threshold_km {
            self.range_threshold_km.update(range, ConfigSource::Cli);
        }

        if let Some(interval) = overrides.polling_interval_ms {
            self.polling_interval_ms.update(interval, ConfigSource::Cli);
        }

        if let Some(cooldown) = overrides.cooldown_interval_ms {
            self.cooldown_interval_ms.update(cooldown, ConfigSource::Cli);
        }

        if let Some(url) = overrides.catalog_url {
            self.catalog_url.update(Some(url), ConfigSource::Cli);
        }
    }

    /// Resolve into a validated [`EngineConfig`]
    pub fn engine_config(&self) -> Result<EngineConfig> {
        let config = EngineConfig {
            range_threshold_km: self.range_threshold_km.value,
            polling_interval: Duration::from_millis(self.polling_interval_ms.value),
            temporal_window_minutes: self.temporal_window_minutes.value,
            first_fix_timeout: Duration::from_millis(self.first_fix_timeout_ms.value),
            cooldown_interval: Duration::from_millis(self.cooldown_interval_ms.value),
            reminder_interval: Duration::from_millis(self.reminder_interval_ms.value),
        };
        config.validate()?;
        Ok(config)
    }

    /// Get all configuration values as a map for inspection
    pub fn to_inspection_map(&self) -> HashMap<String, (String, ConfigSource)> {
        let mut map = HashMap::new();

        map.insert(
            "range_threshold_km".to_string(),
            (format!("{} km", self.range_threshold_km.value), self.range_threshold_km.source),
        );

        map.insert(
            "polling_interval_ms".to_string(),
            (format!("{} ms", self.polling_interval_ms.value), self.polling_interval_ms.source),
        );

        map.insert(
            "temporal_window_minutes".to_string(),
            (
                format!("{} min", self.temporal_window_minutes.value),
                self.temporal_window_minutes.source,
            ),
        );

        map.insert(
            "first_fix_timeout_ms".to_string(),
            (format!("{} ms", self.first_fix_timeout_ms.value), self.first_fix_timeout_ms.source),
        );

        map.insert(
            "cooldown_interval_ms".to_string(),
            (format!("{} ms", self.cooldown_interval_ms.value), self.cooldown_interval_ms.source),
        );

        map.insert(
            "reminder_interval_ms".to_string(),
            (format!("{} ms", self.reminder_interval_ms.value), self.reminder_interval_ms.source),
        );

        map.insert(
            "catalog_url".to_string(),
            (
                self.catalog_url.value.clone().unwrap_or_else(|| "(built-in fixture)".to_string()),
                self.catalog_url.source,
            ),
        );

        map
    }
}

/// Configuration loaded from TOML file
#[derive(Debug, Deserialize, Serialize)]
struct FileConfig {
    range_threshold_km: Option<f64>,
    polling_interval_ms: Option<u64>,
    temporal_window_minutes: Option<u32>,
    first_fix_timeout_ms: Option<u64>,
    cooldown_interval_ms: Option<u64>,
    reminder_interval_ms: Option<u64>,
    catalog_url: Option<String>,
}

/// CLI configuration overrides
#[derive(Debug, Default)]
pub struct CliConfigOverrides {
    pub range_threshold_km: Option<f64>,
    pub polling_interval_ms: Option<u64>,
    pub cooldown_interval_ms: Option<u64>,
    pub catalog_url: Option<String>,
}

/// Read and parse an environment variable, warning on unparseable values
fn parse_env<T: FromStr>(key: &str, expected: &str) -> Option<T> {
    let raw = env::var(key).ok()?;
    match raw.trim().parse::<T>() {
        Ok(value) => Some(value),
        Err(_) => {
            tracing::warn!("Invalid {} value '{}': expected {}", key, raw, expected);
            None
        }
    }
}
