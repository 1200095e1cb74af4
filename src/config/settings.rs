//! Configuration settings for focusbubble.
//!
//! Settings are loaded from `~/.focusbubble/config.yaml`. Every field has a
//! default, so partial files are fine.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::cli::args::OutputFormat;
use crate::error::FocusError;

/// Upper bound for every policy duration: one year.
const MAX_POLICY_MS: u64 = 365 * 24 * 60 * 60 * 1_000;

/// Main configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    /// General settings.
    pub general: GeneralConfig,
    /// Session tracking policy.
    pub focus: FocusConfig,
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Default output format.
    #[serde(default = "default_output_format")]
    pub default_output: OutputFormat,
    /// Color output setting.
    #[serde(default = "default_color")]
    pub color: ColorSetting,
}

/// Color output setting.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ColorSetting {
    /// Auto-detect based on terminal.
    #[default]
    Auto,
    /// Always use colors.
    Always,
    /// Never use colors.
    Never,
}

/// Session tracking policy constants.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct FocusConfig {
    /// Minimum gap between two accepted distractions.
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
    /// Sessions shorter than this are discarded on reset.
    #[serde(default = "default_min_save_duration_ms")]
    pub min_save_duration_ms: u64,
    /// Timer tick granularity.
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,
    /// Periodic persistence cadence.
    #[serde(default = "default_autosave_interval_secs")]
    pub autosave_interval_secs: u64,
    /// A persisted in-progress session older than this is not restored.
    #[serde(default = "default_stale_after_secs")]
    pub stale_after_secs: u64,
    /// How long a data request waits before falling back.
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
}

const fn default_output_format() -> OutputFormat {
    OutputFormat::Pretty
}

const fn default_color() -> ColorSetting {
    ColorSetting::Auto
}

const fn default_debounce_ms() -> u64 {
    2_000
}

const fn default_min_save_duration_ms() -> u64 {
    5_000
}

const fn default_tick_interval_ms() -> u64 {
    1_000
}

const fn default_autosave_interval_secs() -> u64 {
    30
}

const fn default_stale_after_secs() -> u64 {
    3_600
}

const fn default_request_timeout_ms() -> u64 {
    1_000
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            default_output: default_output_format(),
            color: default_color(),
        }
    }
}

impl Default for FocusConfig {
    fn default() -> Self {
        Self {
            debounce_ms: default_debounce_ms(),
            min_save_duration_ms: default_min_save_duration_ms(),
            tick_interval_ms: default_tick_interval_ms(),
            autosave_interval_secs: default_autosave_interval_secs(),
            stale_after_secs: default_stale_after_secs(),
            request_timeout_ms: default_request_timeout_ms(),
        }
    }
}

impl FocusConfig {
    /// Check every duration against its allowed range.
    ///
    /// # Errors
    ///
    /// Returns `FocusError::Config` naming the first out-of-range field.
    pub fn validate(&self) -> Result<(), FocusError> {
        let fields = [
            ("debounce_ms", Some(self.debounce_ms), 0),
            ("min_save_duration_ms", Some(self.min_save_duration_ms), 0),
            ("tick_interval_ms", Some(self.tick_interval_ms), 1),
            (
                "autosave_interval_secs",
                self.autosave_interval_secs.checked_mul(1_000),
                1_000,
            ),
            (
                "stale_after_secs",
                self.stale_after_secs.checked_mul(1_000),
                1_000,
            ),
            ("request_timeout_ms", Some(self.request_timeout_ms), 1),
        ];

        for (name, value_ms, min_ms) in fields {
            match value_ms {
                Some(ms) if (min_ms..=MAX_POLICY_MS).contains(&ms) => {}
                _ => {
                    return Err(FocusError::Config(format!(
                        "focus.{name} is out of range (allowed: {min_ms} ms to {MAX_POLICY_MS} ms)"
                    )));
                }
            }
        }
        Ok(())
    }

    /// Minimum gap between accepted distractions, in milliseconds.
    #[must_use]
    pub fn debounce_window_ms(&self) -> i64 {
        millis(self.debounce_ms)
    }

    /// Shortest session kept on reset, in milliseconds.
    #[must_use]
    pub fn min_save_ms(&self) -> i64 {
        millis(self.min_save_duration_ms)
    }

    /// Tick granularity in milliseconds, never zero.
    #[must_use]
    pub fn tick_ms(&self) -> i64 {
        millis(self.tick_interval_ms).max(1)
    }

    /// Autosave cadence in milliseconds.
    #[must_use]
    pub fn autosave_interval_ms(&self) -> i64 {
        millis(self.autosave_interval_secs.saturating_mul(1_000))
    }

    /// Staleness threshold in milliseconds.
    #[must_use]
    pub fn stale_after_ms(&self) -> i64 {
        millis(self.stale_after_secs.saturating_mul(1_000))
    }

    /// Data request timeout.
    #[must_use]
    pub const fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    /// Tick granularity as a `Duration`.
    #[must_use]
    pub const fn tick_interval(&self) -> Duration {
        Duration::from_millis(if self.tick_interval_ms == 0 {
            1
        } else {
            self.tick_interval_ms
        })
    }
}

fn millis(value: u64) -> i64 {
    i64::try_from(value.min(MAX_POLICY_MS)).unwrap_or(i64::MAX)
}

impl Config {
    /// Load configuration from a specific path.
    ///
    /// If the config file doesn't exist, returns default configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed, or
    /// if a policy value is out of range.
    pub fn load_from_path(path: &std::path::Path) -> Result<Self, FocusError> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(path).map_err(|e| {
            FocusError::Config(format!(
                "Failed to read config file {}: {e}",
                path.display()
            ))
        })?;

        let config: Self = serde_yaml::from_str(&contents).map_err(|e| {
            FocusError::Config(format!(
                "Failed to parse config file {}: {e}",
                path.display()
            ))
        })?;
        config.focus.validate()?;
        Ok(config)
    }

    /// Save configuration to a specific path.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file cannot be written.
    pub fn save_to_path(&self, path: &std::path::Path) -> Result<(), FocusError> {
        let contents = serde_yaml::to_string(self)
            .map_err(|e| FocusError::Config(format!("Failed to serialize config: {e}")))?;

        std::fs::write(path, contents).map_err(|e| {
            FocusError::Config(format!(
                "Failed to write config file {}: {e}",
                path.display()
            ))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = Config::default();

        assert_eq!(config.general.default_output, OutputFormat::Pretty);
        assert_eq!(config.general.color, ColorSetting::Auto);
        assert_eq!(config.focus.debounce_ms, 2_000);
        assert_eq!(config.focus.min_save_duration_ms, 5_000);
        assert_eq!(config.focus.autosave_interval_ms(), 30_000);
        assert_eq!(config.focus.stale_after_ms(), 3_600_000);
        assert_eq!(config.focus.request_timeout(), Duration::from_secs(1));
    }

    #[test]
    fn test_load_missing_config() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.yaml");

        let config = Config::load_from_path(&config_path).unwrap();
        assert_eq!(config.focus, FocusConfig::default());
    }

    #[test]
    fn test_save_and_load_config() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.yaml");

        let mut config = Config::default();
        config.focus.debounce_ms = 3_000;
        config.general.default_output = OutputFormat::Json;

        config.save_to_path(&config_path).unwrap();
        let loaded = Config::load_from_path(&config_path).unwrap();

        assert_eq!(loaded.focus.debounce_ms, 3_000);
        assert_eq!(loaded.general.default_output, OutputFormat::Json);
    }

    #[test]
    fn test_partial_config() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.yaml");

        let partial_yaml = r"
focus:
  min_save_duration_ms: 10000
";
        std::fs::write(&config_path, partial_yaml).unwrap();

        let config = Config::load_from_path(&config_path).unwrap();

        assert_eq!(config.focus.min_save_duration_ms, 10_000);
        assert_eq!(config.focus.debounce_ms, 2_000);
        assert_eq!(config.general.default_output, OutputFormat::Pretty);
    }

    #[test]
    fn test_invalid_config_is_error() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.yaml");
        std::fs::write(&config_path, "focus: [not, a, map]").unwrap();

        let err = Config::load_from_path(&config_path).unwrap_err();
        assert!(matches!(err, FocusError::Config(_)));
    }

    #[test]
    fn test_out_of_range_values_are_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.yaml");

        for yaml in [
            "focus:\n  autosave_interval_secs: 18446744073709551\n",
            "focus:\n  stale_after_secs: 0\n",
            "focus:\n  tick_interval_ms: 0\n",
            "focus:\n  debounce_ms: 99999999999999\n",
        ] {
            std::fs::write(&config_path, yaml).unwrap();
            let err = Config::load_from_path(&config_path).unwrap_err();
            assert!(matches!(err, FocusError::Config(_)), "{yaml}");
        }
    }

    #[test]
    fn test_negative_durations_are_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.yaml");

        for yaml in [
            "focus:\n  debounce_ms: -5\n",
            "focus:\n  min_save_duration_ms: -1\n",
        ] {
            std::fs::write(&config_path, yaml).unwrap();
            let err = Config::load_from_path(&config_path).unwrap_err();
            assert!(matches!(err, FocusError::Config(_)), "{yaml}");
        }
    }

    #[test]
    fn test_millisecond_accessors() {
        let config = FocusConfig {
            autosave_interval_secs: u64::MAX,
            ..FocusConfig::default()
        };
        assert!(config.validate().is_err());
        assert_eq!(config.autosave_interval_ms(), 31_536_000_000);

        let config = FocusConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.debounce_window_ms(), 2_000);
        assert_eq!(config.min_save_ms(), 5_000);
        assert_eq!(config.tick_ms(), 1_000);
    }
}
