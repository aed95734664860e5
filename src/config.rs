use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::error::TrendError;
use crate::export::ExportFormat;
use crate::load::{LoadConfig, LoadSeed};
use crate::logging::LogConfig;
use crate::stress::StressConfig;
use crate::zones::ZoneBoundaries;

/// Longest accepted forecast horizon, in days
pub const MAX_FORECAST_DAYS: u32 = 3650;

/// Fitness trend computation settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrendConfig {
    /// Stress scoring and daily aggregation
    pub stress: StressConfig,

    /// Load recurrence time constants
    pub load: LoadConfig,

    /// Training zone boundaries on the form (TSB) axis
    pub zones: ZoneBoundaries,

    /// Show training zones (chart base lines and zone column)
    pub training_zones_enabled: bool,

    /// Number of preview days appended after the last history day
    pub forecast_days: u32,

    /// Load state before the first day
    pub initial_fitness: LoadSeed,
}

impl Default for TrendConfig {
    fn default() -> Self {
        TrendConfig {
            stress: StressConfig::default(),
            load: LoadConfig::default(),
            zones: ZoneBoundaries::default(),
            training_zones_enabled: true,
            forecast_days: 14,
            initial_fitness: LoadSeed::default(),
        }
    }
}

impl TrendConfig {
    pub fn validate(&self) -> std::result::Result<(), TrendError> {
        self.load.validate()?;
        self.zones.validate()?;

        if self.forecast_days > MAX_FORECAST_DAYS {
            return Err(TrendError::Configuration(format!(
                "forecast_days must be at most {}, got {}",
                MAX_FORECAST_DAYS, self.forecast_days
            )));
        }

        let seed = &self.initial_fitness;
        if !(seed.ctl.is_finite() && seed.atl.is_finite() && seed.vo2.is_finite()) {
            return Err(TrendError::Configuration(
                "initial fitness values must be finite".to_string(),
            ));
        }

        Ok(())
    }
}

/// Main application configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Application metadata
    #[serde(default)]
    pub metadata: ConfigMetadata,

    /// Fitness trend settings
    #[serde(default)]
    pub trend: TrendConfig,

    /// Logging settings
    #[serde(default)]
    pub logging: LogConfig,

    /// Export defaults
    #[serde(default)]
    pub export: ExportSettings,
}

/// Configuration metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfigMetadata {
    /// Configuration format version
    pub version: String,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Last modification timestamp
    pub updated_at: DateTime<Utc>,
}

/// Export defaults
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportSettings {
    /// Directory used when no output path is given
    pub directory: PathBuf,

    /// Default export format
    pub format: ExportFormat,

    /// Decimal places kept (floored) for exported values
    pub precision: u32,
}

impl Default for ExportSettings {
    fn default() -> Self {
        ExportSettings {
            directory: PathBuf::from("."),
            format: ExportFormat::Csv,
            precision: 2,
        }
    }
}

impl Default for ConfigMetadata {
    fn default() -> Self {
        let now = Utc::now();

        ConfigMetadata {
            version: "1.0".to_string(),
            created_at: now,
            updated_at: now,
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            metadata: ConfigMetadata::default(),
            trend: TrendConfig::default(),
            logging: LogConfig::default(),
            export: ExportSettings::default(),
        }
    }
}

/// Configuration management implementation
impl AppConfig {
    /// Load and validate configuration from a TOML file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let config: AppConfig = toml::from_str(&content)
            .with_context(|| "Failed to parse TOML configuration")?;

        config
            .trend
            .validate()
            .with_context(|| format!("Invalid configuration: {}", path.as_ref().display()))?;

        debug!(path = %path.as_ref().display(), "Loaded configuration");
        Ok(config)
    }

    /// Save configuration to TOML file
    pub fn save_to_file<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        self.metadata.updated_at = Utc::now();

        if let Some(parent) = path.as_ref().parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory: {}", parent.display()))?;
        }

        let toml_content = toml::to_string_pretty(self)
            .with_context(|| "Failed to serialize configuration to TOML")?;

        fs::write(&path, toml_content)
            .with_context(|| format!("Failed to write config file: {}", path.as_ref().display()))?;

        Ok(())
    }

    /// Get default configuration file path
    pub fn default_config_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".fitness-trend")
            .join("config.toml")
    }

    /// Load configuration with fallback to defaults
    pub fn load_or_default() -> Self {
        Self::load_or_default_from(Self::default_config_path())
    }

    /// Load configuration from `path`, falling back to defaults
    pub fn load_or_default_from<P: AsRef<Path>>(path: P) -> Self {
        match Self::load_from_file(&path) {
            Ok(config) => config,
            Err(err) => {
                if path.as_ref().exists() {
                    warn!(error = %err, "Ignoring unusable config file, using defaults");
                } else {
                    debug!(path = %path.as_ref().display(), "Config file not found, using defaults");
                }
                Self::default()
            }
        }
    }

    /// Save configuration to default location
    pub fn save_default(&mut self) -> Result<PathBuf> {
        let config_path = Self::default_config_path();
        self.save_to_file(&config_path)?;
        Ok(config_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stress::HeartRateImpulseMode;
    use tempfile::tempdir;

    #[test]
    fn test_config_serialization() {
        let config = AppConfig::default();
        let toml_str = toml::to_string(&config).unwrap();
        let deserialized: AppConfig = toml::from_str(&toml_str).unwrap();

        assert_eq!(config.metadata.version, deserialized.metadata.version);
        assert_eq!(config.trend, deserialized.trend);
        assert_eq!(config.export, deserialized.export);
    }

    #[test]
    fn test_partial_trend_section_uses_defaults() {
        let toml_str = r#"
            [metadata]
            version = "1.0"
            created_at = "2024-01-01T00:00:00Z"
            updated_at = "2024-01-01T00:00:00Z"

            [trend]
            forecast_days = 7

            [trend.stress]
            heart_rate_impulse_mode = "trimp"
            power_meter_enabled = false
            swim_enabled = true
            allow_estimated_power_stress_score = false
            allow_estimated_running_stress_score = true
            vo2max_policy = "most_recent"
        "#;

        let config: AppConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.trend.forecast_days, 7);
        assert_eq!(
            config.trend.stress.heart_rate_impulse_mode,
            HeartRateImpulseMode::Trimp
        );
        assert!(!config.trend.stress.power_meter_enabled);
        assert_eq!(config.trend.load, LoadConfig::default());
        assert!(config.trend.training_zones_enabled);
        assert_eq!(config.export.precision, 2);
    }

    #[test]
    fn test_config_file_io() {
        let temp_dir = tempdir().unwrap();
        let config_path = temp_dir.path().join("nested").join("config.toml");

        let mut original_config = AppConfig::default();
        original_config.trend.forecast_days = 30;
        original_config.trend.initial_fitness.ctl = 45.0;

        original_config.save_to_file(&config_path).unwrap();
        let loaded_config = AppConfig::load_from_file(&config_path).unwrap();

        assert_eq!(loaded_config.trend.forecast_days, 30);
        assert_eq!(loaded_config.trend.initial_fitness.ctl, 45.0);
    }

    #[test]
    fn test_forecast_horizon_is_capped() {
        let mut config = TrendConfig {
            forecast_days: MAX_FORECAST_DAYS,
            ..TrendConfig::default()
        };
        assert!(config.validate().is_ok());

        config.forecast_days = MAX_FORECAST_DAYS + 1;
        assert!(matches!(config.validate(), Err(TrendError::Configuration(_))));

        config.forecast_days = u32::MAX;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let temp_dir = tempdir().unwrap();
        let config_path = temp_dir.path().join("config.toml");

        let mut config = AppConfig::default();
        config.trend.load.ctl_time_constant = 0.0;
        config.save_to_file(&config_path).unwrap();

        assert!(AppConfig::load_from_file(&config_path).is_err());

        let fallback = AppConfig::load_or_default_from(&config_path);
        assert_eq!(fallback.trend.load, LoadConfig::default());
    }

    #[test]
    fn test_missing_file_falls_back_to_defaults() {
        let temp_dir = tempdir().unwrap();
        let config = AppConfig::load_or_default_from(temp_dir.path().join("absent.toml"));
        assert_eq!(config.trend, TrendConfig::default());
    }

    #[test]
    fn test_trend_validation() {
        assert!(TrendConfig::default().validate().is_ok());

        let mut config = TrendConfig::default();
        config.initial_fitness.atl = f64::NAN;
        assert!(matches!(config.validate(), Err(TrendError::Configuration(_))));
    }
}
