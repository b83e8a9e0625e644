use serde::{Deserialize, Serialize};
use anyhow::{bail, Result};
use chrono::NaiveDate;
use std::path::Path;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub generator: GeneratorConfig,
    pub detection: DetectionConfig,
    pub report: ReportConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    pub n_units: usize,
    pub n_materials: usize,
    pub days: u32,
    pub seed: u64,
    /// Last simulated day; today when unset
    pub end_date: Option<NaiveDate>,
    pub inflow_mean: f64,
    pub outflow_mean: f64,
    pub anomaly_rate: f64,
    pub anomaly_min: i64,
    pub anomaly_max: i64,
    pub unit_cost_min: f64,
    pub unit_cost_max: f64,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            n_units: 4,
            n_materials: 6,
            days: 120,
            seed: 42,
            end_date: None,
            inflow_mean: 20.0,
            outflow_mean: 18.0,
            anomaly_rate: 0.02,
            anomaly_min: -150,
            anomaly_max: 150,
            unit_cost_min: 5.0,
            unit_cost_max: 40.0,
        }
    }
}

/// Which standard deviation the Z-score divides by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StdDevKind {
    /// n - 1 denominator
    Sample,
    /// n denominator
    Population,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectionConfig {
    pub zscore_threshold: f64,
    pub iqr_multiplier: f64,
    pub std_dev: StdDevKind,
    pub parallel: bool,
    pub workers: usize,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            zscore_threshold: 3.0,
            iqr_multiplier: 1.5,
            std_dev: StdDevKind::Sample,
            parallel: false,
            workers: 4,
        }
    }
}

impl DetectionConfig {
    pub fn validate(&self) -> Result<()> {
        if !(self.zscore_threshold.is_finite() && self.zscore_threshold > 0.0) {
            bail!("zscore_threshold must be positive, got {}", self.zscore_threshold);
        }
        if !(self.iqr_multiplier.is_finite() && self.iqr_multiplier >= 0.0) {
            bail!("iqr_multiplier must be non-negative, got {}", self.iqr_multiplier);
        }
        if self.workers == 0 {
            bail!("workers must be at least 1");
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    pub currency: String,
    pub preview_rows: usize,
    /// Panel JSON export path; disabled when empty
    pub json_path: String,
    /// Panel CSV export path; disabled when empty
    pub csv_path: String,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            currency: "R$".to_string(),
            preview_rows: 10,
            json_path: String::new(),
            csv_path: String::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub output: String,
    pub file_path: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            output: "pretty".to_string(),
            file_path: String::new(),
        }
    }
}

impl Config {
    /// Load configuration from TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml(&contents)
    }

    /// Parse and validate configuration text
    pub fn from_toml(contents: &str) -> Result<Self> {
        let config: Config = toml::from_str(contents)?;
        config.detection.validate()?;
        Ok(config)
    }

    /// Load from environment variable or default path
    pub fn load() -> Result<Self> {
        let path = std::env::var("CONFIG_FILE")
            .unwrap_or_else(|_| "config/default.toml".to_string());
        Self::from_file(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_reference_run() {
        let config = Config::default();
        assert_eq!(config.generator.n_units, 4);
        assert_eq!(config.generator.n_materials, 6);
        assert_eq!(config.generator.days, 120);
        assert_eq!(config.detection.zscore_threshold, 3.0);
        assert_eq!(config.detection.iqr_multiplier, 1.5);
        assert_eq!(config.detection.std_dev, StdDevKind::Sample);
        assert_eq!(config.report.currency, "R$");
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config = Config::from_toml(
            r#"
            [detection]
            zscore_threshold = 2.5
            std_dev = "population"

            [generator]
            end_date = "2024-06-30"
            "#,
        )
        .unwrap();

        assert_eq!(config.detection.zscore_threshold, 2.5);
        assert_eq!(config.detection.std_dev, StdDevKind::Population);
        assert_eq!(config.detection.iqr_multiplier, 1.5);
        assert_eq!(config.generator.end_date, NaiveDate::from_ymd_opt(2024, 6, 30));
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_invalid_detection_rejected() {
        assert!(Config::from_toml("[detection]\nzscore_threshold = 0.0\n").is_err());
        assert!(Config::from_toml("[detection]\nworkers = 0\n").is_err());
    }

    #[test]
    fn test_shipped_config_parses() {
        let path = concat!(env!("CARGO_MANIFEST_DIR"), "/config/default.toml");
        let config = Config::from_file(path).unwrap();
        assert_eq!(config.generator.seed, 42);
    }
}
