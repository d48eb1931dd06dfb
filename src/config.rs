//! Application configuration loaded from `config.toml`.

use serde::Deserialize;
use std::path::Path;
use thiserror::Error;

use crate::api::types::KlinesRequest;
use crate::common::constants::{
    BINANCE_API_URL, BINANCE_MAX_KLINES_LIMIT, DEFAULT_INTERVAL, DEFAULT_KLINES_LIMIT, DEFAULT_LOG_FILTER,
    DEFAULT_MIN_REQUEST_INTERVAL_MS, DEFAULT_SYMBOL,
};
use crate::historical::utils::interval_to_seconds;
use crate::logging::{LogRotation, LoggingConfig};
use crate::volume_profile::structs::ProfileOptions;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Where candles come from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    Binance,
    Csv,
}

/// Candle source configuration from config.toml
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    pub kind: SourceKind,
    pub symbol: String,
    pub timeframe: String,
    pub limit: u32,
    pub base_url: String,
    pub csv_path: Option<String>,
    pub min_request_interval_ms: u64,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            kind: SourceKind::Binance,
            symbol: DEFAULT_SYMBOL.to_string(),
            timeframe: DEFAULT_INTERVAL.to_string(),
            limit: DEFAULT_KLINES_LIMIT,
            base_url: BINANCE_API_URL.to_string(),
            csv_path: None,
            min_request_interval_ms: DEFAULT_MIN_REQUEST_INTERVAL_MS,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub format: OutputFormat,
}

/// Logging configuration from config.toml
#[derive(Debug, Clone, Default, Deserialize)]
struct LoggingTomlConfig {
    pub log_dir: Option<String>,
    pub level_filter: Option<String>,
    pub rotation: Option<String>, // "daily" or "hourly"
    pub console_timestamps: Option<bool>,
    pub file_json_format: Option<bool>,
    pub cleanup_days: Option<u32>, // Days to keep log files
}

/// Full TOML configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
struct TomlConfig {
    #[serde(default)]
    pub source: SourceConfig,
    #[serde(default)]
    pub profile: ProfileOptions,
    #[serde(default)]
    pub output: OutputConfig,
    pub logging: Option<LoggingTomlConfig>,
}

/// Runtime configuration (converted from TOML)
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub source: SourceConfig,
    pub profile: ProfileOptions,
    pub output: OutputConfig,
    pub logging_config: LoggingConfig,
    pub log_cleanup_days: u32,
}

const DEFAULT_LOG_CLEANUP_DAYS: u32 = 30;

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            source: SourceConfig::default(),
            profile: ProfileOptions::default(),
            output: OutputConfig::default(),
            logging_config: LoggingConfig::default(),
            log_cleanup_days: DEFAULT_LOG_CLEANUP_DAYS,
        }
    }
}

impl AppConfig {
    /// Load configuration from a config.toml file
    pub fn from_toml<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let config_content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&config_content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let toml_config: TomlConfig = toml::from_str(content)?;
        let config = Self::from_toml_config(toml_config)?;
        config.validate()?;
        Ok(config)
    }

    fn from_toml_config(toml_config: TomlConfig) -> Result<Self, ConfigError> {
        let (logging_config, log_cleanup_days) = match toml_config.logging {
            Some(log_config) => {
                let rotation = match log_config.rotation.as_deref() {
                    Some(value) => parse_rotation(value)?,
                    None => LogRotation::Daily,
                };

                let config = LoggingConfig {
                    log_dir: log_config.log_dir.unwrap_or_else(|| "logs".to_string()),
                    level_filter: log_config.level_filter.unwrap_or_else(|| DEFAULT_LOG_FILTER.to_string()),
                    rotation,
                    console_timestamps: log_config.console_timestamps.unwrap_or(true),
                    file_json_format: log_config.file_json_format.unwrap_or(true),
                };
                (config, log_config.cleanup_days.unwrap_or(DEFAULT_LOG_CLEANUP_DAYS))
            }
            None => (LoggingConfig::default(), DEFAULT_LOG_CLEANUP_DAYS),
        };

        Ok(Self {
            source: toml_config.source,
            profile: toml_config.profile,
            output: toml_config.output,
            logging_config,
            log_cleanup_days,
        })
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.profile.bin_count == 0 {
            return Err(ConfigError::Invalid("profile.bin_count must be at least 1".to_string()));
        }
        if self.source.limit == 0 {
            return Err(ConfigError::Invalid("source.limit must be at least 1".to_string()));
        }
        match self.source.kind {
            SourceKind::Binance => {
                if self.source.limit > BINANCE_MAX_KLINES_LIMIT {
                    return Err(ConfigError::Invalid(format!(
                        "source.limit must be within 1..={} for binance, got {}",
                        BINANCE_MAX_KLINES_LIMIT, self.source.limit
                    )));
                }
                if self.source.symbol.trim().is_empty() {
                    return Err(ConfigError::Invalid("source.symbol must not be empty".to_string()));
                }
                if interval_to_seconds(&self.source.timeframe).is_none() {
                    return Err(ConfigError::Invalid(format!(
                        "source.timeframe '{}' is not a supported interval",
                        self.source.timeframe
                    )));
                }
            }
            SourceKind::Csv => {
                if self.source.csv_path.as_deref().map_or(true, |p| p.trim().is_empty()) {
                    return Err(ConfigError::Invalid("source.csv_path is required for kind = \"csv\"".to_string()));
                }
            }
        }
        Ok(())
    }

    /// Candle request described by the source section
    pub fn klines_request(&self) -> KlinesRequest {
        KlinesRequest::new(self.source.symbol.clone(), self.source.timeframe.clone()).with_limit(self.source.limit)
    }
}

fn parse_rotation(value: &str) -> Result<LogRotation, ConfigError> {
    match value {
        "hourly" => Ok(LogRotation::Hourly),
        "daily" => Ok(LogRotation::Daily),
        other => Err(ConfigError::Invalid(format!(
            "logging.rotation must be \"daily\" or \"hourly\", got '{}'",
            other
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.source.kind, SourceKind::Binance);
        assert_eq!(config.source.symbol, "BTCUSDT");
        assert_eq!(config.source.timeframe, "1h");
        assert_eq!(config.source.limit, 500);
        assert_eq!(config.profile.bin_count, 100);
        assert_eq!(config.output.format, OutputFormat::Table);
        assert_eq!(config.log_cleanup_days, 30);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_toml_uses_defaults() {
        let config = AppConfig::from_toml_str("").unwrap();
        assert_eq!(config.source, SourceConfig::default());
        assert_eq!(config.profile, ProfileOptions::default());
    }

    #[test]
    fn test_full_toml() {
        let content = r#"
            [source]
            kind = "csv"
            csv_path = "data/candles.csv"
            limit = 200

            [profile]
            bin_count = 50
            strict = true

            [output]
            format = "json"

            [logging]
            log_dir = "var/log"
            rotation = "hourly"
            file_json_format = false
            cleanup_days = 7
        "#;
        let config = AppConfig::from_toml_str(content).unwrap();

        assert_eq!(config.source.kind, SourceKind::Csv);
        assert_eq!(config.source.csv_path.as_deref(), Some("data/candles.csv"));
        assert_eq!(config.source.limit, 200);
        assert_eq!(config.profile.bin_count, 50);
        assert!(config.profile.strict);
        assert_eq!(config.output.format, OutputFormat::Json);
        assert_eq!(config.logging_config.log_dir, "var/log");
        assert!(matches!(config.logging_config.rotation, LogRotation::Hourly));
        assert!(!config.logging_config.file_json_format);
        assert!(config.logging_config.console_timestamps);
        assert_eq!(config.log_cleanup_days, 7);
    }

    #[test]
    fn test_rejects_zero_bins() {
        let result = AppConfig::from_toml_str("[profile]\nbin_count = 0\n");
        assert!(matches!(result, Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_rejects_unknown_timeframe() {
        let result = AppConfig::from_toml_str("[source]\ntimeframe = \"7m\"\n");
        assert!(matches!(result, Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_rejects_limit_out_of_range() {
        assert!(AppConfig::from_toml_str("[source]\nlimit = 0\n").is_err());
        assert!(AppConfig::from_toml_str("[source]\nlimit = 1001\n").is_err());
    }

    #[test]
    fn test_csv_limit_is_not_capped_by_binance() {
        let content = "[source]\nkind = \"csv\"\ncsv_path = \"candles.csv\"\nlimit = 50000\n";
        let config = AppConfig::from_toml_str(content).unwrap();
        assert_eq!(config.klines_request().limit, Some(50000));

        let zero = "[source]\nkind = \"csv\"\ncsv_path = \"candles.csv\"\nlimit = 0\n";
        assert!(matches!(AppConfig::from_toml_str(zero), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_csv_requires_path() {
        let result = AppConfig::from_toml_str("[source]\nkind = \"csv\"\n");
        assert!(matches!(result, Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_unknown_source_kind_is_parse_error() {
        let result = AppConfig::from_toml_str("[source]\nkind = \"ftx\"\n");
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_from_toml_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[source]\nsymbol = \"ETHUSDT\"\ntimeframe = \"15m\"\n").unwrap();

        let config = AppConfig::from_toml(&path).unwrap();
        let request = config.klines_request();
        assert_eq!(request.symbol, "ETHUSDT");
        assert_eq!(request.interval, "15m");
        assert_eq!(request.limit, Some(500));

        assert!(matches!(AppConfig::from_toml(dir.path().join("missing.toml")), Err(ConfigError::Io(_))));
    }

    #[test]
    fn test_parse_rotation() {
        assert!(matches!(parse_rotation("hourly"), Ok(LogRotation::Hourly)));
        assert!(matches!(parse_rotation("daily"), Ok(LogRotation::Daily)));
        assert!(matches!(parse_rotation("weekly"), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_rejects_size_based_rotation() {
        let result = AppConfig::from_toml_str("[logging]\nrotation = \"size:20\"\n");
        match result {
            Err(ConfigError::Invalid(message)) => assert!(message.contains("size:20")),
            other => panic!("expected invalid rotation, got {:?}", other.map(|_| ())),
        }
    }
}
