//! Configuration structures for devscan.
//!
//! This module provides configuration types for the scan pipeline:
//!
//! - [`ScanSettings`] - Traversal and hashing settings
//! - [`OutputConfig`] - Report location and console behaviour
//! - [`Config`] - Root configuration combining all settings
//!
//! All configuration types implement [`Default`]. A [`Config`] can also be
//! loaded from a JSON file; missing fields fall back to their defaults.

use camino::{Utf8Path, Utf8PathBuf};
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Reference read size for streaming file contents into the hasher.
pub const DEFAULT_CHUNK_SIZE: usize = 8192;

/// Prefix of the timestamped default report name.
pub const DEFAULT_FILE_PREFIX: &str = "android_scan";

/// Settings for directory traversal and hashing.
///
/// # Examples
///
/// ```
/// use ds_core::ScanSettings;
///
/// let settings = ScanSettings::default();
/// assert_eq!(settings.chunk_size, 8192);
/// assert!(settings.root_path.is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanSettings {
    /// Mount point to scan. Auto-detected when `None`.
    pub root_path: Option<Utf8PathBuf>,

    /// Number of bytes read per chunk while hashing.
    pub chunk_size: usize,

    /// Sort sibling entries by file name for a reproducible row order.
    pub sorted: bool,
}

impl Default for ScanSettings {
    fn default() -> Self {
        Self {
            root_path: None,
            chunk_size: DEFAULT_CHUNK_SIZE,
            sorted: false,
        }
    }
}

/// Settings for the report file and console output.
///
/// # Examples
///
/// ```
/// use ds_core::OutputConfig;
///
/// let config = OutputConfig::default();
/// assert_eq!(config.file_prefix, "android_scan");
/// assert!(!config.verbose);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Report file path. A timestamped name is generated when `None`.
    pub path: Option<Utf8PathBuf>,

    /// Prefix of the generated report name.
    pub file_prefix: String,

    /// Echo every successfully hashed file to stdout.
    pub verbose: bool,

    /// Seconds between progress log lines. `0` disables progress logging.
    pub progress_interval_secs: u64,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            path: None,
            file_prefix: DEFAULT_FILE_PREFIX.to_owned(),
            verbose: false,
            progress_interval_secs: 0,
        }
    }
}

impl OutputConfig {
    /// Builds the default report name for the given moment.
    ///
    /// The format is `<prefix>_YYYYMMDD_HHMMSS.csv`.
    ///
    /// # Examples
    ///
    /// ```
    /// use chrono::{Local, TimeZone};
    /// use ds_core::OutputConfig;
    ///
    /// let now = Local.with_ymd_and_hms(2024, 3, 9, 14, 5, 7).unwrap();
    /// let name = OutputConfig::default().default_file_name(&now);
    /// assert_eq!(name, "android_scan_20240309_140507.csv");
    /// ```
    #[must_use]
    pub fn default_file_name(&self, now: &DateTime<Local>) -> String {
        format!("{}_{}.csv", self.file_prefix, now.format("%Y%m%d_%H%M%S"))
    }

    /// Returns the configured report path, or a timestamped name for `now`.
    #[must_use]
    pub fn resolve_path(&self, now: &DateTime<Local>) -> Utf8PathBuf {
        self.path
            .clone()
            .unwrap_or_else(|| Utf8PathBuf::from(self.default_file_name(now)))
    }
}

/// Root configuration for devscan.
///
/// # Examples
///
/// ```
/// use ds_core::Config;
///
/// let config = Config::default();
/// assert!(config.validate().is_ok());
///
/// let json = serde_json::to_string_pretty(&config).unwrap();
/// assert!(json.contains("chunk_size"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Traversal and hashing settings.
    pub scan: ScanSettings,

    /// Report and console settings.
    pub output: OutputConfig,
}

impl Config {
    /// Loads and validates a configuration from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read,
    /// [`ConfigError::Parse`] if it is not valid JSON, or
    /// [`ConfigError::InvalidOption`] if a value is out of range.
    pub fn from_file(path: &Utf8Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&contents)?;
        config.validate()?;

        tracing::debug!(path = %path, "Loaded configuration file");
        Ok(config)
    }

    /// Checks that every option holds a usable value.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidOption`] for a zero chunk size or an
    /// empty report prefix.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.scan.chunk_size == 0 {
            return Err(ConfigError::invalid_option(
                "scan.chunk_size",
                "must be greater than zero",
            ));
        }

        if self.output.file_prefix.trim().is_empty() {
            return Err(ConfigError::invalid_option(
                "output.file_prefix",
                "must not be empty",
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_scan_settings_defaults() {
        let settings = ScanSettings::default();
        assert_eq!(settings.chunk_size, DEFAULT_CHUNK_SIZE);
        assert!(!settings.sorted);
        assert!(settings.root_path.is_none());
    }

    #[test]
    fn test_output_config_defaults() {
        let config = OutputConfig::default();
        assert_eq!(config.file_prefix, DEFAULT_FILE_PREFIX);
        assert_eq!(config.progress_interval_secs, 0);
        assert!(config.path.is_none());
    }

    #[test]
    fn test_resolve_path_prefers_explicit() {
        let now = Local
            .with_ymd_and_hms(2025, 12, 31, 23, 59, 58)
            .single()
            .expect("unambiguous local time");

        let generated = OutputConfig::default().resolve_path(&now);
        assert_eq!(generated.as_str(), "android_scan_20251231_235958.csv");

        let explicit = OutputConfig {
            path: Some(Utf8PathBuf::from("phone.csv")),
            ..OutputConfig::default()
        };
        assert_eq!(explicit.resolve_path(&now).as_str(), "phone.csv");
    }

    #[test]
    fn test_config_serialization() {
        let config = Config::default();
        let json = serde_json::to_string(&config).expect("Serialization failed");
        let parsed: Config = serde_json::from_str(&json).expect("Deserialization failed");
        assert_eq!(config, parsed);
    }

    #[test]
    fn test_config_deserialize_with_missing_fields() {
        let json = r#"{"scan": {"sorted": true}}"#;
        let config: Config = serde_json::from_str(json).expect("Deserialization failed");
        assert!(config.scan.sorted);
        assert_eq!(config.scan.chunk_size, DEFAULT_CHUNK_SIZE);
        assert_eq!(config.output.file_prefix, DEFAULT_FILE_PREFIX);
    }

    #[test]
    fn test_validate_rejects_zero_chunk_size() {
        let mut config = Config::default();
        config.scan.chunk_size = 0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidOption { .. })
        ));
    }

    #[test]
    fn test_validate_rejects_empty_prefix() {
        let mut config = Config::default();
        config.output.file_prefix = "  ".to_owned();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::TempDir::new().expect("Failed to create temp directory");
        let path = Utf8PathBuf::from_path_buf(dir.path().join("devscan.json"))
            .expect("temp path is UTF-8");
        std::fs::write(&path, r#"{"output": {"verbose": true, "file_prefix": "pixel"}}"#)
            .expect("Failed to write config");

        let config = Config::from_file(&path).expect("Failed to load config");
        assert!(config.output.verbose);
        assert_eq!(config.output.file_prefix, "pixel");
    }

    #[test]
    fn test_from_file_invalid_json() {
        let dir = tempfile::TempDir::new().expect("Failed to create temp directory");
        let path = Utf8PathBuf::from_path_buf(dir.path().join("broken.json"))
            .expect("temp path is UTF-8");
        std::fs::write(&path, "{not json").expect("Failed to write config");

        assert!(matches!(
            Config::from_file(&path),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_from_file_missing() {
        let result = Config::from_file(Utf8Path::new("/nonexistent/devscan.json"));
        assert!(matches!(result, Err(ConfigError::Io(_))));
    }
}
