//! Error types for the ds-core crate.
//!
//! This module provides the [`ConfigError`] type for configuration and
//! device-detection errors that can occur before a scan starts.

use camino::Utf8PathBuf;

/// Errors that can occur while loading configuration or locating the device.
///
/// Every variant is fatal: the scan cannot start without a valid root and
/// a valid configuration.
///
/// # Examples
///
/// ```
/// use ds_core::ConfigError;
/// use camino::Utf8PathBuf;
///
/// let error = ConfigError::MissingDirectory(Utf8PathBuf::from("/media/phone"));
/// assert!(error.to_string().contains("/media/phone"));
/// ```
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The provided path is invalid or malformed.
    #[error("invalid path '{path}': {reason}")]
    InvalidPath {
        /// The invalid path.
        path: Utf8PathBuf,
        /// Explanation of why the path is invalid.
        reason: String,
    },

    /// A required directory does not exist.
    #[error("path does not exist: {0}")]
    MissingDirectory(Utf8PathBuf),

    /// A configuration option has an invalid value.
    #[error("invalid configuration option '{option}': {reason}")]
    InvalidOption {
        /// The name of the invalid option.
        option: String,
        /// Explanation of why the option is invalid.
        reason: String,
    },

    /// No mounted device could be detected.
    #[error("could not auto-detect a mounted device")]
    MountNotFound,

    /// An I/O error occurred while reading configuration.
    #[error("failed to read configuration: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to parse the configuration file.
    #[error("failed to parse configuration: {0}")]
    Parse(#[from] serde_json::Error),
}

impl ConfigError {
    /// Creates a new [`ConfigError::InvalidOption`] error.
    #[inline]
    pub fn invalid_option(option: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidOption {
            option: option.into(),
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_path_display() {
        let error = ConfigError::InvalidPath {
            path: Utf8PathBuf::from("/etc/passwd"),
            reason: "not a directory".to_owned(),
        };
        let msg = error.to_string();
        assert!(msg.contains("/etc/passwd"));
        assert!(msg.contains("not a directory"));
    }

    #[test]
    fn test_missing_directory_display() {
        let error = ConfigError::MissingDirectory(Utf8PathBuf::from("/missing/dir"));
        assert_eq!(error.to_string(), "path does not exist: /missing/dir");
    }

    #[test]
    fn test_invalid_option_display() {
        let error = ConfigError::invalid_option("chunk_size", "must be greater than zero");
        let msg = error.to_string();
        assert!(msg.contains("chunk_size"));
        assert!(msg.contains("must be greater than zero"));
    }
}
