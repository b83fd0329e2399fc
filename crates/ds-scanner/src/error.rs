//! Error types for the ds-scanner crate.
//!
//! This module provides the [`ScanError`] type for errors that can occur
//! during directory traversal, hashing, and report writing.

use camino::Utf8PathBuf;

/// Errors that can occur during scanning operations.
///
/// # Error Recovery Strategy
///
/// - **Per-file errors** ([`ScanError::Read`], [`ScanError::Metadata`],
///   [`ScanError::NonUtf8Path`]): converted into a report row, counted,
///   scan continues
/// - **Directory errors** ([`ScanError::Walk`]): logged, subtree skipped,
///   scan continues
/// - **Report errors** ([`ScanError::Report`]): Fatal - propagate immediately
/// - **Configuration errors** ([`ScanError::Config`]): Fatal - scan never starts
/// - **Interruption** ([`ScanError::Interrupted`]): Fatal - rows already
///   written are kept
///
/// # Examples
///
/// ```
/// use ds_scanner::ScanError;
///
/// fn handle_error(err: ScanError) {
///     match err {
///         ScanError::Read { path, .. } => eprintln!("Read error: {path}"),
///         ScanError::Metadata { path, .. } => eprintln!("Metadata error: {path}"),
///         ScanError::NonUtf8Path(p) => eprintln!("Invalid path: {}", p.display()),
///         ScanError::Walk(e) => eprintln!("Walk error: {e}"),
///         ScanError::Report(e) => eprintln!("Report error: {e}"),
///         ScanError::Config(msg) => eprintln!("Config error: {msg}"),
///         ScanError::Interrupted { written } => eprintln!("Stopped after {written} rows"),
///     }
/// }
/// ```
#[derive(Debug, thiserror::Error)]
pub enum ScanError {
    /// Failed to open or read a file while hashing it.
    #[error("failed to read file {path}: {source}")]
    Read {
        /// The path of the file that couldn't be read.
        path: Utf8PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to query a file's size.
    #[error("failed to query metadata of {path}: {source}")]
    Metadata {
        /// The path of the file whose metadata couldn't be read.
        path: Utf8PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// A discovered path is not valid UTF-8.
    #[error("path is not valid UTF-8: {}", _0.display())]
    NonUtf8Path(std::path::PathBuf),

    /// Failed to list a directory during traversal.
    #[error("failed to walk directory: {0}")]
    Walk(#[from] ignore::Error),

    /// Failed to open or write the report.
    #[error("failed to write report: {0}")]
    Report(#[source] std::io::Error),

    /// Invalid scanner configuration.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// The scan was cancelled before traversal completed.
    #[error("scan interrupted after {written} records")]
    Interrupted {
        /// Number of records handed to the report before stopping.
        written: u64,
    },
}

impl ScanError {
    /// Creates a new [`ScanError::Read`] error.
    #[inline]
    pub fn read(path: impl Into<Utf8PathBuf>, source: std::io::Error) -> Self {
        Self::Read {
            path: path.into(),
            source,
        }
    }

    /// Creates a new [`ScanError::Metadata`] error.
    #[inline]
    pub fn metadata(path: impl Into<Utf8PathBuf>, source: std::io::Error) -> Self {
        Self::Metadata {
            path: path.into(),
            source,
        }
    }

    /// Creates a new [`ScanError::Config`] error.
    #[inline]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Returns `true` if this error is recoverable (scanning can continue).
    ///
    /// Recoverable errors concern a single file or directory and never
    /// stop the scan.
    #[inline]
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::Read { .. } | Self::Metadata { .. } | Self::NonUtf8Path(_) | Self::Walk(_)
        )
    }

    /// Returns `true` if this error is fatal (scanning should stop).
    #[inline]
    #[must_use]
    pub const fn is_fatal(&self) -> bool {
        !self.is_recoverable()
    }

    /// Returns the file path associated with this error, if any.
    #[must_use]
    pub fn path(&self) -> Option<&Utf8PathBuf> {
        match self {
            Self::Read { path, .. } | Self::Metadata { path, .. } => Some(path),
            Self::NonUtf8Path(_)
            | Self::Walk(_)
            | Self::Report(_)
            | Self::Config(_)
            | Self::Interrupted { .. } => None,
        }
    }

    /// Returns the text recorded in the report for a per-file failure.
    ///
    /// This is the underlying cause only, without the path, since the path
    /// already has its own column.
    #[must_use]
    pub fn reason(&self) -> String {
        match self {
            Self::Read { source, .. } | Self::Metadata { source, .. } => source.to_string(),
            Self::NonUtf8Path(_) => "path is not valid UTF-8".to_owned(),
            other => other.to_string(),
        }
    }
}
