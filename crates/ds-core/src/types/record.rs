//! Per-file report rows.
//!
//! This module provides [`ScanRecord`], one row of the inventory report, and
//! [`RecordStatus`], the outcome classification attached to it.

use std::borrow::Cow;
use std::fmt;

use camino::{Utf8Path, Utf8PathBuf};
use serde::Serialize;

use super::digest::HexDigest;

/// Placeholder written to the report when a digest or size is unavailable.
pub const NOT_AVAILABLE: &str = "N/A";

/// The outcome of processing a single file.
///
/// # Examples
///
/// ```
/// use ds_core::RecordStatus;
///
/// assert_eq!(RecordStatus::Success.label(), "Success");
/// assert_eq!(RecordStatus::ReadError.label(), "Error - Could not read file");
/// assert_eq!(
///     RecordStatus::OtherError("permission denied".to_owned()).label(),
///     "Error - permission denied"
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "kind", content = "reason", rename_all = "snake_case")]
pub enum RecordStatus {
    /// The file was read to the end and hashed.
    Success,

    /// The file could not be opened or read while hashing.
    ReadError,

    /// Any other per-file failure, such as a failed size query.
    ///
    /// Carries a free-text reason.
    OtherError(String),
}

impl RecordStatus {
    /// Returns `true` for [`Success`](Self::Success).
    #[inline]
    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Success)
    }

    /// Returns the text written to the `Status` report column.
    #[must_use]
    pub fn label(&self) -> Cow<'static, str> {
        match self {
            Self::Success => Cow::Borrowed("Success"),
            Self::ReadError => Cow::Borrowed("Error - Could not read file"),
            Self::OtherError(reason) => Cow::Owned(format!("Error - {reason}")),
        }
    }
}

impl fmt::Display for RecordStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label())
    }
}

/// One row of the inventory report.
///
/// Fields are private: a record can only be built through
/// [`success`](Self::success), [`read_error`](Self::read_error) or
/// [`other_error`](Self::other_error), which keeps the digest present
/// exactly when the status is [`RecordStatus::Success`].
///
/// # Examples
///
/// ```
/// use ds_core::{HexDigest, ScanRecord};
///
/// let digest = HexDigest::parse("5eb63bbbe01eeed093cb22bb8f5acdc3").unwrap();
/// let record = ScanRecord::success("DCIM/a.txt", digest, 11);
/// assert!(record.status().is_success());
/// assert_eq!(record.size(), Some(11));
///
/// let failed = ScanRecord::read_error("DCIM/b.txt", 42);
/// assert_eq!(failed.digest_column(), "N/A");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScanRecord {
    path: Utf8PathBuf,
    digest: Option<HexDigest>,
    size: Option<u64>,
    status: RecordStatus,
}

impl ScanRecord {
    /// A file that was fully read and hashed.
    #[must_use]
    pub fn success(path: impl Into<Utf8PathBuf>, digest: HexDigest, size: u64) -> Self {
        Self {
            path: path.into(),
            digest: Some(digest),
            size: Some(size),
            status: RecordStatus::Success,
        }
    }

    /// A file whose size was known but whose contents could not be read.
    #[must_use]
    pub fn read_error(path: impl Into<Utf8PathBuf>, size: u64) -> Self {
        Self {
            path: path.into(),
            digest: None,
            size: Some(size),
            status: RecordStatus::ReadError,
        }
    }

    /// A file that failed before hashing was attempted.
    #[must_use]
    pub fn other_error(path: impl Into<Utf8PathBuf>, reason: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            digest: None,
            size: None,
            status: RecordStatus::OtherError(reason.into()),
        }
    }

    /// Returns the file path as discovered during traversal.
    #[inline]
    #[must_use]
    pub fn path(&self) -> &Utf8Path {
        &self.path
    }

    /// Returns the digest, present only for successful records.
    #[inline]
    #[must_use]
    pub const fn digest(&self) -> Option<&HexDigest> {
        self.digest.as_ref()
    }

    /// Returns the file size in bytes, if it could be queried.
    #[inline]
    #[must_use]
    pub const fn size(&self) -> Option<u64> {
        self.size
    }

    /// Returns the outcome of processing this file.
    #[inline]
    #[must_use]
    pub const fn status(&self) -> &RecordStatus {
        &self.status
    }

    /// Returns the text for the `MD5 Hash` report column.
    #[must_use]
    pub fn digest_column(&self) -> &str {
        self.digest.as_ref().map_or(NOT_AVAILABLE, HexDigest::as_str)
    }

    /// Returns the text for the `File Size (bytes)` report column.
    #[must_use]
    pub fn size_column(&self) -> Cow<'static, str> {
        self.size
            .map_or(Cow::Borrowed(NOT_AVAILABLE), |size| Cow::Owned(size.to_string()))
    }
}
