//! Sequential scan-and-hash engine for device inventories.
//!
//! This crate walks a mounted device, hashes every regular file with MD5 and
//! streams one [`ScanRecord`] per file to a [`RecordSink`], typically a
//! [`CsvReportWriter`].
//!
//! # Overview
//!
//! The main entry point is [`Scanner`], which combines:
//!
//! - [`FileWalker`]: Lazy depth-first traversal built on the `ignore` crate
//! - [`Md5Hasher`]: Chunked streaming MD5 behind the [`FileDigester`] trait
//! - [`ScanStats`]: Atomic counters for progress reporting
//! - [`RecordSink`]: Where each record goes the moment it is built
//!
//! # Example
//!
//! ```ignore
//! use ds_scanner::{CsvReportWriter, ScanConfig, Scanner};
//! use camino::Utf8Path;
//!
//! let scanner = Scanner::new(ScanConfig::new(Utf8Path::new("/media/alice/PHONE")))?;
//! let mut report = CsvReportWriter::create(Utf8Path::new("inventory.csv"))?;
//!
//! let summary = scanner.scan(&mut report)?;
//! println!("{} hashed, {} errors", summary.files_processed, summary.errors);
//! ```
//!
//! # Cancellation
//!
//! [`Scanner::scan_until`] checks a [`CancellationToken`] before each file,
//! and the digester checks it again before each chunk. Once it is cancelled
//! the file being hashed is abandoned without a row, the sink is flushed and
//! the scan returns [`ScanError::Interrupted`]; rows already written stay in
//! the report.
//!
//! # Architecture
//!
//! ```text
//! Scanner (main entry point)
//!     │
//!     ├── FileWalker (one path at a time)
//!     │       │
//!     │       └── WalkBuilder (ignore crate, all filters off)
//!     │
//!     ├── FileDigester (Md5Hasher, 8 KiB chunks)
//!     │
//!     ├── ScanStats (atomic counters)
//!     │
//!     └── RecordSink (CsvReportWriter / Vec<ScanRecord>)
//! ```
//!
//! # Performance
//!
//! - **Memory**: O(tree depth) for traversal, O(chunk size) for hashing
//! - **CPU**: one file at a time; device I/O dominates

#![deny(clippy::all)]
#![warn(missing_docs)]

mod error;
mod hasher;
mod report;
mod stats;
mod walker;

pub use error::ScanError;
pub use hasher::{FileDigester, Md5Hasher};
pub use report::{CsvReportWriter, REPORT_COLUMNS, RecordSink};
pub use stats::ScanStats;
pub use walker::{FileWalk, FileWalker};

use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use camino::{Utf8Path, Utf8PathBuf};
use ds_core::config::DEFAULT_CHUNK_SIZE;
use ds_core::{ScanRecord, ScanSummary};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Configuration for the scanner.
///
/// # Examples
///
/// ```
/// use ds_scanner::ScanConfig;
/// use camino::Utf8Path;
///
/// let config = ScanConfig::new(Utf8Path::new("/media/alice/PHONE"))
///     .with_chunk_size(64 * 1024)
///     .with_sorted(true);
/// assert_eq!(config.chunk_size, 65_536);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanConfig {
    /// Root directory to scan.
    pub root: Utf8PathBuf,
    /// Bytes requested per read while hashing.
    pub chunk_size: usize,
    /// Whether siblings are visited in file-name order.
    pub sorted: bool,
}

impl ScanConfig {
    /// Creates a new scan configuration with the given root directory.
    #[must_use]
    pub fn new(root: &Utf8Path) -> Self {
        Self {
            root: root.to_owned(),
            chunk_size: DEFAULT_CHUNK_SIZE,
            sorted: false,
        }
    }

    /// Sets the hashing chunk size. Zero is rejected by [`Scanner::new`].
    #[must_use]
    pub const fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size;
        self
    }

    /// Configures whether siblings are visited in file-name order.
    #[must_use]
    pub const fn with_sorted(mut self, sorted: bool) -> Self {
        self.sorted = sorted;
        self
    }
}

/// The scan orchestrator.
///
/// Pulls paths from a [`FileWalker`] one at a time, queries each file's
/// size, hashes it and hands the resulting [`ScanRecord`] to a sink. A
/// failure on one file becomes an error record; only sink failures and
/// cancellation end a scan early.
///
/// # Cloning
///
/// Clones share the same [`ScanStats`], so a clone moved into a blocking
/// task still reports progress to observers holding
/// [`stats_handle()`](Self::stats_handle).
///
/// # Examples
///
/// ```ignore
/// use ds_scanner::{ScanConfig, Scanner};
/// use ds_core::ScanRecord;
///
/// let scanner = Scanner::new(ScanConfig::new(Utf8Path::new("/media/alice/PHONE")))?;
/// let mut records: Vec<ScanRecord> = Vec::new();
/// let summary = scanner.scan(&mut records)?;
/// assert_eq!(summary.total(), records.len() as u64);
/// ```
#[derive(Debug, Clone)]
pub struct Scanner<D = Md5Hasher> {
    /// Scanner configuration.
    config: ScanConfig,
    /// Traversal over the configured root.
    walker: FileWalker,
    /// Content hasher.
    digester: D,
    /// Counters (shared via Arc for cloning).
    stats: Arc<ScanStats>,
}

impl Scanner<Md5Hasher> {
    /// Creates a scanner that hashes with [`Md5Hasher`].
    ///
    /// # Errors
    ///
    /// Returns [`ScanError::Config`] if the root doesn't exist, isn't a
    /// directory, or the chunk size is zero.
    pub fn new(config: ScanConfig) -> Result<Self, ScanError> {
        let hasher = Md5Hasher::with_chunk_size(config.chunk_size)?;
        Self::with_digester(config, hasher)
    }
}

impl<D: FileDigester> Scanner<D> {
    /// Creates a scanner that hashes with a custom [`FileDigester`].
    ///
    /// `config.chunk_size` is ignored; the digester decides how it reads.
    ///
    /// # Errors
    ///
    /// Returns [`ScanError::Config`] if the root doesn't exist or isn't a
    /// directory.
    pub fn with_digester(config: ScanConfig, digester: D) -> Result<Self, ScanError> {
        let walker = FileWalker::new(&config.root)?.with_sorted(config.sorted);

        debug!(
            root = %config.root,
            chunk_size = config.chunk_size,
            sorted = config.sorted,
            "Creating scanner"
        );

        Ok(Self {
            config,
            walker,
            digester,
            stats: Arc::new(ScanStats::new()),
        })
    }

    /// Scans the whole tree, writing one record per file to `sink`.
    ///
    /// Equivalent to [`scan_until`](Self::scan_until) with a token that is
    /// never cancelled.
    ///
    /// # Errors
    ///
    /// Returns [`ScanError::Report`] if the sink fails.
    pub fn scan<S: RecordSink>(&self, sink: S) -> Result<ScanSummary, ScanError> {
        self.scan_until(sink, &CancellationToken::new())
    }

    /// Scans the tree until it is exhausted or `cancel` fires.
    ///
    /// Counters are reset first. Every record is forwarded to `sink` as soon
    /// as it is built, in walk order, and the sink is flushed before
    /// returning on every path except a sink failure.
    ///
    /// # Errors
    ///
    /// - [`ScanError::Report`] if the sink fails to write or flush
    /// - [`ScanError::Interrupted`] if `cancel` was triggered; the error
    ///   carries the number of records already written
    pub fn scan_until<S: RecordSink>(
        &self,
        mut sink: S,
        cancel: &CancellationToken,
    ) -> Result<ScanSummary, ScanError> {
        info!(root = %self.config.root, "Starting scan");

        self.stats.reset();
        let mut written: u64 = 0;

        for item in self.walker.walk() {
            if cancel.is_cancelled() {
                return Self::interrupted(&mut sink, written);
            }

            let record = match item {
                Ok(path) => match self.process(path, cancel) {
                    Some(record) => record,
                    None => return Self::interrupted(&mut sink, written),
                },
                Err(ScanError::NonUtf8Path(raw)) => self.non_utf8(raw),
                Err(error) => {
                    warn!(error = %error, "Skipping entry");
                    continue;
                }
            };

            sink.write_record(&record).map_err(ScanError::Report)?;
            written += 1;
        }

        sink.flush().map_err(ScanError::Report)?;

        let summary = self.stats.snapshot();
        info!(
            files_processed = summary.files_processed,
            errors = summary.errors,
            "Scan completed"
        );

        Ok(summary)
    }

    /// Builds the record for one discovered file.
    ///
    /// The size is queried before hashing so a file that disappears in
    /// between still reports the size it had. Returns `None` if `cancel`
    /// fired while the file was being hashed.
    fn process(&self, path: Utf8PathBuf, cancel: &CancellationToken) -> Option<ScanRecord> {
        let size = match fs::metadata(&path) {
            Ok(meta) => meta.len(),
            Err(source) => {
                let error = ScanError::metadata(path.clone(), source);
                warn!(path = %path, error = %error, "Failed to query file size");
                self.stats.increment_errors();
                return Some(ScanRecord::other_error(path, error.reason()));
            }
        };

        let record = match self.digester.digest_file(&path, cancel) {
            Ok(Some(digest)) => {
                debug!(path = %path, digest = %digest, size, "Hashed file");
                self.stats.increment_processed();
                ScanRecord::success(path, digest, size)
            }
            Ok(None) => {
                debug!(path = %path, "Abandoned file after cancellation");
                return None;
            }
            Err(error) => {
                warn!(path = %path, error = %error, "Failed to hash file");
                self.stats.increment_errors();
                ScanRecord::read_error(path, size)
            }
        };

        Some(record)
    }

    /// Flushes what was written so far and reports the interruption.
    fn interrupted<S: RecordSink>(sink: &mut S, written: u64) -> Result<ScanSummary, ScanError> {
        sink.flush().map_err(ScanError::Report)?;
        warn!(written, "Scan interrupted");
        Err(ScanError::Interrupted { written })
    }
}

impl<D> Scanner<D> {
    /// Builds the error record for a path that isn't valid UTF-8.
    ///
    /// The report shows the name with invalid bytes replaced by U+FFFD.
    fn non_utf8(&self, raw: PathBuf) -> ScanRecord {
        let lossy = raw.to_string_lossy().into_owned();
        let error = ScanError::NonUtf8Path(raw);
        warn!(path = %lossy, error = %error, "Failed to process file");
        self.stats.increment_errors();
        ScanRecord::other_error(lossy, error.reason())
    }

    /// Returns a snapshot of the current counters.
    #[must_use]
    pub fn stats(&self) -> ScanSummary {
        self.stats.snapshot()
    }

    /// Returns a shared handle to the live counters.
    ///
    /// Readers on other threads see the counts grow while a scan runs.
    #[must_use]
    pub fn stats_handle(&self) -> Arc<ScanStats> {
        Arc::clone(&self.stats)
    }

    /// Returns the scanner configuration.
    #[must_use]
    pub const fn config(&self) -> &ScanConfig {
        &self.config
    }
}
