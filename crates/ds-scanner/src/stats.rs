//! Live scan counters.
//!
//! This module provides [`ScanStats`], the counters a [`Scanner`](crate::Scanner)
//! bumps after every file. Other threads (a progress reporter, for example)
//! can read them at any time through [`snapshot()`](ScanStats::snapshot).
//!
//! # Thread Safety
//!
//! All counters use [`AtomicU64`] with [`Relaxed`](std::sync::atomic::Ordering::Relaxed)
//! ordering. The values are for display and only ever grow during a scan.
//!
//! # Examples
//!
//! ```
//! use ds_scanner::ScanStats;
//!
//! let stats = ScanStats::new();
//! stats.increment_processed();
//! stats.increment_errors();
//!
//! let snapshot = stats.snapshot();
//! println!("{} hashed, {} failed", snapshot.files_processed, snapshot.errors);
//! ```

use std::sync::atomic::{AtomicU64, Ordering};

use ds_core::ScanSummary;

/// Atomic counters for scan progress.
#[derive(Debug, Default)]
pub struct ScanStats {
    /// Number of files hashed successfully.
    processed: AtomicU64,
    /// Number of files that produced an error record.
    errors: AtomicU64,
}

impl ScanStats {
    /// Creates a new [`ScanStats`] with all counters at zero.
    ///
    /// # Examples
    ///
    /// ```
    /// use ds_scanner::ScanStats;
    ///
    /// let stats = ScanStats::new();
    /// assert_eq!(stats.snapshot().total(), 0);
    /// ```
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Increments the successfully-hashed counter.
    #[inline]
    pub fn increment_processed(&self) {
        self.processed.fetch_add(1, Ordering::Relaxed);
    }

    /// Increments the error counter.
    #[inline]
    pub fn increment_errors(&self) {
        self.errors.fetch_add(1, Ordering::Relaxed);
    }

    /// Returns a point-in-time copy of the counters.
    ///
    /// Due to relaxed ordering the two values may be read a file apart
    /// while a scan is running. Once the scan returns they are exact.
    #[must_use]
    pub fn snapshot(&self) -> ScanSummary {
        ScanSummary {
            files_processed: self.processed.load(Ordering::Relaxed),
            errors: self.errors.load(Ordering::Relaxed),
        }
    }

    /// Resets all counters to zero.
    ///
    /// Called at the start of every scan.
    pub fn reset(&self) {
        self.processed.store(0, Ordering::Relaxed);
        self.errors.store(0, Ordering::Relaxed);
    }
}
