//! Domain types for devscan.
//!
//! # Module Organization
//!
//! - [`digest`] - Hex-encoded content digests
//! - [`record`] - Per-file report rows and their status
//! - [`summary`] - Final counters of a scan
//!
//! All public types are re-exported at this module level and at the crate
//! root:
//!
//! ```
//! use ds_core::{HexDigest, RecordStatus, ScanRecord, ScanSummary};
//! ```

mod digest;
mod record;
mod summary;

pub use digest::HexDigest;
pub use record::{NOT_AVAILABLE, RecordStatus, ScanRecord};
pub use summary::ScanSummary;
