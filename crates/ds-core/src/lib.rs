//! Core types, configuration, and mount resolution for devscan.
//!
//! This crate provides the foundational types used across the workspace:
//!
//! - Domain types ([`ScanRecord`], [`RecordStatus`], [`HexDigest`], [`ScanSummary`])
//! - Configuration structures ([`Config`])
//! - Error types for configuration and device detection ([`ConfigError`])
//! - Mount point detection for MTP devices ([`MountResolver`])

#![deny(clippy::all)]
#![warn(missing_docs)]

pub mod config;
pub mod error;
pub mod mount;
pub mod types;

pub use config::{Config, OutputConfig, ScanSettings};
pub use error::ConfigError;
pub use mount::{MountResolver, MtpMountResolver};
pub use types::{HexDigest, NOT_AVAILABLE, RecordStatus, ScanRecord, ScanSummary};
