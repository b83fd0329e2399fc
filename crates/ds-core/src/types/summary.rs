//! Final counters of a scan.

use serde::{Deserialize, Serialize};

/// Outcome counts of one completed scan.
///
/// Returned by the scanner once traversal finishes. Nothing outlives the
/// process; the value is only printed and optionally serialized.
///
/// # Examples
///
/// ```
/// use ds_core::ScanSummary;
///
/// let summary = ScanSummary { files_processed: 9, errors: 1 };
/// assert_eq!(summary.total(), 10);
/// assert!((summary.success_rate() - 90.0).abs() < 0.1);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ScanSummary {
    /// Number of files hashed successfully.
    pub files_processed: u64,
    /// Number of files that produced an error record.
    pub errors: u64,
}

impl ScanSummary {
    /// Returns the number of records emitted.
    #[inline]
    #[must_use]
    pub const fn total(&self) -> u64 {
        self.files_processed + self.errors
    }

    /// Returns the share of successful records as a percentage.
    ///
    /// Returns 100.0 when no records were emitted.
    #[must_use]
    #[allow(clippy::cast_precision_loss)] // Acceptable for statistics display
    pub fn success_rate(&self) -> f64 {
        let total = self.total();
        if total == 0 {
            return 100.0;
        }

        (self.files_processed as f64 / total as f64) * 100.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_total() {
        let summary = ScanSummary {
            files_processed: 3,
            errors: 2,
        };
        assert_eq!(summary.total(), 5);
    }

    #[test]
    fn test_summary_success_rate() {
        assert!((ScanSummary::default().success_rate() - 100.0).abs() < f64::EPSILON);

        let summary = ScanSummary {
            files_processed: 95,
            errors: 5,
        };
        assert!((summary.success_rate() - 95.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_summary_serialization() {
        let summary = ScanSummary {
            files_processed: 9,
            errors: 1,
        };
        let json = serde_json::to_string(&summary).expect("Serialization failed");
        assert_eq!(json, r#"{"files_processed":9,"errors":1}"#);

        let parsed: ScanSummary = serde_json::from_str(&json).expect("Deserialization failed");
        assert_eq!(parsed, summary);
    }
}
