//! Streaming report output.
//!
//! The [`Scanner`](crate::Scanner) hands every [`ScanRecord`] to a
//! [`RecordSink`] as soon as it is built. [`CsvReportWriter`] is the sink
//! used by the CLI; `Vec<ScanRecord>` collects records in memory.
//!
//! # Report Format
//!
//! ```text
//! File Path,MD5 Hash,File Size (bytes),Status
//! /media/phone/DCIM/a.jpg,5eb63bbbe01eeed093cb22bb8f5acdc3,11,Success
//! /media/phone/DCIM/b.jpg,N/A,2048,Error - Could not read file
//! ```
//!
//! Fields containing a comma, quote or line break are quoted, with inner
//! quotes doubled. Rows end with `\r\n`.

use std::borrow::Cow;
use std::fs::File;
use std::io::{self, BufWriter, Write};

use camino::Utf8Path;
use ds_core::ScanRecord;
use tracing::debug;

use crate::error::ScanError;

/// Column headers, in report order.
pub const REPORT_COLUMNS: [&str; 4] = ["File Path", "MD5 Hash", "File Size (bytes)", "Status"];

/// Destination for scan records.
///
/// Errors returned here are fatal for the scan: a report that cannot be
/// written is not worth continuing for.
pub trait RecordSink {
    /// Persists one record.
    fn write_record(&mut self, record: &ScanRecord) -> io::Result<()>;

    /// Pushes any buffered records to their destination.
    fn flush(&mut self) -> io::Result<()>;
}

impl<S: RecordSink + ?Sized> RecordSink for &mut S {
    fn write_record(&mut self, record: &ScanRecord) -> io::Result<()> {
        (**self).write_record(record)
    }

    fn flush(&mut self) -> io::Result<()> {
        (**self).flush()
    }
}

impl RecordSink for Vec<ScanRecord> {
    fn write_record(&mut self, record: &ScanRecord) -> io::Result<()> {
        self.push(record.clone());
        Ok(())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// CSV report writer.
///
/// The header row is written and flushed on construction, so even a scan
/// that finds nothing, or a process killed mid-scan, leaves a valid report.
///
/// # Examples
///
/// ```
/// use ds_core::ScanRecord;
/// use ds_scanner::{CsvReportWriter, RecordSink};
///
/// let mut writer = CsvReportWriter::new(Vec::new())?;
/// writer.write_record(&ScanRecord::other_error("x.bin", "Permission denied"))?;
///
/// let csv = String::from_utf8(writer.into_inner()?).unwrap();
/// assert!(csv.ends_with("x.bin,N/A,N/A,Error - Permission denied\r\n"));
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug)]
pub struct CsvReportWriter<W: Write> {
    writer: W,
    written: u64,
}

impl CsvReportWriter<BufWriter<File>> {
    /// Creates (or truncates) the report file and writes the header.
    ///
    /// # Errors
    ///
    /// Returns [`ScanError::Report`] if the file cannot be created or the
    /// header cannot be written.
    pub fn create(path: &Utf8Path) -> Result<Self, ScanError> {
        let file = File::create(path).map_err(ScanError::Report)?;
        debug!(path = %path, "Opened report file");

        Self::new(BufWriter::new(file))
    }
}

impl<W: Write> CsvReportWriter<W> {
    /// Wraps `writer`, then writes and flushes the header row.
    ///
    /// # Errors
    ///
    /// Returns [`ScanError::Report`] if the header cannot be written.
    pub fn new(writer: W) -> Result<Self, ScanError> {
        let mut report = Self { writer, written: 0 };
        report.write_row(REPORT_COLUMNS).map_err(ScanError::Report)?;
        report.writer.flush().map_err(ScanError::Report)?;
        Ok(report)
    }

    /// Returns the number of data rows written so far.
    #[inline]
    #[must_use]
    pub const fn records_written(&self) -> u64 {
        self.written
    }

    /// Flushes and returns the underlying writer.
    ///
    /// # Errors
    ///
    /// Returns [`ScanError::Report`] if flushing fails.
    pub fn into_inner(mut self) -> Result<W, ScanError> {
        self.writer.flush().map_err(ScanError::Report)?;
        Ok(self.writer)
    }

    fn write_row(&mut self, fields: [&str; 4]) -> io::Result<()> {
        for (index, field) in fields.into_iter().enumerate() {
            if index > 0 {
                self.writer.write_all(b",")?;
            }
            self.writer.write_all(escape_csv(field).as_bytes())?;
        }
        self.writer.write_all(b"\r\n")
    }
}

impl<W: Write> RecordSink for CsvReportWriter<W> {
    fn write_record(&mut self, record: &ScanRecord) -> io::Result<()> {
        let size = record.size_column();
        let status = record.status().label();
        self.write_row([record.path().as_str(), record.digest_column(), &*size, &*status])?;
        self.written += 1;
        Ok(())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.writer.flush()
    }
}

/// Escapes a string for CSV output.
fn escape_csv(s: &str) -> Cow<'_, str> {
    if s.contains([',', '"', '\n', '\r']) {
        Cow::Owned(format!("\"{}\"", s.replace('"', "\"\"")))
    } else {
        Cow::Borrowed(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ds_core::HexDigest;
    use tempfile::TempDir;

    fn render(records: &[ScanRecord]) -> String {
        let mut writer = CsvReportWriter::new(Vec::new()).expect("header");
        for record in records {
            writer.write_record(record).expect("write");
        }
        String::from_utf8(writer.into_inner().expect("flush")).expect("UTF-8 output")
    }

    #[test]
    fn test_header_row() {
        let output = render(&[]);
        insta::assert_snapshot!(output.trim_end(), @"File Path,MD5 Hash,File Size (bytes),Status");
    }

    #[test]
    fn test_success_row() {
        let digest = HexDigest::parse("5eb63bbbe01eeed093cb22bb8f5acdc3").expect("valid digest");
        let output = render(&[ScanRecord::success("/media/phone/a.txt", digest, 11)]);
        let row = output.lines().nth(1).expect("data row");
        insta::assert_snapshot!(row, @"/media/phone/a.txt,5eb63bbbe01eeed093cb22bb8f5acdc3,11,Success");
    }

    #[test]
    fn test_error_rows_use_placeholders() {
        let output = render(&[
            ScanRecord::read_error("locked.bin", 2048),
            ScanRecord::other_error("gone.bin", "No such file or directory (os error 2)"),
        ]);
        let rows: Vec<&str> = output.lines().skip(1).collect();
        assert_eq!(
            rows,
            vec![
                "locked.bin,N/A,2048,Error - Could not read file",
                "gone.bin,N/A,N/A,Error - No such file or directory (os error 2)",
            ]
        );
    }

    #[test]
    fn test_rows_end_with_crlf() {
        let output = render(&[ScanRecord::read_error("a", 1)]);
        assert_eq!(output.matches("\r\n").count(), 2);
    }

    #[test]
    fn test_fields_are_quoted_when_needed() {
        assert_eq!(escape_csv("plain.jpg"), "plain.jpg");
        assert_eq!(escape_csv("a,b.jpg"), "\"a,b.jpg\"");
        assert_eq!(escape_csv("say \"hi\".txt"), "\"say \"\"hi\"\".txt\"");
        assert_eq!(escape_csv("line\nbreak"), "\"line\nbreak\"");

        let output = render(&[ScanRecord::read_error("Photos, 2024/x.jpg", 5)]);
        assert!(output.contains("\"Photos, 2024/x.jpg\",N/A,5,"));
    }

    #[test]
    fn test_records_written() {
        let mut writer = CsvReportWriter::new(Vec::new()).expect("header");
        assert_eq!(writer.records_written(), 0);
        writer
            .write_record(&ScanRecord::read_error("a", 1))
            .expect("write");
        writer
            .write_record(&ScanRecord::read_error("b", 2))
            .expect("write");
        assert_eq!(writer.records_written(), 2);
    }

    #[test]
    fn test_vec_sink_collects_records() {
        let mut sink: Vec<ScanRecord> = Vec::new();
        let record = ScanRecord::other_error("x", "boom");
        sink.write_record(&record).expect("write");
        RecordSink::flush(&mut sink).expect("flush");
        assert_eq!(sink, vec![record]);
    }

    #[test]
    fn test_create_writes_header_to_file() {
        let dir = TempDir::new().expect("Failed to create temp directory");
        let path = Utf8Path::from_path(dir.path())
            .expect("temp path is UTF-8")
            .join("report.csv");

        let writer = CsvReportWriter::create(&path).expect("create report");
        drop(writer.into_inner().expect("flush"));

        let contents = std::fs::read_to_string(&path).expect("read report");
        assert_eq!(contents, "File Path,MD5 Hash,File Size (bytes),Status\r\n");
    }

    #[test]
    fn test_header_reaches_disk_before_any_record() {
        let dir = TempDir::new().expect("Failed to create temp directory");
        let path = Utf8Path::from_path(dir.path())
            .expect("temp path is UTF-8")
            .join("report.csv");

        let mut writer = CsvReportWriter::create(&path).expect("create report");
        writer
            .write_record(&ScanRecord::read_error("buffered.bin", 1))
            .expect("write");

        // The writer is still open; the row may sit in the buffer but the
        // header must already be on disk.
        let contents = std::fs::read_to_string(&path).expect("read report");
        assert!(contents.starts_with("File Path,MD5 Hash,File Size (bytes),Status\r\n"));
        drop(writer);
    }

    #[test]
    fn test_create_in_missing_directory_fails() {
        let result = CsvReportWriter::create(Utf8Path::new("/nonexistent/dir/report.csv"));
        assert!(matches!(result, Err(ScanError::Report(_))));
    }
}
