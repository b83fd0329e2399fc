//! Streaming MD5 hashing of file contents.
//!
//! This module provides [`Md5Hasher`], which feeds a file through an
//! incremental MD5 state in fixed-size chunks, and the [`FileDigester`]
//! trait the [`Scanner`](crate::Scanner) hashes through.
//!
//! Memory use is bounded by the chunk size regardless of file size. The
//! digest does not depend on the chunk size. A [`CancellationToken`] is
//! checked before every chunk, so a cancelled scan never waits for the rest
//! of a large file.
//!
//! # Examples
//!
//! ```
//! use ds_scanner::Md5Hasher;
//!
//! let hasher = Md5Hasher::new();
//! let digest = hasher.hash_reader(&b"hello world"[..]).unwrap();
//! assert_eq!(digest.as_str(), "5eb63bbbe01eeed093cb22bb8f5acdc3");
//! ```

use std::fs::File;
use std::io::{self, Read};

use camino::Utf8Path;
use ds_core::HexDigest;
use ds_core::config::DEFAULT_CHUNK_SIZE;
use md5::{Digest, Md5};
use tokio_util::sync::CancellationToken;

use crate::error::ScanError;

/// Computes the content digest of a file on disk.
///
/// Implementations must either return the digest of the complete contents
/// or fail; a partial digest is never acceptable.
pub trait FileDigester {
    /// Hashes the file at `path`, giving up between chunks once `cancel`
    /// fires.
    ///
    /// Returns `Ok(None)` when the file was abandoned because of
    /// cancellation.
    ///
    /// # Errors
    ///
    /// Returns [`ScanError::Read`] if the file cannot be opened or a read
    /// fails part way through.
    fn digest_file(
        &self,
        path: &Utf8Path,
        cancel: &CancellationToken,
    ) -> Result<Option<HexDigest>, ScanError>;
}

/// Chunked MD5 hasher.
///
/// # Examples
///
/// ```
/// use ds_scanner::Md5Hasher;
///
/// let hasher = Md5Hasher::with_chunk_size(4096)?;
/// assert_eq!(hasher.chunk_size(), 4096);
/// # Ok::<(), ds_scanner::ScanError>(())
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Md5Hasher {
    /// Number of bytes requested per read.
    chunk_size: usize,
}

impl Md5Hasher {
    /// Creates a hasher with the default 8 KiB chunk size.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }

    /// Creates a hasher with a custom chunk size.
    ///
    /// # Errors
    ///
    /// Returns [`ScanError::Config`] if `chunk_size` is zero.
    pub fn with_chunk_size(chunk_size: usize) -> Result<Self, ScanError> {
        if chunk_size == 0 {
            return Err(ScanError::config("chunk size must be greater than zero"));
        }

        Ok(Self { chunk_size })
    }

    /// Returns the number of bytes requested per read.
    #[inline]
    #[must_use]
    pub const fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// Hashes everything `reader` yields until EOF.
    ///
    /// Reads interrupted by a signal (`ErrorKind::Interrupted`) are retried.
    /// Any other read error aborts the whole computation.
    ///
    /// # Errors
    ///
    /// Returns the first non-retryable I/O error from `reader`.
    pub fn hash_reader<R: Read>(&self, reader: R) -> io::Result<HexDigest> {
        self.hash_reader_until(reader, &CancellationToken::new())?
            .ok_or_else(|| io::Error::from(io::ErrorKind::Interrupted))
    }

    /// Like [`hash_reader`](Self::hash_reader), but checks `cancel` before
    /// each chunk and returns `Ok(None)` once it has fired.
    ///
    /// # Errors
    ///
    /// Returns the first non-retryable I/O error from `reader`.
    pub fn hash_reader_until<R: Read>(
        &self,
        mut reader: R,
        cancel: &CancellationToken,
    ) -> io::Result<Option<HexDigest>> {
        let mut state = Md5::new();
        let mut buffer = vec![0u8; self.chunk_size];

        loop {
            if cancel.is_cancelled() {
                return Ok(None);
            }
            let bytes_read = match reader.read(&mut buffer) {
                Ok(0) => break,
                Ok(n) => n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            };
            state.update(&buffer[..bytes_read]);
        }

        Ok(Some(HexDigest::from_bytes(&state.finalize())))
    }
}

impl Default for Md5Hasher {
    fn default() -> Self {
        Self::new()
    }
}

impl FileDigester for Md5Hasher {
    fn digest_file(
        &self,
        path: &Utf8Path,
        cancel: &CancellationToken,
    ) -> Result<Option<HexDigest>, ScanError> {
        let file = File::open(path).map_err(|e| ScanError::read(path, e))?;
        self.hash_reader_until(file, cancel)
            .map_err(|e| ScanError::read(path, e))
    }
}
