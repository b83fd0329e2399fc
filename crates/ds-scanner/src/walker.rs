//! Directory traversal for device inventories.
//!
//! This module provides [`FileWalker`], which uses the `ignore` crate to walk
//! a mounted device depth-first, and [`FileWalk`], the lazy iterator it
//! produces.
//!
//! # Traversal Policy
//!
//! - Every regular file is yielded, including hidden files and files a
//!   `.gitignore` would exclude
//! - Directories, FIFOs, sockets and device nodes are never yielded
//! - Symbolic links are never followed for traversal; a link whose target is
//!   a regular file is yielded at the link's own path, and so is a dangling
//!   link, so it shows up in the report as an error instead of vanishing
//! - A directory that cannot be listed is logged and skipped
//! - Non-UTF-8 paths are surfaced as [`ScanError::NonUtf8Path`] items
//!
//! # Examples
//!
//! ```ignore
//! use ds_scanner::FileWalker;
//! use camino::Utf8Path;
//!
//! let walker = FileWalker::new(Utf8Path::new("/run/user/1000/gvfs/mtp:host=Pixel"))?;
//!
//! for item in walker.walk() {
//!     match item {
//!         Ok(path) => println!("Found: {path}"),
//!         Err(e) => eprintln!("Unusable entry: {e}"),
//!     }
//! }
//! ```

use std::fs;

use camino::{Utf8Path, Utf8PathBuf};
use ignore::{DirEntry, WalkBuilder};
use tracing::{debug, warn};

use crate::error::ScanError;

/// A file walker that discovers every regular file under a root directory.
///
/// # Design
///
/// Walking is pull-based: [`walk()`](Self::walk) returns an iterator that
/// reads directories only as items are requested, so memory use stays
/// proportional to tree depth rather than tree size.
///
/// # Examples
///
/// ```ignore
/// use ds_scanner::FileWalker;
/// use camino::Utf8Path;
///
/// let walker = FileWalker::new(Utf8Path::new("/media/alice/PHONE"))?.with_sorted(true);
/// let count = walker.walk().filter(Result::is_ok).count();
/// println!("Found {count} files");
/// ```
#[derive(Debug, Clone)]
pub struct FileWalker {
    /// The root directory to walk.
    root: Utf8PathBuf,
    /// Whether siblings are visited in file-name order.
    sorted: bool,
}

impl FileWalker {
    /// Creates a new file walker for the given root directory.
    ///
    /// # Errors
    ///
    /// Returns [`ScanError::Config`] if the root path doesn't exist or
    /// isn't a directory.
    pub fn new(root: &Utf8Path) -> Result<Self, ScanError> {
        if !root.exists() {
            return Err(ScanError::config(format!(
                "root path does not exist: {root}"
            )));
        }
        if !root.is_dir() {
            return Err(ScanError::config(format!(
                "root path is not a directory: {root}"
            )));
        }

        Ok(Self {
            root: root.to_owned(),
            sorted: false,
        })
    }

    /// Configures whether siblings are visited in file-name order.
    ///
    /// By default entries come in whatever order the filesystem lists them.
    #[must_use]
    pub const fn with_sorted(mut self, sorted: bool) -> Self {
        self.sorted = sorted;
        self
    }

    /// Starts a fresh traversal from the root.
    ///
    /// Each call begins again from scratch; a [`FileWalk`] cannot be resumed
    /// once dropped.
    #[must_use]
    pub fn walk(&self) -> FileWalk {
        FileWalk {
            inner: self.build_walker(),
        }
    }

    /// Builds the ignore walker with every filter disabled.
    fn build_walker(&self) -> ignore::Walk {
        let mut builder = WalkBuilder::new(&self.root);
        builder
            // An inventory lists everything: no hidden or ignore-file filtering
            .standard_filters(false)
            // Symlinked directories could form cycles
            .follow_links(false);

        if self.sorted {
            builder.sort_by_file_name(|a, b| a.cmp(b));
        }

        builder.build()
    }

    /// Returns the root directory being walked.
    #[inline]
    #[must_use]
    pub fn root(&self) -> &Utf8Path {
        &self.root
    }
}

/// Lazy depth-first sequence of regular files under a root.
///
/// Owns the in-progress directory stack; dropping it ends the traversal.
pub struct FileWalk {
    inner: ignore::Walk,
}

impl Iterator for FileWalk {
    type Item = Result<Utf8PathBuf, ScanError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let entry = match self.inner.next()? {
                Ok(entry) => entry,
                Err(e) => {
                    let error = ScanError::from(e);
                    warn!(error = %error, "Skipping unreadable directory");
                    continue;
                }
            };

            if !is_regular_file(&entry) {
                continue;
            }

            return Some(
                Utf8PathBuf::from_path_buf(entry.into_path()).map_err(ScanError::NonUtf8Path),
            );
        }
    }
}

impl std::fmt::Debug for FileWalk {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileWalk").finish_non_exhaustive()
    }
}

/// Regular files, plus symlinks that resolve to one or to nothing at all.
///
/// A dangling link fails the size query later and becomes an error record.
fn is_regular_file(entry: &DirEntry) -> bool {
    match entry.file_type() {
        Some(ft) if ft.is_file() => true,
        Some(ft) if ft.is_symlink() => match fs::metadata(entry.path()) {
            Ok(meta) if meta.is_file() => true,
            Ok(_) => {
                debug!(path = %entry.path().display(), "Skipping symlink to non-file");
                false
            }
            Err(_) => true,
        },
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn utf8_root(dir: &TempDir) -> Utf8PathBuf {
        Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).expect("temp path is UTF-8")
    }

    fn write(root: &Utf8Path, relative: &str, contents: &str) {
        let path = root.join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("Failed to create parent");
        }
        fs::write(&path, contents).expect("Failed to write file");
    }

    fn relative_paths(walker: &FileWalker) -> Vec<String> {
        let mut paths: Vec<String> = walker
            .walk()
            .map(|item| {
                let path = item.expect("UTF-8 path");
                path.strip_prefix(walker.root())
                    .expect("path under root")
                    .as_str()
                    .to_owned()
            })
            .collect();
        paths.sort();
        paths
    }

    #[test]
    fn test_walk_yields_every_regular_file_once() {
        let dir = TempDir::new().expect("Failed to create temp directory");
        let root = utf8_root(&dir);
        write(&root, "a.txt", "a");
        write(&root, "DCIM/Camera/IMG_0001.jpg", "jpg");
        write(&root, "DCIM/Camera/IMG_0002.jpg", "jpg");
        write(&root, "Music/empty.mp3", "");
        fs::create_dir_all(root.join("Download/empty_dir")).expect("Failed to create dir");

        let walker = FileWalker::new(&root).expect("valid root");
        assert_eq!(
            relative_paths(&walker),
            vec![
                "DCIM/Camera/IMG_0001.jpg",
                "DCIM/Camera/IMG_0002.jpg",
                "Music/empty.mp3",
                "a.txt",
            ]
        );
    }

    #[test]
    fn test_walk_includes_hidden_and_ignored_files() {
        let dir = TempDir::new().expect("Failed to create temp directory");
        let root = utf8_root(&dir);
        write(&root, ".gitignore", "*.log\n");
        write(&root, "app.log", "log");
        write(&root, ".thumbnails/0001.jpg", "thumb");

        let walker = FileWalker::new(&root).expect("valid root");
        assert_eq!(
            relative_paths(&walker),
            vec![".gitignore", ".thumbnails/0001.jpg", "app.log"]
        );
    }

    #[test]
    fn test_sorted_walk_is_depth_first_in_name_order() {
        let dir = TempDir::new().expect("Failed to create temp directory");
        let root = utf8_root(&dir);
        write(&root, "d.txt", "d");
        write(&root, "b/c.txt", "c");
        write(&root, "a.txt", "a");

        let walker = FileWalker::new(&root).expect("valid root").with_sorted(true);
        let order: Vec<Utf8PathBuf> = walker
            .walk()
            .map(|item| item.expect("UTF-8 path"))
            .collect();
        assert_eq!(
            order,
            vec![root.join("a.txt"), root.join("b/c.txt"), root.join("d.txt")]
        );
    }

    #[test]
    fn test_walk_restarts_from_scratch() {
        let dir = TempDir::new().expect("Failed to create temp directory");
        let root = utf8_root(&dir);
        write(&root, "one.txt", "1");
        write(&root, "sub/two.txt", "2");

        let walker = FileWalker::new(&root).expect("valid root");
        let mut partial = walker.walk();
        assert!(partial.next().is_some());
        drop(partial);

        assert_eq!(walker.walk().count(), 2);
        assert_eq!(walker.walk().count(), 2);
    }

    #[test]
    fn test_new_rejects_missing_root() {
        let result = FileWalker::new(Utf8Path::new("/nonexistent/path/that/does/not/exist"));
        assert!(matches!(result, Err(ScanError::Config(_))));
    }

    #[test]
    fn test_new_rejects_file_root() {
        let dir = TempDir::new().expect("Failed to create temp directory");
        let root = utf8_root(&dir);
        write(&root, "file.txt", "x");

        let result = FileWalker::new(&root.join("file.txt"));
        assert!(matches!(result, Err(ScanError::Config(msg)) if msg.contains("not a directory")));
    }

    #[cfg(unix)]
    #[test]
    fn test_symlinked_directories_are_not_followed() {
        use std::os::unix::fs::symlink;

        let dir = TempDir::new().expect("Failed to create temp directory");
        let root = utf8_root(&dir);
        write(&root, "real/photo.jpg", "jpg");
        symlink(root.join("real"), root.join("loop")).expect("Failed to create symlink");
        symlink(root.join("real/photo.jpg"), root.join("alias.jpg"))
            .expect("Failed to create symlink");
        symlink(root.join("missing.jpg"), root.join("dangling.jpg"))
            .expect("Failed to create symlink");

        let walker = FileWalker::new(&root).expect("valid root");
        assert_eq!(
            relative_paths(&walker),
            vec!["alias.jpg", "dangling.jpg", "real/photo.jpg"]
        );
    }

    #[test]
    fn test_directory_removed_before_listing_does_not_stop_walk() {
        let dir = TempDir::new().expect("Failed to create temp directory");
        let root = utf8_root(&dir);
        write(&root, "a/one.txt", "1");
        write(&root, "b/two.txt", "2");
        write(&root, "c/three.txt", "3");

        let walker = FileWalker::new(&root).expect("valid root").with_sorted(true);
        let mut walk = walker.walk();
        let first = walk.next().expect("first item").expect("UTF-8 path");
        assert_eq!(first, root.join("a/one.txt"));

        // `b` is already known to the walk but has not been listed yet
        fs::remove_dir_all(root.join("b")).expect("Failed to remove directory");

        let rest: Vec<Utf8PathBuf> = walk.map(|item| item.expect("UTF-8 path")).collect();
        assert_eq!(rest, vec![root.join("c/three.txt")]);
    }

    #[cfg(unix)]
    #[test]
    #[allow(clippy::print_stderr)]
    fn test_unreadable_directory_does_not_stop_walk() {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().expect("Failed to create temp directory");
        let root = utf8_root(&dir);
        write(&root, "aaa/before.txt", "1");
        write(&root, "locked/secret.txt", "2");
        write(&root, "zzz/after.txt", "3");

        let locked = root.join("locked");
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o000))
            .expect("Failed to lock directory");

        // Privileged users can list the directory anyway
        if fs::read_dir(&locked).is_ok() {
            fs::set_permissions(&locked, fs::Permissions::from_mode(0o755))
                .expect("Failed to unlock directory");
            eprintln!("skipped: permission bits are not enforced for this user");
            return;
        }

        let walker = FileWalker::new(&root).expect("valid root");
        let paths = relative_paths(&walker);

        fs::set_permissions(&locked, fs::Permissions::from_mode(0o755))
            .expect("Failed to unlock directory");

        assert_eq!(paths, vec!["aaa/before.txt", "zzz/after.txt"]);
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn test_non_utf8_name_is_surfaced() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let dir = TempDir::new().expect("Failed to create temp directory");
        let name = OsStr::from_bytes(b"bad\xffname.bin");
        fs::write(dir.path().join(name), b"x").expect("Failed to write file");

        let walker = FileWalker::new(&utf8_root(&dir)).expect("valid root");
        let items: Vec<_> = walker.walk().collect();
        assert_eq!(items.len(), 1);
        assert!(matches!(items[0], Err(ScanError::NonUtf8Path(_))));
    }
}
