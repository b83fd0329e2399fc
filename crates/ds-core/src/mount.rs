//! Mount point detection for MTP-connected devices.
//!
//! The scanner never depends on how the root directory was found. This
//! module provides the [`MountResolver`] seam and [`MtpMountResolver`], a
//! resolver for desktop Linux setups where phones show up through GVFS or
//! under `/media/<user>`.
//!
//! # Search Order
//!
//! 1. GVFS runtime directory (`$XDG_RUNTIME_DIR/gvfs`, or `/run/user/<uid>/gvfs`):
//!    first entry whose name contains `mtp`
//! 2. Legacy GVFS directory (`~/.gvfs`): same rule
//! 3. `/media/<user>`: first entry that is a mount point

use std::fs;

use camino::{Utf8Path, Utf8PathBuf};
use tracing::debug;

/// Finds the directory under which a device's files can be traversed.
pub trait MountResolver {
    /// Returns the mount point of a connected device, if one is found.
    fn find_mount(&self) -> Option<Utf8PathBuf>;
}

/// Resolver for MTP devices exposed by GVFS or mounted under `/media`.
///
/// # Examples
///
/// ```
/// use ds_core::{MountResolver, MtpMountResolver};
///
/// let resolver = MtpMountResolver::new(None, None, None);
/// assert!(resolver.find_mount().is_none());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MtpMountResolver {
    /// GVFS runtime directory, e.g. `/run/user/1000/gvfs`.
    gvfs_dir: Option<Utf8PathBuf>,
    /// Legacy per-user GVFS directory, e.g. `~/.gvfs`.
    legacy_gvfs_dir: Option<Utf8PathBuf>,
    /// Per-user removable media directory, e.g. `/media/alice`.
    media_dir: Option<Utf8PathBuf>,
}

impl MtpMountResolver {
    /// Creates a resolver over explicit candidate directories.
    #[must_use]
    pub const fn new(
        gvfs_dir: Option<Utf8PathBuf>,
        legacy_gvfs_dir: Option<Utf8PathBuf>,
        media_dir: Option<Utf8PathBuf>,
    ) -> Self {
        Self {
            gvfs_dir,
            legacy_gvfs_dir,
            media_dir,
        }
    }

    /// Derives the candidate directories from the process environment.
    ///
    /// Uses `XDG_RUNTIME_DIR` (falling back to `/run/user/<uid>`), `HOME`,
    /// and `USER`. Candidates whose inputs are unavailable are left unset.
    #[must_use]
    pub fn from_env() -> Self {
        let runtime_dir = env_path("XDG_RUNTIME_DIR").or_else(|| {
            current_uid().map(|uid| Utf8PathBuf::from(format!("/run/user/{uid}")))
        });
        let home = env_path("HOME");
        let user = std::env::var("USER").ok().filter(|user| !user.is_empty());

        Self {
            gvfs_dir: runtime_dir.map(|dir| dir.join("gvfs")),
            legacy_gvfs_dir: home.map(|home| home.join(".gvfs")),
            media_dir: user.map(|user| Utf8Path::new("/media").join(user)),
        }
    }

    /// Returns the directories searched, in search order.
    ///
    /// Used by the CLI to tell the user where to look manually.
    pub fn candidates(&self) -> impl Iterator<Item = &Utf8Path> {
        [&self.gvfs_dir, &self.legacy_gvfs_dir, &self.media_dir]
            .into_iter()
            .filter_map(|dir| dir.as_deref())
    }
}

impl MountResolver for MtpMountResolver {
    fn find_mount(&self) -> Option<Utf8PathBuf> {
        self.gvfs_dir
            .as_deref()
            .and_then(find_mtp_entry)
            .or_else(|| self.legacy_gvfs_dir.as_deref().and_then(find_mtp_entry))
            .or_else(|| self.media_dir.as_deref().and_then(find_mounted_entry))
    }
}

/// Returns the first entry of `dir` whose name contains `mtp`.
fn find_mtp_entry(dir: &Utf8Path) -> Option<Utf8PathBuf> {
    let entries = dir.read_dir_utf8().ok()?;

    let found = entries
        .filter_map(Result::ok)
        .find(|entry| entry.file_name().to_lowercase().contains("mtp"))
        .map(|entry| entry.path().to_owned());

    debug!(dir = %dir, found = ?found, "Searched GVFS directory");
    found
}

/// Returns the first entry of `dir` that is a mount point.
fn find_mounted_entry(dir: &Utf8Path) -> Option<Utf8PathBuf> {
    let entries = dir.read_dir_utf8().ok()?;

    let found = entries
        .filter_map(Result::ok)
        .map(|entry| entry.path().to_owned())
        .find(|path| is_mount_point(path));

    debug!(dir = %dir, found = ?found, "Searched media directory");
    found
}

/// A directory is a mount point when it lives on a different device than
/// its parent.
#[cfg(unix)]
fn is_mount_point(path: &Utf8Path) -> bool {
    use std::os::unix::fs::MetadataExt;

    let Some(parent) = path.parent() else {
        return true;
    };

    match (fs::symlink_metadata(path), fs::metadata(parent)) {
        (Ok(meta), Ok(parent_meta)) => {
            meta.is_dir() && (meta.dev() != parent_meta.dev() || meta.ino() == parent_meta.ino())
        }
        _ => false,
    }
}

#[cfg(not(unix))]
fn is_mount_point(_path: &Utf8Path) -> bool {
    false
}

fn env_path(key: &str) -> Option<Utf8PathBuf> {
    std::env::var(key)
        .ok()
        .filter(|value| !value.is_empty())
        .map(Utf8PathBuf::from)
}

/// The owner of `/proc/self` is the real user of this process.
#[cfg(unix)]
fn current_uid() -> Option<u32> {
    use std::os::unix::fs::MetadataExt;

    fs::metadata("/proc/self").ok().map(|meta| meta.uid())
}

#[cfg(not(unix))]
fn current_uid() -> Option<u32> {
    None
}
