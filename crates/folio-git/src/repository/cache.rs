//! On-disk mirror cache layout and validity marker.
//!
//! Every remote gets one bare mirror under `<cache_dir>/content/`. A zero-byte
//! `valid` file inside the mirror is written only after a clone or fetch has
//! fully succeeded; a mirror without it is never trusted.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};

use super::location::RemoteUrl;

/// Folder under the cache dir that holds the mirrors.
pub const CONTENT_CACHE_FOLDER: &str = "content";

/// Name of the validity marker inside a mirror.
pub const VALID_MARKER: &str = "valid";

/// Application folder name under the user cache dir.
const APP_CACHE_FOLDER: &str = "folio";

/// `<user cache dir>/folio`, falling back to `./.cache/folio`.
pub fn default_cache_dir() -> PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(|| PathBuf::from(".cache"))
        .join(APP_CACHE_FOLDER)
}

/// Mirror folder for `remote`: `<cache_dir>/content/<basename>-<hash>.git`.
///
/// The hash is computed over the normalized URL, so the same repository spelled
/// with different credentials or a trailing `.git` shares one folder.
pub fn cache_folder(cache_dir: &Path, remote: &RemoteUrl) -> PathBuf {
    let digest = Sha256::digest(remote.normalized().as_bytes());
    let name = format!("{}-{}.git", remote.basename(), hex::encode(&digest[..16]));
    cache_dir.join(CONTENT_CACHE_FOLDER).join(name)
}

/// What to do with a mirror folder before reading from it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheAction {
    /// Mirror is valid and no fetch was requested.
    UseCached,
    /// Mirror is valid; update it from the remote.
    Fetch,
    /// Mirror is missing or untrusted; remove whatever is there and clone.
    Clone,
}

impl CacheAction {
    /// Decides the action from the marker state and the fetch flag.
    pub fn decide(marker_present: bool, folder_present: bool, fetch: bool) -> Self {
        match (marker_present && folder_present, fetch) {
            (true, false) => Self::UseCached,
            (true, true) => Self::Fetch,
            (false, _) => Self::Clone,
        }
    }

    /// Returns true if this action talks to the remote.
    pub fn needs_network(&self) -> bool {
        !matches!(self, Self::UseCached)
    }
}

/// Returns true if the mirror at `folder` carries the validity marker.
pub fn is_valid(folder: &Path) -> bool {
    folder.join(VALID_MARKER).is_file()
}

/// Writes the validity marker.
pub fn mark_valid(folder: &Path) -> std::io::Result<()> {
    std::fs::write(folder.join(VALID_MARKER), [])
}

/// Removes the validity marker, if present.
pub fn invalidate(folder: &Path) -> std::io::Result<()> {
    match std::fs::remove_file(folder.join(VALID_MARKER)) {
        Err(e) if e.kind() != ErrorKind::NotFound => Err(e),
        _ => Ok(()),
    }
}

/// Deletes a mirror folder and everything in it.
pub fn remove_folder(folder: &Path) -> std::io::Result<()> {
    match std::fs::remove_dir_all(folder) {
        Err(e) if e.kind() != ErrorKind::NotFound => Err(e),
        _ => Ok(()),
    }
}
