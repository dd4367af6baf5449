//! Virtual files held by the content catalog.

use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};

use crate::types::{Family, Origin, ResourceKey};

/// Source metadata of a catalog file.
#[derive(Debug, Clone)]
pub struct FileSrc {
    /// Catalog address of the file.
    pub key: ResourceKey,
    /// Path of the file inside its repository (start path included).
    pub path: String,
    /// Last path segment, e.g. `intro.adoc`.
    pub basename: String,
    /// Basename without its extension, e.g. `intro`.
    pub stem: String,
    /// Extension including the dot, e.g. `.adoc`; empty when there is none.
    pub extname: String,
    /// Repository and ref the file was read from.
    pub origin: Arc<Origin>,
    /// Link to edit the file in its hosting service.
    pub edit_url: Option<String>,
}

impl FileSrc {
    /// Creates source metadata, deriving basename, stem and extension from `path`.
    pub fn new(key: ResourceKey, path: impl Into<String>, origin: Arc<Origin>) -> Self {
        let path = path.into();
        let basename = path.rsplit('/').next().unwrap_or_default().to_string();
        let (stem, extname) = match basename.rfind('.') {
            Some(idx) if idx > 0 => (basename[..idx].to_string(), basename[idx..].to_string()),
            _ => (basename.clone(), String::new()),
        };

        Self {
            key,
            path,
            basename,
            stem,
            extname,
            origin,
            edit_url: None,
        }
    }

    /// Sets the edit URL.
    pub fn with_edit_url(mut self, edit_url: Option<String>) -> Self {
        self.edit_url = edit_url;
        self
    }
}

/// Size and modification time of a file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FileStat {
    pub size: u64,
    /// Seconds since the Unix epoch; the commit time of the ref the file was read from.
    pub mtime: Option<i64>,
}

/// A file in the content catalog.
///
/// Contents are immutable once the file is in the catalog. Downstream stages
/// record where they wrote the rendered output through [`VirtualFile::set_output_path`],
/// which may be called once per file.
///
/// Alias files hold no bytes; they carry a relation to the page they stand in for.
#[derive(Debug)]
pub struct VirtualFile {
    src: FileSrc,
    contents: Vec<u8>,
    stat: FileStat,
    rel: Option<ResourceKey>,
    out: OnceLock<PathBuf>,
}

impl VirtualFile {
    /// Creates a file with contents.
    pub fn new(src: FileSrc, contents: Vec<u8>, mtime: Option<i64>) -> Self {
        let stat = FileStat {
            size: contents.len() as u64,
            mtime,
        };

        Self {
            src,
            contents,
            stat,
            rel: None,
            out: OnceLock::new(),
        }
    }

    /// Creates a zero-content alias pointing at `target`.
    pub fn alias(src: FileSrc, target: ResourceKey) -> Self {
        Self {
            src,
            contents: Vec::new(),
            stat: FileStat::default(),
            rel: Some(target),
            out: OnceLock::new(),
        }
    }

    pub fn src(&self) -> &FileSrc {
        &self.src
    }

    pub fn key(&self) -> &ResourceKey {
        &self.src.key
    }

    pub fn family(&self) -> Family {
        self.src.key.family
    }

    pub fn contents(&self) -> &[u8] {
        &self.contents
    }

    pub fn stat(&self) -> FileStat {
        self.stat
    }

    /// Key of the page an alias refers to.
    pub fn rel(&self) -> Option<&ResourceKey> {
        self.rel.as_ref()
    }

    pub fn is_alias(&self) -> bool {
        self.rel.is_some()
    }

    /// Returns the output path recorded by a downstream stage.
    pub fn output_path(&self) -> Option<&Path> {
        self.out.get().map(PathBuf::as_path)
    }

    /// Records the output path. Fails with the rejected path if one was already set.
    pub fn set_output_path(&self, path: impl Into<PathBuf>) -> Result<(), PathBuf> {
        self.out.set(path.into())
    }
}
