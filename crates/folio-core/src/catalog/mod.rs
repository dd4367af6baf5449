//! The content catalog.
//!
//! A catalog is assembled by a single [`CatalogBuilder`] and then frozen into an
//! immutable [`ContentCatalog`]. Once built it is never mutated, so it can be
//! shared behind an `Arc` and read from any number of tasks without locking.

mod builder;

pub use builder::{CatalogBuilder, Registration};

use std::collections::{BTreeMap, HashMap};

use crate::component::{Component, ComponentVersion};
use crate::error::Result;
use crate::file::VirtualFile;
use crate::resource::{ResourceContext, resolve_resource};
use crate::types::{Family, ResourceKey};

/// Page used when a component version declares no start page.
pub const DEFAULT_START_PAGE: &str = "index.adoc";

/// Aggregated files and component versions, addressable by [`ResourceKey`].
#[derive(Debug, Default)]
pub struct ContentCatalog {
    components: BTreeMap<String, Component>,
    versions: HashMap<String, HashMap<String, ComponentVersion>>,
    files: Vec<VirtualFile>,
    index: HashMap<ResourceKey, usize>,
}

impl ContentCatalog {
    /// Creates a new builder.
    pub fn builder() -> CatalogBuilder {
        CatalogBuilder::new()
    }

    /// Returns the component with the given name.
    pub fn get_component(&self, name: &str) -> Option<&Component> {
        self.components.get(name)
    }

    /// Returns all components ordered by name.
    pub fn components(&self) -> impl Iterator<Item = &Component> {
        self.components.values()
    }

    /// Returns one component version.
    pub fn get_component_version(&self, name: &str, version: &str) -> Option<&ComponentVersion> {
        self.versions.get(name).and_then(|versions| versions.get(version))
    }

    /// Returns every version of a component, newest first.
    pub fn component_versions(&self, name: &str) -> impl Iterator<Item = &ComponentVersion> {
        self.components
            .get(name)
            .into_iter()
            .flat_map(|component| component.versions.iter())
            .filter_map(move |version| self.get_component_version(name, version))
    }

    /// Returns the latest version of a component.
    ///
    /// This is the newest stable version, or the newest prerelease when the
    /// component has no stable version.
    pub fn latest(&self, name: &str) -> Option<&ComponentVersion> {
        let component = self.components.get(name)?;
        self.get_component_version(name, &component.latest)
    }

    /// Looks up a file by its exact key.
    pub fn get_by_id(&self, key: &ResourceKey) -> Option<&VirtualFile> {
        self.index.get(key).map(|&idx| &self.files[idx])
    }

    /// Returns the files matching `predicate`, in insertion order.
    ///
    /// The iterator is lazy; call again to restart.
    pub fn get_files<'a, P>(&'a self, predicate: P) -> impl Iterator<Item = &'a VirtualFile> + 'a
    where
        P: Fn(&VirtualFile) -> bool + 'a,
    {
        self.files.iter().filter(move |file| predicate(file))
    }

    /// Returns all files of one family.
    pub fn files_by_family(&self, family: Family) -> impl Iterator<Item = &VirtualFile> {
        self.get_files(move |file| file.family() == family)
    }

    /// Resolves a resource ID against this catalog.
    ///
    /// Shorthand for [`resolve_resource`] with no default family and no family allowlist.
    pub fn resolve(&self, spec: &str, ctx: &ResourceContext) -> Result<Option<&VirtualFile>> {
        resolve_resource(spec, self, ctx, None, None)
    }

    /// Resolves the start page of a component version.
    pub fn resolve_start_page(&self, name: &str, version: &str) -> Result<Option<&VirtualFile>> {
        let Some(component_version) = self.get_component_version(name, version) else {
            return Ok(None);
        };
        let spec = component_version
            .start_page
            .as_deref()
            .unwrap_or(DEFAULT_START_PAGE);
        let ctx = ResourceContext::new(name, version);

        resolve_resource(spec, self, &ctx, Some(Family::Page), Some(&[Family::Page]))
    }

    /// Number of files, aliases included.
    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Number of component versions.
    pub fn version_count(&self) -> usize {
        self.versions.values().map(HashMap::len).sum()
    }
}
