//! Single-writer catalog assembly.

use std::collections::{BTreeMap, HashMap};

use tracing::{debug, warn};

use crate::catalog::ContentCatalog;
use crate::component::{Component, ComponentVersion};
use crate::error::{CatalogError, Result};
use crate::file::{FileSrc, VirtualFile};
use crate::resource::{ResourceContext, has_extension, parse_resource_id};
use crate::types::{Family, ResourceKey};
use crate::version::sort_descending;

/// Outcome of [`CatalogBuilder::register_version`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Registration {
    /// First time this `(name, version)` was seen.
    New,
    /// Same repository and ref contributed the version again; origins and nav were merged.
    Merged,
}

/// Collects component versions and files, then freezes them into a [`ContentCatalog`].
///
/// The builder is owned by one task. Producers send it their results; they never
/// share it.
#[derive(Debug, Default)]
pub struct CatalogBuilder {
    versions: HashMap<String, HashMap<String, ComponentVersion>>,
    files: Vec<VirtualFile>,
    index: HashMap<ResourceKey, usize>,
    aliases: Vec<(ResourceKey, Vec<String>)>,
}

impl CatalogBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a component version.
    ///
    /// A second registration of the same `(name, version)` from the same
    /// repository and ref is merged into the first. From any other origin it is a
    /// [`CatalogError::ComponentVersionConflict`] and the catalog is left unchanged.
    pub fn register_version(&mut self, version: ComponentVersion) -> Result<Registration> {
        let versions = self.versions.entry(version.name.clone()).or_default();

        let Some(existing) = versions.get_mut(&version.version) else {
            debug!(
                name = %version.name,
                version = %version.version,
                "Registered component version"
            );
            versions.insert(version.version.clone(), version);
            return Ok(Registration::New);
        };

        let first = existing.origin();
        let second = version.origin();
        if !first.same_ref(second) {
            return Err(CatalogError::conflict(
                &version.name,
                &version.version,
                first.clone(),
                second.clone(),
            ));
        }

        debug!(
            name = %version.name,
            version = %version.version,
            start_path = %second.start_path,
            "Merging component version contributed by the same ref"
        );
        for nav in version.nav {
            if !existing.nav.contains(&nav) {
                existing.nav.push(nav);
            }
        }
        existing.origins.extend(version.origins);
        Ok(Registration::Merged)
    }

    /// Returns true if the component version has been registered.
    pub fn has_version(&self, name: &str, version: &str) -> bool {
        self.versions
            .get(name)
            .is_some_and(|versions| versions.contains_key(version))
    }

    /// Returns a registered component version.
    pub fn get_version(&self, name: &str, version: &str) -> Option<&ComponentVersion> {
        self.versions.get(name).and_then(|versions| versions.get(version))
    }

    /// Adds a file. The first file for a key wins; later ones are rejected.
    pub fn add_file(&mut self, file: VirtualFile) -> Result<()> {
        let key = file.key();
        if !self.has_version(&key.component, &key.version) {
            return Err(CatalogError::UnknownComponentVersion { key: key.clone() });
        }

        if let Some(&idx) = self.index.get(key) {
            let existing = &self.files[idx];
            return Err(CatalogError::DuplicateFile {
                key: key.clone(),
                existing: Box::new(existing.src().origin.as_ref().clone()),
                rejected: Box::new(file.src().origin.as_ref().clone()),
            });
        }

        self.index.insert(key.clone(), self.files.len());
        self.files.push(file);
        Ok(())
    }

    /// Records the aliases a page declares. They are placed when the catalog is built,
    /// once the latest version of every component is known.
    pub fn add_page_aliases(&mut self, page: ResourceKey, aliases: Vec<String>) {
        if !aliases.is_empty() {
            self.aliases.push((page, aliases));
        }
    }

    /// Number of files added so far.
    pub fn file_count(&self) -> usize {
        self.files.len()
    }

    /// Number of component versions registered so far.
    pub fn version_count(&self) -> usize {
        self.versions.values().map(HashMap::len).sum()
    }

    /// Freezes the catalog.
    ///
    /// Returns the catalog together with the alias errors found while placing
    /// page aliases. Those errors never abort the build.
    pub fn build(mut self) -> (ContentCatalog, Vec<CatalogError>) {
        let components = self.compute_components();
        let aliases = std::mem::take(&mut self.aliases);
        let mut errors = Vec::new();

        for (page, specs) in aliases {
            for spec in specs {
                if let Err(err) = self.place_alias(&components, &page, &spec) {
                    warn!(error = %err, "Skipping page alias");
                    errors.push(err);
                }
            }
        }

        let catalog = ContentCatalog {
            components,
            versions: self.versions,
            files: self.files,
            index: self.index,
        };
        (catalog, errors)
    }

    fn compute_components(&self) -> BTreeMap<String, Component> {
        self.versions
            .iter()
            .filter_map(|(name, versions)| {
                let mut ordered: Vec<&str> = versions.keys().map(String::as_str).collect();
                sort_descending(&mut ordered);

                let latest = ordered
                    .iter()
                    .find(|version| !versions[**version].prerelease)
                    .or_else(|| ordered.first())?
                    .to_string();

                let component = Component {
                    name: name.clone(),
                    title: versions[&latest].title.clone(),
                    versions: ordered.into_iter().map(String::from).collect(),
                    latest,
                };
                Some((name.clone(), component))
            })
            .collect()
    }

    fn place_alias(
        &mut self,
        components: &BTreeMap<String, Component>,
        page: &ResourceKey,
        spec: &str,
    ) -> Result<()> {
        let ctx = ResourceContext::from_key(page);
        let id = parse_resource_id(spec, &ctx, Some(Family::Page), Some(&[Family::Page]))?;

        let unresolved = |reason: String| CatalogError::UnresolvedAliasTarget {
            spec: spec.to_string(),
            page: page.clone(),
            reason,
        };

        let component = id
            .component
            .ok_or_else(|| unresolved("no component in scope".to_string()))?;
        let version = match id.version {
            Some(version) => version,
            None => components
                .get(&component)
                .map(|c| c.latest.clone())
                .ok_or_else(|| unresolved(format!("unknown component '{}'", component)))?,
        };
        if !self.has_version(&component, &version) {
            return Err(unresolved(format!(
                "unknown component version {}@{}",
                version, component
            )));
        }

        let mut relative = id.relative;
        if !has_extension(&relative) {
            relative.push_str(".adoc");
        }

        let alias = ResourceKey::new(component, version, id.module, Family::Alias, relative);

        if self.index.contains_key(&alias.with_family(Family::Page)) {
            return Err(CatalogError::DuplicateAlias {
                alias,
                page: page.clone(),
                existing: Family::Page.to_string(),
            });
        }
        if self.index.contains_key(&alias) {
            return Err(CatalogError::DuplicateAlias {
                alias,
                page: page.clone(),
                existing: Family::Alias.to_string(),
            });
        }

        let Some(&target_idx) = self.index.get(page) else {
            return Err(unresolved(format!("page {} is not in the catalog", page)));
        };
        let target = self.files[target_idx].src();
        let src = FileSrc::new(alias.clone(), target.path.clone(), target.origin.clone());

        debug!(alias = %alias, page = %page, "Placed page alias");
        self.index.insert(alias, self.files.len());
        self.files.push(VirtualFile::alias(src, page.clone()));
        Ok(())
    }
}
