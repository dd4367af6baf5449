//! Resource IDs: compact addresses for catalog files.
//!
//! The grammar is `[version@][component:][module:][family$]relative`. Omitted
//! parts are taken from a [`ResourceContext`], usually the file that contains
//! the reference.
//!
//! ```
//! use folio_core::resource::{ResourceContext, parse_resource_id};
//! use folio_core::Family;
//!
//! let ctx = ResourceContext::new("server", "2.0").with_module("admin");
//! let id = parse_resource_id("image$logo.png", &ctx, None, None).unwrap();
//!
//! assert_eq!(id.component.as_deref(), Some("server"));
//! assert_eq!(id.module, "admin");
//! assert_eq!(id.family, Family::Image);
//! ```

mod parser;
mod resolver;

pub use parser::parse_resource_id;
pub use resolver::resolve_resource;

use crate::types::{Family, ResourceKey};

/// The scope a resource ID is interpreted in.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResourceContext {
    pub component: Option<String>,
    pub version: Option<String>,
    pub module: Option<String>,
    pub family: Option<Family>,
    /// Relative path of the referencing file; anchors `./` references.
    pub relative: Option<String>,
}

impl ResourceContext {
    /// Creates a context scoped to one component version.
    pub fn new(component: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            component: Some(component.into()),
            version: Some(version.into()),
            ..Self::default()
        }
    }

    pub fn with_module(mut self, module: impl Into<String>) -> Self {
        self.module = Some(module.into());
        self
    }

    /// Creates a context from the key of the referencing file.
    pub fn from_key(key: &ResourceKey) -> Self {
        Self {
            component: Some(key.component.clone()),
            version: Some(key.version.clone()),
            module: Some(key.module.clone()),
            family: Some(key.family),
            relative: Some(key.relative.clone()),
        }
    }
}

/// A parsed resource ID with context defaults applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceId {
    /// `None` when neither the ID nor the context names a component.
    pub component: Option<String>,
    /// `None` means the latest version of the component.
    pub version: Option<String>,
    pub module: String,
    pub family: Family,
    pub relative: String,
}

impl ResourceId {
    /// Builds the exact catalog key, given the version to use when none was specified.
    pub fn to_key(&self, latest: impl FnOnce(&str) -> Option<String>) -> Option<ResourceKey> {
        let component = self.component.as_deref()?;
        let version = match &self.version {
            Some(version) => version.clone(),
            None => latest(component)?,
        };

        Some(ResourceKey::new(
            component,
            version,
            &self.module,
            self.family,
            &self.relative,
        ))
    }
}

/// Returns true if the last path segment has an extension.
pub(crate) fn has_extension(relative: &str) -> bool {
    let basename = relative.rsplit('/').next().unwrap_or(relative);
    basename.rfind('.').is_some_and(|idx| idx > 0)
}
