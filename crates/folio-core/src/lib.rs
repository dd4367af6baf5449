//! Folio Core - Domain types and the content catalog
//!
//! This crate holds everything about aggregated documentation that does not
//! touch the network or the disk: component versions, virtual files, the
//! content catalog with its conflict rules, and resource ID parsing and
//! resolution.

pub mod attributes;
pub mod catalog;
pub mod component;
pub mod error;
pub mod file;
pub mod layout;
pub mod resource;
pub mod types;
pub mod version;

pub use attributes::AttributeMap;
pub use catalog::{CatalogBuilder, ContentCatalog, Registration};
pub use component::{Component, ComponentVersion};
pub use error::{CatalogError, Result};
pub use file::{FileSrc, FileStat, VirtualFile};
pub use resource::{ResourceContext, ResourceId, parse_resource_id, resolve_resource};
pub use types::{Family, Origin, ROOT_MODULE, RefKind, ResourceKey};
