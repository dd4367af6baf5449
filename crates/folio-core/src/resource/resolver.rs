//! Resource ID resolution against a finished catalog.

use tracing::trace;

use super::{ResourceContext, has_extension, parse_resource_id};
use crate::catalog::ContentCatalog;
use crate::error::Result;
use crate::file::VirtualFile;
use crate::types::{Family, ResourceKey};

/// Resolves a resource ID to a catalog file.
///
/// A well-formed ID that matches nothing resolves to `Ok(None)`. Only syntax
/// problems are errors.
///
/// Page lookups are forgiving: an ID without an extension also tries `.adoc`,
/// and a miss retries the same key as a page alias and follows it to the page.
pub fn resolve_resource<'a>(
    spec: &str,
    catalog: &'a ContentCatalog,
    ctx: &ResourceContext,
    default_family: Option<Family>,
    permitted: Option<&[Family]>,
) -> Result<Option<&'a VirtualFile>> {
    let id = parse_resource_id(spec, ctx, default_family, permitted)?;

    let Some(key) = id.to_key(|component| {
        catalog
            .get_component(component)
            .map(|component| component.latest.clone())
    }) else {
        trace!(spec, "Resource ID names no known component");
        return Ok(None);
    };

    if key.family != Family::Page {
        return Ok(catalog.get_by_id(&key));
    }

    let mut candidates = vec![key.clone()];
    if !has_extension(&key.relative) {
        candidates.push(ResourceKey {
            relative: format!("{}.adoc", key.relative),
            ..key
        });
    }

    for candidate in &candidates {
        if let Some(file) = catalog.get_by_id(candidate) {
            return Ok(Some(file));
        }
    }

    for candidate in candidates {
        let alias = candidate.with_family(Family::Alias);
        if let Some(target) = catalog.get_by_id(&alias).and_then(VirtualFile::rel) {
            trace!(spec, alias = %alias, target = %target, "Following page alias");
            return Ok(catalog.get_by_id(target));
        }
    }

    Ok(None)
}
