//! Resource ID parsing.

use std::sync::LazyLock;

use regex::Regex;

use super::{ResourceContext, ResourceId};
use crate::error::{CatalogError, Result};
use crate::types::{Family, ROOT_MODULE};

/// `[version@][component:][module:][family$]relative`
///
/// Capture groups: 1 version, 2 component, 3 module, 4 family, 5 relative.
static RESOURCE_ID: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"^(?:([^@:$]+)@)?",
        r"(?:(?:([^@:$]+):)?(?:([^@:$]+))?:)?",
        r"(?:([^@:$]+)\$)?",
        r"([^@:$]+)$",
    ))
    .expect("valid regex")
});

/// Parses a resource ID and fills omitted parts from the context.
///
/// # Defaulting
/// - A component named in the ID starts a new scope: a missing module means
///   `ROOT` and a missing version means the component's latest version.
/// - Without a component, component, version and module come from the context
///   (module falls back to `ROOT`).
/// - A missing family falls back to `default_family`, then to `page`.
/// - A relative path starting with `./` is taken relative to the directory of
///   the context file.
///
/// # Errors
/// [`CatalogError::InvalidResourceIdSyntax`] if the ID does not match the
/// grammar, names an unknown family, or names a family outside `permitted`.
pub fn parse_resource_id(
    spec: &str,
    ctx: &ResourceContext,
    default_family: Option<Family>,
    permitted: Option<&[Family]>,
) -> Result<ResourceId> {
    let Some(caps) = RESOURCE_ID.captures(spec) else {
        return Err(CatalogError::invalid_resource_id(
            spec,
            "expected [version@][component:][module:][family$]relative",
        ));
    };
    let group = |idx: usize| caps.get(idx).map(|m| m.as_str().to_string());

    let family = match caps.get(4) {
        Some(name) => name
            .as_str()
            .parse::<Family>()
            .map_err(|reason| CatalogError::invalid_resource_id(spec, reason))?,
        None => default_family.unwrap_or(Family::Page),
    };

    if let Some(permitted) = permitted {
        if !permitted.contains(&family) {
            let allowed: Vec<&str> = permitted.iter().map(Family::as_str).collect();
            return Err(CatalogError::invalid_resource_id(
                spec,
                format!("family '{}' is not one of: {}", family, allowed.join(", ")),
            ));
        }
    }

    let (component, version, module) = match group(2) {
        Some(component) => (
            Some(component),
            group(1),
            group(3).unwrap_or_else(|| ROOT_MODULE.to_string()),
        ),
        None => (
            ctx.component.clone(),
            group(1).or_else(|| ctx.version.clone()),
            group(3)
                .or_else(|| ctx.module.clone())
                .unwrap_or_else(|| ROOT_MODULE.to_string()),
        ),
    };

    let mut relative = group(5).unwrap_or_default();
    if let (Some(rest), Some(base)) = (relative.strip_prefix("./"), ctx.relative.as_deref()) {
        relative = match base.rfind('/') {
            Some(idx) => format!("{}/{}", &base[..idx], rest),
            None => rest.to_string(),
        };
    }

    Ok(ResourceId {
        component,
        version,
        module,
        family,
        relative,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx() -> ResourceContext {
        ResourceContext {
            component: Some("server".to_string()),
            version: Some("2.0".to_string()),
            module: Some("admin".to_string()),
            family: Some(Family::Page),
            relative: Some("setup/install.adoc".to_string()),
        }
    }

    #[test]
    fn test_fully_qualified() {
        let id = parse_resource_id("1.0@client:api:example$main.rs", &ctx(), None, None).unwrap();
        assert_eq!(id.version.as_deref(), Some("1.0"));
        assert_eq!(id.component.as_deref(), Some("client"));
        assert_eq!(id.module, "api");
        assert_eq!(id.family, Family::Example);
        assert_eq!(id.relative, "main.rs");
    }

    #[test]
    fn test_component_without_module_is_root() {
        let empty = ResourceContext::default();
        let id = parse_resource_id("2.0@server::intro.adoc", &empty, None, None).unwrap();
        assert_eq!(id.component.as_deref(), Some("server"));
        assert_eq!(id.module, ROOT_MODULE);
        assert_eq!(id.version.as_deref(), Some("2.0"));
    }

    #[test]
    fn test_component_without_version_means_latest() {
        let id = parse_resource_id("client::intro.adoc", &ctx(), None, None).unwrap();
        assert_eq!(id.component.as_deref(), Some("client"));
        assert_eq!(id.version, None);
    }

    #[test]
    fn test_single_prefix_is_module() {
        let id = parse_resource_id("ops:deploy.adoc", &ctx(), None, None).unwrap();
        assert_eq!(id.component.as_deref(), Some("server"));
        assert_eq!(id.version.as_deref(), Some("2.0"));
        assert_eq!(id.module, "ops");
    }

    #[test]
    fn test_inherits_everything_from_context() {
        let id = parse_resource_id("partial$note.adoc", &ctx(), None, None).unwrap();
        assert_eq!(id.module, "admin");
        assert_eq!(id.family, Family::Partial);
    }

    #[test]
    fn test_version_only_keeps_context_component() {
        let id = parse_resource_id("1.0@intro.adoc", &ctx(), None, None).unwrap();
        assert_eq!(id.component.as_deref(), Some("server"));
        assert_eq!(id.version.as_deref(), Some("1.0"));
        assert_eq!(id.module, "admin");
    }

    #[test]
    fn test_default_family() {
        let id = parse_resource_id("logo.png", &ctx(), Some(Family::Image), None).unwrap();
        assert_eq!(id.family, Family::Image);

        let id = parse_resource_id("intro.adoc", &ctx(), None, None).unwrap();
        assert_eq!(id.family, Family::Page);
    }

    #[test]
    fn test_dot_relative() {
        let id = parse_resource_id("./upgrade.adoc", &ctx(), None, None).unwrap();
        assert_eq!(id.relative, "setup/upgrade.adoc");

        let top = ResourceContext {
            relative: Some("index.adoc".to_string()),
            ..ctx()
        };
        let id = parse_resource_id("./upgrade.adoc", &top, None, None).unwrap();
        assert_eq!(id.relative, "upgrade.adoc");
    }

    #[test]
    fn test_malformed_is_syntax_error() {
        for spec in ["::::", "", "a@b@c.adoc", "server:admin:page$", "page$$x.adoc"] {
            let err = parse_resource_id(spec, &ctx(), None, None).unwrap_err();
            assert!(err.is_syntax_error(), "expected syntax error for {:?}", spec);
        }
    }

    #[test]
    fn test_relative_path_cannot_start_with_at_sign() {
        for spec in ["a@@x", "2.0@@install.adoc", "@install.adoc", "server::@install.adoc"] {
            let err = parse_resource_id(spec, &ctx(), None, None).unwrap_err();
            assert!(err.is_syntax_error(), "expected syntax error for {:?}", spec);
        }
        let id = parse_resource_id("2.0@install.adoc", &ctx(), None, None).unwrap();
        assert_eq!(id.version.as_deref(), Some("2.0"));
        assert_eq!(id.relative, "install.adoc");
    }

    #[test]
    fn test_unknown_family_is_syntax_error() {
        let err = parse_resource_id("widget$thing.adoc", &ctx(), None, None).unwrap_err();
        assert!(err.is_syntax_error());
    }

    #[test]
    fn test_permitted_families() {
        let permitted = [Family::Page, Family::Partial];
        assert!(parse_resource_id("partial$note.adoc", &ctx(), None, Some(&permitted)).is_ok());

        let err = parse_resource_id("image$logo.png", &ctx(), None, Some(&permitted)).unwrap_err();
        assert!(err.is_syntax_error());
        assert!(err.to_string().contains("page, partial"));
    }
}
