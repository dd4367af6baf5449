//! Component descriptor (`antora.yml`) loading.

use folio_core::attributes::merge_attributes;
use folio_core::layout::DESCRIPTOR_FILENAME;
use folio_core::{AttributeMap, ComponentVersion, Origin};
use serde::Deserialize;
use serde_yaml::Value;
use tracing::debug;

use crate::error::{AggregateError, Result};
use crate::source::WorkItem;

/// A parsed component descriptor.
#[derive(Debug, Clone, PartialEq)]
pub struct ComponentDescriptor {
    pub name: String,
    pub version: String,
    pub title: String,
    pub display_version: String,
    pub prerelease: bool,
    pub start_page: Option<String>,
    /// Nav files relative to the start path, in declaration order.
    pub nav: Vec<String>,
    pub attributes: AttributeMap,
}

#[derive(Debug, Deserialize)]
struct RawDescriptor {
    name: Option<Value>,
    version: Option<Value>,
    title: Option<Value>,
    display_version: Option<Value>,
    prerelease: Option<Value>,
    start_page: Option<String>,
    #[serde(default)]
    nav: Vec<String>,
    #[serde(default)]
    asciidoc: RawAsciidoc,
}

#[derive(Debug, Default, Deserialize)]
struct RawAsciidoc {
    #[serde(default)]
    attributes: AttributeMap,
}

impl ComponentDescriptor {
    /// Parses descriptor contents read at `refname`.
    ///
    /// `version: true` takes the ref name verbatim as the version.
    /// Returns the reason on failure.
    pub fn parse(contents: &[u8], refname: &str) -> std::result::Result<Self, String> {
        let raw: RawDescriptor = serde_yaml::from_slice(contents).map_err(|e| e.to_string())?;

        let name = match raw.name.as_ref().and_then(scalar) {
            Some(name) if !name.is_empty() => name,
            _ => return Err("name is required".to_string()),
        };
        if name.contains(['@', ':', '$', '/', ' ']) {
            return Err(format!("name '{}' contains a reserved character", name));
        }

        let version = match &raw.version {
            Some(Value::Bool(true)) => refname.to_string(),
            Some(value) => match scalar(value) {
                Some(version) if !version.is_empty() => version,
                _ => return Err("version must be a string, a number or true".to_string()),
            },
            None => return Err("version is required".to_string()),
        };
        if version.contains(['@', ':', '$']) {
            return Err(format!("version '{}' contains a reserved character", version));
        }

        let (prerelease, label) = match &raw.prerelease {
            None | Some(Value::Null) | Some(Value::Bool(false)) => (false, None),
            Some(Value::Bool(true)) => (true, None),
            Some(value) => match scalar(value) {
                Some(label) if !label.is_empty() => (true, Some(label)),
                _ => (false, None),
            },
        };

        let display_version = match raw.display_version.as_ref().and_then(scalar) {
            Some(display) => display,
            None => match &label {
                Some(label) if label.starts_with(['-', '.']) => format!("{}{}", version, label),
                Some(label) => format!("{} {}", version, label),
                None => version.clone(),
            },
        };

        Ok(Self {
            title: raw.title.as_ref().and_then(scalar).unwrap_or_else(|| name.clone()),
            name,
            version,
            display_version,
            prerelease,
            start_page: raw.start_page.filter(|page| !page.is_empty()),
            nav: raw.nav,
            attributes: raw.asciidoc.attributes,
        })
    }

    /// Builds the catalog entry, with the descriptor's attributes merged over `global`.
    pub fn into_component_version(self, origin: Origin, global: &AttributeMap) -> ComponentVersion {
        let mut version = ComponentVersion::new(self.name, self.version, origin);
        version.title = self.title;
        version.display_version = self.display_version;
        version.prerelease = self.prerelease;
        version.start_page = self.start_page;
        version.nav = self.nav;
        version.attributes = merge_attributes(global, &self.attributes);
        version
    }
}

/// Text of a string, number or bool scalar.
fn scalar(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Reads and parses the descriptor at the work item's start path.
///
/// # Errors
///
/// [`AggregateError::MissingDescriptor`] when the file does not exist and
/// [`AggregateError::InvalidDescriptor`] when it cannot be used.
pub async fn load_descriptor(item: &WorkItem) -> Result<ComponentDescriptor> {
    let path = item.repo_path(DESCRIPTOR_FILENAME);
    let contents = match item.repository.read_blob(&item.git_ref, &path).await {
        Ok(contents) => contents,
        Err(AggregateError::NotFound(_)) => {
            return Err(AggregateError::MissingDescriptor {
                url: item.repository.url().to_string(),
                refname: item.git_ref.name.clone(),
                kind: item.git_ref.kind.to_string(),
                start_path: item.start_path.clone(),
            });
        },
        Err(e) => return Err(e),
    };

    let descriptor = ComponentDescriptor::parse(&contents, &item.git_ref.name).map_err(|reason| {
        AggregateError::InvalidDescriptor {
            url: item.repository.url().to_string(),
            refname: item.git_ref.name.clone(),
            start_path: item.start_path.clone(),
            reason,
        }
    })?;

    debug!(
        url = %item.repository.url(),
        refname = %item.git_ref.name,
        name = %descriptor.name,
        version = %descriptor.version,
        "Loaded component descriptor"
    );
    Ok(descriptor)
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio_core::RefKind;
    use serde_json::json;

    fn parse(yaml: &str) -> ComponentDescriptor {
        ComponentDescriptor::parse(yaml.as_bytes(), "main").unwrap()
    }

    #[test]
    fn test_minimal_descriptor() {
        let descriptor = parse("name: server\nversion: '2.0'\n");
        assert_eq!(descriptor.name, "server");
        assert_eq!(descriptor.version, "2.0");
        assert_eq!(descriptor.title, "server");
        assert_eq!(descriptor.display_version, "2.0");
        assert!(!descriptor.prerelease);
        assert!(descriptor.nav.is_empty());
    }

    #[test]
    fn test_numeric_version_is_stringified() {
        assert_eq!(parse("name: server\nversion: 2.5\n").version, "2.5");
        assert_eq!(parse("name: server\nversion: 3\n").version, "3");
    }

    #[test]
    fn test_version_true_uses_refname() {
        let descriptor =
            ComponentDescriptor::parse(b"name: server\nversion: true\n", "release/2.x").unwrap();
        assert_eq!(descriptor.version, "release/2.x");
    }

    #[test]
    fn test_prerelease_label() {
        let descriptor = parse("name: server\nversion: '3.0'\nprerelease: -beta.1\n");
        assert!(descriptor.prerelease);
        assert_eq!(descriptor.display_version, "3.0-beta.1");

        let descriptor = parse("name: server\nversion: '3.0'\nprerelease: Beta\n");
        assert_eq!(descriptor.display_version, "3.0 Beta");

        let descriptor =
            parse("name: server\nversion: '3.0'\nprerelease: true\ndisplay_version: Next\n");
        assert!(descriptor.prerelease);
        assert_eq!(descriptor.display_version, "Next");
    }

    #[test]
    fn test_missing_required_keys() {
        let nameless = ComponentDescriptor::parse(b"version: '1.0'\n", "main").unwrap_err();
        assert!(nameless.contains("name"));
        let unversioned = ComponentDescriptor::parse(b"name: server\n", "main").unwrap_err();
        assert!(unversioned.contains("version"));
        assert!(ComponentDescriptor::parse(b"name: [a\n", "main").is_err());
        assert!(ComponentDescriptor::parse(b"name: 'a:b'\nversion: '1'\n", "main").is_err());
    }

    #[test]
    fn test_attributes_merge_over_global() {
        let descriptor = parse(
            "name: server\nversion: '1.0'\ntitle: Server\nnav: [modules/ROOT/nav.adoc]\n\
             asciidoc:\n  attributes:\n    product: Folio Server\n    experimental: ''\n",
        );
        let global: AttributeMap =
            serde_json::from_value(json!({"product": "Folio", "company": "Acme"})).unwrap();
        let origin = Origin::new("https://example.com/docs.git", "main", RefKind::Branch, "");

        let version = descriptor.into_component_version(origin, &global);
        assert_eq!(version.title, "Server");
        assert_eq!(version.nav, vec!["modules/ROOT/nav.adoc"]);
        assert_eq!(version.attributes["product"], "Folio Server");
        assert_eq!(version.attributes["company"], "Acme");
        assert_eq!(version.attributes["experimental"], "");
    }
}
