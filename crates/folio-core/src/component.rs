//! Components and component versions.

use serde::Serialize;

use crate::attributes::AttributeMap;
use crate::types::Origin;

/// The metadata of one component at one version.
///
/// Created once per loaded component descriptor and keyed by `(name, version)`.
/// Several origins only appear when the same repository and ref contributed the
/// version through more than one start path.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentVersion {
    pub name: String,
    pub version: String,
    pub display_version: String,
    pub title: String,
    pub prerelease: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_page: Option<String>,
    /// Nav files in declaration order, as paths relative to the start path.
    pub nav: Vec<String>,
    pub origins: Vec<Origin>,
    pub attributes: AttributeMap,
}

impl ComponentVersion {
    /// Creates a stable version whose title and display version default to name and version.
    pub fn new(name: impl Into<String>, version: impl Into<String>, origin: Origin) -> Self {
        let name = name.into();
        let version = version.into();

        Self {
            title: name.clone(),
            display_version: version.clone(),
            name,
            version,
            prerelease: false,
            start_page: None,
            nav: Vec::new(),
            origins: vec![origin],
            attributes: AttributeMap::new(),
        }
    }

    /// Origin that first contributed this version.
    pub fn origin(&self) -> &Origin {
        &self.origins[0]
    }
}

/// A named documentation unit with its versions ordered newest first.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Component {
    pub name: String,
    /// Title of the latest version.
    pub title: String,
    /// Every version, newest first.
    pub versions: Vec<String>,
    /// Newest stable version, or newest prerelease if there is no stable one.
    pub latest: String,
}

impl Component {
    pub fn has_version(&self, version: &str) -> bool {
        self.versions.iter().any(|v| v == version)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::RefKind;

    #[test]
    fn test_new_defaults() {
        let origin = Origin::new("https://example.com/docs.git", "main", RefKind::Branch, "");
        let version = ComponentVersion::new("server", "2.0", origin);

        assert_eq!(version.title, "server");
        assert_eq!(version.display_version, "2.0");
        assert!(!version.prerelease);
        assert_eq!(version.origin().refname, "main");
    }

    #[test]
    fn test_serializes_camel_case() {
        let origin = Origin::new("https://example.com/docs.git", "main", RefKind::Branch, "");
        let version = ComponentVersion::new("server", "2.0", origin);
        let json = serde_json::to_value(&version).unwrap();

        assert_eq!(json["displayVersion"], "2.0");
        assert_eq!(json["origins"][0]["startPath"], "");
        assert!(json.get("startPage").is_none());
    }
}
