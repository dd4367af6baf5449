//! Common type definitions for the content catalog.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Module name used when a file is not bound to a named module.
pub const ROOT_MODULE: &str = "ROOT";

/// Structural category of a catalog file.
///
/// # Example
///
/// ```
/// use folio_core::Family;
///
/// let family: Family = "image".parse().unwrap();
/// assert_eq!(family, Family::Image);
/// assert_eq!(family.as_str(), "image");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Family {
    Page,
    Partial,
    Image,
    Attachment,
    Example,
    Nav,
    Alias,
}

impl Family {
    /// Every family, in declaration order.
    pub const ALL: [Family; 7] = [
        Family::Page,
        Family::Partial,
        Family::Image,
        Family::Attachment,
        Family::Example,
        Family::Nav,
        Family::Alias,
    ];

    /// Returns the family name as used in resource IDs.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Page => "page",
            Self::Partial => "partial",
            Self::Image => "image",
            Self::Attachment => "attachment",
            Self::Example => "example",
            Self::Nav => "nav",
            Self::Alias => "alias",
        }
    }
}

impl fmt::Display for Family {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Family {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Family::ALL
            .into_iter()
            .find(|family| family.as_str() == s)
            .ok_or_else(|| format!("unknown family '{}'", s))
    }
}

/// Kind of git reference a version was read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RefKind {
    Branch,
    Tag,
}

impl RefKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Branch => "branch",
            Self::Tag => "tag",
        }
    }
}

impl fmt::Display for RefKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where a component version (and every file in it) came from.
///
/// The URL is always the credential-free display form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Origin {
    /// Repository URL or local path.
    pub url: String,
    /// Short ref name (e.g. `main`, `v2.0`).
    pub refname: String,
    /// Whether the ref is a branch or a tag.
    pub reftype: RefKind,
    /// Commit the ref pointed to when it was read.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refhash: Option<String>,
    /// Directory inside the repository holding the component descriptor.
    pub start_path: String,
    /// Browsable URL of the repository, when one can be derived.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub web_url: Option<String>,
    /// True when the repository was used in place rather than mirrored.
    #[serde(default)]
    pub local: bool,
}

impl Origin {
    /// Creates an origin with the required fields.
    pub fn new(
        url: impl Into<String>,
        refname: impl Into<String>,
        reftype: RefKind,
        start_path: impl Into<String>,
    ) -> Self {
        Self {
            url: url.into(),
            refname: refname.into(),
            reftype,
            refhash: None,
            start_path: start_path.into(),
            web_url: None,
            local: false,
        }
    }

    /// Returns true if both origins read the same repository at the same ref.
    ///
    /// Start paths are ignored: overlapping start-path configuration is not a conflict.
    pub fn same_ref(&self, other: &Origin) -> bool {
        self.url == other.url && self.refname == other.refname && self.reftype == other.reftype
    }
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}: {}", self.url, self.reftype, self.refname)?;
        if !self.start_path.is_empty() {
            write!(f, " | start path: {}", self.start_path)?;
        }
        write!(f, ")")
    }
}

/// Exact address of a file in the catalog.
///
/// Renders as a fully qualified resource ID: `version@component:module:family$relative`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ResourceKey {
    pub component: String,
    pub version: String,
    pub module: String,
    pub family: Family,
    pub relative: String,
}

impl ResourceKey {
    pub fn new(
        component: impl Into<String>,
        version: impl Into<String>,
        module: impl Into<String>,
        family: Family,
        relative: impl Into<String>,
    ) -> Self {
        Self {
            component: component.into(),
            version: version.into(),
            module: module.into(),
            family,
            relative: relative.into(),
        }
    }

    /// Returns the same key under a different family.
    pub fn with_family(&self, family: Family) -> Self {
        Self {
            family,
            ..self.clone()
        }
    }
}

impl fmt::Display for ResourceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}@{}:{}:{}${}",
            self.version, self.component, self.module, self.family, self.relative
        )
    }
}
