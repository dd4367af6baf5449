//! Content source configuration.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{AggregateError, Result};

/// A list of ref patterns, written as a YAML list or a comma-separated string.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PatternList(Vec<String>);

impl PatternList {
    pub fn new<I, S>(patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(
            patterns
                .into_iter()
                .map(Into::into)
                .map(|p| p.trim().to_string())
                .filter(|p| !p.is_empty())
                .collect(),
        )
    }

    /// Splits a comma-separated string.
    pub fn parse(raw: &str) -> Self {
        Self::new(raw.split(','))
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }
}

impl Serialize for PatternList {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.0.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for PatternList {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            One(String),
            Many(Vec<String>),
        }

        Ok(match Raw::deserialize(deserializer)? {
            Raw::One(raw) => Self::parse(&raw),
            Raw::Many(list) => Self::new(list),
        })
    }
}

/// How edit links are produced for a source's files.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum EditUrl {
    /// Derived from the hosting service, when it is recognized.
    #[default]
    Default,
    /// No edit links.
    Disabled,
    /// A template with `{web_url}`, `{refname}`, `{refhash}` and `{path}` placeholders.
    Template(String),
}

impl Serialize for EditUrl {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            Self::Default => serializer.serialize_bool(true),
            Self::Disabled => serializer.serialize_bool(false),
            Self::Template(template) => serializer.serialize_str(template),
        }
    }
}

impl<'de> Deserialize<'de> for EditUrl {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Flag(bool),
            Template(String),
        }

        Ok(match Raw::deserialize(deserializer)? {
            Raw::Flag(true) => Self::Default,
            Raw::Flag(false) => Self::Disabled,
            Raw::Template(template) => Self::Template(template),
        })
    }
}

/// A repository to read content from, and which refs and paths to read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentSource {
    /// Remote URL or local path.
    pub url: String,

    /// Branch patterns. `None` uses the configured defaults.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub branches: Option<PatternList>,

    /// Tag patterns. `None` selects no tags.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<PatternList>,

    /// Single start path; merged in front of `start_paths`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_path: Option<String>,

    /// Directories holding a component descriptor. Empty means the repository root.
    #[serde(default, skip_serializing_if = "PatternList::is_empty")]
    pub start_paths: PatternList,

    #[serde(default, skip_serializing_if = "is_default_edit_url")]
    pub edit_url: EditUrl,
}

fn is_default_edit_url(edit_url: &EditUrl) -> bool {
    *edit_url == EditUrl::Default
}

impl ContentSource {
    /// Creates a source reading the default branches at the repository root.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            branches: None,
            tags: None,
            start_path: None,
            start_paths: PatternList::default(),
            edit_url: EditUrl::Default,
        }
    }

    pub fn branches<I, S>(mut self, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.branches = Some(PatternList::new(patterns));
        self
    }

    pub fn tags<I, S>(mut self, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = Some(PatternList::new(patterns));
        self
    }

    pub fn start_paths<I, S>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.start_paths = PatternList::new(paths);
        self
    }

    pub fn edit_url(mut self, edit_url: EditUrl) -> Self {
        self.edit_url = edit_url;
        self
    }

    /// Start paths with surrounding slashes trimmed, in declaration order.
    ///
    /// Returns `[""]` (the repository root) when none are configured.
    ///
    /// # Errors
    ///
    /// Paths with `..` segments are configuration errors. A leading `/` is
    /// relative to the repository root.
    pub fn normalized_start_paths(&self) -> Result<Vec<String>> {
        let declared: Vec<&str> = self
            .start_path
            .iter()
            .map(String::as_str)
            .chain(self.start_paths.as_slice().iter().map(String::as_str))
            .collect();
        if declared.is_empty() {
            return Ok(vec![String::new()]);
        }

        let mut paths = Vec::with_capacity(declared.len());
        for raw in declared {
            if raw.contains('\\') || raw.split('/').any(|s| s == "..") {
                return Err(AggregateError::config(format!(
                    "start path '{}' of content source {} must stay inside the repository",
                    raw, self.url
                )));
            }
            let path = raw
                .trim_matches('/')
                .split('/')
                .filter(|s| !s.is_empty() && *s != ".")
                .collect::<Vec<_>>()
                .join("/");
            if !paths.contains(&path) {
                paths.push(path);
            }
        }
        Ok(paths)
    }
}
