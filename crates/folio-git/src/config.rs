//! Aggregation settings.

use std::path::{Path, PathBuf};
use std::time::Duration;

use folio_core::AttributeMap;
use serde::{Deserialize, Serialize};

use crate::error::{AggregateError, Result};
use crate::repository::{ProxyConfig, default_cache_dir};
use crate::source::{ContentSource, DEFAULT_BRANCH_PATTERNS};

/// Settings for one aggregation run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AggregatorConfig {
    /// Repositories to read, in priority order.
    #[serde(default)]
    sources: Vec<ContentSource>,

    /// Branch patterns for sources that declare none.
    #[serde(default = "default_branches")]
    branches: Vec<String>,

    /// Where remote mirrors are kept. Defaults to `<user cache dir>/folio`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    cache_dir: Option<PathBuf>,

    /// Update cached mirrors from their remotes.
    #[serde(default)]
    fetch: bool,

    /// Proxy settings for HTTP(S) remotes.
    #[serde(default)]
    network: ProxyConfig,

    /// git-credentials file with per-host credentials.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    credentials_path: Option<PathBuf>,

    /// Attributes every component version starts from.
    #[serde(default)]
    attributes: AttributeMap,

    /// Sources processed at once.
    #[serde(default = "default_concurrency")]
    concurrency: usize,

    /// Clone timeout in seconds.
    #[serde(default = "default_clone_timeout_secs")]
    clone_timeout_secs: u64,

    /// Fetch timeout in seconds.
    #[serde(default = "default_fetch_timeout_secs")]
    fetch_timeout_secs: u64,

    /// Directory relative local source paths are resolved against.
    #[serde(default = "default_base_dir")]
    base_dir: PathBuf,
}

fn default_branches() -> Vec<String> {
    DEFAULT_BRANCH_PATTERNS.iter().map(|p| p.to_string()).collect()
}

fn default_concurrency() -> usize {
    8
}

fn default_clone_timeout_secs() -> u64 {
    120
}

fn default_fetch_timeout_secs() -> u64 {
    30
}

fn default_base_dir() -> PathBuf {
    PathBuf::from(".")
}

impl Default for AggregatorConfig {
    fn default() -> Self {
        Self {
            sources: Vec::new(),
            branches: default_branches(),
            cache_dir: None,
            fetch: false,
            network: ProxyConfig::default(),
            credentials_path: None,
            attributes: AttributeMap::new(),
            concurrency: default_concurrency(),
            clone_timeout_secs: default_clone_timeout_secs(),
            fetch_timeout_secs: default_fetch_timeout_secs(),
            base_dir: default_base_dir(),
        }
    }
}

impl AggregatorConfig {
    /// Creates a new builder for AggregatorConfig.
    pub fn builder() -> AggregatorConfigBuilder {
        AggregatorConfigBuilder::default()
    }

    pub fn sources(&self) -> &[ContentSource] {
        &self.sources
    }

    pub fn branches(&self) -> &[String] {
        &self.branches
    }

    /// Cache directory, falling back to the user cache dir.
    pub fn cache_dir(&self) -> PathBuf {
        self.cache_dir.clone().unwrap_or_else(default_cache_dir)
    }

    pub fn fetch(&self) -> bool {
        self.fetch
    }

    pub fn network(&self) -> &ProxyConfig {
        &self.network
    }

    pub fn credentials_path(&self) -> Option<&Path> {
        self.credentials_path.as_deref()
    }

    pub fn attributes(&self) -> &AttributeMap {
        &self.attributes
    }

    /// Concurrency limit, never below one.
    pub fn concurrency(&self) -> usize {
        self.concurrency.max(1)
    }

    pub fn clone_timeout(&self) -> Duration {
        Duration::from_secs(self.clone_timeout_secs)
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Checks settings that do not depend on any repository.
    pub fn validate(&self) -> Result<()> {
        if self.sources.is_empty() {
            return Err(AggregateError::config("at least one content source is required"));
        }
        if self.branches.is_empty() {
            return Err(AggregateError::config("default branch patterns cannot be empty"));
        }
        if self.clone_timeout_secs == 0 || self.fetch_timeout_secs == 0 {
            return Err(AggregateError::config("timeouts must be at least one second"));
        }
        Ok(())
    }
}

/// Builder for AggregatorConfig.
#[derive(Debug, Default)]
pub struct AggregatorConfigBuilder {
    config: AggregatorConfig,
}

impl AggregatorConfigBuilder {
    /// Adds a content source.
    pub fn source(mut self, source: ContentSource) -> Self {
        self.config.sources.push(source);
        self
    }

    /// Sets the default branch patterns.
    pub fn branches<I, S>(mut self, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config.branches = patterns.into_iter().map(Into::into).collect();
        self
    }

    pub fn cache_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.cache_dir = Some(dir.into());
        self
    }

    pub fn fetch(mut self, fetch: bool) -> Self {
        self.config.fetch = fetch;
        self
    }

    pub fn network(mut self, network: ProxyConfig) -> Self {
        self.config.network = network;
        self
    }

    pub fn credentials_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.credentials_path = Some(path.into());
        self
    }

    pub fn attributes(mut self, attributes: AttributeMap) -> Self {
        self.config.attributes = attributes;
        self
    }

    pub fn concurrency(mut self, concurrency: usize) -> Self {
        self.config.concurrency = concurrency;
        self
    }

    pub fn clone_timeout(mut self, timeout: Duration) -> Self {
        self.config.clone_timeout_secs = timeout.as_secs();
        self
    }

    pub fn fetch_timeout(mut self, timeout: Duration) -> Self {
        self.config.fetch_timeout_secs = timeout.as_secs();
        self
    }

    pub fn base_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.base_dir = dir.into();
        self
    }

    /// Builds the configuration.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if no source was added or a limit is invalid.
    pub fn build(self) -> Result<AggregatorConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}
