//! Turns content sources into concrete (repository, ref, start path) work items.

use std::path::Path;
use std::sync::Arc;

use folio_core::{Origin, RefKind};
use tracing::{debug, info};

use super::content_source::ContentSource;
use super::edit_url;
use super::matcher::{PatternCache, RefMatcher};
use crate::error::Result;
use crate::repository::{GitRef, GitRepository, Location, RepositoryManager};

/// One ref of one repository, read from one start path.
#[derive(Debug, Clone)]
pub struct WorkItem {
    /// Position of the originating source in the configuration.
    pub source_index: usize,
    pub repository: Arc<GitRepository>,
    pub git_ref: GitRef,
    /// Directory holding the component descriptor; empty for the repository root.
    pub start_path: String,
    /// Edit-URL template for this item's files.
    pub edit_url: Option<String>,
}

impl WorkItem {
    /// Where files read for this item come from.
    pub fn origin(&self) -> Origin {
        let mut origin = Origin::new(
            self.repository.url(),
            self.git_ref.name.clone(),
            self.git_ref.kind,
            self.start_path.clone(),
        );
        origin.refhash = Some(self.git_ref.hash());
        origin.web_url = self.repository.web_url().map(String::from);
        origin.local = self.repository.is_local();
        origin
    }

    /// Path of `relative` (below the start path) inside the repository.
    pub fn repo_path(&self, relative: &str) -> String {
        if self.start_path.is_empty() {
            relative.to_string()
        } else {
            format!("{}/{}", self.start_path, relative)
        }
    }

    /// Edit link for the file at repository path `path`.
    pub fn edit_url_for(&self, path: &str) -> Option<String> {
        let template = self.edit_url.as_deref()?;
        Some(edit_url::render(
            template,
            self.repository.web_url(),
            &self.git_ref.name,
            &self.git_ref.hash(),
            path,
        ))
    }
}

/// A source whose configuration has been validated.
#[derive(Debug, Clone)]
pub struct PreparedSource {
    pub index: usize,
    pub source: ContentSource,
    pub location: Location,
    branches: RefMatcher,
    tags: Option<RefMatcher>,
    start_paths: Vec<String>,
}

impl PreparedSource {
    pub fn start_paths(&self) -> &[String] {
        &self.start_paths
    }

    /// Opens the source's repository and lists its work items.
    ///
    /// Items are ordered branches first, then tags (each by name), then by
    /// start path in declaration order.
    pub async fn resolve(&self, manager: &RepositoryManager) -> Result<Vec<WorkItem>> {
        let repository = manager.resolve_repository(&self.location).await?;

        let current_branch = if self.branches.uses_current_branch()
            || self.tags.as_ref().is_some_and(RefMatcher::uses_current_branch)
        {
            repository.current_branch().await?
        } else {
            None
        };

        let branches = repository.list_refs(RefKind::Branch).await?;
        let mut selected: Vec<GitRef> = self
            .branches
            .select(&branches, current_branch.as_deref())
            .into_iter()
            .cloned()
            .collect();

        if let Some(tag_matcher) = &self.tags {
            let tags = repository.list_refs(RefKind::Tag).await?;
            selected.extend(
                tag_matcher
                    .select(&tags, current_branch.as_deref())
                    .into_iter()
                    .cloned(),
            );
        }

        let host = match &self.location {
            Location::Remote(remote) => remote.host().map(String::from),
            Location::Local(_) => None,
        };

        let mut items = Vec::with_capacity(selected.len() * self.start_paths.len());
        for git_ref in selected {
            let template = edit_url::template_for(
                &self.source.edit_url,
                repository.web_url(),
                host.as_deref(),
                git_ref.kind,
            );
            for start_path in &self.start_paths {
                debug!(
                    url = %repository.url(),
                    refname = %git_ref.name,
                    start_path = %start_path,
                    "Selected work item"
                );
                items.push(WorkItem {
                    source_index: self.index,
                    repository: Arc::clone(&repository),
                    git_ref: git_ref.clone(),
                    start_path: start_path.clone(),
                    edit_url: template.clone(),
                });
            }
        }

        info!(url = %repository.url(), items = items.len(), "Resolved content source");
        Ok(items)
    }
}

/// Resolves content sources against their repositories.
pub struct SourceResolver<'a> {
    manager: &'a RepositoryManager,
    patterns: &'a PatternCache,
    default_branches: &'a [String],
    base_dir: &'a Path,
}

impl<'a> SourceResolver<'a> {
    pub fn new(
        manager: &'a RepositoryManager,
        patterns: &'a PatternCache,
        default_branches: &'a [String],
        base_dir: &'a Path,
    ) -> Self {
        Self {
            manager,
            patterns,
            default_branches,
            base_dir,
        }
    }

    /// Validates every source before anything touches the network.
    ///
    /// # Errors
    ///
    /// The first configuration error found: a bad URL or protocol, an invalid
    /// ref pattern, or a start path outside the repository.
    pub fn prepare(&self, sources: &[ContentSource]) -> Result<Vec<PreparedSource>> {
        sources
            .iter()
            .enumerate()
            .map(|(index, source)| {
                let location = Location::parse(&source.url, self.base_dir)?;
                let branches = match &source.branches {
                    Some(patterns) => self.patterns.matcher(patterns.as_slice())?,
                    None => self.patterns.matcher(self.default_branches)?,
                };
                let tags = source
                    .tags
                    .as_ref()
                    .map(|patterns| self.patterns.matcher(patterns.as_slice()))
                    .transpose()?;
                let start_paths = source.normalized_start_paths()?;

                Ok(PreparedSource {
                    index,
                    source: source.clone(),
                    location,
                    branches,
                    tags,
                    start_paths,
                })
            })
            .collect()
    }

    /// Opens the source's repository and lists its work items.
    pub async fn resolve(&self, prepared: &PreparedSource) -> Result<Vec<WorkItem>> {
        prepared.resolve(self.manager).await
    }

    /// Prepares and resolves every source in order.
    pub async fn resolve_all(&self, sources: &[ContentSource]) -> Result<Vec<WorkItem>> {
        let prepared = self.prepare(sources)?;
        let mut items = Vec::new();
        for source in &prepared {
            items.extend(self.resolve(source).await?);
        }
        Ok(items)
    }
}
