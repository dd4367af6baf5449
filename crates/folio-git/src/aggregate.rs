//! The aggregation pipeline.
//!
//! Sources are resolved and read concurrently, bounded by a semaphore. Their
//! results are then fed to one [`CatalogBuilder`] in source declaration order,
//! so the outcome does not depend on which repository answered first.

use std::sync::Arc;
use std::time::Instant;

use folio_core::{CatalogBuilder, CatalogError, ContentCatalog, Origin, Registration};
use tokio::sync::Semaphore;
use tokio::task::JoinError;
use tracing::{debug, error, info, warn};

use crate::config::AggregatorConfig;
use crate::error::{AggregateError, Result};
use crate::reader::{self, ComponentDescriptor, WalkResult};
use crate::repository::{CredentialStore, RepositoryManager};
use crate::source::{PatternCache, PreparedSource, SourceResolver};

/// The result of a successful run.
#[derive(Debug)]
pub struct Aggregation {
    pub catalog: Arc<ContentCatalog>,
    /// Problems that did not stop the run: skipped refs, failed sources,
    /// duplicate files and misplaced aliases.
    pub warnings: Vec<AggregateError>,
}

/// What one work item contributed.
struct Contribution {
    origin: Arc<Origin>,
    descriptor: ComponentDescriptor,
    walked: WalkResult,
}

/// Everything read from one source.
struct SourceOutcome {
    index: usize,
    contributions: Vec<Contribution>,
    warnings: Vec<AggregateError>,
    failure: Option<AggregateError>,
}

impl SourceOutcome {
    fn failed(index: usize, error: AggregateError) -> Self {
        Self {
            index,
            contributions: Vec::new(),
            warnings: Vec::new(),
            failure: Some(error),
        }
    }
}

/// Runs aggregations for one configuration.
pub struct Aggregator {
    config: AggregatorConfig,
    manager: Arc<RepositoryManager>,
}

impl Aggregator {
    /// Creates an aggregator with the gix transport.
    ///
    /// # Errors
    ///
    /// Fails if the configuration is invalid or the credential store cannot be read.
    pub fn new(config: AggregatorConfig) -> Result<Self> {
        config.validate()?;

        let credentials = match config.credentials_path() {
            Some(path) => CredentialStore::load(path)?,
            None => CredentialStore::default(),
        };
        let manager = RepositoryManager::new(config.cache_dir())
            .with_fetch(config.fetch())
            .with_proxy(config.network().clone())
            .with_credentials(credentials)
            .with_timeouts(config.clone_timeout(), config.fetch_timeout());

        Ok(Self::with_manager(config, manager))
    }

    /// Creates an aggregator around a preconfigured repository manager.
    pub fn with_manager(config: AggregatorConfig, manager: RepositoryManager) -> Self {
        Self {
            config,
            manager: Arc::new(manager),
        }
    }

    pub fn config(&self) -> &AggregatorConfig {
        &self.config
    }

    pub fn manager(&self) -> &RepositoryManager {
        &self.manager
    }

    /// Reads every source and builds the catalog.
    ///
    /// # Errors
    ///
    /// - Configuration errors, before any repository is touched.
    /// - [`CatalogError::ComponentVersionConflict`], after every source has been read.
    /// - [`AggregateError::NoContent`] when no source produced a component version.
    ///
    /// Everything else is collected into [`Aggregation::warnings`].
    pub async fn run(&self) -> Result<Aggregation> {
        let started = Instant::now();
        self.config.validate()?;

        let patterns = PatternCache::new();
        let resolver = SourceResolver::new(
            &self.manager,
            &patterns,
            self.config.branches(),
            self.config.base_dir(),
        );
        let prepared = resolver.prepare(self.config.sources())?;
        info!(
            sources = prepared.len(),
            patterns = patterns.len(),
            concurrency = self.config.concurrency(),
            "Starting aggregation"
        );

        let outcomes = self.read_sources(prepared).await;

        let mut builder = CatalogBuilder::new();
        let mut warnings = Vec::new();
        let mut conflicts = Vec::new();
        for outcome in outcomes {
            warnings.extend(outcome.warnings);
            if let Some(failure) = outcome.failure {
                error!(source = outcome.index, error = %failure, "Content source failed");
                warnings.push(failure);
            }
            for contribution in outcome.contributions {
                self.register(&mut builder, contribution, &mut warnings, &mut conflicts);
            }
        }

        let (catalog, alias_errors) = builder.build();
        for alias_error in alias_errors {
            warn!(error = %alias_error, "Skipping page alias");
            warnings.push(alias_error.into());
        }

        for conflict in &conflicts {
            error!(error = %conflict, "Component version conflict");
        }
        if let Some(conflict) = conflicts.into_iter().next() {
            return Err(conflict.into());
        }
        if catalog.version_count() == 0 {
            return Err(AggregateError::NoContent);
        }

        info!(
            components = catalog.components().count(),
            versions = catalog.version_count(),
            files = catalog.len(),
            warnings = warnings.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Aggregation finished"
        );

        Ok(Aggregation {
            catalog: Arc::new(catalog),
            warnings,
        })
    }

    /// Reads all sources concurrently and returns their outcomes in source order.
    async fn read_sources(&self, prepared: Vec<PreparedSource>) -> Vec<SourceOutcome> {
        let semaphore = Arc::new(Semaphore::new(self.config.concurrency()));
        let mut tasks = Vec::with_capacity(prepared.len());

        for source in prepared {
            let index = source.index;
            let location = source.location.to_string();
            let manager = Arc::clone(&self.manager);
            let semaphore = Arc::clone(&semaphore);
            let handle = tokio::spawn(async move {
                let _permit = semaphore.acquire_owned().await.ok();
                read_source(source, &manager).await
            });
            tasks.push((index, location, handle));
        }

        let mut outcomes = Vec::with_capacity(tasks.len());
        for (index, location, handle) in tasks {
            outcomes.push(joined_outcome(index, &location, handle.await));
        }
        outcomes
    }

    fn register(
        &self,
        builder: &mut CatalogBuilder,
        contribution: Contribution,
        warnings: &mut Vec<AggregateError>,
        conflicts: &mut Vec<CatalogError>,
    ) {
        let Contribution {
            origin,
            descriptor,
            walked,
        } = contribution;
        let version =
            descriptor.into_component_version(origin.as_ref().clone(), self.config.attributes());

        match builder.register_version(version) {
            Ok(Registration::New) | Ok(Registration::Merged) => {},
            Err(conflict) => {
                conflicts.push(conflict);
                return;
            },
        }

        for file in walked.files {
            if let Err(e) = builder.add_file(file) {
                warn!(error = %e, "Skipping file");
                warnings.push(e.into());
            }
        }
        for (page, aliases) in walked.aliases {
            builder.add_page_aliases(page, aliases);
        }
    }
}

/// Turns a source task that panicked or was cancelled into a failure of that source.
fn joined_outcome(
    index: usize,
    location: &str,
    joined: std::result::Result<SourceOutcome, JoinError>,
) -> SourceOutcome {
    joined.unwrap_or_else(|e| {
        error!(source = index, url = %location, error = %e, "Content source task failed");
        let failure = AggregateError::git(format!("Reading {} failed: {}", location, e));
        SourceOutcome::failed(index, failure)
    })
}

/// Resolves one source and reads all of its work items.
///
/// A descriptor problem on a ref skips that ref, unless the ref is the only
/// one the source matched; then the whole source fails.
async fn read_source(source: PreparedSource, manager: &RepositoryManager) -> SourceOutcome {
    let index = source.index;
    let items = match source.resolve(manager).await {
        Ok(items) => items,
        Err(e) => return SourceOutcome::failed(index, e),
    };
    if items.is_empty() {
        let reason = format!("no refs of {} match the configured patterns", source.location);
        return SourceOutcome::failed(index, AggregateError::NotFound(reason));
    }

    let sole_ref = items.iter().all(|item| item.git_ref == items[0].git_ref);
    let mut outcome = SourceOutcome {
        index,
        contributions: Vec::new(),
        warnings: Vec::new(),
        failure: None,
    };

    for item in items {
        let descriptor = match reader::load_descriptor(&item).await {
            Ok(descriptor) => descriptor,
            Err(e) if sole_ref && e.is_descriptor_problem() => {
                outcome.contributions.clear();
                outcome.failure = Some(e);
                return outcome;
            },
            Err(e) => {
                warn!(error = %e, "Skipping ref");
                outcome.warnings.push(e);
                continue;
            },
        };

        let origin = Arc::new(item.origin());
        match reader::walk(&item, &descriptor, Arc::clone(&origin)).await {
            Ok(walked) => {
                debug!(
                    name = %descriptor.name,
                    version = %descriptor.version,
                    files = walked.files.len(),
                    "Read component version"
                );
                outcome.contributions.push(Contribution {
                    origin,
                    descriptor,
                    walked,
                });
            },
            Err(e) => {
                warn!(error = %e, "Skipping ref");
                outcome.warnings.push(e);
            },
        }
    }

    outcome
}
