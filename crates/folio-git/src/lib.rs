//! # Folio Git Aggregation
//!
//! Reads documentation components out of git repositories and builds a
//! [`folio_core::ContentCatalog`] from them.
//!
//! ## Features
//!
//! - Pure Rust git access via `gix`, no system git required
//! - Bare mirror cache with a validity marker, reused across runs
//! - Branch and tag selection with glob patterns and negations
//! - Several component start paths per repository
//! - Edit links derived from the hosting service
//! - Concurrent, bounded source processing with deterministic results
//!
//! ## Example
//!
//! ```ignore
//! use folio_git::{Aggregator, AggregatorConfig, ContentSource};
//!
//! let config = AggregatorConfig::builder()
//!     .source(
//!         ContentSource::new("https://github.com/acme/server-docs.git")
//!             .branches(["v2.*", "main"]),
//!     )
//!     .source(ContentSource::new("./docs"))
//!     .build()?;
//!
//! let aggregation = Aggregator::new(config)?.run().await?;
//! let latest = aggregation.catalog.latest("server");
//! ```

pub mod aggregate;
pub mod config;
pub mod error;
pub mod reader;
pub mod repository;
pub mod source;

// Re-exports
pub use aggregate::{Aggregation, Aggregator};
pub use config::{AggregatorConfig, AggregatorConfigBuilder};
pub use error::{AggregateError, Result};
pub use reader::{ComponentDescriptor, WalkResult};
pub use repository::{
    CredentialStore, GitRef, GitRepository, Location, MirrorTransport, ProgressObserver,
    ProxyConfig, RepositoryManager,
};
pub use source::{ContentSource, EditUrl, PatternList, SourceResolver, WorkItem};

// Re-export folio_core for consumers
pub use folio_core;
