//! Error types for content aggregation.

use std::path::PathBuf;

use folio_core::CatalogError;

/// Errors that can occur while aggregating content from git repositories.
///
/// URLs carried by these errors are always redacted; credentials never appear
/// in messages or logs.
#[derive(Debug, thiserror::Error)]
pub enum AggregateError {
    /// A content source or setting is invalid. Raised before any network access.
    #[error("invalid configuration: {0}")]
    Configuration(String),

    /// A clone or fetch failed.
    #[error("{operation} failed for {url} (cache: {cache_path}): {reason}")]
    Network {
        url: String,
        operation: String,
        cache_path: PathBuf,
        reason: String,
    },

    /// A local content source does not point at a git repository.
    #[error("local content source is not a git repository: {path}")]
    NotAGitRepository { path: PathBuf },

    /// A ref has no component descriptor at its start path.
    #[error(
        "{} not found in {url} ({kind}: {refname} | start path: {start_path})",
        folio_core::layout::DESCRIPTOR_FILENAME
    )]
    MissingDescriptor {
        url: String,
        refname: String,
        kind: String,
        start_path: String,
    },

    /// A component descriptor could not be read.
    #[error("invalid component descriptor in {url} ({refname} | start path: {start_path}): {reason}")]
    InvalidDescriptor {
        url: String,
        refname: String,
        start_path: String,
        reason: String,
    },

    /// A ref or path does not exist in a repository.
    #[error("not found: {0}")]
    NotFound(String),

    /// A git operation on a local object store failed.
    #[error("git error: {0}")]
    Git(String),

    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The catalog rejected a contribution.
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    /// No content source produced a component version.
    #[error("no component versions were found in any content source")]
    NoContent,
}

impl AggregateError {
    /// Creates a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    /// Creates a new Git error.
    pub fn git(msg: impl Into<String>) -> Self {
        Self::Git(msg.into())
    }

    /// Creates a network error for `operation` on `url`.
    pub fn network(
        url: impl Into<String>,
        operation: impl Into<String>,
        cache_path: impl Into<PathBuf>,
        reason: impl Into<String>,
    ) -> Self {
        Self::Network {
            url: url.into(),
            operation: operation.into(),
            cache_path: cache_path.into(),
            reason: reason.into(),
        }
    }

    /// Returns true if this error must fail the whole aggregation.
    pub fn is_fatal(&self) -> bool {
        match self {
            Self::Configuration(_) | Self::NoContent => true,
            Self::Catalog(err) => err.is_fatal(),
            _ => false,
        }
    }

    /// Returns true if this error came from talking to a remote.
    pub fn is_network(&self) -> bool {
        matches!(self, Self::Network { .. })
    }

    /// Returns true if the ref was skipped for lack of a usable descriptor.
    pub fn is_descriptor_problem(&self) -> bool {
        matches!(
            self,
            Self::MissingDescriptor { .. } | Self::InvalidDescriptor { .. }
        )
    }
}

/// Result type alias using AggregateError.
pub type Result<T> = std::result::Result<T, AggregateError>;
