//! Error types for catalog operations.
//!
//! This module defines the errors raised while building a content catalog
//! and while parsing resource IDs against it. All errors implement the
//! standard `std::error::Error` trait via `thiserror`.
//!
//! A resource ID that is well formed but names nothing is *not* an error:
//! resolution returns `Ok(None)` in that case.
//!
//! # Example
//!
//! ```
//! use folio_core::{CatalogError, Result};
//!
//! fn require_family(name: &str) -> Result<()> {
//!     if name.is_empty() {
//!         return Err(CatalogError::invalid_resource_id(name, "family cannot be empty"));
//!     }
//!     Ok(())
//! }
//!
//! assert!(require_family("").unwrap_err().is_syntax_error());
//! ```

use thiserror::Error;

use crate::types::{Origin, ResourceKey};

/// Main error type for catalog operations.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// Two different origins produced the same component version.
    #[error(
        "Duplicate version detected for component '{name}': version '{version}' found in {first} and {second}"
    )]
    ComponentVersionConflict {
        /// Component name
        name: String,
        /// Version both origins declared
        version: String,
        /// Origin registered first
        first: Box<Origin>,
        /// Origin that collided with it
        second: Box<Origin>,
    },

    /// A resource ID did not match the grammar or was rejected by the family allowlist.
    #[error("Invalid resource ID syntax '{spec}': {reason}")]
    InvalidResourceIdSyntax {
        /// The raw ID as supplied by the caller
        spec: String,
        /// Why it was rejected
        reason: String,
    },

    /// Two files resolved to the same catalog key.
    #[error("Duplicate file {key}: already contributed by {existing}, rejected from {rejected}")]
    DuplicateFile {
        /// The colliding key
        key: ResourceKey,
        /// Origin of the file already in the catalog
        existing: Box<Origin>,
        /// Origin of the file that was dropped
        rejected: Box<Origin>,
    },

    /// A file was added for a component version that was never registered.
    #[error("File {key} belongs to a component version that was never registered")]
    UnknownComponentVersion {
        /// Key of the rejected file
        key: ResourceKey,
    },

    /// A page alias collides with an existing page or alias.
    #[error("Page alias {alias} declared by {page} collides with an existing {existing}")]
    DuplicateAlias {
        /// Key the alias would occupy
        alias: ResourceKey,
        /// Page declaring the alias
        page: ResourceKey,
        /// Family of the file already holding that key
        existing: String,
    },

    /// A page alias could not be placed because its component version is unknown.
    #[error("Page alias '{spec}' declared by {page} cannot be placed: {reason}")]
    UnresolvedAliasTarget {
        /// The alias as written in the page header
        spec: String,
        /// Page declaring the alias
        page: ResourceKey,
        /// What was missing
        reason: String,
    },
}

impl CatalogError {
    /// Creates a ComponentVersionConflict error.
    pub fn conflict(
        name: impl Into<String>,
        version: impl Into<String>,
        first: Origin,
        second: Origin,
    ) -> Self {
        Self::ComponentVersionConflict {
            name: name.into(),
            version: version.into(),
            first: Box::new(first),
            second: Box::new(second),
        }
    }

    /// Creates an InvalidResourceIdSyntax error.
    pub fn invalid_resource_id(spec: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidResourceIdSyntax {
            spec: spec.into(),
            reason: reason.into(),
        }
    }

    /// Returns true for errors that must fail the whole build.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::ComponentVersionConflict { .. })
    }

    /// Returns true if the error came from resource ID parsing.
    pub fn is_syntax_error(&self) -> bool {
        matches!(self, Self::InvalidResourceIdSyntax { .. })
    }
}

/// Result type alias using CatalogError.
pub type Result<T> = std::result::Result<T, CatalogError>;
