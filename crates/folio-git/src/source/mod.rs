//! Content sources: configuration, ref selection and work items.

mod content_source;
pub mod edit_url;
mod matcher;
mod resolver;

pub use content_source::{ContentSource, EditUrl, PatternList};
pub use matcher::{DEFAULT_BRANCH_PATTERNS, PatternCache, RefMatcher, RefPattern};
pub use resolver::{PreparedSource, SourceResolver, WorkItem};
