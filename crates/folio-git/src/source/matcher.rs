//! Ref name patterns.
//!
//! Patterns are restricted globs: `*` and `?` never match `/`, `[...]` matches
//! one character from a set, and `**` is rejected. A leading `!` turns a
//! pattern into an exclude. `HEAD` (or `.`) stands for the repository's current
//! branch.

use std::collections::HashMap;
use std::sync::Arc;

use glob::{MatchOptions, Pattern};
use parking_lot::Mutex;
use tracing::debug;

use crate::error::{AggregateError, Result};
use crate::repository::GitRef;

/// Branch patterns used when a source declares none. Both `main` and `master`
/// count as mainline branches.
pub const DEFAULT_BRANCH_PATTERNS: &[&str] = &["v*", "main", "master"];

const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: true,
    require_literal_leading_dot: false,
};

/// One compiled pattern.
#[derive(Debug)]
pub struct RefPattern {
    raw: String,
    exclude: bool,
    kind: PatternKind,
}

#[derive(Debug)]
enum PatternKind {
    CurrentBranch,
    Glob(Pattern),
}

impl RefPattern {
    fn compile(raw: &str) -> Result<Self> {
        let (exclude, body) = match raw.strip_prefix('!') {
            Some(body) => (true, body),
            None => (false, raw),
        };
        if body.is_empty() {
            return Err(AggregateError::config(format!("empty ref pattern '{}'", raw)));
        }
        if body.contains("**") {
            return Err(AggregateError::config(format!(
                "'**' is not supported in ref patterns: '{}'",
                raw
            )));
        }

        let kind = if body == "HEAD" || body == "." {
            PatternKind::CurrentBranch
        } else {
            let pattern = Pattern::new(body).map_err(|e| {
                AggregateError::config(format!("invalid ref pattern '{}': {}", raw, e))
            })?;
            PatternKind::Glob(pattern)
        };

        Ok(Self {
            raw: raw.to_string(),
            exclude,
            kind,
        })
    }

    /// The pattern as written.
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn is_exclude(&self) -> bool {
        self.exclude
    }

    fn matches(&self, name: &str, current_branch: Option<&str>) -> bool {
        match &self.kind {
            PatternKind::CurrentBranch => current_branch == Some(name),
            PatternKind::Glob(pattern) => pattern.matches_with(name, MATCH_OPTIONS),
        }
    }
}

/// Compiled patterns for one aggregation run, keyed by pattern text.
///
/// Sources that repeat a pattern share its compiled form.
#[derive(Debug, Default)]
pub struct PatternCache {
    compiled: Mutex<HashMap<String, Arc<RefPattern>>>,
}

impl PatternCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Compiles `raw`, or returns the cached compilation.
    pub fn compile(&self, raw: &str) -> Result<Arc<RefPattern>> {
        if let Some(pattern) = self.compiled.lock().get(raw) {
            return Ok(Arc::clone(pattern));
        }

        let pattern = Arc::new(RefPattern::compile(raw)?);
        debug!(pattern = raw, "Compiled ref pattern");
        self.compiled
            .lock()
            .insert(raw.to_string(), Arc::clone(&pattern));
        Ok(pattern)
    }

    /// Builds a matcher from a list of include and exclude patterns.
    pub fn matcher<S: AsRef<str>>(&self, patterns: &[S]) -> Result<RefMatcher> {
        let mut includes = Vec::new();
        let mut excludes = Vec::new();
        for raw in patterns {
            let pattern = self.compile(raw.as_ref().trim())?;
            if pattern.is_exclude() {
                excludes.push(pattern);
            } else {
                includes.push(pattern);
            }
        }
        Ok(RefMatcher { includes, excludes })
    }

    /// Number of distinct patterns compiled so far.
    pub fn len(&self) -> usize {
        self.compiled.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.compiled.lock().is_empty()
    }
}

/// Decides which refs a source selects.
#[derive(Debug, Clone)]
pub struct RefMatcher {
    includes: Vec<Arc<RefPattern>>,
    excludes: Vec<Arc<RefPattern>>,
}

impl RefMatcher {
    /// A ref is selected when it matches an include and no exclude.
    pub fn matches(&self, name: &str, current_branch: Option<&str>) -> bool {
        self.includes.iter().any(|p| p.matches(name, current_branch))
            && !self.excludes.iter().any(|p| p.matches(name, current_branch))
    }

    /// Filters `refs`, keeping their order.
    pub fn select<'a>(&self, refs: &'a [GitRef], current_branch: Option<&str>) -> Vec<&'a GitRef> {
        refs.iter()
            .filter(|r| self.matches(&r.name, current_branch))
            .collect()
    }

    /// True when a pattern refers to the current branch.
    pub fn uses_current_branch(&self) -> bool {
        self.includes
            .iter()
            .chain(&self.excludes)
            .any(|p| matches!(p.kind, PatternKind::CurrentBranch))
    }

    pub fn is_empty(&self) -> bool {
        self.includes.is_empty()
    }
}
