//! Git reference types.

use std::fmt;

use folio_core::RefKind;

/// A branch or tag, resolved to the commit it points at.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct GitRef {
    /// Short name, e.g. `main` or `v1.0.0`.
    pub name: String,
    pub kind: RefKind,
    /// Peeled commit id.
    pub oid: gix::ObjectId,
}

impl GitRef {
    /// Creates a branch reference.
    pub fn branch(name: impl Into<String>, oid: gix::ObjectId) -> Self {
        Self {
            name: name.into(),
            kind: RefKind::Branch,
            oid,
        }
    }

    /// Creates a tag reference.
    pub fn tag(name: impl Into<String>, oid: gix::ObjectId) -> Self {
        Self {
            name: name.into(),
            kind: RefKind::Tag,
            oid,
        }
    }

    /// Returns true if this is a branch reference.
    pub fn is_branch(&self) -> bool {
        self.kind == RefKind::Branch
    }

    /// Returns true if this is a tag reference.
    pub fn is_tag(&self) -> bool {
        self.kind == RefKind::Tag
    }

    /// Full name in the local repository, e.g. `refs/heads/main`.
    pub fn full_ref(&self) -> String {
        match self.kind {
            RefKind::Branch => format!("refs/heads/{}", self.name),
            RefKind::Tag => format!("refs/tags/{}", self.name),
        }
    }

    /// Commit id as lowercase hex.
    pub fn hash(&self) -> String {
        self.oid.to_string()
    }

    /// Validates the reference name.
    ///
    /// Returns an error message if the name is invalid.
    pub fn validate(&self) -> Result<(), &'static str> {
        validate_name(&self.name)
    }
}

/// Checks a short ref name against git's naming rules.
pub fn validate_name(name: &str) -> Result<(), &'static str> {
    if name.is_empty() {
        return Err("reference name cannot be empty");
    }

    if name.starts_with('/') || name.ends_with('/') {
        return Err("reference name cannot start or end with '/'");
    }

    if name.contains("..") {
        return Err("reference name cannot contain '..'");
    }

    if name.contains("//") {
        return Err("reference name cannot contain '//'");
    }

    if name.chars().any(|c| {
        c.is_control() || matches!(c, ' ' | '~' | '^' | ':' | '?' | '*' | '[' | '\\')
    }) {
        return Err("reference name contains invalid characters");
    }

    Ok(())
}

/// Sorts refs by name and drops repeated names of the same kind, keeping the first.
pub(crate) fn sort_and_dedupe(refs: &mut Vec<GitRef>) {
    refs.sort_by(|a, b| a.name.cmp(&b.name));
    refs.dedup_by(|later, earlier| later.name == earlier.name && later.kind == earlier.kind);
}

impl fmt::Display for GitRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn oid(byte: u8) -> gix::ObjectId {
        gix::ObjectId::from_bytes_or_panic(&[byte; 20])
    }

    #[test]
    fn test_full_ref() {
        assert_eq!(GitRef::branch("main", oid(1)).full_ref(), "refs/heads/main");
        assert_eq!(GitRef::tag("v1.0.0", oid(1)).full_ref(), "refs/tags/v1.0.0");
    }

    #[test]
    fn test_display() {
        assert_eq!(GitRef::branch("main", oid(1)).to_string(), "branch: main");
        assert_eq!(GitRef::tag("v1.0.0", oid(1)).to_string(), "tag: v1.0.0");
        assert_eq!(GitRef::tag("v1.0.0", oid(0xab)).hash(), "ab".repeat(20));
    }

    #[test]
    fn test_validate() {
        assert!(GitRef::branch("main", oid(1)).validate().is_ok());
        assert!(GitRef::branch("feature/test", oid(1)).validate().is_ok());
        assert!(GitRef::tag("v1.0.0", oid(1)).validate().is_ok());

        assert!(validate_name("").is_err());
        assert!(validate_name("/main").is_err());
        assert!(validate_name("main/").is_err());
        assert!(validate_name("main..branch").is_err());
        assert!(validate_name("main branch").is_err());
    }

    #[test]
    fn test_sort_and_dedupe() {
        let mut refs = vec![
            GitRef::branch("v2.0", oid(2)),
            GitRef::branch("main", oid(1)),
            GitRef::branch("v2.0", oid(3)),
            GitRef::branch("v1.0", oid(4)),
        ];
        sort_and_dedupe(&mut refs);

        let names: Vec<_> = refs.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["main", "v1.0", "v2.0"]);
        // Stable sort keeps the first occurrence.
        assert_eq!(refs[2].oid, oid(2));
    }
}
