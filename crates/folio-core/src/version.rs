//! Deterministic version ordering.
//!
//! Versions whose text (after an optional `v` prefix) reads as a semantic
//! version are compared numerically; a missing minor or patch number counts
//! as `0`, so `2.0` and `v2` are both read as `2.0.0`. Named versions such as
//! `main` or `next` rank above every semantic version and compare by text
//! among themselves.

use std::cmp::Ordering;

use semver::Version;

/// Parses a version string leniently into a semantic version.
///
/// # Example
///
/// ```
/// use folio_core::version::parse_semantic;
///
/// assert_eq!(parse_semantic("v2.1").unwrap().to_string(), "2.1.0");
/// assert!(parse_semantic("main").is_none());
/// ```
pub fn parse_semantic(version: &str) -> Option<Version> {
    let text = match version.strip_prefix('v') {
        Some(rest) if rest.starts_with(|c: char| c.is_ascii_digit()) => rest,
        _ => version,
    };

    let split = text.find(['-', '+']).unwrap_or(text.len());
    let (core, suffix) = text.split_at(split);

    let parts: Vec<&str> = core.split('.').collect();
    if parts.is_empty()
        || parts.len() > 3
        || parts
            .iter()
            .any(|part| part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()))
    {
        return None;
    }

    let mut padded = parts.join(".");
    for _ in parts.len()..3 {
        padded.push_str(".0");
    }
    padded.push_str(suffix);

    Version::parse(&padded).ok()
}

/// Compares two versions in ascending order.
pub fn compare_versions(a: &str, b: &str) -> Ordering {
    if a == b {
        return Ordering::Equal;
    }

    match (parse_semantic(a), parse_semantic(b)) {
        // Equal precedence (e.g. `1.0` vs `1.0.0`) falls back to the text so the order is total.
        (Some(va), Some(vb)) => va.cmp(&vb).then_with(|| a.cmp(b)),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => a.cmp(b),
    }
}

/// Sorts versions newest first.
pub fn sort_descending<S: AsRef<str>>(versions: &mut [S]) {
    versions.sort_by(|a, b| compare_versions(b.as_ref(), a.as_ref()));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_semantic_padding() {
        assert_eq!(parse_semantic("2").unwrap(), Version::new(2, 0, 0));
        assert_eq!(parse_semantic("2.0").unwrap(), Version::new(2, 0, 0));
        assert_eq!(parse_semantic("v1.10.3").unwrap(), Version::new(1, 10, 3));
    }

    #[test]
    fn test_parse_semantic_keeps_prerelease() {
        let version = parse_semantic("3.0-beta.1").unwrap();
        assert_eq!(version.to_string(), "3.0.0-beta.1");
    }

    #[test]
    fn test_parse_semantic_rejects_named() {
        assert!(parse_semantic("main").is_none());
        assert!(parse_semantic("v").is_none());
        assert!(parse_semantic("1.x").is_none());
        assert!(parse_semantic("1.2.3.4").is_none());
        assert!(parse_semantic("").is_none());
    }

    #[test]
    fn test_numeric_not_lexicographic() {
        assert_eq!(compare_versions("1.10", "1.9"), Ordering::Greater);
        assert_eq!(compare_versions("v2.0", "10.0"), Ordering::Less);
    }

    #[test]
    fn test_named_above_semantic() {
        assert_eq!(compare_versions("main", "99.0"), Ordering::Greater);
        assert_eq!(compare_versions("1.0", "dev"), Ordering::Less);
        assert_eq!(compare_versions("next", "main"), Ordering::Greater);
    }

    #[test]
    fn test_equal_precedence_is_still_total() {
        assert_ne!(compare_versions("1.0", "1.0.0"), Ordering::Equal);
        assert_eq!(
            compare_versions("1.0", "1.0.0"),
            compare_versions("1.0.0", "1.0").reverse()
        );
    }

    #[test]
    fn test_sort_descending() {
        let mut versions = vec!["1.0", "main", "2.0", "1.10", "2.0-rc.1"];
        sort_descending(&mut versions);
        assert_eq!(versions, vec!["main", "2.0", "2.0-rc.1", "1.10", "1.0"]);
    }
}
