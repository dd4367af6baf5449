//! Document attribute maps and their merge rules.

use indexmap::IndexMap;
use serde_json::Value;

/// Ordered map of document attribute names to values.
///
/// A `false` or `null` value records that the attribute is unset at that scope.
pub type AttributeMap = IndexMap<String, Value>;

/// Merges scoped attributes over a base set.
///
/// # Rules
/// 1. Keys only present in `base` are kept in their original order.
/// 2. Keys present in `scoped` overwrite the base value in place.
/// 3. Keys only present in `scoped` are appended.
///
/// Values are replaced whole; attribute values are never merged recursively.
pub fn merge_attributes(base: &AttributeMap, scoped: &AttributeMap) -> AttributeMap {
    let mut merged = base.clone();
    for (name, value) in scoped {
        merged.insert(name.clone(), value.clone());
    }
    merged
}

/// Returns true if the attribute is set (present and not `false`/`null`).
pub fn is_set(attributes: &AttributeMap, name: &str) -> bool {
    !matches!(attributes.get(name), None | Some(Value::Null) | Some(Value::Bool(false)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn map(value: Value) -> AttributeMap {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_scoped_wins_on_conflict() {
        let base = map(json!({"product": "Folio", "source-highlighter": "rouge"}));
        let scoped = map(json!({"product": "Folio Server", "experimental": ""}));

        let merged = merge_attributes(&base, &scoped);

        assert_eq!(merged["product"], "Folio Server");
        assert_eq!(merged["source-highlighter"], "rouge");
        assert_eq!(merged["experimental"], "");
    }

    #[test]
    fn test_order_is_preserved() {
        let base = map(json!({"a": 1, "b": 2}));
        let scoped = map(json!({"c": 3, "a": 10}));

        let merged = merge_attributes(&base, &scoped);
        let keys: Vec<&str> = merged.keys().map(String::as_str).collect();

        assert_eq!(keys, vec!["a", "b", "c"]);
        assert_eq!(merged["a"], 10);
    }

    #[test]
    fn test_unset_by_scope() {
        let base = map(json!({"toc": "left"}));
        let scoped = map(json!({"toc": false}));

        let merged = merge_attributes(&base, &scoped);

        assert!(is_set(&base, "toc"));
        assert!(!is_set(&merged, "toc"));
        assert!(!is_set(&merged, "missing"));
    }
}
