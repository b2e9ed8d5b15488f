//! Flatten/unflatten of string leaves in arbitrary JSON values
//!
//! `extract` lists every string leaf depth-first, left to right: array
//! elements in order, object values in key order (insertion order, since
//! `serde_json` is built with `preserve_order`). `inject` walks the same
//! order and substitutes strings positionally. Both are the same exhaustive
//! match over `Value`, so their orders cannot drift apart.
//!
//! ```ignore
//! use serde_json::json;
//! use leafy_i18n::codec::{extract, inject};
//!
//! let value = json!({"a": "x", "b": [1, "y", {"c": "z"}]});
//! assert_eq!(extract(&value), vec!["x", "y", "z"]);
//! let translated = inject(&value, &["X".into(), "Y".into(), "Z".into()]);
//! assert_eq!(translated, json!({"a": "X", "b": [1, "Y", {"c": "Z"}]}));
//! ```

use serde_json::Value;
use tracing::debug;

/// All string leaves of `value`, in traversal order
pub fn extract(value: &Value) -> Vec<String> {
    let mut out = Vec::with_capacity(count(value));
    extract_into(value, &mut out);
    out
}

fn extract_into(value: &Value, out: &mut Vec<String>) {
    match value {
        Value::Array(items) => {
            for item in items {
                extract_into(item, out);
            }
        }
        Value::Object(map) => {
            for item in map.values() {
                extract_into(item, out);
            }
        }
        Value::String(s) => out.push(s.clone()),
        Value::Null | Value::Bool(_) | Value::Number(_) => {}
    }
}

/// Number of string slots in `value`
pub fn count(value: &Value) -> usize {
    match value {
        Value::Array(items) => items.iter().map(count).sum(),
        Value::Object(map) => map.values().map(count).sum(),
        Value::String(_) => 1,
        Value::Null | Value::Bool(_) | Value::Number(_) => 0,
    }
}

/// Rebuild `value` with its string leaves replaced by `translations`
///
/// Leaves beyond the end of `translations` keep their original text; extra
/// translations are ignored. Non-string leaves are copied unchanged.
pub fn inject(value: &Value, translations: &[String]) -> Value {
    let slots = count(value);
    if slots != translations.len() {
        debug!(
            slots,
            provided = translations.len(),
            "Translation list length differs from string slot count"
        );
    }
    let mut cursor = 0;
    inject_at(value, translations, &mut cursor)
}

fn inject_at(value: &Value, translations: &[String], cursor: &mut usize) -> Value {
    match value {
        Value::Array(items) => Value::Array(
            items
                .iter()
                .map(|item| inject_at(item, translations, cursor))
                .collect(),
        ),
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(key, item)| (key.clone(), inject_at(item, translations, cursor)))
                .collect(),
        ),
        Value::String(original) => {
            let replacement = translations.get(*cursor).unwrap_or(original);
            *cursor += 1;
            Value::String(replacement.clone())
        }
        Value::Null | Value::Bool(_) | Value::Number(_) => value.clone(),
    }
}

/// Same container kinds, lengths, keys and non-string leaves
pub fn same_shape(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Array(x), Value::Array(y)) => {
            x.len() == y.len() && x.iter().zip(y).all(|(p, q)| same_shape(p, q))
        }
        (Value::Object(x), Value::Object(y)) => {
            x.len() == y.len()
                && x
                    .iter()
                    .zip(y)
                    .all(|((kx, vx), (ky, vy))| kx == ky && same_shape(vx, vy))
        }
        (Value::String(_), Value::String(_)) => true,
        (x, y) => x == y,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_extract_nested() {
        let value = json!({"a": "x", "b": [1, "y", {"c": "z"}]});
        assert_eq!(extract(&value), strings(&["x", "y", "z"]));
    }

    #[test]
    fn test_inject_nested() {
        let value = json!({"a": "x", "b": [1, "y", {"c": "z"}]});
        let result = inject(&value, &strings(&["X", "Y", "Z"]));
        assert_eq!(result, json!({"a": "X", "b": [1, "Y", {"c": "Z"}]}));
        // Input untouched
        assert_eq!(value, json!({"a": "x", "b": [1, "y", {"c": "z"}]}));
    }

    #[test]
    fn test_object_order_is_insertion_order() {
        let value: Value = serde_json::from_str(r#"{"zeta": "1", "alpha": "2"}"#).unwrap();
        assert_eq!(extract(&value), strings(&["1", "2"]));
    }

    #[test]
    fn test_non_string_leaves_take_no_slot() {
        let value = json!([null, true, 3.5, "only", {"n": 0}]);
        assert_eq!(extract(&value), strings(&["only"]));
        assert_eq!(count(&value), 1);
        assert_eq!(
            inject(&value, &strings(&["ONLY"])),
            json!([null, true, 3.5, "ONLY", {"n": 0}])
        );
    }

    #[test]
    fn test_scalar_roots() {
        assert_eq!(extract(&json!("solo")), strings(&["solo"]));
        assert!(extract(&json!(42)).is_empty());
        assert_eq!(inject(&json!("solo"), &strings(&["SOLO"])), json!("SOLO"));
        assert_eq!(inject(&json!(42), &strings(&["x"])), json!(42));
    }

    #[test]
    fn test_round_trip_identity() {
        let value = json!({
            "labels": [{"label": "Bedrooms", "value": 3}, {"label": "Pool", "value": "yes"}],
            "title": "Villa",
            "empty": [],
            "nested": [[["deep"]]]
        });
        let replacement = strings(&["a", "b", "c", "d", "e"]);
        assert_eq!(count(&value), replacement.len());

        let injected = inject(&value, &replacement);
        assert_eq!(extract(&injected), replacement);
        assert!(same_shape(&value, &injected));
    }

    #[test]
    fn test_short_list_keeps_originals() {
        let value = json!(["one", {"k": "two"}, "three"]);
        let result = inject(&value, &strings(&["ONE"]));
        assert_eq!(result, json!(["ONE", {"k": "two"}, "three"]));
    }

    #[test]
    fn test_empty_list_is_identity() {
        let value = json!({"a": ["b", 1]});
        assert_eq!(inject(&value, &[]), value);
    }

    #[test]
    fn test_extra_translations_ignored() {
        let value = json!(["one"]);
        assert_eq!(inject(&value, &strings(&["ONE", "TWO"])), json!(["ONE"]));
    }

    #[test]
    fn test_same_shape_rejects_changed_numbers() {
        assert!(!same_shape(&json!([1, "a"]), &json!([2, "a"])));
        assert!(!same_shape(&json!({"a": "x"}), &json!({"b": "x"})));
        assert!(same_shape(&json!({"a": "x"}), &json!({"a": "y"})));
    }
}
