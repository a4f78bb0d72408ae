//! Object deep merge.

use serde_json::{Map, Value};

use crate::error::{Error, Result};

/// Deep merge `source` into `target`.
///
/// For every key of `source`: an object value is merged recursively (an empty
/// object is created in `target` when the key is absent or holds a
/// non-object); any other value, arrays included, overwrites `target`'s.
/// Existing keys keep their position; new keys are appended.
///
/// # Example
/// ```
/// use serde_json::json;
/// use stpm_merge::deep_merge_objects;
///
/// let mut target = json!({"a": {"x": 1}, "list": [1, 2]});
/// let source = json!({"a": {"y": 2}, "list": [3]});
/// deep_merge_objects(
///     target.as_object_mut().unwrap(),
///     source.as_object().unwrap(),
/// );
/// assert_eq!(target, json!({"a": {"x": 1, "y": 2}, "list": [3]}));
/// ```
pub fn deep_merge_objects(target: &mut Map<String, Value>, source: &Map<String, Value>) {
    for (key, value) in source {
        match value {
            Value::Object(source_child) => {
                let slot = target
                    .entry(key.clone())
                    .or_insert_with(|| Value::Object(Map::new()));
                if !slot.is_object() {
                    *slot = Value::Object(Map::new());
                }
                if let Value::Object(target_child) = slot {
                    deep_merge_objects(target_child, source_child);
                }
            }
            other => {
                target.insert(key.clone(), other.clone());
            }
        }
    }
}

/// Borrow a document as an object, naming it in the error otherwise.
pub fn as_object_mut<'a>(doc: &'a mut Value, what: &str) -> Result<&'a mut Map<String, Value>> {
    doc.as_object_mut().ok_or_else(|| Error::NotAnObject {
        what: what.to_string(),
    })
}

/// Borrow a document as an array, naming it in the error otherwise.
pub fn as_array_mut<'a>(doc: &'a mut Value, what: &str) -> Result<&'a mut Vec<Value>> {
    doc.as_array_mut().ok_or_else(|| Error::NotAnArray {
        what: what.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn merge(mut target: Value, source: Value) -> Value {
        deep_merge_objects(
            target.as_object_mut().unwrap(),
            source.as_object().unwrap(),
        );
        target
    }

    #[test]
    fn test_merge_into_empty() {
        assert_eq!(merge(json!({}), json!({"a": {"b": 1}})), json!({"a": {"b": 1}}));
    }

    #[test]
    fn test_merge_replaces_scalar_with_object() {
        assert_eq!(
            merge(json!({"a": "text"}), json!({"a": {"b": 1}})),
            json!({"a": {"b": 1}})
        );
    }

    #[test]
    fn test_merge_null_overwrites() {
        assert_eq!(merge(json!({"a": {"b": 1}}), json!({"a": null})), json!({"a": null}));
    }

    #[test]
    fn test_merge_keeps_existing_key_order() {
        let merged = merge(json!({"z": 1, "a": 2}), json!({"z": 3, "m": 4}));
        let keys: Vec<_> = merged.as_object().unwrap().keys().cloned().collect();
        assert_eq!(keys, vec!["z", "a", "m"]);
    }

    #[test]
    fn test_shape_errors() {
        let mut array = json!([]);
        assert!(matches!(
            as_object_mut(&mut array, "locale file"),
            Err(Error::NotAnObject { .. })
        ));
        let mut object = json!({});
        assert!(matches!(
            as_array_mut(&mut object, "settings schema"),
            Err(Error::NotAnArray { .. })
        ));
    }
}
