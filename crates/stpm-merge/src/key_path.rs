//! Dotted key paths into JSON objects.
//!
//! A key path like `sections.slider.name` addresses a nested value. Key
//! segments are split on `.`, so keys that themselves contain a dot cannot be
//! addressed precisely.

use serde_json::{Map, Value};

/// Every leaf key path of `object`, in document order.
///
/// Leaves are scalars, arrays and empty objects; non-empty objects are
/// descended into.
///
/// # Example
/// ```
/// use serde_json::json;
/// use stpm_merge::leaf_key_paths;
///
/// let fragment = json!({"a": {"b": 1, "c": [1]}, "d": {}});
/// assert_eq!(
///     leaf_key_paths(fragment.as_object().unwrap()),
///     vec!["a.b", "a.c", "d"]
/// );
/// ```
pub fn leaf_key_paths(object: &Map<String, Value>) -> Vec<String> {
    let mut paths = Vec::new();
    collect_leaves(object, "", &mut paths);
    paths
}

fn collect_leaves(object: &Map<String, Value>, prefix: &str, paths: &mut Vec<String>) {
    for (key, value) in object {
        let path = if prefix.is_empty() {
            key.clone()
        } else {
            format!("{prefix}.{key}")
        };
        match value {
            Value::Object(child) if !child.is_empty() => collect_leaves(child, &path, paths),
            _ => paths.push(path),
        }
    }
}

/// Look up the value at a dotted key path.
pub fn get_key_path<'a>(object: &'a Map<String, Value>, path: &str) -> Option<&'a Value> {
    let mut segments = path.split('.');
    let mut current = object.get(segments.next()?)?;
    for segment in segments {
        current = current.as_object()?.get(segment)?;
    }
    Some(current)
}

/// Delete the value at a dotted key path, then prune ancestors left empty.
///
/// Pruning walks back up and stops at the first ancestor that still has other
/// keys. `object` itself is never removed. If any segment is missing or an
/// intermediate value is not an object, nothing happens. Returns whether a
/// value was deleted.
///
/// # Example
/// ```
/// use serde_json::json;
/// use stpm_merge::delete_key_path;
///
/// let mut doc = json!({"a": {"b": {"c": 1}}, "z": 0});
/// assert!(delete_key_path(doc.as_object_mut().unwrap(), "a.b.c"));
/// assert_eq!(doc, json!({"z": 0}));
/// ```
pub fn delete_key_path(object: &mut Map<String, Value>, path: &str) -> bool {
    let segments: Vec<&str> = path.split('.').collect();
    delete_segments(object, &segments)
}

fn delete_segments(object: &mut Map<String, Value>, segments: &[&str]) -> bool {
    let Some((first, rest)) = segments.split_first() else {
        return false;
    };
    if rest.is_empty() {
        return object.shift_remove(*first).is_some();
    }

    let Some(Value::Object(child)) = object.get_mut(*first) else {
        return false;
    };
    let deleted = delete_segments(child, rest);
    if deleted && child.is_empty() {
        object.shift_remove(*first);
    }
    deleted
}
