//! Named-block arrays.
//!
//! A block is a JSON object identified by its `name`, or by its `type` when it
//! has no name. Blocks with neither are anonymous: they are always appended
//! and can never be matched for update or removal.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::object::deep_merge_objects;

/// The identity a block is merged under.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum BlockKey {
    /// Keyed by `name`, or by `type` when there is no name.
    Identified(String),
    Anonymous,
}

impl BlockKey {
    pub fn of(block: &Value) -> Self {
        string_field(block, "name")
            .or_else(|| string_field(block, "type"))
            .map(|key| Self::Identified(key.to_string()))
            .unwrap_or(Self::Anonymous)
    }
}

fn string_field<'a>(block: &'a Value, field: &str) -> Option<&'a str> {
    block
        .get(field)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
}

/// How recorded descriptors are matched against blocks on removal.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchMode {
    /// A block matches when its name **or** its type equals the
    /// descriptor's.
    #[default]
    Permissive,
    /// When the descriptor carries both fields, both must match.
    Strict,
}

/// The recorded identity of a contributed block.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockDescriptor {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub block_type: Option<String>,
}

impl BlockDescriptor {
    /// Describe a block by whatever identity fields it carries.
    pub fn of(block: &Value) -> Self {
        Self {
            name: string_field(block, "name").map(str::to_string),
            block_type: string_field(block, "type").map(str::to_string),
        }
    }

    /// A descriptor with neither field matches nothing.
    pub fn is_anonymous(&self) -> bool {
        self.name.is_none() && self.block_type.is_none()
    }

    pub fn matches(&self, block: &Value, mode: MatchMode) -> bool {
        let name = self
            .name
            .as_deref()
            .map(|n| string_field(block, "name") == Some(n));
        let block_type = self
            .block_type
            .as_deref()
            .map(|t| string_field(block, "type") == Some(t));

        match (mode, name, block_type) {
            (_, None, None) => false,
            (MatchMode::Strict, Some(n), Some(t)) => n && t,
            (_, n, t) => n.unwrap_or(false) || t.unwrap_or(false),
        }
    }
}

/// Merge `incoming` blocks into `existing`.
///
/// Every existing block is kept in place. An incoming block whose key matches
/// an existing block is deep-merged into the first such block (replacing it
/// outright when either side is not an object); otherwise it is appended.
/// Anonymous incoming blocks are always appended.
pub fn merge_named_blocks(existing: Vec<Value>, incoming: &[Value]) -> Vec<Value> {
    let mut merged = existing;
    let mut index: HashMap<String, usize> = HashMap::new();
    for (position, block) in merged.iter().enumerate() {
        if let BlockKey::Identified(key) = BlockKey::of(block) {
            index.entry(key).or_insert(position);
        }
    }

    for block in incoming {
        let key = BlockKey::of(block);
        let slot = match &key {
            BlockKey::Identified(k) => index.get(k).copied(),
            BlockKey::Anonymous => None,
        };

        match slot {
            Some(position) => {
                if let (Some(target), Some(source)) =
                    (merged[position].as_object_mut(), block.as_object())
                {
                    deep_merge_objects(target, source);
                } else {
                    merged[position] = block.clone();
                }
            }
            None => {
                if let BlockKey::Identified(k) = key {
                    index.insert(k, merged.len());
                }
                merged.push(block.clone());
            }
        }
    }

    merged
}

/// A descriptor that matched more than one block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AmbiguousMatch {
    pub descriptor: BlockDescriptor,
    pub matches: usize,
}

/// Outcome of [`remove_named_blocks`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BlockRemoval {
    /// The surviving blocks, in their original order.
    pub blocks: Vec<Value>,
    pub removed: usize,
    pub ambiguous: Vec<AmbiguousMatch>,
}

/// Drop every block matching any of `descriptors`.
///
/// Under [`MatchMode::Permissive`] a block sharing only a `type` with a
/// descriptor is removed too, so a descriptor can hit blocks it never
/// contributed. Those descriptors are reported in
/// [`BlockRemoval::ambiguous`].
pub fn remove_named_blocks(
    existing: Vec<Value>,
    descriptors: &[BlockDescriptor],
    mode: MatchMode,
) -> BlockRemoval {
    let ambiguous = descriptors
        .iter()
        .filter_map(|descriptor| {
            let matches = existing
                .iter()
                .filter(|block| descriptor.matches(block, mode))
                .count();
            (matches > 1).then(|| AmbiguousMatch {
                descriptor: descriptor.clone(),
                matches,
            })
        })
        .collect();

    let before = existing.len();
    let blocks: Vec<Value> = existing
        .into_iter()
        .filter(|block| !descriptors.iter().any(|d| d.matches(block, mode)))
        .collect();

    BlockRemoval {
        removed: before - blocks.len(),
        blocks,
        ambiguous,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn descriptor(name: Option<&str>, block_type: Option<&str>) -> BlockDescriptor {
        BlockDescriptor {
            name: name.map(String::from),
            block_type: block_type.map(String::from),
        }
    }

    #[test]
    fn test_block_key_falls_back_to_type() {
        assert_eq!(
            BlockKey::of(&json!({"name": "a", "type": "t"})),
            BlockKey::Identified("a".into())
        );
        assert_eq!(
            BlockKey::of(&json!({"type": "t"})),
            BlockKey::Identified("t".into())
        );
        assert_eq!(BlockKey::of(&json!({"settings": []})), BlockKey::Anonymous);
        assert_eq!(BlockKey::of(&json!({"name": 3})), BlockKey::Anonymous);
    }

    #[test]
    fn test_permissive_matches_either_field() {
        let d = descriptor(Some("x"), Some("t1"));
        assert!(d.matches(&json!({"name": "x", "type": "t2"}), MatchMode::Permissive));
        assert!(d.matches(&json!({"name": "y", "type": "t1"}), MatchMode::Permissive));
        assert!(!d.matches(&json!({"name": "y", "type": "t2"}), MatchMode::Permissive));
    }

    #[test]
    fn test_strict_requires_both_fields() {
        let d = descriptor(Some("x"), Some("t1"));
        assert!(d.matches(&json!({"name": "x", "type": "t1"}), MatchMode::Strict));
        assert!(!d.matches(&json!({"name": "x", "type": "t2"}), MatchMode::Strict));
        assert!(descriptor(Some("x"), None).matches(&json!({"name": "x"}), MatchMode::Strict));
    }

    #[test]
    fn test_anonymous_descriptor_matches_nothing() {
        let d = descriptor(None, None);
        assert!(d.is_anonymous());
        assert!(!d.matches(&json!({}), MatchMode::Permissive));
    }

    #[test]
    fn test_descriptor_serializes_type_field() {
        let d = descriptor(Some("x"), Some("t"));
        assert_eq!(serde_json::to_value(&d).unwrap(), json!({"name": "x", "type": "t"}));
        let name_only = descriptor(Some("x"), None);
        assert_eq!(serde_json::to_value(&name_only).unwrap(), json!({"name": "x"}));
    }
}
