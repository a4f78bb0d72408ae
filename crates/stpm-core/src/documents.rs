//! The shared JSON documents packages merge into.
//!
//! All three documents are loaded before any mutation, so a malformed
//! document aborts the operation with nothing changed. Only documents that
//! were actually modified are written back.

use serde_json::{Map, Value};
use stpm_fs::{ConfigStore, NormalizedPath, ProjectPath, ProjectRoot, io};
use stpm_merge::{
    AmbiguousMatch, BlockDescriptor, MatchMode, as_array_mut, as_object_mut, deep_merge_objects,
    delete_key_path, merge_named_blocks, remove_named_blocks,
};

use crate::error::{Error, Result};

/// One JSON document held in memory.
#[derive(Debug, Clone)]
pub struct JsonDocument {
    relative: String,
    path: NormalizedPath,
    value: Value,
    dirty: bool,
}

impl JsonDocument {
    /// Load a document that must be a JSON object. Missing means `{}`.
    pub fn load_object(root: &ProjectRoot, relative: &str) -> Result<Self> {
        Self::load(root, relative, Value::Object(Map::new()))
    }

    /// Load a document that must be a JSON array. Missing means `[]`.
    pub fn load_array(root: &ProjectRoot, relative: &str) -> Result<Self> {
        Self::load(root, relative, Value::Array(Vec::new()))
    }

    fn load(root: &ProjectRoot, relative: &str, empty: Value) -> Result<Self> {
        let path = root.resolve(relative)?;
        let value = match io::read_text_opt(&path)? {
            Some(content) if !content.trim().is_empty() => {
                serde_json::from_str(&content).map_err(|e| Error::malformed(relative, e))?
            }
            _ => empty.clone(),
        };

        let same_shape = matches!(
            (&value, &empty),
            (Value::Object(_), Value::Object(_)) | (Value::Array(_), Value::Array(_))
        );
        if !same_shape {
            let expected = if empty.is_object() { "an object" } else { "an array" };
            return Err(Error::malformed(relative, format!("expected {expected}")));
        }

        Ok(Self {
            relative: relative.to_string(),
            path,
            value,
            dirty: false,
        })
    }

    pub fn relative(&self) -> &str {
        &self.relative
    }

    pub fn value(&self) -> &Value {
        &self.value
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Deep merge an object fragment.
    pub fn merge_object(&mut self, fragment: &Map<String, Value>) -> Result<()> {
        if fragment.is_empty() {
            return Ok(());
        }
        let target = as_object_mut(&mut self.value, &self.relative)?;
        deep_merge_objects(target, fragment);
        self.dirty = true;
        Ok(())
    }

    /// Delete dotted key paths, returning how many existed.
    pub fn delete_key_paths(&mut self, paths: &[String]) -> Result<usize> {
        let target = as_object_mut(&mut self.value, &self.relative)?;
        let deleted = paths
            .iter()
            .filter(|path| delete_key_path(target, path))
            .count();
        if deleted > 0 {
            self.dirty = true;
        }
        Ok(deleted)
    }

    /// Merge named blocks into an array document.
    pub fn merge_blocks(&mut self, incoming: &[Value]) -> Result<()> {
        if incoming.is_empty() {
            return Ok(());
        }
        let target = as_array_mut(&mut self.value, &self.relative)?;
        let existing = std::mem::take(target);
        *target = merge_named_blocks(existing, incoming);
        self.dirty = true;
        Ok(())
    }

    /// Remove blocks matching the descriptors from an array document.
    ///
    /// Descriptors that matched more than one block are returned and logged.
    pub fn remove_blocks(
        &mut self,
        descriptors: &[BlockDescriptor],
        mode: MatchMode,
    ) -> Result<Vec<AmbiguousMatch>> {
        if descriptors.is_empty() {
            return Ok(Vec::new());
        }
        let target = as_array_mut(&mut self.value, &self.relative)?;
        let existing = std::mem::take(target);
        let removal = remove_named_blocks(existing, descriptors, mode);
        *target = removal.blocks;

        for ambiguous in &removal.ambiguous {
            tracing::warn!(
                path = %self.relative,
                name = ?ambiguous.descriptor.name,
                block_type = ?ambiguous.descriptor.block_type,
                matches = ambiguous.matches,
                "schema block descriptor matched several blocks, removing all of them"
            );
        }
        if removal.removed > 0 {
            self.dirty = true;
        }
        Ok(removal.ambiguous)
    }

    /// Write the document back if it was modified. Returns whether it was.
    pub fn save(&mut self, store: &ConfigStore) -> Result<bool> {
        if !self.dirty {
            return Ok(false);
        }
        store.save(&self.path, &self.value)?;
        self.dirty = false;
        tracing::debug!(path = %self.relative, "saved document");
        Ok(true)
    }
}

/// The frontend locale table, the schema locale table and the settings
/// schema.
#[derive(Debug, Clone)]
pub struct ProjectDocuments {
    pub frontend_locales: JsonDocument,
    pub schema_locales: JsonDocument,
    pub settings_schema: JsonDocument,
}

impl ProjectDocuments {
    pub fn load(root: &ProjectRoot) -> Result<Self> {
        Ok(Self {
            frontend_locales: JsonDocument::load_object(root, ProjectPath::FrontendLocales.as_str())?,
            schema_locales: JsonDocument::load_object(root, ProjectPath::SchemaLocales.as_str())?,
            settings_schema: JsonDocument::load_array(root, ProjectPath::SettingsSchema.as_str())?,
        })
    }

    /// Write every modified document.
    pub fn save(&mut self, store: &ConfigStore) -> Result<()> {
        self.frontend_locales.save(store)?;
        self.schema_locales.save(store)?;
        self.settings_schema.save(store)?;
        Ok(())
    }
}
