//! Manifest store
//!
//! The manifest maps each package identifier to its [`ContributionRecord`]
//! and is the single source of truth for reversing a package. It is persisted
//! as one pretty-printed JSON object; every mutation is a full
//! read-modify-write of that document, finished by an atomic rename.

mod record;

pub use record::{AssetKind, BundledAsset, ContributionRecord, LocaleKeys};

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use stpm_fs::{ConfigStore, NormalizedPath, io};

use crate::error::{Error, Result};
use crate::package::PackageId;

/// All live contribution records, keyed by package identifier.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Manifest {
    records: BTreeMap<String, ContributionRecord>,
}

impl Manifest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: &PackageId) -> Option<&ContributionRecord> {
        self.records.get(id.as_str())
    }

    /// Insert a record, returning the one it replaced.
    pub fn insert(&mut self, record: ContributionRecord) -> Option<ContributionRecord> {
        self.records.insert(record.package_id.clone(), record)
    }

    pub fn remove(&mut self, id: &PackageId) -> Option<ContributionRecord> {
        self.records.remove(id.as_str())
    }

    pub fn contains(&self, id: &PackageId) -> bool {
        self.records.contains_key(id.as_str())
    }

    pub fn records(&self) -> impl Iterator<Item = &ContributionRecord> {
        self.records.values()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Every shared asset some record owns a region in.
    pub fn asset_paths(&self) -> BTreeSet<String> {
        self.records
            .values()
            .flat_map(|r| r.bundled_assets.iter().map(|a| a.output_path.clone()))
            .collect()
    }
}

/// Reads and writes the manifest document.
#[derive(Debug)]
pub struct ManifestStore {
    path: NormalizedPath,
    store: ConfigStore,
}

impl ManifestStore {
    pub fn new(path: NormalizedPath) -> Self {
        Self {
            path,
            store: ConfigStore::new(),
        }
    }

    pub fn path(&self) -> &NormalizedPath {
        &self.path
    }

    /// Load the whole manifest. A missing file is an empty manifest.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MalformedDocument`] if the file is not a valid
    /// manifest; nothing is written in that case.
    pub fn load(&self) -> Result<Manifest> {
        let Some(content) = io::read_text_opt(&self.path)? else {
            return Ok(Manifest::new());
        };
        if content.trim().is_empty() {
            return Ok(Manifest::new());
        }
        serde_json::from_str(&content).map_err(|e| Error::malformed(self.path.as_str(), e))
    }

    /// Replace the whole manifest on disk.
    pub fn save(&self, manifest: &Manifest) -> Result<()> {
        self.store.save(&self.path, manifest)?;
        tracing::debug!(path = %self.path, records = manifest.len(), "saved manifest");
        Ok(())
    }

    pub fn get(&self, id: &PackageId) -> Result<Option<ContributionRecord>> {
        Ok(self.load()?.get(id).cloned())
    }

    /// Store a record, replacing any previous record for the same package.
    pub fn put(&self, record: ContributionRecord) -> Result<()> {
        let mut manifest = self.load()?;
        manifest.insert(record);
        self.save(&manifest)
    }

    /// Delete a record and hand it back. Deleting an unknown package leaves
    /// the file untouched.
    pub fn delete(&self, id: &PackageId) -> Result<Option<ContributionRecord>> {
        let mut manifest = self.load()?;
        let removed = manifest.remove(id);
        if removed.is_some() {
            self.save(&manifest)?;
        }
        Ok(removed)
    }
}
