//! Package lifecycle engine
//!
//! The engine sequences the collaborators around the injection and merge
//! primitives. Every verb follows the same order: everything that can fail
//! without side effects (id validation, scanning, bundling, loading the
//! shared documents) runs first, then the previous record is reversed, the
//! new contribution applied, the documents written, and only then the
//! manifest record stored. A failure therefore never leaves a record claiming
//! work that was not done.

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use stpm_blocks::Marker;
use stpm_fs::checksum::files_match;
use serde::Deserialize;
use stpm_fs::{ConfigStore, NormalizedPath, ProjectPath, ProjectRoot, io};
use stpm_merge::{BlockDescriptor, leaf_key_paths};

use crate::collab::{
    Bundler, CommandBundler, CommandInstaller, EntryPoint, Installer, NativeContent,
    PackageScanner, ScannedPackage, ThemeScanner,
};
use crate::config::ProjectConfig;
use crate::documents::ProjectDocuments;
use crate::error::{Error, Result};
use crate::injection::{InjectReport, eject_file, inject_file};
use crate::manifest::{BundledAsset, ContributionRecord, Manifest, ManifestStore};
use crate::package::{PackageId, PackageKind};
use crate::repair::{RepairReport, repair};

/// Options for [`Engine::import`]
#[derive(Debug, Clone, Copy, Default)]
pub struct ImportOptions {
    /// Re-import a package that already has a record, reversing it first
    pub force: bool,
    /// Assume the package is already installed
    pub skip_install: bool,
}

/// Options for [`Engine::remove`]
#[derive(Debug, Clone, Copy, Default)]
pub struct RemoveOptions {
    /// Leave the installed package in place
    pub keep_installed: bool,
}

/// Outcome of importing or updating one package.
#[derive(Debug, Clone)]
pub struct ImportReport {
    /// The record now stored in the manifest
    pub record: ContributionRecord,
    /// The record that was reversed and replaced, if any
    pub previous: Option<ContributionRecord>,
    pub injections: Vec<InjectReport>,
    /// Native files whose destination already had identical content
    pub unchanged_files: usize,
}

/// Outcome of running one verb over several packages.
#[derive(Debug)]
pub struct BatchReport<T> {
    pub succeeded: Vec<(String, T)>,
    pub failed: Vec<(String, Error)>,
}

impl<T> Default for BatchReport<T> {
    fn default() -> Self {
        Self {
            succeeded: Vec::new(),
            failed: Vec::new(),
        }
    }
}

impl<T> BatchReport<T> {
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }
}

/// A scanned package with its bundles compiled, ready to apply.
enum Prepared {
    Native(NativeContent),
    Bundled(Vec<(BundledAsset, String)>),
}

/// The part of the project's `package.json` that decides what stays imported.
#[derive(Debug, Default, Deserialize)]
struct ProjectPackageJson {
    #[serde(default)]
    dependencies: BTreeMap<String, serde_json::Value>,
}

/// Drives import, update, removal, pruning, repair and rebuild for one
/// project.
pub struct Engine {
    root: ProjectRoot,
    config: ProjectConfig,
    manifest: ManifestStore,
    store: ConfigStore,
    installer: Box<dyn Installer>,
    scanner: Box<dyn PackageScanner>,
    bundler: Box<dyn Bundler>,
}

impl Engine {
    /// Open the project at `path`, reading its config file if present.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let root = ProjectRoot::new(path);
        let config = ProjectConfig::load(&root)?;
        Self::new(root, config)
    }

    /// Create an engine with the default collaborators for `config`.
    ///
    /// # Errors
    ///
    /// Returns an error if the configured manifest path escapes the project.
    pub fn new(root: ProjectRoot, config: ProjectConfig) -> Result<Self> {
        let manifest = ManifestStore::new(root.resolve(&config.manifest)?);
        let working_dir = root.path().to_native();

        Ok(Self {
            installer: Box::new(CommandInstaller::new(
                config.installer.program.clone(),
                working_dir.clone(),
            )),
            scanner: Box::new(ThemeScanner::new(root.clone(), config.packages_dir.clone())),
            bundler: Box::new(CommandBundler::new(config.bundler.clone(), working_dir)),
            store: ConfigStore::new(),
            manifest,
            config,
            root,
        })
    }

    pub fn with_installer(mut self, installer: impl Installer + 'static) -> Self {
        self.installer = Box::new(installer);
        self
    }

    pub fn with_scanner(mut self, scanner: impl PackageScanner + 'static) -> Self {
        self.scanner = Box::new(scanner);
        self
    }

    pub fn with_bundler(mut self, bundler: impl Bundler + 'static) -> Self {
        self.bundler = Box::new(bundler);
        self
    }

    pub fn root(&self) -> &ProjectRoot {
        &self.root
    }

    pub fn config(&self) -> &ProjectConfig {
        &self.config
    }

    pub fn manifest(&self) -> &ManifestStore {
        &self.manifest
    }

    /// All live records.
    pub fn list(&self) -> Result<Manifest> {
        self.manifest.load()
    }

    /// Install (unless skipped), scan and apply a package.
    ///
    /// # Errors
    ///
    /// Returns [`Error::AlreadyImported`] if the package has a record and
    /// `options.force` is not set.
    pub fn import(&self, raw_id: &str, options: ImportOptions) -> Result<ImportReport> {
        let id = PackageId::new(raw_id)?;
        let previous = self.manifest.get(&id)?;
        if previous.is_some() && !options.force {
            return Err(Error::AlreadyImported { id: id.to_string() });
        }

        if !options.skip_install {
            self.installer.install(&id)?;
        }
        self.process(&id, previous)
    }

    /// Reinstall a package and replace its contribution.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotImported`] if the package has no record.
    pub fn update(&self, raw_id: &str) -> Result<ImportReport> {
        let id = PackageId::new(raw_id)?;
        let previous = self
            .manifest
            .get(&id)?
            .ok_or_else(|| Error::NotImported { id: id.to_string() })?;

        self.installer.install(&id)?;
        self.process(&id, Some(previous))
    }

    /// Reverse a package's contribution and drop its record.
    ///
    /// Returns the removed record, or `None` if the package was never
    /// imported. A failing uninstall is only logged.
    pub fn remove(
        &self,
        raw_id: &str,
        options: RemoveOptions,
    ) -> Result<Option<ContributionRecord>> {
        let id = PackageId::new(raw_id)?;
        let Some(record) = self.manifest.get(&id)? else {
            tracing::info!(package = %id, "not imported, nothing to remove");
            return Ok(None);
        };

        let mut docs = ProjectDocuments::load(&self.root)?;
        self.reverse(&record, &mut docs, &BTreeSet::new())?;
        docs.save(&self.store)?;

        if !options.keep_installed
            && let Err(e) = self.installer.uninstall(&id)
        {
            tracing::warn!(package = %id, error = %e, "uninstall failed, package files left in place");
        }

        let removed = self.manifest.delete(&id)?;
        tracing::info!(package = %id, "removed package");
        Ok(removed)
    }

    /// Collapse duplicate regions in every asset the manifest references.
    pub fn repair(&self) -> Result<RepairReport> {
        let manifest = self.manifest.load()?;
        let paths = manifest.asset_paths();
        repair(&self.root, paths.iter().map(String::as_str))
    }

    /// Re-apply every recorded package without reinstalling it.
    ///
    /// Bundled packages are re-bundled from their recorded entry points;
    /// native packages are re-applied from a fresh scan.
    pub fn rebuild(&self) -> Result<BatchReport<PackageKind>> {
        let manifest = self.manifest.load()?;
        let mut report = BatchReport::default();

        for record in manifest.records() {
            let result = match record.kind {
                PackageKind::Bundled => self.rebuild_bundled(record),
                PackageKind::Native => PackageId::new(&record.package_id)
                    .and_then(|id| self.process(&id, Some(record.clone())))
                    .map(|_| ()),
            };
            match result {
                Ok(()) => report.succeeded.push((record.package_id.clone(), record.kind)),
                Err(e) => {
                    tracing::error!(package = %record.package_id, error = %e, "rebuild failed");
                    report.failed.push((record.package_id.clone(), e));
                }
            }
        }

        Ok(report)
    }

    /// Remove every imported package the project no longer depends on.
    ///
    /// Dependencies come from the `dependencies` table of the project's
    /// `package.json`. Pruned packages are not uninstalled, since the package
    /// manager has already dropped them.
    ///
    /// # Errors
    ///
    /// Fails before touching anything if `package.json` is missing or
    /// malformed.
    pub fn prune(&self) -> Result<BatchReport<ContributionRecord>> {
        let declared = self.declared_dependencies()?;
        let stale: Vec<String> = self
            .manifest
            .load()?
            .records()
            .map(|record| record.package_id.clone())
            .filter(|id| !declared.contains(id))
            .collect();
        tracing::info!(count = stale.len(), "pruning packages no longer depended on");

        let options = RemoveOptions {
            keep_installed: true,
        };
        Ok(self.batch(&stale, |engine, id| {
            engine
                .remove(id, options)?
                .ok_or_else(|| Error::NotImported { id: id.to_string() })
        }))
    }

    /// Run `op` for every id, continuing past failures.
    pub fn batch<T>(
        &self,
        ids: &[String],
        mut op: impl FnMut(&Self, &str) -> Result<T>,
    ) -> BatchReport<T> {
        let mut report = BatchReport::default();
        for id in ids {
            match op(self, id) {
                Ok(value) => report.succeeded.push((id.clone(), value)),
                Err(e) => {
                    tracing::error!(package = %id, error = %e, "operation failed");
                    report.failed.push((id.clone(), e));
                }
            }
        }
        report
    }

    fn process(&self, id: &PackageId, previous: Option<ContributionRecord>) -> Result<ImportReport> {
        let scanned = self.scanner.scan(id)?;
        let prepared = self.prepare(id, scanned)?;
        let mut docs = ProjectDocuments::load(&self.root)?;

        if let Some(previous) = &previous {
            tracing::debug!(package = %id, "reversing previous contribution");
            let keep = self.unchanged_files(previous, &prepared)?;
            self.reverse(previous, &mut docs, &keep)?;
        }

        let mut report = ImportReport {
            record: ContributionRecord::new(id, PackageKind::Bundled),
            previous,
            injections: Vec::new(),
            unchanged_files: 0,
        };
        match prepared {
            Prepared::Native(content) => {
                report.record.kind = PackageKind::Native;
                report.unchanged_files = self.apply_native(content, &mut docs, &mut report.record)?;
            }
            Prepared::Bundled(bundles) => {
                report.record.bundled_assets = bundles.iter().map(|(a, _)| a.clone()).collect();
                report.injections = self.inject_bundles(id.marker(), bundles)?;
            }
        }

        docs.save(&self.store)?;
        self.manifest.put(report.record.clone())?;
        tracing::info!(package = %id, kind = %report.record.kind, "imported package");
        Ok(report)
    }

    fn prepare(&self, id: &PackageId, scanned: ScannedPackage) -> Result<Prepared> {
        match scanned {
            ScannedPackage::Native(content) => Ok(Prepared::Native(content)),
            ScannedPackage::Bundled(entries) => {
                let bundles = entries
                    .into_iter()
                    .map(|entry| self.compile(id, entry))
                    .collect::<Result<Vec<_>>>()?;
                Ok(Prepared::Bundled(bundles))
            }
        }
    }

    fn compile(&self, id: &PackageId, entry: EntryPoint) -> Result<(BundledAsset, String)> {
        let source = self.root.resolve(&entry.relative)?;
        let body = self.bundler.bundle(entry.kind, &source)?;
        let asset = BundledAsset {
            asset_kind: entry.kind,
            source_path: entry.relative,
            output_path: self.config.output_for(entry.kind).to_string(),
            marker: id.to_string(),
        };
        Ok((asset, body))
    }

    /// Inject compiled bundles, one region per output asset.
    ///
    /// Bundles sharing an output are joined, since a marker owns a single
    /// region per asset.
    fn inject_bundles(
        &self,
        marker: &Marker,
        bundles: Vec<(BundledAsset, String)>,
    ) -> Result<Vec<InjectReport>> {
        let mut by_output: Vec<(String, Vec<String>)> = Vec::new();
        for (asset, body) in bundles {
            match by_output.iter_mut().find(|(output, _)| *output == asset.output_path) {
                Some((_, bodies)) => bodies.push(body),
                None => by_output.push((asset.output_path, vec![body])),
            }
        }

        by_output
            .into_iter()
            .map(|(output, bodies)| inject_file(&self.root, &output, marker, &bodies.join("\n")))
            .collect()
    }

    /// Copy files and merge documents. Returns how many files were unchanged.
    fn apply_native(
        &self,
        content: NativeContent,
        docs: &mut ProjectDocuments,
        record: &mut ContributionRecord,
    ) -> Result<usize> {
        let mut unchanged = 0;
        for file in content.files {
            let destination = self.root.resolve(&file.relative)?;
            if destination.exists() {
                if files_match(&file.source, &destination.to_native()) {
                    tracing::debug!(path = %file.relative, "unchanged, skipping copy");
                    unchanged += 1;
                    record.files.push(file.relative);
                    continue;
                }
                tracing::warn!(path = %file.relative, package = %record.package_id, "overwriting existing file");
            }
            io::copy_file(&NormalizedPath::new(&file.source), &destination)?;
            record.files.push(file.relative);
        }

        if let Some(fragment) = content.frontend_locales {
            docs.frontend_locales.merge_object(&fragment)?;
            record.locale_keys.frontend = leaf_key_paths(&fragment);
        }
        if let Some(fragment) = content.schema_locales {
            docs.schema_locales.merge_object(&fragment)?;
            record.locale_keys.schema = leaf_key_paths(&fragment);
        }

        docs.settings_schema.merge_blocks(&content.schema_blocks)?;
        record.schema_blocks = content
            .schema_blocks
            .iter()
            .map(BlockDescriptor::of)
            .filter(|d| !d.is_anonymous())
            .collect();

        Ok(unchanged)
    }

    /// Normalized ids listed under `dependencies` in the project's
    /// `package.json`.
    fn declared_dependencies(&self) -> Result<BTreeSet<String>> {
        let relative = ProjectPath::PackageJson.as_str();
        let content = io::read_text(&self.root.resolve(relative)?)?;
        let package: ProjectPackageJson =
            serde_json::from_str(&content).map_err(|e| Error::malformed(relative, e))?;

        Ok(package
            .dependencies
            .keys()
            .filter_map(|name| PackageId::new(name).ok())
            .map(|id| id.to_string())
            .collect())
    }

    /// Recorded files the new contribution would copy with identical content.
    ///
    /// Reversal leaves these in place so the copy step can skip them.
    fn unchanged_files(
        &self,
        previous: &ContributionRecord,
        prepared: &Prepared,
    ) -> Result<BTreeSet<String>> {
        let Prepared::Native(content) = prepared else {
            return Ok(BTreeSet::new());
        };
        let recorded: BTreeSet<&str> = previous.files.iter().map(String::as_str).collect();

        let mut keep = BTreeSet::new();
        for file in &content.files {
            if !recorded.contains(file.relative.as_str()) {
                continue;
            }
            let destination = self.root.resolve(&file.relative)?;
            if files_match(&file.source, &destination.to_native()) {
                keep.insert(file.relative.clone());
            }
        }
        Ok(keep)
    }

    /// Undo everything a record describes, leaving the files in `keep`.
    fn reverse(
        &self,
        record: &ContributionRecord,
        docs: &mut ProjectDocuments,
        keep: &BTreeSet<String>,
    ) -> Result<()> {
        for file in record.files.iter().filter(|f| !keep.contains(*f)) {
            let path = self.root.resolve(file)?;
            if !io::remove_file(&path)? {
                tracing::debug!(path = %file, "already gone");
            }
        }

        docs.frontend_locales
            .delete_key_paths(&record.locale_keys.frontend)?;
        docs.schema_locales.delete_key_paths(&record.locale_keys.schema)?;
        docs.settings_schema
            .remove_blocks(&record.schema_blocks, self.config.schema.block_matching)?;

        for asset in &record.bundled_assets {
            let marker = Marker::new(asset.marker.clone())?;
            eject_file(&self.root, &asset.output_path, &marker)?;
        }
        Ok(())
    }

    fn rebuild_bundled(&self, record: &ContributionRecord) -> Result<()> {
        let id = PackageId::new(&record.package_id)?;
        let bundles = record
            .bundled_assets
            .iter()
            .map(|asset| {
                let source = self.root.resolve(&asset.source_path)?;
                let body = self.bundler.bundle(asset.asset_kind, &source)?;
                Ok((asset.clone(), body))
            })
            .collect::<Result<Vec<_>>>()?;

        self.inject_bundles(id.marker(), bundles)?;
        tracing::info!(package = %id, "rebuilt bundled package");
        Ok(())
    }
}
