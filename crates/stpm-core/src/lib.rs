//! Idempotent block injection and contribution manifest for stpm
//!
//! This crate ties the pure layers together and owns all project I/O:
//!
//! - **Manifest store**: one [`ContributionRecord`] per imported package,
//!   the single source of truth for reversing it
//! - **Injection**: splicing package-owned regions into shared assets
//! - **Repair**: collapsing duplicate regions left by interrupted runs
//! - **Engine**: the import / update / remove / prune / repair / rebuild verbs
//!
//! # Architecture
//!
//! ```text
//!                 stpm-cli
//!                    |
//!                stpm-core
//!                    |
//!     +--------------+--------------+
//!     |              |              |
//!  stpm-fs      stpm-blocks    stpm-merge
//! ```

pub mod collab;
pub mod config;
pub mod documents;
pub mod engine;
pub mod error;
pub mod injection;
pub mod manifest;
pub mod package;
pub mod repair;

pub use collab::{
    Bundler, CommandBundler, CommandInstaller, EntryPoint, Installer, NativeContent, NoopInstaller,
    PackageFile, PackageScanner, ScannedPackage, ThemeScanner,
};
pub use config::ProjectConfig;
pub use documents::{JsonDocument, ProjectDocuments};
pub use engine::{BatchReport, Engine, ImportOptions, ImportReport, RemoveOptions};
pub use error::{Error, Result};
pub use injection::{InjectReport, eject_file, inject_file};
pub use manifest::{
    AssetKind, BundledAsset, ContributionRecord, LocaleKeys, Manifest, ManifestStore,
};
pub use package::{PackageId, PackageKind};
pub use repair::{AssetRepair, RepairReport, repair};
