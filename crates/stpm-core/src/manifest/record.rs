//! Contribution records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use stpm_merge::BlockDescriptor;

use crate::package::{PackageId, PackageKind};

/// The kind of shared asset a bundled region lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssetKind {
    Style,
    Script,
}

impl std::fmt::Display for AssetKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Style => write!(f, "style"),
            Self::Script => write!(f, "script"),
        }
    }
}

/// One compiled region owned by a bundled package.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BundledAsset {
    pub asset_kind: AssetKind,
    /// Project-relative entry point the region was compiled from
    pub source_path: String,
    /// Project-relative shared asset holding the region
    pub output_path: String,
    pub marker: String,
}

/// Leaf key paths a package merged into the two locale tables.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocaleKeys {
    #[serde(default)]
    pub frontend: Vec<String>,
    #[serde(default)]
    pub schema: Vec<String>,
}

impl LocaleKeys {
    pub fn is_empty(&self) -> bool {
        self.frontend.is_empty() && self.schema.is_empty()
    }
}

/// Everything one package contributed, sufficient to reverse it exactly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContributionRecord {
    pub package_id: String,
    pub kind: PackageKind,
    /// Project-relative paths copied verbatim (native only)
    #[serde(default)]
    pub files: Vec<String>,
    /// Compiled regions (bundled only)
    #[serde(default)]
    pub bundled_assets: Vec<BundledAsset>,
    #[serde(default)]
    pub locale_keys: LocaleKeys,
    #[serde(default)]
    pub schema_blocks: Vec<BlockDescriptor>,
    pub imported_at: DateTime<Utc>,
}

impl ContributionRecord {
    /// An empty record stamped with the current time.
    pub fn new(id: &PackageId, kind: PackageKind) -> Self {
        Self {
            package_id: id.as_str().to_string(),
            kind,
            files: Vec::new(),
            bundled_assets: Vec::new(),
            locale_keys: LocaleKeys::default(),
            schema_blocks: Vec::new(),
            imported_at: Utc::now(),
        }
    }
}
