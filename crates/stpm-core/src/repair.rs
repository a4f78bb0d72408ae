//! Dedup/repair pass over shared assets.

use std::collections::BTreeMap;

use stpm_blocks::{Orphan, dedup};
use stpm_fs::{ProjectRoot, io};

use crate::error::Result;
use crate::injection::warn_orphans;

/// What the repair pass did to one asset.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssetRepair {
    /// Project-relative asset path
    pub path: String,
    /// Regions removed per marker
    pub removed: BTreeMap<String, usize>,
    pub orphans: Vec<Orphan>,
}

impl AssetRepair {
    pub fn total_removed(&self) -> usize {
        self.removed.values().sum()
    }
}

/// Report of a repair pass, one entry per asset that exists.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RepairReport {
    pub assets: Vec<AssetRepair>,
}

impl RepairReport {
    /// Removed region count per asset path.
    pub fn counts(&self) -> BTreeMap<String, usize> {
        self.assets
            .iter()
            .map(|a| (a.path.clone(), a.total_removed()))
            .collect()
    }

    pub fn total_removed(&self) -> usize {
        self.assets.iter().map(AssetRepair::total_removed).sum()
    }

    pub fn orphan_count(&self) -> usize {
        self.assets.iter().map(|a| a.orphans.len()).sum()
    }
}

/// Collapse duplicate regions in every given asset down to their first
/// occurrence.
///
/// Missing assets are skipped. An asset is only rewritten when something was
/// removed.
pub fn repair<'a>(root: &ProjectRoot, paths: impl IntoIterator<Item = &'a str>) -> Result<RepairReport> {
    let mut report = RepairReport::default();

    for relative in paths {
        let path = root.resolve(relative)?;
        let Some(content) = io::read_text_opt(&path)? else {
            tracing::debug!(path = relative, "asset missing, nothing to repair");
            continue;
        };

        let result = dedup(&content);
        warn_orphans(relative, &result.orphans);
        if result.changed() {
            io::write_text(&path, &result.content)?;
            tracing::info!(
                path = relative,
                removed = result.total_removed(),
                "removed duplicate regions"
            );
        }

        report.assets.push(AssetRepair {
            path: relative.to_string(),
            removed: result.removed,
            orphans: result.orphans,
        });
    }

    Ok(report)
}
