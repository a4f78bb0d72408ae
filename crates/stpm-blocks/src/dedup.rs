//! Duplicate region collapsing.
//!
//! Duplicates show up when an injection was interrupted between removing the
//! old region and appending the new one, or when two runs raced on the same
//! asset. For every marker owning more than one region, all of its regions are
//! removed and the *first* one is re-appended verbatim.

use std::collections::BTreeMap;

use crate::parser::{Orphan, scan};
use crate::writer::{normalize_spacing, remove_ranges};

/// Outcome of a dedup pass over one asset.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Dedup {
    /// The repaired content. Equal to the input when nothing was removed.
    pub content: String,
    /// Number of regions removed, per marker. Only markers that had
    /// duplicates appear.
    pub removed: BTreeMap<String, usize>,
    /// Dangling `START` lines found during the scan.
    pub orphans: Vec<Orphan>,
}

impl Dedup {
    /// Total number of regions removed across all markers.
    pub fn total_removed(&self) -> usize {
        self.removed.values().sum()
    }

    pub fn changed(&self) -> bool {
        !self.removed.is_empty()
    }
}

/// Collapse every marker with more than one region down to its first region.
///
/// Running it again on its own output changes nothing.
pub fn dedup(content: &str) -> Dedup {
    let scan = scan(content);
    let grouped = scan.by_marker();

    let mut ranges = Vec::new();
    let mut survivors: Vec<(usize, String)> = Vec::new();
    let mut removed = BTreeMap::new();

    for (marker, regions) in &grouped {
        if regions.len() < 2 {
            continue;
        }
        tracing::debug!(marker = %marker, count = regions.len(), "duplicate regions found");

        let first = &regions[0];
        let mut text = content[first.range.clone()].to_string();
        if !text.ends_with('\n') {
            text.push('\n');
        }
        survivors.push((first.range.start, text));

        ranges.extend(regions.iter().map(|r| r.range.clone()));
        removed.insert(marker.clone(), regions.len() - 1);
    }

    if removed.is_empty() {
        return Dedup {
            content: content.to_string(),
            removed,
            orphans: scan.orphans,
        };
    }

    ranges.sort_by_key(|r| r.start);
    // Re-append in the order the surviving regions originally appeared
    survivors.sort_by_key(|(start, _)| *start);

    let mut repaired = remove_ranges(content, &ranges);
    for (_, text) in survivors {
        repaired.push('\n');
        repaired.push_str(&text);
    }

    Dedup {
        content: normalize_spacing(&repaired),
        removed,
        orphans: scan.orphans,
    }
}
