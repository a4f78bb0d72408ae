//! Region injection into asset files.
//!
//! The text transformation itself lives in `stpm_blocks`; this module is the
//! I/O edge. The new content is computed in memory and written with a single
//! atomic write, so an asset never holds a region without its `END` line.

use stpm_blocks::{Marker, Orphan, normalize_spacing, remove_all};
use stpm_fs::{ProjectRoot, io};

use crate::error::Result;

/// Outcome of injecting one region.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InjectReport {
    /// Project-relative asset path
    pub path: String,
    /// Number of earlier regions for the marker that were replaced
    pub removed: usize,
    pub orphans: Vec<Orphan>,
}

impl InjectReport {
    pub fn replaced(&self) -> bool {
        self.removed > 0
    }
}

/// Replace the regions `marker` owns in an asset with a single region.
///
/// A missing asset is created.
pub fn inject_file(
    root: &ProjectRoot,
    relative: &str,
    marker: &Marker,
    body: &str,
) -> Result<InjectReport> {
    let path = root.resolve(relative)?;
    let content = io::read_text_opt(&path)?.unwrap_or_default();

    let injection = stpm_blocks::inject(&content, marker, body);
    warn_orphans(relative, &injection.orphans);
    if injection.removed > 1 {
        tracing::info!(
            path = relative,
            marker = %marker,
            removed = injection.removed,
            "collapsed duplicate regions while injecting"
        );
    }

    io::write_text(&path, &injection.content)?;
    tracing::debug!(path = relative, marker = %marker, replaced = injection.replaced(), "injected region");

    Ok(InjectReport {
        path: relative.to_string(),
        removed: injection.removed,
        orphans: injection.orphans,
    })
}

/// Remove every region `marker` owns in an asset.
///
/// Returns the number of regions removed. A missing asset, or one without a
/// region for the marker, is left untouched.
pub fn eject_file(root: &ProjectRoot, relative: &str, marker: &Marker) -> Result<usize> {
    let path = root.resolve(relative)?;
    let Some(content) = io::read_text_opt(&path)? else {
        return Ok(0);
    };

    let count = stpm_blocks::find_all(&content, marker).len();
    if count == 0 {
        return Ok(0);
    }

    let updated = normalize_spacing(&remove_all(&content, marker));
    io::write_text(&path, &updated)?;
    tracing::debug!(path = relative, marker = %marker, removed = count, "ejected regions");
    Ok(count)
}

pub(crate) fn warn_orphans(relative: &str, orphans: &[Orphan]) {
    for orphan in orphans {
        tracing::warn!(
            path = relative,
            marker = %orphan.marker,
            line = orphan.line,
            "START marker without matching END, leaving it untouched"
        );
    }
}
