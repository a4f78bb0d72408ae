//! Region removal, injection and spacing normalization.

use std::ops::Range;

use crate::marker::{Marker, wrap};
use crate::parser::{Orphan, scan_marker};

/// Outcome of injecting a region into asset content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Injection {
    /// The new asset content.
    pub content: String,
    /// How many existing regions for the marker were removed first.
    pub removed: usize,
    /// Dangling `START` lines for the marker that were left untouched.
    pub orphans: Vec<Orphan>,
}

impl Injection {
    /// Whether an earlier region was replaced.
    pub fn replaced(&self) -> bool {
        self.removed > 0
    }
}

/// Delete the given byte ranges. Ranges must be sorted and disjoint.
pub(crate) fn remove_ranges(content: &str, ranges: &[Range<usize>]) -> String {
    let mut result = String::with_capacity(content.len());
    let mut cursor = 0;
    for range in ranges {
        result.push_str(&content[cursor..range.start]);
        cursor = range.end;
    }
    result.push_str(&content[cursor..]);
    result
}

/// Delete every region for `marker`.
///
/// Only the matched ranges are removed; surrounding whitespace is left as is.
///
/// # Example
/// ```
/// use stpm_blocks::{Marker, remove_all};
///
/// let content = "a\n/* STPM: START x */\nbody\n/* STPM: END x */\nb\n";
/// assert_eq!(remove_all(content, &Marker::new("x").unwrap()), "a\nb\n");
/// ```
pub fn remove_all(content: &str, marker: &Marker) -> String {
    let ranges: Vec<_> = scan_marker(content, marker)
        .regions
        .into_iter()
        .map(|r| r.range)
        .collect();
    remove_ranges(content, &ranges)
}

/// Replace whatever regions `marker` owns with a single fresh region.
///
/// Existing regions are removed, the wrapped body is appended at the end and
/// the result is spacing-normalized. Applying the same injection twice yields
/// the same content as applying it once.
pub fn inject(content: &str, marker: &Marker, body: &str) -> Injection {
    let scan = scan_marker(content, marker);
    let ranges: Vec<_> = scan.regions.iter().map(|r| r.range.clone()).collect();

    let mut updated = remove_ranges(content, &ranges);
    if !updated.is_empty() && !updated.ends_with('\n') {
        updated.push('\n');
    }
    updated.push_str(&wrap(body, marker));

    Injection {
        content: normalize_spacing(&updated),
        removed: ranges.len(),
        orphans: scan.orphans,
    }
}

/// Normalize blank lines in generated assets.
///
/// Runs of two or more blank lines collapse to a single blank line (also at the
/// start of the file) and the file ends with exactly one newline. Content made
/// of nothing but newlines normalizes to the empty string.
///
/// # Example
/// ```
/// use stpm_blocks::normalize_spacing;
///
/// assert_eq!(normalize_spacing("a\n\n\n\nb\n\n"), "a\n\nb\n");
/// assert_eq!(normalize_spacing("\n\n"), "");
/// ```
pub fn normalize_spacing(content: &str) -> String {
    let mut lines: Vec<&str> = content.split('\n').collect();
    while lines.last().is_some_and(|l| is_blank(l)) {
        lines.pop();
    }
    if lines.is_empty() {
        return String::new();
    }

    let mut result = String::with_capacity(content.len());
    let mut previous_blank = false;
    for line in lines {
        let blank = is_blank(line);
        if blank && previous_blank {
            continue;
        }
        result.push_str(line);
        result.push('\n');
        previous_blank = blank;
    }
    result
}

fn is_blank(line: &str) -> bool {
    line.is_empty() || line == "\r"
}
