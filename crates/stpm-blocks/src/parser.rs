//! Region scanning.
//!
//! A region runs from a `START` delimiter line to the next `END` delimiter
//! line carrying the same marker. Both delimiters must sit on their own line.
//! An `END` closes the nearest unpaired `START` before it, so the shortest
//! span wins; any earlier `START` that never gets closed is reported as an
//! [`Orphan`] and left alone, and an `END` with nothing to close is ignored.
//! Regions never overlap.
//!
//! Nested regions with the same marker are not supported: the inner `START`
//! pairs with the first `END` and the outer one becomes an orphan.

use std::collections::{BTreeMap, BTreeSet};
use std::ops::Range;
use std::sync::LazyLock;

use regex::Regex;

use crate::marker::{Marker, begin_token, end_token};

/// Any `START` delimiter line, capturing the marker.
static START_LINE_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^/\* STPM: START ([^\s*]+) \*/\r?$").expect("Invalid start line regex")
});

/// A region found in an asset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Region {
    /// The marker owning this region.
    pub marker: String,
    /// Byte range of the region, from the start of the `START` line through
    /// the newline ending the `END` line (when there is one).
    pub range: Range<usize>,
    /// The text between the delimiter lines, without the newline that
    /// precedes the `END` line.
    pub body: String,
    /// 1-based line of the `START` delimiter.
    pub start_line: usize,
    /// 1-based line of the `END` delimiter.
    pub end_line: usize,
}

/// A `START` delimiter with no matching `END`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Orphan {
    pub marker: String,
    /// 1-based line of the dangling `START` delimiter.
    pub line: usize,
}

/// Result of scanning an asset for every marker.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Scan {
    /// Regions in order of appearance.
    pub regions: Vec<Region>,
    /// Dangling `START` lines in order of appearance.
    pub orphans: Vec<Orphan>,
}

impl Scan {
    /// Group regions by marker, keeping each group in order of appearance.
    pub fn by_marker(&self) -> BTreeMap<String, Vec<Region>> {
        let mut grouped: BTreeMap<String, Vec<Region>> = BTreeMap::new();
        for region in &self.regions {
            grouped
                .entry(region.marker.clone())
                .or_default()
                .push(region.clone());
        }
        grouped
    }
}

/// A delimiter line located in the content.
#[derive(Debug, Clone, Copy)]
struct Line {
    /// Offset of the first byte of the token.
    start: usize,
    /// Offset of the first byte of the following line (or end of content).
    next: usize,
}

/// Find every line consisting of exactly `token`, in order.
fn find_lines(content: &str, token: &str) -> Vec<Line> {
    let mut lines = Vec::new();
    let mut cursor = 0;
    while let Some(found) = content[cursor..].find(token) {
        let pos = cursor + found;
        let at_line_start = pos == 0 || content.as_bytes()[pos - 1] == b'\n';
        let after = pos + token.len();
        let rest = &content[after..];

        let next = if rest.is_empty() {
            Some(after)
        } else if rest.starts_with('\n') {
            Some(after + 1)
        } else if rest.starts_with("\r\n") {
            Some(after + 2)
        } else {
            None
        };

        if at_line_start && let Some(next) = next {
            lines.push(Line { start: pos, next });
        }
        // Delimiters all start with an ASCII '/', so pos + 1 is a char boundary
        cursor = pos + 1;
    }
    lines
}

fn line_number(content: &str, offset: usize) -> usize {
    content[..offset].bytes().filter(|b| *b == b'\n').count() + 1
}

fn region(content: &str, marker: &str, start: Line, end: Line) -> Region {
    let inner = &content[start.next..end.start];
    let body = inner
        .strip_suffix('\n')
        .map(|b| b.strip_suffix('\r').unwrap_or(b))
        .unwrap_or(inner);

    Region {
        marker: marker.to_string(),
        range: start.start..end.next,
        body: body.to_string(),
        start_line: line_number(content, start.start),
        end_line: line_number(content, end.start),
    }
}

/// Pair the delimiter lines of one marker.
///
/// Orphans come back with the byte offset of their `START` line.
fn pair(content: &str, marker: &Marker) -> (Vec<Region>, Vec<(usize, Orphan)>) {
    let mut events: Vec<(Line, bool)> = find_lines(content, &begin_token(marker))
        .into_iter()
        .map(|line| (line, true))
        .chain(
            find_lines(content, &end_token(marker))
                .into_iter()
                .map(|line| (line, false)),
        )
        .collect();
    events.sort_by_key(|(line, _)| line.start);

    let orphan = |line: Line| {
        (
            line.start,
            Orphan {
                marker: marker.to_string(),
                line: line_number(content, line.start),
            },
        )
    };

    let mut regions = Vec::new();
    let mut orphans = Vec::new();
    let mut open: Option<Line> = None;
    for (line, is_start) in events {
        if is_start {
            if let Some(unclosed) = open.replace(line) {
                orphans.push(orphan(unclosed));
            }
        } else if let Some(start) = open.take() {
            regions.push(region(content, marker.as_str(), start, line));
        }
    }
    if let Some(unclosed) = open {
        orphans.push(orphan(unclosed));
    }

    (regions, orphans)
}

/// Find every region for one marker, left to right, non-overlapping.
///
/// # Example
/// ```
/// use stpm_blocks::{Marker, find_all};
///
/// let content = "a\n/* STPM: START x */\nbody\n/* STPM: END x */\nb\n";
/// let regions = find_all(content, &Marker::new("x").unwrap());
/// assert_eq!(regions.len(), 1);
/// assert_eq!(regions[0].body, "body");
/// ```
pub fn find_all(content: &str, marker: &Marker) -> Vec<Region> {
    scan_marker(content, marker).regions
}

/// Scan for one marker, reporting regions and orphaned `START` lines.
pub fn scan_marker(content: &str, marker: &Marker) -> Scan {
    let (regions, orphans) = pair(content, marker);
    Scan {
        regions,
        orphans: orphans.into_iter().map(|(_, o)| o).collect(),
    }
}

/// Scan for every marker at once.
///
/// Each marker is paired on its own. Where regions of different markers
/// overlap, the one starting first wins and the other's delimiters count as
/// part of its body; a `START` inside a kept region is never an orphan.
pub fn scan(content: &str) -> Scan {
    let markers: BTreeSet<Marker> = START_LINE_REGEX
        .captures_iter(content)
        .filter_map(|caps| caps.get(1))
        .filter_map(|m| Marker::new(m.as_str()).ok())
        .collect();

    let mut candidates = Vec::new();
    let mut dangling = Vec::new();
    for marker in &markers {
        let (regions, orphans) = pair(content, marker);
        candidates.extend(regions);
        dangling.extend(orphans);
    }
    candidates.sort_by_key(|r| r.range.start);

    let mut scan = Scan::default();
    for candidate in candidates {
        let overlaps = scan
            .regions
            .last()
            .is_some_and(|kept| candidate.range.start < kept.range.end);
        if !overlaps {
            scan.regions.push(candidate);
        }
    }

    dangling.sort_by_key(|(offset, _)| *offset);
    scan.orphans = dangling
        .into_iter()
        .filter(|(offset, _)| !scan.regions.iter().any(|r| r.range.contains(offset)))
        .map(|(_, o)| o)
        .collect();
    scan
}

/// Group every region in the content by marker.
pub fn find_all_markers(content: &str) -> BTreeMap<String, Vec<Region>> {
    scan(content).by_marker()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn marker(s: &str) -> Marker {
        Marker::new(s).unwrap()
    }

    #[test]
    fn test_find_all_empty() {
        assert!(find_all("", &marker("x")).is_empty());
        assert!(find_all("body {}\n", &marker("x")).is_empty());
    }

    #[test]
    fn test_find_single_region_range_covers_both_lines() {
        let content = "pre\n/* STPM: START x */\nA\n/* STPM: END x */\npost\n";
        let regions = find_all(content, &marker("x"));
        assert_eq!(regions.len(), 1);
        assert_eq!(
            &content[regions[0].range.clone()],
            "/* STPM: START x */\nA\n/* STPM: END x */\n"
        );
        assert_eq!(regions[0].start_line, 2);
        assert_eq!(regions[0].end_line, 4);
    }

    #[test]
    fn test_end_at_eof_without_newline() {
        let content = "/* STPM: START x */\nA\n/* STPM: END x */";
        let regions = find_all(content, &marker("x"));
        assert_eq!(regions.len(), 1);
        assert_eq!(regions[0].range, 0..content.len());
    }

    #[test]
    fn test_first_end_wins() {
        let content = "/* STPM: START x */\nA\n/* STPM: END x */\nB\n/* STPM: END x */\n";
        let regions = find_all(content, &marker("x"));
        assert_eq!(regions.len(), 1);
        assert_eq!(regions[0].body, "A");
    }

    #[test]
    fn test_delimiter_must_be_on_own_line() {
        let content = "x = '/* STPM: START x */';\nA\n/* STPM: END x */\n";
        let scan = scan_marker(content, &marker("x"));
        assert!(scan.regions.is_empty());
        assert!(scan.orphans.is_empty());
    }

    #[test]
    fn test_orphaned_start_is_reported() {
        let content = "a\n/* STPM: START x */\nno end here\n";
        let scan = scan_marker(content, &marker("x"));
        assert!(scan.regions.is_empty());
        assert_eq!(
            scan.orphans,
            vec![Orphan {
                marker: "x".into(),
                line: 2
            }]
        );
    }

    #[test]
    fn test_end_closes_nearest_start() {
        let content = "\
/* STPM: START x */
user text
/* STPM: START x */
A
/* STPM: END x */
";
        let scan = scan_marker(content, &marker("x"));
        assert_eq!(scan.regions.len(), 1);
        assert_eq!(scan.regions[0].body, "A");
        assert_eq!(scan.regions[0].start_line, 3);
        assert_eq!(scan.orphans, vec![Orphan { marker: "x".into(), line: 1 }]);
    }

    #[test]
    fn test_scan_keeps_orphan_before_region() {
        let content = "\
/* STPM: START x */
dangling
/* STPM: START y */
Y
/* STPM: END y */
/* STPM: START x */
X
/* STPM: END x */
";
        let scan = scan(content);
        assert_eq!(scan.regions.len(), 2);
        assert_eq!(scan.regions[0].marker, "y");
        assert_eq!(scan.regions[1].body, "X");
        assert_eq!(scan.orphans, vec![Orphan { marker: "x".into(), line: 1 }]);
    }

    #[test]
    fn test_crlf_delimiters() {
        let content = "/* STPM: START x */\r\nA\r\n/* STPM: END x */\r\n";
        let regions = find_all(content, &marker("x"));
        assert_eq!(regions.len(), 1);
        assert_eq!(regions[0].body, "A");
        assert_eq!(regions[0].range, 0..content.len());
    }

    #[test]
    fn test_scan_groups_markers() {
        let content = "\
/* STPM: START a */
1
/* STPM: END a */
/* STPM: START b */
2
/* STPM: END b */
/* STPM: START a */
3
/* STPM: END a */
";
        let grouped = find_all_markers(content);
        assert_eq!(grouped.len(), 2);
        assert_eq!(grouped["a"].len(), 2);
        assert_eq!(grouped["a"][1].body, "3");
        assert_eq!(grouped["b"][0].body, "2");
    }

    #[test]
    fn test_scan_skips_starts_inside_bodies() {
        let content = "\
/* STPM: START outer */
/* STPM: START inner */
/* STPM: END outer */
";
        let scan = scan(content);
        assert_eq!(scan.regions.len(), 1);
        assert_eq!(scan.regions[0].marker, "outer");
        assert!(scan.orphans.is_empty());
    }
}
