//! Region delimiters.

use crate::error::{Error, Result};

/// Prefix shared by both delimiter lines
const TOKEN_PREFIX: &str = "/* STPM:";

/// A validated region marker.
///
/// Markers appear verbatim inside a CSS/JS comment, so they may not contain
/// whitespace (the delimiter is parsed up to the next space) or `*` (which
/// could close the comment early).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Marker(String);

impl Marker {
    /// Validate and wrap a marker string.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidMarker`] for empty markers and markers
    /// containing whitespace or `*`.
    pub fn new(marker: impl Into<String>) -> Result<Self> {
        let marker = marker.into();
        let invalid = |reason: &str| Error::InvalidMarker {
            marker: marker.clone(),
            reason: reason.to_string(),
        };

        if marker.is_empty() {
            return Err(invalid("marker is empty"));
        }
        if marker.chars().any(char::is_whitespace) {
            return Err(invalid("marker contains whitespace"));
        }
        if marker.contains('*') {
            return Err(invalid("marker contains '*'"));
        }
        Ok(Self(marker))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Marker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Marker {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// The opening delimiter line for a marker (without newline).
pub fn begin_token(marker: &Marker) -> String {
    format!("{TOKEN_PREFIX} START {marker} */")
}

/// The closing delimiter line for a marker (without newline).
pub fn end_token(marker: &Marker) -> String {
    format!("{TOKEN_PREFIX} END {marker} */")
}

/// Wrap a body into a complete region, ready to append to an asset.
///
/// The result is `"\n" + BEGIN + "\n" + body + "\n" + END + "\n"`.
///
/// # Example
/// ```
/// use stpm_blocks::{Marker, wrap};
///
/// let marker = Marker::new("acme").unwrap();
/// assert_eq!(
///     wrap("body", &marker),
///     "\n/* STPM: START acme */\nbody\n/* STPM: END acme */\n"
/// );
/// ```
pub fn wrap(body: &str, marker: &Marker) -> String {
    format!("\n{}\n{}\n{}\n", begin_token(marker), body, end_token(marker))
}
