//! Package identifiers.

use std::fmt;

use serde::{Deserialize, Serialize};
use stpm_blocks::Marker;

use crate::error::{Error, Result};

/// A normalized package identifier.
///
/// Identifiers are trimmed and lower-cased. The identifier doubles as the
/// marker of every region the package owns, so it must also be a valid
/// [`Marker`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PackageId {
    marker: Marker,
}

impl PackageId {
    /// Normalize and validate a raw identifier.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidPackageId`] if the normalized identifier is
    /// empty or cannot be used as a marker.
    pub fn new(raw: &str) -> Result<Self> {
        let normalized = raw.trim().to_lowercase();
        let marker = Marker::new(normalized).map_err(|e| Error::InvalidPackageId {
            id: raw.to_string(),
            reason: match e {
                stpm_blocks::Error::InvalidMarker { reason, .. } => reason,
            },
        })?;
        Ok(Self { marker })
    }

    pub fn as_str(&self) -> &str {
        self.marker.as_str()
    }

    /// The marker delimiting this package's regions.
    pub fn marker(&self) -> &Marker {
        &self.marker
    }
}

impl fmt::Display for PackageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a package contributes to the project.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PackageKind {
    /// Ships a theme-shaped layout: copied files plus merged config
    Native,
    /// Ships entry points compiled into regions of the shared assets
    Bundled,
}

impl fmt::Display for PackageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Native => write!(f, "native"),
            Self::Bundled => write!(f, "bundled"),
        }
    }
}
