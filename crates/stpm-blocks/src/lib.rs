//! Marker-delimited regions for shared text assets.
//!
//! Packages own regions inside shared stylesheets and scripts. A region is
//! delimited by two lines carrying the owner's marker:
//!
//! ```text
//! /* STPM: START acme-slider */
//! .slider { display: flex; }
//! /* STPM: END acme-slider */
//! ```
//!
//! Everything here is a pure text transformation; reading and writing the
//! asset files is the caller's job.
//!
//! - [`marker`] builds the delimiter tokens and wraps bodies into regions
//! - [`parser`] finds regions (for one marker or for all of them) and orphaned
//!   `START` lines
//! - [`writer`] removes regions, injects a fresh one and normalizes spacing
//! - [`dedup`] collapses duplicate regions down to the first occurrence

pub mod dedup;
pub mod error;
pub mod marker;
pub mod parser;
pub mod writer;

pub use dedup::{Dedup, dedup};
pub use error::{Error, Result};
pub use marker::{Marker, begin_token, end_token, wrap};
pub use parser::{Orphan, Region, Scan, find_all, find_all_markers, scan, scan_marker};
pub use writer::{Injection, inject, normalize_spacing, remove_all};
