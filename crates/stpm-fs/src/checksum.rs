//! SHA-256 checksum utilities
//!
//! Used to skip rewriting copied package files whose content is unchanged.

use sha2::{Digest, Sha256};
use std::path::Path;

/// Prefix for all checksums produced by this module
const PREFIX: &str = "sha256:";

/// Compute the SHA-256 checksum of raw bytes.
///
/// Returns a string in the canonical format `"sha256:<hex>"`.
pub fn compute_checksum(content: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content);
    format!("{}{:x}", PREFIX, hasher.finalize())
}

/// Compute the SHA-256 checksum of a file's contents.
///
/// # Errors
///
/// Returns an error if the file cannot be read.
pub fn compute_file_checksum(path: &Path) -> std::io::Result<String> {
    let content = std::fs::read(path)?;
    Ok(compute_checksum(&content))
}

/// True when both files exist and hold identical bytes.
pub fn files_match(a: &Path, b: &Path) -> bool {
    match (compute_file_checksum(a), compute_file_checksum(b)) {
        (Ok(left), Ok(right)) => left == right,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn checksum_has_prefix() {
        let checksum = compute_checksum(b"hello");
        assert!(checksum.starts_with("sha256:"));
        assert_eq!(checksum.len(), PREFIX.len() + 64);
    }

    #[test]
    fn files_match_detects_equal_content() {
        let temp = tempfile::tempdir().unwrap();
        let a = temp.path().join("a.liquid");
        let b = temp.path().join("b.liquid");
        let c = temp.path().join("c.liquid");
        std::fs::write(&a, "{% render 'x' %}").unwrap();
        std::fs::write(&b, "{% render 'x' %}").unwrap();
        std::fs::write(&c, "{% render 'y' %}").unwrap();

        assert!(files_match(&a, &b));
        assert!(!files_match(&a, &c));
        assert!(!files_match(&a, &temp.path().join("missing")));
    }
}
