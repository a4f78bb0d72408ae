//! Normalized path handling and project-root confinement

use std::path::{Path, PathBuf};

use crate::{Error, Result};

/// A path normalized to use forward slashes internally.
///
/// Paths are stored with forward slashes and converted to the
/// platform-native form only at I/O boundaries.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NormalizedPath {
    /// Internal representation always uses forward slashes
    inner: String,
}

impl NormalizedPath {
    /// Create a new NormalizedPath from any path-like input.
    pub fn new(path: impl AsRef<Path>) -> Self {
        let path_str = path.as_ref().to_string_lossy();
        Self {
            inner: path_str.replace('\\', "/"),
        }
    }

    /// Get the internal normalized string representation.
    pub fn as_str(&self) -> &str {
        &self.inner
    }

    /// Convert to a platform-native PathBuf for I/O operations.
    pub fn to_native(&self) -> PathBuf {
        PathBuf::from(&self.inner)
    }

    /// Join this path with a segment.
    pub fn join(&self, segment: &str) -> Self {
        let segment_normalized = segment.replace('\\', "/");
        let joined = if self.inner.ends_with('/') {
            format!("{}{}", self.inner, segment_normalized)
        } else {
            format!("{}/{}", self.inner, segment_normalized)
        };
        Self { inner: joined }
    }

    /// Get the parent directory.
    pub fn parent(&self) -> Option<Self> {
        let trimmed = self.inner.trim_end_matches('/');
        match trimmed.rfind('/') {
            Some(idx) if idx > 0 => Some(Self {
                inner: trimmed[..idx].to_string(),
            }),
            Some(0) => Some(Self {
                inner: "/".to_string(),
            }),
            _ => None,
        }
    }

    /// Get the file name component.
    pub fn file_name(&self) -> Option<&str> {
        let trimmed = self.inner.trim_end_matches('/');
        trimmed.rsplit('/').next().filter(|name| !name.is_empty())
    }

    /// Check if this path exists on the filesystem.
    pub fn exists(&self) -> bool {
        self.to_native().exists()
    }

    /// Check if this is a file.
    pub fn is_file(&self) -> bool {
        self.to_native().is_file()
    }

    /// Get the extension if present.
    pub fn extension(&self) -> Option<&str> {
        self.file_name().and_then(|name| {
            let idx = name.rfind('.')?;
            if idx == 0 { None } else { Some(&name[idx + 1..]) }
        })
    }
}

impl AsRef<Path> for NormalizedPath {
    fn as_ref(&self) -> &Path {
        Path::new(&self.inner)
    }
}

impl std::fmt::Display for NormalizedPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.inner)
    }
}

impl From<&str> for NormalizedPath {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for NormalizedPath {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl From<PathBuf> for NormalizedPath {
    fn from(p: PathBuf) -> Self {
        Self::new(p)
    }
}

impl From<&Path> for NormalizedPath {
    fn from(p: &Path) -> Self {
        Self::new(p)
    }
}

/// Clean a project-relative path.
///
/// Collapses `.` and empty segments and converts backslashes. Absolute paths,
/// drive-prefixed paths and any `..` segment are rejected: a relative path that
/// names a file outside the project is never produced.
pub fn clean_relative(relative: &str) -> Result<String> {
    let unified = relative.replace('\\', "/");
    let escape = || Error::PathEscape {
        path: relative.to_string(),
    };

    if unified.starts_with('/') || has_drive_prefix(&unified) {
        return Err(escape());
    }

    let mut segments = Vec::new();
    for segment in unified.split('/') {
        match segment {
            "" | "." => continue,
            ".." => return Err(escape()),
            other => segments.push(other),
        }
    }

    if segments.is_empty() {
        return Err(escape());
    }
    Ok(segments.join("/"))
}

fn has_drive_prefix(path: &str) -> bool {
    let bytes = path.as_bytes();
    bytes.len() >= 2 && bytes[0].is_ascii_alphabetic() && bytes[1] == b':'
}

/// The directory a project lives in.
///
/// All engine I/O goes through [`ProjectRoot::resolve`], so a manifest entry or
/// a package-provided path can never address a file outside the project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectRoot {
    root: NormalizedPath,
}

impl ProjectRoot {
    /// Create a project root, canonicalizing it when it exists.
    pub fn new(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        let resolved = dunce::canonicalize(path).unwrap_or_else(|_| path.to_path_buf());
        Self {
            root: NormalizedPath::new(resolved),
        }
    }

    /// The root directory itself.
    pub fn path(&self) -> &NormalizedPath {
        &self.root
    }

    /// Resolve a project-relative path to an absolute one under the root.
    ///
    /// # Errors
    ///
    /// Returns [`Error::PathEscape`] if `relative` is absolute or climbs out
    /// of the project with `..`.
    pub fn resolve(&self, relative: &str) -> Result<NormalizedPath> {
        let cleaned = clean_relative(relative)?;
        Ok(self.root.join(&cleaned))
    }

    /// Express an absolute path relative to the root, if it lives under it.
    pub fn relative(&self, absolute: impl AsRef<Path>) -> Option<String> {
        let absolute = absolute.as_ref();
        let stripped = absolute.strip_prefix(self.root.to_native()).ok()?;
        let rel = NormalizedPath::new(stripped);
        if rel.as_str().is_empty() {
            None
        } else {
            Some(rel.as_str().to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clean_relative_collapses_dot_segments() {
        assert_eq!(clean_relative("./assets//theme.css").unwrap(), "assets/theme.css");
        assert_eq!(clean_relative("locales\\en.default.json").unwrap(), "locales/en.default.json");
    }

    #[test]
    fn clean_relative_rejects_escapes() {
        assert!(matches!(clean_relative("../outside.css"), Err(Error::PathEscape { .. })));
        assert!(matches!(clean_relative("assets/../../x"), Err(Error::PathEscape { .. })));
        assert!(matches!(clean_relative("/etc/passwd"), Err(Error::PathEscape { .. })));
        assert!(matches!(clean_relative("C:/windows"), Err(Error::PathEscape { .. })));
        assert!(matches!(clean_relative(""), Err(Error::PathEscape { .. })));
    }

    #[test]
    fn normalized_path_file_name_and_extension() {
        let path = NormalizedPath::new("assets/theme.css");
        assert_eq!(path.file_name(), Some("theme.css"));
        assert_eq!(path.extension(), Some("css"));
        assert_eq!(path.parent().unwrap().as_str(), "assets");
    }

    #[test]
    fn project_root_round_trips_relative_paths() {
        let temp = tempfile::tempdir().unwrap();
        let root = ProjectRoot::new(temp.path());

        let resolved = root.resolve("snippets/card.liquid").unwrap();
        assert_eq!(
            root.relative(resolved.to_native()).as_deref(),
            Some("snippets/card.liquid")
        );
    }
}
