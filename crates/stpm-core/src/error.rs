//! Error types for stpm-core

/// Result type for stpm-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in stpm-core operations
///
/// Orphaned markers and ambiguous block matches are not errors: they are
/// logged as warnings and returned in reports.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A manifest, locale table, schema or `package.json` failed to parse
    #[error("Malformed document {path}: {message}")]
    MalformedDocument { path: String, message: String },

    #[error("Invalid package id '{id}': {reason}")]
    InvalidPackageId { id: String, reason: String },

    #[error("Package '{id}' is not imported")]
    NotImported { id: String },

    #[error("Package '{id}' is already imported")]
    AlreadyImported { id: String },

    #[error("Package '{id}' has no style or script entry point")]
    NoEntryPoints { id: String },

    #[error("`{command}` failed for '{id}' (exit code {})", .exit_code.map_or_else(|| "none".to_string(), |c| c.to_string()))]
    InstallFailed {
        id: String,
        command: String,
        exit_code: Option<i32>,
    },

    #[error("Failed to bundle {entry}: {message}")]
    BundleFailed { entry: String, message: String },

    #[error("Failed to scan package '{id}': {message}")]
    ScanFailed { id: String, message: String },

    // Transparent wrappers for underlying crate errors
    /// Filesystem error from stpm-fs
    #[error(transparent)]
    Fs(#[from] stpm_fs::Error),

    /// Marker error from stpm-blocks
    #[error(transparent)]
    Blocks(#[from] stpm_blocks::Error),

    /// Shape error from stpm-merge
    #[error(transparent)]
    Merge(#[from] stpm_merge::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl Error {
    pub(crate) fn malformed(path: impl Into<String>, message: impl std::fmt::Display) -> Self {
        Self::MalformedDocument {
            path: path.into(),
            message: message.to_string(),
        }
    }
}
