//! Error types for stpm-blocks

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Invalid marker '{marker}': {reason}")]
    InvalidMarker { marker: String, reason: String },
}
