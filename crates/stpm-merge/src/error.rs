//! Error types for stpm-merge

pub type Result<T> = std::result::Result<T, Error>;

/// The merge engine only fails on documents of the wrong shape.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("{what} must be a JSON object")]
    NotAnObject { what: String },

    #[error("{what} must be a JSON array")]
    NotAnArray { what: String },
}
