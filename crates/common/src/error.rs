//! Error types shared across TurboCheck crates

use thiserror::Error;

/// Result type alias using the shared Error
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    /// A scenario or command referenced a slug the registry does not know.
    /// This is a configuration error and must fail fast, never skip.
    #[error("unknown tool: '{slug}' has no registry entry")]
    UnknownTool { slug: String },

    #[error("fixture error: {0}")]
    Fixture(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("archive error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
