//! Static pre-deployment audit for the TurboConvert site.
//!
//! Loads a built site (directory or zip archive) and runs a battery of
//! markup, SEO, and consistency checks against the tool registry. Findings
//! are split into errors (deployment blocking) and warnings. Also hosts
//! the structured-data generator that injects schema.org graphs into tool
//! pages.
//!
//! Played before every release: exit code 0 = safe to deploy.

pub mod checks;
pub mod report;
pub mod schema;
pub mod site;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AuditError {
    #[error("unsupported input: {0}")]
    UnsupportedInput(String),

    #[error("path traversal detected in archive: {0}")]
    PathTraversal(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("archive error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type AuditResult<T> = Result<T, AuditError>;

pub use report::{AuditReport, Finding};
pub use site::SiteSnapshot;
