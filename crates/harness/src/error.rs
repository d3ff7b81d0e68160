//! Error types for the E2E harness

use thiserror::Error;

#[derive(Error, Debug)]
pub enum HarnessError {
    #[error("Playwright not found. Install with: npx playwright install")]
    PlaywrightNotFound,

    #[error("browser script failed: {0}")]
    Browser(String),

    #[error("browser script produced no result line")]
    MissingResult,

    #[error("scenario budget exceeded after {0}s")]
    ScenarioBudget(u64),

    #[error("site server failed to start: {0}")]
    ServerStartup(String),

    #[error("site server health check failed after {0} attempts")]
    ServerHealthCheck(usize),

    #[error(transparent)]
    Config(#[from] turbocheck_common::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

pub type HarnessResult<T> = Result<T, HarnessError>;
