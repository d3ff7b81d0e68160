//! TurboCheck E2E Harness
//!
//! Drives the TurboConvert tool pages through a real browser and verifies
//! the product's observable contract: files are accepted and converted
//! on-device, no background call leaves the allow-listed origins, and the
//! landing page hands files to tool pages through the persistent
//! client-side store.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                   ScenarioRunner (Rust)                      │
//! ├──────────────────────────────────────────────────────────────┤
//! │  Scenario (YAML or derived from the ToolRegistry)            │
//! │    ├── Conversion  : navigate → submit → accept? → convert   │
//! │    ├── Acceptance  : navigate → submit → accept              │
//! │    ├── SizeLimit   : call the intake seam with a synthetic   │
//! │    │                 oversized descriptor                    │
//! │    ├── NetworkOnly : load + settle, classify every request   │
//! │    └── Handoff     : detector → store → tool page preload    │
//! ├──────────────────────────────────────────────────────────────┤
//! │  PlaywrightDriver                                            │
//! │    └── generates a Node script per scenario, runs it, and    │
//! │        parses the TC_RESULT line it prints                   │
//! ├──────────────────────────────────────────────────────────────┤
//! │  NetworkObserver: allow-list classification of every         │
//! │        captured fetch/xhr URL                                │
//! │  SiteServer: optional local server for a built site dir     │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! Scenarios run strictly sequentially: conversions are heavy in-browser
//! WASM workloads and must not contend. All waits are bounded; failures are
//! local to their scenario.

pub mod error;
pub mod network;
pub mod playwright;
pub mod probe;
pub mod report;
pub mod runner;
pub mod scenario;
pub mod server;

pub use error::{HarnessError, HarnessResult};
pub use network::{NetworkObserver, NetworkReport};
pub use runner::{RunnerConfig, ScenarioOutcome, ScenarioRunner, SuiteReport};
pub use scenario::{Phase, Scenario, ScenarioMode};
