//! Shared vocabulary for the TurboCheck verification tools.
//!
//! TurboConvert's pages expose a fixed DOM contract (element identifiers for
//! upload, acceptance, trigger, and completion) and a fixed network boundary.
//! Both the browser-driven harness and the static site audit read from the
//! same source of truth defined here:
//!
//! - [`tools`]: the tool registry, one [`tools::ToolContract`] per page slug
//! - [`allowlist`]: the partitioned network allow-list
//! - [`fixtures`]: deterministic minimal sample files, one per format

pub mod allowlist;
pub mod error;
pub mod fixtures;
pub mod tools;

pub use allowlist::{AllowList, OriginClass};
pub use error::{Error, Result};
pub use fixtures::{FixtureKind, FixtureSet};
pub use tools::{ContractFamily, ConversionFlow, ToolContract, ToolRegistry};
