//! Network observer: classifies captured background requests.
//!
//! The browser script records the URL of every `fetch`/`xhr` request from
//! the moment the listener attaches (before navigation) until the settle
//! window closes. Classification happens here, harness-side, against an
//! allow-list handed in at construction (never an ambient global), so
//! runs stay configurable per environment.

use serde::{Deserialize, Serialize};

use turbocheck_common::{AllowList, OriginClass};

/// Observation window after load, in milliseconds.
pub const SETTLE_MS: u64 = 2_000;

pub struct NetworkObserver {
    allowlist: AllowList,
    settle_ms: u64,
}

impl NetworkObserver {
    pub fn new(allowlist: AllowList) -> Self {
        Self {
            allowlist,
            settle_ms: SETTLE_MS,
        }
    }

    pub fn with_settle_ms(mut self, settle_ms: u64) -> Self {
        self.settle_ms = settle_ms;
        self
    }

    pub fn settle_ms(&self) -> u64 {
        self.settle_ms
    }

    pub fn allowlist(&self) -> &AllowList {
        &self.allowlist
    }

    /// Classify every captured URL. Both first-party/CDN and advertising
    /// origins are legitimate; anything else is a violation, reported with
    /// the complete offending list.
    pub fn inspect(&self, requests: &[String]) -> NetworkReport {
        let mut report = NetworkReport {
            observed: requests.len(),
            ..NetworkReport::default()
        };
        for url in requests {
            match self.allowlist.classify(url) {
                OriginClass::FirstParty => report.first_party += 1,
                OriginClass::Advertising => report.advertising += 1,
                OriginClass::Disallowed => report.violations.push(url.clone()),
            }
        }
        report
    }
}

/// Outcome of one observation window.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NetworkReport {
    pub observed: usize,
    pub first_party: usize,
    pub advertising: usize,
    pub violations: Vec<String>,
}

impl NetworkReport {
    pub fn ok(&self) -> bool {
        self.violations.is_empty()
    }
}
