//! Cross-page state probe: the landing-page → tool-page hand-off contract.
//!
//! The landing page's format detector and the tool pages never talk to each
//! other directly; their only channel is the persistent client-side store.
//! The probe asserts the whole chain: detector surfaces suggestions, the
//! file lands in the store, and a matching tool page picks it up after a
//! plain navigation.

use serde::{Deserialize, Serialize};

use crate::playwright::RunObservation;
use crate::runner::ScenarioFailure;

/// IndexedDB database holding the hand-off record.
pub const STORE_DATABASE: &str = "turboconvert";
/// Object store inside [`STORE_DATABASE`].
pub const STORE_OBJECT: &str = "pending_file";
/// The single logical record key: the most recently selected file.
pub const STORE_KEY: &str = "file";

/// Placeholder the filename element shows before any file is loaded.
pub const EMPTY_FILENAME: &str = "—";

/// DOM contract of the landing-page detector.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectorContract {
    pub input_id: &'static str,
    pub results_id: &'static str,
    pub suggestions_selector: &'static str,
    /// Bound on the detector surfacing its results, in ms.
    pub results_timeout_ms: u64,
    /// Grace period for the store write to land before reading it back.
    pub store_write_ms: u64,
}

impl Default for DetectorContract {
    fn default() -> Self {
        Self {
            input_id: "detectorInput",
            results_id: "detectorResults",
            suggestions_selector: "#detSuggestions a",
            results_timeout_ms: 3_000,
            store_write_ms: 500,
        }
    }
}

/// Filename element on tool pages that render the handed-off file's name.
/// Only some pages expose one; absence skips that assertion.
pub fn filename_element(slug: &str) -> Option<&'static str> {
    match slug {
        "compress-pdf" => Some("fname"),
        _ => None,
    }
}

/// Evaluate the probe assertions over a hand-off run's raw observations.
/// Returns the first failed expectation, or `None` when the chain held.
pub fn evaluate(slug: &str, observation: &RunObservation) -> Option<ScenarioFailure> {
    let suggestions = observation.suggestion_count.unwrap_or(0);
    if suggestions < 1 {
        return Some(ScenarioFailure::Assertion {
            message: "detector surfaced no suggested tools".to_string(),
        });
    }

    match observation.first_suggestion_href.as_deref() {
        Some(href) if href.starts_with('/') => {}
        Some(href) => {
            return Some(ScenarioFailure::Assertion {
                message: format!("suggested link is not an internal path: {href}"),
            })
        }
        None => {
            return Some(ScenarioFailure::Assertion {
                message: "suggested link has no href".to_string(),
            })
        }
    }

    if observation.store_present != Some(true) {
        return Some(ScenarioFailure::Assertion {
            message: format!(
                "no record at {STORE_DATABASE}/{STORE_OBJECT}/{STORE_KEY} after detector upload"
            ),
        });
    }

    if filename_element(slug).is_some() {
        match observation.preload_file_name.as_deref().map(str::trim) {
            Some(name) if !name.is_empty() && name != EMPTY_FILENAME => {}
            other => {
                return Some(ScenarioFailure::Assertion {
                    message: format!(
                        "tool page did not preload the handed-off file (filename element shows {:?})",
                        other.unwrap_or("nothing")
                    ),
                })
            }
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::playwright::RunObservation;

    fn good_observation() -> RunObservation {
        RunObservation {
            ok: true,
            phase: "completed".into(),
            error: None,
            waiting: None,
            requests: vec![],
            alert_fired: None,
            intake_found: None,
            completion_visible: None,
            store_present: Some(true),
            suggestion_count: Some(3),
            first_suggestion_href: Some("/compress-pdf".into()),
            preload_file_name: Some("test.pdf".into()),
        }
    }

    #[test]
    fn full_chain_passes() {
        assert!(evaluate("compress-pdf", &good_observation()).is_none());
    }

    #[test]
    fn external_suggestion_link_fails() {
        let mut obs = good_observation();
        obs.first_suggestion_href = Some("https://othersite.example/convert".into());
        let failure = evaluate("compress-pdf", &obs).unwrap();
        assert!(matches!(failure, ScenarioFailure::Assertion { .. }));
    }

    #[test]
    fn missing_store_record_fails() {
        let mut obs = good_observation();
        obs.store_present = Some(false);
        let failure = evaluate("compress-pdf", &obs).unwrap();
        let message = format!("{failure:?}");
        assert!(message.contains("pending_file"));
    }

    #[test]
    fn placeholder_filename_means_no_preload() {
        let mut obs = good_observation();
        obs.preload_file_name = Some("—".into());
        assert!(evaluate("compress-pdf", &obs).is_some());
        // pages without a filename element skip that assertion
        assert!(evaluate("compress-image", &obs).is_none());
    }
}
