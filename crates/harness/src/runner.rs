//! Scenario runner: sequential orchestration of the suite.
//!
//! One scenario runs to completion (or timeout) before the next begins:
//! the suite is deliberately non-parallel so heavy in-browser conversions
//! never contend. A failed scenario aborts its own remaining steps only;
//! siblings still run. The single automatic recovery is one uniform
//! scenario-level retry when `CI` is set.

use std::path::PathBuf;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tracing::{debug, error, info};

use turbocheck_common::{AllowList, FixtureSet, ToolRegistry};

use crate::error::{HarnessError, HarnessResult};
use crate::network::{NetworkObserver, NetworkReport};
use crate::playwright::{PlaywrightConfig, PlaywrightDriver, RunObservation};
use crate::probe;
use crate::scenario::{Phase, Scenario, ScenarioMode};

/// Configuration for a suite run.
#[derive(Debug, Clone)]
pub struct RunnerConfig {
    pub playwright: PlaywrightConfig,
    /// Hard ceiling on a single scenario, browser launch included.
    pub scenario_budget: Duration,
    /// Retry each failed scenario once. Defaults to the `CI` environment
    /// flag; the retry is uniform, never scenario-aware.
    pub retry_on_failure: bool,
    pub output_dir: PathBuf,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            playwright: PlaywrightConfig::default(),
            scenario_budget: Duration::from_secs(90),
            retry_on_failure: std::env::var_os("CI").is_some(),
            output_dir: PathBuf::from("test-results"),
        }
    }
}

/// Why a scenario failed.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ScenarioFailure {
    /// An awaited DOM condition never occurred within its bound.
    Timeout { element: String },
    /// Observed state did not match the expectation.
    Assertion { message: String },
    /// A background call left the allow-listed origins.
    NetworkViolation { urls: Vec<String> },
    /// Harness-side breakage: node/playwright missing, budget exceeded.
    Infrastructure { message: String },
}

impl std::fmt::Display for ScenarioFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ScenarioFailure::Timeout { element } => {
                write!(f, "timed out waiting for {element}")
            }
            ScenarioFailure::Assertion { message } => write!(f, "assertion failed: {message}"),
            ScenarioFailure::NetworkViolation { urls } => {
                write!(f, "disallowed background calls: {}", urls.join(", "))
            }
            ScenarioFailure::Infrastructure { message } => write!(f, "{message}"),
        }
    }
}

/// Terminal record of one scenario.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioOutcome {
    pub name: String,
    pub tool: String,
    pub mode: ScenarioMode,
    pub passed: bool,
    /// Furthest lifecycle phase the scenario reached.
    pub phase: Phase,
    pub attempts: u32,
    pub duration_ms: u64,
    pub failure: Option<ScenarioFailure>,
    /// Present when the scenario classified its background traffic.
    pub network: Option<NetworkReport>,
}

/// Result of a whole suite run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuiteReport {
    pub run_id: String,
    pub started_at: String,
    pub base_url: String,
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub duration_ms: u64,
    pub outcomes: Vec<ScenarioOutcome>,
}

impl SuiteReport {
    pub fn ok(&self) -> bool {
        self.failed == 0
    }
}

/// Drives scenarios one at a time against a live deployment or a locally
/// served site build.
pub struct ScenarioRunner {
    config: RunnerConfig,
    driver: PlaywrightDriver,
    observer: NetworkObserver,
    registry: &'static ToolRegistry,
    fixtures: FixtureSet,
}

impl ScenarioRunner {
    /// The allow-list is taken explicitly so runs stay independently
    /// configurable per environment.
    pub fn new(config: RunnerConfig, allowlist: AllowList) -> HarnessResult<Self> {
        let driver = PlaywrightDriver::new(config.playwright.clone())?;
        let observer =
            NetworkObserver::new(allowlist).with_settle_ms(config.playwright.settle_ms);
        let fixtures = FixtureSet::materialize().map_err(HarnessError::Config)?;
        Ok(Self {
            config,
            driver,
            observer,
            registry: ToolRegistry::builtin(),
            fixtures,
        })
    }

    pub fn config(&self) -> &RunnerConfig {
        &self.config
    }

    /// Run the suite sequentially. Unknown slugs fail the whole run before
    /// any browser starts.
    pub async fn run_suite(&self, scenarios: &[Scenario]) -> HarnessResult<SuiteReport> {
        Scenario::validate_all(scenarios, self.registry)?;

        let started = Instant::now();
        let started_at = chrono::Utc::now().to_rfc3339();
        let run_id = uuid::Uuid::new_v4().to_string();

        info!(total = scenarios.len(), "running scenario suite");

        let mut outcomes = Vec::with_capacity(scenarios.len());
        for scenario in scenarios {
            let outcome = self.run_with_retry(scenario).await;
            if outcome.passed {
                info!("✓ {} ({} ms)", outcome.name, outcome.duration_ms);
            } else {
                error!(
                    "✗ {} [{}] — {}",
                    outcome.name,
                    outcome.phase,
                    outcome
                        .failure
                        .as_ref()
                        .map(ToString::to_string)
                        .unwrap_or_else(|| "unknown failure".to_string()),
                );
            }
            outcomes.push(outcome);
        }

        let passed = outcomes.iter().filter(|o| o.passed).count();
        let failed = outcomes.len() - passed;
        let report = SuiteReport {
            run_id,
            started_at,
            base_url: self.config.playwright.base_url.clone(),
            total: outcomes.len(),
            passed,
            failed,
            duration_ms: started.elapsed().as_millis() as u64,
            outcomes,
        };

        info!(
            "suite finished: {} passed, {} failed ({} ms)",
            report.passed, report.failed, report.duration_ms
        );
        Ok(report)
    }

    async fn run_with_retry(&self, scenario: &Scenario) -> ScenarioOutcome {
        let mut outcome = self.run_once(scenario).await;
        if !outcome.passed && self.config.retry_on_failure {
            debug!(scenario = %scenario.name, "retrying failed scenario");
            let mut second = self.run_once(scenario).await;
            second.attempts = 2;
            second.duration_ms += outcome.duration_ms;
            outcome = second;
        }
        outcome
    }

    async fn run_once(&self, scenario: &Scenario) -> ScenarioOutcome {
        let started = Instant::now();

        let (phase, failure, network) = match self.drive(scenario).await {
            Ok((observation, network)) => {
                let phase = Phase::parse(&observation.phase);
                let failure = assess(scenario, &observation, network.as_ref());
                (phase, failure, network)
            }
            Err(err) => (
                Phase::NotStarted,
                Some(ScenarioFailure::Infrastructure {
                    message: err.to_string(),
                }),
                None,
            ),
        };

        ScenarioOutcome {
            name: scenario.name.clone(),
            tool: scenario.tool.clone(),
            mode: scenario.mode,
            passed: failure.is_none(),
            phase,
            attempts: 1,
            duration_ms: started.elapsed().as_millis() as u64,
            failure,
            network,
        }
    }

    async fn drive(
        &self,
        scenario: &Scenario,
    ) -> HarnessResult<(RunObservation, Option<NetworkReport>)> {
        let contract = self.registry.get(&scenario.tool)?;
        let fixture = scenario
            .fixture_for(self.registry)?
            .map(|kind| self.fixtures.path(kind));

        let script = self
            .driver
            .build_script(scenario, contract, fixture.as_deref());
        let observation = self
            .driver
            .execute(&script, self.config.scenario_budget)
            .await?;

        let network = if scenario.check_network || scenario.mode == ScenarioMode::NetworkOnly {
            Some(self.observer.inspect(&observation.requests))
        } else {
            None
        };

        Ok((observation, network))
    }
}

/// Map raw observations onto the failure taxonomy. Browser-reported
/// failures take precedence; mode-specific assertions follow; network
/// classification applies last so a scenario never reports success over
/// a violation.
fn assess(
    scenario: &Scenario,
    observation: &RunObservation,
    network: Option<&NetworkReport>,
) -> Option<ScenarioFailure> {
    if !observation.ok {
        if let Some(element) = &observation.waiting {
            return Some(ScenarioFailure::Timeout {
                element: format!("{} on /{}", element, scenario.tool),
            });
        }
        return Some(ScenarioFailure::Assertion {
            message: observation
                .error
                .clone()
                .unwrap_or_else(|| "browser script failed".to_string()),
        });
    }

    match scenario.mode {
        ScenarioMode::SizeLimit => {
            if observation.intake_found != Some(true) {
                return Some(ScenarioFailure::Assertion {
                    message: format!(
                        "/{} does not expose a validated-intake function",
                        scenario.tool
                    ),
                });
            }
            if observation.alert_fired != Some(true) {
                return Some(ScenarioFailure::Assertion {
                    message: "oversized upload was not blocked".to_string(),
                });
            }
            if observation.completion_visible == Some(true) {
                return Some(ScenarioFailure::Assertion {
                    message: "conversion proceeded despite the size block".to_string(),
                });
            }
        }
        ScenarioMode::Handoff => {
            if let Some(failure) = probe::evaluate(&scenario.tool, observation) {
                return Some(failure);
            }
        }
        _ => {}
    }

    if let Some(report) = network {
        if !report.ok() {
            return Some(ScenarioFailure::NetworkViolation {
                urls: report.violations.clone(),
            });
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn observation(ok: bool) -> RunObservation {
        RunObservation {
            ok,
            phase: if ok { "completed" } else { "triggered" }.into(),
            ..RunObservation::default()
        }
    }

    fn scenario(mode: ScenarioMode) -> Scenario {
        Scenario {
            name: "test".into(),
            tool: "compress-pdf".into(),
            mode,
            fixture: None,
            check_network: false,
            preserve_store: false,
        }
    }

    #[test]
    fn timeout_failure_names_tool_and_element() {
        let mut obs = observation(false);
        obs.waiting = Some("#dl".into());
        let failure = assess(&scenario(ScenarioMode::Conversion), &obs, None).unwrap();
        assert_eq!(
            failure.to_string(),
            "timed out waiting for #dl on /compress-pdf"
        );
    }

    #[test]
    fn script_error_without_pending_wait_is_an_assertion() {
        let mut obs = observation(false);
        obs.error = Some("click: element is not attached".into());
        let failure = assess(&scenario(ScenarioMode::Conversion), &obs, None).unwrap();
        assert!(matches!(failure, ScenarioFailure::Assertion { .. }));
    }

    #[test]
    fn network_violation_lists_every_url() {
        let report = NetworkReport {
            observed: 2,
            violations: vec!["https://convertapi.com/x".into()],
            ..NetworkReport::default()
        };
        let failure = assess(
            &scenario(ScenarioMode::NetworkOnly),
            &observation(true),
            Some(&report),
        )
        .unwrap();
        assert!(matches!(
            failure,
            ScenarioFailure::NetworkViolation { ref urls } if urls.len() == 1
        ));
    }

    #[test]
    fn clean_network_window_passes() {
        let report = NetworkReport::default();
        assert!(assess(
            &scenario(ScenarioMode::NetworkOnly),
            &observation(true),
            Some(&report),
        )
        .is_none());
    }

    #[test]
    fn size_limit_requires_the_block_signal() {
        let mut obs = observation(true);
        obs.intake_found = Some(true);
        obs.alert_fired = Some(false);
        let failure = assess(&scenario(ScenarioMode::SizeLimit), &obs, None).unwrap();
        assert_eq!(
            failure.to_string(),
            "assertion failed: oversized upload was not blocked"
        );

        obs.alert_fired = Some(true);
        obs.completion_visible = Some(false);
        assert!(assess(&scenario(ScenarioMode::SizeLimit), &obs, None).is_none());
    }

    #[test]
    fn size_limit_fails_when_conversion_proceeds_anyway() {
        let mut obs = observation(true);
        obs.intake_found = Some(true);
        obs.alert_fired = Some(true);
        obs.completion_visible = Some(true);
        let failure = assess(&scenario(ScenarioMode::SizeLimit), &obs, None).unwrap();
        assert!(failure.to_string().contains("proceeded"));
    }

    #[test]
    fn missing_intake_seam_is_an_assertion_failure() {
        let mut obs = observation(true);
        obs.intake_found = Some(false);
        let failure = assess(&scenario(ScenarioMode::SizeLimit), &obs, None).unwrap();
        assert!(failure.to_string().contains("validated-intake"));
    }

    #[test]
    fn suite_report_ok_tracks_failures() {
        let report = SuiteReport {
            run_id: "r".into(),
            started_at: "t".into(),
            base_url: "b".into(),
            total: 2,
            passed: 2,
            failed: 0,
            duration_ms: 10,
            outcomes: vec![],
        };
        assert!(report.ok());

        let report = SuiteReport {
            failed: 1,
            passed: 1,
            ..report
        };
        assert!(!report.ok());
    }
}
