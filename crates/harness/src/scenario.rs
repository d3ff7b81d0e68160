//! Scenario records and the per-scenario state machine.
//!
//! A scenario names a tool, a fixture, and a mode; the runner turns it into
//! a browser script. Scenarios can be written as YAML records or derived
//! wholesale from the tool registry (the standard suite).

use std::path::Path;

use serde::{Deserialize, Serialize};

use turbocheck_common::{ConversionFlow, FixtureKind, ToolRegistry};

use crate::error::{HarnessError, HarnessResult};

/// How a scenario drives its page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScenarioMode {
    /// Full flow: submit → (accept) → trigger → completion visible.
    Conversion,
    /// Stop once the acceptance indicator is visible.
    Acceptance,
    /// Only verify the upload surface is present and attached.
    PageReady,
    /// Call the page's validated-intake seam with an oversized synthetic
    /// descriptor and expect the blocking signal.
    SizeLimit,
    /// Load the page, settle, and classify every background request.
    NetworkOnly,
    /// Landing-page detector → persistent store → tool page preload.
    Handoff,
}

impl ScenarioMode {
    fn as_str(self) -> &'static str {
        match self {
            ScenarioMode::Conversion => "conversion",
            ScenarioMode::Acceptance => "acceptance",
            ScenarioMode::PageReady => "page-ready",
            ScenarioMode::SizeLimit => "size-limit",
            ScenarioMode::NetworkOnly => "network",
            ScenarioMode::Handoff => "handoff",
        }
    }
}

/// A single test case: one tool, one fixture, one mode.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scenario {
    pub name: String,

    /// Registry slug of the page under test (the hand-off target for
    /// [`ScenarioMode::Handoff`]).
    pub tool: String,

    pub mode: ScenarioMode,

    /// Fixture override; defaults to the registry's fixture for the tool.
    #[serde(default)]
    pub fixture: Option<FixtureKind>,

    /// Also classify captured background requests for this scenario.
    #[serde(default)]
    pub check_network: bool,

    /// Skip the store reset that otherwise isolates scenarios.
    #[serde(default)]
    pub preserve_store: bool,
}

impl Scenario {
    pub fn from_yaml(yaml: &str) -> HarnessResult<Self> {
        serde_yaml::from_str(yaml).map_err(HarnessError::from)
    }

    pub fn from_file(path: &Path) -> HarnessResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Load every `.yaml`/`.yml` scenario under a directory.
    pub fn load_all(dir: &Path) -> HarnessResult<Vec<Self>> {
        let mut scenarios = Vec::new();
        for entry in walkdir::WalkDir::new(dir)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| {
                e.path()
                    .extension()
                    .map(|ext| ext == "yaml" || ext == "yml")
                    .unwrap_or(false)
            })
        {
            scenarios.push(Self::from_file(entry.path())?);
        }
        Ok(scenarios)
    }

    /// Resolve the fixture this scenario submits, if its mode needs one.
    pub fn fixture_for(&self, registry: &ToolRegistry) -> HarnessResult<Option<FixtureKind>> {
        match self.mode {
            ScenarioMode::PageReady | ScenarioMode::NetworkOnly | ScenarioMode::SizeLimit => {
                Ok(None)
            }
            _ => {
                if let Some(kind) = self.fixture {
                    return Ok(Some(kind));
                }
                Ok(registry.get(&self.tool)?.fixture)
            }
        }
    }

    /// The standard suite, derived from the registry:
    ///
    /// - a conversion (or acceptance / page-ready) scenario per tool,
    /// - a network classification pass over every tool page,
    /// - one size-limit probe per limit class,
    /// - the two landing-page hand-off probes.
    pub fn standard_suite(registry: &ToolRegistry) -> Vec<Scenario> {
        let mut suite = Vec::new();

        for tool in registry.iter() {
            let (mode, label) = match tool.flow {
                ConversionFlow::Full => (ScenarioMode::Conversion, "converts"),
                ConversionFlow::AcceptOnly => (ScenarioMode::Acceptance, "accepts upload"),
                ConversionFlow::PageReady => (ScenarioMode::PageReady, "upload surface ready"),
            };
            suite.push(Scenario {
                name: format!("{}: {}", tool.slug, label),
                tool: tool.slug.to_string(),
                mode,
                fixture: None,
                check_network: false,
                preserve_store: false,
            });
        }

        for tool in registry.iter() {
            suite.push(Scenario {
                name: format!("{}: no disallowed background calls", tool.slug),
                tool: tool.slug.to_string(),
                mode: ScenarioMode::NetworkOnly,
                fixture: None,
                check_network: true,
                preserve_store: false,
            });
        }

        for slug in ["compress-pdf", "mp4-to-mp3"] {
            suite.push(Scenario {
                name: format!("{slug}: oversized upload is blocked"),
                tool: slug.to_string(),
                mode: ScenarioMode::SizeLimit,
                fixture: None,
                check_network: false,
                preserve_store: false,
            });
        }

        for (fixture, target) in [
            (FixtureKind::Pdf, "compress-pdf"),
            (FixtureKind::Jpg, "compress-image"),
        ] {
            suite.push(Scenario {
                name: format!("detector hand-off preloads {target}"),
                tool: target.to_string(),
                mode: ScenarioMode::Handoff,
                fixture: Some(fixture),
                check_network: false,
                preserve_store: false,
            });
        }

        suite
    }

    /// Fail fast if any scenario references a slug the registry does not
    /// know. Called before any browser work starts.
    pub fn validate_all(scenarios: &[Scenario], registry: &ToolRegistry) -> HarnessResult<()> {
        for scenario in scenarios {
            registry.get(&scenario.tool)?;
        }
        Ok(())
    }

    pub fn mode_label(&self) -> &'static str {
        self.mode.as_str()
    }
}

/// Progress of a scenario through its lifecycle. Phases are strictly
/// monotone; a scenario that fails keeps the furthest phase it reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Phase {
    NotStarted,
    Navigated,
    FileSubmitted,
    Accepted,
    Triggered,
    Completed,
}

impl Phase {
    pub fn as_str(self) -> &'static str {
        match self {
            Phase::NotStarted => "not-started",
            Phase::Navigated => "navigated",
            Phase::FileSubmitted => "file-submitted",
            Phase::Accepted => "accepted",
            Phase::Triggered => "triggered",
            Phase::Completed => "completed",
        }
    }

    pub fn parse(value: &str) -> Phase {
        match value {
            "navigated" => Phase::Navigated,
            "file-submitted" => Phase::FileSubmitted,
            "accepted" => Phase::Accepted,
            "triggered" => Phase::Triggered,
            "completed" => Phase::Completed,
            _ => Phase::NotStarted,
        }
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
