//! Playwright browser automation.
//!
//! Each scenario is compiled into a small Node script that drives a
//! Chromium page and prints a single machine-readable line:
//!
//! ```text
//! TC_RESULT {"ok":true,"phase":"completed","requests":[...],...}
//! ```
//!
//! The script records the furthest lifecycle phase it reached, the selector
//! it was waiting on when it died (for timeout diagnostics), every captured
//! `fetch`/`xhr` URL, and the probe observations. The Rust side extracts
//! the line and maps it into the scenario state machine.

use std::path::Path;
use std::process::{Command, Stdio};
use std::time::Duration;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tokio::process::Command as TokioCommand;
use tracing::debug;

use turbocheck_common::ToolContract;

use crate::error::{HarnessError, HarnessResult};
use crate::probe::{self, DetectorContract, STORE_DATABASE, STORE_KEY, STORE_OBJECT};
use crate::scenario::{Scenario, ScenarioMode};

/// Upload zone element shared by every tool page.
const ZONE_ID: &str = "zone";
/// Bound on the tool page picking up a handed-off file.
const PRELOAD_TIMEOUT_MS: u64 = 6_000;

static RESULT_LINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^TC_RESULT (\{.*\})\s*$").expect("static regex"));

/// Wait bounds for the conversion flow.
#[derive(Debug, Clone, Copy)]
pub struct WaitBounds {
    /// Acceptance indicator bound, ms.
    pub accept_ms: u64,
    /// Completion indicator bound, ms. Conversion may be a heavy WASM
    /// workload.
    pub convert_ms: u64,
}

impl Default for WaitBounds {
    fn default() -> Self {
        Self {
            accept_ms: 8_000,
            convert_ms: 60_000,
        }
    }
}

/// Configuration for the driver.
#[derive(Debug, Clone)]
pub struct PlaywrightConfig {
    pub base_url: String,
    pub headless: bool,
    pub viewport_width: u32,
    pub viewport_height: u32,
    pub bounds: WaitBounds,
    /// Settle window for network observation, ms.
    pub settle_ms: u64,
}

impl Default for PlaywrightConfig {
    fn default() -> Self {
        Self {
            base_url: "https://turboconvert.io".to_string(),
            headless: true,
            viewport_width: 1280,
            viewport_height: 720,
            bounds: WaitBounds::default(),
            settle_ms: crate::network::SETTLE_MS,
        }
    }
}

/// Raw observations printed by the browser script.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RunObservation {
    pub ok: bool,
    pub phase: String,
    pub error: Option<String>,
    /// Selector being awaited when the script died, if any.
    pub waiting: Option<String>,
    /// Captured background-call URLs (fetch/xhr only).
    pub requests: Vec<String>,
    pub alert_fired: Option<bool>,
    pub intake_found: Option<bool>,
    pub completion_visible: Option<bool>,
    pub store_present: Option<bool>,
    pub suggestion_count: Option<u32>,
    pub first_suggestion_href: Option<String>,
    pub preload_file_name: Option<String>,
}

pub struct PlaywrightDriver {
    config: PlaywrightConfig,
}

impl PlaywrightDriver {
    pub fn new(config: PlaywrightConfig) -> HarnessResult<Self> {
        Self::check_playwright_installed()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &PlaywrightConfig {
        &self.config
    }

    fn check_playwright_installed() -> HarnessResult<()> {
        let status = Command::new("npx")
            .args(["playwright", "--version"])
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status();
        match status {
            Ok(status) if status.success() => Ok(()),
            _ => Err(HarnessError::PlaywrightNotFound),
        }
    }

    /// Compile a scenario into its Node script.
    pub fn build_script(
        &self,
        scenario: &Scenario,
        contract: &ToolContract,
        fixture_path: Option<&Path>,
    ) -> String {
        let mut body = String::new();

        if !scenario.preserve_store {
            body.push_str(&self.store_reset_steps());
        }

        match scenario.mode {
            ScenarioMode::Conversion => {
                self.push_conversion_steps(&mut body, contract, fixture_path, true)
            }
            ScenarioMode::Acceptance => {
                self.push_conversion_steps(&mut body, contract, fixture_path, false)
            }
            ScenarioMode::PageReady => self.push_page_ready_steps(&mut body, contract),
            ScenarioMode::SizeLimit => self.push_size_limit_steps(&mut body, contract),
            ScenarioMode::NetworkOnly => self.push_network_steps(&mut body, contract),
            ScenarioMode::Handoff => {
                self.push_handoff_steps(&mut body, contract, fixture_path)
            }
        }

        format!(
            r#"const {{ chromium }} = require('playwright');

(async () => {{
  const browser = await chromium.launch({{ headless: {headless} }});
  const context = await browser.newContext({{
    viewport: {{ width: {width}, height: {height} }}
  }});
  const page = await context.newPage();
  const result = {{ ok: false, phase: 'not-started', requests: [] }};
  page.on('request', (req) => {{
    const type = req.resourceType();
    if (type === 'fetch' || type === 'xhr') result.requests.push(req.url());
  }});
  const base = {base};
  try {{
{body}
    result.ok = true;
  }} catch (err) {{
    result.error = String((err && err.message) || err);
  }} finally {{
    console.log('TC_RESULT ' + JSON.stringify(result));
    await browser.close();
  }}
}})();
"#,
            headless = self.config.headless,
            width = self.config.viewport_width,
            height = self.config.viewport_height,
            base = js_str(&self.config.base_url),
            body = body,
        )
    }

    // Reset the hand-off store so scenarios stay order-independent. Needs
    // an origin context, so it rides on a landing-page load; the request
    // buffer is cleared again before the scenario's own navigation.
    fn store_reset_steps(&self) -> String {
        format!(
            r#"    await page.goto(base + '/');
    await page.evaluate((db) => new Promise((resolve) => {{
      const req = indexedDB.deleteDatabase(db);
      req.onsuccess = req.onerror = req.onblocked = () => resolve(true);
    }}), {db});
    result.requests.length = 0;
"#,
            db = js_str(STORE_DATABASE),
        )
    }

    fn push_navigate(&self, body: &mut String, path: &str) {
        body.push_str(&format!(
            r#"    await page.goto(base + {path});
    result.phase = 'navigated';
"#,
            path = js_str(path),
        ));
    }

    fn push_wait_visible(&self, body: &mut String, selector: &str, timeout_ms: u64, phase: &str) {
        body.push_str(&format!(
            r#"    result.waiting = {selector};
    await page.waitForSelector({selector}, {{ state: 'visible', timeout: {timeout_ms} }});
    result.waiting = null;
    result.phase = {phase};
"#,
            selector = js_str(selector),
            timeout_ms = timeout_ms,
            phase = js_str(phase),
        ));
    }

    fn push_conversion_steps(
        &self,
        body: &mut String,
        contract: &ToolContract,
        fixture_path: Option<&Path>,
        full: bool,
    ) {
        self.push_navigate(body, &contract.page_path());

        let fixture = fixture_path
            .map(|p| p.to_string_lossy().into_owned())
            .unwrap_or_default();
        body.push_str(&format!(
            r#"    await page.setInputFiles({input}, {fixture});
    result.phase = 'file-submitted';
"#,
            input = js_str(&format!("#{}", contract.input_id)),
            fixture = js_str(&fixture),
        ));

        // Pages without an acceptance indicator reveal nothing before the
        // trigger; skip straight to the click.
        if let Some(accepted) = contract.accepted_id {
            self.push_wait_visible(
                body,
                &format!("#{accepted}"),
                self.config.bounds.accept_ms,
                "accepted",
            );
        }

        if !full {
            return;
        }

        body.push_str(&format!(
            r#"    await page.click({trigger}, {{ timeout: {timeout} }});
    result.phase = 'triggered';
"#,
            trigger = js_str(&format!("#{}", contract.trigger_id)),
            timeout = self.config.bounds.accept_ms,
        ));

        self.push_wait_visible(
            body,
            &contract.completion_selector(),
            self.config.bounds.convert_ms,
            "completed",
        );
    }

    fn push_page_ready_steps(&self, body: &mut String, contract: &ToolContract) {
        self.push_navigate(body, &contract.page_path());
        self.push_wait_visible(body, &format!("#{ZONE_ID}"), 5_000, "navigated");
        body.push_str(&format!(
            r#"    result.waiting = {trigger};
    await page.waitForSelector({trigger}, {{ state: 'attached', timeout: 5000 }});
    result.waiting = {input};
    await page.waitForSelector({input}, {{ state: 'attached', timeout: 5000 }});
    result.waiting = null;
    result.phase = 'completed';
"#,
            trigger = js_str(&format!("#{}", contract.trigger_id)),
            input = js_str(&format!("#{}", contract.input_id)),
        ));
    }

    fn push_size_limit_steps(&self, body: &mut String, contract: &ToolContract) {
        self.push_navigate(body, &contract.page_path());

        let (name, mime) = synthetic_descriptor(contract);
        let oversize = (contract.size_limit_mb + 1) * 1024 * 1024;
        body.push_str(&format!(
            r#"    const intake = await page.evaluate(({{ name, type, size }}) => new Promise((resolve) => {{
      let alerted = false;
      const originalAlert = window.alert;
      window.alert = () => {{ alerted = true; window.alert = originalAlert; }};
      const descriptor = {{ name, type, size }};
      const fn = (typeof loadFile === 'function') ? loadFile
        : (typeof load === 'function') ? load : null;
      if (!fn) {{ resolve({{ found: false, alerted: false }}); return; }}
      fn(descriptor);
      setTimeout(() => resolve({{ found: true, alerted }}), 200);
    }}), {{ name: {name}, type: {mime}, size: {oversize} }});
    result.intakeFound = intake.found;
    result.alertFired = intake.alerted;
    result.completionVisible = await page.locator({completion}).first().isVisible().catch(() => false);
    result.phase = 'completed';
"#,
            name = js_str(&name),
            mime = js_str(&mime),
            oversize = oversize,
            completion = js_str(&contract.completion_selector()),
        ));
    }

    fn push_network_steps(&self, body: &mut String, contract: &ToolContract) {
        self.push_navigate(body, &contract.page_path());
        body.push_str(&format!(
            r#"    await page.waitForTimeout({settle});
    result.phase = 'completed';
"#,
            settle = self.config.settle_ms,
        ));
    }

    fn push_handoff_steps(
        &self,
        body: &mut String,
        target: &ToolContract,
        fixture_path: Option<&Path>,
    ) {
        let detector = DetectorContract::default();
        let fixture = fixture_path
            .map(|p| p.to_string_lossy().into_owned())
            .unwrap_or_default();

        self.push_navigate(body, "/");
        body.push_str(&format!(
            r#"    await page.setInputFiles({input}, {fixture});
    result.phase = 'file-submitted';
"#,
            input = js_str(&format!("#{}", detector.input_id)),
            fixture = js_str(&fixture),
        ));
        self.push_wait_visible(
            body,
            &format!("#{}", detector.results_id),
            detector.results_timeout_ms,
            "accepted",
        );
        body.push_str(&format!(
            r#"    result.suggestionCount = await page.locator({suggestions}).count();
    if (result.suggestionCount > 0) {{
      result.firstSuggestionHref = await page.locator({suggestions}).first().getAttribute('href');
    }}
    await page.waitForTimeout({write_ms});
    result.storePresent = await page.evaluate(({{ db, store, key }}) => new Promise((resolve) => {{
      const req = indexedDB.open(db, 1);
      req.onsuccess = (e) => {{
        const handle = e.target.result;
        try {{
          const tx = handle.transaction(store, 'readonly');
          const get = tx.objectStore(store).get(key);
          get.onsuccess = () => resolve(!!get.result);
          get.onerror = () => resolve(false);
        }} catch {{ resolve(false); }}
      }};
      req.onerror = () => resolve(false);
    }}), {{ db: {db}, store: {store}, key: {key} }});
"#,
            suggestions = js_str(detector.suggestions_selector),
            write_ms = detector.store_write_ms,
            db = js_str(STORE_DATABASE),
            store = js_str(STORE_OBJECT),
            key = js_str(STORE_KEY),
        ));

        self.push_navigate(body, &target.page_path());
        if let Some(accepted) = target.accepted_id {
            self.push_wait_visible(
                body,
                &format!("#{accepted}"),
                PRELOAD_TIMEOUT_MS,
                "navigated",
            );
        }
        if let Some(fname) = probe::filename_element(target.slug) {
            body.push_str(&format!(
                r#"    result.preloadFileName = await page.locator({fname}).textContent().catch(() => null);
"#,
                fname = js_str(&format!("#{fname}")),
            ));
        }
        body.push_str("    result.phase = 'completed';\n");
    }

    /// Run a generated script under `node`, bounded by `budget`, and parse
    /// the `TC_RESULT` line.
    pub async fn execute(
        &self,
        script: &str,
        budget: Duration,
    ) -> HarnessResult<RunObservation> {
        let temp_dir = tempfile::tempdir()?;
        let script_path = temp_dir.path().join("scenario.js");
        std::fs::write(&script_path, script)?;

        debug!(script = %script_path.display(), "running browser script");

        let output = tokio::time::timeout(
            budget,
            TokioCommand::new("node").arg(&script_path).output(),
        )
        .await
        .map_err(|_| HarnessError::ScenarioBudget(budget.as_secs()))??;

        let stdout = String::from_utf8_lossy(&output.stdout);
        match RESULT_LINE
            .captures_iter(&stdout)
            .last()
            .and_then(|c| c.get(1))
        {
            Some(json) => Ok(serde_json::from_str(json.as_str())?),
            None => {
                let stderr = String::from_utf8_lossy(&output.stderr);
                if stderr.trim().is_empty() && stdout.trim().is_empty() {
                    Err(HarnessError::MissingResult)
                } else {
                    Err(HarnessError::Browser(format!(
                        "no result line\nstdout: {stdout}\nstderr: {stderr}"
                    )))
                }
            }
        }
    }
}

/// Descriptor handed to the intake seam for oversized-upload probes. The
/// payload stays synthetic; only the reported size is inflated.
fn synthetic_descriptor(contract: &ToolContract) -> (String, String) {
    let ext = contract.input_format.to_ascii_lowercase();
    let mime = match contract.input_format {
        "PDF" => "application/pdf",
        "MP4" => "video/mp4",
        "MP3" => "audio/mpeg",
        "WAV" => "audio/wav",
        "JPG" | "Image" => "image/jpeg",
        "PNG" => "image/png",
        "WebP" => "image/webp",
        "HEIC" => "image/heic",
        "DOCX" => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        "XLSX" => "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
        "PPTX" => "application/vnd.openxmlformats-officedocument.presentationml.presentation",
        _ => "application/octet-stream",
    };
    let ext = if ext == "image" { "jpg".to_string() } else { ext };
    (format!("big.{ext}"), mime.to_string())
}

fn js_str(value: &str) -> String {
    serde_json::to_string(value).unwrap_or_else(|_| String::from("\"\""))
}

#[cfg(test)]
mod tests {
    use super::*;
    use turbocheck_common::ToolRegistry;

    fn driver() -> PlaywrightDriver {
        // bypass the installation check in unit tests
        PlaywrightDriver {
            config: PlaywrightConfig {
                base_url: "http://127.0.0.1:4173".into(),
                ..PlaywrightConfig::default()
            },
        }
    }

    fn scenario(tool: &str, mode: ScenarioMode) -> Scenario {
        Scenario {
            name: format!("{tool} test"),
            tool: tool.to_string(),
            mode,
            fixture: None,
            check_network: false,
            preserve_store: false,
        }
    }

    #[test]
    fn conversion_script_follows_the_contract() {
        let registry = ToolRegistry::builtin();
        let contract = registry.get("compress-pdf").unwrap();
        let script = driver().build_script(
            &scenario("compress-pdf", ScenarioMode::Conversion),
            contract,
            Some(Path::new("/tmp/fixtures/test.pdf")),
        );

        assert!(script.contains("setInputFiles(\"#inp\""));
        assert!(script.contains("\"#qualityWrap\", { state: 'visible', timeout: 8000 }"));
        assert!(script.contains("page.click(\"#cbtn\""));
        assert!(script.contains("\"#dl\", { state: 'visible', timeout: 60000 }"));
        assert!(script.contains("TC_RESULT"));
    }

    #[test]
    fn tools_without_acceptance_indicator_skip_that_wait() {
        let registry = ToolRegistry::builtin();
        let contract = registry.get("split-pdf").unwrap();
        let script = driver().build_script(
            &scenario("split-pdf", ScenarioMode::Conversion),
            contract,
            Some(Path::new("/tmp/fixtures/test.pdf")),
        );

        assert!(!script.contains("state: 'visible', timeout: 8000"));
        assert!(script.contains("page.click(\"#cbtn\""));
    }

    #[test]
    fn alternate_completion_marker_joins_the_selector() {
        let registry = ToolRegistry::builtin();
        let contract = registry.get("pdf-to-jpg").unwrap();
        let script = driver().build_script(
            &scenario("pdf-to-jpg", ScenarioMode::Conversion),
            contract,
            Some(Path::new("/tmp/fixtures/test.pdf")),
        );
        assert!(script.contains("\"#dl, #dlAll\""));
    }

    #[test]
    fn size_limit_script_uses_the_intake_seam() {
        let registry = ToolRegistry::builtin();
        let contract = registry.get("mp4-to-mp3").unwrap();
        let script = driver().build_script(
            &scenario("mp4-to-mp3", ScenarioMode::SizeLimit),
            contract,
            None,
        );

        // 501 MB reported size, no Proxy/defineProperty tricks
        assert!(script.contains(&((501u64 * 1024 * 1024).to_string())));
        assert!(script.contains("\"big.mp4\""));
        assert!(script.contains("\"video/mp4\""));
        assert!(!script.contains("Proxy"));
        assert!(!script.contains("defineProperty"));
    }

    #[test]
    fn handoff_script_reads_the_store_and_target_page() {
        let registry = ToolRegistry::builtin();
        let contract = registry.get("compress-pdf").unwrap();
        let mut s = scenario("compress-pdf", ScenarioMode::Handoff);
        s.fixture = Some(turbocheck_common::FixtureKind::Pdf);
        let script = driver().build_script(&s, contract, Some(Path::new("/tmp/f/test.pdf")));

        assert!(script.contains("#detectorInput"));
        assert!(script.contains("#detSuggestions a"));
        assert!(script.contains("\"turboconvert\""));
        assert!(script.contains("\"pending_file\""));
        assert!(script.contains("#fname"));
    }

    #[test]
    fn store_reset_is_skipped_when_preserved() {
        let registry = ToolRegistry::builtin();
        let contract = registry.get("compress-pdf").unwrap();
        let mut s = scenario("compress-pdf", ScenarioMode::Conversion);
        s.preserve_store = true;
        let script = driver().build_script(&s, contract, Some(Path::new("/tmp/f/test.pdf")));
        assert!(!script.contains("deleteDatabase"));

        s.preserve_store = false;
        let script = driver().build_script(&s, contract, Some(Path::new("/tmp/f/test.pdf")));
        assert!(script.contains("deleteDatabase"));
    }

    #[test]
    fn result_line_regex_takes_the_last_match() {
        let stdout = "noise\nTC_RESULT {\"ok\":false,\"phase\":\"navigated\"}\nTC_RESULT {\"ok\":true,\"phase\":\"completed\"}\n";
        let json = RESULT_LINE
            .captures_iter(stdout)
            .last()
            .and_then(|c| c.get(1))
            .unwrap();
        let obs: RunObservation = serde_json::from_str(json.as_str()).unwrap();
        assert!(obs.ok);
        assert_eq!(obs.phase, "completed");
    }
}
