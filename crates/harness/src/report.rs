//! Suite report rendering: human list, browsable HTML, CI annotations.
//!
//! Three surfaces mirror how the suite is consumed: a terminal list for
//! local runs, a self-contained HTML file to attach to CI artifacts, and
//! GitHub workflow commands for inline PR annotations. The raw
//! [`SuiteReport`] is always written alongside as JSON.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use tracing::info;

use crate::error::HarnessResult;
use crate::runner::{ScenarioOutcome, SuiteReport};

/// Report surfaces the suite can emit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportKind {
    List,
    Html,
    Github,
}

impl std::str::FromStr for ReportKind {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "list" => Ok(ReportKind::List),
            "html" => Ok(ReportKind::Html),
            "github" => Ok(ReportKind::Github),
            other => Err(format!("unknown reporter: {other}")),
        }
    }
}

/// Human-readable per-scenario list.
pub fn render_list(report: &SuiteReport) -> String {
    let mut out = String::new();
    for outcome in &report.outcomes {
        let _ = writeln!(out, "{}", list_line(outcome));
    }
    let _ = writeln!(
        out,
        "\n{} passed, {} failed of {} ({} ms) — {}",
        report.passed,
        report.failed,
        report.total,
        report.duration_ms,
        if report.ok() { "OK" } else { "FAILED" },
    );
    out
}

fn list_line(outcome: &ScenarioOutcome) -> String {
    let retried = if outcome.attempts > 1 { " (retried)" } else { "" };
    match &outcome.failure {
        None => format!("  ✓ {} [{} ms]{}", outcome.name, outcome.duration_ms, retried),
        Some(failure) => format!(
            "  ✗ {} [{}] — {}{}",
            outcome.name, outcome.phase, failure, retried
        ),
    }
}

/// GitHub Actions workflow commands, one annotation per failed scenario.
pub fn render_github(report: &SuiteReport) -> String {
    let mut out = String::new();
    for outcome in &report.outcomes {
        if let Some(failure) = &outcome.failure {
            let _ = writeln!(
                out,
                "::error title={}::{} (reached phase: {})",
                escape_workflow(&outcome.name),
                escape_workflow(&failure.to_string()),
                outcome.phase,
            );
        }
    }
    let _ = writeln!(
        out,
        "::notice title=turbocheck::{} passed, {} failed of {}",
        report.passed, report.failed, report.total,
    );
    out
}

// Workflow command values must escape %, CR and LF.
fn escape_workflow(value: &str) -> String {
    value
        .replace('%', "%25")
        .replace('\r', "%0D")
        .replace('\n', "%0A")
}

/// A self-contained browsable report.
pub fn render_html(report: &SuiteReport) -> String {
    let mut rows = String::new();
    for outcome in &report.outcomes {
        let (class, mark) = if outcome.passed {
            ("pass", "✓")
        } else {
            ("fail", "✗")
        };
        let detail = outcome
            .failure
            .as_ref()
            .map(|f| escape_html(&f.to_string()))
            .unwrap_or_default();
        let _ = writeln!(
            rows,
            "<tr class=\"{class}\"><td>{mark}</td><td>{}</td><td>{}</td><td>{}</td><td>{} ms</td><td>{}</td></tr>",
            escape_html(&outcome.name),
            escape_html(&outcome.tool),
            outcome.phase,
            outcome.duration_ms,
            detail,
        );
    }

    format!(
        r#"<!doctype html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>turbocheck — {run_id}</title>
<style>
  body {{ font: 14px/1.5 system-ui, sans-serif; margin: 2rem; color: #1a1a2e; }}
  table {{ border-collapse: collapse; width: 100%; }}
  th, td {{ text-align: left; padding: .35rem .6rem; border-bottom: 1px solid #e0e0e8; }}
  tr.pass td:first-child {{ color: #1a7f37; }}
  tr.fail td:first-child {{ color: #cf222e; }}
  .summary {{ margin: 1rem 0; }}
</style>
</head>
<body>
<h1>TurboCheck suite</h1>
<p class="summary">
  run <code>{run_id}</code> against <code>{base_url}</code>, started {started_at}<br>
  <strong>{passed} passed</strong>, <strong>{failed} failed</strong> of {total} ({duration_ms} ms)
</p>
<table>
<thead><tr><th></th><th>scenario</th><th>tool</th><th>phase</th><th>duration</th><th>failure</th></tr></thead>
<tbody>
{rows}</tbody>
</table>
</body>
</html>
"#,
        run_id = escape_html(&report.run_id),
        base_url = escape_html(&report.base_url),
        started_at = escape_html(&report.started_at),
        passed = report.passed,
        failed = report.failed,
        total = report.total,
        duration_ms = report.duration_ms,
        rows = rows,
    )
}

fn escape_html(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// Write the JSON results file into `dir` and return its path.
pub fn write_json(report: &SuiteReport, dir: &Path) -> HarnessResult<PathBuf> {
    std::fs::create_dir_all(dir)?;
    let path = dir.join("suite-report.json");
    std::fs::write(&path, serde_json::to_string_pretty(report)?)?;
    info!("results written to {}", path.display());
    Ok(path)
}

/// Write the HTML report into `dir` and return its path.
pub fn write_html(report: &SuiteReport, dir: &Path) -> HarnessResult<PathBuf> {
    std::fs::create_dir_all(dir)?;
    let path = dir.join("suite-report.html");
    std::fs::write(&path, render_html(report))?;
    info!("HTML report written to {}", path.display());
    Ok(path)
}
