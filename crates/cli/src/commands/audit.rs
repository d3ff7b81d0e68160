//! Site audit command

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use serde::Serialize;

use turbocheck_audit::checks;
use turbocheck_audit::{AuditReport, Finding, SiteSnapshot};
use turbocheck_common::ToolRegistry;

use crate::output::{self, OutputFormat, TableDisplay};

#[derive(Args)]
pub struct AuditArgs {
    /// Built site: a staging directory or the deploy zip artifact
    pub path: PathBuf,

    /// Treat warnings as blocking too
    #[arg(long)]
    pub strict: bool,
}

#[derive(Serialize)]
struct FindingRow {
    class: &'static str,
    #[serde(flatten)]
    finding: Finding,
}

impl TableDisplay for FindingRow {
    fn headers() -> Vec<&'static str> {
        vec!["class", "page", "finding"]
    }

    fn row(&self) -> Vec<String> {
        vec![
            self.class.to_string(),
            self.finding.page.clone(),
            self.finding.message.clone(),
        ]
    }
}

pub fn run(args: AuditArgs, format: OutputFormat) -> Result<bool> {
    let site = SiteSnapshot::load(&args.path)?;
    let report = checks::run_all(&site, ToolRegistry::builtin());

    render(&report, format);

    let blocked = report.blocked() || (args.strict && !report.warnings.is_empty());
    if blocked {
        output::print_failure(&format!(
            "{} error(s), {} warning(s) — deployment BLOCKED",
            report.errors.len(),
            report.warnings.len()
        ));
    } else {
        output::print_success(&format!(
            "all {} checks passed ({} warning(s))",
            report.passed,
            report.warnings.len()
        ));
    }
    Ok(!blocked)
}

fn render(report: &AuditReport, format: OutputFormat) {
    match format {
        OutputFormat::Json | OutputFormat::Yaml => output::print_value(report, format),
        OutputFormat::Plain => print!("{}", report.render()),
        OutputFormat::Table => {
            let rows: Vec<FindingRow> = report
                .errors
                .iter()
                .map(|f| FindingRow {
                    class: "error",
                    finding: f.clone(),
                })
                .chain(report.warnings.iter().map(|f| FindingRow {
                    class: "warning",
                    finding: f.clone(),
                }))
                .collect();
            if rows.is_empty() {
                println!("No findings.");
            } else {
                output::print_list(&rows, format);
            }
        }
    }
}
