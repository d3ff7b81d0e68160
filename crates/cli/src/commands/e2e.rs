//! E2E suite command

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use clap::Args;

use turbocheck_common::{AllowList, ToolRegistry};
use turbocheck_harness::playwright::{PlaywrightConfig, WaitBounds};
use turbocheck_harness::report;
use turbocheck_harness::runner::{RunnerConfig, ScenarioOutcome, ScenarioRunner};
use turbocheck_harness::scenario::Scenario;
use turbocheck_harness::server::SiteServer;

use crate::output::{self, OutputFormat, TableDisplay};

#[derive(Args)]
pub struct E2eArgs {
    /// Origin to test; BASE_URL overrides the production default
    #[arg(long, env = "BASE_URL", default_value = "https://turboconvert.io")]
    pub base_url: String,

    /// Serve this built-site directory locally and test it instead
    #[arg(long)]
    pub site_dir: Option<PathBuf>,

    /// Directory of YAML scenario records (standard suite when omitted)
    #[arg(long)]
    pub scenarios: Option<PathBuf>,

    /// Only run scenarios for this tool slug
    #[arg(long)]
    pub tool: Option<String>,

    /// Emit GitHub Actions annotations instead of the plain list
    #[arg(long)]
    pub annotations: bool,

    /// Output directory for the JSON and HTML reports
    #[arg(short, long, default_value = "test-results")]
    pub output: PathBuf,

    /// Retry each failed scenario once (defaults to on under CI)
    #[arg(long)]
    pub retry: bool,

    /// Additional first-party domain to allow (repeatable)
    #[arg(long = "allow-domain")]
    pub allow_domains: Vec<String>,

    /// Acceptance indicator bound in milliseconds
    #[arg(long, default_value = "8000")]
    pub accept_timeout_ms: u64,

    /// Completion indicator bound in milliseconds
    #[arg(long, default_value = "60000")]
    pub convert_timeout_ms: u64,

    /// Network settle window in milliseconds
    #[arg(long, default_value = "2000")]
    pub settle_ms: u64,
}

impl TableDisplay for ScenarioOutcome {
    fn headers() -> Vec<&'static str> {
        vec!["", "scenario", "tool", "phase", "ms", "failure"]
    }

    fn row(&self) -> Vec<String> {
        vec![
            if self.passed { "✓" } else { "✗" }.to_string(),
            self.name.clone(),
            self.tool.clone(),
            self.phase.to_string(),
            self.duration_ms.to_string(),
            self.failure
                .as_ref()
                .map(ToString::to_string)
                .unwrap_or_default(),
        ]
    }
}

pub async fn run(args: E2eArgs, format: OutputFormat) -> Result<bool> {
    let (base_url, server) = match &args.site_dir {
        Some(dir) => {
            let server = SiteServer::serve(dir.clone()).await?;
            server.wait_healthy(Duration::from_secs(10)).await?;
            (server.base_url(), Some(server))
        }
        None => (args.base_url.clone(), None),
    };

    let mut allowlist = AllowList::builtin();
    for domain in &args.allow_domains {
        allowlist = allowlist.with_first_party(domain.clone());
    }

    let config = RunnerConfig {
        playwright: PlaywrightConfig {
            base_url,
            settle_ms: args.settle_ms,
            bounds: WaitBounds {
                accept_ms: args.accept_timeout_ms,
                convert_ms: args.convert_timeout_ms,
            },
            ..PlaywrightConfig::default()
        },
        retry_on_failure: args.retry || std::env::var_os("CI").is_some(),
        output_dir: args.output.clone(),
        ..RunnerConfig::default()
    };

    let registry = ToolRegistry::builtin();
    let mut scenarios = match &args.scenarios {
        Some(dir) => Scenario::load_all(dir)?,
        None => Scenario::standard_suite(registry),
    };
    if let Some(tool) = &args.tool {
        registry.get(tool)?;
        scenarios.retain(|s| &s.tool == tool);
    }

    let runner = ScenarioRunner::new(config, allowlist)?;
    let suite = runner.run_suite(&scenarios).await?;

    match format {
        OutputFormat::Json | OutputFormat::Yaml => output::print_value(&suite, format),
        OutputFormat::Table => {
            if args.annotations {
                print!("{}", report::render_github(&suite));
            } else {
                output::print_list(&suite.outcomes, format);
            }
        }
        OutputFormat::Plain => print!("{}", report::render_list(&suite)),
    }
    report::write_json(&suite, &args.output)?;
    report::write_html(&suite, &args.output)?;

    if let Some(server) = server {
        server.shutdown().await;
    }

    if suite.ok() {
        output::print_success(&format!("{} scenarios passed", suite.passed));
    } else {
        output::print_failure(&format!(
            "{} of {} scenarios failed",
            suite.failed, suite.total
        ));
    }
    Ok(suite.ok())
}
