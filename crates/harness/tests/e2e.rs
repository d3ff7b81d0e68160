//! E2E suite entry point
//!
//! Runs the TurboConvert verification suite against a deployed origin or a
//! locally served site build. Run with:
//! `cargo test --package turbocheck-harness --test e2e -- --help`

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use turbocheck_common::{AllowList, ToolRegistry};
use turbocheck_harness::playwright::PlaywrightConfig;
use turbocheck_harness::report::{self, ReportKind};
use turbocheck_harness::runner::RunnerConfig;
use turbocheck_harness::scenario::Scenario;
use turbocheck_harness::server::SiteServer;
use turbocheck_harness::{HarnessResult, ScenarioRunner};

#[derive(Parser, Debug)]
#[command(name = "turbocheck-e2e")]
#[command(about = "Browser-driven verification suite for TurboConvert")]
struct Args {
    /// Origin to test; BASE_URL overrides the production default
    #[arg(long, env = "BASE_URL", default_value = "https://turboconvert.io")]
    base_url: String,

    /// Serve this built-site directory locally and test it instead
    #[arg(long)]
    site_dir: Option<PathBuf>,

    /// Directory of YAML scenario records; the standard suite is derived
    /// from the registry when omitted
    #[arg(long)]
    scenarios: Option<PathBuf>,

    /// Only run scenarios for this tool slug
    #[arg(long)]
    tool: Option<String>,

    /// Console reporter (list, github); html and json are always written
    #[arg(long, default_value = "list")]
    reporter: ReporterArg,

    /// Output directory for reports
    #[arg(short, long, default_value = "test-results")]
    output: PathBuf,

    /// Retry each failed scenario once (defaults to on under CI)
    #[arg(long)]
    retry: bool,

    /// Run the browser headless
    #[arg(long, default_value = "true")]
    headless: bool,

    /// Acceptance indicator bound in milliseconds
    #[arg(long, default_value = "8000")]
    accept_timeout_ms: u64,

    /// Completion indicator bound in milliseconds
    #[arg(long, default_value = "60000")]
    convert_timeout_ms: u64,

    /// Network settle window in milliseconds
    #[arg(long, default_value = "2000")]
    settle_ms: u64,

    /// Hard per-scenario budget in seconds
    #[arg(long, default_value = "90")]
    scenario_budget_s: u64,
}

#[derive(Debug, Clone, Copy)]
enum ReporterArg {
    List,
    Github,
}

impl std::str::FromStr for ReporterArg {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.parse::<ReportKind>()? {
            ReportKind::List => Ok(ReporterArg::List),
            ReportKind::Github => Ok(ReporterArg::Github),
            ReportKind::Html => Err("html is always written; pick list or github".to_string()),
        }
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    let rt = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("Error: failed to create runtime: {e}");
            std::process::exit(2);
        }
    };

    match rt.block_on(async_main(args)) {
        Ok(true) => std::process::exit(0),
        Ok(false) => std::process::exit(1),
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(2);
        }
    }
}

async fn async_main(args: Args) -> HarnessResult<bool> {
    // A local site build takes precedence over the remote origin.
    let (base_url, server) = match &args.site_dir {
        Some(dir) => {
            let server = SiteServer::serve(dir.clone()).await?;
            server.wait_healthy(Duration::from_secs(10)).await?;
            (server.base_url(), Some(server))
        }
        None => (args.base_url.clone(), None),
    };

    let config = RunnerConfig {
        playwright: PlaywrightConfig {
            base_url,
            headless: args.headless,
            settle_ms: args.settle_ms,
            bounds: turbocheck_harness::playwright::WaitBounds {
                accept_ms: args.accept_timeout_ms,
                convert_ms: args.convert_timeout_ms,
            },
            ..PlaywrightConfig::default()
        },
        scenario_budget: Duration::from_secs(args.scenario_budget_s),
        retry_on_failure: args.retry || std::env::var_os("CI").is_some(),
        output_dir: args.output.clone(),
    };

    let registry = ToolRegistry::builtin();
    let mut scenarios = match &args.scenarios {
        Some(dir) => Scenario::load_all(dir)?,
        None => Scenario::standard_suite(registry),
    };
    if let Some(tool) = &args.tool {
        // fail fast on a slug the registry does not know
        registry.get(tool)?;
        scenarios.retain(|s| &s.tool == tool);
    }

    let runner = ScenarioRunner::new(config, AllowList::builtin())?;
    let suite = runner.run_suite(&scenarios).await?;

    match args.reporter {
        ReporterArg::List => print!("{}", report::render_list(&suite)),
        ReporterArg::Github => print!("{}", report::render_github(&suite)),
    }
    report::write_json(&suite, &args.output)?;
    report::write_html(&suite, &args.output)?;

    if let Some(server) = server {
        server.shutdown().await;
    }

    Ok(suite.ok())
}
