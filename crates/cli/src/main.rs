//! TurboCheck CLI - Main Entry Point
//!
//! User surface over the two verification tools: the browser-driven E2E
//! suite and the static pre-deployment site audit, plus the
//! structured-data injector the audit depends on.

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;
mod output;

use commands::{audit, e2e, schema};

/// TurboCheck: verification tooling for TurboConvert
#[derive(Parser)]
#[command(name = "turbocheck")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Output format
    #[arg(long, default_value = "table", global = true)]
    format: output::OutputFormat,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the browser-driven E2E suite
    E2e(e2e::E2eArgs),

    /// Audit a built site (directory or zip) before deployment
    Audit(audit::AuditArgs),

    /// Inspect or inject schema.org structured data
    #[command(subcommand)]
    Schema(schema::SchemaCommands),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)))
        .with_target(false)
        .init();

    let success = match cli.command {
        Commands::E2e(args) => e2e::run(args, cli.format).await?,
        Commands::Audit(args) => audit::run(args, cli.format)?,
        Commands::Schema(command) => schema::run(command)?,
    };

    if !success {
        std::process::exit(1);
    }
    Ok(())
}
