//! Structured-data commands

use std::path::PathBuf;

use anyhow::Result;
use clap::Subcommand;

use turbocheck_audit::schema;
use turbocheck_common::ToolRegistry;

use crate::output;

#[derive(Subcommand)]
pub enum SchemaCommands {
    /// Print the schema.org graph for a tool slug
    Show {
        /// Tool slug, e.g. compress-pdf
        slug: String,
    },

    /// Inject inline graphs into every bare tool page under a directory
    Inject {
        /// Site staging directory
        dir: PathBuf,
    },
}

pub fn run(command: SchemaCommands) -> Result<bool> {
    let registry = ToolRegistry::builtin();
    match command {
        SchemaCommands::Show { slug } => {
            let tool = registry.get(&slug)?;
            println!(
                "{}",
                serde_json::to_string_pretty(&schema::build_graph(tool))?
            );
        }
        SchemaCommands::Inject { dir } => {
            let summary = schema::inject_dir(&dir, registry)?;
            for page in &summary.injected {
                output::print_success(&format!("injected: {page}"));
            }
            for page in &summary.skipped {
                println!("  skipped (already inline): {page}");
            }
            if summary.injected.is_empty() && summary.skipped.is_empty() {
                println!("no known tool pages found under {}", dir.display());
            }
        }
    }
    Ok(true)
}
