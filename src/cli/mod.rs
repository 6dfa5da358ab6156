//! Command-line interface.

pub mod commands;
pub mod runtime;

use clap::{Parser, Subcommand};

/// Precedent: SPAC data-quality engine.
#[derive(Debug, Parser)]
#[command(name = "precedent", version, about)]
pub struct Cli {
    /// Emit machine-readable JSON instead of tables
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Create the project config and initialize the database
    Init(commands::init::InitArgs),
    /// Propose a field update and let the precedence engine decide
    Update(commands::update::UpdateArgs),
    /// Investigate a research result against a tracked record
    Investigate(commands::investigate::InvestigateArgs),
    /// Scan filings for deadline extension/completion/termination signals
    Deadline(commands::deadline::DeadlineArgs),
    /// Show aggregated lessons for a field
    Lessons(commands::lessons::LessonsArgs),
    /// Show the derived search strategy for a field
    Strategy(commands::strategy::StrategyArgs),
    /// List recent investigation reports
    Reports(commands::reports::ReportsArgs),
}

/// Print an error and exit non-zero.
pub fn handle_error(err: anyhow::Error, json: bool) {
    if json {
        let payload = serde_json::json!({ "error": err.to_string() });
        eprintln!("{payload}");
    } else {
        eprintln!("{} {err:#}", console::style("error:").red().bold());
    }
    std::process::exit(1);
}
