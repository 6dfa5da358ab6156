//! Precedent CLI entry point.

use clap::Parser;

use precedent::cli::{Cli, Commands};
use precedent::infrastructure::config::ConfigLoader;
use precedent::infrastructure::logging::Logger;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Logging config comes from the merged config; fall back to defaults if
    // loading fails so the failure itself is visible.
    let logging_config = ConfigLoader::load()
        .map(|c| c.logging)
        .unwrap_or_default();
    let _logger = Logger::init(&logging_config);

    let result = match cli.command {
        Commands::Init(args) => precedent::cli::commands::init::execute(args, cli.json).await,
        Commands::Update(args) => precedent::cli::commands::update::execute(args, cli.json).await,
        Commands::Investigate(args) => {
            precedent::cli::commands::investigate::execute(args, cli.json).await
        }
        Commands::Deadline(args) => {
            precedent::cli::commands::deadline::execute(args, cli.json).await
        }
        Commands::Lessons(args) => precedent::cli::commands::lessons::execute(args, cli.json).await,
        Commands::Strategy(args) => {
            precedent::cli::commands::strategy::execute(args, cli.json).await
        }
        Commands::Reports(args) => precedent::cli::commands::reports::execute(args, cli.json).await,
    };

    if let Err(err) = result {
        precedent::cli::handle_error(err, cli.json);
    }
}
