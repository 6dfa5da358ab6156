//! `precedent strategy`: show the derived search strategy for a field.

use anyhow::Result;
use clap::Args;
use comfy_table::{presets::UTF8_FULL, Table};

use crate::cli::runtime::Runtime;
use crate::infrastructure::config::ConfigLoader;

#[derive(Debug, Args)]
pub struct StrategyArgs {
    /// Field to derive a strategy for (e.g. trust_value)
    pub field: String,

    /// Prioritize history for this ticker
    #[arg(long)]
    pub ticker: Option<String>,
}

pub async fn execute(args: StrategyArgs, json: bool) -> Result<()> {
    let config = ConfigLoader::load()?;
    let runtime = Runtime::bootstrap(config).await?;

    let strategy = runtime
        .learning
        .search_strategy_for(&args.field, args.ticker.as_deref())
        .await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&strategy)?);
        return Ok(());
    }

    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(vec!["", ""]);
    table.add_row(vec![
        "primary source".to_string(),
        strategy.primary_source.clone(),
    ]);
    table.add_row(vec![
        "fallbacks".to_string(),
        strategy.fallback_sources.join(", "),
    ]);
    table.add_row(vec![
        "section hints".to_string(),
        strategy.section_hints.join(", "),
    ]);
    table.add_row(vec![
        "lookback days".to_string(),
        strategy.lookback_days.to_string(),
    ]);
    table.add_row(vec![
        "confidence".to_string(),
        format!("{:.0}%", strategy.confidence * 100.0),
    ]);
    table.add_row(vec![
        "past successes".to_string(),
        strategy.past_successes.to_string(),
    ]);
    println!("{table}");
    Ok(())
}
