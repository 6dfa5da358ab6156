//! `precedent reports`: list recent investigation reports.

use anyhow::Result;
use clap::Args;
use comfy_table::{presets::UTF8_FULL, Table};

use crate::cli::runtime::Runtime;
use crate::domain::ports::ReportRepository;
use crate::infrastructure::config::ConfigLoader;

#[derive(Debug, Args)]
pub struct ReportsArgs {
    /// Maximum reports to list
    #[arg(long, default_value_t = 20)]
    pub limit: usize,
}

pub async fn execute(args: ReportsArgs, json: bool) -> Result<()> {
    let config = ConfigLoader::load()?;
    let runtime = Runtime::bootstrap(config).await?;

    let reports = runtime.reports.recent(args.limit).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&reports)?);
        return Ok(());
    }

    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(vec!["when", "ticker", "anomaly", "status", "confidence"]);
    for report in &reports {
        table.add_row(vec![
            report.timestamp.format("%Y-%m-%d %H:%M").to_string(),
            report.ticker.clone(),
            report.anomaly.kind.to_string(),
            report.status.as_str().to_string(),
            report.diagnosis.confidence.to_string(),
        ]);
    }
    println!("{table}");
    Ok(())
}
