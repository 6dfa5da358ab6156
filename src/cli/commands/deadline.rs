//! `precedent deadline`: scan filings for deadline signals.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::Args;
use console::style;

use crate::cli::runtime::Runtime;
use crate::domain::models::DeadlineResolution;
use crate::domain::models::TrackedField;
use crate::infrastructure::config::ConfigLoader;

#[derive(Debug, Args)]
pub struct DeadlineArgs {
    /// Ticker of the record to scan for
    pub ticker: String,

    /// Known combination deadline (YYYY-MM-DD); read from the record if
    /// omitted
    #[arg(long)]
    pub deadline: Option<NaiveDate>,
}

pub async fn execute(args: DeadlineArgs, json: bool) -> Result<()> {
    let config = ConfigLoader::load()?;
    let runtime = Runtime::bootstrap(config).await?;

    let (record, ctx) = runtime.context_for(&args.ticker).await?;
    let cik = ctx
        .cik
        .clone()
        .with_context(|| format!("record {} has no identifier", args.ticker))?;
    let deadline = args.deadline.or_else(|| {
        record
            .value(TrackedField::DeadlineDate)
            .and_then(|v| v.as_date())
    });

    let scan = runtime
        .agent
        .investigate_deadline_extension(&args.ticker, &cik, deadline)
        .await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&scan)?);
        return Ok(());
    }

    println!(
        "scanned {} filings between {} and {}",
        scan.filings_examined, scan.window.from, scan.window.to
    );
    match &scan.resolution {
        DeadlineResolution::ExtensionFound { filing, detail } => println!(
            "{} extension signal in {} dated {}: {detail}",
            style("found:").green().bold(),
            filing.filing_type,
            filing.filing_date
        ),
        DeadlineResolution::CompletionFound { filing, detail } => println!(
            "{} completion signal in {} dated {}: {detail}",
            style("found:").green().bold(),
            filing.filing_type,
            filing.filing_date
        ),
        DeadlineResolution::TerminationFound { filing, detail } => println!(
            "{} termination signal in {} dated {}: {detail}",
            style("found:").red().bold(),
            filing.filing_type,
            filing.filing_date
        ),
        DeadlineResolution::NoneFound => {
            println!("{} no deadline signal in window", style("--").dim());
        }
    }
    Ok(())
}
