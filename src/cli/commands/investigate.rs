//! `precedent investigate`: run the full investigation pipeline for one
//! ticker against a supplied research result.

use anyhow::{Context, Result};
use clap::Args;
use console::style;

use crate::cli::runtime::Runtime;
use crate::domain::models::{ReportedIssue, ResearchFinding};
use crate::infrastructure::config::ConfigLoader;

#[derive(Debug, Args)]
pub struct InvestigateArgs {
    /// Ticker of the record under investigation
    pub ticker: String,

    /// Path to a JSON file with the research result
    #[arg(long)]
    pub research: std::path::PathBuf,

    /// Issue type that triggered the research
    #[arg(long, default_value = "data_quality")]
    pub issue_type: String,

    /// Field the issue concerns, if any
    #[arg(long)]
    pub field: Option<String>,
}

pub async fn execute(args: InvestigateArgs, json: bool) -> Result<()> {
    let config = ConfigLoader::load()?;
    let runtime = Runtime::bootstrap(config).await?;

    let research_raw = std::fs::read_to_string(&args.research)
        .with_context(|| format!("failed to read {}", args.research.display()))?;
    let research: ResearchFinding =
        serde_json::from_str(&research_raw).context("research file is not valid JSON")?;

    let issue = ReportedIssue {
        issue_type: args.issue_type,
        field: args.field,
        description: String::new(),
    };

    let (_record, ctx) = runtime.context_for(&args.ticker).await?;
    let report = runtime.agent.investigate(&issue, &research, &ctx).await?;

    match report {
        Some(report) if json => println!("{}", serde_json::to_string_pretty(&report)?),
        Some(report) => {
            println!(
                "{} investigation {} for {}",
                style("ok:").green().bold(),
                report.status.as_str(),
                report.ticker
            );
            println!("  anomaly: {}: {}", report.anomaly.kind, report.anomaly.description);
            if let Some(root_cause) = &report.diagnosis.root_cause {
                println!(
                    "  root cause: {} (confidence {})",
                    root_cause.label(),
                    report.diagnosis.confidence
                );
            }
            if let Some(fix) = &report.fix {
                for change in &fix.changes {
                    println!("  change: {change}");
                }
                if let Some(warning) = &fix.warning {
                    println!("  {} {warning}", style("warning:").yellow().bold());
                }
            }
        }
        None if json => println!("{}", serde_json::json!({ "outcome": "inconclusive" })),
        None => println!(
            "{} investigation inconclusive, nothing changed",
            style("--").dim()
        ),
    }
    Ok(())
}
