//! `precedent update`: propose a field value from a filing and let the
//! precedence engine decide whether it lands.

use anyhow::{Context, Result};
use chrono::{NaiveDate, Utc};
use clap::Args;
use console::style;

use crate::cli::runtime::Runtime;
use crate::domain::models::{FieldValue, ProposedUpdate, TrackedField};
use crate::domain::ports::RecordStore;
use crate::infrastructure::config::ConfigLoader;
use crate::services::numeric;
use crate::services::FilingPrecedenceManager;

#[derive(Debug, Args)]
pub struct UpdateArgs {
    /// Ticker of the record to update
    pub ticker: String,

    /// Field to update (e.g. trust_value, target, deadline_date)
    pub field: String,

    /// Proposed value, as extracted ("$275M", "Oxley Bridge", "2026-09-30")
    pub value: String,

    /// Filing type the value came from
    #[arg(long)]
    pub source: String,

    /// Date of the source filing (YYYY-MM-DD)
    #[arg(long)]
    pub date: Option<NaiveDate>,

    /// Extraction agent to credit in the learning store
    #[arg(long, default_value = "manual")]
    pub agent: String,
}

pub async fn execute(args: UpdateArgs, json: bool) -> Result<()> {
    let config = ConfigLoader::load()?;
    let manager = FilingPrecedenceManager::new(config.precedence.clone());
    let runtime = Runtime::bootstrap(config).await?;

    let field = TrackedField::from_str(&args.field)
        .with_context(|| format!("unknown field {}", args.field))?;
    let mut record = runtime
        .records
        .get_by_ticker(&args.ticker)
        .await?
        .with_context(|| format!("no record for ticker {}", args.ticker))?;

    // Normalize before anything touches precedence logic. A raw string that
    // needed normalization is itself a lesson worth keeping.
    let (value, normalized_from) = coerce_value(&args.value);
    if let Some(raw) = &normalized_from {
        if let Some(n) = value.as_number() {
            runtime
                .learning
                .record_format_prevention(&args.agent, field.as_str(), &args.ticker, raw, n, Utc::now())
                .await?;
        }
    }

    let proposed = ProposedUpdate::new(value, args.source.clone(), args.date);
    let decision = manager.decide(field.as_str(), &record.slot(field), &proposed);

    if decision.should_update {
        manager.apply(&mut record, field, &decision, &proposed);
        runtime.records.commit(&record).await?;
        runtime
            .learning
            .record_success(
                &args.agent,
                field.as_str(),
                &serde_json::to_value(&proposed.value)?,
                &args.ticker,
                &args.source,
                None,
                Utc::now(),
            )
            .await?;
    }

    if json {
        println!(
            "{}",
            serde_json::json!({
                "should_update": decision.should_update,
                "reason": decision.reason,
                "category": decision.category.as_str(),
                "current_source": decision.current_source,
            })
        );
    } else if decision.should_update {
        println!(
            "{} {} updated: {}",
            style("ok:").green().bold(),
            field,
            decision.reason
        );
    } else {
        println!(
            "{} {} unchanged: {}",
            style("--").dim(),
            field,
            decision.reason
        );
    }
    Ok(())
}

/// Coerce raw extracted text into a typed value: ISO date, then normalized
/// number, then plain text. Returns the raw string alongside when numeric
/// normalization actually rewrote it.
fn coerce_value(raw: &str) -> (FieldValue, Option<String>) {
    if let Ok(date) = NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d") {
        return (FieldValue::Date(date), None);
    }
    if let Some(number) = numeric::parse_str(raw) {
        let was_formatted = raw.trim().parse::<f64>().is_err();
        return (
            FieldValue::Number(number),
            was_formatted.then(|| raw.to_string()),
        );
    }
    (FieldValue::Text(raw.trim().to_string()), None)
}
