//! `precedent lessons`: show aggregated lessons for a field.

use anyhow::Result;
use clap::Args;
use comfy_table::{presets::UTF8_FULL, Table};

use crate::cli::runtime::Runtime;
use crate::infrastructure::config::ConfigLoader;

#[derive(Debug, Args)]
pub struct LessonsArgs {
    /// Field to aggregate lessons for (e.g. trust_value)
    pub field: String,
}

pub async fn execute(args: LessonsArgs, json: bool) -> Result<()> {
    let config = ConfigLoader::load()?;
    let runtime = Runtime::bootstrap(config).await?;

    let lessons = runtime.learning.lessons_for(&args.field).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&lessons)?);
        return Ok(());
    }

    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(vec!["bucket", "lesson"]);
    for note in &lessons.format_warnings {
        table.add_row(vec!["format warning", note.as_str()]);
    }
    for note in &lessons.filing_hints {
        table.add_row(vec!["filing hint", note.as_str()]);
    }
    for note in &lessons.common_mistakes {
        table.add_row(vec!["common mistake", note.as_str()]);
    }
    for note in &lessons.success_patterns {
        table.add_row(vec!["success pattern", note.as_str()]);
    }
    println!("{table}");
    println!(
        "{} learnings from agents: {}",
        lessons.total_learnings,
        if lessons.contributing_agents.is_empty() {
            "-".to_string()
        } else {
            lessons.contributing_agents.join(", ")
        }
    );
    Ok(())
}
