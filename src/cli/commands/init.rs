//! `precedent init`: write the default config and initialize the database.

use anyhow::{Context, Result};
use clap::Args;

use crate::adapters::sqlite::initialize_database;
use crate::domain::models::Config;

#[derive(Debug, Args)]
pub struct InitArgs {
    /// Overwrite an existing config file
    #[arg(long)]
    pub force: bool,
}

pub async fn execute(args: InitArgs, json: bool) -> Result<()> {
    let config_dir = std::path::Path::new(".precedent");
    let config_path = config_dir.join("config.yaml");

    if config_path.exists() && !args.force {
        anyhow::bail!(
            "{} already exists (use --force to overwrite)",
            config_path.display()
        );
    }

    std::fs::create_dir_all(config_dir).context("failed to create .precedent directory")?;
    let config = Config::default();
    let yaml = serde_yaml::to_string(&config)?;
    std::fs::write(&config_path, yaml).context("failed to write config")?;

    initialize_database(&format!("sqlite:{}", config.database.path))
        .await
        .context("failed to initialize database")?;

    if json {
        println!(
            "{}",
            serde_json::json!({
                "config": config_path.display().to_string(),
                "database": config.database.path,
            })
        );
    } else {
        println!("Wrote {}", config_path.display());
        println!("Initialized database at {}", config.database.path);
    }
    Ok(())
}
