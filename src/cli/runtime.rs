//! Wiring of adapters and services for CLI commands.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tracing::warn;

use crate::adapters::backends::AnthropicBackend;
use crate::adapters::edgar::EdgarClient;
use crate::adapters::notify::TracingNotifier;
use crate::adapters::sqlite::{
    initialize_database, SqliteLearningRepository, SqliteRecordStore, SqliteReportRepository,
};
use crate::domain::models::{Config, InvestigationContext, SpacRecord, TrackedField};
use crate::domain::ports::{RecordStore, ReportRepository, TextCompletion};
use crate::services::{InvestigationAgent, LearningStore};

/// Everything a command needs, wired once from config. One pool owned here;
/// repositories borrow it rather than managing their own connections.
pub struct Runtime {
    pub config: Config,
    pub records: Arc<SqliteRecordStore>,
    pub learning: Arc<LearningStore>,
    pub reports: Arc<SqliteReportRepository>,
    pub agent: InvestigationAgent,
}

impl Runtime {
    pub async fn bootstrap(config: Config) -> Result<Self> {
        let pool = initialize_database(&format!("sqlite:{}", config.database.path))
            .await
            .context("failed to initialize database")?;

        let records = Arc::new(SqliteRecordStore::new(pool.clone()));
        let learning = Arc::new(LearningStore::new(Arc::new(SqliteLearningRepository::new(
            pool.clone(),
        ))));
        let reports = Arc::new(SqliteReportRepository::new(pool));
        let registry = Arc::new(EdgarClient::new(&config.registry)?);

        let backend: Option<Arc<dyn TextCompletion>> = if config.backend.enabled {
            match AnthropicBackend::new(config.backend.clone()) {
                Ok(backend) => Some(Arc::new(backend)),
                Err(err) => {
                    warn!(error = %err, "backend unavailable, hypothesis generation will be rule-based");
                    None
                }
            }
        } else {
            None
        };

        let agent = InvestigationAgent::new(
            registry,
            records.clone(),
            learning.clone(),
            reports.clone() as Arc<dyn ReportRepository>,
            Arc::new(TracingNotifier),
            backend,
            config.investigation.clone(),
            Duration::from_millis(config.registry.politeness_delay_ms),
        );

        Ok(Self {
            config,
            records,
            learning,
            reports,
            agent,
        })
    }

    /// Load a record and derive the investigation context from it.
    pub async fn context_for(&self, ticker: &str) -> Result<(SpacRecord, InvestigationContext)> {
        let record = self
            .records
            .get_by_ticker(ticker)
            .await?
            .with_context(|| format!("no record for ticker {ticker}"))?;

        let ctx = InvestigationContext {
            ticker: record.ticker.clone(),
            cik: record.cik.clone(),
            company_name: record.company_name.clone(),
            ipo_date: record
                .value(TrackedField::IpoDate)
                .and_then(|v| v.as_date()),
        };
        Ok((record, ctx))
    }
}
