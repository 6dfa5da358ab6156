//! SQLite implementation of the ReportRepository.
//!
//! Reports are stored as their full JSON payload; the indexed columns exist
//! for listing and lookup only. Insert-only by construction.

use async_trait::async_trait;
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::InvestigationReport;
use crate::domain::ports::ReportRepository;

#[derive(Clone)]
pub struct SqliteReportRepository {
    pool: SqlitePool,
}

impl SqliteReportRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ReportRepository for SqliteReportRepository {
    async fn insert(&self, report: &InvestigationReport) -> DomainResult<()> {
        let payload = serde_json::to_string(report)?;

        sqlx::query(
            r#"INSERT INTO investigation_reports (id, ticker, status, payload, created_at)
               VALUES (?, ?, ?, ?, ?)"#,
        )
        .bind(report.id.to_string())
        .bind(&report.ticker)
        .bind(report.status.as_str())
        .bind(&payload)
        .bind(report.timestamp.to_rfc3339())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn get(&self, id: Uuid) -> DomainResult<Option<InvestigationReport>> {
        let row: Option<(String,)> =
            sqlx::query_as("SELECT payload FROM investigation_reports WHERE id = ?")
                .bind(id.to_string())
                .fetch_optional(&self.pool)
                .await?;

        row.map(|(payload,)| {
            serde_json::from_str(&payload)
                .map_err(|e| DomainError::SerializationError(e.to_string()))
        })
        .transpose()
    }

    async fn recent(&self, limit: usize) -> DomainResult<Vec<InvestigationReport>> {
        let rows: Vec<(String,)> = sqlx::query_as(
            "SELECT payload FROM investigation_reports ORDER BY created_at DESC LIMIT ?",
        )
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(|(payload,)| {
                serde_json::from_str(&payload)
                    .map_err(|e| DomainError::SerializationError(e.to_string()))
            })
            .collect()
    }
}
