//! SQLite implementation of the LearningRepository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{CaseStatus, IssueType, LearningCase};
use crate::domain::ports::LearningRepository;

#[derive(Clone)]
pub struct SqliteLearningRepository {
    pool: SqlitePool,
}

impl SqliteLearningRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl LearningRepository for SqliteLearningRepository {
    async fn upsert(&self, case: &LearningCase) -> DomainResult<()> {
        let original_data = serde_json::to_string(&case.original_data)?;
        let final_fix = serde_json::to_string(&case.final_fix)?;

        sqlx::query(
            r#"INSERT INTO learning_cases
               (issue_id, issue_type, ticker, field, original_data, final_fix,
                learning_notes, status, created_at, completed_at)
               VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
               ON CONFLICT(issue_id) DO UPDATE SET
                   issue_type = excluded.issue_type,
                   ticker = excluded.ticker,
                   field = excluded.field,
                   original_data = excluded.original_data,
                   final_fix = excluded.final_fix,
                   learning_notes = excluded.learning_notes,
                   status = excluded.status,
                   completed_at = excluded.completed_at"#,
        )
        .bind(&case.issue_id)
        .bind(case.issue_type.as_str())
        .bind(&case.ticker)
        .bind(&case.field)
        .bind(&original_data)
        .bind(&final_fix)
        .bind(&case.learning_notes)
        .bind(case.status.as_str())
        .bind(case.created_at.to_rfc3339())
        .bind(case.completed_at.map(|t| t.to_rfc3339()))
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn cases_for_field(
        &self,
        field: &str,
        issue_types: &[IssueType],
        since: DateTime<Utc>,
        limit: usize,
    ) -> DomainResult<Vec<LearningCase>> {
        if issue_types.is_empty() {
            return Ok(Vec::new());
        }

        let placeholders = vec!["?"; issue_types.len()].join(", ");
        let sql = format!(
            r#"SELECT * FROM learning_cases
               WHERE field = ? AND issue_type IN ({placeholders}) AND created_at >= ?
               ORDER BY created_at DESC
               LIMIT ?"#
        );

        let mut query = sqlx::query_as::<_, LearningCaseRow>(&sql).bind(field);
        for issue_type in issue_types {
            query = query.bind(issue_type.as_str());
        }
        let rows: Vec<LearningCaseRow> = query
            .bind(since.to_rfc3339())
            .bind(limit as i64)
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    async fn successes_for_field(
        &self,
        field: &str,
        ticker: Option<&str>,
        since: DateTime<Utc>,
    ) -> DomainResult<Vec<LearningCase>> {
        let rows: Vec<LearningCaseRow> = if let Some(ticker) = ticker {
            sqlx::query_as(
                r#"SELECT * FROM learning_cases
                   WHERE issue_type = 'extraction_success'
                     AND field = ? AND ticker = ? AND created_at >= ?
                   ORDER BY created_at DESC"#,
            )
            .bind(field)
            .bind(ticker)
            .bind(since.to_rfc3339())
            .fetch_all(&self.pool)
            .await?
        } else {
            sqlx::query_as(
                r#"SELECT * FROM learning_cases
                   WHERE issue_type = 'extraction_success'
                     AND field = ? AND created_at >= ?
                   ORDER BY created_at DESC"#,
            )
            .bind(field)
            .bind(since.to_rfc3339())
            .fetch_all(&self.pool)
            .await?
        };

        rows.into_iter().map(TryInto::try_into).collect()
    }

    async fn cases_by_type(
        &self,
        issue_type: IssueType,
        ticker: Option<&str>,
        limit: usize,
    ) -> DomainResult<Vec<LearningCase>> {
        let rows: Vec<LearningCaseRow> = if let Some(ticker) = ticker {
            // Exact-ticker matches sort ahead of everything else.
            sqlx::query_as(
                r#"SELECT * FROM learning_cases
                   WHERE issue_type = ?
                   ORDER BY CASE WHEN ticker = ? THEN 0 ELSE 1 END, created_at DESC
                   LIMIT ?"#,
            )
            .bind(issue_type.as_str())
            .bind(ticker)
            .bind(limit as i64)
            .fetch_all(&self.pool)
            .await?
        } else {
            sqlx::query_as(
                r#"SELECT * FROM learning_cases
                   WHERE issue_type = ?
                   ORDER BY created_at DESC
                   LIMIT ?"#,
            )
            .bind(issue_type.as_str())
            .bind(limit as i64)
            .fetch_all(&self.pool)
            .await?
        };

        rows.into_iter().map(TryInto::try_into).collect()
    }
}

#[derive(sqlx::FromRow)]
struct LearningCaseRow {
    issue_id: String,
    issue_type: String,
    ticker: String,
    field: Option<String>,
    original_data: Option<String>,
    final_fix: Option<String>,
    learning_notes: String,
    status: String,
    created_at: String,
    completed_at: Option<String>,
}

impl TryFrom<LearningCaseRow> for LearningCase {
    type Error = DomainError;

    fn try_from(row: LearningCaseRow) -> Result<Self, Self::Error> {
        let issue_type = IssueType::from_str(&row.issue_type).ok_or_else(|| {
            DomainError::SerializationError(format!("unknown issue type: {}", row.issue_type))
        })?;
        let status = CaseStatus::from_str(&row.status).unwrap_or(CaseStatus::Open);
        let original_data = super::parse_json_or_default(row.original_data)?;
        let final_fix = super::parse_json_or_default(row.final_fix)?;
        let created_at = super::parse_datetime(&row.created_at)?;
        let completed_at = super::parse_optional_datetime(row.completed_at)?;

        Ok(LearningCase {
            issue_id: row.issue_id,
            issue_type,
            ticker: row.ticker,
            field: row.field,
            original_data,
            final_fix,
            learning_notes: row.learning_notes,
            status,
            created_at,
            completed_at,
        })
    }
}
