//! SQLite implementation of the RecordStore.

use std::collections::BTreeMap;

use async_trait::async_trait;
use sqlx::SqlitePool;

use crate::domain::errors::DomainResult;
use crate::domain::models::{SpacRecord, SpacStatus};
use crate::domain::ports::RecordStore;

#[derive(Clone)]
pub struct SqliteRecordStore {
    pool: SqlitePool,
}

impl SqliteRecordStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RecordStore for SqliteRecordStore {
    async fn get_by_ticker(&self, ticker: &str) -> DomainResult<Option<SpacRecord>> {
        let row: Option<SpacRecordRow> =
            sqlx::query_as("SELECT * FROM spac_records WHERE ticker = ?")
                .bind(ticker)
                .fetch_optional(&self.pool)
                .await?;

        row.map(TryInto::try_into).transpose()
    }

    async fn commit(&self, record: &SpacRecord) -> DomainResult<()> {
        let slots = serde_json::to_string(&record.slots)?;

        sqlx::query(
            r#"INSERT INTO spac_records
               (ticker, cik, company_name, status, slots, created_at, updated_at)
               VALUES (?, ?, ?, ?, ?, ?, ?)
               ON CONFLICT(ticker) DO UPDATE SET
                   cik = excluded.cik,
                   company_name = excluded.company_name,
                   status = excluded.status,
                   slots = excluded.slots,
                   updated_at = excluded.updated_at"#,
        )
        .bind(&record.ticker)
        .bind(&record.cik)
        .bind(&record.company_name)
        .bind(record.status.as_str())
        .bind(&slots)
        .bind(record.created_at.to_rfc3339())
        .bind(record.updated_at.to_rfc3339())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn list_tickers(&self) -> DomainResult<Vec<String>> {
        let rows: Vec<(String,)> =
            sqlx::query_as("SELECT ticker FROM spac_records ORDER BY ticker")
                .fetch_all(&self.pool)
                .await?;
        Ok(rows.into_iter().map(|(t,)| t).collect())
    }
}

#[derive(sqlx::FromRow)]
struct SpacRecordRow {
    ticker: String,
    cik: Option<String>,
    company_name: Option<String>,
    status: String,
    slots: Option<String>,
    created_at: String,
    updated_at: String,
}

impl TryFrom<SpacRecordRow> for SpacRecord {
    type Error = crate::domain::errors::DomainError;

    fn try_from(row: SpacRecordRow) -> Result<Self, Self::Error> {
        let status = SpacStatus::from_str(&row.status).unwrap_or_default();
        let slots: BTreeMap<_, _> = super::parse_json_or_default(row.slots)?;
        let created_at = super::parse_datetime(&row.created_at)?;
        let updated_at = super::parse_datetime(&row.updated_at)?;

        Ok(SpacRecord {
            ticker: row.ticker,
            cik: row.cik,
            company_name: row.company_name,
            status,
            slots,
            created_at,
            updated_at,
        })
    }
}
