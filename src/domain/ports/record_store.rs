use async_trait::async_trait;

use crate::domain::errors::DomainResult;
use crate::domain::models::SpacRecord;

/// Storage for tracked SPAC records.
///
/// The store owns the records; the core reads and writes field triplets only
/// through the precedence manager and the fix applier.
#[async_trait]
pub trait RecordStore: Send + Sync {
    async fn get_by_ticker(&self, ticker: &str) -> DomainResult<Option<SpacRecord>>;

    /// Persist the record as-is, inserting or replacing by ticker.
    async fn commit(&self, record: &SpacRecord) -> DomainResult<()>;

    async fn list_tickers(&self) -> DomainResult<Vec<String>>;
}
