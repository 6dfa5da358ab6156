use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::errors::DomainResult;
use crate::domain::models::{IssueType, LearningCase};

/// Persistence for learning cases.
///
/// Writes are upserts keyed on `issue_id`; re-logging the same logical event
/// must leave exactly one visible row. That property is what makes every
/// learning write retry-safe without transactions.
#[async_trait]
pub trait LearningRepository: Send + Sync {
    async fn upsert(&self, case: &LearningCase) -> DomainResult<()>;

    /// Cases for a field across the given issue types, newest first.
    async fn cases_for_field(
        &self,
        field: &str,
        issue_types: &[IssueType],
        since: DateTime<Utc>,
        limit: usize,
    ) -> DomainResult<Vec<LearningCase>>;

    /// Extraction successes for a field, optionally narrowed to a ticker,
    /// newest first.
    async fn successes_for_field(
        &self,
        field: &str,
        ticker: Option<&str>,
        since: DateTime<Utc>,
    ) -> DomainResult<Vec<LearningCase>>;

    /// Cases of one issue type, exact-ticker matches first, then newest
    /// first.
    async fn cases_by_type(
        &self,
        issue_type: IssueType,
        ticker: Option<&str>,
        limit: usize,
    ) -> DomainResult<Vec<LearningCase>>;
}
