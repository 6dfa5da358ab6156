use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::errors::DomainResult;
use crate::domain::models::InvestigationReport;

/// Append-only store of investigation reports.
#[async_trait]
pub trait ReportRepository: Send + Sync {
    async fn insert(&self, report: &InvestigationReport) -> DomainResult<()>;

    async fn get(&self, id: Uuid) -> DomainResult<Option<InvestigationReport>>;

    /// Most recent reports, newest first.
    async fn recent(&self, limit: usize) -> DomainResult<Vec<InvestigationReport>>;
}
