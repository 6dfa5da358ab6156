use async_trait::async_trait;
use chrono::NaiveDate;

use crate::domain::errors::DomainResult;
use crate::domain::models::{CompanyProfile, FilingRef};

/// Client for the regulatory filing registry.
///
/// All lookups are best-effort: a missing document, an unknown identifier, or
/// an exhausted retry budget surfaces as `Ok(None)` / an empty list, never as
/// control-flow exceptions. The core treats absence as "no evidence" and
/// keeps going.
#[async_trait]
pub trait FilingRegistry: Send + Sync {
    /// Search filings for an identifier, optionally narrowed to one filing
    /// type, newest first.
    async fn search_filings(
        &self,
        cik: &str,
        filing_type: Option<&str>,
        count: usize,
    ) -> DomainResult<Vec<FilingRef>>;

    /// Fetch a document body. `None` when the document is gone or retries
    /// are exhausted.
    async fn fetch_document(&self, url: &str) -> DomainResult<Option<String>>;

    /// Resolve an index page to its primary document URL.
    async fn resolve_document_url(&self, index_url: &str) -> DomainResult<Option<String>>;

    /// Profile of the registrant currently filing under this identifier.
    async fn company_profile(&self, cik: &str) -> DomainResult<Option<CompanyProfile>>;

    /// Find the registrant whose name best matches, if any.
    async fn search_cik_by_name(&self, name: &str) -> DomainResult<Option<CompanyProfile>>;

    /// Date of the earliest filing on record for this identifier.
    async fn earliest_filing_date(&self, cik: &str) -> DomainResult<Option<NaiveDate>>;
}
