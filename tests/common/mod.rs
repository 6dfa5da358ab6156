//! Shared test fixtures.

use async_trait::async_trait;
use chrono::NaiveDate;

use precedent::domain::errors::DomainResult;
use precedent::domain::models::{CompanyProfile, FilingRef};
use precedent::domain::ports::FilingRegistry;

/// Configurable in-process registry stub.
#[derive(Default)]
pub struct StubRegistry {
    pub profile: Option<CompanyProfile>,
    pub by_name: Option<CompanyProfile>,
    pub earliest: Option<NaiveDate>,
    pub filings: Vec<FilingRef>,
    pub documents: Vec<(String, String)>,
}

#[async_trait]
impl FilingRegistry for StubRegistry {
    async fn search_filings(
        &self,
        _cik: &str,
        filing_type: Option<&str>,
        count: usize,
    ) -> DomainResult<Vec<FilingRef>> {
        Ok(self
            .filings
            .iter()
            .filter(|f| filing_type.is_none_or(|t| f.filing_type.eq_ignore_ascii_case(t)))
            .take(count)
            .cloned()
            .collect())
    }

    async fn fetch_document(&self, url: &str) -> DomainResult<Option<String>> {
        Ok(self
            .documents
            .iter()
            .find(|(u, _)| u == url)
            .map(|(_, body)| body.clone()))
    }

    async fn resolve_document_url(&self, _index_url: &str) -> DomainResult<Option<String>> {
        Ok(None)
    }

    async fn company_profile(&self, _cik: &str) -> DomainResult<Option<CompanyProfile>> {
        Ok(self.profile.clone())
    }

    async fn search_cik_by_name(&self, _name: &str) -> DomainResult<Option<CompanyProfile>> {
        Ok(self.by_name.clone())
    }

    async fn earliest_filing_date(&self, _cik: &str) -> DomainResult<Option<NaiveDate>> {
        Ok(self.earliest)
    }
}
