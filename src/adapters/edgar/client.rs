//! HTTP client for the EDGAR filing registry.
//!
//! Works against the registry's JSON endpoints only: company submissions
//! (filing history + registrant profile) and the ticker/name index. Requests
//! are throttled through a token-bucket rate limiter and transient failures
//! retried with exponential backoff; exhausted retries and missing entities
//! surface as `Ok(None)`/empty so the core degrades instead of aborting.

use std::num::NonZeroU32;
use std::time::Duration;

use async_trait::async_trait;
use backoff::ExponentialBackoffBuilder;
use chrono::NaiveDate;
use governor::clock::DefaultClock;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use tracing::{debug, warn};

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{CompanyProfile, FilingRef, RegistryConfig};
use crate::domain::ports::FilingRegistry;

type DirectLimiter = RateLimiter<NotKeyed, InMemoryState, DefaultClock>;

pub struct EdgarClient {
    http: Client,
    base_url: String,
    limiter: DirectLimiter,
    retry_initial: Duration,
    retry_max: Duration,
    retry_budget: Duration,
}

impl EdgarClient {
    pub fn new(config: &RegistryConfig) -> DomainResult<Self> {
        let http = Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| DomainError::RegistryError(format!("failed to build client: {e}")))?;

        let rps = NonZeroU32::new(config.requests_per_second.max(1.0) as u32)
            .unwrap_or(NonZeroU32::MIN);
        let burst = NonZeroU32::new(config.burst_size.max(1)).unwrap_or(NonZeroU32::MIN);
        let limiter = RateLimiter::direct(Quota::per_second(rps).allow_burst(burst));

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            limiter,
            retry_initial: Duration::from_millis(config.retry.initial_backoff_ms),
            retry_max: Duration::from_millis(config.retry.max_backoff_ms),
            retry_budget: Duration::from_millis(
                config.retry.max_backoff_ms * u64::from(config.retry.max_retries),
            ),
        })
    }

    /// Throttled, retried GET. `Ok(None)` on 404; errors only after the retry
    /// budget is spent.
    async fn get_text(&self, url: &str) -> DomainResult<Option<String>> {
        let policy = ExponentialBackoffBuilder::new()
            .with_initial_interval(self.retry_initial)
            .with_max_interval(self.retry_max)
            .with_max_elapsed_time(Some(self.retry_budget))
            .build();

        let result = backoff::future::retry(policy, || async {
            self.limiter.until_ready().await;
            let response = self
                .http
                .get(url)
                .send()
                .await
                .map_err(|e| backoff::Error::transient(DomainError::RegistryError(e.to_string())))?;

            match response.status() {
                StatusCode::NOT_FOUND => Ok(None),
                status if status.is_server_error() || status == StatusCode::TOO_MANY_REQUESTS => {
                    Err(backoff::Error::transient(DomainError::RegistryError(
                        format!("registry returned {status} for {url}"),
                    )))
                }
                status if !status.is_success() => Err(backoff::Error::permanent(
                    DomainError::RegistryError(format!("registry returned {status} for {url}")),
                )),
                _ => {
                    let body = response.text().await.map_err(|e| {
                        backoff::Error::transient(DomainError::RegistryError(e.to_string()))
                    })?;
                    Ok(Some(body))
                }
            }
        })
        .await;

        match result {
            Ok(body) => Ok(body),
            Err(err) => {
                warn!(url, error = %err, "registry request failed after retries");
                Err(err)
            }
        }
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, url: &str) -> DomainResult<Option<T>> {
        let Some(body) = self.get_text(url).await? else {
            return Ok(None);
        };
        serde_json::from_str(&body)
            .map(Some)
            .map_err(|e| DomainError::RegistryError(format!("malformed registry JSON: {e}")))
    }

    async fn submissions(&self, cik: &str) -> DomainResult<Option<Submissions>> {
        let Some(padded) = pad_cik(cik) else {
            return Ok(None);
        };
        let url = format!("{}/submissions/CIK{padded}.json", self.base_url);
        self.get_json(&url).await
    }
}

#[async_trait]
impl FilingRegistry for EdgarClient {
    async fn search_filings(
        &self,
        cik: &str,
        filing_type: Option<&str>,
        count: usize,
    ) -> DomainResult<Vec<FilingRef>> {
        let Some(submissions) = self.submissions(cik).await? else {
            return Ok(Vec::new());
        };
        let cik_number: u64 = cik.trim().parse().unwrap_or(0);

        let recent = &submissions.filings.recent;
        let mut filings = Vec::new();
        for i in 0..recent.form.len() {
            let form = &recent.form[i];
            if let Some(wanted) = filing_type {
                if !form.eq_ignore_ascii_case(wanted) {
                    continue;
                }
            }
            let Some(filing_date) = recent
                .filing_date
                .get(i)
                .and_then(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").ok())
            else {
                continue;
            };
            let accession = recent
                .accession_number
                .get(i)
                .map(|a| a.replace('-', ""))
                .unwrap_or_default();
            let document = recent
                .primary_document
                .get(i)
                .cloned()
                .unwrap_or_default();
            filings.push(FilingRef {
                filing_type: form.clone(),
                filing_date,
                url: format!(
                    "{}/Archives/edgar/data/{cik_number}/{accession}/{document}",
                    self.base_url
                ),
                summary: recent
                    .primary_doc_description
                    .get(i)
                    .and_then(|d| d.clone()),
            });
            if filings.len() >= count {
                break;
            }
        }
        debug!(cik, count = filings.len(), "filings found");
        Ok(filings)
    }

    async fn fetch_document(&self, url: &str) -> DomainResult<Option<String>> {
        self.get_text(url).await
    }

    async fn resolve_document_url(&self, index_url: &str) -> DomainResult<Option<String>> {
        let Some(index) = self.get_json::<FilingIndex>(index_url).await? else {
            return Ok(None);
        };
        let base = index_url.trim_end_matches("index.json").trim_end_matches('/');
        Ok(index
            .directory
            .item
            .iter()
            .find(|item| item.name.ends_with(".htm") || item.name.ends_with(".html"))
            .map(|item| format!("{base}/{}", item.name)))
    }

    async fn company_profile(&self, cik: &str) -> DomainResult<Option<CompanyProfile>> {
        let Some(submissions) = self.submissions(cik).await? else {
            return Ok(None);
        };
        Ok(Some(CompanyProfile {
            cik: cik.trim().to_string(),
            name: submissions.name,
            sic_code: submissions.sic,
            sic_description: submissions.sic_description,
        }))
    }

    async fn search_cik_by_name(&self, name: &str) -> DomainResult<Option<CompanyProfile>> {
        let url = format!("{}/files/company_tickers.json", self.base_url);
        let Some(index) = self
            .get_json::<std::collections::HashMap<String, TickerEntry>>(&url)
            .await?
        else {
            return Ok(None);
        };

        let needle = name.trim().to_lowercase();
        let hit = index
            .into_values()
            .find(|entry| entry.title.to_lowercase().contains(&needle));
        let Some(entry) = hit else {
            return Ok(None);
        };

        // The ticker index has no SIC data; resolve the profile properly.
        self.company_profile(&entry.cik_str.to_string()).await
    }

    async fn earliest_filing_date(&self, cik: &str) -> DomainResult<Option<NaiveDate>> {
        let Some(submissions) = self.submissions(cik).await? else {
            return Ok(None);
        };
        Ok(submissions
            .filings
            .recent
            .filing_date
            .iter()
            .filter_map(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").ok())
            .min())
    }
}

/// Zero-pad an identifier to the registry's 10-digit form. Non-numeric
/// identifiers have no registry representation.
fn pad_cik(cik: &str) -> Option<String> {
    let trimmed = cik.trim();
    if trimmed.is_empty() || !trimmed.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    Some(format!("{trimmed:0>10}"))
}

#[derive(Debug, Deserialize)]
struct Submissions {
    name: String,
    #[serde(default)]
    sic: Option<String>,
    #[serde(default, rename = "sicDescription")]
    sic_description: Option<String>,
    filings: Filings,
}

#[derive(Debug, Deserialize)]
struct Filings {
    recent: RecentFilings,
}

#[derive(Debug, Default, Deserialize)]
struct RecentFilings {
    #[serde(default)]
    form: Vec<String>,
    #[serde(default, rename = "filingDate")]
    filing_date: Vec<String>,
    #[serde(default, rename = "accessionNumber")]
    accession_number: Vec<String>,
    #[serde(default, rename = "primaryDocument")]
    primary_document: Vec<String>,
    #[serde(default, rename = "primaryDocDescription")]
    primary_doc_description: Vec<Option<String>>,
}

#[derive(Debug, Deserialize)]
struct FilingIndex {
    directory: Directory,
}

#[derive(Debug, Deserialize)]
struct Directory {
    #[serde(default)]
    item: Vec<DirectoryItem>,
}

#[derive(Debug, Deserialize)]
struct DirectoryItem {
    name: String,
}

#[derive(Debug, Deserialize)]
struct TickerEntry {
    cik_str: u64,
    #[allow(dead_code)]
    ticker: String,
    title: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn test_config(base_url: &str) -> RegistryConfig {
        RegistryConfig {
            base_url: base_url.to_string(),
            requests_per_second: 100.0,
            burst_size: 100,
            ..Default::default()
        }
    }

    fn submissions_body() -> serde_json::Value {
        json!({
            "name": "CONSOLIDATED STEEL INDUSTRIES",
            "sic": "3312",
            "sicDescription": "Steel Works",
            "filings": {
                "recent": {
                    "form": ["8-K", "10-Q", "8-K"],
                    "filingDate": ["2026-01-05", "2025-11-14", "2014-09-01"],
                    "accessionNumber": [
                        "0001234567-26-000010",
                        "0001234567-25-000120",
                        "0001234567-14-000001"
                    ],
                    "primaryDocument": ["doc1.htm", "doc2.htm", "doc3.htm"],
                    "primaryDocDescription": ["Current report", null, "Current report"]
                }
            }
        })
    }

    #[test]
    fn test_pad_cik() {
        assert_eq!(pad_cik("1234567").as_deref(), Some("0001234567"));
        assert_eq!(pad_cik("0001234567").as_deref(), Some("0001234567"));
        assert_eq!(pad_cik("not-a-cik"), None);
        assert_eq!(pad_cik(""), None);
    }

    #[tokio::test]
    async fn test_search_filings_filters_and_builds_urls() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/submissions/CIK0001234567.json")
            .with_status(200)
            .with_body(submissions_body().to_string())
            .create_async()
            .await;

        let client = EdgarClient::new(&test_config(&server.url())).unwrap();
        let filings = client.search_filings("1234567", Some("8-K"), 10).await.unwrap();

        assert_eq!(filings.len(), 2);
        assert_eq!(filings[0].filing_type, "8-K");
        assert_eq!(
            filings[0].filing_date,
            NaiveDate::from_ymd_opt(2026, 1, 5).unwrap()
        );
        assert!(filings[0]
            .url
            .ends_with("/Archives/edgar/data/1234567/000123456726000010/doc1.htm"));
        assert_eq!(filings[0].summary.as_deref(), Some("Current report"));
    }

    #[tokio::test]
    async fn test_company_profile_and_earliest_date() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/submissions/CIK0001234567.json")
            .with_status(200)
            .with_body(submissions_body().to_string())
            .expect_at_least(1)
            .create_async()
            .await;

        let client = EdgarClient::new(&test_config(&server.url())).unwrap();

        let profile = client.company_profile("1234567").await.unwrap().unwrap();
        assert_eq!(profile.name, "CONSOLIDATED STEEL INDUSTRIES");
        assert_eq!(profile.sic_code.as_deref(), Some("3312"));
        assert!(!profile.is_blank_check());

        let earliest = client.earliest_filing_date("1234567").await.unwrap().unwrap();
        assert_eq!(earliest, NaiveDate::from_ymd_opt(2014, 9, 1).unwrap());
    }

    #[tokio::test]
    async fn test_missing_cik_is_none_not_error() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/submissions/CIK0009999999.json")
            .with_status(404)
            .create_async()
            .await;

        let client = EdgarClient::new(&test_config(&server.url())).unwrap();
        assert!(client.company_profile("9999999").await.unwrap().is_none());
        assert!(client
            .search_filings("9999999", None, 10)
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn test_search_cik_by_name() {
        let mut server = mockito::Server::new_async().await;
        let _tickers = server
            .mock("GET", "/files/company_tickers.json")
            .with_status(200)
            .with_body(
                json!({
                    "0": {"cik_str": 1234567u64, "ticker": "CSI", "title": "Consolidated Steel Industries"},
                    "1": {"cik_str": 7654321u64, "ticker": "OBA", "title": "Oxley Bridge Acquisition Corp"}
                })
                .to_string(),
            )
            .create_async()
            .await;
        let _submissions = server
            .mock("GET", "/submissions/CIK0007654321.json")
            .with_status(200)
            .with_body(
                json!({
                    "name": "OXLEY BRIDGE ACQUISITION CORP",
                    "sic": "6770",
                    "sicDescription": "Blank Checks",
                    "filings": {"recent": {"form": [], "filingDate": [], "accessionNumber": [], "primaryDocument": [], "primaryDocDescription": []}}
                })
                .to_string(),
            )
            .create_async()
            .await;

        let client = EdgarClient::new(&test_config(&server.url())).unwrap();
        let profile = client
            .search_cik_by_name("Oxley Bridge")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(profile.cik, "7654321");
        assert!(profile.is_blank_check());
    }

    #[tokio::test]
    async fn test_resolve_document_url() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/Archives/edgar/data/1234567/000123456726000010/index.json")
            .with_status(200)
            .with_body(
                json!({
                    "directory": {
                        "item": [
                            {"name": "exhibit99.txt"},
                            {"name": "doc1.htm"}
                        ]
                    }
                })
                .to_string(),
            )
            .create_async()
            .await;

        let client = EdgarClient::new(&test_config(&server.url())).unwrap();
        let index_url = format!(
            "{}/Archives/edgar/data/1234567/000123456726000010/index.json",
            server.url()
        );
        let resolved = client.resolve_document_url(&index_url).await.unwrap().unwrap();
        assert!(resolved.ends_with("/000123456726000010/doc1.htm"));
    }
}
