//! The learning store: records extraction and investigation outcomes and
//! mines them into lessons and search strategies for future runs.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use serde_json::json;
use tracing::debug;

use crate::domain::errors::DomainResult;
use crate::domain::models::{
    CaseStatus, FieldCategory, IssueType, LearningCase, LessonBundle, SearchStrategy,
};
use crate::domain::ports::LearningRepository;
use crate::services::precedence::FilingPrecedenceManager;

/// Recency window for lesson aggregation.
const LESSON_WINDOW_DAYS: i64 = 90;
/// Recency window for search-strategy derivation.
const STRATEGY_WINDOW_DAYS: i64 = 180;
/// Cases considered per lesson bundle.
const LESSON_CASE_LIMIT: usize = 10;

/// Append-only history of past outcomes, queryable by field and ticker.
///
/// Every write goes through a deterministic-id upsert, so re-logging the same
/// logical event under retry leaves exactly one visible row.
pub struct LearningStore {
    repo: Arc<dyn LearningRepository>,
}

impl LearningStore {
    pub fn new(repo: Arc<dyn LearningRepository>) -> Self {
        Self { repo }
    }

    /// Record a successful extraction.
    ///
    /// The notes deliberately carry the "found in" phrasing the lesson
    /// aggregation routes on.
    pub async fn record_success(
        &self,
        agent_id: &str,
        field: &str,
        value: &serde_json::Value,
        ticker: &str,
        filing_type: &str,
        section: Option<&str>,
        observed_at: DateTime<Utc>,
    ) -> DomainResult<()> {
        let section_note = section.map(|s| format!(" ({s} section)")).unwrap_or_default();
        let case = LearningCase {
            issue_id: LearningCase::deterministic_id(
                IssueType::ExtractionSuccess,
                ticker,
                Some(field),
                Some(filing_type),
                observed_at,
            ),
            issue_type: IssueType::ExtractionSuccess,
            ticker: ticker.to_string(),
            field: Some(field.to_string()),
            original_data: json!({
                "agent_id": agent_id,
                "filing_type": filing_type,
                "section": section,
            }),
            final_fix: json!({ "value": value }),
            learning_notes: format!("{field} found in {filing_type}{section_note} for {ticker}"),
            status: CaseStatus::Completed,
            created_at: observed_at,
            completed_at: Some(observed_at),
        };
        self.repo.upsert(&case).await
    }

    /// Record a value that needed normalization before it could be stored, so
    /// future extraction prompts can warn against the raw format.
    pub async fn record_format_prevention(
        &self,
        agent_id: &str,
        field: &str,
        ticker: &str,
        raw_value: &str,
        normalized: f64,
        observed_at: DateTime<Utc>,
    ) -> DomainResult<()> {
        let case = LearningCase {
            issue_id: LearningCase::deterministic_id(
                IssueType::FormatError,
                ticker,
                Some(field),
                Some(raw_value),
                observed_at,
            ),
            issue_type: IssueType::FormatError,
            ticker: ticker.to_string(),
            field: Some(field.to_string()),
            original_data: json!({ "agent_id": agent_id, "raw_value": raw_value }),
            final_fix: json!({ "normalized": normalized }),
            learning_notes: format!(
                "raw value '{raw_value}' for {field} required normalization to {normalized}; request plain numerics"
            ),
            status: CaseStatus::Completed,
            created_at: observed_at,
            completed_at: Some(observed_at),
        };
        self.repo.upsert(&case).await
    }

    /// Record the outcome of an investigation, positive or negative.
    #[allow(clippy::too_many_arguments)]
    pub async fn record_investigation_outcome(
        &self,
        issue_type: IssueType,
        ticker: &str,
        field: Option<&str>,
        outcome: &str,
        notes: &str,
        original_data: serde_json::Value,
        final_fix: serde_json::Value,
        observed_at: DateTime<Utc>,
    ) -> DomainResult<()> {
        let case = LearningCase {
            issue_id: LearningCase::deterministic_id(
                issue_type,
                ticker,
                field,
                Some(outcome),
                observed_at,
            ),
            issue_type,
            ticker: ticker.to_string(),
            field: field.map(String::from),
            original_data,
            final_fix,
            learning_notes: notes.to_string(),
            status: CaseStatus::Completed,
            created_at: observed_at,
            completed_at: Some(observed_at),
        };
        debug!(ticker, outcome, issue_type = %issue_type, "recording investigation outcome");
        self.repo.upsert(&case).await
    }

    /// Aggregate recent cases for a field into the four lesson buckets.
    ///
    /// Routing is primary-by-issue-type with a substring heuristic on the
    /// notes: successes whose notes say where the value was "found in" become
    /// filing hints rather than generic success patterns. Crude, but the note
    /// formats above are written to match it.
    pub async fn lessons_for(&self, field: &str) -> DomainResult<LessonBundle> {
        let since = Utc::now() - Duration::days(LESSON_WINDOW_DAYS);
        let cases = self
            .repo
            .cases_for_field(
                field,
                &[
                    IssueType::FormatError,
                    IssueType::ExtractionSuccess,
                    IssueType::ValidationError,
                ],
                since,
                LESSON_CASE_LIMIT,
            )
            .await?;

        let mut bundle = LessonBundle {
            total_learnings: cases.len(),
            ..LessonBundle::default()
        };

        for case in &cases {
            match case.issue_type {
                IssueType::FormatError => {
                    push_capped(&mut bundle.format_warnings, &case.learning_notes, 5);
                }
                IssueType::ValidationError => {
                    push_capped(&mut bundle.common_mistakes, &case.learning_notes, 3);
                }
                IssueType::ExtractionSuccess => {
                    if case.learning_notes.contains("found in") {
                        push_capped(&mut bundle.filing_hints, &case.learning_notes, 3);
                    } else {
                        push_capped(&mut bundle.success_patterns, &case.learning_notes, 3);
                    }
                }
                _ => {}
            }
            if let Some(agent) = case
                .original_data
                .get("agent_id")
                .and_then(serde_json::Value::as_str)
            {
                if !bundle.contributing_agents.iter().any(|a| a == agent) {
                    bundle.contributing_agents.push(agent.to_string());
                }
            }
        }

        Ok(bundle)
    }

    /// Derive a search strategy for a field from past successes, falling back
    /// to the static category defaults when there is no history.
    pub async fn search_strategy_for(
        &self,
        field: &str,
        ticker: Option<&str>,
    ) -> DomainResult<SearchStrategy> {
        let since = Utc::now() - Duration::days(STRATEGY_WINDOW_DAYS);
        let successes = self.repo.successes_for_field(field, ticker, since).await?;

        if successes.is_empty() {
            return Ok(default_strategy_for(field));
        }

        // Count successes per filing type; the mode becomes the primary
        // source and its share the confidence.
        let mut counts: Vec<(String, usize)> = Vec::new();
        let mut section_hints: Vec<String> = Vec::new();
        for case in &successes {
            let Some(filing_type) = case
                .original_data
                .get("filing_type")
                .and_then(serde_json::Value::as_str)
            else {
                continue;
            };
            match counts.iter_mut().find(|(t, _)| t == filing_type) {
                Some((_, n)) => *n += 1,
                None => counts.push((filing_type.to_string(), 1)),
            }
            if let Some(section) = case
                .original_data
                .get("section")
                .and_then(serde_json::Value::as_str)
            {
                if !section_hints.iter().any(|s| s == section) && section_hints.len() < 3 {
                    section_hints.push(section.to_string());
                }
            }
        }

        if counts.is_empty() {
            return Ok(default_strategy_for(field));
        }

        counts.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        let total: usize = counts.iter().map(|(_, n)| n).sum();
        let (primary_source, mode_count) = counts[0].clone();
        let fallback_sources = counts
            .iter()
            .skip(1)
            .take(2)
            .map(|(t, _)| t.clone())
            .collect();

        Ok(SearchStrategy {
            primary_source,
            section_hints,
            fallback_sources,
            lookback_days: default_strategy_for(field).lookback_days,
            confidence: mode_count as f64 / total as f64,
            past_successes: total,
        })
    }

    /// Past cases of one issue type, exact-ticker matches first, then newest
    /// first. Feeds hypothesis generation.
    pub async fn past_cases_for(
        &self,
        issue_type: IssueType,
        ticker: Option<&str>,
        limit: usize,
    ) -> DomainResult<Vec<LearningCase>> {
        self.repo.cases_by_type(issue_type, ticker, limit).await
    }
}

fn push_capped(bucket: &mut Vec<String>, note: &str, cap: usize) {
    if bucket.len() < cap {
        bucket.push(note.to_string());
    }
}

/// Static per-category defaults used when no history exists.
fn default_strategy_for(field: &str) -> SearchStrategy {
    let category = FilingPrecedenceManager::category_of(field);
    let (primary, fallbacks, lookback, hints): (&str, &[&str], i64, &[&str]) = match category {
        FieldCategory::Periodic => (
            "10-Q",
            &["10-K", "8-K"],
            120,
            &["trust account", "balance sheet"],
        ),
        FieldCategory::EventBased => (
            "8-K",
            &["425", "DEFM14A"],
            90,
            &["item 1.01", "business combination"],
        ),
        FieldCategory::IpoStatic => (
            "S-1",
            &["S-1/A", "424B4"],
            540,
            &["the offering", "use of proceeds"],
        ),
        FieldCategory::IpoMutable => (
            "8-K",
            &["DEF 14A", "10-Q"],
            180,
            &["item 5.07", "extension"],
        ),
    };
    SearchStrategy {
        primary_source: primary.to_string(),
        section_hints: hints.iter().map(|s| (*s).to_string()).collect(),
        fallback_sources: fallbacks.iter().map(|s| (*s).to_string()).collect(),
        lookback_days: lookback,
        confidence: 0.0,
        past_successes: 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// In-memory repository with the same upsert semantics as the SQLite
    /// adapter.
    #[derive(Default)]
    struct InMemoryRepo {
        cases: Mutex<Vec<LearningCase>>,
    }

    #[async_trait]
    impl LearningRepository for InMemoryRepo {
        async fn upsert(&self, case: &LearningCase) -> DomainResult<()> {
            let mut cases = self.cases.lock().unwrap();
            cases.retain(|c| c.issue_id != case.issue_id);
            cases.push(case.clone());
            Ok(())
        }

        async fn cases_for_field(
            &self,
            field: &str,
            issue_types: &[IssueType],
            since: DateTime<Utc>,
            limit: usize,
        ) -> DomainResult<Vec<LearningCase>> {
            let cases = self.cases.lock().unwrap();
            let mut matched: Vec<LearningCase> = cases
                .iter()
                .filter(|c| c.field.as_deref() == Some(field))
                .filter(|c| issue_types.contains(&c.issue_type))
                .filter(|c| c.created_at >= since)
                .cloned()
                .collect();
            matched.sort_by(|a, b| b.created_at.cmp(&a.created_at));
            matched.truncate(limit);
            Ok(matched)
        }

        async fn successes_for_field(
            &self,
            field: &str,
            ticker: Option<&str>,
            since: DateTime<Utc>,
        ) -> DomainResult<Vec<LearningCase>> {
            let cases = self.cases.lock().unwrap();
            Ok(cases
                .iter()
                .filter(|c| c.issue_type == IssueType::ExtractionSuccess)
                .filter(|c| c.field.as_deref() == Some(field))
                .filter(|c| ticker.is_none_or(|t| c.ticker == t))
                .filter(|c| c.created_at >= since)
                .cloned()
                .collect())
        }

        async fn cases_by_type(
            &self,
            issue_type: IssueType,
            ticker: Option<&str>,
            limit: usize,
        ) -> DomainResult<Vec<LearningCase>> {
            let cases = self.cases.lock().unwrap();
            let mut matched: Vec<LearningCase> = cases
                .iter()
                .filter(|c| c.issue_type == issue_type)
                .cloned()
                .collect();
            matched.sort_by(|a, b| {
                let a_hit = ticker.is_some_and(|t| a.ticker == t);
                let b_hit = ticker.is_some_and(|t| b.ticker == t);
                b_hit
                    .cmp(&a_hit)
                    .then_with(|| b.created_at.cmp(&a.created_at))
            });
            matched.truncate(limit);
            Ok(matched)
        }
    }

    fn store() -> (LearningStore, Arc<InMemoryRepo>) {
        let repo = Arc::new(InMemoryRepo::default());
        (LearningStore::new(repo.clone()), repo)
    }

    #[tokio::test]
    async fn test_record_success_is_idempotent() {
        let (store, repo) = store();
        let at = Utc::now();

        for _ in 0..2 {
            store
                .record_success(
                    "trust-agent",
                    "trust_value",
                    &json!(275e6),
                    "OBA",
                    "10-Q",
                    Some("trust account"),
                    at,
                )
                .await
                .unwrap();
        }

        assert_eq!(repo.cases.lock().unwrap().len(), 1);
        let lessons = store.lessons_for("trust_value").await.unwrap();
        assert_eq!(lessons.total_learnings, 1);
    }

    #[tokio::test]
    async fn test_lessons_bucket_routing() {
        let (store, _repo) = store();
        let at = Utc::now();

        store
            .record_success("trust-agent", "trust_value", &json!(275e6), "OBA", "10-Q", None, at)
            .await
            .unwrap();
        store
            .record_format_prevention("trust-agent", "trust_value", "OBA", "$275M", 275e6, at)
            .await
            .unwrap();

        let lessons = store.lessons_for("trust_value").await.unwrap();
        assert_eq!(lessons.filing_hints.len(), 1, "'found in' notes become filing hints");
        assert_eq!(lessons.format_warnings.len(), 1);
        assert!(lessons.success_patterns.is_empty());
        assert_eq!(lessons.contributing_agents, vec!["trust-agent".to_string()]);
        assert_eq!(lessons.total_learnings, 2);
    }

    #[tokio::test]
    async fn test_strategy_mode_and_confidence() {
        let (store, _repo) = store();
        let base = Utc::now();

        for (i, filing_type) in ["10-Q", "10-Q", "10-K"].iter().enumerate() {
            store
                .record_success(
                    "trust-agent",
                    "trust_value",
                    &json!(275e6),
                    "OBA",
                    filing_type,
                    Some("trust account"),
                    base - Duration::hours(i as i64),
                )
                .await
                .unwrap();
        }

        let strategy = store.search_strategy_for("trust_value", None).await.unwrap();
        assert_eq!(strategy.primary_source, "10-Q");
        assert_eq!(strategy.fallback_sources, vec!["10-K".to_string()]);
        assert_eq!(strategy.past_successes, 3);
        assert!((strategy.confidence - 2.0 / 3.0).abs() < 1e-9);
        assert_eq!(strategy.section_hints, vec!["trust account".to_string()]);
    }

    #[tokio::test]
    async fn test_strategy_defaults_without_history() {
        let (store, _repo) = store();

        let periodic = store.search_strategy_for("trust_value", None).await.unwrap();
        assert_eq!(periodic.primary_source, "10-Q");
        assert_eq!(periodic.past_successes, 0);
        assert!((periodic.confidence - 0.0).abs() < f64::EPSILON);

        let event = store.search_strategy_for("target", None).await.unwrap();
        assert_eq!(event.primary_source, "8-K");

        let ipo = store.search_strategy_for("ipo_date", None).await.unwrap();
        assert_eq!(ipo.primary_source, "S-1");

        // Unknown fields take the periodic default.
        let unknown = store.search_strategy_for("mystery", None).await.unwrap();
        assert_eq!(unknown.primary_source, "10-Q");
    }

    #[tokio::test]
    async fn test_past_cases_ticker_prioritized() {
        let (store, _repo) = store();
        let base = Utc::now();

        store
            .record_investigation_outcome(
                IssueType::DeadlineExtension,
                "ZZZ",
                None,
                "extension_found",
                "extension found in 8-K",
                json!({}),
                json!({"outcome": "extension_found"}),
                base,
            )
            .await
            .unwrap();
        store
            .record_investigation_outcome(
                IssueType::DeadlineExtension,
                "OBA",
                None,
                "none_found",
                "no deadline signal in window",
                json!({}),
                json!({"outcome": "none_found"}),
                base - Duration::days(3),
            )
            .await
            .unwrap();

        let cases = store
            .past_cases_for(IssueType::DeadlineExtension, Some("OBA"), 10)
            .await
            .unwrap();
        // OBA first despite being older.
        assert_eq!(cases[0].ticker, "OBA");
        assert_eq!(cases[1].ticker, "ZZZ");
    }
}
