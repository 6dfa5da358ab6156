//! Learning cases: the persisted memory of past extraction and investigation
//! outcomes, mined to bias future search strategy and hypothesis ranking.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Namespace for deterministic learning-case ids. Hashing the logical event
/// key into a v5 UUID makes re-logging the same event an upsert, not a
/// duplicate.
const LEARNING_NAMESPACE: Uuid = Uuid::from_bytes([
    0x6f, 0x1a, 0x2b, 0x3c, 0x4d, 0x5e, 0x4f, 0x70, 0x81, 0x92, 0xa3, 0xb4, 0xc5, 0xd6, 0xe7, 0xf8,
]);

/// Kind of outcome a learning case records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueType {
    ExtractionSuccess,
    FormatError,
    ValidationError,
    DeadlineExtension,
    IdentityCorrection,
}

impl IssueType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ExtractionSuccess => "extraction_success",
            Self::FormatError => "format_error",
            Self::ValidationError => "validation_error",
            Self::DeadlineExtension => "deadline_extension",
            Self::IdentityCorrection => "identity_correction",
        }
    }

    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "extraction_success" => Some(Self::ExtractionSuccess),
            "format_error" => Some(Self::FormatError),
            "validation_error" => Some(Self::ValidationError),
            "deadline_extension" => Some(Self::DeadlineExtension),
            "identity_correction" => Some(Self::IdentityCorrection),
            _ => None,
        }
    }
}

impl std::fmt::Display for IssueType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CaseStatus {
    Open,
    Completed,
}

impl CaseStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::Completed => "completed",
        }
    }

    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "open" => Some(Self::Open),
            "completed" => Some(Self::Completed),
            _ => None,
        }
    }
}

/// One persisted outcome. Immutable once `completed_at` is set, except for
/// the idempotent upsert keyed on `issue_id`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LearningCase {
    /// Deterministic unique id; the upsert key.
    pub issue_id: String,
    pub issue_type: IssueType,
    pub ticker: String,
    #[serde(default)]
    pub field: Option<String>,
    /// What the situation looked like before resolution.
    #[serde(default)]
    pub original_data: serde_json::Value,
    /// What resolved it (empty object for negative results).
    #[serde(default)]
    pub final_fix: serde_json::Value,
    /// Free-text notes mined later by the lesson digests.
    pub learning_notes: String,
    pub status: CaseStatus,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
}

impl LearningCase {
    /// Deterministic id from the logical event key. Identical
    /// (issue_type, ticker, field, source, timestamp) always hashes to the
    /// same id, so retried writes collapse into one row.
    pub fn deterministic_id(
        issue_type: IssueType,
        ticker: &str,
        field: Option<&str>,
        source: Option<&str>,
        observed_at: DateTime<Utc>,
    ) -> String {
        let key = format!(
            "{}:{}:{}:{}:{}",
            issue_type.as_str(),
            ticker,
            field.unwrap_or(""),
            source.unwrap_or(""),
            observed_at.to_rfc3339(),
        );
        Uuid::new_v5(&LEARNING_NAMESPACE, key.as_bytes()).to_string()
    }
}

/// Aggregated lessons for a field, bucketed from past case notes.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LessonBundle {
    /// Format pitfalls to avoid (≤5).
    pub format_warnings: Vec<String>,
    /// Where values were found before (≤3).
    pub filing_hints: Vec<String>,
    /// Validation mistakes seen before (≤3).
    pub common_mistakes: Vec<String>,
    /// What worked (≤3).
    pub success_patterns: Vec<String>,
    /// Agents whose outcomes contributed.
    pub contributing_agents: Vec<String>,
    pub total_learnings: usize,
}

/// Search strategy for a field derived from past successes, or from the
/// static category defaults when no history exists.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchStrategy {
    pub primary_source: String,
    /// Document sections worth checking first (≤3).
    pub section_hints: Vec<String>,
    /// Filing types to try after the primary (≤2).
    pub fallback_sources: Vec<String>,
    pub lookback_days: i64,
    /// Share of past successes that used the primary source, 0.0 when the
    /// strategy is a static default.
    pub confidence: f64,
    pub past_successes: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_issue_type_roundtrip() {
        for it in [
            IssueType::ExtractionSuccess,
            IssueType::FormatError,
            IssueType::ValidationError,
            IssueType::DeadlineExtension,
            IssueType::IdentityCorrection,
        ] {
            assert_eq!(IssueType::from_str(it.as_str()), Some(it));
        }
        assert_eq!(IssueType::from_str("unknown"), None);
    }

    #[test]
    fn test_deterministic_id_is_stable() {
        let at = DateTime::parse_from_rfc3339("2026-03-01T12:00:00Z")
            .unwrap()
            .with_timezone(&Utc);
        let a = LearningCase::deterministic_id(
            IssueType::ExtractionSuccess,
            "OBA",
            Some("trust_value"),
            Some("10-Q"),
            at,
        );
        let b = LearningCase::deterministic_id(
            IssueType::ExtractionSuccess,
            "OBA",
            Some("trust_value"),
            Some("10-Q"),
            at,
        );
        assert_eq!(a, b);
    }

    #[test]
    fn test_deterministic_id_varies_by_key() {
        let at = DateTime::parse_from_rfc3339("2026-03-01T12:00:00Z")
            .unwrap()
            .with_timezone(&Utc);
        let a = LearningCase::deterministic_id(
            IssueType::ExtractionSuccess,
            "OBA",
            Some("trust_value"),
            Some("10-Q"),
            at,
        );
        let b = LearningCase::deterministic_id(
            IssueType::ExtractionSuccess,
            "OBA",
            Some("trust_value"),
            Some("10-K"),
            at,
        );
        assert_ne!(a, b);
    }
}
