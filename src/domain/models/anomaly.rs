//! Anomaly model and the inputs an investigation starts from.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Structural inconsistency classes the detector can flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnomalyKind {
    /// A proposed event date predates the record's IPO by more than the
    /// configured gap, impossible for a genuine SPAC deal.
    TemporalInconsistency,
    /// Research claims a deal was found but carries no target name.
    ExtractionFailure,
    /// Database name and externally-sourced name share no substring.
    IdentityMismatch,
}

impl AnomalyKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::TemporalInconsistency => "temporal_inconsistency",
            Self::ExtractionFailure => "extraction_failure",
            Self::IdentityMismatch => "identity_mismatch",
        }
    }
}

impl std::fmt::Display for AnomalyKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AnomalySeverity {
    Medium,
    High,
    Critical,
}

impl AnomalySeverity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Medium => "MEDIUM",
            Self::High => "HIGH",
            Self::Critical => "CRITICAL",
        }
    }
}

/// A detected inconsistency between proposed facts and record state.
///
/// Created transiently per investigation; persisted only inside the
/// investigation report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Anomaly {
    pub kind: AnomalyKind,
    pub severity: AnomalySeverity,
    pub description: String,
    /// Free-form facts supporting the flag, keyed for the report.
    #[serde(default)]
    pub evidence: BTreeMap<String, serde_json::Value>,
    /// The detector's first guess at a cause, if it has one.
    #[serde(default)]
    pub primary_hypothesis: Option<String>,
}

/// The data-quality issue that triggered research in the first place.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReportedIssue {
    pub issue_type: String,
    #[serde(default)]
    pub field: Option<String>,
    #[serde(default)]
    pub description: String,
}

/// What external research (extractors, filings search) turned up.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResearchFinding {
    /// Whether the research claims to have found a deal.
    #[serde(default)]
    pub deal_found: bool,
    #[serde(default)]
    pub target: Option<String>,
    #[serde(default)]
    pub announced_date: Option<NaiveDate>,
    /// Company name as the external source reports it.
    #[serde(default)]
    pub company_name: Option<String>,
    /// Raw extractor output, carried for the audit trail.
    #[serde(default)]
    pub raw: serde_json::Value,
}

/// Record-side facts the investigation reasons against.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InvestigationContext {
    pub ticker: String,
    #[serde(default)]
    pub cik: Option<String>,
    /// Company name as the database has it.
    #[serde(default)]
    pub company_name: Option<String>,
    #[serde(default)]
    pub ipo_date: Option<NaiveDate>,
}

impl InvestigationContext {
    pub fn for_ticker(ticker: impl Into<String>) -> Self {
        Self {
            ticker: ticker.into(),
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_ordering() {
        assert!(AnomalySeverity::Critical > AnomalySeverity::High);
        assert!(AnomalySeverity::High > AnomalySeverity::Medium);
    }

    #[test]
    fn test_anomaly_serializes_kind_snake_case() {
        let anomaly = Anomaly {
            kind: AnomalyKind::TemporalInconsistency,
            severity: AnomalySeverity::Critical,
            description: "announced 10.8 years before IPO".to_string(),
            evidence: BTreeMap::new(),
            primary_hypothesis: None,
        };
        let json = serde_json::to_value(&anomaly).unwrap();
        assert_eq!(json["kind"], "temporal_inconsistency");
        assert_eq!(json["severity"], "CRITICAL");
    }
}
