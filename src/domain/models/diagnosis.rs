//! Diagnosis, fix, and prevention models.

use serde::{Deserialize, Serialize};

use super::evidence::Evidence;
use super::hypothesis::RootCause;

/// Outcome of matching evidence against the ranked hypothesis list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Diagnosis {
    pub confirmed: bool,
    #[serde(default)]
    pub root_cause: Option<RootCause>,
    /// 0-100, meaningful only when confirmed.
    pub confidence: u8,
    #[serde(default)]
    pub fix_strategy: Option<String>,
    /// The evidence the verdict rests on, carried either way.
    pub evidence: Evidence,
}

impl Diagnosis {
    pub fn confirmed(
        root_cause: RootCause,
        confidence: u8,
        fix_strategy: impl Into<String>,
        evidence: Evidence,
    ) -> Self {
        Self {
            confirmed: true,
            root_cause: Some(root_cause),
            confidence,
            fix_strategy: Some(fix_strategy.into()),
            evidence,
        }
    }

    pub fn unconfirmed(evidence: Evidence) -> Self {
        Self {
            confirmed: false,
            root_cause: None,
            confidence: 0,
            fix_strategy: None,
            evidence,
        }
    }
}

/// Result of applying a diagnosed fix, with before/after audit snapshots.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FixResult {
    pub applied: bool,
    pub before: serde_json::Value,
    pub after: serde_json::Value,
    /// Human-readable change lines ("cik: 0001234567 -> 0009999999").
    #[serde(default)]
    pub changes: Vec<String>,
    /// Present when the fix could only partially resolve the issue.
    #[serde(default)]
    pub warning: Option<String>,
}

impl FixResult {
    pub fn not_applied(reason: impl Into<String>) -> Self {
        Self {
            applied: false,
            before: serde_json::Value::Null,
            after: serde_json::Value::Null,
            changes: Vec::new(),
            warning: Some(reason.into()),
        }
    }
}

/// A recommended recurring validation tied to a confirmed root cause.
/// Purely advisory; nothing schedules these automatically.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PreventionMeasure {
    pub name: String,
    pub description: String,
    /// How often the check should run ("weekly", "per_sync").
    pub cadence: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unconfirmed_carries_evidence() {
        let mut evidence = Evidence::new();
        evidence.insert("is_spac", serde_json::json!(true));
        let diagnosis = Diagnosis::unconfirmed(evidence);
        assert!(!diagnosis.confirmed);
        assert!(diagnosis.root_cause.is_none());
        assert_eq!(diagnosis.evidence.get_bool("is_spac"), Some(true));
    }

    #[test]
    fn test_confirmed_constructor() {
        let diagnosis = Diagnosis::confirmed(
            RootCause::WrongIdentifier,
            95,
            "repoint identifier and clear stale deal facts",
            Evidence::new(),
        );
        assert!(diagnosis.confirmed);
        assert_eq!(diagnosis.confidence, 95);
        assert_eq!(diagnosis.root_cause, Some(RootCause::WrongIdentifier));
    }
}
