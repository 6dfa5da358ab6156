//! Investigation reports and the deadline-extension scan results.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::anomaly::Anomaly;
use super::diagnosis::{Diagnosis, FixResult, PreventionMeasure};
use super::evidence::Evidence;
use super::filing::FilingRef;
use super::hypothesis::Hypothesis;

/// Terminal status of a completed investigation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportStatus {
    /// Root cause confirmed and the fix fully applied.
    Resolved,
    /// Root cause confirmed but the fix could only clear unreliable facts.
    PartiallyResolved,
}

impl ReportStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Resolved => "resolved",
            Self::PartiallyResolved => "partially_resolved",
        }
    }

    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "resolved" => Some(Self::Resolved),
            "partially_resolved" => Some(Self::PartiallyResolved),
            _ => None,
        }
    }
}

/// Durable audit record of one completed investigation. Written once, never
/// mutated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvestigationReport {
    pub id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub ticker: String,
    pub anomaly: Anomaly,
    pub hypotheses: Vec<Hypothesis>,
    pub evidence: Evidence,
    pub diagnosis: Diagnosis,
    #[serde(default)]
    pub fix: Option<FixResult>,
    #[serde(default)]
    pub prevention: Vec<PreventionMeasure>,
    pub status: ReportStatus,
}

/// Date span the deadline scan examined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanWindow {
    pub from: NaiveDate,
    pub to: NaiveDate,
}

impl ScanWindow {
    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.from && date <= self.to
    }
}

/// What the deadline-extension scan concluded.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum DeadlineResolution {
    /// A filing signals the deadline was pushed out.
    ExtensionFound { filing: FilingRef, detail: String },
    /// A filing signals the business combination closed.
    CompletionFound { filing: FilingRef, detail: String },
    /// A filing signals termination or liquidation.
    TerminationFound { filing: FilingRef, detail: String },
    /// Nothing conclusive inside the window.
    NoneFound,
}

impl DeadlineResolution {
    pub fn outcome_label(&self) -> &'static str {
        match self {
            Self::ExtensionFound { .. } => "extension_found",
            Self::CompletionFound { .. } => "completion_found",
            Self::TerminationFound { .. } => "termination_found",
            Self::NoneFound => "none_found",
        }
    }
}

/// Full result of a deadline scan, including how wide it looked.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeadlineScan {
    pub ticker: String,
    pub resolution: DeadlineResolution,
    pub window: ScanWindow,
    pub filings_examined: usize,
}
