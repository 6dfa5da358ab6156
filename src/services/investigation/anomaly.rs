//! Structural anomaly detection.
//!
//! Pure inspection of a research result against current record state. Checks
//! run in a fixed order (temporal first, extraction failure second, identity
//! mismatch third) so report contents are stable across runs.

use std::collections::BTreeMap;

use serde_json::json;

use crate::domain::models::{
    Anomaly, AnomalyKind, AnomalySeverity, InvestigationContext, ReportedIssue, ResearchFinding,
};

const DAYS_PER_YEAR: f64 = 365.25;

/// Flags structural inconsistencies worth investigating.
#[derive(Debug, Clone)]
pub struct AnomalyDetector {
    /// Years an announced date must precede the IPO by before the temporal
    /// check fires. Exclusive boundary: a gap of exactly this many years is
    /// still consistent.
    temporal_gap_years: f64,
}

impl Default for AnomalyDetector {
    fn default() -> Self {
        Self {
            temporal_gap_years: 2.0,
        }
    }
}

impl AnomalyDetector {
    pub fn new(temporal_gap_years: f64) -> Self {
        Self { temporal_gap_years }
    }

    /// Inspect the inputs and return every anomaly found, most severe class
    /// first by construction. An empty result means "consistent, no
    /// investigation needed", the common case.
    pub fn detect(
        &self,
        _issue: &ReportedIssue,
        research: &ResearchFinding,
        ctx: &InvestigationContext,
    ) -> Vec<Anomaly> {
        let mut anomalies = Vec::new();

        // A deal announced years before the SPAC even IPO'd is impossible;
        // the identifier almost certainly points at a different company.
        if let (Some(announced), Some(ipo)) = (research.announced_date, ctx.ipo_date) {
            let years_before_ipo = (ipo - announced).num_days() as f64 / DAYS_PER_YEAR;
            if years_before_ipo > self.temporal_gap_years {
                let mut evidence = BTreeMap::new();
                evidence.insert("announced_date".to_string(), json!(announced.to_string()));
                evidence.insert("ipo_date".to_string(), json!(ipo.to_string()));
                evidence.insert("years_before_ipo".to_string(), json!(years_before_ipo));
                anomalies.push(Anomaly {
                    kind: AnomalyKind::TemporalInconsistency,
                    severity: AnomalySeverity::Critical,
                    description: format!(
                        "announced date {announced} precedes IPO date {ipo} by {years_before_ipo:.1} years"
                    ),
                    evidence,
                    primary_hypothesis: Some(
                        "wrong identity mapping / identifier reused".to_string(),
                    ),
                });
            }
        }

        if research.deal_found && research.target.is_none() {
            anomalies.push(Anomaly {
                kind: AnomalyKind::ExtractionFailure,
                severity: AnomalySeverity::Medium,
                description: "research claims a deal was found but no target name was extracted"
                    .to_string(),
                evidence: BTreeMap::new(),
                primary_hypothesis: None,
            });
        }

        if let (Some(ours), Some(theirs)) = (&ctx.company_name, &research.company_name) {
            if !names_overlap(ours, theirs) {
                let mut evidence = BTreeMap::new();
                evidence.insert("database_name".to_string(), json!(ours));
                evidence.insert("external_name".to_string(), json!(theirs));
                anomalies.push(Anomaly {
                    kind: AnomalyKind::IdentityMismatch,
                    severity: AnomalySeverity::Critical,
                    description: format!(
                        "database name '{ours}' and externally sourced name '{theirs}' share no overlap"
                    ),
                    evidence,
                    primary_hypothesis: Some(
                        "wrong identity mapping / identifier reused".to_string(),
                    ),
                });
            }
        }

        anomalies
    }
}

/// Whether either name contains the other, case-insensitively.
fn names_overlap(a: &str, b: &str) -> bool {
    let a = a.trim().to_lowercase();
    let b = b.trim().to_lowercase();
    if a.is_empty() || b.is_empty() {
        return false;
    }
    a.contains(&b) || b.contains(&a)
}
