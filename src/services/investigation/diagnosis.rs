//! Root-cause confirmation from collected evidence.
//!
//! The confirmable set is closed by design: only the wrong-identifier class
//! has a confirmation rule. Anything else returns unconfirmed rather than
//! guessing.

use tracing::debug;

use crate::domain::models::{Diagnosis, Evidence, Hypothesis, RootCause};

/// Matches evidence against the ranked hypothesis list.
#[derive(Debug, Clone)]
pub struct RootCauseDiagnoser {
    temporal_gap_years: f64,
}

impl Default for RootCauseDiagnoser {
    fn default() -> Self {
        Self {
            temporal_gap_years: 2.0,
        }
    }
}

impl RootCauseDiagnoser {
    pub fn new(temporal_gap_years: f64) -> Self {
        Self { temporal_gap_years }
    }

    /// Walk hypotheses highest-likelihood first and confirm the first one the
    /// evidence supports.
    ///
    /// Wrong-identifier confirms only when the current identifier resolves to
    /// a non-SPAC entity AND the filing history predates the IPO by more than
    /// the threshold: both conditions, never one alone. Confidence is 100
    /// when an alternate identifier was independently found, 95 otherwise.
    pub fn diagnose(&self, hypotheses: &[Hypothesis], evidence: &Evidence) -> Diagnosis {
        let mut ordered: Vec<&Hypothesis> = hypotheses.iter().collect();
        ordered.sort_by(|a, b| b.likelihood.cmp(&a.likelihood));

        for hypothesis in ordered {
            if hypothesis.root_cause != RootCause::WrongIdentifier {
                debug!(root_cause = ?hypothesis.root_cause, "no confirmation rule, skipping");
                continue;
            }

            let is_spac = evidence.get_bool("is_spac");
            let years_before_ipo = evidence.get_f64("years_before_ipo");
            let non_spac_entity = is_spac == Some(false);
            let gap_exceeded =
                years_before_ipo.is_some_and(|years| years > self.temporal_gap_years);

            if non_spac_entity && gap_exceeded {
                let confidence = if evidence.contains("alternate_cik") { 100 } else { 95 };
                return Diagnosis::confirmed(
                    RootCause::WrongIdentifier,
                    confidence,
                    hypothesis.fix_if_true.clone(),
                    evidence.clone(),
                );
            }
        }

        Diagnosis::unconfirmed(evidence.clone())
    }
}
