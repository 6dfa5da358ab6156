//! Recommended recurring validations for confirmed root causes.
//!
//! Declarative and advisory only; nothing here schedules anything.

use crate::domain::models::{Diagnosis, PreventionMeasure, RootCause};

pub struct PreventionCreator;

impl PreventionCreator {
    /// Measures recommended for the diagnosis's root cause. Empty when
    /// nothing was confirmed.
    pub fn create(diagnosis: &Diagnosis) -> Vec<PreventionMeasure> {
        if !diagnosis.confirmed {
            return Vec::new();
        }
        match diagnosis.root_cause {
            Some(RootCause::WrongIdentifier) => vec![
                PreventionMeasure {
                    name: "identity_validation".to_string(),
                    description: "re-resolve each record's identifier against the registry \
                                  and compare registrant names"
                        .to_string(),
                    cadence: "weekly".to_string(),
                },
                PreventionMeasure {
                    name: "blank_check_sic_gate".to_string(),
                    description: "verify the registrant files under the blank-check SIC code \
                                  before accepting event facts from its filings"
                        .to_string(),
                    cadence: "per_sync".to_string(),
                },
            ],
            _ => Vec::new(),
        }
    }
}
