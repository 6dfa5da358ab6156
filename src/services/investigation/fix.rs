//! Fix application with full audit capture.
//!
//! Two-tier behavior for confirmed wrong-identifier diagnoses: when evidence
//! carries a corrected identifier, the record is repointed and its dependent
//! state reset; when it does not, only the now-unreliable downstream facts
//! are cleared and the result carries a warning. Clearing contradictory data
//! is always safe; repointing identity happens only when confidently
//! resolved.

use std::sync::Arc;

use tracing::info;

use crate::domain::errors::DomainResult;
use crate::domain::models::{
    Diagnosis, FixResult, InvestigationContext, RootCause, SpacStatus, TrackedField,
};
use crate::domain::ports::RecordStore;

/// Fields invalidated when the identifier turns out to be wrong.
const DEPENDENT_FIELDS: &[TrackedField] = &[TrackedField::Target, TrackedField::AnnouncedDate];

/// Applies diagnosed fixes to records, capturing before/after state.
pub struct FixApplier {
    records: Arc<dyn RecordStore>,
}

impl FixApplier {
    pub fn new(records: Arc<dyn RecordStore>) -> Self {
        Self { records }
    }

    pub async fn apply(
        &self,
        diagnosis: &Diagnosis,
        ctx: &InvestigationContext,
    ) -> DomainResult<FixResult> {
        if !diagnosis.confirmed {
            return Ok(FixResult::not_applied("diagnosis unconfirmed"));
        }
        if diagnosis.root_cause != Some(RootCause::WrongIdentifier) {
            return Ok(FixResult::not_applied(
                "no fix procedure for this root cause",
            ));
        }

        let Some(mut record) = self.records.get_by_ticker(&ctx.ticker).await? else {
            return Ok(FixResult::not_applied(format!(
                "record {} not found",
                ctx.ticker
            )));
        };

        let before = record.snapshot();
        let mut changes = Vec::new();

        // Facts extracted under the wrong identity are contradictory no
        // matter what; clearing them is unconditionally safe.
        for field in DEPENDENT_FIELDS {
            let slot = record.slot(*field);
            if !slot.is_empty() {
                changes.push(format!(
                    "cleared {field} (was {} from {})",
                    slot.value.map_or_else(|| "-".to_string(), |v| v.to_string()),
                    slot.source.unwrap_or_else(|| "untracked".to_string()),
                ));
                record.clear_field(*field);
            }
        }

        let warning = if let Some(corrected) = diagnosis.evidence.get_str("alternate_cik") {
            let old = record.cik.clone().unwrap_or_else(|| "-".to_string());
            changes.push(format!("cik: {old} -> {corrected}"));
            record.cik = Some(corrected.to_string());
            if record.status != SpacStatus::Searching {
                changes.push(format!(
                    "status: {} -> {}",
                    record.status.as_str(),
                    SpacStatus::Searching.as_str()
                ));
                record.status = SpacStatus::Searching;
            }
            None
        } else {
            Some(
                "no corrected identifier resolved; cleared unreliable deal facts only"
                    .to_string(),
            )
        };

        self.records.commit(&record).await?;
        info!(
            ticker = %ctx.ticker,
            changes = changes.len(),
            partial = warning.is_some(),
            "fix applied"
        );

        Ok(FixResult {
            applied: true,
            before,
            after: record.snapshot(),
            changes,
            warning,
        })
    }
}
