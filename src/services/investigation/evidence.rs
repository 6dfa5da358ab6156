//! Evidence collection against the filing registry.
//!
//! Executes a hypothesis's verification steps in order, merging results into
//! one flat evidence map. A step the context cannot support (no identifier,
//! no name) or a lookup that comes back empty is skipped without error;
//! absence of evidence is itself informative downstream. A fixed delay is
//! kept between registry lookups out of politeness to the rate-limited
//! upstream.

use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use tracing::{debug, warn};

use crate::domain::models::{
    CompanyProfile, Evidence, Hypothesis, InvestigationContext, VerificationStep,
};
use crate::domain::ports::FilingRegistry;

const DAYS_PER_YEAR: f64 = 365.25;

/// Executes verification steps and accumulates evidence.
pub struct EvidenceCollector {
    registry: Arc<dyn FilingRegistry>,
    request_delay: Duration,
}

impl EvidenceCollector {
    pub fn new(registry: Arc<dyn FilingRegistry>, request_delay: Duration) -> Self {
        Self {
            registry,
            request_delay,
        }
    }

    /// Run every step of the hypothesis, in order, against the registry.
    pub async fn collect(
        &self,
        hypothesis: &Hypothesis,
        ctx: &InvestigationContext,
    ) -> Evidence {
        let mut evidence = Evidence::new();
        // The registrant profile serves two steps; fetch it at most once.
        let mut profile: Option<Option<CompanyProfile>> = None;

        for (i, step) in hypothesis.verification_steps.iter().enumerate() {
            if i > 0 {
                tokio::time::sleep(self.request_delay).await;
            }
            debug!(step = ?step, "executing verification step");
            match step {
                VerificationStep::CikLookup => {
                    let Some(cik) = ctx.cik.as_deref() else {
                        warn!("no identifier on record, skipping CIK lookup");
                        continue;
                    };
                    if let Some(p) = self.profile_for(cik, &mut profile).await {
                        evidence.insert("registrant_cik", json!(p.cik));
                        evidence.insert("registrant_name", json!(p.name));
                    }
                }
                VerificationStep::SicCodeCheck => {
                    let Some(cik) = ctx.cik.as_deref() else {
                        warn!("no identifier on record, skipping SIC check");
                        continue;
                    };
                    if let Some(p) = self.profile_for(cik, &mut profile).await {
                        evidence.insert("sic_code", json!(p.sic_code));
                        evidence.insert("is_spac", json!(p.is_blank_check()));
                    }
                }
                VerificationStep::CikSearchByName => {
                    let Some(name) = ctx.company_name.as_deref() else {
                        warn!("no company name on record, skipping CIK search");
                        continue;
                    };
                    match self.registry.search_cik_by_name(name).await {
                        Ok(Some(found)) => {
                            if ctx.cik.as_deref() == Some(found.cik.as_str()) {
                                evidence.insert("name_resolves_to_current_cik", json!(true));
                            } else {
                                evidence.insert("alternate_cik", json!(found.cik));
                                evidence.insert("alternate_cik_name", json!(found.name));
                            }
                        }
                        Ok(None) => {
                            debug!(name, "no registrant matched the company name");
                        }
                        Err(err) => {
                            warn!(error = %err, "CIK search failed, continuing without");
                        }
                    }
                }
                VerificationStep::DateConsistency => {
                    let Some(cik) = ctx.cik.as_deref() else {
                        warn!("no identifier on record, skipping date-consistency check");
                        continue;
                    };
                    match self.registry.earliest_filing_date(cik).await {
                        Ok(Some(earliest)) => {
                            evidence.insert("earliest_filing_date", json!(earliest.to_string()));
                            if let Some(ipo) = ctx.ipo_date {
                                let years =
                                    (ipo - earliest).num_days() as f64 / DAYS_PER_YEAR;
                                evidence.insert("years_before_ipo", json!(years));
                            }
                        }
                        Ok(None) => {
                            debug!(cik, "no filing history found");
                        }
                        Err(err) => {
                            warn!(error = %err, "earliest-filing lookup failed, continuing without");
                        }
                    }
                }
            }
        }

        evidence
    }

    async fn profile_for(
        &self,
        cik: &str,
        cache: &mut Option<Option<CompanyProfile>>,
    ) -> Option<CompanyProfile> {
        if cache.is_none() {
            let fetched = match self.registry.company_profile(cik).await {
                Ok(p) => p,
                Err(err) => {
                    warn!(error = %err, "profile lookup failed, continuing without");
                    None
                }
            };
            *cache = Some(fetched);
        }
        cache.clone().flatten()
    }
}
