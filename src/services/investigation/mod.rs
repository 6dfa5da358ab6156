//! The autonomous investigation pipeline.
//!
//! One sequential pass per investigation, no branching back:
//! detect → generate hypotheses → collect evidence → diagnose → fix →
//! prevention → document and learn. Any stage coming up empty terminates the
//! investigation; that is the inconclusive outcome, not an error. A separate
//! narrower sub-flow scans a prioritized filing list for deadline
//! extension/completion/termination signals.

pub mod anomaly;
pub mod diagnosis;
pub mod evidence;
pub mod fix;
pub mod hypothesis;
pub mod prevention;

pub use anomaly::AnomalyDetector;
pub use diagnosis::RootCauseDiagnoser;
pub use evidence::EvidenceCollector;
pub use fix::FixApplier;
pub use hypothesis::HypothesisGenerator;
pub use prevention::PreventionCreator;

use std::sync::Arc;
use std::time::Duration;

use chrono::{NaiveDate, Utc};
use serde_json::json;
use tracing::{info, warn};
use uuid::Uuid;

use crate::domain::errors::DomainResult;
use crate::domain::models::{
    DeadlineResolution, DeadlineScan, FilingRef, InvestigationConfig, InvestigationContext,
    InvestigationReport, IssueType, ReportStatus, ReportedIssue, ResearchFinding, ScanWindow,
};
use crate::domain::ports::{
    FilingRegistry, Notifier, RecordStore, ReportRepository, TextCompletion,
};
use crate::services::learning::LearningStore;

/// Filing types scanned for deadline signals, most likely first.
const DEADLINE_FILING_PRIORITY: &[&str] = &["8-K", "DEF 14A", "DEFA14A", "425", "10-Q"];
/// Filings pulled per type during a deadline scan.
const DEADLINE_FILINGS_PER_TYPE: usize = 10;

/// Orchestrates the investigation pipeline and the deadline sub-flow.
pub struct InvestigationAgent {
    detector: AnomalyDetector,
    generator: HypothesisGenerator,
    collector: EvidenceCollector,
    diagnoser: RootCauseDiagnoser,
    fixer: FixApplier,
    learning: Arc<LearningStore>,
    reports: Arc<dyn ReportRepository>,
    registry: Arc<dyn FilingRegistry>,
    notifier: Arc<dyn Notifier>,
    config: InvestigationConfig,
}

impl InvestigationAgent {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        registry: Arc<dyn FilingRegistry>,
        records: Arc<dyn RecordStore>,
        learning: Arc<LearningStore>,
        reports: Arc<dyn ReportRepository>,
        notifier: Arc<dyn Notifier>,
        backend: Option<Arc<dyn TextCompletion>>,
        config: InvestigationConfig,
        request_delay: Duration,
    ) -> Self {
        Self {
            detector: AnomalyDetector::new(config.temporal_gap_years),
            generator: HypothesisGenerator::new(backend),
            collector: EvidenceCollector::new(registry.clone(), request_delay),
            diagnoser: RootCauseDiagnoser::new(config.temporal_gap_years),
            fixer: FixApplier::new(records),
            learning,
            reports,
            registry,
            notifier,
            config,
        }
    }

    /// Run one full investigation. Returns `None` whenever a stage comes up
    /// empty or unconfirmed; investigations are inconclusive, never failed.
    pub async fn investigate(
        &self,
        issue: &ReportedIssue,
        research: &ResearchFinding,
        ctx: &InvestigationContext,
    ) -> DomainResult<Option<InvestigationReport>> {
        let anomalies = self.detector.detect(issue, research, ctx);
        let Some(anomaly) = anomalies.into_iter().next() else {
            info!(ticker = %ctx.ticker, "state consistent, no investigation needed");
            return Ok(None);
        };
        info!(ticker = %ctx.ticker, kind = %anomaly.kind, "anomaly detected");

        // Past identity corrections bias hypothesis ranking; losing them to a
        // storage hiccup should not stop the investigation.
        let past_cases = match self
            .learning
            .past_cases_for(
                IssueType::IdentityCorrection,
                Some(&ctx.ticker),
                self.config.past_case_limit,
            )
            .await
        {
            Ok(cases) => cases,
            Err(err) => {
                warn!(error = %err, "could not load past cases, continuing without");
                Vec::new()
            }
        };

        let hypotheses = self.generator.generate(&anomaly, ctx, &past_cases).await;
        let Some(top) = hypotheses.first() else {
            info!(ticker = %ctx.ticker, "no hypotheses generated, investigation inconclusive");
            return Ok(None);
        };
        info!(
            ticker = %ctx.ticker,
            count = hypotheses.len(),
            top_likelihood = top.likelihood,
            "hypotheses ranked"
        );

        let evidence = self.collector.collect(top, ctx).await;
        let diagnosis = self.diagnoser.diagnose(&hypotheses, &evidence);
        if !diagnosis.confirmed {
            info!(ticker = %ctx.ticker, "no hypothesis confirmed, investigation inconclusive");
            return Ok(None);
        }
        info!(
            ticker = %ctx.ticker,
            confidence = diagnosis.confidence,
            "root cause confirmed"
        );

        let fix = self.fixer.apply(&diagnosis, ctx).await?;
        if !fix.applied {
            warn!(ticker = %ctx.ticker, "fix could not be applied, investigation inconclusive");
            return Ok(None);
        }

        let prevention = PreventionCreator::create(&diagnosis);
        let status = if fix.warning.is_some() {
            ReportStatus::PartiallyResolved
        } else {
            ReportStatus::Resolved
        };

        let report = InvestigationReport {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            ticker: ctx.ticker.clone(),
            anomaly,
            hypotheses,
            evidence,
            diagnosis,
            fix: Some(fix),
            prevention,
            status,
        };

        // The fix is already durable; report and learning writes must not
        // undo or block it.
        if let Err(err) = self.reports.insert(&report).await {
            warn!(error = %err, "failed to persist investigation report");
        }
        if let Err(err) = self
            .learning
            .record_investigation_outcome(
                IssueType::IdentityCorrection,
                &ctx.ticker,
                issue.field.as_deref(),
                report.status.as_str(),
                &format!(
                    "confirmed wrong identifier for {} at confidence {}",
                    ctx.ticker, report.diagnosis.confidence
                ),
                json!({ "anomaly": report.anomaly.kind.as_str() }),
                json!({
                    "status": report.status.as_str(),
                    "changes": report.fix.as_ref().map(|f| f.changes.clone()),
                }),
                report.timestamp,
            )
            .await
        {
            warn!(error = %err, "failed to record investigation outcome");
        }

        self.notifier
            .send_alert(&format!(
                "Investigation for {} {}: {} (confidence {})",
                report.ticker,
                report.status.as_str(),
                report
                    .diagnosis
                    .root_cause
                    .as_ref()
                    .map_or("unknown", |rc| rc.label()),
                report.diagnosis.confidence,
            ))
            .await;

        Ok(Some(report))
    }

    /// Scan a prioritized filing list for deadline extension, completion, or
    /// termination signals. Every branch, including finding nothing, writes
    /// a learning case, so negative results feed the loop too.
    pub async fn investigate_deadline_extension(
        &self,
        ticker: &str,
        cik: &str,
        known_deadline: Option<NaiveDate>,
    ) -> DomainResult<DeadlineScan> {
        let today = Utc::now().date_naive();
        let window = scan_window(today, known_deadline);
        info!(
            ticker,
            from = %window.from,
            to = %window.to,
            "scanning for deadline signals"
        );

        let mut filings_examined = 0usize;
        for filing_type in DEADLINE_FILING_PRIORITY {
            let filings = match self
                .registry
                .search_filings(cik, Some(filing_type), DEADLINE_FILINGS_PER_TYPE)
                .await
            {
                Ok(filings) => filings,
                Err(err) => {
                    warn!(error = %err, filing_type, "filing search failed, trying next type");
                    continue;
                }
            };

            for filing in filings
                .into_iter()
                .filter(|f| window.contains(f.filing_date))
            {
                filings_examined += 1;
                if let Some(resolution) = self.classify_filing(&filing).await {
                    let scan = DeadlineScan {
                        ticker: ticker.to_string(),
                        resolution,
                        window,
                        filings_examined,
                    };
                    self.record_deadline_outcome(ticker, &scan).await;
                    return Ok(scan);
                }
            }
        }

        let scan = DeadlineScan {
            ticker: ticker.to_string(),
            resolution: DeadlineResolution::NoneFound,
            window,
            filings_examined,
        };
        self.record_deadline_outcome(ticker, &scan).await;
        Ok(scan)
    }

    /// Classify one filing by its summary, fetching the document body only
    /// when the summary is inconclusive.
    async fn classify_filing(&self, filing: &FilingRef) -> Option<DeadlineResolution> {
        if let Some(summary) = &filing.summary {
            if let Some(resolution) = resolution_from_text(filing, summary) {
                return Some(resolution);
            }
        }
        match self.registry.fetch_document(&filing.url).await {
            Ok(Some(body)) => resolution_from_text(filing, &body),
            Ok(None) => None,
            Err(err) => {
                warn!(error = %err, url = %filing.url, "document fetch failed, skipping filing");
                None
            }
        }
    }

    async fn record_deadline_outcome(&self, ticker: &str, scan: &DeadlineScan) {
        let outcome = scan.resolution.outcome_label();
        let notes = match &scan.resolution {
            DeadlineResolution::ExtensionFound { filing, detail }
            | DeadlineResolution::CompletionFound { filing, detail }
            | DeadlineResolution::TerminationFound { filing, detail } => format!(
                "{outcome} in {} dated {}: {detail}",
                filing.filing_type, filing.filing_date
            ),
            DeadlineResolution::NoneFound => format!(
                "no deadline signal in {} filings between {} and {}",
                scan.filings_examined, scan.window.from, scan.window.to
            ),
        };
        if let Err(err) = self
            .learning
            .record_investigation_outcome(
                IssueType::DeadlineExtension,
                ticker,
                Some("deadline_date"),
                outcome,
                &notes,
                json!({ "window": scan.window, "filings_examined": scan.filings_examined }),
                json!({ "outcome": outcome }),
                Utc::now(),
            )
            .await
        {
            warn!(error = %err, "failed to record deadline scan outcome");
        }
    }
}

/// Lookback window for a deadline scan, widened by how overdue the known
/// deadline is: far overdue means anything since the deadline is relevant;
/// mildly overdue or upcoming means the last 60 days; no known deadline
/// defaults to 30.
pub fn scan_window(today: NaiveDate, known_deadline: Option<NaiveDate>) -> ScanWindow {
    match known_deadline {
        Some(deadline) if (today - deadline).num_days() > 90 => ScanWindow {
            from: deadline,
            to: today,
        },
        Some(_) => ScanWindow {
            from: today - chrono::Duration::days(60),
            to: today,
        },
        None => ScanWindow {
            from: today - chrono::Duration::days(30),
            to: today,
        },
    }
}

const EXTENSION_SIGNALS: &[&str] = &[
    "extend the deadline",
    "extension of the deadline",
    "deadline extension",
    "extend the date by which",
    "charter amendment",
    "outside date",
    "monthly extension",
];

const COMPLETION_SIGNALS: &[&str] = &[
    "consummation of the business combination",
    "consummated its business combination",
    "closing of the business combination",
    "completion of the business combination",
    "completed its business combination",
];

const TERMINATION_SIGNALS: &[&str] = &[
    "termination of the merger agreement",
    "terminate the business combination",
    "liquidation",
    "dissolution",
    "redeem all of its outstanding",
    "winding up",
];

/// Match a filing's text against the signal sets, in fixed order: extension,
/// completion, termination.
fn resolution_from_text(filing: &FilingRef, text: &str) -> Option<DeadlineResolution> {
    let lower = text.to_lowercase();
    let hit = |signals: &[&str]| signals.iter().find(|s| lower.contains(**s)).map(|s| (*s).to_string());

    if let Some(signal) = hit(EXTENSION_SIGNALS) {
        return Some(DeadlineResolution::ExtensionFound {
            filing: filing.clone(),
            detail: signal,
        });
    }
    if let Some(signal) = hit(COMPLETION_SIGNALS) {
        return Some(DeadlineResolution::CompletionFound {
            filing: filing.clone(),
            detail: signal,
        });
    }
    if let Some(signal) = hit(TERMINATION_SIGNALS) {
        return Some(DeadlineResolution::TerminationFound {
            filing: filing.clone(),
            detail: signal,
        });
    }
    None
}
