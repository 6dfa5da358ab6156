//! Ranked root-cause hypothesis generation.
//!
//! The primary path asks a generative backend for ranked causes constrained
//! to the closed verification-step vocabulary. Any failure along that path
//! (no backend wired, transport error, non-JSON output) degrades silently to
//! a deterministic rule-based hypothesis rather than raising.

use std::sync::Arc;

use serde::Deserialize;
use tracing::{debug, warn};

use crate::domain::models::{
    Anomaly, AnomalyKind, Hypothesis, InvestigationContext, LearningCase, RootCause,
    VerificationStep,
};
use crate::domain::ports::TextCompletion;

const MAX_HYPOTHESES: usize = 5;
const MAX_PAST_CASES: usize = 5;

/// Produces ranked hypotheses for a detected anomaly.
pub struct HypothesisGenerator {
    backend: Option<Arc<dyn TextCompletion>>,
}

impl HypothesisGenerator {
    pub fn new(backend: Option<Arc<dyn TextCompletion>>) -> Self {
        Self { backend }
    }

    /// Rule-based only; used when no backend is configured.
    pub fn rule_based() -> Self {
        Self { backend: None }
    }

    /// Generate hypotheses ranked by likelihood descending.
    pub async fn generate(
        &self,
        anomaly: &Anomaly,
        ctx: &InvestigationContext,
        past_cases: &[LearningCase],
    ) -> Vec<Hypothesis> {
        if let Some(backend) = &self.backend {
            let prompt = build_prompt(anomaly, ctx, past_cases);
            match backend.complete(&prompt).await {
                Ok(response) => {
                    let hypotheses = parse_hypotheses(&response);
                    if !hypotheses.is_empty() {
                        debug!(count = hypotheses.len(), "backend produced hypotheses");
                        return hypotheses;
                    }
                    warn!("backend response unparseable, using rule-based hypotheses");
                }
                Err(err) => {
                    warn!(error = %err, "backend unavailable, using rule-based hypotheses");
                }
            }
        }
        fallback_hypotheses(anomaly)
    }
}

/// Deterministic fallback: one high-likelihood wrong-identifier hypothesis
/// for temporal impossibilities, nothing for anything else.
fn fallback_hypotheses(anomaly: &Anomaly) -> Vec<Hypothesis> {
    match anomaly.kind {
        AnomalyKind::TemporalInconsistency => vec![Hypothesis {
            rank: 1,
            likelihood: 90,
            root_cause: RootCause::WrongIdentifier,
            reasoning: "an announced date years before the IPO is only possible if the \
                        identifier maps to a different, older registrant"
                .to_string(),
            verification_steps: VerificationStep::all().to_vec(),
            fix_if_true: "repoint the record to the correct identifier and clear stale deal facts"
                .to_string(),
        }],
        _ => Vec::new(),
    }
}

fn build_prompt(anomaly: &Anomaly, ctx: &InvestigationContext, past_cases: &[LearningCase]) -> String {
    let mut prompt = String::new();
    prompt.push_str("A data-quality anomaly was detected in a SPAC tracking database.\n\n");
    prompt.push_str(&format!(
        "Ticker: {}\nIdentifier (CIK): {}\nDatabase company name: {}\nIPO date: {}\n\n",
        ctx.ticker,
        ctx.cik.as_deref().unwrap_or("unknown"),
        ctx.company_name.as_deref().unwrap_or("unknown"),
        ctx.ipo_date.map_or_else(|| "unknown".to_string(), |d| d.to_string()),
    ));
    prompt.push_str(&format!(
        "Anomaly: {} ({})\n{}\n",
        anomaly.kind,
        anomaly.severity.as_str(),
        anomaly.description
    ));
    for (key, value) in &anomaly.evidence {
        prompt.push_str(&format!("  {key}: {value}\n"));
    }

    if !past_cases.is_empty() {
        prompt.push_str("\nPast cases for similar issues:\n");
        for case in past_cases.iter().take(MAX_PAST_CASES) {
            prompt.push_str(&format!(
                "- [{}] {}: outcome {}\n",
                case.ticker,
                case.learning_notes,
                case_outcome_line(case)
            ));
        }
    }

    prompt.push_str(
        "\nPropose 3-5 ranked root-cause hypotheses as a JSON array. Each element must have: \
         likelihood (0-100), root_cause (short label), reasoning, verification_steps (array of \
         strings), fix_if_true.\n\nverification_steps must use ONLY these phrases:\n",
    );
    for step in VerificationStep::all() {
        prompt.push_str(&format!("- {}\n", step.canonical_phrase()));
    }
    prompt.push_str("\nRespond with the JSON array only.\n");
    prompt
}

/// One line summarizing how a past case resolved, synthesized from its stored
/// fix payload.
fn case_outcome_line(case: &LearningCase) -> &'static str {
    if let Some(outcome) = case.final_fix.get("outcome").and_then(serde_json::Value::as_str) {
        return match outcome {
            "extension_found" => "extension-found",
            "completion_found" => "completion-found",
            "termination_found" => "termination-found",
            _ => "none",
        };
    }
    if case.final_fix.get("new_deadline").is_some() {
        return "extension-found";
    }
    if case.final_fix.get("completed").is_some() {
        return "completion-found";
    }
    if case.final_fix.get("terminated").is_some() {
        return "termination-found";
    }
    "none"
}

#[derive(Debug, Deserialize)]
struct RawHypothesis {
    #[serde(default)]
    likelihood: f64,
    #[serde(default)]
    root_cause: String,
    #[serde(default)]
    reasoning: String,
    #[serde(default)]
    verification_steps: Vec<String>,
    #[serde(default)]
    fix_if_true: String,
}

/// Parse a backend response into ranked hypotheses. Tolerates Markdown code
/// fencing; returns empty on anything unparseable so the caller can fall
/// back.
fn parse_hypotheses(response: &str) -> Vec<Hypothesis> {
    let body = strip_code_fences(response);
    let raw: Vec<RawHypothesis> = match serde_json::from_str(body) {
        Ok(parsed) => parsed,
        Err(err) => {
            warn!(error = %err, "hypothesis response is not valid JSON");
            return Vec::new();
        }
    };

    let mut hypotheses: Vec<Hypothesis> = raw
        .into_iter()
        .map(|r| {
            let verification_steps = r
                .verification_steps
                .iter()
                .filter_map(|phrase| {
                    let step = VerificationStep::from_phrase(phrase);
                    if step.is_none() {
                        // Dropping rather than guessing; a drift in the
                        // backend's phrasing should be visible in logs.
                        warn!(phrase, "unrecognized verification step dropped");
                    }
                    step
                })
                .collect();
            Hypothesis {
                rank: 0,
                likelihood: r.likelihood.clamp(0.0, 100.0).round() as u8,
                root_cause: RootCause::from_label(&r.root_cause),
                reasoning: r.reasoning,
                verification_steps,
                fix_if_true: r.fix_if_true,
            }
        })
        .collect();

    hypotheses.sort_by(|a, b| b.likelihood.cmp(&a.likelihood));
    hypotheses.truncate(MAX_HYPOTHESES);
    for (i, h) in hypotheses.iter_mut().enumerate() {
        h.rank = (i + 1) as u8;
    }
    hypotheses
}

/// Strip a Markdown code fence (with optional language tag) around a JSON
/// body. Text without fences passes through trimmed.
fn strip_code_fences(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(start) = trimmed.find("```") else {
        return trimmed;
    };
    let after_fence = &trimmed[start + 3..];
    // Skip the language tag up to the first newline.
    let body_start = after_fence.find('\n').map_or(0, |i| i + 1);
    let body = &after_fence[body_start..];
    match body.rfind("```") {
        Some(end) => body[..end].trim(),
        None => body.trim(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::errors::{DomainError, DomainResult};
    use crate::domain::models::{AnomalySeverity, ReportedIssue, ResearchFinding};
    use crate::services::investigation::anomaly::AnomalyDetector;
    use async_trait::async_trait;
    use chrono::NaiveDate;

    struct ScriptedBackend {
        response: Result<String, String>,
    }

    #[async_trait]
    impl TextCompletion for ScriptedBackend {
        async fn complete(&self, _prompt: &str) -> DomainResult<String> {
            self.response
                .clone()
                .map_err(DomainError::BackendError)
        }
    }

    fn temporal_anomaly() -> Anomaly {
        let detector = AnomalyDetector::default();
        let ipo = NaiveDate::from_ymd_opt(2025, 6, 26).unwrap();
        let research = ResearchFinding {
            announced_date: Some(NaiveDate::from_ymd_opt(2014, 9, 19).unwrap()),
            ..Default::default()
        };
        let ctx = InvestigationContext {
            ticker: "OBA".to_string(),
            ipo_date: Some(ipo),
            ..Default::default()
        };
        detector
            .detect(&ReportedIssue::default(), &research, &ctx)
            .remove(0)
    }

    fn non_temporal_anomaly() -> Anomaly {
        Anomaly {
            kind: AnomalyKind::ExtractionFailure,
            severity: AnomalySeverity::Medium,
            description: "no target extracted".to_string(),
            evidence: Default::default(),
            primary_hypothesis: None,
        }
    }

    #[tokio::test]
    async fn test_fallback_without_backend() {
        let generator = HypothesisGenerator::rule_based();
        let hypotheses = generator
            .generate(&temporal_anomaly(), &InvestigationContext::for_ticker("OBA"), &[])
            .await;
        assert_eq!(hypotheses.len(), 1);
        assert_eq!(hypotheses[0].likelihood, 90);
        assert_eq!(hypotheses[0].root_cause, RootCause::WrongIdentifier);
        assert_eq!(hypotheses[0].verification_steps, VerificationStep::all().to_vec());
    }

    #[tokio::test]
    async fn test_fallback_empty_for_non_temporal() {
        let generator = HypothesisGenerator::rule_based();
        let hypotheses = generator
            .generate(&non_temporal_anomaly(), &InvestigationContext::for_ticker("OBA"), &[])
            .await;
        assert!(hypotheses.is_empty());
    }

    #[tokio::test]
    async fn test_backend_fenced_json_is_parsed() {
        let response = r#"```json
[
  {"likelihood": 85, "root_cause": "wrong identifier / CIK reused",
   "reasoning": "gap too large",
   "verification_steps": ["Check the SIC code of the CIK registrant"],
   "fix_if_true": "repoint identifier"},
  {"likelihood": 40, "root_cause": "stale extraction",
   "reasoning": "old filing",
   "verification_steps": ["Compare the earliest filing date under the CIK against the recorded IPO date"],
   "fix_if_true": "re-extract"}
]
```"#;
        let generator = HypothesisGenerator::new(Some(Arc::new(ScriptedBackend {
            response: Ok(response.to_string()),
        })));
        let hypotheses = generator
            .generate(&temporal_anomaly(), &InvestigationContext::for_ticker("OBA"), &[])
            .await;
        assert_eq!(hypotheses.len(), 2);
        assert_eq!(hypotheses[0].rank, 1);
        assert_eq!(hypotheses[0].likelihood, 85);
        assert_eq!(hypotheses[0].root_cause, RootCause::WrongIdentifier);
        assert_eq!(
            hypotheses[0].verification_steps,
            vec![VerificationStep::SicCodeCheck]
        );
        assert_eq!(hypotheses[1].rank, 2);
        assert_eq!(hypotheses[1].root_cause, RootCause::StaleExtraction);
    }

    #[tokio::test]
    async fn test_backend_garbage_degrades_to_fallback() {
        let generator = HypothesisGenerator::new(Some(Arc::new(ScriptedBackend {
            response: Ok("I think the CIK is probably wrong.".to_string()),
        })));
        let hypotheses = generator
            .generate(&temporal_anomaly(), &InvestigationContext::for_ticker("OBA"), &[])
            .await;
        assert_eq!(hypotheses.len(), 1);
        assert_eq!(hypotheses[0].likelihood, 90);
    }

    #[tokio::test]
    async fn test_backend_error_degrades_to_fallback() {
        let generator = HypothesisGenerator::new(Some(Arc::new(ScriptedBackend {
            response: Err("timeout".to_string()),
        })));
        let hypotheses = generator
            .generate(&temporal_anomaly(), &InvestigationContext::for_ticker("OBA"), &[])
            .await;
        assert_eq!(hypotheses.len(), 1);
        assert_eq!(hypotheses[0].root_cause, RootCause::WrongIdentifier);
    }

    #[test]
    fn test_strip_code_fences_variants() {
        assert_eq!(strip_code_fences("[1, 2]"), "[1, 2]");
        assert_eq!(strip_code_fences("```json\n[1, 2]\n```"), "[1, 2]");
        assert_eq!(strip_code_fences("```\n[1, 2]\n```"), "[1, 2]");
        assert_eq!(
            strip_code_fences("Here you go:\n```json\n[1, 2]\n```\n"),
            "[1, 2]"
        );
    }

    #[test]
    fn test_unknown_steps_dropped_not_guessed() {
        let response = r#"[{"likelihood": 70, "root_cause": "wrong identifier",
            "reasoning": "r", "verification_steps": ["phone the CFO"], "fix_if_true": "f"}]"#;
        let hypotheses = parse_hypotheses(response);
        assert_eq!(hypotheses.len(), 1);
        assert!(hypotheses[0].verification_steps.is_empty());
    }

    #[test]
    fn test_prompt_embeds_past_case_outcomes() {
        let case = LearningCase {
            issue_id: "x".to_string(),
            issue_type: crate::domain::models::IssueType::DeadlineExtension,
            ticker: "ZZZ".to_string(),
            field: None,
            original_data: serde_json::json!({}),
            final_fix: serde_json::json!({"outcome": "extension_found"}),
            learning_notes: "extension found in 8-K".to_string(),
            status: crate::domain::models::CaseStatus::Completed,
            created_at: chrono::Utc::now(),
            completed_at: Some(chrono::Utc::now()),
        };
        let prompt = build_prompt(
            &temporal_anomaly(),
            &InvestigationContext::for_ticker("OBA"),
            &[case],
        );
        assert!(prompt.contains("extension-found"));
        for step in VerificationStep::all() {
            assert!(prompt.contains(step.canonical_phrase()));
        }
    }
}
