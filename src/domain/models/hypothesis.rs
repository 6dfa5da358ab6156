//! Root-cause hypotheses and their verification steps.
//!
//! Verification steps are a closed tagged enum produced directly by the
//! hypothesis generator's structured output. The evidence collector executes
//! the enum; free-text phrases from a generative backend are parsed into it
//! tolerantly, and anything unparseable is dropped (with a warning) rather
//! than silently mutating into a different step.

use serde::{Deserialize, Serialize};

/// The closed set of verification lookups the evidence collector knows how to
/// execute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerificationStep {
    /// Resolve the registrant currently filing under the record's CIK.
    CikLookup,
    /// Check the registrant's SIC code (blank-check or not).
    SicCodeCheck,
    /// Search the filing index for a CIK matching the company name.
    CikSearchByName,
    /// Compare the identifier's earliest filing date against the IPO date.
    DateConsistency,
}

impl VerificationStep {
    /// The canonical phrase used when prompting a generative backend. The
    /// tolerant parser below accepts these phrases back verbatim.
    pub fn canonical_phrase(&self) -> &'static str {
        match self {
            Self::CikLookup => "Look up the company currently registered under the CIK",
            Self::SicCodeCheck => "Check the SIC code of the CIK registrant",
            Self::CikSearchByName => "Search the filing index for a CIK matching the company name",
            Self::DateConsistency => {
                "Compare the earliest filing date under the CIK against the recorded IPO date"
            }
        }
    }

    /// Parse a free-text step description back into the closed set.
    ///
    /// Matching is substring-based and ordered from most to least specific so
    /// that "check the SIC code of the CIK" resolves to the SIC check rather
    /// than the plain CIK lookup.
    pub fn from_phrase(phrase: &str) -> Option<Self> {
        let lower = phrase.to_lowercase();
        if lower.contains("sic") {
            return Some(Self::SicCodeCheck);
        }
        if lower.contains("search") && lower.contains("name") {
            return Some(Self::CikSearchByName);
        }
        if lower.contains("earliest") || lower.contains("filing date") || lower.contains("ipo date")
        {
            return Some(Self::DateConsistency);
        }
        if lower.contains("cik") || lower.contains("look up") {
            return Some(Self::CikLookup);
        }
        None
    }

    pub fn all() -> &'static [VerificationStep] {
        &[
            Self::CikLookup,
            Self::SicCodeCheck,
            Self::CikSearchByName,
            Self::DateConsistency,
        ]
    }
}

/// Root-cause classes a hypothesis can name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RootCause {
    /// The record's identifier points at a different company (reused or
    /// mis-mapped CIK).
    WrongIdentifier,
    /// Extraction pulled a fact from a superseded filing.
    StaleExtraction,
    /// The filing itself carries the error.
    SourceDocumentError,
    /// Anything else the backend proposed; never confirmable.
    Other(String),
}

impl RootCause {
    pub fn label(&self) -> &str {
        match self {
            Self::WrongIdentifier => "wrong_identifier",
            Self::StaleExtraction => "stale_extraction",
            Self::SourceDocumentError => "source_document_error",
            Self::Other(s) => s,
        }
    }

    /// Map a backend-supplied root-cause string into the closed classes.
    pub fn from_label(label: &str) -> Self {
        let lower = label.to_lowercase();
        if lower.contains("wrong") && (lower.contains("identi") || lower.contains("cik"))
            || lower.contains("reused")
        {
            Self::WrongIdentifier
        } else if lower.contains("stale") || lower.contains("superseded") {
            Self::StaleExtraction
        } else if lower.contains("source") && lower.contains("error") {
            Self::SourceDocumentError
        } else {
            Self::Other(label.to_string())
        }
    }
}

/// A ranked candidate explanation for an anomaly.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Hypothesis {
    /// 1-based rank after sorting by likelihood descending.
    pub rank: u8,
    /// 0-100.
    pub likelihood: u8,
    pub root_cause: RootCause,
    pub reasoning: String,
    /// Ordered verification steps for the evidence collector.
    pub verification_steps: Vec<VerificationStep>,
    /// What to do if the hypothesis confirms.
    pub fix_if_true: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonical_phrases_parse_back() {
        for step in VerificationStep::all() {
            assert_eq!(
                VerificationStep::from_phrase(step.canonical_phrase()),
                Some(*step),
                "canonical phrase for {step:?} must round-trip"
            );
        }
    }

    #[test]
    fn test_sic_beats_plain_cik_lookup() {
        assert_eq!(
            VerificationStep::from_phrase("check the SIC code of the CIK registrant"),
            Some(VerificationStep::SicCodeCheck)
        );
    }

    #[test]
    fn test_unknown_phrase_is_dropped() {
        assert_eq!(VerificationStep::from_phrase("phone the CFO"), None);
    }

    #[test]
    fn test_root_cause_mapping() {
        assert_eq!(
            RootCause::from_label("wrong identity mapping / identifier reused"),
            RootCause::WrongIdentifier
        );
        assert_eq!(
            RootCause::from_label("CIK reused by another registrant"),
            RootCause::WrongIdentifier
        );
        assert_eq!(
            RootCause::from_label("stale extraction from superseded filing"),
            RootCause::StaleExtraction
        );
        assert!(matches!(
            RootCause::from_label("cosmic rays"),
            RootCause::Other(_)
        ));
    }
}
