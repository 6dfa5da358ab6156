//! Filing types, field categories, and the precedence model.
//!
//! Every tracked field belongs to exactly one category, and each category
//! carries an ordered list of filing types where a lower index means "more
//! authoritative". Recency can override nominal type precedence within a
//! category, but only by a configurable rank margin.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// SIC code for blank-check companies. A registrant filing under any other
/// SIC code is not a SPAC, which is the load-bearing signal for the
/// wrong-identifier diagnosis.
pub const BLANK_CHECK_SIC: &str = "6770";

/// Category of a tracked field. Determines which precedence rules apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldCategory {
    /// Facts created by discrete events (deal announcement, completion).
    EventBased,
    /// Facts restated in every periodic report (trust value, share counts).
    Periodic,
    /// Facts fixed at IPO that only a strictly better source may revise.
    IpoStatic,
    /// Facts set at IPO but amendable later (deadline extensions).
    IpoMutable,
}

impl FieldCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::EventBased => "event_based",
            Self::Periodic => "periodic",
            Self::IpoStatic => "ipo_static",
            Self::IpoMutable => "ipo_mutable",
        }
    }

    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "event_based" => Some(Self::EventBased),
            "periodic" => Some(Self::Periodic),
            "ipo_static" => Some(Self::IpoStatic),
            "ipo_mutable" => Some(Self::IpoMutable),
            _ => None,
        }
    }

    /// Precedence rules for this category.
    ///
    /// The ordered filing-type lists reflect where each kind of fact is
    /// authoritatively disclosed: events break in 8-Ks and merger proxies,
    /// periodic facts in quarterly/annual reports, IPO terms in the final
    /// prospectus.
    pub fn rules(&self) -> PrecedenceRules {
        match self {
            Self::EventBased => PrecedenceRules {
                order: &["8-K", "DEFM14A", "425", "10-Q", "10-K"],
                recency_matters: true,
                recency_window_days: Some(90),
            },
            Self::Periodic => PrecedenceRules {
                order: &["10-Q", "10-K", "8-K"],
                recency_matters: true,
                recency_window_days: Some(180),
            },
            Self::IpoStatic => PrecedenceRules {
                order: &["424B4", "S-1/A", "S-1", "8-K"],
                recency_matters: false,
                recency_window_days: None,
            },
            Self::IpoMutable => PrecedenceRules {
                order: &["8-K", "DEF 14A", "10-Q", "10-K"],
                recency_matters: true,
                recency_window_days: Some(365),
            },
        }
    }
}

impl std::fmt::Display for FieldCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ordered precedence rules for one field category.
#[derive(Debug, Clone)]
pub struct PrecedenceRules {
    /// Filing types ordered by authority, index 0 highest.
    pub order: &'static [&'static str],
    /// Whether a more recent filing can beat a higher-precedence older one.
    pub recency_matters: bool,
    /// Span within which an older higher-precedence filing may still win.
    pub recency_window_days: Option<i64>,
}

impl PrecedenceRules {
    /// Rank of a filing type in this category's order. Unknown types rank
    /// below every known one.
    pub fn rank(&self, filing_type: &str) -> usize {
        let normalized = filing_type.trim().to_uppercase();
        self.order
            .iter()
            .position(|t| t.to_uppercase() == normalized)
            .unwrap_or(self.order.len())
    }
}

/// The outcome of a precedence evaluation. Pure data; nothing changes until a
/// caller applies it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateDecision {
    pub should_update: bool,
    pub reason: String,
    pub current_source: Option<String>,
    pub current_date: Option<NaiveDate>,
    pub category: FieldCategory,
}

/// A dated, typed regulatory filing as surfaced by the registry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilingRef {
    pub filing_type: String,
    pub filing_date: NaiveDate,
    pub url: String,
    #[serde(default)]
    pub summary: Option<String>,
}

/// Registrant profile resolved from an identifier.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompanyProfile {
    pub cik: String,
    pub name: String,
    #[serde(default)]
    pub sic_code: Option<String>,
    #[serde(default)]
    pub sic_description: Option<String>,
}

impl CompanyProfile {
    /// Whether the registrant files as a blank-check company.
    pub fn is_blank_check(&self) -> bool {
        self.sic_code.as_deref() == Some(BLANK_CHECK_SIC)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_roundtrip() {
        for cat in [
            FieldCategory::EventBased,
            FieldCategory::Periodic,
            FieldCategory::IpoStatic,
            FieldCategory::IpoMutable,
        ] {
            assert_eq!(FieldCategory::from_str(cat.as_str()), Some(cat));
        }
        assert_eq!(FieldCategory::from_str("bogus"), None);
    }

    #[test]
    fn test_rank_known_types() {
        let rules = FieldCategory::Periodic.rules();
        assert_eq!(rules.rank("10-Q"), 0);
        assert_eq!(rules.rank("10-K"), 1);
        assert_eq!(rules.rank("8-K"), 2);
    }

    #[test]
    fn test_rank_unknown_type_ranks_last() {
        let rules = FieldCategory::Periodic.rules();
        assert_eq!(rules.rank("SC 13D"), rules.order.len());
    }

    #[test]
    fn test_rank_is_case_insensitive() {
        let rules = FieldCategory::EventBased.rules();
        assert_eq!(rules.rank("8-k"), rules.rank("8-K"));
    }

    #[test]
    fn test_ipo_static_ignores_recency() {
        assert!(!FieldCategory::IpoStatic.rules().recency_matters);
        assert!(FieldCategory::IpoStatic.rules().recency_window_days.is_none());
    }

    #[test]
    fn test_blank_check_detection() {
        let spac = CompanyProfile {
            cik: "0001234567".to_string(),
            name: "Oxley Acquisition Corp".to_string(),
            sic_code: Some(BLANK_CHECK_SIC.to_string()),
            sic_description: Some("Blank Checks".to_string()),
        };
        assert!(spac.is_blank_check());

        let operating = CompanyProfile {
            cik: "0009999999".to_string(),
            name: "Oxley Bridge Industries".to_string(),
            sic_code: Some("3312".to_string()),
            sic_description: Some("Steel Works".to_string()),
        };
        assert!(!operating.is_blank_check());
    }
}
