//! SPAC record model.
//!
//! Each tracked field carries three shadow attributes (value, source filing
//! type, filing date) and is addressed through a closed `TrackedField`
//! enum rather than dynamic attribute access. The invariant throughout: source
//! and filing date are set if and only if the value is set and was written
//! through the precedence manager.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::filing::FieldCategory;

/// The closed set of fields the precedence engine tracks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrackedField {
    Target,
    AnnouncedDate,
    CompletionDate,
    TerminationDate,
    TrustValue,
    TrustPerShare,
    SharesOutstanding,
    DeadlineDate,
    IpoDate,
    IpoSize,
    IpoPrice,
}

impl TrackedField {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Target => "target",
            Self::AnnouncedDate => "announced_date",
            Self::CompletionDate => "completion_date",
            Self::TerminationDate => "termination_date",
            Self::TrustValue => "trust_value",
            Self::TrustPerShare => "trust_per_share",
            Self::SharesOutstanding => "shares_outstanding",
            Self::DeadlineDate => "deadline_date",
            Self::IpoDate => "ipo_date",
            Self::IpoSize => "ipo_size",
            Self::IpoPrice => "ipo_price",
        }
    }

    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "target" => Some(Self::Target),
            "announced_date" => Some(Self::AnnouncedDate),
            "completion_date" => Some(Self::CompletionDate),
            "termination_date" => Some(Self::TerminationDate),
            "trust_value" => Some(Self::TrustValue),
            "trust_per_share" => Some(Self::TrustPerShare),
            "shares_outstanding" => Some(Self::SharesOutstanding),
            "deadline_date" => Some(Self::DeadlineDate),
            "ipo_date" => Some(Self::IpoDate),
            "ipo_size" => Some(Self::IpoSize),
            "ipo_price" => Some(Self::IpoPrice),
            _ => None,
        }
    }

    /// Category this field belongs to. Every field maps to exactly one.
    pub fn category(&self) -> FieldCategory {
        match self {
            Self::Target | Self::AnnouncedDate | Self::CompletionDate | Self::TerminationDate => {
                FieldCategory::EventBased
            }
            Self::TrustValue | Self::TrustPerShare | Self::SharesOutstanding => {
                FieldCategory::Periodic
            }
            Self::DeadlineDate => FieldCategory::IpoMutable,
            Self::IpoDate | Self::IpoSize | Self::IpoPrice => FieldCategory::IpoStatic,
        }
    }

    /// All tracked fields, in declaration order.
    pub fn all() -> &'static [TrackedField] {
        &[
            Self::Target,
            Self::AnnouncedDate,
            Self::CompletionDate,
            Self::TerminationDate,
            Self::TrustValue,
            Self::TrustPerShare,
            Self::SharesOutstanding,
            Self::DeadlineDate,
            Self::IpoDate,
            Self::IpoSize,
            Self::IpoPrice,
        ]
    }
}

impl std::fmt::Display for TrackedField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A typed field value. Equality is exact, not fuzzy; the precedence manager's
/// "unchanged" short-circuit depends on that.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum FieldValue {
    Text(String),
    Number(f64),
    Date(NaiveDate),
}

impl FieldValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            Self::Date(d) => Some(*d),
            _ => None,
        }
    }
}

impl std::fmt::Display for FieldValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Text(s) => f.write_str(s),
            Self::Number(n) => write!(f, "{n}"),
            Self::Date(d) => write!(f, "{d}"),
        }
    }
}

/// The value/source/filing-date triplet backing one tracked field.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FieldSlot {
    pub value: Option<FieldValue>,
    pub source: Option<String>,
    pub filing_date: Option<NaiveDate>,
}

impl FieldSlot {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn filled(value: FieldValue, source: impl Into<String>, filing_date: NaiveDate) -> Self {
        Self {
            value: Some(value),
            source: Some(source.into()),
            filing_date: Some(filing_date),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.value.is_none()
    }

    /// Clear the full triplet. Clearing value alone would break the
    /// source-iff-value invariant.
    pub fn clear(&mut self) {
        self.value = None;
        self.source = None;
        self.filing_date = None;
    }
}

/// A proposed new value for a field, as produced by an extractor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProposedUpdate {
    pub value: FieldValue,
    pub source: String,
    pub filing_date: Option<NaiveDate>,
}

impl ProposedUpdate {
    pub fn new(value: FieldValue, source: impl Into<String>, filing_date: Option<NaiveDate>) -> Self {
        Self {
            value,
            source: source.into(),
            filing_date,
        }
    }
}

/// Lifecycle status of a tracked SPAC.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpacStatus {
    /// Still looking for a target.
    Searching,
    /// Definitive agreement announced.
    DealAnnounced,
    /// Business combination closed.
    Completed,
    /// Deal or trust terminated, redemption underway.
    Terminated,
}

impl Default for SpacStatus {
    fn default() -> Self {
        Self::Searching
    }
}

impl SpacStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Searching => "searching",
            Self::DealAnnounced => "deal_announced",
            Self::Completed => "completed",
            Self::Terminated => "terminated",
        }
    }

    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "searching" => Some(Self::Searching),
            "deal_announced" => Some(Self::DealAnnounced),
            "completed" => Some(Self::Completed),
            "terminated" => Some(Self::Terminated),
            _ => None,
        }
    }
}

/// One tracked SPAC entity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpacRecord {
    /// Exchange ticker, the primary key.
    pub ticker: String,
    /// SEC Central Index Key, the registry identifier.
    pub cik: Option<String>,
    /// Company name as registered in the database.
    pub company_name: Option<String>,
    pub status: SpacStatus,
    /// Per-field value/source/date triplets. Absent entries read as empty.
    #[serde(default)]
    pub slots: BTreeMap<TrackedField, FieldSlot>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl SpacRecord {
    pub fn new(ticker: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            ticker: ticker.into(),
            cik: None,
            company_name: None,
            status: SpacStatus::Searching,
            slots: BTreeMap::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_cik(mut self, cik: impl Into<String>) -> Self {
        self.cik = Some(cik.into());
        self
    }

    pub fn with_company_name(mut self, name: impl Into<String>) -> Self {
        self.company_name = Some(name.into());
        self
    }

    pub fn with_status(mut self, status: SpacStatus) -> Self {
        self.status = status;
        self
    }

    pub fn with_slot(mut self, field: TrackedField, slot: FieldSlot) -> Self {
        self.slots.insert(field, slot);
        self
    }

    /// Read access to a field's triplet. Untracked fields read as empty.
    pub fn slot(&self, field: TrackedField) -> FieldSlot {
        self.slots.get(&field).cloned().unwrap_or_default()
    }

    /// Write the full triplet for a field.
    pub fn set_slot(&mut self, field: TrackedField, slot: FieldSlot) {
        self.slots.insert(field, slot);
        self.updated_at = Utc::now();
    }

    /// Clear a field's triplet entirely.
    pub fn clear_field(&mut self, field: TrackedField) {
        self.slots.remove(&field);
        self.updated_at = Utc::now();
    }

    pub fn value(&self, field: TrackedField) -> Option<FieldValue> {
        self.slots.get(&field).and_then(|s| s.value.clone())
    }

    /// Snapshot for audit trails.
    pub fn snapshot(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_roundtrip() {
        for field in TrackedField::all() {
            assert_eq!(TrackedField::from_str(field.as_str()), Some(*field));
        }
        assert_eq!(TrackedField::from_str("nonexistent"), None);
    }

    #[test]
    fn test_every_field_has_one_category() {
        // The match in category() is exhaustive; this pins the mapping.
        assert_eq!(TrackedField::Target.category(), FieldCategory::EventBased);
        assert_eq!(TrackedField::TrustValue.category(), FieldCategory::Periodic);
        assert_eq!(TrackedField::DeadlineDate.category(), FieldCategory::IpoMutable);
        assert_eq!(TrackedField::IpoDate.category(), FieldCategory::IpoStatic);
    }

    #[test]
    fn test_slot_clear_restores_invariant() {
        let mut slot = FieldSlot::filled(
            FieldValue::Number(275_000_000.0),
            "10-Q",
            NaiveDate::from_ymd_opt(2025, 3, 31).unwrap(),
        );
        assert!(!slot.is_empty());
        slot.clear();
        assert!(slot.is_empty());
        assert!(slot.source.is_none());
        assert!(slot.filing_date.is_none());
    }

    #[test]
    fn test_untracked_field_reads_empty() {
        let record = SpacRecord::new("OBA");
        assert!(record.slot(TrackedField::Target).is_empty());
        assert!(record.value(TrackedField::Target).is_none());
    }

    #[test]
    fn test_field_value_exact_equality() {
        assert_eq!(
            FieldValue::Text("Oxley Bridge".to_string()),
            FieldValue::Text("Oxley Bridge".to_string())
        );
        assert_ne!(
            FieldValue::Text("Oxley Bridge".to_string()),
            FieldValue::Text("Oxley Bridge Inc".to_string())
        );
        assert_eq!(FieldValue::Number(10.0), FieldValue::Number(10.0));
        assert_ne!(FieldValue::Number(10.0), FieldValue::Number(10.01));
    }

    #[test]
    fn test_record_snapshot_roundtrip() {
        let record = SpacRecord::new("OBA")
            .with_cik("0001234567")
            .with_slot(
                TrackedField::Target,
                FieldSlot::filled(
                    FieldValue::Text("Oxley Bridge".to_string()),
                    "8-K",
                    NaiveDate::from_ymd_opt(2024, 9, 19).unwrap(),
                ),
            );

        let snapshot = record.snapshot();
        let restored: SpacRecord = serde_json::from_value(snapshot).unwrap();
        assert_eq!(restored.ticker, "OBA");
        assert_eq!(
            restored.value(TrackedField::Target),
            Some(FieldValue::Text("Oxley Bridge".to_string()))
        );
    }
}
