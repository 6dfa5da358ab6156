//! The filing-precedence and conflict-resolution engine.
//!
//! Given a field, its current value/source/date triplet, and a proposed
//! replacement, `decide` determines whether the proposal is authoritative.
//! The check ordering is deliberate: emptiness and identity short-circuit
//! before any precedence math, and recency can override nominal type
//! precedence within a category only by a configurable rank margin, which
//! keeps adjacent-precedence sources filed close together from thrashing.

use tracing::debug;

use crate::domain::models::{
    FieldCategory, FieldSlot, PrecedenceConfig, ProposedUpdate, SpacRecord, TrackedField,
    UpdateDecision,
};

/// Decides and applies field updates according to category precedence rules.
///
/// Stateless aside from configuration; `decide` is a pure function of its
/// inputs and never fails. Unknown fields fall into the periodic category,
/// unknown filing types rank below all known ones, and missing or
/// nonsensical dates degrade to rank-only comparison.
#[derive(Debug, Clone, Default)]
pub struct FilingPrecedenceManager {
    config: PrecedenceConfig,
}

impl FilingPrecedenceManager {
    pub fn new(config: PrecedenceConfig) -> Self {
        Self { config }
    }

    /// Category for a field name. Unmapped names default to periodic.
    pub fn category_of(field: &str) -> FieldCategory {
        TrackedField::from_str(field)
            .map(|f| f.category())
            .unwrap_or(FieldCategory::Periodic)
    }

    /// Evaluate whether `proposed` should replace `current` for `field`.
    pub fn decide(
        &self,
        field: &str,
        current: &FieldSlot,
        proposed: &ProposedUpdate,
    ) -> UpdateDecision {
        let category = Self::category_of(field);
        let decision = |should_update: bool, reason: String| UpdateDecision {
            should_update,
            reason,
            current_source: current.source.clone(),
            current_date: current.filing_date,
            category,
        };

        // Emptiness and identity short-circuit before any precedence math.
        let Some(current_value) = &current.value else {
            return decision(true, "field empty".to_string());
        };
        if *current_value == proposed.value {
            return decision(false, "value unchanged".to_string());
        }
        let Some(current_source) = &current.source else {
            return decision(true, "no source tracked for current value".to_string());
        };

        let rules = category.rules();
        let current_rank = rules.rank(current_source);
        let proposed_rank = rules.rank(&proposed.source);

        // Static IPO facts are set once; only a strictly higher-precedence
        // source may revise them, regardless of recency.
        if category == FieldCategory::IpoStatic {
            return if proposed_rank < current_rank {
                decision(
                    true,
                    format!(
                        "{} outranks {} for static IPO fact",
                        proposed.source, current_source
                    ),
                )
            } else {
                decision(
                    false,
                    format!(
                        "{} does not outrank {} for static IPO fact",
                        proposed.source, current_source
                    ),
                )
            };
        }

        if let (Some(current_date), Some(proposed_date)) = (current.filing_date, proposed.filing_date)
        {
            let days = (proposed_date - current_date).num_days();
            if days > 0 {
                return decision(
                    true,
                    format!("more recent filing wins ({days} days newer)"),
                );
            }
            if days < 0 {
                // An older filing only overrides a newer record when its
                // source is better by at least the configured margin.
                let margin = self.config.recency_rank_margin;
                return if proposed_rank + margin <= current_rank {
                    decision(
                        true,
                        format!(
                            "{} outranks {} by >= {margin} precedence levels despite being older",
                            proposed.source, current_source
                        ),
                    )
                } else {
                    decision(
                        false,
                        format!(
                            "older filing {} lacks the {margin}-level precedence margin over {}",
                            proposed.source, current_source
                        ),
                    )
                };
            }
            // Same-day filings fall through to rank-only comparison.
        }

        if proposed_rank < current_rank {
            decision(
                true,
                format!("{} outranks {}", proposed.source, current_source),
            )
        } else {
            decision(
                false,
                format!("{} does not outrank {}", proposed.source, current_source),
            )
        }
    }

    /// Apply a decision to the record. No-op unless the decision says update;
    /// the write is the only side effect in this module.
    pub fn apply(
        &self,
        record: &mut SpacRecord,
        field: TrackedField,
        decision: &UpdateDecision,
        proposed: &ProposedUpdate,
    ) {
        if !decision.should_update {
            return;
        }
        debug!(
            ticker = %record.ticker,
            field = %field,
            source = %proposed.source,
            reason = %decision.reason,
            "applying field update"
        );
        record.set_slot(
            field,
            FieldSlot {
                value: Some(proposed.value.clone()),
                source: Some(proposed.source.clone()),
                filing_date: proposed.filing_date,
            },
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::FieldValue;
    use chrono::NaiveDate;
    use proptest::prelude::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn filled(value: FieldValue, source: &str, on: NaiveDate) -> FieldSlot {
        FieldSlot::filled(value, source, on)
    }

    fn number(n: f64) -> FieldValue {
        FieldValue::Number(n)
    }

    #[test]
    fn test_empty_field_always_updates() {
        let manager = FilingPrecedenceManager::default();
        let proposed = ProposedUpdate::new(number(1.0), "8-K", Some(date(2026, 1, 5)));
        let decision = manager.decide("trust_value", &FieldSlot::empty(), &proposed);
        assert!(decision.should_update);
        assert_eq!(decision.reason, "field empty");
    }

    #[test]
    fn test_unchanged_value_never_updates() {
        let manager = FilingPrecedenceManager::default();
        let current = filled(number(275e6), "8-K", date(2025, 1, 1));
        // Better source, far newer date: identity still wins.
        let proposed = ProposedUpdate::new(number(275e6), "10-Q", Some(date(2026, 6, 1)));
        let decision = manager.decide("trust_value", &current, &proposed);
        assert!(!decision.should_update);
        assert_eq!(decision.reason, "value unchanged");
    }

    #[test]
    fn test_untracked_source_updates() {
        let manager = FilingPrecedenceManager::default();
        let current = FieldSlot {
            value: Some(number(10.0)),
            source: None,
            filing_date: None,
        };
        let proposed = ProposedUpdate::new(number(10.5), "10-K", Some(date(2026, 2, 1)));
        let decision = manager.decide("trust_per_share", &current, &proposed);
        assert!(decision.should_update);
    }

    #[test]
    fn test_ipo_static_monotonic_precedence() {
        let manager = FilingPrecedenceManager::default();
        // ipo_date order: 424B4 > S-1/A > S-1 > 8-K
        let current = filled(
            FieldValue::Date(date(2025, 6, 26)),
            "S-1/A",
            date(2025, 5, 1),
        );

        // Higher precedence wins even though it is older.
        let better = ProposedUpdate::new(
            FieldValue::Date(date(2025, 6, 27)),
            "424B4",
            Some(date(2025, 4, 1)),
        );
        assert!(manager.decide("ipo_date", &current, &better).should_update);

        // Lower-or-equal precedence never wins, no matter how new.
        let newer_but_worse = ProposedUpdate::new(
            FieldValue::Date(date(2025, 6, 28)),
            "S-1",
            Some(date(2026, 6, 1)),
        );
        assert!(!manager.decide("ipo_date", &current, &newer_but_worse).should_update);

        let same_rank = ProposedUpdate::new(
            FieldValue::Date(date(2025, 6, 29)),
            "S-1/A",
            Some(date(2026, 6, 1)),
        );
        assert!(!manager.decide("ipo_date", &current, &same_rank).should_update);
    }

    #[test]
    fn test_more_recent_wins_within_category() {
        let manager = FilingPrecedenceManager::default();
        let current = filled(number(275e6), "10-Q", date(2025, 11, 14));
        let proposed = ProposedUpdate::new(number(277e6), "8-K", Some(date(2026, 1, 5)));
        let decision = manager.decide("trust_value", &current, &proposed);
        assert!(decision.should_update);
        assert!(decision.reason.contains("more recent"));
    }

    #[test]
    fn test_recency_override_requires_two_rank_gap() {
        let manager = FilingPrecedenceManager::default();
        // Periodic order: 10-Q (0) > 10-K (1) > 8-K (2). Current is the
        // lowest-ranked source with the newest date.
        let current = filled(number(275e6), "8-K", date(2026, 1, 5));

        // Exactly one rank better: must lose.
        let one_better = ProposedUpdate::new(number(276e6), "10-K", Some(date(2025, 11, 14)));
        assert!(!manager.decide("trust_value", &current, &one_better).should_update);

        // Two ranks better: must win despite being older.
        let two_better = ProposedUpdate::new(number(276e6), "10-Q", Some(date(2025, 11, 14)));
        assert!(manager.decide("trust_value", &current, &two_better).should_update);
    }

    #[test]
    fn test_same_day_falls_to_rank_comparison() {
        let manager = FilingPrecedenceManager::default();
        let on = date(2026, 1, 5);
        let current = filled(number(275e6), "8-K", on);
        let proposed = ProposedUpdate::new(number(276e6), "10-K", Some(on));
        // Same day, 10-K outranks 8-K in the periodic order.
        assert!(manager.decide("trust_value", &current, &proposed).should_update);
    }

    #[test]
    fn test_missing_dates_fall_to_rank_comparison() {
        let manager = FilingPrecedenceManager::default();
        let current = filled(number(275e6), "10-K", date(2025, 11, 14));
        let proposed = ProposedUpdate::new(number(276e6), "8-K", None);
        assert!(!manager.decide("trust_value", &current, &proposed).should_update);

        let better = ProposedUpdate::new(number(276e6), "10-Q", None);
        assert!(manager.decide("trust_value", &current, &better).should_update);
    }

    #[test]
    fn test_unknown_field_defaults_to_periodic() {
        assert_eq!(
            FilingPrecedenceManager::category_of("mystery_field"),
            FieldCategory::Periodic
        );
    }

    #[test]
    fn test_unknown_filing_type_ranks_last() {
        let manager = FilingPrecedenceManager::default();
        let current = filled(number(275e6), "10-Q", date(2025, 11, 14));
        let proposed = ProposedUpdate::new(number(276e6), "SC 13D", Some(date(2025, 11, 14)));
        assert!(!manager.decide("trust_value", &current, &proposed).should_update);
    }

    #[test]
    fn test_apply_writes_full_triplet() {
        let manager = FilingPrecedenceManager::default();
        let mut record = SpacRecord::new("OBA");
        let proposed = ProposedUpdate::new(number(275e6), "10-Q", Some(date(2025, 11, 14)));
        let decision = manager.decide(
            "trust_value",
            &record.slot(TrackedField::TrustValue),
            &proposed,
        );
        manager.apply(&mut record, TrackedField::TrustValue, &decision, &proposed);

        let slot = record.slot(TrackedField::TrustValue);
        assert_eq!(slot.value, Some(number(275e6)));
        assert_eq!(slot.source.as_deref(), Some("10-Q"));
        assert_eq!(slot.filing_date, Some(date(2025, 11, 14)));
    }

    #[test]
    fn test_apply_is_noop_on_rejection() {
        let manager = FilingPrecedenceManager::default();
        let mut record = SpacRecord::new("OBA").with_slot(
            TrackedField::TrustValue,
            filled(number(275e6), "10-Q", date(2025, 11, 14)),
        );
        let before = record.slot(TrackedField::TrustValue);
        let proposed = ProposedUpdate::new(number(276e6), "8-K", Some(date(2025, 1, 1)));
        let decision = manager.decide("trust_value", &before, &proposed);
        assert!(!decision.should_update);
        manager.apply(&mut record, TrackedField::TrustValue, &decision, &proposed);
        assert_eq!(record.slot(TrackedField::TrustValue), before);
    }

    proptest! {
        /// decide() is a pure function: identical inputs, identical output.
        #[test]
        fn prop_decide_is_idempotent(
            current_value in proptest::option::of(-1e9..1e9f64),
            proposed_value in -1e9..1e9f64,
            current_source in proptest::option::of(prop::sample::select(vec!["10-Q", "10-K", "8-K", "425", "S-1"])),
            proposed_source in prop::sample::select(vec!["10-Q", "10-K", "8-K", "425", "S-1"]),
            current_days in proptest::option::of(0i64..3000),
            proposed_days in proptest::option::of(0i64..3000),
        ) {
            let manager = FilingPrecedenceManager::default();
            let epoch = date(2018, 1, 1);
            let current = FieldSlot {
                value: current_value.map(FieldValue::Number),
                source: current_source.map(String::from),
                filing_date: current_days.map(|d| epoch + chrono::Duration::days(d)),
            };
            let proposed = ProposedUpdate::new(
                FieldValue::Number(proposed_value),
                proposed_source,
                proposed_days.map(|d| epoch + chrono::Duration::days(d)),
            );

            let first = manager.decide("trust_value", &current, &proposed);
            let second = manager.decide("trust_value", &current, &proposed);
            prop_assert_eq!(first.should_update, second.should_update);
            prop_assert_eq!(first.reason, second.reason);
        }

        /// An empty current field accepts any proposal.
        #[test]
        fn prop_empty_field_accepts_anything(
            proposed_value in -1e9..1e9f64,
            proposed_source in "[A-Z0-9-]{1,8}",
        ) {
            let manager = FilingPrecedenceManager::default();
            let proposed = ProposedUpdate::new(
                FieldValue::Number(proposed_value),
                proposed_source,
                None,
            );
            prop_assert!(manager.decide("trust_value", &FieldSlot::empty(), &proposed).should_update);
        }

        /// Identical values never update regardless of everything else.
        #[test]
        fn prop_unchanged_never_updates(
            value in -1e9..1e9f64,
            current_source in prop::sample::select(vec!["10-Q", "10-K", "8-K"]),
            proposed_source in prop::sample::select(vec!["10-Q", "10-K", "8-K"]),
            proposed_days in 0i64..3000,
        ) {
            let manager = FilingPrecedenceManager::default();
            let epoch = date(2018, 1, 1);
            let current = filled(FieldValue::Number(value), current_source, epoch);
            let proposed = ProposedUpdate::new(
                FieldValue::Number(value),
                proposed_source,
                Some(epoch + chrono::Duration::days(proposed_days)),
            );
            prop_assert!(!manager.decide("trust_value", &current, &proposed).should_update);
        }
    }
}
