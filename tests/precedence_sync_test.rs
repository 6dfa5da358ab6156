//! Precedence decisions applied against records round-tripped through the
//! sqlite store, as the sync job drives them.

use chrono::NaiveDate;

use precedent::adapters::sqlite::{create_migrated_test_pool, SqliteRecordStore};
use precedent::domain::models::{FieldValue, ProposedUpdate, SpacRecord, TrackedField};
use precedent::domain::ports::RecordStore;
use precedent::services::numeric;
use precedent::services::FilingPrecedenceManager;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

#[tokio::test]
async fn test_extraction_to_persistence_flow() {
    let pool = create_migrated_test_pool().await.unwrap();
    let store = SqliteRecordStore::new(pool);
    let manager = FilingPrecedenceManager::default();

    store.commit(&SpacRecord::new("OBA")).await.unwrap();
    let mut record = store.get_by_ticker("OBA").await.unwrap().unwrap();

    // Extraction output arrives formatted; the normalizer gates it.
    let trust = numeric::parse_str("$275M").unwrap();
    let proposed = ProposedUpdate::new(
        FieldValue::Number(trust),
        "10-Q",
        Some(date(2025, 11, 14)),
    );
    let decision = manager.decide(
        "trust_value",
        &record.slot(TrackedField::TrustValue),
        &proposed,
    );
    assert!(decision.should_update, "empty field accepts the first value");
    manager.apply(&mut record, TrackedField::TrustValue, &decision, &proposed);
    store.commit(&record).await.unwrap();

    // A newer 8-K restates the value: recency wins within the category.
    let mut record = store.get_by_ticker("OBA").await.unwrap().unwrap();
    let newer = ProposedUpdate::new(
        FieldValue::Number(277e6),
        "8-K",
        Some(date(2026, 1, 5)),
    );
    let decision = manager.decide(
        "trust_value",
        &record.slot(TrackedField::TrustValue),
        &newer,
    );
    assert!(decision.should_update);
    manager.apply(&mut record, TrackedField::TrustValue, &decision, &newer);
    store.commit(&record).await.unwrap();

    // An older 10-K cannot displace it: only one rank better than the 8-K.
    let mut record = store.get_by_ticker("OBA").await.unwrap().unwrap();
    let older = ProposedUpdate::new(
        FieldValue::Number(276e6),
        "10-K",
        Some(date(2025, 12, 31)),
    );
    let decision = manager.decide(
        "trust_value",
        &record.slot(TrackedField::TrustValue),
        &older,
    );
    assert!(!decision.should_update);
    manager.apply(&mut record, TrackedField::TrustValue, &decision, &older);
    store.commit(&record).await.unwrap();

    let final_record = store.get_by_ticker("OBA").await.unwrap().unwrap();
    let slot = final_record.slot(TrackedField::TrustValue);
    assert_eq!(slot.value, Some(FieldValue::Number(277e6)));
    assert_eq!(slot.source.as_deref(), Some("8-K"));
    assert_eq!(slot.filing_date, Some(date(2026, 1, 5)));
}
