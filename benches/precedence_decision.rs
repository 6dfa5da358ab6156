use chrono::NaiveDate;
use criterion::{black_box, criterion_group, criterion_main, Criterion};

use precedent::domain::models::{FieldSlot, FieldValue, ProposedUpdate};
use precedent::services::FilingPrecedenceManager;

fn bench_decide(c: &mut Criterion) {
    let manager = FilingPrecedenceManager::default();
    let current = FieldSlot::filled(
        FieldValue::Number(275e6),
        "8-K",
        NaiveDate::from_ymd_opt(2026, 1, 5).unwrap(),
    );
    let proposed = ProposedUpdate::new(
        FieldValue::Number(276e6),
        "10-Q",
        Some(NaiveDate::from_ymd_opt(2025, 11, 14).unwrap()),
    );

    c.bench_function("decide recency override", |b| {
        b.iter(|| {
            manager.decide(
                black_box("trust_value"),
                black_box(&current),
                black_box(&proposed),
            )
        })
    });
}

criterion_group!(benches, bench_decide);
criterion_main!(benches);
