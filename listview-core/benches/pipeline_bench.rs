//! Criterion benchmarks for the list-view pipeline.
//!
//! Benchmarks:
//! 1. Filter only (search + selector + range)
//! 2. Filter + sort on a numeric field
//! 3. Filter + sort on a text field
//! 4. Controller transition (toggle + recompute)

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use listview_core::{
    derive, Bound, Criteria, DynRecord, FieldKind, FieldSpec, ListView, OwnedValue, Range,
    Schema, SortKey,
};

// ── Helpers ──────────────────────────────────────────────────────────

const STATUSES: [&str; 4] = ["pending", "paid", "shipped", "refunded"];

fn schema() -> Schema {
    Schema::new(vec![
        FieldSpec::new("customer", FieldKind::Text).searchable(),
        FieldSpec::new("status", FieldKind::Category),
        FieldSpec::new("total", FieldKind::Number),
    ])
}

fn make_records(n: usize) -> Vec<DynRecord> {
    (0..n)
        .map(|i| {
            let total = 50.0 + (i as f64 * 0.37).sin() * 45.0;
            DynRecord::new(format!("ord-{i:06}"))
                .with("customer", OwnedValue::Text(format!("customer {}", i % 997)))
                .with("status", OwnedValue::Text(STATUSES[i % STATUSES.len()].into()))
                .with("total", OwnedValue::Number(total))
        })
        .collect()
}

fn filter_criteria() -> Criteria {
    Criteria::new()
        .with_search("customer 1")
        .with_selector("status", "paid")
        .with_range(
            "total",
            Range::new(Some(Bound::Number(20.0)), Some(Bound::Number(90.0))),
        )
}

// ── Benchmarks ───────────────────────────────────────────────────────

fn bench_filter(c: &mut Criterion) {
    let mut group = c.benchmark_group("filter");
    let s = schema();
    for n in [1_000, 10_000, 100_000] {
        let records = make_records(n);
        let criteria = filter_criteria();
        group.bench_with_input(BenchmarkId::from_parameter(n), &records, |b, recs| {
            b.iter(|| derive(black_box(recs), &criteria, &s))
        });
    }
    group.finish();
}

fn bench_filter_sort(c: &mut Criterion) {
    let mut group = c.benchmark_group("filter_sort");
    let s = schema();
    let records = make_records(10_000);
    for field in ["total", "customer"] {
        let criteria = Criteria::new()
            .with_selector("status", "shipped")
            .with_sort(SortKey::desc(field));
        group.bench_with_input(BenchmarkId::from_parameter(field), &records, |b, recs| {
            b.iter(|| derive(black_box(recs), &criteria, &s))
        });
    }
    group.finish();
}

fn bench_controller_toggle(c: &mut Criterion) {
    let mut view = ListView::new(make_records(10_000), schema());
    c.bench_function("controller_toggle_10k", |b| {
        b.iter(|| {
            view.toggle_category("status", black_box("refunded"));
        })
    });
}

criterion_group!(benches, bench_filter, bench_filter_sort, bench_controller_toggle);
criterion_main!(benches);
