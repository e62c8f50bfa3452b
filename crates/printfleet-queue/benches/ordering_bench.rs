// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Criterion benchmarks for the queue page hot paths: classifying a snapshot,
// sorting the pending and history lists, and planning a drag reorder.

use chrono::{Duration, TimeZone, Utc};
use criterion::{Criterion, black_box, criterion_group, criterion_main};
use serde_json::json;

use printfleet_core::types::{
    HistorySortField, PendingSortField, QueueItem, QueueStatus, SortDirection,
};
use printfleet_queue::classify;
use printfleet_queue::order::{TimeContext, plan_reorder, sort_history, sort_pending};

// ---------------------------------------------------------------------------
// Helper: a synthetic fleet queue
// ---------------------------------------------------------------------------

/// `n` items cycling through every status, with names, printers and
/// schedules spread out so no sort key is trivially ordered.
fn synthetic_queue(n: i64) -> Vec<QueueItem> {
    let base = Utc.with_ymd_and_hms(2026, 5, 10, 12, 0, 0).unwrap();
    (0..n)
        .map(|i| {
            let status = QueueStatus::ALL[(i % 6) as usize];
            let scheduled =
                (i % 3 == 0).then(|| (base + Duration::minutes((i * 37) % 900)).to_rfc3339());
            let printer_id = (i % 4 != 0).then_some(i % 12);
            let completed = status
                .is_terminal()
                .then(|| (base - Duration::minutes((i * 53) % 4000)).to_rfc3339());
            serde_json::from_value(json!({
                "id": i + 1,
                "status": status.as_str(),
                "position": ((i * 7919) % n) as i32,
                "printer_id": printer_id,
                "printer_name": format!("Printer {}", i % 12),
                "archive_id": 1000 + i,
                "archive_name": format!("Part {:04}", (i * 31) % 1000),
                "scheduled_time": scheduled,
                "created_at": (base - Duration::hours(i % 72)).to_rfc3339(),
                "completed_at": completed,
            }))
            .expect("synthetic item")
        })
        .collect()
}

fn bench_classify(c: &mut Criterion) {
    let items = synthetic_queue(2_000);
    c.bench_function("classify (2000 items)", |b| {
        b.iter(|| classify(black_box(items.clone())));
    });
}

fn bench_sort_pending(c: &mut Criterion) {
    let pending = classify(synthetic_queue(3_000)).pending;
    let time = TimeContext::new(
        Utc.with_ymd_and_hms(2026, 5, 10, 12, 0, 0).unwrap(),
        Some(Duration::days(180)),
    );
    for field in PendingSortField::ALL {
        c.bench_function(&format!("sort_pending ({})", field.as_str()), |b| {
            b.iter(|| {
                let mut items = pending.clone();
                sort_pending(black_box(&mut items), field, SortDirection::Asc, &time);
                items
            });
        });
    }
}

fn bench_sort_history(c: &mut Criterion) {
    let history = classify(synthetic_queue(3_000)).history;
    c.bench_function("sort_history (date desc)", |b| {
        b.iter(|| {
            let mut items = history.clone();
            sort_history(black_box(&mut items), HistorySortField::Date, SortDirection::Desc);
            items
        });
    });
}

fn bench_plan_reorder(c: &mut Criterion) {
    let pending = classify(synthetic_queue(3_000)).pending;
    let last = pending.len() - 1;
    c.bench_function("plan_reorder (last to first)", |b| {
        b.iter(|| plan_reorder(black_box(&pending), &pending, last, 0, SortDirection::Asc));
    });
}

criterion_group!(
    benches,
    bench_classify,
    bench_sort_pending,
    bench_sort_history,
    bench_plan_reorder
);
criterion_main!(benches);
