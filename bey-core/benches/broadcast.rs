//! Broadcast and selector-filtering cost.

use std::hint::black_box;
use std::sync::Arc;

use bey_core::config::Config;
use bey_core::store::{update, Listener, StateCell};
use bey_core::subscription::{DirtyFlag, SelectorSubscription};
use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};

#[derive(Clone, PartialEq)]
struct State {
    count: u64,
    other: u64,
}

fn bench_set(c: &mut Criterion) {
    let mut group = c.benchmark_group("set");
    for listeners in [1usize, 8, 64] {
        let cell = StateCell::with_config(State { count: 0, other: 0 }, Config::production());
        let handles: Vec<Listener> = (0..listeners).map(|_| Listener::new(|| {})).collect();
        for listener in &handles {
            cell.on(listener);
        }
        group.bench_with_input(BenchmarkId::from_parameter(listeners), &listeners, |b, _| {
            b.iter(|| cell.set(black_box(State { count: 1, other: 0 })))
        });
    }
    group.finish();
}

fn bench_selector_filtering(c: &mut Criterion) {
    let mut group = c.benchmark_group("update_unrelated_field");
    for subscriptions in [1usize, 8, 64] {
        let cell = StateCell::with_config(State { count: 0, other: 0 }, Config::production());
        let host = Arc::new(DirtyFlag::new());
        let views: Vec<_> = (0..subscriptions)
            .map(|_| SelectorSubscription::new(cell.clone(), |s| s.count, host.clone()))
            .collect();
        for view in &views {
            view.mount().expect("fresh subscription");
        }
        group.bench_with_input(
            BenchmarkId::from_parameter(subscriptions),
            &subscriptions,
            |b, _| b.iter(|| update(&cell, |s| s.other += 1)),
        );
        assert_eq!(host.request_count(), 0);
    }
    group.finish();
}

criterion_group!(benches, bench_set, bench_selector_filtering);
criterion_main!(benches);
