//! Benchmarks for notification fan-out and event dispatch.
//!
//! Run with: cargo bench -p wren-runtime --bench notify_bench

use std::cell::Cell;
use std::hint::black_box;
use std::rc::Rc;

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use serde_json::json;
use wren_core::{Event, EventDispatcher, Listener};
use wren_runtime::{Observable, ObservableList, ObservableValue, Subscription};

// =============================================================================
// ObservableValue::set fan-out
// =============================================================================

fn bench_value_set(c: &mut Criterion) {
    let mut group = c.benchmark_group("value/set");

    for subscribers in [1usize, 8, 64] {
        group.throughput(Throughput::Elements(subscribers as u64));
        let value = ObservableValue::new(0u64);
        let sink = Rc::new(Cell::new(0u64));
        let _subs: Vec<Subscription> = (0..subscribers)
            .map(|_| {
                let sink = Rc::clone(&sink);
                value.subscribe(move |v: &u64| sink.set(sink.get().wrapping_add(*v)))
            })
            .collect();

        let mut next = 0u64;
        group.bench_with_input(
            BenchmarkId::new("subscribers", subscribers),
            &value,
            |b, value| {
                b.iter(|| {
                    next += 1;
                    value.set(black_box(next));
                });
            },
        );
    }

    group.finish();
}

fn bench_value_set_unchanged(c: &mut Criterion) {
    let value = ObservableValue::new(7u64);
    let _sub = value.subscribe(|v: &u64| {
        black_box(v);
    });
    c.bench_function("value/set_unchanged", |b| b.iter(|| value.set(black_box(7))));
}

// =============================================================================
// ObservableList: per-mutation vs batched
// =============================================================================

fn bench_list_push(c: &mut Criterion) {
    let mut group = c.benchmark_group("list/push_100");
    group.throughput(Throughput::Elements(100));

    group.bench_function("unbatched", |b| {
        b.iter(|| {
            let list = ObservableList::new(Vec::with_capacity(100));
            let _sub = list.subscribe(|items: &Vec<u32>| {
                black_box(items.len());
            });
            for i in 0..100 {
                list.push(i);
            }
            black_box(list.len())
        });
    });

    group.bench_function("batched", |b| {
        b.iter(|| {
            let list = ObservableList::new(Vec::with_capacity(100));
            let _sub = list.subscribe(|items: &Vec<u32>| {
                black_box(items.len());
            });
            list.batch_update(|list| {
                for i in 0..100 {
                    list.push(i);
                }
            });
            black_box(list.len())
        });
    });

    group.finish();
}

// =============================================================================
// EventDispatcher::dispatch fan-out
// =============================================================================

fn bench_dispatch(c: &mut Criterion) {
    let mut group = c.benchmark_group("dispatch");

    for listeners in [1usize, 8, 64] {
        group.throughput(Throughput::Elements(listeners as u64));
        let dispatcher = EventDispatcher::new();
        for _ in 0..listeners {
            let listener = Listener::new(|event| {
                black_box(event.payload());
                Ok(())
            });
            dispatcher
                .add_listener("TICK", &listener)
                .expect("valid event name");
        }
        let event = Event::with_payload("TICK", json!({ "amount": 1 })).expect("valid event name");

        group.bench_with_input(
            BenchmarkId::new("listeners", listeners),
            &event,
            |b, event| {
                b.iter(|| black_box(dispatcher.dispatch(event)));
            },
        );
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_value_set,
    bench_value_set_unchanged,
    bench_list_push,
    bench_dispatch,
);
criterion_main!(benches);
