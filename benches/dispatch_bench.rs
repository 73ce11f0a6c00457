use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use criterion::{criterion_group, criterion_main, Criterion};
use dispatch_queue::DispatchQueue;
use rand::prelude::*;

const TASKS: usize = 100;

fn throughput_bench(c: &mut Criterion) {
    let mut group = c.benchmark_group("throughput");

    group.bench_function("single_worker", |b| {
        b.iter_batched(
            || DispatchQueue::new(1).unwrap(),
            |queue| {
                let counter = Arc::new(AtomicUsize::new(0));
                for _ in 0..TASKS {
                    let counter = Arc::clone(&counter);
                    queue
                        .dispatch(move || {
                            counter.fetch_add(1, Ordering::SeqCst);
                        })
                        .unwrap();
                }
                drop(queue);
            },
            criterion::BatchSize::SmallInput,
        );
    });

    group.bench_function("cpu_width_pool", |b| {
        b.iter_batched(
            || DispatchQueue::new(num_cpus::get() as u32).unwrap(),
            |queue| {
                let counter = Arc::new(AtomicUsize::new(0));
                for _ in 0..TASKS {
                    let counter = Arc::clone(&counter);
                    queue
                        .dispatch(move || {
                            counter.fetch_add(1, Ordering::SeqCst);
                        })
                        .unwrap();
                }
                drop(queue);
            },
            criterion::BatchSize::SmallInput,
        );
    });

    group.finish();
}

fn mixed_load_bench(c: &mut Criterion) {
    let mut group = c.benchmark_group("mixed_load");

    group.bench_function("cpu_width_pool", |b| {
        b.iter_batched(
            || DispatchQueue::new(num_cpus::get() as u32).unwrap(),
            |queue| {
                let mut rng = thread_rng();
                for _ in 0..TASKS {
                    let spins = rng.gen_range(1u64..4096);
                    queue
                        .dispatch(move || {
                            std::hint::black_box((0..spins).sum::<u64>());
                        })
                        .unwrap();
                }
                drop(queue);
            },
            criterion::BatchSize::SmallInput,
        );
    });

    group.finish();
}

criterion_group!(benches, throughput_bench, mixed_load_bench);
criterion_main!(benches);
