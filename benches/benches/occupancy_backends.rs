// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use criterion::{BatchSize, Criterion, Throughput, black_box, criterion_group, criterion_main};
use understory_occupancy::{Aabb, Backend, FlatScan, Occupancy, UniformGrid};

#[derive(Clone)]
struct Rng(u64);

impl Rng {
    fn new(seed: u64) -> Self {
        Self(seed)
    }
    fn next_u64(&mut self) -> u64 {
        let mut x = self.0;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.0 = x;
        x
    }
    fn next_f64(&mut self) -> f64 {
        let v = self.next_u64() >> 11;
        (v as f64) / ((1u64 << 53) as f64)
    }
}

/// Label-sized boxes scattered over a 1920x1080 window.
fn gen_label_boxes(count: usize, seed: u64) -> Vec<(Aabb, Option<i64>)> {
    let mut rng = Rng::new(seed);
    (0..count)
        .map(|i| {
            let x = rng.next_f64() * 1900.0;
            let y = rng.next_f64() * 1060.0;
            let w = 20.0 + rng.next_f64() * 100.0;
            let h = 10.0 + rng.next_f64() * 10.0;
            // Every third box shares a feature with its predecessor.
            let group = if i % 3 == 0 { None } else { Some((i / 3) as i64) };
            (Aabb::from_xywh(x, y, w, h), group)
        })
        .collect()
}

/// Greedy acceptance, the way a declutter pass drives the index.
fn greedy<B: Backend>(occ: &mut Occupancy<i64, B>, boxes: &[(Aabb, Option<i64>)]) -> usize {
    occ.clear();
    let mut accepted = 0;
    for &(aabb, group) in boxes {
        if occ.is_clear(aabb, group) {
            occ.insert(aabb, group);
            accepted += 1;
        }
    }
    accepted
}

fn bench_greedy(c: &mut Criterion) {
    let mut group = c.benchmark_group("occupancy_greedy");
    for &n in &[100usize, 1_000, 5_000] {
        let boxes = gen_label_boxes(n, 0xCAFE_F00D_DEAD_BEEF);
        group.throughput(Throughput::Elements(n as u64));

        group.bench_function(format!("flat_n{n}"), |b| {
            b.iter_batched(
                Occupancy::<i64, FlatScan>::new,
                |mut occ| black_box(greedy(&mut occ, &boxes)),
                BatchSize::SmallInput,
            );
        });

        for cell in [32.0, 128.0] {
            group.bench_function(format!("grid{cell}_n{n}"), |b| {
                b.iter_batched(
                    || Occupancy::<i64, UniformGrid>::with_backend(UniformGrid::new(cell, cell)),
                    |mut occ| black_box(greedy(&mut occ, &boxes)),
                    BatchSize::SmallInput,
                );
            });
        }
    }
    group.finish();
}

fn bench_reuse(c: &mut Criterion) {
    // Steady state: the index is cleared and refilled every frame.
    let mut group = c.benchmark_group("occupancy_reuse");
    let boxes = gen_label_boxes(2_000, 0xBADC_F00D_1234_5678);
    group.throughput(Throughput::Elements(boxes.len() as u64));

    let mut flat: Occupancy<i64> = Occupancy::new();
    group.bench_function("flat", |b| b.iter(|| black_box(greedy(&mut flat, &boxes))));

    let mut grid: Occupancy<i64, UniformGrid> = Occupancy::with_backend(UniformGrid::new(64.0, 64.0));
    group.bench_function("grid64", |b| b.iter(|| black_box(greedy(&mut grid, &boxes))));
    group.finish();
}

criterion_group!(benches, bench_greedy, bench_reuse);
criterion_main!(benches);
