// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use std::time::Duration;

use criterion::{Criterion, Throughput, black_box, criterion_group, criterion_main};
use glam::{DMat4, DVec3};
use kurbo::Rect;
use understory_declutter::{
    Declutter, FrameView, GroupId, ItemId, ItemKind, LayoutFlags, LayoutOptions, LineSegment,
    OccupancyBackend, RecordingTarget, RenderItem, ViewportId,
};

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

fn frame() -> FrameView {
    let view = DMat4::look_at_rh(DVec3::new(0.0, -400.0, 800.0), DVec3::ZERO, DVec3::Z);
    let projection = DMat4::perspective_rh_gl(0.9, 16.0 / 9.0, 1.0, 5_000.0);
    FrameView::new(view, projection, Rect::new(0.0, 0.0, 1920.0, 1080.0))
}

/// Map features with an icon and a name each; some follow a route line.
fn gen_features(count: usize, seed: u64) -> Vec<RenderItem> {
    let mut rng = Rng::new(seed);
    let mut items = Vec::with_capacity(count * 2);
    for i in 0..count {
        let anchor = DVec3::new(
            rng.next_f64() * 1600.0 - 800.0,
            rng.next_f64() * 1600.0 - 800.0,
            0.0,
        );
        let depth = rng.next_f64() as f32;
        let group = GroupId::from_raw(i as i64);
        let on_route = i % 5 == 0;
        items.push(RenderItem {
            id: ItemId(2 * i as u64),
            kind: ItemKind::Icon,
            bounds: Rect::new(-8.0, -8.0, 8.0, 8.0),
            anchor,
            group,
            depth,
            traversal: i as u32,
            ..Default::default()
        });
        items.push(RenderItem {
            id: ItemId(2 * i as u64 + 1),
            kind: ItemKind::Text,
            bounds: Rect::new(10.0, -6.0, 70.0, 6.0),
            anchor,
            group,
            depth,
            traversal: i as u32,
            sibling: 1,
            flags: if on_route {
                LayoutFlags::AUTO_ROTATE | LayoutFlags::AUTO_FOLLOW_LINE
            } else {
                LayoutFlags::empty()
            },
            line: on_route.then(|| LineSegment {
                start: anchor,
                end: anchor + DVec3::new(300.0, 120.0, 0.0),
            }),
            ..Default::default()
        });
    }
    items
}

fn bench_frame(c: &mut Criterion) {
    let mut group = c.benchmark_group("declutter_frame");
    let frame = frame();
    for &n in &[250usize, 2_000] {
        let items = gen_features(n, 0xC1A5_7E55_9999_ABCD);
        group.throughput(Throughput::Elements(items.len() as u64));

        for (name, occupancy) in [
            ("linear", OccupancyBackend::Linear),
            ("grid", OccupancyBackend::Grid { cell_size: 64.0 }),
        ] {
            let mut declutter = Declutter::new(LayoutOptions {
                occupancy,
                ..Default::default()
            });
            let mut tick = 0_u64;
            group.bench_function(format!("sort_{name}_n{n}"), |b| {
                b.iter(|| {
                    tick += 16;
                    let layout = declutter
                        .sort(ViewportId(0), &frame, &items, Duration::from_millis(tick))
                        .map(|l| l.stats.drawn);
                    black_box(layout)
                });
            });
        }

        let mut declutter = Declutter::default();
        let _ = declutter.sort(ViewportId(0), &frame, &items, Duration::ZERO);
        group.bench_function(format!("emit_n{n}"), |b| {
            b.iter(|| {
                let mut target = RecordingTarget::default();
                black_box(declutter.draw(ViewportId(0), frame.viewport, &mut target))
            });
        });
    }
    group.finish();
}

criterion_group!(benches, bench_frame);
criterion_main!(benches);
