// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Declutter basics.
//!
//! Load options from JSON, lay out a handful of overlapping labels over a few
//! frames, and print what gets drawn and how strongly.
//!
//! Run:
//! - `RUST_LOG=trace cargo run -p understory_demos --example declutter_basics`

use std::time::Duration;

use glam::{DMat4, DVec3};
use kurbo::Rect;
use understory_declutter::{
    Declutter, FrameView, GroupId, ItemId, ItemKind, LayoutOptions, RecordingTarget, RenderItem,
    ViewportId,
};

const OPTIONS: &str = r#"{
    "max_objects": 50,
    "in_animation_time": 0.25,
    "out_animation_time": 0.5,
    "snap_to_pixel": true
}"#;

fn feature(id: u64, x: f64, y: f64, depth: f32, name_width: f64) -> [RenderItem; 2] {
    let group = GroupId::from_raw(id as i64);
    let anchor = DVec3::new(x, y, -1.0);
    [
        RenderItem {
            id: ItemId(id * 10),
            kind: ItemKind::Icon,
            bounds: Rect::new(-6.0, -6.0, 6.0, 6.0),
            anchor,
            group,
            depth,
            ..Default::default()
        },
        RenderItem {
            id: ItemId(id * 10 + 1),
            kind: ItemKind::Text,
            bounds: Rect::new(8.0, -5.0, 8.0 + name_width, 5.0),
            anchor,
            group,
            depth,
            sibling: 1,
            ..Default::default()
        },
    ]
}

fn main() {
    env_logger::init();

    let options: LayoutOptions = serde_json::from_str(OPTIONS).expect("valid options");
    let mut declutter = Declutter::new(options);

    let viewport = Rect::new(0.0, 0.0, 400.0, 200.0);
    let projection = DMat4::orthographic_rh_gl(0.0, 400.0, 0.0, 200.0, 0.1, 100.0);
    let frame = FrameView::new(DMat4::IDENTITY, projection, viewport);

    let mut items = Vec::new();
    items.extend(feature(1, 100.0, 100.0, 0.1, 60.0));
    items.extend(feature(2, 140.0, 104.0, 0.2, 40.0));
    items.extend(feature(3, 300.0, 60.0, 0.3, 50.0));

    for frame_no in 0..4_u64 {
        let now = Duration::from_millis(frame_no * 100);
        let layout = declutter
            .sort(ViewportId(0), &frame, &items, now)
            .expect("usable frame");
        println!(
            "frame {frame_no}: {} passed, {} failed, {} drawn",
            layout.stats.passed, layout.stats.failed, layout.stats.drawn
        );
        for item in &layout.draw {
            println!(
                "  {:?} passed={} opacity={:.2} scale={:.2}",
                item.id, item.passed, item.opacity, item.scale
            );
        }
    }

    let mut target = RecordingTarget::default();
    let stats = declutter.draw(ViewportId(0), viewport, &mut target);
    println!("emitted {} items with {} state changes", stats.drawn, stats.state_changes);

    // Feature 2 overlaps feature 1 and is hidden as a unit.
    let layout = declutter.layout(ViewportId(0)).unwrap();
    assert!(layout.is_passed(ItemId(10)) && layout.is_passed(ItemId(11)));
    assert!(layout.is_failed(ItemId(20)) && layout.is_failed(ItemId(21)));
}
