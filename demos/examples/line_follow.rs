// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Line following.
//!
//! A route label anchored at the start of its leg stays on screen while the
//! camera pans away from the anchor, sliding along the leg and rotating with it.
//!
//! Run:
//! - `cargo run -p understory_demos --example line_follow`

use std::time::Duration;

use glam::{DMat4, DVec3};
use kurbo::Rect;
use understory_declutter::{
    Declutter, FrameView, ItemId, ItemKind, LayoutFlags, LineSegment, RenderItem, ViewportId,
};

fn main() {
    env_logger::init();

    let viewport = Rect::new(0.0, 0.0, 320.0, 240.0);
    let projection = DMat4::orthographic_rh_gl(0.0, 320.0, 0.0, 240.0, 0.1, 100.0);
    let leg = LineSegment {
        start: DVec3::new(40.0, 40.0, -1.0),
        end: DVec3::new(600.0, 200.0, -1.0),
    };
    let label = RenderItem {
        id: ItemId(1),
        kind: ItemKind::Text,
        bounds: Rect::new(0.0, -6.0, 72.0, 6.0),
        anchor: leg.start,
        flags: LayoutFlags::AUTO_ROTATE | LayoutFlags::AUTO_FOLLOW_LINE,
        line: Some(leg),
        ..Default::default()
    };

    let mut declutter = Declutter::default();
    for step in 0..6_u32 {
        // Pan right by 60 px per step.
        let pan = f64::from(step) * 60.0;
        let view = DMat4::from_translation(DVec3::new(-pan, 0.0, 0.0));
        let frame = FrameView::new(view, projection, viewport);
        let now = Duration::from_millis(u64::from(step) * 16);
        let layout = declutter
            .sort(ViewportId(0), &frame, std::slice::from_ref(&label), now)
            .expect("usable frame");
        match layout.passed.first() {
            Some(p) => println!(
                "pan {pan:>5}: drawn at ({:.1}, {:.1}), angle {:.3} rad, offset ({:.1}, {:.1})",
                p.position.x, p.position.y, p.angle, p.offset.x, p.offset.y
            ),
            None => println!("pan {pan:>5}: off screen"),
        }
    }
}
