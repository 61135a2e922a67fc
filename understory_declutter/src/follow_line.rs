// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Line-following placement.
//!
//! A label attached to a line feature (an airway segment, a route leg) should
//! stay on screen while its anchor drifts past a viewport edge. The resolver
//! slides the label along the line until its box touches the edge again.

use glam::DVec3;
use kurbo::{Rect, Vec2};

/// Window-space candidates for the point a label slides toward.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct LineTargets {
    /// Target fixed by auto-rotation. Takes precedence when present.
    pub explicit: Option<DVec3>,
    /// Projected line end.
    pub end: DVec3,
    /// Projected line start, used when the end is on the wrong side or out of depth range.
    pub start: DVec3,
}

fn in_depth_range(z: f64) -> bool {
    (-1.0..=1.0).contains(&z)
}

fn axis(v: DVec3, i: usize) -> f64 {
    if i == 0 { v.x } else { v.y }
}

/// Offset keeping a line-attached box inside `viewport`.
///
/// `bounds` is the item's box relative to its anchor (rotation applied, offset
/// not), `anchor` the anchor in window coordinates and `offset` the current
/// pixel offset. Edges are tested left, bottom, right, top; the first edge whose
/// correction also satisfies the adjacent edges wins. When the line target lies
/// more than one box extent beyond the edge, the label snaps to the target.
///
/// Returns `offset` unchanged when the anchor lies outside the `[-1, 1]` depth range.
pub fn resolve_offset(
    bounds: Rect,
    viewport: Rect,
    anchor: DVec3,
    targets: &LineTargets,
    offset: Vec2,
) -> Vec2 {
    if !in_depth_range(anchor.z) {
        return offset;
    }

    let lo = [
        viewport.x0 - bounds.x0 + offset.x,
        viewport.y0 - bounds.y0 + offset.y,
    ];
    let hi = [
        viewport.x1 - bounds.x1 + offset.x,
        viewport.y1 - bounds.y1 + offset.y,
    ];
    let extent = [bounds.width(), bounds.height()];
    // (axis, limit for the anchor, direction back inside)
    let edges = [
        (0, lo[0], 1.0),
        (1, lo[1], 1.0),
        (0, hi[0], -1.0),
        (1, hi[1], -1.0),
    ];

    let mut out = [offset.x, offset.y];
    let mut target: Option<DVec3> = None;

    for (a, limit, sign) in edges {
        let c = 1 - a;
        let loc_a = axis(anchor, a);
        if (loc_a - limit) * sign >= 0.0 {
            continue;
        }

        // The target is chosen once, by the first violated edge.
        let pt = *target.get_or_insert_with(|| {
            targets.explicit.unwrap_or_else(|| {
                let end = targets.end;
                let wrong_side = (axis(end, a) - loc_a) * sign < 0.0;
                if wrong_side || !in_depth_range(end.z) {
                    targets.start
                } else {
                    end
                }
            })
        });

        let to_pt = [pt.x - anchor.x, pt.y - anchor.y];
        if (axis(pt, a) - limit) * sign < -extent[a] {
            // Out of screen: use the closest point.
            out = to_pt;
            break;
        }

        let ratio = (limit - loc_a) / (axis(pt, a) - loc_a);
        if ratio < 1.0 {
            out[a] = limit - loc_a;
            out[c] = ratio * to_pt[c];
        } else {
            out = to_pt;
        }
        let cross = axis(anchor, c) + out[c];
        if ratio >= 1.0 || (cross > lo[c] && cross < hi[c]) {
            break;
        }
    }

    Vec2::new(out[0], out[1])
}
