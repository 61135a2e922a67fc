// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Orientation of line-attached labels.
//!
//! [`auto_rotate`] aligns an item with the on-screen direction of its line and
//! [`keep_upright`] mirrors text that would otherwise read upside down.

use core::f64::consts::{FRAC_PI_2, PI};

use glam::DVec3;
use kurbo::{Rect, Vec2};

#[cfg(not(feature = "std"))]
use kurbo::common::FloatFuncs as _;

use crate::projection::Camera;
use crate::types::{ItemKind, LineSegment};

/// How far, in pixels, an off-screen end is pushed along the line direction.
const FAR_AWAY: f64 = 10_000.0;

/// Fraction of the segment a behind-camera end is pulled toward the other end.
const PULL_IN: f64 = 0.95;

/// Result of [`auto_rotate`].
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Orientation {
    /// Angle of the line on screen, in radians.
    pub angle: f64,
    /// Window position to place the item at. Differs from the projected anchor
    /// when the anchor is behind the camera.
    pub anchor: DVec3,
    /// Window position of the line end the item points at. Used as the
    /// explicit target when following the line.
    pub target: DVec3,
}

/// Compute the on-screen direction of `line` as seen from the item's anchor.
///
/// `anchor_win` is the already projected anchor. When an end of the segment
/// lies behind the camera it is pulled toward the other end so the projected
/// direction stays meaningful. Items following the line may swap to the line
/// start when both the anchor and the end are behind the camera.
pub fn auto_rotate(
    camera: &Camera,
    anchor: DVec3,
    anchor_win: DVec3,
    line: &LineSegment,
    follow_line: bool,
) -> Orientation {
    let mut from = anchor;
    let mut to = line.end;
    let from_behind = camera.is_behind(from);
    let mut to_behind = camera.is_behind(to);
    let mut invert = false;

    if from_behind && to_behind && follow_line {
        to = line.start;
        to_behind = camera.is_behind(to);
        invert = !to_behind;
    }

    if from_behind && !to_behind {
        from += (to - from) * PULL_IN;
    } else if !from_behind && to_behind {
        to += (from - to) * PULL_IN;
    }

    let from_win = camera.project(from);
    let mut target = camera.project(to);
    let mut dir = target - from_win;
    if invert {
        dir = -dir;
    }
    let angle = dir.y.atan2(dir.x);

    let mut anchor_win = anchor_win;
    if from_behind {
        anchor_win = target - dir.normalize_or_zero() * FAR_AWAY;
    } else if to_behind {
        target = from_win + dir.normalize_or_zero() * FAR_AWAY;
    }

    Orientation {
        angle,
        anchor: anchor_win,
        target,
    }
}

/// Keep text readable under rotation.
///
/// Text whose angle falls outside `[-π/2, π/2]` is turned half a revolution
/// and its offset mirrored through the box, so it occupies the same place but
/// reads left to right. Other kinds are returned unchanged.
pub fn keep_upright(kind: ItemKind, angle: f64, offset: Vec2, bounds: Rect) -> (Vec2, f64) {
    if kind != ItemKind::Text || (-FRAC_PI_2..=FRAC_PI_2).contains(&angle) {
        return (offset, angle);
    }
    let mirrored = Vec2::new(
        -offset.x - bounds.x1 - bounds.x0,
        -offset.y - bounds.y1 - bounds.y0,
    );
    let turned = if angle < -FRAC_PI_2 {
        angle + PI
    } else {
        angle - PI
    };
    (mirrored, turned)
}
