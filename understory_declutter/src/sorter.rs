// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The greedy occlusion pass.
//!
//! Candidates are visited in test order. Each is placed in window space,
//! culled against the viewport and accepted if its box is clear of every box
//! accepted before it. Accepted and rejected items are then animated into the
//! frame's draw list.

use core::time::Duration;

use kurbo::{Affine, Point, Rect, Vec2};
use understory_occupancy::Aabb;

#[cfg(not(feature = "std"))]
use kurbo::common::FloatFuncs as _;

use crate::animate::{advance_in, advance_out, retained_after_failing};
use crate::follow_line::{LineTargets, resolve_offset};
use crate::options::LayoutOptions;
use crate::projection::Camera;
use crate::rotate::{auto_rotate, keep_upright};
use crate::session::ViewportSession;
use crate::sort::{Comparator, by_depth, by_priority, sort_indices};
use crate::types::{DrawItem, FrameView, LayoutFlags, Placement, RenderItem};

/// Margin around the box of an item that was visible last frame.
const VISIBLE_MARGIN: f64 = 1.0;
/// Margin around the box of an item that was hidden last frame.
const HIDDEN_MARGIN: f64 = 3.0;

/// Inputs of one pass that come from the owning context.
#[derive(Copy, Clone, Debug)]
pub(crate) struct PassConfig<'a> {
    pub(crate) options: &'a LayoutOptions,
    pub(crate) enabled: bool,
    pub(crate) comparator: Option<Comparator>,
}

/// Per-frame quantities shared by every candidate.
struct FrameContext {
    camera: Camera,
    window: Rect,
    reference_scale: Vec2,
    snap: bool,
}

/// Box reserved in window space for a placed item.
///
/// Degenerate item bounds reserve nothing.
fn declutter_box(bounds: Rect, placed: Rect, anchor: Point, margin: f64) -> Aabb {
    if !(bounds.width() > 0.0 && bounds.height() > 0.0) {
        return Aabb::EMPTY;
    }
    Aabb::new(
        (anchor.x + placed.x0).floor() - margin,
        (anchor.y + placed.y0).floor() - margin,
        (anchor.x + placed.x1).ceil() + margin,
        (anchor.y + placed.y1).ceil() + margin,
    )
}

/// Whether an item lies entirely outside `window`. Edges count as inside.
fn outside(window: Rect, aabb: Aabb, anchor: Point) -> bool {
    if aabb.is_empty() {
        return !(anchor.x >= window.x0
            && anchor.x <= window.x1
            && anchor.y >= window.y0
            && anchor.y <= window.y1);
    }
    aabb.max_x < window.x0
        || aabb.min_x > window.x1
        || aabb.max_y < window.y0
        || aabb.min_y > window.y1
}

/// Place an item in window space. Also returns the projected anchor, unsnapped.
fn place(index: usize, item: &RenderItem, ctx: &FrameContext, margin: f64) -> (Placement, Point) {
    let camera = &ctx.camera;
    let mut anchor = camera.project(item.anchor);
    let mut angle = item.rotation;
    let mut explicit = None;
    let follow = item.flags.contains(LayoutFlags::AUTO_FOLLOW_LINE);

    if item.flags.contains(LayoutFlags::AUTO_ROTATE)
        && let Some(line) = &item.line
    {
        let o = auto_rotate(camera, item.anchor, anchor, line, follow);
        angle = o.angle;
        anchor = o.anchor;
        explicit = Some(o.target);
    }

    let (mut offset, angle) = keep_upright(item.kind, angle, item.pixel_offset, item.bounds);
    let rotation = if angle != 0.0 {
        Affine::rotate(angle)
    } else {
        Affine::IDENTITY
    };
    let bounds = rotation.transform_rect_bbox(item.bounds);

    if follow && let Some(line) = &item.line {
        let targets = LineTargets {
            explicit,
            end: camera.project(line.end),
            start: camera.project(line.start),
        };
        offset = resolve_offset(bounds, ctx.window, anchor, &targets, offset);
    }

    let win = Point::new(anchor.x, anchor.y);
    let window_box = declutter_box(item.bounds, bounds + offset, win, margin);

    let mut position = win;
    if ctx.snap {
        position = Point::new(position.x.floor() + 0.5, position.y.floor() + 0.5);
    }
    let scaled = Vec2::new(
        offset.x * ctx.reference_scale.x,
        offset.y * ctx.reference_scale.y,
    );
    let position = position + scaled;

    let placement = Placement {
        index,
        id: item.id,
        group: item.group_id(),
        kind: item.kind,
        state: item.state,
        abort: item.abort,
        window_box,
        position,
        angle,
        offset,
        modelview: Affine::translate(position.to_vec2()) * rotation,
    };
    (placement, win)
}

fn scaled(modelview: Affine, scale: f32) -> Affine {
    if scale == 1.0 {
        modelview
    } else {
        modelview * Affine::scale(f64::from(scale))
    }
}

/// Run one pass over `items`, leaving the result in `session.layout`.
///
/// The caller has already validated the frame and handled empty input.
pub(crate) fn run(
    session: &mut ViewportSession,
    frame: &FrameView,
    items: &[RenderItem],
    now: Duration,
    config: PassConfig<'_>,
) {
    let options = config.options;
    let elapsed = session.advance_clock(now);
    let window = frame.layout_viewport();
    let camera = Camera::new(frame.view, frame.projection, window);
    let camera_changed = session.update_camera(camera.vpw);
    session.begin_frame(options.occupancy);

    let ctx = FrameContext {
        camera,
        window,
        reference_scale: frame.reference_scale(),
        snap: options.snap_to_pixel && !camera_changed,
    };

    if config.enabled {
        match (config.comparator, options.sort_by_priority) {
            (Some(cmp), _) => sort_indices(items, cmp, true, &mut session.order),
            (None, true) => sort_indices(items, by_priority, true, &mut session.order),
            (None, false) => sort_indices(items, by_depth, false, &mut session.order),
        }
    } else {
        session.order.extend(0..items.len());
    }

    let limit = usize::try_from(options.max_objects).unwrap_or(usize::MAX);
    let ViewportSession {
        memory,
        layout,
        occupancy,
        culled_groups,
        order,
        ..
    } = session;

    for &index in order.iter() {
        if layout.passed.len() >= limit {
            layout.stats.skipped += 1;
            continue;
        }
        let item = &items[index];
        let margin = if memory.was_visible(item.id) {
            VISIBLE_MARGIN
        } else {
            HIDDEN_MARGIN
        };
        let (placement, anchor) = place(index, item, &ctx, margin);
        if outside(window, placement.window_box, anchor) {
            layout.stats.culled += 1;
            continue;
        }

        let group = placement.group;
        let accept = if !config.enabled || item.never_occluded() {
            true
        } else if group.is_some_and(|g| culled_groups.contains(&g)) {
            false
        } else {
            occupancy.is_clear(placement.window_box, group)
        };

        if accept {
            occupancy.insert(placement.window_box, group);
            layout.passed.push(placement);
        } else {
            if let Some(g) = group {
                culled_groups.insert(g);
            }
            layout.failed.push(placement);
        }
    }

    if config.enabled {
        // A group rejected after one of its members passed is hidden as a unit.
        let passed = &mut layout.passed;
        let failed = &mut layout.failed;
        passed.retain(|p| {
            let demote = p.group.is_some_and(|g| culled_groups.contains(&g));
            if demote {
                failed.push(*p);
            }
            !demote
        });

        let secs = elapsed.as_secs_f32();
        for p in &layout.passed {
            let state = memory.entry(p.id);
            advance_in(state, secs, options);
            state.frames = state.frames.saturating_add(1);
            state.visible = true;
            layout.draw.push(DrawItem {
                index: p.index,
                id: p.id,
                kind: p.kind,
                state: p.state,
                abort: p.abort,
                passed: true,
                opacity: state.opacity,
                scale: state.scale,
                modelview: scaled(p.modelview, state.scale),
            });
        }
        for p in &layout.failed {
            let state = memory.entry(p.id);
            let fully_out = advance_out(state, secs, options);
            if retained_after_failing(p.kind, state, fully_out) {
                layout.draw.push(DrawItem {
                    index: p.index,
                    id: p.id,
                    kind: p.kind,
                    state: p.state,
                    abort: p.abort,
                    passed: false,
                    opacity: state.opacity,
                    scale: state.scale,
                    modelview: scaled(p.modelview, state.scale),
                });
            }
            state.frames = state.frames.saturating_add(1);
            state.visible = false;
        }
    } else {
        layout.draw.extend(layout.passed.iter().map(|p| DrawItem {
            index: p.index,
            id: p.id,
            kind: p.kind,
            state: p.state,
            abort: p.abort,
            passed: true,
            opacity: 1.0,
            scale: 1.0,
            modelview: p.modelview,
        }));
    }

    let stats = &mut layout.stats;
    stats.candidates = items.len();
    stats.passed = layout.passed.len();
    stats.failed = layout.failed.len();
    stats.drawn = layout.draw.len();
    stats.elapsed = elapsed;
    stats.camera_changed = camera_changed;

    log::trace!(
        "declutter: {} candidates, {} passed, {} failed, {} culled, {} skipped, {} drawn, elapsed {:?}, camera changed: {}",
        stats.candidates,
        stats.passed,
        stats.failed,
        stats.culled,
        stats.skipped,
        stats.drawn,
        stats.elapsed,
        stats.camera_changed,
    );
}
