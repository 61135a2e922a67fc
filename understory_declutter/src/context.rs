// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The `Declutter` context: configuration plus one session per viewport.

use core::fmt::Debug;
use core::time::Duration;

use hashbrown::HashMap;
use kurbo::Rect;

use crate::emit::{DrawTarget, EmitStats, emit};
use crate::error::LayoutError;
use crate::memory::AnimationMemory;
use crate::options::LayoutOptions;
use crate::session::ViewportSession;
use crate::sort::Comparator;
use crate::sorter::{self, PassConfig};
use crate::types::{FrameLayout, FrameView, ItemId, RenderItem, ViewportId};

fn usable(r: Rect) -> bool {
    r.is_finite() && r.width() > 0.0 && r.height() > 0.0
}

/// Declutter engine for one render pipeline.
///
/// Holds the on/off switch, the sort strategy, the options snapshot, and a
/// [`ViewportSession`] per render target. Change settings between frames,
/// not during one.
pub struct Declutter {
    enabled: bool,
    comparator: Option<Comparator>,
    options: LayoutOptions,
    sessions: HashMap<ViewportId, ViewportSession>,
}

impl Default for Declutter {
    fn default() -> Self {
        Self::new(LayoutOptions::default())
    }
}

impl Declutter {
    /// Create an enabled context with the given options.
    pub fn new(options: LayoutOptions) -> Self {
        options.validate();
        Self {
            enabled: true,
            comparator: None,
            options,
            sessions: HashMap::new(),
        }
    }

    /// Turn decluttering on or off.
    ///
    /// While off, every item inside the viewport is drawn at full strength.
    pub fn set_enabled(&mut self, enabled: bool) {
        if enabled != self.enabled {
            log::debug!("declutter {}", if enabled { "enabled" } else { "disabled" });
        }
        self.enabled = enabled;
    }

    /// Whether decluttering is on.
    pub fn enabled(&self) -> bool {
        self.enabled
    }

    /// Install a custom test order. Replaces the built-in one.
    pub fn set_comparator(&mut self, comparator: Comparator) {
        log::debug!("custom declutter comparator installed");
        self.comparator = Some(comparator);
    }

    /// Go back to the built-in test order.
    pub fn clear_comparator(&mut self) {
        if self.comparator.take().is_some() {
            log::debug!("custom declutter comparator cleared");
        }
    }

    /// The installed custom comparator, if any.
    pub fn comparator(&self) -> Option<Comparator> {
        self.comparator
    }

    /// Replace the options snapshot. Inconsistent values are logged, not rejected.
    pub fn set_options(&mut self, options: LayoutOptions) {
        options.validate();
        log::debug!("declutter options replaced: {options:?}");
        self.options = options;
    }

    /// Current options.
    pub fn options(&self) -> &LayoutOptions {
        &self.options
    }

    /// Lay out one frame for `viewport`.
    ///
    /// `now` is a monotonic clock reading; animation speed follows the time
    /// between calls for the same viewport. On error the viewport's previous
    /// state is left untouched.
    pub fn sort(
        &mut self,
        viewport: ViewportId,
        frame: &FrameView,
        items: &[RenderItem],
        now: Duration,
    ) -> Result<&FrameLayout, LayoutError> {
        if !frame.has_surface {
            log::debug!("viewport {}: no render target, skipping frame", viewport.0);
            return Err(LayoutError::MissingRenderTarget(viewport));
        }
        if !usable(frame.viewport) || !usable(frame.layout_viewport()) {
            log::debug!("viewport {}: degenerate viewport, skipping frame", viewport.0);
            return Err(LayoutError::DegenerateViewport(viewport));
        }

        let config = PassConfig {
            options: &self.options,
            enabled: self.enabled,
            comparator: self.comparator,
        };
        let session = self.sessions.entry(viewport).or_default();
        if items.is_empty() {
            session.layout.clear();
            return Ok(&session.layout);
        }
        sorter::run(session, frame, items, now, config);
        Ok(&session.layout)
    }

    /// Emit the last layout of `viewport` into `target`.
    ///
    /// `window` is the viewport being drawn into. Does nothing for a viewport
    /// that has not been laid out.
    pub fn draw(
        &self,
        viewport: ViewportId,
        window: Rect,
        target: &mut impl DrawTarget,
    ) -> EmitStats {
        match self.sessions.get(&viewport) {
            Some(session) => emit(&session.layout, window, self.enabled, target),
            None => EmitStats::default(),
        }
    }

    /// Session of `viewport`, if it has been laid out.
    pub fn session(&self, viewport: ViewportId) -> Option<&ViewportSession> {
        self.sessions.get(&viewport)
    }

    /// Last layout of `viewport`.
    pub fn layout(&self, viewport: ViewportId) -> Option<&FrameLayout> {
        self.sessions.get(&viewport).map(ViewportSession::layout)
    }

    /// Animation memory of `viewport`, for diagnostics.
    pub fn memory(&self, viewport: ViewportId) -> Option<&AnimationMemory> {
        self.sessions.get(&viewport).map(ViewportSession::memory)
    }

    /// Drop the animation state of `item` in every viewport.
    ///
    /// Call when a drawable leaves the scene.
    pub fn forget(&mut self, item: ItemId) {
        for session in self.sessions.values_mut() {
            session.memory_mut().forget(item);
        }
    }

    /// Drop everything kept for `viewport`.
    pub fn forget_viewport(&mut self, viewport: ViewportId) -> Option<ViewportSession> {
        self.sessions.remove(&viewport)
    }

    /// Number of viewports with a session.
    pub fn viewport_count(&self) -> usize {
        self.sessions.len()
    }
}

impl Debug for Declutter {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Declutter")
            .field("enabled", &self.enabled)
            .field("custom_comparator", &self.comparator.is_some())
            .field("options", &self.options)
            .field("sessions", &self.sessions.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::emit::RecordingTarget;
    use crate::options::OccupancyBackend;
    use crate::projection::tests::pixel_camera;
    use crate::types::{GroupId, ItemKind, LayoutFlags, LineSegment};
    use alloc::vec::Vec;
    use glam::DVec3;
    use kurbo::Vec2;

    const VP: ViewportId = ViewportId(1);

    fn frame() -> FrameView {
        let (view, proj, viewport) = pixel_camera();
        FrameView::new(view, proj, viewport)
    }

    fn at(ms: u64) -> Duration {
        Duration::from_millis(ms)
    }

    /// A 10x10 label anchored at window position `(x, y)`.
    fn label(id: u64, x: f64, y: f64, depth: f32) -> RenderItem {
        RenderItem {
            id: ItemId(id),
            bounds: Rect::new(0.0, 0.0, 10.0, 10.0),
            anchor: DVec3::new(x, y, -1.0),
            depth,
            ..Default::default()
        }
    }

    fn grouped(mut item: RenderItem, group: i64) -> RenderItem {
        item.group = Some(GroupId(group));
        item
    }

    fn ids(list: &[crate::types::Placement]) -> Vec<u64> {
        list.iter().map(|p| p.id.0).collect()
    }

    #[test]
    fn nearer_item_wins_overlap() {
        let mut d = Declutter::default();
        let items = [label(2, 55.0, 55.0, 0.2), label(1, 50.0, 50.0, 0.1)];
        let layout = d.sort(VP, &frame(), &items, at(0)).unwrap();
        assert_eq!(ids(&layout.passed), [1]);
        assert_eq!(ids(&layout.failed), [2]);
    }

    #[test]
    fn max_objects_limits_passed() {
        let mut d = Declutter::new(LayoutOptions {
            max_objects: 1,
            ..Default::default()
        });
        let items = [
            label(1, 20.0, 50.0, 0.1),
            label(2, 80.0, 50.0, 0.2),
            label(3, 140.0, 50.0, 0.3),
        ];
        let layout = d.sort(VP, &frame(), &items, at(0)).unwrap();
        assert_eq!(ids(&layout.passed), [1]);
        assert!(layout.failed.is_empty());
        assert_eq!(layout.stats.skipped, 2);
        assert_eq!(layout.draw.len(), 1);

        d.set_options(LayoutOptions {
            max_objects: 0,
            ..Default::default()
        });
        let layout = d.sort(VP, &frame(), &items, at(16)).unwrap();
        assert!(layout.passed.is_empty());
        assert!(layout.draw.is_empty());
    }

    #[test]
    fn same_group_overlap_is_allowed() {
        let mut d = Declutter::default();
        let items = [
            grouped(label(1, 50.0, 50.0, 0.1), 7),
            grouped(label(2, 55.0, 55.0, 0.2), 7),
            grouped(label(3, 58.0, 52.0, 0.3), 8),
            label(4, 52.0, 48.0, 0.4),
            grouped(label(5, 150.0, 50.0, 0.5), 8),
        ];
        let layout = d.sort(VP, &frame(), &items, at(0)).unwrap();
        assert_eq!(ids(&layout.passed), [1, 2]);
        // Group 8 is culled as a unit, even where it has room.
        assert_eq!(ids(&layout.failed), [3, 4, 5]);
    }

    #[test]
    fn raw_ungrouped_id_still_blocks() {
        let mut d = Declutter::default();
        let items = [
            grouped(label(1, 50.0, 50.0, 0.1), -1),
            grouped(label(2, 52.0, 52.0, 0.2), -1),
        ];
        let layout = d.sort(VP, &frame(), &items, at(0)).unwrap();
        assert_eq!(ids(&layout.passed), [1]);
        assert_eq!(ids(&layout.failed), [2]);
        assert_eq!(layout.passed[0].group, None);
    }

    #[test]
    fn grid_backend_matches_linear() {
        let items = [
            grouped(label(1, 50.0, 50.0, 0.1), 7),
            grouped(label(2, 55.0, 55.0, 0.2), 7),
            grouped(label(3, 58.0, 52.0, 0.3), 8),
            label(4, 52.0, 48.0, 0.4),
            grouped(label(5, 150.0, 50.0, 0.5), 8),
            label(6, 120.0, 20.0, 0.6),
            label(7, 125.0, 25.0, 0.7),
            label(8, 190.0, 90.0, 0.8),
        ];
        let split = |occupancy| {
            let mut d = Declutter::new(LayoutOptions {
                occupancy,
                ..Default::default()
            });
            let layout = d.sort(VP, &frame(), &items, at(0)).unwrap();
            (ids(&layout.passed), ids(&layout.failed))
        };
        let linear = split(OccupancyBackend::Linear);
        assert_eq!(linear, (alloc::vec![1, 2, 6, 8], alloc::vec![3, 4, 5, 7]));
        for cell_size in [4.0, 16.0, 64.0] {
            assert_eq!(
                split(OccupancyBackend::Grid { cell_size }),
                linear,
                "cell size {cell_size}"
            );
        }
    }

    #[test]
    fn late_group_rejection_demotes_earlier_member() {
        let mut d = Declutter::default();
        let items = [
            grouped(label(1, 50.0, 50.0, 0.1), 7),
            label(2, 100.0, 50.0, 0.2),
            grouped(label(3, 105.0, 52.0, 0.3), 7),
        ];
        let layout = d.sort(VP, &frame(), &items, at(0)).unwrap();
        assert_eq!(ids(&layout.passed), [2]);
        assert_eq!(ids(&layout.failed), [3, 1]);
        assert_eq!(layout.stats.passed, 1);
        assert_eq!(layout.stats.failed, 2);
    }

    #[test]
    fn never_occlude_priority_always_passes() {
        let mut d = Declutter::default();
        let mut pinned = label(2, 52.0, 52.0, 0.2);
        pinned.priority = f32::INFINITY;
        let mut off_screen = label(3, -500.0, 50.0, 0.3);
        off_screen.priority = f32::MAX;
        let items = [label(1, 50.0, 50.0, 0.1), pinned, off_screen];
        let layout = d.sort(VP, &frame(), &items, at(0)).unwrap();
        assert_eq!(ids(&layout.passed), [1, 2]);
        assert_eq!(layout.stats.culled, 1);
    }

    #[test]
    fn fade_out_follows_elapsed_time() {
        let mut d = Declutter::new(LayoutOptions {
            out_animation_time: 1.0,
            min_animation_alpha: 0.2,
            ..Default::default()
        });
        let a = label(1, 50.0, 50.0, 0.5);
        let layout = d.sort(VP, &frame(), &[a.clone()], at(1_000)).unwrap();
        assert_eq!(layout.draw_item(ItemId(1)).unwrap().opacity, 1.0);

        // A nearer item now covers it; half a second later it is at half strength.
        let blocker = label(2, 52.0, 52.0, 0.1);
        let layout = d.sort(VP, &frame(), &[a, blocker], at(1_500)).unwrap();
        assert!(layout.is_failed(ItemId(1)));
        let faded = layout.draw_item(ItemId(1)).unwrap();
        assert_eq!(faded.opacity, 0.5);
        assert_eq!(faded.scale, 0.5);
        assert!(!faded.passed);
        // Failed items are drawn after passed ones.
        assert_eq!(layout.draw[0].id, ItemId(2));
    }

    #[test]
    fn fade_in_is_monotonic_then_stays_full() {
        let mut d = Declutter::default();
        let a = label(1, 50.0, 50.0, 0.5);
        let blocker = label(2, 52.0, 52.0, 0.1);
        let layout = d.sort(VP, &frame(), &[a.clone(), blocker], at(0)).unwrap();
        // First sighting while occluded snaps to the minimum.
        assert_eq!(layout.draw_item(ItemId(1)).unwrap().opacity, 0.35);

        let mut last = 0.35;
        for step in 1..=10 {
            let layout = d
                .sort(VP, &frame(), core::slice::from_ref(&a), at(step * 100))
                .unwrap();
            let opacity = layout.draw_item(ItemId(1)).unwrap().opacity;
            assert!(opacity >= last, "opacity went from {last} to {opacity}");
            assert!(opacity <= 1.0);
            last = opacity;
        }
        assert_eq!(last, 1.0);
    }

    #[test]
    fn hidden_items_reserve_a_wider_box() {
        let mut d = Declutter::default();
        let a = label(1, 50.0, 50.0, 0.5);
        let blocker = label(2, 52.0, 52.0, 0.1);
        let visible_box = d.sort(VP, &frame(), &[a.clone()], at(0)).unwrap().passed[0].window_box;
        // Becomes hidden this frame; the margin widens from the next one.
        d.sort(VP, &frame(), &[a.clone(), blocker.clone()], at(16))
            .unwrap();
        let layout = d.sort(VP, &frame(), &[a, blocker], at(32)).unwrap();
        let hidden_box = layout.failed[0].window_box;
        assert_eq!(hidden_box.min_x, visible_box.min_x - 2.0);
        assert_eq!(hidden_box.min_y, visible_box.min_y - 2.0);
        assert_eq!(hidden_box.max_x, visible_box.max_x + 2.0);
        assert_eq!(hidden_box.max_y, visible_box.max_y + 2.0);
    }

    #[test]
    fn rerun_without_change_is_idempotent() {
        let mut d = Declutter::default();
        let items = [
            label(1, 50.0, 50.0, 0.1),
            label(2, 55.0, 55.0, 0.2),
            label(3, 120.0, 30.0, 0.3),
        ];
        let first = d.sort(VP, &frame(), &items, at(500)).unwrap().clone();
        let second = d.sort(VP, &frame(), &items, at(500)).unwrap();
        assert_eq!(ids(&first.passed), ids(&second.passed));
        let boxes = |l: &FrameLayout| l.passed.iter().map(|p| p.window_box).collect::<Vec<_>>();
        assert_eq!(boxes(&first), boxes(second));
        assert_eq!(second.stats.elapsed, Duration::ZERO);
        assert!(!second.stats.camera_changed);
    }

    #[test]
    fn disabled_declutter_draws_everything_in_view() {
        let mut d = Declutter::default();
        d.set_enabled(false);
        assert!(!d.enabled());
        let items = [
            label(1, 50.0, 50.0, 0.1),
            label(2, 52.0, 52.0, 0.2),
            label(3, 900.0, 50.0, 0.3),
        ];
        let layout = d.sort(VP, &frame(), &items, at(0)).unwrap();
        assert_eq!(ids(&layout.passed), [1, 2]);
        assert_eq!(layout.stats.culled, 1);
        assert!(layout.draw.iter().all(|i| i.opacity == 1.0 && i.scale == 1.0));
        assert!(d.memory(VP).unwrap().is_empty());
    }

    #[test]
    fn unusable_frames_are_skipped() {
        let mut d = Declutter::default();
        let items = [label(1, 50.0, 50.0, 0.1)];
        assert_eq!(
            d.sort(VP, &frame().without_surface(), &items, at(0)).unwrap_err(),
            LayoutError::MissingRenderTarget(VP)
        );
        let mut flat = frame();
        flat.viewport = Rect::new(0.0, 0.0, 200.0, 0.0);
        assert_eq!(
            d.sort(VP, &flat, &items, at(0)).unwrap_err(),
            LayoutError::DegenerateViewport(VP)
        );
        assert!(d.session(VP).is_none());
    }

    #[test]
    fn empty_input_is_a_no_op() {
        let mut d = Declutter::default();
        d.sort(VP, &frame(), &[label(1, 50.0, 50.0, 0.1)], at(0))
            .unwrap();
        let layout = d.sort(VP, &frame(), &[], at(100)).unwrap();
        assert!(layout.draw.is_empty());
        assert_eq!(layout.stats, Default::default());
    }

    #[test]
    fn custom_comparator_and_priority_sort() {
        fn highest_id_first(a: &RenderItem, b: &RenderItem) -> core::cmp::Ordering {
            b.id.cmp(&a.id)
        }
        let items = [label(1, 50.0, 50.0, 0.1), label(2, 52.0, 52.0, 0.2)];

        let mut d = Declutter::default();
        d.set_comparator(highest_id_first);
        assert!(d.comparator().is_some());
        assert_eq!(ids(&d.sort(VP, &frame(), &items, at(0)).unwrap().passed), [2]);
        d.clear_comparator();
        assert_eq!(ids(&d.sort(VP, &frame(), &items, at(0)).unwrap().passed), [1]);

        let mut prioritized = items.clone();
        prioritized[1].priority = 5.0;
        d.set_options(LayoutOptions {
            sort_by_priority: true,
            ..Default::default()
        });
        assert_eq!(
            ids(&d.sort(VP, &frame(), &prioritized, at(0)).unwrap().passed),
            [2]
        );
    }

    #[test]
    fn snapping_waits_for_a_still_camera() {
        let mut d = Declutter::new(LayoutOptions {
            snap_to_pixel: true,
            ..Default::default()
        });
        let items = [label(1, 50.3, 40.7, 0.1)];
        let moving = d.sort(VP, &frame(), &items, at(0)).unwrap().passed[0].position;
        assert!((moving.x - 50.3).abs() < 1e-9);
        let still = d.sort(VP, &frame(), &items, at(16)).unwrap().passed[0];
        assert_eq!((still.position.x, still.position.y), (50.5, 40.5));
    }

    #[test]
    fn reference_viewport_scales_offsets() {
        let (view, proj, reference) = pixel_camera();
        let picking = FrameView::new(view, proj, Rect::new(0.0, 0.0, 100.0, 50.0))
            .with_reference(reference);
        let mut item = label(1, 60.0, 20.0, 0.1);
        item.pixel_offset = Vec2::new(10.0, 4.0);
        let mut d = Declutter::default();
        let p = d.sort(VP, &picking, &[item], at(0)).unwrap().passed[0];
        assert!((p.position.x - 65.0).abs() < 1e-9, "x = {}", p.position.x);
        assert!((p.position.y - 22.0).abs() < 1e-9, "y = {}", p.position.y);
    }

    #[test]
    fn line_following_pulls_label_on_screen() {
        let mut item = label(1, -50.0, 50.0, 0.1);
        item.flags = LayoutFlags::AUTO_FOLLOW_LINE;
        item.line = Some(LineSegment {
            start: DVec3::new(-50.0, 50.0, -1.0),
            end: DVec3::new(150.0, 50.0, -1.0),
        });
        let mut d = Declutter::default();
        let layout = d.sort(VP, &frame(), &[item], at(0)).unwrap();
        assert_eq!(layout.stats.culled, 0);
        let p = layout.passed[0];
        assert!((p.offset.x - 50.0).abs() < 1e-6, "offset = {:?}", p.offset);
        assert!(p.offset.y.abs() < 1e-6, "offset = {:?}", p.offset);
        assert!(p.position.x.abs() < 1e-6, "drawn at the left edge");
    }

    #[test]
    fn auto_rotation_keeps_text_upright() {
        let line = LineSegment {
            start: DVec3::new(100.0, 50.0, -1.0),
            end: DVec3::new(20.0, 50.0, -1.0),
        };
        let mut icon = label(1, 100.0, 50.0, 0.1);
        icon.flags = LayoutFlags::AUTO_ROTATE;
        icon.line = Some(line);
        let mut text = label(2, 100.0, 80.0, 0.2);
        text.kind = ItemKind::Text;
        text.flags = LayoutFlags::AUTO_ROTATE;
        text.line = Some(LineSegment {
            start: DVec3::new(100.0, 80.0, -1.0),
            end: DVec3::new(20.0, 80.0, -1.0),
        });
        let mut d = Declutter::default();
        let layout = d.sort(VP, &frame(), &[icon, text], at(0)).unwrap();
        assert_eq!(layout.passed.len(), 2);
        assert!((layout.passed[0].angle - core::f64::consts::PI).abs() < 1e-9);
        assert_eq!(layout.passed[1].angle, 0.0);
        assert_eq!(layout.passed[1].offset, Vec2::new(-10.0, -10.0));
    }

    #[test]
    fn degenerate_bounds_never_conflict() {
        let mut a = label(1, 50.0, 50.0, 0.1);
        a.bounds = Rect::ZERO;
        let mut b = label(2, 50.0, 50.0, 0.2);
        b.bounds = Rect::new(0.0, 0.0, f64::NAN, 5.0);
        let c = label(3, 45.0, 45.0, 0.3);
        let mut d = Declutter::default();
        let layout = d.sort(VP, &frame(), &[a, b, c], at(0)).unwrap();
        assert_eq!(ids(&layout.passed), [1, 2, 3]);
    }

    #[test]
    fn draw_and_forget() {
        let mut d = Declutter::default();
        let items = [label(1, 20.0, 20.0, 0.1), label(2, 120.0, 20.0, 0.2)];
        d.sort(VP, &frame(), &items, at(0)).unwrap();

        let mut target = RecordingTarget::default();
        let stats = d.draw(VP, frame().viewport, &mut target);
        assert_eq!(stats.drawn, 2);
        assert_eq!(target.drawn(), [ItemId(2), ItemId(1)]);
        assert_eq!(
            d.draw(ViewportId(99), frame().viewport, &mut target),
            EmitStats::default()
        );

        assert_eq!(d.memory(VP).unwrap().len(), 2);
        d.forget(ItemId(1));
        assert!(d.memory(VP).unwrap().get(ItemId(1)).is_none());
        assert!(d.forget_viewport(VP).is_some());
        assert_eq!(d.viewport_count(), 0);
    }

    #[test]
    fn sessions_are_independent() {
        let mut d = Declutter::default();
        let a = label(1, 50.0, 50.0, 0.5);
        let blocker = label(2, 52.0, 52.0, 0.1);
        d.sort(ViewportId(1), &frame(), &[a.clone(), blocker], at(0))
            .unwrap();
        let other = d.sort(ViewportId(2), &frame(), &[a], at(0)).unwrap();
        assert_eq!(other.draw_item(ItemId(1)).unwrap().opacity, 1.0);
        assert!(!d.memory(ViewportId(1)).unwrap().get(ItemId(1)).unwrap().visible);
        assert!(d.memory(ViewportId(2)).unwrap().get(ItemId(1)).unwrap().visible);
    }
}
