// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Public types: identifiers, per-item input, per-frame view, and pass output.

use alloc::vec::Vec;
use core::time::Duration;

use glam::{DMat4, DVec3};
use kurbo::{Affine, Point, Rect, Vec2};
use understory_occupancy::Aabb;

/// Stable identity of a drawable.
///
/// Must stay the same across frames for the same logical label; animation
/// memory is keyed by it.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ItemId(pub u64);

/// Feature identifier shared by the facets (icon, text, frame) of one map feature.
///
/// Items of the same group are occluded as a unit.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GroupId(pub i64);

impl GroupId {
    /// Convert a raw feature id where `-1` means "ungrouped".
    pub const fn from_raw(raw: i64) -> Option<Self> {
        if raw == -1 { None } else { Some(Self(raw)) }
    }

    /// Inverse of [`GroupId::from_raw`].
    pub const fn to_raw(group: Option<Self>) -> i64 {
        match group {
            Some(g) => g.0,
            None => -1,
        }
    }
}

/// Identifier of a render target (camera/viewport pair).
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ViewportId(pub u64);

/// Identifier of the render state an item is drawn with.
///
/// The emitter only switches state when consecutive items differ.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct StateKey(pub u32);

/// What a drawable is, for the fade-out drop rule.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum ItemKind {
    /// Glyph run. Flipped rather than drawn upside down when rotated.
    Text,
    /// Image or symbol.
    #[default]
    Icon,
    /// Plain geometry such as a label frame.
    Shape,
}

bitflags::bitflags! {
    /// Placement behaviors for an item.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct LayoutFlags: u8 {
        /// Rotate to follow the on-screen direction of the item's line.
        const AUTO_ROTATE      = 0b0000_0001;
        /// Slide along the item's line to stay inside the viewport.
        const AUTO_FOLLOW_LINE = 0b0000_0010;
    }
}

/// A line feature in world space that an item is attached to.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct LineSegment {
    /// Line start.
    pub start: DVec3,
    /// Line end. Also the direction target for auto-rotation.
    pub end: DVec3,
}

/// One drawable to lay out this frame.
#[derive(Clone, Debug, PartialEq)]
pub struct RenderItem {
    /// Stable identity.
    pub id: ItemId,
    /// Kind of drawable.
    pub kind: ItemKind,
    /// Pixel-space bounds relative to the anchor, before offset and rotation.
    pub bounds: Rect,
    /// World-space anchor point.
    pub anchor: DVec3,
    /// Feature group, `None` when ungrouped. `Some(GroupId(-1))` is also
    /// treated as ungrouped.
    pub group: Option<GroupId>,
    /// Higher wins under priority sorting. `f32::MAX` or more means "never occlude".
    pub priority: f32,
    /// Pixel offset applied after rotation.
    pub pixel_offset: Vec2,
    /// Fixed rotation in radians. Replaced by the computed angle under
    /// [`LayoutFlags::AUTO_ROTATE`].
    pub rotation: f64,
    /// Placement behaviors.
    pub flags: LayoutFlags,
    /// Line used by auto-rotation and line following.
    pub line: Option<LineSegment>,
    /// Distance-like sort key, lower is nearer.
    pub depth: f32,
    /// Cull traversal order.
    pub traversal: u32,
    /// Insertion order among the facets of one feature.
    pub sibling: u32,
    /// Render state used when drawing.
    pub state: StateKey,
    /// Host-side "abort rendering" flag; the emitter skips the item.
    pub abort: bool,
}

impl Default for RenderItem {
    fn default() -> Self {
        Self {
            id: ItemId::default(),
            kind: ItemKind::default(),
            bounds: Rect::ZERO,
            anchor: DVec3::ZERO,
            group: None,
            priority: 0.0,
            pixel_offset: Vec2::ZERO,
            rotation: 0.0,
            flags: LayoutFlags::empty(),
            line: None,
            depth: 0.0,
            traversal: 0,
            sibling: 0,
            state: StateKey::default(),
            abort: false,
        }
    }
}

impl RenderItem {
    /// The item's group, with the raw "ungrouped" id `-1` read as `None`.
    pub fn group_id(&self) -> Option<GroupId> {
        self.group.filter(|g| g.0 != -1)
    }

    /// Whether this item bypasses occlusion tests.
    pub fn never_occluded(&self) -> bool {
        self.priority >= f32::MAX
    }
}

/// The camera and render target for one frame.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct FrameView {
    /// World to eye.
    pub view: DMat4,
    /// Eye to clip.
    pub projection: DMat4,
    /// Window-space viewport, y up. `x0, y0` is the origin.
    pub viewport: Rect,
    /// Viewport of the reference camera when this target renders on its
    /// behalf (picking). Decluttering then happens in the reference window.
    pub reference_viewport: Option<Rect>,
    /// False when the target has nowhere to draw; the pass is skipped.
    pub has_surface: bool,
}

impl FrameView {
    /// A view drawing into `viewport`.
    pub fn new(view: DMat4, projection: DMat4, viewport: Rect) -> Self {
        Self {
            view,
            projection,
            viewport,
            reference_viewport: None,
            has_surface: true,
        }
    }

    /// Declutter in the window space of a reference camera.
    pub fn with_reference(mut self, reference_viewport: Rect) -> Self {
        self.reference_viewport = Some(reference_viewport);
        self
    }

    /// Mark the target as having no output surface.
    pub fn without_surface(mut self) -> Self {
        self.has_surface = false;
        self
    }

    /// The viewport decluttering happens in.
    pub fn layout_viewport(&self) -> Rect {
        self.reference_viewport.unwrap_or(self.viewport)
    }

    /// Scale from the reference window to this target's window.
    pub fn reference_scale(&self) -> Vec2 {
        match self.reference_viewport {
            Some(r) if r.width() > 0.0 && r.height() > 0.0 => Vec2::new(
                self.viewport.width() / r.width(),
                self.viewport.height() / r.height(),
            ),
            _ => Vec2::new(1.0, 1.0),
        }
    }
}

/// Where an item ended up during the occlusion scan.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Placement {
    /// Index of the item in the input slice.
    pub index: usize,
    /// Item identity.
    pub id: ItemId,
    /// Item group.
    pub group: Option<GroupId>,
    /// Item kind.
    pub kind: ItemKind,
    /// Render state.
    pub state: StateKey,
    /// Host abort flag, carried to the emitter.
    pub abort: bool,
    /// Box reserved in window space, hysteresis margin included.
    pub window_box: Aabb,
    /// Window position the item is drawn at, offset included.
    pub position: Point,
    /// Final rotation in radians.
    pub angle: f64,
    /// Final pixel offset.
    pub offset: Vec2,
    /// Translation and rotation, no scale.
    pub modelview: Affine,
}

/// An item in the final, animated draw list.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct DrawItem {
    /// Index of the item in the input slice.
    pub index: usize,
    /// Item identity.
    pub id: ItemId,
    /// Item kind.
    pub kind: ItemKind,
    /// Render state.
    pub state: StateKey,
    /// Host abort flag.
    pub abort: bool,
    /// Whether the item passed the occlusion test this frame.
    pub passed: bool,
    /// Current animated opacity; drives the fade uniform.
    pub opacity: f32,
    /// Current animated scale.
    pub scale: f32,
    /// Modelview with the animated scale pre-multiplied.
    pub modelview: Affine,
}

/// Counters for one pass.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct FrameStats {
    /// Items handed in.
    pub candidates: usize,
    /// Items accepted, after group demotion.
    pub passed: usize,
    /// Items rejected, demoted ones included.
    pub failed: usize,
    /// Items fully outside the viewport.
    pub culled: usize,
    /// Items never tested because the object limit was reached.
    pub skipped: usize,
    /// Items in the draw list.
    pub drawn: usize,
    /// Time since the previous pass on this viewport.
    pub elapsed: Duration,
    /// Whether the view-projection-window matrix changed.
    pub camera_changed: bool,
}

/// Output of one declutter pass.
///
/// Buffers are owned by the viewport session and reused across frames.
#[derive(Clone, Debug, Default)]
pub struct FrameLayout {
    /// Accepted items in sort order.
    pub passed: Vec<Placement>,
    /// Rejected items in rejection order.
    pub failed: Vec<Placement>,
    /// Final draw list: passed items, then fading failed items.
    pub draw: Vec<DrawItem>,
    /// Counters.
    pub stats: FrameStats,
}

impl FrameLayout {
    /// Reset for a new frame, keeping allocations.
    pub fn clear(&mut self) {
        self.passed.clear();
        self.failed.clear();
        self.draw.clear();
        self.stats = FrameStats::default();
    }

    /// Whether `id` passed this frame.
    pub fn is_passed(&self, id: ItemId) -> bool {
        self.passed.iter().any(|p| p.id == id)
    }

    /// Whether `id` failed this frame.
    pub fn is_failed(&self, id: ItemId) -> bool {
        self.failed.iter().any(|p| p.id == id)
    }

    /// The draw entry for `id`, if it is drawn this frame.
    pub fn draw_item(&self, id: ItemId) -> Option<&DrawItem> {
        self.draw.iter().find(|d| d.id == id)
    }
}
