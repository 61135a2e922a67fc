// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Draw emission in window space.
//!
//! The emitter walks a frame's draw list and drives a [`DrawTarget`]: one
//! orthographic projection for the whole batch, then per item a modelview,
//! a render state when it changes, the fade factor, and the draw call.

use alloc::vec::Vec;

use glam::DMat4;
use kurbo::{Affine, Rect};

use crate::types::{DrawItem, FrameLayout, ItemId, StateKey};

/// Near and far planes of the batch projection.
const DEPTH_RANGE: f64 = 1000.0;

/// Rendering backend fed by [`emit`].
pub trait DrawTarget {
    /// Whether the backend has asked to stop drawing. Checked before every item.
    fn aborted(&self) -> bool {
        false
    }

    /// Set the projection used by every following draw.
    fn apply_projection(&mut self, projection: DMat4);

    /// Switch to the render state of the next item.
    fn apply_state(&mut self, state: StateKey);

    /// Set the modelview of the next item.
    fn apply_modelview(&mut self, modelview: Affine);

    /// Set the shared fade factor.
    fn set_fade(&mut self, fade: f32);

    /// Draw one item.
    fn draw(&mut self, item: &DrawItem);
}

/// Counters for one emission.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct EmitStats {
    /// Items drawn.
    pub drawn: usize,
    /// Items skipped because rendering was aborted.
    pub aborted: usize,
    /// Render state switches issued.
    pub state_changes: usize,
}

/// Window-space projection for `viewport`.
///
/// Spans `[x, x + w - 1] × [y, y + h - 1]` with a deep depth range so rotated
/// or offset geometry is never clipped.
pub fn orthographic(viewport: Rect) -> DMat4 {
    DMat4::orthographic_rh_gl(
        viewport.x0,
        viewport.x0 + viewport.width() - 1.0,
        viewport.y0,
        viewport.y0 + viewport.height() - 1.0,
        -DEPTH_RANGE,
        DEPTH_RANGE,
    )
}

/// Emit `layout.draw` into `target`.
///
/// Items are walked back to front, the reverse of acceptance order. With
/// decluttering disabled the fade factor is always `1.0`.
pub fn emit(
    layout: &FrameLayout,
    viewport: Rect,
    enabled: bool,
    target: &mut impl DrawTarget,
) -> EmitStats {
    let mut stats = EmitStats::default();
    if layout.draw.is_empty() {
        return stats;
    }
    target.apply_projection(orthographic(viewport));

    let mut current: Option<StateKey> = None;
    for item in layout.draw.iter().rev() {
        if item.abort || target.aborted() {
            stats.aborted += 1;
            continue;
        }
        target.apply_modelview(item.modelview);
        if current != Some(item.state) {
            target.apply_state(item.state);
            current = Some(item.state);
            stats.state_changes += 1;
        }
        target.set_fade(if enabled { item.opacity } else { 1.0 });
        target.draw(item);
        stats.drawn += 1;
    }
    stats
}

/// One call received by a [`RecordingTarget`].
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Command {
    /// [`DrawTarget::apply_projection`].
    Projection(DMat4),
    /// [`DrawTarget::apply_state`].
    State(StateKey),
    /// [`DrawTarget::apply_modelview`].
    ModelView(Affine),
    /// [`DrawTarget::set_fade`].
    Fade(f32),
    /// [`DrawTarget::draw`].
    Draw(ItemId),
}

/// A [`DrawTarget`] that records every call, for tests and tooling.
#[derive(Clone, Debug, Default)]
pub struct RecordingTarget {
    /// Calls in the order received.
    pub commands: Vec<Command>,
    /// Reported by [`DrawTarget::aborted`].
    pub abort: bool,
}

impl RecordingTarget {
    /// Ids of drawn items, in draw order.
    pub fn drawn(&self) -> Vec<ItemId> {
        self.commands
            .iter()
            .filter_map(|c| match c {
                Command::Draw(id) => Some(*id),
                _ => None,
            })
            .collect()
    }

    /// Fade factors set, in order.
    pub fn fades(&self) -> Vec<f32> {
        self.commands
            .iter()
            .filter_map(|c| match c {
                Command::Fade(f) => Some(*f),
                _ => None,
            })
            .collect()
    }
}

impl DrawTarget for RecordingTarget {
    fn aborted(&self) -> bool {
        self.abort
    }

    fn apply_projection(&mut self, projection: DMat4) {
        self.commands.push(Command::Projection(projection));
    }

    fn apply_state(&mut self, state: StateKey) {
        self.commands.push(Command::State(state));
    }

    fn apply_modelview(&mut self, modelview: Affine) {
        self.commands.push(Command::ModelView(modelview));
    }

    fn set_fade(&mut self, fade: f32) {
        self.commands.push(Command::Fade(fade));
    }

    fn draw(&mut self, item: &DrawItem) {
        self.commands.push(Command::Draw(item.id));
    }
}
