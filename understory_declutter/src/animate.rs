// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Fade and scale animation.
//!
//! Accepted items grow and fade toward full strength over
//! `in_animation_time`; rejected items shrink and fade toward the configured
//! minimum over `out_animation_time`. Both are linear in elapsed time.

use crate::memory::AnimationState;
use crate::options::LayoutOptions;
use crate::types::ItemKind;

/// Shortest duration used as a rate divisor, in seconds.
const MIN_DURATION: f32 = 0.001;

/// Below this opacity a fully faded item is no longer drawn.
const INVISIBLE_ALPHA: f32 = 0.01;

fn rate(elapsed: f32, duration: f32) -> f32 {
    let duration = if duration.is_finite() {
        duration.max(MIN_DURATION)
    } else {
        MIN_DURATION
    };
    elapsed / duration
}

/// Step an accepted item toward full scale and opacity.
///
/// Returns true when both have reached `1.0`.
pub fn advance_in(state: &mut AnimationState, elapsed: f32, options: &LayoutOptions) -> bool {
    let step = rate(elapsed, options.in_animation_time);
    let mut fully_in = true;
    if state.scale != 1.0 {
        fully_in = false;
        state.scale = (state.scale + step).min(1.0);
    }
    if state.opacity != 1.0 {
        fully_in = false;
        state.opacity = (state.opacity + step).min(1.0);
    }
    fully_in
}

/// Step a rejected item toward the minimum scale and opacity.
///
/// An item never processed before jumps straight to the minimum so it does not
/// pop in and fade out on its first frame. Returns true when the item was
/// already at the minimum before this step.
pub fn advance_out(state: &mut AnimationState, elapsed: f32, options: &LayoutOptions) -> bool {
    let min_scale = options.min_animation_scale;
    let min_alpha = options.min_animation_alpha;
    if state.frames == 0 {
        state.scale = min_scale;
        state.opacity = min_alpha;
        return true;
    }
    let step = rate(elapsed, options.out_animation_time);
    let mut fully_out = true;
    if state.scale != min_scale {
        fully_out = false;
        state.scale = (state.scale - step).max(min_scale);
    }
    if state.opacity != min_alpha {
        fully_out = false;
        state.opacity = (state.opacity - step).max(min_alpha);
    }
    fully_out
}

/// Whether a rejected item stays in the draw list.
///
/// Shapes are kept while they still fade. Text and icons keep drawing at the
/// minimum strength unless they have fully faded to invisibility.
pub fn retained_after_failing(kind: ItemKind, state: &AnimationState, fully_out: bool) -> bool {
    if state.scale < 0.0 {
        return false;
    }
    let visible = state.opacity > INVISIBLE_ALPHA;
    match kind {
        ItemKind::Shape => !fully_out && visible,
        ItemKind::Text | ItemKind::Icon => !fully_out || visible,
    }
}
