// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-drawable animation memory.

use hashbrown::HashMap;

use crate::types::ItemId;

/// Transient visual state of one drawable, carried across frames.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct AnimationState {
    /// Current opacity in `[0, 1]`.
    pub opacity: f32,
    /// Current scale in `[min_animation_scale, 1]`.
    pub scale: f32,
    /// Whether the drawable passed the occlusion test last frame.
    pub visible: bool,
    /// Frames processed since first seen.
    pub frames: u32,
}

impl Default for AnimationState {
    fn default() -> Self {
        Self {
            opacity: 1.0,
            scale: 1.0,
            visible: true,
            frames: 0,
        }
    }
}

/// Animation state keyed by drawable identity.
///
/// Entries are created on first lookup and are only removed by
/// [`forget`](Self::forget) or [`retain`](Self::retain). Hosts must call one of
/// them when drawables leave the scene.
#[derive(Clone, Debug, Default)]
pub struct AnimationMemory {
    states: HashMap<ItemId, AnimationState>,
}

impl AnimationMemory {
    /// Create an empty memory.
    pub fn new() -> Self {
        Self::default()
    }

    /// State for `id`, created with defaults if missing.
    pub fn entry(&mut self, id: ItemId) -> &mut AnimationState {
        self.states.entry(id).or_default()
    }

    /// State for `id`, if it has been seen.
    pub fn get(&self, id: ItemId) -> Option<&AnimationState> {
        self.states.get(&id)
    }

    /// Whether `id` was visible last frame. Unseen drawables count as visible.
    pub fn was_visible(&self, id: ItemId) -> bool {
        self.states.get(&id).is_none_or(|s| s.visible)
    }

    /// Drop the state for `id`.
    pub fn forget(&mut self, id: ItemId) -> Option<AnimationState> {
        self.states.remove(&id)
    }

    /// Keep only the entries for which `keep` returns true.
    pub fn retain(&mut self, mut keep: impl FnMut(ItemId, &AnimationState) -> bool) {
        self.states.retain(|id, state| keep(*id, state));
    }

    /// Number of tracked drawables.
    pub fn len(&self) -> usize {
        self.states.len()
    }

    /// True when nothing is tracked.
    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    /// Drop everything.
    pub fn clear(&mut self) {
        self.states.clear();
    }

    /// All tracked states, in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = (ItemId, &AnimationState)> + '_ {
        self.states.iter().map(|(id, s)| (*id, s))
    }
}
