// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-viewport session state.

use alloc::vec::Vec;
use core::time::Duration;

use glam::DMat4;
use hashbrown::HashSet;
use understory_occupancy::{AnyBackend, FlatScan, Occupancy, UniformGrid};

use crate::memory::AnimationMemory;
use crate::options::OccupancyBackend;
use crate::types::{FrameLayout, GroupId};

/// Everything one render target keeps between frames.
///
/// Created lazily by [`Declutter`](crate::Declutter) on the first pass for a
/// viewport. The layout buffers and occupancy index are reused every frame.
#[derive(Debug, Default)]
pub struct ViewportSession {
    pub(crate) memory: AnimationMemory,
    pub(crate) layout: FrameLayout,
    pub(crate) occupancy: Occupancy<GroupId, AnyBackend>,
    pub(crate) culled_groups: HashSet<GroupId>,
    pub(crate) order: Vec<usize>,
    backend_kind: OccupancyBackend,
    last_vpw: Option<DMat4>,
    last_timestamp: Duration,
    started: bool,
}

impl ViewportSession {
    /// A fresh session with no history.
    pub fn new() -> Self {
        Self::default()
    }

    /// Animation memory of this viewport.
    pub fn memory(&self) -> &AnimationMemory {
        &self.memory
    }

    /// Mutable animation memory, for host-driven eviction.
    pub fn memory_mut(&mut self) -> &mut AnimationMemory {
        &mut self.memory
    }

    /// Result of the most recent completed pass.
    pub fn layout(&self) -> &FrameLayout {
        &self.layout
    }

    /// Whether no pass has run yet.
    pub fn is_first_frame(&self) -> bool {
        !self.started
    }

    /// Time since the previous pass, and record `now` as the new timestamp.
    ///
    /// Zero on the first frame. A clock that goes backwards also yields zero.
    pub(crate) fn advance_clock(&mut self, now: Duration) -> Duration {
        if !self.started {
            self.started = true;
            self.last_timestamp = now;
        }
        let elapsed = now.saturating_sub(self.last_timestamp);
        self.last_timestamp = now;
        elapsed
    }

    /// Record this frame's view-projection-window matrix.
    ///
    /// Returns whether it differs from the previous one. The first frame always
    /// counts as a change.
    pub(crate) fn update_camera(&mut self, vpw: DMat4) -> bool {
        let changed = self.last_vpw != Some(vpw);
        self.last_vpw = Some(vpw);
        changed
    }

    /// Reset per-frame buffers, switching the occupancy backend if the options changed.
    pub(crate) fn begin_frame(&mut self, backend: OccupancyBackend) {
        self.layout.clear();
        self.culled_groups.clear();
        self.order.clear();
        self.occupancy.clear();
        if backend != self.backend_kind {
            self.backend_kind = backend;
            self.occupancy.set_backend(match backend {
                OccupancyBackend::Linear => AnyBackend::Flat(FlatScan::default()),
                OccupancyBackend::Grid { cell_size } => {
                    AnyBackend::Grid(UniformGrid::new(cell_size, cell_size))
                }
            });
        }
    }
}
