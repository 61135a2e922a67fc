// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Backend trait for occupancy acceleration structures.

use alloc::boxed::Box;

use crate::types::Aabb;

/// Spatial backend abstraction used by [`Occupancy`](crate::Occupancy).
///
/// Backends only ever grow within a frame and are cleared between frames, so
/// there is no update or remove operation.
pub trait Backend {
    /// Record a box under `slot`. Slots are handed out densely from zero.
    fn insert(&mut self, slot: usize, aabb: Aabb);

    /// Forget every recorded box.
    fn clear(&mut self);

    /// Slots whose box may overlap `aabb`, in ascending slot order.
    ///
    /// Returning extra candidates is allowed; the caller re-checks overlap.
    fn query<'a>(&'a self, aabb: Aabb) -> Box<dyn Iterator<Item = usize> + 'a>;
}
