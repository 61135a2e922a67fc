// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Public `Occupancy` API and generic implementation over a pluggable backend.

use alloc::vec::Vec;
use core::fmt::Debug;

use crate::backend::Backend;
use crate::backends::flat::FlatScan;
use crate::types::Aabb;

/// A stored box that blocks a candidate.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Conflict<G> {
    /// Slot of the blocking box, in insertion order.
    pub slot: usize,
    /// Group of the blocking box.
    pub group: Option<G>,
    /// The blocking box.
    pub aabb: Aabb,
}

/// Screen space claimed by accepted items during one frame.
///
/// Each box carries an optional group. Boxes of the same present group never
/// block each other; boxes without a group block everything they overlap.
#[derive(Clone)]
pub struct Occupancy<G, B = FlatScan> {
    entries: Vec<(Option<G>, Aabb)>,
    backend: B,
}

impl<G: Copy + Eq, B: Backend + Default> Occupancy<G, B> {
    /// Create an empty occupancy using the backend's default constructor.
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            backend: B::default(),
        }
    }
}

impl<G: Copy + Eq, B: Backend + Default> Default for Occupancy<G, B> {
    fn default() -> Self {
        Self::new()
    }
}

impl<G: Copy + Eq, B: Backend> Occupancy<G, B> {
    /// Create an empty occupancy over an explicit backend.
    pub fn with_backend(backend: B) -> Self {
        Self {
            entries: Vec::new(),
            backend,
        }
    }

    /// Replace the backend. Recorded boxes are re-inserted into the new one.
    pub fn set_backend(&mut self, mut backend: B) {
        backend.clear();
        for (slot, (_, aabb)) in self.entries.iter().enumerate() {
            backend.insert(slot, *aabb);
        }
        self.backend = backend;
    }

    /// The backend answering overlap queries.
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Number of recorded boxes.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if nothing has been recorded since the last clear.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Forget all recorded boxes.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.backend.clear();
    }

    /// Record a claimed box. Returns its slot.
    pub fn insert(&mut self, aabb: Aabb, group: Option<G>) -> usize {
        let slot = self.entries.len();
        self.entries.push((group, aabb));
        self.backend.insert(slot, aabb);
        slot
    }

    /// Recorded boxes in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (Option<G>, Aabb)> + '_ {
        self.entries.iter().copied()
    }

    /// The earliest recorded box that blocks `aabb` for an item of `group`.
    ///
    /// A box blocks when it overlaps and is not part of the same present group.
    pub fn conflict(&self, aabb: Aabb, group: Option<G>) -> Option<Conflict<G>> {
        if aabb.is_empty() {
            return None;
        }
        for slot in self.backend.query(aabb) {
            let Some(&(other, stored)) = self.entries.get(slot) else {
                continue;
            };
            if !stored.overlaps(&aabb) {
                continue;
            }
            if group.is_some() && other == group {
                continue;
            }
            return Some(Conflict {
                slot,
                group: other,
                aabb: stored,
            });
        }
        None
    }

    /// True if `aabb` can be claimed by an item of `group`.
    pub fn is_clear(&self, aabb: Aabb, group: Option<G>) -> bool {
        self.conflict(aabb, group).is_none()
    }
}

impl<G, B: Debug> Debug for Occupancy<G, B> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Occupancy")
            .field("entries", &self.entries.len())
            .field("backend", &self.backend)
            .finish_non_exhaustive()
    }
}
