// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Flat vector backend with linear scans.

use alloc::boxed::Box;
use alloc::vec::Vec;
use core::fmt::Debug;

use crate::backend::Backend;
use crate::types::Aabb;

/// Flat vector backend. Every query scans every recorded box.
#[derive(Clone, Default)]
pub struct FlatScan {
    boxes: Vec<Aabb>,
}

impl FlatScan {
    /// Create an empty backend.
    pub fn new() -> Self {
        Self::default()
    }
}

impl Debug for FlatScan {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("FlatScan")
            .field("boxes", &self.boxes.len())
            .finish_non_exhaustive()
    }
}

impl Backend for FlatScan {
    fn insert(&mut self, slot: usize, aabb: Aabb) {
        if self.boxes.len() <= slot {
            self.boxes.resize(slot + 1, Aabb::EMPTY);
        }
        self.boxes[slot] = aabb;
    }

    fn clear(&mut self) {
        self.boxes.clear();
    }

    fn query<'a>(&'a self, aabb: Aabb) -> Box<dyn Iterator<Item = usize> + 'a> {
        Box::new(
            self.boxes
                .iter()
                .enumerate()
                .filter(move |(_, b)| b.overlaps(&aabb))
                .map(|(i, _)| i),
        )
    }
}
