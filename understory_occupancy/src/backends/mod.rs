// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Backend implementations for different spatial strategies.
//!
//! - `flat`: flat vector with linear scans. Matches the cost profile of a
//!   brute-force pairwise test and wins for a few dozen labels.
//! - `grid`: uniform grid keyed by cell. Wins once a frame accepts hundreds of
//!   boxes spread over the viewport.
//!
//! [`AnyBackend`] selects one of them at run time.

pub mod flat;
pub mod grid;

use alloc::boxed::Box;

use crate::backend::Backend;
use crate::types::Aabb;

pub use flat::FlatScan;
pub use grid::UniformGrid;

/// Run-time choice between the bundled backends.
#[derive(Clone, Debug)]
pub enum AnyBackend {
    /// Linear scan.
    Flat(FlatScan),
    /// Uniform grid.
    Grid(UniformGrid),
}

impl Default for AnyBackend {
    fn default() -> Self {
        Self::Flat(FlatScan::default())
    }
}

impl Backend for AnyBackend {
    fn insert(&mut self, slot: usize, aabb: Aabb) {
        match self {
            Self::Flat(b) => b.insert(slot, aabb),
            Self::Grid(b) => b.insert(slot, aabb),
        }
    }

    fn clear(&mut self) {
        match self {
            Self::Flat(b) => b.clear(),
            Self::Grid(b) => b.clear(),
        }
    }

    fn query<'a>(&'a self, aabb: Aabb) -> Box<dyn Iterator<Item = usize> + 'a> {
        match self {
            Self::Flat(b) => b.query(aabb),
            Self::Grid(b) => b.query(aabb),
        }
    }
}
