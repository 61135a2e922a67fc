// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Uniform grid backend.

use alloc::boxed::Box;
use alloc::collections::BTreeSet;
use alloc::vec::Vec;
use core::fmt::Debug;

use hashbrown::HashMap;

use crate::backend::Backend;
use crate::types::Aabb;

/// Boxes covering more cells than this are kept on a side list that every
/// query scans, instead of being spread over the grid.
const MAX_CELLS_PER_BOX: i64 = 64;

/// Uniform grid backend.
///
/// Maps each box to the cells it covers and answers queries from the covered
/// cells only. Works for negative coordinates; cells are anchored at the origin.
#[derive(Clone)]
pub struct UniformGrid {
    cell_w: f64,
    cell_h: f64,
    boxes: Vec<Aabb>,
    cells: HashMap<(i64, i64), Vec<usize>>,
    oversized: Vec<usize>,
}

impl UniformGrid {
    /// Create a grid with the given cell size in pixels.
    ///
    /// Non-positive or non-finite sizes fall back to 64 pixels.
    pub fn new(cell_w: f64, cell_h: f64) -> Self {
        let sane = |v: f64| if v.is_finite() && v > 0.0 { v } else { 64.0 };
        Self {
            cell_w: sane(cell_w),
            cell_h: sane(cell_h),
            boxes: Vec::new(),
            cells: HashMap::new(),
            oversized: Vec::new(),
        }
    }

    /// Cell size as `(width, height)`.
    pub fn cell_size(&self) -> (f64, f64) {
        (self.cell_w, self.cell_h)
    }

    #[inline]
    fn floor_to_i64(v: f64) -> i64 {
        #[allow(
            clippy::cast_possible_truncation,
            reason = "Cell coordinates saturate on purpose for far off-screen boxes."
        )]
        let i = v as i64;
        if (i as f64) > v { i - 1 } else { i }
    }

    fn cell_of(&self, x: f64, y: f64) -> (i64, i64) {
        (
            Self::floor_to_i64(x / self.cell_w),
            Self::floor_to_i64(y / self.cell_h),
        )
    }

    /// Covered cell range, or `None` if the box is empty or too large for the grid.
    fn cell_range(&self, a: &Aabb) -> Option<((i64, i64), (i64, i64))> {
        if a.is_empty() {
            return None;
        }
        let lo = self.cell_of(a.min_x, a.min_y);
        let hi = self.cell_of(a.max_x, a.max_y);
        let span = hi.0.saturating_sub(lo.0).saturating_add(1) as i128
            * hi.1.saturating_sub(lo.1).saturating_add(1) as i128;
        if span > MAX_CELLS_PER_BOX as i128 {
            return None;
        }
        Some((lo, hi))
    }
}

impl Default for UniformGrid {
    fn default() -> Self {
        Self::new(64.0, 64.0)
    }
}

impl Debug for UniformGrid {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("UniformGrid")
            .field("cell_w", &self.cell_w)
            .field("cell_h", &self.cell_h)
            .field("boxes", &self.boxes.len())
            .field("cells", &self.cells.len())
            .field("oversized", &self.oversized.len())
            .finish_non_exhaustive()
    }
}

impl Backend for UniformGrid {
    fn insert(&mut self, slot: usize, aabb: Aabb) {
        if self.boxes.len() <= slot {
            self.boxes.resize(slot + 1, Aabb::EMPTY);
        }
        self.boxes[slot] = aabb;
        if aabb.is_empty() {
            return;
        }
        match self.cell_range(&aabb) {
            Some((lo, hi)) => {
                for y in lo.1..=hi.1 {
                    for x in lo.0..=hi.0 {
                        self.cells.entry((x, y)).or_default().push(slot);
                    }
                }
            }
            None => self.oversized.push(slot),
        }
    }

    fn clear(&mut self) {
        self.boxes.clear();
        // Keep the bucket allocations around for the next frame.
        for slots in self.cells.values_mut() {
            slots.clear();
        }
        self.oversized.clear();
    }

    fn query<'a>(&'a self, aabb: Aabb) -> Box<dyn Iterator<Item = usize> + 'a> {
        let mut set = BTreeSet::new();
        match self.cell_range(&aabb) {
            Some((lo, hi)) => {
                for y in lo.1..=hi.1 {
                    for x in lo.0..=hi.0 {
                        if let Some(slots) = self.cells.get(&(x, y)) {
                            set.extend(slots.iter().copied());
                        }
                    }
                }
                set.extend(self.oversized.iter().copied());
            }
            None if aabb.is_empty() => {}
            // The query itself spans too many cells; a scan is cheaper.
            None => set.extend(0..self.boxes.len()),
        }
        Box::new(
            set.into_iter()
                .filter(move |&slot| self.boxes[slot].overlaps(&aabb)),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec::Vec;

    #[test]
    fn floor_handles_negatives() {
        assert_eq!(UniformGrid::floor_to_i64(-0.5), -1);
        assert_eq!(UniformGrid::floor_to_i64(-1.0), -1);
        assert_eq!(UniformGrid::floor_to_i64(1.5), 1);
    }

    #[test]
    fn boxes_on_a_shared_cell_edge_are_found() {
        let mut grid = UniformGrid::new(10.0, 10.0);
        grid.insert(0, Aabb::new(0.0, 0.0, 10.0, 10.0));
        let hits: Vec<_> = grid.query(Aabb::new(10.0, 3.0, 15.0, 4.0)).collect();
        assert_eq!(hits, [0]);
    }

    #[test]
    fn negative_coordinates_and_oversized_boxes() {
        let mut grid = UniformGrid::new(8.0, 8.0);
        grid.insert(0, Aabb::new(-20.0, -20.0, -12.0, -12.0));
        grid.insert(1, Aabb::new(-10_000.0, 0.0, 10_000.0, 4.0));
        grid.insert(2, Aabb::new(100.0, 100.0, 104.0, 104.0));
        let near_origin: Vec<_> = grid.query(Aabb::new(-14.0, -14.0, 2.0, 2.0)).collect();
        assert_eq!(near_origin, [0, 1]);
        let far: Vec<_> = grid.query(Aabb::new(90.0, 90.0, 101.0, 101.0)).collect();
        assert_eq!(far, [2]);
        let huge: Vec<_> = grid
            .query(Aabb::new(-1.0e6, -1.0e6, 1.0e6, 1.0e6))
            .collect();
        assert_eq!(huge, [0, 1, 2]);
    }

    #[test]
    fn clear_keeps_grid_usable() {
        let mut grid = UniformGrid::default();
        grid.insert(0, Aabb::new(0.0, 0.0, 5.0, 5.0));
        grid.clear();
        assert_eq!(grid.query(Aabb::new(0.0, 0.0, 5.0, 5.0)).count(), 0);
        grid.insert(0, Aabb::new(200.0, 200.0, 205.0, 205.0));
        assert_eq!(grid.query(Aabb::new(0.0, 0.0, 5.0, 5.0)).count(), 0);
        assert_eq!(grid.query(Aabb::new(201.0, 201.0, 202.0, 202.0)).count(), 1);
    }

    #[test]
    fn bad_cell_size_falls_back() {
        let grid = UniformGrid::new(0.0, f64::NAN);
        assert_eq!(grid.cell_size(), (64.0, 64.0));
    }
}
