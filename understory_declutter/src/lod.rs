// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Altitude-driven level of detail for composite labels.
//!
//! A composite label (icon, name, frequency, frame) shows fewer parts as the
//! camera climbs. Each part belongs to a level with a maximum camera altitude;
//! levels above their altitude are hidden. Hiding a level can also move the
//! remaining parts, for example to close the gap left by a hidden field.
//!
//! ```rust
//! use kurbo::Vec2;
//! use understory_declutter::LodTable;
//!
//! let mut lod = LodTable::new();
//! lod.push_level(f64::INFINITY, 4, Vec2::ZERO); // icon and name, always
//! lod.push_level(5_000.0, 2, Vec2::new(-12.0, 0.0)); // details, low altitude only
//!
//! assert_eq!(lod.visible_elements(), 6);
//! let change = lod.set_altitude(8_000.0);
//! assert_eq!(change.visible_elements, 4);
//! assert_eq!(change.shift, Vec2::new(12.0, 0.0));
//! ```

use alloc::vec::Vec;

use kurbo::Vec2;

/// One level of a [`LodTable`].
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct LodLevel {
    /// Highest camera altitude at which the level is shown.
    pub altitude_max: f64,
    /// Number of draw elements the level contributes.
    pub elements: usize,
    /// Displacement applied to the composite while the level is shown.
    pub shift: Vec2,
}

/// Outcome of [`LodTable::set_altitude`].
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct LodChange {
    /// Whether any level was shown or hidden.
    pub changed: bool,
    /// Levels now shown.
    pub visible_levels: usize,
    /// Draw elements now shown.
    pub visible_elements: usize,
    /// Displacement to apply to the composite for this change.
    pub shift: Vec2,
}

/// Levels of a composite label, sorted by descending `altitude_max`.
#[derive(Clone, Debug, Default)]
pub struct LodTable {
    levels: Vec<LodLevel>,
    /// Deepest shown level.
    current: Option<usize>,
    altitude: f64,
    offset: Vec2,
}

impl LodTable {
    /// An empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `elements` shown up to `altitude_max`. Returns the level index.
    ///
    /// Levels with an equal altitude are merged. Building resets the table to
    /// every level shown at altitude zero.
    pub fn push_level(&mut self, altitude_max: f64, elements: usize, shift: Vec2) -> usize {
        let index = match self
            .levels
            .iter()
            .position(|l| altitude_max >= l.altitude_max)
        {
            Some(i) if self.levels[i].altitude_max == altitude_max => {
                let level = &mut self.levels[i];
                level.elements += elements;
                level.shift += shift;
                i
            }
            Some(i) => {
                self.levels.insert(
                    i,
                    LodLevel {
                        altitude_max,
                        elements,
                        shift,
                    },
                );
                i
            }
            None => {
                self.levels.push(LodLevel {
                    altitude_max,
                    elements,
                    shift,
                });
                self.levels.len() - 1
            }
        };
        self.current = self.levels.len().checked_sub(1);
        self.altitude = 0.0;
        self.offset = Vec2::ZERO;
        index
    }

    /// All levels, highest altitude first.
    pub fn levels(&self) -> &[LodLevel] {
        &self.levels
    }

    /// Camera altitude last applied.
    pub fn altitude(&self) -> f64 {
        self.altitude
    }

    /// Number of levels shown.
    pub fn visible_levels(&self) -> usize {
        self.current.map_or(0, |i| i + 1)
    }

    /// Number of draw elements shown.
    pub fn visible_elements(&self) -> usize {
        self.levels[..self.visible_levels()]
            .iter()
            .map(|l| l.elements)
            .sum()
    }

    /// Displacement accumulated by hidden levels since the table was built.
    pub fn offset(&self) -> Vec2 {
        self.offset
    }

    /// Move the camera to `altitude`, hiding or showing levels incrementally.
    pub fn set_altitude(&mut self, altitude: f64) -> LodChange {
        let mut shift = Vec2::ZERO;
        let mut changed = false;
        if altitude > self.altitude {
            while let Some(i) = self.current
                && altitude > self.levels[i].altitude_max
            {
                shift -= self.levels[i].shift;
                self.current = i.checked_sub(1);
                changed = true;
            }
        } else if altitude < self.altitude {
            let mut next = self.visible_levels();
            while next < self.levels.len() && altitude <= self.levels[next].altitude_max {
                shift += self.levels[next].shift;
                self.current = Some(next);
                next += 1;
                changed = true;
            }
        }
        self.altitude = altitude;
        self.offset += shift;
        LodChange {
            changed,
            visible_levels: self.visible_levels(),
            visible_elements: self.visible_elements(),
            shift,
        }
    }
}
