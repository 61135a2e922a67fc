// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Layout options: object limit, snapping, animation tuning.

use alloc::vec::Vec;
use core::fmt;

/// Spatial structure backing the per-frame occupancy test.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum OccupancyBackend {
    /// Compare against every accepted box. Best for a few hundred labels.
    #[default]
    Linear,
    /// Bucket accepted boxes into square cells of `cell_size` pixels.
    Grid {
        /// Cell edge length in pixels.
        cell_size: f64,
    },
}

/// Configuration snapshot consumed by every declutter pass.
///
/// Replace it wholesale through [`Declutter::set_options`](crate::Declutter::set_options);
/// it is never mutated during a frame.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct LayoutOptions {
    /// Upper bound on accepted items per frame.
    pub max_objects: u32,
    /// Draw at pixel centers while the camera is stationary.
    pub snap_to_pixel: bool,
    /// Seconds to fade and scale in.
    pub in_animation_time: f32,
    /// Seconds to fade and scale out.
    pub out_animation_time: f32,
    /// Scale occluded items shrink to.
    pub min_animation_scale: f32,
    /// Opacity occluded items fade to.
    pub min_animation_alpha: f32,
    /// Order candidates by descending priority when no custom comparator is installed.
    pub sort_by_priority: bool,
    /// Render bin order hint for the host; not used by the layout itself.
    pub render_order: i32,
    /// Occupancy index used for the overlap test.
    pub occupancy: OccupancyBackend,
}

impl Default for LayoutOptions {
    fn default() -> Self {
        Self {
            max_objects: u32::MAX,
            snap_to_pixel: false,
            in_animation_time: 0.40,
            out_animation_time: 0.0,
            min_animation_scale: 0.45,
            min_animation_alpha: 0.35,
            sort_by_priority: false,
            render_order: 13,
            occupancy: OccupancyBackend::Linear,
        }
    }
}

/// A configuration value that is accepted but probably not what the host meant.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum OptionsIssue {
    /// `max_objects` is zero, so nothing will ever be drawn.
    ZeroMaxObjects,
    /// An animation duration is negative or not finite. The animator treats it
    /// as an instant transition.
    BadDuration {
        /// Field name.
        field: &'static str,
        /// Offending value.
        value: f32,
    },
    /// A minimum scale or alpha lies outside `[0, 1]`.
    OutOfUnitRange {
        /// Field name.
        field: &'static str,
        /// Offending value.
        value: f32,
    },
    /// The grid cell size is not a positive finite number.
    BadCellSize(f64),
}

impl fmt::Display for OptionsIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ZeroMaxObjects => f.write_str("max_objects is 0; nothing will be drawn"),
            Self::BadDuration { field, value } => {
                write!(f, "{field} = {value} is not a usable duration")
            }
            Self::OutOfUnitRange { field, value } => {
                write!(f, "{field} = {value} lies outside [0, 1]")
            }
            Self::BadCellSize(size) => write!(f, "grid cell size {size} is not positive"),
        }
    }
}

impl LayoutOptions {
    /// Report inconsistent values. Each issue is also logged at `warn` level.
    ///
    /// Nothing here is rejected: the options are used as given.
    pub fn validate(&self) -> Vec<OptionsIssue> {
        let mut issues = Vec::new();
        if self.max_objects == 0 {
            issues.push(OptionsIssue::ZeroMaxObjects);
        }
        for (field, value) in [
            ("in_animation_time", self.in_animation_time),
            ("out_animation_time", self.out_animation_time),
        ] {
            if !(value.is_finite() && value >= 0.0) {
                issues.push(OptionsIssue::BadDuration { field, value });
            }
        }
        for (field, value) in [
            ("min_animation_scale", self.min_animation_scale),
            ("min_animation_alpha", self.min_animation_alpha),
        ] {
            if !(0.0..=1.0).contains(&value) {
                issues.push(OptionsIssue::OutOfUnitRange { field, value });
            }
        }
        if let OccupancyBackend::Grid { cell_size } = self.occupancy
            && !(cell_size.is_finite() && cell_size > 0.0)
        {
            issues.push(OptionsIssue::BadCellSize(cell_size));
        }
        for issue in &issues {
            log::warn!("layout options: {issue}");
        }
        issues
    }
}
