// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Understory Occupancy: a screen-space occupancy index for decluttering.
//!
//! A declutter pass walks candidates in priority order and accepts each one
//! whose box does not collide with the boxes already accepted this frame.
//! This crate is the "already accepted" side of that loop.
//!
//! - Record claimed boxes with an optional group id.
//! - Ask whether a new box conflicts with any recorded box of a different group.
//! - Clear everything at the start of the next frame, keeping allocations.
//!
//! Boxes use closed edges: touching boxes collide. Empty boxes never collide.
//!
//! # Example
//!
//! ```rust
//! use understory_occupancy::{Aabb, Occupancy};
//!
//! let mut used: Occupancy<i64> = Occupancy::new();
//! used.insert(Aabb::new(0.0, 0.0, 10.0, 10.0), Some(1));
//!
//! // Another facet of feature 1 may overlap it.
//! assert!(used.is_clear(Aabb::new(5.0, 5.0, 15.0, 15.0), Some(1)));
//! // A different feature may not.
//! assert!(!used.is_clear(Aabb::new(5.0, 5.0, 15.0, 15.0), Some(2)));
//! // Ungrouped boxes collide with everything.
//! assert!(!used.is_clear(Aabb::new(5.0, 5.0, 15.0, 15.0), None));
//! ```
//!
//! Backends are pluggable via [`Backend`]. The default is a flat vector
//! ([`FlatScan`]); a uniform grid ([`UniformGrid`]) is available for dense frames:
//!
//! ```rust
//! use understory_occupancy::{Aabb, Occupancy, UniformGrid};
//!
//! let mut used: Occupancy<i64, UniformGrid> =
//!     Occupancy::with_backend(UniformGrid::new(32.0, 32.0));
//! used.insert(Aabb::from_xywh(100.0, 100.0, 40.0, 12.0), None);
//! assert!(used.conflict(Aabb::from_xywh(130.0, 105.0, 40.0, 12.0), None).is_some());
//! ```

#![no_std]

extern crate alloc;

pub mod backend;
pub mod backends;
pub mod occupancy;
pub mod types;

pub use backend::Backend;
pub use backends::{AnyBackend, FlatScan, UniformGrid};
pub use occupancy::{Conflict, Occupancy};
pub use types::Aabb;
