// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Understory Declutter: screen-space label layout for map views.
//!
//! Every frame a host hands over the labels, icons and frames it wants to
//! draw. The engine decides which of them fit without overlapping, where they
//! go, and how strongly they are drawn:
//!
//! - Candidates are ordered (front to back, by priority, or by a custom
//!   comparator) and accepted greedily against the boxes already accepted.
//! - Facets of one map feature share a [`GroupId`] and stand or fall together.
//! - Labels attached to a line can rotate with it and slide along it to stay
//!   on screen.
//! - Accepted items fade and grow in; rejected items fade and shrink out.
//!   Animation state is remembered per item and per viewport.
//! - The result is emitted through a [`DrawTarget`] with one window-space
//!   projection for the whole batch.
//!
//! # Example
//!
//! ```rust
//! use core::time::Duration;
//! use glam::{DMat4, DVec3};
//! use kurbo::Rect;
//! use understory_declutter::{
//!     Declutter, FrameView, ItemId, RecordingTarget, RenderItem, ViewportId,
//! };
//!
//! // A 200x100 window where world x/y map straight to pixels.
//! let viewport = Rect::new(0.0, 0.0, 200.0, 100.0);
//! let projection = DMat4::orthographic_rh_gl(0.0, 200.0, 0.0, 100.0, 0.1, 100.0);
//! let frame = FrameView::new(DMat4::IDENTITY, projection, viewport);
//!
//! let label = |id, x, depth| RenderItem {
//!     id: ItemId(id),
//!     bounds: Rect::new(0.0, 0.0, 40.0, 12.0),
//!     anchor: DVec3::new(x, 50.0, -1.0),
//!     depth,
//!     ..Default::default()
//! };
//! let items = [label(1, 50.0, 0.1), label(2, 60.0, 0.2), label(3, 150.0, 0.3)];
//!
//! let mut declutter = Declutter::default();
//! let layout = declutter
//!     .sort(ViewportId(0), &frame, &items, Duration::ZERO)
//!     .unwrap();
//! assert!(layout.is_passed(ItemId(1)));
//! assert!(layout.is_failed(ItemId(2)));
//! assert!(layout.is_passed(ItemId(3)));
//!
//! let mut target = RecordingTarget::default();
//! declutter.draw(ViewportId(0), viewport, &mut target);
//! // Back to front: the occluded label first, then the accepted ones.
//! assert_eq!(target.drawn(), [ItemId(2), ItemId(3), ItemId(1)]);
//! ```
//!
//! # Features
//!
//! - `std` (default): use the standard library math.
//! - `libm`: `no_std` math through `libm`.
//! - `serde`: (de)serialize [`LayoutOptions`] from host configuration.

#![no_std]

extern crate alloc;

pub mod animate;
pub mod context;
pub mod emit;
pub mod error;
pub mod follow_line;
pub mod lod;
pub mod memory;
pub mod options;
pub mod projection;
pub mod rotate;
pub mod session;
pub mod sort;
mod sorter;
pub mod types;

pub use context::Declutter;
pub use emit::{Command, DrawTarget, EmitStats, RecordingTarget, emit};
pub use error::LayoutError;
pub use lod::{LodChange, LodLevel, LodTable};
pub use memory::{AnimationMemory, AnimationState};
pub use options::{LayoutOptions, OccupancyBackend, OptionsIssue};
pub use session::ViewportSession;
pub use sort::{Comparator, by_depth, by_priority};
pub use types::{
    DrawItem, FrameLayout, FrameStats, FrameView, GroupId, ItemId, ItemKind, LayoutFlags,
    LineSegment, Placement, RenderItem, StateKey, ViewportId,
};
