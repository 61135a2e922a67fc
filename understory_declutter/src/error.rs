// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Reasons a declutter pass is skipped.

use core::fmt;

use crate::types::ViewportId;

/// Why a frame's declutter pass did not run.
///
/// None of these are fatal. The session keeps its previous state and the next
/// frame is processed normally.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum LayoutError {
    /// The render target has no output surface (for example a master camera
    /// without a graphics context in a multi-screen setup).
    MissingRenderTarget(ViewportId),
    /// The viewport has zero, negative, or non-finite size.
    DegenerateViewport(ViewportId),
}

impl LayoutError {
    /// The viewport the error refers to.
    pub fn viewport(&self) -> ViewportId {
        match *self {
            Self::MissingRenderTarget(id) | Self::DegenerateViewport(id) => id,
        }
    }
}

impl fmt::Display for LayoutError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingRenderTarget(id) => {
                write!(f, "viewport {} has no render target", id.0)
            }
            Self::DegenerateViewport(id) => {
                write!(f, "viewport {} has a degenerate size", id.0)
            }
        }
    }
}

impl core::error::Error for LayoutError {}
