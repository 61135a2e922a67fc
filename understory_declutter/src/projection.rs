// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! World to window projection.
//!
//! Window coordinates follow the OpenGL convention: origin at the viewport's
//! lower-left corner, y up, depth mapped from `[-1, 1]` to `[0, 1]`.

use glam::{DMat4, DVec3};
use kurbo::Rect;

/// Matrix taking normalized device coordinates to window coordinates of `viewport`.
pub fn window_matrix(viewport: Rect) -> DMat4 {
    DMat4::from_translation(DVec3::new(viewport.x0, viewport.y0, 0.0))
        * DMat4::from_scale(DVec3::new(
            viewport.width() * 0.5,
            viewport.height() * 0.5,
            0.5,
        ))
        * DMat4::from_translation(DVec3::ONE)
}

/// Camera data derived once per frame.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Camera {
    /// View, projection, then window.
    pub vpw: DMat4,
    /// Eye position in world space.
    pub eye: DVec3,
    /// Unit view direction in world space.
    pub look: DVec3,
}

impl Camera {
    /// Build from view and projection matrices and the window to project into.
    pub fn new(view: DMat4, projection: DMat4, window: Rect) -> Self {
        let vpw = window_matrix(window) * projection * view;
        let inv = view.inverse();
        let eye = inv.transform_point3(DVec3::ZERO);
        let look = inv.transform_vector3(DVec3::NEG_Z).normalize_or_zero();
        Self { vpw, eye, look }
    }

    /// Window position of a world point, perspective divide included.
    pub fn project(&self, p: DVec3) -> DVec3 {
        self.vpw.project_point3(p)
    }

    /// Whether a world point lies behind the eye plane.
    pub fn is_behind(&self, p: DVec3) -> bool {
        (p - self.eye).dot(self.look) < 0.0
    }
}
