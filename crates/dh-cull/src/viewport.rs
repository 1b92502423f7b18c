//! Orthographic camera footprint.

use dh_core::{Rect, Vec2};

/// What the culler needs to know about the camera.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CameraView {
    pub position:   Vec2,
    /// Half the visible height in world units.
    pub ortho_size: f32,
    /// Width / height.
    pub aspect:     f32,
}

impl CameraView {
    pub fn new(position: Vec2, ortho_size: f32, aspect: f32) -> Self {
        Self { position, ortho_size, aspect }
    }

    /// The exact visible rectangle.
    pub fn view_rect(&self) -> Rect {
        let height = self.ortho_size * 2.0;
        Rect::from_center(self.position, height * self.aspect, height)
    }

    /// The visible rectangle with both sides scaled by `1 + offset`.
    #[inline]
    pub fn padded_rect(&self, offset: f32) -> Rect {
        self.view_rect().expanded(offset)
    }
}
