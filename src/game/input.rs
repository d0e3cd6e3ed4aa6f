//! Pointer Input
//!
//! Click coordinates as delivered by the pointer-event source, plus the
//! bounding box of the clickable surface they are measured against.

use serde::{Serialize, Deserialize};

/// A click in viewport coordinates.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PointerEvent {
    /// Horizontal viewport coordinate
    pub client_x: f64,
    /// Vertical viewport coordinate
    pub client_y: f64,
}

impl PointerEvent {
    /// Create a pointer event.
    pub const fn new(client_x: f64, client_y: f64) -> Self {
        Self { client_x, client_y }
    }
}

/// Bounding rectangle of the clickable surface, in viewport coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SurfaceRect {
    /// Left edge
    pub left: f64,
    /// Top edge
    pub top: f64,
    /// Width
    pub width: f64,
    /// Height
    pub height: f64,
}

impl SurfaceRect {
    /// The round click button: a 256x256 surface anchored at the origin.
    pub const BUTTON: SurfaceRect = SurfaceRect {
        left: 0.0,
        top: 0.0,
        width: 256.0,
        height: 256.0,
    };

    /// Create a rectangle.
    pub const fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self { left, top, width, height }
    }

    /// Position of a pointer event relative to this surface's top-left corner.
    ///
    /// Not clamped: a point outside the rectangle yields negative or
    /// oversized offsets.
    #[inline]
    pub fn relative_position(&self, pointer: PointerEvent) -> (f64, f64) {
        (pointer.client_x - self.left, pointer.client_y - self.top)
    }

    /// Center of the surface in viewport coordinates.
    pub fn center(&self) -> PointerEvent {
        PointerEvent::new(self.left + self.width / 2.0, self.top + self.height / 2.0)
    }

    /// Check whether a pointer event falls inside the rectangle.
    pub fn contains(&self, pointer: PointerEvent) -> bool {
        let (x, y) = self.relative_position(pointer);
        (0.0..=self.width).contains(&x) && (0.0..=self.height).contains(&y)
    }
}

impl Default for SurfaceRect {
    fn default() -> Self {
        Self::BUTTON
    }
}
