//! Image-space / view-space mathematics.
//!
//! An opened image is drawn scaled to fit its container and centered in it.
//! [`ScaleState`] captures that fit, and the functions here move rectangles
//! and points between the two frames. Everything is pure; the only failure is
//! asking for a fit before there is anything to fit.

use thiserror::Error;

use crate::annotation::{Point, Rect};

/// Errors raised by transform construction.
#[derive(Error, Debug, Clone, Copy, PartialEq)]
pub enum TransformError {
    /// Scale must be finite and strictly positive
    #[error("Invalid scale {scale}: an image must be loaded into a non-empty container")]
    InvalidScale {
        /// The rejected scale value
        scale: f32,
    },
}

/// Pixel dimensions of an opened bitmap or of its container.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageDimensions {
    pub width: u32,
    pub height: u32,
}

impl ImageDimensions {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// True when either side is zero.
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// Scale and centering offset of the displayed image.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScaleState {
    scale: f32,
    offset_x: f32,
    offset_y: f32,
}

impl ScaleState {
    /// Create a scale state from raw values.
    pub fn new(scale: f32, offset_x: f32, offset_y: f32) -> Result<Self, TransformError> {
        if !scale.is_finite() || scale <= 0.0 {
            return Err(TransformError::InvalidScale { scale });
        }
        Ok(Self {
            scale,
            offset_x,
            offset_y,
        })
    }

    /// Create an identity state (scale 1, no offset).
    pub fn identity() -> Self {
        Self {
            scale: 1.0,
            offset_x: 0.0,
            offset_y: 0.0,
        }
    }

    /// Fit an image into a container, preserving aspect ratio and centering.
    ///
    /// The scale is the smaller of the two axis ratios, except that an image
    /// whose width or height exactly equals the container's is shown at
    /// scale 1 whatever the other axis says.
    pub fn fit(image: ImageDimensions, container: ImageDimensions) -> Result<Self, TransformError> {
        if image.is_empty() || container.is_empty() {
            return Err(TransformError::InvalidScale { scale: 0.0 });
        }

        let (iw, ih) = (image.width as f32, image.height as f32);
        let (cw, ch) = (container.width as f32, container.height as f32);

        let scale = if image.width == container.width || image.height == container.height {
            1.0
        } else {
            (cw / iw).min(ch / ih)
        };

        Self::new(scale, (cw - iw * scale) / 2.0, (ch - ih * scale) / 2.0)
    }

    pub fn scale(&self) -> f32 {
        self.scale
    }

    pub fn offset_x(&self) -> f32 {
        self.offset_x
    }

    pub fn offset_y(&self) -> f32 {
        self.offset_y
    }

    /// Size of the image once drawn at this scale.
    pub fn scaled_size(&self, image: ImageDimensions) -> (f32, f32) {
        (
            image.width as f32 * self.scale,
            image.height as f32 * self.scale,
        )
    }

    /// Check whether a view-space point falls on the drawn image.
    pub fn contains_view_point(&self, image: ImageDimensions, point: Point) -> bool {
        let (w, h) = self.scaled_size(image);
        point.x >= self.offset_x
            && point.x <= self.offset_x + w
            && point.y >= self.offset_y
            && point.y <= self.offset_y + h
    }
}

impl Default for ScaleState {
    fn default() -> Self {
        Self::identity()
    }
}

/// Convert an image-space rectangle to view space.
pub fn to_view_space(rect: &Rect, state: &ScaleState) -> Rect {
    Rect {
        x: rect.x * state.scale + state.offset_x,
        y: rect.y * state.scale + state.offset_y,
        width: rect.width * state.scale,
        height: rect.height * state.scale,
        kind: rect.kind,
    }
}

/// Convert a view-space rectangle to image space.
pub fn to_image_space(rect: &Rect, state: &ScaleState) -> Rect {
    Rect {
        x: (rect.x - state.offset_x) / state.scale,
        y: (rect.y - state.offset_y) / state.scale,
        width: rect.width / state.scale,
        height: rect.height / state.scale,
        kind: rect.kind,
    }
}

/// Convert an image-space point to view space.
pub fn point_to_view_space(point: Point, state: &ScaleState) -> Point {
    Point::new(
        point.x * state.scale + state.offset_x,
        point.y * state.scale + state.offset_y,
    )
}

/// Convert a view-space point to image space.
pub fn point_to_image_space(point: Point, state: &ScaleState) -> Point {
    Point::new(
        (point.x - state.offset_x) / state.scale,
        (point.y - state.offset_y) / state.scale,
    )
}
