//! Geometry primitives used across trellis.

#![warn(missing_docs)]

/// Error types for geometry operations.
mod error;
/// Faces and orientations.
mod face;
/// Points and sizes.
mod point;
/// Face-addressed rectangles.
mod rect;
/// Face segments and distances.
mod segment;
/// Rotation transforms.
mod transform;

pub use error::{Error, Result};
pub use face::{Face, Orientation};
pub use point::{Point, Size};
pub use rect::Rect;
pub use segment::FaceSegment;
pub use transform::{Quad, Transform};
