//! Stored face positions and their resolved pixel cache.

use std::mem;

use serde::{Deserialize, Serialize};

use crate::{
    core::coords::PositionBase,
    geom::{Face, Rect},
};

/// A single stored face value and the base it is expressed in.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct FaceValue {
    /// Raw value. Pixels, or a fraction for percentage bases.
    pub value: f32,
    /// Coordinate base of `value`.
    #[serde(default)]
    pub base: PositionBase,
}

impl FaceValue {
    /// Construct a face value.
    pub fn new(value: f32, base: PositionBase) -> Self {
        Self { value, base }
    }
}

/// The four stored faces of a widget.
///
/// Near faces (left, top) are positions in their base's frame. Far faces
/// (right, bottom) are extents measured from the widget's own near face, so a
/// right face of `100` pixels makes the widget 100 pixels wide wherever it sits.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Position {
    /// Left face.
    pub left: FaceValue,
    /// Top face.
    pub top: FaceValue,
    /// Right face, as a width.
    pub right: FaceValue,
    /// Bottom face, as a height.
    pub bottom: FaceValue,
}

impl Position {
    /// A position with all four faces in one base.
    pub fn new(left: f32, top: f32, width: f32, height: f32, base: PositionBase) -> Self {
        Self {
            left: FaceValue::new(left, base),
            top: FaceValue::new(top, base),
            right: FaceValue::new(width, base),
            bottom: FaceValue::new(height, base),
        }
    }

    /// A position filling its owner.
    pub fn fill() -> Self {
        Self {
            left: FaceValue::new(0.0, PositionBase::PercentageOwner),
            top: FaceValue::new(0.0, PositionBase::PercentageOwner),
            right: FaceValue::new(1.0, PositionBase::PercentageOwner),
            bottom: FaceValue::new(1.0, PositionBase::PercentageOwner),
        }
    }

    /// The stored value for a face.
    pub fn get(&self, face: Face) -> FaceValue {
        match face {
            Face::Left => self.left,
            Face::Top => self.top,
            Face::Right => self.right,
            Face::Bottom => self.bottom,
        }
    }

    /// Mutable access to a face.
    pub fn get_mut(&mut self, face: Face) -> &mut FaceValue {
        match face {
            Face::Left => &mut self.left,
            Face::Top => &mut self.top,
            Face::Right => &mut self.right,
            Face::Bottom => &mut self.bottom,
        }
    }

    /// The base a face is declared in.
    pub fn base(&self, face: Face) -> PositionBase {
        self.get(face).base
    }

    /// The raw value of a face.
    pub fn value(&self, face: Face) -> f32 {
        self.get(face).value
    }
}

/// Resolved pixel faces with a per-face freshness flag.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RenderBounds {
    /// Last computed pixel value per face.
    values: [f32; 4],
    /// Whether each value is current.
    resolved: [bool; 4],
}

impl RenderBounds {
    /// The last computed value for a face, current or not.
    pub fn value(&self, face: Face) -> f32 {
        self.values[face.index()]
    }

    /// Is the cached value for the face current?
    pub fn is_resolved(&self, face: Face) -> bool {
        self.resolved[face.index()]
    }

    /// Are all four faces current?
    pub fn is_fully_resolved(&self) -> bool {
        self.resolved.iter().all(|r| *r)
    }

    /// Store a fresh value. Returns the previous value.
    pub fn set(&mut self, face: Face, value: f32) -> f32 {
        let prev = self.values[face.index()];
        self.values[face.index()] = value;
        self.resolved[face.index()] = true;
        prev
    }

    /// Mark a face stale. Returns true if it was current.
    pub fn invalidate(&mut self, face: Face) -> bool {
        mem::replace(&mut self.resolved[face.index()], false)
    }

    /// Mark every face stale.
    pub fn invalidate_all(&mut self) {
        self.resolved = [false; 4];
    }

    /// The cached faces as a rectangle.
    pub fn rect(&self) -> Rect {
        Rect::from_faces(self.values)
    }
}
