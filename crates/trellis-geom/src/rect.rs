use crate::{Face, FaceSegment, Orientation, Point, Size};

/// A rectangle addressed by its four face positions, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    /// Left face position.
    pub left: f32,
    /// Top face position.
    pub top: f32,
    /// Right face position.
    pub right: f32,
    /// Bottom face position.
    pub bottom: f32,
}

impl Rect {
    /// Construct a rectangle from its faces.
    pub fn new(left: f32, top: f32, right: f32, bottom: f32) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    /// Construct a rectangle from an origin and a size.
    pub fn from_origin(origin: Point, size: Size) -> Self {
        Self {
            left: origin.x,
            top: origin.y,
            right: origin.x + size.w,
            bottom: origin.y + size.h,
        }
    }

    /// Construct a rectangle from a per-face array indexed by `Face::index`.
    pub fn from_faces(faces: [f32; 4]) -> Self {
        Self::new(faces[0], faces[1], faces[2], faces[3])
    }

    /// The faces as an array indexed by `Face::index`.
    pub fn faces(&self) -> [f32; 4] {
        [self.left, self.top, self.right, self.bottom]
    }

    /// A zero rectangle at the origin.
    pub fn zero() -> Self {
        Self::default()
    }

    /// Position of a face.
    pub fn face(&self, face: Face) -> f32 {
        match face {
            Face::Left => self.left,
            Face::Top => self.top,
            Face::Right => self.right,
            Face::Bottom => self.bottom,
        }
    }

    /// Set the position of a face.
    pub fn set_face(&mut self, face: Face, value: f32) {
        match face {
            Face::Left => self.left = value,
            Face::Top => self.top = value,
            Face::Right => self.right = value,
            Face::Bottom => self.bottom = value,
        }
    }

    /// Width of the rectangle.
    pub fn width(&self) -> f32 {
        self.right - self.left
    }

    /// Height of the rectangle.
    pub fn height(&self) -> f32 {
        self.bottom - self.top
    }

    /// Width or height, depending on axis.
    pub fn extent(&self, orientation: Orientation) -> f32 {
        match orientation {
            Orientation::Horizontal => self.width(),
            Orientation::Vertical => self.height(),
        }
    }

    /// Size of the rectangle.
    pub fn size(&self) -> Size {
        Size::new(self.width(), self.height())
    }

    /// Center point.
    pub fn center(&self) -> Point {
        Point::new(
            (self.left + self.right) * 0.5,
            (self.top + self.bottom) * 0.5,
        )
    }

    /// True if the width or height is zero or negative.
    pub fn is_empty(&self) -> bool {
        self.width() <= 0.0 || self.height() <= 0.0
    }

    /// Does this rectangle contain a point? Far faces are exclusive.
    pub fn contains_point(&self, p: Point) -> bool {
        p.x >= self.left && p.x < self.right && p.y >= self.top && p.y < self.bottom
    }

    /// Swap far faces that lie before their near faces.
    pub fn normalized(&self) -> Self {
        Self {
            left: self.left.min(self.right),
            top: self.top.min(self.bottom),
            right: self.left.max(self.right),
            bottom: self.top.max(self.bottom),
        }
    }

    /// Translate the rectangle.
    pub fn offset(&self, by: Point) -> Self {
        Self {
            left: self.left + by.x,
            top: self.top + by.y,
            right: self.right + by.x,
            bottom: self.bottom + by.y,
        }
    }

    /// Do the vertical spans of the two rectangles overlap?
    pub fn overlaps_vertical(&self, other: &Self) -> bool {
        self.top < other.bottom && other.top < self.bottom
    }

    /// Do the horizontal spans of the two rectangles overlap?
    pub fn overlaps_horizontal(&self, other: &Self) -> bool {
        self.left < other.right && other.left < self.right
    }

    /// The line segment traced by a face.
    pub fn segment(&self, face: Face) -> FaceSegment {
        match face {
            Face::Left => FaceSegment::vertical(self.left, self.top, self.bottom),
            Face::Right => FaceSegment::vertical(self.right, self.top, self.bottom),
            Face::Top => FaceSegment::horizontal(self.top, self.left, self.right),
            Face::Bottom => FaceSegment::horizontal(self.bottom, self.left, self.right),
        }
    }

    /// Corners in clockwise order starting at the top left.
    pub fn corners(&self) -> [Point; 4] {
        [
            Point::new(self.left, self.top),
            Point::new(self.right, self.top),
            Point::new(self.right, self.bottom),
            Point::new(self.left, self.bottom),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn faces_roundtrip() {
        let r = Rect::new(1.0, 2.0, 10.0, 20.0);
        assert_eq!(Rect::from_faces(r.faces()), r);
        for f in Face::ALL {
            let mut c = Rect::zero();
            c.set_face(f, r.face(f));
            assert_eq!(c.face(f), r.face(f));
        }
        assert_eq!(r.width(), 9.0);
        assert_eq!(r.extent(Orientation::Vertical), 18.0);
    }

    #[test]
    fn normalized_swaps_inverted_faces() {
        let r = Rect::new(10.0, 20.0, 5.0, 2.0).normalized();
        assert_eq!(r, Rect::new(5.0, 2.0, 10.0, 20.0));
    }

    #[test]
    fn overlap() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        let b = Rect::new(20.0, 5.0, 30.0, 15.0);
        assert!(a.overlaps_vertical(&b));
        assert!(!a.overlaps_horizontal(&b));
        assert!(a.contains_point(Point::new(0.0, 9.9)));
        assert!(!a.contains_point(Point::new(10.0, 5.0)));
    }
}
