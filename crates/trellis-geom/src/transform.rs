use crate::{Point, Rect};

/// A rotation about an anchor point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    /// Rotation pivot in pixels.
    pub anchor: Point,
    /// Cosine of the rotation angle.
    cos: f32,
    /// Sine of the rotation angle.
    sin: f32,
    /// Rotation angle in degrees, kept for display.
    degrees: f32,
}

impl Transform {
    /// A rotation of `degrees` clockwise (in screen space, y down) about `anchor`.
    pub fn rotation(degrees: f32, anchor: Point) -> Self {
        let rad = degrees.to_radians();
        Self {
            anchor,
            cos: rad.cos(),
            sin: rad.sin(),
            degrees,
        }
    }

    /// The identity transform.
    pub fn identity() -> Self {
        Self::rotation(0.0, Point::zero())
    }

    /// The rotation angle in degrees.
    pub fn degrees(&self) -> f32 {
        self.degrees
    }

    /// True if the transform leaves every point in place.
    pub fn is_identity(&self) -> bool {
        self.sin == 0.0 && self.cos == 1.0
    }

    /// Apply the transform to a point.
    pub fn apply(&self, p: Point) -> Point {
        let d = p - self.anchor;
        Point::new(
            self.anchor.x + d.x * self.cos - d.y * self.sin,
            self.anchor.y + d.x * self.sin + d.y * self.cos,
        )
    }

    /// Transform the corners of a rectangle.
    pub fn apply_rect(&self, r: &Rect) -> Quad {
        let c = r.corners();
        Quad([
            self.apply(c[0]),
            self.apply(c[1]),
            self.apply(c[2]),
            self.apply(c[3]),
        ])
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::identity()
    }
}

/// Four corners of a possibly rotated rectangle, clockwise from the
/// original top left.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Quad(pub [Point; 4]);

impl Quad {
    /// The axis-aligned rectangle enclosing the quad.
    pub fn bounds(&self) -> Rect {
        let mut r = Rect::new(f32::MAX, f32::MAX, f32::MIN, f32::MIN);
        for p in &self.0 {
            r.left = r.left.min(p.x);
            r.top = r.top.min(p.y);
            r.right = r.right.max(p.x);
            r.bottom = r.bottom.max(p.y);
        }
        r
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: Point, b: Point) -> bool {
        (a.x - b.x).abs() < 1e-4 && (a.y - b.y).abs() < 1e-4
    }

    #[test]
    fn quarter_turn_about_center() {
        let r = Rect::new(0.0, 0.0, 10.0, 10.0);
        let t = Transform::rotation(90.0, r.center());
        let q = t.apply_rect(&r);
        assert!(close(q.0[0], Point::new(10.0, 0.0)));
        assert!(close(q.0[2], Point::new(0.0, 10.0)));
        let b = q.bounds();
        assert!((b.width() - 10.0).abs() < 1e-4);
    }

    #[test]
    fn identity() {
        let t = Transform::identity();
        assert!(t.is_identity());
        assert_eq!(t.apply(Point::new(3.0, 4.0)), Point::new(3.0, 4.0));
    }
}
