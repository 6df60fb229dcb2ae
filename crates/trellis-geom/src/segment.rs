use crate::Point;

/// The line segment traced by one face of a rectangle. Face segments are
/// always axis-aligned: left and right faces are vertical, top and bottom
/// faces are horizontal.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FaceSegment {
    /// First endpoint.
    pub a: Point,
    /// Second endpoint.
    pub b: Point,
}

impl FaceSegment {
    /// A vertical segment at `x` spanning `y0..y1`.
    pub fn vertical(x: f32, y0: f32, y1: f32) -> Self {
        Self {
            a: Point::new(x, y0.min(y1)),
            b: Point::new(x, y0.max(y1)),
        }
    }

    /// A horizontal segment at `y` spanning `x0..x1`.
    pub fn horizontal(y: f32, x0: f32, x1: f32) -> Self {
        Self {
            a: Point::new(x0.min(x1), y),
            b: Point::new(x0.max(x1), y),
        }
    }

    /// Length of the segment.
    pub fn len(&self) -> f32 {
        self.a.distance(self.b)
    }

    /// True if both endpoints coincide.
    pub fn is_empty(&self) -> bool {
        self.len() == 0.0
    }

    /// Midpoint of the segment.
    pub fn midpoint(&self) -> Point {
        Point::new((self.a.x + self.b.x) * 0.5, (self.a.y + self.b.y) * 0.5)
    }

    /// Shortest distance from a point to this segment.
    pub fn distance_to_point(&self, p: Point) -> f32 {
        let d = self.b - self.a;
        let len2 = d.x * d.x + d.y * d.y;
        if len2 == 0.0 {
            return self.a.distance(p);
        }
        let t = (((p.x - self.a.x) * d.x + (p.y - self.a.y) * d.y) / len2).clamp(0.0, 1.0);
        let proj = Point::new(self.a.x + t * d.x, self.a.y + t * d.y);
        proj.distance(p)
    }

    /// Do the two segments touch or cross?
    pub fn intersects(&self, other: &Self) -> bool {
        let o1 = orient(self.a, self.b, other.a);
        let o2 = orient(self.a, self.b, other.b);
        let o3 = orient(other.a, other.b, self.a);
        let o4 = orient(other.a, other.b, self.b);
        if o1 * o2 < 0.0 && o3 * o4 < 0.0 {
            return true;
        }
        (o1 == 0.0 && on_segment(self.a, self.b, other.a))
            || (o2 == 0.0 && on_segment(self.a, self.b, other.b))
            || (o3 == 0.0 && on_segment(other.a, other.b, self.a))
            || (o4 == 0.0 && on_segment(other.a, other.b, self.b))
    }

    /// Shortest distance between two segments.
    pub fn distance(&self, other: &Self) -> f32 {
        if self.intersects(other) {
            return 0.0;
        }
        self.distance_to_point(other.a)
            .min(self.distance_to_point(other.b))
            .min(other.distance_to_point(self.a))
            .min(other.distance_to_point(self.b))
    }
}

/// Signed area of the triangle `a b c`.
fn orient(a: Point, b: Point, c: Point) -> f32 {
    (b.x - a.x) * (c.y - a.y) - (b.y - a.y) * (c.x - a.x)
}

/// Is `p`, known to be collinear with `a b`, within the segment's bounds?
fn on_segment(a: Point, b: Point, p: Point) -> bool {
    p.x >= a.x.min(b.x) && p.x <= a.x.max(b.x) && p.y >= a.y.min(b.y) && p.y <= a.y.max(b.y)
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn parallel_faces() {
        let a = FaceSegment::vertical(10.0, 0.0, 10.0);
        let b = FaceSegment::vertical(15.0, 0.0, 10.0);
        assert_eq!(a.distance(&b), 5.0);

        // Offset vertically so the spans no longer overlap.
        let c = FaceSegment::vertical(13.0, 14.0, 20.0);
        assert_eq!(a.distance(&c), 5.0);
    }

    #[test]
    fn touching_and_crossing() {
        let a = FaceSegment::horizontal(5.0, 0.0, 10.0);
        let b = FaceSegment::vertical(5.0, 0.0, 10.0);
        assert_eq!(a.distance(&b), 0.0);
        let c = FaceSegment::horizontal(5.0, 10.0, 20.0);
        assert_eq!(a.distance(&c), 0.0);
    }

    #[test]
    fn degenerate_segment() {
        let a = FaceSegment::vertical(0.0, 3.0, 3.0);
        assert!(a.is_empty());
        assert_eq!(a.distance_to_point(Point::new(3.0, 7.0)), 5.0);
    }

    proptest! {
        #[test]
        fn distance_is_symmetric(
            x0 in -100.0f32..100.0, y0 in -100.0f32..100.0, l0 in 0.0f32..50.0,
            x1 in -100.0f32..100.0, y1 in -100.0f32..100.0, l1 in 0.0f32..50.0,
            vert in any::<bool>(),
        ) {
            let a = FaceSegment::vertical(x0, y0, y0 + l0);
            let b = if vert {
                FaceSegment::vertical(x1, y1, y1 + l1)
            } else {
                FaceSegment::horizontal(y1, x1, x1 + l1)
            };
            let d1 = a.distance(&b);
            let d2 = b.distance(&a);
            prop_assert!(d1 >= 0.0);
            prop_assert!((d1 - d2).abs() < 1e-3);
        }
    }
}
