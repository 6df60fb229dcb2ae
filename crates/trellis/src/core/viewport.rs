use crate::geom::{Point, Size};

/// Supplies the dimensions of the surface the scene is laid out on.
pub trait ViewportProvider {
    /// Size of the viewport in pixels.
    fn viewport_size(&self) -> Size;

    /// Screen-space origin of the viewport.
    fn viewport_origin(&self) -> Point;

    /// Scale factor applied to scaled-pixel padding.
    fn viewport_scale(&self) -> f32 {
        1.0
    }
}

/// A viewport with constant dimensions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixedViewport {
    /// Viewport size.
    pub size: Size,
    /// Screen-space origin.
    pub origin: Point,
    /// Scale factor.
    pub scale: f32,
}

impl FixedViewport {
    /// A viewport of the given size at the screen origin.
    pub fn new(w: f32, h: f32) -> Self {
        Self {
            size: Size::new(w, h),
            origin: Point::zero(),
            scale: 1.0,
        }
    }

    /// Place the viewport at a screen offset.
    pub fn with_origin(mut self, origin: Point) -> Self {
        self.origin = origin;
        self
    }

    /// Set the scale factor.
    pub fn with_scale(mut self, scale: f32) -> Self {
        self.scale = scale;
        self
    }
}

impl ViewportProvider for FixedViewport {
    fn viewport_size(&self) -> Size {
        self.size
    }

    fn viewport_origin(&self) -> Point {
        self.origin
    }

    fn viewport_scale(&self) -> f32 {
        self.scale
    }
}

/// Snapshot of viewport metrics used during one resolution.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewportMetrics {
    /// Viewport size.
    pub size: Size,
    /// Screen-space origin.
    pub origin: Point,
    /// Scale factor.
    pub scale: f32,
}

impl ViewportMetrics {
    /// Metrics for a missing viewport.
    pub fn empty() -> Self {
        Self {
            size: Size::zero(),
            origin: Point::zero(),
            scale: 1.0,
        }
    }

    /// Read the metrics from a provider.
    pub fn from_provider(provider: &dyn ViewportProvider) -> Self {
        Self {
            size: provider.viewport_size(),
            origin: provider.viewport_origin(),
            scale: provider.viewport_scale(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_viewport() {
        let v = FixedViewport::new(640.0, 480.0)
            .with_origin(Point::new(640.0, 0.0))
            .with_scale(2.0);
        let m = ViewportMetrics::from_provider(&v);
        assert_eq!(m.size, Size::new(640.0, 480.0));
        assert_eq!(m.origin, Point::new(640.0, 0.0));
        assert_eq!(m.scale, 2.0);
        assert_eq!(ViewportMetrics::empty().size, Size::zero());
    }
}
