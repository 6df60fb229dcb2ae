//! Conversions between coordinate bases.
//!
//! Every face value is expressed relative to a reference frame (the
//! viewport, the scene, or the widget's owner) and in a unit (pixels, or a
//! fraction of the frame's extent along the face's axis). The functions here
//! are pure: callers resolve the reference frames and pass them in.

use serde::{Deserialize, Serialize};

/// The frame of reference a value is measured against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Frame {
    /// The viewport, origin at zero.
    Viewport,
    /// The scene root's resolved bounds.
    Scene,
    /// The parent widget's resolved bounds.
    Owner,
}

/// Coordinate base for a face position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PositionBase {
    /// Pixels from the viewport origin.
    PixelViewport,
    /// Pixels from the scene's near face.
    PixelScene,
    /// Pixels from the owner's near face.
    #[default]
    PixelOwner,
    /// Fraction of the viewport extent.
    PercentageViewport,
    /// Fraction of the scene extent, from the scene's near face.
    PercentageScene,
    /// Fraction of the owner extent, from the owner's near face.
    PercentageOwner,
}

impl PositionBase {
    /// All bases.
    pub const ALL: [Self; 6] = [
        Self::PixelViewport,
        Self::PixelScene,
        Self::PixelOwner,
        Self::PercentageViewport,
        Self::PercentageScene,
        Self::PercentageOwner,
    ];

    /// True for the fractional bases.
    pub fn is_percentage(self) -> bool {
        matches!(
            self,
            Self::PercentageViewport | Self::PercentageScene | Self::PercentageOwner
        )
    }

    /// The reference frame of this base.
    pub fn frame(self) -> Frame {
        match self {
            Self::PixelViewport | Self::PercentageViewport => Frame::Viewport,
            Self::PixelScene | Self::PercentageScene => Frame::Scene,
            Self::PixelOwner | Self::PercentageOwner => Frame::Owner,
        }
    }
}

/// Coordinate base for dock padding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaddingBase {
    /// Raw pixels.
    #[default]
    Pixels,
    /// Pixels multiplied by the viewport scale.
    ScaledPixels,
    /// Fraction of the owner's extent.
    PercentageOwner,
    /// Fraction of the scene's extent.
    PercentageScene,
    /// Fraction of the viewport's extent.
    PercentageViewport,
    /// Fraction of the dock target's extent.
    PercentageTarget,
}

/// A resolved reference frame along one axis, in viewport pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Reference {
    /// Position of the frame's near face.
    pub origin: f32,
    /// Width or height of the frame.
    pub extent: f32,
}

impl Reference {
    /// Construct a reference frame.
    pub fn new(origin: f32, extent: f32) -> Self {
        Self { origin, extent }
    }
}

/// Convert a near-face value in `base` to an absolute viewport pixel position.
pub fn to_absolute(value: f32, base: PositionBase, reference: Reference) -> f32 {
    reference.origin + to_pixel_extent(value, base, reference)
}

/// Convert an absolute viewport pixel position to a value in `base`.
pub fn from_absolute(pixels: f32, base: PositionBase, reference: Reference) -> f32 {
    from_pixel_extent(pixels - reference.origin, base, reference)
}

/// Convert a length expressed in `base` to pixels.
pub fn to_pixel_extent(value: f32, base: PositionBase, reference: Reference) -> f32 {
    if base.is_percentage() {
        value * reference.extent
    } else {
        value
    }
}

/// Convert a pixel length to a value in `base`. A zero extent yields zero.
pub fn from_pixel_extent(pixels: f32, base: PositionBase, reference: Reference) -> f32 {
    if base.is_percentage() {
        if reference.extent.abs() <= f32::EPSILON {
            0.0
        } else {
            pixels / reference.extent
        }
    } else {
        pixels
    }
}

/// Reference extents available when evaluating dock padding.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PaddingFrames {
    /// Owner extent along the face axis.
    pub owner: f32,
    /// Scene extent along the face axis.
    pub scene: f32,
    /// Viewport extent along the face axis.
    pub viewport: f32,
    /// Dock target extent along the face axis.
    pub target: f32,
    /// Viewport scale factor.
    pub scale: f32,
}

/// Convert a padding value to pixels.
pub fn padding_to_pixels(value: f32, base: PaddingBase, frames: PaddingFrames) -> f32 {
    match base {
        PaddingBase::Pixels => value,
        PaddingBase::ScaledPixels => value * frames.scale,
        PaddingBase::PercentageOwner => value * frames.owner,
        PaddingBase::PercentageScene => value * frames.scene,
        PaddingBase::PercentageViewport => value * frames.viewport,
        PaddingBase::PercentageTarget => value * frames.target,
    }
}

/// Relative comparison with a floor of one pixel (or one whole unit).
pub fn approx_eq(a: f32, b: f32, epsilon: f32) -> bool {
    let scale = a.abs().max(b.abs()).max(1.0);
    (a - b).abs() <= epsilon * scale
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pixel_and_percentage() {
        let r = Reference::new(100.0, 400.0);
        assert_eq!(to_absolute(10.0, PositionBase::PixelOwner, r), 110.0);
        assert_eq!(to_absolute(0.25, PositionBase::PercentageOwner, r), 200.0);
        assert_eq!(from_absolute(200.0, PositionBase::PercentageScene, r), 0.25);
        assert_eq!(from_absolute(110.0, PositionBase::PixelViewport, r), 10.0);
    }

    #[test]
    fn zero_extent_is_safe() {
        let r = Reference::new(5.0, 0.0);
        assert_eq!(from_absolute(50.0, PositionBase::PercentageViewport, r), 0.0);
        assert_eq!(from_pixel_extent(50.0, PositionBase::PixelViewport, r), 50.0);
    }

    #[test]
    fn padding() {
        let frames = PaddingFrames {
            owner: 200.0,
            scene: 800.0,
            viewport: 1000.0,
            target: 50.0,
            scale: 2.0,
        };
        assert_eq!(padding_to_pixels(10.0, PaddingBase::Pixels, frames), 10.0);
        assert_eq!(padding_to_pixels(10.0, PaddingBase::ScaledPixels, frames), 20.0);
        assert_eq!(padding_to_pixels(0.5, PaddingBase::PercentageTarget, frames), 25.0);
        assert_eq!(padding_to_pixels(0.1, PaddingBase::PercentageScene, frames), 80.0);
    }

    #[test]
    fn approx() {
        assert!(approx_eq(1000.0, 1000.05, 1e-4));
        assert!(!approx_eq(1000.0, 1000.5, 1e-4));
        assert!(approx_eq(0.0, 0.00005, 1e-4));
        assert!(!approx_eq(0.0, 0.001, 1e-4));
    }

    #[test]
    fn base_serde_names() {
        let b: PositionBase = serde_json::from_str("\"percentage_owner\"").unwrap();
        assert_eq!(b, PositionBase::PercentageOwner);
        assert!(b.is_percentage());
        assert_eq!(b.frame(), Frame::Owner);
    }
}
