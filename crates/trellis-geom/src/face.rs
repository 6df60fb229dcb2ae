use std::{fmt, str::FromStr};

use crate::{Error, Result};

/// One of the four sides of a widget rectangle. Each face is positioned
/// independently.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub enum Face {
    /// The left side.
    Left,
    /// The top side.
    Top,
    /// The right side.
    Right,
    /// The bottom side.
    Bottom,
}

/// The axis along which a face is positioned.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq)]
pub enum Orientation {
    /// Left and right faces.
    Horizontal,
    /// Top and bottom faces.
    Vertical,
}

impl Face {
    /// All faces in evaluation order.
    pub const ALL: [Self; 4] = [Self::Left, Self::Top, Self::Right, Self::Bottom];

    /// Index of the face into per-face arrays.
    pub fn index(self) -> usize {
        match self {
            Self::Left => 0,
            Self::Top => 1,
            Self::Right => 2,
            Self::Bottom => 3,
        }
    }

    /// The face on the other side of the rectangle.
    pub fn opposite(self) -> Self {
        match self {
            Self::Left => Self::Right,
            Self::Top => Self::Bottom,
            Self::Right => Self::Left,
            Self::Bottom => Self::Top,
        }
    }

    /// The axis this face moves along.
    pub fn orientation(self) -> Orientation {
        match self {
            Self::Left | Self::Right => Orientation::Horizontal,
            Self::Top | Self::Bottom => Orientation::Vertical,
        }
    }

    /// True for left and top, the faces that anchor a rectangle.
    pub fn is_near(self) -> bool {
        matches!(self, Self::Left | Self::Top)
    }

    /// True for right and bottom, the faces stored as extents.
    pub fn is_far(self) -> bool {
        !self.is_near()
    }

    /// The near face on the same axis.
    pub fn near(self) -> Self {
        self.orientation().near()
    }

    /// Lowercase name of the face.
    pub fn name(self) -> &'static str {
        match self {
            Self::Left => "left",
            Self::Top => "top",
            Self::Right => "right",
            Self::Bottom => "bottom",
        }
    }
}

impl Orientation {
    /// Both orientations.
    pub const ALL: [Self; 2] = [Self::Horizontal, Self::Vertical];

    /// Index into per-axis arrays.
    pub fn index(self) -> usize {
        match self {
            Self::Horizontal => 0,
            Self::Vertical => 1,
        }
    }

    /// Near face along this axis.
    pub fn near(self) -> Face {
        match self {
            Self::Horizontal => Face::Left,
            Self::Vertical => Face::Top,
        }
    }

    /// Far face along this axis.
    pub fn far(self) -> Face {
        match self {
            Self::Horizontal => Face::Right,
            Self::Vertical => Face::Bottom,
        }
    }

    /// The perpendicular axis.
    pub fn cross(self) -> Self {
        match self {
            Self::Horizontal => Self::Vertical,
            Self::Vertical => Self::Horizontal,
        }
    }
}

impl fmt::Display for Face {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Face {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "left" => Ok(Self::Left),
            "top" => Ok(Self::Top),
            "right" => Ok(Self::Right),
            "bottom" => Ok(Self::Bottom),
            _ => Err(Error::Parse(s.to_string())),
        }
    }
}

impl TryFrom<usize> for Face {
    type Error = Error;

    fn try_from(index: usize) -> Result<Self> {
        Self::ALL
            .get(index)
            .copied()
            .ok_or_else(|| Error::Geometry(format!("face index out of range: {index}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn opposite_is_involution() {
        for f in Face::ALL {
            assert_eq!(f.opposite().opposite(), f);
            assert_eq!(f.opposite().orientation(), f.orientation());
            assert_ne!(f.opposite().is_near(), f.is_near());
        }
    }

    #[test]
    fn index_roundtrip() {
        for f in Face::ALL {
            assert_eq!(Face::try_from(f.index()).unwrap(), f);
        }
        assert!(Face::try_from(4).is_err());
    }

    #[test]
    fn parse() {
        assert_eq!("Left".parse::<Face>().unwrap(), Face::Left);
        assert_eq!("bottom".parse::<Face>().unwrap(), Face::Bottom);
        assert!("middle".parse::<Face>().is_err());
    }
}
