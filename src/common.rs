use std::fmt;

use crate::error::SliceError;

// set up enums and structs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    X,
    Y,
    #[default]
    Z,
}

impl Direction {
    pub fn to_usize(&self) -> usize {
        match self {
            Direction::X => 0,
            Direction::Y => 1,
            Direction::Z => 2,
        }
    }

    /// Slice lists along Y are shown back to front so that the strip reads
    /// anterior to posterior.
    pub fn reverses_display(&self) -> bool {
        matches!(self, Direction::Y)
    }

    /// Anatomical name of the view perpendicular to this axis.
    pub fn view_name(&self) -> &'static str {
        match self {
            Direction::X => "sagittal",
            Direction::Y => "coronal",
            Direction::Z => "axial",
        }
    }
}

impl TryFrom<usize> for Direction {
    type Error = SliceError;

    fn try_from(val: usize) -> Result<Self, Self::Error> {
        match val {
            0 => Ok(Direction::X),
            1 => Ok(Direction::Y),
            2 => Ok(Direction::Z),
            _ => Err(SliceError::InvalidArgument(format!(
                "slicing axis must be 0, 1 or 2, got {val}"
            ))),
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::X => write!(f, "0"),
            Direction::Y => write!(f, "1"),
            Direction::Z => write!(f, "2"),
        }
    }
}
