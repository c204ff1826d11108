//! Choosing which slices of a volume end up in the strip.

use crate::common::Direction;
use crate::error::{Result, SliceError};

/// How the slices along the slicing axis are picked.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SliceSelection {
    /// The single slice at `extent / 2`.
    #[default]
    Middle,
    /// `n` evenly spaced slices centred in the volume, see [`select_indices`].
    Count(usize),
    /// Exactly these slice numbers, in this order.
    Indices(Vec<usize>),
}

impl SliceSelection {
    /// Resolves the selection against an axis of length `extent`.
    ///
    /// Evenly spaced lists along an axis that [`Direction::reverses_display`] are
    /// returned back to front. Explicit indices are passed through untouched; they
    /// are bounds checked by the loader, which knows which file they belong to.
    pub fn resolve(&self, extent: usize, axis: Direction) -> Result<Vec<usize>> {
        match self {
            SliceSelection::Middle => Ok(vec![extent / 2]),
            SliceSelection::Count(n) => {
                let mut indices = select_indices(extent, *n)?;
                if axis.reverses_display() {
                    indices.reverse();
                }
                Ok(indices)
            }
            SliceSelection::Indices(indices) => {
                if indices.is_empty() {
                    return Err(SliceError::InvalidArgument(
                        "at least one slice number is required".to_string(),
                    ));
                }
                Ok(indices.clone())
            }
        }
    }
}

/// Computes `n` evenly spaced slice indices along an axis of length `extent`.
///
/// The step is `(extent - 1) / (n - 1)` and the whole window is shifted so that the
/// leftover is split between both ends.
///
/// # Errors
///
/// `InvalidArgument` when `n < 2` or when the axis is shorter than `n`.
pub fn select_indices(extent: usize, n: usize) -> Result<Vec<usize>> {
    if n < 2 {
        return Err(SliceError::InvalidArgument(format!(
            "evenly spaced slicing needs at least 2 slices, got {n}"
        )));
    }
    if extent < n {
        return Err(SliceError::InvalidArgument(format!(
            "cannot pick {n} distinct slices from an axis of length {extent}"
        )));
    }
    let step = (extent - 1) / (n - 1);
    let last = (n - 1) * step;
    let offset = (extent - last - 1) / 2;
    Ok((0..n).map(|i| offset + i * step).collect())
}
