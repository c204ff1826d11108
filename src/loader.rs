//! Reading nifti volumes and cutting them into display slices.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use log::debug;
use nalgebra::Matrix4;
use ndarray::prelude::*;
use ndarray::{stack, Ix3};
use nifti::{IntoNdArray, NiftiObject, ReaderOptions};

use crate::colormap::Colormap;
use crate::common::Direction;
use crate::descriptor::{ChannelKind, ChannelSpec};
use crate::error::{Result, SliceError};

/// A 3D nifti image and the affine that maps its voxels to world space.
#[derive(Debug, Clone)]
pub struct Volume {
    pub path: PathBuf,
    pub data: Array3<f64>,
    pub affine: Matrix4<f64>,
}

impl Volume {
    pub fn new(path: impl Into<PathBuf>, data: Array3<f64>, affine: Matrix4<f64>) -> Self {
        Self {
            path: path.into(),
            data,
            affine,
        }
    }

    /// Reads a volume from disk. Anything other than a 3D image is rejected.
    pub fn load(path: &Path) -> Result<Self> {
        let obj = ReaderOptions::new().read_file(path)?;
        let affine = obj.header().affine::<f64>();
        let img = obj.into_volume().into_ndarray::<f64>()?;
        if img.ndim() != 3 {
            return Err(SliceError::UnsupportedDimensionality {
                path: path.to_path_buf(),
                ndim: img.ndim(),
            });
        }
        let data = img.into_dimensionality::<Ix3>()?;
        debug!("{}: loaded volume of shape {:?}", path.display(), data.shape());
        Ok(Self::new(path, data, affine))
    }

    pub fn extent(&self, axis: Direction) -> usize {
        self.data.shape()[axis.to_usize()]
    }

    /// Voxel size along each array axis: the norms of the affine's first three
    /// columns.
    pub fn voxel_spacing(&self) -> [f64; 3] {
        let mut spacing = [0.0; 3];
        for (j, s) in spacing.iter_mut().enumerate() {
            *s = (0..3)
                .map(|i| self.affine[(i, j)].powi(2))
                .sum::<f64>()
                .sqrt();
        }
        spacing
    }

    /// Pixel spacing of slices cut perpendicular to `axis`, as (rows, columns) of
    /// the reoriented slice.
    pub fn display_spacing(&self, axis: Direction) -> [f64; 2] {
        let mut in_plane: Vec<f64> = self
            .voxel_spacing()
            .iter()
            .enumerate()
            .filter(|(j, _)| *j != axis.to_usize())
            .map(|(_, s)| *s)
            .collect();
        // reorient() transposes, so the first remaining axis ends up as columns
        in_plane.reverse();
        [in_plane[0], in_plane[1]]
    }

    /// Cuts the requested slices and stacks them as (slice, row, column).
    pub fn extract_slices(&self, axis: Direction, indices: &[usize]) -> Result<Array3<f64>> {
        let extent = self.extent(axis);
        let mut slices = Vec::with_capacity(indices.len());
        for &index in indices {
            if index >= extent {
                return Err(SliceError::SliceOutOfBounds {
                    path: self.path.clone(),
                    index,
                    extent,
                });
            }
            let slice = self.data.index_axis(Axis(axis.to_usize()), index);
            slices.push(reorient(slice));
        }
        let views: Vec<ArrayView2<f64>> = slices.iter().map(|s| s.view()).collect();
        Ok(stack(Axis(0), &views)?)
    }
}

/// Puts a raw cross-section into display orientation: both in-plane axes are
/// flipped and the result is transposed.
pub fn reorient(slice: ArrayView2<f64>) -> Array2<f64> {
    slice.slice(s![..;-1, ..;-1]).reversed_axes().to_owned()
}

/// Number of distinct non-zero values.
pub fn count_labels<'a>(values: impl IntoIterator<Item = &'a f64>) -> usize {
    values
        .into_iter()
        .filter(|v| **v != 0.0 && !v.is_nan())
        .map(|v| v.to_bits())
        .collect::<HashSet<u64>>()
        .len()
}

/// One image layer ready for compositing.
#[derive(Debug, Clone)]
pub struct Channel {
    pub source: PathBuf,
    pub kind: ChannelKind,
    /// Display-oriented slices, (slice, row, column).
    pub slices: Array3<f64>,
    pub colormap: Colormap,
    pub alpha: f64,
    pub value_range: (f64, f64),
    pub affine: Matrix4<f64>,
    /// Physical size of a pixel as (rows, columns).
    pub spacing: [f64; 2],
}

impl Channel {
    /// Builds a channel from an already loaded volume.
    pub fn from_volume(
        volume: &Volume,
        spec: &ChannelSpec,
        kind: ChannelKind,
        axis: Direction,
        indices: &[usize],
    ) -> Result<Self> {
        let slices = volume.extract_slices(axis, indices)?;
        let data_range = slices
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
                (lo.min(v), hi.max(v))
            });
        let params = spec.resolve(kind, data_range)?;
        if let Some(capacity) = params.colormap.label_capacity() {
            let found = count_labels(slices.iter());
            if found > capacity {
                return Err(SliceError::TooManyLabels {
                    path: volume.path.clone(),
                    found,
                    capacity,
                });
            }
        }
        let spacing = volume.display_spacing(axis);
        debug!(
            "{}: {} slices of {:?} on axis {}, spacing {:?}, {:?}",
            volume.path.display(),
            indices.len(),
            &slices.shape()[1..],
            axis,
            spacing,
            params.colormap,
        );
        Ok(Self {
            source: volume.path.clone(),
            kind,
            slices,
            colormap: params.colormap,
            alpha: params.alpha,
            value_range: params.value_range,
            affine: volume.affine,
            spacing,
        })
    }

    /// Reads `spec.path` and builds a channel from the slices at `indices`.
    pub fn load(
        spec: &ChannelSpec,
        kind: ChannelKind,
        axis: Direction,
        indices: &[usize],
    ) -> Result<Self> {
        let volume = Volume::load(&spec.path)?;
        Self::from_volume(&volume, spec, kind, axis, indices)
    }

    pub fn nslices(&self) -> usize {
        self.slices.shape()[0]
    }

    /// (rows, columns) of every slice.
    pub fn slice_shape(&self) -> (usize, usize) {
        let shape = self.slices.shape();
        (shape[1], shape[2])
    }
}
