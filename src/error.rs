use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SliceError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("{path}: only 3D images are supported, found {ndim} dimensions")]
    UnsupportedDimensionality { path: PathBuf, ndim: usize },

    #[error("{path}: {found} labels exceed the {capacity} entries of the label colormap")]
    TooManyLabels {
        path: PathBuf,
        found: usize,
        capacity: usize,
    },

    #[error("{path}: spacings {spacing:?} are not integer multiples of each other")]
    NonIntegerSpacingRatio { path: PathBuf, spacing: [f64; 2] },

    #[error("{path}: affine differs from {reference}; all images must share one affine")]
    AffineMismatch { path: PathBuf, reference: PathBuf },

    #[error("{path}: slice shape {found:?} differs from {expected:?}; all images must share one shape")]
    ShapeMismatch {
        path: PathBuf,
        expected: Vec<usize>,
        found: Vec<usize>,
    },

    #[error("No images specified")]
    NoImagesSpecified,

    #[error("Invalid channel descriptor `{descriptor}`: {reason}")]
    InvalidDescriptor { descriptor: String, reason: String },

    #[error("Unknown colormap `{0}`")]
    UnknownColormap(String),

    #[error("{path}: slice {index} is out of bounds for an axis of length {extent}")]
    SliceOutOfBounds {
        path: PathBuf,
        index: usize,
        extent: usize,
    },

    #[error("Nifti error: {0}")]
    Nifti(#[from] nifti::error::NiftiError),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("Shape error: {0}")]
    Shape(#[from] ndarray::ShapeError),
}

pub type Result<T> = std::result::Result<T, SliceError>;
