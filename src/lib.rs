//! Tiled slice strips from nifti volumes, for quick visual quality control.
//!
//! A render picks a handful of slices along one axis, cuts them from one or more
//! volumes (continuous images and label masks on the same grid), optionally
//! repeats pixels so that every slice has square pixels, and alpha-blends the
//! layers into a single RGB image with the slices side by side.
//!
//! ```no_run
//! use slicevol::{create_slice, ChannelSpec, Direction, RenderOptions, SliceSelection};
//! use std::path::Path;
//!
//! let options = RenderOptions {
//!     bases: vec!["t1.nii.gz".parse().unwrap()],
//!     labels: vec!["aseg.nii.gz::0.4".parse::<ChannelSpec>().unwrap()],
//!     axis: Direction::Z,
//!     selection: SliceSelection::Count(10),
//!     isotropic: true,
//!     approximate: true,
//! };
//! let pixels = create_slice(&options, Path::new("t1_axial.png")).unwrap();
//! println!("{:?}", pixels.dim());
//! ```

pub mod colormap;
pub mod common;
pub mod composite;
pub mod descriptor;
pub mod error;
pub mod loader;
pub mod pipeline;
pub mod resample;
pub mod selector;

pub use common::Direction;
pub use descriptor::{ChannelKind, ChannelSpec};
pub use error::{Result, SliceError};
pub use loader::{count_labels, Channel, Volume};
pub use pipeline::{create_slice, render, RenderOptions};
pub use selector::{select_indices, SliceSelection};
