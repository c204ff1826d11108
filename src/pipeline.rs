//! The whole render: load, check, resample, composite, write.

use std::path::Path;

use log::{debug, info};
use ndarray::Array3;
use rayon::prelude::*;

use crate::common::Direction;
use crate::composite::{check_consistency, render_strip, to_rgb8, write_image};
use crate::descriptor::{ChannelKind, ChannelSpec};
use crate::error::{Result, SliceError};
use crate::loader::{Channel, Volume};
use crate::resample::make_isotropic;
use crate::selector::SliceSelection;

/// Everything a single strip render needs.
#[derive(Debug, Clone, Default)]
pub struct RenderOptions {
    /// Continuous images, drawn first in the given order.
    pub bases: Vec<ChannelSpec>,
    /// Label masks, drawn over the bases in the given order.
    pub labels: Vec<ChannelSpec>,
    /// Axis the slices are cut perpendicular to.
    pub axis: Direction,
    /// Which slices to show. Evenly spaced lists are computed from the first image
    /// (first base, else first label).
    pub selection: SliceSelection,
    /// Repeat pixels so that every channel is shown with square pixels.
    pub isotropic: bool,
    /// Round non-integer spacing ratios instead of failing.
    pub approximate: bool,
}

impl RenderOptions {
    fn layers(&self) -> Vec<(&ChannelSpec, ChannelKind)> {
        self.bases
            .iter()
            .map(|spec| (spec, ChannelKind::Base))
            .chain(self.labels.iter().map(|spec| (spec, ChannelKind::Label)))
            .collect()
    }
}

/// Loads every channel and returns them in drawing order, checked and resampled.
pub fn load_channels(options: &RenderOptions) -> Result<Vec<Channel>> {
    let layers = options.layers();
    if layers.is_empty() {
        return Err(SliceError::NoImagesSpecified);
    }

    // channels are independent until the consistency check
    let volumes = layers
        .par_iter()
        .map(|(spec, _)| Volume::load(&spec.path))
        .collect::<Result<Vec<_>>>()?;

    let indices = options
        .selection
        .resolve(volumes[0].extent(options.axis), options.axis)?;
    debug!("Slicing axis {} at {:?}", options.axis, indices);

    let channels = layers
        .iter()
        .zip(&volumes)
        .map(|((spec, kind), volume)| {
            Channel::from_volume(volume, spec, *kind, options.axis, &indices)
        })
        .collect::<Result<Vec<_>>>()?;
    check_consistency(&channels)?;

    if options.isotropic {
        channels
            .into_iter()
            .map(|channel| make_isotropic(channel, options.approximate))
            .collect()
    } else {
        Ok(channels)
    }
}

/// Renders the strip and returns it as a (rows, cols * nslices, 3) byte array.
pub fn render(options: &RenderOptions) -> Result<Array3<u8>> {
    let channels = load_channels(options)?;
    let buffer = render_strip(&channels)?;
    Ok(to_rgb8(&buffer))
}

/// Renders the strip, writes it to `outfile` and returns the pixels.
///
/// Nothing is written unless the whole render succeeds.
pub fn create_slice(options: &RenderOptions, outfile: &Path) -> Result<Array3<u8>> {
    let pixels = render(options)?;
    write_image(&pixels, outfile)?;
    let (height, width, _) = pixels.dim();
    info!(
        "{} view of {} channel(s), {}x{}",
        options.axis.view_name(),
        options.bases.len() + options.labels.len(),
        width,
        height
    );
    Ok(pixels)
}
