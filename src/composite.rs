//! Blending channels into one RGB strip and writing it out.

use std::path::Path;

use log::info;
use nalgebra::Matrix4;
use ndarray::prelude::*;

use crate::error::{Result, SliceError};
use crate::loader::Channel;

/// Elementwise `|a - b| <= 1e-6 + 1e-5 * |b|`.
pub fn affines_close(a: &Matrix4<f64>, b: &Matrix4<f64>) -> bool {
    a.iter()
        .zip(b.iter())
        .all(|(x, y)| (x - y).abs() <= 1e-6 + 1e-5 * y.abs())
}

/// Fails unless every channel shares the first channel's affine and slice stack
/// shape.
pub fn check_consistency(channels: &[Channel]) -> Result<()> {
    let first = channels.first().ok_or(SliceError::NoImagesSpecified)?;
    for channel in &channels[1..] {
        if !affines_close(&first.affine, &channel.affine) {
            return Err(SliceError::AffineMismatch {
                path: channel.source.clone(),
                reference: first.source.clone(),
            });
        }
        if first.slices.shape() != channel.slices.shape() {
            return Err(SliceError::ShapeMismatch {
                path: channel.source.clone(),
                expected: first.slices.shape().to_vec(),
                found: channel.slices.shape().to_vec(),
            });
        }
    }
    Ok(())
}

impl Channel {
    /// Maps a sample into `[0, 1]` using the channel's value range.
    pub fn normalize(&self, value: f64) -> f64 {
        let (vmin, vmax) = self.value_range;
        if vmax == vmin {
            return 0.0;
        }
        ((value - vmin) / (vmax - vmin)).clamp(0.0, 1.0)
    }
}

/// Blends slice `index` of every channel, in order, into `out` (rows, cols, 3).
///
/// Only pixels with a value above zero are touched, so zero background in a later
/// layer leaves whatever is underneath visible.
pub fn composite_slice(
    channels: &[Channel],
    index: usize,
    mut out: ArrayViewMut3<f64>,
) -> Result<()> {
    check_consistency(channels)?;
    let (nslices, rows, cols) = channels[0].slices.dim();
    if index >= nslices {
        return Err(SliceError::SliceOutOfBounds {
            path: channels[0].source.clone(),
            index,
            extent: nslices,
        });
    }
    if out.dim() != (rows, cols, 3) {
        return Err(SliceError::ShapeMismatch {
            path: channels[0].source.clone(),
            expected: vec![rows, cols, 3],
            found: out.shape().to_vec(),
        });
    }
    for channel in channels {
        let alpha = channel.alpha;
        let slice = channel.slices.index_axis(Axis(0), index);
        for ((r, c), &value) in slice.indexed_iter() {
            if value > 0.0 {
                let rgb = channel.colormap.lookup(channel.normalize(value));
                let mut pixel = out.slice_mut(s![r, c, ..]);
                for (o, v) in pixel.iter_mut().zip(rgb) {
                    *o = *o * (1.0 - alpha) + alpha * v;
                }
            }
        }
    }
    Ok(())
}

/// Composites every slice and tiles them left to right into a
/// (rows, cols * nslices, 3) buffer with values in `[0, 1]`.
pub fn render_strip(channels: &[Channel]) -> Result<Array3<f64>> {
    check_consistency(channels)?;
    let (nslices, rows, cols) = channels[0].slices.dim();
    let mut out = Array3::<f64>::zeros((rows, cols * nslices, 3));
    for i in 0..nslices {
        let tile = out.slice_mut(s![.., i * cols..(i + 1) * cols, ..]);
        composite_slice(channels, i, tile)?;
    }
    Ok(out)
}

/// Scales `[0, 1]` floats to bytes, rounding half to even.
pub fn to_rgb8(buffer: &Array3<f64>) -> Array3<u8> {
    buffer.mapv(|v| (v * 255.0).round_ties_even().clamp(0.0, 255.0) as u8)
}

/// Writes a (rows, cols, 3) byte array as an image; the format follows the
/// extension of `path`.
pub fn write_image(pixels: &Array3<u8>, path: &Path) -> Result<()> {
    let (height, width, _) = pixels.dim();
    let img = image::RgbImage::from_fn(width as u32, height as u32, |x, y| {
        let (x, y) = (x as usize, y as usize);
        image::Rgb([pixels[[y, x, 0]], pixels[[y, x, 1]], pixels[[y, x, 2]]])
    });
    img.save(path)?;
    info!("Wrote {}x{} image to {}", width, height, path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::colormap::{Colormap, LabelPalette};
    use crate::descriptor::ChannelKind;

    fn channel(slices: Array3<f64>, colormap: Colormap, alpha: f64) -> Channel {
        Channel {
            source: "test.nii".into(),
            kind: ChannelKind::Base,
            slices,
            colormap,
            alpha,
            value_range: (0.0, 4.0),
            affine: Matrix4::identity(),
            spacing: [1.0, 1.0],
        }
    }

    fn gray() -> Colormap {
        Colormap::from_name("gray").unwrap()
    }

    #[test]
    fn opaque_channel_reproduces_its_colormap() {
        let slices = array![[[0.0, 1.0], [2.0, 4.0]]];
        let base = channel(slices, Colormap::from_name("viridis").unwrap(), 1.0);
        let mut out = Array3::<f64>::zeros((2, 2, 3));
        composite_slice(std::slice::from_ref(&base), 0, out.view_mut()).unwrap();
        for ((r, c), &v) in base.slices.index_axis(Axis(0), 0).indexed_iter() {
            let got = [out[[r, c, 0]], out[[r, c, 1]], out[[r, c, 2]]];
            if v > 0.0 {
                assert_eq!(got, base.colormap.lookup(v / 4.0));
            } else {
                assert_eq!(got, [0.0, 0.0, 0.0]);
            }
        }
    }

    #[test]
    fn zero_pixels_leave_the_buffer_alone() {
        let base = channel(array![[[0.0, 0.0]]], gray(), 1.0);
        let mut out = Array3::<f64>::from_elem((1, 2, 3), 0.3);
        composite_slice(&[base], 0, out.view_mut()).unwrap();
        assert!(out.iter().all(|&v| v == 0.3));
    }

    #[test]
    fn negative_samples_count_as_background() {
        let base = channel(array![[[-2.0]]], gray(), 1.0);
        let mut out = Array3::<f64>::from_elem((1, 1, 3), 0.5);
        composite_slice(&[base], 0, out.view_mut()).unwrap();
        assert_eq!(out, Array3::from_elem((1, 1, 3), 0.5));
    }

    #[test]
    fn later_layers_blend_over_earlier_ones() {
        let base = channel(array![[[4.0, 4.0]]], gray(), 1.0);
        let mut mask = channel(
            array![[[0.0, 1.0]]],
            Colormap::labels(LabelPalette::new(vec![[1.0, 0.0, 0.0]]).unwrap()),
            0.4,
        );
        mask.value_range = (1.0, 2.0);
        let mut out = Array3::<f64>::zeros((1, 2, 3));
        composite_slice(&[base, mask], 0, out.view_mut()).unwrap();
        // background kept where the mask is zero
        assert_eq!(out.slice(s![0, 0, ..]).to_vec(), vec![1.0, 1.0, 1.0]);
        let blended = out.slice(s![0, 1, ..]).to_vec();
        let expected = [1.0, 0.6, 0.6];
        for (got, want) in blended.iter().zip(expected) {
            assert!((got - want).abs() < 1e-12);
        }
    }

    #[test]
    fn slices_are_tiled_left_to_right() {
        let slices = array![[[1.0, 1.0]], [[2.0, 2.0]], [[4.0, 4.0]]];
        let out = render_strip(&[channel(slices, gray(), 1.0)]).unwrap();
        assert_eq!(out.dim(), (1, 6, 3));
        let reds: Vec<f64> = out.slice(s![0, .., 0]).to_vec();
        assert_eq!(reds, vec![0.25, 0.25, 0.5, 0.5, 1.0, 1.0]);
    }

    #[test]
    fn mismatched_shapes_fail_before_compositing() {
        let a = channel(Array3::ones((1, 10, 10)), gray(), 1.0);
        let mut b = channel(Array3::ones((1, 12, 10)), gray(), 1.0);
        b.source = "other.nii".into();
        match render_strip(&[a, b]) {
            Err(SliceError::ShapeMismatch {
                path,
                expected,
                found,
            }) => {
                assert_eq!(path, Path::new("other.nii"));
                assert_eq!(expected, vec![1, 10, 10]);
                assert_eq!(found, vec![1, 12, 10]);
            }
            other => panic!("expected a shape mismatch, got {other:?}"),
        }
    }

    #[test]
    fn mismatched_affines_fail() {
        let a = channel(Array3::ones((1, 2, 2)), gray(), 1.0);
        let mut b = channel(Array3::ones((1, 2, 2)), gray(), 1.0);
        b.affine[(0, 3)] = 1e-3;
        assert!(matches!(
            render_strip(&[a.clone(), b]),
            Err(SliceError::AffineMismatch { .. })
        ));
        let mut c = a.clone();
        c.affine[(0, 0)] += 1e-9;
        assert!(render_strip(&[a, c]).is_ok());
    }

    #[test]
    fn no_channels() {
        assert!(matches!(
            render_strip(&[]),
            Err(SliceError::NoImagesSpecified)
        ));
    }

    #[test]
    fn flat_range_maps_to_the_bottom() {
        let mut base = channel(array![[[3.0]]], gray(), 1.0);
        base.value_range = (3.0, 3.0);
        assert_eq!(base.normalize(3.0), 0.0);
    }

    #[test]
    fn bytes_are_rounded() {
        let buffer = array![[[0.0, 0.5, 1.0], [0.002, 0.998, 1.2]]];
        assert_eq!(to_rgb8(&buffer), array![[[0, 128, 255], [1, 254, 255]]]);
    }

    #[test]
    fn halfway_bytes_round_to_even() {
        let mut base = channel(array![[[5.0]]], gray(), 1.0);
        base.value_range = (0.0, 510.0);
        let out = to_rgb8(&render_strip(&[base]).unwrap());
        assert_eq!(out, array![[[2, 2, 2]]]);
    }

    #[test]
    fn single_slice_rejects_mismatched_shapes() {
        let a = channel(Array3::ones((1, 2, 2)), gray(), 1.0);
        let b = channel(Array3::ones((1, 3, 2)), gray(), 1.0);
        let mut out = Array3::<f64>::zeros((2, 2, 3));
        assert!(matches!(
            composite_slice(&[a, b], 0, out.view_mut()),
            Err(SliceError::ShapeMismatch { .. })
        ));
        assert!(out.iter().all(|&v| v == 0.0));
    }

    #[test]
    fn single_slice_checks_index_and_buffer() {
        let a = channel(Array3::ones((2, 2, 2)), gray(), 1.0);
        let mut out = Array3::<f64>::zeros((2, 2, 3));
        assert!(matches!(
            composite_slice(std::slice::from_ref(&a), 2, out.view_mut()),
            Err(SliceError::SliceOutOfBounds {
                index: 2,
                extent: 2,
                ..
            })
        ));
        let mut wide = Array3::<f64>::zeros((2, 4, 3));
        assert!(matches!(
            composite_slice(std::slice::from_ref(&a), 0, wide.view_mut()),
            Err(SliceError::ShapeMismatch { .. })
        ));
        assert!(matches!(
            composite_slice(&[], 0, out.view_mut()),
            Err(SliceError::NoImagesSpecified)
        ));
    }
}
