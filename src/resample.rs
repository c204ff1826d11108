//! Nearest-neighbour upsampling to square pixels.
//!
//! Pixels along the coarser in-plane axis are repeated an integer number of times,
//! so the output pixel counts are exact and no values are blended.

use std::path::Path;

use log::{debug, warn};
use ndarray::Array3;

use crate::error::{Result, SliceError};
use crate::loader::Channel;

/// Largest number of times a pixel may be repeated along one axis.
pub const MAX_REPEAT: usize = 64;

fn is_close(a: f64, b: f64) -> bool {
    (a - b).abs() <= 1e-8 + 1e-5 * b.abs()
}

/// Per-axis replication factors, (rows, columns), that bring `spacing` down to its
/// smallest entry.
///
/// Without `approximate` a ratio that is not an integer is an error; with it the
/// ratio is rounded to the nearest integer.
pub fn isotropic_factors(spacing: [f64; 2], approximate: bool, path: &Path) -> Result<[usize; 2]> {
    if spacing.iter().any(|s| !(s.is_finite() && *s > 0.0)) {
        return Err(SliceError::InvalidArgument(format!(
            "{}: pixel spacing {spacing:?} must be positive",
            path.display()
        )));
    }
    let base = spacing[0].min(spacing[1]);
    let mut factors = [1; 2];
    for (factor, s) in factors.iter_mut().zip(spacing) {
        let ratio = s / base;
        let rounded = ratio.round();
        if !is_close(ratio, rounded) {
            if !approximate {
                return Err(SliceError::NonIntegerSpacingRatio {
                    path: path.to_path_buf(),
                    spacing,
                });
            }
            warn!(
                "{}: rounding spacing ratio {ratio:.3} to {rounded}",
                path.display()
            );
        }
        if rounded > MAX_REPEAT as f64 {
            return Err(SliceError::InvalidArgument(format!(
                "{}: spacing ratio {ratio:.3} exceeds {MAX_REPEAT}",
                path.display()
            )));
        }
        *factor = rounded as usize;
    }
    Ok(factors)
}

/// Repeats every pixel `factors[0]` times down and `factors[1]` times across.
pub fn repeat_pixels(slices: &Array3<f64>, factors: [usize; 2]) -> Array3<f64> {
    let (n, rows, cols) = slices.dim();
    let [fr, fc] = factors;
    Array3::from_shape_fn((n, rows * fr, cols * fc), |(k, r, c)| {
        slices[[k, r / fr, c / fc]]
    })
}

/// Resamples a channel so that its pixels are (approximately) square.
pub fn make_isotropic(channel: Channel, approximate: bool) -> Result<Channel> {
    let factors = isotropic_factors(channel.spacing, approximate, &channel.source)?;
    if factors == [1, 1] {
        return Ok(channel);
    }
    debug!(
        "{}: repeating pixels {}x down, {}x across",
        channel.source.display(),
        factors[0],
        factors[1]
    );
    let slices = repeat_pixels(&channel.slices, factors);
    let spacing = [
        channel.spacing[0] / factors[0] as f64,
        channel.spacing[1] / factors[1] as f64,
    ];
    Ok(Channel {
        slices,
        spacing,
        ..channel
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::colormap::Colormap;
    use crate::descriptor::ChannelKind;
    use nalgebra::Matrix4;
    use ndarray::array;

    fn channel(slices: Array3<f64>, spacing: [f64; 2]) -> Channel {
        Channel {
            source: "test.nii".into(),
            kind: ChannelKind::Base,
            slices,
            colormap: Colormap::default_grayscale(),
            alpha: 1.0,
            value_range: (0.0, 1.0),
            affine: Matrix4::identity(),
            spacing,
        }
    }

    #[test]
    fn isotropic_input_is_untouched() {
        let slices = Array3::from_shape_fn((2, 3, 4), |(k, r, c)| (k * 12 + r * 4 + c) as f64);
        let path = Path::new("test.nii");
        assert_eq!(isotropic_factors([0.7, 0.7], false, path).unwrap(), [1, 1]);
        let out = make_isotropic(channel(slices.clone(), [0.7, 0.7]), false).unwrap();
        assert_eq!(out.slices, slices);
        assert_eq!(out.spacing, [0.7, 0.7]);
    }

    #[test]
    fn coarse_rows_are_repeated() {
        let slices = array![[[1.0, 2.0], [3.0, 4.0]]];
        let out = make_isotropic(channel(slices, [3.0, 1.0]), false).unwrap();
        assert_eq!(
            out.slices,
            array![[
                [1.0, 2.0],
                [1.0, 2.0],
                [1.0, 2.0],
                [3.0, 4.0],
                [3.0, 4.0],
                [3.0, 4.0]
            ]]
        );
        assert_eq!(out.spacing, [1.0, 1.0]);
    }

    #[test]
    fn shape_scales_by_rounded_ratio() {
        let slices = Array3::<f64>::zeros((3, 5, 7));
        let cases: [([f64; 2], bool); 5] = [
            ([1.0, 2.0], false),
            ([4.0, 2.0], false),
            ([0.5, 1.5], false),
            ([1.0, 2.4], true),
            ([2.6, 1.0], true),
        ];
        for (spacing, approximate) in cases {
            let base = spacing[0].min(spacing[1]);
            let expected = [
                5 * (spacing[0] / base).round() as usize,
                7 * (spacing[1] / base).round() as usize,
            ];
            let out = make_isotropic(channel(slices.clone(), spacing), approximate).unwrap();
            assert_eq!(out.slices.dim(), (3, expected[0], expected[1]));
        }
    }

    #[test]
    fn second_pass_is_a_no_op() {
        let slices = Array3::from_shape_fn((1, 2, 3), |(_, r, c)| (r * 3 + c) as f64);
        let once = make_isotropic(channel(slices, [1.0, 2.0]), false).unwrap();
        let twice = make_isotropic(once.clone(), false).unwrap();
        assert_eq!(once.slices, twice.slices);
        let path = Path::new("test.nii");
        assert_eq!(isotropic_factors(once.spacing, false, path).unwrap(), [1, 1]);
    }

    #[test]
    fn non_integer_ratio_needs_approximate_mode() {
        let slices = Array3::<f64>::zeros((1, 2, 2));
        assert!(matches!(
            make_isotropic(channel(slices.clone(), [1.0, 1.5]), false),
            Err(SliceError::NonIntegerSpacingRatio { .. })
        ));
        let out = make_isotropic(channel(slices, [1.0, 1.5]), true).unwrap();
        assert_eq!(out.slices.dim(), (1, 2, 4));
    }

    #[test]
    fn degenerate_spacing_is_rejected() {
        let path = Path::new("test.nii");
        assert!(isotropic_factors([0.0, 1.0], false, path).is_err());
        assert!(isotropic_factors([f64::NAN, 1.0], true, path).is_err());
    }

    #[test]
    fn huge_ratio_is_rejected() {
        let path = Path::new("test.nii");
        assert!(matches!(
            isotropic_factors([1e-9, 1.0], true, path),
            Err(SliceError::InvalidArgument(_))
        ));
        assert!(isotropic_factors([1.0, 1e9], false, path).is_err());
        assert_eq!(
            isotropic_factors([1.0, MAX_REPEAT as f64], false, path).unwrap(),
            [1, MAX_REPEAT]
        );
        let slices = Array3::<f64>::zeros((1, 2, 2));
        assert!(make_isotropic(channel(slices, [1e-9, 1.0]), true).is_err());
    }
}
