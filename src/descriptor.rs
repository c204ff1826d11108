//! Per-image display settings.
//!
//! On the command line a channel is written `path[:cmap[:alpha[:vmin[:vmax]]]]`;
//! empty fields keep their default, so `mask.nii::0.4` only sets the opacity.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use crate::colormap::{Colormap, LabelPalette, DEFAULT_COLORMAP};
use crate::error::{Result, SliceError};

pub const DEFAULT_ALPHA: f64 = 1.0;

/// Whether a channel holds continuous intensities or discrete labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelKind {
    Base,
    Label,
}

/// Settings for one image layer.
#[derive(Debug, Clone, PartialEq)]
pub struct ChannelSpec {
    /// The volume to read.
    pub path: PathBuf,
    /// Colormap name, [`DEFAULT_COLORMAP`] when unset. Ignored for labels.
    pub colormap: Option<String>,
    /// Blend opacity in `[0, 1]`, [`DEFAULT_ALPHA`] when unset.
    pub alpha: Option<f64>,
    /// Value mapped to the bottom of the colormap, the smallest sample of the
    /// selected slices when unset. Ignored for labels.
    pub vmin: Option<f64>,
    /// Value mapped to the top of the colormap, the largest sample of the selected
    /// slices when unset. Ignored for labels.
    pub vmax: Option<f64>,
}

/// Display settings once defaults have been filled in.
#[derive(Debug, Clone)]
pub struct DisplayParams {
    pub colormap: Colormap,
    pub alpha: f64,
    pub value_range: (f64, f64),
}

impl ChannelSpec {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            colormap: None,
            alpha: None,
            vmin: None,
            vmax: None,
        }
    }

    pub fn with_colormap(mut self, name: impl Into<String>) -> Self {
        self.colormap = Some(name.into());
        self
    }

    pub fn with_alpha(mut self, alpha: f64) -> Self {
        self.alpha = Some(alpha);
        self
    }

    pub fn with_range(mut self, vmin: f64, vmax: f64) -> Self {
        self.vmin = Some(vmin);
        self.vmax = Some(vmax);
        self
    }

    /// Colormap name that [`ChannelSpec::resolve`] would use for a base channel.
    pub fn colormap_name(&self) -> &str {
        self.colormap.as_deref().unwrap_or(DEFAULT_COLORMAP)
    }

    /// Fills in defaults. `data_range` is the (min, max) of the loaded slices.
    ///
    /// Label channels always use the quantitative palette with the label range
    /// `1..=palette.len()`; only their alpha is taken from the spec.
    pub fn resolve(&self, kind: ChannelKind, data_range: (f64, f64)) -> Result<DisplayParams> {
        let alpha = self.alpha.unwrap_or(DEFAULT_ALPHA);
        if !(0.0..=1.0).contains(&alpha) {
            return Err(SliceError::InvalidDescriptor {
                descriptor: self.to_string(),
                reason: format!("alpha {alpha} is outside [0, 1]"),
            });
        }
        match kind {
            ChannelKind::Label => {
                let palette = LabelPalette::quantitative();
                let value_range = palette.value_range();
                Ok(DisplayParams {
                    colormap: Colormap::labels(palette),
                    alpha,
                    value_range,
                })
            }
            ChannelKind::Base => {
                let colormap = match &self.colormap {
                    Some(name) => Colormap::from_name(name)?,
                    None => Colormap::default_grayscale(),
                };
                let vmin = self.vmin.unwrap_or(data_range.0);
                let vmax = self.vmax.unwrap_or(data_range.1);
                if vmin > vmax {
                    return Err(SliceError::InvalidDescriptor {
                        descriptor: self.to_string(),
                        reason: format!("vmin {vmin} is above vmax {vmax}"),
                    });
                }
                Ok(DisplayParams {
                    colormap,
                    alpha,
                    value_range: (vmin, vmax),
                })
            }
        }
    }
}

fn parse_field(descriptor: &str, field: &str, what: &str) -> Result<Option<f64>> {
    if field.is_empty() {
        return Ok(None);
    }
    field
        .trim()
        .parse::<f64>()
        .map(Some)
        .map_err(|e| SliceError::InvalidDescriptor {
            descriptor: descriptor.to_string(),
            reason: format!("{what} `{field}`: {e}"),
        })
}

impl FromStr for ChannelSpec {
    type Err = SliceError;

    fn from_str(descriptor: &str) -> Result<Self> {
        let fields: Vec<&str> = descriptor.split(':').collect();
        if fields.len() > 5 {
            return Err(SliceError::InvalidDescriptor {
                descriptor: descriptor.to_string(),
                reason: format!("expected at most 5 fields, found {}", fields.len()),
            });
        }
        let field = |i: usize| fields.get(i).copied().unwrap_or("");
        if field(0).is_empty() {
            return Err(SliceError::InvalidDescriptor {
                descriptor: descriptor.to_string(),
                reason: "missing image path".to_string(),
            });
        }
        let colormap = Some(field(1))
            .filter(|name| !name.is_empty())
            .map(str::to_string);
        let alpha = parse_field(descriptor, field(2), "alpha")?;
        if let Some(alpha) = alpha {
            if !(0.0..=1.0).contains(&alpha) {
                return Err(SliceError::InvalidDescriptor {
                    descriptor: descriptor.to_string(),
                    reason: format!("alpha {alpha} is outside [0, 1]"),
                });
            }
        }
        Ok(Self {
            path: PathBuf::from(field(0)),
            colormap,
            alpha,
            vmin: parse_field(descriptor, field(3), "vmin")?,
            vmax: parse_field(descriptor, field(4), "vmax")?,
        })
    }
}

impl fmt::Display for ChannelSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let opt = |v: Option<f64>| v.map(|v| v.to_string()).unwrap_or_default();
        write!(
            f,
            "{}:{}:{}:{}:{}",
            self.path.display(),
            self.colormap.as_deref().unwrap_or(""),
            opt(self.alpha),
            opt(self.vmin),
            opt(self.vmax)
        )
    }
}
