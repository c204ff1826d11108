//! Colormaps used to turn normalised samples into RGB.
//!
//! Continuous channels use one of the named gradients from `colorous`. Label
//! channels use [`LabelPalette`], a fixed list of categorical colours that never
//! wraps around.

use std::fmt;

use colorous::{Color, Gradient};

use crate::error::{Result, SliceError};

/// RGB triple with components in `[0, 1]`.
pub type Rgb = [f64; 3];

/// Name of the colormap used when a descriptor does not name one.
pub const DEFAULT_COLORMAP: &str = "Greys_r";

fn to_rgb(color: Color) -> Rgb {
    [
        f64::from(color.r) / 255.0,
        f64::from(color.g) / 255.0,
        f64::from(color.b) / 255.0,
    ]
}

#[derive(Clone)]
enum Ramp {
    Linear,
    Gradient(Gradient),
}

#[derive(Clone)]
enum Kind {
    Continuous { ramp: Ramp, reversed: bool },
    Listed(LabelPalette),
}

/// A named mapping from `[0, 1]` to RGB.
#[derive(Clone)]
pub struct Colormap {
    name: String,
    kind: Kind,
}

impl Colormap {
    /// Looks a colormap up by name. A trailing `_r` reverses it.
    pub fn from_name(name: &str) -> Result<Self> {
        let (base, reversed) = match name.strip_suffix("_r") {
            Some(base) => (base, true),
            None => (name, false),
        };
        let ramp = match base.to_ascii_lowercase().as_str() {
            "gray" | "grey" => Ramp::Linear,
            "greys" | "grays" => Ramp::Gradient(colorous::GREYS),
            "viridis" => Ramp::Gradient(colorous::VIRIDIS),
            "inferno" => Ramp::Gradient(colorous::INFERNO),
            "magma" => Ramp::Gradient(colorous::MAGMA),
            "plasma" => Ramp::Gradient(colorous::PLASMA),
            "cividis" => Ramp::Gradient(colorous::CIVIDIS),
            "turbo" => Ramp::Gradient(colorous::TURBO),
            "blues" => Ramp::Gradient(colorous::BLUES),
            "greens" => Ramp::Gradient(colorous::GREENS),
            "reds" => Ramp::Gradient(colorous::REDS),
            "oranges" => Ramp::Gradient(colorous::ORANGES),
            "purples" => Ramp::Gradient(colorous::PURPLES),
            _ => return Err(SliceError::UnknownColormap(name.to_string())),
        };
        Ok(Self {
            name: name.to_string(),
            kind: Kind::Continuous { ramp, reversed },
        })
    }

    pub fn default_grayscale() -> Self {
        Self {
            name: DEFAULT_COLORMAP.to_string(),
            kind: Kind::Continuous {
                ramp: Ramp::Gradient(colorous::GREYS),
                reversed: true,
            },
        }
    }

    pub fn labels(palette: LabelPalette) -> Self {
        Self {
            name: "labels".to_string(),
            kind: Kind::Listed(palette),
        }
    }

    /// Colour for a normalised value. `t` is clamped to `[0, 1]`.
    pub fn lookup(&self, t: f64) -> Rgb {
        let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
        match &self.kind {
            Kind::Continuous { ramp, reversed } => {
                let t = if *reversed { 1.0 - t } else { t };
                match ramp {
                    Ramp::Linear => [t, t, t],
                    Ramp::Gradient(gradient) => to_rgb(gradient.eval_continuous(t)),
                }
            }
            Kind::Listed(palette) => {
                let n = palette.len();
                // (v - 1) / n * n can come out a hair below v - 1
                let idx = ((t * n as f64 + 1e-9).floor() as usize).min(n - 1);
                palette.colors[idx]
            }
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_listed(&self) -> bool {
        matches!(self.kind, Kind::Listed(_))
    }

    /// Number of distinct labels a listed colormap can draw.
    pub fn label_capacity(&self) -> Option<usize> {
        match &self.kind {
            Kind::Listed(palette) => Some(palette.len()),
            Kind::Continuous { .. } => None,
        }
    }
}

impl fmt::Debug for Colormap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Colormap({})", self.name)
    }
}

/// Ordered categorical colours for label masks.
///
/// Label `v` is drawn with entry `v - 1`. A mask holding more distinct non-zero
/// values than there are entries is rejected by the loader instead of cycling.
#[derive(Debug, Clone, PartialEq)]
pub struct LabelPalette {
    colors: Vec<Rgb>,
}

impl LabelPalette {
    pub fn new(colors: Vec<Rgb>) -> Result<Self> {
        if colors.is_empty() {
            return Err(SliceError::InvalidArgument(
                "a label palette needs at least one colour".to_string(),
            ));
        }
        if colors
            .iter()
            .flatten()
            .any(|c| !(0.0..=1.0).contains(c))
        {
            return Err(SliceError::InvalidArgument(
                "label palette components must lie in [0, 1]".to_string(),
            ));
        }
        Ok(Self { colors })
    }

    /// Set1, Set2 and Set3 back to back: 29 colours.
    pub fn quantitative() -> Self {
        let colors = colorous::SET1
            .iter()
            .chain(colorous::SET2.iter())
            .chain(colorous::SET3.iter())
            .map(|c| to_rgb(*c))
            .collect();
        Self { colors }
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    pub fn colors(&self) -> &[Rgb] {
        &self.colors
    }

    /// Normalisation bounds that send label `v` to entry `v - 1`.
    pub fn value_range(&self) -> (f64, f64) {
        (1.0, self.len() as f64 + 1.0)
    }
}
