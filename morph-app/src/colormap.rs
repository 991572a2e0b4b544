//! Colormaps and value normalisation for panel images.

use morph_core::Image2D;
use plotters::style::colors::colormaps::{ColorMap, ViridisRGB};
use plotters::style::RGBColor;
use serde::{Deserialize, Serialize};

/// Named colormaps available to panels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColormapKind {
    Hot,
    Inferno,
    Bone,
    /// Cyclic map, dark at both ends and light in the middle.
    TwilightShifted,
    Viridis,
    Gray,
}

type Anchor = (f64, [u8; 3]);

const HOT: &[Anchor] = &[
    (0.0, [11, 0, 0]),
    (0.365_079, [255, 0, 0]),
    (0.746_032, [255, 255, 0]),
    (1.0, [255, 255, 255]),
];

const BONE: &[Anchor] = &[
    (0.0, [0, 0, 0]),
    (0.365_079, [81, 81, 113]),
    (0.746_032, [166, 198, 198]),
    (1.0, [255, 255, 255]),
];

const INFERNO: &[Anchor] = &[
    (0.0, [0, 0, 4]),
    (0.1, [22, 11, 57]),
    (0.2, [66, 10, 104]),
    (0.3, [106, 23, 110]),
    (0.4, [147, 38, 103]),
    (0.5, [188, 55, 84]),
    (0.6, [221, 81, 58]),
    (0.7, [243, 120, 25]),
    (0.8, [252, 165, 10]),
    (0.9, [246, 215, 70]),
    (1.0, [252, 255, 164]),
];

const TWILIGHT_SHIFTED: &[Anchor] = &[
    (0.0, [47, 20, 59]),
    (0.125, [72, 56, 130]),
    (0.25, [94, 123, 185]),
    (0.375, [162, 183, 207]),
    (0.5, [226, 217, 226]),
    (0.625, [205, 160, 142]),
    (0.75, [180, 93, 74]),
    (0.875, [115, 38, 72]),
    (1.0, [47, 20, 59]),
];

impl ColormapKind {
    /// Colour at `t` in `[0, 1]`; out-of-range values are clamped.
    #[must_use]
    pub fn color(self, t: f64) -> RGBColor {
        let t = if t.is_finite() { t.clamp(0.0, 1.0) } else { 0.0 };
        match self {
            Self::Hot => interpolate(HOT, t),
            Self::Inferno => interpolate(INFERNO, t),
            Self::Bone => interpolate(BONE, t),
            Self::TwilightShifted => interpolate(TWILIGHT_SHIFTED, t),
            Self::Viridis => ViridisRGB.get_color(t),
            Self::Gray => {
                let level = (t * 255.0).round() as u8;
                RGBColor(level, level, level)
            }
        }
    }
}

fn interpolate(anchors: &[Anchor], t: f64) -> RGBColor {
    let upper = anchors
        .iter()
        .position(|&(at, _)| at >= t)
        .unwrap_or(anchors.len() - 1);
    if upper == 0 {
        let [r, g, b] = anchors[0].1;
        return RGBColor(r, g, b);
    }
    let (t0, c0) = anchors[upper - 1];
    let (t1, c1) = anchors[upper];
    let f = if t1 > t0 { (t - t0) / (t1 - t0) } else { 0.0 };
    let channel = |i: usize| {
        let a = f64::from(c0[i]);
        let b = f64::from(c1[i]);
        (a + (b - a) * f).round().clamp(0.0, 255.0) as u8
    };
    RGBColor(channel(0), channel(1), channel(2))
}

/// How a panel maps values onto its colormap, as written in the settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum NormSpec {
    Log { vmin: f64, vmax: f64 },
    Linear { vmin: f64, vmax: f64 },
    /// Linear in `[-limit, limit]` with `limit = scale * max|value|`.
    Symmetric { scale: f64 },
}

impl NormSpec {
    /// Fixes the value range for one image.
    #[must_use]
    pub fn resolve(&self, image: &Image2D) -> Norm {
        match *self {
            Self::Log { vmin, vmax } => Norm::Log { vmin, vmax },
            Self::Linear { vmin, vmax } => Norm::Linear { vmin, vmax },
            Self::Symmetric { scale } => {
                let limit = scale * image.max_abs();
                let limit = if limit > 0.0 && limit.is_finite() {
                    limit
                } else {
                    1.0
                };
                Norm::Linear {
                    vmin: -limit,
                    vmax: limit,
                }
            }
        }
    }
}

/// A value range resolved against a concrete image.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Norm {
    Log { vmin: f64, vmax: f64 },
    Linear { vmin: f64, vmax: f64 },
}

impl Norm {
    /// Maps `value` into `[0, 1]`, clipping at the range ends.
    ///
    /// Non-finite values, and non-positive ones under a log norm, map to 0.
    #[must_use]
    pub fn normalize(&self, value: f64) -> f64 {
        if !value.is_finite() {
            return 0.0;
        }
        let t = match *self {
            Self::Log { vmin, vmax } => {
                if value <= 0.0 || vmin <= 0.0 || vmax <= vmin {
                    return 0.0;
                }
                (value.ln() - vmin.ln()) / (vmax.ln() - vmin.ln())
            }
            Self::Linear { vmin, vmax } => {
                if vmax <= vmin {
                    return 0.5;
                }
                (value - vmin) / (vmax - vmin)
            }
        };
        t.clamp(0.0, 1.0)
    }

    /// Inverse of [`Norm::normalize`] inside the range.
    #[must_use]
    pub fn denormalize(&self, t: f64) -> f64 {
        match *self {
            Self::Log { vmin, vmax } => vmin * (vmax / vmin).powf(t),
            Self::Linear { vmin, vmax } => vmin + t * (vmax - vmin),
        }
    }

    #[must_use]
    pub const fn range(&self) -> (f64, f64) {
        match *self {
            Self::Log { vmin, vmax } | Self::Linear { vmin, vmax } => (vmin, vmax),
        }
    }
}
