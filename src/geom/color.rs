//! Per-vertex coloring for height fields.

use std::f64::consts::PI;

use num_complex::Complex64;
use serde::{Deserialize, Serialize};

use super::sampler::FieldSample;

/// Color given to vertices whose sample is undefined.
pub const UNDEFINED_COLOR: [f64; 3] = [0.0, 0.0, 0.0];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorMode {
    /// Blue (lowest) to red (highest) ramp over the sampled value range.
    #[default]
    Height,
    /// Hue from the argument of the complex sample.
    Domain,
    /// No color buffer.
    None,
}

impl ColorMode {
    #[must_use]
    pub fn has_colors(self) -> bool {
        !matches!(self, Self::None)
    }
}

/// Running min/max over the finite samples of one call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ValueRange {
    pub min: f64,
    pub max: f64,
}

impl ValueRange {
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            min: f64::INFINITY,
            max: f64::NEG_INFINITY,
        }
    }

    pub fn include(&mut self, value: f64) {
        if value.is_finite() {
            self.min = self.min.min(value);
            self.max = self.max.max(value);
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.min > self.max
    }

    /// `(min, max)` when at least one finite value was seen.
    #[must_use]
    pub fn bounds(&self) -> Option<(f64, f64)> {
        (!self.is_empty()).then_some((self.min, self.max))
    }
}

impl Default for ValueRange {
    fn default() -> Self {
        Self::empty()
    }
}

/// Position of `value` inside `[min, max]`; 0.5 only when `min == max`.
#[must_use]
pub fn height_ratio(value: f64, min: f64, max: f64) -> f64 {
    let span = max - min;
    if !span.is_finite() || span <= 0.0 {
        return 0.5;
    }
    ((value - min) / span).clamp(0.0, 1.0)
}

#[must_use]
pub fn height_color(value: f64, min: f64, max: f64) -> [f64; 3] {
    let ratio = height_ratio(value, min, max);
    hsl_to_rgb((1.0 - ratio) * 2.0 / 3.0, 1.0, 0.5)
}

#[must_use]
pub fn domain_color(z: Complex64) -> [f64; 3] {
    let hue = (z.im.atan2(z.re) + PI) / (2.0 * PI);
    hsl_to_rgb(hue, 1.0, 0.5)
}

/// Color for one grid sample under `mode`, `None` when the mode has no colors.
#[must_use]
pub fn sample_color(mode: ColorMode, sample: &FieldSample, range: &ValueRange) -> Option<[f64; 3]> {
    let color = match (mode, sample) {
        (ColorMode::None, _) => return None,
        (_, FieldSample::Undefined) => UNDEFINED_COLOR,
        (ColorMode::Height, FieldSample::Defined { value, .. }) => {
            let (min, max) = range.bounds().unwrap_or((*value, *value));
            height_color(*value, min, max)
        }
        (ColorMode::Domain, FieldSample::Defined { value, complex }) => {
            domain_color(complex.unwrap_or(Complex64::new(*value, 0.0)))
        }
    };
    Some(color)
}

/// HSL to RGB with all channels in `[0, 1]`; the hue wraps.
#[must_use]
pub fn hsl_to_rgb(hue: f64, saturation: f64, lightness: f64) -> [f64; 3] {
    if saturation <= 0.0 {
        return [lightness; 3];
    }
    let q = if lightness < 0.5 {
        lightness * (1.0 + saturation)
    } else {
        lightness + saturation - lightness * saturation
    };
    let p = 2.0 * lightness - q;
    [
        hue_channel(p, q, hue + 1.0 / 3.0),
        hue_channel(p, q, hue),
        hue_channel(p, q, hue - 1.0 / 3.0),
    ]
}

fn hue_channel(p: f64, q: f64, t: f64) -> f64 {
    let t = t.rem_euclid(1.0);
    if t < 1.0 / 6.0 {
        p + (q - p) * 6.0 * t
    } else if t < 0.5 {
        q
    } else if t < 2.0 / 3.0 {
        p + (q - p) * (2.0 / 3.0 - t) * 6.0
    } else {
        p
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_rgb(actual: [f64; 3], expected: [f64; 3]) {
        for channel in 0..3 {
            assert!(
                (actual[channel] - expected[channel]).abs() < 1e-9,
                "{actual:?} != {expected:?}"
            );
        }
    }

    #[test]
    fn height_ramp_runs_blue_to_red() {
        assert_eq!(height_ratio(-2.0, -2.0, 6.0), 0.0);
        assert_eq!(height_ratio(6.0, -2.0, 6.0), 1.0);
        assert_rgb(height_color(-2.0, -2.0, 6.0), [0.0, 0.0, 1.0]);
        assert_rgb(height_color(6.0, -2.0, 6.0), [1.0, 0.0, 0.0]);
    }

    #[test]
    fn flat_range_uses_middle_of_ramp() {
        assert_eq!(height_ratio(3.0, 3.0, 3.0), 0.5);
        // hue 1/3 is pure green
        assert_rgb(height_color(3.0, 3.0, 3.0), [0.0, 1.0, 0.0]);
    }

    #[test]
    fn tiny_range_still_spans_the_ramp() {
        let max = 1e-16;
        assert!(max < f64::EPSILON);
        assert_eq!(height_ratio(0.0, 0.0, max), 0.0);
        assert_eq!(height_ratio(max, 0.0, max), 1.0);
        assert_rgb(height_color(0.0, 0.0, max), [0.0, 0.0, 1.0]);
        assert_rgb(height_color(max, 0.0, max), [1.0, 0.0, 0.0]);
    }

    #[test]
    fn domain_hue_follows_argument() {
        // arg = 0 maps to hue 0.5 (cyan), arg = pi to hue 1.0 (red)
        assert_rgb(domain_color(Complex64::new(1.0, 0.0)), [0.0, 1.0, 1.0]);
        assert_rgb(domain_color(Complex64::new(-1.0, 0.0)), [1.0, 0.0, 0.0]);
    }

    #[test]
    fn undefined_samples_are_black() {
        let range = ValueRange { min: 0.0, max: 1.0 };
        for mode in [ColorMode::Height, ColorMode::Domain] {
            assert_eq!(
                sample_color(mode, &FieldSample::Undefined, &range),
                Some(UNDEFINED_COLOR)
            );
        }
        assert_eq!(sample_color(ColorMode::None, &FieldSample::real(0.5), &range), None);
    }

    #[test]
    fn real_sample_in_domain_mode_uses_zero_imaginary_part() {
        let range = ValueRange::empty();
        let color = sample_color(ColorMode::Domain, &FieldSample::real(-4.0), &range);
        assert_rgb(color.unwrap(), [1.0, 0.0, 0.0]);
    }

    #[test]
    fn value_range_ignores_non_finite() {
        let mut range = ValueRange::empty();
        assert!(range.is_empty());
        for value in [2.0, f64::NAN, -1.0, f64::INFINITY, 5.0] {
            range.include(value);
        }
        assert_eq!(range.bounds(), Some((-1.0, 5.0)));
    }
}
