//! Color adjustments that are sampled into lookup tables.

use crate::color::{CLab, CxyY, Cxyz};
use crate::grid::MAX_GRID_POINTS;
use crate::util::quick_saturate_word;
use tracing::warn;

/// Ink limits are percentages of total coverage across four inks.
const MAX_INK_LIMIT: f64 = 400.;

/// Temperatures a white point can be derived from.
const TEMP_RANGE: (f64, f64) = (4000., 25000.);

/// Scales down CMY so that the total CMYK coverage stays under a limit.
///
/// K is never changed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InkLimiter {
    limit: f64,
}

impl InkLimiter {
    /// Creates a limiter for the given total coverage in percent (0 to 400).
    ///
    /// Out of range limits are clamped.
    pub fn new(limit: f64) -> Self {
        let clamped = limit.max(0.).min(MAX_INK_LIMIT);
        if clamped != limit {
            warn!(limit, clamped, "ink limit should be between 0 and 400");
        }
        InkLimiter { limit: clamped }
    }

    pub fn limit(&self) -> f64 {
        self.limit
    }

    /// Limits a 16-bit CMYK value.
    ///
    /// # Examples
    /// ```
    /// # use iccsynth::adjust::InkLimiter;
    /// let limiter = InkLimiter::new(300.);
    /// let mut out = [0; 4];
    /// limiter.sample(&[60000, 60000, 60000, 60000], &mut out);
    /// assert_eq!(out, [45535, 45535, 45535, 60000]);
    /// ```
    pub fn sample(&self, input: &[u16], output: &mut [u16]) -> bool {
        let limit = self.limit * 655.35;

        let sum_cmy = input[0] as f64 + input[1] as f64 + input[2] as f64;
        let sum_cmyk = sum_cmy + input[3] as f64;

        let ratio = if sum_cmyk > limit {
            if sum_cmy > 0. {
                (1. - (sum_cmyk - limit) / sum_cmy).max(0.)
            } else {
                // K alone is over the limit; nothing to take away from CMY
                0.
            }
        } else {
            1.
        };

        output[0] = quick_saturate_word(input[0] as f64 * ratio);
        output[1] = quick_saturate_word(input[1] as f64 * ratio);
        output[2] = quick_saturate_word(input[2] as f64 * ratio);
        output[3] = input[3];

        true
    }
}

/// Brightness, contrast, hue and saturation adjustment with an optional white point shift.
///
/// Brightness and saturation are added to L\* and C\*, contrast multiplies L\*, and hue is added
/// to the hue angle in degrees. When the two temperatures differ, colors are moved from the white
/// point of `temp_src` to that of `temp_dest`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bchsw {
    /// Points along each axis of the sampled table.
    pub grid_points: usize,
    pub brightness: f64,
    pub contrast: f64,
    pub hue: f64,
    pub saturation: f64,
    /// Source color temperature in kelvin.
    pub temp_src: f64,
    /// Destination color temperature in kelvin.
    pub temp_dest: f64,
}

impl Default for Bchsw {
    /// No adjustment.
    fn default() -> Self {
        Bchsw {
            grid_points: 17,
            brightness: 0.,
            contrast: 1.,
            hue: 0.,
            saturation: 0.,
            temp_src: 6504.,
            temp_dest: 6504.,
        }
    }
}

fn clamp_temp(temp: f64) -> f64 {
    let clamped = temp.max(TEMP_RANGE.0).min(TEMP_RANGE.1);
    if clamped != temp {
        warn!(temp, clamped, "color temperature should be between 4000 K and 25000 K");
    }
    clamped
}

impl Bchsw {
    /// Validates the parameters and resolves the white points.
    pub fn sampler(&self) -> BchswSampler {
        let grid_points = self.grid_points.max(2).min(MAX_GRID_POINTS);
        if grid_points != self.grid_points {
            warn!(
                grid_points = self.grid_points,
                clamped = grid_points,
                "grid points should be between 2 and 255"
            );
        }

        let white_points = if self.temp_src != self.temp_dest {
            let src = CxyY::from_temp(clamp_temp(self.temp_src)).map(Cxyz::from);
            let dest = CxyY::from_temp(clamp_temp(self.temp_dest)).map(Cxyz::from);
            src.zip(dest)
        } else {
            None
        };

        BchswSampler {
            grid_points,
            brightness: self.brightness,
            contrast: self.contrast,
            hue: self.hue,
            saturation: self.saturation,
            white_points,
        }
    }
}

/// Resolved [`Bchsw`] parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BchswSampler {
    grid_points: usize,
    brightness: f64,
    contrast: f64,
    hue: f64,
    saturation: f64,
    /// Source and destination white points, if the white point moves.
    white_points: Option<(Cxyz, Cxyz)>,
}

impl BchswSampler {
    pub fn grid_points(&self) -> usize {
        self.grid_points
    }

    pub fn adjusts_white_point(&self) -> bool {
        self.white_points.is_some()
    }

    /// Adjusts a Lab color in the 16-bit V4 encoding.
    pub fn sample(&self, input: &[u16], output: &mut [u16]) -> bool {
        let mut lch = CLab::from_encoded(input).into_lch();

        lch.l = lch.l * self.contrast + self.brightness;
        lch.c += self.saturation;
        lch.h += self.hue;

        let mut lab = lch.into_lab();

        if let Some((src, dest)) = self.white_points {
            lab = lab.into_xyz(src).into_lab(dest);
        }

        output[..3].copy_from_slice(&lab.to_encoded());
        true
    }
}

#[test]
fn ink_limiter_leaves_low_coverage_alone() {
    let limiter = InkLimiter::new(300.);
    let mut out = [0; 4];
    for input in [[0, 0, 0, 0], [65535, 65535, 0, 0], [30000, 20000, 10000, 65535]] {
        limiter.sample(&input, &mut out);
        assert_eq!(out, input);
    }
}

#[test]
fn ink_limiter_black_only() {
    let limiter = InkLimiter::new(50.);
    let mut out = [1; 4];
    limiter.sample(&[0, 0, 0, 65535], &mut out);
    assert_eq!(out, [0, 0, 0, 65535]);
}

#[test]
fn ink_limit_is_clamped() {
    assert_eq!(InkLimiter::new(-20.).limit(), 0.);
    assert_eq!(InkLimiter::new(520.).limit(), 400.);
    assert_eq!(InkLimiter::new(250.).limit(), 250.);
}

#[test]
fn bchsw_identity() {
    let sampler = Bchsw::default().sampler();
    assert!(!sampler.adjusts_white_point());

    let mut out = [0; 3];
    for input in [[0, 32896, 32896], [65535, 0, 65535], [32768, 12345, 54321]] {
        sampler.sample(&input, &mut out);
        assert_eq!(out, input);
    }
}

#[test]
fn bchsw_identity_on_every_node() {
    let sampler = Bchsw::default().sampler();
    let adjusted = crate::grid::Grid::sample_uniform(33, 3, 3, |input, output| {
        sampler.sample(input, output)
    })
    .unwrap();

    let identity = crate::grid::Grid::sample_uniform(33, 3, 3, |input, output| {
        output.copy_from_slice(input);
        true
    })
    .unwrap();

    assert_eq!(adjusted.table(), identity.table());
}

#[test]
fn bchsw_brightness_and_clamping() {
    let sampler = Bchsw {
        grid_points: 1000,
        brightness: 10.,
        temp_src: 2000.,
        temp_dest: 9000.,
        ..Bchsw::default()
    }
    .sampler();
    assert_eq!(sampler.grid_points(), 255);
    assert!(sampler.adjusts_white_point());

    let plain = Bchsw {
        brightness: 10.,
        ..Bchsw::default()
    }
    .sampler();
    let mut out = [0; 3];
    plain.sample(&[0, 32896, 32896], &mut out);
    assert_eq!(CLab::from_encoded(&out).l.round(), 10.);
}
