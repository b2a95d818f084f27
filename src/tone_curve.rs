//! Gamma tone curves.

use std::cmp::Ordering;
use std::f64;
use std::ops::Range;

const EPSILON: f64 = 0.0001;

/// An ICC parametric curve.
///
/// Types 0 through 4 are the ICC `parametricCurveType` functions; the others are extensions
/// known from Little CMS.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum IccParametricCurve {
    /// `y = x ^ g` (type 0)
    Gamma(f64),
    GammaInv(f64),

    /// (ax + b) ^ g` (type 1)
    ///
    /// Parameters are g, a, b.
    LinGamma(f64, f64, f64),
    LinGammaInv(f64, f64, f64),

    /// (type 2)
    ///
    /// Parameters are g, a, b, c.
    LinBGamma(f64, f64, f64, f64),
    LinBGammaInv(f64, f64, f64, f64),

    /// (type 3)
    ///
    /// Parameters are g, a, b, c, d.
    LinLinGamma(f64, f64, f64, f64, f64),
    LinLinGammaInv(f64, f64, f64, f64, f64),

    /// (type 4)
    ///
    /// Parameters are g, a, b, c, d, e, f.
    LinLinOffGamma(f64, f64, f64, f64, f64, f64, f64),
    LinLinOffGammaInv(f64, f64, f64, f64, f64, f64, f64),

    /// `y = (ax + b) ^ g + c` (type 5)
    ///
    /// Parameters are g, a, b, c.
    LinOffGamma(f64, f64, f64, f64),
    LinOffGammaInv(f64, f64, f64, f64),

    /// `y = a log10(b x ^ g + c) + d` (type 6)
    ///
    /// Parameters are g, a, b, c, d.
    LogGamma(f64, f64, f64, f64, f64),
    LogGammaInv(f64, f64, f64, f64, f64),

    /// `y = a b ^ (cx + d) + e` (type 7)
    ///
    /// Parameters are g, a, b, c, d, e.
    LinPow(f64, f64, f64, f64, f64, f64),
    LinPowInv(f64, f64, f64, f64, f64, f64),

    /// (type 107)
    Sigmoid(f64),
    SigmoidInv(f64),
}

fn sigmoid_base(k: f64, t: f64) -> f64 {
    (1. / (1. + (-k * t).exp())) - 0.5
}

fn inverted_sigmoid_base(k: f64, t: f64) -> f64 {
    -((1. / (t + 0.5)) - 1.).ln() / k
}

impl IccParametricCurve {
    /// Creates a new parametric curve from the ICC type id and whether or not it should be
    /// inverted.
    ///
    /// Will return None if the type is unknown or if too few parameters were given.
    pub fn from_type(p_type: u16, invert: bool, params: &[f64]) -> Option<Self> {
        let count = match p_type {
            0 | 107 => 1,
            1 => 3,
            2 | 5 => 4,
            3 | 6 => 5,
            7 => 6,
            4 => 7,
            _ => return None,
        };
        if params.len() < count {
            return None;
        }
        let p = params;

        Some(match (p_type, invert) {
            (0, false) => Self::Gamma(p[0]),
            (0, true) => Self::GammaInv(p[0]),
            (1, false) => Self::LinGamma(p[0], p[1], p[2]),
            (1, true) => Self::LinGammaInv(p[0], p[1], p[2]),
            (2, false) => Self::LinBGamma(p[0], p[1], p[2], p[3]),
            (2, true) => Self::LinBGammaInv(p[0], p[1], p[2], p[3]),
            (3, false) => Self::LinLinGamma(p[0], p[1], p[2], p[3], p[4]),
            (3, true) => Self::LinLinGammaInv(p[0], p[1], p[2], p[3], p[4]),
            (4, false) => Self::LinLinOffGamma(p[0], p[1], p[2], p[3], p[4], p[5], p[6]),
            (4, true) => Self::LinLinOffGammaInv(p[0], p[1], p[2], p[3], p[4], p[5], p[6]),
            (5, false) => Self::LinOffGamma(p[0], p[1], p[2], p[3]),
            (5, true) => Self::LinOffGammaInv(p[0], p[1], p[2], p[3]),
            (6, false) => Self::LogGamma(p[0], p[1], p[2], p[3], p[4]),
            (6, true) => Self::LogGammaInv(p[0], p[1], p[2], p[3], p[4]),
            (7, false) => Self::LinPow(p[0], p[1], p[2], p[3], p[4], p[5]),
            (7, true) => Self::LinPowInv(p[0], p[1], p[2], p[3], p[4], p[5]),
            (107, false) => Self::Sigmoid(p[0]),
            (107, true) => Self::SigmoidInv(p[0]),
            _ => return None,
        })
    }

    /// Evaluates the parametric curve at the given position.
    pub fn eval(&self, x: f64) -> f64 {
        match *self {
            // y = x ^ g
            IccParametricCurve::Gamma(g) => {
                if x < 0. {
                    if (g - 1.).abs() < EPSILON {
                        x
                    } else {
                        0.
                    }
                } else {
                    x.powf(g)
                }
            }
            // x = y ^ (1 / g)
            IccParametricCurve::GammaInv(g) => {
                if x < 0. {
                    if (g - 1.).abs() < EPSILON {
                        x
                    } else {
                        0.
                    }
                } else if g.abs() < EPSILON {
                    f64::INFINITY
                } else {
                    x.powf(1. / g)
                }
            }
            // CIE 122-1966
            // y = (ax + b) ^ g | x >= -b / a
            // y = 0            | else
            IccParametricCurve::LinGamma(g, a, b) => {
                if a.abs() < EPSILON || x < -b / a {
                    0.
                } else {
                    (a * x + b).max(0.).powf(g)
                }
            }
            // x = (y ^ (1 / g) - b) / a
            IccParametricCurve::LinGammaInv(g, a, b) => {
                if g.abs() < EPSILON || a.abs() < EPSILON || x < 0. {
                    0.
                } else {
                    ((x.powf(1. / g) - b) / a).max(0.)
                }
            }
            // IEC 61966-3
            // y = (ax + b) ^ g + c | x >= -b / a
            // y = c                | else
            IccParametricCurve::LinBGamma(g, a, b, c) => {
                if a.abs() < EPSILON {
                    0.
                } else if x < (-b / a).max(0.) {
                    c
                } else {
                    let x = a * x + b;
                    if x < 0. {
                        0.
                    } else {
                        x.powf(g) + c
                    }
                }
            }
            // x = ((y - c) ^ (1 / g) - b) / a | y >= c
            // x = -b / a                      | else
            IccParametricCurve::LinBGammaInv(g, a, b, c) => {
                if a.abs() < EPSILON {
                    0.
                } else if x < c {
                    -b / a
                } else {
                    ((x - c).powf(1. / g) - b) / a
                }
            }
            // IEC 61966-2.1 (sRGB)
            // y = (ax + b) ^ g | x >= d
            // y = cx           | else
            IccParametricCurve::LinLinGamma(g, a, b, c, d) => {
                if x < d {
                    c * x
                } else {
                    (a * x + b).max(0.).powf(g)
                }
            }
            // x = (y ^ (1 / g) - b) / a | y >= (ad + b) ^ g
            // x = y / c                 | else
            IccParametricCurve::LinLinGammaInv(g, a, b, c, d) => {
                if a.abs() < EPSILON || c.abs() < EPSILON {
                    0.
                } else if x < (a * d + b).max(0.).powf(g) {
                    x / c
                } else {
                    (x.max(0.).powf(1. / g) - b) / a
                }
            }
            // y = (ax + b) ^ g + e | x >= d
            // y = cx + f           | else
            IccParametricCurve::LinLinOffGamma(g, a, b, c, d, e, f) => {
                if x < d {
                    c * x + f
                } else {
                    let v = a * x + b;
                    if v < 0. {
                        e
                    } else {
                        v.powf(g) + e
                    }
                }
            }
            // x = ((y - e) ^ (1 / g) - b) / a | y >= cd + f
            // x = (y - f) / c                 | else
            IccParametricCurve::LinLinOffGammaInv(g, a, b, c, d, e, f) => {
                if x >= c * d + f {
                    let v = x - e;
                    if v < 0. || a.abs() < EPSILON {
                        0.
                    } else {
                        (v.powf(1. / g) - b) / a
                    }
                } else if c.abs() < EPSILON {
                    0.
                } else {
                    (x - f) / c
                }
            }
            IccParametricCurve::LinOffGamma(g, a, b, c) => {
                let v = a * x + b;
                if v < 0. {
                    c
                } else {
                    v.powf(g) + c
                }
            }
            IccParametricCurve::LinOffGammaInv(g, a, b, c) => {
                let v = x - c;
                if v < 0. || a.abs() < EPSILON {
                    0.
                } else {
                    (v.powf(1. / g) - b) / a
                }
            }
            IccParametricCurve::LogGamma(g, a, b, c, d) => {
                let v = b * x.max(0.).powf(g) + c;
                if v <= 0. {
                    d
                } else {
                    a * v.log10() + d
                }
            }
            IccParametricCurve::LogGammaInv(g, a, b, c, d) => {
                if a.abs() < EPSILON || b.abs() < EPSILON {
                    0.
                } else {
                    let v = (10f64.powf((x - d) / a) - c) / b;
                    if v < 0. {
                        0.
                    } else {
                        v.powf(1. / g)
                    }
                }
            }
            // g is carried along for the ICC parameter layout, but unused
            IccParametricCurve::LinPow(_, a, b, c, d, e) => a * b.powf(c * x + d) + e,
            IccParametricCurve::LinPowInv(_, a, b, c, d, e) => {
                let v = x - e;
                if v < 0. || a.abs() < EPSILON || c.abs() < EPSILON || b <= 0. || b == 1. {
                    0.
                } else {
                    ((v / a).ln() / b.ln() - d) / c
                }
            }
            IccParametricCurve::Sigmoid(k) => {
                let correction = 0.5 / sigmoid_base(k, 1.);
                correction * sigmoid_base(k, 2. * x - 1.) + 0.5
            }
            IccParametricCurve::SigmoidInv(k) => {
                let correction = 0.5 / sigmoid_base(k, 1.);
                (inverted_sigmoid_base(k, (x - 0.5) / correction) + 1.) / 2.
            }
        }
    }

    /// Composes two parametric curves, if possible.
    pub fn compose_with(&self, other: &IccParametricCurve) -> Option<IccParametricCurve> {
        use IccParametricCurve::*;
        match (*self, *other) {
            (Gamma(a), Gamma(b)) => Some(Gamma(a * b)),
            (Gamma(a), GammaInv(b)) if b != 0. => Some(Gamma(a / b)),
            (GammaInv(a), Gamma(b)) if a != 0. => Some(Gamma(b / a)),
            (GammaInv(a), GammaInv(b)) => Some(GammaInv(a * b)),
            _ => None,
        }
    }

    pub fn is_identity(&self) -> bool {
        use IccParametricCurve::*;
        match *self {
            Gamma(g) | GammaInv(g) => g == 1.,
            LinGamma(g, a, b) | LinGammaInv(g, a, b) => g == 1. && a == 1. && b == 0.,
            LinBGamma(g, a, b, c) | LinBGammaInv(g, a, b, c) => {
                g == 1. && a == 1. && b == 0. && c == 0.
            }
            LinLinGamma(g, a, b, c, _) | LinLinGammaInv(g, a, b, c, _) => {
                g == 1. && a == 1. && b == 0. && c == 1.
            }
            LinLinOffGamma(g, a, b, c, _, e, f) | LinLinOffGammaInv(g, a, b, c, _, e, f) => {
                g == 1. && a == 1. && b == 0. && c == 1. && e == 0. && f == 0.
            }
            LinOffGamma(g, a, b, c) | LinOffGammaInv(g, a, b, c) => {
                g == 1. && a == 1. && b == 0. && c == 0.
            }
            LogGamma(..) | LogGammaInv(..) | LinPow(..) | LinPowInv(..) => false,
            Sigmoid(..) | SigmoidInv(..) => false,
        }
    }
}

/// Tone curve segment types.
#[derive(Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum CurveType {
    Const(f64),
    IccParam(IccParametricCurve),
    /// 16-bit table spanning 0..1.
    Table(Vec<u16>),
    /// Floating-point samples spanning the segment domain.
    Sampled(Vec<f64>),
}

/// Linearly interpolates evenly spaced samples at `x` in 0..1.
fn interpolate(len: usize, sample: impl Fn(usize) -> f64, x: f64) -> f64 {
    match len {
        0 => f64::NAN,
        1 => sample(0),
        _ => {
            let pos = x.max(0.).min(1.) * (len - 1) as f64;
            let lower = (pos.floor() as usize).min(len - 2);
            let p = pos - lower as f64;
            let a = sample(lower);
            let b = sample(lower + 1);
            a + (b - a) * p
        }
    }
}

/// A tone curve segment.
#[derive(Debug, Clone, PartialEq)]
pub struct CurveSegment {
    /// The domain of this segment.
    ///
    /// Bounds may be infinite.
    pub domain: Range<f64>,
    /// The curve in this segments.
    pub curve: CurveType,
}

impl CurveSegment {
    /// Evaluates this curve segment at the given position.
    ///
    /// Expect potentially nonsensical data or None if x is outside the domain.
    pub fn eval(&self, x: f64) -> Option<f64> {
        match self.curve {
            CurveType::Const(a) => Some(a),
            CurveType::IccParam(curve) => Some(curve.eval(x)),
            CurveType::Table(ref table) => Some(
                interpolate(table.len(), |i| table[i] as f64, x) / 65535.,
            ),
            CurveType::Sampled(ref samples) => {
                let x = (x - self.domain.start) / (self.domain.end - self.domain.start);
                Some(interpolate(samples.len(), |i| samples[i], x))
            }
        }
    }

    /// Returns true if this segment is the identity function in its domain.
    pub fn is_identity(&self) -> bool {
        match self.curve {
            CurveType::Const(_) => false,
            CurveType::IccParam(curve) => curve.is_identity(),
            CurveType::Table(ref table) => {
                if table.len() < 2 {
                    return false;
                }
                let last = (table.len() - 1) as f64;
                table.iter().enumerate().all(|(i, y)| {
                    let expected = crate::util::quick_saturate_word(i as f64 / last * 65535.);
                    *y == expected
                })
            }
            CurveType::Sampled(ref samples) => {
                if samples.len() < 2 || !self.domain.start.is_finite() {
                    return false;
                }
                let last = (samples.len() - 1) as f64;
                let width = self.domain.end - self.domain.start;
                samples.iter().enumerate().all(|(i, y)| {
                    let expected = width * (i as f64 / last) + self.domain.start;
                    (y - expected).abs() <= 1e-3
                })
            }
        }
    }
}

/// A gamma tone curve.
#[derive(Debug, Clone, PartialEq)]
pub struct ToneCurve {
    /// The segments of this tone curve.
    ///
    /// Must be sorted by domain in ascending order, otherwise strange things will happen.
    pub segments: Vec<CurveSegment>,
}

impl ToneCurve {
    /// Creates a new tone curve.
    ///
    /// Segments must be sorted by domain in ascending order (currently not checked).
    pub fn new(segments: Vec<CurveSegment>) -> Self {
        ToneCurve { segments }
    }

    /// Creates a new tone curve from a table of values between 0..1.
    ///
    /// 0 maps to 0 and 65535 maps to 1. Evaluating the curve outside 0..1 will return the closest
    /// value.
    pub fn new_table(values: Vec<u16>) -> Self {
        ToneCurve::new(vec![CurveSegment {
            domain: -f64::INFINITY..f64::INFINITY,
            curve: CurveType::Table(values),
        }])
    }

    /// Creates a new parametric tone curve.
    /// Will return None if the given parametric curve type is unknown.
    pub fn new_icc_parametric(p_type: u16, params: &[f64]) -> Option<Self> {
        IccParametricCurve::from_type(p_type, false, params).map(Self::from_parametric)
    }

    fn from_parametric(curve: IccParametricCurve) -> Self {
        ToneCurve::new(vec![CurveSegment {
            domain: -f64::INFINITY..f64::INFINITY,
            curve: CurveType::IccParam(curve),
        }])
    }

    /// Creates a new gamma curve.
    pub fn new_gamma(gamma: f64) -> Self {
        Self::from_parametric(IccParametricCurve::Gamma(gamma))
    }

    /// Creates the sRGB (IEC 61966-2.1) transfer curve.
    pub fn new_srgb() -> Self {
        // If x < 0.04045, y = x / 12.92
        // else            y = ((x + 0.055) / 1.055) ^ 2.4
        Self::from_parametric(IccParametricCurve::LinLinGamma(
            2.4,
            1. / 1.055,
            0.055 / 1.055,
            1. / 12.92,
            0.04045,
        ))
    }

    /// Tries to evaluate the tone curve at the given value. Returns None if undefined.
    pub fn eval(&self, x: f64) -> Option<f64> {
        self.segments
            .binary_search_by(|segment| {
                if segment.domain.start >= x {
                    Ordering::Greater
                } else if segment.domain.end < x {
                    Ordering::Less
                } else {
                    Ordering::Equal
                }
            })
            .ok()
            .and_then(|index| self.segments[index].eval(x))
    }

    /// Composes this tone curve with another and returns an approximation.
    pub fn compose_with_approx(&self, other: &ToneCurve) -> ToneCurve {
        if self.segments.len() == 1 && other.segments.len() == 1 {
            // try analytical composition
            let own_segment = &self.segments[0];
            let other_segment = &other.segments[0];

            let domain_start = own_segment.domain.start.max(other_segment.domain.start);
            let domain_end = own_segment.domain.end.min(other_segment.domain.end);

            match (&own_segment.curve, &other_segment.curve) {
                (CurveType::IccParam(own_curve), CurveType::IccParam(other_curve)) => {
                    if let Some(composed) = own_curve.compose_with(other_curve) {
                        return ToneCurve::new(vec![CurveSegment {
                            domain: domain_start..domain_end,
                            curve: CurveType::IccParam(composed),
                        }]);
                    }
                }
                (CurveType::Const(a), _) => {
                    return ToneCurve::new(vec![CurveSegment {
                        domain: domain_start..domain_end,
                        curve: CurveType::Const(*a),
                    }]);
                }
                _ => (),
            }
        }

        let composed = |x: f64| {
            self.eval(other.eval(x).unwrap_or(f64::NAN))
                .unwrap_or(f64::NAN)
        };

        // sample -1..2 with -1..0 and 1..2 at lower resolution
        let sample_segment = |domain: Range<f64>, count: usize| {
            let width = domain.end - domain.start;
            let samples = (0..count)
                .map(|i| composed(domain.start + width * i as f64 / (count - 1) as f64))
                .collect();
            CurveSegment {
                domain,
                curve: CurveType::Sampled(samples),
            }
        };

        ToneCurve::new(vec![
            sample_segment(-1.0..0.0, 1024),
            sample_segment(0.0..1.0, 4096),
            sample_segment(1.0..2.0, 1024),
        ])
    }

    /// Returns true if this is an identity curve where defined.
    pub fn is_identity(&self) -> bool {
        self.segments.iter().all(CurveSegment::is_identity)
    }
}

#[test]
fn srgb_curve_values() {
    let curve = ToneCurve::new_srgb();
    assert!((curve.eval(0.).unwrap()).abs() < 1e-9);
    assert!((curve.eval(1.).unwrap() - 1.).abs() < 1e-6);
    assert!((curve.eval(0.02).unwrap() - 0.02 / 12.92).abs() < 1e-9);
    assert!((curve.eval(0.5).unwrap() - 0.214041).abs() < 1e-5);
}

#[test]
fn table_curves_interpolate() {
    let ramp = ToneCurve::new_table(vec![0, 32768, 65535]);
    assert!((ramp.eval(0.25).unwrap() - 16384. / 65535.).abs() < 1e-9);
    assert!(ramp.is_identity());

    let zero = ToneCurve::new_table(vec![0, 0]);
    assert_eq!(zero.eval(0.7), Some(0.));
    assert!(!zero.is_identity());
}

#[test]
fn parametric_inverses() {
    let forward_params: [(u16, &[f64]); 6] = [
        (0, &[2.2]),
        (1, &[2.4, 1.1, -0.1]),
        (3, &[2.4, 1. / 1.055, 0.055 / 1.055, 1. / 12.92, 0.04045]),
        (4, &[2.2, 0.9, 0.1, 0.5, 0.1, 0.02, 0.01]),
        (5, &[1.8, 0.9, 0.1, 0.05]),
        (107, &[3.]),
    ];

    for (ty, params) in forward_params {
        let forward = IccParametricCurve::from_type(ty, false, params).unwrap();
        let inverse = IccParametricCurve::from_type(ty, true, params).unwrap();
        for x in [0.2, 0.45, 0.8] {
            let y = forward.eval(x);
            assert!(
                (inverse.eval(y) - x).abs() < 1e-6,
                "type {} at {}: {} -> {}",
                ty,
                x,
                y,
                inverse.eval(y)
            );
        }
    }
}

#[test]
fn parametric_needs_enough_params() {
    assert!(IccParametricCurve::from_type(3, false, &[2.4]).is_none());
    assert!(IccParametricCurve::from_type(42, false, &[1.]).is_none());
}
