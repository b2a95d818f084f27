//! Color representations.

use crate::util::{lcms_mat3_eval, lcms_mat3_per, quick_saturate_word};
use cgmath::prelude::*;
use cgmath::{Matrix3, Vector3};

/// A CIE XYZ color.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Cxyz {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

/// A CIE xyY color.
#[allow(non_snake_case)]
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct CxyY {
    pub x: f64,
    pub y: f64,
    pub Y: f64,
}

/// A CIE L\*a\*b\* color.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct CLab {
    pub l: f64,
    pub a: f64,
    pub b: f64,
}

/// A CIE L\*C\*h color: the cylindrical form of L\*a\*b\*.
///
/// The hue angle is in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct CLCh {
    pub l: f64,
    pub c: f64,
    pub h: f64,
}

/// The D50 white point.
pub const D50: Cxyz = Cxyz {
    x: 0.9642,
    y: 1.,
    z: 0.8249,
};

/// The D65 white point.
pub const D65: Cxyz = Cxyz {
    x: 0.95047,
    y: 1.,
    z: 1.08883,
};

impl From<Cxyz> for CxyY {
    fn from(this: Cxyz) -> CxyY {
        let sum = this.x + this.y + this.z;
        CxyY {
            x: this.x / sum,
            y: this.y / sum,
            Y: this.y,
        }
    }
}

impl From<CxyY> for Cxyz {
    fn from(this: CxyY) -> Cxyz {
        Cxyz {
            x: this.x / this.y * this.Y,
            y: this.Y,
            z: (1. - this.x - this.y) / this.y * this.Y,
        }
    }
}

fn xyz2lab_f(t: f64) -> f64 {
    let limit = (24. / 116.) * (24. / 116.) * (24. / 116.);

    if t <= limit {
        (841. / 108.) * t + (16. / 116.)
    } else {
        t.cbrt()
    }
}

fn xyz2lab_f_inv(t: f64) -> f64 {
    let limit = 24. / 116.;

    if t <= limit {
        (108. / 841.) * (t - (16. / 116.))
    } else {
        t * t * t
    }
}

impl Cxyz {
    pub const MAX_ENCODABLE: f64 = 1.0 + 32767.0 / 32768.0;

    /// Converts this color to L\*a\*b\* with the given white point.
    ///
    /// Can handle negative values “in some cases.”
    pub fn into_lab(self, white_point: Cxyz) -> CLab {
        let fx = xyz2lab_f(self.x / white_point.x);
        let fy = xyz2lab_f(self.y / white_point.y);
        let fz = xyz2lab_f(self.z / white_point.z);

        CLab {
            l: 116. * fy - 16.,
            a: 500. * (fx - fy),
            b: 200. * (fy - fz),
        }
    }

    /// Returns the final chromatic adaptation from this illuminant to the given illuminant.
    ///
    /// If no cone matrix is specified, the Bradford matrix will be used.
    pub fn adaptation_matrix(
        &self,
        to_illuminant: Cxyz,
        cone_matrix: Option<Matrix3<f64>>,
    ) -> Option<Matrix3<f64>> {
        /// Bradford matrix
        const BRADFORD: Matrix3<f64> = Matrix3 {
            x: Vector3 {
                x: 0.8951,
                y: 0.2664,
                z: -0.1614,
            },
            y: Vector3 {
                x: -0.7502,
                y: 1.7135,
                z: 0.0367,
            },
            z: Vector3 {
                x: 0.0389,
                y: -0.0685,
                z: 1.0296,
            },
        };

        compute_chromatic_adaptation(cone_matrix.unwrap_or(BRADFORD), *self, to_illuminant)
    }
}

impl CLab {
    /// Converts this color to XYZ with the given white point.
    /// May return negative values.
    pub fn into_xyz(self, white_point: Cxyz) -> Cxyz {
        let y = (self.l + 16.) / 116.;
        let x = y + 0.002 * self.a;
        let z = y - 0.005 * self.b;

        Cxyz {
            x: xyz2lab_f_inv(x) * white_point.x,
            y: xyz2lab_f_inv(y) * white_point.y,
            z: xyz2lab_f_inv(z) * white_point.z,
        }
    }

    /// Converts this color to its cylindrical form.
    pub fn into_lch(self) -> CLCh {
        let h = if self.a == 0. && self.b == 0. {
            0.
        } else {
            self.b.atan2(self.a).to_degrees().rem_euclid(360.)
        };

        CLCh {
            l: self.l,
            c: self.a.hypot(self.b),
            h,
        }
    }

    /// Decodes a 16-bit L\*a\*b\* value in the V4 encoding.
    ///
    /// L\* maps 0..100 to 0..0xFFFF and a\*, b\* map -128..127 to 0..0xFFFF.
    pub fn from_encoded(encoded: &[u16]) -> CLab {
        CLab {
            l: encoded[0] as f64 / 655.35,
            a: encoded[1] as f64 / 257. - 128.,
            b: encoded[2] as f64 / 257. - 128.,
        }
    }

    /// Encodes this color in the 16-bit V4 encoding, clamping it to the encodable range.
    pub fn to_encoded(self) -> [u16; 3] {
        let l = self.l.max(0.).min(100.);
        let a = self.a.max(-128.).min(127.);
        let b = self.b.max(-128.).min(127.);

        [
            quick_saturate_word(l * 655.35),
            quick_saturate_word((a + 128.) * 257.),
            quick_saturate_word((b + 128.) * 257.),
        ]
    }
}

impl CLCh {
    /// Converts this color back to L\*a\*b\*.
    pub fn into_lab(self) -> CLab {
        let h = self.h.to_radians();

        CLab {
            l: self.l,
            a: self.c * h.cos(),
            b: self.c * h.sin(),
        }
    }
}

impl CxyY {
    /// Creates a white point from the given temperature.
    ///
    /// Will return None if the temperature is out of bounds (4000 K to 25000 K).
    pub fn from_temp(kelvin: f64) -> Option<CxyY> {
        let t = kelvin;
        let t2 = t * t;
        let t3 = t2 * t;

        let x = if (4000. ..=7000.).contains(&t) {
            // for correlated color temperature (T) between 4000K and 7000K:
            -4.6070 * (1e9 / t3) + 2.9678 * (1e6 / t2) + 0.09911 * (1e3 / t) + 0.244063
        } else if t > 7000. && t <= 25000. {
            // or for correlated color temperature (T) between 7000K and 25000K:
            -2.0064 * (1e9 / t3) + 1.9018 * (1e6 / t2) + 0.24748 * (1e3 / t) + 0.237040
        } else {
            return None;
        };

        let y = -3. * (x * x) + 2.87 * x + 0.275;

        Some(CxyY { x, y, Y: 1. })
    }
}

impl From<Cxyz> for Vector3<f64> {
    fn from(this: Cxyz) -> Vector3<f64> {
        Vector3 {
            x: this.x,
            y: this.y,
            z: this.z,
        }
    }
}

/// Computes a chromatic adaptation matrix using chad as the cone matrix
fn compute_chromatic_adaptation(
    chad: Matrix3<f64>,
    source_wp: Cxyz,
    dest_wp: Cxyz,
) -> Option<Matrix3<f64>> {
    let inverse = chad.invert()?;

    let cone_source_rgb = lcms_mat3_eval(chad, source_wp.into());
    let cone_dest_rgb = lcms_mat3_eval(chad, dest_wp.into());

    let cone = Matrix3::from_diagonal(Vector3::new(
        cone_dest_rgb.x / cone_source_rgb.x,
        cone_dest_rgb.y / cone_source_rgb.y,
        cone_dest_rgb.z / cone_source_rgb.z,
    ));

    Some(lcms_mat3_per(inverse, lcms_mat3_per(cone, chad)))
}

/// Given a white point and primaries, builds a transfer matrix from RGB to CIE XYZ, adapted to
/// D50.
///
/// The absolute conversion matrix is built from the primaries and inverted; the white point is
/// evaluated across it to obtain the per-primary coefficients, which are then applied to the
/// original matrix.
pub fn build_rgb_to_xyz_transfer_matrix(
    white_point: CxyY,
    primaries: (CxyY, CxyY, CxyY),
) -> Option<Matrix3<f64>> {
    let xn = white_point.x;
    let yn = white_point.y;
    let xr = primaries.0.x;
    let yr = primaries.0.y;
    let xg = primaries.1.x;
    let yg = primaries.1.y;
    let xb = primaries.2.x;
    let yb = primaries.2.y;

    let primaries = Matrix3::from_cols(
        (xr, xg, xb).into(),
        (yr, yg, yb).into(),
        (1. - xr - yr, 1. - xg - yg, 1. - xb - yb).into(),
    );

    let result = primaries.invert()?;

    let white_point = Vector3::new(xn / yn, 1., (1. - xn - yn) / yn);

    let coef = lcms_mat3_eval(result, white_point);

    let mat = Matrix3::from_cols(
        (coef.x * xr, coef.y * xg, coef.z * xb).into(),
        (coef.x * yr, coef.y * yg, coef.z * yb).into(),
        (
            coef.x * (1. - xr - yr),
            coef.y * (1. - xg - yg),
            coef.z * (1. - xb - yb),
        )
            .into(),
    );

    let white = Cxyz {
        x: white_point.x,
        y: white_point.y,
        z: white_point.z,
    };

    white
        .adaptation_matrix(D50, None)
        .map(|bradford| lcms_mat3_per(bradford, mat))
}

#[test]
fn xyz_to_xyy_sanity_check() {
    let a: CxyY = D50.into();
    let b: Cxyz = a.into();

    assert!((D50.x - b.x).abs() < 1e-5);
    assert!((D50.y - b.y).abs() < 1e-5);
    assert!((D50.z - b.z).abs() < 1e-5);
}

#[test]
fn lab_lch_round_trip() {
    let lab = CLab {
        l: 52.,
        a: -31.5,
        b: 12.25,
    };
    let lch = lab.into_lch();
    assert!(lch.h >= 0. && lch.h < 360.);

    let back = lch.into_lab();
    assert!((back.l - lab.l).abs() < 1e-9);
    assert!((back.a - lab.a).abs() < 1e-9);
    assert!((back.b - lab.b).abs() < 1e-9);
}

#[test]
fn lab_encoding_is_stable() {
    for encoded in [[0, 0, 0], [65535, 65535, 65535], [32768, 32896, 12345]] {
        let lab = CLab::from_encoded(&encoded);
        assert_eq!(lab.to_encoded(), encoded);
    }

    let clamped = CLab {
        l: 120.,
        a: -200.,
        b: 300.,
    }
    .to_encoded();
    assert_eq!(clamped, [0xFFFF, 0, 0xFFFF]);
}

#[test]
fn temperature_bounds() {
    assert!(CxyY::from_temp(3000.).is_none());
    assert!(CxyY::from_temp(30000.).is_none());

    let d65 = CxyY::from_temp(6504.).unwrap();
    assert!((d65.x - 0.3127).abs() < 1e-3);
    assert!((d65.y - 0.3291).abs() < 1e-3);
}
