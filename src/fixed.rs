//! Fixed-point types.

use std::convert::TryFrom;
use std::fmt;

/// A value that cannot be represented in the target fixed-point type.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReprError<T>(pub T);

impl<T: fmt::Display> fmt::Display for ReprError<T> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} is not representable in fixed point", self.0)
    }
}

impl<T: fmt::Debug + fmt::Display> std::error::Error for ReprError<T> {}

/// Signed 15.16 fixed-point number.
#[allow(non_camel_case_types)]
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct s15f16(i32);

impl s15f16 {
    pub const ONE: s15f16 = s15f16(0x10000);
}

impl fmt::Debug for s15f16 {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", f64::from(*self))
    }
}

impl From<s15f16> for f64 {
    fn from(this: s15f16) -> f64 {
        this.0 as f64 / 65536.
    }
}

impl TryFrom<f64> for s15f16 {
    type Error = ReprError<f64>;

    /// Rounds to the nearest representable value.
    fn try_from(this: f64) -> Result<s15f16, ReprError<f64>> {
        let scaled = (this * 65536. + 0.5).floor();
        if !scaled.is_finite() || scaled < i32::MIN as f64 || scaled > i32::MAX as f64 {
            return Err(ReprError(this));
        }
        Ok(s15f16(scaled as i32))
    }
}

#[test]
fn s15f16_round_trip() {
    for value in [0., 1., -1., 0.5, -0.1614, 1.7135, 32767.99] {
        let fixed = s15f16::try_from(value).unwrap();
        assert!((f64::from(fixed) - value).abs() <= 1. / 65536.);
    }
    assert_eq!(s15f16::try_from(1.).unwrap(), s15f16::ONE);
    assert!(s15f16::try_from(40000.).is_err());
    assert!(s15f16::try_from(f64::NAN).is_err());
}
