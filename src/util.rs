use cgmath::prelude::*;
use cgmath::{Matrix3, Vector3};

/// Creates a repr(primitive) enum with conversion to/from the primitive type.
macro_rules! enum_primitive {
    (
        $(#[$meta:meta])* pub $name:ident ($ty:tt)
        { $($(#[$vmeta:meta])* $variant:ident = $value:expr,)+ }
    ) => {
        enum_primitive!(__ $($meta)*; pub; $name; $ty; $($($vmeta)*; $variant, $value),+);
    };
    (
        __ $($meta:meta)*; $prefix:tt; $name:ident; $ty:tt;
        $($($vmeta:meta)*; $variant:ident, $value:expr),+
    ) => {
        $(#[$meta])*
        #[repr($ty)]
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        $prefix enum $name {
            $($(#[$vmeta])* $variant = $value,)+
        }

        impl std::convert::TryFrom<$ty> for $name {
            type Error = $ty;
            fn try_from(value: $ty) -> Result<$name, $ty> {
                match value {
                    $(
                        $value => Ok($name::$variant),
                    )+
                    _ => Err(value),
                }
            }
        }

        impl From<$name> for $ty {
            fn from(this: $name) -> $ty {
                this as $ty
            }
        }
    };
}

pub(crate) fn lcms_mat3_per(a: Matrix3<f64>, b: Matrix3<f64>) -> Matrix3<f64> {
    // LCMS Mat3per’s arguments are swapped
    b * a
}

pub(crate) fn lcms_mat3_eval(a: Matrix3<f64>, v: Vector3<f64>) -> Vector3<f64> {
    // LCMS matrices are row-major, cgmath is column-major
    a.transpose() * v
}

/// Rounds to the nearest 16-bit value, saturating at both ends.
pub fn quick_saturate_word(d: f64) -> u16 {
    let d = d + 0.5;
    if d.is_nan() || d <= 0. {
        0
    } else if d >= 65535. {
        0xFFFF
    } else {
        d.floor() as u16
    }
}

/// Quantizes lattice index `i` of an axis with `max_samples` points to the 16-bit domain.
pub(crate) fn quantize_val(i: usize, max_samples: usize) -> u16 {
    let x = (i as f64 * 65535.) / (max_samples - 1) as f64;
    quick_saturate_word(x)
}

#[test]
fn saturate_word_bounds() {
    assert_eq!(quick_saturate_word(-3.), 0);
    assert_eq!(quick_saturate_word(f64::NAN), 0);
    assert_eq!(quick_saturate_word(70000.), 0xFFFF);
    assert_eq!(quick_saturate_word(1.49), 1);
    assert_eq!(quick_saturate_word(1.5), 2);
}

#[test]
fn quantize_hits_both_ends() {
    assert_eq!(quantize_val(0, 17), 0);
    assert_eq!(quantize_val(16, 17), 0xFFFF);
    assert_eq!(quantize_val(1, 2), 0xFFFF);
    assert_eq!(quantize_val(8, 17), 32768);
}
