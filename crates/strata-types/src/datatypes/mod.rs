// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Built-in datatypes.

mod angle;
mod rotation_axis_angle;
mod scalars;
mod vec;

pub use angle::Angle;
pub use rotation_axis_angle::RotationAxisAngle;
pub use scalars::{Bool, Float32, UInt32};
pub use vec::{Vec2D, Vec3D, Vec4D};

use strata_core::{Canonical, DecodeError, Elements};

/// The single float of a one-element instance.
pub(crate) fn single_f32(canonical: &Canonical) -> Result<f32, DecodeError> {
    match canonical.as_f32() {
        Some([value]) => Ok(*value),
        _ => Err(DecodeError::UnexpectedShape {
            expected: "one f32 element",
        }),
    }
}

/// Exactly `N` floats.
pub(crate) fn fixed_f32<const N: usize>(canonical: &Canonical) -> Result<[f32; N], DecodeError> {
    canonical
        .as_f32()
        .and_then(|values| <[f32; N]>::try_from(values).ok())
        .ok_or(DecodeError::UnexpectedShape {
            expected: "a fixed number of f32 elements",
        })
}

pub(crate) fn single_u32(canonical: &Canonical) -> Result<u32, DecodeError> {
    match canonical.elements().and_then(Elements::as_u32) {
        Some([value]) => Ok(*value),
        _ => Err(DecodeError::UnexpectedShape {
            expected: "one u32 element",
        }),
    }
}

pub(crate) fn single_bool(canonical: &Canonical) -> Result<bool, DecodeError> {
    match canonical.elements().and_then(Elements::as_bool) {
        Some([value]) => Ok(*value),
        _ => Err(DecodeError::UnexpectedShape {
            expected: "one bool element",
        }),
    }
}

pub(crate) fn single_u8(canonical: &Canonical) -> Result<u8, DecodeError> {
    match canonical.elements().and_then(Elements::as_u8) {
        Some([value]) => Ok(*value),
        _ => Err(DecodeError::UnexpectedShape {
            expected: "one u8 element",
        }),
    }
}
