// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
use std::sync::OnceLock;

use strata_core::{Canonical, DecodeError, Loggable, NativeValue, ResultExt};
use strata_schema::{DatatypeDef, FieldDef};

use super::{Angle, Vec3D};

/// **Datatype**: 3D rotation represented by a rotation around a given axis.
///
/// The axis need not be normalized; a zero axis means no rotation.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RotationAxisAngle {
    /// Axis to rotate around.
    pub axis: Vec3D,
    /// How much to rotate around the axis.
    pub angle: Angle,
}

impl RotationAxisAngle {
    /// Creates a rotation.
    pub fn new(axis: impl Into<Vec3D>, angle: Angle) -> Self {
        Self {
            axis: axis.into(),
            angle,
        }
    }
}

impl Loggable for RotationAxisAngle {
    fn datatype() -> &'static DatatypeDef {
        static DATATYPE: OnceLock<DatatypeDef> = OnceLock::new();
        DATATYPE.get_or_init(|| {
            DatatypeDef::structure(
                "rerun.datatypes.RotationAxisAngle",
                vec![
                    FieldDef::new("axis", Vec3D::datatype().clone()),
                    FieldDef::new("angle", Angle::datatype().clone()),
                ],
            )
        })
    }

    fn to_native(&self) -> NativeValue {
        NativeValue::record([
            ("axis", self.axis.to_native()),
            ("angle", self.angle.to_native()),
        ])
    }

    fn from_canonical(canonical: &Canonical) -> Result<Self, DecodeError> {
        let Some([axis, angle]) = canonical.fields() else {
            return Err(DecodeError::UnexpectedShape {
                expected: "struct with axis and angle",
            });
        };
        Ok(Self {
            axis: Vec3D::from_canonical(axis).with_context("axis")?,
            angle: Angle::from_canonical(angle).with_context("angle")?,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::float_cmp)]
mod tests {
    use super::*;

    #[test]
    fn accepts_record_and_positional_input() {
        let expected = RotationAxisAngle::new([0.0_f32, 0.0, 1.0], Angle::from_radians(0.5));
        let record = NativeValue::record([
            ("axis", NativeValue::from([0.0_f32, 0.0, 1.0])),
            ("angle", NativeValue::from(0.5_f64)),
        ]);
        assert_eq!(RotationAxisAngle::from_native(&record).unwrap(), expected);

        let positional = NativeValue::Sequence(vec![[0.0_f32, 0.0, 1.0].into(), 0.5_f32.into()]);
        assert_eq!(RotationAxisAngle::from_native(&positional).unwrap(), expected);
    }

    #[test]
    fn arrow_round_trip() {
        let values = [
            RotationAxisAngle::new([1.0_f32, 0.0, 0.0], Angle::from_degrees(90.0)),
            RotationAxisAngle::default(),
        ];
        let array = RotationAxisAngle::to_arrow(&values).unwrap();
        assert_eq!(array.len(), 2);
        assert_eq!(RotationAxisAngle::from_arrow(array.as_ref()).unwrap(), values);
    }
}
