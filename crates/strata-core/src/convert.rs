// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Primitive converters: native input → canonical instance.
//!
//! Conversion is pure. Nested input is checked for regularity before any
//! element is coerced, so a failure never depends on element order.

use strata_schema::{Arity, DatatypeDef, ElementKind, EnumVariant, FieldDef, Shape};

use crate::canonical::{Canonical, Elements};
use crate::config::{EngineConfig, NonFinitePolicy};
use crate::error::ConversionError;
use crate::native::{NativeValue, Scalar};

/// Normalizes one native value into the canonical form of `datatype`.
///
/// Element counts must equal the declared arity; a lone scalar is repeated
/// to fill a fixed arity only when the datatype sets `broadcast_scalar`.
pub fn normalize(
    value: &NativeValue,
    datatype: &DatatypeDef,
    config: &EngineConfig,
) -> Result<Canonical, ConversionError> {
    if matches!(value, NativeValue::Null) {
        return if datatype.nullable {
            Ok(Canonical::Null)
        } else {
            Err(ConversionError::UnexpectedNull {
                datatype: datatype.name.clone(),
            })
        };
    }

    match &datatype.shape {
        Shape::Primitive { element } => {
            normalize_elements(value, *element, Arity::Fixed(1), false, config)
        }
        Shape::FixedList { element, arity } => normalize_elements(
            value,
            *element,
            Arity::Fixed(*arity as usize),
            datatype.broadcast_scalar,
            config,
        ),
        Shape::List { element } => {
            normalize_elements(value, *element, Arity::Variable, false, config)
        }
        Shape::Enum { variants } => normalize_enum(value, &datatype.name, variants),
        Shape::Struct { fields } => normalize_struct(value, &datatype.name, fields, config),
    }
}

fn normalize_elements(
    value: &NativeValue,
    kind: ElementKind,
    arity: Arity,
    broadcast: bool,
    config: &EngineConfig,
) -> Result<Canonical, ConversionError> {
    shape_of(value, kind)?;
    let count = flat_len(value);

    if let (Arity::Fixed(n), NativeValue::Scalar(scalar)) = (arity, value) {
        if broadcast && n > 1 {
            let mut out = Elements::with_capacity(kind, n);
            for _ in 0..n {
                push_scalar(&mut out, scalar, config)?;
            }
            return Ok(Canonical::Elements(out));
        }
    }

    if !arity.accepts(count) {
        return Err(ConversionError::ArityMismatch {
            expected: arity,
            found: count,
        });
    }

    let mut out = Elements::with_capacity(kind, count);
    push_flat(&mut out, value, config)?;
    Ok(Canonical::Elements(out))
}

/// Dimensions of a regular nested value, outermost first.
///
/// Scalars have shape `[]`. Siblings must agree exactly: mixing scalars with
/// sequences, or sequences of different lengths, is irregular.
fn shape_of(value: &NativeValue, kind: ElementKind) -> Result<Vec<usize>, ConversionError> {
    match value {
        NativeValue::Scalar(_) => Ok(Vec::new()),
        NativeValue::Array(array) => Ok(array.shape().to_vec()),
        NativeValue::Sequence(items) => {
            let mut inner: Option<Vec<usize>> = None;
            for item in items {
                let shape = shape_of(item, kind)?;
                match &inner {
                    None => inner = Some(shape),
                    Some(first) if *first == shape => {}
                    Some(first) => {
                        if first.len() != shape.len() {
                            return Err(ConversionError::MixedNesting);
                        }
                        let (expected, found) = first
                            .iter()
                            .zip(&shape)
                            .find(|(a, b)| a != b)
                            .map_or((0, 0), |(a, b)| (*a, *b));
                        return Err(ConversionError::Irregular { expected, found });
                    }
                }
            }
            let mut shape = vec![items.len()];
            shape.extend(inner.unwrap_or_default());
            Ok(shape)
        }
        NativeValue::Null | NativeValue::Record(_) => Err(ConversionError::NonNumeric {
            expected: kind,
            found: value.kind_label(),
        }),
    }
}

fn flat_len(value: &NativeValue) -> usize {
    match value {
        NativeValue::Scalar(_) => 1,
        NativeValue::Array(array) => array.len(),
        NativeValue::Sequence(items) => items.iter().map(flat_len).sum(),
        NativeValue::Null | NativeValue::Record(_) => 0,
    }
}

fn push_flat(
    out: &mut Elements,
    value: &NativeValue,
    config: &EngineConfig,
) -> Result<(), ConversionError> {
    match value {
        NativeValue::Scalar(scalar) => push_scalar(out, scalar, config),
        NativeValue::Array(array) => {
            for scalar in array.buffer().iter() {
                push_scalar(out, &scalar, config)?;
            }
            Ok(())
        }
        NativeValue::Sequence(items) => {
            for item in items {
                push_flat(out, item, config)?;
            }
            Ok(())
        }
        NativeValue::Null | NativeValue::Record(_) => Err(ConversionError::NonNumeric {
            expected: out.kind(),
            found: value.kind_label(),
        }),
    }
}

fn push_scalar(
    out: &mut Elements,
    scalar: &Scalar,
    config: &EngineConfig,
) -> Result<(), ConversionError> {
    match out {
        Elements::Float32(v) => v.push(coerce_f32(scalar, config)?),
        Elements::UInt8(v) => {
            let wide = coerce_uint(scalar, ElementKind::UInt8)?;
            v.push(u8::try_from(wide).map_err(|_| out_of_range(ElementKind::UInt8, wide))?);
        }
        Elements::UInt32(v) => {
            let wide = coerce_uint(scalar, ElementKind::UInt32)?;
            v.push(u32::try_from(wide).map_err(|_| out_of_range(ElementKind::UInt32, wide))?);
        }
        Elements::Bool(v) => v.push(coerce_bool(scalar)?),
    }
    Ok(())
}

fn out_of_range(kind: ElementKind, value: impl std::fmt::Display) -> ConversionError {
    ConversionError::OutOfRange {
        kind,
        value: value.to_string(),
    }
}

/// Narrows any numeric scalar to `f32`. No clamping: out-of-range input
/// becomes an infinity, NaN stays NaN.
pub(crate) fn coerce_f32(scalar: &Scalar, config: &EngineConfig) -> Result<f32, ConversionError> {
    let value = match scalar {
        Scalar::F32(v) => *v,
        Scalar::F64(v) => *v as f32,
        Scalar::I64(v) => *v as f32,
        Scalar::U64(v) => *v as f32,
        Scalar::Bool(b) => f32::from(u8::from(*b)),
        Scalar::Text(_) => {
            return Err(ConversionError::NonNumeric {
                expected: ElementKind::Float32,
                found: scalar.kind_label(),
            })
        }
    };
    if config.non_finite == NonFinitePolicy::Reject && !value.is_finite() {
        return Err(ConversionError::NonFinite {
            value: f64::from(value),
        });
    }
    Ok(value)
}

/// Widens an integral scalar to `u64`. Floats are accepted only when finite,
/// integral and non-negative.
#[allow(clippy::cast_sign_loss)]
fn coerce_uint(scalar: &Scalar, kind: ElementKind) -> Result<u64, ConversionError> {
    let float = |v: f64| {
        if v.is_finite() && v.fract() == 0.0 && v >= 0.0 && v <= f64::from(u32::MAX) {
            Ok(v as u64)
        } else {
            Err(out_of_range(kind, v))
        }
    };
    match scalar {
        Scalar::U64(v) => Ok(*v),
        Scalar::I64(v) => u64::try_from(*v).map_err(|_| out_of_range(kind, v)),
        Scalar::F32(v) => float(f64::from(*v)),
        Scalar::F64(v) => float(*v),
        Scalar::Bool(b) => Ok(u64::from(*b)),
        Scalar::Text(_) => Err(ConversionError::NonNumeric {
            expected: kind,
            found: scalar.kind_label(),
        }),
    }
}

fn coerce_bool(scalar: &Scalar) -> Result<bool, ConversionError> {
    match scalar {
        Scalar::Bool(b) => Ok(*b),
        Scalar::I64(0) | Scalar::U64(0) => Ok(false),
        Scalar::I64(1) | Scalar::U64(1) => Ok(true),
        Scalar::I64(v) => Err(out_of_range(ElementKind::Bool, v)),
        Scalar::U64(v) => Err(out_of_range(ElementKind::Bool, v)),
        Scalar::F32(_) | Scalar::F64(_) | Scalar::Text(_) => Err(ConversionError::NonNumeric {
            expected: ElementKind::Bool,
            found: scalar.kind_label(),
        }),
    }
}

fn normalize_enum(
    value: &NativeValue,
    datatype: &str,
    variants: &[EnumVariant],
) -> Result<Canonical, ConversionError> {
    let scalar = single_scalar(value)?;
    let invalid = |rendered: String| ConversionError::InvalidEnumValue {
        datatype: datatype.to_owned(),
        value: rendered,
    };
    let discriminant = match &scalar {
        Scalar::Text(name) => variants
            .iter()
            .find(|v| v.name.eq_ignore_ascii_case(name))
            .map(|v| v.value)
            .ok_or_else(|| invalid(format!("{name:?}")))?,
        other => {
            let wide = coerce_uint(other, ElementKind::UInt8)?;
            variants
                .iter()
                .find(|v| u64::from(v.value) == wide)
                .map(|v| v.value)
                .ok_or_else(|| invalid(wide.to_string()))?
        }
    };
    Ok(Canonical::Elements(Elements::UInt8(vec![discriminant])))
}

/// Unwraps a value holding exactly one scalar (a bare scalar, a one-element
/// sequence or a one-element array).
fn single_scalar(value: &NativeValue) -> Result<Scalar, ConversionError> {
    shape_of(value, ElementKind::UInt8)?;
    let count = flat_len(value);
    if count != 1 {
        return Err(ConversionError::ArityMismatch {
            expected: Arity::Fixed(1),
            found: count,
        });
    }
    match value {
        NativeValue::Scalar(s) => Ok(s.clone()),
        NativeValue::Sequence(items) => items
            .first()
            .map_or(Err(ConversionError::MixedNesting), single_scalar),
        NativeValue::Array(array) => array.buffer().get(0).ok_or(ConversionError::ArityMismatch {
            expected: Arity::Fixed(1),
            found: 0,
        }),
        NativeValue::Null | NativeValue::Record(_) => Err(ConversionError::NonNumeric {
            expected: ElementKind::UInt8,
            found: value.kind_label(),
        }),
    }
}

fn normalize_struct(
    value: &NativeValue,
    datatype: &str,
    fields: &[FieldDef],
    config: &EngineConfig,
) -> Result<Canonical, ConversionError> {
    match value {
        NativeValue::Record(pairs) => {
            if let Some((unknown, _)) = pairs
                .iter()
                .find(|(name, _)| !fields.iter().any(|f| &f.name == name))
            {
                return Err(ConversionError::UnknownField {
                    datatype: datatype.to_owned(),
                    field: unknown.clone(),
                });
            }
            let mut out = Vec::with_capacity(fields.len());
            for field in fields {
                let supplied = pairs.iter().find(|(name, _)| *name == field.name);
                let canonical = match supplied {
                    Some((_, v)) => normalize(v, &field.datatype, config)
                        .map_err(|e| e.in_field(&field.name))?,
                    None if field.datatype.nullable => Canonical::Null,
                    None => {
                        return Err(ConversionError::MissingField {
                            datatype: datatype.to_owned(),
                            field: field.name.clone(),
                        })
                    }
                };
                out.push(canonical);
            }
            Ok(Canonical::Struct(out))
        }
        NativeValue::Sequence(items) => {
            if items.len() != fields.len() {
                return Err(ConversionError::ArityMismatch {
                    expected: Arity::Fixed(fields.len()),
                    found: items.len(),
                });
            }
            let mut out = Vec::with_capacity(fields.len());
            for (field, item) in fields.iter().zip(items) {
                out.push(
                    normalize(item, &field.datatype, config)
                        .map_err(|e| e.in_field(&field.name))?,
                );
            }
            Ok(Canonical::Struct(out))
        }
        _ => Err(ConversionError::ShapeMismatch {
            datatype: datatype.to_owned(),
            expected: "a record or a positional sequence of fields",
        }),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::float_cmp)]
mod tests {
    use super::*;
    use crate::native::{NdArray, TypedBuffer};

    fn vec4() -> DatatypeDef {
        DatatypeDef::fixed_list("test.Vec4D", ElementKind::Float32, 4)
    }

    fn norm(value: impl Into<NativeValue>, datatype: &DatatypeDef) -> Result<Canonical, ConversionError> {
        normalize(&value.into(), datatype, &EngineConfig::default())
    }

    #[test]
    fn flat_and_nested_inputs_flatten_to_arity() {
        let flat = norm([1.0_f32, 2.0, 3.0, 4.0], &vec4()).unwrap();
        let nested = norm(vec![[1.0_f32, 2.0], [3.0, 4.0]], &vec4()).unwrap();
        assert_eq!(flat, nested);
        assert_eq!(flat.as_f32().unwrap(), &[1.0, 2.0, 3.0, 4.0]);
    }

    #[test]
    fn f64_and_integers_narrow_to_f32() {
        let mixed = NativeValue::Sequence(vec![
            1.5_f64.into(),
            2_i64.into(),
            3_u64.into(),
            true.into(),
        ]);
        let out = normalize(&mixed, &vec4(), &EngineConfig::default()).unwrap();
        assert_eq!(out.as_f32().unwrap(), &[1.5, 2.0, 3.0, 1.0]);
    }

    #[test]
    fn arity_mismatch_is_reported() {
        let err = norm([1.0_f32, 2.0, 3.0], &vec4()).unwrap_err();
        assert_eq!(
            err,
            ConversionError::ArityMismatch {
                expected: Arity::Fixed(4),
                found: 3
            }
        );
    }

    #[test]
    fn irregular_nesting_is_rejected() {
        let err = norm(
            NativeValue::Sequence(vec![vec![1.0_f32].into(), vec![2.0_f32, 3.0, 4.0].into()]),
            &vec4(),
        )
        .unwrap_err();
        assert_eq!(err, ConversionError::Irregular { expected: 1, found: 3 });

        let mixed = NativeValue::Sequence(vec![1.0_f32.into(), vec![2.0_f32, 3.0, 4.0].into()]);
        assert_eq!(norm(mixed, &vec4()).unwrap_err(), ConversionError::MixedNesting);
    }

    #[test]
    fn text_is_not_numeric() {
        let err = norm(["a", "b", "c", "d"], &vec4()).unwrap_err();
        assert!(matches!(err, ConversionError::NonNumeric { found: "text", .. }));
    }

    #[test]
    fn broadcast_requires_opt_in() {
        assert!(norm(2.0_f32, &vec4()).is_err());
        let broadcasting = vec4().with_broadcast_scalar(true);
        let out = norm(2.0_f32, &broadcasting).unwrap();
        assert_eq!(out.as_f32().unwrap(), &[2.0; 4]);
    }

    #[test]
    fn non_finite_follows_policy() {
        let scalar = DatatypeDef::primitive("test.Float32", ElementKind::Float32);
        let passed = norm(f32::NAN, &scalar).unwrap();
        assert!(passed.as_f32().unwrap()[0].is_nan());

        let reject = EngineConfig::default().with_non_finite(NonFinitePolicy::Reject);
        let err = normalize(&f32::INFINITY.into(), &scalar, &reject).unwrap_err();
        assert!(matches!(err, ConversionError::NonFinite { .. }));
    }

    #[test]
    fn typed_arrays_convert() {
        let array = NdArray::new(TypedBuffer::Float64(vec![1.0, 2.0, 3.0, 4.0]), vec![2, 2]).unwrap();
        let out = norm(array, &vec4()).unwrap();
        assert_eq!(out.as_f32().unwrap(), &[1.0, 2.0, 3.0, 4.0]);
    }

    #[test]
    fn integer_kinds_check_range() {
        let u8_dt = DatatypeDef::primitive("test.Byte", ElementKind::UInt8);
        assert!(norm(255_u32, &u8_dt).is_ok());
        assert!(matches!(
            norm(256_u32, &u8_dt).unwrap_err(),
            ConversionError::OutOfRange { .. }
        ));
        assert!(norm(-1_i64, &u8_dt).is_err());
        assert!(norm(1.5_f32, &u8_dt).is_err());
        assert!(norm(7.0_f32, &u8_dt).is_ok());
    }

    #[test]
    fn enums_accept_names_and_discriminants() {
        let dt = DatatypeDef::enumeration(
            "test.Mode",
            vec![EnumVariant::new("Fast", 1), EnumVariant::new("Slow", 2)],
        );
        let by_name = norm("slow", &dt).unwrap();
        let by_value = norm(2_u8, &dt).unwrap();
        assert_eq!(by_name, by_value);
        assert!(matches!(
            norm(3_u8, &dt).unwrap_err(),
            ConversionError::InvalidEnumValue { .. }
        ));
    }

    #[test]
    fn structs_match_fields_by_name_or_position() {
        let dt = DatatypeDef::structure(
            "test.AxisAngle",
            vec![
                FieldDef::new(
                    "axis",
                    DatatypeDef::fixed_list("test.Vec3D", ElementKind::Float32, 3),
                ),
                FieldDef::new(
                    "angle",
                    DatatypeDef::primitive("test.Angle", ElementKind::Float32),
                ),
            ],
        );
        let named = norm(
            NativeValue::record([
                ("angle", NativeValue::from(0.5_f32)),
                ("axis", NativeValue::from([0.0_f32, 0.0, 1.0])),
            ]),
            &dt,
        )
        .unwrap();
        let positional = norm(
            NativeValue::Sequence(vec![[0.0_f32, 0.0, 1.0].into(), 0.5_f32.into()]),
            &dt,
        )
        .unwrap();
        assert_eq!(named, positional);

        let missing = norm(NativeValue::record([("axis", [0.0_f32, 0.0, 1.0])]), &dt).unwrap_err();
        assert!(matches!(missing, ConversionError::MissingField { .. }));

        let bad_field = norm(
            NativeValue::record([
                ("axis", NativeValue::from([0.0_f32, 1.0])),
                ("angle", NativeValue::from(0.5_f32)),
            ]),
            &dt,
        )
        .unwrap_err();
        assert!(matches!(bad_field, ConversionError::InField { ref field, .. } if field == "axis"));
    }

    #[test]
    fn null_requires_nullable() {
        let dt = DatatypeDef::primitive("test.Float32", ElementKind::Float32);
        assert!(norm(NativeValue::Null, &dt).is_err());
        assert_eq!(
            norm(NativeValue::Null, &dt.with_nullable(true)).unwrap(),
            Canonical::Null
        );
    }
}
