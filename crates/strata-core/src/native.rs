// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Caller-supplied native values.
//!
//! Input shapes are modelled as a tagged variant ([`NativeValue`]) rather than
//! inspected at runtime. [`crate::normalize`] converts every
//! variant into a [`crate::Canonical`] value for one datatype.

use std::ops::Range;

use crate::error::ConversionError;
use strata_schema::Arity;

/// A single native scalar.
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    /// 32-bit float.
    F32(f32),
    /// 64-bit float; narrowed when the target is `f32`.
    F64(f64),
    /// Signed integer.
    I64(i64),
    /// Unsigned integer.
    U64(u64),
    /// Boolean.
    Bool(bool),
    /// Text; only enum datatypes accept it (as a variant name).
    Text(String),
}

impl Scalar {
    /// Short label for error messages.
    pub const fn kind_label(&self) -> &'static str {
        match self {
            Self::F32(_) => "f32",
            Self::F64(_) => "f64",
            Self::I64(_) => "i64",
            Self::U64(_) => "u64",
            Self::Bool(_) => "bool",
            Self::Text(_) => "text",
        }
    }
}

/// Dense typed storage behind an [`NdArray`].
#[derive(Debug, Clone, PartialEq)]
pub enum TypedBuffer {
    /// 32-bit floats.
    Float32(Vec<f32>),
    /// 64-bit floats.
    Float64(Vec<f64>),
    /// Signed 64-bit integers.
    Int64(Vec<i64>),
    /// Unsigned bytes.
    UInt8(Vec<u8>),
    /// Unsigned 32-bit integers.
    UInt32(Vec<u32>),
    /// Booleans.
    Bool(Vec<bool>),
}

impl TypedBuffer {
    /// Number of elements.
    pub fn len(&self) -> usize {
        match self {
            Self::Float32(v) => v.len(),
            Self::Float64(v) => v.len(),
            Self::Int64(v) => v.len(),
            Self::UInt8(v) => v.len(),
            Self::UInt32(v) => v.len(),
            Self::Bool(v) => v.len(),
        }
    }

    /// Returns `true` if the buffer holds no elements.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Element at `index` as a scalar, if in bounds.
    pub fn get(&self, index: usize) -> Option<Scalar> {
        match self {
            Self::Float32(v) => v.get(index).copied().map(Scalar::F32),
            Self::Float64(v) => v.get(index).copied().map(Scalar::F64),
            Self::Int64(v) => v.get(index).copied().map(Scalar::I64),
            Self::UInt8(v) => v.get(index).map(|x| Scalar::U64(u64::from(*x))),
            Self::UInt32(v) => v.get(index).map(|x| Scalar::U64(u64::from(*x))),
            Self::Bool(v) => v.get(index).copied().map(Scalar::Bool),
        }
    }

    /// Iterates the elements as scalars.
    pub fn iter(&self) -> impl Iterator<Item = Scalar> + '_ {
        (0..self.len()).filter_map(|i| self.get(i))
    }

    fn slice(&self, range: Range<usize>) -> Self {
        match self {
            Self::Float32(v) => Self::Float32(v[range].to_vec()),
            Self::Float64(v) => Self::Float64(v[range].to_vec()),
            Self::Int64(v) => Self::Int64(v[range].to_vec()),
            Self::UInt8(v) => Self::UInt8(v[range].to_vec()),
            Self::UInt32(v) => Self::UInt32(v[range].to_vec()),
            Self::Bool(v) => Self::Bool(v[range].to_vec()),
        }
    }
}

/// A typed, row-major, n-dimensional array.
///
/// Invariant: the product of `shape` equals the buffer length.
#[derive(Debug, Clone, PartialEq)]
pub struct NdArray {
    buffer: TypedBuffer,
    shape: Vec<usize>,
}

impl NdArray {
    /// Creates an array with an explicit shape.
    pub fn new(buffer: TypedBuffer, shape: Vec<usize>) -> Result<Self, ConversionError> {
        let expected = shape
            .iter()
            .try_fold(1_usize, |acc, dim| acc.checked_mul(*dim))
            .ok_or_else(|| ConversionError::ShapeOverflow {
                shape: shape.clone(),
            })?;
        if expected != buffer.len() {
            return Err(ConversionError::ArityMismatch {
                expected: Arity::Fixed(expected),
                found: buffer.len(),
            });
        }
        Ok(Self { buffer, shape })
    }

    /// Creates a one-dimensional array.
    pub fn from_buffer(buffer: TypedBuffer) -> Self {
        let shape = vec![buffer.len()];
        Self { buffer, shape }
    }

    /// Dimensions, outermost first.
    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    /// Underlying dense storage.
    pub fn buffer(&self) -> &TypedBuffer {
        &self.buffer
    }

    /// Total element count.
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    /// Returns `true` if the array holds no elements.
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Splits along the outermost dimension.
    ///
    /// A one-dimensional array splits into zero-dimensional (single element)
    /// arrays.
    pub fn outer_split(&self) -> Vec<Self> {
        let Some((&outer, inner)) = self.shape.split_first() else {
            return vec![self.clone()];
        };
        let stride: usize = inner.iter().product();
        (0..outer)
            .map(|i| Self {
                buffer: self.buffer.slice(i * stride..(i + 1) * stride),
                shape: inner.to_vec(),
            })
            .collect()
    }
}

/// Caller-supplied native value, prior to conversion.
#[derive(Debug, Clone, PartialEq)]
pub enum NativeValue {
    /// Absent value.
    Null,
    /// A single scalar.
    Scalar(Scalar),
    /// A (possibly nested) sequence.
    Sequence(Vec<NativeValue>),
    /// A typed n-dimensional array.
    Array(NdArray),
    /// Named fields, for struct datatypes.
    Record(Vec<(String, NativeValue)>),
}

impl NativeValue {
    /// Builds a record from `(name, value)` pairs.
    pub fn record<K, V>(fields: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<NativeValue>,
    {
        Self::Record(
            fields
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    /// Short label for error messages.
    pub const fn kind_label(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Scalar(s) => s.kind_label(),
            Self::Sequence(_) => "sequence",
            Self::Array(_) => "array",
            Self::Record(_) => "record",
        }
    }

    /// Nesting depth: scalars are 0, flat sequences 1, and so on.
    ///
    /// Sequences report one more than their first element; regularity is
    /// checked separately by the converters.
    pub fn depth(&self) -> usize {
        match self {
            Self::Null | Self::Scalar(_) | Self::Record(_) => 0,
            Self::Sequence(items) => 1 + items.first().map_or(0, Self::depth),
            Self::Array(array) => array.shape().len(),
        }
    }
}

impl From<Scalar> for NativeValue {
    fn from(value: Scalar) -> Self {
        Self::Scalar(value)
    }
}

impl From<f32> for NativeValue {
    fn from(value: f32) -> Self {
        Self::Scalar(Scalar::F32(value))
    }
}

impl From<f64> for NativeValue {
    fn from(value: f64) -> Self {
        Self::Scalar(Scalar::F64(value))
    }
}

impl From<i32> for NativeValue {
    fn from(value: i32) -> Self {
        Self::Scalar(Scalar::I64(i64::from(value)))
    }
}

impl From<i64> for NativeValue {
    fn from(value: i64) -> Self {
        Self::Scalar(Scalar::I64(value))
    }
}

impl From<u8> for NativeValue {
    fn from(value: u8) -> Self {
        Self::Scalar(Scalar::U64(u64::from(value)))
    }
}

impl From<u32> for NativeValue {
    fn from(value: u32) -> Self {
        Self::Scalar(Scalar::U64(u64::from(value)))
    }
}

impl From<u64> for NativeValue {
    fn from(value: u64) -> Self {
        Self::Scalar(Scalar::U64(value))
    }
}

impl From<bool> for NativeValue {
    fn from(value: bool) -> Self {
        Self::Scalar(Scalar::Bool(value))
    }
}

impl From<&str> for NativeValue {
    fn from(value: &str) -> Self {
        Self::Scalar(Scalar::Text(value.to_owned()))
    }
}

impl From<String> for NativeValue {
    fn from(value: String) -> Self {
        Self::Scalar(Scalar::Text(value))
    }
}

impl From<NdArray> for NativeValue {
    fn from(value: NdArray) -> Self {
        Self::Array(value)
    }
}

impl<T: Into<NativeValue>> From<Option<T>> for NativeValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}

impl<T: Into<NativeValue>> From<Vec<T>> for NativeValue {
    fn from(value: Vec<T>) -> Self {
        Self::Sequence(value.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<NativeValue>, const N: usize> From<[T; N]> for NativeValue {
    fn from(value: [T; N]) -> Self {
        Self::Sequence(value.into_iter().map(Into::into).collect())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn ndarray_rejects_inconsistent_shape() {
        let buffer = TypedBuffer::Float32(vec![1.0, 2.0, 3.0]);
        assert!(NdArray::new(buffer, vec![2, 2]).is_err());
    }

    #[test]
    fn ndarray_rejects_overflowing_shape() {
        let err = NdArray::new(TypedBuffer::Float32(vec![]), vec![usize::MAX, 2]).unwrap_err();
        assert_eq!(
            err,
            ConversionError::ShapeOverflow {
                shape: vec![usize::MAX, 2]
            }
        );
        let wraps_to_zero = 1_usize << (usize::BITS - 1);
        assert!(NdArray::new(TypedBuffer::Float32(vec![]), vec![wraps_to_zero, 2]).is_err());
    }

    #[test]
    fn outer_split_yields_rows() {
        let buffer = TypedBuffer::Float32(vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
        let array = NdArray::new(buffer, vec![2, 3]).unwrap();
        let rows = array.outer_split();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1].shape(), &[3]);
        assert_eq!(rows[1].buffer(), &TypedBuffer::Float32(vec![4.0, 5.0, 6.0]));
    }

    #[test]
    fn depth_counts_nesting() {
        assert_eq!(NativeValue::from(1.0_f32).depth(), 0);
        assert_eq!(NativeValue::from([1.0_f32, 2.0]).depth(), 1);
        assert_eq!(NativeValue::from(vec![[1.0_f32, 2.0]]).depth(), 2);
        assert_eq!(NativeValue::from(Option::<f32>::None), NativeValue::Null);
    }
}
