// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Canonical in-memory representation of one instance.

use strata_schema::ElementKind;

/// Dense, typed element vector for one instance.
#[derive(Debug, Clone, PartialEq)]
pub enum Elements {
    /// 32-bit floats.
    Float32(Vec<f32>),
    /// Unsigned bytes (also enum discriminants).
    UInt8(Vec<u8>),
    /// Unsigned 32-bit integers.
    UInt32(Vec<u32>),
    /// Booleans.
    Bool(Vec<bool>),
}

impl Elements {
    /// Empty vector of the given kind with room for `capacity` elements.
    pub fn with_capacity(kind: ElementKind, capacity: usize) -> Self {
        match kind {
            ElementKind::Float32 => Self::Float32(Vec::with_capacity(capacity)),
            ElementKind::UInt8 => Self::UInt8(Vec::with_capacity(capacity)),
            ElementKind::UInt32 => Self::UInt32(Vec::with_capacity(capacity)),
            ElementKind::Bool => Self::Bool(Vec::with_capacity(capacity)),
        }
    }

    /// Element kind.
    pub const fn kind(&self) -> ElementKind {
        match self {
            Self::Float32(_) => ElementKind::Float32,
            Self::UInt8(_) => ElementKind::UInt8,
            Self::UInt32(_) => ElementKind::UInt32,
            Self::Bool(_) => ElementKind::Bool,
        }
    }

    /// Number of elements.
    pub fn len(&self) -> usize {
        match self {
            Self::Float32(v) => v.len(),
            Self::UInt8(v) => v.len(),
            Self::UInt32(v) => v.len(),
            Self::Bool(v) => v.len(),
        }
    }

    /// Returns `true` if there are no elements.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Float view, if this is a float vector.
    pub fn as_f32(&self) -> Option<&[f32]> {
        match self {
            Self::Float32(v) => Some(v),
            _ => None,
        }
    }

    /// Byte view, if this is a `u8` vector.
    pub fn as_u8(&self) -> Option<&[u8]> {
        match self {
            Self::UInt8(v) => Some(v),
            _ => None,
        }
    }

    /// `u32` view, if this is a `u32` vector.
    pub fn as_u32(&self) -> Option<&[u32]> {
        match self {
            Self::UInt32(v) => Some(v),
            _ => None,
        }
    }

    /// Bool view, if this is a bool vector.
    pub fn as_bool(&self) -> Option<&[bool]> {
        match self {
            Self::Bool(v) => Some(v),
            _ => None,
        }
    }
}

/// Normalized form of one instance of a datatype.
///
/// Primitive, list and enum datatypes normalize to [`Canonical::Elements`];
/// structs normalize to one canonical value per declared field, in order.
#[derive(Debug, Clone, PartialEq)]
pub enum Canonical {
    /// Absent instance (nullable datatypes only).
    Null,
    /// Dense elements.
    Elements(Elements),
    /// Per-field values of a struct.
    Struct(Vec<Canonical>),
}

impl Canonical {
    /// Returns `true` for [`Canonical::Null`].
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Element vector, if any.
    pub const fn elements(&self) -> Option<&Elements> {
        match self {
            Self::Elements(e) => Some(e),
            _ => None,
        }
    }

    /// Float elements, if this is a float instance.
    pub fn as_f32(&self) -> Option<&[f32]> {
        self.elements().and_then(Elements::as_f32)
    }

    /// Struct fields, if this is a struct instance.
    pub fn fields(&self) -> Option<&[Canonical]> {
        match self {
            Self::Struct(fields) => Some(fields),
            _ => None,
        }
    }

    /// Element count of a non-struct instance; `None` for nulls and structs.
    pub fn element_count(&self) -> Option<usize> {
        self.elements().map(Elements::len)
    }
}

impl From<Vec<f32>> for Canonical {
    fn from(values: Vec<f32>) -> Self {
        Self::Elements(Elements::Float32(values))
    }
}

impl From<Elements> for Canonical {
    fn from(elements: Elements) -> Self {
        Self::Elements(elements)
    }
}
