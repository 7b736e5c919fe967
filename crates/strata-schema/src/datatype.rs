// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Datatype definitions: element kinds, shapes and per-datatype flags.

use serde::{Deserialize, Serialize};

/// Numeric kind of the dense elements backing a datatype.
///
/// All floating data uses the single 32-bit representation; wider inputs are
/// narrowed by the converters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ElementKind {
    /// IEEE-754 single precision float.
    #[serde(rename = "f32")]
    Float32,
    /// Unsigned 8-bit integer.
    #[serde(rename = "u8")]
    UInt8,
    /// Unsigned 32-bit integer.
    #[serde(rename = "u32")]
    UInt32,
    /// Boolean.
    #[serde(rename = "bool")]
    Bool,
}

impl ElementKind {
    /// Short lowercase label used in error messages and schema documents.
    pub const fn label(self) -> &'static str {
        match self {
            Self::Float32 => "f32",
            Self::UInt8 => "u8",
            Self::UInt32 => "u32",
            Self::Bool => "bool",
        }
    }
}

impl std::fmt::Display for ElementKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Number of elements one instance of a datatype carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Arity {
    /// Exactly this many elements per instance.
    Fixed(usize),
    /// Any number of elements per instance (variable-length list).
    Variable,
}

impl Arity {
    /// Returns `true` if `count` elements satisfy this arity.
    pub const fn accepts(self, count: usize) -> bool {
        match self {
            Self::Fixed(n) => n == count,
            Self::Variable => true,
        }
    }
}

impl std::fmt::Display for Arity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Fixed(n) => write!(f, "{n}"),
            Self::Variable => f.write_str("variable"),
        }
    }
}

/// One named discriminant of an enum datatype.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EnumVariant {
    /// Variant name (matched case-insensitively when converting text input).
    pub name: String,
    /// Stored discriminant. Zero is reserved by convention but not forbidden.
    pub value: u8,
}

impl EnumVariant {
    /// Creates a variant.
    pub fn new(name: impl Into<String>, value: u8) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }
}

/// One named field of a struct datatype.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FieldDef {
    /// Field name, unique within its struct.
    pub name: String,
    /// Datatype of the field.
    pub datatype: DatatypeDef,
}

impl FieldDef {
    /// Creates a field.
    pub fn new(name: impl Into<String>, datatype: DatatypeDef) -> Self {
        Self {
            name: name.into(),
            datatype,
        }
    }
}

/// Value shape of a datatype.
///
/// Serialized with an internal `"shape"` tag so schema documents read as
/// `{"shape": "fixed_list", "element": "f32", "arity": 4}`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "shape", rename_all = "snake_case")]
pub enum Shape {
    /// A single element per instance.
    Primitive {
        /// Element kind.
        element: ElementKind,
    },
    /// Exactly `arity` packed elements per instance.
    FixedList {
        /// Element kind.
        element: ElementKind,
        /// Elements per instance; must be non-zero.
        arity: u32,
    },
    /// A variable number of elements per instance.
    List {
        /// Element kind.
        element: ElementKind,
    },
    /// A `u8` discriminant restricted to the declared variants.
    Enum {
        /// Declared variants, in declaration order.
        variants: Vec<EnumVariant>,
    },
    /// A record of named fields.
    Struct {
        /// Fields, in declaration order.
        fields: Vec<FieldDef>,
    },
}

/// Schema-level description of a value shape.
///
/// Immutable once defined and compared structurally: two definitions are the
/// same datatype exactly when every attribute matches.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DatatypeDef {
    /// Fully qualified datatype name (e.g. `rerun.datatypes.Vec4D`).
    pub name: String,
    /// Value shape.
    #[serde(flatten)]
    pub shape: Shape,
    /// Whether whole instances may be absent.
    #[serde(default)]
    pub nullable: bool,
    /// Whether a lone scalar may be repeated to fill a fixed arity.
    #[serde(default)]
    pub broadcast_scalar: bool,
    /// Whether batches of this datatype must contain at least one instance.
    #[serde(default)]
    pub non_empty: bool,
}

impl DatatypeDef {
    /// Creates a datatype with all flags off.
    pub fn new(name: impl Into<String>, shape: Shape) -> Self {
        Self {
            name: name.into(),
            shape,
            nullable: false,
            broadcast_scalar: false,
            non_empty: false,
        }
    }

    /// Scalar datatype with one element per instance.
    pub fn primitive(name: impl Into<String>, element: ElementKind) -> Self {
        Self::new(name, Shape::Primitive { element })
    }

    /// Fixed-size vector datatype.
    pub fn fixed_list(name: impl Into<String>, element: ElementKind, arity: u32) -> Self {
        Self::new(name, Shape::FixedList { element, arity })
    }

    /// Variable-length list datatype.
    pub fn list(name: impl Into<String>, element: ElementKind) -> Self {
        Self::new(name, Shape::List { element })
    }

    /// Enum datatype stored as a `u8` discriminant.
    pub fn enumeration(name: impl Into<String>, variants: Vec<EnumVariant>) -> Self {
        Self::new(name, Shape::Enum { variants })
    }

    /// Struct datatype.
    pub fn structure(name: impl Into<String>, fields: Vec<FieldDef>) -> Self {
        Self::new(name, Shape::Struct { fields })
    }

    /// Sets [`DatatypeDef::nullable`].
    pub fn with_nullable(mut self, nullable: bool) -> Self {
        self.nullable = nullable;
        self
    }

    /// Sets [`DatatypeDef::broadcast_scalar`].
    pub fn with_broadcast_scalar(mut self, broadcast: bool) -> Self {
        self.broadcast_scalar = broadcast;
        self
    }

    /// Sets [`DatatypeDef::non_empty`].
    pub fn with_non_empty(mut self, non_empty: bool) -> Self {
        self.non_empty = non_empty;
        self
    }

    /// Element kind of the dense data, if the shape has a single one.
    ///
    /// Enums report [`ElementKind::UInt8`]; structs report `None`.
    pub fn element(&self) -> Option<ElementKind> {
        match &self.shape {
            Shape::Primitive { element }
            | Shape::FixedList { element, .. }
            | Shape::List { element } => Some(*element),
            Shape::Enum { .. } => Some(ElementKind::UInt8),
            Shape::Struct { .. } => None,
        }
    }

    /// Elements per instance. Structs have per-field arities and report `None`.
    pub fn arity(&self) -> Option<Arity> {
        match &self.shape {
            Shape::Primitive { .. } | Shape::Enum { .. } => Some(Arity::Fixed(1)),
            Shape::FixedList { arity, .. } => Some(Arity::Fixed(*arity as usize)),
            Shape::List { .. } => Some(Arity::Variable),
            Shape::Struct { .. } => None,
        }
    }

    /// Checks internal consistency: non-zero fixed arity, unique variant
    /// names and values, unique non-empty field names (recursively).
    pub fn validate(&self) -> Result<(), InvalidDatatype> {
        let invalid = |reason: String| InvalidDatatype {
            datatype: self.name.clone(),
            reason,
        };
        if self.name.trim().is_empty() {
            return Err(invalid("datatype name is empty".into()));
        }
        match &self.shape {
            Shape::Primitive { .. } | Shape::List { .. } => Ok(()),
            Shape::FixedList { arity, .. } => {
                if *arity == 0 {
                    return Err(invalid("fixed arity must be non-zero".into()));
                }
                Ok(())
            }
            Shape::Enum { variants } => {
                if variants.is_empty() {
                    return Err(invalid("enum declares no variants".into()));
                }
                for (i, a) in variants.iter().enumerate() {
                    for b in &variants[i + 1..] {
                        if a.value == b.value {
                            return Err(invalid(format!(
                                "variants {} and {} share discriminant {}",
                                a.name, b.name, a.value
                            )));
                        }
                        if a.name.eq_ignore_ascii_case(&b.name) {
                            return Err(invalid(format!("duplicate variant name {}", a.name)));
                        }
                    }
                }
                Ok(())
            }
            Shape::Struct { fields } => {
                if fields.is_empty() {
                    return Err(invalid("struct declares no fields".into()));
                }
                for (i, a) in fields.iter().enumerate() {
                    if a.name.is_empty() {
                        return Err(invalid(format!("field {i} has an empty name")));
                    }
                    if fields[i + 1..].iter().any(|b| b.name == a.name) {
                        return Err(invalid(format!("duplicate field name {}", a.name)));
                    }
                    a.datatype.validate()?;
                }
                Ok(())
            }
        }
    }
}

/// A datatype definition failed [`DatatypeDef::validate`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid datatype {datatype}: {reason}")]
pub struct InvalidDatatype {
    /// Name of the offending datatype.
    pub datatype: String,
    /// Human-readable reason.
    pub reason: String,
}
