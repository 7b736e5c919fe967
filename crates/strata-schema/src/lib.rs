// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Schema-level definitions for the Strata columnar engine.
//!
//! Datatypes and components are defined outside the engine, either as Rust
//! statics on generated leaf types or as a JSON [`SchemaDocument`]. Both reach
//! the engine through [`SchemaProvider`]; `strata-core` depends only on this
//! crate and **must not** embed application-specific schemas.

mod datatype;
mod document;

pub use datatype::{
    Arity, DatatypeDef, ElementKind, EnumVariant, FieldDef, InvalidDatatype, Shape,
};
pub use document::{SchemaDocument, SchemaError};

/// Identity of a schema source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaInfo {
    /// Human-readable schema name.
    pub name: String,
    /// Schema version for breaking changes in layout.
    pub version: u32,
}

/// A named, semantically distinct use of a datatype.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ComponentDef {
    /// Fully qualified descriptor (`<namespace>.<category>.<ComponentName>`).
    pub name: String,
    /// Underlying datatype.
    pub datatype: DatatypeDef,
}

impl ComponentDef {
    /// Creates a component definition.
    pub fn new(name: impl Into<String>, datatype: DatatypeDef) -> Self {
        Self {
            name: name.into(),
            datatype,
        }
    }
}

/// Source of component definitions.
///
/// Implemented by generated leaf-type crates and by [`SchemaDocument`]. The
/// engine registers every component a provider declares.
pub trait SchemaProvider {
    /// Identity of this schema source.
    fn info(&self) -> SchemaInfo;

    /// All declared components, in declaration order.
    fn components(&self) -> Vec<ComponentDef>;
}
