// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! JSON schema documents.
//!
//! A document declares datatypes and the components that use them. Struct
//! fields and components refer to datatypes by name; a reference must point at
//! a datatype declared *earlier* in the same document, which keeps resolution
//! single-pass and rules out cycles.
//!
//! ```json
//! {
//!   "name": "blueprint",
//!   "version": 1,
//!   "datatypes": [
//!     { "name": "rerun.datatypes.Float32", "shape": "primitive", "element": "f32" }
//!   ],
//!   "components": [
//!     { "name": "rerun.blueprint.components.ForceStrength",
//!       "datatype": "rerun.datatypes.Float32" }
//!   ]
//! }
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::datatype::{DatatypeDef, ElementKind, EnumVariant, FieldDef, InvalidDatatype, Shape};
use crate::{ComponentDef, SchemaInfo, SchemaProvider};

/// Errors produced while loading or resolving a schema document.
#[derive(Debug, Error)]
pub enum SchemaError {
    /// The document could not be read.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    /// The document is not valid JSON for the schema format.
    #[error("schema parse error: {0}")]
    Parse(#[from] serde_json::Error),
    /// A reference names a datatype that was not declared before it.
    #[error("unknown datatype {name} referenced by {referenced_by}")]
    UnknownDatatype {
        /// Name that failed to resolve.
        name: String,
        /// Declaration holding the reference.
        referenced_by: String,
    },
    /// Two datatypes share a name.
    #[error("datatype {0} declared more than once")]
    DuplicateDatatype(String),
    /// A declared datatype is internally inconsistent.
    #[error(transparent)]
    Invalid(#[from] InvalidDatatype),
}

/// Shape declaration as written in a document; struct fields are references.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "shape", rename_all = "snake_case")]
enum ShapeDecl {
    Primitive { element: ElementKind },
    FixedList { element: ElementKind, arity: u32 },
    List { element: ElementKind },
    Enum { variants: Vec<EnumVariant> },
    Struct { fields: Vec<FieldDecl> },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct FieldDecl {
    name: String,
    datatype: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct DatatypeDecl {
    name: String,
    #[serde(flatten)]
    shape: ShapeDecl,
    #[serde(default)]
    nullable: bool,
    #[serde(default)]
    broadcast_scalar: bool,
    #[serde(default)]
    non_empty: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct ComponentDecl {
    name: String,
    datatype: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct RawDocument {
    name: String,
    #[serde(default = "default_version")]
    version: u32,
    #[serde(default)]
    datatypes: Vec<DatatypeDecl>,
    #[serde(default)]
    components: Vec<ComponentDecl>,
}

const fn default_version() -> u32 {
    1
}

/// A parsed and fully resolved schema document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaDocument {
    info: SchemaInfo,
    datatypes: BTreeMap<String, DatatypeDef>,
    components: Vec<ComponentDef>,
}

impl SchemaDocument {
    /// Parses and resolves a document from JSON text.
    pub fn from_json(text: &str) -> Result<Self, SchemaError> {
        let raw: RawDocument = serde_json::from_str(text)?;
        Self::resolve(raw)
    }

    /// Reads and resolves a document from a JSON file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, SchemaError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    fn resolve(raw: RawDocument) -> Result<Self, SchemaError> {
        let mut datatypes: BTreeMap<String, DatatypeDef> = BTreeMap::new();
        for decl in raw.datatypes {
            if datatypes.contains_key(&decl.name) {
                return Err(SchemaError::DuplicateDatatype(decl.name));
            }
            let shape = match decl.shape {
                ShapeDecl::Primitive { element } => Shape::Primitive { element },
                ShapeDecl::FixedList { element, arity } => Shape::FixedList { element, arity },
                ShapeDecl::List { element } => Shape::List { element },
                ShapeDecl::Enum { variants } => Shape::Enum { variants },
                ShapeDecl::Struct { fields } => {
                    let mut resolved = Vec::with_capacity(fields.len());
                    for field in fields {
                        let datatype = lookup(&datatypes, &field.datatype, &decl.name)?;
                        resolved.push(FieldDef::new(field.name, datatype.clone()));
                    }
                    Shape::Struct { fields: resolved }
                }
            };
            let def = DatatypeDef {
                name: decl.name.clone(),
                shape,
                nullable: decl.nullable,
                broadcast_scalar: decl.broadcast_scalar,
                non_empty: decl.non_empty,
            };
            def.validate()?;
            datatypes.insert(decl.name, def);
        }

        let mut components = Vec::with_capacity(raw.components.len());
        for decl in raw.components {
            let datatype = lookup(&datatypes, &decl.datatype, &decl.name)?;
            components.push(ComponentDef::new(decl.name, datatype.clone()));
        }

        Ok(Self {
            info: SchemaInfo {
                name: raw.name,
                version: raw.version,
            },
            datatypes,
            components,
        })
    }

    /// Looks up a declared datatype by name.
    pub fn datatype(&self, name: &str) -> Option<&DatatypeDef> {
        self.datatypes.get(name)
    }

    /// Declared datatypes, sorted by name.
    pub fn datatypes(&self) -> impl Iterator<Item = &DatatypeDef> {
        self.datatypes.values()
    }
}

fn lookup<'a>(
    datatypes: &'a BTreeMap<String, DatatypeDef>,
    name: &str,
    referenced_by: &str,
) -> Result<&'a DatatypeDef, SchemaError> {
    datatypes
        .get(name)
        .ok_or_else(|| SchemaError::UnknownDatatype {
            name: name.to_owned(),
            referenced_by: referenced_by.to_owned(),
        })
}

impl SchemaProvider for SchemaDocument {
    fn info(&self) -> SchemaInfo {
        self.info.clone()
    }

    fn components(&self) -> Vec<ComponentDef> {
        self.components.clone()
    }
}
