// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! strata-types: built-in datatypes, components and archetypes.
//!
//! Every leaf type implements [`strata_core::Loggable`]; components add
//! [`strata_core::Component`] and archetypes implement
//! [`strata_core::Archetype`]. Call [`register_all`] once per registry before
//! building batches.
//!
//! ```
//! use strata_core::{Archetype, BatchBuilder, ComponentRegistry};
//! use strata_types::archetypes::ForceManyBody;
//!
//! let registry = ComponentRegistry::new();
//! strata_types::register_all(&registry).unwrap();
//! let extensions = strata_types::extensions().unwrap();
//! let builder = BatchBuilder::new(&registry).with_extensions(&extensions);
//!
//! let batches = ForceManyBody::new().with_strength(-30.0_f32).as_batches(&builder).unwrap();
//! assert_eq!(batches.len(), 1);
//! ```
#![forbid(unsafe_code)]
#![deny(missing_docs, rust_2018_idioms, unused_must_use)]
#![deny(
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    clippy::cargo,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::todo,
    clippy::unimplemented,
    clippy::dbg_macro,
    clippy::print_stdout,
    clippy::print_stderr
)]
#![allow(
    clippy::must_use_candidate,
    clippy::return_self_not_must_use,
    clippy::missing_const_for_fn,
    clippy::redundant_pub_crate,
    clippy::module_name_repetitions,
    clippy::use_self,
    clippy::multiple_crate_versions
)]

pub mod archetypes;
pub mod components;
pub mod datatypes;

use strata_core::{
    Component, ComponentHandle, ComponentRegistry, DuplicateExtensionError, ExtensionTable,
    RegistryError,
};
use strata_schema::{ComponentDef, SchemaInfo, SchemaProvider};
use tracing::debug;

use crate::components::{
    Colormap, ColormapExt, Enabled, ForceIterations, ForceStrength, Length, NearClipPlane,
    Translation3D,
};

/// Schema version of the built-in definitions.
pub const SCHEMA_VERSION: u32 = 1;

/// Provider for every built-in component.
#[derive(Debug, Clone, Copy, Default)]
pub struct BuiltinTypes;

fn def<C: Component>() -> ComponentDef {
    ComponentDef::new(C::NAME, C::datatype().clone())
}

impl SchemaProvider for BuiltinTypes {
    fn info(&self) -> SchemaInfo {
        SchemaInfo {
            name: "strata-types".to_owned(),
            version: SCHEMA_VERSION,
        }
    }

    fn components(&self) -> Vec<ComponentDef> {
        vec![
            def::<ForceStrength>(),
            def::<ForceIterations>(),
            def::<Enabled>(),
            def::<Length>(),
            def::<NearClipPlane>(),
            def::<Translation3D>(),
            def::<Colormap>(),
        ]
    }
}

/// Registers every built-in component with `registry`. Idempotent.
///
/// # Errors
/// Fails if `registry` already maps one of the names to a different datatype.
pub fn register_all(registry: &ComponentRegistry) -> Result<Vec<ComponentHandle>, RegistryError> {
    registry.register_provider(&BuiltinTypes)
}

/// Extension table holding the hand-written overrides of the built-ins.
///
/// # Errors
/// Never fails for the built-in set; the error is the table's own.
pub fn extensions() -> Result<ExtensionTable, DuplicateExtensionError> {
    let mut table = ExtensionTable::new();
    table.register(Colormap::NAME, ColormapExt)?;
    debug!(count = table.len(), "built-in extensions ready");
    Ok(table)
}
