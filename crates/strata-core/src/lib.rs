// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! strata-core: typed columnar component serialization.
//!
//! Native values for a named component are normalized by the primitive
//! converters, encoded into an Arrow array by the datatype codec, and wrapped
//! into an immutable [`ComponentBatch`] tagged with the descriptor the
//! [`ComponentRegistry`] resolved.
//!
//! ```
//! use strata_core::{BatchBuilder, BatchInput, ComponentDescriptor, ComponentRegistry};
//! use strata_schema::{DatatypeDef, ElementKind};
//!
//! let registry = ComponentRegistry::new();
//! registry
//!     .register(
//!         "rerun.blueprint.components.ForceStrength",
//!         DatatypeDef::primitive("rerun.datatypes.Float32", ElementKind::Float32),
//!     )
//!     .unwrap();
//!
//! let descriptor = ComponentDescriptor::parse("rerun.blueprint.components.ForceStrength").unwrap();
//! let batch = BatchBuilder::new(&registry)
//!     .build_batch(&descriptor, BatchInput::Single(2.5_f32.into()))
//!     .unwrap();
//! assert_eq!(batch.len(), 1);
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
    clippy::cast_possible_truncation,
    clippy::cast_precision_loss,
    clippy::multiple_crate_versions
)]

mod archetype;
mod batch;
mod canonical;
mod codec;
mod component;
mod config;
mod convert;
mod descriptor;
mod error;
mod extension;
mod native;
mod registry;

pub use archetype::{archetype_descriptor, archetype_field, Archetype, ArchetypeBuilder};
pub use batch::{
    BatchBuilder, BatchInput, ComponentBatch, ComponentColumn, FIELD_METADATA_KEY_ARCHETYPE,
    FIELD_METADATA_KEY_ARCHETYPE_FIELD, FIELD_METADATA_KEY_COMPONENT,
};
pub use canonical::{Canonical, Elements};
pub use codec::{arrow_datatype, element_arrow_type, DatatypeCodec};
pub use component::{Component, Loggable};
pub use config::{EngineConfig, NonFinitePolicy};
pub use convert::normalize;
pub use descriptor::{make_component_id, ComponentDescriptor, ComponentId, ComponentName, Hash};
pub use error::{
    BatchError, ConversionError, DecodeError, DuplicateDescriptorError, DuplicateExtensionError,
    EmptyBatchTypeError, PartitionError, RegistryError, ResultExt, UnknownComponentError,
};
pub use extension::{ComponentExtension, ExtensionTable};
pub use native::{NativeValue, NdArray, Scalar, TypedBuffer};
pub use registry::{ComponentHandle, ComponentRegistry};
