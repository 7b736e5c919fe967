// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
use std::sync::OnceLock;

use strata_core::{Canonical, DecodeError, Loggable, NativeValue};
use strata_schema::{DatatypeDef, ElementKind};

use super::{single_bool, single_f32, single_u32};

// Generates a one-element datatype wrapping a Rust scalar.
macro_rules! scalar_datatype {
    ($doc:literal, $name:ident, $inner:ty, $descriptor:literal, $kind:expr, $decode:ident) => {
        #[doc = $doc]
        #[allow(clippy::derive_partial_eq_without_eq)]
        #[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default)]
        pub struct $name(pub $inner);

        impl Loggable for $name {
            fn datatype() -> &'static DatatypeDef {
                static DATATYPE: OnceLock<DatatypeDef> = OnceLock::new();
                DATATYPE.get_or_init(|| DatatypeDef::primitive($descriptor, $kind))
            }

            fn to_native(&self) -> NativeValue {
                self.0.into()
            }

            fn from_canonical(canonical: &Canonical) -> Result<Self, DecodeError> {
                $decode(canonical).map(Self)
            }
        }

        impl From<$inner> for $name {
            fn from(value: $inner) -> Self {
                Self(value)
            }
        }

        impl From<$name> for $inner {
            fn from(value: $name) -> Self {
                value.0
            }
        }
    };
}

scalar_datatype!(
    "**Datatype**: a single-precision float.",
    Float32,
    f32,
    "rerun.datatypes.Float32",
    ElementKind::Float32,
    single_f32
);

scalar_datatype!(
    "**Datatype**: a boolean flag.",
    Bool,
    bool,
    "rerun.datatypes.Bool",
    ElementKind::Bool,
    single_bool
);

scalar_datatype!(
    "**Datatype**: an unsigned 32-bit integer.",
    UInt32,
    u32,
    "rerun.datatypes.UInt32",
    ElementKind::UInt32,
    single_u32
);
