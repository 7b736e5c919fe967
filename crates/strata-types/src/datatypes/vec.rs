// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
use std::sync::OnceLock;

use strata_core::{Canonical, DecodeError, Loggable, NativeValue};
use strata_schema::{DatatypeDef, ElementKind};

use super::fixed_f32;

// Generates a fixed-size f32 vector datatype.
macro_rules! vector_datatype {
    ($doc:literal, $name:ident, $n:literal, $descriptor:literal) => {
        #[doc = $doc]
        #[derive(Debug, Clone, Copy, PartialEq, Default)]
        pub struct $name(pub [f32; $n]);

        impl $name {
            /// All components zero.
            pub const ZERO: Self = Self([0.0; $n]);
        }

        impl Loggable for $name {
            fn datatype() -> &'static DatatypeDef {
                static DATATYPE: OnceLock<DatatypeDef> = OnceLock::new();
                DATATYPE
                    .get_or_init(|| DatatypeDef::fixed_list($descriptor, ElementKind::Float32, $n))
            }

            fn to_native(&self) -> NativeValue {
                self.0.into()
            }

            fn from_canonical(canonical: &Canonical) -> Result<Self, DecodeError> {
                fixed_f32::<$n>(canonical).map(Self)
            }
        }

        impl From<[f32; $n]> for $name {
            fn from(value: [f32; $n]) -> Self {
                Self(value)
            }
        }
    };
}

vector_datatype!("**Datatype**: a vector in 2D space.", Vec2D, 2, "rerun.datatypes.Vec2D");
vector_datatype!("**Datatype**: a vector in 3D space.", Vec3D, 3, "rerun.datatypes.Vec3D");
vector_datatype!("**Datatype**: a vector in 4D space.", Vec4D, 4, "rerun.datatypes.Vec4D");

impl Vec4D {
    /// Creates a vector from its components.
    pub const fn new(x: f32, y: f32, z: f32, w: f32) -> Self {
        Self([x, y, z, w])
    }

    /// First component.
    pub const fn x(&self) -> f32 {
        self.0[0]
    }

    /// Second component.
    pub const fn y(&self) -> f32 {
        self.0[1]
    }

    /// Third component.
    pub const fn z(&self) -> f32 {
        self.0[2]
    }

    /// Fourth component.
    pub const fn w(&self) -> f32 {
        self.0[3]
    }
}

impl Vec3D {
    /// Creates a vector from its components.
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self([x, y, z])
    }
}

impl Vec2D {
    /// Creates a vector from its components.
    pub const fn new(x: f32, y: f32) -> Self {
        Self([x, y])
    }
}
