// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Built-in components.
//!
//! Most components are newtypes over a datatype and delegate their
//! conversions to it; [`Colormap`] is a standalone enum.

mod colormap;

pub use colormap::{Colormap, ColormapExt, UnknownColormap};

use strata_core::{Canonical, Component, DecodeError, Loggable, NativeValue};
use strata_schema::DatatypeDef;

use crate::datatypes::{Bool, Float32, UInt32, Vec3D};

// Newtype component delegating its datatype and conversions to `$inner`.
macro_rules! delegate_component {
    ($doc:literal, $name:ident, $inner:ty, $raw:ty, $descriptor:literal) => {
        #[doc = $doc]
        #[allow(clippy::derive_partial_eq_without_eq)]
        #[derive(Debug, Clone, Copy, PartialEq, Default)]
        pub struct $name(pub $inner);

        impl Loggable for $name {
            fn datatype() -> &'static DatatypeDef {
                <$inner as Loggable>::datatype()
            }

            fn to_native(&self) -> NativeValue {
                self.0.to_native()
            }

            fn from_canonical(canonical: &Canonical) -> Result<Self, DecodeError> {
                <$inner>::from_canonical(canonical).map(Self)
            }
        }

        impl Component for $name {
            const NAME: &'static str = $descriptor;
        }

        impl From<$inner> for $name {
            fn from(value: $inner) -> Self {
                Self(value)
            }
        }

        impl From<$raw> for $name {
            fn from(value: $raw) -> Self {
                Self(value.into())
            }
        }
    };
}

delegate_component!(
    "**Component**: the strength of a force. Negative values repel.",
    ForceStrength,
    Float32,
    f32,
    "rerun.blueprint.components.ForceStrength"
);

delegate_component!(
    "**Component**: how many simulation iterations a force runs per tick.",
    ForceIterations,
    UInt32,
    u32,
    "rerun.blueprint.components.ForceIterations"
);

delegate_component!(
    "**Component**: whether a feature is switched on.",
    Enabled,
    Bool,
    bool,
    "rerun.blueprint.components.Enabled"
);

delegate_component!(
    "**Component**: a length, for instance of an arrow or a box edge.",
    Length,
    Float32,
    f32,
    "rerun.components.Length"
);

delegate_component!(
    "**Component**: distance to the near clip plane of a 3D view, in scene units.",
    NearClipPlane,
    Float32,
    f32,
    "rerun.blueprint.components.NearClipPlane"
);

delegate_component!(
    "**Component**: a translation vector in 3D space.",
    Translation3D,
    Vec3D,
    [f32; 3],
    "rerun.components.Translation3D"
);

impl ForceStrength {
    /// Strength as a plain float.
    pub const fn value(&self) -> f32 {
        self.0 .0
    }
}

impl Enabled {
    /// Whether the flag is set.
    pub const fn is_enabled(&self) -> bool {
        self.0 .0
    }
}
