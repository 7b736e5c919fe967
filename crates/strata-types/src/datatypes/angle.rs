// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
use std::sync::OnceLock;

use strata_core::{Canonical, DecodeError, Loggable, NativeValue};
use strata_schema::{DatatypeDef, ElementKind};

use super::single_f32;

/// **Datatype**: an angle, stored in radians.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default)]
pub struct Angle {
    /// Angle in radians.
    pub radians: f32,
}

impl Angle {
    /// Angle from radians.
    pub const fn from_radians(radians: f32) -> Self {
        Self { radians }
    }

    /// Angle from degrees.
    pub fn from_degrees(degrees: f32) -> Self {
        Self {
            radians: degrees.to_radians(),
        }
    }

    /// Angle in degrees.
    pub fn degrees(&self) -> f32 {
        self.radians.to_degrees()
    }
}

impl Loggable for Angle {
    fn datatype() -> &'static DatatypeDef {
        static DATATYPE: OnceLock<DatatypeDef> = OnceLock::new();
        DATATYPE.get_or_init(|| DatatypeDef::primitive("rerun.datatypes.Angle", ElementKind::Float32))
    }

    fn to_native(&self) -> NativeValue {
        self.radians.into()
    }

    fn from_canonical(canonical: &Canonical) -> Result<Self, DecodeError> {
        single_f32(canonical).map(Self::from_radians)
    }
}
