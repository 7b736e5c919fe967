// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
use std::str::FromStr;
use std::sync::OnceLock;

use strata_core::{
    Canonical, Component, ComponentExtension, ConversionError, DecodeError, Elements,
    EngineConfig, Loggable, NativeValue, Scalar,
};
use strata_schema::{DatatypeDef, EnumVariant};
use thiserror::Error;
use tracing::trace;

use crate::datatypes::single_u8;

/// **Component**: a colormap for mapping scalar values within a range to colors.
///
/// Stored as a `u8` discriminant; zero is never used.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
#[repr(u8)]
pub enum Colormap {
    /// Linear black to white.
    #[default]
    Grayscale = 1,
    /// Perceptually uniform black-red-yellow.
    Inferno = 2,
    /// Perceptually uniform black-purple-white.
    Magma = 3,
    /// Perceptually uniform blue-purple-yellow.
    Plasma = 4,
    /// Rainbow-like map with smooth transitions.
    Turbo = 5,
    /// Perceptually uniform blue-green-yellow.
    Viridis = 6,
    /// Diverging cyan to yellow.
    CyanToYellow = 7,
}

impl Colormap {
    /// Every variant, in discriminant order.
    pub const ALL: [Self; 7] = [
        Self::Grayscale,
        Self::Inferno,
        Self::Magma,
        Self::Plasma,
        Self::Turbo,
        Self::Viridis,
        Self::CyanToYellow,
    ];

    /// Canonical variant name.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Grayscale => "Grayscale",
            Self::Inferno => "Inferno",
            Self::Magma => "Magma",
            Self::Plasma => "Plasma",
            Self::Turbo => "Turbo",
            Self::Viridis => "Viridis",
            Self::CyanToYellow => "CyanToYellow",
        }
    }

    /// Stored discriminant.
    pub const fn discriminant(self) -> u8 {
        self as u8
    }

    /// Variant with the given discriminant, if any.
    pub fn from_discriminant(value: u8) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.discriminant() == value)
    }
}

impl std::fmt::Display for Colormap {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Text that names no colormap.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown colormap {0:?}")]
pub struct UnknownColormap(pub String);

impl FromStr for Colormap {
    type Err = UnknownColormap;

    /// Matches variant names ignoring case, `_`, `-` and spaces, so
    /// `"cyan_to_yellow"` and `"Cyan To Yellow"` both parse.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let loose = |text: &str| {
            text.chars()
                .filter(|c| !matches!(c, '_' | '-' | ' '))
                .map(|c| c.to_ascii_lowercase())
                .collect::<String>()
        };
        let wanted = loose(s);
        Self::ALL
            .into_iter()
            .find(|c| loose(c.name()) == wanted)
            .ok_or_else(|| UnknownColormap(s.to_owned()))
    }
}

impl Loggable for Colormap {
    fn datatype() -> &'static DatatypeDef {
        static DATATYPE: OnceLock<DatatypeDef> = OnceLock::new();
        DATATYPE.get_or_init(|| {
            DatatypeDef::enumeration(
                "rerun.components.Colormap",
                Self::ALL
                    .iter()
                    .map(|c| EnumVariant::new(c.name(), c.discriminant()))
                    .collect(),
            )
        })
    }

    fn to_native(&self) -> NativeValue {
        self.discriminant().into()
    }

    fn from_canonical(canonical: &Canonical) -> Result<Self, DecodeError> {
        let value = single_u8(canonical)?;
        Self::from_discriminant(value).ok_or_else(|| DecodeError::InvalidEnumValue {
            datatype: Self::datatype().name.clone(),
            value,
        })
    }
}

impl Component for Colormap {
    const NAME: &'static str = "rerun.components.Colormap";
}

/// Accepts loose colormap names (`"cyan_to_yellow"`) in place of the exact
/// variant names the generic enum converter expects.
#[derive(Debug, Clone, Copy, Default)]
pub struct ColormapExt;

impl ComponentExtension for ColormapExt {
    fn normalize(
        &self,
        value: &NativeValue,
        datatype: &DatatypeDef,
        _config: &EngineConfig,
    ) -> Option<Result<Canonical, ConversionError>> {
        let text = match value {
            NativeValue::Scalar(Scalar::Text(text)) => text,
            NativeValue::Sequence(items) => match items.as_slice() {
                [NativeValue::Scalar(Scalar::Text(text))] => text,
                _ => return None,
            },
            _ => return None,
        };
        let result = text
            .parse::<Colormap>()
            .map(|colormap| {
                trace!(input = %text, colormap = %colormap, "loose colormap name");
                Canonical::Elements(Elements::UInt8(vec![colormap.discriminant()]))
            })
            .map_err(|err| ConversionError::InvalidEnumValue {
                datatype: datatype.name.clone(),
                value: format!("{:?}", err.0),
            });
        Some(result)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn parses_loose_names() {
        assert_eq!("cyan_to_yellow".parse::<Colormap>().unwrap(), Colormap::CyanToYellow);
        assert_eq!("Cyan To Yellow".parse::<Colormap>().unwrap(), Colormap::CyanToYellow);
        assert_eq!("VIRIDIS".parse::<Colormap>().unwrap(), Colormap::Viridis);
        assert_eq!(
            "rainbow".parse::<Colormap>(),
            Err(UnknownColormap("rainbow".to_owned()))
        );
    }

    #[test]
    fn discriminants_start_at_one() {
        assert_eq!(Colormap::default().discriminant(), 1);
        assert_eq!(Colormap::from_discriminant(7), Some(Colormap::CyanToYellow));
        assert_eq!(Colormap::from_discriminant(0), None);
    }

    #[test]
    fn generic_converter_accepts_exact_names_and_discriminants() {
        assert_eq!(Colormap::from_native(&"magma".into()).unwrap(), Colormap::Magma);
        assert_eq!(Colormap::from_native(&5_u8.into()).unwrap(), Colormap::Turbo);
        assert!(Colormap::from_native(&"cyan_to_yellow".into()).is_err());
        assert!(Colormap::from_native(&0_u8.into()).is_err());
    }

    #[test]
    fn extension_only_overrides_text() {
        let datatype = Colormap::datatype();
        let config = EngineConfig::default();
        let canonical = ColormapExt
            .normalize(&"cyan-to-yellow".into(), datatype, &config)
            .unwrap()
            .unwrap();
        assert_eq!(Colormap::from_canonical(&canonical).unwrap(), Colormap::CyanToYellow);

        assert!(ColormapExt.normalize(&3_u8.into(), datatype, &config).is_none());
        assert!(matches!(
            ColormapExt.normalize(&"rainbow".into(), datatype, &config),
            Some(Err(ConversionError::InvalidEnumValue { .. }))
        ));
    }
}
