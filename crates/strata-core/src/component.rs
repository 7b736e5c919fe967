// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! The uniform capability set every generated leaf type provides.
//!
//! Leaf types implement the required methods; serialization, batching and
//! registration come from the provided ones. A component never holds another
//! component or its batch type; it reaches its datatype through
//! [`Loggable::datatype`] and its peers through the registry.

use arrow_array::{Array, ArrayRef};
use strata_schema::DatatypeDef;

use crate::batch::{BatchBuilder, BatchInput, ComponentBatch};
use crate::canonical::Canonical;
use crate::codec::DatatypeCodec;
use crate::config::EngineConfig;
use crate::convert::normalize;
use crate::descriptor::ComponentDescriptor;
use crate::error::{BatchError, ConversionError, DecodeError, RegistryError};
use crate::native::NativeValue;
use crate::registry::{ComponentHandle, ComponentRegistry};

/// A type with a fixed datatype that converts to and from canonical values.
pub trait Loggable: Sized {
    /// Datatype every instance conforms to.
    fn datatype() -> &'static DatatypeDef;

    /// Native representation of `self`.
    fn to_native(&self) -> NativeValue;

    /// Rebuilds a value from its canonical form.
    fn from_canonical(canonical: &Canonical) -> Result<Self, DecodeError>;

    /// Builds a value from any native input the datatype accepts.
    fn from_native(value: &NativeValue) -> Result<Self, ConversionError> {
        let datatype = Self::datatype();
        let canonical = normalize(value, datatype, &EngineConfig::default())?;
        Self::from_canonical(&canonical).map_err(|source| ConversionError::Decode {
            datatype: datatype.name.clone(),
            source,
        })
    }

    /// Encodes a slice of values into one Arrow array.
    fn to_arrow(values: &[Self]) -> Result<ArrayRef, ConversionError> {
        let datatype = Self::datatype();
        let config = EngineConfig::default();
        let instances = values
            .iter()
            .enumerate()
            .map(|(index, v)| normalize(&v.to_native(), datatype, &config).map_err(|e| e.at_index(index)))
            .collect::<Result<Vec<_>, _>>()?;
        DatatypeCodec::new(datatype.clone()).encode(&instances)
    }

    /// Decodes an Arrow array produced by [`Loggable::to_arrow`].
    fn from_arrow(array: &dyn Array) -> Result<Vec<Self>, DecodeError> {
        DatatypeCodec::new(Self::datatype().clone())
            .decode(array)?
            .iter()
            .map(Self::from_canonical)
            .collect()
    }
}

/// A [`Loggable`] with a globally unique component name.
pub trait Component: Loggable {
    /// Fully qualified component name.
    const NAME: &'static str;

    /// Untagged descriptor for this component.
    fn descriptor() -> Result<ComponentDescriptor, RegistryError> {
        ComponentDescriptor::parse(Self::NAME)
    }

    /// Registers this component with `registry`; idempotent.
    fn register(registry: &ComponentRegistry) -> Result<ComponentHandle, RegistryError> {
        registry.register(Self::NAME, Self::datatype().clone())
    }

    /// Exports `values` as a batch. The component must already be registered
    /// with the builder's registry.
    fn to_batch(values: &[Self], builder: &BatchBuilder<'_>) -> Result<ComponentBatch, BatchError> {
        let descriptor = Self::descriptor()?;
        let input = BatchInput::Many(values.iter().map(Loggable::to_native).collect());
        builder.build_batch(&descriptor, input)
    }

    /// Reads values back out of a batch of this component.
    fn from_batch(batch: &ComponentBatch) -> Result<Vec<Self>, DecodeError> {
        Self::from_arrow(batch.array().as_ref())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::float_cmp)]
mod tests {
    use std::sync::OnceLock;

    use super::*;
    use crate::error::ResultExt;
    use strata_schema::ElementKind;

    #[derive(Debug, Clone, Copy, PartialEq)]
    struct Weight(f32);

    impl Loggable for Weight {
        fn datatype() -> &'static DatatypeDef {
            static DATATYPE: OnceLock<DatatypeDef> = OnceLock::new();
            DATATYPE.get_or_init(|| DatatypeDef::primitive("test.Float32", ElementKind::Float32))
        }

        fn to_native(&self) -> NativeValue {
            self.0.into()
        }

        fn from_canonical(canonical: &Canonical) -> Result<Self, DecodeError> {
            match canonical.as_f32() {
                Some([v]) => Ok(Self(*v)),
                _ => Err(DecodeError::UnexpectedShape {
                    expected: "one f32",
                }),
            }
        }
    }

    impl Component for Weight {
        const NAME: &'static str = "test.components.Weight";
    }

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    struct Even(u32);

    impl Loggable for Even {
        fn datatype() -> &'static DatatypeDef {
            static DATATYPE: OnceLock<DatatypeDef> = OnceLock::new();
            DATATYPE.get_or_init(|| DatatypeDef::primitive("test.UInt32", ElementKind::UInt32))
        }

        fn to_native(&self) -> NativeValue {
            self.0.into()
        }

        fn from_canonical(canonical: &Canonical) -> Result<Self, DecodeError> {
            match canonical.elements().and_then(crate::canonical::Elements::as_u32) {
                Some([v]) if v % 2 == 0 => Ok(Self(*v)),
                _ => Err(DecodeError::UnexpectedShape {
                    expected: "an even number",
                })
                .with_context("value"),
            }
        }
    }

    #[test]
    fn from_native_keeps_decode_context() {
        assert_eq!(Even::from_native(&4_u32.into()).unwrap(), Even(4));
        let err = Even::from_native(&3_u32.into()).unwrap_err();
        let ConversionError::Decode { datatype, source } = &err else {
            unreachable!("unexpected error {err:?}");
        };
        assert_eq!(datatype, "test.UInt32");
        assert!(matches!(source, DecodeError::Context { location, .. } if location == "value"));
        assert_eq!(
            source.root(),
            &DecodeError::UnexpectedShape {
                expected: "an even number"
            }
        );
        assert!(err.to_string().contains("an even number"));
    }

    #[test]
    fn from_native_narrows_input() {
        assert_eq!(Weight::from_native(&2.5_f64.into()).unwrap(), Weight(2.5));
        assert!(Weight::from_native(&"heavy".into()).is_err());
    }

    #[test]
    fn arrow_round_trip() {
        let values = [Weight(1.0), Weight(-3.5)];
        let array = Weight::to_arrow(&values).unwrap();
        assert_eq!(Weight::from_arrow(array.as_ref()).unwrap(), values);
    }

    #[test]
    fn to_batch_requires_registration() {
        let registry = ComponentRegistry::new();
        let builder = BatchBuilder::new(&registry);
        assert!(matches!(
            Weight::to_batch(&[Weight(1.0)], &builder),
            Err(BatchError::UnknownComponent(_))
        ));
        Weight::register(&registry).unwrap();
        let batch = Weight::to_batch(&[Weight(1.0), Weight(2.0)], &builder).unwrap();
        assert_eq!(batch.len(), 2);
        assert_eq!(Weight::from_batch(&batch).unwrap(), vec![Weight(1.0), Weight(2.0)]);
    }
}
