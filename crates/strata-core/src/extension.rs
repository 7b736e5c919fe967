// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Hand-written overrides for generated component behavior.

use std::collections::BTreeMap;
use std::sync::Arc;

use strata_schema::DatatypeDef;

use crate::canonical::Canonical;
use crate::config::EngineConfig;
use crate::error::{ConversionError, DuplicateExtensionError};
use crate::native::NativeValue;

/// Per-component hooks consulted by the batch builder before the defaults.
///
/// Both hooks default to "no override".
pub trait ComponentExtension: Send + Sync {
    /// Converts one native value. `None` falls back to [`crate::normalize`].
    fn normalize(
        &self,
        _value: &NativeValue,
        _datatype: &DatatypeDef,
        _config: &EngineConfig,
    ) -> Option<Result<Canonical, ConversionError>> {
        None
    }

    /// Checks the normalized column before it is encoded.
    fn validate(&self, _instances: &[Canonical]) -> Result<(), ConversionError> {
        Ok(())
    }
}

/// Extensions keyed by component name.
#[derive(Default, Clone)]
pub struct ExtensionTable {
    entries: BTreeMap<String, Arc<dyn ComponentExtension>>,
}

impl ExtensionTable {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Installs `extension` for `component`.
    ///
    /// # Errors
    /// Returns [`DuplicateExtensionError`] if the component already has one.
    pub fn register(
        &mut self,
        component: impl Into<String>,
        extension: impl ComponentExtension + 'static,
    ) -> Result<(), DuplicateExtensionError> {
        let component = component.into();
        if self.entries.contains_key(&component) {
            return Err(DuplicateExtensionError { name: component });
        }
        self.entries.insert(component, Arc::new(extension));
        Ok(())
    }

    /// Extension for `component`, if any.
    pub fn get(&self, component: &str) -> Option<&dyn ComponentExtension> {
        self.entries.get(component).map(AsRef::as_ref)
    }

    /// Returns `true` if `component` has an extension.
    pub fn contains(&self, component: &str) -> bool {
        self.entries.contains_key(component)
    }

    /// Number of installed extensions.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if no extension is installed.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl std::fmt::Debug for ExtensionTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_set().entries(self.entries.keys()).finish()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    struct Noop;
    impl ComponentExtension for Noop {}

    #[test]
    fn duplicate_extension_is_rejected() {
        let mut table = ExtensionTable::new();
        table.register("rerun.components.Colormap", Noop).unwrap();
        let err = table.register("rerun.components.Colormap", Noop).unwrap_err();
        assert_eq!(err.name, "rerun.components.Colormap");
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn default_hooks_do_nothing() {
        let mut table = ExtensionTable::new();
        table.register("rerun.components.Colormap", Noop).unwrap();
        let ext = table.get("rerun.components.Colormap").unwrap();
        let dt = strata_schema::DatatypeDef::primitive("test.Byte", strata_schema::ElementKind::UInt8);
        assert!(ext
            .normalize(&NativeValue::from(1_u8), &dt, &EngineConfig::default())
            .is_none());
        assert!(ext.validate(&[]).is_ok());
        assert!(table.get("rerun.components.Length").is_none());
    }
}
