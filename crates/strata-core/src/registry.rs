// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Component descriptor registry.
//!
//! Maps component names to their datatypes. Entries are added once per
//! component type and never removed. A single mutex guards the map; the lock
//! is held for the map access only, never across logging or codec work.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, OnceLock};

use strata_schema::{DatatypeDef, SchemaProvider};
use tracing::{debug, instrument, trace, warn};

use crate::codec::DatatypeCodec;
use crate::descriptor::{ComponentId, ComponentName};
use crate::error::{DuplicateDescriptorError, RegistryError, UnknownComponentError};

static GLOBAL: OnceLock<ComponentRegistry> = OnceLock::new();

/// A registered component: name, stable id and datatype codec.
///
/// Cheap to clone; the codec is shared.
#[derive(Debug, Clone)]
pub struct ComponentHandle {
    name: ComponentName,
    id: ComponentId,
    codec: Arc<DatatypeCodec>,
}

impl ComponentHandle {
    /// Registered component name.
    pub fn name(&self) -> &ComponentName {
        &self.name
    }

    /// Stable id derived from the name.
    pub fn id(&self) -> ComponentId {
        self.id
    }

    /// Shared datatype definition.
    pub fn datatype(&self) -> &Arc<DatatypeDef> {
        self.codec.datatype()
    }

    /// Codec for the component's datatype.
    pub fn codec(&self) -> &DatatypeCodec {
        &self.codec
    }
}

impl PartialEq for ComponentHandle {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.datatype() == other.datatype()
    }
}

impl Eq for ComponentHandle {}

/// Process-wide (or test-local) table of registered components.
#[derive(Debug, Default)]
pub struct ComponentRegistry {
    entries: Mutex<BTreeMap<String, ComponentHandle>>,
}

impl ComponentRegistry {
    /// Creates an empty registry, independent of [`ComponentRegistry::global`].
    pub fn new() -> Self {
        Self::default()
    }

    /// The process-wide registry. Created on first use and never torn down.
    pub fn global() -> &'static Self {
        GLOBAL.get_or_init(Self::new)
    }

    /// Registers `name` with `datatype`.
    ///
    /// Registering the same `(name, datatype)` pair again is idempotent and
    /// returns the existing handle. A different datatype under an existing
    /// name fails with [`RegistryError::Duplicate`] and leaves the registry
    /// unchanged.
    #[instrument(level = "debug", skip(self, datatype))]
    pub fn register(
        &self,
        name: &str,
        datatype: impl Into<Arc<DatatypeDef>>,
    ) -> Result<ComponentHandle, RegistryError> {
        let name = ComponentName::parse(name)?;
        let datatype = datatype.into();
        datatype.validate()?;

        let candidate = ComponentHandle {
            id: name.id(),
            codec: Arc::new(DatatypeCodec::new(Arc::clone(&datatype))),
            name: name.clone(),
        };

        let outcome = {
            let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
            match entries.get(name.as_str()) {
                Some(existing) if existing.datatype() == &datatype => {
                    Registration::Existing(existing.clone())
                }
                Some(existing) => Registration::Conflict(existing.datatype().name.clone()),
                None => {
                    entries.insert(name.to_string(), candidate.clone());
                    Registration::New(candidate)
                }
            }
        };

        match outcome {
            Registration::New(handle) => {
                debug!(component = %handle.name, id = %handle.id, datatype = %datatype.name, "registered component");
                Ok(handle)
            }
            Registration::Existing(handle) => {
                trace!(component = %handle.name, "component already registered");
                Ok(handle)
            }
            Registration::Conflict(existing) => {
                warn!(component = %name, %existing, attempted = %datatype.name, "rejected conflicting registration");
                Err(DuplicateDescriptorError {
                    name: name.to_string(),
                    existing,
                    attempted: datatype.name.clone(),
                }
                .into())
            }
        }
    }

    /// Registers every component `provider` declares, stopping at the first
    /// failure. Components registered before the failure stay registered.
    pub fn register_provider(
        &self,
        provider: &dyn SchemaProvider,
    ) -> Result<Vec<ComponentHandle>, RegistryError> {
        let info = provider.info();
        let handles = provider
            .components()
            .into_iter()
            .map(|def| self.register(&def.name, def.datatype))
            .collect::<Result<Vec<_>, _>>()?;
        debug!(schema = %info.name, version = info.version, count = handles.len(), "registered schema");
        Ok(handles)
    }

    /// Handle for a registered component.
    pub fn handle(&self, name: &str) -> Result<ComponentHandle, UnknownComponentError> {
        let entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries
            .get(name)
            .cloned()
            .ok_or_else(|| UnknownComponentError {
                name: name.to_owned(),
            })
    }

    /// Datatype of a registered component.
    pub fn resolve(&self, name: &str) -> Result<Arc<DatatypeDef>, UnknownComponentError> {
        self.handle(name).map(|h| Arc::clone(h.datatype()))
    }

    /// Returns `true` if `name` is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.handle(name).is_ok()
    }

    /// Number of registered components.
    pub fn len(&self) -> usize {
        self.entries.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    /// Returns `true` if nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Registered names in sorted order.
    pub fn names(&self) -> Vec<String> {
        let entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries.keys().cloned().collect()
    }
}

enum Registration {
    New(ComponentHandle),
    Existing(ComponentHandle),
    Conflict(String),
}
