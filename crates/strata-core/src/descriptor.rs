// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Component names, ids and descriptors.
use blake3::Hasher;

use crate::error::RegistryError;

/// Canonical 256-bit hash used for component ids.
pub type Hash = [u8; 32];

/// Stable identifier derived from a component name.
///
/// Produced by [`make_component_id`]; equal names always yield equal ids in
/// every process and version, so downstream consumers may key on either.
#[repr(transparent)]
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct ComponentId(pub Hash);

impl ComponentId {
    /// Returns the canonical byte representation of this id.
    #[must_use]
    pub fn as_bytes(&self) -> &Hash {
        &self.0
    }
}

impl std::fmt::Display for ComponentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for byte in &self.0[..8] {
            write!(f, "{byte:02x}")?;
        }
        Ok(())
    }
}

/// Produces a stable, domain-separated component identifier (prefix `b"component:"`) using BLAKE3.
pub fn make_component_id(name: &str) -> ComponentId {
    let mut hasher = Hasher::new();
    hasher.update(b"component:");
    hasher.update(name.as_bytes());
    ComponentId(hasher.finalize().into())
}

/// Validated component descriptor string, `<namespace>.<category>.<ComponentName>`.
///
/// At least three non-empty dot-separated segments; the last segment starts
/// with an uppercase ASCII letter and contains only ASCII alphanumerics.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct ComponentName(String);

impl ComponentName {
    /// Parses and validates a descriptor string.
    pub fn parse(name: &str) -> Result<Self, RegistryError> {
        let invalid = |reason: &'static str| RegistryError::InvalidName {
            name: name.to_owned(),
            reason,
        };
        let segments: Vec<&str> = name.split('.').collect();
        if segments.len() < 3 {
            return Err(invalid("expected <namespace>.<category>.<ComponentName>"));
        }
        if segments.iter().any(|s| s.is_empty()) {
            return Err(invalid("empty segment"));
        }
        let short = segments[segments.len() - 1];
        if !short.starts_with(|c: char| c.is_ascii_uppercase()) {
            return Err(invalid("component name must start with an uppercase letter"));
        }
        if !short.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(invalid("component name must be alphanumeric"));
        }
        Ok(Self(name.to_owned()))
    }

    /// Full descriptor string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Last segment, e.g. `ForceStrength`.
    pub fn short_name(&self) -> &str {
        self.0.rsplit('.').next().unwrap_or(&self.0)
    }

    /// Stable id for this name.
    pub fn id(&self) -> ComponentId {
        make_component_id(&self.0)
    }
}

impl std::fmt::Display for ComponentName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ComponentName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Identifies a batch: the component it holds and, optionally, the archetype
/// slot it fills.
///
/// The registry is keyed by [`ComponentDescriptor::component_name`] only; the
/// archetype fields are tags carried alongside the batch.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct ComponentDescriptor {
    /// Archetype the component belongs to, if any.
    pub archetype_name: Option<String>,
    /// Field of the archetype the component fills, if any.
    pub archetype_field_name: Option<String>,
    /// Registered component name.
    pub component_name: ComponentName,
}

impl ComponentDescriptor {
    /// Descriptor for a bare component name.
    pub fn new(component_name: ComponentName) -> Self {
        Self {
            archetype_name: None,
            archetype_field_name: None,
            component_name,
        }
    }

    /// Parses `name` and wraps it in a bare descriptor.
    pub fn parse(name: &str) -> Result<Self, RegistryError> {
        ComponentName::parse(name).map(Self::new)
    }

    /// Tags the descriptor with an archetype slot.
    pub fn with_archetype(
        mut self,
        archetype_name: impl Into<String>,
        field_name: impl Into<String>,
    ) -> Self {
        self.archetype_name = Some(archetype_name.into());
        self.archetype_field_name = Some(field_name.into());
        self
    }
}

impl From<ComponentName> for ComponentDescriptor {
    fn from(name: ComponentName) -> Self {
        Self::new(name)
    }
}

impl std::fmt::Display for ComponentDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match (&self.archetype_name, &self.archetype_field_name) {
            (Some(archetype), Some(field)) => {
                write!(f, "{archetype}:{}#{field}", self.component_name)
            }
            (Some(archetype), None) => write!(f, "{archetype}:{}", self.component_name),
            (None, Some(field)) => write!(f, "{}#{field}", self.component_name),
            (None, None) => write!(f, "{}", self.component_name),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn parses_three_segment_names() {
        let name = ComponentName::parse("rerun.blueprint.components.ForceStrength").unwrap();
        assert_eq!(name.short_name(), "ForceStrength");
        assert_eq!(name.as_str(), "rerun.blueprint.components.ForceStrength");
    }

    #[test]
    fn rejects_malformed_names() {
        for bad in [
            "ForceStrength",
            "rerun.ForceStrength",
            "rerun..components.ForceStrength",
            "rerun.components.forceStrength",
            "rerun.components.Force-Strength",
        ] {
            assert!(
                matches!(
                    ComponentName::parse(bad),
                    Err(RegistryError::InvalidName { .. })
                ),
                "{bad} should be rejected"
            );
        }
    }

    #[test]
    fn ids_are_domain_separated_and_stable() {
        let a = make_component_id("rerun.components.Length");
        let b = make_component_id("rerun.components.Length");
        assert_eq!(a, b);

        let mut hasher = Hasher::new();
        hasher.update(b"rerun.components.Length");
        let undomained: Hash = hasher.finalize().into();
        assert_ne!(a.0, undomained);
    }

    #[test]
    fn display_includes_archetype_slot() {
        let descr = ComponentDescriptor::parse("rerun.blueprint.components.ForceStrength")
            .unwrap()
            .with_archetype("rerun.blueprint.archetypes.ForceManyBody", "strength");
        assert_eq!(
            descr.to_string(),
            "rerun.blueprint.archetypes.ForceManyBody:rerun.blueprint.components.ForceStrength#strength"
        );
    }
}
