// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
use strata_core::{
    archetype_descriptor, archetype_field, Archetype, ArchetypeBuilder, BatchBuilder, BatchError,
    ComponentBatch, ComponentDescriptor, DecodeError, RegistryError,
};

use crate::components::{Enabled, ForceStrength};

/// **Archetype**: a force between each pair of nodes, resembling an
/// electrical charge.
///
/// Positive strength attracts nodes, negative strength repels them. Fields
/// hold one value per row; an empty field is unset.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ForceManyBody {
    /// Whether the force is applied.
    pub enabled: Vec<Enabled>,
    /// Strength of the force.
    pub strength: Vec<ForceStrength>,
}

impl ForceManyBody {
    /// Field name of [`ForceManyBody::enabled`].
    pub const FIELD_ENABLED: &'static str = "enabled";
    /// Field name of [`ForceManyBody::strength`].
    pub const FIELD_STRENGTH: &'static str = "strength";

    /// Creates an archetype with no fields set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets whether the force is applied.
    pub fn with_enabled(mut self, enabled: impl Into<Enabled>) -> Self {
        self.enabled = vec![enabled.into()];
        self
    }

    /// Sets the strength of the force.
    pub fn with_strength(mut self, strength: impl Into<ForceStrength>) -> Self {
        self.strength = vec![strength.into()];
        self
    }

    /// Sets one enabled flag per row.
    pub fn with_many_enabled(
        mut self,
        enabled: impl IntoIterator<Item = impl Into<Enabled>>,
    ) -> Self {
        self.enabled = enabled.into_iter().map(Into::into).collect();
        self
    }

    /// Sets one strength per row.
    pub fn with_many_strength(
        mut self,
        strength: impl IntoIterator<Item = impl Into<ForceStrength>>,
    ) -> Self {
        self.strength = strength.into_iter().map(Into::into).collect();
        self
    }
}

impl Archetype for ForceManyBody {
    const NAME: &'static str = "rerun.blueprint.archetypes.ForceManyBody";

    fn all_components() -> Result<Vec<ComponentDescriptor>, RegistryError> {
        Ok(vec![
            archetype_descriptor::<Enabled>(Self::NAME, Self::FIELD_ENABLED)?,
            archetype_descriptor::<ForceStrength>(Self::NAME, Self::FIELD_STRENGTH)?,
        ])
    }

    fn as_batches(&self, builder: &BatchBuilder<'_>) -> Result<Vec<ComponentBatch>, BatchError> {
        Ok(ArchetypeBuilder::new(builder, Self::NAME)
            .field_many(Self::FIELD_ENABLED, &self.enabled)?
            .field_many(Self::FIELD_STRENGTH, &self.strength)?
            .finish())
    }

    fn from_batches(batches: &[ComponentBatch]) -> Result<Self, DecodeError> {
        Ok(Self {
            enabled: archetype_field(batches, Self::NAME, Self::FIELD_ENABLED)?,
            strength: archetype_field(batches, Self::NAME, Self::FIELD_STRENGTH)?,
        })
    }
}
