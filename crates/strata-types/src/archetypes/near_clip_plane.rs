// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
use strata_core::{
    archetype_descriptor, archetype_field, Archetype, ArchetypeBuilder, BatchBuilder, BatchError,
    ComponentBatch, ComponentDescriptor, DecodeError, RegistryError,
};

use crate::components;

/// **Archetype**: controls the distance to the near clip plane in 3D scene units.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct NearClipPlane {
    /// Distance to the near clip plane, one per row.
    pub near_clip_plane: Vec<components::NearClipPlane>,
}

impl NearClipPlane {
    /// Field name of [`NearClipPlane::near_clip_plane`].
    pub const FIELD_NEAR_CLIP_PLANE: &'static str = "near_clip_plane";

    /// Creates an archetype with the distance set.
    pub fn new(near_clip_plane: impl Into<components::NearClipPlane>) -> Self {
        Self {
            near_clip_plane: vec![near_clip_plane.into()],
        }
    }

    /// Sets one distance per row.
    pub fn with_many_near_clip_plane(
        mut self,
        near_clip_plane: impl IntoIterator<Item = impl Into<components::NearClipPlane>>,
    ) -> Self {
        self.near_clip_plane = near_clip_plane.into_iter().map(Into::into).collect();
        self
    }
}

impl Archetype for NearClipPlane {
    const NAME: &'static str = "rerun.blueprint.archetypes.NearClipPlane";

    fn all_components() -> Result<Vec<ComponentDescriptor>, RegistryError> {
        Ok(vec![archetype_descriptor::<components::NearClipPlane>(
            Self::NAME,
            Self::FIELD_NEAR_CLIP_PLANE,
        )?])
    }

    fn as_batches(&self, builder: &BatchBuilder<'_>) -> Result<Vec<ComponentBatch>, BatchError> {
        Ok(ArchetypeBuilder::new(builder, Self::NAME)
            .field_many(Self::FIELD_NEAR_CLIP_PLANE, &self.near_clip_plane)?
            .finish())
    }

    fn from_batches(batches: &[ComponentBatch]) -> Result<Self, DecodeError> {
        Ok(Self {
            near_clip_plane: archetype_field(batches, Self::NAME, Self::FIELD_NEAR_CLIP_PLANE)?,
        })
    }
}
