// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Archetypes: named bundles of optional components.
//!
//! Each field of an archetype holds zero or more instances of one component.
//! An empty field is unset and produces no batch.

use crate::batch::{BatchBuilder, BatchInput, ComponentBatch, ComponentColumn};
use crate::component::{Component, Loggable};
use crate::descriptor::ComponentDescriptor;
use crate::error::{BatchError, DecodeError, RegistryError, ResultExt};

/// A bundle of components logged together.
pub trait Archetype: Sized {
    /// Fully qualified archetype name.
    const NAME: &'static str;

    /// Descriptors of every field, tagged with this archetype.
    fn all_components() -> Result<Vec<ComponentDescriptor>, RegistryError>;

    /// Batches for the fields that are set.
    fn as_batches(&self, builder: &BatchBuilder<'_>) -> Result<Vec<ComponentBatch>, BatchError>;

    /// Rebuilds an archetype from batches tagged with its fields.
    ///
    /// Batches for other archetypes are ignored; a field without a batch stays
    /// unset.
    fn from_batches(batches: &[ComponentBatch]) -> Result<Self, DecodeError>;

    /// Empty batches for every field, clearing them downstream.
    fn clear_fields(builder: &BatchBuilder<'_>) -> Result<Vec<ComponentBatch>, BatchError> {
        Self::all_components()?
            .iter()
            .map(|descriptor| builder.empty_batch(descriptor))
            .collect()
    }

    /// Partitions every set field into rows of `lengths` instances each.
    ///
    /// # Errors
    /// Fails if a set field's length differs from the sum of `lengths`.
    fn columns(
        &self,
        builder: &BatchBuilder<'_>,
        lengths: &[usize],
    ) -> Result<Vec<ComponentColumn>, BatchError> {
        self.as_batches(builder)?
            .iter()
            .map(|batch| batch.column(lengths).map_err(BatchError::from))
            .collect()
    }
}

/// Descriptor for component `C` filling `field` of `archetype`.
pub fn archetype_descriptor<C: Component>(
    archetype: &str,
    field: &str,
) -> Result<ComponentDescriptor, RegistryError> {
    C::descriptor().map(|d| d.with_archetype(archetype, field))
}

/// Decodes the batch filling `field` of `archetype` with component `C`.
///
/// Returns no values when no batch carries that slot.
pub fn archetype_field<C: Component>(
    batches: &[ComponentBatch],
    archetype: &str,
    field: &str,
) -> Result<Vec<C>, DecodeError> {
    let slot = batches.iter().find(|batch| {
        let descriptor = batch.descriptor();
        descriptor.archetype_name.as_deref() == Some(archetype)
            && descriptor.archetype_field_name.as_deref() == Some(field)
            && descriptor.component_name.as_str() == C::NAME
    });
    match slot {
        Some(batch) => C::from_batch(batch).with_context(field),
        None => Ok(Vec::new()),
    }
}

/// Collects archetype-tagged batches field by field.
#[derive(Debug)]
pub struct ArchetypeBuilder<'b, 'r> {
    builder: &'b BatchBuilder<'r>,
    archetype: &'static str,
    batches: Vec<ComponentBatch>,
}

impl<'b, 'r> ArchetypeBuilder<'b, 'r> {
    /// Starts collecting batches for `archetype`.
    pub fn new(builder: &'b BatchBuilder<'r>, archetype: &'static str) -> Self {
        Self {
            builder,
            archetype,
            batches: Vec::new(),
        }
    }

    /// Adds a batch for `field` holding every value in `values`; an empty
    /// slice leaves the field unset.
    pub fn field_many<C: Component>(
        mut self,
        field: &str,
        values: &[C],
    ) -> Result<Self, BatchError> {
        if values.is_empty() {
            return Ok(self);
        }
        let descriptor = archetype_descriptor::<C>(self.archetype, field)?;
        let input = BatchInput::Many(values.iter().map(Loggable::to_native).collect());
        self.batches.push(self.builder.build_batch(&descriptor, input)?);
        Ok(self)
    }

    /// Batches collected so far, in insertion order.
    pub fn finish(self) -> Vec<ComponentBatch> {
        self.batches
    }
}
