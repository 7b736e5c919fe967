// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Batch builder and the batches it produces.
//!
//! [`BatchBuilder::build_batch`] validates in a fixed order: resolve the
//! descriptor, normalize every instance, check the column, then encode it
//! in one go. Any failure aborts the whole batch; nothing partial escapes.

use std::collections::HashMap;
use std::sync::Arc;

use arrow_array::{new_empty_array, Array, ArrayRef, ListArray};
use arrow_buffer::{OffsetBuffer, ScalarBuffer};
use arrow_schema::{DataType, Field};
use strata_schema::{Arity, DatatypeDef, Shape};
use tracing::{debug, instrument};

use crate::canonical::Canonical;
use crate::codec::DatatypeCodec;
use crate::config::EngineConfig;
use crate::convert::normalize;
use crate::descriptor::ComponentDescriptor;
use crate::error::{
    BatchError, ConversionError, DecodeError, EmptyBatchTypeError, PartitionError,
};
use crate::extension::{ComponentExtension, ExtensionTable};
use crate::native::{NativeValue, NdArray};
use crate::registry::ComponentRegistry;

/// Field metadata key carrying the component name.
pub const FIELD_METADATA_KEY_COMPONENT: &str = "strata.component";
/// Field metadata key carrying the archetype name.
pub const FIELD_METADATA_KEY_ARCHETYPE: &str = "strata.archetype";
/// Field metadata key carrying the archetype field name.
pub const FIELD_METADATA_KEY_ARCHETYPE_FIELD: &str = "strata.archetype_field";

/// Native input for one batch.
#[derive(Debug, Clone)]
pub enum BatchInput {
    /// One value, producing a batch of length 1.
    Single(NativeValue),
    /// One value per instance.
    Many(Vec<NativeValue>),
    /// A loosely shaped value; see [`BatchInput::ArrayLike`] resolution in
    /// [`BatchBuilder::build_batch`].
    ArrayLike(NativeValue),
    /// A pre-built Arrow array, checked against the datatype's Arrow type only.
    Arrow(ArrayRef),
}

impl From<ArrayRef> for BatchInput {
    fn from(array: ArrayRef) -> Self {
        Self::Arrow(array)
    }
}

impl From<Vec<NativeValue>> for BatchInput {
    fn from(values: Vec<NativeValue>) -> Self {
        Self::Many(values)
    }
}

/// An immutable, tagged column of one component.
///
/// Every element conforms to the component's datatype. The array is shared by
/// reference count, so clones are cheap.
#[derive(Debug, Clone)]
pub struct ComponentBatch {
    descriptor: ComponentDescriptor,
    array: ArrayRef,
    nullable: bool,
}

impl ComponentBatch {
    pub(crate) fn new(descriptor: ComponentDescriptor, array: ArrayRef, nullable: bool) -> Self {
        Self {
            descriptor,
            array,
            nullable,
        }
    }

    /// Descriptor the batch was built for.
    pub fn descriptor(&self) -> &ComponentDescriptor {
        &self.descriptor
    }

    /// Underlying Arrow array.
    pub fn array(&self) -> &ArrayRef {
        &self.array
    }

    /// Number of instances.
    pub fn len(&self) -> usize {
        self.array.len()
    }

    /// Returns `true` for a zero-length batch.
    pub fn is_empty(&self) -> bool {
        self.array.is_empty()
    }

    /// Arrow type of the column.
    pub fn arrow_datatype(&self) -> &DataType {
        self.array.data_type()
    }

    /// Self-describing transport field: named after the component, with the
    /// descriptor recorded in the field metadata.
    pub fn field(&self) -> Field {
        let name = self.descriptor.component_name.as_str();
        let mut metadata = HashMap::from([(
            FIELD_METADATA_KEY_COMPONENT.to_owned(),
            name.to_owned(),
        )]);
        if let Some(archetype) = &self.descriptor.archetype_name {
            metadata.insert(FIELD_METADATA_KEY_ARCHETYPE.to_owned(), archetype.clone());
        }
        if let Some(field) = &self.descriptor.archetype_field_name {
            metadata.insert(FIELD_METADATA_KEY_ARCHETYPE_FIELD.to_owned(), field.clone());
        }
        Field::new(name, self.array.data_type().clone(), self.nullable).with_metadata(metadata)
    }

    /// Wraps the batch into a `List` column whose rows are consecutive slices
    /// of `lengths` instances each.
    ///
    /// # Errors
    /// Fails if the lengths do not sum to [`ComponentBatch::len`].
    pub fn partitioned(&self, lengths: &[usize]) -> Result<ListArray, PartitionError> {
        let total: usize = lengths.iter().sum();
        if total != self.len() {
            return Err(PartitionError::LengthMismatch {
                expected: self.len(),
                found: total,
            });
        }
        let mut offsets = Vec::with_capacity(lengths.len() + 1);
        offsets.push(0_i32);
        let mut end = 0_usize;
        for len in lengths {
            end += len;
            offsets.push(i32::try_from(end).map_err(|_| PartitionError::OffsetOverflow)?);
        }
        let item = Arc::new(Field::new("item", self.array.data_type().clone(), true));
        ListArray::try_new(
            item,
            OffsetBuffer::new(ScalarBuffer::from(offsets)),
            Arc::clone(&self.array),
            None,
        )
        .map_err(|e| PartitionError::Arrow(e.to_string()))
    }

    /// Like [`ComponentBatch::partitioned`], keeping the descriptor.
    pub fn column(&self, lengths: &[usize]) -> Result<ComponentColumn, PartitionError> {
        Ok(ComponentColumn {
            descriptor: self.descriptor.clone(),
            array: self.partitioned(lengths)?,
        })
    }

    /// Decodes the batch back into canonical instances.
    pub fn decode(&self, codec: &DatatypeCodec) -> Result<Vec<Canonical>, DecodeError> {
        codec.decode(self.array.as_ref())
    }
}

/// A batch partitioned into rows: row `i` holds `lengths[i]` instances.
#[derive(Debug, Clone)]
pub struct ComponentColumn {
    descriptor: ComponentDescriptor,
    array: ListArray,
}

impl ComponentColumn {
    /// Descriptor of the partitioned batch.
    pub fn descriptor(&self) -> &ComponentDescriptor {
        &self.descriptor
    }

    /// `List` column over the batch's instances.
    pub fn array(&self) -> &ListArray {
        &self.array
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.array.len()
    }

    /// Returns `true` when there are no rows.
    pub fn is_empty(&self) -> bool {
        self.array.is_empty()
    }
}

/// Builds [`ComponentBatch`]es against a registry.
#[derive(Debug, Clone)]
pub struct BatchBuilder<'a> {
    registry: &'a ComponentRegistry,
    extensions: Option<&'a ExtensionTable>,
    config: EngineConfig,
}

impl<'a> BatchBuilder<'a> {
    /// Creates a builder resolving descriptors through `registry`.
    pub fn new(registry: &'a ComponentRegistry) -> Self {
        Self {
            registry,
            extensions: None,
            config: EngineConfig::default(),
        }
    }

    /// Consults `extensions` before the default converters.
    pub fn with_extensions(mut self, extensions: &'a ExtensionTable) -> Self {
        self.extensions = Some(extensions);
        self
    }

    /// Replaces the engine configuration.
    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    /// Registry this builder resolves against.
    pub fn registry(&self) -> &'a ComponentRegistry {
        self.registry
    }

    /// Active configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Validates `input` and assembles a batch tagged with `descriptor`.
    ///
    /// `ArrayLike` input resolves as follows: a scalar, a record, or one
    /// instance's worth of flat data is a single instance. Flat data for a
    /// fixed list whose length is a multiple of the arity is split into
    /// consecutive instances. Deeper nesting (or an `NdArray` with more
    /// dimensions than one instance needs) splits along the leading dimension.
    ///
    /// On success the batch length equals the number of input instances.
    #[instrument(level = "debug", skip(self, descriptor, input), fields(component = %descriptor))]
    pub fn build_batch(
        &self,
        descriptor: &ComponentDescriptor,
        input: BatchInput,
    ) -> Result<ComponentBatch, BatchError> {
        let name = descriptor.component_name.as_str();
        let handle = self.registry.handle(name)?;
        let datatype = handle.datatype();
        let codec = handle.codec();

        let (array, fast_path) = match input {
            BatchInput::Arrow(array) => {
                self.check_len(name, datatype, array.len())?;
                if array.data_type() != codec.arrow_datatype() {
                    return Err(ConversionError::DatatypeMismatch {
                        expected: codec.arrow_datatype().clone(),
                        found: array.data_type().clone(),
                    }
                    .into());
                }
                if !datatype.nullable && array.null_count() > 0 {
                    return Err(ConversionError::UnexpectedNull {
                        datatype: datatype.name.clone(),
                    }
                    .into());
                }
                (array, true)
            }
            BatchInput::Single(value) => (self.convert(name, datatype, codec, vec![value])?, false),
            BatchInput::Many(values) => (self.convert(name, datatype, codec, values)?, false),
            BatchInput::ArrayLike(value) => {
                let values = split_array_like(value, datatype)?;
                (self.convert(name, datatype, codec, values)?, false)
            }
        };

        debug!(component = name, len = array.len(), fast_path, "built batch");
        Ok(ComponentBatch::new(
            descriptor.clone(),
            array,
            datatype.nullable,
        ))
    }

    /// Zero-length batch for `descriptor`, regardless of `non_empty`.
    ///
    /// Used to clear a component rather than to log an empty one.
    pub fn empty_batch(&self, descriptor: &ComponentDescriptor) -> Result<ComponentBatch, BatchError> {
        let handle = self.registry.handle(descriptor.component_name.as_str())?;
        let array = new_empty_array(handle.codec().arrow_datatype());
        Ok(ComponentBatch::new(
            descriptor.clone(),
            array,
            handle.datatype().nullable,
        ))
    }

    fn check_len(&self, component: &str, datatype: &DatatypeDef, len: usize) -> Result<(), BatchError> {
        if len == 0 && datatype.non_empty {
            return Err(EmptyBatchTypeError {
                component: component.to_owned(),
                datatype: datatype.name.clone(),
            }
            .into());
        }
        if let Some(max) = self.config.max_batch_len {
            if len > max {
                return Err(ConversionError::BatchTooLarge { len, max }.into());
            }
        }
        Ok(())
    }

    fn convert(
        &self,
        component: &str,
        datatype: &DatatypeDef,
        codec: &DatatypeCodec,
        values: Vec<NativeValue>,
    ) -> Result<ArrayRef, BatchError> {
        self.check_len(component, datatype, values.len())?;
        let extension = self.extensions.and_then(|table| table.get(component));

        let instances = values
            .iter()
            .enumerate()
            .map(|(index, value)| {
                self.normalize_one(extension, value, datatype)
                    .map_err(|e| e.at_index(index))
            })
            .collect::<Result<Vec<_>, _>>()?;

        check_uniform_arity(datatype, &instances)?;
        if let Some(extension) = extension {
            extension.validate(&instances)?;
        }
        Ok(codec.encode(&instances)?)
    }

    fn normalize_one(
        &self,
        extension: Option<&dyn ComponentExtension>,
        value: &NativeValue,
        datatype: &DatatypeDef,
    ) -> Result<Canonical, ConversionError> {
        extension
            .and_then(|ext| ext.normalize(value, datatype, &self.config))
            .unwrap_or_else(|| normalize(value, datatype, &self.config))
    }
}

/// Every non-null instance of a fixed-arity datatype carries exactly `arity`
/// elements.
fn check_uniform_arity(datatype: &DatatypeDef, instances: &[Canonical]) -> Result<(), ConversionError> {
    let Some(arity @ Arity::Fixed(_)) = datatype.arity() else {
        return Ok(());
    };
    for (index, instance) in instances.iter().enumerate() {
        if let Some(found) = instance.element_count() {
            if !arity.accepts(found) {
                return Err(ConversionError::ArityMismatch {
                    expected: arity,
                    found,
                }
                .at_index(index));
            }
        }
    }
    Ok(())
}

/// Nesting depth of one instance of `datatype`.
fn instance_depth(datatype: &DatatypeDef) -> usize {
    match &datatype.shape {
        Shape::Primitive { .. } | Shape::Enum { .. } => 0,
        Shape::FixedList { .. } | Shape::List { .. } | Shape::Struct { .. } => 1,
    }
}

/// Resolves `ArrayLike` input into one native value per instance.
fn split_array_like(
    value: NativeValue,
    datatype: &DatatypeDef,
) -> Result<Vec<NativeValue>, ConversionError> {
    match value {
        NativeValue::Null | NativeValue::Scalar(_) | NativeValue::Record(_) => Ok(vec![value]),
        NativeValue::Sequence(items) => {
            if let Shape::Struct { .. } = datatype.shape {
                // Positional structs are ambiguous; a sequence is many only when
                // every item is itself a record, or every item a sequence.
                let many = items.iter().all(|v| matches!(v, NativeValue::Record(_)))
                    || items.iter().all(|v| matches!(v, NativeValue::Sequence(_)));
                return Ok(if many {
                    items
                } else {
                    vec![NativeValue::Sequence(items)]
                });
            }
            if items.is_empty() && !matches!(datatype.shape, Shape::List { .. }) {
                return Ok(Vec::new());
            }
            // Nulls carry no nesting; the first present item decides the depth.
            let Some(first) = items.iter().find(|v| !matches!(v, NativeValue::Null)) else {
                return Ok(if items.is_empty() {
                    vec![NativeValue::Sequence(items)]
                } else {
                    items
                });
            };
            let depth = 1 + first.depth();
            if let Some(arity) = fixed_chunks(datatype, depth, items.len()) {
                return Ok(items
                    .chunks(arity)
                    .map(|chunk| NativeValue::Sequence(chunk.to_vec()))
                    .collect());
            }
            if depth > instance_depth(datatype) {
                Ok(items)
            } else {
                Ok(vec![NativeValue::Sequence(items)])
            }
        }
        NativeValue::Array(array) => {
            let depth = array.shape().len();
            if let Some(arity) = fixed_chunks(datatype, depth, array.len()) {
                let rows = array.len() / arity;
                let reshaped = NdArray::new(array.buffer().clone(), vec![rows, arity])?;
                return Ok(reshaped
                    .outer_split()
                    .into_iter()
                    .map(NativeValue::Array)
                    .collect());
            }
            if depth > instance_depth(datatype) {
                Ok(array
                    .outer_split()
                    .into_iter()
                    .map(NativeValue::Array)
                    .collect())
            } else {
                Ok(vec![NativeValue::Array(array)])
            }
        }
    }
}

/// Chunk size for flat fixed-list data that spans several instances.
///
/// Only applies to one-dimensional input whose length is a non-zero multiple
/// of an arity greater than one.
fn fixed_chunks(datatype: &DatatypeDef, depth: usize, len: usize) -> Option<usize> {
    let Shape::FixedList { arity, .. } = datatype.shape else {
        return None;
    };
    let arity = arity as usize;
    (depth == 1 && arity > 1 && len > 0 && len % arity == 0).then_some(arity)
}
