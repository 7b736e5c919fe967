// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Error taxonomy for conversion, registration, batching and decoding.

use arrow_schema::DataType;
use strata_schema::{Arity, ElementKind, InvalidDatatype};
use thiserror::Error;

/// Native input could not be coerced to the target datatype.
///
/// Always surfaced to the caller; a failing element aborts the whole batch.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConversionError {
    /// Flattened element count does not match the declared arity.
    #[error("expected {expected} elements, found {found}")]
    ArityMismatch {
        /// Declared arity.
        expected: Arity,
        /// Flattened element count of the input.
        found: usize,
    },
    /// An element is not numeric and cannot be coerced.
    #[error("cannot coerce {found} to {expected}")]
    NonNumeric {
        /// Target element kind.
        expected: ElementKind,
        /// Kind of input found.
        found: &'static str,
    },
    /// Sibling sub-sequences have different lengths.
    #[error("irregular nested sequence: expected sub-sequences of length {expected}, found {found}")]
    Irregular {
        /// Length of the first sibling.
        expected: usize,
        /// Length of the offending sibling.
        found: usize,
    },
    /// Scalars and sub-sequences are mixed at the same nesting level.
    #[error("irregular nested sequence: scalars and sequences mixed at one level")]
    MixedNesting,
    /// A numeric value does not fit the target integer kind.
    #[error("value {value} is out of range for {kind}")]
    OutOfRange {
        /// Target element kind.
        kind: ElementKind,
        /// Offending value, rendered.
        value: String,
    },
    /// A non-finite float was rejected by the configured policy.
    #[error("non-finite value {value} rejected")]
    NonFinite {
        /// Offending value.
        value: f64,
    },
    /// A null was supplied for a non-nullable datatype.
    #[error("null value for non-nullable datatype {datatype}")]
    UnexpectedNull {
        /// Datatype name.
        datatype: String,
    },
    /// An enum discriminant or name is not a declared variant.
    #[error("{value} is not a variant of {datatype}")]
    InvalidEnumValue {
        /// Datatype name.
        datatype: String,
        /// Offending value, rendered.
        value: String,
    },
    /// A required struct field is missing.
    #[error("missing field {field} of {datatype}")]
    MissingField {
        /// Datatype name.
        datatype: String,
        /// Field name.
        field: String,
    },
    /// A record carries a field the struct does not declare.
    #[error("unknown field {field} for {datatype}")]
    UnknownField {
        /// Datatype name.
        datatype: String,
        /// Field name.
        field: String,
    },
    /// A pre-built array does not have the datatype's Arrow schema.
    #[error("array datatype mismatch: expected {expected}, found {found}")]
    DatatypeMismatch {
        /// Arrow type the datatype maps to.
        expected: DataType,
        /// Arrow type of the supplied array.
        found: DataType,
    },
    /// A value does not have the overall layout its datatype requires.
    #[error("value for {datatype} must be {expected}")]
    ShapeMismatch {
        /// Datatype name.
        datatype: String,
        /// Expected layout.
        expected: &'static str,
    },
    /// The batch exceeds the configured maximum length.
    #[error("batch of {len} instances exceeds the limit of {max}")]
    BatchTooLarge {
        /// Requested batch length.
        len: usize,
        /// Configured limit.
        max: usize,
    },
    /// The element count of an array shape does not fit in `usize`.
    #[error("array shape {shape:?} overflows the addressable element count")]
    ShapeOverflow {
        /// Requested dimensions.
        shape: Vec<usize>,
    },
    /// A list column's offsets do not fit in 32 bits.
    #[error("list offsets overflow i32")]
    OffsetOverflow,
    /// Arrow rejected the assembled column.
    #[error("arrow error: {0}")]
    Arrow(String),
    /// A normalized value could not be rebuilt as the requested type.
    #[error("{datatype}: {source}")]
    Decode {
        /// Datatype name.
        datatype: String,
        /// Decode failure, with its context chain.
        source: DecodeError,
    },
    /// Failure inside one instance of a batch.
    #[error("instance {index}: {source}")]
    AtIndex {
        /// Position of the instance in the input.
        index: usize,
        /// Underlying failure.
        source: Box<ConversionError>,
    },
    /// Failure inside one struct field.
    #[error("field {field}: {source}")]
    InField {
        /// Field name.
        field: String,
        /// Underlying failure.
        source: Box<ConversionError>,
    },
}

impl ConversionError {
    /// Wraps `self` with the index of the failing instance.
    pub fn at_index(self, index: usize) -> Self {
        Self::AtIndex {
            index,
            source: Box::new(self),
        }
    }

    /// Wraps `self` with the name of the failing struct field.
    pub fn in_field(self, field: impl Into<String>) -> Self {
        Self::InField {
            field: field.into(),
            source: Box::new(self),
        }
    }

    /// Innermost error, with index and field wrappers removed.
    pub fn root(&self) -> &Self {
        match self {
            Self::AtIndex { source, .. } | Self::InField { source, .. } => source.root(),
            other => other,
        }
    }
}

/// Two distinct datatypes claimed the same descriptor.
///
/// Indicates a schema authoring bug; type initialization should abort.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("component {name} is already registered with datatype {existing}, cannot re-register with {attempted}")]
pub struct DuplicateDescriptorError {
    /// Contested descriptor.
    pub name: String,
    /// Name of the datatype already registered.
    pub existing: String,
    /// Name of the datatype that was rejected.
    pub attempted: String,
}

/// Resolution of an unregistered descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown component {name}")]
pub struct UnknownComponentError {
    /// Descriptor that failed to resolve.
    pub name: String,
}

/// An empty batch was requested for a datatype that forbids it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("component {component} (datatype {datatype}) does not permit empty batches")]
pub struct EmptyBatchTypeError {
    /// Component descriptor.
    pub component: String,
    /// Datatype name.
    pub datatype: String,
}

/// Errors returned when registering components.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// The name is registered with a different datatype.
    #[error(transparent)]
    Duplicate(#[from] DuplicateDescriptorError),
    /// The name does not follow `<namespace>.<category>.<ComponentName>`.
    #[error("invalid component name {name:?}: {reason}")]
    InvalidName {
        /// Offending name.
        name: String,
        /// What is wrong with it.
        reason: &'static str,
    },
    /// The datatype definition is internally inconsistent.
    #[error(transparent)]
    InvalidDatatype(#[from] InvalidDatatype),
}

/// Errors returned by [`crate::BatchBuilder::build_batch`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum BatchError {
    /// Input could not be converted or encoded.
    #[error(transparent)]
    Conversion(#[from] ConversionError),
    /// The descriptor is not registered.
    #[error(transparent)]
    UnknownComponent(#[from] UnknownComponentError),
    /// The datatype forbids empty batches.
    #[error(transparent)]
    EmptyBatch(#[from] EmptyBatchTypeError),
    /// A descriptor built from a static name failed to parse.
    #[error(transparent)]
    Registry(#[from] RegistryError),
    /// Partition lengths do not describe a batch.
    #[error(transparent)]
    Partition(#[from] PartitionError),
}

/// Decode-side failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// The array's Arrow type is not the datatype's Arrow type.
    #[error("datatype mismatch: expected {expected}, found {actual}")]
    DatatypeMismatch {
        /// Expected Arrow type.
        expected: DataType,
        /// Actual Arrow type.
        actual: DataType,
    },
    /// A null was found where the datatype forbids it.
    #[error("missing data")]
    MissingData,
    /// A stored enum discriminant is not a declared variant.
    #[error("invalid discriminant {value} for {datatype}")]
    InvalidEnumValue {
        /// Datatype name.
        datatype: String,
        /// Stored discriminant.
        value: u8,
    },
    /// A canonical value does not match the shape the caller expects.
    #[error("unexpected canonical shape: expected {expected}")]
    UnexpectedShape {
        /// Description of the expected shape.
        expected: &'static str,
    },
    /// Failure with a location attached.
    #[error("{location}: {source}")]
    Context {
        /// Datatype or field path where the failure occurred.
        location: String,
        /// Underlying failure.
        source: Box<DecodeError>,
    },
}

impl DecodeError {
    /// Convenience constructor for [`DecodeError::DatatypeMismatch`].
    pub fn datatype_mismatch(expected: DataType, actual: DataType) -> Self {
        Self::DatatypeMismatch { expected, actual }
    }

    /// Innermost error, with context wrappers removed.
    pub fn root(&self) -> &Self {
        match self {
            Self::Context { source, .. } => source.root(),
            other => other,
        }
    }
}

/// Attaches a location to decode failures.
pub trait ResultExt<T> {
    /// Wraps an error in [`DecodeError::Context`].
    fn with_context(self, location: impl Into<String>) -> Result<T, DecodeError>;
}

impl<T> ResultExt<T> for Result<T, DecodeError> {
    fn with_context(self, location: impl Into<String>) -> Result<T, DecodeError> {
        self.map_err(|source| DecodeError::Context {
            location: location.into(),
            source: Box::new(source),
        })
    }
}

/// Partition lengths do not describe the batch.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PartitionError {
    /// The lengths do not sum to the batch length.
    #[error("partition lengths sum to {found}, batch has {expected} instances")]
    LengthMismatch {
        /// Batch length.
        expected: usize,
        /// Sum of the requested lengths.
        found: usize,
    },
    /// The offsets do not fit in 32 bits.
    #[error("partition offsets overflow i32")]
    OffsetOverflow,
    /// Arrow rejected the partitioned column.
    #[error("arrow error: {0}")]
    Arrow(String),
}

/// An extension is already installed for the component.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("extension for component {name} is already registered")]
pub struct DuplicateExtensionError {
    /// Component name.
    pub name: String,
}
