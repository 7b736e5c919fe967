// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Datatype codec: canonical instances ↔ Arrow arrays.
//!
//! One [`DatatypeCodec`] exists per datatype. Encoding is deterministic and
//! always builds the whole column at once; decoding is its left inverse.
//!
//! Layout per shape:
//!
//! | Shape | Arrow type |
//! |---|---|
//! | `Primitive` | the element type (`Float32`, `UInt8`, `UInt32`, `Boolean`) |
//! | `FixedList` | `FixedSizeList<item: element, non-null>[arity]` |
//! | `List` | `List<item: element, non-null>` |
//! | `Enum` | `UInt8` |
//! | `Struct` | `Struct` of the declared fields |
//!
//! Null instances occupy a slot filled with zeros so fixed strides hold; the
//! validity buffer is omitted when nothing is null.

use std::sync::Arc;

use arrow_array::cast::AsArray;
use arrow_array::types::{Float32Type, UInt32Type, UInt8Type};
use arrow_array::{
    Array, ArrayRef, ArrowPrimitiveType, BooleanArray, FixedSizeListArray, Float32Array,
    ListArray, PrimitiveArray, StructArray, UInt32Array, UInt8Array,
};
use arrow_buffer::{BooleanBuffer, NullBuffer, OffsetBuffer, ScalarBuffer};
use arrow_schema::{DataType, Field, FieldRef, Fields};
use strata_schema::{Arity, DatatypeDef, ElementKind, EnumVariant, Shape};

use crate::canonical::{Canonical, Elements};
use crate::error::{ConversionError, DecodeError, ResultExt};

/// Arrow type for an element kind.
pub fn element_arrow_type(kind: ElementKind) -> DataType {
    match kind {
        ElementKind::Float32 => DataType::Float32,
        ElementKind::UInt8 => DataType::UInt8,
        ElementKind::UInt32 => DataType::UInt32,
        ElementKind::Bool => DataType::Boolean,
    }
}

fn item_field(kind: ElementKind) -> FieldRef {
    Arc::new(Field::new("item", element_arrow_type(kind), false))
}

fn struct_fields(fields: &[strata_schema::FieldDef]) -> Fields {
    fields
        .iter()
        .map(|f| {
            Field::new(
                f.name.clone(),
                arrow_datatype(&f.datatype),
                f.datatype.nullable,
            )
        })
        .collect()
}

/// Logical Arrow type of a datatype.
pub fn arrow_datatype(datatype: &DatatypeDef) -> DataType {
    match &datatype.shape {
        Shape::Primitive { element } => element_arrow_type(*element),
        Shape::FixedList { element, arity } => DataType::FixedSizeList(
            item_field(*element),
            i32::try_from(*arity).unwrap_or(i32::MAX),
        ),
        Shape::List { element } => DataType::List(item_field(*element)),
        Shape::Enum { .. } => DataType::UInt8,
        Shape::Struct { fields } => DataType::Struct(struct_fields(fields)),
    }
}

/// Bidirectional mapping between canonical values of one datatype and Arrow.
#[derive(Debug, Clone)]
pub struct DatatypeCodec {
    datatype: Arc<DatatypeDef>,
    arrow: DataType,
}

impl DatatypeCodec {
    /// Creates the codec for `datatype`.
    pub fn new(datatype: impl Into<Arc<DatatypeDef>>) -> Self {
        let datatype = datatype.into();
        let arrow = arrow_datatype(&datatype);
        Self { datatype, arrow }
    }

    /// Datatype this codec maps.
    pub fn datatype(&self) -> &Arc<DatatypeDef> {
        &self.datatype
    }

    /// Logical Arrow type of the column.
    pub fn arrow_datatype(&self) -> &DataType {
        &self.arrow
    }

    /// Arrow field for a column of this datatype.
    pub fn field(&self, name: impl Into<String>) -> Field {
        Field::new(name, self.arrow.clone(), self.datatype.nullable)
    }

    /// Encodes instances into one Arrow array of the same length.
    pub fn encode(&self, instances: &[Canonical]) -> Result<ArrayRef, ConversionError> {
        let refs: Vec<&Canonical> = instances.iter().collect();
        encode_column(&self.datatype, &refs)
    }

    /// Decodes an array back into canonical instances.
    pub fn decode(&self, array: &dyn Array) -> Result<Vec<Canonical>, DecodeError> {
        if array.data_type() != &self.arrow {
            return Err(DecodeError::datatype_mismatch(
                self.arrow.clone(),
                array.data_type().clone(),
            ));
        }
        (0..array.len())
            .map(|row| decode_row(array, &self.datatype, row))
            .collect::<Result<Vec<_>, DecodeError>>()
            .with_context(self.datatype.name.clone())
    }
}

fn validity(
    datatype: &DatatypeDef,
    instances: &[&Canonical],
) -> Result<Option<NullBuffer>, ConversionError> {
    let nulls = instances.iter().filter(|c| c.is_null()).count();
    if nulls == 0 {
        return Ok(None);
    }
    if !datatype.nullable {
        let index = instances.iter().position(|c| c.is_null()).unwrap_or(0);
        return Err(ConversionError::UnexpectedNull {
            datatype: datatype.name.clone(),
        }
        .at_index(index));
    }
    Ok(Some(NullBuffer::from(
        instances.iter().map(|c| !c.is_null()).collect::<Vec<bool>>(),
    )))
}

fn encode_column(
    datatype: &DatatypeDef,
    instances: &[&Canonical],
) -> Result<ArrayRef, ConversionError> {
    let nulls = validity(datatype, instances)?;
    match &datatype.shape {
        Shape::Primitive { element } => {
            let flat = flatten(datatype, *element, Arity::Fixed(1), instances)?;
            Ok(element_array(flat, nulls))
        }
        Shape::Enum { variants } => {
            let flat = flatten(datatype, ElementKind::UInt8, Arity::Fixed(1), instances)?;
            check_discriminants(datatype, variants, instances)?;
            Ok(element_array(flat, nulls))
        }
        Shape::FixedList { element, arity } => {
            let flat = flatten(datatype, *element, Arity::Fixed(*arity as usize), instances)?;
            let size = i32::try_from(*arity).map_err(|_| ConversionError::OffsetOverflow)?;
            let array = FixedSizeListArray::try_new(
                item_field(*element),
                size,
                element_array(flat, None),
                nulls,
            )
            .map_err(|e| ConversionError::Arrow(e.to_string()))?;
            Ok(Arc::new(array))
        }
        Shape::List { element } => {
            let mut offsets = Vec::with_capacity(instances.len() + 1);
            offsets.push(0_i32);
            let mut end = 0_usize;
            for instance in instances {
                end += instance.element_count().unwrap_or(0);
                offsets.push(i32::try_from(end).map_err(|_| ConversionError::OffsetOverflow)?);
            }
            let flat = flatten(datatype, *element, Arity::Variable, instances)?;
            let array = ListArray::try_new(
                item_field(*element),
                OffsetBuffer::new(ScalarBuffer::from(offsets)),
                element_array(flat, None),
                nulls,
            )
            .map_err(|e| ConversionError::Arrow(e.to_string()))?;
            Ok(Arc::new(array))
        }
        Shape::Struct { fields } => {
            let mut children = Vec::with_capacity(fields.len());
            for (i, field) in fields.iter().enumerate() {
                let filler = placeholder(&field.datatype);
                let mut column = Vec::with_capacity(instances.len());
                for (index, instance) in instances.iter().enumerate() {
                    match instance {
                        Canonical::Null => column.push(&filler),
                        Canonical::Struct(values) if values.len() == fields.len() => {
                            column.push(&values[i]);
                        }
                        _ => {
                            return Err(ConversionError::ShapeMismatch {
                                datatype: datatype.name.clone(),
                                expected: "one value per declared field",
                            }
                            .at_index(index))
                        }
                    }
                }
                children.push(
                    encode_column(&field.datatype, &column).map_err(|e| e.in_field(&field.name))?,
                );
            }
            let array = StructArray::try_new(struct_fields(fields), children, nulls)
                .map_err(|e| ConversionError::Arrow(e.to_string()))?;
            Ok(Arc::new(array))
        }
    }
}

/// Concatenates the elements of every instance, zero-filling null slots.
fn flatten(
    datatype: &DatatypeDef,
    kind: ElementKind,
    arity: Arity,
    instances: &[&Canonical],
) -> Result<Elements, ConversionError> {
    let slot = match arity {
        Arity::Fixed(n) => n,
        Arity::Variable => 0,
    };
    let total = instances
        .iter()
        .map(|c| c.element_count().unwrap_or(slot))
        .sum();
    let mut out = Elements::with_capacity(kind, total);
    for (index, instance) in instances.iter().enumerate() {
        match instance {
            Canonical::Null => zero_fill(&mut out, slot),
            Canonical::Elements(elements) => {
                if elements.kind() != kind {
                    return Err(ConversionError::ShapeMismatch {
                        datatype: datatype.name.clone(),
                        expected: kind_expectation(kind),
                    }
                    .at_index(index));
                }
                if !arity.accepts(elements.len()) {
                    return Err(ConversionError::ArityMismatch {
                        expected: arity,
                        found: elements.len(),
                    }
                    .at_index(index));
                }
                extend(&mut out, elements);
            }
            Canonical::Struct(_) => {
                return Err(ConversionError::ShapeMismatch {
                    datatype: datatype.name.clone(),
                    expected: kind_expectation(kind),
                }
                .at_index(index))
            }
        }
    }
    Ok(out)
}

const fn kind_expectation(kind: ElementKind) -> &'static str {
    match kind {
        ElementKind::Float32 => "f32 elements",
        ElementKind::UInt8 => "u8 elements",
        ElementKind::UInt32 => "u32 elements",
        ElementKind::Bool => "bool elements",
    }
}

fn zero_fill(out: &mut Elements, count: usize) {
    match out {
        Elements::Float32(v) => v.resize(v.len() + count, 0.0),
        Elements::UInt8(v) => v.resize(v.len() + count, 0),
        Elements::UInt32(v) => v.resize(v.len() + count, 0),
        Elements::Bool(v) => v.resize(v.len() + count, false),
    }
}

fn extend(out: &mut Elements, from: &Elements) {
    match (out, from) {
        (Elements::Float32(a), Elements::Float32(b)) => a.extend_from_slice(b),
        (Elements::UInt8(a), Elements::UInt8(b)) => a.extend_from_slice(b),
        (Elements::UInt32(a), Elements::UInt32(b)) => a.extend_from_slice(b),
        (Elements::Bool(a), Elements::Bool(b)) => a.extend_from_slice(b),
        _ => {}
    }
}

fn check_discriminants(
    datatype: &DatatypeDef,
    variants: &[EnumVariant],
    instances: &[&Canonical],
) -> Result<(), ConversionError> {
    for (index, instance) in instances.iter().enumerate() {
        let Some(values) = instance.elements().and_then(Elements::as_u8) else {
            continue;
        };
        if let Some(bad) = values.iter().find(|v| !variants.iter().any(|d| d.value == **v)) {
            return Err(ConversionError::InvalidEnumValue {
                datatype: datatype.name.clone(),
                value: bad.to_string(),
            }
            .at_index(index));
        }
    }
    Ok(())
}

/// Value stored in the slot of a null struct instance.
fn placeholder(datatype: &DatatypeDef) -> Canonical {
    match &datatype.shape {
        Shape::Primitive { element } => zeros(*element, 1),
        Shape::FixedList { element, arity } => zeros(*element, *arity as usize),
        Shape::List { element } => zeros(*element, 0),
        Shape::Enum { variants } => Canonical::Elements(Elements::UInt8(vec![variants
            .first()
            .map_or(0, |v| v.value)])),
        Shape::Struct { fields } => {
            Canonical::Struct(fields.iter().map(|f| placeholder(&f.datatype)).collect())
        }
    }
}

fn zeros(kind: ElementKind, count: usize) -> Canonical {
    let mut out = Elements::with_capacity(kind, count);
    zero_fill(&mut out, count);
    Canonical::Elements(out)
}

fn element_array(elements: Elements, nulls: Option<NullBuffer>) -> ArrayRef {
    match elements {
        Elements::Float32(v) => Arc::new(Float32Array::new(ScalarBuffer::from(v), nulls)),
        Elements::UInt8(v) => Arc::new(UInt8Array::new(ScalarBuffer::from(v), nulls)),
        Elements::UInt32(v) => Arc::new(UInt32Array::new(ScalarBuffer::from(v), nulls)),
        Elements::Bool(v) => Arc::new(BooleanArray::new(
            v.into_iter().collect::<BooleanBuffer>(),
            nulls,
        )),
    }
}

fn primitive<T: ArrowPrimitiveType>(array: &dyn Array) -> Result<&PrimitiveArray<T>, DecodeError> {
    array
        .as_primitive_opt::<T>()
        .ok_or_else(|| DecodeError::datatype_mismatch(T::DATA_TYPE, array.data_type().clone()))
}

/// Reads every element of a non-nullable item array.
fn read_elements(array: &dyn Array, kind: ElementKind) -> Result<Elements, DecodeError> {
    if array.null_count() > 0 {
        return Err(DecodeError::MissingData);
    }
    Ok(match kind {
        ElementKind::Float32 => Elements::Float32(primitive::<Float32Type>(array)?.values().to_vec()),
        ElementKind::UInt8 => Elements::UInt8(primitive::<UInt8Type>(array)?.values().to_vec()),
        ElementKind::UInt32 => Elements::UInt32(primitive::<UInt32Type>(array)?.values().to_vec()),
        ElementKind::Bool => {
            let bools = array.as_boolean_opt().ok_or_else(|| {
                DecodeError::datatype_mismatch(DataType::Boolean, array.data_type().clone())
            })?;
            Elements::Bool(bools.values().iter().collect())
        }
    })
}

fn decode_row(array: &dyn Array, datatype: &DatatypeDef, row: usize) -> Result<Canonical, DecodeError> {
    if array.is_null(row) {
        return if datatype.nullable {
            Ok(Canonical::Null)
        } else {
            Err(DecodeError::MissingData)
        };
    }
    match &datatype.shape {
        Shape::Primitive { element } => {
            read_elements(array.slice(row, 1).as_ref(), *element).map(Canonical::Elements)
        }
        Shape::Enum { variants } => {
            let value = primitive::<UInt8Type>(array)?.value(row);
            if variants.iter().any(|v| v.value == value) {
                Ok(Canonical::Elements(Elements::UInt8(vec![value])))
            } else {
                Err(DecodeError::InvalidEnumValue {
                    datatype: datatype.name.clone(),
                    value,
                })
            }
        }
        Shape::FixedList { element, .. } => {
            let list = array.as_fixed_size_list_opt().ok_or_else(|| {
                DecodeError::datatype_mismatch(arrow_datatype(datatype), array.data_type().clone())
            })?;
            read_elements(list.value(row).as_ref(), *element).map(Canonical::Elements)
        }
        Shape::List { element } => {
            let list = array.as_list_opt::<i32>().ok_or_else(|| {
                DecodeError::datatype_mismatch(arrow_datatype(datatype), array.data_type().clone())
            })?;
            read_elements(list.value(row).as_ref(), *element).map(Canonical::Elements)
        }
        Shape::Struct { fields } => {
            let columns = array.as_struct_opt().ok_or_else(|| {
                DecodeError::datatype_mismatch(arrow_datatype(datatype), array.data_type().clone())
            })?;
            fields
                .iter()
                .zip(columns.columns())
                .map(|(field, column)| {
                    decode_row(column.as_ref(), &field.datatype, row).with_context(field.name.clone())
                })
                .collect::<Result<Vec<_>, _>>()
                .map(Canonical::Struct)
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::float_cmp)]
mod tests {
    use super::*;
    use strata_schema::FieldDef;

    fn vec4() -> DatatypeDef {
        DatatypeDef::fixed_list("test.Vec4D", ElementKind::Float32, 4)
    }

    #[test]
    fn fixed_list_layout() {
        let codec = DatatypeCodec::new(vec4());
        let item = Arc::new(Field::new("item", DataType::Float32, false));
        assert_eq!(codec.arrow_datatype(), &DataType::FixedSizeList(item, 4));

        let array = codec
            .encode(&[vec![1.0, 2.0, 3.0, 4.0].into(), vec![5.0, 6.0, 7.0, 8.0].into()])
            .unwrap();
        assert_eq!(array.len(), 2);
        assert!(array.nulls().is_none());
        let list = array.as_fixed_size_list();
        let child = list.values().as_primitive::<Float32Type>();
        assert_eq!(child.values().as_ref(), &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0]);
    }

    #[test]
    fn empty_input_is_empty_array() {
        let codec = DatatypeCodec::new(vec4());
        let array = codec.encode(&[]).unwrap();
        assert_eq!(array.len(), 0);
        assert_eq!(array.data_type(), codec.arrow_datatype());
    }

    #[test]
    fn nulls_become_validity_bits() {
        let dt = DatatypeDef::primitive("test.Float32", ElementKind::Float32).with_nullable(true);
        let codec = DatatypeCodec::new(dt);
        let input = vec![vec![1.0].into(), Canonical::Null, vec![3.0].into()];
        let array = codec.encode(&input).unwrap();
        assert_eq!(array.null_count(), 1);
        assert_eq!(codec.decode(array.as_ref()).unwrap(), input);
    }

    #[test]
    fn null_rejected_for_non_nullable() {
        let codec = DatatypeCodec::new(vec4());
        let err = codec.encode(&[Canonical::Null]).unwrap_err();
        assert!(matches!(err.root(), ConversionError::UnexpectedNull { .. }));
    }

    #[test]
    fn list_round_trip_preserves_lengths() {
        let codec = DatatypeCodec::new(DatatypeDef::list("test.Floats", ElementKind::Float32));
        let input: Vec<Canonical> = vec![vec![].into(), vec![1.0].into(), vec![2.0, 3.0, 4.0].into()];
        let array = codec.encode(&input).unwrap();
        assert_eq!(array.as_list::<i32>().value_offsets(), &[0, 0, 1, 4]);
        assert_eq!(codec.decode(array.as_ref()).unwrap(), input);
    }

    #[test]
    fn struct_round_trip_with_null_instance() {
        let dt = DatatypeDef::structure(
            "test.AxisAngle",
            vec![
                FieldDef::new(
                    "axis",
                    DatatypeDef::fixed_list("test.Vec3D", ElementKind::Float32, 3),
                ),
                FieldDef::new(
                    "angle",
                    DatatypeDef::primitive("test.Angle", ElementKind::Float32),
                ),
            ],
        )
        .with_nullable(true);
        let codec = DatatypeCodec::new(dt);
        let input = vec![
            Canonical::Struct(vec![vec![0.0, 0.0, 1.0].into(), vec![0.5].into()]),
            Canonical::Null,
        ];
        let array = codec.encode(&input).unwrap();
        assert_eq!(array.null_count(), 1);
        assert_eq!(codec.decode(array.as_ref()).unwrap(), input);
    }

    #[test]
    fn decode_rejects_foreign_type() {
        let codec = DatatypeCodec::new(vec4());
        let other = Float32Array::from(vec![1.0_f32]);
        let err = codec.decode(&other).unwrap_err();
        assert!(matches!(err, DecodeError::DatatypeMismatch { .. }));
    }

    #[test]
    fn decode_reports_missing_data() {
        let codec = DatatypeCodec::new(DatatypeDef::primitive("test.Float32", ElementKind::Float32));
        let with_null = Float32Array::from(vec![Some(1.0_f32), None]);
        let err = codec.decode(&with_null).unwrap_err();
        assert_eq!(err.root(), &DecodeError::MissingData);
        assert!(err.to_string().starts_with("test.Float32"), "{err}");
    }

    #[test]
    fn enum_discriminants_checked_both_ways() {
        let dt = DatatypeDef::enumeration(
            "test.Mode",
            vec![EnumVariant::new("Fast", 1), EnumVariant::new("Slow", 2)],
        );
        let codec = DatatypeCodec::new(dt);
        let bad = Canonical::Elements(Elements::UInt8(vec![9]));
        assert!(matches!(
            codec.encode(&[bad]).unwrap_err().root(),
            ConversionError::InvalidEnumValue { .. }
        ));
        let stored = UInt8Array::from(vec![9_u8]);
        assert!(matches!(
            codec.decode(&stored).unwrap_err().root(),
            DecodeError::InvalidEnumValue { value: 9, .. }
        ));
    }

    #[test]
    fn non_finite_values_are_stored_unchanged() {
        let codec = DatatypeCodec::new(DatatypeDef::primitive("test.Float32", ElementKind::Float32));
        let array = codec
            .encode(&[vec![f32::NAN].into(), vec![f32::INFINITY].into()])
            .unwrap();
        let floats = array.as_primitive::<Float32Type>();
        assert!(floats.value(0).is_nan());
        assert_eq!(floats.value(1), f32::INFINITY);
    }
}
