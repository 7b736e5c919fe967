// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
#![allow(missing_docs, clippy::unwrap_used, clippy::expect_used)]
//! JSON schema document loading.

use strata_schema::{
    Arity, DatatypeDef, ElementKind, SchemaDocument, SchemaError, SchemaProvider, Shape,
};

const BLUEPRINT: &str = r#"{
    "name": "blueprint",
    "version": 2,
    "datatypes": [
        { "name": "rerun.datatypes.Float32", "shape": "primitive", "element": "f32" },
        { "name": "rerun.datatypes.Vec3D", "shape": "fixed_list", "element": "f32", "arity": 3 },
        { "name": "rerun.datatypes.Vec4D", "shape": "fixed_list", "element": "f32", "arity": 4 },
        { "name": "rerun.datatypes.Angle", "shape": "primitive", "element": "f32" },
        { "name": "rerun.datatypes.RotationAxisAngle", "shape": "struct",
          "fields": [
            { "name": "axis", "datatype": "rerun.datatypes.Vec3D" },
            { "name": "angle", "datatype": "rerun.datatypes.Angle" }
          ] },
        { "name": "rerun.components.ColormapKind", "shape": "enum",
          "variants": [ { "name": "Grayscale", "value": 1 }, { "name": "Viridis", "value": 6 } ] }
    ],
    "components": [
        { "name": "rerun.blueprint.components.ForceStrength", "datatype": "rerun.datatypes.Float32" },
        { "name": "rerun.components.Vec4Component", "datatype": "rerun.datatypes.Vec4D" },
        { "name": "rerun.components.RotationAxisAngle", "datatype": "rerun.datatypes.RotationAxisAngle" },
        { "name": "rerun.components.Colormap", "datatype": "rerun.components.ColormapKind" }
    ]
}"#;

#[test]
fn loads_datatypes_and_components() {
    let doc = SchemaDocument::from_json(BLUEPRINT).expect("parse");
    let info = doc.info();
    assert_eq!(info.name, "blueprint");
    assert_eq!(info.version, 2);

    let components = doc.components();
    assert_eq!(components.len(), 4);
    assert_eq!(components[0].name, "rerun.blueprint.components.ForceStrength");
    assert_eq!(
        components[0].datatype,
        DatatypeDef::primitive("rerun.datatypes.Float32", ElementKind::Float32)
    );
    assert_eq!(components[1].datatype.arity(), Some(Arity::Fixed(4)));
}

#[test]
fn struct_fields_resolve_to_earlier_datatypes() {
    let doc = SchemaDocument::from_json(BLUEPRINT).expect("parse");
    let rotation = doc.datatype("rerun.datatypes.RotationAxisAngle").expect("declared");
    let Shape::Struct { fields } = &rotation.shape else {
        unreachable!("expected struct, got {:?}", rotation.shape);
    };
    assert_eq!(fields.len(), 2);
    assert_eq!(fields[0].name, "axis");
    assert_eq!(fields[0].datatype.arity(), Some(Arity::Fixed(3)));
    assert_eq!(fields[1].datatype.name, "rerun.datatypes.Angle");
}

#[test]
fn datatypes_iterate_sorted() {
    let doc = SchemaDocument::from_json(BLUEPRINT).expect("parse");
    let names: Vec<&str> = doc.datatypes().map(|d| d.name.as_str()).collect();
    let mut sorted = names.clone();
    sorted.sort_unstable();
    assert_eq!(names, sorted);
}

#[test]
fn unknown_component_datatype_is_reported() {
    let text = r#"{
        "name": "broken",
        "components": [ { "name": "rerun.components.Length", "datatype": "rerun.datatypes.Missing" } ]
    }"#;
    let err = SchemaDocument::from_json(text).unwrap_err();
    assert!(matches!(
        err,
        SchemaError::UnknownDatatype { ref name, ref referenced_by }
            if name == "rerun.datatypes.Missing" && referenced_by == "rerun.components.Length"
    ));
}

#[test]
fn duplicate_datatype_is_reported() {
    let text = r#"{
        "name": "dup",
        "datatypes": [
            { "name": "rerun.datatypes.Float32", "shape": "primitive", "element": "f32" },
            { "name": "rerun.datatypes.Float32", "shape": "primitive", "element": "u32" }
        ]
    }"#;
    assert!(matches!(
        SchemaDocument::from_json(text),
        Err(SchemaError::DuplicateDatatype(ref name)) if name == "rerun.datatypes.Float32"
    ));
}

#[test]
fn invalid_datatype_is_reported() {
    let text = r#"{
        "name": "zero",
        "datatypes": [ { "name": "rerun.datatypes.Vec0D", "shape": "fixed_list", "element": "f32", "arity": 0 } ]
    }"#;
    assert!(matches!(SchemaDocument::from_json(text), Err(SchemaError::Invalid(_))));
}

#[test]
fn malformed_json_is_a_parse_error() {
    assert!(matches!(
        SchemaDocument::from_json("{ not json"),
        Err(SchemaError::Parse(_))
    ));
    assert!(matches!(
        SchemaDocument::from_json(r#"{ "name": "x", "datatypes": [ { "name": "a", "shape": "tensor" } ] }"#),
        Err(SchemaError::Parse(_))
    ));
}

#[test]
fn flags_default_off_and_parse_when_present() {
    let text = r#"{
        "name": "flags",
        "datatypes": [
            { "name": "test.Plain", "shape": "primitive", "element": "bool" },
            { "name": "test.Flagged", "shape": "fixed_list", "element": "f32", "arity": 2,
              "nullable": true, "broadcast_scalar": true, "non_empty": true }
        ]
    }"#;
    let doc = SchemaDocument::from_json(text).expect("parse");
    let plain = doc.datatype("test.Plain").expect("plain");
    assert!(!plain.nullable && !plain.broadcast_scalar && !plain.non_empty);
    let flagged = doc.datatype("test.Flagged").expect("flagged");
    assert!(flagged.nullable && flagged.broadcast_scalar && flagged.non_empty);
}

#[test]
fn missing_file_is_an_io_error() {
    let err = SchemaDocument::from_path("/definitely/not/here/schema.json").unwrap_err();
    assert!(matches!(err, SchemaError::Io(_)));
}
