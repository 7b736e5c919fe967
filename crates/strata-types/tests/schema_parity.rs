// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
#![allow(missing_docs, clippy::unwrap_used, clippy::expect_used)]
//! The built-in types match the same definitions written as a JSON document.

use proptest::prelude::*;
use strata_core::{ComponentRegistry, Loggable, RegistryError};
use strata_schema::{SchemaDocument, SchemaProvider};
use strata_types::components::Colormap;
use strata_types::datatypes::RotationAxisAngle;
use strata_types::BuiltinTypes;

const BUILTINS: &str = r#"{
    "name": "strata-types",
    "datatypes": [
        { "name": "rerun.datatypes.Float32", "shape": "primitive", "element": "f32" },
        { "name": "rerun.datatypes.UInt32", "shape": "primitive", "element": "u32" },
        { "name": "rerun.datatypes.Bool", "shape": "primitive", "element": "bool" },
        { "name": "rerun.datatypes.Vec3D", "shape": "fixed_list", "element": "f32", "arity": 3 },
        { "name": "rerun.datatypes.Angle", "shape": "primitive", "element": "f32" },
        { "name": "rerun.datatypes.RotationAxisAngle", "shape": "struct",
          "fields": [
            { "name": "axis", "datatype": "rerun.datatypes.Vec3D" },
            { "name": "angle", "datatype": "rerun.datatypes.Angle" }
          ] },
        { "name": "rerun.components.Colormap", "shape": "enum",
          "variants": [
            { "name": "Grayscale", "value": 1 },
            { "name": "Inferno", "value": 2 },
            { "name": "Magma", "value": 3 },
            { "name": "Plasma", "value": 4 },
            { "name": "Turbo", "value": 5 },
            { "name": "Viridis", "value": 6 },
            { "name": "CyanToYellow", "value": 7 }
          ] }
    ],
    "components": [
        { "name": "rerun.blueprint.components.ForceStrength", "datatype": "rerun.datatypes.Float32" },
        { "name": "rerun.blueprint.components.ForceIterations", "datatype": "rerun.datatypes.UInt32" },
        { "name": "rerun.blueprint.components.Enabled", "datatype": "rerun.datatypes.Bool" },
        { "name": "rerun.components.Length", "datatype": "rerun.datatypes.Float32" },
        { "name": "rerun.blueprint.components.NearClipPlane", "datatype": "rerun.datatypes.Float32" },
        { "name": "rerun.components.Translation3D", "datatype": "rerun.datatypes.Vec3D" },
        { "name": "rerun.components.Colormap", "datatype": "rerun.components.Colormap" }
    ]
}"#;

#[test]
fn document_declares_the_builtins() {
    let doc = SchemaDocument::from_json(BUILTINS).unwrap();
    assert_eq!(doc.components(), BuiltinTypes.components());
    assert_eq!(
        doc.datatype("rerun.datatypes.RotationAxisAngle"),
        Some(RotationAxisAngle::datatype())
    );
}

#[test]
fn document_and_builtins_register_interchangeably() {
    let registry = ComponentRegistry::new();
    registry
        .register_provider(&SchemaDocument::from_json(BUILTINS).unwrap())
        .unwrap();
    strata_types::register_all(&registry).unwrap();
    assert_eq!(registry.len(), BuiltinTypes.components().len());
}

#[test]
fn conflicting_document_is_rejected() {
    let registry = ComponentRegistry::new();
    strata_types::register_all(&registry).unwrap();
    let conflicting = SchemaDocument::from_json(
        r#"{
            "name": "conflict",
            "datatypes": [
                { "name": "rerun.datatypes.Float64ish", "shape": "primitive", "element": "u32" }
            ],
            "components": [
                { "name": "rerun.blueprint.components.ForceStrength",
                  "datatype": "rerun.datatypes.Float64ish" }
            ]
        }"#,
    )
    .unwrap();
    let err = registry.register_provider(&conflicting).unwrap_err();
    assert!(matches!(err, RegistryError::Duplicate(_)));
}

proptest! {
    #[test]
    fn colormap_names_parse_with_any_case_and_separators(
        index in 0..Colormap::ALL.len(),
        upper in any::<bool>(),
        separator in prop::sample::select(vec!["", "_", "-", " "]),
    ) {
        let colormap = Colormap::ALL[index];
        let mut text = String::new();
        for (i, c) in colormap.name().char_indices() {
            if i > 0 && c.is_ascii_uppercase() {
                text.push_str(separator);
            }
            text.push(if upper { c.to_ascii_uppercase() } else { c.to_ascii_lowercase() });
        }
        prop_assert_eq!(text.parse::<Colormap>().unwrap(), colormap);
    }
}
