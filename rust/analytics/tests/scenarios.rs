// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! End-to-end scenarios driven through JSON snapshots

use ifc_lite_analytics::{AnalyticsConfig, ModelAnalyzer, ModelSnapshot};
use serde_json::{json, Value};

fn analyze(model: Value) -> Value {
    let snapshot: ModelSnapshot = serde_json::from_value(model).expect("valid snapshot");
    ModelAnalyzer::new(AnalyticsConfig::default())
        .analyze(&snapshot.input())
        .to_json()
        .expect("serializable report")
}

#[test]
fn three_custom_walls_aggregate_per_type() {
    let report = analyze(json!({
        "supertypes": {"Wall": "IfcBuildingElement"},
        "objects": [
            {"id": 1, "type_name": "Wall", "geometry": {"primitive_count": 10, "volume": 1.0}},
            {"id": 2, "type_name": "Wall", "geometry": {"primitive_count": 20, "volume": 1.0}},
            {"id": 3, "type_name": "Wall", "geometry": {"primitive_count": 30, "volume": 1.0}}
        ]
    }));

    let aggregations = &report["aggregations"];
    let per_type = aggregations["perType"].as_object().unwrap();
    assert_eq!(per_type.len(), 1);
    assert_eq!(per_type["Wall"]["numberOfObjects"], 3);
    assert_eq!(per_type["Wall"]["averageNumberOfTriangles"], 20);
    assert_eq!(aggregations["completeModel"]["totalTriangles"], 60);
    assert_eq!(aggregations["completeModel"]["totalNrOfObjects"], 3);

    let complex = aggregations["topTenMostComplexObjects"].as_array().unwrap();
    let ratios: Vec<f64> = complex
        .iter()
        .map(|entry| entry["trianglesPerM3"].as_f64().unwrap())
        .collect();
    assert_eq!(ratios, vec![30.0, 20.0, 10.0]);
}

#[test]
fn references_with_equal_keys_collapse_across_definitions() {
    let report = analyze(json!({
        "objects": [
            {"id": 1, "type_name": "IfcWall"},
            {"id": 2, "type_name": "IfcWall"},
            {"id": 3, "type_name": "IfcSlab"}
        ],
        "classifications": [
            {"id": 10, "name": "ISO 1_A_B"}
        ],
        "classification_references": [
            {"id": 20, "location": "L", "item_reference": "1", "name": "N", "referenced_source": 10},
            {"id": 21, "location": "L", "item_reference": "1", "name": "N", "referenced_source": 10}
        ],
        "classification_associations": [
            {"relating": {"kind": "reference", "id": 20}, "related_objects": [1]},
            {"relating": {"kind": "reference", "id": 21}, "related_objects": [2, 3]}
        ]
    }));

    let classifications = report["classifications"].as_array().unwrap();
    assert_eq!(classifications.len(), 2);
    assert_eq!(classifications[0]["name"], "ISO 1_A_B");
    assert_eq!(
        classifications[0]["references"],
        json!([{"location": "L", "itemReference": "1", "name": "N", "numberOfObjects": 3}])
    );
    assert_eq!(classifications[1]["name"], "NO_CLASSIFICATION");
    assert_eq!(classifications[1]["references"][0]["numberOfObjects"], 0);
}

#[test]
fn bare_object_lands_in_both_unassigned_buckets() {
    let report = analyze(json!({
        "objects": [
            {"id": 1, "type_name": "IfcWall"},
            {"id": 2, "type_name": "IfcFurnishingElement", "name": "Chair"}
        ],
        "materials": [{"id": 10, "name": "Oak"}],
        "classifications": [{"id": 20, "name": "Uniclass"}],
        "classification_references": [{"id": 21, "item_reference": "Ss_25", "referenced_source": 20}],
        "material_associations": [
            {"relating": {"kind": "material", "id": 10}, "related_objects": [1]}
        ],
        "classification_associations": [
            {"relating": {"kind": "reference", "id": 21}, "related_objects": [1]}
        ]
    }));

    let materials = report["materials"].as_array().unwrap();
    assert_eq!(materials.last().unwrap(), &json!({"name": "NO_MATERIAL", "nrOfProducts": 1}));

    let classifications = report["classifications"].as_array().unwrap();
    let unclassified = classifications.last().unwrap();
    assert_eq!(
        unclassified["references"][0],
        json!({"name": "NO_CLASSIFICATION_REFERENCE", "numberOfObjects": 1})
    );
}

#[test]
fn full_report_layout() {
    let report = analyze(json!({
        "header": {
            "author": ["A. Architect"],
            "organization": ["Studio"],
            "filename": "house.ifc",
            "schemaVersion": "IFC2X3",
            "originatingSystem": "Modeller 1.0",
            "timeStamp": 1_514_764_800_000i64
        },
        "units": [
            {"unit_type": "LENGTHUNIT", "name": "METRE", "prefix": "MILLI"},
            {"unit_type": "AREAUNIT", "name": "SQUARE_METRE"},
            {"unit_type": "VOLUMEUNIT", "name": "CUBIC_METRE"}
        ],
        "objects": [
            {"id": 1, "type_name": "IfcProject", "name": "House", "global_id": "0001"},
            {"id": 2, "type_name": "IfcSite", "name": "Lot"},
            {"id": 3, "type_name": "IfcBuilding", "name": "Main",
             "address": {"addressLines": ["Main street 1"], "town": "Eindhoven"}},
            {"id": 4, "type_name": "IfcBuildingStorey", "name": "Level 0"},
            {"id": 5, "type_name": "IfcSpace", "name": "Living",
             "geometry": {"primitive_count": 12, "area": 20.0, "volume": 60.0}},
            {"id": 6, "type_name": "IfcZone", "name": "Day"},
            {"id": 7, "type_name": "IfcWallStandardCase",
             "geometry": {"primitive_count": 24, "volume": 2.0},
             "properties": {"psets": 3, "properties": 12, "relations": 4}}
        ],
        "decompositions": [
            {"relating": 1, "related_objects": [2]},
            {"relating": 2, "related_objects": [3]},
            {"relating": 3, "related_objects": [4]},
            {"relating": 4, "related_objects": [5]}
        ],
        "containments": [{"relating": 4, "related_objects": [7]}],
        "group_assignments": [{"relating": 6, "related_objects": [5]}]
    }));

    assert_eq!(report["header"]["author"], json!(["A. Architect"]));
    assert_eq!(report["header"]["authorization"], Value::Null);
    assert_eq!(report["header"]["timeStamp"], 1_514_764_800_000i64);

    let project = &report["project"];
    assert_eq!(project["name"], "House");
    assert_eq!(project["guid"], "0001");
    assert_eq!(
        project["units"][0],
        json!({"unitType": "LENGTHUNIT", "name": "METRE", "prefix": "MILLI"})
    );
    assert_eq!(project["units"][1], json!({"unitType": "AREAUNIT", "name": "SQUARE_METRE"}));

    let building = &project["sites"][0]["buildings"][0];
    assert_eq!(building["address"]["town"], "Eindhoven");
    let storey = &building["storeys"][0];
    assert_eq!(storey["totalNumberOfObjects"], 2);
    assert_eq!(
        storey["spaces"],
        json!([{"name": "Living", "m2": 20.0, "m3": 60.0, "zones": [{"name": "Day"}]}])
    );

    let complete = &report["aggregations"]["completeModel"];
    assert_eq!(complete["totalSpaceM2"], 20.0);
    assert_eq!(complete["totalSpaceM3"], 60.0);
    assert_eq!(complete["totalNrOfObjects"], 5);
    assert_eq!(complete["totalTriangles"], 36);
    assert_eq!(complete["averageAmountOfTrianglesPerM2"], 36.0 / 20.0);

    let most_properties = &report["aggregations"]["topTenMostProperties"][0];
    assert_eq!(most_properties["type"], "IfcWallStandardCase");
    assert_eq!(most_properties["numberOfProperties"], 12);

    assert_eq!(report["checks"], json!({"cubesNearZero": 0, "hasCubeNearZero": false}));
}

#[test]
fn structural_and_feature_leaves_count_as_products() {
    let report = analyze(json!({
        "objects": [
            {"id": 1, "type_name": "IfcWall"},
            {"id": 2, "type_name": "IfcStructuralPointConnection"},
            {"id": 3, "type_name": "IfcElectricDistributionPoint"},
            {"id": 4, "type_name": "IfcChamferEdgeFeature"}
        ]
    }));

    let aggregations = &report["aggregations"];
    assert_eq!(aggregations["perType"].as_object().unwrap().len(), 4);
    assert_eq!(aggregations["completeModel"]["totalNrOfObjects"], 4);

    let materials = report["materials"].as_array().unwrap();
    assert_eq!(materials.last().unwrap(), &json!({"name": "NO_MATERIAL", "nrOfProducts": 4}));
}
