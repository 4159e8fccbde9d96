// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Type Aggregator
//!
//! Walks every concrete product type once. Each type yields an independent
//! partial (per-type stats, its object records, its share of the global
//! totals), so types are mapped on the rayon pool and the partials reduced
//! sequentially in type-name order. Totals and record order are therefore
//! identical between parallel and sequential runs.

use crate::heuristics::is_unit_cube_near_origin;
use crate::metrics::ObjectMetrics;
use crate::model::AnalysisInput;
use crate::ranking::ObjectRecord;
use crate::schema::{IFC_PRODUCT, IFC_SPACE};
use crate::units::UnitContext;
use rayon::prelude::*;
use serde::Serialize;
use std::collections::BTreeMap;

/// `aggregations.perType` entry
///
/// Averages use truncating integer division.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TypeStats {
    pub number_of_objects: u64,
    /// Only present when the type has any triangles
    #[serde(skip_serializing_if = "Option::is_none")]
    pub average_number_of_triangles: Option<u64>,
    pub average_number_of_psets: u64,
    pub average_number_of_properties: u64,
    pub average_number_of_relations: u64,
}

/// Running sums shared by all types
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Totals {
    pub objects: u64,
    pub triangles: u64,
    pub properties: u64,
    pub psets: u64,
    pub relations: u64,
    pub space_m2: f64,
    pub space_m3: f64,
    pub cubes_near_zero: u64,
}

impl Totals {
    fn merge(&mut self, other: &Totals) {
        self.objects += other.objects;
        self.triangles += other.triangles;
        self.properties += other.properties;
        self.psets += other.psets;
        self.relations += other.relations;
        self.space_m2 += other.space_m2;
        self.space_m3 += other.space_m3;
        self.cubes_near_zero += other.cubes_near_zero;
    }
}

/// `aggregations.completeModel`
///
/// Ratios are omitted unless their denominator is non-zero and the result
/// is finite.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompleteModel {
    pub total_triangles: u64,
    #[serde(rename = "totalSpaceM2")]
    pub total_space_m2: f64,
    #[serde(rename = "totalSpaceM3")]
    pub total_space_m3: f64,
    pub total_nr_of_objects: u64,
    pub total_nr_of_properties: u64,
    pub total_nr_of_psets: u64,
    pub total_nr_of_relations: u64,
    #[serde(rename = "averageNrOfObjectsPerM3", skip_serializing_if = "Option::is_none")]
    pub average_nr_of_objects_per_m3: Option<f64>,
    #[serde(rename = "averageAmountOfTrianglesPerM3", skip_serializing_if = "Option::is_none")]
    pub average_amount_of_triangles_per_m3: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub average_nr_of_properties_per_object: Option<f64>,
    #[serde(rename = "averageAmountOfTrianglesPerM2", skip_serializing_if = "Option::is_none")]
    pub average_amount_of_triangles_per_m2: Option<f64>,
}

fn finite_ratio(numerator: f64, denominator: f64) -> Option<f64> {
    if denominator == 0.0 {
        return None;
    }
    let ratio = numerator / denominator;
    ratio.is_finite().then_some(ratio)
}

impl From<&Totals> for CompleteModel {
    fn from(totals: &Totals) -> Self {
        Self {
            total_triangles: totals.triangles,
            total_space_m2: totals.space_m2,
            total_space_m3: totals.space_m3,
            total_nr_of_objects: totals.objects,
            total_nr_of_properties: totals.properties,
            total_nr_of_psets: totals.psets,
            total_nr_of_relations: totals.relations,
            average_nr_of_objects_per_m3: finite_ratio(totals.objects as f64, totals.space_m3),
            average_amount_of_triangles_per_m3: finite_ratio(
                totals.triangles as f64,
                totals.space_m3,
            ),
            average_nr_of_properties_per_object: finite_ratio(
                totals.properties as f64,
                totals.objects as f64,
            ),
            average_amount_of_triangles_per_m2: finite_ratio(
                totals.triangles as f64,
                totals.space_m2,
            ),
        }
    }
}

/// Output of the type pass
#[derive(Clone, Debug, Default)]
pub struct TypeAggregation {
    /// Sorted by type name
    pub per_type: BTreeMap<String, TypeStats>,
    /// One record per object, grouped by type in type-name order
    pub records: Vec<ObjectRecord>,
    pub totals: Totals,
}

struct TypePartial {
    type_name: String,
    stats: TypeStats,
    records: Vec<ObjectRecord>,
    totals: Totals,
}

/// Aggregate every product type that has at least one instance
pub fn aggregate_types(input: &AnalysisInput<'_>, units: &UnitContext, parallel: bool) -> TypeAggregation {
    let types = input.model.subtypes_of(IFC_PRODUCT);

    let partials: Vec<TypePartial> = if parallel {
        types
            .par_iter()
            .filter_map(|type_name| aggregate_type(input, units, type_name))
            .collect()
    } else {
        types
            .iter()
            .filter_map(|type_name| aggregate_type(input, units, type_name))
            .collect()
    };

    // `types` is sorted and both collects preserve order
    let mut aggregation = TypeAggregation::default();
    for partial in partials {
        aggregation.totals.merge(&partial.totals);
        aggregation.records.extend(partial.records);
        aggregation.per_type.insert(partial.type_name, partial.stats);
    }

    tracing::debug!(
        types = aggregation.per_type.len(),
        objects = aggregation.totals.objects,
        triangles = aggregation.totals.triangles,
        cubes_near_zero = aggregation.totals.cubes_near_zero,
        "Aggregated product types"
    );

    aggregation
}

fn aggregate_type(
    input: &AnalysisInput<'_>,
    units: &UnitContext,
    type_name: &str,
) -> Option<TypePartial> {
    let instances = input.model.instances_of_type(type_name);
    if instances.is_empty() {
        return None;
    }

    let is_space = type_name == IFC_SPACE;
    let mut totals = Totals {
        objects: instances.len() as u64,
        ..Default::default()
    };
    let mut records = Vec::with_capacity(instances.len());

    for &id in instances {
        let geometry = input.geometry.geometry(id);
        let metrics = ObjectMetrics::build(geometry, input.properties.property_stats(id), units);

        if let Some(geometry) = geometry {
            if is_unit_cube_near_origin(geometry, units) {
                totals.cubes_near_zero += 1;
            }
            if is_space {
                totals.space_m2 += metrics.area_m2;
                totals.space_m3 += metrics.volume_m3;
            }
        }

        totals.triangles += metrics.triangles;
        totals.psets += metrics.psets;
        totals.properties += metrics.properties;
        totals.relations += metrics.relations;

        let object = input.model.object(id);
        records.push(ObjectRecord {
            id,
            type_name: type_name.to_string(),
            name: object.and_then(|o| o.name.clone()),
            global_id: object.and_then(|o| o.global_id.clone()),
            triangles: metrics.triangles,
            volume_m3: metrics.volume_m3,
            properties: metrics.properties,
        });
    }

    let count = totals.objects;
    let stats = TypeStats {
        number_of_objects: count,
        average_number_of_triangles: (totals.triangles > 0).then(|| totals.triangles / count),
        average_number_of_psets: totals.psets / count,
        average_number_of_properties: totals.properties / count,
        average_number_of_relations: totals.relations / count,
    };

    Some(TypePartial {
        type_name: type_name.to_string(),
        stats,
        records,
        totals,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snapshot::ModelSnapshot;
    use approx::assert_relative_eq;

    const MODEL: &str = r#"{
        "objects": [
            {"id": 1, "type_name": "IfcWall", "geometry": {"primitive_count": 10, "volume": 2.0},
             "properties": {"psets": 1, "properties": 3, "relations": 1}},
            {"id": 2, "type_name": "IfcWall", "geometry": {"primitive_count": 15, "volume": 3.0},
             "properties": {"psets": 2, "properties": 4, "relations": 2}},
            {"id": 3, "type_name": "IfcDoor",
             "properties": {"psets": 0, "properties": 1, "relations": 0}},
            {"id": 4, "type_name": "IfcSpace",
             "geometry": {"primitive_count": 12, "area": 50.0, "volume": 150.0,
                          "additional_data": "{\"WALKABLE_SURFACE_AREA\": 40.0}"}},
            {"id": 5, "type_name": "IfcProject"}
        ]
    }"#;

    fn aggregate(parallel: bool) -> TypeAggregation {
        let snapshot = ModelSnapshot::from_json_str(MODEL).unwrap();
        let input = snapshot.input();
        aggregate_types(&input, &input.model.units(), parallel)
    }

    #[test]
    fn test_per_type_stats() {
        let aggregation = aggregate(false);
        assert_eq!(
            aggregation.per_type.keys().collect::<Vec<_>>(),
            vec!["IfcDoor", "IfcSpace", "IfcWall"]
        );

        let walls = &aggregation.per_type["IfcWall"];
        assert_eq!(walls.number_of_objects, 2);
        // (10 + 15) / 2 truncates to 12
        assert_eq!(walls.average_number_of_triangles, Some(12));
        assert_eq!(walls.average_number_of_psets, 1);
        assert_eq!(walls.average_number_of_properties, 3);

        let doors = &aggregation.per_type["IfcDoor"];
        assert_eq!(doors.average_number_of_triangles, None);
        assert_eq!(doors.average_number_of_properties, 1);
    }

    #[test]
    fn test_totals_and_space_area() {
        let aggregation = aggregate(false);
        let totals = aggregation.totals;
        assert_eq!(totals.objects, 4);
        assert_eq!(totals.triangles, 37);
        assert_eq!(totals.properties, 8);
        assert_relative_eq!(totals.space_m2, 40.0);
        assert_relative_eq!(totals.space_m3, 150.0);
        assert_eq!(aggregation.records.len(), 4);

        let model = CompleteModel::from(&totals);
        assert_relative_eq!(model.average_nr_of_properties_per_object.unwrap(), 2.0);
        assert_relative_eq!(model.average_amount_of_triangles_per_m2.unwrap(), 37.0 / 40.0);
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let sequential = aggregate(false);
        let parallel = aggregate(true);
        assert_eq!(sequential.per_type, parallel.per_type);
        assert_eq!(sequential.totals, parallel.totals);
        assert_eq!(sequential.records, parallel.records);
    }

    #[test]
    fn test_ratios_omitted_without_denominator() {
        let model = CompleteModel::from(&Totals::default());
        assert!(model.average_nr_of_objects_per_m3.is_none());
        assert!(model.average_nr_of_properties_per_object.is_none());
        assert!(model.average_amount_of_triangles_per_m2.is_none());

        let json = serde_json::to_value(&model).unwrap();
        assert_eq!(json["totalNrOfObjects"], 0);
        assert!(json.get("averageNrOfObjectsPerM3").is_none());
        assert!(json.get("totalSpaceM3").is_some());
    }

    #[test]
    fn test_tiny_denominator_is_suppressed() {
        let totals = Totals {
            triangles: 10,
            space_m3: f64::MIN_POSITIVE / 1e10,
            ..Default::default()
        };
        let model = CompleteModel::from(&totals);
        assert!(model.average_amount_of_triangles_per_m3.is_none());
    }
}
