// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Report tree
//!
//! Field names follow the `IFC_ANALYTICS_JSON_1_0` layout. Absent fields
//! mean "not applicable".

use crate::aggregation::{CompleteModel, TypeStats};
use crate::classification::ClassificationNode;
use crate::materials::MaterialNode;
use crate::model::{EntityId, IfcHeader, ModelGraph};
use crate::ranking::{ComplexObjectEntry, PropertyEntry};
use crate::spatial::{BuildingNode, ProjectNode};
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;

/// Output schema identifier
pub const OUTPUT_SCHEMA: &str = "IFC_ANALYTICS_JSON_1_0";

/// `name` and `guid` of a rooted entity, each only when present
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Identity {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub guid: Option<String>,
}

impl Identity {
    pub fn new(name: Option<String>, guid: Option<String>) -> Self {
        Self { name, guid }
    }

    /// Identity of a model object; empty for unknown ids
    pub fn of(model: &dyn ModelGraph, id: EntityId) -> Self {
        match model.object(id) {
            Some(object) => Self::new(object.name.clone(), object.global_id.clone()),
            None => {
                tracing::warn!(id = %id, "Relation points at unknown object");
                Self::default()
            }
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Aggregations {
    pub per_type: BTreeMap<String, TypeStats>,
    pub top_ten_most_complex_objects: Vec<ComplexObjectEntry>,
    pub top_ten_most_properties: Vec<PropertyEntry>,
    pub complete_model: CompleteModel,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Checks {
    /// Verbatim external clash list
    #[serde(skip_serializing_if = "Option::is_none")]
    pub clashes: Option<Value>,
    pub cubes_near_zero: u64,
    /// True exactly when one such cube was found
    pub has_cube_near_zero: bool,
}

impl Checks {
    pub fn new(clashes: Option<Value>, cubes_near_zero: u64) -> Self {
        Self {
            clashes,
            cubes_near_zero,
            has_cube_near_zero: cubes_near_zero == 1,
        }
    }
}

/// The complete analytics result
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct AnalyticsReport {
    pub header: IfcHeader,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project: Option<ProjectNode>,
    /// Flat layout alternative to `project`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub buildings: Option<Vec<BuildingNode>>,
    pub materials: Vec<MaterialNode>,
    pub classifications: Vec<ClassificationNode>,
    pub aggregations: Aggregations,
    pub checks: Checks,
}

impl AnalyticsReport {
    pub fn to_json(&self) -> crate::Result<Value> {
        Ok(serde_json::to_value(self)?)
    }

    pub fn to_json_string(&self) -> crate::Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}
