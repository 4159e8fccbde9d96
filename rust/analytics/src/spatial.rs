// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Spatial Hierarchy Walker
//!
//! project → sites → buildings → storeys → spaces follow decomposition
//! relations; spaces → zones follow group assignments. At every level only
//! children of the expected type are kept.

use crate::metrics::resolve_area;
use crate::model::{EntityId, GeometryProvider, ModelGraph, PostalAddress};
use crate::report::Identity;
use crate::schema::{IFC_BUILDING, IFC_BUILDING_STOREY, IFC_SITE, IFC_SPACE, IFC_ZONE};
use crate::units::{ProjectUnit, UnitContext};
use serde::Serialize;

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectNode {
    #[serde(flatten)]
    pub identity: Identity,
    /// Only present when the project declares units
    #[serde(skip_serializing_if = "Option::is_none")]
    pub units: Option<Vec<UnitNode>>,
    pub sites: Vec<SiteNode>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UnitNode {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prefix: Option<String>,
}

impl From<&ProjectUnit> for UnitNode {
    fn from(unit: &ProjectUnit) -> Self {
        Self {
            unit_type: unit.unit_type.clone(),
            name: unit.name.clone(),
            prefix: unit.prefix.clone(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SiteNode {
    #[serde(flatten)]
    pub identity: Identity,
    pub buildings: Vec<BuildingNode>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct BuildingNode {
    #[serde(flatten)]
    pub identity: Identity,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<PostalAddress>,
    pub storeys: Vec<StoreyNode>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreyNode {
    #[serde(flatten)]
    pub identity: Identity,
    pub total_number_of_objects: u64,
    pub spaces: Vec<SpaceNode>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SpaceNode {
    #[serde(flatten)]
    pub identity: Identity,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub m2: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub m3: Option<f64>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub zones: Vec<ZoneNode>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ZoneNode {
    #[serde(flatten)]
    pub identity: Identity,
}

/// Top-down walk over one model
pub struct SpatialWalker<'a> {
    model: &'a dyn ModelGraph,
    geometry: &'a dyn GeometryProvider,
    units: UnitContext,
}

impl<'a> SpatialWalker<'a> {
    pub fn new(model: &'a dyn ModelGraph, geometry: &'a dyn GeometryProvider, units: UnitContext) -> Self {
        Self {
            model,
            geometry,
            units,
        }
    }

    /// The first project and everything below it; `None` without a project
    pub fn project(&self) -> Option<ProjectNode> {
        let project = self.model.project()?;
        let units = self
            .model
            .project_units()
            .map(|units| units.iter().map(UnitNode::from).collect());

        Some(ProjectNode {
            identity: Identity::of(self.model, project.id),
            units,
            sites: self
                .children_of_type(project.id, IFC_SITE)
                .into_iter()
                .map(|site| self.site(site))
                .collect(),
        })
    }

    /// Every building of every site, in walk order
    pub fn buildings(&self) -> Option<Vec<BuildingNode>> {
        self.project()
            .map(|project| project.sites.into_iter().flat_map(|site| site.buildings).collect())
    }

    fn site(&self, id: EntityId) -> SiteNode {
        SiteNode {
            identity: Identity::of(self.model, id),
            buildings: self
                .children_of_type(id, IFC_BUILDING)
                .into_iter()
                .map(|building| self.building(building))
                .collect(),
        }
    }

    fn building(&self, id: EntityId) -> BuildingNode {
        BuildingNode {
            identity: Identity::of(self.model, id),
            address: self.model.building_address(id).cloned(),
            storeys: self
                .children_of_type(id, IFC_BUILDING_STOREY)
                .into_iter()
                .map(|storey| self.storey(storey))
                .collect(),
        }
    }

    fn storey(&self, id: EntityId) -> StoreyNode {
        StoreyNode {
            identity: Identity::of(self.model, id),
            total_number_of_objects: self.model.count_decomposed(id) as u64,
            spaces: self
                .children_of_type(id, IFC_SPACE)
                .into_iter()
                .map(|space| self.space(space))
                .collect(),
        }
    }

    fn space(&self, id: EntityId) -> SpaceNode {
        let geometry = self.geometry.geometry(id);
        let zones = self
            .model
            .group_assignments(id)
            .iter()
            .filter(|group| self.model.is_instance_of(**group, IFC_ZONE))
            .map(|zone| ZoneNode {
                identity: Identity::of(self.model, *zone),
            })
            .collect();

        SpaceNode {
            identity: Identity::of(self.model, id),
            m2: geometry.map(|g| self.units.to_square_metres(resolve_area(g))),
            m3: geometry.map(|g| self.units.to_cubic_metres(g.volume)),
            zones,
        }
    }

    fn children_of_type(&self, parent: EntityId, type_name: &str) -> Vec<EntityId> {
        self.model
            .decomposed_by(parent)
            .iter()
            .copied()
            .filter(|child| {
                let matches = self.model.is_instance_of(*child, type_name);
                if !matches {
                    tracing::debug!(parent = %parent, child = %child, expected = type_name, "Skipping child of unexpected type");
                }
                matches
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snapshot::ModelSnapshot;
    use approx::assert_relative_eq;

    const MODEL: &str = r#"{
        "units": [
            {"unit_type": "LENGTHUNIT", "name": "METRE", "prefix": "MILLI"},
            {"unit_type": "AREAUNIT", "name": "SQUARE_METRE"},
            {"unit_type": "VOLUMEUNIT", "name": "CUBIC_METRE"}
        ],
        "objects": [
            {"id": 1, "type_name": "IfcProject", "name": "Tower", "global_id": "p-1"},
            {"id": 2, "type_name": "IfcSite", "name": "Plot"},
            {"id": 3, "type_name": "IfcBuilding", "name": "A", "address": {"town": "Utrecht"}},
            {"id": 4, "type_name": "IfcBuildingStorey", "name": "Ground"},
            {"id": 5, "type_name": "IfcSpace", "name": "Hall",
             "geometry": {"area": 30.0, "volume": 90.0,
                          "additional_data": "{\"SURFACE_AREA_ALONG_Z\": 25.0}"}},
            {"id": 6, "type_name": "IfcSpace", "name": "Shaft"},
            {"id": 7, "type_name": "IfcZone", "name": "Public"},
            {"id": 8, "type_name": "IfcGroup", "name": "Other"},
            {"id": 9, "type_name": "IfcWall"},
            {"id": 10, "type_name": "IfcBuilding", "name": "B"}
        ],
        "decompositions": [
            {"relating": 1, "related_objects": [2]},
            {"relating": 2, "related_objects": [3, 10]},
            {"relating": 3, "related_objects": [4]},
            {"relating": 4, "related_objects": [5, 6, 9]}
        ],
        "containments": [{"relating": 4, "related_objects": [9]}],
        "group_assignments": [
            {"relating": 7, "related_objects": [5]},
            {"relating": 8, "related_objects": [5, 6]}
        ]
    }"#;

    fn walk() -> ProjectNode {
        let snapshot = ModelSnapshot::from_json_str(MODEL).unwrap();
        SpatialWalker::new(&snapshot, &snapshot, snapshot.units())
            .project()
            .unwrap()
    }

    #[test]
    fn test_walk_structure() {
        let project = walk();
        assert_eq!(project.identity.name.as_deref(), Some("Tower"));
        assert_eq!(project.identity.guid.as_deref(), Some("p-1"));
        assert_eq!(project.units.as_ref().map(Vec::len), Some(3));

        let buildings = &project.sites[0].buildings;
        assert_eq!(buildings.len(), 2);
        assert_eq!(
            buildings[0].address.as_ref().and_then(|a| a.town.as_deref()),
            Some("Utrecht")
        );

        let storey = &buildings[0].storeys[0];
        assert_eq!(storey.total_number_of_objects, 3);
        // The wall is decomposed under the storey but is not a space
        assert_eq!(storey.spaces.len(), 2);
    }

    #[test]
    fn test_space_metrics_and_zones() {
        let project = walk();
        let spaces = &project.sites[0].buildings[0].storeys[0].spaces;

        let hall = &spaces[0];
        assert_relative_eq!(hall.m2.unwrap(), 25.0);
        assert_relative_eq!(hall.m3.unwrap(), 90.0);
        assert_eq!(hall.zones.len(), 1);
        assert_eq!(hall.zones[0].identity.name.as_deref(), Some("Public"));

        let shaft = &spaces[1];
        assert!(shaft.m2.is_none());
        assert!(shaft.zones.is_empty());
        let json = serde_json::to_value(shaft).unwrap();
        assert_eq!(json, serde_json::json!({"name": "Shaft"}));
    }

    #[test]
    fn test_flat_buildings_layout() {
        let snapshot = ModelSnapshot::from_json_str(MODEL).unwrap();
        let walker = SpatialWalker::new(&snapshot, &snapshot, snapshot.units());
        let buildings = walker.buildings().unwrap();
        let names: Vec<_> = buildings.iter().map(|b| b.identity.name.as_deref()).collect();
        assert_eq!(names, vec![Some("A"), Some("B")]);
    }

    #[test]
    fn test_no_project() {
        let snapshot = ModelSnapshot::from_json_str(r#"{"objects": [{"id": 1, "type_name": "IfcWall"}]}"#).unwrap();
        let walker = SpatialWalker::new(&snapshot, &snapshot, snapshot.units());
        assert!(walker.project().is_none());
        assert!(walker.buildings().is_none());
    }

    #[test]
    fn test_units_only_when_declared() {
        let snapshot = ModelSnapshot::from_json_str(
            r#"{"objects": [{"id": 1, "type_name": "IfcProject"}]}"#,
        )
        .unwrap();
        let project = SpatialWalker::new(&snapshot, &snapshot, snapshot.units())
            .project()
            .unwrap();
        let json = serde_json::to_value(&project).unwrap();
        assert!(json.get("units").is_none());
        assert_eq!(json["sites"], serde_json::json!([]));
    }
}
