// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! ModelSnapshot - in-memory model implementing the accessor traits
//!
//! A snapshot is the JSON interchange form of an already-loaded model. It is
//! indexed once on construction (type index, relation indices, id lookups)
//! and immutable afterwards, so it can be shared across rayon workers.

use crate::error::{Error, Result};
use crate::model::{
    AnalysisInput, Classification, ClassificationAssociation, ClassificationReference, EntityId,
    GeometryProvider, GeometrySummary, IfcHeader, Material, MaterialAssociation, MaterialLayerSet,
    ModelGraph, ModelObject, PostalAddress, PropertyStats, PropertyStatsProvider,
};
use crate::schema::TypeHierarchy;
use crate::units::{ProjectUnit, UnitContext};
use rustc_hash::{FxHashMap, FxHashSet};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::io::Read;
use std::path::Path;

/// One object as it appears in a snapshot document
#[derive(Clone, Debug, Deserialize)]
pub struct SnapshotObject {
    #[serde(flatten)]
    pub object: ModelObject,
    #[serde(default)]
    pub geometry: Option<GeometrySummary>,
    #[serde(default)]
    pub properties: PropertyStats,
    /// Building address, only meaningful for buildings
    #[serde(default)]
    pub address: Option<PostalAddress>,
}

/// A one-to-many relation (decomposition, containment, group assignment)
#[derive(Clone, Debug, Deserialize)]
pub struct SnapshotRelation {
    pub relating: EntityId,
    pub related_objects: Vec<EntityId>,
}

/// Raw snapshot document
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct SnapshotData {
    pub header: IfcHeader,
    /// Project unit assignment; absent when the project declares none
    pub units: Option<Vec<ProjectUnit>>,
    /// Extra (type, direct supertype) pairs for custom or newer-schema types
    pub supertypes: BTreeMap<String, String>,
    pub objects: Vec<SnapshotObject>,
    pub decompositions: Vec<SnapshotRelation>,
    /// Spatial containment (spatial element -> contained elements)
    pub containments: Vec<SnapshotRelation>,
    /// Group assignments (group -> assigned objects)
    pub group_assignments: Vec<SnapshotRelation>,
    pub classifications: Vec<Classification>,
    pub classification_references: Vec<ClassificationReference>,
    pub classification_associations: Vec<ClassificationAssociation>,
    pub materials: Vec<Material>,
    pub material_layer_sets: Vec<MaterialLayerSet>,
    pub material_associations: Vec<MaterialAssociation>,
}

/// Indexed, immutable model
#[derive(Clone, Debug, Deserialize)]
#[serde(try_from = "SnapshotData")]
pub struct ModelSnapshot {
    header: IfcHeader,
    hierarchy: TypeHierarchy,
    units: UnitContext,
    project_units: Option<Vec<ProjectUnit>>,
    objects: FxHashMap<EntityId, ModelObject>,
    by_type: FxHashMap<String, Vec<EntityId>>,
    geometry: FxHashMap<EntityId, GeometrySummary>,
    properties: FxHashMap<EntityId, PropertyStats>,
    addresses: FxHashMap<EntityId, PostalAddress>,
    decomposed_by: FxHashMap<EntityId, Vec<EntityId>>,
    contains: FxHashMap<EntityId, Vec<EntityId>>,
    /// Object -> groups it is assigned to
    assigned_to: FxHashMap<EntityId, Vec<EntityId>>,
    classifications: Vec<Classification>,
    classification_references: Vec<ClassificationReference>,
    classification_associations: Vec<ClassificationAssociation>,
    materials: Vec<Material>,
    layer_sets: FxHashMap<EntityId, MaterialLayerSet>,
    material_associations: Vec<MaterialAssociation>,
}

impl TryFrom<SnapshotData> for ModelSnapshot {
    type Error = Error;

    fn try_from(data: SnapshotData) -> Result<Self> {
        let mut hierarchy = TypeHierarchy::ifc2x3();
        hierarchy.extend(
            data.supertypes
                .iter()
                .map(|(t, s)| (t.as_str(), s.as_str())),
        );

        let object_count = data.objects.len();
        let mut objects = FxHashMap::with_capacity_and_hasher(object_count, Default::default());
        let mut by_type: FxHashMap<String, Vec<EntityId>> = FxHashMap::default();
        let mut geometry = FxHashMap::default();
        let mut properties = FxHashMap::with_capacity_and_hasher(object_count, Default::default());
        let mut addresses = FxHashMap::default();

        for entry in data.objects {
            let SnapshotObject {
                mut object,
                geometry: object_geometry,
                properties: stats,
                address,
            } = entry;
            let id = object.id;
            if objects.contains_key(&id) {
                return Err(Error::DuplicateEntity(id));
            }

            object.type_name = hierarchy.register(&object.type_name);
            by_type.entry(object.type_name.clone()).or_default().push(id);

            if let Some(g) = object_geometry {
                geometry.insert(id, g);
            }
            properties.insert(id, stats);
            if let Some(a) = address {
                addresses.insert(id, a);
            }
            objects.insert(id, object);
        }

        let mut unresolved: Vec<&str> = by_type
            .keys()
            .map(String::as_str)
            .filter(|name| hierarchy.supertype(name).is_none())
            .collect();
        if !unresolved.is_empty() {
            unresolved.sort_unstable();
            tracing::warn!(
                types = ?unresolved,
                "Object types without a known supertype are not counted as products"
            );
        }

        let units = data
            .units
            .as_deref()
            .map(UnitContext::from_project_units)
            .unwrap_or_default();

        let mut assigned_to: FxHashMap<EntityId, Vec<EntityId>> = FxHashMap::default();
        for rel in &data.group_assignments {
            for object in &rel.related_objects {
                assigned_to.entry(*object).or_default().push(rel.relating);
            }
        }

        let layer_sets = data
            .material_layer_sets
            .into_iter()
            .map(|set| (set.id, set))
            .collect();

        tracing::debug!(
            objects = objects.len(),
            types = by_type.len(),
            with_geometry = geometry.len(),
            "Indexed model snapshot"
        );

        Ok(Self {
            header: data.header,
            hierarchy,
            units,
            project_units: data.units,
            objects,
            by_type,
            geometry,
            properties,
            addresses,
            decomposed_by: index_relations(data.decompositions),
            contains: index_relations(data.containments),
            assigned_to,
            classifications: data.classifications,
            classification_references: data.classification_references,
            classification_associations: data.classification_associations,
            materials: data.materials,
            layer_sets,
            material_associations: data.material_associations,
        })
    }
}

/// relating -> related, keeping relation order
fn index_relations(relations: Vec<SnapshotRelation>) -> FxHashMap<EntityId, Vec<EntityId>> {
    let mut index: FxHashMap<EntityId, Vec<EntityId>> = FxHashMap::default();
    for rel in relations {
        index.entry(rel.relating).or_default().extend(rel.related_objects);
    }
    index
}

impl ModelSnapshot {
    /// Parse and index a snapshot from a JSON string
    pub fn from_json_str(json: &str) -> Result<Self> {
        let data: SnapshotData = serde_json::from_str(json)?;
        Self::try_from(data)
    }

    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        let data: SnapshotData = serde_json::from_slice(bytes)?;
        Self::try_from(data)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let data: SnapshotData = serde_json::from_reader(reader)?;
        Self::try_from(data)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(std::io::BufReader::new(file))
    }

    pub fn header(&self) -> &IfcHeader {
        &self.header
    }

    pub fn object_count(&self) -> usize {
        self.objects.len()
    }

    /// Borrow this snapshot as every collaborator of an analysis run
    pub fn input(&self) -> AnalysisInput<'_> {
        AnalysisInput {
            model: self,
            geometry: self,
            properties: self,
            header: &self.header,
        }
    }
}

impl ModelGraph for ModelSnapshot {
    fn object(&self, id: EntityId) -> Option<&ModelObject> {
        self.objects.get(&id)
    }

    fn units(&self) -> UnitContext {
        self.units
    }

    fn instances_of_type(&self, type_name: &str) -> &[EntityId] {
        let canonical = self.hierarchy.canonical_name(type_name).unwrap_or(type_name);
        self.by_type
            .get(canonical)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    fn subtypes_of(&self, type_name: &str) -> Vec<String> {
        self.hierarchy.subtypes_of(type_name)
    }

    fn is_subtype_of(&self, type_name: &str, ancestor: &str) -> bool {
        self.hierarchy.is_subtype_of(type_name, ancestor)
    }

    fn project_units(&self) -> Option<&[ProjectUnit]> {
        self.project_units.as_deref()
    }

    fn decomposed_by(&self, id: EntityId) -> &[EntityId] {
        self.decomposed_by
            .get(&id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    fn group_assignments(&self, id: EntityId) -> &[EntityId] {
        self.assigned_to.get(&id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Transitive decomposition plus spatial containment, each object once
    fn count_decomposed(&self, id: EntityId) -> usize {
        let mut visited = FxHashSet::default();
        visited.insert(id);
        let mut stack = vec![id];
        let mut count = 0;

        while let Some(current) = stack.pop() {
            let children = self.decomposed_by(current).iter().chain(
                self.contains
                    .get(&current)
                    .map(Vec::as_slice)
                    .unwrap_or(&[]),
            );
            for child in children {
                if visited.insert(*child) {
                    count += 1;
                    stack.push(*child);
                }
            }
        }

        count
    }

    fn building_address(&self, id: EntityId) -> Option<&PostalAddress> {
        self.addresses.get(&id)
    }

    fn classifications(&self) -> &[Classification] {
        &self.classifications
    }

    fn classification_references(&self) -> &[ClassificationReference] {
        &self.classification_references
    }

    fn classification_associations(&self) -> &[ClassificationAssociation] {
        &self.classification_associations
    }

    fn materials(&self) -> &[Material] {
        &self.materials
    }

    fn material_layer_set(&self, id: EntityId) -> Option<&MaterialLayerSet> {
        self.layer_sets.get(&id)
    }

    fn material_associations(&self) -> &[MaterialAssociation] {
        &self.material_associations
    }
}

impl GeometryProvider for ModelSnapshot {
    fn geometry(&self, id: EntityId) -> Option<&GeometrySummary> {
        self.geometry.get(&id)
    }
}

impl PropertyStatsProvider for ModelSnapshot {
    fn property_stats(&self, id: EntityId) -> PropertyStats {
        self.properties.get(&id).copied().unwrap_or_default()
    }
}
