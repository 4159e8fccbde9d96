// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Read-only model abstractions consumed by the analytics engine
//!
//! The engine never owns the model graph. It borrows it through the traits
//! in this module for the duration of one run:
//!
//! - [`ModelGraph`] - entity lookup, type queries and relation navigation
//! - [`GeometryProvider`] - per-object geometry summaries
//! - [`PropertyStatsProvider`] - property set / property / relation counts
//!
//! [`crate::ModelSnapshot`] implements all three over an in-memory graph.

use crate::units::{ProjectUnit, UnitContext};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Type-safe entity identifier
///
/// Wraps the raw IFC entity ID (e.g., #123 becomes EntityId(123))
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Debug, Default, Serialize, Deserialize)]
pub struct EntityId(pub u32);

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

impl From<u32> for EntityId {
    fn from(id: u32) -> Self {
        EntityId(id)
    }
}

/// One node of the model graph
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ModelObject {
    pub id: EntityId,
    /// IFC GlobalId
    #[serde(default)]
    pub global_id: Option<String>,
    /// Concrete IFC type name (e.g., "IfcWall")
    pub type_name: String,
    #[serde(default)]
    pub name: Option<String>,
}

/// Axis-aligned bounds in millimetres
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct BoundsMm {
    pub min: [f64; 3],
    pub max: [f64; 3],
}

impl BoundsMm {
    /// The six extreme coordinates, min corner first
    pub fn extremes(&self) -> [f64; 6] {
        [
            self.min[0],
            self.min[1],
            self.min[2],
            self.max[0],
            self.max[1],
            self.max[2],
        ]
    }
}

/// Geometry summary produced by the geometry engine for one object
///
/// Area and volume are in the model's declared units. `additional_data`
/// is the engine's raw JSON metadata payload, which may carry
/// `WALKABLE_SURFACE_AREA` or `SURFACE_AREA_ALONG_Z` overrides.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct GeometrySummary {
    #[serde(default)]
    pub primitive_count: u64,
    #[serde(default)]
    pub area: f64,
    #[serde(default)]
    pub volume: f64,
    #[serde(default)]
    pub additional_data: Option<String>,
    /// Flat xyz triples in the declared length unit
    #[serde(default)]
    pub vertices: Option<Vec<f32>>,
    #[serde(default)]
    pub bounds_mm: Option<BoundsMm>,
}

/// Property statistics for one object
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PropertyStats {
    pub psets: u64,
    pub properties: u64,
    pub relations: u64,
}

/// STEP file header, passed through to the report verbatim
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct IfcHeader {
    pub author: Vec<String>,
    pub authorization: Option<String>,
    pub description: Vec<String>,
    pub filename: Option<String>,
    pub schema_version: Option<String>,
    pub implementation_level: Option<String>,
    pub organization: Vec<String>,
    pub originating_system: Option<String>,
    pub pre_processor_version: Option<String>,
    /// Milliseconds since the Unix epoch
    pub time_stamp: Option<i64>,
}

/// Postal address of a building
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PostalAddress {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub address_lines: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub postal_box: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub town: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub postal_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
}

/// IfcCalendarDate
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CalendarDate {
    pub year: i32,
    pub month: u32,
    pub day: u32,
}

/// IfcClassification
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Classification {
    pub id: EntityId,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub edition: Option<String>,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub edition_date: Option<CalendarDate>,
}

/// IfcClassificationReference (or a subtype)
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ClassificationReference {
    pub id: EntityId,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub item_reference: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    /// The owning IfcClassification
    #[serde(default)]
    pub referenced_source: Option<EntityId>,
}

/// Target of a classification association
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ClassificationSelect {
    Reference { id: EntityId },
    /// Notations and other selectors, not counted
    Unrecognized { type_name: String },
}

/// IfcRelAssociatesClassification
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ClassificationAssociation {
    pub relating: ClassificationSelect,
    pub related_objects: Vec<EntityId>,
}

/// IfcMaterial
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Material {
    pub id: EntityId,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub global_id: Option<String>,
}

/// One layer of a layer set
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MaterialLayer {
    #[serde(default)]
    pub material: Option<EntityId>,
    #[serde(default)]
    pub thickness: Option<f64>,
}

/// IfcMaterialLayerSet
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MaterialLayerSet {
    pub id: EntityId,
    #[serde(default)]
    pub name: Option<String>,
    pub layers: Vec<MaterialLayer>,
}

/// Target of a material association
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MaterialSelect {
    #[serde(rename = "material")]
    DirectMaterial { id: EntityId },
    /// IfcMaterialLayerSetUsage pointing at a layer set
    #[serde(rename = "layer_set_usage")]
    LayeredUsage { layer_set: EntityId },
    Unrecognized { type_name: String },
}

/// IfcRelAssociatesMaterial
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MaterialAssociation {
    pub relating: MaterialSelect,
    pub related_objects: Vec<EntityId>,
}

/// Read-only access to the model graph
///
/// The model is thread-safe (`Send + Sync`) so per-type aggregation can run
/// on a worker pool.
pub trait ModelGraph: Send + Sync {
    /// Get object by ID
    fn object(&self, id: EntityId) -> Option<&ModelObject>;

    /// Declared units for this model
    fn units(&self) -> UnitContext;

    /// Instances whose concrete type is exactly `type_name`
    fn instances_of_type(&self, type_name: &str) -> &[EntityId];

    /// Every known type that is `type_name` itself or one of its
    /// (indirect) subtypes, sorted by name
    fn subtypes_of(&self, type_name: &str) -> Vec<String>;

    /// Whether `type_name` equals or derives from `ancestor`
    fn is_subtype_of(&self, type_name: &str, ancestor: &str) -> bool;

    /// Instances of `type_name` including all subtypes
    fn instances_with_subtypes(&self, type_name: &str) -> Vec<EntityId> {
        self.subtypes_of(type_name)
            .iter()
            .flat_map(|t| self.instances_of_type(t).iter().copied())
            .collect()
    }

    /// Whether the object exists and is an instance of `ancestor`
    fn is_instance_of(&self, id: EntityId, ancestor: &str) -> bool {
        self.object(id)
            .map(|o| self.is_subtype_of(&o.type_name, ancestor))
            .unwrap_or(false)
    }

    /// The first IfcProject, if any
    fn project(&self) -> Option<&ModelObject> {
        self.instances_of_type(crate::schema::IFC_PROJECT)
            .first()
            .and_then(|id| self.object(*id))
    }

    /// Units declared on the project (UnitsInContext)
    fn project_units(&self) -> Option<&[ProjectUnit]>;

    /// Direct children through decomposition relations, in relation order
    fn decomposed_by(&self, id: EntityId) -> &[EntityId];

    /// Groups the object is assigned to
    fn group_assignments(&self, id: EntityId) -> &[EntityId];

    /// Total number of objects transitively decomposed under `id`
    fn count_decomposed(&self, id: EntityId) -> usize;

    fn building_address(&self, id: EntityId) -> Option<&PostalAddress>;

    fn classifications(&self) -> &[Classification];

    /// All classification references, including subtypes
    fn classification_references(&self) -> &[ClassificationReference];

    fn classification_associations(&self) -> &[ClassificationAssociation];

    fn materials(&self) -> &[Material];

    fn material_layer_set(&self, id: EntityId) -> Option<&MaterialLayerSet>;

    fn material_associations(&self) -> &[MaterialAssociation];
}

/// Borrowed collaborators for one analysis run
#[derive(Clone, Copy)]
pub struct AnalysisInput<'a> {
    pub model: &'a dyn ModelGraph,
    pub geometry: &'a dyn GeometryProvider,
    pub properties: &'a dyn PropertyStatsProvider,
    pub header: &'a IfcHeader,
}

/// Geometry summaries, absent for non-geometric objects
pub trait GeometryProvider: Send + Sync {
    fn geometry(&self, id: EntityId) -> Option<&GeometrySummary>;
}

/// Property set statistics, treated as a black box
pub trait PropertyStatsProvider: Send + Sync {
    fn property_stats(&self, id: EntityId) -> PropertyStats;
}
