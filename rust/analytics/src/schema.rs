// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Product type hierarchy
//!
//! The engine only needs the `IfcProduct` subtree of the schema: which
//! concrete types count as products, and which spatial types a walk should
//! descend into. The built-in table follows IFC2X3; snapshots can register
//! further types with [`TypeHierarchy::extend`].

use rustc_hash::FxHashMap;

pub const IFC_PRODUCT: &str = "IfcProduct";
pub const IFC_PROJECT: &str = "IfcProject";
pub const IFC_SITE: &str = "IfcSite";
pub const IFC_BUILDING: &str = "IfcBuilding";
pub const IFC_BUILDING_STOREY: &str = "IfcBuildingStorey";
pub const IFC_SPACE: &str = "IfcSpace";
pub const IFC_ZONE: &str = "IfcZone";

/// (type, direct supertype) pairs for IFC2X3
const IFC2X3_TYPES: &[(&str, &str)] = &[
    // Spatial structure
    ("IfcSpatialStructureElement", IFC_PRODUCT),
    (IFC_SITE, "IfcSpatialStructureElement"),
    (IFC_BUILDING, "IfcSpatialStructureElement"),
    (IFC_BUILDING_STOREY, "IfcSpatialStructureElement"),
    (IFC_SPACE, "IfcSpatialStructureElement"),
    // Elements
    ("IfcElement", IFC_PRODUCT),
    ("IfcBuildingElement", "IfcElement"),
    ("IfcBeam", "IfcBuildingElement"),
    ("IfcBuildingElementProxy", "IfcBuildingElement"),
    ("IfcColumn", "IfcBuildingElement"),
    ("IfcCovering", "IfcBuildingElement"),
    ("IfcCurtainWall", "IfcBuildingElement"),
    ("IfcDoor", "IfcBuildingElement"),
    ("IfcFooting", "IfcBuildingElement"),
    ("IfcMember", "IfcBuildingElement"),
    ("IfcPile", "IfcBuildingElement"),
    ("IfcPlate", "IfcBuildingElement"),
    ("IfcRailing", "IfcBuildingElement"),
    ("IfcRamp", "IfcBuildingElement"),
    ("IfcRampFlight", "IfcBuildingElement"),
    ("IfcRoof", "IfcBuildingElement"),
    ("IfcSlab", "IfcBuildingElement"),
    ("IfcStair", "IfcBuildingElement"),
    ("IfcStairFlight", "IfcBuildingElement"),
    ("IfcWall", "IfcBuildingElement"),
    ("IfcWallStandardCase", "IfcWall"),
    ("IfcWindow", "IfcBuildingElement"),
    ("IfcBuildingElementComponent", "IfcBuildingElement"),
    ("IfcBuildingElementPart", "IfcBuildingElementComponent"),
    ("IfcReinforcingElement", "IfcBuildingElementComponent"),
    ("IfcReinforcingBar", "IfcReinforcingElement"),
    ("IfcReinforcingMesh", "IfcReinforcingElement"),
    ("IfcTendon", "IfcReinforcingElement"),
    ("IfcTendonAnchor", "IfcReinforcingElement"),
    // Distribution (MEP)
    ("IfcDistributionElement", "IfcElement"),
    ("IfcDistributionControlElement", "IfcDistributionElement"),
    ("IfcDistributionFlowElement", "IfcDistributionElement"),
    ("IfcDistributionChamberElement", "IfcDistributionFlowElement"),
    ("IfcEnergyConversionDevice", "IfcDistributionFlowElement"),
    ("IfcFlowController", "IfcDistributionFlowElement"),
    ("IfcElectricDistributionPoint", "IfcFlowController"),
    ("IfcFlowFitting", "IfcDistributionFlowElement"),
    ("IfcFlowMovingDevice", "IfcDistributionFlowElement"),
    ("IfcFlowSegment", "IfcDistributionFlowElement"),
    ("IfcFlowStorageDevice", "IfcDistributionFlowElement"),
    ("IfcFlowTerminal", "IfcDistributionFlowElement"),
    ("IfcFlowTreatmentDevice", "IfcDistributionFlowElement"),
    // Components, features, furnishing
    ("IfcElementComponent", "IfcElement"),
    ("IfcDiscreteAccessory", "IfcElementComponent"),
    ("IfcFastener", "IfcElementComponent"),
    ("IfcMechanicalFastener", "IfcFastener"),
    ("IfcElectricalElement", "IfcElement"),
    ("IfcElementAssembly", "IfcElement"),
    ("IfcEquipmentElement", "IfcElement"),
    ("IfcFeatureElement", "IfcElement"),
    ("IfcFeatureElementAddition", "IfcFeatureElement"),
    ("IfcProjectionElement", "IfcFeatureElementAddition"),
    ("IfcFeatureElementSubtraction", "IfcFeatureElement"),
    ("IfcOpeningElement", "IfcFeatureElementSubtraction"),
    ("IfcEdgeFeature", "IfcFeatureElementSubtraction"),
    ("IfcChamferEdgeFeature", "IfcEdgeFeature"),
    ("IfcRoundedEdgeFeature", "IfcEdgeFeature"),
    ("IfcFurnishingElement", "IfcElement"),
    ("IfcTransportElement", "IfcElement"),
    ("IfcVirtualElement", "IfcElement"),
    // Other products
    ("IfcAnnotation", IFC_PRODUCT),
    ("IfcGrid", IFC_PRODUCT),
    ("IfcPort", IFC_PRODUCT),
    ("IfcDistributionPort", "IfcPort"),
    ("IfcProxy", IFC_PRODUCT),
    ("IfcStructuralActivity", IFC_PRODUCT),
    ("IfcStructuralAction", "IfcStructuralActivity"),
    ("IfcStructuralPointAction", "IfcStructuralAction"),
    ("IfcStructuralLinearAction", "IfcStructuralAction"),
    ("IfcStructuralLinearActionVarying", "IfcStructuralLinearAction"),
    ("IfcStructuralPlanarAction", "IfcStructuralAction"),
    ("IfcStructuralPlanarActionVarying", "IfcStructuralPlanarAction"),
    ("IfcStructuralReaction", "IfcStructuralActivity"),
    ("IfcStructuralPointReaction", "IfcStructuralReaction"),
    ("IfcStructuralItem", IFC_PRODUCT),
    ("IfcStructuralMember", "IfcStructuralItem"),
    ("IfcStructuralCurveMember", "IfcStructuralMember"),
    ("IfcStructuralCurveMemberVarying", "IfcStructuralCurveMember"),
    ("IfcStructuralSurfaceMember", "IfcStructuralMember"),
    ("IfcStructuralSurfaceMemberVarying", "IfcStructuralSurfaceMember"),
    ("IfcStructuralConnection", "IfcStructuralItem"),
    ("IfcStructuralPointConnection", "IfcStructuralConnection"),
    ("IfcStructuralCurveConnection", "IfcStructuralConnection"),
    ("IfcStructuralSurfaceConnection", "IfcStructuralConnection"),
    // Non-product roots the engine still needs to recognise
    (IFC_PROJECT, "IfcObject"),
    (IFC_ZONE, "IfcGroup"),
    ("IfcGroup", "IfcObject"),
    (IFC_PRODUCT, "IfcObject"),
];

/// Guards ancestor walks against cyclic extensions
const MAX_DEPTH: usize = 64;

/// Supertype table with case-insensitive lookup
#[derive(Clone, Debug)]
pub struct TypeHierarchy {
    /// Uppercase name -> canonical name
    canonical: FxHashMap<String, String>,
    /// Canonical name -> canonical direct supertype
    parents: FxHashMap<String, String>,
}

impl TypeHierarchy {
    /// Empty hierarchy (no known types)
    pub fn empty() -> Self {
        Self {
            canonical: FxHashMap::default(),
            parents: FxHashMap::default(),
        }
    }

    /// Built-in IFC2X3 product hierarchy
    pub fn ifc2x3() -> Self {
        let mut hierarchy = Self::empty();
        for (type_name, supertype) in IFC2X3_TYPES {
            hierarchy.insert(type_name, supertype);
        }
        hierarchy
    }

    /// Register `type_name` as a direct subtype of `supertype`
    ///
    /// Names already known are matched case-insensitively, so registering
    /// `IFCWALLELEMENTEDCASE` under `IFCWALL` attaches to `IfcWall`.
    pub fn insert(&mut self, type_name: &str, supertype: &str) {
        let child = self.register(type_name);
        let parent = self.register(supertype);
        if child != parent {
            self.parents.insert(child, parent);
        }
    }

    /// Register several (type, supertype) pairs
    pub fn extend<'a, I>(&mut self, pairs: I)
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        for (type_name, supertype) in pairs {
            self.insert(type_name, supertype);
        }
    }

    /// Make a type name known without a supertype and return its canonical
    /// spelling (the first spelling registered wins)
    pub fn register(&mut self, name: &str) -> String {
        self.canonical
            .entry(name.to_ascii_uppercase())
            .or_insert_with(|| name.to_string())
            .clone()
    }

    /// Canonical spelling of a known type name
    pub fn canonical_name(&self, name: &str) -> Option<&str> {
        self.canonical
            .get(&name.to_ascii_uppercase())
            .map(String::as_str)
    }

    /// Direct supertype, if known
    pub fn supertype(&self, name: &str) -> Option<&str> {
        let canonical = self.canonical_name(name)?;
        self.parents.get(canonical).map(String::as_str)
    }

    /// Whether `name` equals or (indirectly) derives from `ancestor`
    pub fn is_subtype_of(&self, name: &str, ancestor: &str) -> bool {
        let Some(ancestor) = self.canonical_name(ancestor) else {
            return false;
        };
        let Some(mut current) = self.canonical_name(name) else {
            return false;
        };
        for _ in 0..MAX_DEPTH {
            if current == ancestor {
                return true;
            }
            match self.parents.get(current) {
                Some(parent) => current = parent.as_str(),
                None => return false,
            }
        }
        false
    }

    /// `ancestor` and every known type deriving from it, sorted by name
    pub fn subtypes_of(&self, ancestor: &str) -> Vec<String> {
        let mut types: Vec<String> = self
            .canonical
            .values()
            .filter(|name| self.is_subtype_of(name.as_str(), ancestor))
            .cloned()
            .collect();
        types.sort();
        types
    }
}

impl Default for TypeHierarchy {
    fn default() -> Self {
        Self::ifc2x3()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_indirect_subtypes() {
        let hierarchy = TypeHierarchy::ifc2x3();
        assert!(hierarchy.is_subtype_of("IfcWallStandardCase", IFC_PRODUCT));
        assert!(hierarchy.is_subtype_of("IfcSpace", "IfcSpatialStructureElement"));
        assert!(hierarchy.is_subtype_of("IfcWall", "IfcWall"));
        assert!(!hierarchy.is_subtype_of("IfcZone", IFC_PRODUCT));
        assert!(!hierarchy.is_subtype_of("IfcProject", IFC_PRODUCT));
        assert!(!hierarchy.is_subtype_of("IfcUnknownThing", IFC_PRODUCT));
    }

    #[test]
    fn test_lookup_is_case_insensitive() {
        let hierarchy = TypeHierarchy::ifc2x3();
        assert_eq!(hierarchy.canonical_name("IFCWALLSTANDARDCASE"), Some("IfcWallStandardCase"));
        assert_eq!(hierarchy.supertype("ifcwallstandardcase"), Some("IfcWall"));
        assert!(hierarchy.is_subtype_of("IFCDOOR", "ifcproduct"));
    }

    #[test]
    fn test_subtypes_are_sorted_and_include_root() {
        let hierarchy = TypeHierarchy::ifc2x3();
        let walls = hierarchy.subtypes_of("IfcWall");
        assert_eq!(walls, vec!["IfcWall".to_string(), "IfcWallStandardCase".to_string()]);

        let products = hierarchy.subtypes_of(IFC_PRODUCT);
        assert!(products.contains(&"IfcSpace".to_string()));
        assert!(!products.contains(&"IfcProject".to_string()));
        let mut sorted = products.clone();
        sorted.sort();
        assert_eq!(products, sorted);
    }

    #[test]
    fn test_extension_and_cycles() {
        let mut hierarchy = TypeHierarchy::ifc2x3();
        hierarchy.extend([("Wall", "IfcBuildingElement"), ("LoopA", "LoopB"), ("LoopB", "LoopA")]);
        assert!(hierarchy.is_subtype_of("Wall", IFC_PRODUCT));
        assert!(!hierarchy.is_subtype_of("LoopA", IFC_PRODUCT));
    }

    #[test]
    fn test_structural_and_feature_leaves_are_products() {
        let hierarchy = TypeHierarchy::ifc2x3();
        for leaf in [
            "IfcStructuralPointConnection",
            "IfcStructuralCurveConnection",
            "IfcStructuralSurfaceConnection",
            "IfcStructuralPointAction",
            "IfcStructuralLinearActionVarying",
            "IfcStructuralPlanarActionVarying",
            "IfcStructuralPointReaction",
            "IfcStructuralCurveMemberVarying",
            "IfcStructuralSurfaceMemberVarying",
            "IfcChamferEdgeFeature",
            "IfcRoundedEdgeFeature",
            "IfcElectricDistributionPoint",
        ] {
            assert!(hierarchy.is_subtype_of(leaf, IFC_PRODUCT), "{} is not a product", leaf);
        }
        assert_eq!(hierarchy.supertype("IfcElectricDistributionPoint"), Some("IfcFlowController"));
    }
}
