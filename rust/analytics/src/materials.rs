// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Material Aggregator
//!
//! Layer set usages fan out: an object associated with an N-layer set adds
//! to all N layer materials, so the material totals may exceed the number
//! of distinct objects.

use crate::model::{EntityId, MaterialSelect, ModelGraph};
use crate::report::Identity;
use rustc_hash::{FxHashMap, FxHashSet};
use serde::Serialize;

pub const NO_MATERIAL: &str = "NO_MATERIAL";

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MaterialNode {
    #[serde(flatten)]
    pub identity: Identity,
    pub nr_of_products: u64,
}

/// One node per material in model order, then `NO_MATERIAL`
pub fn aggregate_materials(model: &dyn ModelGraph, products: &[EntityId]) -> Vec<MaterialNode> {
    let mut nodes: Vec<MaterialNode> = model
        .materials()
        .iter()
        .map(|material| MaterialNode {
            identity: Identity::new(material.name.clone(), material.global_id.clone()),
            nr_of_products: 0,
        })
        .collect();
    let index: FxHashMap<EntityId, usize> = model
        .materials()
        .iter()
        .enumerate()
        .map(|(i, material)| (material.id, i))
        .collect();

    let mut with_material: FxHashSet<EntityId> = FxHashSet::default();

    for association in model.material_associations() {
        with_material.extend(association.related_objects.iter().copied());
        let related = association.related_objects.len() as u64;

        match &association.relating {
            MaterialSelect::DirectMaterial { id } => match index.get(id) {
                Some(&i) => nodes[i].nr_of_products += related,
                None => tracing::warn!(material = %id, "Association with unknown material"),
            },
            MaterialSelect::LayeredUsage { layer_set } => {
                let Some(set) = model.material_layer_set(*layer_set) else {
                    tracing::warn!(layer_set = %layer_set, "Layer set usage with unknown layer set");
                    continue;
                };
                for layer in &set.layers {
                    match layer.material.and_then(|id| index.get(&id)) {
                        Some(&i) => nodes[i].nr_of_products += related,
                        None => tracing::warn!(
                            layer_set = %layer_set,
                            material = ?layer.material,
                            "Skipping layer without a known material"
                        ),
                    }
                }
            }
            MaterialSelect::Unrecognized { type_name } => {
                tracing::info!(type_name = %type_name, "To implement: material association kind");
            }
        }
    }

    let without_material = products
        .iter()
        .filter(|id| !with_material.contains(*id))
        .count() as u64;

    nodes.push(MaterialNode {
        identity: Identity::new(Some(NO_MATERIAL.to_string()), None),
        nr_of_products: without_material,
    });

    tracing::debug!(
        materials = nodes.len() - 1,
        without_material,
        "Aggregated materials"
    );

    nodes
}
