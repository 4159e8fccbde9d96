// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Classification Merger
//!
//! Four passes, which must run in order since each builds the index the
//! next one reads:
//!
//! 1. Deduplicate classification definitions by (name, edition, source,
//!    edition date).
//! 2. Nest deduplicated references under their owning classification node,
//!    keyed by (owner, location, item reference, name). References without a
//!    source go under `NO_CLASSIFICATION`.
//! 3. Add the related-object count of every association to its reference.
//!    Counts are summed per association, not per distinct object.
//! 4. Count each product that received no association once under
//!    `NO_CLASSIFICATION_REFERENCE`.

use crate::model::{CalendarDate, ClassificationSelect, EntityId, ModelGraph};
use rustc_hash::{FxHashMap, FxHashSet};
use serde::Serialize;

pub const NO_CLASSIFICATION: &str = "NO_CLASSIFICATION";
pub const NO_CLASSIFICATION_REFERENCE: &str = "NO_CLASSIFICATION_REFERENCE";

/// Edition date as reported
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EditionDate {
    pub year_component: i32,
    pub month_component: u32,
    pub day_component: u32,
}

impl From<CalendarDate> for EditionDate {
    fn from(date: CalendarDate) -> Self {
        Self {
            year_component: date.year,
            month_component: date.month,
            day_component: date.day,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassificationNode {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub edition: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub edition_date: Option<EditionDate>,
    pub references: Vec<ClassificationReferenceNode>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassificationReferenceNode {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub item_reference: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub number_of_objects: u64,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
struct ClassificationKey {
    name: Option<String>,
    edition: Option<String>,
    source: Option<String>,
    edition_date: Option<CalendarDate>,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
struct ReferenceKey {
    owner: usize,
    location: Option<String>,
    item_reference: Option<String>,
    name: Option<String>,
}

/// Node arena plus the indices built by each pass
#[derive(Default)]
struct ClassificationMerger {
    nodes: Vec<ClassificationNode>,
    /// Raw classification id -> node index
    by_classification: FxHashMap<EntityId, usize>,
    /// Raw reference id -> (node index, reference index)
    by_reference: FxHashMap<EntityId, (usize, usize)>,
    unclassified_node: usize,
    classified: FxHashSet<EntityId>,
}

impl ClassificationMerger {
    fn merge_definitions(&mut self, model: &dyn ModelGraph) {
        let mut by_key: FxHashMap<ClassificationKey, usize> = FxHashMap::default();

        for classification in model.classifications() {
            let key = ClassificationKey {
                name: classification.name.clone(),
                edition: classification.edition.clone(),
                source: classification.source.clone(),
                edition_date: classification.edition_date,
            };
            let next = self.nodes.len();
            let index = *by_key.entry(key).or_insert(next);
            if index == next {
                self.nodes.push(ClassificationNode {
                    name: classification.name.clone(),
                    edition: classification.edition.clone(),
                    source: classification.source.clone(),
                    edition_date: classification.edition_date.map(EditionDate::from),
                    references: Vec::new(),
                });
            }
            self.by_classification.insert(classification.id, index);
        }

        self.unclassified_node = self.nodes.len();
        self.nodes.push(ClassificationNode {
            name: Some(NO_CLASSIFICATION.to_string()),
            edition: None,
            source: None,
            edition_date: None,
            references: vec![ClassificationReferenceNode {
                location: None,
                item_reference: None,
                name: Some(NO_CLASSIFICATION_REFERENCE.to_string()),
                number_of_objects: 0,
            }],
        });
    }

    fn merge_references(&mut self, model: &dyn ModelGraph) {
        let mut by_key: FxHashMap<ReferenceKey, usize> = FxHashMap::default();

        for reference in model.classification_references() {
            let owner = match reference.referenced_source {
                None => self.unclassified_node,
                Some(source) => match self.by_classification.get(&source) {
                    Some(&index) => index,
                    None => {
                        tracing::warn!(
                            reference = %reference.id,
                            source = %source,
                            "Classification reference points at unknown classification"
                        );
                        self.unclassified_node
                    }
                },
            };

            let key = ReferenceKey {
                owner,
                location: reference.location.clone(),
                item_reference: reference.item_reference.clone(),
                name: reference.name.clone(),
            };
            let references = &mut self.nodes[owner].references;
            let index = *by_key.entry(key).or_insert_with(|| {
                references.push(ClassificationReferenceNode {
                    location: reference.location.clone(),
                    item_reference: reference.item_reference.clone(),
                    name: reference.name.clone(),
                    number_of_objects: 0,
                });
                references.len() - 1
            });
            self.by_reference.insert(reference.id, (owner, index));
        }
    }

    fn count_associations(&mut self, model: &dyn ModelGraph) {
        for association in model.classification_associations() {
            match &association.relating {
                ClassificationSelect::Reference { id } => {
                    let Some(&(node, reference)) = self.by_reference.get(id) else {
                        tracing::warn!(reference = %id, "Association with unknown classification reference");
                        continue;
                    };
                    self.nodes[node].references[reference].number_of_objects +=
                        association.related_objects.len() as u64;
                    self.classified.extend(association.related_objects.iter().copied());
                }
                ClassificationSelect::Unrecognized { type_name } => {
                    tracing::debug!(type_name = %type_name, "Skipping non-reference classification association");
                }
            }
        }
    }

    fn count_unclassified(&mut self, products: &[EntityId]) {
        let unclassified = products
            .iter()
            .filter(|id| !self.classified.contains(*id))
            .count() as u64;
        // First reference of the NO_CLASSIFICATION node
        self.nodes[self.unclassified_node].references[0].number_of_objects += unclassified;
    }
}

/// Merge classifications; `products` is every product instance
pub fn merge_classifications(
    model: &dyn ModelGraph,
    products: &[EntityId],
) -> Vec<ClassificationNode> {
    let mut merger = ClassificationMerger::default();
    merger.merge_definitions(model);
    merger.merge_references(model);
    merger.count_associations(model);
    merger.count_unclassified(products);

    tracing::debug!(
        classifications = merger.nodes.len() - 1,
        references = merger.by_reference.len(),
        classified_objects = merger.classified.len(),
        "Merged classifications"
    );

    merger.nodes
}
