// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! ModelAnalyzer - runs every pass and assembles the report

use crate::aggregation::{aggregate_types, CompleteModel};
use crate::classification::merge_classifications;
use crate::clash::{collect_clashes, ClashSource};
use crate::config::{AnalyticsConfig, HierarchyLayout};
use crate::materials::aggregate_materials;
use crate::model::AnalysisInput;
use crate::ranking::{ComplexObjectEntry, PropertyEntry, Ranker};
use crate::report::{Aggregations, AnalyticsReport, Checks};
use crate::schema::IFC_PRODUCT;
use crate::spatial::SpatialWalker;
use std::time::Instant;

/// Single-pass analytics over one immutable model
#[derive(Clone, Debug, Default)]
pub struct ModelAnalyzer {
    config: AnalyticsConfig,
}

impl ModelAnalyzer {
    pub fn new(config: AnalyticsConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AnalyticsConfig {
        &self.config
    }

    /// Analyze a model without clash results
    pub fn analyze(&self, input: &AnalysisInput<'_>) -> AnalyticsReport {
        self.analyze_with_clashes(input, None)
    }

    /// Analyze a model, merging an external clash list into `checks`
    ///
    /// Never fails: missing data yields absent fields, dangling references
    /// are skipped and a failing clash source only drops `checks.clashes`.
    pub fn analyze_with_clashes(
        &self,
        input: &AnalysisInput<'_>,
        clashes: Option<&dyn ClashSource>,
    ) -> AnalyticsReport {
        let start = Instant::now();
        let model = input.model;
        let units = model.units();

        let spatial_start = Instant::now();
        let walker = SpatialWalker::new(model, input.geometry, units);
        let (project, buildings) = match self.config.hierarchy_layout {
            HierarchyLayout::Project => (walker.project(), None),
            HierarchyLayout::Buildings => (None, walker.buildings()),
        };
        let spatial_time = spatial_start.elapsed();

        let products = model.instances_with_subtypes(IFC_PRODUCT);

        let relations_start = Instant::now();
        let materials = aggregate_materials(model, &products);
        let classifications = merge_classifications(model, &products);
        let relations_time = relations_start.elapsed();

        let aggregation_start = Instant::now();
        let aggregation = aggregate_types(input, &units, self.config.parallel);
        let ranker = Ranker::new(self.config.top_n);
        let top_complex = ranker
            .most_complex(&aggregation.records)
            .into_iter()
            .map(ComplexObjectEntry::from)
            .collect();
        let top_properties = ranker
            .most_properties(&aggregation.records)
            .into_iter()
            .map(PropertyEntry::from)
            .collect();
        let aggregation_time = aggregation_start.elapsed();

        let checks = Checks::new(collect_clashes(clashes), aggregation.totals.cubes_near_zero);
        let complete_model = CompleteModel::from(&aggregation.totals);

        tracing::info!(
            products = products.len(),
            types = aggregation.per_type.len(),
            materials = materials.len() - 1,
            classifications = classifications.len() - 1,
            cubes_near_zero = checks.cubes_near_zero,
            spatial_time_ms = spatial_time.as_millis(),
            relations_time_ms = relations_time.as_millis(),
            aggregation_time_ms = aggregation_time.as_millis(),
            total_time_ms = start.elapsed().as_millis(),
            "Model analytics complete"
        );

        AnalyticsReport {
            header: input.header.clone(),
            project,
            buildings,
            materials,
            classifications,
            aggregations: Aggregations {
                per_type: aggregation.per_type,
                top_ten_most_complex_objects: top_complex,
                top_ten_most_properties: top_properties,
                complete_model,
            },
            checks,
        }
    }
}
