// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! IFC-Lite Analytics
//!
//! Turns a fully loaded, immutable building model into one analytics report:
//! per-type statistics, global totals, top-N rankings, classification and
//! material roll-ups, the spatial hierarchy and a few data-quality checks.
//!
//! The model is borrowed through the traits in [`model`]; [`ModelSnapshot`]
//! implements them over a JSON snapshot.
//!
//! ```no_run
//! use ifc_lite_analytics::{ModelAnalyzer, ModelSnapshot};
//!
//! let snapshot = ModelSnapshot::from_path("model.json")?;
//! let report = ModelAnalyzer::default().analyze(&snapshot.input());
//! println!("{}", report.to_json_string()?);
//! # Ok::<(), ifc_lite_analytics::Error>(())
//! ```

pub mod aggregation;
pub mod analyzer;
pub mod classification;
pub mod clash;
pub mod config;
pub mod error;
pub mod heuristics;
pub mod materials;
pub mod metrics;
pub mod model;
pub mod ranking;
pub mod report;
pub mod schema;
pub mod snapshot;
pub mod spatial;
pub mod units;

pub use aggregation::{CompleteModel, TypeStats};
pub use analyzer::ModelAnalyzer;
pub use clash::{ClashSource, PrecomputedClashes, RawClashPayload};
pub use config::{AnalyticsConfig, HierarchyLayout};
pub use error::{Error, Result};
pub use heuristics::is_unit_cube_near_origin;
pub use model::{
    AnalysisInput, EntityId, GeometryProvider, GeometrySummary, IfcHeader, ModelGraph,
    PropertyStats, PropertyStatsProvider,
};
pub use report::{AnalyticsReport, OUTPUT_SCHEMA};
pub use schema::TypeHierarchy;
pub use snapshot::ModelSnapshot;
pub use units::{AreaUnit, LengthUnit, UnitContext, VolumeUnit};
