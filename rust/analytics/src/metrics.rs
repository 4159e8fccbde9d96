// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Per-object metrics: triangle count, normalized area/volume and
//! property statistics.

use crate::error::Result;
use crate::model::{GeometrySummary, PropertyStats};
use crate::units::UnitContext;
use serde_json::Value;

/// Engine-computed override keys, in order of preference
pub const WALKABLE_SURFACE_AREA: &str = "WALKABLE_SURFACE_AREA";
pub const SURFACE_AREA_ALONG_Z: &str = "SURFACE_AREA_ALONG_Z";

/// Read an area override from the geometry engine's metadata payload
///
/// The first override key present wins, even when its value is not a
/// number: numeric strings are parsed, booleans read as 1 or 0 and any
/// other value reads as 0. Returns `Ok(None)` when neither key is present.
pub fn override_area(additional_data: &str) -> Result<Option<f64>> {
    let data: Value = serde_json::from_str(additional_data)?;
    let area = [WALKABLE_SURFACE_AREA, SURFACE_AREA_ALONG_Z]
        .into_iter()
        .find_map(|key| data.get(key))
        .map(|value| match value {
            Value::Number(n) => n.as_f64().unwrap_or(0.0),
            Value::String(s) => s.trim().parse::<f64>().unwrap_or(0.0),
            Value::Bool(b) => f64::from(u8::from(*b)),
            _ => 0.0,
        });
    Ok(area)
}

/// Area in declared units: override when present, raw polygon area otherwise
///
/// A malformed metadata payload falls back to the raw area.
pub fn resolve_area(geometry: &GeometrySummary) -> f64 {
    let Some(additional_data) = geometry.additional_data.as_deref() else {
        return geometry.area;
    };
    match override_area(additional_data) {
        Ok(Some(area)) => area,
        Ok(None) => geometry.area,
        Err(e) => {
            tracing::debug!(error = %e, "Malformed geometry metadata, using raw area");
            geometry.area
        }
    }
}

/// Metrics of one object, all geometry values in canonical units
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ObjectMetrics {
    pub has_geometry: bool,
    pub triangles: u64,
    pub volume_m3: f64,
    pub area_m2: f64,
    pub psets: u64,
    pub properties: u64,
    pub relations: u64,
}

impl ObjectMetrics {
    /// Objects without geometry contribute zero triangles, area and volume
    /// but keep their property statistics.
    pub fn build(
        geometry: Option<&GeometrySummary>,
        stats: PropertyStats,
        units: &UnitContext,
    ) -> Self {
        let mut metrics = ObjectMetrics {
            psets: stats.psets,
            properties: stats.properties,
            relations: stats.relations,
            ..Default::default()
        };

        if let Some(geometry) = geometry {
            metrics.has_geometry = true;
            metrics.triangles = geometry.primitive_count;
            metrics.volume_m3 = units.to_cubic_metres(geometry.volume);
            metrics.area_m2 = units.to_square_metres(resolve_area(geometry));
        }

        metrics
    }
}
