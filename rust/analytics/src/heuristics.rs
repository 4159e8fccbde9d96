// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Data-quality heuristics over geometry summaries

use crate::model::GeometrySummary;
use crate::units::UnitContext;

/// Exclusive volume band (m³) for a "unit cube"
pub const UNIT_CUBE_MIN_M3: f64 = 0.999;
pub const UNIT_CUBE_MAX_M3: f64 = 1.001;

/// Vertex coordinates must lie within this many metres of the origin
pub const ORIGIN_LIMIT_M: f64 = 1.0;
/// Same limit for bounding boxes, which are always in millimetres
pub const ORIGIN_LIMIT_MM: f64 = 1000.0;

/// Detect a placeholder 1 m³ cube left at the coordinate origin
///
/// The vertex buffer is checked when present (in the declared length unit);
/// otherwise the millimetre bounding box is used. Geometry with neither
/// cannot be located and is not flagged.
pub fn is_unit_cube_near_origin(geometry: &GeometrySummary, units: &UnitContext) -> bool {
    let volume = units.to_cubic_metres(geometry.volume);
    if !(volume > UNIT_CUBE_MIN_M3 && volume < UNIT_CUBE_MAX_M3) {
        return false;
    }

    if let Some(vertices) = &geometry.vertices {
        return vertices
            .iter()
            .all(|&v| !beyond(units.to_metres(v as f64), ORIGIN_LIMIT_M));
    }

    match &geometry.bounds_mm {
        Some(bounds) => bounds.extremes().iter().all(|&c| !beyond(c, ORIGIN_LIMIT_MM)),
        None => false,
    }
}

/// Only a coordinate provably outside the limit disqualifies; NaN does not
fn beyond(coordinate: f64, limit: f64) -> bool {
    coordinate < -limit || coordinate > limit
}
