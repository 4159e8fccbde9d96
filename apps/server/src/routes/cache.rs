// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Cached report retrieval.
//!
//! Reports are stored under the SHA-256 of the request body that produced
//! them, so a key is only ever 64 hex digits.

use crate::error::ApiError;
use crate::types::AnalyticsResponse;
use crate::AppState;
use axum::{
    extract::{Path, State},
    Json,
};

const KEY_LEN: usize = 64;

/// Lowercase a report key, rejecting anything that is not a SHA-256 digest.
pub fn normalize_key(key: &str) -> Result<String, ApiError> {
    let key = key.trim();
    if key.len() != KEY_LEN || !key.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(ApiError::InvalidCacheKey(key.to_string()));
    }
    Ok(key.to_ascii_lowercase())
}

/// GET /api/v1/cache/:key - Report of an earlier analytics request.
pub async fn get_cached(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<AnalyticsResponse>, ApiError> {
    let cache_key = normalize_key(&key)?;

    let Some(mut response) = state.cache.get::<AnalyticsResponse>(&cache_key).await? else {
        tracing::debug!(cache_key = %cache_key, "No cached report");
        return Err(ApiError::NotFound(format!("No report for key {}", cache_key)));
    };

    response.stats.from_cache = true;
    tracing::info!(
        cache_key = %cache_key,
        objects = %response.report["aggregations"]["completeModel"]["totalNrOfObjects"],
        analysis_time_ms = response.stats.analysis_time_ms,
        "Serving cached report"
    );
    Ok(Json(response))
}
