// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Analytics endpoint.

use crate::error::ApiError;
use crate::services::{analyze_body, DiskCache};
use crate::types::AnalyticsResponse;
use crate::AppState;
use axum::{body::Bytes, extract::State, Json};

/// POST /api/v1/analytics - Analyze a model snapshot.
///
/// Body: `{ "model": <snapshot>, "clashes": [..]? }`. Identical bodies are
/// served from the disk cache.
pub async fn analyze(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<AnalyticsResponse>, ApiError> {
    if body.len() > state.config.max_body_bytes() {
        return Err(ApiError::PayloadTooLarge {
            max_mb: state.config.max_body_size_mb,
        });
    }

    let cache_key = DiskCache::generate_key(&body);

    if let Some(mut cached) = state.cache.get::<AnalyticsResponse>(&cache_key).await? {
        tracing::info!(cache_key = %cache_key, "Cache HIT");
        cached.stats.from_cache = true;
        return Ok(Json(cached));
    }

    tracing::info!(cache_key = %cache_key, size = body.len(), "Cache MISS - analyzing");

    let config = state.config.analytics.clone();
    let outcome = tokio::task::spawn_blocking(move || analyze_body(&body, &config)).await??;

    let response = AnalyticsResponse {
        cache_key: cache_key.clone(),
        report: outcome.report,
        stats: outcome.stats,
    };

    tracing::info!(
        cache_key = %cache_key,
        analysis_time_ms = response.stats.analysis_time_ms,
        "Analysis complete"
    );

    // Cache in the background
    let cache = state.cache.clone();
    let response_clone = response.clone();
    tokio::spawn(async move {
        if let Err(e) = cache.set(&cache_key, &response_clone).await {
            tracing::error!(error = %e, "Failed to cache report");
        }
    });

    Ok(Json(response))
}
