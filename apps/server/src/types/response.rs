// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Response types for the API.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Analytics response, also the cached unit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyticsResponse {
    /// Cache key for this result (SHA256 of the request body).
    pub cache_key: String,
    /// The analytics report tree.
    pub report: Value,
    /// Processing statistics.
    pub stats: AnalysisStats,
}

/// Processing statistics.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnalysisStats {
    /// Time spent parsing and analyzing (ms).
    pub analysis_time_ms: u64,
    /// Whether result was from cache.
    pub from_cache: bool,
}
