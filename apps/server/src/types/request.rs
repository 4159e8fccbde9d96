// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Request types for the API.

use ifc_lite_analytics::ModelSnapshot;
use serde::Deserialize;
use serde_json::Value;

/// Body of `POST /api/v1/analytics`.
#[derive(Debug, Deserialize)]
pub struct AnalyticsRequest {
    /// Fully loaded model snapshot.
    pub model: ModelSnapshot,

    /// Clash list computed elsewhere, merged verbatim into `checks.clashes`.
    #[serde(default)]
    pub clashes: Option<Value>,
}
