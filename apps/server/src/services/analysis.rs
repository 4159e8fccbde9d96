// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Blocking analysis of one request body.

use crate::error::ApiError;
use crate::types::{AnalysisStats, AnalyticsRequest};
use ifc_lite_analytics::{AnalyticsConfig, ClashSource, ModelAnalyzer, PrecomputedClashes};
use serde_json::Value;
use std::time::Instant;

/// Report tree plus timing of one analysis run.
#[derive(Debug)]
pub struct AnalysisOutcome {
    pub report: Value,
    pub stats: AnalysisStats,
}

/// Parse a request body and run the analyzer over it.
///
/// CPU bound; call from `spawn_blocking`.
pub fn analyze_body(body: &[u8], config: &AnalyticsConfig) -> Result<AnalysisOutcome, ApiError> {
    let start = Instant::now();

    let request: AnalyticsRequest =
        serde_json::from_slice(body).map_err(|e| ApiError::InvalidModel(e.to_string()))?;
    let parse_time = start.elapsed();

    let clashes = request.clashes.map(PrecomputedClashes);
    let analyzer = ModelAnalyzer::new(config.clone());
    let report = analyzer.analyze_with_clashes(
        &request.model.input(),
        clashes.as_ref().map(|c| c as &dyn ClashSource),
    );
    let report = report.to_json()?;

    let analysis_time = start.elapsed();
    tracing::debug!(
        objects = request.model.object_count(),
        parse_time_ms = parse_time.as_millis(),
        analysis_time_ms = analysis_time.as_millis(),
        "Request analyzed"
    );

    Ok(AnalysisOutcome {
        report,
        stats: AnalysisStats {
            analysis_time_ms: analysis_time.as_millis() as u64,
            from_cache: false,
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_report_with_clashes() {
        let body = json!({
            "model": {
                "objects": [
                    {"id": 1, "type_name": "IfcWall", "geometry": {"primitive_count": 12, "volume": 2.0}}
                ]
            },
            "clashes": [{"guid1": "a", "guid2": "b"}]
        });
        let outcome =
            analyze_body(body.to_string().as_bytes(), &AnalyticsConfig::default()).unwrap();

        assert!(!outcome.stats.from_cache);
        assert_eq!(outcome.report["aggregations"]["perType"]["IfcWall"]["numberOfObjects"], 1);
        assert_eq!(outcome.report["checks"]["clashes"], json!([{"guid1": "a", "guid2": "b"}]));
    }

    #[test]
    fn test_non_array_clashes_are_omitted() {
        let body = json!({"model": {"objects": []}, "clashes": {"oops": true}});
        let outcome =
            analyze_body(body.to_string().as_bytes(), &AnalyticsConfig::default()).unwrap();
        assert!(outcome.report["checks"].get("clashes").is_none());
    }

    #[test]
    fn test_invalid_model_is_rejected() {
        let duplicate = json!({
            "model": {"objects": [
                {"id": 1, "type_name": "IfcWall"},
                {"id": 1, "type_name": "IfcSlab"}
            ]}
        });
        let result = analyze_body(duplicate.to_string().as_bytes(), &AnalyticsConfig::default());
        assert!(matches!(result, Err(ApiError::InvalidModel(_))));

        let garbage = analyze_body(b"not json", &AnalyticsConfig::default());
        assert!(matches!(garbage, Err(ApiError::InvalidModel(_))));
    }
}
