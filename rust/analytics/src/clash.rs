// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Externally computed clash results
//!
//! The engine never detects clashes itself. It only merges an opaque JSON
//! array produced elsewhere into `checks.clashes`.

use crate::error::{Error, Result};
use serde_json::Value;

/// Supplier of a pre-computed clash list
pub trait ClashSource: Send + Sync {
    /// The clash list; must be a JSON array
    fn fetch_clashes(&self) -> Result<Value>;
}

/// Clash list that is already parsed
#[derive(Clone, Debug, PartialEq)]
pub struct PrecomputedClashes(pub Value);

impl ClashSource for PrecomputedClashes {
    fn fetch_clashes(&self) -> Result<Value> {
        expect_array(self.0.clone())
    }
}

/// Raw response body of a clash detection service
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RawClashPayload(pub Vec<u8>);

impl ClashSource for RawClashPayload {
    fn fetch_clashes(&self) -> Result<Value> {
        let value: Value = serde_json::from_slice(&self.0)?;
        expect_array(value)
    }
}

fn expect_array(value: Value) -> Result<Value> {
    match value {
        Value::Array(_) => Ok(value),
        Value::Null => Err(Error::InvalidClashPayload("expected an array, got null".into())),
        Value::Bool(_) => Err(Error::InvalidClashPayload("expected an array, got a boolean".into())),
        Value::Number(_) => Err(Error::InvalidClashPayload("expected an array, got a number".into())),
        Value::String(_) => Err(Error::InvalidClashPayload("expected an array, got a string".into())),
        Value::Object(_) => Err(Error::InvalidClashPayload("expected an array, got an object".into())),
    }
}

/// Fetch clashes, logging and dropping any failure
pub fn collect_clashes(source: Option<&dyn ClashSource>) -> Option<Value> {
    let source = source?;
    match source.fetch_clashes() {
        Ok(clashes) => Some(clashes),
        Err(e) => {
            tracing::warn!(error = %e, "Clash results unavailable, omitting checks.clashes");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_precomputed_array() {
        let source = PrecomputedClashes(json!([{"a": "1", "b": "2"}]));
        assert_eq!(collect_clashes(Some(&source)), Some(json!([{"a": "1", "b": "2"}])));
    }

    #[test]
    fn test_non_array_is_dropped() {
        let source = PrecomputedClashes(json!({"clashes": []}));
        assert!(matches!(source.fetch_clashes(), Err(Error::InvalidClashPayload(_))));
        assert_eq!(collect_clashes(Some(&source)), None);
    }

    #[test]
    fn test_raw_payload() {
        let ok = RawClashPayload(br#"[1, 2]"#.to_vec());
        assert_eq!(ok.fetch_clashes().unwrap(), json!([1, 2]));

        let garbage = RawClashPayload(b"<html>".to_vec());
        assert!(matches!(garbage.fetch_clashes(), Err(Error::Json(_))));
        assert_eq!(collect_clashes(Some(&garbage)), None);
    }

    #[test]
    fn test_no_source() {
        assert_eq!(collect_clashes(None), None);
    }
}
