// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Top-N rankings over per-object records
//!
//! Order among exactly equal keys is unspecified.

use crate::model::EntityId;
use serde::Serialize;
use std::cmp::Ordering;

/// Per-object aggregation unit, built once during the type pass
#[derive(Clone, Debug, PartialEq)]
pub struct ObjectRecord {
    pub id: EntityId,
    pub type_name: String,
    pub name: Option<String>,
    pub global_id: Option<String>,
    pub triangles: u64,
    pub volume_m3: f64,
    pub properties: u64,
}

impl ObjectRecord {
    /// Triangles per cubic metre, 0 when either operand is 0 or the
    /// volume is NaN
    #[inline]
    pub fn triangles_per_volume(&self) -> f64 {
        if self.triangles == 0 || self.volume_m3 == 0.0 || self.volume_m3.is_nan() {
            0.0
        } else {
            self.triangles as f64 / self.volume_m3
        }
    }
}

/// Entry of `topTenMostComplexObjects`; zero-valued metrics are omitted
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComplexObjectEntry {
    #[serde(rename = "type")]
    pub type_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub guid: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub number_of_triangles: Option<u64>,
    #[serde(rename = "volumeM3", skip_serializing_if = "Option::is_none")]
    pub volume_m3: Option<f64>,
    #[serde(rename = "trianglesPerM3", skip_serializing_if = "Option::is_none")]
    pub triangles_per_m3: Option<f64>,
}

impl From<&ObjectRecord> for ComplexObjectEntry {
    fn from(record: &ObjectRecord) -> Self {
        let ratio = record.triangles_per_volume();
        Self {
            type_name: record.type_name.clone(),
            name: record.name.clone(),
            guid: record.global_id.clone(),
            number_of_triangles: (record.triangles != 0).then_some(record.triangles),
            volume_m3: (record.volume_m3 != 0.0).then_some(record.volume_m3),
            triangles_per_m3: (ratio != 0.0 && ratio.is_finite()).then_some(ratio),
        }
    }
}

/// Entry of `topTenMostProperties`; the property count is always present
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyEntry {
    #[serde(rename = "type")]
    pub type_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub guid: Option<String>,
    pub number_of_properties: u64,
}

impl From<&ObjectRecord> for PropertyEntry {
    fn from(record: &ObjectRecord) -> Self {
        Self {
            type_name: record.type_name.clone(),
            name: record.name.clone(),
            guid: record.global_id.clone(),
            number_of_properties: record.properties,
        }
    }
}

/// Extracts the two independent top-N views
#[derive(Clone, Copy, Debug)]
pub struct Ranker {
    top_n: usize,
}

impl Ranker {
    pub fn new(top_n: usize) -> Self {
        Self { top_n }
    }

    /// Highest triangles-per-volume first
    pub fn most_complex<'a>(&self, records: &'a [ObjectRecord]) -> Vec<&'a ObjectRecord> {
        top_by(records, self.top_n, |a, b| {
            a.triangles_per_volume().total_cmp(&b.triangles_per_volume())
        })
    }

    /// Highest property count first
    pub fn most_properties<'a>(&self, records: &'a [ObjectRecord]) -> Vec<&'a ObjectRecord> {
        top_by(records, self.top_n, |a, b| a.properties.cmp(&b.properties))
    }
}

impl Default for Ranker {
    fn default() -> Self {
        Self::new(10)
    }
}

/// Partial selection of the `n` largest records under the total order
/// `ascending`, then a sort of that prefix
fn top_by<'a, F>(records: &'a [ObjectRecord], n: usize, ascending: F) -> Vec<&'a ObjectRecord>
where
    F: Fn(&ObjectRecord, &ObjectRecord) -> Ordering,
{
    if n == 0 {
        return Vec::new();
    }

    let descending = |a: &&ObjectRecord, b: &&ObjectRecord| ascending(b, a);

    let mut ranked: Vec<&ObjectRecord> = records.iter().collect();
    if ranked.len() > n {
        ranked.select_nth_unstable_by(n - 1, descending);
        ranked.truncate(n);
    }
    ranked.sort_by(descending);
    ranked
}
