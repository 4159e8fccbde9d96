// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Analysis configuration, optionally loaded from environment variables.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// How the spatial hierarchy is laid out in the report
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HierarchyLayout {
    /// `project` → sites → buildings → storeys → spaces
    #[default]
    Project,
    /// Flat `buildings` list taken from every site
    Buildings,
}

impl FromStr for HierarchyLayout {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "project" => Ok(HierarchyLayout::Project),
            "buildings" => Ok(HierarchyLayout::Buildings),
            other => Err(format!("unknown hierarchy layout: {}", other)),
        }
    }
}

/// Analysis configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyticsConfig {
    /// Length of both rankings.
    pub top_n: usize,
    /// Aggregate product types on the rayon pool.
    pub parallel: bool,
    pub hierarchy_layout: HierarchyLayout,
}

impl AnalyticsConfig {
    /// Load configuration from environment variables.
    ///
    /// Missing or malformed values fall back to the defaults.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            top_n: std::env::var("ANALYTICS_TOP_N")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.top_n),
            parallel: std::env::var("ANALYTICS_PARALLEL")
                .ok()
                .and_then(|v| parse_flag(&v))
                .unwrap_or(defaults.parallel),
            hierarchy_layout: std::env::var("ANALYTICS_HIERARCHY_LAYOUT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.hierarchy_layout),
        }
    }
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            top_n: 10,
            parallel: true,
            hierarchy_layout: HierarchyLayout::Project,
        }
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
