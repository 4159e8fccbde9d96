// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Unit declarations and conversion to canonical metric units
//!
//! A model declares its length, area and volume units independently (an
//! IFC file may well use millimetres for lengths and square metres for
//! areas). Every value that ends up in a report is converted to metres,
//! square metres or cubic metres through a [`UnitContext`].

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Unit name that could not be resolved
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("Unknown unit: {0}")]
pub struct UnknownUnit(pub String);

/// SI prefixes as defined by the IfcSIPrefix enumeration
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SiPrefix {
    Atto,
    Femto,
    Pico,
    Nano,
    Micro,
    Milli,
    Centi,
    Deci,
    Deca,
    Hecto,
    Kilo,
    Mega,
    Giga,
    Tera,
    Peta,
    Exa,
}

impl SiPrefix {
    const ALL: [SiPrefix; 16] = [
        SiPrefix::Atto,
        SiPrefix::Femto,
        SiPrefix::Pico,
        SiPrefix::Nano,
        SiPrefix::Micro,
        SiPrefix::Milli,
        SiPrefix::Centi,
        SiPrefix::Deci,
        SiPrefix::Deca,
        SiPrefix::Hecto,
        SiPrefix::Kilo,
        SiPrefix::Mega,
        SiPrefix::Giga,
        SiPrefix::Tera,
        SiPrefix::Peta,
        SiPrefix::Exa,
    ];

    /// Parse an IFC enumeration literal (`MILLI`, `.MILLI.`, `milli`)
    pub fn parse(prefix: &str) -> Option<Self> {
        let prefix = prefix.trim().trim_matches('.');
        Self::ALL
            .iter()
            .copied()
            .find(|p| p.as_str().eq_ignore_ascii_case(prefix))
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SiPrefix::Atto => "ATTO",
            SiPrefix::Femto => "FEMTO",
            SiPrefix::Pico => "PICO",
            SiPrefix::Nano => "NANO",
            SiPrefix::Micro => "MICRO",
            SiPrefix::Milli => "MILLI",
            SiPrefix::Centi => "CENTI",
            SiPrefix::Deci => "DECI",
            SiPrefix::Deca => "DECA",
            SiPrefix::Hecto => "HECTO",
            SiPrefix::Kilo => "KILO",
            SiPrefix::Mega => "MEGA",
            SiPrefix::Giga => "GIGA",
            SiPrefix::Tera => "TERA",
            SiPrefix::Peta => "PETA",
            SiPrefix::Exa => "EXA",
        }
    }

    /// Numeric multiplier of the prefix
    #[inline]
    pub fn multiplier(&self) -> f64 {
        match self {
            SiPrefix::Atto => 1e-18,
            SiPrefix::Femto => 1e-15,
            SiPrefix::Pico => 1e-12,
            SiPrefix::Nano => 1e-9,
            SiPrefix::Micro => 1e-6,
            SiPrefix::Milli => 1e-3, // Most common: millimetres
            SiPrefix::Centi => 1e-2,
            SiPrefix::Deci => 1e-1,
            SiPrefix::Deca => 1e1,
            SiPrefix::Hecto => 1e2,
            SiPrefix::Kilo => 1e3,
            SiPrefix::Mega => 1e6,
            SiPrefix::Giga => 1e9,
            SiPrefix::Tera => 1e12,
            SiPrefix::Peta => 1e15,
            SiPrefix::Exa => 1e18,
        }
    }
}

/// Declared length unit
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum LengthUnit {
    /// SI metre with an optional prefix
    Metre(Option<SiPrefix>),
    Foot,
    Inch,
    Yard,
    Mile,
}

impl LengthUnit {
    pub const METRE: LengthUnit = LengthUnit::Metre(None);
    pub const MILLIMETRE: LengthUnit = LengthUnit::Metre(Some(SiPrefix::Milli));

    /// Length of one unit in metres
    #[inline]
    pub fn metres(&self) -> f64 {
        match self {
            LengthUnit::Metre(prefix) => prefix.map_or(1.0, |p| p.multiplier()),
            LengthUnit::Foot => 0.3048,
            LengthUnit::Inch => 0.0254,
            LengthUnit::Yard => 0.9144,
            LengthUnit::Mile => 1609.344,
        }
    }

    /// Resolve a unit from an optional SI prefix and a base name such as
    /// `METRE` or `FOOT`
    pub fn resolve(prefix: Option<&str>, base: &str) -> Option<Self> {
        let base = base.trim().trim_matches('.').to_ascii_uppercase().replace(' ', "_");
        match base.as_str() {
            "METRE" | "METER" => Some(LengthUnit::Metre(prefix.and_then(SiPrefix::parse))),
            "FOOT" | "FEET" => Some(LengthUnit::Foot),
            "INCH" => Some(LengthUnit::Inch),
            "YARD" => Some(LengthUnit::Yard),
            "MILE" => Some(LengthUnit::Mile),
            _ => None,
        }
    }
}

impl Default for LengthUnit {
    fn default() -> Self {
        LengthUnit::METRE
    }
}

impl fmt::Display for LengthUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LengthUnit::Metre(None) => f.write_str("METRE"),
            LengthUnit::Metre(Some(prefix)) => write!(f, "{}METRE", prefix.as_str()),
            LengthUnit::Foot => f.write_str("FOOT"),
            LengthUnit::Inch => f.write_str("INCH"),
            LengthUnit::Yard => f.write_str("YARD"),
            LengthUnit::Mile => f.write_str("MILE"),
        }
    }
}

impl FromStr for LengthUnit {
    type Err = UnknownUnit;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.trim().to_ascii_uppercase().replace(' ', "_");
        if let Some(unit) = LengthUnit::resolve(None, &upper) {
            return Ok(unit);
        }
        // MILLIMETRE, MILLI_METRE
        if let Some(prefix) = upper.strip_suffix("METRE") {
            let prefix = prefix.trim_end_matches('_');
            if let Some(prefix) = SiPrefix::parse(prefix) {
                return Ok(LengthUnit::Metre(Some(prefix)));
            }
        }
        Err(UnknownUnit(s.to_string()))
    }
}

impl TryFrom<String> for LengthUnit {
    type Error = UnknownUnit;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<LengthUnit> for String {
    fn from(unit: LengthUnit) -> Self {
        unit.to_string()
    }
}

/// Declared area unit: the square of a length unit
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct AreaUnit(pub LengthUnit);

impl AreaUnit {
    #[inline]
    pub fn square_metres(&self) -> f64 {
        let side = self.0.metres();
        side * side
    }
}

impl fmt::Display for AreaUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SQUARE_{}", self.0)
    }
}

impl FromStr for AreaUnit {
    type Err = UnknownUnit;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.trim().to_ascii_uppercase().replace(' ', "_");
        let side = upper
            .strip_prefix("SQUARE_")
            .ok_or_else(|| UnknownUnit(s.to_string()))?;
        side.parse()
            .map(AreaUnit)
            .map_err(|_| UnknownUnit(s.to_string()))
    }
}

impl TryFrom<String> for AreaUnit {
    type Error = UnknownUnit;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<AreaUnit> for String {
    fn from(unit: AreaUnit) -> Self {
        unit.to_string()
    }
}

/// Declared volume unit: the cube of a length unit
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct VolumeUnit(pub LengthUnit);

impl VolumeUnit {
    #[inline]
    pub fn cubic_metres(&self) -> f64 {
        let side = self.0.metres();
        side * side * side
    }
}

impl fmt::Display for VolumeUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CUBIC_{}", self.0)
    }
}

impl FromStr for VolumeUnit {
    type Err = UnknownUnit;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.trim().to_ascii_uppercase().replace(' ', "_");
        let side = upper
            .strip_prefix("CUBIC_")
            .ok_or_else(|| UnknownUnit(s.to_string()))?;
        side.parse()
            .map(VolumeUnit)
            .map_err(|_| UnknownUnit(s.to_string()))
    }
}

impl TryFrom<String> for VolumeUnit {
    type Error = UnknownUnit;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<VolumeUnit> for String {
    fn from(unit: VolumeUnit) -> Self {
        unit.to_string()
    }
}

/// A unit as declared in the project's unit assignment
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ProjectUnit {
    /// `LENGTHUNIT`, `AREAUNIT`, `VOLUMEUNIT`, ...
    #[serde(default)]
    pub unit_type: Option<String>,
    /// `METRE`, `SQUARE_METRE`, `FOOT`, ...
    #[serde(default)]
    pub name: Option<String>,
    /// SI prefix, when the unit is an SI unit
    #[serde(default)]
    pub prefix: Option<String>,
}

/// The model's declared units, fixed for one analysis run
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UnitContext {
    pub length: LengthUnit,
    pub area: AreaUnit,
    pub volume: VolumeUnit,
}

impl UnitContext {
    pub fn new(length: LengthUnit, area: AreaUnit, volume: VolumeUnit) -> Self {
        Self {
            length,
            area,
            volume,
        }
    }

    /// Resolve the context from a project's unit assignment
    ///
    /// Follows IFCUNITASSIGNMENT → IFCSIUNIT / IFCCONVERSIONBASEDUNIT.
    /// Declarations that are missing or cannot be resolved fall back to
    /// the metric base unit.
    pub fn from_project_units(units: &[ProjectUnit]) -> Self {
        let mut context = UnitContext::default();

        for unit in units {
            let (Some(unit_type), Some(name)) = (unit.unit_type.as_deref(), unit.name.as_deref())
            else {
                continue;
            };
            let unit_type = unit_type.trim_matches('.');
            let name = name.trim_matches('.').to_ascii_uppercase().replace(' ', "_");
            let prefix = unit.prefix.as_deref();

            if unit_type.eq_ignore_ascii_case("LENGTHUNIT") {
                match LengthUnit::resolve(prefix, &name) {
                    Some(length) => context.length = length,
                    None => tracing::warn!(name = %name, "Unresolved length unit, using metres"),
                }
            } else if unit_type.eq_ignore_ascii_case("AREAUNIT") {
                let side = name.strip_prefix("SQUARE_").unwrap_or(&name);
                match LengthUnit::resolve(prefix, side) {
                    Some(side) => context.area = AreaUnit(side),
                    None => tracing::warn!(name = %name, "Unresolved area unit, using square metres"),
                }
            } else if unit_type.eq_ignore_ascii_case("VOLUMEUNIT") {
                let side = name.strip_prefix("CUBIC_").unwrap_or(&name);
                match LengthUnit::resolve(prefix, side) {
                    Some(side) => context.volume = VolumeUnit(side),
                    None => tracing::warn!(name = %name, "Unresolved volume unit, using cubic metres"),
                }
            }
        }

        context
    }

    /// Convert a length in the declared unit to metres
    #[inline]
    pub fn to_metres(&self, value: f64) -> f64 {
        value * self.length.metres()
    }

    /// Convert an area in the declared unit to square metres
    #[inline]
    pub fn to_square_metres(&self, value: f64) -> f64 {
        value * self.area.square_metres()
    }

    /// Convert a volume in the declared unit to cubic metres
    #[inline]
    pub fn to_cubic_metres(&self, value: f64) -> f64 {
        value * self.volume.cubic_metres()
    }
}
