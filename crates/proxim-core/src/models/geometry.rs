//! Canonical coordinate types used across all proxim crates.
//!
//! Points carry their coordinate reference system with them: two points are
//! only comparable once both are expressed in the same CRS, and every
//! distance is measured in a projected system where planar offsets are
//! meters on the ground.

use serde::{Deserialize, Serialize};

/// Coordinate Reference System identified by EPSG code
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Crs {
    pub epsg: u32,
    pub name: String,
}

impl Default for Crs {
    fn default() -> Self {
        Self::wgs84()
    }
}

impl Crs {
    pub fn new(epsg: u32, name: impl Into<String>) -> Self {
        Self { epsg, name: name.into() }
    }

    /// WGS 84 (EPSG:4326) - geographic degrees, storage and display
    pub fn wgs84() -> Self {
        Self::new(4326, "WGS 84")
    }

    /// NAD83 / Massachusetts Mainland (EPSG:26986) - projected meters,
    /// the measurement system for the Boston study region
    pub fn mass_mainland() -> Self {
        Self::new(26986, "NAD83 / Massachusetts Mainland")
    }

    /// Whether coordinates in this system are longitude/latitude degrees.
    /// WGS 84 is the only geographic system the engine handles.
    pub fn is_geographic(&self) -> bool {
        self.epsg == 4326
    }

    /// Build a CRS from a bare EPSG code, naming the well-known ones
    pub fn from_epsg(epsg: u32) -> Self {
        match epsg {
            4326 => Self::wgs84(),
            26986 => Self::mass_mainland(),
            other => Self::new(other, format!("EPSG:{}", other)),
        }
    }
}

/// An immutable coordinate pair tagged with the CRS it is expressed in.
///
/// `x`/`y` follow axis order of the tagged CRS (longitude/latitude for
/// geographic systems, easting/northing for projected ones). A point with
/// no tag can be carried around but never reprojected or measured;
/// attempting either is an `UndefinedCrs` error, not a silent default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub x: f64,
    pub y: f64,
    pub crs: Option<Crs>,
}

impl GeoPoint {
    pub fn new(x: f64, y: f64, crs: Crs) -> Self {
        Self { x, y, crs: Some(crs) }
    }

    /// A longitude/latitude point in WGS 84
    pub fn wgs84(lon: f64, lat: f64) -> Self {
        Self::new(lon, lat, Crs::wgs84())
    }

    /// A point with no CRS tag (e.g., read from an untagged source layer)
    pub fn untagged(x: f64, y: f64) -> Self {
        Self { x, y, crs: None }
    }

    /// EPSG code of the tagged CRS, if any
    pub fn epsg(&self) -> Option<u32> {
        self.crs.as_ref().map(|c| c.epsg)
    }
}

/// Distance units for presentation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum DistanceUnit {
    #[default]
    Meters,
    Kilometers,
    Miles,
    Feet,
}

impl DistanceUnit {
    /// Convert a distance value to meters
    pub fn to_meters(&self, value: f64) -> f64 {
        match self {
            DistanceUnit::Meters => value,
            DistanceUnit::Kilometers => value * 1000.0,
            DistanceUnit::Miles => value * 1609.34,
            DistanceUnit::Feet => value * 0.3048,
        }
    }

    /// Convert a distance value from meters to this unit
    pub fn from_meters(&self, meters: f64) -> f64 {
        match self {
            DistanceUnit::Meters => meters,
            DistanceUnit::Kilometers => meters / 1000.0,
            DistanceUnit::Miles => meters / 1609.34,
            DistanceUnit::Feet => meters / 0.3048,
        }
    }
}

/// Distance with unit
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Distance {
    pub value: f64,
    pub unit: DistanceUnit,
}

impl Distance {
    pub fn new(value: f64, unit: DistanceUnit) -> Self {
        Self { value, unit }
    }

    /// Create distance in meters
    pub fn meters(value: f64) -> Self {
        Self::new(value, DistanceUnit::Meters)
    }

    /// Create distance in miles
    pub fn miles(value: f64) -> Self {
        Self::new(value, DistanceUnit::Miles)
    }

    /// Convert to meters
    pub fn to_meters(&self) -> f64 {
        self.unit.to_meters(self.value)
    }
}
