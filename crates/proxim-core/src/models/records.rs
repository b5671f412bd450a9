//! Facility and reference record types.
//!
//! A `FacilityRecord` is a named point of interest in one of a closed set
//! of categories; a `ReferenceRecord` is a location being enriched (a dorm
//! in the original dataset, or an ad-hoc user location). Enrichment writes
//! one `NearestResult` per category into the reference record's slots.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::geometry::GeoPoint;

/// Closed set of facility categories.
///
/// The serde names are the stable keys a renderer uses to look up
/// `NearestResult` slots; they must not change between releases.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Grocery,
    ConveniencePharmacy,
    NamedChain,
    TransitStop,
    TransitLine,
}

impl Category {
    /// Stable lookup key, identical to the serde name
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Grocery => "grocery",
            Category::ConveniencePharmacy => "convenience_pharmacy",
            Category::NamedChain => "named_chain",
            Category::TransitStop => "transit_stop",
            Category::TransitLine => "transit_line",
        }
    }

    /// All categories, in slot order
    pub fn all() -> [Category; 5] {
        [
            Category::Grocery,
            Category::ConveniencePharmacy,
            Category::NamedChain,
            Category::TransitStop,
            Category::TransitLine,
        ]
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "grocery" => Ok(Category::Grocery),
            "convenience_pharmacy" => Ok(Category::ConveniencePharmacy),
            "named_chain" => Ok(Category::NamedChain),
            "transit_stop" => Ok(Category::TransitStop),
            "transit_line" => Ok(Category::TransitLine),
            other => Err(format!("unknown category '{}'", other)),
        }
    }
}

/// A named point of interest
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FacilityRecord {
    /// Display name
    pub name: String,

    /// Street address, when the source provides one
    pub address: Option<String>,

    /// City, when the source provides one
    pub city: Option<String>,

    /// Location
    pub point: GeoPoint,

    /// Category tag
    pub category: Category,

    /// Free-form source attributes (postal code, line color, store type).
    /// Used for filtering and display only, never for distance.
    #[serde(default)]
    pub attributes: Map<String, Value>,
}

impl FacilityRecord {
    pub fn new(name: impl Into<String>, point: GeoPoint, category: Category) -> Self {
        Self {
            name: name.into(),
            address: None,
            city: None,
            point,
            category,
            attributes: Map::new(),
        }
    }

    /// Look up a free-form attribute by name
    pub fn attribute(&self, key: &str) -> Option<&Value> {
        self.attributes.get(key)
    }

    /// Attach a free-form attribute (builder style)
    pub fn with_attribute(mut self, key: impl Into<String>, value: Value) -> Self {
        self.attributes.insert(key.into(), value);
        self
    }
}

/// The outcome of one nearest-facility query, attached per category.
///
/// An absent slot means the candidate set was empty at resolution time;
/// it is never encoded as a zero or sentinel distance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NearestResult {
    /// True ground distance in meters
    pub distance_m: f64,

    /// Human-readable facility identity (per the category's label spec)
    pub facility_name: String,

    /// The facility's location in the storage CRS, sufficient for a
    /// renderer to draw a connecting line and label
    pub facility_point: GeoPoint,
}

/// A location being enriched: a batch-loaded housing unit or an ad-hoc
/// user-supplied point. Immutable except for the `nearest` result slots,
/// which the enrichment orchestrator owns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReferenceRecord {
    /// Display name
    pub name: String,

    /// Location
    pub point: GeoPoint,

    /// Intrinsic attributes (e.g., price fields), untouched by enrichment
    #[serde(default)]
    pub attributes: Map<String, Value>,

    /// One result slot per enriched category
    #[serde(default)]
    pub nearest: BTreeMap<Category, NearestResult>,
}

impl ReferenceRecord {
    pub fn new(name: impl Into<String>, point: GeoPoint) -> Self {
        Self {
            name: name.into(),
            point,
            attributes: Map::new(),
            nearest: BTreeMap::new(),
        }
    }

    /// Wrap an externally-supplied latitude/longitude (e.g., a geocoded
    /// address) into a record with empty result slots, structurally
    /// identical to batch-loaded records.
    ///
    /// Coordinates are taken as WGS 84 degrees as produced by the
    /// geocoding collaborator; no range validation happens here.
    pub fn ad_hoc(name: impl Into<String>, lat: f64, lon: f64) -> Self {
        Self::new(name, GeoPoint::wgs84(lon, lat))
    }

    /// The result slot for a category, if it was populated
    pub fn nearest_in(&self, category: Category) -> Option<&NearestResult> {
        self.nearest.get(&category)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_keys_are_stable() {
        let json = serde_json::to_string(&Category::ConveniencePharmacy).unwrap();
        assert_eq!(json, "\"convenience_pharmacy\"");
        assert_eq!(
            "grocery".parse::<Category>().unwrap(),
            Category::Grocery
        );
        assert!("bodega".parse::<Category>().is_err());
    }

    #[test]
    fn test_facility_attributes() {
        let store = FacilityRecord::new(
            "Star Market",
            GeoPoint::wgs84(-71.1, 42.34),
            Category::Grocery,
        )
        .with_attribute("store_type", Value::from("Supermarket or Other Grocery"))
        .with_attribute("postal_cod", Value::from(2116));

        assert_eq!(
            store.attribute("store_type").and_then(Value::as_str),
            Some("Supermarket or Other Grocery")
        );
        assert!(store.attribute("line").is_none());
    }

    #[test]
    fn test_ad_hoc_record_parity_with_batch_record() {
        let batch = ReferenceRecord::new("Loftman Hall", GeoPoint::wgs84(-71.09, 42.34));
        let adhoc = ReferenceRecord::ad_hoc("My Apartment", 42.34, -71.09);

        // Same shape: same point encoding, same (empty) slots
        assert_eq!(batch.point, adhoc.point);
        assert!(adhoc.nearest.is_empty());
        assert!(adhoc.nearest_in(Category::Grocery).is_none());
    }
}
