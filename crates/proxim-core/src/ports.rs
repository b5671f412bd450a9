//! Port trait definitions
//!
//! These traits define the interfaces the external collaborators
//! (data loaders, geocoding service) must implement. The core never
//! parses flat files or talks to the network itself.

use crate::error::Result;
use crate::models::{FacilityRecord, GeoPoint, ReferenceRecord};
use async_trait::async_trait;

/// Port for loading facility collections, already parsed and CRS-tagged
pub trait FacilitySource {
    /// Load every facility record the source holds
    fn load_facilities(&self) -> Result<Vec<FacilityRecord>>;
}

/// Port for loading reference (housing) collections
pub trait ReferenceSource {
    /// Load every reference record the source holds
    fn load_references(&self) -> Result<Vec<ReferenceRecord>>;
}

/// Port for resolving a free-text address to a WGS 84 point.
///
/// Every failure mode - timeout, service error, no match - collapses
/// uniformly to `None`: the ad-hoc path degrades to "no location
/// available" and callers must not attempt enrichment without a point.
#[async_trait]
pub trait Geocoder {
    async fn geocode(&self, address: &str) -> Option<GeoPoint>;
}
