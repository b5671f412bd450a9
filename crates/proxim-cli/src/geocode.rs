//! Geocoding adapter (Nominatim-style search endpoint).
//!
//! The core treats every geocoding failure the same way: timeout, service
//! error, and no-match all collapse to `None` at the `Geocoder` port, and
//! the ad-hoc path degrades to "no location available". The distinction
//! only survives as a log line here.

use async_trait::async_trait;
use proxim_core::error::{ProximError, Result};
use proxim_core::models::GeoPoint;
use proxim_core::ports::Geocoder;
use serde::Deserialize;
use std::time::Duration;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Nominatim-style geocoder
pub struct NominatimGeocoder {
    base_url: String,
    client: reqwest::Client,
}

impl NominatimGeocoder {
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        // The timeout and user agent are part of the contract with the
        // remote service, so a builder failure is an error, not a fallback
        // to an unconfigured client
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent("proxim")
            .build()
            .map_err(|e| ProximError::Geocode { reason: format!("client setup failed: {}", e) })?;
        Ok(Self { base_url: base_url.into(), client })
    }

    /// Raw search: distinguishes service failure (Err) from no match
    /// (Ok(None)). The `Geocoder` impl below folds both into `None`.
    async fn search(&self, address: &str) -> Result<Option<GeoPoint>> {
        let url = format!("{}/search", self.base_url.trim_end_matches('/'));

        let response = self
            .client
            .get(&url)
            .query(&[("q", address), ("format", "json"), ("limit", "1")])
            .send()
            .await
            .map_err(|e| ProximError::Geocode { reason: format!("request failed: {}", e) })?;

        if !response.status().is_success() {
            return Err(ProximError::Geocode {
                reason: format!("service returned {}", response.status()),
            });
        }

        let places: Vec<Place> = response
            .json()
            .await
            .map_err(|e| ProximError::Geocode { reason: format!("invalid response: {}", e) })?;

        let Some(place) = places.first() else {
            return Ok(None);
        };

        let lat: f64 = place.lat.parse().map_err(|_| ProximError::Geocode {
            reason: format!("non-numeric latitude '{}'", place.lat),
        })?;
        let lon: f64 = place.lon.parse().map_err(|_| ProximError::Geocode {
            reason: format!("non-numeric longitude '{}'", place.lon),
        })?;

        Ok(Some(GeoPoint::wgs84(lon, lat)))
    }
}

#[async_trait]
impl Geocoder for NominatimGeocoder {
    async fn geocode(&self, address: &str) -> Option<GeoPoint> {
        match self.search(address).await {
            Ok(Some(point)) => Some(point),
            Ok(None) => {
                tracing::warn!(address, "geocoder found no match");
                None
            }
            Err(e) => {
                tracing::warn!(address, error = %e, "geocoding failed");
                None
            }
        }
    }
}

/// One result row from the search endpoint (coordinates arrive as strings)
#[derive(Debug, Deserialize)]
struct Place {
    lat: String,
    lon: String,
}
