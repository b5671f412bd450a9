//! GeoJSON loading for facility and reference collections.
//!
//! This is the loader collaborator from the core's point of view: files
//! arrive here, `FacilityRecord`/`ReferenceRecord` collections leave, each
//! point tagged with the collection's CRS (the GeoJSON `crs` member, or
//! WGS 84 when absent).

use std::fs;
use std::path::{Path, PathBuf};

use proxim_core::error::{ProximError, Result};
use proxim_core::models::{Category, Crs, FacilityRecord, GeoPoint, ReferenceRecord};
use proxim_core::ports::{FacilitySource, ReferenceSource};
use serde_json::{Map, Value};

/// A GeoJSON file acting as a facility source for one category
pub struct GeoJsonFacilityFile {
    pub path: PathBuf,
    pub category: Category,
}

impl FacilitySource for GeoJsonFacilityFile {
    fn load_facilities(&self) -> Result<Vec<FacilityRecord>> {
        load_facilities(&self.path, self.category)
    }
}

/// A GeoJSON file acting as a reference source
pub struct GeoJsonReferenceFile {
    pub path: PathBuf,
}

impl ReferenceSource for GeoJsonReferenceFile {
    fn load_references(&self) -> Result<Vec<ReferenceRecord>> {
        load_references(&self.path)
    }
}

/// Load a facility collection from a GeoJSON FeatureCollection
pub fn load_facilities(path: &Path, category: Category) -> Result<Vec<FacilityRecord>> {
    let (features, crs) = read_feature_collection(path)?;

    let mut records = Vec::with_capacity(features.len());
    for (idx, feature) in features.iter().enumerate() {
        let Some(point) = feature_point(feature, &crs) else {
            tracing::warn!(
                file = %path.display(),
                feature = idx,
                "skipping feature without point geometry"
            );
            continue;
        };

        let props = feature.properties.clone().unwrap_or_default();
        let name = first_string(&props, &["name", "Name", "coname", "station"])
            .unwrap_or_else(|| format!("feature {}", idx));
        let address = first_string(&props, &["address", "staddr", "street_address"]);
        let city = first_string(&props, &["city", "stcity", "city_name"]);

        records.push(FacilityRecord {
            name,
            address,
            city,
            point,
            category,
            attributes: props,
        });
    }

    tracing::info!(
        file = %path.display(),
        category = %category,
        count = records.len(),
        "loaded facility collection"
    );
    Ok(records)
}

/// Load a reference collection from a GeoJSON FeatureCollection
pub fn load_references(path: &Path) -> Result<Vec<ReferenceRecord>> {
    let (features, crs) = read_feature_collection(path)?;

    let mut records = Vec::with_capacity(features.len());
    for (idx, feature) in features.iter().enumerate() {
        let Some(point) = feature_point(feature, &crs) else {
            tracing::warn!(
                file = %path.display(),
                feature = idx,
                "skipping feature without point geometry"
            );
            continue;
        };

        let props = feature.properties.clone().unwrap_or_default();
        let name = first_string(&props, &["name", "Name"])
            .unwrap_or_else(|| format!("feature {}", idx));

        records.push(ReferenceRecord {
            name,
            point,
            attributes: props,
            nearest: Default::default(),
        });
    }

    tracing::info!(file = %path.display(), count = records.len(), "loaded reference collection");
    Ok(records)
}

/// Parse a file into its features and collection CRS (EPSG, 4326 default)
fn read_feature_collection(path: &Path) -> Result<(Vec<geojson::Feature>, Crs)> {
    let content = fs::read_to_string(path).map_err(ProximError::Io)?;

    let geojson: geojson::GeoJson = content.parse().map_err(|e| {
        ProximError::Serialization(format!("{}: invalid GeoJSON: {}", path.display(), e))
    })?;

    match geojson {
        geojson::GeoJson::FeatureCollection(fc) => {
            let epsg = fc
                .foreign_members
                .as_ref()
                .and_then(|fm| fm.get("crs"))
                .and_then(extract_epsg_from_crs)
                .unwrap_or(4326);
            let crs = Crs::new(epsg, format!("EPSG:{}", epsg));
            Ok((fc.features, crs))
        }
        geojson::GeoJson::Feature(feature) => Ok((vec![feature], Crs::wgs84())),
        geojson::GeoJson::Geometry(_) => Err(ProximError::Serialization(format!(
            "{}: expected a FeatureCollection, got a bare geometry",
            path.display()
        ))),
    }
}

/// The feature's point, tagged with the collection CRS
fn feature_point(feature: &geojson::Feature, crs: &Crs) -> Option<GeoPoint> {
    match feature.geometry.as_ref().map(|g| &g.value) {
        Some(geojson::Value::Point(coords)) if coords.len() >= 2 => {
            Some(GeoPoint::new(coords[0], coords[1], crs.clone()))
        }
        _ => None,
    }
}

/// First present-and-string property among the candidate keys
fn first_string(props: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    keys.iter()
        .find_map(|k| props.get(*k).and_then(Value::as_str))
        .map(str::to_string)
}

/// Extract EPSG code from a GeoJSON CRS member
fn extract_epsg_from_crs(crs: &Value) -> Option<u32> {
    // Parse "EPSG:4326" or "urn:ogc:def:crs:EPSG::4326"
    crs.get("properties")
        .and_then(|props| props.get("name"))
        .and_then(Value::as_str)
        .and_then(|name| name.split(':').next_back())
        .and_then(|epsg| epsg.parse().ok())
}
