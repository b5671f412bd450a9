//! CRS transformation and normalization

use proj::Proj;
use proxim_core::error::{ProximError, Result};
use proxim_core::models::{Crs, FacilityRecord, GeoPoint};
use std::collections::HashMap;

/// Check if two CRS are the same
pub fn crs_match(crs1: &Crs, crs2: &Crs) -> bool {
    crs1.epsg == crs2.epsg
}

/// Reprojects points into one target CRS, building at most one `Proj`
/// pipeline per distinct source EPSG code.
struct Reprojector {
    target: Crs,
    pipelines: HashMap<u32, Proj>,
}

impl Reprojector {
    fn new(target: &Crs) -> Self {
        Self { target: target.clone(), pipelines: HashMap::new() }
    }

    fn point(&mut self, point: &GeoPoint) -> Result<GeoPoint> {
        let source = point.crs.as_ref().ok_or_else(|| ProximError::UndefinedCrs {
            context: format!("point ({}, {})", point.x, point.y),
        })?;

        // Already in the target system: pass through bit-identical, so
        // aligning twice cannot drift coordinates
        if crs_match(source, &self.target) {
            return Ok(point.clone());
        }

        let from = source.epsg;
        let to = self.target.epsg;

        if !self.pipelines.contains_key(&from) {
            let proj = Proj::new_known_crs(
                &format!("EPSG:{}", from),
                &format!("EPSG:{}", to),
                None,
            )
            .map_err(|e| ProximError::Projection {
                from,
                to,
                reason: format!("Failed to create projection: {}", e),
            })?;
            self.pipelines.insert(from, proj);
        }

        let proj = &self.pipelines[&from];
        let (x, y) = proj.convert((point.x, point.y)).map_err(|e| ProximError::Projection {
            from,
            to,
            reason: format!("Projection failed: {}", e),
        })?;

        Ok(GeoPoint::new(x, y, self.target.clone()))
    }
}

/// Reproject a single point into a target CRS.
///
/// Pass-through clone when the point is already expressed in the target;
/// `UndefinedCrs` when the point carries no tag.
pub fn reproject_point(point: &GeoPoint, target: &Crs) -> Result<GeoPoint> {
    Reprojector::new(target).point(point)
}

/// Align facility collections so every output point is expressed in the
/// target CRS. Collections already in the target pass through unchanged.
///
/// Idempotent: aligning an aligned collection is a no-op on coordinates.
pub fn align_facilities(target: &Crs, collections: &mut [Vec<FacilityRecord>]) -> Result<()> {
    let mut reprojector = Reprojector::new(target);
    for collection in collections.iter_mut() {
        for record in collection.iter_mut() {
            record.point = reprojector.point(&record.point)?;
        }
    }
    Ok(())
}

/// Project points into the measurement CRS, the projected system in which
/// planar offsets are true ground meters. Used exclusively for distance
/// computation, never for storage or display.
pub fn project_for_measurement(points: &[&GeoPoint], measurement: &Crs) -> Result<Vec<GeoPoint>> {
    let mut reprojector = Reprojector::new(measurement);
    points.iter().map(|p| reprojector.point(p)).collect()
}
