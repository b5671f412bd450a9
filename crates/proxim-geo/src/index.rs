//! Spatial index over a facility collection for radius queries.
//!
//! The nearest resolver stays a linear scan (exact, order-stable); this
//! index serves the radius filter, where a bounding-box pre-pass pays off
//! on the larger retail datasets. The exact check is a Haversine distance,
//! so both sides of a query must be in the same geographic CRS (degrees);
//! anything else is an error, never a silently empty result.

use geo::{Distance, Haversine, Point};
use proxim_core::error::{ProximError, Result};
use proxim_core::models::{Crs, FacilityRecord, GeoPoint};
use rstar::{RTree, RTreeObject, AABB};

// Meters per degree of latitude, used only to pad the candidate envelope.
const METERS_PER_DEGREE: f64 = 111_320.0;

/// A facility's position in the tree: its slice index plus a point envelope
#[derive(Debug, Clone, PartialEq)]
struct IndexedFacility {
    idx: usize,
    envelope: AABB<[f64; 2]>,
}

impl RTreeObject for IndexedFacility {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        self.envelope
    }
}

/// Spatial index over a borrowed facility slice
pub struct FacilityIndex<'a> {
    facilities: &'a [FacilityRecord],
    tree: RTree<IndexedFacility>,
    // The single CRS shared by every indexed facility; None iff empty
    crs: Option<Crs>,
}

impl<'a> FacilityIndex<'a> {
    /// Bulk-load an index over a facility collection.
    ///
    /// Every facility must carry the same CRS tag; an untagged point or a
    /// collection mixing systems is rejected here rather than producing
    /// meaningless distances later.
    pub fn new(facilities: &'a [FacilityRecord]) -> Result<Self> {
        let mut crs: Option<Crs> = None;
        for facility in facilities {
            let tag = facility.point.crs.as_ref().ok_or_else(|| ProximError::UndefinedCrs {
                context: format!("facility '{}'", facility.name),
            })?;
            match &crs {
                None => crs = Some(tag.clone()),
                Some(existing) if existing.epsg == tag.epsg => {}
                Some(existing) => {
                    return Err(ProximError::Projection {
                        from: tag.epsg,
                        to: existing.epsg,
                        reason: "facility collection mixes coordinate systems".to_string(),
                    })
                }
            }
        }

        let indexed: Vec<IndexedFacility> = facilities
            .iter()
            .enumerate()
            .map(|(idx, f)| IndexedFacility {
                idx,
                envelope: AABB::from_point([f.point.x, f.point.y]),
            })
            .collect();

        Ok(Self { facilities, tree: RTree::bulk_load(indexed), crs })
    }

    /// Facilities within `radius_m` meters of a geographic center point,
    /// in their original collection order.
    ///
    /// The center must share the collection's CRS, and that CRS must be
    /// geographic: the exact check is a Haversine distance over degrees.
    pub fn within_radius(&self, center: &GeoPoint, radius_m: f64) -> Result<Vec<&'a FacilityRecord>> {
        let center_crs = center.crs.as_ref().ok_or_else(|| ProximError::UndefinedCrs {
            context: "radius query center".to_string(),
        })?;
        if !center_crs.is_geographic() {
            return Err(ProximError::Projection {
                from: center_crs.epsg,
                to: 4326,
                reason: "radius query needs geographic coordinates".to_string(),
            });
        }
        if let Some(crs) = &self.crs {
            if crs.epsg != center_crs.epsg {
                return Err(ProximError::Projection {
                    from: crs.epsg,
                    to: center_crs.epsg,
                    reason: "facilities and query center are in different coordinate systems"
                        .to_string(),
                });
            }
        }

        // Degree envelope padded for longitude convergence at this latitude
        let lat_pad = radius_m / METERS_PER_DEGREE;
        let cos_lat = center.y.to_radians().cos().max(0.01);
        let lon_pad = lat_pad / cos_lat;

        let envelope = AABB::from_corners(
            [center.x - lon_pad, center.y - lat_pad],
            [center.x + lon_pad, center.y + lat_pad],
        );

        let center_pt = Point::new(center.x, center.y);
        let mut hits: Vec<usize> = self
            .tree
            .locate_in_envelope(&envelope)
            .filter(|indexed| {
                let f = &self.facilities[indexed.idx];
                let d = Haversine.distance(center_pt, Point::new(f.point.x, f.point.y));
                d <= radius_m
            })
            .map(|indexed| indexed.idx)
            .collect();

        hits.sort_unstable();
        Ok(hits.into_iter().map(|idx| &self.facilities[idx]).collect())
    }

    /// Number of indexed facilities
    pub fn len(&self) -> usize {
        self.tree.size()
    }

    /// Whether the index is empty
    pub fn is_empty(&self) -> bool {
        self.tree.size() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proxim_core::models::Category;

    fn store(name: &str, lon: f64, lat: f64) -> FacilityRecord {
        FacilityRecord::new(name, GeoPoint::wgs84(lon, lat), Category::Grocery)
    }

    #[test]
    fn test_radius_filter_exact_membership() {
        // Center at Northeastern; one store ~0.9 km east, one ~11 km east
        let stores = vec![
            store("near", -71.0782, 42.3398),
            store("far", -70.9550, 42.3398),
        ];
        let index = FacilityIndex::new(&stores).unwrap();
        let center = GeoPoint::wgs84(-71.0892, 42.3398);

        let within = index.within_radius(&center, 2_000.0).unwrap();
        assert_eq!(within.len(), 1);
        assert_eq!(within[0].name, "near");

        let wider = index.within_radius(&center, 15_000.0).unwrap();
        assert_eq!(wider.len(), 2);
    }

    #[test]
    fn test_radius_filter_preserves_collection_order() {
        let stores = vec![
            store("b", -71.0800, 42.3400),
            store("a", -71.0900, 42.3400),
            store("c", -71.0850, 42.3400),
        ];
        let index = FacilityIndex::new(&stores).unwrap();
        let center = GeoPoint::wgs84(-71.0850, 42.3400);

        let names: Vec<&str> = index
            .within_radius(&center, 5_000.0)
            .unwrap()
            .iter()
            .map(|f| f.name.as_str())
            .collect();
        assert_eq!(names, vec!["b", "a", "c"]);
    }

    #[test]
    fn test_empty_index() {
        let stores: Vec<FacilityRecord> = Vec::new();
        let index = FacilityIndex::new(&stores).unwrap();
        assert!(index.is_empty());
        assert!(index.within_radius(&GeoPoint::wgs84(0.0, 0.0), 1_000.0).unwrap().is_empty());
    }

    #[test]
    fn test_projected_collection_is_an_error_not_an_empty_result() {
        // Easting/northing magnitudes would fall outside any degree
        // envelope, so without the CRS check this query would return an
        // empty set instead of failing.
        let stores = vec![FacilityRecord::new(
            "projected store",
            GeoPoint::new(236_000.0, 895_000.0, Crs::mass_mainland()),
            Category::Grocery,
        )];
        let index = FacilityIndex::new(&stores).unwrap();
        let center = GeoPoint::new(235_000.0, 894_000.0, Crs::mass_mainland());

        let err = index.within_radius(&center, 2_000.0).unwrap_err();
        assert!(matches!(err, ProximError::Projection { from: 26986, .. }));
    }

    #[test]
    fn test_center_crs_must_match_collection() {
        let stores = vec![FacilityRecord::new(
            "projected store",
            GeoPoint::new(236_000.0, 895_000.0, Crs::mass_mainland()),
            Category::Grocery,
        )];
        let index = FacilityIndex::new(&stores).unwrap();
        let center = GeoPoint::wgs84(-71.0892, 42.3398);

        let err = index.within_radius(&center, 2_000.0).unwrap_err();
        assert!(matches!(err, ProximError::Projection { from: 26986, to: 4326, .. }));
    }

    #[test]
    fn test_untagged_center_rejected() {
        let stores = vec![store("near", -71.0782, 42.3398)];
        let index = FacilityIndex::new(&stores).unwrap();
        let center = GeoPoint::untagged(-71.0892, 42.3398);

        assert!(matches!(
            index.within_radius(&center, 2_000.0),
            Err(ProximError::UndefinedCrs { .. })
        ));
    }

    #[test]
    fn test_mixed_crs_collection_rejected() {
        let stores = vec![
            store("geographic", -71.0782, 42.3398),
            FacilityRecord::new(
                "projected",
                GeoPoint::new(236_000.0, 895_000.0, Crs::mass_mainland()),
                Category::Grocery,
            ),
        ];
        assert!(matches!(
            FacilityIndex::new(&stores),
            Err(ProximError::Projection { .. })
        ));
    }
}
