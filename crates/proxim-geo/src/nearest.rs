//! Nearest-facility resolution.
//!
//! Distances are planar meters in the measurement CRS: the reference point
//! and every candidate are projected into it first, then compared with
//! plain Euclidean distance. Ties break by first occurrence in the
//! candidate slice, so results are reproducible regardless of how the
//! candidates were produced.

use proxim_core::error::Result;
use proxim_core::models::{Crs, FacilityRecord, GeoPoint};

use crate::transform::project_for_measurement;

/// Resolve the single nearest candidate to a reference point.
///
/// Returns `Ok(None)` for an empty candidate set - the defined empty-set
/// policy, not an error. Otherwise returns the minimum-distance candidate
/// and its true ground distance in meters. Pure function: no candidate or
/// reference state is mutated.
pub fn nearest<'a>(
    reference: &GeoPoint,
    candidates: &[&'a FacilityRecord],
    measurement: &Crs,
) -> Result<Option<(f64, &'a FacilityRecord)>> {
    if candidates.is_empty() {
        return Ok(None);
    }

    let reference = project_for_measurement(&[reference], measurement)?;
    let reference = &reference[0];

    let candidate_points: Vec<&GeoPoint> = candidates.iter().map(|c| &c.point).collect();
    let projected = project_for_measurement(&candidate_points, measurement)?;

    let mut best: Option<(f64, usize)> = None;
    for (i, point) in projected.iter().enumerate() {
        let d = planar_distance(reference, point);
        // Strict < keeps the first occurrence on exact ties
        match best {
            Some((min, _)) if d >= min => {}
            _ => best = Some((d, i)),
        }
    }

    Ok(best.map(|(d, i)| (d, candidates[i])))
}

/// Resolve the `k` nearest candidates, ascending by distance.
///
/// Stable sort preserves first-occurrence order on equal distances. Asking
/// for more candidates than exist returns them all.
pub fn k_nearest<'a>(
    reference: &GeoPoint,
    candidates: &[&'a FacilityRecord],
    measurement: &Crs,
    k: usize,
) -> Result<Vec<(f64, &'a FacilityRecord)>> {
    if candidates.is_empty() || k == 0 {
        return Ok(Vec::new());
    }

    let reference = project_for_measurement(&[reference], measurement)?;
    let reference = &reference[0];

    let candidate_points: Vec<&GeoPoint> = candidates.iter().map(|c| &c.point).collect();
    let projected = project_for_measurement(&candidate_points, measurement)?;

    let mut ranked: Vec<(f64, &FacilityRecord)> = projected
        .iter()
        .zip(candidates.iter())
        .map(|(point, &record)| (planar_distance(reference, point), record))
        .collect();

    ranked.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(std::cmp::Ordering::Equal));
    ranked.truncate(k);
    Ok(ranked)
}

fn planar_distance(a: &GeoPoint, b: &GeoPoint) -> f64 {
    let dx = a.x - b.x;
    let dy = a.y - b.y;
    (dx * dx + dy * dy).sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use proxim_core::models::Category;

    /// Candidate at a projected offset from the plane origin; tagging the
    /// points with the measurement CRS itself makes distances exact
    /// without a reprojection step.
    fn candidate(name: &str, x: f64, y: f64) -> FacilityRecord {
        FacilityRecord::new(
            name,
            GeoPoint::new(x, y, Crs::mass_mainland()),
            Category::Grocery,
        )
    }

    fn origin() -> GeoPoint {
        GeoPoint::new(0.0, 0.0, Crs::mass_mainland())
    }

    #[test]
    fn test_known_offsets_select_minimum() {
        let stores =
            vec![candidate("far", 100.0, 0.0), candidate("near", 0.0, 50.0), candidate("farther", 200.0, 200.0)];
        let refs: Vec<&FacilityRecord> = stores.iter().collect();

        let (distance, facility) =
            nearest(&origin(), &refs, &Crs::mass_mainland()).unwrap().unwrap();

        assert_eq!(facility.name, "near");
        assert!((distance - 50.0).abs() < 1e-9);
    }

    #[test]
    fn test_empty_candidates_return_none() {
        let result = nearest(&origin(), &[], &Crs::mass_mainland()).unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn test_tie_breaks_by_first_occurrence() {
        // Two candidates at identical distance, opposite sides
        let stores = vec![candidate("east", 75.0, 0.0), candidate("west", -75.0, 0.0)];
        let refs: Vec<&FacilityRecord> = stores.iter().collect();

        let (_, facility) = nearest(&origin(), &refs, &Crs::mass_mainland()).unwrap().unwrap();
        assert_eq!(facility.name, "east");

        // Reversed input order flips the winner: order is the tie-break
        let reversed: Vec<&FacilityRecord> = stores.iter().rev().collect();
        let (_, facility) =
            nearest(&origin(), &reversed, &Crs::mass_mainland()).unwrap().unwrap();
        assert_eq!(facility.name, "west");
    }

    #[test]
    fn test_k_nearest_ascending_and_capped() {
        let stores = vec![
            candidate("c", 300.0, 0.0),
            candidate("a", 10.0, 0.0),
            candidate("b", 20.0, 0.0),
        ];
        let refs: Vec<&FacilityRecord> = stores.iter().collect();

        let ranked = k_nearest(&origin(), &refs, &Crs::mass_mainland(), 2).unwrap();
        let names: Vec<&str> = ranked.iter().map(|(_, f)| f.name.as_str()).collect();
        assert_eq!(names, vec!["a", "b"]);
        assert!(ranked[0].0 <= ranked[1].0);

        // k beyond the candidate count returns everything
        let all = k_nearest(&origin(), &refs, &Crs::mass_mainland(), 10).unwrap();
        assert_eq!(all.len(), 3);
    }

    proptest! {
        /// Brute-force cross-check: the resolved facility is at least as
        /// close as every other candidate.
        #[test]
        fn prop_nearest_is_global_minimum(
            coords in prop::collection::vec((-5000.0f64..5000.0, -5000.0f64..5000.0), 1..40),
            rx in -5000.0f64..5000.0,
            ry in -5000.0f64..5000.0,
        ) {
            let stores: Vec<FacilityRecord> = coords
                .iter()
                .enumerate()
                .map(|(i, &(x, y))| candidate(&format!("s{}", i), x, y))
                .collect();
            let refs: Vec<&FacilityRecord> = stores.iter().collect();
            let reference = GeoPoint::new(rx, ry, Crs::mass_mainland());

            let (distance, _) =
                nearest(&reference, &refs, &Crs::mass_mainland()).unwrap().unwrap();

            for &(x, y) in &coords {
                let d = ((rx - x).powi(2) + (ry - y).powi(2)).sqrt();
                prop_assert!(distance <= d + 1e-9);
            }
        }
    }
}
