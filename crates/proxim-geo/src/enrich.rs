//! Enrichment orchestration: one nearest-facility result per reference
//! record per category.
//!
//! Each (record, category) pair is an independent pure computation, so a
//! pass can be sharded across workers with each worker owning a disjoint
//! slice of records and only reading the shared candidate subsets. The
//! default implementation here is the single-threaded pass; nothing in the
//! contract depends on iteration order.

use std::collections::BTreeMap;

use proxim_core::config::{LabelSpec, LabelTable};
use proxim_core::error::Result;
use proxim_core::models::{Category, Crs, FacilityRecord, NearestResult, ReferenceRecord};
use serde_json::Value;

use crate::nearest::nearest;

/// Candidate subsets keyed by the category they enrich
pub type CandidateMap<'a> = BTreeMap<Category, Vec<&'a FacilityRecord>>;

/// Run a full enrichment pass over a reference collection.
///
/// Every record's result slots are cleared up front, so a later pass fully
/// overwrites earlier results rather than merging with them. A category
/// whose candidate subset is empty leaves its slot absent; downstream
/// consumers can tell "no candidate available" from "candidate at
/// distance 0".
pub fn enrich(
    records: &mut [ReferenceRecord],
    candidates: &CandidateMap<'_>,
    labels: &LabelTable,
    measurement: &Crs,
) -> Result<()> {
    for record in records.iter_mut() {
        enrich_one(record, candidates, labels, measurement)?;
    }
    tracing::info!(
        records = records.len(),
        categories = candidates.len(),
        "enrichment pass complete"
    );
    Ok(())
}

/// Enrich a single reference record - the ad-hoc path uses this directly.
pub fn enrich_one(
    record: &mut ReferenceRecord,
    candidates: &CandidateMap<'_>,
    labels: &LabelTable,
    measurement: &Crs,
) -> Result<()> {
    record.nearest.clear();

    for (&category, subset) in candidates {
        if let Some((distance_m, facility)) = nearest(&record.point, subset, measurement)? {
            let facility_name = facility_label(facility, labels.get(&category));
            record.nearest.insert(
                category,
                NearestResult {
                    distance_m,
                    facility_name,
                    facility_point: facility.point.clone(),
                },
            );
        }
    }

    Ok(())
}

/// Extract a human-readable identity for a matched facility.
///
/// Reads the category's configured identity attribute; an absent or null
/// attribute falls back to the configured label. Without any spec for the
/// category, the record's own display name is used.
fn facility_label(facility: &FacilityRecord, spec: Option<&LabelSpec>) -> String {
    let Some(spec) = spec else {
        return facility.name.clone();
    };

    match facility.attribute(&spec.attribute) {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Null) | None => {
            tracing::debug!(
                facility = %facility.name,
                attribute = %spec.attribute,
                "identity attribute absent, using fallback label"
            );
            spec.fallback.clone()
        }
        Some(other) => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proxim_core::config::default_label_table;
    use proxim_core::models::GeoPoint;

    fn plane_point(x: f64, y: f64) -> GeoPoint {
        GeoPoint::new(x, y, Crs::mass_mainland())
    }

    fn grocery(name: &str, x: f64, y: f64) -> FacilityRecord {
        FacilityRecord::new(name, plane_point(x, y), Category::Grocery)
            .with_attribute("coname", Value::from(name))
    }

    fn fixture() -> (Vec<ReferenceRecord>, Vec<FacilityRecord>) {
        let dorms = vec![
            ReferenceRecord::new("West Village H", plane_point(0.0, 0.0)),
            ReferenceRecord::new("Stetson East", plane_point(1000.0, 0.0)),
        ];
        let stores = vec![grocery("Star Market", 0.0, 200.0), grocery("Stop & Shop", 900.0, 0.0)];
        (dorms, stores)
    }

    #[test]
    fn test_pass_fills_one_slot_per_category() {
        let (mut dorms, stores) = fixture();
        let mut candidates = CandidateMap::new();
        candidates.insert(Category::Grocery, stores.iter().collect());

        enrich(&mut dorms, &candidates, &default_label_table(), &Crs::mass_mainland()).unwrap();

        let first = dorms[0].nearest_in(Category::Grocery).unwrap();
        assert_eq!(first.facility_name, "Star Market");
        assert!((first.distance_m - 200.0).abs() < 1e-9);

        let second = dorms[1].nearest_in(Category::Grocery).unwrap();
        assert_eq!(second.facility_name, "Stop & Shop");
        assert!((second.distance_m - 100.0).abs() < 1e-9);

        // Untracked categories stay absent
        assert!(dorms[0].nearest_in(Category::TransitStop).is_none());
    }

    #[test]
    fn test_empty_subset_leaves_slot_absent() {
        let (mut dorms, _) = fixture();
        let mut candidates = CandidateMap::new();
        candidates.insert(Category::NamedChain, Vec::new());

        enrich(&mut dorms, &candidates, &default_label_table(), &Crs::mass_mainland()).unwrap();

        assert!(dorms[0].nearest_in(Category::NamedChain).is_none());
    }

    #[test]
    fn test_later_pass_overwrites_not_merges() {
        let (mut dorms, stores) = fixture();

        let mut first_pass = CandidateMap::new();
        first_pass.insert(Category::Grocery, stores.iter().collect());
        enrich(&mut dorms, &first_pass, &default_label_table(), &Crs::mass_mainland()).unwrap();
        assert!(dorms[0].nearest_in(Category::Grocery).is_some());

        // Second pass tracks a different category only; the grocery slot
        // from the first pass must not survive
        let chain = FacilityRecord::new(
            "Trader Joe's",
            plane_point(50.0, 50.0),
            Category::NamedChain,
        )
        .with_attribute("city_name", Value::from("Boston"));
        let chains = vec![chain];
        let mut second_pass = CandidateMap::new();
        second_pass.insert(Category::NamedChain, chains.iter().collect());

        enrich(&mut dorms, &second_pass, &default_label_table(), &Crs::mass_mainland()).unwrap();
        assert!(dorms[0].nearest_in(Category::Grocery).is_none());
        assert_eq!(
            dorms[0].nearest_in(Category::NamedChain).unwrap().facility_name,
            "Boston"
        );
    }

    #[test]
    fn test_repeated_pass_is_deterministic() {
        let (mut dorms, stores) = fixture();
        let mut candidates = CandidateMap::new();
        candidates.insert(Category::Grocery, stores.iter().collect());

        enrich(&mut dorms, &candidates, &default_label_table(), &Crs::mass_mainland()).unwrap();
        let first_run = dorms.clone();

        enrich(&mut dorms, &candidates, &default_label_table(), &Crs::mass_mainland()).unwrap();
        assert_eq!(dorms, first_run);
    }

    #[test]
    fn test_missing_identity_attribute_uses_fallback() {
        let mut dorm = ReferenceRecord::new("dorm", plane_point(0.0, 0.0));
        // No "coname" attribute on this one
        let bare = FacilityRecord::new("?", plane_point(10.0, 0.0), Category::Grocery);
        let stores = vec![bare];
        let mut candidates = CandidateMap::new();
        candidates.insert(Category::Grocery, stores.iter().collect());

        enrich_one(&mut dorm, &candidates, &default_label_table(), &Crs::mass_mainland()).unwrap();

        assert_eq!(
            dorm.nearest_in(Category::Grocery).unwrap().facility_name,
            "Grocery store"
        );
    }

    #[test]
    fn test_unconfigured_category_uses_record_name() {
        let bare = FacilityRecord::new("Ruggles", plane_point(5.0, 0.0), Category::TransitStop);
        assert_eq!(facility_label(&bare, None), "Ruggles");
    }

    #[test]
    fn test_result_points_keep_storage_crs() {
        // Facility stored in WGS 84; the result slot must carry the
        // storage point, not the measurement projection
        let mut dorm = ReferenceRecord::ad_hoc("My Apartment", 42.3398, -71.0892);
        let store = FacilityRecord::new(
            "Star Market",
            GeoPoint::wgs84(-71.10, 42.3450),
            Category::Grocery,
        )
        .with_attribute("coname", Value::from("Star Market"));
        let stores = vec![store];
        let mut candidates = CandidateMap::new();
        candidates.insert(Category::Grocery, stores.iter().collect());

        enrich_one(&mut dorm, &candidates, &default_label_table(), &Crs::mass_mainland()).unwrap();

        let result = dorm.nearest_in(Category::Grocery).unwrap();
        assert_eq!(result.facility_point.epsg(), Some(4326));
        assert!(result.distance_m > 0.0);
    }
}
