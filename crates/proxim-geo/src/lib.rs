//! Proxim Geo - CRS normalization, filtering, and nearest-facility resolution
//!
//! This crate holds all geospatial computation: aligning point collections
//! to a common CRS, classifying facilities by attribute predicate, resolving
//! the nearest facility per category, and orchestrating a full enrichment
//! pass over a reference collection.

pub mod enrich;
pub mod filter;
pub mod index;
pub mod nearest;
pub mod transform;

// Re-export key operations for convenience
pub use enrich::{enrich, enrich_one};
pub use filter::{filter_facilities, Predicate};
pub use index::FacilityIndex;
pub use nearest::{k_nearest, nearest};
pub use transform::{align_facilities, crs_match, project_for_measurement, reproject_point};
