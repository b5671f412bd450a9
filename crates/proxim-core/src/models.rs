pub mod geometry;
pub mod records;

pub use geometry::{Crs, Distance, DistanceUnit, GeoPoint};
pub use records::{Category, FacilityRecord, NearestResult, ReferenceRecord};
