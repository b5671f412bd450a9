//! Attribute-predicate filtering of facility collections.
//!
//! Filtering produces a read-only derived view: a vector of borrows into
//! the source collection, in original order. An empty subset is a normal
//! value, not a fault; the resolver treats it as its defined empty-set
//! branch.

use proxim_core::models::FacilityRecord;
use serde_json::Value;

/// Attribute predicate for classifying a raw facility collection
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    /// Exact match on a named attribute
    Equals { attribute: String, value: Value },
    /// Membership-in-set on a named attribute (postal-code and
    /// chain-name allowlists)
    OneOf { attribute: String, values: Vec<Value> },
}

impl Predicate {
    pub fn equals(attribute: impl Into<String>, value: impl Into<Value>) -> Self {
        Predicate::Equals { attribute: attribute.into(), value: value.into() }
    }

    pub fn one_of(attribute: impl Into<String>, values: Vec<Value>) -> Self {
        Predicate::OneOf { attribute: attribute.into(), values }
    }

    /// Whether a facility record satisfies this predicate
    pub fn matches(&self, record: &FacilityRecord) -> bool {
        match self {
            Predicate::Equals { attribute, value } => {
                record.attribute(attribute) == Some(value)
            }
            Predicate::OneOf { attribute, values } => record
                .attribute(attribute)
                .map(|v| values.contains(v))
                .unwrap_or(false),
        }
    }

    /// Grocery stores in the source retail dataset
    pub fn grocery_store_types() -> Self {
        Predicate::equals("store_type", "Supermarket or Other Grocery")
    }

    /// Convenience stores, pharmacies, and drug stores in the source
    /// retail dataset
    pub fn convenience_pharmacy_store_types() -> Self {
        Predicate::equals("store_type", "Convenience Stores, Pharmacies, and Drug Stores")
    }

    /// Chain locations inside the greater-Boston postal allowlist
    pub fn boston_postal_allowlist() -> Self {
        let zips = [2116, 2115, 2446, 2139, 2494, 2476, 2465, 2138, 1803, 1906, 1960];
        Predicate::one_of("postal_cod", zips.iter().map(|&z| Value::from(z)).collect())
    }
}

/// Classify a facility collection into the subset satisfying a predicate.
///
/// The source is not mutated; the subset preserves record identity and
/// original ordering. No match returns an empty subset, not an error.
pub fn filter_facilities<'a>(
    facilities: &'a [FacilityRecord],
    predicate: &Predicate,
) -> Vec<&'a FacilityRecord> {
    facilities.iter().filter(|f| predicate.matches(f)).collect()
}
