//! Layered configuration for the enrichment engine.
//!
//! Values resolve with the usual precedence: defaults < config file <
//! environment < CLI arguments. The per-category identity-label table is
//! configuration data, not code: it tells the orchestrator which facility
//! attribute names a match and what label to fall back to when the
//! attribute is absent.

use crate::error::{ProximError, Result};
use crate::models::records::Category;
use crate::models::DistanceUnit;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::env;
use std::fs;
use std::path::Path;

/// Configuration source for tracking where values come from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConfigSource {
    /// Default value
    Default,
    /// Loaded from config file
    File,
    /// Loaded from environment variable
    Environment,
    /// Provided via CLI argument
    Cli,
}

impl ConfigSource {
    /// Returns the precedence level (higher = higher priority)
    pub fn precedence(&self) -> u8 {
        match self {
            ConfigSource::Default => 0,
            ConfigSource::File => 1,
            ConfigSource::Environment => 2,
            ConfigSource::Cli => 3,
        }
    }
}

/// A configuration value with its source
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigValue<T> {
    pub value: T,
    pub source: ConfigSource,
}

impl<T> ConfigValue<T> {
    pub fn new(value: T, source: ConfigSource) -> Self {
        Self { value, source }
    }

    /// Update the value if the new source has higher precedence
    pub fn update(&mut self, value: T, source: ConfigSource) {
        if source.precedence() > self.source.precedence() {
            self.value = value;
            self.source = source;
        }
    }
}

/// How to name the matched facility for one category: read this attribute
/// from the facility record, or use the fallback label when it is absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabelSpec {
    pub attribute: String,
    pub fallback: String,
}

impl LabelSpec {
    pub fn new(attribute: impl Into<String>, fallback: impl Into<String>) -> Self {
        Self { attribute: attribute.into(), fallback: fallback.into() }
    }
}

/// Per-category identity-label table
pub type LabelTable = BTreeMap<Category, LabelSpec>;

/// Label table matching the original study datasets: retail rows name the
/// company in `coname`, the chain dataset names the city, transit rows
/// name the station.
pub fn default_label_table() -> LabelTable {
    let mut labels = LabelTable::new();
    labels.insert(Category::Grocery, LabelSpec::new("coname", "Grocery store"));
    labels.insert(
        Category::ConveniencePharmacy,
        LabelSpec::new("coname", "Convenience store"),
    );
    labels.insert(Category::NamedChain, LabelSpec::new("city_name", "Trader Joe's"));
    labels.insert(Category::TransitStop, LabelSpec::new("station", "T stop"));
    labels.insert(Category::TransitLine, LabelSpec::new("line", "T line"));
    labels
}

/// Layered configuration for an enrichment run
#[derive(Debug, Clone)]
pub struct EnrichConfig {
    /// CRS all collections are aligned to for storage/display (EPSG)
    pub storage_crs: ConfigValue<u32>,
    /// Projected CRS distances are measured in (EPSG)
    pub measurement_crs: ConfigValue<u32>,
    /// Unit used when presenting distances
    pub distance_unit: ConfigValue<DistanceUnit>,
    /// Per-category facility naming
    pub labels: LabelTable,
}

impl EnrichConfig {
    /// Create a new configuration with default values
    pub fn with_defaults() -> Self {
        Self {
            storage_crs: ConfigValue::new(4326, ConfigSource::Default),
            measurement_crs: ConfigValue::new(26986, ConfigSource::Default),
            distance_unit: ConfigValue::new(DistanceUnit::Meters, ConfigSource::Default),
            labels: default_label_table(),
        }
    }

    /// Load configuration from a TOML file
    pub fn load_from_file<P: AsRef<Path>>(mut self, path: P) -> Result<Self> {
        let content =
            fs::read_to_string(path.as_ref()).map_err(|e| ProximError::ConfigInvalid {
                key: "file".to_string(),
                reason: format!("Failed to read config file: {}", e),
            })?;

        let file_config: FileConfig =
            toml::from_str(&content).map_err(|e| ProximError::ConfigInvalid {
                key: "file".to_string(),
                reason: format!("Failed to parse TOML: {}", e),
            })?;

        if let Some(crs) = file_config.storage_crs {
            self.storage_crs.update(crs, ConfigSource::File);
        }

        if let Some(crs) = file_config.measurement_crs {
            self.measurement_crs.update(crs, ConfigSource::File);
        }

        if let Some(unit) = file_config.distance_unit {
            self.distance_unit.update(unit, ConfigSource::File);
        }

        if let Some(labels) = file_config.labels {
            // File labels replace defaults per category, untouched
            // categories keep their default spec
            for (key, spec) in labels {
                let category: Category =
                    key.parse().map_err(|reason| ProximError::ConfigInvalid {
                        key: format!("labels.{}", key),
                        reason,
                    })?;
                self.labels.insert(category, spec);
            }
        }

        Ok(self)
    }

    /// Load configuration from environment variables
    pub fn load_from_env(mut self) -> Self {
        if let Ok(crs_str) = env::var("PROXIM_STORAGE_CRS") {
            match crs_str.parse::<u32>() {
                Ok(crs) => self.storage_crs.update(crs, ConfigSource::Environment),
                Err(_) => tracing::warn!(
                    "Invalid PROXIM_STORAGE_CRS value '{}': expected integer EPSG code",
                    crs_str
                ),
            }
        }

        if let Ok(crs_str) = env::var("PROXIM_MEASUREMENT_CRS") {
            match crs_str.parse::<u32>() {
                Ok(crs) => self.measurement_crs.update(crs, ConfigSource::Environment),
                Err(_) => tracing::warn!(
                    "Invalid PROXIM_MEASUREMENT_CRS value '{}': expected integer EPSG code",
                    crs_str
                ),
            }
        }

        if let Ok(unit_str) = env::var("PROXIM_DISTANCE_UNIT") {
            match parse_distance_unit(&unit_str) {
                Some(unit) => self.distance_unit.update(unit, ConfigSource::Environment),
                None => tracing::warn!(
                    "Invalid PROXIM_DISTANCE_UNIT value '{}': expected meters, kilometers, miles, or feet",
                    unit_str
                ),
            }
        }

        self
    }

    /// Apply CLI overrides (highest precedence)
    pub fn apply_cli(
        mut self,
        measurement_crs: Option<u32>,
        distance_unit: Option<DistanceUnit>,
    ) -> Self {
        if let Some(crs) = measurement_crs {
            self.measurement_crs.update(crs, ConfigSource::Cli);
        }
        if let Some(unit) = distance_unit {
            self.distance_unit.update(unit, ConfigSource::Cli);
        }
        self
    }
}

impl Default for EnrichConfig {
    fn default() -> Self {
        Self::with_defaults()
    }
}

/// Parse a distance unit name (config file / env spelling)
pub fn parse_distance_unit(s: &str) -> Option<DistanceUnit> {
    match s.to_ascii_lowercase().as_str() {
        "meters" | "m" => Some(DistanceUnit::Meters),
        "kilometers" | "km" => Some(DistanceUnit::Kilometers),
        "miles" | "mi" => Some(DistanceUnit::Miles),
        "feet" | "ft" => Some(DistanceUnit::Feet),
        _ => None,
    }
}

/// Shape of the TOML config file
#[derive(Debug, Deserialize)]
struct FileConfig {
    storage_crs: Option<u32>,
    measurement_crs: Option<u32>,
    distance_unit: Option<DistanceUnit>,
    labels: Option<BTreeMap<String, LabelSpec>>,
}
