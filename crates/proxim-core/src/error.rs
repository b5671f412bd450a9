//! Error types for proxim

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProximError {
    // CRS errors
    #[error("Undefined CRS: {context} carries no coordinate reference system tag")]
    UndefinedCrs { context: String },

    #[error("Projection from EPSG:{from} to EPSG:{to} failed: {reason}")]
    Projection {
        from: u32,
        to: u32,
        reason: String,
    },

    // Geocoding errors (absorbed at the Geocoder port; see ports.rs)
    #[error("Geocoding failed: {reason}")]
    Geocode { reason: String },

    // Configuration errors
    #[error("Missing required configuration: {key}")]
    ConfigMissing { key: String },

    #[error("Invalid configuration value for {key}: {reason}")]
    ConfigInvalid { key: String, reason: String },

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),
}

pub type Result<T> = std::result::Result<T, ProximError>;
