use clap::{Parser, Subcommand};
use proxim_core::models::Category;
use std::path::PathBuf;
use std::str::FromStr;

/// Proxim - nearest-facility enrichment for geospatial point data
#[derive(Parser, Debug)]
#[command(name = "proxim")]
#[command(about = "Nearest-facility enrichment for geospatial point data", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Output results in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Path to a TOML config file (labels, CRS, distance unit)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Enrich reference locations with the nearest facility per category
    Enrich(EnrichArgs),

    /// List facilities within a radius of a point
    Radius(RadiusArgs),
}

#[derive(Parser, Debug)]
pub struct EnrichArgs {
    /// Facility GeoJSON file per category, as CATEGORY=PATH
    /// (e.g. grocery=data/retail.geojson). Repeatable.
    #[arg(short, long = "facilities", value_name = "CATEGORY=PATH", required = true)]
    pub facilities: Vec<CategoryFile>,

    /// Reference locations GeoJSON file (batch mode)
    #[arg(short, long)]
    pub references: Option<PathBuf>,

    /// Ad-hoc location name (single-location mode)
    #[arg(long, default_value = "Custom location")]
    pub name: String,

    /// Ad-hoc location latitude
    #[arg(long, requires = "lon", conflicts_with = "references")]
    pub lat: Option<f64>,

    /// Ad-hoc location longitude
    #[arg(long, requires = "lat", conflicts_with = "references")]
    pub lon: Option<f64>,

    /// Free-text address resolved through the geocoding service
    #[arg(long, conflicts_with_all = ["references", "lat", "lon"])]
    pub address: Option<String>,

    /// Geocoding service base URL
    #[arg(long, default_value = "https://nominatim.openstreetmap.org")]
    pub geocoder_url: String,

    /// Measurement CRS override (EPSG code)
    #[arg(long)]
    pub measurement_crs: Option<u32>,

    /// Distance unit for display (meters, kilometers, miles, feet)
    #[arg(long)]
    pub unit: Option<String>,
}

#[derive(Parser, Debug)]
pub struct RadiusArgs {
    /// Facility GeoJSON file per category, as CATEGORY=PATH. Repeatable.
    #[arg(short, long = "facilities", value_name = "CATEGORY=PATH", required = true)]
    pub facilities: Vec<CategoryFile>,

    /// Center latitude
    #[arg(long)]
    pub lat: f64,

    /// Center longitude
    #[arg(long)]
    pub lon: f64,

    /// Radius value
    #[arg(long)]
    pub radius: f64,

    /// Unit the radius is expressed in (meters, kilometers, miles, feet)
    #[arg(long, default_value = "miles")]
    pub unit: String,
}

/// A CATEGORY=PATH pair from the command line
#[derive(Debug, Clone)]
pub struct CategoryFile {
    pub category: Category,
    pub path: PathBuf,
}

impl FromStr for CategoryFile {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (category, path) = s
            .split_once('=')
            .ok_or_else(|| format!("expected CATEGORY=PATH, got '{}'", s))?;
        Ok(CategoryFile {
            category: category.parse()?,
            path: PathBuf::from(path),
        })
    }
}
