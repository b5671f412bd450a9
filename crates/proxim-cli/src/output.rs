//! Human and JSON output for enrichment results.

use console::style;
use proxim_core::models::{DistanceUnit, FacilityRecord, ReferenceRecord};
use serde::Serialize;
use std::fmt::Display;
use tabled::{settings::Style, Table, Tabled};

/// Output format mode
#[derive(Debug, Clone, Copy)]
pub enum OutputFormat {
    Human,
    Json,
}

pub struct OutputWriter {
    format: OutputFormat,
}

impl OutputWriter {
    pub fn new(json: bool) -> Self {
        Self {
            format: if json { OutputFormat::Json } else { OutputFormat::Human },
        }
    }

    pub fn warning(&self, message: impl Display) {
        match self.format {
            OutputFormat::Human => {
                eprintln!("{} {}", style("⚠").yellow().bold(), message);
            }
            OutputFormat::Json => {
                let output = serde_json::json!({
                    "status": "warning",
                    "message": message.to_string(),
                });
                eprintln!("{}", serde_json::to_string_pretty(&output).unwrap());
            }
        }
    }

    pub fn error(&self, message: impl Display) {
        match self.format {
            OutputFormat::Human => {
                eprintln!("{} {}", style("✗").red().bold(), message);
            }
            OutputFormat::Json => {
                let output = serde_json::json!({
                    "status": "error",
                    "message": message.to_string(),
                });
                eprintln!("{}", serde_json::to_string_pretty(&output).unwrap());
            }
        }
    }

    /// Print enriched reference records: one row per populated slot, or
    /// the records verbatim as JSON.
    pub fn enriched(&self, records: &[ReferenceRecord], unit: DistanceUnit) {
        match self.format {
            OutputFormat::Human => {
                let rows: Vec<NearestRow> = records
                    .iter()
                    .flat_map(|record| {
                        record.nearest.iter().map(|(category, result)| NearestRow {
                            reference: record.name.clone(),
                            category: category.to_string(),
                            facility: result.facility_name.clone(),
                            distance: format!(
                                "{:.2} {}",
                                unit.from_meters(result.distance_m),
                                unit_suffix(unit)
                            ),
                            lon: format!("{:.5}", result.facility_point.x),
                            lat: format!("{:.5}", result.facility_point.y),
                        })
                    })
                    .collect();

                if rows.is_empty() {
                    println!("{} no facilities resolved", style("ℹ").blue().bold());
                    return;
                }

                let mut table = Table::new(rows);
                table.with(Style::rounded());
                println!("{}", table);
            }
            OutputFormat::Json => {
                let output = EnrichedOutput { distance_unit: unit, records };
                println!("{}", serde_json::to_string_pretty(&output).unwrap());
            }
        }
    }

    /// Print a facility listing (radius query results)
    pub fn facilities(&self, facilities: &[&FacilityRecord]) {
        match self.format {
            OutputFormat::Human => {
                if facilities.is_empty() {
                    println!("{} no facilities within radius", style("ℹ").blue().bold());
                    return;
                }

                let rows: Vec<FacilityRow> = facilities
                    .iter()
                    .map(|f| FacilityRow {
                        name: f.name.clone(),
                        category: f.category.to_string(),
                        city: f.city.clone().unwrap_or_else(|| "-".to_string()),
                        lon: format!("{:.5}", f.point.x),
                        lat: format!("{:.5}", f.point.y),
                    })
                    .collect();

                let mut table = Table::new(rows);
                table.with(Style::rounded());
                println!("{}", table);
            }
            OutputFormat::Json => {
                println!("{}", serde_json::to_string_pretty(&facilities).unwrap());
            }
        }
    }
}

fn unit_suffix(unit: DistanceUnit) -> &'static str {
    match unit {
        DistanceUnit::Meters => "m",
        DistanceUnit::Kilometers => "km",
        DistanceUnit::Miles => "mi",
        DistanceUnit::Feet => "ft",
    }
}

#[derive(Tabled)]
struct NearestRow {
    #[tabled(rename = "Reference")]
    reference: String,
    #[tabled(rename = "Category")]
    category: String,
    #[tabled(rename = "Nearest")]
    facility: String,
    #[tabled(rename = "Distance")]
    distance: String,
    #[tabled(rename = "Lon")]
    lon: String,
    #[tabled(rename = "Lat")]
    lat: String,
}

#[derive(Tabled)]
struct FacilityRow {
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Category")]
    category: String,
    #[tabled(rename = "City")]
    city: String,
    #[tabled(rename = "Lon")]
    lon: String,
    #[tabled(rename = "Lat")]
    lat: String,
}

#[derive(Serialize)]
struct EnrichedOutput<'a> {
    distance_unit: DistanceUnit,
    records: &'a [ReferenceRecord],
}
