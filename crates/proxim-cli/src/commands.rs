//! Command implementations

use std::collections::BTreeMap;

use anyhow::{bail, Context, Result};
use proxim_core::config::{parse_distance_unit, EnrichConfig};
use proxim_core::models::{Category, Crs, FacilityRecord, ReferenceRecord};
use proxim_core::ports::{FacilitySource, Geocoder, ReferenceSource};
use proxim_geo::enrich::CandidateMap;
use proxim_geo::{align_facilities, enrich, FacilityIndex};

use crate::cli::{Cli, Commands, EnrichArgs, RadiusArgs};
use crate::geocode::NominatimGeocoder;
use crate::loader::{GeoJsonFacilityFile, GeoJsonReferenceFile};
use crate::output::OutputWriter;

/// Execute a CLI command
pub async fn execute(cli: Cli) -> Result<()> {
    let output = OutputWriter::new(cli.json);

    let mut config = EnrichConfig::with_defaults();
    if let Some(path) = &cli.config {
        config = config
            .load_from_file(path)
            .with_context(|| format!("loading config from {}", path.display()))?;
    }
    let config = config.load_from_env();

    match cli.command {
        Commands::Enrich(args) => enrich_command(args, config, &output).await,
        Commands::Radius(args) => radius_command(args, &output),
    }
}

async fn enrich_command(
    args: EnrichArgs,
    config: EnrichConfig,
    output: &OutputWriter,
) -> Result<()> {
    let unit_override = match &args.unit {
        Some(s) => Some(
            parse_distance_unit(s)
                .ok_or_else(|| anyhow::anyhow!("unknown distance unit '{}'", s))?,
        ),
        None => None,
    };
    let config = config.apply_cli(args.measurement_crs, unit_override);

    let storage = Crs::from_epsg(config.storage_crs.value);
    let measurement = Crs::from_epsg(config.measurement_crs.value);

    // Load the reference side first: without a location there is nothing
    // to enrich and no reason to read the facility files
    let mut records: Vec<ReferenceRecord> = if let Some(path) = &args.references {
        GeoJsonReferenceFile { path: path.clone() }
            .load_references()
            .with_context(|| format!("loading references from {}", path.display()))?
    } else if let (Some(lat), Some(lon)) = (args.lat, args.lon) {
        vec![ReferenceRecord::ad_hoc(args.name.clone(), lat, lon)]
    } else if let Some(address) = &args.address {
        let geocoder = NominatimGeocoder::new(&args.geocoder_url)
            .context("building geocoding client")?;
        match geocoder.geocode(address).await {
            Some(point) => vec![ReferenceRecord::new(args.name.clone(), point)],
            None => {
                // Degraded ad-hoc path: report distinctly from data errors
                output.error(format!("no address found for '{}'", address));
                return Ok(());
            }
        }
    } else {
        bail!("provide --references, --lat/--lon, or --address");
    };

    // Load and align the facility collections to the storage CRS
    let mut collections: Vec<(Category, Vec<FacilityRecord>)> = Vec::new();
    for file in &args.facilities {
        let source = GeoJsonFacilityFile { path: file.path.clone(), category: file.category };
        let facilities = source
            .load_facilities()
            .with_context(|| format!("loading facilities from {}", file.path.display()))?;
        collections.push((file.category, facilities));
    }

    for (_, collection) in collections.iter_mut() {
        align_facilities(&storage, std::slice::from_mut(collection))?;
    }

    // One candidate subset per category; repeated categories concatenate
    let mut candidates = CandidateMap::new();
    for (category, collection) in &collections {
        candidates.entry(*category).or_default().extend(collection.iter());
    }

    for (category, subset) in &candidates {
        if subset.is_empty() {
            // Handled case: the slot stays absent, but tell the user why
            output.warning(format!("no candidates loaded for category '{}'", category));
        }
    }

    enrich(&mut records, &candidates, &config.labels, &measurement)?;

    output.enriched(&records, config.distance_unit.value);
    Ok(())
}

fn radius_command(args: RadiusArgs, output: &OutputWriter) -> Result<()> {
    let unit = parse_distance_unit(&args.unit)
        .ok_or_else(|| anyhow::anyhow!("unknown distance unit '{}'", args.unit))?;
    let radius_m = unit.to_meters(args.radius);

    let center = proxim_core::models::GeoPoint::wgs84(args.lon, args.lat);

    // Group per category so repeated CATEGORY=PATH pairs merge
    let mut collections: BTreeMap<Category, Vec<FacilityRecord>> = BTreeMap::new();
    for file in &args.facilities {
        let source = GeoJsonFacilityFile { path: file.path.clone(), category: file.category };
        let facilities = source
            .load_facilities()
            .with_context(|| format!("loading facilities from {}", file.path.display()))?;
        collections.entry(file.category).or_default().extend(facilities);
    }

    // The radius check is a Haversine distance, so everything goes to the
    // center's geographic system regardless of the configured storage CRS
    let mut aligned: Vec<Vec<FacilityRecord>> = collections.into_values().collect();
    align_facilities(&Crs::wgs84(), &mut aligned)?;

    let mut hits: Vec<&FacilityRecord> = Vec::new();
    for collection in &aligned {
        let index = FacilityIndex::new(collection)?;
        hits.extend(index.within_radius(&center, radius_m)?);
    }

    output.facilities(&hits);
    Ok(())
}
