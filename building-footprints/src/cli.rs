//! Définition et implémentation des commandes CLI
//!
//! - `reconstruct` : réponse(s) Overpass → GeoJSON ou rings `[lat, lon]`
//! - `query` : texte Overpass QL pour les bâtiments autour d'un point

use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Subcommand;
use osm_rings::BuildingQuery;
use rayon::prelude::*;
use tracing::{info, warn};

use building_footprints::config::{Config, OutputFormat};
use building_footprints::report::{ReconstructReport, RunStatus};
use building_footprints::{export, pipeline};

#[derive(Subcommand)]
pub enum Commands {
    /// Reconstruct building polygons from saved Overpass responses
    Reconstruct {
        /// Overpass JSON file, directory of *.json files, or "-" for stdin
        #[arg(short, long)]
        input: PathBuf,

        /// Output file (single input) or directory (directory input). Default: stdout
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Output format (default: from config, geojson)
        #[arg(short, long, value_enum)]
        format: Option<OutputFormat>,

        /// Coordinate precision (decimal places). Default: 7 (~1cm)
        #[arg(long)]
        precision: Option<u8>,

        /// Drop rings identical to one already written (same building emitted twice)
        #[arg(long)]
        dedupe: bool,

        /// Config preset name (default/precise/compact) or path to a JSON config
        #[arg(long)]
        config: Option<String>,

        /// Save the report as JSON
        #[arg(long)]
        report: Option<PathBuf>,
    },

    /// Print the Overpass QL query for buildings around a location
    Query {
        /// Latitude (WGS84)
        #[arg(long, allow_hyphen_values = true)]
        lat: f64,

        /// Longitude (WGS84)
        #[arg(long, allow_hyphen_values = true)]
        lon: f64,

        /// Search radius in meters (default: from config, 300)
        #[arg(short, long)]
        radius: Option<u32>,

        /// Server-side timeout in seconds
        #[arg(long)]
        timeout: Option<u32>,

        /// Config preset name (default/precise/compact) or path to a JSON config
        #[arg(long)]
        config: Option<String>,
    },
}

/// Charge la configuration puis applique env et options CLI
pub fn load_config(
    spec: Option<&str>,
    format: Option<OutputFormat>,
    precision: Option<u8>,
    dedupe: bool,
    radius: Option<u32>,
) -> Result<Config> {
    let mut config = Config::resolve(spec)?;
    config.apply_env()?;

    if let Some(format) = format {
        config.format = format;
    }
    if let Some(precision) = precision {
        config.precision = precision;
    }
    if dedupe {
        config.dedupe_output = true;
    }
    if let Some(radius) = radius {
        config.radius_m = radius;
    }

    config.validate()?;
    Ok(config)
}

/// Exécute la commande reconstruct
pub fn cmd_reconstruct(
    input: &Path,
    output: Option<&Path>,
    config: &Config,
    report_path: Option<&Path>,
    quiet: bool,
) -> Result<()> {
    let start = Instant::now();
    let mut report = ReconstructReport::new();

    info!(
        format = ?config.format,
        precision = config.precision,
        dedupe = config.dedupe_output,
        "Starting reconstruction"
    );

    if input == Path::new("-") || input.is_file() {
        let response = pipeline::read_response(input)?;
        let (prepared, summary) = pipeline::prepare(&response, config);
        export::write_to_path(&prepared, config.format, output)?;
        report.record_file(&summary);
    } else if input.is_dir() {
        reconstruct_directory(input, output, config, &mut report)?;
    } else {
        anyhow::bail!("Input not found: {}", input.display());
    }

    report.set_duration(start.elapsed());
    report.finalize();

    if !quiet {
        report.display();
    }
    if let Some(path) = report_path {
        report
            .save_to_file(path)
            .with_context(|| format!("Failed to write report to {}", path.display()))?;
    }

    info!("{}", report.summary());

    if report.status == RunStatus::Failed {
        anyhow::bail!("No input could be processed");
    }

    Ok(())
}

/// Traite un dossier de réponses en parallèle
fn reconstruct_directory(
    input: &Path,
    output: Option<&Path>,
    config: &Config,
    report: &mut ReconstructReport,
) -> Result<()> {
    let Some(output) = output else {
        anyhow::bail!("--output directory is required when --input is a directory");
    };

    let inputs = pipeline::collect_inputs(input)?;
    if inputs.is_empty() {
        anyhow::bail!("No Overpass responses (*.json) found in {}", input.display());
    }

    std::fs::create_dir_all(output)
        .with_context(|| format!("Cannot create output directory {}", output.display()))?;

    info!("Found {} responses to reconstruct", inputs.len());

    let results: Vec<_> = inputs
        .par_iter()
        .map(|path| (path, pipeline::process_file(path, input, output, config)))
        .collect();

    for (path, result) in results {
        match result {
            Ok(summary) => report.record_file(&summary),
            Err(e) => {
                warn!("Failed to reconstruct {}: {:#}", path.display(), e);
                report.record_file_failure(&path.display().to_string(), &format!("{:#}", e));
            }
        }
    }

    Ok(())
}

/// Exécute la commande query
pub fn cmd_query(lat: f64, lon: f64, radius_m: u32, timeout_s: Option<u32>) -> Result<()> {
    let mut query = BuildingQuery::new(lat, lon).with_radius(radius_m);
    if let Some(timeout) = timeout_s {
        query = query.with_timeout(timeout);
    }

    let ql = query.to_overpass_ql()?;
    print!("{}", ql);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_config_flags_override() {
        let config = load_config(None, Some(OutputFormat::Rings), Some(4), true, Some(80)).unwrap();

        assert_eq!(config.format, OutputFormat::Rings);
        assert_eq!(config.precision, 4);
        assert!(config.dedupe_output);
        assert_eq!(config.radius_m, 80);
    }

    #[test]
    fn test_load_config_rejects_bad_precision() {
        assert!(load_config(None, None, Some(40), false, None).is_err());
    }

    #[test]
    fn test_load_config_unknown_file() {
        assert!(load_config(Some("/nonexistent/config.json"), None, None, false, None).is_err());
    }

    #[test]
    fn test_cmd_query_rejects_invalid_position() {
        assert!(cmd_query(120.0, 0.0, 300, None).is_err());
    }

    #[test]
    fn test_cmd_reconstruct_missing_input() {
        let config = Config::default();
        assert!(cmd_reconstruct(Path::new("/nonexistent/input.json"), None, &config, None, true).is_err());
    }
}
