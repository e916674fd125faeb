//! Modules d'export (GeoJSON, rings lat/lon)

pub mod geojson;
pub mod rings;

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result};

use crate::config::OutputFormat;
use crate::pipeline::PreparedFootprint;

/// Écrit les polygones dans le format demandé
pub fn write<W: Write>(footprints: &[PreparedFootprint], format: OutputFormat, writer: &mut W) -> Result<()> {
    match format {
        OutputFormat::Geojson => geojson::write_geojson(footprints, writer),
        OutputFormat::Rings => rings::write_rings(footprints, writer),
    }
}

/// Écrit dans un fichier, ou sur stdout si aucun chemin n'est donné
pub fn write_to_path(
    footprints: &[PreparedFootprint],
    format: OutputFormat,
    path: Option<&Path>,
) -> Result<()> {
    match path {
        Some(path) => {
            let file = File::create(path)
                .context(format!("Failed to create file: {}", path.display()))?;
            let mut writer = BufWriter::new(file);
            write(footprints, format, &mut writer)
        }
        None => {
            let stdout = std::io::stdout();
            let mut writer = BufWriter::new(stdout.lock());
            write(footprints, format, &mut writer)?;
            writeln!(writer)?;
            Ok(())
        }
    }
}
