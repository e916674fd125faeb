//! Export des rings au format `[[lat, lon], ...]` (couches de rendu type Leaflet)

use std::io::Write;

use anyhow::Result;

use crate::pipeline::PreparedFootprint;

/// Écrit un tableau JSON de rings, dans l'ordre de sortie
pub fn write_rings<W: Write>(footprints: &[PreparedFootprint], writer: &mut W) -> Result<()> {
    let rings: Vec<Vec<[f64; 2]>> = footprints.iter().map(PreparedFootprint::to_lat_lon).collect();
    serde_json::to_writer(&mut *writer, &rings)?;
    writer.flush()?;
    Ok(())
}
