//! Chaîne de traitement d'une réponse : reconstruction, arrondi, hash, doublons

use std::collections::HashSet;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use geo::{Coord, LineString, Polygon};
use osm_rings::{Origin, OverpassResponse};
use tracing::debug;

use crate::config::{Config, OutputFormat};
use crate::export;
use crate::hash::ring_hash;
use crate::report::{FileSummary, OriginStats};

/// Polygone prêt à l'export
#[derive(Debug, Clone)]
pub struct PreparedFootprint {
    /// Position dans la sortie de la reconstruction (index de sélection)
    pub index: usize,
    pub id: String,
    pub origin: Origin,
    /// Ring arrondi à la précision demandée
    pub polygon: Polygon,
    pub hash: [u8; 32],
}

impl PreparedFootprint {
    /// Ring au format `[lat, lon]`
    pub fn to_lat_lon(&self) -> Vec<[f64; 2]> {
        self.polygon.exterior().0.iter().map(|c| [c.y, c.x]).collect()
    }

    pub fn hash_hex(&self) -> String {
        hex::encode(self.hash)
    }

    pub fn origin_kind(&self) -> &'static str {
        match self.origin {
            Origin::RelationMember { .. } => "relation_member",
            Origin::Relation { .. } => "relation",
            Origin::Way { .. } => "way",
        }
    }
}

/// Reconstruit et prépare les polygones d'une réponse
pub fn prepare(response: &OverpassResponse, config: &Config) -> (Vec<PreparedFootprint>, FileSummary) {
    let (footprints, stats) = osm_rings::reconstruct_with_stats(response);

    let mut summary = FileSummary {
        elements: response.elements.len(),
        stats,
        by_origin: OriginStats::default(),
        duplicates: 0,
        dropped_duplicates: 0,
    };
    let mut seen: HashSet<[u8; 32]> = HashSet::new();
    let mut prepared = Vec::with_capacity(footprints.len());

    for (index, footprint) in footprints.iter().enumerate() {
        let ring = round_ring(footprint.ring(), config.precision);
        let hash = ring_hash(&ring, config.precision);

        if !seen.insert(hash) {
            summary.duplicates += 1;
            if config.dedupe_output {
                debug!(id = %footprint.id(), "Dropping duplicate ring");
                summary.dropped_duplicates += 1;
                continue;
            }
        }

        summary.by_origin.record(&footprint.origin);
        prepared.push(PreparedFootprint {
            index,
            id: footprint.id(),
            origin: footprint.origin,
            polygon: Polygon::new(ring, vec![]),
            hash,
        });
    }

    (prepared, summary)
}

/// Arrondit les coordonnées d'un ring à la précision spécifiée.
///
/// Le premier et le dernier point restent égaux.
pub fn round_ring(ring: &LineString, decimals: u8) -> LineString {
    let factor = 10_f64.powi(decimals as i32);

    LineString::new(
        ring.0
            .iter()
            .map(|c| Coord {
                x: (c.x * factor).round() / factor,
                y: (c.y * factor).round() / factor,
            })
            .collect(),
    )
}

/// Lit une réponse Overpass depuis un fichier ou stdin (`-`)
pub fn read_response(input: &Path) -> Result<OverpassResponse> {
    if input == Path::new("-") {
        let stdin = std::io::stdin();
        return osm_rings::parse_reader(stdin.lock()).context("Failed to parse Overpass JSON from stdin");
    }

    let file = File::open(input).with_context(|| format!("Cannot open {}", input.display()))?;
    osm_rings::parse_reader(BufReader::new(file))
        .with_context(|| format!("Failed to parse Overpass JSON in {}", input.display()))
}

/// Traite un fichier et écrit le résultat dans le dossier de sortie.
///
/// L'arborescence sous `input_root` est reproduite sous `output_dir`.
pub fn process_file(
    input: &Path,
    input_root: &Path,
    output_dir: &Path,
    config: &Config,
) -> Result<FileSummary> {
    let response = read_response(input)?;
    let (prepared, summary) = prepare(&response, config);

    let output_file = output_path(input, input_root, output_dir, config.format);
    if let Some(parent) = output_file.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Cannot create output directory {}", parent.display()))?;
    }
    export::write_to_path(&prepared, config.format, Some(&output_file))?;

    debug!(
        input = %input.display(),
        output = %output_file.display(),
        polygons = prepared.len(),
        "File processed"
    );

    Ok(summary)
}

/// Chemin du fichier produit : même chemin relatif à `input_root`, sous
/// `output_dir`, avec l'extension du format
pub fn output_path(input: &Path, input_root: &Path, output_dir: &Path, format: OutputFormat) -> PathBuf {
    let relative = input
        .strip_prefix(input_root)
        .ok()
        .and_then(|rel| rel.parent())
        .unwrap_or_else(|| Path::new(""));

    output_dir.join(relative).join(output_name(input, format))
}

/// Nom du fichier produit : `<nom sans .json>.<extension du format>`
pub fn output_name(input: &Path, format: OutputFormat) -> String {
    let name = input
        .file_name()
        .and_then(|s| s.to_str())
        .unwrap_or("unknown");

    let name = name
        .strip_suffix(".osm.json")
        .or_else(|| name.strip_suffix(".json"))
        .unwrap_or(name);

    format!("{}.{}", name, format.extension())
}

/// Collecte récursivement les réponses Overpass (`*.json`), triées
pub fn collect_inputs(path: &Path) -> Result<Vec<PathBuf>> {
    let mut inputs = Vec::new();

    if path.is_file() {
        inputs.push(path.to_path_buf());
        return Ok(inputs);
    }

    let entries = std::fs::read_dir(path).with_context(|| format!("Cannot read {}", path.display()))?;
    for entry in entries {
        let entry_path = entry?.path();

        if entry_path.is_dir() {
            inputs.extend(collect_inputs(&entry_path)?);
        } else if entry_path.extension().map_or(false, |ext| ext == "json") {
            inputs.push(entry_path);
        }
    }

    inputs.sort();
    Ok(inputs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn closed_relation_response() -> OverpassResponse {
        osm_rings::from_value(json!({"elements": [
            {"type": "node", "id": 1, "lat": 48.123456789, "lon": 2.0},
            {"type": "node", "id": 2, "lat": 48.1, "lon": 2.1},
            {"type": "node", "id": 3, "lat": 48.2, "lon": 2.1},
            {"type": "way", "id": 10, "nodes": [1, 2, 3, 1]},
            {"type": "relation", "id": 100, "members": [
                {"type": "way", "ref": 10, "role": "outer"}
            ]}
        ]}))
    }

    #[test]
    fn test_prepare_counts_duplicates() {
        let (prepared, summary) = prepare(&closed_relation_response(), &Config::default());

        assert_eq!(prepared.len(), 2);
        assert_eq!(summary.duplicates, 1);
        assert_eq!(summary.dropped_duplicates, 0);
        assert_eq!(summary.by_origin.total(), 2);
        assert_eq!(prepared[0].hash, prepared[1].hash);
    }

    #[test]
    fn test_prepare_dedupe() {
        let config = Config {
            dedupe_output: true,
            ..Config::default()
        };
        let (prepared, summary) = prepare(&closed_relation_response(), &config);

        assert_eq!(prepared.len(), 1);
        assert_eq!(prepared[0].origin_kind(), "relation_member");
        assert_eq!(summary.dropped_duplicates, 1);
        assert_eq!(summary.by_origin.total(), 1);
    }

    #[test]
    fn test_prepare_rounds_coordinates() {
        let config = Config {
            precision: 3,
            ..Config::default()
        };
        let (prepared, _) = prepare(&closed_relation_response(), &config);
        let ring = prepared[0].to_lat_lon();

        assert_eq!(ring[0], [48.123, 2.0]);
        assert_eq!(ring.first(), ring.last());
    }

    #[test]
    fn test_output_name() {
        assert_eq!(
            output_name(Path::new("/data/sylhet.json"), OutputFormat::Geojson),
            "sylhet.geojson"
        );
        assert_eq!(
            output_name(Path::new("campus.osm.json"), OutputFormat::Rings),
            "campus.rings.json"
        );
        assert_eq!(
            output_name(Path::new("noextension"), OutputFormat::Geojson),
            "noextension.geojson"
        );
    }

    #[test]
    fn test_output_path_keeps_subdirectories() {
        let root = Path::new("/data/in");
        let out = Path::new("/data/out");

        assert_eq!(
            output_path(&root.join("a/x.json"), root, out, OutputFormat::Geojson),
            out.join("a/x.geojson")
        );
        assert_eq!(
            output_path(&root.join("b/x.json"), root, out, OutputFormat::Geojson),
            out.join("b/x.geojson")
        );
        assert_eq!(
            output_path(&root.join("top.json"), root, out, OutputFormat::Rings),
            out.join("top.rings.json")
        );
        // Hors de la racine : nom seul
        assert_eq!(
            output_path(Path::new("/elsewhere/y.json"), root, out, OutputFormat::Geojson),
            out.join("y.geojson")
        );
    }

    #[test]
    fn test_collect_inputs() {
        let root = std::env::temp_dir().join("building_footprints_collect_test");
        let nested = root.join("nested");
        std::fs::create_dir_all(&nested).unwrap();
        std::fs::write(root.join("b.json"), "{}").unwrap();
        std::fs::write(nested.join("a.json"), "{}").unwrap();
        std::fs::write(root.join("notes.txt"), "").unwrap();

        let inputs = collect_inputs(&root).unwrap();
        assert_eq!(inputs.len(), 2);
        assert!(inputs.iter().all(|p| p.extension().unwrap() == "json"));

        std::fs::remove_dir_all(root).ok();
    }
}
