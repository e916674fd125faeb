//! Configuration du système
//!
//! Priorité croissante : valeurs par défaut, preset ou fichier JSON,
//! variables d'environnement (`FOOTPRINTS_*`), options de la ligne de commande.

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Précision maximale acceptée (décimales)
pub const MAX_PRECISION: u8 = 12;

/// Format de sortie
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// FeatureCollection GeoJSON (lon, lat)
    Geojson,
    /// Tableau de rings `[[lat, lon], ...]`
    Rings,
}

impl OutputFormat {
    /// Extension des fichiers produits
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Geojson => "geojson",
            Self::Rings => "rings.json",
        }
    }
}

/// Configuration principale
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    /// Rayon de recherche pour les requêtes Overpass (mètres)
    pub radius_m: u32,

    /// Nombre de décimales des coordonnées exportées
    pub precision: u8,

    /// Format de sortie
    pub format: OutputFormat,

    /// Ne pas écrire deux fois le même ring
    pub dedupe_output: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            radius_m: osm_rings::query::DEFAULT_RADIUS_M,
            // 7 décimales ≈ 1 cm en WGS84
            precision: 7,
            format: OutputFormat::Geojson,
            dedupe_output: false,
        }
    }
}

impl Config {
    /// Charge une configuration depuis un fichier
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .context(format!("Failed to read config file: {}", path.display()))?;

        let config: Self = serde_json::from_str(&content).context("Failed to parse config JSON")?;
        config.validate()?;
        Ok(config)
    }

    /// Charge une configuration depuis un preset embarqué
    pub fn from_preset(preset: &str) -> Result<Self> {
        match preset {
            "default" => Self::load_embedded(include_str!("presets/default.json")),
            "precise" => Self::load_embedded(include_str!("presets/precise.json")),
            "compact" => Self::load_embedded(include_str!("presets/compact.json")),
            _ => anyhow::bail!("Unknown preset: {}. Use: default, precise, compact", preset),
        }
    }

    /// Preset si le nom est connu, sinon chemin vers un fichier JSON
    pub fn resolve(spec: Option<&str>) -> Result<Self> {
        match spec {
            None => Self::from_preset("default"),
            Some(name @ ("default" | "precise" | "compact")) => Self::from_preset(name),
            Some(path) => Self::load(Path::new(path)),
        }
    }

    fn load_embedded(json: &str) -> Result<Self> {
        serde_json::from_str(json).context("Failed to parse embedded config")
    }

    /// Applique les variables d'environnement `FOOTPRINTS_*`
    pub fn apply_env(&mut self) -> Result<()> {
        self.apply_env_from(|key| std::env::var(key).ok())
    }

    fn apply_env_from(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<()> {
        if let Some(radius) = lookup("FOOTPRINTS_RADIUS") {
            self.radius_m = radius
                .trim()
                .parse()
                .context(format!("Invalid FOOTPRINTS_RADIUS: {}", radius))?;
        }
        if let Some(precision) = lookup("FOOTPRINTS_PRECISION") {
            self.precision = precision
                .trim()
                .parse()
                .context(format!("Invalid FOOTPRINTS_PRECISION: {}", precision))?;
        }
        if let Some(format) = lookup("FOOTPRINTS_FORMAT") {
            self.format = match format.trim().to_ascii_lowercase().as_str() {
                "geojson" => OutputFormat::Geojson,
                "rings" => OutputFormat::Rings,
                other => anyhow::bail!("Invalid FOOTPRINTS_FORMAT: {}. Use: geojson, rings", other),
            };
        }
        self.validate()
    }

    /// Vérifie les bornes des valeurs
    pub fn validate(&self) -> Result<()> {
        if self.precision > MAX_PRECISION {
            anyhow::bail!(
                "Precision must be at most {} decimals, got: {}",
                MAX_PRECISION,
                self.precision
            );
        }
        if self.radius_m == 0 {
            anyhow::bail!("Radius must be positive");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_presets() {
        assert_eq!(Config::from_preset("default").unwrap(), Config::default());

        let compact = Config::from_preset("compact").unwrap();
        assert_eq!(compact.format, OutputFormat::Rings);
        assert!(compact.dedupe_output);

        assert!(Config::from_preset("huge").is_err());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: Config = serde_json::from_str(r#"{"precision": 5}"#).unwrap();
        assert_eq!(config.precision, 5);
        assert_eq!(config.radius_m, 300);
        assert_eq!(config.format, OutputFormat::Geojson);
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = [
            ("FOOTPRINTS_RADIUS", "120"),
            ("FOOTPRINTS_FORMAT", "Rings"),
        ]
        .into_iter()
        .collect();

        let mut config = Config::default();
        config
            .apply_env_from(|key| env.get(key).map(|v| v.to_string()))
            .unwrap();

        assert_eq!(config.radius_m, 120);
        assert_eq!(config.format, OutputFormat::Rings);
        assert_eq!(config.precision, 7);
    }

    #[test]
    fn test_env_invalid_values() {
        let mut config = Config::default();
        assert!(config
            .apply_env_from(|key| (key == "FOOTPRINTS_PRECISION").then(|| "lots".to_string()))
            .is_err());

        let mut config = Config::default();
        assert!(config
            .apply_env_from(|key| (key == "FOOTPRINTS_PRECISION").then(|| "20".to_string()))
            .is_err());
    }

    #[test]
    fn test_load_from_file() {
        let path = std::env::temp_dir().join("building_footprints_config_test.json");
        std::fs::write(&path, r#"{"format": "rings", "dedupe_output": true}"#).unwrap();

        let config = Config::resolve(Some(path.to_str().unwrap())).unwrap();
        assert_eq!(config.format, OutputFormat::Rings);
        assert!(config.dedupe_output);

        std::fs::remove_file(path).ok();
    }
}
