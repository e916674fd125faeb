//! # building-footprints
//!
//! Emprises de bâtiments OpenStreetMap à partir de réponses Overpass.
//!
//! ## Features
//!
//! - Reconstruction des rings (ways fermés et multipolygones assemblés)
//! - Export GeoJSON ou rings `[lat, lon]` prêts pour une carte Leaflet
//! - Traitement parallèle d'un dossier de réponses
//! - Rapport des données ignorées (nodes manquants, rings dégénérés, doublons)
//!
//! ## Usage CLI
//!
//! ```bash
//! # Requête Overpass pour un point
//! building-footprints query --lat 24.7359 --lon 91.6852 --radius 300 > query.overpassql
//!
//! # Reconstruction d'une réponse
//! building-footprints reconstruct --input response.json --output buildings.geojson
//! cat response.json | building-footprints reconstruct --input - --format rings
//!
//! # Dossier de réponses
//! building-footprints reconstruct --input ./responses/ --output ./geojson/
//! ```

pub mod config;
pub mod export;
pub mod hash;
pub mod pipeline;
pub mod report;

pub use config::{Config, OutputFormat};
pub use pipeline::{prepare, PreparedFootprint};
pub use report::{ReconstructReport, RunStatus};
