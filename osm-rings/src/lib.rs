//! # osm-rings
//!
//! Reconstruction des emprises de bâtiments à partir des réponses de l'API
//! Overpass (OpenStreetMap).
//!
//! ## Features
//!
//! - Décodage tolérant : un élément illisible est ignoré, jamais fatal
//! - Fermeture des ways et assemblage des multipolygones découpés en plusieurs ways
//! - Types `geo` pour l'interopérabilité avec l'écosystème Rust géospatial
//! - Construction de la requête Overpass QL correspondante
//!
//! ## Usage
//!
//! ```rust,ignore
//! use osm_rings::{parse, BuildingQuery};
//!
//! let ql = BuildingQuery::new(48.85, 2.35).with_radius(200).to_overpass_ql()?;
//! // ... envoyer `ql` à https://overpass-api.de/api/interpreter ...
//!
//! for footprint in parse(&body)? {
//!     println!("{}: {} points", footprint.id(), footprint.num_points());
//! }
//! ```
//!
//! ## Limites connues
//!
//! - Égalité exacte des coordonnées : deux nodes quasi confondus ne s'assemblent pas
//! - Pas de trous : les membres `inner` sont ignorés
//! - Un way `outer` déjà fermé peut apparaître deux fois (seul et dans le ring assemblé)

pub mod error;
pub mod parser;
pub mod query;
pub mod reconstruct;
pub mod types;

pub use error::OsmError;
pub use parser::{from_value, parse_reader, parse_str};
pub use query::BuildingQuery;
pub use reconstruct::{reconstruct, reconstruct_with_stats, ReconstructStats};
pub use types::{Element, Footprint, Member, MemberType, Node, Origin, OverpassResponse, Relation, Way};

/// Parse le texte d'une réponse Overpass et reconstruit les polygones.
///
/// # Errors
///
/// Retourne `OsmError::Json` si le texte n'est pas du JSON valide.
pub fn parse(json: &str) -> Result<Vec<Footprint>, OsmError> {
    let response = parser::parse_str(json)?;
    Ok(reconstruct(&response))
}

/// Rings au format `[[lat, lon], ...]`, dans l'ordre de sortie.
///
/// Accepte n'importe quelle valeur JSON ; une entrée inattendue donne une liste vide.
pub fn rings(value: serde_json::Value) -> Vec<Vec<[f64; 2]>> {
    reconstruct(&from_value(value))
        .iter()
        .map(Footprint::to_lat_lon)
        .collect()
}
