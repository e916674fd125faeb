//! Décodage tolérant des réponses Overpass
//!
//! Chaque élément est décodé indépendamment : un élément illisible est ignoré
//! sans invalider le reste de la réponse.

use serde_json::Value;
use tracing::debug;

use crate::types::{Element, OverpassResponse};
use crate::OsmError;

/// Parse le texte JSON d'une réponse Overpass.
///
/// # Errors
///
/// Retourne `OsmError::Json` uniquement si le texte n'est pas du JSON valide.
/// Une structure inattendue donne une réponse vide, jamais une erreur.
pub fn parse_str(json: &str) -> Result<OverpassResponse, OsmError> {
    let value: Value = serde_json::from_str(json)?;
    Ok(from_value(value))
}

/// Parse une réponse depuis un lecteur (fichier, stdin)
pub fn parse_reader<R: std::io::Read>(reader: R) -> Result<OverpassResponse, OsmError> {
    let value: Value = serde_json::from_reader(reader)?;
    Ok(from_value(value))
}

/// Construit une réponse depuis une valeur JSON quelconque.
///
/// Entrée sans tableau `elements` → réponse vide.
pub fn from_value(value: Value) -> OverpassResponse {
    let Value::Object(mut root) = value else {
        debug!("Overpass payload is not an object");
        return OverpassResponse::default();
    };

    let Some(Value::Array(raw)) = root.remove("elements") else {
        debug!("Overpass payload has no elements array");
        return OverpassResponse::default();
    };

    let total = raw.len();
    let elements: Vec<Element> = raw
        .into_iter()
        .enumerate()
        .filter_map(|(position, raw)| match serde_json::from_value::<Element>(raw) {
            Ok(element) => Some(element),
            Err(e) => {
                debug!(position, error = %e, "Skipping undecodable element");
                None
            }
        })
        .collect();

    if elements.len() < total {
        debug!(
            kept = elements.len(),
            skipped = total - elements.len(),
            "Decoded Overpass elements"
        );
    }

    OverpassResponse { elements }
}
