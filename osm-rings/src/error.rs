//! Types d'erreurs pour le crate osm-rings

use thiserror::Error;

/// Erreurs aux frontières du crate (décodage du texte JSON, construction de requête).
///
/// La reconstruction elle-même ne produit jamais d'erreur : les données
/// incomplètes sont simplement omises.
#[derive(Debug, Error)]
pub enum OsmError {
    /// Texte JSON illisible
    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// Erreur d'I/O lors de la lecture d'une réponse
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Paramètres de requête Overpass invalides
    #[error("Invalid query: {reason}")]
    InvalidQuery { reason: String },
}

impl OsmError {
    /// Crée une erreur de requête invalide
    pub fn invalid_query(reason: impl Into<String>) -> Self {
        Self::InvalidQuery {
            reason: reason.into(),
        }
    }
}
