//! Types de données pour le crate osm-rings

use geo::{BoundingRect, Coord, LineString, Polygon, Rect};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use tracing::trace;

/// Identifiant d'un node OSM
pub type NodeId = i64;

/// Identifiant d'un way OSM
pub type WayId = i64;

/// Identifiant d'une relation OSM
pub type RelationId = i64;

/// Réponse Overpass (`[out:json]`)
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct OverpassResponse {
    /// Éléments dans l'ordre de la réponse
    #[serde(default)]
    pub elements: Vec<Element>,
}

/// Un élément OSM, discriminé par le champ `type`
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Element {
    Node(Node),
    Way(Way),
    Relation(Relation),
}

/// Un point positionné
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
pub struct Node {
    pub id: NodeId,
    pub lat: f64,
    pub lon: f64,
}

impl Node {
    /// Position au format `geo` (x = longitude, y = latitude)
    pub fn coord(&self) -> Coord {
        Coord {
            x: self.lon,
            y: self.lat,
        }
    }
}

/// Chemin ordonné de nodes, ouvert ou fermé
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Way {
    pub id: WayId,

    /// Références de nodes (un way fermé répète son premier id en dernier).
    ///
    /// Une référence qui n'est pas un entier vaut `None` : le point est
    /// ignoré, pas le way.
    #[serde(default, deserialize_with = "lenient_node_refs")]
    pub nodes: Vec<Option<NodeId>>,
}

/// Regroupement de membres (multipolygone de bâtiment)
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Relation {
    pub id: RelationId,

    /// Membres lisibles ; un membre mal formé est ignoré seul
    #[serde(default, deserialize_with = "lenient_members")]
    pub members: Vec<Member>,
}

impl Relation {
    /// Ways de contour extérieur, dans l'ordre des membres.
    ///
    /// Overpass omet parfois le rôle : un rôle vide compte comme `outer`.
    pub fn outer_way_ids(&self) -> impl Iterator<Item = WayId> + '_ {
        self.members
            .iter()
            .filter(|m| m.kind == MemberType::Way && m.is_outer())
            .map(|m| m.reference)
    }
}

/// Membre d'une relation
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Member {
    #[serde(rename = "type")]
    pub kind: MemberType,

    #[serde(rename = "ref")]
    pub reference: i64,

    #[serde(default)]
    pub role: String,
}

impl Member {
    pub fn is_outer(&self) -> bool {
        self.role == "outer" || self.role.is_empty()
    }
}

fn lenient_node_refs<'de, D>(deserializer: D) -> Result<Vec<Option<NodeId>>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Array(refs) => refs.iter().map(Value::as_i64).collect(),
        _ => Vec::new(),
    })
}

fn lenient_members<'de, D>(deserializer: D) -> Result<Vec<Member>, D::Error>
where
    D: Deserializer<'de>,
{
    let Value::Array(raw) = Value::deserialize(deserializer)? else {
        return Ok(Vec::new());
    };

    Ok(raw
        .into_iter()
        .filter_map(|raw| match serde_json::from_value::<Member>(raw) {
            Ok(member) => Some(member),
            Err(e) => {
                trace!(error = %e, "Skipping undecodable relation member");
                None
            }
        })
        .collect())
}

/// Type de membre de relation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MemberType {
    Node,
    Way,
    Relation,
    #[serde(other)]
    Other,
}

/// Provenance d'un polygone reconstruit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Origin {
    /// Way `outer` d'une relation, fermé seul
    RelationMember { relation: RelationId, way: WayId },

    /// Ring assemblé à partir de tous les ways `outer` d'une relation
    Relation { relation: RelationId },

    /// Way non utilisé par une relation
    Way { way: WayId },
}

/// Un bâtiment reconstruit : un seul ring extérieur, sans trou
#[derive(Debug, Clone, PartialEq)]
pub struct Footprint {
    pub origin: Origin,
    pub polygon: Polygon,
}

impl Footprint {
    pub fn new(origin: Origin, ring: LineString) -> Self {
        Self {
            origin,
            polygon: Polygon::new(ring, vec![]),
        }
    }

    /// Ring extérieur (fermé, au moins 4 points)
    pub fn ring(&self) -> &LineString {
        self.polygon.exterior()
    }

    /// Nombre de points du ring, point de fermeture inclus (toujours >= 4)
    pub fn num_points(&self) -> usize {
        self.ring().0.len()
    }

    /// Ring au format `[lat, lon]` attendu par les couches de rendu
    pub fn to_lat_lon(&self) -> Vec<[f64; 2]> {
        self.ring().0.iter().map(|c| [c.y, c.x]).collect()
    }

    /// Emprise du ring (pour cadrer la carte sur une sélection)
    pub fn bounds(&self) -> Option<Rect> {
        self.polygon.bounding_rect()
    }

    /// Identifiant lisible : `way/5`, `relation/12`, `relation/12/way/5`
    pub fn id(&self) -> String {
        match self.origin {
            Origin::RelationMember { relation, way } => format!("relation/{}/way/{}", relation, way),
            Origin::Relation { relation } => format!("relation/{}", relation),
            Origin::Way { way } => format!("way/{}", way),
        }
    }
}
