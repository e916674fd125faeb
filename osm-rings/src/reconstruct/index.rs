//! Index local des éléments d'une réponse

use std::collections::HashMap;

use geo::Coord;

use crate::types::{Element, NodeId, OverpassResponse, Relation, Way, WayId};

/// Éléments d'une réponse répartis par type.
///
/// Construit à chaque appel et jeté ensuite : pas de cache partagé.
#[derive(Debug, Default)]
pub struct ElementIndex<'a> {
    /// Positions par id (un id répété garde la dernière position vue)
    pub nodes: HashMap<NodeId, Coord>,

    /// Ways dans l'ordre de la réponse
    pub ways: Vec<&'a Way>,

    /// Ways par id (un id répété garde le premier way vu)
    pub way_by_id: HashMap<WayId, &'a Way>,

    /// Relations dans l'ordre de la réponse
    pub relations: Vec<&'a Relation>,
}

impl<'a> ElementIndex<'a> {
    pub fn build(response: &'a OverpassResponse) -> Self {
        let mut index = Self::default();

        for element in &response.elements {
            match element {
                Element::Node(node) => {
                    index.nodes.insert(node.id, node.coord());
                }
                Element::Way(way) => {
                    index.ways.push(way);
                    index.way_by_id.entry(way.id).or_insert(way);
                }
                Element::Relation(relation) => index.relations.push(relation),
            }
        }

        index
    }

    pub fn way(&self, id: WayId) -> Option<&'a Way> {
        self.way_by_id.get(&id).copied()
    }

    /// Positions d'un way dans l'ordre, sans les nodes absents.
    ///
    /// Retourne aussi le nombre de références ignorées (inconnues ou non
    /// entières).
    pub fn materialize(&self, way: &Way) -> (Vec<Coord>, usize) {
        let points: Vec<Coord> = way
            .nodes
            .iter()
            .filter_map(|id| id.and_then(|id| self.nodes.get(&id).copied()))
            .collect();
        let dropped = way.nodes.len() - points.len();
        (points, dropped)
    }
}
