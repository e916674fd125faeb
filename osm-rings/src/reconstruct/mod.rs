//! Reconstruction des emprises de bâtiments
//!
//! Ordre de sortie :
//! 1. pour chaque relation (ordre de la réponse) : les ways `outer` fermés
//!    seuls, puis le ring assemblé à partir de tous ses ways `outer` ;
//! 2. les ways non utilisés par une relation (ordre de la réponse).
//!
//! Les deux passes sur une relation sont indépendantes : un way déjà fermé
//! peut produire un polygone en double avec le ring assemblé. Les membres
//! `inner` (cours intérieures) sont ignorés.

pub mod index;
pub mod ring;

use std::collections::HashSet;

use serde::Serialize;
use tracing::{debug, trace};

use crate::types::{Footprint, Origin, OverpassResponse, Relation, WayId};
use index::ElementIndex;
use ring::Stitch;

/// Compteurs de reconstruction (données ignorées ou réparées)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ReconstructStats {
    /// Relations rencontrées
    pub relations: usize,
    /// Membres `outer` résolus en ways
    pub outer_members: usize,
    /// Membres `outer` pointant vers un way absent
    pub unknown_way_members: usize,
    /// Ways traités hors relation
    pub standalone_ways: usize,
    /// Références de nodes absentes de la réponse
    pub dropped_node_refs: usize,
    /// Candidats de moins de 4 points après fermeture
    pub degenerate_rings: usize,
    /// Rings assemblés émis
    pub stitched_rings: usize,
    /// Assemblages interrompus faute de segment raccordable
    pub failed_stitches: usize,
}

/// Reconstruit les polygones d'une réponse Overpass.
///
/// Ne retourne jamais d'erreur : les données incomplètes sont omises.
pub fn reconstruct(response: &OverpassResponse) -> Vec<Footprint> {
    reconstruct_with_stats(response).0
}

/// Comme [`reconstruct`], avec les compteurs de données ignorées
pub fn reconstruct_with_stats(response: &OverpassResponse) -> (Vec<Footprint>, ReconstructStats) {
    let index = ElementIndex::build(response);
    let mut stats = ReconstructStats::default();
    let mut used: HashSet<WayId> = HashSet::new();
    let mut footprints = Vec::new();

    for relation in &index.relations {
        stats.relations += 1;
        build_relation(&index, relation, &mut used, &mut stats, &mut footprints);
    }

    for way in &index.ways {
        if used.contains(&way.id) {
            continue;
        }
        stats.standalone_ways += 1;

        let (points, dropped) = index.materialize(way);
        stats.dropped_node_refs += dropped;

        match ring::close_ring(points) {
            Some(ring) => footprints.push(Footprint::new(Origin::Way { way: way.id }, ring)),
            None => {
                trace!(way_id = way.id, "Way too short for a polygon");
                stats.degenerate_rings += 1;
            }
        }
    }

    debug!(
        polygons = footprints.len(),
        relations = stats.relations,
        standalone_ways = stats.standalone_ways,
        "Reconstruction done"
    );

    (footprints, stats)
}

/// Polygones d'une relation : fermeture directe de chaque way, puis assemblage
fn build_relation(
    index: &ElementIndex<'_>,
    relation: &Relation,
    used: &mut HashSet<WayId>,
    stats: &mut ReconstructStats,
    footprints: &mut Vec<Footprint>,
) {
    let mut segments = Vec::new();

    for way_id in relation.outer_way_ids() {
        let Some(way) = index.way(way_id) else {
            debug!(relation_id = relation.id, way_id, "Outer member references unknown way");
            stats.unknown_way_members += 1;
            continue;
        };

        used.insert(way.id);
        stats.outer_members += 1;

        let (points, dropped) = index.materialize(way);
        stats.dropped_node_refs += dropped;
        segments.push((way.id, points));
    }

    for (way_id, points) in &segments {
        match ring::close_ring(points.clone()) {
            Some(ring) => footprints.push(Footprint::new(
                Origin::RelationMember {
                    relation: relation.id,
                    way: *way_id,
                },
                ring,
            )),
            None => stats.degenerate_rings += 1,
        }
    }

    let points: Vec<_> = segments.into_iter().map(|(_, points)| points).collect();
    match ring::stitch_segments(&points) {
        Stitch::Complete(candidate) => match ring::close_ring(candidate) {
            Some(ring) => {
                stats.stitched_rings += 1;
                footprints.push(Footprint::new(
                    Origin::Relation {
                        relation: relation.id,
                    },
                    ring,
                ));
            }
            None => stats.degenerate_rings += 1,
        },
        Stitch::Stalled { remaining } => {
            debug!(relation_id = relation.id, remaining, "Could not stitch outer ways");
            stats.failed_stitches += 1;
        }
        Stitch::Empty => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::from_value;
    use serde_json::json;

    fn nodes() -> serde_json::Value {
        json!([
            {"type": "node", "id": 1, "lat": 0.0, "lon": 0.0},
            {"type": "node", "id": 2, "lat": 0.0, "lon": 1.0},
            {"type": "node", "id": 3, "lat": 1.0, "lon": 1.0},
            {"type": "node", "id": 4, "lat": 1.0, "lon": 0.0}
        ])
    }

    fn response(extra: serde_json::Value) -> OverpassResponse {
        let mut elements = nodes().as_array().cloned().unwrap_or_default();
        elements.extend(extra.as_array().cloned().unwrap_or_default());
        from_value(json!({ "elements": elements }))
    }

    #[test]
    fn test_stats_for_mixed_response() {
        let response = response(json!([
            {"type": "way", "id": 10, "nodes": [1, 2]},
            {"type": "way", "id": 11, "nodes": [2, 3, 1]},
            {"type": "way", "id": 12, "nodes": [1, 99, 2]},
            {"type": "relation", "id": 100, "members": [
                {"type": "way", "ref": 10, "role": "outer"},
                {"type": "way", "ref": 11, "role": ""},
                {"type": "way", "ref": 404, "role": "outer"}
            ]}
        ]));

        let (footprints, stats) = reconstruct_with_stats(&response);

        // way 11 fermé seul, puis ring assemblé ; way 12 dégénéré
        assert_eq!(footprints.len(), 2);
        assert_eq!(stats.relations, 1);
        assert_eq!(stats.outer_members, 2);
        assert_eq!(stats.unknown_way_members, 1);
        assert_eq!(stats.standalone_ways, 1);
        assert_eq!(stats.dropped_node_refs, 1);
        assert_eq!(stats.degenerate_rings, 2);
        assert_eq!(stats.stitched_rings, 1);
        assert_eq!(stats.failed_stitches, 0);
    }

    #[test]
    fn test_failed_stitch_keeps_closed_members() {
        let response = response(json!([
            {"type": "node", "id": 5, "lat": 5.0, "lon": 5.0},
            {"type": "node", "id": 6, "lat": 6.0, "lon": 5.0},
            {"type": "way", "id": 10, "nodes": [1, 2, 3, 1]},
            {"type": "way", "id": 11, "nodes": [5, 6]},
            {"type": "relation", "id": 100, "members": [
                {"type": "way", "ref": 10, "role": "outer"},
                {"type": "way", "ref": 11, "role": "outer"}
            ]}
        ]));

        let (footprints, stats) = reconstruct_with_stats(&response);

        assert_eq!(footprints.len(), 1);
        assert_eq!(
            footprints[0].origin,
            Origin::RelationMember {
                relation: 100,
                way: 10
            }
        );
        assert_eq!(stats.failed_stitches, 1);
    }

    #[test]
    fn test_inner_members_are_not_consumed() {
        let response = response(json!([
            {"type": "way", "id": 10, "nodes": [1, 2, 3, 4, 1]},
            {"type": "way", "id": 20, "nodes": [1, 2, 3, 1]},
            {"type": "relation", "id": 100, "members": [
                {"type": "way", "ref": 10, "role": "outer"},
                {"type": "way", "ref": 20, "role": "inner"}
            ]}
        ]));

        let origins: Vec<Origin> = reconstruct(&response).into_iter().map(|f| f.origin).collect();

        assert_eq!(
            origins,
            vec![
                Origin::RelationMember {
                    relation: 100,
                    way: 10
                },
                Origin::Relation { relation: 100 },
                Origin::Way { way: 20 },
            ]
        );
    }
}
