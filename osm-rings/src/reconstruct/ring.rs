//! Fermeture et assemblage des rings à partir des segments de ways

use geo::{Coord, LineString};
use tracing::trace;

/// Nombre minimal de points d'un ring fermé (triangle + point de fermeture)
pub const MIN_RING_POINTS: usize = 4;

/// Vrai si le premier et le dernier point sont identiques.
///
/// Comparaison exacte, sans tolérance : deux nodes OSM quasi confondus ne sont
/// pas considérés comme le même sommet.
pub fn is_closed(points: &[Coord]) -> bool {
    matches!((points.first(), points.last()), (Some(first), Some(last)) if first == last)
}

/// Ferme un candidat en répétant son premier point si nécessaire.
///
/// Retourne `None` si le ring fermé a moins de [`MIN_RING_POINTS`] points.
pub fn close_ring(mut points: Vec<Coord>) -> Option<LineString> {
    let first = *points.first()?;

    if !is_closed(&points) {
        points.push(first);
    }

    if points.len() < MIN_RING_POINTS {
        trace!(points = points.len(), "Discarding degenerate ring");
        return None;
    }

    Some(LineString::new(points))
}

/// Résultat d'un assemblage de segments
#[derive(Debug, Clone, PartialEq)]
pub enum Stitch {
    /// Tous les segments utiles ont été consommés, ou le ring s'est fermé.
    /// Le candidat passe ensuite par [`close_ring`].
    Complete(Vec<Coord>),

    /// Aucun segment restant ne prolonge l'accumulateur
    Stalled { remaining: usize },

    /// Aucun segment d'au moins 2 points
    Empty,
}

/// Assemble des segments ouverts en un seul ring.
///
/// Algorithme glouton sans retour arrière : on part du premier segment et on
/// cherche, dans l'ordre, un segment dont une extrémité coïncide exactement avec
/// le dernier point de l'accumulateur. Un segment raccordé par sa fin est
/// inversé. Le point partagé n'est pas dupliqué.
pub fn stitch_segments(segments: &[Vec<Coord>]) -> Stitch {
    let mut remaining: Vec<&[Coord]> = segments
        .iter()
        .filter(|s| s.len() >= 2)
        .map(Vec::as_slice)
        .collect();

    if remaining.is_empty() {
        return Stitch::Empty;
    }

    // L'ordre du pool doit rester stable : remove() et non swap_remove()
    let mut ring: Vec<Coord> = remaining.remove(0).to_vec();

    while !remaining.is_empty() {
        let ring_last = ring[ring.len() - 1];

        let found = remaining.iter().enumerate().find_map(|(i, segment)| {
            if segment[0] == ring_last {
                Some((i, false))
            } else if segment[segment.len() - 1] == ring_last {
                Some((i, true))
            } else {
                None
            }
        });

        let Some((i, reversed)) = found else {
            trace!(
                points = ring.len(),
                remaining = remaining.len(),
                "Stitch stalled"
            );
            return Stitch::Stalled {
                remaining: remaining.len(),
            };
        };

        let segment = remaining.remove(i);
        if reversed {
            ring.extend(segment.iter().rev().skip(1));
        } else {
            ring.extend(segment.iter().skip(1));
        }

        if is_closed(&ring) {
            break;
        }
    }

    Stitch::Complete(ring)
}
