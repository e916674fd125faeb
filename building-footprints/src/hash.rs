//! Hash de rings pour repérer les doublons
//!
//! Le hash ne dépend ni du sommet de départ ni du sens de parcours : le même
//! bâtiment émis une fois par un way fermé et une fois par l'assemblage de la
//! relation a le même hash.

use blake3::Hasher;
use geo::LineString;

/// Sommet quantifié : `(x, y)` multipliés par `10^precision` puis arrondis
type Vertex = (i64, i64);

/// Calcule un hash stable d'un ring, quantifié à `precision` décimales.
///
/// Parmi toutes les rotations, dans les deux sens, la séquence retenue est
/// la plus petite dans l'ordre lexicographique : un sommet minimal répété ne
/// rend pas le hash dépendant du point de départ.
pub fn ring_hash(ring: &LineString, precision: u8) -> [u8; 32] {
    let factor = 10_f64.powi(precision as i32);
    let mut vertices: Vec<Vertex> = ring
        .0
        .iter()
        .map(|c| ((c.x * factor).round() as i64, (c.y * factor).round() as i64))
        .collect();

    // Le point de fermeture n'est pas hashé
    if vertices.len() > 1 && vertices.first() == vertices.last() {
        vertices.pop();
    }

    let mut hasher = Hasher::new();
    hasher.update(b"RING");
    hasher.update(&[precision]);

    for (x, y) in canonical_order(&vertices) {
        hasher.update(&x.to_le_bytes());
        hasher.update(&y.to_le_bytes());
    }

    *hasher.finalize().as_bytes()
}

/// Séquence canonique : plus petite rotation, sens direct ou inverse
fn canonical_order(vertices: &[Vertex]) -> Vec<Vertex> {
    let len = vertices.len();
    if len == 0 {
        return Vec::new();
    }

    let walk = move |start: usize, reversed: bool| {
        (0..len).map(move |i| {
            if reversed {
                vertices[(start + len - i) % len]
            } else {
                vertices[(start + i) % len]
            }
        })
    };

    let mut best = (0, false);
    for start in 0..len {
        for reversed in [false, true] {
            if walk(start, reversed).lt(walk(best.0, best.1)) {
                best = (start, reversed);
            }
        }
    }

    walk(best.0, best.1).collect()
}
