//! Fan/ear-clipping triangulation of a convex(ish) polygon, used to turn a clipped
//! leaf's 3-to-roughly-8-vertex footprint back into triangles (spec.md §4.4).

use crate::coord::Coord;

fn cross(o: Coord, a: Coord, b: Coord) -> f64 {
    (a.x - o.x) * (b.y - o.y) - (a.y - o.y) * (b.x - o.x)
}

fn point_in_triangle(p: Coord, a: Coord, b: Coord, c: Coord) -> bool {
    let d1 = cross(a, b, p);
    let d2 = cross(b, c, p);
    let d3 = cross(c, a, p);
    let has_neg = d1 < 0.0 || d2 < 0.0 || d3 < 0.0;
    let has_pos = d1 > 0.0 || d2 > 0.0 || d3 > 0.0;
    !(has_neg && has_pos)
}

/// Triangulates a simple polygon (convex in practice, since it comes out of clipping a
/// quad against a rectangle) into a fan of triangles, each sharing the ring's first
/// vertex, or — for `ring.len() >= 5` — via ear clipping when a pure fan would produce
/// a degenerate slice (spec.md §4.4: "N = 3 or 4 use the trivial fan from vertex 0; N
/// >= 5 use ear clipping").
pub fn triangulate(ring: &[Coord]) -> Vec<[Coord; 3]> {
    match ring.len() {
        0..=2 => Vec::new(),
        3 => vec![[ring[0], ring[1], ring[2]]],
        4 => vec![[ring[0], ring[1], ring[2]], [ring[0], ring[2], ring[3]]],
        _ => ear_clip(ring),
    }
}

fn signed_area(ring: &[Coord]) -> f64 {
    let n = ring.len();
    let mut area = 0.0;
    for i in 0..n {
        let a = ring[i];
        let b = ring[(i + 1) % n];
        area += a.x * b.y - b.x * a.y;
    }
    area / 2.0
}

fn ear_clip(ring: &[Coord]) -> Vec<[Coord; 3]> {
    let mut indices: Vec<usize> = (0..ring.len()).collect();
    let clockwise = signed_area(ring) < 0.0;
    let mut triangles = Vec::with_capacity(ring.len().saturating_sub(2));

    // bounded by construction: each successful ear removes one vertex, and a polygon
    // with no convex ear left (should not happen for the convex rings this crate
    // produces) breaks out rather than looping forever.
    let mut guard = indices.len() * indices.len() + 4;
    while indices.len() > 3 && guard > 0 {
        guard -= 1;
        let n = indices.len();
        let mut ear_found = false;
        for i in 0..n {
            let prev = indices[(i + n - 1) % n];
            let cur = indices[i];
            let next = indices[(i + 1) % n];
            let (a, b, c) = (ring[prev], ring[cur], ring[next]);

            let turn = cross(a, b, c);
            let is_convex = if clockwise { turn <= 0.0 } else { turn >= 0.0 };
            if !is_convex {
                continue;
            }

            let mut contains_other = false;
            for &idx in &indices {
                if idx == prev || idx == cur || idx == next {
                    continue;
                }
                if point_in_triangle(ring[idx], a, b, c) {
                    contains_other = true;
                    break;
                }
            }
            if contains_other {
                continue;
            }

            triangles.push([a, b, c]);
            indices.remove(i);
            ear_found = true;
            break;
        }
        if !ear_found {
            log::trace!("ear clipping found no convex, uncontained ear; stopping with {} vertices left", indices.len());
            break;
        }
    }

    if indices.len() == 3 {
        triangles.push([ring[indices[0]], ring[indices[1]], ring[indices[2]]]);
    }
    triangles
}
