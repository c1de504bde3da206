//! The output of the triangulator and the input of the rasterizer (spec.md §3).

use crate::coord::Coord;
use crate::extent::Extent;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// One triangle carrying paired source/target vertex coordinates.
///
/// `source[i]` and `target[i]` describe the same point, once in the source
/// projection's space and once in the target's; the rasterizer derives one affine map
/// per triangle from these three correspondences.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Triangle {
    pub source: [Coord; 3],
    pub target: [Coord; 3],
    /// Set when this triangle's source vertices straddle the projection's dateline and
    /// must be modulo-reduced onto one world copy before rasterizing (spec.md §4.1,
    /// §4.5 step 1).
    pub needs_shift: bool,
}

impl Triangle {
    pub fn new(source: [Coord; 3], target: [Coord; 3], needs_shift: bool) -> Self {
        Triangle { source, target, needs_shift }
    }

    /// `true` when the three source vertices are not all distinct — a zero-area
    /// triangle spec.md §4.1 says must never be emitted into the mesh.
    pub fn is_degenerate(&self) -> bool {
        let [a, b, c] = self.source;
        const EPS: f64 = 1e-12;
        a.distance_squared(b) < EPS || b.distance_squared(c) < EPS || a.distance_squared(c) < EPS
    }
}

/// An adaptively refined triangular mesh over a target extent (spec.md §3).
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Mesh {
    pub triangles: Vec<Triangle>,
    /// `true` if any triangle in the mesh needs dateline-shift handling.
    pub wraps_x: bool,
}

impl Mesh {
    pub fn new(triangles: Vec<Triangle>) -> Self {
        let wraps_x = triangles.iter().any(|t| t.needs_shift);
        Mesh { triangles, wraps_x }
    }

    pub fn is_empty(&self) -> bool {
        self.triangles.is_empty()
    }

    /// The union of all triangles' source vertices, wrap-aware (spec.md §4.7): when
    /// `wraps_x`, every vertex's x is reduced modulo `source_world_width` before
    /// unioning, and if the resulting extent ends up entirely past `source_domain`'s
    /// upper x bound, it is shifted back by one world width onto the domain's copy.
    pub fn source_extent(&self, source_world_width: f64, source_domain: &Extent) -> Extent {
        let mut ext = Extent::empty();
        for tri in &self.triangles {
            for &c in &tri.source {
                let x = if self.wraps_x { c.x.rem_euclid(source_world_width) } else { c.x };
                ext = ext.union_point(Coord::new(x, c.y));
            }
        }
        if self.wraps_x && !ext.is_empty() && ext.max_x() > source_domain.max_x() {
            ext = ext.translated_x(-source_world_width);
        }
        ext
    }
}
