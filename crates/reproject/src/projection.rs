//! Projection-adjacent data this crate needs but never computes itself.
//!
//! Forward/inverse projection math is an explicit non-goal (spec.md §1): callers pass
//! plain closures. Per spec.md §9's design note, `fwd`/`inv` are consumed as plain
//! `Fn(Coord) -> Coord` values throughout — no trait object, no interface hierarchy —
//! so this module carries no `PointTransform` trait, only the descriptor the
//! triangulator needs to reason about wrapping and forced subdivision.

use crate::extent::Extent;

/// What the triangulator needs to know about a projection to detect dateline wrapping
/// and decide on forced subdivision (spec.md §3, §4.1), independent of the projection
/// math itself.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ProjectionDescriptor {
    /// The projection's valid domain in its own units, if bounded.
    pub extent: Option<Extent>,
    /// The width of one full wrap of the projection's x axis (e.g. 360 for geographic
    /// degrees, `2 * PI * R` for a spherical Mercator in radians-times-radius units).
    pub world_width: f64,
    /// Whether this projection's x axis wraps at all (a geographic lon/lat projection
    /// does; a local planar grid does not).
    pub can_wrap_x: bool,
    /// Whether this projection covers the whole globe, which is what makes the forced
    /// "too-wide-a-quad" subdivision in spec.md §4.1 meaningful for it.
    pub is_global: bool,
}

impl ProjectionDescriptor {
    /// A projection descriptor for a non-wrapping, non-global, locally planar CRS —
    /// the common case for projected/local grids.
    pub fn planar(extent: Option<Extent>) -> Self {
        ProjectionDescriptor {
            extent,
            world_width: f64::INFINITY,
            can_wrap_x: false,
            is_global: false,
        }
    }

    /// A projection descriptor for a geographic, globally wrapping CRS such as
    /// unprojected lon/lat (`world_width = 360.0`).
    pub fn geographic(world_width: f64) -> Self {
        ProjectionDescriptor {
            extent: Some(Extent::new(-world_width / 2.0, -world_width / 4.0, world_width / 2.0, world_width / 4.0)),
            world_width,
            can_wrap_x: true,
            is_global: true,
        }
    }
}
