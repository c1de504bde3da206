//! Adaptive quad-tree mesh construction (spec.md §4.1).
//!
//! A target-space quad is recursively quartered until either a midpoint reprojection
//! error test passes or the depth cap is hit; each accepted leaf is emitted as two
//! triangles (or, when it straddles the source domain's border, clipped and
//! fan-triangulated first).

use crate::clipper::clip_polygon;
use crate::config::TriangulatorOptions;
use crate::coord::Coord;
use crate::extent::Extent;
use crate::fan;
use crate::mesh::{Mesh, Triangle};
use crate::projection::ProjectionDescriptor;

/// Builds a mesh covering `target_extent` by inverse-projecting its corners with
/// `inv`, recursively refining until either the per-quad error test is satisfied or
/// `options.max_depth` is reached, and forward-projecting leaves back with `fwd` to
/// populate each triangle's paired vertices.
pub fn build_mesh<F, G>(target_extent: &Extent, fwd: F, inv: G, source_proj: &ProjectionDescriptor, options: &TriangulatorOptions) -> Mesh
where
    F: Fn(Coord) -> Coord + Sync,
    G: Fn(Coord) -> Coord + Sync,
{
    let corners = target_extent.corners_clockwise();
    let src_corners = [inv(corners[0]), inv(corners[1]), inv(corners[2]), inv(corners[3])];

    let triangles = refine_quad(corners, src_corners, options.max_depth, &fwd, &inv, source_proj, options);
    Mesh::new(triangles)
}

struct QuadContext<'a, F, G> {
    fwd: &'a F,
    inv: &'a G,
    source_proj: &'a ProjectionDescriptor,
    options: &'a TriangulatorOptions,
}

fn refine_quad<F, G>(
    corners: [Coord; 4],
    src_corners: [Coord; 4],
    depth: u32,
    fwd: &F,
    inv: &G,
    source_proj: &ProjectionDescriptor,
    options: &TriangulatorOptions,
) -> Vec<Triangle>
where
    F: Fn(Coord) -> Coord + Sync,
    G: Fn(Coord) -> Coord + Sync,
{
    let src_quad_extent = Extent::from_coords(src_corners);
    let domain = options.source_domain.as_ref().or(source_proj.extent.as_ref());

    if let Some(domain) = domain {
        if !src_quad_extent.is_empty() && !domain.intersects(&src_quad_extent) {
            log::trace!("dropping quad entirely outside source domain");
            return Vec::new();
        }
    }

    let src_coverage_x = if source_proj.world_width.is_finite() && source_proj.world_width > 0.0 {
        src_quad_extent.width() / source_proj.world_width
    } else {
        0.0
    };
    let is_wrapping = source_proj.can_wrap_x && src_coverage_x > 0.5 && src_coverage_x < 1.0;

    if depth > 0 {
        let center = corners[0].midpoint(corners[2]);
        let center_src = inv(center);

        let forced = source_proj.is_global && !is_wrapping && src_coverage_x > crate::config::MAX_TRIANGLE_WIDTH_FRAC;

        let should_subdivide = if forced {
            true
        } else {
            let estimate = estimate_center(&src_corners, is_wrapping, source_proj.world_width);
            let reduced_center = if is_wrapping {
                Coord::new(center_src.x.rem_euclid(source_proj.world_width), center_src.y)
            } else {
                center_src
            };
            let err2 = estimate.distance_squared(reduced_center);
            !err2.is_finite() || err2 > options.error_threshold * options.error_threshold
        };

        if should_subdivide {
            let ctx = QuadContext { fwd, inv, source_proj, options };
            return subdivide(corners, src_corners, center, center_src, depth, &ctx);
        }
    }

    emit_leaf(corners, src_corners, is_wrapping, fwd, domain)
}

/// The mean of the four source corners, x-components reduced modulo the world width
/// first when the quad is wrapping, so averaging doesn't get dragged across the seam.
fn estimate_center(src_corners: &[Coord; 4], is_wrapping: bool, world_width: f64) -> Coord {
    let xs: Vec<f64> = src_corners
        .iter()
        .map(|c| if is_wrapping { c.x.rem_euclid(world_width) } else { c.x })
        .collect();
    let ys: Vec<f64> = src_corners.iter().map(|c| c.y).collect();
    Coord::new(xs.iter().sum::<f64>() / 4.0, ys.iter().sum::<f64>() / 4.0)
}

fn subdivide<F, G>(corners: [Coord; 4], src_corners: [Coord; 4], center: Coord, center_src: Coord, depth: u32, ctx: &QuadContext<F, G>) -> Vec<Triangle>
where
    F: Fn(Coord) -> Coord + Sync,
    G: Fn(Coord) -> Coord + Sync,
{
    let [a, b, c, d] = corners;
    let m_top = a.midpoint(b);
    let m_right = b.midpoint(c);
    let m_bottom = c.midpoint(d);
    let m_left = d.midpoint(a);

    let src_m_top = (ctx.inv)(m_top);
    let src_m_right = (ctx.inv)(m_right);
    let src_m_bottom = (ctx.inv)(m_bottom);
    let src_m_left = (ctx.inv)(m_left);

    let nw = ([a, m_top, center, m_left], [src_corners[0], src_m_top, center_src, src_m_left]);
    let ne = ([m_top, b, m_right, center], [src_m_top, src_corners[1], src_m_right, center_src]);
    let se = ([center, m_right, c, m_bottom], [center_src, src_m_right, src_corners[2], src_m_bottom]);
    let sw = ([m_left, center, m_bottom, d], [src_m_left, center_src, src_m_bottom, src_corners[3]]);

    subdivide_children(nw, ne, se, sw, depth - 1, ctx)
}

#[cfg(feature = "parallel")]
fn subdivide_children<F, G>(
    nw: ([Coord; 4], [Coord; 4]),
    ne: ([Coord; 4], [Coord; 4]),
    se: ([Coord; 4], [Coord; 4]),
    sw: ([Coord; 4], [Coord; 4]),
    depth: u32,
    ctx: &QuadContext<F, G>,
) -> Vec<Triangle>
where
    F: Fn(Coord) -> Coord + Sync,
    G: Fn(Coord) -> Coord + Sync,
{
    let ((mut nw_tris, ne_tris), (mut se_tris, sw_tris)) = rayon::join(
        || {
            rayon::join(
                || refine_quad(nw.0, nw.1, depth, ctx.fwd, ctx.inv, ctx.source_proj, ctx.options),
                || refine_quad(ne.0, ne.1, depth, ctx.fwd, ctx.inv, ctx.source_proj, ctx.options),
            )
        },
        || {
            rayon::join(
                || refine_quad(se.0, se.1, depth, ctx.fwd, ctx.inv, ctx.source_proj, ctx.options),
                || refine_quad(sw.0, sw.1, depth, ctx.fwd, ctx.inv, ctx.source_proj, ctx.options),
            )
        },
    );
    nw_tris.extend(ne_tris);
    nw_tris.extend(se_tris);
    nw_tris.extend(sw_tris);
    nw_tris
}

#[cfg(not(feature = "parallel"))]
fn subdivide_children<F, G>(
    nw: ([Coord; 4], [Coord; 4]),
    ne: ([Coord; 4], [Coord; 4]),
    se: ([Coord; 4], [Coord; 4]),
    sw: ([Coord; 4], [Coord; 4]),
    depth: u32,
    ctx: &QuadContext<F, G>,
) -> Vec<Triangle>
where
    F: Fn(Coord) -> Coord + Sync,
    G: Fn(Coord) -> Coord + Sync,
{
    let mut out = refine_quad(nw.0, nw.1, depth, ctx.fwd, ctx.inv, ctx.source_proj, ctx.options);
    out.extend(refine_quad(ne.0, ne.1, depth, ctx.fwd, ctx.inv, ctx.source_proj, ctx.options));
    out.extend(refine_quad(se.0, se.1, depth, ctx.fwd, ctx.inv, ctx.source_proj, ctx.options));
    out.extend(refine_quad(sw.0, sw.1, depth, ctx.fwd, ctx.inv, ctx.source_proj, ctx.options));
    out
}

fn emit_leaf<F>(corners: [Coord; 4], src_corners: [Coord; 4], is_wrapping: bool, fwd: &F, domain: Option<&Extent>) -> Vec<Triangle>
where
    F: Fn(Coord) -> Coord,
{
    let needs_clip = match domain {
        Some(domain) => src_corners.iter().any(|c| !c.is_finite() || !domain.contains(*c)),
        None => false,
    };

    if !needs_clip {
        let [a, b, c, d] = corners;
        let [sa, sb, sc, sd] = src_corners;
        let mut out = Vec::with_capacity(2);
        push_if_valid(&mut out, Triangle::new([sa, sc, sd], [a, c, d], is_wrapping));
        push_if_valid(&mut out, Triangle::new([sa, sb, sc], [a, b, c], is_wrapping));
        return out;
    }

    let domain = domain.unwrap();
    // Only non-finite components are replaced (spec.md §4.1 step 5: "finite components
    // untouched"). A finite out-of-domain vertex is left exactly as `inv()` produced it
    // so the real quad shape reaches `clip_polygon` — clamping it here first would clip
    // against the domain twice, the second time per-vertex instead of geometrically,
    // and corrupt non-rectangular (non-identity-projected) quads.
    let sanitized: Vec<Coord> = src_corners
        .iter()
        .map(|c| {
            let x = if c.x.is_finite() { c.x } else if c.x.is_sign_negative() { domain.min_x() } else { domain.max_x() };
            let y = if c.y.is_finite() { c.y } else if c.y.is_sign_negative() { domain.min_y() } else { domain.max_y() };
            Coord::new(x, y)
        })
        .collect();

    let clipped_ring = clip_polygon(&sanitized, domain);
    if clipped_ring.len() < 3 {
        log::trace!("leaf clipped away entirely (ring has {} vertices)", clipped_ring.len());
        return Vec::new();
    }

    let mut out = Vec::new();
    for src_tri in fan::triangulate(&clipped_ring) {
        let target_tri = [fwd(src_tri[0]), fwd(src_tri[1]), fwd(src_tri[2])];
        push_if_valid(&mut out, Triangle::new(src_tri, target_tri, is_wrapping));
    }
    out
}

fn push_if_valid(out: &mut Vec<Triangle>, tri: Triangle) {
    // No source/target domain was supplied to clamp against (both `source_proj.extent`
    // and `options.source_domain` are `None`), so a singular `inv()` near a projection
    // discontinuity can still reach here with a non-finite source vertex. Drop it rather
    // than let it flow into the affine solver, where a NaN/inf pivot would silently
    // produce garbage coefficients instead of the "skip this triangle" spec.md §7
    // documents.
    if tri.source.iter().any(|c| !c.is_finite()) {
        log::trace!("dropping triangle with non-finite source vertex (no domain to clamp against)");
        return;
    }
    if tri.is_degenerate() {
        log::trace!("dropping degenerate triangle");
        return;
    }
    out.push(tri);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TriangulatorOptions;

    fn identity(c: Coord) -> Coord {
        c
    }

    #[test]
    fn identity_projection_yields_two_triangles_per_leaf_at_depth_zero() {
        let target = Extent::new(0.0, 0.0, 10.0, 10.0);
        let proj = ProjectionDescriptor::planar(Some(Extent::new(-1000.0, -1000.0, 1000.0, 1000.0)));
        let options = TriangulatorOptions::new(0.01, 0);
        let mesh = build_mesh(&target, identity, identity, &proj, &options);
        assert_eq!(mesh.triangles.len(), 2);
        assert!(!mesh.wraps_x);
    }

    #[test]
    fn identity_projection_refines_when_error_threshold_is_impossibly_tight_but_stops_at_max_depth() {
        let target = Extent::new(0.0, 0.0, 10.0, 10.0);
        let proj = ProjectionDescriptor::planar(Some(Extent::new(-1000.0, -1000.0, 1000.0, 1000.0)));
        // error is exactly zero for an identity projection, so no depth budget is spent
        // subdividing even though max_depth allows it.
        let options = TriangulatorOptions::new(0.0, 4);
        let mesh = build_mesh(&target, identity, identity, &proj, &options);
        assert_eq!(mesh.triangles.len(), 2);
    }

    #[test]
    fn nonlinear_projection_forces_subdivision() {
        // inv() is nonlinear enough that the midpoint error test keeps failing until
        // depth runs out.
        fn warped_inv(c: Coord) -> Coord {
            Coord::new(c.x + 0.05 * (c.x * 3.0).sin() * c.y, c.y)
        }
        let target = Extent::new(0.0, 0.0, 10.0, 10.0);
        let proj = ProjectionDescriptor::planar(Some(Extent::new(-1000.0, -1000.0, 1000.0, 1000.0)));
        let options = TriangulatorOptions::new(1e-6, 3);
        let mesh = build_mesh(&target, identity, warped_inv, &proj, &options);
        assert!(mesh.triangles.len() > 2);
    }

    #[test]
    fn quad_outside_source_domain_is_dropped() {
        let target = Extent::new(0.0, 0.0, 10.0, 10.0);
        let proj = ProjectionDescriptor::planar(None);
        let options = TriangulatorOptions::new(0.01, 0).with_source_domain(Extent::new(1000.0, 1000.0, 2000.0, 2000.0));
        let mesh = build_mesh(&target, identity, identity, &proj, &options);
        assert!(mesh.is_empty());
    }

    #[test]
    fn leaf_straddling_source_domain_gets_clipped() {
        let target = Extent::new(0.0, 0.0, 10.0, 10.0);
        let proj = ProjectionDescriptor::planar(None);
        // source domain only covers half the quad's source footprint (x in [0, 5]).
        let options = TriangulatorOptions::new(0.01, 0).with_source_domain(Extent::new(0.0, -1000.0, 5.0, 1000.0));
        let mesh = build_mesh(&target, identity, identity, &proj, &options);
        assert!(!mesh.is_empty());
        for tri in &mesh.triangles {
            for p in &tri.source {
                assert!(p.x <= 5.0001);
            }
        }
    }

    #[test]
    fn wrapping_quad_is_flagged_and_forced_to_subdivide() {
        // an inv() that straddles the dateline: source x jumps from near +170 to
        // near -170 across the quad, which is > 50% of world_width (360) in coverage.
        fn dateline_inv(c: Coord) -> Coord {
            let lon = 175.0 + (c.x - 5.0) * 2.0; // maps target x in [0,10] to lon in [165,185]
            let lon = if lon > 180.0 { lon - 360.0 } else { lon };
            Coord::new(lon, c.y)
        }
        let target = Extent::new(0.0, 0.0, 10.0, 10.0);
        let proj = ProjectionDescriptor::geographic(360.0);
        let options = TriangulatorOptions::new(0.01, 2);
        let mesh = build_mesh(&target, identity, dateline_inv, &proj, &options);
        assert!(mesh.triangles.iter().any(|t| t.needs_shift));
        assert!(mesh.wraps_x);
    }

    #[test]
    fn diamond_shaped_quad_is_clipped_geometrically_not_per_vertex_clamped() {
        // inv() rotates the target quad's source footprint by 45 degrees into a diamond
        // (vertices at (1,5),(5,9),(9,5),(5,1)) that cuts across all four corners of the
        // [2,8]x[2,8] source domain without containing it. Clamping each vertex
        // independently to the domain box would collapse every diamond vertex onto the
        // domain's own corners, reproducing the domain rectangle's trivial 2-triangle
        // fan; the real Sutherland-Hodgman clip of the unclamped diamond instead cuts
        // the domain square's four corners off, leaving an octagon.
        fn rotated_inv(c: Coord) -> Coord {
            let (x, y) = (c.x - 5.0, c.y - 5.0);
            Coord::new(5.0 + 0.4 * (x - y), 5.0 + 0.4 * (x + y))
        }
        let target = Extent::new(0.0, 0.0, 10.0, 10.0);
        let proj = ProjectionDescriptor::planar(None);
        let domain = Extent::new(2.0, 2.0, 8.0, 8.0);
        let options = TriangulatorOptions::new(0.01, 0).with_source_domain(domain);
        let mesh = build_mesh(&target, identity, rotated_inv, &proj, &options);

        assert!(!mesh.is_empty());
        for tri in &mesh.triangles {
            for p in &tri.source {
                assert!(p.x >= domain.min_x() - 1e-9 && p.x <= domain.max_x() + 1e-9);
                assert!(p.y >= domain.min_y() - 1e-9 && p.y <= domain.max_y() + 1e-9);
            }
        }
        // an octagon's ear-clip fan has 6 triangles (n-2); a wrongly-clamped domain
        // square would only ever produce the trivial 2.
        assert!(mesh.triangles.len() > 2, "expected the diamond's true octagonal clip shape, got {} triangles", mesh.triangles.len());
    }

    #[test]
    fn non_finite_source_vertex_with_no_domain_is_dropped_not_propagated() {
        // no source_domain and no projection extent to clamp against, so a singular
        // inv() near x=0 produces a non-finite source vertex that must be dropped
        // rather than flow into the affine solver as a garbage triangle.
        fn singular_inv(c: Coord) -> Coord {
            if c.x.abs() < 1e-9 {
                Coord::new(f64::INFINITY, c.y)
            } else {
                Coord::new(1.0 / c.x, c.y)
            }
        }
        // the target extent's left edge sits at x=0 so two of the seed quad's own
        // corners hit the singularity directly, without needing any subdivision.
        let target = Extent::new(0.0, -1.0, 2.0, 1.0);
        let proj = ProjectionDescriptor::planar(None);
        let options = TriangulatorOptions::new(0.01, 0);
        let mesh = build_mesh(&target, identity, singular_inv, &proj, &options);
        // both seed triangles share the quad's singular corner, so neither survives.
        assert!(mesh.is_empty());
        for tri in &mesh.triangles {
            for p in &tri.source {
                assert!(p.is_finite());
            }
        }
    }
}
