//! Compositing a mesh's triangles, each with its own affine map, onto a destination
//! raster (spec.md §4.5).

use crate::affine::{AffineTransform, TransformStack};
use crate::config::RasterizerOptions;
use crate::coord::Coord;
use crate::error::{Error, Result};
use crate::extent::Extent;
use crate::linsolve::solve_affine;
use crate::mesh::{Mesh, Triangle};
use crate::raster::{PixelBuffer, Rgba, SourceTile};

const DEBUG_OVERLAY_COLOR: Rgba = Rgba::new(255, 0, 255, 255);

/// Renders `mesh` into `dst`, sampling from `sources`.
///
/// `dst` must already be sized for `target_extent` at `target_resolution` (ceil of
/// extent/resolution, plus one, per spec.md §6); a mismatch is a caller error, not a
/// benign condition, and is reported via [`Error::DimensionMismatch`].
///
/// `source_world_width`/`source_domain` are `None` for a non-wrapping source
/// projection; when `Some`, they drive the dateline re-alignment of spec.md §4.5
/// step 1 and step 7's extra-translation case.
pub fn render(
    dst: &mut PixelBuffer,
    mesh: &Mesh,
    source_resolution: f64,
    source_world_width: Option<f64>,
    source_domain: Option<&Extent>,
    target_resolution: f64,
    target_extent: &Extent,
    sources: &[SourceTile],
    options: &RasterizerOptions,
) -> Result<()> {
    if target_resolution <= 0.0 {
        return Err(Error::InvalidArgument("target_resolution must be positive".into()));
    }
    let expected_width = (target_extent.width() / target_resolution).ceil() as u32 + 1;
    let expected_height = (target_extent.height() / target_resolution).ceil() as u32 + 1;
    if dst.width() != expected_width || dst.height() != expected_height {
        return Err(Error::DimensionMismatch {
            expected_width,
            expected_height,
            actual_width: dst.width(),
            actual_height: dst.height(),
        });
    }

    let target_top_left = target_extent.top_left();
    let shift_threshold = source_domain.map(|d| d.center_x());

    let mut stack = TransformStack::new();
    for tri in &mesh.triangles {
        render_triangle(
            dst,
            tri,
            source_resolution,
            source_world_width,
            shift_threshold,
            target_resolution,
            target_top_left,
            sources,
            &mut stack,
        );
    }

    if options.debug_overlay {
        draw_debug_overlay(dst, mesh, target_resolution, target_top_left);
    }

    Ok(())
}

fn to_dst_pixel(p: Coord, target_top_left: Coord, target_resolution: f64) -> Coord {
    Coord::new((p.x - target_top_left.x) / target_resolution, -(p.y - target_top_left.y) / target_resolution)
}

#[allow(clippy::too_many_arguments)]
fn render_triangle(
    dst: &mut PixelBuffer,
    tri: &Triangle,
    source_resolution: f64,
    source_world_width: Option<f64>,
    shift_threshold: Option<f64>,
    target_resolution: f64,
    target_top_left: Coord,
    sources: &[SourceTile],
    stack: &mut TransformStack,
) {
    stack.push();

    let shifted_source: [Coord; 3] = if tri.needs_shift {
        match source_world_width {
            Some(world_width) => [
                tri.source[0].with_x_reduced(world_width),
                tri.source[1].with_x_reduced(world_width),
                tri.source[2].with_x_reduced(world_width),
            ],
            None => tri.source,
        }
    } else {
        tri.source
    };

    let origin = shifted_source[0];
    let relative_source: [Coord; 3] = [shifted_source[0].sub(origin), shifted_source[1].sub(origin), shifted_source[2].sub(origin)];

    let dst_px: [Coord; 3] = [
        to_dst_pixel(tri.target[0], target_top_left, target_resolution),
        to_dst_pixel(tri.target[1], target_top_left, target_resolution),
        to_dst_pixel(tri.target[2], target_top_left, target_resolution),
    ];

    let Some(coeffs) = solve_affine(relative_source, dst_px) else {
        log::trace!("skipping triangle with singular affine system (collinear source vertices)");
        stack.pop();
        return;
    };
    let triangle_transform = AffineTransform::from_coeffs(coeffs);
    stack.set_transform(triangle_transform);

    let clip_poly = enlarge_triangle(dst_px, source_resolution, &triangle_transform);
    let clip_bbox = match bbox_of(&clip_poly, dst.width(), dst.height()) {
        Some(b) => b,
        None => {
            stack.pop();
            return;
        }
    };

    for src in sources {
        stack.push();

        let mut tx = src.extent.top_left().x - origin.x;
        let ty = src.extent.top_left().y - origin.y;
        if tri.needs_shift {
            if let (Some(world_width), Some(threshold)) = (source_world_width, shift_threshold) {
                if src.extent.top_left().x < threshold {
                    tx += world_width;
                }
            }
        }

        stack.translate(tx, ty);
        stack.scale(source_resolution, -source_resolution);
        draw_image(dst, &src.image, &stack.current(), &clip_poly, clip_bbox);
        stack.pop();
    }

    stack.pop();
}

/// Pushes each destination-pixel-space vertex of the triangle outward from its
/// centroid by one source pixel's length (converted into destination-pixel units via
/// the triangle's own affine scale), so the region sampled for compositing slightly
/// overdraws the geometric triangle and adjoining triangles don't leave a hairline
/// gap between them (spec.md §4.5 step 6).
fn enlarge_triangle(dst_px: [Coord; 3], source_resolution: f64, transform: &AffineTransform) -> [Coord; 3] {
    let centroid = Coord::new((dst_px[0].x + dst_px[1].x + dst_px[2].x) / 3.0, (dst_px[0].y + dst_px[1].y + dst_px[2].y) / 3.0);
    let push_len = source_resolution * transform.isotropic_scale();

    let mut out = dst_px;
    for v in out.iter_mut() {
        let dx = v.x - centroid.x;
        let dy = v.y - centroid.y;
        let len = (dx * dx + dy * dy).sqrt();
        if len < 1e-9 {
            continue;
        }
        v.x += dx / len * push_len;
        v.y += dy / len * push_len;
    }
    out
}

fn bbox_of(poly: &[Coord], width: u32, height: u32) -> Option<(i64, i64, i64, i64)> {
    let mut min_x = f64::INFINITY;
    let mut max_x = f64::NEG_INFINITY;
    let mut min_y = f64::INFINITY;
    let mut max_y = f64::NEG_INFINITY;
    for p in poly {
        min_x = min_x.min(p.x);
        max_x = max_x.max(p.x);
        min_y = min_y.min(p.y);
        max_y = max_y.max(p.y);
    }
    let x0 = (min_x.floor() as i64).max(0);
    let y0 = (min_y.floor() as i64).max(0);
    let x1 = (max_x.ceil() as i64).min(width as i64 - 1);
    let y1 = (max_y.ceil() as i64).min(height as i64 - 1);
    if x0 > x1 || y0 > y1 {
        return None;
    }
    Some((x0, y0, x1, y1))
}

fn cross(o: Coord, a: Coord, b: Coord) -> f64 {
    (a.x - o.x) * (b.y - o.y) - (a.y - o.y) * (b.x - o.x)
}

fn point_in_triangle(p: Coord, tri: &[Coord; 3]) -> bool {
    let d1 = cross(tri[0], tri[1], p);
    let d2 = cross(tri[1], tri[2], p);
    let d3 = cross(tri[2], tri[0], p);
    let has_neg = d1 < 0.0 || d2 < 0.0 || d3 < 0.0;
    let has_pos = d1 > 0.0 || d2 > 0.0 || d3 > 0.0;
    !(has_neg && has_pos)
}

fn draw_image(dst: &mut PixelBuffer, image: &PixelBuffer, composed_transform: &AffineTransform, clip_poly: &[Coord; 3], clip_bbox: (i64, i64, i64, i64)) {
    let Some(inverse) = composed_transform.invert() else {
        log::trace!("skipping source image with singular draw transform");
        return;
    };

    let (w, h) = (image.width() as f64, image.height() as f64);
    let (x0, y0, x1, y1) = clip_bbox;

    for py in y0..=y1 {
        for px in x0..=x1 {
            let center = Coord::new(px as f64 + 0.5, py as f64 + 0.5);
            if !point_in_triangle(center, clip_poly) {
                continue;
            }
            let local = inverse.apply(center);
            // the image is drawn inflated by half a source pixel on every side
            // (spec.md §4.5 step 7), so source coordinates up to [-0.5, dim+0.5] are
            // valid; anything farther out belongs to a different source tile.
            if local.x < -0.5 || local.x > w + 0.5 || local.y < -0.5 || local.y > h + 0.5 {
                continue;
            }
            let color = image.sample_bilinear(local.x, local.y);
            if color.a == 0 {
                continue;
            }
            dst.blend(px, py, color);
        }
    }
}

fn draw_debug_overlay(dst: &mut PixelBuffer, mesh: &Mesh, target_resolution: f64, target_top_left: Coord) {
    for tri in &mesh.triangles {
        let px = [
            to_dst_pixel(tri.target[0], target_top_left, target_resolution),
            to_dst_pixel(tri.target[1], target_top_left, target_resolution),
            to_dst_pixel(tri.target[2], target_top_left, target_resolution),
        ];
        draw_line(dst, px[0], px[1]);
        draw_line(dst, px[1], px[2]);
        draw_line(dst, px[2], px[0]);
    }
}

/// Bresenham line rasterization, drawn directly onto pixels with no canvas/graphics
/// crate underneath it, matching the rest of this module.
fn draw_line(dst: &mut PixelBuffer, a: Coord, b: Coord) {
    let mut x0 = a.x.round() as i64;
    let mut y0 = a.y.round() as i64;
    let x1 = b.x.round() as i64;
    let y1 = b.y.round() as i64;

    let dx = (x1 - x0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let dy = -(y1 - y0).abs();
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;

    loop {
        dst.set(x0, y0, DEBUG_OVERLAY_COLOR);
        if x0 == x1 && y0 == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x0 += sx;
        }
        if e2 <= dx {
            err += dx;
            y0 += sy;
        }
    }
}
