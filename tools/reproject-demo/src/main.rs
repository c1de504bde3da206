//! Demonstrates the reproject engine end to end: a synthetic checkerboard raster is
//! meshed and resampled through a toy "swirl" warp (an exactly invertible nonlinear
//! transform, standing in for a real projection pair) and written out as a PNG.

use anyhow::{Context, Result};
use clap::Parser;
use reproject::config::{RasterizerOptions, TriangulatorOptions};
use reproject::coord::Coord;
use reproject::extent::Extent;
use reproject::projection::ProjectionDescriptor;
use reproject::raster::{PixelBuffer, Rgba, SourceTile};
use reproject::{rasterizer, triangulator};

#[derive(Parser, Debug)]
#[command(about = "Render a synthetic raster through a toy swirl warp")]
struct Args {
    /// Side length in pixels of both the synthetic source raster and the output.
    #[arg(long, default_value_t = 256)]
    size: u32,

    /// Swirl strength; 0.0 renders an identity warp.
    #[arg(long, default_value_t = 0.01)]
    swirl: f64,

    /// Maximum quad-tree subdivision depth.
    #[arg(long, default_value_t = 8)]
    max_depth: u32,

    /// Reprojection error tolerance, in source pixels.
    #[arg(long, default_value_t = 0.5)]
    error_threshold_px: f64,

    /// Overlay the mesh's triangle edges on the output.
    #[arg(long)]
    debug_overlay: bool,

    /// Output PNG path.
    #[arg(long, default_value = "reproject-demo.png")]
    output: std::path::PathBuf,
}

fn swirl_inv(c: Coord, k: f64) -> Coord {
    let r = (c.x * c.x + c.y * c.y).sqrt();
    let theta = c.y.atan2(c.x) + k * r;
    Coord::new(r * theta.cos(), r * theta.sin())
}

fn swirl_fwd(c: Coord, k: f64) -> Coord {
    let r = (c.x * c.x + c.y * c.y).sqrt();
    let theta = c.y.atan2(c.x) - k * r;
    Coord::new(r * theta.cos(), r * theta.sin())
}

fn checkerboard(size: u32, tile: u32) -> PixelBuffer {
    let mut image = PixelBuffer::new(size, size);
    for y in 0..size {
        for x in 0..size {
            let on = ((x / tile) + (y / tile)) % 2 == 0;
            let color = if on { Rgba::new(30, 120, 200, 255) } else { Rgba::new(235, 235, 235, 255) };
            image.set(x as i64, y as i64, color);
        }
    }
    image
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let half = args.size as f64 / 2.0;
    let extent = Extent::new(-half, -half, half, half);

    let source_image = checkerboard(args.size, (args.size / 16).max(1));
    let source_tile = SourceTile::new(extent, source_image);

    let projection = ProjectionDescriptor::planar(Some(extent));
    let triangulator_options = TriangulatorOptions::with_error_threshold_in_source_pixels(1.0, args.error_threshold_px, args.max_depth).with_source_domain(extent);

    let swirl = args.swirl;
    let mesh = triangulator::build_mesh(&extent, move |c| swirl_fwd(c, swirl), move |c| swirl_inv(c, swirl), &projection, &triangulator_options);
    log::info!("built mesh with {} triangles (wraps_x={})", mesh.triangles.len(), mesh.wraps_x);

    let mut dst = PixelBuffer::new(args.size + 1, args.size + 1);
    let rasterizer_options = RasterizerOptions { debug_overlay: args.debug_overlay };
    rasterizer::render(&mut dst, &mesh, 1.0, None, None, 1.0, &extent, std::slice::from_ref(&source_tile), &rasterizer_options)
        .context("rendering mesh to destination raster")?;

    write_png(&dst, &args.output)?;
    log::info!("wrote {}", args.output.display());
    Ok(())
}

fn write_png(buf: &PixelBuffer, path: &std::path::Path) -> Result<()> {
    let mut raw = Vec::with_capacity(buf.pixels().len() * 4);
    for p in buf.pixels() {
        raw.extend_from_slice(&[p.r, p.g, p.b, p.a]);
    }
    let image = image::RgbaImage::from_raw(buf.width(), buf.height(), raw).context("assembling output image buffer")?;
    image.save(path).with_context(|| format!("writing {}", path.display()))?;
    Ok(())
}
