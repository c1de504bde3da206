//! Adaptive triangular-mesh raster reprojection.
//!
//! Two pieces, used together: [`triangulator::build_mesh`] adaptively refines a
//! quad-tree over a target extent into a triangular mesh carrying paired
//! source/target vertex coordinates, and [`rasterizer::render`] composites one or
//! more source image tiles into a destination raster using a per-triangle affine map
//! derived from that mesh. Forward/inverse projection math, tile fetching,
//! source-resolution selection, color management and any GPU path are the caller's
//! concern — this crate consumes `fwd`/`inv` as plain closures and produces/consumes
//! plain pixel buffers.
//!
//! ```no_run
//! use reproject::{config::TriangulatorOptions, coord::Coord, projection::ProjectionDescriptor};
//! use reproject::{extent::Extent, raster::{PixelBuffer, SourceTile}, config::RasterizerOptions};
//!
//! let target = Extent::new(0.0, 0.0, 360.0, 180.0);
//! let fwd = |c: Coord| c;
//! let inv = |c: Coord| c;
//! let proj = ProjectionDescriptor::planar(None);
//! let options = TriangulatorOptions::default();
//! let mesh = reproject::triangulator::build_mesh(&target, fwd, inv, &proj, &options);
//!
//! let mut dst = PixelBuffer::new(361, 181);
//! let sources: Vec<SourceTile> = Vec::new();
//! reproject::rasterizer::render(&mut dst, &mesh, 1.0, None, None, 1.0, &target, &sources, &RasterizerOptions::default()).unwrap();
//! ```

pub mod affine;
pub mod clipper;
pub mod config;
pub mod coord;
pub mod error;
pub mod extent;
pub mod fan;
pub mod linsolve;
pub mod mesh;
pub mod projection;
pub mod raster;
pub mod rasterizer;
pub mod triangulator;

pub use coord::Coord;
pub use error::{Error, Result};
pub use extent::Extent;
pub use mesh::{Mesh, Triangle};
pub use projection::ProjectionDescriptor;
pub use raster::{PixelBuffer, Rgba, SourceTile};

#[cfg(test)]
#[ctor::ctor]
fn init_test_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}
