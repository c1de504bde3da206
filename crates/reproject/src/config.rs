//! Tunables named by spec.md §6, bundled the way `tiler::TileProviderOptions` bundles
//! its per-call knobs rather than threaded as loose function arguments.

use crate::extent::Extent;

/// Default recursion depth cap for [`crate::triangulator::build_mesh`].
///
/// spec.md §6: "typically 10" — deep enough to resolve a global projection's worst-case
/// distortion near its singularities without risking stack growth or triangle counts
/// that swamp the rasterizer.
pub const MAX_SUBDIVISION_DEPTH: u32 = 10;

/// A quad whose source-space bounding box spans more than this fraction of the source
/// projection's world width is force-subdivided even if the midpoint error test would
/// have accepted it (spec.md §4.1, §6). Typical value: 0.25.
pub const MAX_TRIANGLE_WIDTH_FRAC: f64 = 0.25;

/// Default reprojection error tolerance, expressed as a multiple of one source pixel
/// (spec.md §6: "typically 0.5 source pixels"). Callers scale this by their own source
/// resolution via [`TriangulatorOptions::with_error_threshold_in_source_pixels`].
pub const ERROR_THRESHOLD_SOURCE_PIXELS: f64 = 0.5;

/// Per-call knobs for [`crate::triangulator::build_mesh`].
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TriangulatorOptions {
    /// Squared-distance threshold (in source units) a quad's midpoint reprojection
    /// error must stay under to be accepted as a leaf. Pass the *linear* tolerance in
    /// source units; this struct stores and compares against its square (spec.md §4.2).
    pub error_threshold: f64,
    /// Recursion depth cap; depth 0 never subdivides regardless of error.
    pub max_depth: u32,
    /// The source raster's own extent, if known. Quads entirely outside it are dropped
    /// without reprojection; leaves straddling it are clipped against it (spec.md §4.1).
    pub source_domain: Option<Extent>,
}

impl TriangulatorOptions {
    pub fn new(error_threshold: f64, max_depth: u32) -> Self {
        TriangulatorOptions {
            error_threshold,
            max_depth,
            source_domain: None,
        }
    }

    /// Convenience constructor matching spec.md §6's "0.5 source pixels" default.
    pub fn with_error_threshold_in_source_pixels(source_pixel_size: f64, factor: f64, max_depth: u32) -> Self {
        TriangulatorOptions::new(source_pixel_size * factor, max_depth)
    }

    pub fn with_source_domain(mut self, domain: Extent) -> Self {
        self.source_domain = Some(domain);
        self
    }
}

impl Default for TriangulatorOptions {
    fn default() -> Self {
        TriangulatorOptions::new(ERROR_THRESHOLD_SOURCE_PIXELS, MAX_SUBDIVISION_DEPTH)
    }
}

/// Per-call knobs for [`crate::rasterizer::render`].
#[derive(Debug, Clone, Copy, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RasterizerOptions {
    /// When set, each triangle's edges are stamped onto the destination in a fixed
    /// debug color after compositing (spec.md §6).
    pub debug_overlay: bool,
}
