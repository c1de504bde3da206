use thiserror::Error;

/// Errors surfaced by this crate's public entry points.
///
/// Per spec.md §7, benign geometric edge cases encountered deep inside meshing or
/// rasterizing (a degenerate quad, a singular per-triangle affine system, a clip that
/// drops below three vertices) are never turned into an `Error` — they are logged and
/// the offending triangle or quad is silently dropped. `Error` is reserved for the
/// programmer-error and precondition-violation class: malformed extents, destination
/// buffers whose dimensions don't match the extent/resolution they're rendered with.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("destination buffer is {actual_width}x{actual_height}, expected {expected_width}x{expected_height} for the given extent and resolution")]
    DimensionMismatch {
        expected_width: u32,
        expected_height: u32,
        actual_width: u32,
        actual_height: u32,
    },
}

pub type Result<T> = std::result::Result<T, Error>;
