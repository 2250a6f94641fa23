//! Error types for the dem2stl library.

use thiserror::Error;

/// Errors that can occur while loading a grid or generating a mesh.
#[derive(Error, Debug)]
pub enum MeshError {
    /// IO error when reading the grid or writing the mesh.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Grid file size doesn't match the configured dimensions.
    #[error("Invalid grid file size: {size} bytes (expected {expected} for the configured grid)")]
    InvalidFileSize { size: usize, expected: usize },

    /// In-memory sample buffer doesn't match the configured dimensions.
    #[error("Sample count mismatch: got {actual} samples, grid needs {expected}")]
    SampleCountMismatch { expected: usize, actual: usize },

    /// Grid descriptor is unusable (zero dimension, non-positive cell size, ...).
    #[error("Invalid grid descriptor: {0}")]
    InvalidGridSpec(String),

    /// Geographic bounds are inverted or not finite.
    #[error(
        "Invalid bounds: north={north}, south={south}, east={east}, west={west} \
         (expected north > south and east > west)"
    )]
    InvalidBounds {
        north: f64,
        south: f64,
        east: f64,
        west: f64,
    },

    /// Mesh configuration is out of range.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// An elevation lookup fell outside the grid.
    #[error("Grid index out of range: x={x}, y={y} (grid is {width}x{height})")]
    IndexOutOfRange {
        x: usize,
        y: usize,
        width: usize,
        height: usize,
    },

    /// The number of streamed triangles differs from the count in the header.
    #[error("Triangle count mismatch: header announced {expected}, wrote {actual}")]
    TriangleCountMismatch { expected: u32, actual: u32 },

    /// A binary STL stream is malformed.
    #[error("Invalid STL data: {0}")]
    InvalidStl(String),
}

/// Result type alias using [`MeshError`].
pub type Result<T> = std::result::Result<T, MeshError>;
