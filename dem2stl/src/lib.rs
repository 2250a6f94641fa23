//! # dem2stl - DEM to printable STL
//!
//! Turns a regular elevation grid (Digital Elevation Model) into a watertight
//! triangulated solid ready for 3D printing, written as binary STL.
//!
//! ## Features
//!
//! - **Closed solids**: topography, four skirt walls and a flat base
//! - **Streaming**: each triangle is written as soon as it is computed, so
//!   memory stays at the size of the grid
//! - **Downsampling**: a stride (`skip`) trades resolution for triangle count
//! - **Printable**: every vertex sits on a base plate of configurable
//!   thickness, with vertical exaggeration and map scale applied
//!
//! ## Quick Start
//!
//! ```ignore
//! use dem2stl::{GeoBounds, GridSpec, HeightGrid, MeshConfig, ScanWindow, SolidMeshBuilder};
//!
//! let grid = HeightGrid::from_file("dem", GridSpec::hong_kong())?;
//! let config = MeshConfig::builder().skip(20).vertfact(5.0).build()?;
//!
//! let bounds = GeoBounds::new(22.45, 22.20, 114.30, 114.10)?;
//! let window = ScanWindow::resolve(&bounds, grid.spec());
//!
//! let file = std::io::BufWriter::new(std::fs::File::create("dem.stl")?);
//! SolidMeshBuilder::new(&grid, &config, window).write_stl(file)?;
//! ```
//!
//! ## Grid Format
//!
//! The input raster is a headerless file of `width × height` 4-byte
//! big-endian IEEE-754 floats, row-major, top row first. Values are
//! elevations in meters; -9999 marks missing data.
//!
//! ## Model Units
//!
//! Model coordinates are millimeters. At scale 1 one nautical mile (one
//! arc-minute of latitude) maps to one centimeter; the scale divisor shrinks
//! both the footprint and the relief.

pub mod config;
pub mod error;
pub mod geometry;
pub mod grid;
pub mod projection;
pub mod solid;
pub mod stl;
pub mod window;

// Re-export main types at crate root for convenience
pub use config::{MeshConfig, MeshConfigBuilder, OutOfRangePolicy};
pub use error::{MeshError, Result};
pub use geometry::{facet_normal, Triangle, Vertex3};
pub use grid::{GridSpec, HeightGrid, NO_DATA};
pub use projection::Projector;
pub use solid::{MeshStats, SolidMeshBuilder};
pub use stl::{read_stl, StlSummary, StlWriter, TriangleSink};
pub use window::{GeoBounds, ScanWindow};
