//! Raw DEM grid loading and sample access.
//!
//! This module provides [`GridSpec`], the geometric descriptor of a raster, and
//! [`HeightGrid`], the in-memory row-major sample buffer the mesh generator
//! reads from.

use std::fs::File;
use std::path::Path;

use memmap2::Mmap;

use crate::error::{MeshError, Result};
use crate::window::GeoBounds;

/// Size in bytes of one sample on disk (big-endian IEEE-754 `f32`).
const SAMPLE_BYTES: usize = 4;

/// Value indicating no data in the raw grid.
pub const NO_DATA: f32 = -9999.0;

/// Geometry of a raster: dimensions, cell size and geographic placement.
///
/// Rows run north to south: row 0 lies at `origin_lat` and each following row
/// is `cell_size` degrees further south. Columns run west to east from
/// `origin_lon`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridSpec {
    /// Number of columns.
    pub width: usize,
    /// Number of rows.
    pub height: usize,
    /// Cell size in degrees.
    pub cell_size: f64,
    /// Longitude of the western edge.
    pub origin_lon: f64,
    /// Latitude of row 0.
    pub origin_lat: f64,
    /// Latitude used for the meridian convergence correction.
    pub central_parallel: f64,
}

impl GridSpec {
    /// Create a descriptor whose central parallel is the grid's mid latitude.
    ///
    /// # Errors
    ///
    /// Returns [`MeshError::InvalidGridSpec`] if a dimension is zero, the
    /// raw file size overflows `usize`, or the cell size is not a positive
    /// finite number.
    pub fn new(
        width: usize,
        height: usize,
        cell_size: f64,
        origin_lon: f64,
        origin_lat: f64,
    ) -> Result<Self> {
        let central_parallel = origin_lat - height as f64 * cell_size / 2.0;
        Self {
            width,
            height,
            cell_size,
            origin_lon,
            origin_lat,
            central_parallel,
        }
        .validated()
    }

    /// Descriptor of the Hong Kong survey raster the tool was written for.
    ///
    /// 13639 × 9547 cells of 4.5454545e-05°, western edge at 113.82414054°E,
    /// row 0 at 22.57197092°N, scale corrected at the 22nd parallel.
    pub fn hong_kong() -> Self {
        Self {
            width: 13639,
            height: 9547,
            cell_size: 4.5454545e-05,
            origin_lon: 113.82414054,
            origin_lat: 22.57197092,
            central_parallel: 22.0,
        }
    }

    /// Override the latitude used for the scale correction.
    pub fn with_central_parallel(mut self, central_parallel: f64) -> Self {
        self.central_parallel = central_parallel;
        self
    }

    /// Check the descriptor for usable values.
    pub fn validated(self) -> Result<Self> {
        if self.width == 0 || self.height == 0 {
            return Err(MeshError::InvalidGridSpec(format!(
                "dimensions must be non-zero, got {}x{}",
                self.width, self.height
            )));
        }
        if self
            .width
            .checked_mul(self.height)
            .and_then(|n| n.checked_mul(SAMPLE_BYTES))
            .is_none()
        {
            return Err(MeshError::InvalidGridSpec(format!(
                "{}x{} grid is too large to address",
                self.width, self.height
            )));
        }
        if !(self.cell_size.is_finite() && self.cell_size > 0.0) {
            return Err(MeshError::InvalidGridSpec(format!(
                "cell size must be positive, got {}",
                self.cell_size
            )));
        }
        if !(self.origin_lon.is_finite()
            && self.origin_lat.is_finite()
            && self.central_parallel.is_finite())
        {
            return Err(MeshError::InvalidGridSpec(
                "origin and central parallel must be finite".to_string(),
            ));
        }
        Ok(self)
    }

    /// Total number of samples, saturating for a descriptor that
    /// [`GridSpec::validated`] would reject.
    pub fn sample_count(&self) -> usize {
        self.width.saturating_mul(self.height)
    }

    /// Expected size of the raw grid file in bytes, saturating like
    /// [`GridSpec::sample_count`].
    pub fn file_size(&self) -> usize {
        self.sample_count().saturating_mul(SAMPLE_BYTES)
    }

    /// Geographic extent of the whole grid.
    pub fn full_extent(&self) -> GeoBounds {
        GeoBounds {
            north: self.origin_lat,
            south: self.origin_lat - self.height as f64 * self.cell_size,
            east: self.origin_lon + self.width as f64 * self.cell_size,
            west: self.origin_lon,
        }
    }
}

/// An in-memory elevation grid.
///
/// Samples are elevations in meters (or [`NO_DATA`]) stored row-major, top
/// row first, already converted to native byte order.
///
/// # Example
///
/// ```ignore
/// use dem2stl::{GridSpec, HeightGrid};
///
/// let grid = HeightGrid::from_file("dem", GridSpec::hong_kong())?;
/// println!("Peak sample: {}m", grid.get(6800, 4700).unwrap_or_default());
/// ```
#[derive(Debug, Clone)]
pub struct HeightGrid {
    spec: GridSpec,
    samples: Vec<f32>,
}

impl HeightGrid {
    /// Wrap an existing sample buffer.
    ///
    /// # Errors
    ///
    /// Returns an error if the descriptor is invalid or the buffer length is
    /// not `width * height`.
    pub fn from_samples(spec: GridSpec, samples: Vec<f32>) -> Result<Self> {
        let spec = spec.validated()?;
        if samples.len() != spec.sample_count() {
            return Err(MeshError::SampleCountMismatch {
                expected: spec.sample_count(),
                actual: samples.len(),
            });
        }
        Ok(Self { spec, samples })
    }

    /// Load a headerless big-endian `f32` raster.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The file cannot be opened or memory-mapped
    /// - The file size doesn't match `width * height * 4`
    pub fn from_file<P: AsRef<Path>>(path: P, spec: GridSpec) -> Result<Self> {
        let spec = spec.validated()?;
        let file = File::open(&path)?;

        // SAFETY: the mapping is read-only and dropped before this function
        // returns; the decoded samples are copied out.
        let mmap = unsafe { Mmap::map(&file)? };

        if mmap.len() != spec.file_size() {
            return Err(MeshError::InvalidFileSize {
                size: mmap.len(),
                expected: spec.file_size(),
            });
        }

        let samples: Vec<f32> = mmap
            .chunks_exact(SAMPLE_BYTES)
            .map(|b| f32::from_be_bytes([b[0], b[1], b[2], b[3]]))
            .collect();

        tracing::debug!(
            path = %path.as_ref().display(),
            width = spec.width,
            height = spec.height,
            "loaded grid"
        );

        Ok(Self { spec, samples })
    }

    /// Returns the grid descriptor.
    pub fn spec(&self) -> &GridSpec {
        &self.spec
    }

    /// Number of columns.
    pub fn width(&self) -> usize {
        self.spec.width
    }

    /// Number of rows.
    pub fn height(&self) -> usize {
        self.spec.height
    }

    /// Sample at column `x`, row `y`, or `None` outside the grid.
    pub fn get(&self, x: usize, y: usize) -> Option<f32> {
        if x < self.spec.width && y < self.spec.height {
            Some(self.samples[y * self.spec.width + x])
        } else {
            None
        }
    }

    /// All samples, row-major.
    pub fn samples(&self) -> &[f32] {
        &self.samples
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn small_spec() -> GridSpec {
        GridSpec::new(3, 2, 0.5, 100.0, 20.0).unwrap()
    }

    /// Create a 3×2 raw grid file with samples 0..6 scaled by 100m.
    fn create_test_grid_file() -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        for i in 0..6 {
            let value = i as f32 * 100.0;
            file.write_all(&value.to_be_bytes()).unwrap();
        }
        file
    }

    #[test]
    fn test_load_grid_file() {
        let file = create_test_grid_file();
        let grid = HeightGrid::from_file(file.path(), small_spec()).unwrap();

        assert_eq!(grid.width(), 3);
        assert_eq!(grid.height(), 2);
        assert_eq!(grid.get(0, 0), Some(0.0));
        assert_eq!(grid.get(2, 0), Some(200.0));
        assert_eq!(grid.get(0, 1), Some(300.0));
        assert_eq!(grid.get(2, 1), Some(500.0));
        assert_eq!(grid.get(3, 0), None);
        assert_eq!(grid.get(0, 2), None);
    }

    #[test]
    fn test_invalid_file_size() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(&[0u8; 10]).unwrap();

        let result = HeightGrid::from_file(file.path(), small_spec());
        if let Err(MeshError::InvalidFileSize { size, expected }) = result {
            assert_eq!(size, 10);
            assert_eq!(expected, 24);
        } else {
            panic!("Expected InvalidFileSize error");
        }
    }

    #[test]
    fn test_missing_file() {
        let result = HeightGrid::from_file("/nonexistent/dem", small_spec());
        assert!(matches!(result, Err(MeshError::Io(_))));
    }

    #[test]
    fn test_sample_count_mismatch() {
        let result = HeightGrid::from_samples(small_spec(), vec![0.0; 5]);
        assert!(matches!(
            result,
            Err(MeshError::SampleCountMismatch {
                expected: 6,
                actual: 5
            })
        ));
    }

    #[test]
    fn test_invalid_spec() {
        assert!(GridSpec::new(0, 4, 1.0, 0.0, 0.0).is_err());
        assert!(GridSpec::new(4, 4, 0.0, 0.0, 0.0).is_err());
        assert!(GridSpec::new(4, 4, f64::NAN, 0.0, 0.0).is_err());
    }

    #[test]
    fn test_oversized_spec_rejected() {
        let result = GridSpec::new(1usize << 62, 4, 1e-9, 0.0, 0.0);
        assert!(matches!(result, Err(MeshError::InvalidGridSpec(_))));

        let result = GridSpec::new(usize::MAX, 2, 1e-9, 0.0, 0.0);
        assert!(matches!(result, Err(MeshError::InvalidGridSpec(_))));

        // A hand-built descriptor never wraps to a small file size
        let spec = GridSpec {
            width: 1usize << 62,
            ..small_spec()
        };
        assert_eq!(spec.file_size(), usize::MAX);
        assert!(HeightGrid::from_samples(spec, Vec::new()).is_err());
    }

    #[test]
    fn test_full_extent() {
        let extent = small_spec().full_extent();
        assert_eq!(extent.north, 20.0);
        assert_eq!(extent.south, 19.0);
        assert_eq!(extent.west, 100.0);
        assert_eq!(extent.east, 101.5);
    }

    #[test]
    fn test_central_parallel() {
        assert_eq!(small_spec().central_parallel, 19.5);
        assert_eq!(GridSpec::hong_kong().central_parallel, 22.0);
        assert_eq!(GridSpec::hong_kong().file_size(), 13639 * 9547 * 4);
    }
}
