//! Grid index to model-space projection.
//!
//! The projection is a flat small-angle approximation: one arc-minute of
//! latitude is taken as one nautical mile, the model is built at one
//! nautical mile per centimeter divided by the configured scale, and both
//! planar axes are shrunk by the cosine of the grid's central parallel.

use crate::config::{MeshConfig, OutOfRangePolicy};
use crate::error::{MeshError, Result};
use crate::grid::{GridSpec, HeightGrid};
use crate::window::ScanWindow;

/// Meters per degree of arc (60 nautical miles).
pub const METERS_PER_DEGREE: f64 = 60.0 * 1852.0;

/// Model millimeters per ground meter at scale 1 (1 nautical mile per cm).
pub const MODEL_MM_PER_METER: f64 = 10.0 / 1852.0;

/// Model millimeters spanned by one grid cell on either planar axis.
pub fn mm_per_cell(spec: &GridSpec, config: &MeshConfig) -> f64 {
    let convergence = spec.central_parallel.to_radians().cos();
    spec.cell_size * METERS_PER_DEGREE * MODEL_MM_PER_METER * convergence / f64::from(config.scale)
}

/// Model footprint (east-west, north-south) of a window in mm.
///
/// Needs only the grid descriptor, so a plan can be sized before any samples
/// are loaded.
pub fn window_footprint(
    spec: &GridSpec,
    config: &MeshConfig,
    window: &ScanWindow,
) -> (f64, f64) {
    let cell_mm = mm_per_cell(spec, config);
    (
        window.columns() as f64 * cell_mm,
        window.rows() as f64 * cell_mm,
    )
}

/// Maps grid indices and samples into printable model coordinates.
#[derive(Debug, Clone, Copy)]
pub struct Projector<'a> {
    grid: &'a HeightGrid,
    config: &'a MeshConfig,
    /// Model millimeters per grid cell on both planar axes.
    mm_per_cell: f64,
    /// Model millimeters per meter of relief.
    mm_per_meter: f64,
}

impl<'a> Projector<'a> {
    pub fn new(grid: &'a HeightGrid, config: &'a MeshConfig) -> Self {
        Self {
            grid,
            config,
            mm_per_cell: mm_per_cell(grid.spec(), config),
            mm_per_meter: MODEL_MM_PER_METER * f64::from(config.vertfact)
                / f64::from(config.scale),
        }
    }

    /// Model X of a column; the grid's center column maps to zero.
    pub fn planar_x(&self, index: usize) -> f32 {
        let center = (self.grid.width() / 2) as f64;
        ((index as f64 - center) * self.mm_per_cell) as f32
    }

    /// Model Y of a row; rows grow southward, so north is +Y.
    pub fn planar_y(&self, index: usize) -> f32 {
        let center = (self.grid.height() / 2) as f64;
        ((center - index as f64) * self.mm_per_cell) as f32
    }

    /// Printable Z of the sample at column `x`, row `y`.
    ///
    /// Relief below sea level and no-data samples flatten to the base plate,
    /// so the result is never below `padding`. Land samples get an extra
    /// `padding * land_offset`.
    ///
    /// # Errors
    ///
    /// Returns [`MeshError::IndexOutOfRange`] for an index outside the grid
    /// when the policy is [`OutOfRangePolicy::Error`]. The other policies
    /// read the nearest valid sample instead.
    pub fn elevation(&self, x: usize, y: usize) -> Result<f32> {
        let sample = self.sample(x, y)?;
        let config = self.config;

        let mut z = f64::from(sample.max(0.0)) * self.mm_per_meter;
        if sample > config.land_threshold {
            z += f64::from(config.padding * config.land_offset);
        }
        Ok((z + f64::from(config.padding)) as f32)
    }

    /// Estimated model footprint (east-west, north-south) of a window in mm.
    pub fn model_extent(&self, window: &ScanWindow) -> (f32, f32) {
        let (width, depth) = window_footprint(self.grid.spec(), self.config, window);
        (width as f32, depth as f32)
    }

    fn sample(&self, x: usize, y: usize) -> Result<f32> {
        if let Some(value) = self.grid.get(x, y) {
            return Ok(value);
        }

        let (width, height) = (self.grid.width(), self.grid.height());
        match self.config.out_of_range {
            OutOfRangePolicy::Error => {
                return Err(MeshError::IndexOutOfRange {
                    x,
                    y,
                    width,
                    height,
                })
            }
            OutOfRangePolicy::Warn => {
                tracing::warn!(x, y, width, height, "elevation lookup outside grid");
            }
            OutOfRangePolicy::Clamp => {}
        }

        let clamped = self.grid.get(x.min(width - 1), y.min(height - 1));
        Ok(clamped.unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::NO_DATA;
    use approx::assert_relative_eq;

    /// 4×3 grid on the equator so the cosine correction is 1.
    fn grid() -> HeightGrid {
        let spec = GridSpec::new(4, 3, 1.0 / 60.0, 0.0, 0.0)
            .unwrap()
            .with_central_parallel(0.0);
        #[rustfmt::skip]
        let samples = vec![
            0.0,    1852.0, -20.0, NO_DATA,
            0.5,    100.0,  200.0, 300.0,
            1000.0, 1.0,    1.5,   0.0,
        ];
        HeightGrid::from_samples(spec, samples).unwrap()
    }

    #[test]
    fn test_planar_axes() {
        let grid = grid();
        let config = MeshConfig::default();
        let p = Projector::new(&grid, &config);

        // One arc-minute per cell is 10mm at scale 1
        assert_relative_eq!(p.planar_x(2), 0.0);
        assert_relative_eq!(p.planar_x(3), 10.0, epsilon = 1e-4);
        assert_relative_eq!(p.planar_x(0), -20.0, epsilon = 1e-4);

        // Row 0 is north of the center row
        assert_relative_eq!(p.planar_y(1), 0.0);
        assert_relative_eq!(p.planar_y(0), 10.0, epsilon = 1e-4);
        assert_relative_eq!(p.planar_y(2), -10.0, epsilon = 1e-4);
    }

    #[test]
    fn test_scale_and_parallel_shrink_planar_axes() {
        let spec = GridSpec::new(4, 3, 1.0 / 60.0, 0.0, 60.0)
            .unwrap()
            .with_central_parallel(60.0);
        let grid = HeightGrid::from_samples(spec, vec![0.0; 12]).unwrap();
        let config = MeshConfig::builder().scale(2.0).build().unwrap();
        let p = Projector::new(&grid, &config);

        // cos(60°) = 0.5, scale 2 halves again
        assert_relative_eq!(p.planar_x(3), 2.5, epsilon = 1e-4);
        assert_relative_eq!(p.planar_y(0), 2.5, epsilon = 1e-4);
    }

    #[test]
    fn test_elevation_land_and_sea() {
        let grid = grid();
        let config = MeshConfig::builder().vertfact(1.0).build().unwrap();
        let p = Projector::new(&grid, &config);

        // Sea level: bare padding
        assert_relative_eq!(p.elevation(0, 0).unwrap(), 5.0);
        // 1852m is 10mm of relief, plus 0.5mm land offset
        assert_relative_eq!(p.elevation(1, 0).unwrap(), 15.5, epsilon = 1e-4);
        // Below sea level and no-data clamp to the plate
        assert_relative_eq!(p.elevation(2, 0).unwrap(), 5.0);
        assert_relative_eq!(p.elevation(3, 0).unwrap(), 5.0);
        // Exactly at the land threshold is not land
        let at_threshold = p.elevation(1, 2).unwrap();
        assert!(at_threshold > 5.0 && at_threshold < 5.5);
        // Just above is
        assert!(p.elevation(2, 2).unwrap() > 5.5);
    }

    #[test]
    fn test_elevation_never_below_padding() {
        let grid = grid();
        let config = MeshConfig::default();
        let p = Projector::new(&grid, &config);

        for y in 0..grid.height() {
            for x in 0..grid.width() {
                let sample = grid.get(x, y).unwrap();
                let z = p.elevation(x, y).unwrap();
                assert!(z >= config.padding);
                if sample > config.land_threshold {
                    assert!(z > config.padding);
                }
            }
        }
    }

    #[test]
    fn test_vertfact_and_scale() {
        let grid = grid();
        let config = MeshConfig::builder()
            .vertfact(10.0)
            .scale(2.0)
            .build()
            .unwrap();
        let p = Projector::new(&grid, &config);

        // 1852m → 10mm × 10 / 2 = 50mm, + 0.5 + 5
        assert_relative_eq!(p.elevation(1, 0).unwrap(), 55.5, epsilon = 1e-3);
    }

    #[test]
    fn test_out_of_range_policies() {
        let grid = grid();

        let strict = MeshConfig::builder()
            .out_of_range(OutOfRangePolicy::Error)
            .build()
            .unwrap();
        let p = Projector::new(&grid, &strict);
        assert!(matches!(
            p.elevation(4, 0),
            Err(MeshError::IndexOutOfRange { x: 4, y: 0, .. })
        ));

        let clamp = MeshConfig::builder()
            .vertfact(1.0)
            .out_of_range(OutOfRangePolicy::Clamp)
            .build()
            .unwrap();
        let p = Projector::new(&grid, &clamp);
        assert_eq!(p.elevation(10, 10).unwrap(), p.elevation(3, 2).unwrap());

        let warn = MeshConfig::builder().vertfact(1.0).build().unwrap();
        let p = Projector::new(&grid, &warn);
        assert_eq!(p.elevation(1, 7).unwrap(), p.elevation(1, 2).unwrap());
    }

    #[test]
    fn test_model_extent() {
        let grid = grid();
        let config = MeshConfig::default();
        let p = Projector::new(&grid, &config);
        let (w, h) = p.model_extent(&ScanWindow::full(grid.spec()));
        assert_relative_eq!(w, 30.0, epsilon = 1e-4);
        assert_relative_eq!(h, 20.0, epsilon = 1e-4);
    }

    #[test]
    fn test_footprint_matches_planar_span() {
        let grid = grid();
        let config = MeshConfig::builder().scale(2.0).build().unwrap();
        let p = Projector::new(&grid, &config);
        let window = ScanWindow {
            xa: 1,
            xb: 3,
            ya: 0,
            yb: 2,
        };

        let (w, h) = window_footprint(grid.spec(), &config, &window);
        assert_relative_eq!(w as f32, p.planar_x(3) - p.planar_x(1), epsilon = 1e-4);
        assert_relative_eq!(h as f32, p.planar_y(0) - p.planar_y(2), epsilon = 1e-4);
        assert_eq!(p.model_extent(&window), (w as f32, h as f32));
    }
}
