//! Geographic bounds and their resolution into grid index ranges.

use crate::error::{MeshError, Result};
use crate::grid::GridSpec;

/// A geographic bounding box in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoBounds {
    /// Northern boundary latitude.
    pub north: f64,
    /// Southern boundary latitude.
    pub south: f64,
    /// Eastern boundary longitude.
    pub east: f64,
    /// Western boundary longitude.
    pub west: f64,
}

impl GeoBounds {
    /// Create a bounding box.
    ///
    /// # Errors
    ///
    /// Returns [`MeshError::InvalidBounds`] unless `north > south` and
    /// `east > west`. NaN boundaries are rejected by the same check.
    pub fn new(north: f64, south: f64, east: f64, west: f64) -> Result<Self> {
        if north > south && east > west {
            Ok(Self {
                north,
                south,
                east,
                west,
            })
        } else {
            Err(MeshError::InvalidBounds {
                north,
                south,
                east,
                west,
            })
        }
    }
}

/// Inclusive grid index bounds of the region to mesh.
///
/// Columns `xa..=xb` run west to east, rows `ya..=yb` north to south. An
/// inverted pair (`xb < xa` or `yb < ya`) spans nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanWindow {
    pub xa: usize,
    pub xb: usize,
    pub ya: usize,
    pub yb: usize,
}

impl ScanWindow {
    /// Resolve geographic bounds against a grid.
    ///
    /// Boundaries are rounded inwards (the window never reaches past the
    /// requested box) and clamped to the grid. A box that misses the grid
    /// collapses to a zero-extent window on the nearest edge.
    pub fn resolve(bounds: &GeoBounds, spec: &GridSpec) -> Self {
        let cell = spec.cell_size;
        let xa = ((bounds.west - spec.origin_lon) / cell).ceil();
        let xb = ((bounds.east - spec.origin_lon) / cell).floor();
        let ya = ((spec.origin_lat - bounds.north) / cell).ceil();
        let yb = ((spec.origin_lat - bounds.south) / cell).floor();

        let (xa, xb) = clamp_range(xa, xb, spec.width);
        let (ya, yb) = clamp_range(ya, yb, spec.height);

        tracing::debug!(xa, xb, ya, yb, "resolved scan window");

        Self { xa, xb, ya, yb }
    }

    /// Window covering the whole grid.
    pub fn full(spec: &GridSpec) -> Self {
        Self {
            xa: 0,
            xb: spec.width - 1,
            ya: 0,
            yb: spec.height - 1,
        }
    }

    /// Number of columns spanned (`xb - xa`, zero if inverted).
    pub fn columns(&self) -> usize {
        self.xb.saturating_sub(self.xa)
    }

    /// Number of rows spanned (`yb - ya`, zero if inverted).
    pub fn rows(&self) -> usize {
        self.yb.saturating_sub(self.ya)
    }

    /// Number of whole `skip`-sized cells along each axis.
    ///
    /// A stride of zero is treated as one.
    pub fn cells(&self, skip: usize) -> (usize, usize) {
        let skip = skip.max(1);
        (self.columns() / skip, self.rows() / skip)
    }

    /// Returns true if the window spans no cells at all.
    pub fn is_empty(&self) -> bool {
        self.columns() == 0 || self.rows() == 0
    }
}

/// Clamp a pair of fractional indices into `[0, len - 1]`, keeping `lo <= hi`.
fn clamp_range(lo: f64, hi: f64, len: usize) -> (usize, usize) {
    let max = len.saturating_sub(1) as i64;
    let lo = (lo as i64).clamp(0, max) as usize;
    let hi = (hi as i64).clamp(0, max) as usize;
    (lo, hi.max(lo))
}
