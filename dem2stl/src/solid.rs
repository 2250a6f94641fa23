//! Closed solid generation from a scan window.
//!
//! [`SolidMeshBuilder`] turns the grid samples inside a [`ScanWindow`] into a
//! watertight solid made of four parts, emitted in this order:
//!
//! 1. the topography surface,
//! 2. skirt walls along the northern and southern rows,
//! 3. skirt walls along the western and eastern columns,
//! 4. the flat base at `Z = 0`.
//!
//! Vertices sit on every `skip`-th column and row starting at the window's
//! north-west corner. Each quad cell is split along the same diagonal in the
//! surface and the base, and every wall segment reuses the surface edge above
//! it, so each edge is shared by exactly two facets with opposite directions.
//! All facets wind counter-clockwise seen from outside the solid.

use std::io::Write;

use crate::config::MeshConfig;
use crate::error::{MeshError, Result};
use crate::geometry::{Triangle, Vertex3};
use crate::grid::HeightGrid;
use crate::projection::Projector;
use crate::stl::{StlWriter, TriangleSink, DEFAULT_HEADER};
use crate::window::ScanWindow;

/// Triangle counts per mesh part.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MeshStats {
    pub topography: u64,
    pub parallel_skirts: u64,
    pub meridian_skirts: u64,
    pub base: u64,
}

impl MeshStats {
    /// Triangle counts a window meshed at stride `skip` produces.
    ///
    /// A window with no whole cell along either axis produces nothing, so no
    /// zero-area walls are emitted.
    pub fn predict(window: &ScanWindow, skip: usize) -> Self {
        let (nx, ny) = solid_cells(window, skip);
        let (nx, ny) = (nx as u64, ny as u64);
        Self {
            topography: 2 * nx * ny,
            parallel_skirts: 4 * nx,
            meridian_skirts: 4 * ny,
            base: 2 * nx * ny,
        }
    }

    /// Total triangles over all parts.
    pub fn total(&self) -> u64 {
        self.topography + self.parallel_skirts + self.meridian_skirts + self.base
    }
}

/// Streams the triangles of a closed terrain solid.
///
/// # Example
///
/// ```ignore
/// use dem2stl::{GridSpec, HeightGrid, MeshConfig, ScanWindow, SolidMeshBuilder};
///
/// let grid = HeightGrid::from_file("dem", GridSpec::hong_kong())?;
/// let config = MeshConfig::default();
/// let window = ScanWindow::full(grid.spec());
///
/// let file = std::io::BufWriter::new(std::fs::File::create("dem.stl")?);
/// let stats = SolidMeshBuilder::new(&grid, &config, window).write_stl(file)?;
/// println!("{} triangles", stats.total());
/// ```
pub struct SolidMeshBuilder<'a> {
    projector: Projector<'a>,
    window: ScanWindow,
    skip: usize,
}

impl<'a> SolidMeshBuilder<'a> {
    pub fn new(grid: &'a HeightGrid, config: &'a MeshConfig, window: ScanWindow) -> Self {
        Self {
            projector: Projector::new(grid, config),
            window,
            skip: config.stride().max(1),
        }
    }

    /// The projector used for vertex coordinates.
    pub fn projector(&self) -> &Projector<'a> {
        &self.projector
    }

    /// The window being meshed.
    pub fn window(&self) -> &ScanWindow {
        &self.window
    }

    /// Triangle counts the passes will emit, computed without sampling.
    pub fn predicted(&self) -> MeshStats {
        MeshStats::predict(&self.window, self.skip)
    }

    /// Total predicted triangle count as stored in an STL header.
    ///
    /// # Errors
    ///
    /// Returns [`MeshError::InvalidConfig`] if the mesh has more triangles
    /// than a binary STL can index.
    pub fn triangle_count(&self) -> Result<u32> {
        let total = self.predicted().total();
        u32::try_from(total).map_err(|_| {
            MeshError::InvalidConfig(format!(
                "mesh would have {} triangles, more than binary STL can hold; increase skip",
                total
            ))
        })
    }

    /// Generate every triangle into `sink`, in emission order.
    pub fn build<S: TriangleSink + ?Sized>(&self, sink: &mut S) -> Result<MeshStats> {
        let (nx, ny) = solid_cells(&self.window, self.skip);
        tracing::debug!(
            nx,
            ny,
            skip = self.skip,
            window = ?self.window,
            "generating solid"
        );

        let stats = MeshStats {
            topography: self.topography(sink, nx, ny)?,
            parallel_skirts: self.parallel_skirts(sink, nx, ny)?,
            meridian_skirts: self.meridian_skirts(sink, nx, ny)?,
            base: self.base(sink, nx, ny)?,
        };

        tracing::info!(
            topography = stats.topography,
            parallel_skirts = stats.parallel_skirts,
            meridian_skirts = stats.meridian_skirts,
            base = stats.base,
            "solid complete"
        );
        Ok(stats)
    }

    /// Write a complete binary STL to `writer`.
    ///
    /// # Errors
    ///
    /// Fails on any write error, on an out-of-range lookup under the strict
    /// policy, or if the emitted count differs from the header.
    pub fn write_stl<W: Write>(&self, writer: W) -> Result<MeshStats> {
        let mut stl = StlWriter::new(writer, DEFAULT_HEADER, self.triangle_count()?)?;
        let stats = self.build(&mut stl)?;
        stl.finish()?;
        Ok(stats)
    }

    fn column(&self, k: usize) -> usize {
        self.window.xa + k * self.skip
    }

    fn row(&self, l: usize) -> usize {
        self.window.ya + l * self.skip
    }

    /// Surface vertex at column `i`, row `j`.
    fn top(&self, i: usize, j: usize) -> Result<Vertex3> {
        Ok(Vertex3::new(
            self.projector.planar_x(i),
            self.projector.planar_y(j),
            self.projector.elevation(i, j)?,
        ))
    }

    /// Base vertex below column `i`, row `j`.
    fn bottom(&self, i: usize, j: usize) -> Vertex3 {
        Vertex3::new(self.projector.planar_x(i), self.projector.planar_y(j), 0.0)
    }

    fn topography<S: TriangleSink + ?Sized>(
        &self,
        sink: &mut S,
        nx: usize,
        ny: usize,
    ) -> Result<u64> {
        let mut emitted = 0;
        for k in 0..nx {
            let (i, i2) = (self.column(k), self.column(k + 1));
            for l in 0..ny {
                let (j, j2) = (self.row(l), self.row(l + 1));
                let nw = self.top(i, j)?;
                let ne = self.top(i2, j)?;
                let sw = self.top(i, j2)?;
                let se = self.top(i2, j2)?;

                sink.push(&Triangle::new(nw, sw, ne))?;
                sink.push(&Triangle::new(ne, sw, se))?;
                emitted += 2;
            }
        }
        tracing::debug!(triangles = emitted, "topography pass");
        Ok(emitted)
    }

    fn parallel_skirts<S: TriangleSink + ?Sized>(
        &self,
        sink: &mut S,
        nx: usize,
        ny: usize,
    ) -> Result<u64> {
        let mut emitted = 0;
        if ny == 0 {
            return Ok(emitted);
        }
        let (north, south) = (self.row(0), self.row(ny));
        for k in 0..nx {
            let (i, i2) = (self.column(k), self.column(k + 1));

            // North wall faces +Y
            let (a0, b0) = (self.bottom(i, north), self.bottom(i2, north));
            let (at, bt) = (self.top(i, north)?, self.top(i2, north)?);
            sink.push(&Triangle::new(a0, at, b0))?;
            sink.push(&Triangle::new(b0, at, bt))?;

            // South wall faces -Y
            let (a0, b0) = (self.bottom(i, south), self.bottom(i2, south));
            let (at, bt) = (self.top(i, south)?, self.top(i2, south)?);
            sink.push(&Triangle::new(a0, b0, at))?;
            sink.push(&Triangle::new(b0, bt, at))?;

            emitted += 4;
        }
        tracing::debug!(triangles = emitted, "parallel skirt pass");
        Ok(emitted)
    }

    fn meridian_skirts<S: TriangleSink + ?Sized>(
        &self,
        sink: &mut S,
        nx: usize,
        ny: usize,
    ) -> Result<u64> {
        let mut emitted = 0;
        if nx == 0 {
            return Ok(emitted);
        }
        let (west, east) = (self.column(0), self.column(nx));
        for l in 0..ny {
            let (j, j2) = (self.row(l), self.row(l + 1));

            // West wall faces -X
            let (p0, q0) = (self.bottom(west, j), self.bottom(west, j2));
            let (pt, qt) = (self.top(west, j)?, self.top(west, j2)?);
            sink.push(&Triangle::new(p0, q0, pt))?;
            sink.push(&Triangle::new(q0, qt, pt))?;

            // East wall faces +X
            let (p0, q0) = (self.bottom(east, j), self.bottom(east, j2));
            let (pt, qt) = (self.top(east, j)?, self.top(east, j2)?);
            sink.push(&Triangle::new(p0, pt, q0))?;
            sink.push(&Triangle::new(q0, pt, qt))?;

            emitted += 4;
        }
        tracing::debug!(triangles = emitted, "meridian skirt pass");
        Ok(emitted)
    }

    fn base<S: TriangleSink + ?Sized>(&self, sink: &mut S, nx: usize, ny: usize) -> Result<u64> {
        let mut emitted = 0;
        for k in 0..nx {
            let (i, i2) = (self.column(k), self.column(k + 1));
            for l in 0..ny {
                let (j, j2) = (self.row(l), self.row(l + 1));
                let nw = self.bottom(i, j);
                let ne = self.bottom(i2, j);
                let sw = self.bottom(i, j2);
                let se = self.bottom(i2, j2);

                sink.push(&Triangle::new(nw, ne, sw))?;
                sink.push(&Triangle::new(ne, se, sw))?;
                emitted += 2;
            }
        }
        tracing::debug!(triangles = emitted, "base pass");
        Ok(emitted)
    }
}

/// Whole cells along each axis; zero on both if either axis has none.
fn solid_cells(window: &ScanWindow, skip: usize) -> (usize, usize) {
    match window.cells(skip) {
        (0, _) | (_, 0) => (0, 0),
        cells => cells,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::GridSpec;

    fn uniform_grid(width: usize, height: usize, value: f32) -> HeightGrid {
        let spec = GridSpec::new(width, height, 1.0, 0.0, 0.0).unwrap();
        HeightGrid::from_samples(spec, vec![value; width * height]).unwrap()
    }

    fn config(skip: u32) -> MeshConfig {
        MeshConfig::builder().skip(skip).build().unwrap()
    }

    #[test]
    fn test_four_by_four_topography() {
        let grid = uniform_grid(4, 4, 2000.0);
        let config = config(1);
        let builder = SolidMeshBuilder::new(&grid, &config, ScanWindow::full(grid.spec()));

        let mut triangles: Vec<Triangle> = Vec::new();
        let stats = builder.build(&mut triangles).unwrap();

        assert_eq!(stats.topography, 18);
        assert_eq!(stats.base, 18);
        assert_eq!(stats.parallel_skirts, 12);
        assert_eq!(stats.meridian_skirts, 12);
        assert_eq!(triangles.len() as u64, stats.total());

        let land_floor = config.padding + config.padding * config.land_offset;
        for t in &triangles[..18] {
            assert!(t.vertices.iter().all(|v| v.z >= land_floor));
            assert!(t.normal.z > 0.0);
        }
    }

    #[test]
    fn test_predicted_matches_emitted() {
        let grid = uniform_grid(23, 17, 50.0);
        for skip in 1..=25 {
            let config = config(skip);
            let builder = SolidMeshBuilder::new(&grid, &config, ScanWindow::full(grid.spec()));
            let mut triangles: Vec<Triangle> = Vec::new();
            let stats = builder.build(&mut triangles).unwrap();

            assert_eq!(stats, builder.predicted(), "skip {}", skip);
            assert_eq!(triangles.len() as u64, stats.total(), "skip {}", skip);
        }
    }

    #[test]
    fn test_skip_larger_than_window_is_empty() {
        let grid = uniform_grid(8, 8, 10.0);
        let config = config(9);
        let builder = SolidMeshBuilder::new(&grid, &config, ScanWindow::full(grid.spec()));

        let mut triangles: Vec<Triangle> = Vec::new();
        let stats = builder.build(&mut triangles).unwrap();
        assert_eq!(stats.total(), 0);
        assert_eq!(builder.triangle_count().unwrap(), 0);
        assert!(triangles.is_empty());
    }

    #[test]
    fn test_single_row_window_is_empty() {
        let grid = uniform_grid(8, 8, 10.0);
        let config = config(1);
        let window = ScanWindow {
            xa: 0,
            xb: 7,
            ya: 3,
            yb: 3,
        };
        let builder = SolidMeshBuilder::new(&grid, &config, window);
        assert_eq!(builder.predicted().total(), 0);

        let mut triangles: Vec<Triangle> = Vec::new();
        assert_eq!(builder.build(&mut triangles).unwrap().total(), 0);
    }

    #[test]
    fn test_inverted_window_emits_nothing() {
        let grid = uniform_grid(8, 8, 10.0);
        let config = config(1);
        let window = ScanWindow {
            xa: 5,
            xb: 2,
            ya: 0,
            yb: 7,
        };
        let builder = SolidMeshBuilder::new(&grid, &config, window);
        assert_eq!(builder.triangle_count().unwrap(), 0);

        let mut bytes = Vec::new();
        let stats = builder.write_stl(&mut bytes).unwrap();
        assert_eq!(stats.total(), 0);
        assert_eq!(bytes.len() as u64, crate::stl::stl_len(0));
    }

    #[test]
    fn test_part_orientation() {
        let grid = uniform_grid(5, 4, 300.0);
        let config = config(2);
        let builder = SolidMeshBuilder::new(&grid, &config, ScanWindow::full(grid.spec()));

        let mut triangles: Vec<Triangle> = Vec::new();
        let stats = builder.build(&mut triangles).unwrap();
        let (top, rest) = triangles.split_at(stats.topography as usize);
        let (parallel, rest) = rest.split_at(stats.parallel_skirts as usize);
        let (meridian, base) = rest.split_at(stats.meridian_skirts as usize);

        assert!(top.iter().all(|t| t.normal.z > 0.99));
        assert!(base.iter().all(|t| t.normal.z < -0.99));
        assert!(parallel.iter().all(|t| t.normal.y.abs() > 0.99));
        assert!(meridian.iter().all(|t| t.normal.x.abs() > 0.99));

        // North and south walls alternate per column step
        assert!(parallel[0].normal.y > 0.0 && parallel[2].normal.y < 0.0);
        assert!(meridian[0].normal.x < 0.0 && meridian[2].normal.x > 0.0);
    }

    #[test]
    fn test_write_stl_length() {
        let grid = uniform_grid(6, 5, 120.0);
        let config = config(2);
        let builder = SolidMeshBuilder::new(&grid, &config, ScanWindow::full(grid.spec()));

        let mut bytes = Vec::new();
        let stats = builder.write_stl(&mut bytes).unwrap();
        assert_eq!(bytes.len() as u64, crate::stl::stl_len(stats.total() as u32));
        assert_eq!(&bytes[80..84], &(stats.total() as u32).to_le_bytes());
    }
}
