use anyhow::{Context, Result};
use dem2stl::stl::DEFAULT_HEADER;
use dem2stl::{HeightGrid, ScanWindow, SolidMeshBuilder, StlWriter, Triangle, TriangleSink};
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;

use crate::args::{BoundsArgs, GridArgs, MeshArgs};

#[derive(Serialize)]
struct ConvertResponse {
    output: String,
    window: [usize; 4],
    width_mm: f32,
    depth_mm: f32,
    triangles: u64,
    topography: u64,
    skirts: u64,
    base: u64,
}

/// Forwards triangles and ticks the progress bar.
struct ProgressSink<'a, S: TriangleSink> {
    inner: &'a mut S,
    bar: &'a ProgressBar,
}

impl<S: TriangleSink> TriangleSink for ProgressSink<'_, S> {
    fn push(&mut self, triangle: &Triangle) -> dem2stl::Result<()> {
        self.inner.push(triangle)?;
        self.bar.inc(1);
        Ok(())
    }
}

pub fn run(
    input: PathBuf,
    output: PathBuf,
    grid: GridArgs,
    mesh: MeshArgs,
    bounds: BoundsArgs,
    strict: bool,
    json: bool,
) -> Result<()> {
    // Everything that can be rejected up front, before touching any file
    let spec = grid.spec()?;
    let bounds = bounds.resolve(&spec)?;
    let config = mesh.config(strict)?;

    tracing::info!(
        skip = config.skip,
        vertfact = config.vertfact,
        scale = config.scale,
        "mesh settings"
    );

    let grid = HeightGrid::from_file(&input, spec)
        .with_context(|| format!("Failed to load grid from {}", input.display()))?;

    let window = ScanWindow::resolve(&bounds, grid.spec());
    let builder = SolidMeshBuilder::new(&grid, &config, window);
    let count = builder.triangle_count()?;
    let (width_mm, depth_mm) = builder.projector().model_extent(&window);

    tracing::info!(
        xa = window.xa,
        xb = window.xb,
        ya = window.ya,
        yb = window.yb,
        "boundary cells"
    );
    tracing::info!(
        "Estimated size of the model: {:.0} mm x {:.0} mm, {} triangles",
        width_mm.ceil(),
        depth_mm.ceil(),
        count
    );

    let file = File::create(&output)
        .with_context(|| format!("Failed to create output file {}", output.display()))?;
    let mut stl = StlWriter::new(BufWriter::new(file), DEFAULT_HEADER, count)
        .context("Failed to write STL header")?;

    let pb = if json {
        ProgressBar::hidden()
    } else {
        ProgressBar::new(u64::from(count))
    };
    pb.set_style(
        ProgressStyle::default_bar()
            .template(
                "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta})",
            )?
            .progress_chars("#>-"),
    );

    let stats = builder
        .build(&mut ProgressSink {
            inner: &mut stl,
            bar: &pb,
        })
        .context("Failed to generate mesh")?;
    stl.finish().context("Failed to finish STL output")?;
    pb.finish_with_message("done");

    if json {
        let response = ConvertResponse {
            output: output.display().to_string(),
            window: [window.xa, window.xb, window.ya, window.yb],
            width_mm,
            depth_mm,
            triangles: stats.total(),
            topography: stats.topography,
            skirts: stats.parallel_skirts + stats.meridian_skirts,
            base: stats.base,
        };
        println!("{}", serde_json::to_string(&response)?);
    } else {
        println!("Triangles: {}", stats.total());
        println!("Output written to: {}", output.display());
    }

    Ok(())
}
