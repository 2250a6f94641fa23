//! Generate a synthetic island and print it as an STL solid.
//!
//! Run with: cargo run --example island -- island.stl

use std::env;
use std::fs::File;
use std::io::BufWriter;

use dem2stl::{GridSpec, HeightGrid, MeshConfig, MeshError, ScanWindow, SolidMeshBuilder, NO_DATA};

fn main() -> Result<(), MeshError> {
    let output = env::args().nth(1).unwrap_or_else(|| {
        eprintln!("Usage: cargo run --example island -- /path/to/output.stl");
        std::process::exit(1);
    });

    // 200 × 150 cells of one arc-second around 22°N
    let (width, height) = (200, 150);
    let spec = GridSpec::new(width, height, 1.0 / 3600.0, 114.0, 22.3)?;

    let samples = (0..height)
        .flat_map(|y| {
            (0..width).map(move |x| {
                let dx = (x as f32 - 100.0) / 60.0;
                let dy = (y as f32 - 75.0) / 45.0;
                let r2 = dx * dx + dy * dy;
                if x < 4 && y < 4 {
                    NO_DATA
                } else {
                    900.0 * (1.0 - r2) - 50.0
                }
            })
        })
        .collect();
    let grid = HeightGrid::from_samples(spec, samples)?;

    let config = MeshConfig::builder().skip(2).vertfact(3.0).build()?;
    let builder = SolidMeshBuilder::new(&grid, &config, ScanWindow::full(grid.spec()));

    let (w, d) = builder.projector().model_extent(builder.window());
    println!("Model footprint: {:.1} mm x {:.1} mm", w, d);

    let stats = builder.write_stl(BufWriter::new(File::create(&output)?))?;
    println!("Topography triangles: {}", stats.topography);
    println!(
        "Skirt triangles: {}",
        stats.parallel_skirts + stats.meridian_skirts
    );
    println!("Base triangles: {}", stats.base);
    println!("Written to {}", output);

    Ok(())
}
