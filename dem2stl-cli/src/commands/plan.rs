use anyhow::Result;
use dem2stl::projection::window_footprint;
use dem2stl::stl::stl_len;
use dem2stl::{MeshStats, ScanWindow};
use serde::Serialize;

use crate::args::{BoundsArgs, GridArgs, MeshArgs};

/// Build volume of the printer the tool was first used with (uPrint SE).
const PRINT_BED_MM: (f64, f64) = (203.0, 152.0);

#[derive(Serialize)]
struct PlanResponse {
    xa: usize,
    xb: usize,
    ya: usize,
    yb: usize,
    width_mm: f64,
    depth_mm: f64,
    triangles: u64,
    file_size: u64,
    fits_bed: bool,
}

pub fn run(grid: GridArgs, mesh: MeshArgs, bounds: BoundsArgs, json: bool) -> Result<()> {
    let spec = grid.spec()?;
    let bounds = bounds.resolve(&spec)?;
    let config = mesh.config(false)?;

    let window = ScanWindow::resolve(&bounds, &spec);
    let stats = MeshStats::predict(&window, config.stride());
    let (width_mm, depth_mm) = window_footprint(&spec, &config, &window);
    let fits_bed = width_mm <= PRINT_BED_MM.0 && depth_mm <= PRINT_BED_MM.1;
    let file_size = u32::try_from(stats.total())
        .map(stl_len)
        .unwrap_or(u64::MAX);

    if json {
        let response = PlanResponse {
            xa: window.xa,
            xb: window.xb,
            ya: window.ya,
            yb: window.yb,
            width_mm,
            depth_mm,
            triangles: stats.total(),
            file_size,
            fits_bed,
        };
        println!("{}", serde_json::to_string(&response)?);
        return Ok(());
    }

    println!(
        "Boundary cell numbers (x: {}, {}; y: {}, {})",
        window.xa, window.xb, window.ya, window.yb
    );
    println!(
        "Estimated size of the model: {:.0} mm x {:.0} mm",
        width_mm.ceil(),
        depth_mm.ceil()
    );
    println!();
    println!("Topography triangles: {}", stats.topography);
    println!(
        "Skirt triangles: {}",
        stats.parallel_skirts + stats.meridian_skirts
    );
    println!("Base triangles: {}", stats.base);
    println!("Expected total triangles: {}", stats.total());
    println!("Expected file size: {}", format_size(file_size));

    if window.is_empty() {
        println!();
        println!("Window is empty at this stride; the STL would hold no triangles.");
    } else if !fits_bed {
        println!();
        println!(
            "Larger than a {:.0} mm x {:.0} mm print bed; raise --scale.",
            PRINT_BED_MM.0, PRINT_BED_MM.1
        );
    }

    Ok(())
}

fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.2} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.2} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.2} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} bytes", bytes)
    }
}
