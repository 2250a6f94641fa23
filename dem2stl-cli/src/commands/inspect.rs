use anyhow::{Context, Result};
use dem2stl::read_stl;
use dem2stl::stl::stl_len;
use serde::Serialize;
use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;

#[derive(Serialize)]
struct InspectResponse {
    path: String,
    header: String,
    triangles: u32,
    file_size: u64,
    min: [f32; 3],
    max: [f32; 3],
    upward_facets: u64,
    downward_facets: u64,
    vertical_facets: u64,
}

pub fn run(file: PathBuf, json: bool) -> Result<()> {
    let handle =
        File::open(&file).with_context(|| format!("Failed to open {}", file.display()))?;
    let file_size = handle.metadata()?.len();

    let (mut up, mut down, mut vertical) = (0u64, 0u64, 0u64);
    let summary = read_stl(BufReader::new(handle), |t| {
        if t.normal.z > 1e-6 {
            up += 1;
        } else if t.normal.z < -1e-6 {
            down += 1;
        } else {
            vertical += 1;
        }
    })
    .with_context(|| format!("Failed to read STL {}", file.display()))?;

    if json {
        let response = InspectResponse {
            path: file.display().to_string(),
            header: summary.header,
            triangles: summary.triangle_count,
            file_size,
            min: [summary.min.x, summary.min.y, summary.min.z],
            max: [summary.max.x, summary.max.y, summary.max.z],
            upward_facets: up,
            downward_facets: down,
            vertical_facets: vertical,
        };
        println!("{}", serde_json::to_string(&response)?);
        return Ok(());
    }

    let size = summary.size();
    println!("File: {}", file.display());
    println!("Header: {}", summary.header);
    println!();
    println!("Triangles: {}", summary.triangle_count);
    println!(
        "File size: {} bytes (expected {})",
        file_size,
        stl_len(summary.triangle_count)
    );
    println!(
        "Bounding box: {:.1} mm x {:.1} mm x {:.1} mm",
        size.x, size.y, size.z
    );
    println!(
        "  X: {:.2} .. {:.2}",
        summary.min.x, summary.max.x
    );
    println!(
        "  Y: {:.2} .. {:.2}",
        summary.min.y, summary.max.y
    );
    println!(
        "  Z: {:.2} .. {:.2}",
        summary.min.z, summary.max.z
    );
    println!();
    println!("Upward facets: {}", up);
    println!("Downward facets: {}", down);
    println!("Vertical facets: {}", vertical);

    Ok(())
}
