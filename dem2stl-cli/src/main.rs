use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod args;
mod commands;

use args::{BoundsArgs, GridArgs, MeshArgs};

/// Convert DEM grids into watertight STL solids for 3D printing
#[derive(Parser)]
#[command(name = "dem2stl")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert a raw grid into a binary STL solid
    Convert {
        /// Raw big-endian float grid
        #[arg(short, long, env = "DEM2STL_INPUT", default_value = "dem")]
        input: PathBuf,

        /// Output STL file
        #[arg(short, long, env = "DEM2STL_OUTPUT", default_value = "dem.stl")]
        output: PathBuf,

        #[command(flatten)]
        grid: GridArgs,

        #[command(flatten)]
        mesh: MeshArgs,

        #[command(flatten)]
        bounds: BoundsArgs,

        /// Fail on elevation lookups outside the grid instead of clamping
        #[arg(long)]
        strict: bool,

        /// Output the summary as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Show the scan window, model size and triangle count without meshing
    Plan {
        #[command(flatten)]
        grid: GridArgs,

        #[command(flatten)]
        mesh: MeshArgs,

        #[command(flatten)]
        bounds: BoundsArgs,

        /// Output result as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Display information about a binary STL file
    Inspect {
        /// Path to the .stl file
        file: PathBuf,

        /// Output result as JSON
        #[arg(short, long)]
        json: bool,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "dem2stl=info,dem2stl_cli=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Convert {
            input,
            output,
            grid,
            mesh,
            bounds,
            strict,
            json,
        } => commands::convert::run(input, output, grid, mesh, bounds, strict, json),
        Commands::Plan {
            grid,
            mesh,
            bounds,
            json,
        } => commands::plan::run(grid, mesh, bounds, json),
        Commands::Inspect { file, json } => commands::inspect::run(file, json),
    }
}
