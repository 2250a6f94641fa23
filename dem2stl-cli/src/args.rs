use anyhow::{Context, Result};
use clap::Args;
use dem2stl::config::{DEFAULT_PADDING, DEFAULT_SCALE, DEFAULT_SKIP, DEFAULT_VERTFACT};
use dem2stl::{GeoBounds, GridSpec, MeshConfig, OutOfRangePolicy};

/// Grid geometry; defaults describe the Hong Kong survey raster
#[derive(Args, Debug, Clone, Default)]
pub struct GridArgs {
    /// Number of columns in the grid
    #[arg(long)]
    pub width: Option<usize>,

    /// Number of rows in the grid
    #[arg(long)]
    pub height: Option<usize>,

    /// Cell size in degrees
    #[arg(long)]
    pub cell_size: Option<f64>,

    /// Longitude of the western edge
    #[arg(long, allow_negative_numbers = true)]
    pub origin_lon: Option<f64>,

    /// Latitude of the first (northern) row
    #[arg(long, allow_negative_numbers = true)]
    pub origin_lat: Option<f64>,

    /// Latitude for the scale correction (default: grid mid latitude)
    #[arg(long, allow_negative_numbers = true)]
    pub central_parallel: Option<f64>,
}

impl GridArgs {
    pub fn spec(&self) -> Result<GridSpec> {
        let preset = GridSpec::hong_kong();
        let overridden = self.width.is_some()
            || self.height.is_some()
            || self.cell_size.is_some()
            || self.origin_lon.is_some()
            || self.origin_lat.is_some();

        let spec = if overridden {
            GridSpec::new(
                self.width.unwrap_or(preset.width),
                self.height.unwrap_or(preset.height),
                self.cell_size.unwrap_or(preset.cell_size),
                self.origin_lon.unwrap_or(preset.origin_lon),
                self.origin_lat.unwrap_or(preset.origin_lat),
            )
            .context("Invalid grid geometry")?
        } else {
            preset
        };

        match self.central_parallel {
            Some(lat) => spec
                .with_central_parallel(lat)
                .validated()
                .context("Invalid central parallel"),
            None => Ok(spec),
        }
    }
}

/// Mesh settings
#[derive(Args, Debug, Clone)]
pub struct MeshArgs {
    /// Downsampling stride in grid cells
    #[arg(short, long, default_value_t = DEFAULT_SKIP)]
    pub skip: u32,

    /// Vertical exaggeration
    #[arg(short, long, default_value_t = DEFAULT_VERTFACT)]
    pub vertfact: f32,

    /// Scale at model center, in nautical miles per centimeter
    #[arg(long, default_value_t = DEFAULT_SCALE)]
    pub scale: f32,

    /// Base plate thickness in millimeters
    #[arg(long, default_value_t = DEFAULT_PADDING)]
    pub padding: f32,
}

impl MeshArgs {
    pub fn config(&self, strict: bool) -> Result<MeshConfig> {
        let policy = if strict {
            OutOfRangePolicy::Error
        } else {
            OutOfRangePolicy::Warn
        };
        MeshConfig::builder()
            .skip(self.skip)
            .vertfact(self.vertfact)
            .scale(self.scale)
            .padding(self.padding)
            .out_of_range(policy)
            .build()
            .context("Invalid mesh settings")
    }
}

/// Geographic window; all four or none (default: whole grid)
#[derive(Args, Debug, Clone, Default)]
pub struct BoundsArgs {
    /// Northern boundary latitude
    #[arg(long, allow_negative_numbers = true, requires_all = ["south", "east", "west"])]
    pub north: Option<f64>,

    /// Southern boundary latitude
    #[arg(long, allow_negative_numbers = true, requires_all = ["north", "east", "west"])]
    pub south: Option<f64>,

    /// Eastern boundary longitude
    #[arg(long, allow_negative_numbers = true, requires_all = ["north", "south", "west"])]
    pub east: Option<f64>,

    /// Western boundary longitude
    #[arg(long, allow_negative_numbers = true, requires_all = ["north", "south", "east"])]
    pub west: Option<f64>,
}

impl BoundsArgs {
    /// Requested bounds, or the grid's full extent when none were given.
    pub fn resolve(&self, spec: &GridSpec) -> Result<GeoBounds> {
        match (self.north, self.south, self.east, self.west) {
            (Some(north), Some(south), Some(east), Some(west)) => {
                GeoBounds::new(north, south, east, west).context(
                    "Bounds must satisfy north > south and east > west (order: N S E W)",
                )
            }
            _ => Ok(spec.full_extent()),
        }
    }
}
