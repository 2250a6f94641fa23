//! Mesh generation settings.
//!
//! [`MeshConfig`] is built once through [`MeshConfigBuilder`], validated, and
//! then shared read-only by every component of a conversion run.
//!
//! ```ignore
//! use dem2stl::{MeshConfig, OutOfRangePolicy};
//!
//! let config = MeshConfig::builder()
//!     .skip(20)
//!     .vertfact(5.0)
//!     .scale(2.0)
//!     .out_of_range(OutOfRangePolicy::Error)
//!     .build()?;
//! ```

use crate::error::{MeshError, Result};

/// Default downsampling stride.
pub const DEFAULT_SKIP: u32 = 10;

/// Default vertical exaggeration.
pub const DEFAULT_VERTFACT: f32 = 10.0;

/// Default scale divisor (nautical miles per centimeter at model center).
pub const DEFAULT_SCALE: f32 = 1.0;

/// Default base plate thickness in millimeters.
pub const DEFAULT_PADDING: f32 = 5.0;

/// What an elevation lookup does when handed an index outside the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutOfRangePolicy {
    /// Log a warning and read the nearest valid sample.
    #[default]
    Warn,
    /// Read the nearest valid sample without logging.
    Clamp,
    /// Fail the lookup with [`MeshError::IndexOutOfRange`].
    Error,
}

/// Settings for turning a grid into a printable solid.
#[derive(Debug, Clone, PartialEq)]
pub struct MeshConfig {
    /// Downsampling stride in grid cells (at least 1).
    pub skip: u32,
    /// Vertical exaggeration multiplier.
    pub vertfact: f32,
    /// Scale divisor applied to planar axes and height.
    pub scale: f32,
    /// Base plate thickness added to every Z value, in millimeters.
    pub padding: f32,
    /// Fraction of `padding` added on top for land samples.
    pub land_offset: f32,
    /// Samples above this many meters count as land.
    pub land_threshold: f32,
    /// Handling of out-of-range elevation lookups.
    pub out_of_range: OutOfRangePolicy,
}

impl Default for MeshConfig {
    fn default() -> Self {
        Self {
            skip: DEFAULT_SKIP,
            vertfact: DEFAULT_VERTFACT,
            scale: DEFAULT_SCALE,
            padding: DEFAULT_PADDING,
            land_offset: 0.1,
            land_threshold: 1.0,
            out_of_range: OutOfRangePolicy::Warn,
        }
    }
}

impl MeshConfig {
    /// Create a builder starting from the default settings.
    pub fn builder() -> MeshConfigBuilder {
        MeshConfigBuilder::default()
    }

    /// Stride as an index step.
    pub fn stride(&self) -> usize {
        self.skip as usize
    }

    /// Check every field for a usable value.
    pub fn validate(&self) -> Result<()> {
        if self.skip == 0 {
            return Err(MeshError::InvalidConfig(
                "skip must be at least 1".to_string(),
            ));
        }
        if !(self.scale.is_finite() && self.scale > 0.0) {
            return Err(MeshError::InvalidConfig(format!(
                "scale must be positive, got {}",
                self.scale
            )));
        }
        if !self.vertfact.is_finite() || self.vertfact < 0.0 {
            return Err(MeshError::InvalidConfig(format!(
                "vertical exaggeration must be non-negative, got {}",
                self.vertfact
            )));
        }
        if !(self.padding.is_finite() && self.padding > 0.0) {
            return Err(MeshError::InvalidConfig(format!(
                "padding must be positive, got {}",
                self.padding
            )));
        }
        if !self.land_offset.is_finite() || self.land_offset < 0.0 {
            return Err(MeshError::InvalidConfig(format!(
                "land offset must be non-negative, got {}",
                self.land_offset
            )));
        }
        if !self.land_threshold.is_finite() {
            return Err(MeshError::InvalidConfig(
                "land threshold must be finite".to_string(),
            ));
        }
        Ok(())
    }
}

/// Builder for [`MeshConfig`].
#[derive(Debug, Clone, Default)]
pub struct MeshConfigBuilder {
    config: MeshConfig,
}

impl MeshConfigBuilder {
    /// Set the downsampling stride.
    pub fn skip(mut self, skip: u32) -> Self {
        self.config.skip = skip;
        self
    }

    /// Set the vertical exaggeration.
    pub fn vertfact(mut self, vertfact: f32) -> Self {
        self.config.vertfact = vertfact;
        self
    }

    /// Set the scale divisor.
    pub fn scale(mut self, scale: f32) -> Self {
        self.config.scale = scale;
        self
    }

    /// Set the base plate thickness.
    pub fn padding(mut self, padding: f32) -> Self {
        self.config.padding = padding;
        self
    }

    /// Set the extra land padding, as a fraction of the base plate.
    pub fn land_offset(mut self, land_offset: f32) -> Self {
        self.config.land_offset = land_offset;
        self
    }

    /// Set the elevation above which a sample counts as land.
    pub fn land_threshold(mut self, land_threshold: f32) -> Self {
        self.config.land_threshold = land_threshold;
        self
    }

    /// Set the out-of-range lookup policy.
    pub fn out_of_range(mut self, policy: OutOfRangePolicy) -> Self {
        self.config.out_of_range = policy;
        self
    }

    /// Validate and return the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`MeshError::InvalidConfig`] naming the first bad field.
    pub fn build(self) -> Result<MeshConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}
