use crate::error::{Result, SolverError};
use crate::grid::{Grid2, INV_CELL_SIZE};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Upper bound applied to every incoming timestep.
pub const MAX_TIMESTEP: f32 = 0.05;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverConfig {
    pub width: usize,
    pub height: usize,
    pub viscosity: f32,
    pub max_dt: f32,
    pub diffusion_iterations: usize,
    pub pressure_iterations: usize,
    pub interaction: InteractionConfig,
    pub backend: BackendConfig,
}

/// Tuning for pointer-driven forces. Radii are squared distances in cells.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InteractionConfig {
    /// Half-size of the window scanned around the pointer cell.
    pub reach: i32,
    pub pixels_per_cell: f32,
    pub min_pointer_delta: f32,
    pub drag_radius_sq: f32,
    pub drag_inner_fraction: f32,
    pub drag_mid_fraction: f32,
    pub drag_inner_strength: f32,
    pub drag_mid_strength: f32,
    pub drag_outer_strength: f32,
    pub burst_radius_sq: f32,
    pub burst_ring_fraction: f32,
    pub burst_strength: f32,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    /// Dedicated worker count; `None` shares rayon's global pool.
    pub threads: Option<usize>,
    /// Cell count below which stages run serially.
    pub parallel_threshold: Option<usize>,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            width: 512,
            height: 512,
            viscosity: 1.0,
            max_dt: MAX_TIMESTEP,
            diffusion_iterations: 8,
            pressure_iterations: 8,
            interaction: InteractionConfig::default(),
            backend: BackendConfig::default(),
        }
    }
}

impl Default for InteractionConfig {
    fn default() -> Self {
        let radius_sq = INV_CELL_SIZE * INV_CELL_SIZE;
        Self {
            reach: 100,
            pixels_per_cell: 1.0,
            min_pointer_delta: 1e-4,
            drag_radius_sq: radius_sq * 0.75,
            drag_inner_fraction: 0.2,
            drag_mid_fraction: 0.5,
            drag_inner_strength: 10.0,
            drag_mid_strength: 5.0,
            drag_outer_strength: 1.0,
            burst_radius_sq: radius_sq,
            burst_ring_fraction: 0.5,
            burst_strength: 10.0,
        }
    }
}

impl SolverConfig {
    pub fn with_size(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            ..Self::default()
        }
    }

    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let yaml = std::fs::read_to_string(path).map_err(|source| SolverError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_yaml_str(&yaml)?;
        log::info!(
            "loaded solver config from {}: {}x{}",
            path.display(),
            config.width,
            config.height
        );
        Ok(config)
    }

    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    pub fn grid(&self) -> Grid2 {
        Grid2::new(self.width, self.height)
    }

    pub fn validate(&self) -> Result<()> {
        if self.width < 3 || self.height < 3 {
            return Err(SolverError::InvalidGrid {
                width: self.width,
                height: self.height,
            });
        }
        if !(self.viscosity > 0.0) {
            return Err(SolverError::invalid("viscosity", "must be > 0"));
        }
        if !(self.max_dt > 0.0) {
            return Err(SolverError::invalid("max_dt", "must be > 0"));
        }
        if self.diffusion_iterations == 0 {
            return Err(SolverError::invalid("diffusion_iterations", "must be >= 1"));
        }
        if self.pressure_iterations == 0 {
            return Err(SolverError::invalid("pressure_iterations", "must be >= 1"));
        }
        if self.backend.threads == Some(0) {
            return Err(SolverError::invalid("backend.threads", "must be >= 1"));
        }
        self.interaction.validate()
    }
}

impl InteractionConfig {
    pub fn validate(&self) -> Result<()> {
        if self.reach < 0 {
            return Err(SolverError::invalid("interaction.reach", "must be >= 0"));
        }
        if !(self.pixels_per_cell > 0.0) {
            return Err(SolverError::invalid(
                "interaction.pixels_per_cell",
                "must be > 0",
            ));
        }
        if !(self.drag_inner_fraction <= self.drag_mid_fraction) {
            return Err(SolverError::invalid(
                "interaction.drag_inner_fraction",
                format!(
                    "{} exceeds drag_mid_fraction {}",
                    self.drag_inner_fraction, self.drag_mid_fraction
                ),
            ));
        }
        Ok(())
    }
}
