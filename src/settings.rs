//! Engine settings
//!
//! World extent, grid spacing and per-cell history depth. Loaded from JSON
//! by the game shell; every field falls back to its default when missing.

use serde::{Deserialize, Serialize};

use crate::consts::{DEFAULT_CONTAINER_CAPACITY, DEFAULT_TIME_SLICE};
use crate::error::{Result, SimError};

/// Grid and history configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineSettings {
    /// World size `(w, h)`; cells cover `[0, w) x [0, h)`
    pub world_extent: (u32, u32),
    /// Cell size `(dx, dy)` in world units
    pub cell_interval: (u32, u32),
    /// History slots kept per cell
    pub container_capacity: usize,
    /// World time covered by one history slot.
    /// Smaller slices rewind more precisely but cost more slots for the same span.
    pub time_slice: f64,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            world_extent: (640, 480),
            cell_interval: (2, 2),
            container_capacity: DEFAULT_CONTAINER_CAPACITY,
            time_slice: DEFAULT_TIME_SLICE,
        }
    }
}

impl EngineSettings {
    /// Settings for a world and grid, default history depth
    pub fn for_world(world_extent: (u32, u32), cell_interval: (u32, u32)) -> Self {
        Self {
            world_extent,
            cell_interval,
            ..Default::default()
        }
    }

    /// Parse and validate settings JSON
    pub fn from_json(json: &str) -> Result<Self> {
        let settings: Self = serde_json::from_str(json)?;
        settings.validate()?;
        log::info!(
            "Loaded engine settings: world {:?}, cells {:?}",
            settings.world_extent,
            settings.cell_interval
        );
        Ok(settings)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<()> {
        let (w, h) = self.world_extent;
        let (dx, dy) = self.cell_interval;
        if w == 0 || h == 0 {
            return Err(SimError::InvalidSettings(format!(
                "world extent must be non-zero, got {w}x{h}"
            )));
        }
        if dx == 0 || dy == 0 {
            return Err(SimError::InvalidSettings(format!(
                "cell interval must be non-zero, got {dx}x{dy}"
            )));
        }
        if self.container_capacity == 0 {
            return Err(SimError::InvalidSettings(
                "container capacity must be at least 1".into(),
            ));
        }
        if !(self.time_slice.is_finite() && self.time_slice > 0.0) {
            return Err(SimError::InvalidSettings(format!(
                "time slice must be positive and finite, got {}",
                self.time_slice
            )));
        }
        Ok(())
    }

    /// Number of cells the grid pre-allocates
    pub fn cell_count(&self) -> usize {
        let (w, h) = self.world_extent;
        let (dx, dy) = self.cell_interval;
        w.div_ceil(dx) as usize * h.div_ceil(dy) as usize
    }
}
