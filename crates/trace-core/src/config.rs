//! Round configuration and validation.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default grid side length (matches the preselected start-screen option).
pub const DEFAULT_GRID_SIZE: u32 = 6;
/// Default number of targets per round.
pub const DEFAULT_TARGET_COUNT: u32 = 8;
/// Largest supported grid side length.
pub const MAX_GRID_SIZE: u32 = 64;

/// Errors raised while validating a round setup.
///
/// These are always surfaced before any round state is touched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("Grid size must be at least 1")]
    EmptyGrid,
    #[error("Grid size {size} exceeds the maximum of {max}")]
    GridTooLarge { size: u32, max: u32 },
    #[error("Target count must be at least 1")]
    NoTargets,
    #[error("Cannot place {count} targets on a grid with {capacity} cells")]
    CapacityExceeded { count: u32, capacity: u64 },
    #[error("Invalid target layout: {0}")]
    InvalidLayout(String),
    #[error("Failed to parse configuration: {0}")]
    Parse(String),
}

/// Setup parameters for a single round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoundConfig {
    /// Number of cells per grid side.
    pub grid_size: u32,
    /// Number of numbered targets to place.
    pub target_count: u32,
}

impl Default for RoundConfig {
    fn default() -> Self {
        Self {
            grid_size: DEFAULT_GRID_SIZE,
            target_count: DEFAULT_TARGET_COUNT,
        }
    }
}

impl RoundConfig {
    /// Create a new round configuration.
    pub fn new(grid_size: u32, target_count: u32) -> Self {
        Self {
            grid_size,
            target_count,
        }
    }

    /// Total number of cells on the grid.
    pub fn capacity(&self) -> u64 {
        u64::from(self.grid_size) * u64::from(self.grid_size)
    }

    /// Check that the targets fit on the grid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.grid_size == 0 {
            return Err(ConfigError::EmptyGrid);
        }
        if self.grid_size > MAX_GRID_SIZE {
            return Err(ConfigError::GridTooLarge {
                size: self.grid_size,
                max: MAX_GRID_SIZE,
            });
        }
        if self.target_count == 0 {
            return Err(ConfigError::NoTargets);
        }
        if u64::from(self.target_count) > self.capacity() {
            return Err(ConfigError::CapacityExceeded {
                count: self.target_count,
                capacity: self.capacity(),
            });
        }
        Ok(())
    }

    /// Parse and validate a configuration from JSON.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }
}
