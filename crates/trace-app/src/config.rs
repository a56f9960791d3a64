//! Application configuration.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;
use trace_core::layout::DEFAULT_CELL_SIZE;
use trace_core::{ConfigError, RoundConfig};

/// Errors raised by the application shell.
#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("Failed to read {path}: {message}")]
    Io { path: String, message: String },
    #[error("Invalid cell size: {0}")]
    InvalidCellSize(f64),
}

/// Settings for a game session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AppConfig {
    pub title: String,
    pub round: RoundConfig,
    /// Board cell edge length in pixels.
    pub cell_size: f64,
    /// Seed for target placement. Random when absent.
    pub seed: Option<u64>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            title: "Trace".to_string(),
            round: RoundConfig::default(),
            cell_size: DEFAULT_CELL_SIZE,
            seed: None,
        }
    }
}

impl AppConfig {
    /// Parse and validate a configuration. Missing fields take defaults.
    pub fn from_json(json: &str) -> Result<Self, AppError> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load a configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, AppError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| AppError::Io {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        Self::from_json(&json)
    }

    pub fn validate(&self) -> Result<(), AppError> {
        self.round.validate()?;
        if !self.cell_size.is_finite() || self.cell_size <= 0.0 {
            return Err(AppError::InvalidCellSize(self.cell_size));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_partial_json_uses_defaults() {
        let config = AppConfig::from_json(r#"{"round":{"gridSize":4,"targetCount":5}}"#).unwrap();
        assert_eq!(config.round, RoundConfig::new(4, 5));
        assert_eq!(config.title, "Trace");
        assert_eq!(config.seed, None);
        assert!((config.cell_size - DEFAULT_CELL_SIZE).abs() < f64::EPSILON);
    }

    #[test]
    fn test_rejects_bad_round() {
        let err = AppConfig::from_json(r#"{"round":{"gridSize":2,"targetCount":5}}"#).unwrap_err();
        assert!(matches!(
            err,
            AppError::Config(ConfigError::CapacityExceeded { count: 5, capacity: 4 })
        ));
    }

    #[test]
    fn test_rejects_bad_cell_size() {
        let err = AppConfig::from_json(r#"{"cellSize":0}"#).unwrap_err();
        assert!(matches!(err, AppError::InvalidCellSize(_)));
    }

    #[test]
    fn test_rejects_malformed_json() {
        let err = AppConfig::from_json("{").unwrap_err();
        assert!(matches!(err, AppError::Config(ConfigError::Parse(_))));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"title":"Practice","seed":7}}"#).unwrap();

        let config = AppConfig::load(file.path()).unwrap();
        assert_eq!(config.title, "Practice");
        assert_eq!(config.seed, Some(7));
        assert_eq!(config.round, RoundConfig::default());
    }

    #[test]
    fn test_load_missing_file() {
        let err = AppConfig::load("/definitely/not/here.json").unwrap_err();
        assert!(matches!(err, AppError::Io { .. }));
    }
}
