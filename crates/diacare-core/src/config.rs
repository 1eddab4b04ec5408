//! Engine configuration.
//!
//! Everything has a default, so an empty JSON object is a valid config and
//! partial files only override what they name.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::document::DocumentConfig;
use crate::predictor::PredictorConfig;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed config: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid config: {0}")]
    Invalid(String),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// How much stored history feeds a prediction.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct HistoryWindow {
    /// Most recent health readings fetched
    pub health_points: usize,
    /// Most recent meals fetched
    pub meals: usize,
}

impl Default for HistoryWindow {
    fn default() -> Self {
        Self {
            health_points: 10,
            meals: 5,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct EngineConfig {
    pub predictor: PredictorConfig,
    pub history: HistoryWindow,
    pub documents: DocumentConfig,
}

impl EngineConfig {
    pub fn from_json_str(json: &str) -> ConfigResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_path(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json_str(&contents)
    }

    pub fn validate(&self) -> ConfigResult<()> {
        self.predictor.validate()?;
        if self.history.health_points == 0 || self.history.meals == 0 {
            return Err(ConfigError::Invalid(
                "history windows must be at least 1".to_string(),
            ));
        }
        self.documents
            .validate()
            .map_err(|e| ConfigError::Invalid(e.to_string()))
    }

    pub fn to_json(&self) -> ConfigResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
