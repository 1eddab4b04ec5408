//! Insulin prediction model.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A recommended insulin dose with its rationale.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct InsulinPrediction {
    /// Recommended dose in units (>= 0, one decimal)
    pub predicted_insulin: f64,
    /// Confidence in [0, 1], capped by the data-volume tier
    pub confidence: f64,
    /// Human readable explanation of each contribution, in order
    pub factors: Vec<String>,
    /// RFC 3339 timestamp
    pub timestamp: String,
}

/// A prediction persisted for a user.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StoredPrediction {
    pub id: String,
    pub user_id: String,
    #[serde(flatten)]
    pub prediction: InsulinPrediction,
}

impl StoredPrediction {
    pub fn new(user_id: impl Into<String>, prediction: InsulinPrediction) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.into(),
            prediction,
        }
    }
}
