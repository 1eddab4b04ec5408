//! Predictor tuning constants.
//!
//! These are hardcoded clinical heuristics with no cited source. The defaults
//! reproduce the established behaviour and should only be changed together
//! with a clinician.

use serde::{Deserialize, Serialize};

use crate::config::ConfigError;

/// Confidence ceiling unlocked by a given volume of history.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct ConfidenceTier {
    pub min_health_points: usize,
    pub min_meals: usize,
    pub ceiling: f64,
}

/// Constants used by [`super::InsulinPredictor`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PredictorConfig {
    /// Glucose above which a correction dose is added (mg/dL)
    pub high_glucose_threshold: f64,
    /// Glucose below which the dose is reduced (mg/dL)
    pub low_glucose_threshold: f64,
    /// mg/dL above threshold per correction step
    pub correction_divisor: f64,
    /// Units added per correction step
    pub correction_units_per_step: f64,
    /// Units removed when glucose is low
    pub low_glucose_reduction: f64,
    /// Grams of carbohydrate covered by one unit
    pub carb_ratio: f64,
    /// Number of recent meals averaged for the carb term
    pub carb_average_meals: usize,
    pub high_activity_multiplier: f64,
    pub low_activity_multiplier: f64,
    /// Weight of the historical average dose when blending
    pub history_blend_weight: f64,

    /// Starting confidence with little history
    pub base_confidence: f64,
    /// Starting confidence once `established_points` readings exist
    pub established_confidence: f64,
    pub established_points: usize,
    /// Readings needed before activity adjusts the dose
    pub activity_min_points: usize,
    /// Readings needed before blending with the historical average
    pub history_min_points: usize,

    pub correction_bonus: f64,
    pub glucose_note_bonus: f64,
    pub carb_bonus: f64,
    pub activity_bonus: f64,
    pub history_bonus: f64,

    /// Ceilings; the highest tier whose minimums are met applies
    pub confidence_tiers: Vec<ConfidenceTier>,
}

impl Default for PredictorConfig {
    fn default() -> Self {
        Self {
            high_glucose_threshold: 180.0,
            low_glucose_threshold: 100.0,
            correction_divisor: 50.0,
            correction_units_per_step: 2.0,
            low_glucose_reduction: 1.0,
            carb_ratio: 15.0,
            carb_average_meals: 3,
            high_activity_multiplier: 0.85,
            low_activity_multiplier: 1.05,
            history_blend_weight: 0.3,

            base_confidence: 0.4,
            established_confidence: 0.6,
            established_points: 5,
            activity_min_points: 3,
            history_min_points: 7,

            correction_bonus: 0.1,
            glucose_note_bonus: 0.05,
            carb_bonus: 0.15,
            activity_bonus: 0.05,
            history_bonus: 0.1,

            confidence_tiers: vec![
                ConfidenceTier {
                    min_health_points: 0,
                    min_meals: 0,
                    ceiling: 0.5,
                },
                ConfidenceTier {
                    min_health_points: 5,
                    min_meals: 2,
                    ceiling: 0.7,
                },
                ConfidenceTier {
                    min_health_points: 10,
                    min_meals: 5,
                    ceiling: 0.85,
                },
            ],
        }
    }
}

impl PredictorConfig {
    /// Reject values that would make predictions meaningless.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |msg: &str| Err(ConfigError::Invalid(msg.to_string()));

        if !(self.carb_ratio > 0.0) {
            return invalid("carb_ratio must be positive");
        }
        if !(self.correction_divisor > 0.0) {
            return invalid("correction_divisor must be positive");
        }
        if self.low_glucose_threshold >= self.high_glucose_threshold {
            return invalid("low_glucose_threshold must be below high_glucose_threshold");
        }
        if !(0.0..=1.0).contains(&self.history_blend_weight) {
            return invalid("history_blend_weight must be within [0, 1]");
        }
        if !(self.high_activity_multiplier > 0.0 && self.low_activity_multiplier > 0.0) {
            return invalid("activity multipliers must be positive");
        }
        if self.carb_average_meals == 0 {
            return invalid("carb_average_meals must be at least 1");
        }
        if self.confidence_tiers.is_empty() {
            return invalid("at least one confidence tier is required");
        }
        if self
            .confidence_tiers
            .iter()
            .any(|t| !(0.0..=1.0).contains(&t.ceiling))
        {
            return invalid("confidence ceilings must be within [0, 1]");
        }
        Ok(())
    }

    /// Ceiling for the given volume of history.
    pub fn confidence_ceiling(&self, health_points: usize, meals: usize) -> f64 {
        self.confidence_tiers
            .iter()
            .filter(|t| health_points >= t.min_health_points && meals >= t.min_meals)
            .map(|t| t.ceiling)
            .fold(0.0, f64::max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert!(PredictorConfig::default().validate().is_ok());
    }

    #[test]
    fn test_confidence_ceiling_tiers() {
        let config = PredictorConfig::default();
        assert_eq!(config.confidence_ceiling(1, 0), 0.5);
        assert_eq!(config.confidence_ceiling(5, 1), 0.5);
        assert_eq!(config.confidence_ceiling(5, 2), 0.7);
        assert_eq!(config.confidence_ceiling(9, 10), 0.7);
        assert_eq!(config.confidence_ceiling(10, 5), 0.85);
    }

    #[test]
    fn test_invalid_values_rejected() {
        let config = PredictorConfig {
            carb_ratio: 0.0,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

        let config = PredictorConfig {
            history_blend_weight: 1.5,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = PredictorConfig {
            confidence_tiers: vec![],
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: PredictorConfig = serde_json::from_str(r#"{"carb_ratio": 10.0}"#).unwrap();
        assert_eq!(config.carb_ratio, 10.0);
        assert_eq!(config.correction_divisor, 50.0);
        assert_eq!(config.confidence_tiers.len(), 3);
    }
}
