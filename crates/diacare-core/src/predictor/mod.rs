//! Insulin dose heuristic.
//!
//! The estimate is built in a fixed order: glucose correction, carbohydrate
//! dose, activity scaling, history blending. Confidence accumulates bonuses
//! along the way and is finally capped by a ceiling that depends on how much
//! history exists. Every contribution is recorded as a human-readable factor.
//!
//! This is an informational estimate, not medical advice.

pub mod config;

pub use config::*;

use chrono::Utc;
use thiserror::Error;

use crate::models::{ActivityLevel, HealthDataPoint, InsulinPrediction, MealLogEntry};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum PredictorError {
    #[error("Insufficient data: log at least one health entry first")]
    InsufficientData,
}

pub type PredictorResult<T> = Result<T, PredictorError>;

/// Produces [`InsulinPrediction`]s from recent history.
#[derive(Debug, Clone, Default)]
pub struct InsulinPredictor {
    config: PredictorConfig,
}

impl InsulinPredictor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: PredictorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PredictorConfig {
        &self.config
    }

    /// Estimate a dose.
    ///
    /// Both slices are ordered most recent first. The first health point is
    /// the current reading.
    pub fn predict(
        &self,
        health: &[HealthDataPoint],
        meals: &[MealLogEntry],
    ) -> PredictorResult<InsulinPrediction> {
        let latest = health.first().ok_or(PredictorError::InsufficientData)?;
        let c = &self.config;
        let points = health.len();
        let established = points >= c.established_points;

        let mut total = 0.0_f64;
        let mut confidence = if established {
            c.established_confidence
        } else {
            c.base_confidence
        };
        let mut factors = Vec::new();

        // Glucose correction
        let glucose = latest.glucose;
        if glucose > c.high_glucose_threshold {
            let correction = (glucose - c.high_glucose_threshold) / c.correction_divisor
                * c.correction_units_per_step;
            total += correction;
            factors.push(format!(
                "High glucose ({:.0} mg/dL): +{:.1} units correction",
                glucose, correction
            ));
            if established {
                confidence += c.correction_bonus;
            }
        } else if glucose < c.low_glucose_threshold {
            total = (total - c.low_glucose_reduction).max(0.0);
            factors.push(format!(
                "Low glucose ({:.0} mg/dL): dose reduced by {:.1} units to avoid hypoglycemia",
                glucose, c.low_glucose_reduction
            ));
            if established {
                confidence += c.glucose_note_bonus;
            }
        } else {
            factors.push(format!(
                "Glucose in target range ({:.0} mg/dL): no correction needed",
                glucose
            ));
            if established {
                confidence += c.glucose_note_bonus;
            }
        }

        // Carbohydrate dose
        let considered = &meals[..meals.len().min(c.carb_average_meals)];
        if considered.is_empty() {
            factors.push("No recent meals logged: carbohydrate dose not included".to_string());
        } else {
            let avg_carbs =
                considered.iter().map(|m| m.carbs).sum::<f64>() / considered.len() as f64;
            let carb_dose = avg_carbs / c.carb_ratio;
            total += carb_dose;
            factors.push(format!(
                "Average carbs over last {} meal(s): {:.0}g, +{:.1} units (1 unit per {:.0}g)",
                considered.len(),
                avg_carbs,
                carb_dose,
                c.carb_ratio
            ));
            if considered.len() >= c.carb_average_meals {
                confidence += c.carb_bonus;
            }
        }

        // Activity
        if points >= c.activity_min_points {
            match latest.activity_level {
                ActivityLevel::High => {
                    total *= c.high_activity_multiplier;
                    factors.push(format!(
                        "High activity: dose reduced by {:.0}%",
                        (1.0 - c.high_activity_multiplier) * 100.0
                    ));
                    confidence += c.activity_bonus;
                }
                ActivityLevel::Low => {
                    total *= c.low_activity_multiplier;
                    factors.push(format!(
                        "Low activity: dose increased by {:.0}%",
                        (c.low_activity_multiplier - 1.0) * 100.0
                    ));
                    confidence += c.activity_bonus;
                }
                ActivityLevel::Moderate => {}
            }
        }

        // History blend. Readings without a dose count as unrecorded, not as zero.
        let doses: Vec<f64> = health.iter().filter_map(|p| p.insulin).collect();
        let avg_dose = if doses.is_empty() {
            0.0
        } else {
            doses.iter().sum::<f64>() / doses.len() as f64
        };
        if avg_dose > 0.0 && points >= c.history_min_points {
            let w = c.history_blend_weight;
            total = total * (1.0 - w) + avg_dose * w;
            factors.push(format!(
                "Blended with your average dose of {:.1} units ({:.0}% weight)",
                avg_dose,
                w * 100.0
            ));
            confidence += c.history_bonus;
        }

        let predicted_insulin = round1(total.max(0.0));
        let ceiling = c.confidence_ceiling(points, meals.len());
        let confidence = round2(confidence.min(ceiling).clamp(0.0, 1.0));

        tracing::debug!(
            health_points = points,
            meals = meals.len(),
            predicted_insulin,
            confidence,
            "Insulin prediction computed"
        );

        Ok(InsulinPrediction {
            predicted_insulin,
            confidence,
            factors,
            timestamp: Utc::now().to_rfc3339(),
        })
    }
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
