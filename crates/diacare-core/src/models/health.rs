//! Health history models consumed by the predictor.

use serde::{Deserialize, Serialize};

/// Physical activity reported with a health entry.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ActivityLevel {
    Low,
    #[default]
    Moderate,
    High,
}

impl ActivityLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActivityLevel::Low => "low",
            ActivityLevel::Moderate => "moderate",
            ActivityLevel::High => "high",
        }
    }

    /// Parse a stored/host value. Unknown values map to `Moderate`.
    pub fn parse_lenient(value: &str) -> Self {
        match value.trim().to_lowercase().as_str() {
            "low" | "sedentary" => ActivityLevel::Low,
            "high" | "intense" | "vigorous" => ActivityLevel::High,
            _ => ActivityLevel::Moderate,
        }
    }
}

/// A single logged health reading.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct HealthDataPoint {
    /// Blood glucose in mg/dL
    pub glucose: f64,
    /// Insulin taken, in units
    pub insulin: Option<f64>,
    /// Carbohydrates eaten, in grams
    pub carbs: Option<f64>,
    #[serde(default)]
    pub activity_level: ActivityLevel,
    /// RFC 3339 timestamp
    pub timestamp: String,
}

impl HealthDataPoint {
    /// Create a reading stamped with the current time.
    pub fn new(glucose: f64) -> Self {
        Self {
            glucose,
            insulin: None,
            carbs: None,
            activity_level: ActivityLevel::Moderate,
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// A logged meal as consumed by the predictor.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MealLogEntry {
    pub description: Option<String>,
    pub carbs: f64,
    pub protein: f64,
    pub fat: f64,
    pub calories: f64,
    /// RFC 3339 timestamp
    pub timestamp: String,
    #[serde(default)]
    pub voice_recorded: bool,
}

impl MealLogEntry {
    /// Create an entry with only carbohydrates known.
    pub fn with_carbs(carbs: f64) -> Self {
        Self {
            description: None,
            carbs,
            protein: 0.0,
            fat: 0.0,
            calories: 0.0,
            timestamp: chrono::Utc::now().to_rfc3339(),
            voice_recorded: false,
        }
    }

    /// Build a log entry from a recognized meal analysis.
    pub fn from_analysis(analysis: &super::MealAnalysisResult, voice_recorded: bool) -> Self {
        Self {
            description: Some(analysis.meal_name.clone()),
            carbs: analysis.totals.carbs,
            protein: analysis.totals.protein,
            fat: analysis.totals.fat,
            calories: analysis.totals.calories,
            timestamp: chrono::Utc::now().to_rfc3339(),
            voice_recorded,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_activity_parse_lenient() {
        assert_eq!(ActivityLevel::parse_lenient("HIGH"), ActivityLevel::High);
        assert_eq!(ActivityLevel::parse_lenient("low"), ActivityLevel::Low);
        assert_eq!(ActivityLevel::parse_lenient("moderate"), ActivityLevel::Moderate);
        assert_eq!(ActivityLevel::parse_lenient("whatever"), ActivityLevel::Moderate);
    }

    #[test]
    fn test_health_point_deserializes_host_shape() {
        let json = r#"{"glucose":220,"insulin":10,"carbs":null,"activityLevel":"high","timestamp":"2024-05-01T08:00:00Z"}"#;
        let point: HealthDataPoint = serde_json::from_str(json).unwrap();
        assert_eq!(point.glucose, 220.0);
        assert_eq!(point.insulin, Some(10.0));
        assert_eq!(point.activity_level, ActivityLevel::High);
    }

    #[test]
    fn test_activity_defaults_to_moderate() {
        let json = r#"{"glucose":110,"insulin":null,"carbs":null,"timestamp":"2024-05-01T08:00:00Z"}"#;
        let point: HealthDataPoint = serde_json::from_str(json).unwrap();
        assert_eq!(point.activity_level, ActivityLevel::Moderate);
    }
}
