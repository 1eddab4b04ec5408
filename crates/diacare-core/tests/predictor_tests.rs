//! Insulin predictor scenarios.

use diacare_core::models::{ActivityLevel, HealthDataPoint, MealLogEntry};
use diacare_core::predictor::{InsulinPredictor, PredictorError};

fn reading(glucose: f64, insulin: Option<f64>, activity: ActivityLevel) -> HealthDataPoint {
    HealthDataPoint {
        insulin,
        activity_level: activity,
        ..HealthDataPoint::new(glucose)
    }
}

fn meals(carbs: &[f64]) -> Vec<MealLogEntry> {
    carbs.iter().map(|&c| MealLogEntry::with_carbs(c)).collect()
}

struct Scenario {
    id: &'static str,
    health: Vec<HealthDataPoint>,
    meals: Vec<MealLogEntry>,
    expected_insulin: f64,
    expected_confidence: f64,
    expected_factor_count: usize,
}

fn scenarios() -> Vec<Scenario> {
    let moderate = |g: f64, i: Option<f64>| reading(g, i, ActivityLevel::Moderate);

    vec![
        Scenario {
            // Correction 1.6 + carbs 45/15 = 3.0
            id: "single-reading-three-meals",
            health: vec![moderate(220.0, Some(10.0))],
            meals: meals(&[60.0, 45.0, 30.0]),
            expected_insulin: 4.6,
            expected_confidence: 0.5,
            expected_factor_count: 2,
        },
        Scenario {
            // Reduction floors at zero before the carb dose is added
            id: "low-glucose-small-meal",
            health: vec![moderate(85.0, None)],
            meals: meals(&[15.0]),
            expected_insulin: 1.0,
            expected_confidence: 0.4,
            expected_factor_count: 2,
        },
        Scenario {
            // Established history: 0.6 + 0.05 (in range) + 0.15 (3 meals), capped at 0.7
            id: "established-in-range",
            health: (0..5).map(|_| moderate(140.0, None)).collect(),
            meals: meals(&[45.0, 45.0, 45.0]),
            expected_insulin: 3.0,
            expected_confidence: 0.7,
            expected_factor_count: 2,
        },
        Scenario {
            // (3.2 + 4.0) * 0.85 = 6.12, then 6.12 * 0.7 + 8 * 0.3 = 6.684
            id: "full-history-high-activity",
            health: (0..10)
                .map(|_| reading(260.0, Some(8.0), ActivityLevel::High))
                .collect(),
            meals: meals(&[60.0, 60.0, 60.0, 60.0, 60.0]),
            expected_insulin: 6.7,
            expected_confidence: 0.85,
            expected_factor_count: 4,
        },
        Scenario {
            id: "no-meals-in-range",
            health: vec![moderate(110.0, None), moderate(115.0, None)],
            meals: vec![],
            expected_insulin: 0.0,
            expected_confidence: 0.4,
            expected_factor_count: 2,
        },
    ]
}

#[test]
fn test_scenarios() {
    let predictor = InsulinPredictor::new();

    for case in scenarios() {
        let prediction = predictor.predict(&case.health, &case.meals).unwrap();
        assert_eq!(
            prediction.predicted_insulin, case.expected_insulin,
            "Case {}: insulin mismatch", case.id
        );
        assert_eq!(
            prediction.confidence, case.expected_confidence,
            "Case {}: confidence mismatch", case.id
        );
        assert_eq!(
            prediction.factors.len(),
            case.expected_factor_count,
            "Case {}: factors {:?}",
            case.id,
            prediction.factors
        );
    }
}

#[test]
fn test_empty_history_is_insufficient() {
    let predictor = InsulinPredictor::new();
    assert_eq!(
        predictor.predict(&[], &[]).unwrap_err(),
        PredictorError::InsufficientData
    );
    assert_eq!(
        predictor.predict(&[], &meals(&[50.0])).unwrap_err(),
        PredictorError::InsufficientData
    );
}

#[test]
fn test_only_latest_reading_drives_correction() {
    let predictor = InsulinPredictor::new();
    let history = vec![
        reading(150.0, None, ActivityLevel::Moderate),
        reading(400.0, None, ActivityLevel::Moderate),
    ];
    let prediction = predictor.predict(&history, &[]).unwrap();
    assert_eq!(prediction.predicted_insulin, 0.0);
}

#[test]
fn test_history_blend_averages_recorded_doses() {
    let mut history = vec![reading(140.0, Some(10.0), ActivityLevel::Moderate)];
    history.extend((0..6).map(|_| reading(140.0, None, ActivityLevel::Moderate)));

    let prediction = InsulinPredictor::new().predict(&history, &[]).unwrap();
    // 0.0 x 0.7 + 10.0 x 0.3
    assert_eq!(prediction.predicted_insulin, 3.0);
    assert!(prediction
        .factors
        .iter()
        .any(|f| f == "Blended with your average dose of 10.0 units (30% weight)"));
}

#[test]
fn test_prediction_serializes_host_fields() {
    let predictor = InsulinPredictor::new();
    let prediction = predictor
        .predict(&[reading(220.0, None, ActivityLevel::Moderate)], &[])
        .unwrap();
    let json = serde_json::to_value(&prediction).unwrap();
    assert_eq!(json["predictedInsulin"], 1.6);
    assert!(json["factors"].is_array());
    assert!(json["timestamp"].is_string());
}
