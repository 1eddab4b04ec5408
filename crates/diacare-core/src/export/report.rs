//! Patient report export.

use serde::{Deserialize, Serialize};

use crate::db::{Database, DbResult};
use crate::models::{HealthDataPoint, MealLogEntry, StoredPrediction};

/// Lower bound of the standard glucose target range (mg/dL)
pub const RANGE_LOW_MG_DL: f64 = 70.0;
/// Upper bound of the standard glucose target range (mg/dL)
pub const RANGE_HIGH_MG_DL: f64 = 180.0;

/// Aggregate statistics over the exported window.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ReportSummary {
    pub reading_count: usize,
    pub meal_count: usize,
    pub average_glucose: Option<f64>,
    pub min_glucose: Option<f64>,
    pub max_glucose: Option<f64>,
    /// Share of readings within 70-180 mg/dL, in percent
    pub time_in_range_percent: Option<f64>,
    /// Readings below 70 mg/dL
    pub hypo_count: usize,
    /// Readings above 180 mg/dL
    pub hyper_count: usize,
    /// Average insulin over readings that recorded a dose
    pub average_insulin: Option<f64>,
    pub average_meal_carbs: Option<f64>,
}

/// Report for a single user.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PatientReport {
    pub user_id: String,
    pub generated_at: String,
    pub summary: ReportSummary,
    pub latest_prediction: Option<StoredPrediction>,
    /// Most recent first
    pub readings: Vec<HealthDataPoint>,
}

impl PatientReport {
    /// Build a report from already fetched history.
    pub fn from_history(
        user_id: &str,
        readings: Vec<HealthDataPoint>,
        meals: &[MealLogEntry],
        latest_prediction: Option<StoredPrediction>,
    ) -> Self {
        let glucose: Vec<f64> = readings.iter().map(|r| r.glucose).collect();
        let doses: Vec<f64> = readings.iter().filter_map(|r| r.insulin).collect();
        let carbs: Vec<f64> = meals.iter().map(|m| m.carbs).collect();

        let in_range = glucose
            .iter()
            .filter(|g| (RANGE_LOW_MG_DL..=RANGE_HIGH_MG_DL).contains(*g))
            .count();

        let summary = ReportSummary {
            reading_count: readings.len(),
            meal_count: meals.len(),
            average_glucose: mean(&glucose),
            min_glucose: glucose.iter().copied().reduce(f64::min),
            max_glucose: glucose.iter().copied().reduce(f64::max),
            time_in_range_percent: (!glucose.is_empty())
                .then(|| round1(in_range as f64 * 100.0 / glucose.len() as f64)),
            hypo_count: glucose.iter().filter(|&&g| g < RANGE_LOW_MG_DL).count(),
            hyper_count: glucose.iter().filter(|&&g| g > RANGE_HIGH_MG_DL).count(),
            average_insulin: mean(&doses),
            average_meal_carbs: mean(&carbs),
        };

        Self {
            user_id: user_id.to_string(),
            generated_at: chrono::Utc::now().to_rfc3339(),
            summary,
            latest_prediction,
            readings,
        }
    }

    /// Export to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Export readings to CSV, one row per reading.
    pub fn to_csv(&self) -> String {
        let mut csv = String::new();

        csv.push_str("user_id,timestamp,glucose,insulin,carbs,activity_level,status\n");

        for reading in &self.readings {
            csv.push_str(&format!(
                "{},{},{},{},{},{},{}\n",
                escape_csv(&self.user_id),
                escape_csv(&reading.timestamp),
                reading.glucose,
                reading.insulin.map(|v| v.to_string()).unwrap_or_default(),
                reading.carbs.map(|v| v.to_string()).unwrap_or_default(),
                reading.activity_level.as_str(),
                glucose_status(reading.glucose),
            ));
        }

        csv
    }
}

/// Builds [`PatientReport`]s from the history store.
pub struct ReportExporter<'a> {
    db: &'a Database,
}

impl<'a> ReportExporter<'a> {
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    /// Report over the `limit` most recent readings and meals.
    pub fn build(&self, user_id: &str, limit: usize) -> DbResult<PatientReport> {
        let readings = self.db.recent_health_data(user_id, limit)?;
        let meals = self.db.recent_meal_logs(user_id, limit)?;
        let latest = self.db.latest_prediction(user_id)?;
        Ok(PatientReport::from_history(user_id, readings, &meals, latest))
    }
}

fn glucose_status(glucose: f64) -> &'static str {
    if glucose < RANGE_LOW_MG_DL {
        "low"
    } else if glucose > RANGE_HIGH_MG_DL {
        "high"
    } else {
        "in_range"
    }
}

fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(round1(values.iter().sum::<f64>() / values.len() as f64))
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Escape a string for CSV output.
fn escape_csv(s: &str) -> String {
    if s.contains(',') || s.contains('"') || s.contains('\n') {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}
