//! Diacare Core Library
//!
//! Heuristic engine for diabetes self-management: meal nutrition estimates,
//! insulin dose suggestions and medical document field extraction, with a
//! local history store feeding the predictor.
//!
//! # Architecture
//!
//! ```text
//! Meal text → Regional Normalizer → Meal Analyzer ──► MealAnalysisResult
//!                                          │
//!                                      meal_logs ─┐
//!                                                 ├─► Insulin Predictor ──► insulin_predictions
//! Health readings ─────────────────── health_data ┘                               │
//!                                                                          Patient Report
//! Document text → Document Field Parser ──► ParsedDocument                   (JSON / CSV)
//! ```
//!
//! Predictions are informational estimates, not medical advice.
//!
//! # Modules
//!
//! - [`nutrition`]: Food table, regional normalizer and meal analyzer
//! - [`predictor`]: Insulin dose heuristic
//! - [`document`]: Rule-based document field parser
//! - [`db`]: SQLite history store
//! - [`export`]: Patient report export
//! - [`config`]: JSON-loadable engine configuration
//! - [`models`]: Domain types

pub mod config;
pub mod db;
pub mod document;
pub mod export;
pub mod logging;
pub mod models;
pub mod nutrition;
pub mod predictor;

// Re-export commonly used types
pub use config::{ConfigError, EngineConfig, HistoryWindow};
pub use db::Database;
pub use document::{DocumentConfig, DocumentParser};
pub use models::{
    ActivityLevel, DishItem, FieldName, HealthDataPoint, ImpactLevel, InsulinPrediction,
    MealAnalysisResult, MealLogEntry, MealType, ParsedDocument, ParsedField, StoredPrediction,
    Totals,
};
pub use nutrition::{AnalysisOptions, FoodTable, MealAnalyzer, RegionalNormalizer};
pub use predictor::{InsulinPredictor, PredictorConfig, PredictorError};

// UniFFI setup - using proc macros
uniffi::setup_scaffolding!();

use std::sync::{Arc, Mutex};

// =========================================================================
// FFI Error Type
// =========================================================================

#[derive(Debug, thiserror::Error, uniffi::Error)]
pub enum DiacareError {
    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl From<db::DbError> for DiacareError {
    fn from(e: db::DbError) -> Self {
        match e {
            db::DbError::Constraint(msg) => DiacareError::InvalidInput(msg),
            other => DiacareError::Database(other.to_string()),
        }
    }
}

impl From<serde_json::Error> for DiacareError {
    fn from(e: serde_json::Error) -> Self {
        DiacareError::Serialization(e.to_string())
    }
}

impl From<PredictorError> for DiacareError {
    fn from(e: PredictorError) -> Self {
        match e {
            PredictorError::InsufficientData => {
                DiacareError::InsufficientData("log at least one health entry first".to_string())
            }
        }
    }
}

impl From<ConfigError> for DiacareError {
    fn from(e: ConfigError) -> Self {
        DiacareError::Configuration(e.to_string())
    }
}

impl From<document::RuleError> for DiacareError {
    fn from(e: document::RuleError) -> Self {
        DiacareError::Configuration(e.to_string())
    }
}

impl<T> From<std::sync::PoisonError<T>> for DiacareError {
    fn from(e: std::sync::PoisonError<T>) -> Self {
        DiacareError::Database(format!("Lock poisoned: {}", e))
    }
}

// =========================================================================
// Factory Functions (exported to FFI)
// =========================================================================

/// Open or create a history database at the given path.
///
/// `config_json` may override any part of [`EngineConfig`].
#[uniffi::export]
pub fn open_database(
    path: String,
    config_json: Option<String>,
) -> Result<Arc<DiacareCore>, DiacareError> {
    let config = match config_json {
        Some(json) => EngineConfig::from_json_str(&json)?,
        None => EngineConfig::default(),
    };
    let db = Database::open(&path)?;
    Ok(Arc::new(DiacareCore::with_config(db, config)?))
}

/// Create an in-memory database with the default configuration.
#[uniffi::export]
pub fn open_database_in_memory() -> Result<Arc<DiacareCore>, DiacareError> {
    let db = Database::open_in_memory()?;
    Ok(Arc::new(DiacareCore::with_config(db, EngineConfig::default())?))
}

/// Rewrite regional dish names to canonical food table names.
#[uniffi::export]
pub fn normalize_description(text: String) -> String {
    nutrition::normalize_regional(&text)
}

/// Install the log subscriber. Safe to call more than once.
#[uniffi::export]
pub fn init_logging(filter: Option<String>) {
    logging::init_logging(filter.as_deref());
}

// =========================================================================
// Main API Object
// =========================================================================

/// Engine plus history store, safe to share across threads.
#[derive(uniffi::Object)]
pub struct DiacareCore {
    db: Arc<Mutex<Database>>,
    analyzer: MealAnalyzer,
    predictor: InsulinPredictor,
    parser: DocumentParser,
    config: EngineConfig,
}

impl DiacareCore {
    /// Build from an open database and a validated configuration.
    pub fn with_config(db: Database, config: EngineConfig) -> Result<Self, DiacareError> {
        config.validate()?;
        Ok(Self {
            db: Arc::new(Mutex::new(db)),
            analyzer: MealAnalyzer::new(),
            predictor: InsulinPredictor::with_config(config.predictor.clone()),
            parser: DocumentParser::with_config(config.documents.clone())?,
            config,
        })
    }

    fn analysis(
        &self,
        description: &str,
        portion_multiplier: Option<f64>,
        cooking_style: Option<String>,
        meal_type: Option<String>,
    ) -> Result<MealAnalysisResult, DiacareError> {
        let meal_type = meal_type
            .map(|t| t.parse::<MealType>())
            .transpose()
            .map_err(DiacareError::InvalidInput)?;
        let options = AnalysisOptions {
            portion_multiplier: portion_multiplier.unwrap_or(1.0),
            cooking_style,
            meal_type,
        };
        Ok(self.analyzer.analyze(description, &options))
    }
}

#[uniffi::export]
impl DiacareCore {
    // =========================================================================
    // Meal Analysis
    // =========================================================================

    /// Analyze a free-text meal description.
    pub fn analyze_meal(
        &self,
        description: String,
        portion_multiplier: Option<f64>,
        cooking_style: Option<String>,
        meal_type: Option<String>,
    ) -> Result<FfiMealAnalysis, DiacareError> {
        let result = self.analysis(&description, portion_multiplier, cooking_style, meal_type)?;
        Ok(result.into())
    }

    /// Same as [`Self::analyze_meal`], serialized with host field names.
    pub fn analyze_meal_json(
        &self,
        description: String,
        portion_multiplier: Option<f64>,
        cooking_style: Option<String>,
        meal_type: Option<String>,
    ) -> Result<String, DiacareError> {
        let result = self.analysis(&description, portion_multiplier, cooking_style, meal_type)?;
        Ok(serde_json::to_string(&result)?)
    }

    // =========================================================================
    // History
    // =========================================================================

    /// Store a health reading. Returns its id.
    pub fn log_health_data(
        &self,
        user_id: String,
        point: FfiHealthDataPoint,
    ) -> Result<String, DiacareError> {
        let db = self.db.lock()?;
        Ok(db.insert_health_data(&user_id, &point.into())?)
    }

    /// Store a meal with known macros. Returns its id.
    pub fn log_meal(&self, user_id: String, meal: FfiMealLogEntry) -> Result<String, DiacareError> {
        let db = self.db.lock()?;
        Ok(db.insert_meal_log(&user_id, &meal.into())?)
    }

    /// Analyze a description and store it as a meal when recognized.
    pub fn log_meal_description(
        &self,
        user_id: String,
        description: String,
        voice_recorded: bool,
    ) -> Result<FfiMealAnalysis, DiacareError> {
        let result = self.analysis(&description, None, None, None)?;
        if result.is_recognized() {
            let db = self.db.lock()?;
            db.insert_meal_log(&user_id, &MealLogEntry::from_analysis(&result, voice_recorded))?;
        }
        Ok(result.into())
    }

    // =========================================================================
    // Insulin Prediction
    // =========================================================================

    /// Predict from stored history and persist the result.
    pub fn predict_insulin(&self, user_id: String) -> Result<FfiInsulinPrediction, DiacareError> {
        let db = self.db.lock()?;
        let health = db.recent_health_data(&user_id, self.config.history.health_points)?;
        let meals = db.recent_meal_logs(&user_id, self.config.history.meals)?;

        let prediction = self.predictor.predict(&health, &meals)?;
        let stored = StoredPrediction::new(user_id, prediction);
        db.insert_prediction(&stored)?;

        tracing::info!(
            user_id = %stored.user_id,
            predicted_insulin = stored.prediction.predicted_insulin,
            confidence = stored.prediction.confidence,
            "Stored insulin prediction"
        );

        Ok(stored.into())
    }

    /// Predict from caller-supplied history, most recent first. Nothing is stored.
    pub fn predict_insulin_from(
        &self,
        health: Vec<FfiHealthDataPoint>,
        meals: Vec<FfiMealLogEntry>,
    ) -> Result<FfiInsulinPrediction, DiacareError> {
        let health: Vec<HealthDataPoint> = health.into_iter().map(Into::into).collect();
        let meals: Vec<MealLogEntry> = meals.into_iter().map(Into::into).collect();
        let prediction = self.predictor.predict(&health, &meals)?;
        Ok(prediction.into())
    }

    /// Stored predictions, most recent first.
    pub fn recent_predictions(
        &self,
        user_id: String,
        limit: u32,
    ) -> Result<Vec<FfiInsulinPrediction>, DiacareError> {
        let db = self.db.lock()?;
        let predictions = db.list_predictions(&user_id, limit as usize)?;
        Ok(predictions.into_iter().map(Into::into).collect())
    }

    // =========================================================================
    // Documents
    // =========================================================================

    /// Extract patient fields from document text. Always returns every field.
    pub fn parse_medical_document(&self, text: String) -> Vec<FfiParsedField> {
        let doc = self.parser.parse(&text);
        doc.fields()
            .map(|(name, field)| FfiParsedField {
                field: name.as_str().to_string(),
                value: field.value.clone(),
                confidence: field.confidence,
            })
            .collect()
    }

    /// Same as [`Self::parse_medical_document`], as a JSON object keyed by field.
    pub fn parse_medical_document_json(&self, text: String) -> Result<String, DiacareError> {
        Ok(serde_json::to_string(&self.parser.parse(&text))?)
    }

    // =========================================================================
    // Export Operations
    // =========================================================================

    /// Export a patient report as JSON.
    pub fn export_report_json(&self, user_id: String, limit: u32) -> Result<String, DiacareError> {
        let db = self.db.lock()?;
        let report = export::ReportExporter::new(&db).build(&user_id, limit as usize)?;
        Ok(report.to_json()?)
    }

    /// Export a patient report's readings as CSV.
    pub fn export_report_csv(&self, user_id: String, limit: u32) -> Result<String, DiacareError> {
        let db = self.db.lock()?;
        let report = export::ReportExporter::new(&db).build(&user_id, limit as usize)?;
        Ok(report.to_csv())
    }

    /// Effective configuration as JSON.
    pub fn config_json(&self) -> Result<String, DiacareError> {
        Ok(self.config.to_json()?)
    }
}

// =========================================================================
// FFI Types
// =========================================================================

/// FFI-safe meal analysis.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiMealAnalysis {
    pub meal_name: String,
    pub meal_type: Option<String>,
    pub items: Vec<FfiDishItem>,
    pub totals: FfiTotals,
    pub health_impact: Option<String>,
    pub health_impact_description: Option<String>,
    pub benefits: Vec<String>,
    pub cautions: Vec<String>,
    pub alternatives: Vec<String>,
    pub error: Option<String>,
    pub message: Option<String>,
    pub suggestions: Vec<String>,
}

impl From<MealAnalysisResult> for FfiMealAnalysis {
    fn from(result: MealAnalysisResult) -> Self {
        let (health_impact, health_impact_description) = match result.health_impact {
            Some(impact) => (
                Some(impact.category.as_str().to_string()),
                Some(impact.description),
            ),
            None => (None, None),
        };
        Self {
            meal_name: result.meal_name,
            meal_type: result.meal_type.map(|t| t.as_str().to_string()),
            items: result.items.into_iter().map(Into::into).collect(),
            totals: result.totals.into(),
            health_impact,
            health_impact_description,
            benefits: result.benefits.unwrap_or_default(),
            cautions: result.cautions.unwrap_or_default(),
            alternatives: result.alternatives.unwrap_or_default(),
            error: result.error.map(|e| e.as_str().to_string()),
            message: result.message,
            suggestions: result.suggestions,
        }
    }
}

/// FFI-safe dish item.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiDishItem {
    pub dish_name: String,
    pub normalized_name: String,
    pub quantity: f64,
    pub unit: String,
    pub estimated_weight_grams: f64,
    pub ingredients: Vec<String>,
    pub carbs: f64,
    pub protein: f64,
    pub fat: f64,
    pub fiber: f64,
    pub calories: f64,
    pub impact_level: String,
    pub glycemic_index: Option<u8>,
}

impl From<DishItem> for FfiDishItem {
    fn from(item: DishItem) -> Self {
        Self {
            dish_name: item.dish_name,
            normalized_name: item.normalized_name,
            quantity: item.quantity,
            unit: item.unit,
            estimated_weight_grams: item.estimated_weight_grams,
            ingredients: item.ingredients,
            carbs: item.nutrition.carbs,
            protein: item.nutrition.protein,
            fat: item.nutrition.fat,
            fiber: item.nutrition.fiber,
            calories: item.nutrition.calories,
            impact_level: item.impact_level.as_str().to_string(),
            glycemic_index: item.glycemic_index,
        }
    }
}

/// FFI-safe meal totals.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiTotals {
    pub carbs: f64,
    pub protein: f64,
    pub fat: f64,
    pub fiber: f64,
    pub calories: f64,
    pub overall_impact_level: String,
}

impl From<Totals> for FfiTotals {
    fn from(totals: Totals) -> Self {
        Self {
            carbs: totals.carbs,
            protein: totals.protein,
            fat: totals.fat,
            fiber: totals.fiber,
            calories: totals.calories,
            overall_impact_level: totals.overall_impact_level.as_str().to_string(),
        }
    }
}

/// FFI-safe health reading. A missing timestamp means "now".
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiHealthDataPoint {
    pub glucose: f64,
    pub insulin: Option<f64>,
    pub carbs: Option<f64>,
    pub activity_level: String,
    pub timestamp: Option<String>,
}

impl From<FfiHealthDataPoint> for HealthDataPoint {
    fn from(point: FfiHealthDataPoint) -> Self {
        HealthDataPoint {
            glucose: point.glucose,
            insulin: point.insulin,
            carbs: point.carbs,
            activity_level: ActivityLevel::parse_lenient(&point.activity_level),
            timestamp: point
                .timestamp
                .unwrap_or_else(|| chrono::Utc::now().to_rfc3339()),
        }
    }
}

/// FFI-safe meal log entry. A missing timestamp means "now".
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiMealLogEntry {
    pub description: Option<String>,
    pub carbs: f64,
    pub protein: f64,
    pub fat: f64,
    pub calories: f64,
    pub timestamp: Option<String>,
    pub voice_recorded: bool,
}

impl From<FfiMealLogEntry> for MealLogEntry {
    fn from(meal: FfiMealLogEntry) -> Self {
        MealLogEntry {
            description: meal.description,
            carbs: meal.carbs,
            protein: meal.protein,
            fat: meal.fat,
            calories: meal.calories,
            timestamp: meal
                .timestamp
                .unwrap_or_else(|| chrono::Utc::now().to_rfc3339()),
            voice_recorded: meal.voice_recorded,
        }
    }
}

/// FFI-safe insulin prediction. `id` is set once stored.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiInsulinPrediction {
    pub id: Option<String>,
    pub predicted_insulin: f64,
    pub confidence: f64,
    pub factors: Vec<String>,
    pub timestamp: String,
}

impl From<InsulinPrediction> for FfiInsulinPrediction {
    fn from(prediction: InsulinPrediction) -> Self {
        Self {
            id: None,
            predicted_insulin: prediction.predicted_insulin,
            confidence: prediction.confidence,
            factors: prediction.factors,
            timestamp: prediction.timestamp,
        }
    }
}

impl From<StoredPrediction> for FfiInsulinPrediction {
    fn from(stored: StoredPrediction) -> Self {
        Self {
            id: Some(stored.id),
            ..stored.prediction.into()
        }
    }
}

/// FFI-safe parsed document field.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiParsedField {
    pub field: String,
    pub value: Option<String>,
    pub confidence: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reading(glucose: f64, insulin: Option<f64>) -> FfiHealthDataPoint {
        FfiHealthDataPoint {
            glucose,
            insulin,
            carbs: None,
            activity_level: "moderate".into(),
            timestamp: None,
        }
    }

    fn meal(carbs: f64) -> FfiMealLogEntry {
        FfiMealLogEntry {
            description: None,
            carbs,
            protein: 0.0,
            fat: 0.0,
            calories: 0.0,
            timestamp: None,
            voice_recorded: false,
        }
    }

    #[test]
    fn test_analyze_meal_via_ffi() {
        let core = open_database_in_memory().unwrap();
        let result = core
            .analyze_meal("2 chapati with dal".into(), None, None, Some("lunch".into()))
            .unwrap();
        assert_eq!(result.items.len(), 2);
        assert_eq!(result.totals.carbs, 48.0);
        assert_eq!(result.totals.overall_impact_level, "medium");
        assert_eq!(result.meal_type.as_deref(), Some("lunch"));
    }

    #[test]
    fn test_invalid_meal_type_rejected() {
        let core = open_database_in_memory().unwrap();
        let err = core
            .analyze_meal("rice".into(), None, None, Some("brunch".into()))
            .unwrap_err();
        assert!(matches!(err, DiacareError::InvalidInput(_)));
    }

    #[test]
    fn test_unknown_dish_is_not_an_error() {
        let core = open_database_in_memory().unwrap();
        let result = core
            .analyze_meal("xyz unknown food".into(), None, None, None)
            .unwrap();
        assert_eq!(result.error.as_deref(), Some("unknown_dish"));
        assert!(result.items.is_empty());
    }

    #[test]
    fn test_predict_without_history_fails() {
        let core = open_database_in_memory().unwrap();
        let err = core.predict_insulin("u1".into()).unwrap_err();
        assert!(matches!(err, DiacareError::InsufficientData(_)));
        assert!(err.to_string().contains("log at least one health entry first"));
    }

    #[test]
    fn test_predict_from_stored_history() {
        let core = open_database_in_memory().unwrap();
        core.log_health_data("u1".into(), reading(220.0, Some(10.0))).unwrap();
        for carbs in [30.0, 45.0, 60.0] {
            core.log_meal("u1".into(), meal(carbs)).unwrap();
        }

        let prediction = core.predict_insulin("u1".into()).unwrap();
        assert_eq!(prediction.predicted_insulin, 4.6);
        assert_eq!(prediction.confidence, 0.5);
        assert!(prediction.id.is_some());

        let history = core.recent_predictions("u1".into(), 10).unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].id, prediction.id);
    }

    #[test]
    fn test_predict_from_supplied_history() {
        let core = open_database_in_memory().unwrap();
        let prediction = core
            .predict_insulin_from(
                vec![reading(220.0, Some(10.0))],
                vec![meal(60.0), meal(45.0), meal(30.0)],
            )
            .unwrap();
        assert_eq!(prediction.predicted_insulin, 4.6);
        assert!(prediction.id.is_none());
        assert!(core.recent_predictions("u1".into(), 10).unwrap().is_empty());
    }

    #[test]
    fn test_log_meal_description() {
        let core = open_database_in_memory().unwrap();
        core.log_meal_description("u1".into(), "biryani with raita".into(), true)
            .unwrap();
        core.log_meal_description("u1".into(), "xyz unknown food".into(), false)
            .unwrap();
        core.log_health_data("u1".into(), reading(120.0, None)).unwrap();

        // Only the recognized meal was stored: 65g / 15
        let prediction = core.predict_insulin("u1".into()).unwrap();
        assert_eq!(prediction.predicted_insulin, 4.3);
    }

    #[test]
    fn test_negative_glucose_is_invalid_input() {
        let core = open_database_in_memory().unwrap();
        let err = core
            .log_health_data("u1".into(), reading(-1.0, None))
            .unwrap_err();
        assert!(matches!(err, DiacareError::InvalidInput(_)));
    }

    #[test]
    fn test_parse_document_returns_every_field() {
        let core = open_database_in_memory().unwrap();
        let fields = core.parse_medical_document("Date of Birth: 14 June 2003".into());
        assert_eq!(fields.len(), 8);

        let dob = fields.iter().find(|f| f.field == "dob").unwrap();
        assert_eq!(dob.value.as_deref(), Some("2003-06-14"));
        assert_eq!(dob.confidence, 0.98);

        let weight = fields.iter().find(|f| f.field == "weight").unwrap();
        assert_eq!(weight.value, None);
        assert_eq!(weight.confidence, 0.0);
    }

    #[test]
    fn test_custom_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("diacare.db");
        let core = open_database(
            path.to_string_lossy().into_owned(),
            Some(r#"{"predictor": {"carb_ratio": 10.0}}"#.into()),
        )
        .unwrap();

        let prediction = core
            .predict_insulin_from(vec![reading(150.0, None)], vec![meal(50.0)])
            .unwrap();
        assert_eq!(prediction.predicted_insulin, 5.0);
        assert!(core.config_json().unwrap().contains("\"carb_ratio\": 10.0"));

        let err = open_database(
            path.to_string_lossy().into_owned(),
            Some(r#"{"predictor": {"carb_ratio": -1}}"#.into()),
        );
        assert!(matches!(err, Err(DiacareError::Configuration(_))));
    }

    #[test]
    fn test_exports() {
        let core = open_database_in_memory().unwrap();
        core.log_health_data("u1".into(), reading(65.0, None)).unwrap();
        core.log_health_data("u1".into(), reading(140.0, Some(4.0))).unwrap();

        let json = core.export_report_json("u1".into(), 50).unwrap();
        assert!(json.contains("\"hypoCount\": 1"));

        let csv = core.export_report_csv("u1".into(), 50).unwrap();
        assert_eq!(csv.lines().count(), 3);
    }

    #[test]
    fn test_normalize_description() {
        assert_eq!(normalize_description("Annam Pappu".into()), "dal rice");
    }
}
