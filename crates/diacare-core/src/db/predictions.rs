//! Insulin prediction history.

use rusqlite::{params, OptionalExtension};

use super::{normalize_timestamp, Database, DbError, DbResult};
use crate::models::{InsulinPrediction, StoredPrediction};

impl Database {
    /// Persist a prediction. Factors are stored as a JSON array.
    pub fn insert_prediction(&self, stored: &StoredPrediction) -> DbResult<()> {
        let factors = serde_json::to_string(&stored.prediction.factors)?;
        let timestamp = normalize_timestamp(&stored.prediction.timestamp)?;
        self.conn.execute(
            r#"
            INSERT INTO insulin_predictions (
                id, user_id, predicted_insulin, confidence, factors, timestamp
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
            params![
                stored.id,
                stored.user_id,
                stored.prediction.predicted_insulin,
                stored.prediction.confidence,
                factors,
                timestamp,
            ],
        )?;
        Ok(())
    }

    /// Get a prediction by ID.
    pub fn get_prediction(&self, id: &str) -> DbResult<Option<StoredPrediction>> {
        self.conn
            .query_row(
                r#"
                SELECT id, user_id, predicted_insulin, confidence, factors, timestamp
                FROM insulin_predictions
                WHERE id = ?
                "#,
                [id],
                PredictionRow::from_row,
            )
            .optional()?
            .map(TryInto::try_into)
            .transpose()
    }

    /// Most recent predictions first.
    pub fn list_predictions(&self, user_id: &str, limit: usize) -> DbResult<Vec<StoredPrediction>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT id, user_id, predicted_insulin, confidence, factors, timestamp
            FROM insulin_predictions
            WHERE user_id = ?1
            ORDER BY timestamp DESC, rowid DESC
            LIMIT ?2
            "#,
        )?;

        let rows = stmt.query_map(params![user_id, limit as i64], PredictionRow::from_row)?;

        let mut predictions = Vec::new();
        for row in rows {
            predictions.push(row?.try_into()?);
        }
        Ok(predictions)
    }

    pub fn latest_prediction(&self, user_id: &str) -> DbResult<Option<StoredPrediction>> {
        Ok(self.list_predictions(user_id, 1)?.into_iter().next())
    }

    /// Delete a prediction. Errors if it does not exist.
    pub fn delete_prediction(&self, id: &str) -> DbResult<()> {
        let rows = self
            .conn
            .execute("DELETE FROM insulin_predictions WHERE id = ?", [id])?;
        if rows == 0 {
            return Err(DbError::NotFound(format!("prediction {id}")));
        }
        Ok(())
    }
}

/// Intermediate row struct for database mapping.
struct PredictionRow {
    id: String,
    user_id: String,
    predicted_insulin: f64,
    confidence: f64,
    factors: String,
    timestamp: String,
}

impl PredictionRow {
    fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            user_id: row.get(1)?,
            predicted_insulin: row.get(2)?,
            confidence: row.get(3)?,
            factors: row.get(4)?,
            timestamp: row.get(5)?,
        })
    }
}

impl TryFrom<PredictionRow> for StoredPrediction {
    type Error = DbError;

    fn try_from(row: PredictionRow) -> Result<Self, Self::Error> {
        let factors: Vec<String> = serde_json::from_str(&row.factors)?;

        Ok(StoredPrediction {
            id: row.id,
            user_id: row.user_id,
            prediction: InsulinPrediction {
                predicted_insulin: row.predicted_insulin,
                confidence: row.confidence,
                factors,
                timestamp: row.timestamp,
            },
        })
    }
}
