//! Health reading and meal log operations.

use rusqlite::params;
use uuid::Uuid;

use super::{check_non_negative, normalize_timestamp, Database, DbResult};
use crate::models::{ActivityLevel, HealthDataPoint, MealLogEntry};

impl Database {
    /// Store a reading for `user_id`. Returns the new row id.
    pub fn insert_health_data(&self, user_id: &str, point: &HealthDataPoint) -> DbResult<String> {
        check_non_negative("glucose", point.glucose)?;
        if let Some(insulin) = point.insulin {
            check_non_negative("insulin", insulin)?;
        }
        if let Some(carbs) = point.carbs {
            check_non_negative("carbs", carbs)?;
        }
        let timestamp = normalize_timestamp(&point.timestamp)?;

        let id = Uuid::new_v4().to_string();
        self.conn.execute(
            r#"
            INSERT INTO health_data (
                id, user_id, glucose, insulin, carbs, activity_level, timestamp
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
            params![
                id,
                user_id,
                point.glucose,
                point.insulin,
                point.carbs,
                point.activity_level.as_str(),
                timestamp,
            ],
        )?;
        Ok(id)
    }

    /// Most recent readings first.
    pub fn recent_health_data(&self, user_id: &str, limit: usize) -> DbResult<Vec<HealthDataPoint>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT glucose, insulin, carbs, activity_level, timestamp
            FROM health_data
            WHERE user_id = ?1
            ORDER BY timestamp DESC, rowid DESC
            LIMIT ?2
            "#,
        )?;

        let rows = stmt.query_map(params![user_id, limit as i64], |row| {
            let activity: String = row.get(3)?;
            Ok(HealthDataPoint {
                glucose: row.get(0)?,
                insulin: row.get(1)?,
                carbs: row.get(2)?,
                activity_level: ActivityLevel::parse_lenient(&activity),
                timestamp: row.get(4)?,
            })
        })?;

        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    /// Store a meal for `user_id`. Returns the new row id.
    pub fn insert_meal_log(&self, user_id: &str, meal: &MealLogEntry) -> DbResult<String> {
        check_non_negative("carbs", meal.carbs)?;
        check_non_negative("protein", meal.protein)?;
        check_non_negative("fat", meal.fat)?;
        check_non_negative("calories", meal.calories)?;
        let timestamp = normalize_timestamp(&meal.timestamp)?;

        let id = Uuid::new_v4().to_string();
        self.conn.execute(
            r#"
            INSERT INTO meal_logs (
                id, user_id, description, carbs, protein, fat, calories,
                voice_recorded, timestamp
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            "#,
            params![
                id,
                user_id,
                meal.description,
                meal.carbs,
                meal.protein,
                meal.fat,
                meal.calories,
                meal.voice_recorded,
                timestamp,
            ],
        )?;
        Ok(id)
    }

    /// Most recent meals first.
    pub fn recent_meal_logs(&self, user_id: &str, limit: usize) -> DbResult<Vec<MealLogEntry>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT description, carbs, protein, fat, calories, timestamp, voice_recorded
            FROM meal_logs
            WHERE user_id = ?1
            ORDER BY timestamp DESC, rowid DESC
            LIMIT ?2
            "#,
        )?;

        let rows = stmt.query_map(params![user_id, limit as i64], |row| {
            Ok(MealLogEntry {
                description: row.get(0)?,
                carbs: row.get(1)?,
                protein: row.get(2)?,
                fat: row.get(3)?,
                calories: row.get(4)?,
                timestamp: row.get(5)?,
                voice_recorded: row.get(6)?,
            })
        })?;

        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::DbError;
    use crate::predictor::InsulinPredictor;

    fn reading(glucose: f64, timestamp: &str) -> HealthDataPoint {
        HealthDataPoint {
            glucose,
            insulin: None,
            carbs: None,
            activity_level: ActivityLevel::Moderate,
            timestamp: timestamp.into(),
        }
    }

    fn meal(carbs: f64, timestamp: &str) -> MealLogEntry {
        MealLogEntry {
            timestamp: timestamp.into(),
            ..MealLogEntry::with_carbs(carbs)
        }
    }

    #[test]
    fn test_insert_and_fetch_reading() {
        let db = Database::open_in_memory().unwrap();
        let mut point = reading(210.0, "2024-05-01T08:00:00.000000Z");
        point.insulin = Some(6.5);
        point.activity_level = ActivityLevel::High;

        let id = db.insert_health_data("u1", &point).unwrap();
        assert!(!id.is_empty());

        let fetched = db.recent_health_data("u1", 10).unwrap();
        assert_eq!(fetched, vec![point]);
    }

    #[test]
    fn test_recent_readings_most_recent_first() {
        let db = Database::open_in_memory().unwrap();
        db.insert_health_data("u1", &reading(100.0, "2024-05-01T08:00:00+00:00")).unwrap();
        db.insert_health_data("u1", &reading(300.0, "2024-05-03T08:00:00+00:00")).unwrap();
        db.insert_health_data("u1", &reading(200.0, "2024-05-02T08:00:00+00:00")).unwrap();
        db.insert_health_data("u2", &reading(999.0, "2024-05-04T08:00:00+00:00")).unwrap();

        let glucose: Vec<f64> = db
            .recent_health_data("u1", 10)
            .unwrap()
            .iter()
            .map(|p| p.glucose)
            .collect();
        assert_eq!(glucose, vec![300.0, 200.0, 100.0]);

        assert_eq!(db.recent_health_data("u1", 2).unwrap().len(), 2);
        assert!(db.recent_health_data("nobody", 10).unwrap().is_empty());
    }

    #[test]
    fn test_negative_values_rejected() {
        let db = Database::open_in_memory().unwrap();
        let err = db
            .insert_health_data("u1", &reading(-5.0, "2024-05-01T08:00:00+00:00"))
            .unwrap_err();
        assert!(matches!(err, DbError::Constraint(_)));

        let err = db.insert_meal_log("u1", &MealLogEntry::with_carbs(f64::NAN)).unwrap_err();
        assert!(matches!(err, DbError::Constraint(_)));
    }

    #[test]
    fn test_meal_logs_roundtrip_and_order() {
        let db = Database::open_in_memory().unwrap();
        let mut first = meal(60.0, "2024-05-01T08:00:00.000000Z");
        first.description = Some("2 chapati with dal".into());
        first.voice_recorded = true;
        db.insert_meal_log("u1", &first).unwrap();
        db.insert_meal_log("u1", &meal(45.0, "2024-05-01T13:00:00+00:00")).unwrap();

        let meals = db.recent_meal_logs("u1", 5).unwrap();
        assert_eq!(meals.len(), 2);
        assert_eq!(meals[0].carbs, 45.0);
        assert_eq!(meals[1], first);
    }

    #[test]
    fn test_mixed_offsets_sort_by_instant() {
        let db = Database::open_in_memory().unwrap();
        // 04:30 UTC, then 08:00 UTC
        db.insert_health_data("u1", &reading(300.0, "2024-05-01T10:00:00+05:30")).unwrap();
        db.insert_health_data("u1", &reading(100.0, "2024-05-01T08:00:00+00:00")).unwrap();

        let readings = db.recent_health_data("u1", 10).unwrap();
        assert_eq!(readings[0].glucose, 100.0);
        assert_eq!(readings[0].timestamp, "2024-05-01T08:00:00.000000Z");
        assert_eq!(readings[1].timestamp, "2024-05-01T04:30:00.000000Z");

        let prediction = InsulinPredictor::new().predict(&readings, &[]).unwrap();
        assert_eq!(prediction.predicted_insulin, 0.0);

        db.insert_meal_log("u1", &meal(30.0, "2024-05-01T12:00:00-04:00")).unwrap();
        db.insert_meal_log("u1", &meal(80.0, "2024-05-01T15:00:00+00:00")).unwrap();
        let meals = db.recent_meal_logs("u1", 5).unwrap();
        assert_eq!(meals[0].carbs, 30.0);
    }

    #[test]
    fn test_invalid_timestamp_rejected() {
        let db = Database::open_in_memory().unwrap();
        let err = db.insert_health_data("u1", &reading(120.0, "yesterday")).unwrap_err();
        assert!(matches!(err, DbError::Constraint(_)));

        let err = db.insert_meal_log("u1", &meal(30.0, "later")).unwrap_err();
        assert!(matches!(err, DbError::Constraint(_)));
        assert!(db.recent_health_data("u1", 10).unwrap().is_empty());
    }
}
