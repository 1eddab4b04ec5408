//! SQLite schema definition.

/// Complete database schema for the history store.
pub const SCHEMA: &str = r#"
-- ============================================================================
-- Health readings
-- ============================================================================

CREATE TABLE IF NOT EXISTS health_data (
    id TEXT PRIMARY KEY,
    user_id TEXT NOT NULL,
    glucose REAL NOT NULL,                        -- mg/dL
    insulin REAL,                                 -- units
    carbs REAL,                                   -- grams
    activity_level TEXT NOT NULL DEFAULT 'moderate',
    timestamp TEXT NOT NULL,                      -- RFC 3339
    created_at TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE INDEX IF NOT EXISTS idx_health_user_time ON health_data(user_id, timestamp);

-- ============================================================================
-- Meal logs
-- ============================================================================

CREATE TABLE IF NOT EXISTS meal_logs (
    id TEXT PRIMARY KEY,
    user_id TEXT NOT NULL,
    description TEXT,
    carbs REAL NOT NULL,
    protein REAL NOT NULL DEFAULT 0,
    fat REAL NOT NULL DEFAULT 0,
    calories REAL NOT NULL DEFAULT 0,
    voice_recorded INTEGER NOT NULL DEFAULT 0,
    timestamp TEXT NOT NULL,
    created_at TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE INDEX IF NOT EXISTS idx_meals_user_time ON meal_logs(user_id, timestamp);

-- ============================================================================
-- Insulin predictions
-- ============================================================================

CREATE TABLE IF NOT EXISTS insulin_predictions (
    id TEXT PRIMARY KEY,
    user_id TEXT NOT NULL,
    predicted_insulin REAL NOT NULL,
    confidence REAL NOT NULL,
    factors TEXT NOT NULL DEFAULT '[]',           -- JSON array of strings
    timestamp TEXT NOT NULL,
    created_at TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE INDEX IF NOT EXISTS idx_predictions_user_time ON insulin_predictions(user_id, timestamp);
"#;
