//! Database migrations
//!
//! Schema creation and migration logic.

use rusqlite::Connection;

use super::connection::DbResult;

/// Current schema version
const SCHEMA_VERSION: i32 = 1;

/// Run all migrations to bring the database up to the current schema version
pub fn run_migrations(conn: &Connection) -> DbResult<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS schema_migrations (
            version INTEGER PRIMARY KEY,
            applied_at TEXT NOT NULL DEFAULT (datetime('now'))
        )",
        [],
    )?;

    let current_version = get_schema_version(conn)?;

    if current_version < 1 {
        migrate_v1(conn)?;
        conn.execute("INSERT INTO schema_migrations (version) VALUES (1)", [])?;
        tracing::info!("Applied schema migration v1");
    }

    Ok(())
}

/// Migration v1: Initial schema
fn migrate_v1(conn: &Connection) -> DbResult<()> {
    conn.execute_batch(
        r#"
        -- ============================================
        -- USERS
        -- Identity is the lower-cased name, no password
        -- ============================================
        CREATE TABLE users (
            id TEXT PRIMARY KEY,                 -- UUIDv4
            username TEXT NOT NULL UNIQUE,
            created_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        -- ============================================
        -- MACRO GOALS
        -- One live row per user, replaced wholesale
        -- ============================================
        CREATE TABLE macro_goals (
            user_id TEXT PRIMARY KEY REFERENCES users(id) ON DELETE CASCADE,
            calories REAL NOT NULL CHECK(calories >= 0),
            protein REAL NOT NULL CHECK(protein >= 0),
            carbs REAL NOT NULL CHECK(carbs >= 0),
            fat REAL NOT NULL CHECK(fat >= 0),
            updated_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        -- ============================================
        -- FOOD LOGS
        -- What was actually consumed
        -- ============================================
        CREATE TABLE food_logs (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            date TEXT NOT NULL,                  -- ISO date: "2025-01-09"
            time TEXT,                           -- "HH:MM:SS", display only
            food TEXT NOT NULL,

            calories REAL NOT NULL DEFAULT 0 CHECK(calories >= 0),
            protein REAL NOT NULL DEFAULT 0 CHECK(protein >= 0),   -- grams
            carbs REAL NOT NULL DEFAULT 0 CHECK(carbs >= 0),       -- grams
            fat REAL NOT NULL DEFAULT 0 CHECK(fat >= 0),           -- grams

            created_at TEXT NOT NULL DEFAULT (datetime('now')),
            updated_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE INDEX idx_food_logs_user_date ON food_logs(user_id, date);

        -- ============================================
        -- RECIPES
        -- Named macro templates, copied into food_logs when logged
        -- ============================================
        CREATE TABLE recipes (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            name TEXT NOT NULL,
            foods TEXT NOT NULL DEFAULT '[]',    -- JSON array of labels

            calories REAL NOT NULL DEFAULT 0 CHECK(calories >= 0),
            protein REAL NOT NULL DEFAULT 0 CHECK(protein >= 0),
            carbs REAL NOT NULL DEFAULT 0 CHECK(carbs >= 0),
            fat REAL NOT NULL DEFAULT 0 CHECK(fat >= 0),

            created_at TEXT NOT NULL DEFAULT (datetime('now')),
            updated_at TEXT NOT NULL DEFAULT (datetime('now')),

            UNIQUE(user_id, name)
        );

        CREATE INDEX idx_recipes_user ON recipes(user_id);
        "#,
    )?;

    Ok(())
}

/// Get the current schema version
pub fn get_schema_version(conn: &Connection) -> DbResult<i32> {
    let version: i32 = conn.query_row(
        "SELECT COALESCE(MAX(version), 0) FROM schema_migrations",
        [],
        |row| row.get(0),
    )?;
    Ok(version)
}

/// Check if the database needs migration
pub fn needs_migration(conn: &Connection) -> DbResult<bool> {
    let current = get_schema_version(conn)?;
    Ok(current < SCHEMA_VERSION)
}
