//! Macro goals model
//!
//! Exactly one live goal record per user, replaced wholesale on save.

use rusqlite::{params, Connection, OptionalExtension, Row};
use serde::{Deserialize, Serialize};

use crate::db::DbResult;
use super::Macros;

/// Targets used when a user has never saved goals
pub const DEFAULT_GOALS: Macros = Macros {
    calories: 2000.0,
    protein: 150.0,
    carbs: 250.0,
    fat: 70.0,
};

/// A user's daily macro targets
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Goals {
    pub user_id: String,
    pub targets: Macros,
    /// None when the defaults are in effect
    pub updated_at: Option<String>,
}

impl Goals {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            user_id: row.get("user_id")?,
            targets: Macros {
                calories: row.get("calories")?,
                protein: row.get("protein")?,
                carbs: row.get("carbs")?,
                fat: row.get("fat")?,
            },
            updated_at: row.get("updated_at")?,
        })
    }

    /// The default goals for a user without a stored record
    pub fn default_for(user_id: &str) -> Self {
        Self {
            user_id: user_id.to_string(),
            targets: DEFAULT_GOALS,
            updated_at: None,
        }
    }

    pub fn is_default(&self) -> bool {
        self.updated_at.is_none()
    }

    /// Stored goals, if the user ever saved any
    pub fn get(conn: &Connection, user_id: &str) -> DbResult<Option<Self>> {
        let goals = conn
            .query_row(
                "SELECT * FROM macro_goals WHERE user_id = ?1",
                [user_id],
                Self::from_row,
            )
            .optional()?;
        Ok(goals)
    }

    /// Stored goals, falling back to the defaults
    pub fn get_or_default(conn: &Connection, user_id: &str) -> DbResult<Self> {
        Ok(Self::get(conn, user_id)?.unwrap_or_else(|| Self::default_for(user_id)))
    }

    /// Replace the user's goals
    pub fn put(conn: &Connection, user_id: &str, targets: &Macros) -> DbResult<Self> {
        conn.execute(
            r#"
            INSERT INTO macro_goals (user_id, calories, protein, carbs, fat)
            VALUES (?1, ?2, ?3, ?4, ?5)
            ON CONFLICT(user_id) DO UPDATE SET
                calories = excluded.calories,
                protein = excluded.protein,
                carbs = excluded.carbs,
                fat = excluded.fat,
                updated_at = datetime('now')
            "#,
            params![
                user_id,
                targets.calories,
                targets.protein,
                targets.carbs,
                targets.fat,
            ],
        )?;

        Self::get(conn, user_id)?.ok_or_else(|| {
            crate::db::DbError::Sqlite(rusqlite::Error::QueryReturnedNoRows)
        })
    }
}
