//! Food log entry model
//!
//! One logged food or recipe consumption event, owned by a single user.

use chrono::{NaiveDate, NaiveTime};
use rusqlite::{params, Connection, OptionalExtension, Row};
use serde::{Deserialize, Serialize};

use crate::db::DbResult;
use super::Macros;

/// A logged food entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entry {
    pub id: i64,
    pub user_id: String,
    pub date: NaiveDate,
    /// Clock time of the log, display and sort only
    pub time: Option<NaiveTime>,
    pub food: String,
    pub macros: Macros,
    pub created_at: String,
    pub updated_at: String,
}

/// Data for creating (or fully rewriting) an entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntryCreate {
    pub date: NaiveDate,
    pub time: Option<NaiveTime>,
    pub food: String,
    pub macros: Macros,
}

/// Data for editing an entry; absent fields keep their current value
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EntryUpdate {
    pub date: Option<NaiveDate>,
    pub time: Option<NaiveTime>,
    pub food: Option<String>,
    pub calories: Option<f64>,
    pub protein: Option<f64>,
    pub carbs: Option<f64>,
    pub fat: Option<f64>,
}

impl EntryUpdate {
    pub fn is_empty(&self) -> bool {
        self.date.is_none()
            && self.time.is_none()
            && self.food.is_none()
            && self.calories.is_none()
            && self.protein.is_none()
            && self.carbs.is_none()
            && self.fat.is_none()
    }

    /// Overlay this edit on an existing entry
    pub fn merged(&self, existing: &Entry) -> EntryCreate {
        EntryCreate {
            date: self.date.unwrap_or(existing.date),
            time: self.time.or(existing.time),
            food: self.food.clone().unwrap_or_else(|| existing.food.clone()),
            macros: Macros {
                calories: self.calories.unwrap_or(existing.macros.calories),
                protein: self.protein.unwrap_or(existing.macros.protein),
                carbs: self.carbs.unwrap_or(existing.macros.carbs),
                fat: self.fat.unwrap_or(existing.macros.fat),
            },
        }
    }
}

/// Format a log time the way the dashboard shows it ("2:05 PM")
pub fn display_time(time: &NaiveTime) -> String {
    time.format("%-I:%M %p").to_string()
}

impl Entry {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            user_id: row.get("user_id")?,
            date: row.get("date")?,
            time: row.get("time")?,
            food: row.get("food")?,
            macros: Macros {
                calories: row.get("calories")?,
                protein: row.get("protein")?,
                carbs: row.get("carbs")?,
                fat: row.get("fat")?,
            },
            created_at: row.get("created_at")?,
            updated_at: row.get("updated_at")?,
        })
    }

    /// Insert a new entry for a user
    pub fn create(conn: &Connection, user_id: &str, data: &EntryCreate) -> DbResult<Self> {
        conn.execute(
            r#"
            INSERT INTO food_logs (user_id, date, time, food, calories, protein, carbs, fat)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
            params![
                user_id,
                data.date,
                data.time,
                data.food,
                data.macros.calories,
                data.macros.protein,
                data.macros.carbs,
                data.macros.fat,
            ],
        )?;

        let id = conn.last_insert_rowid();
        Self::get_by_id(conn, user_id, id)?.ok_or_else(|| {
            crate::db::DbError::Sqlite(rusqlite::Error::QueryReturnedNoRows)
        })
    }

    /// Get an entry by ID, scoped to its owner
    pub fn get_by_id(conn: &Connection, user_id: &str, id: i64) -> DbResult<Option<Self>> {
        let entry = conn
            .query_row(
                "SELECT * FROM food_logs WHERE id = ?1 AND user_id = ?2",
                params![id, user_id],
                Self::from_row,
            )
            .optional()?;
        Ok(entry)
    }

    /// Entries of a user dated within `start..=end`
    pub fn list_in_range(
        conn: &Connection,
        user_id: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> DbResult<Vec<Self>> {
        let mut stmt = conn.prepare(
            "SELECT * FROM food_logs WHERE user_id = ?1 AND date >= ?2 AND date <= ?3",
        )?;
        let entries = stmt
            .query_map(params![user_id, start, end], Self::from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(entries)
    }

    /// Rewrite every editable field of an entry
    pub fn update(
        conn: &Connection,
        user_id: &str,
        id: i64,
        data: &EntryCreate,
    ) -> DbResult<Option<Self>> {
        let rows = conn.execute(
            r#"
            UPDATE food_logs SET
                date = ?1,
                time = ?2,
                food = ?3,
                calories = ?4,
                protein = ?5,
                carbs = ?6,
                fat = ?7,
                updated_at = datetime('now')
            WHERE id = ?8 AND user_id = ?9
            "#,
            params![
                data.date,
                data.time,
                data.food,
                data.macros.calories,
                data.macros.protein,
                data.macros.carbs,
                data.macros.fat,
                id,
                user_id,
            ],
        )?;

        if rows == 0 {
            return Ok(None);
        }
        Self::get_by_id(conn, user_id, id)
    }

    /// Delete an entry
    pub fn delete(conn: &Connection, user_id: &str, id: i64) -> DbResult<bool> {
        let rows = conn.execute(
            "DELETE FROM food_logs WHERE id = ?1 AND user_id = ?2",
            params![id, user_id],
        )?;
        Ok(rows > 0)
    }
}
