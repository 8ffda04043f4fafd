//! Recipe model
//!
//! A named macro template. Logging a recipe copies its values into a new
//! food log entry; the two are independent afterwards.

use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension, Row};
use serde::{Deserialize, Serialize};

use crate::db::DbResult;
use super::Macros;

/// A saved recipe
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recipe {
    pub id: i64,
    pub user_id: String,
    pub name: String,
    pub foods: Vec<String>,
    pub macros: Macros,
    pub created_at: String,
    pub updated_at: String,
}

/// Data for creating a new recipe
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecipeCreate {
    pub name: String,
    pub foods: Vec<String>,
    pub macros: Macros,
}

/// Data for updating a recipe. The name is its identity and stays fixed.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RecipeUpdate {
    pub foods: Option<Vec<String>>,
    pub calories: Option<f64>,
    pub protein: Option<f64>,
    pub carbs: Option<f64>,
    pub fat: Option<f64>,
}

impl RecipeUpdate {
    /// Overlay this edit on an existing recipe's macros
    pub fn merged_macros(&self, existing: &Macros) -> Macros {
        Macros {
            calories: self.calories.unwrap_or(existing.calories),
            protein: self.protein.unwrap_or(existing.protein),
            carbs: self.carbs.unwrap_or(existing.carbs),
            fat: self.fat.unwrap_or(existing.fat),
        }
    }
}

/// Trim each label and drop the empty ones, keeping order
pub fn clean_food_list<I, S>(foods: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    foods
        .into_iter()
        .map(|f| f.as_ref().trim().to_string())
        .filter(|f| !f.is_empty())
        .collect()
}

fn foods_to_json(foods: &[String]) -> String {
    serde_json::Value::from(foods.to_vec()).to_string()
}

impl Recipe {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        let foods_json: String = row.get("foods")?;
        let foods: Vec<String> = serde_json::from_str(&foods_json).map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(0, Type::Text, Box::new(e))
        })?;

        Ok(Self {
            id: row.get("id")?,
            user_id: row.get("user_id")?,
            name: row.get("name")?,
            foods,
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

    /// Insert a new recipe. A duplicate name for the same user is a
    /// constraint violation.
    pub fn create(conn: &Connection, user_id: &str, data: &RecipeCreate) -> DbResult<Self> {
        conn.execute(
            r#"
            INSERT INTO recipes (user_id, name, foods, calories, protein, carbs, fat)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
            params![
                user_id,
                data.name,
                foods_to_json(&data.foods),
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

    pub fn get_by_id(conn: &Connection, user_id: &str, id: i64) -> DbResult<Option<Self>> {
        let recipe = conn
            .query_row(
                "SELECT * FROM recipes WHERE id = ?1 AND user_id = ?2",
                params![id, user_id],
                Self::from_row,
            )
            .optional()?;
        Ok(recipe)
    }

    pub fn get_by_name(conn: &Connection, user_id: &str, name: &str) -> DbResult<Option<Self>> {
        let recipe = conn
            .query_row(
                "SELECT * FROM recipes WHERE user_id = ?1 AND name = ?2",
                params![user_id, name],
                Self::from_row,
            )
            .optional()?;
        Ok(recipe)
    }

    /// All recipes of a user, by name
    pub fn list_for_user(conn: &Connection, user_id: &str) -> DbResult<Vec<Self>> {
        let mut stmt =
            conn.prepare("SELECT * FROM recipes WHERE user_id = ?1 ORDER BY name ASC")?;
        let recipes = stmt
            .query_map([user_id], Self::from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(recipes)
    }

    /// Rewrite a recipe's foods and macros
    pub fn update(
        conn: &Connection,
        user_id: &str,
        id: i64,
        foods: &[String],
        macros: &Macros,
    ) -> DbResult<Option<Self>> {
        let rows = conn.execute(
            r#"
            UPDATE recipes SET
                foods = ?1,
                calories = ?2,
                protein = ?3,
                carbs = ?4,
                fat = ?5,
                updated_at = datetime('now')
            WHERE id = ?6 AND user_id = ?7
            "#,
            params![
                foods_to_json(foods),
                macros.calories,
                macros.protein,
                macros.carbs,
                macros.fat,
                id,
                user_id,
            ],
        )?;

        if rows == 0 {
            return Ok(None);
        }
        Self::get_by_id(conn, user_id, id)
    }

    /// Delete a recipe. Entries logged from it are untouched.
    pub fn delete(conn: &Connection, user_id: &str, id: i64) -> DbResult<bool> {
        let rows = conn.execute(
            "DELETE FROM recipes WHERE id = ?1 AND user_id = ?2",
            params![id, user_id],
        )?;
        Ok(rows > 0)
    }
}
