//! User model
//!
//! A user is identified by a lower-cased name. There is no password.

use rusqlite::{params, Connection, OptionalExtension, Row};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::db::DbResult;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub username: String,
    pub created_at: String,
}

impl User {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            username: row.get("username")?,
            created_at: row.get("created_at")?,
        })
    }

    /// Canonical form of a login name
    pub fn normalize_username(raw: &str) -> String {
        raw.trim().to_lowercase()
    }

    pub fn get_by_id(conn: &Connection, id: &str) -> DbResult<Option<Self>> {
        let user = conn
            .query_row("SELECT * FROM users WHERE id = ?1", [id], Self::from_row)
            .optional()?;
        Ok(user)
    }

    /// Look up by an already-normalized username
    pub fn get_by_username(conn: &Connection, username: &str) -> DbResult<Option<Self>> {
        let user = conn
            .query_row(
                "SELECT * FROM users WHERE username = ?1",
                [username],
                Self::from_row,
            )
            .optional()?;
        Ok(user)
    }

    /// Insert a user with a fresh UUIDv4 id
    pub fn create(conn: &Connection, username: &str) -> DbResult<Self> {
        let id = Uuid::new_v4().to_string();
        conn.execute(
            "INSERT INTO users (id, username) VALUES (?1, ?2)",
            params![id, username],
        )?;

        Self::get_by_id(conn, &id)?.ok_or_else(|| {
            crate::db::DbError::Sqlite(rusqlite::Error::QueryReturnedNoRows)
        })
    }

    /// Return the existing user or create one; the flag is true when created
    pub fn get_or_create(conn: &Connection, username: &str) -> DbResult<(Self, bool)> {
        if let Some(user) = Self::get_by_username(conn, username)? {
            return Ok((user, false));
        }
        Ok((Self::create(conn, username)?, true))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Database;

    #[test]
    fn test_normalize_username() {
        assert_eq!(User::normalize_username("  Alice "), "alice");
    }

    #[test]
    fn test_get_or_create_is_stable() {
        let db = Database::in_memory().unwrap();
        let conn = db.get_conn().unwrap();

        let (first, created) = User::get_or_create(&conn, "alice").unwrap();
        assert!(created);
        assert!(Uuid::parse_str(&first.id).is_ok());

        let (second, created) = User::get_or_create(&conn, "alice").unwrap();
        assert!(!created);
        assert_eq!(first.id, second.id);
    }
}
