//! Session MCP Tools
//!
//! Username login and resolution of a user id into a request context.

use serde::Serialize;

use crate::context::{Clock, RequestContext};
use crate::db::Database;
use crate::models::{User, ValidationError};

use super::{ToolError, ToolResult};

/// Response for login
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub user_id: String,
    pub username: String,
    pub created: bool, // true on first login
}

/// Log in by username, creating the user on first use
pub fn login(db: &Database, username: &str) -> ToolResult<LoginResponse> {
    let username = User::normalize_username(username);
    if username.is_empty() {
        return Err(ValidationError::Empty("username").into());
    }

    let conn = db.get_conn()?;
    let (user, created) = User::get_or_create(&conn, &username)?;

    if created {
        tracing::info!(user_id = %user.id, username = %user.username, "Created user");
    } else {
        tracing::info!(user_id = %user.id, "User logged in");
    }

    Ok(LoginResponse {
        user_id: user.id,
        username: user.username,
        created,
    })
}

/// Context for a known user as of now in the configured zone
pub fn resolve_context(db: &Database, clock: &Clock, user_id: &str) -> ToolResult<RequestContext> {
    let conn = db.get_conn()?;
    match User::get_by_id(&conn, user_id)? {
        Some(user) => Ok(clock.context_for(user.id)),
        None => Err(ToolError::NotFound(format!(
            "Unknown user_id '{}'. Call login first.",
            user_id
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_login_creates_then_reuses() {
        let db = Database::in_memory().unwrap();

        let first = login(&db, "  Alice ").unwrap();
        assert!(first.created);
        assert_eq!(first.username, "alice");

        let second = login(&db, "ALICE").unwrap();
        assert!(!second.created);
        assert_eq!(second.user_id, first.user_id);
    }

    #[test]
    fn test_login_rejects_blank_username() {
        let db = Database::in_memory().unwrap();
        assert!(matches!(login(&db, "   "), Err(ToolError::InvalidInput(_))));
    }

    #[test]
    fn test_resolve_context() {
        let db = Database::in_memory().unwrap();
        let clock = Clock::new(chrono_tz::US::Eastern);
        let user = login(&db, "bob").unwrap();

        let ctx = resolve_context(&db, &clock, &user.user_id).unwrap();
        assert_eq!(ctx.user_id, user.user_id);

        assert!(matches!(
            resolve_context(&db, &clock, "nobody"),
            Err(ToolError::NotFound(_))
        ));
    }
}
