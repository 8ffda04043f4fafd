//! Goals MCP Tools
//!
//! Read and replace a user's daily macro targets.

use serde::Serialize;

use crate::aggregate::goal_caption;
use crate::context::RequestContext;
use crate::db::Database;
use crate::models::{Goals, Macros};

use super::ToolResult;

/// Response for get_goals and set_goals
#[derive(Debug, Serialize)]
pub struct GoalsResponse {
    pub goals: Macros,
    /// True when nothing was saved and the defaults apply
    pub is_default: bool,
    pub caption: String,
    pub updated_at: Option<String>,
}

impl From<Goals> for GoalsResponse {
    fn from(goals: Goals) -> Self {
        Self {
            caption: goal_caption(&goals.targets),
            is_default: goals.is_default(),
            goals: goals.targets,
            updated_at: goals.updated_at,
        }
    }
}

pub fn get_goals(db: &Database, ctx: &RequestContext) -> ToolResult<GoalsResponse> {
    let conn = db.get_conn()?;
    let goals = Goals::get_or_default(&conn, &ctx.user_id)?;
    Ok(goals.into())
}

/// Replace the goals wholesale
pub fn set_goals(db: &Database, ctx: &RequestContext, targets: Macros) -> ToolResult<GoalsResponse> {
    targets.validate()?;

    let conn = db.get_conn()?;
    let goals = Goals::put(&conn, &ctx.user_id, &targets)?;
    tracing::info!(user_id = %ctx.user_id, "Saved goals");

    Ok(goals.into())
}
