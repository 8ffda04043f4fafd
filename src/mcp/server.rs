//! Macro Tracker MCP Server Implementation
//!
//! Exposes every tracker tool over MCP. Each call resolves its `user_id`
//! into a fresh request context; the server keeps no per-user state.

use std::path::PathBuf;
use std::sync::Arc;

use rmcp::handler::server::router::tool::ToolRouter;
use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::{
    CallToolResult, Content, Implementation, ProtocolVersion, ServerCapabilities, ServerInfo,
};
use rmcp::{schemars, tool, tool_handler, tool_router, ErrorData as McpError, ServerHandler};
use serde::{Deserialize, Serialize};

use crate::context::{Clock, RequestContext};
use crate::db::Database;
use crate::models::{EntryUpdate, Macros, RecipeCreate, RecipeUpdate};
use crate::tools::status::{StatusTracker, USAGE_INSTRUCTIONS};
use crate::tools::{
    charts, dashboard, food_log, goals, import, parse_date, parse_time, recipes, session, ToolError,
};

impl From<ToolError> for McpError {
    fn from(err: ToolError) -> Self {
        match err {
            ToolError::InvalidInput(msg) | ToolError::NotFound(msg) | ToolError::Conflict(msg) => {
                McpError::invalid_params(msg, None)
            }
            other => McpError::internal_error(other.to_string(), None),
        }
    }
}

fn json_result<T: Serialize>(value: &T) -> Result<CallToolResult, McpError> {
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| McpError::internal_error(format!("Serialization error: {}", e), None))?;
    Ok(CallToolResult::success(vec![Content::text(json)]))
}

fn parse_optional_date(raw: Option<&str>) -> Result<Option<chrono::NaiveDate>, ToolError> {
    raw.map(str::trim)
        .filter(|s| !s.is_empty())
        .map(parse_date)
        .transpose()
}

fn parse_optional_time(raw: Option<&str>) -> Result<Option<chrono::NaiveTime>, ToolError> {
    raw.map(str::trim)
        .filter(|s| !s.is_empty())
        .map(parse_time)
        .transpose()
}

/// Macro Tracker MCP Service
#[derive(Clone)]
pub struct MacroTrackerService {
    status_tracker: Arc<StatusTracker>,
    database: Database,
    clock: Clock,
    tool_router: ToolRouter<MacroTrackerService>,
}

impl MacroTrackerService {
    pub fn new(database_path: PathBuf, database: Database, clock: Clock) -> Self {
        Self {
            status_tracker: Arc::new(StatusTracker::new(database_path, clock.timezone().name())),
            database,
            clock,
            tool_router: Self::tool_router(),
        }
    }

    /// Request context for a logged-in user
    fn context(&self, user_id: &str) -> Result<RequestContext, McpError> {
        Ok(session::resolve_context(&self.database, &self.clock, user_id)?)
    }
}

// ============================================================================
// Session and Goals Parameter Structs
// ============================================================================

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct LoginParams {
    /// Name to log in as (case-insensitive)
    pub username: String,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct UserParams {
    /// User ID returned by login
    pub user_id: String,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct SetGoalsParams {
    pub user_id: String,
    pub calories: f64,
    /// Grams
    pub protein: f64,
    /// Grams
    pub carbs: f64,
    /// Grams
    pub fat: f64,
}

// ============================================================================
// Food Log Parameter Structs
// ============================================================================

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct LogFoodParams {
    pub user_id: String,
    /// What was eaten
    pub food: String,
    pub calories: f64,
    pub protein: f64,
    pub carbs: f64,
    pub fat: f64,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct ListEntriesParams {
    pub user_id: String,
    /// Day to list (YYYY-MM-DD), defaults to today
    pub date: Option<String>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct EntryIdParams {
    pub user_id: String,
    /// Entry ID
    pub id: i64,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct UpdateEntryParams {
    pub user_id: String,
    /// Entry ID
    pub id: i64,
    /// New date (YYYY-MM-DD)
    pub date: Option<String>,
    /// New time ("h:mm AM/PM" or "HH:MM")
    pub time: Option<String>,
    pub food: Option<String>,
    pub calories: Option<f64>,
    pub protein: Option<f64>,
    pub carbs: Option<f64>,
    pub fat: Option<f64>,
}

// ============================================================================
// Recipe Parameter Structs
// ============================================================================

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct CreateRecipeParams {
    pub user_id: String,
    /// Unique recipe name
    pub name: String,
    /// Foods in the recipe, in order
    pub foods: Vec<String>,
    pub calories: f64,
    pub protein: f64,
    pub carbs: f64,
    pub fat: f64,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct RecipeIdParams {
    pub user_id: String,
    /// Recipe ID
    pub id: i64,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct UpdateRecipeParams {
    pub user_id: String,
    /// Recipe ID
    pub id: i64,
    /// Replacement food list
    pub foods: Option<Vec<String>>,
    pub calories: Option<f64>,
    pub protein: Option<f64>,
    pub carbs: Option<f64>,
    pub fat: Option<f64>,
}

// ============================================================================
// Summary, Chart and Import Parameter Structs
// ============================================================================

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct WeeklySummaryParams {
    pub user_id: String,
    /// Last day of the 7-day window (YYYY-MM-DD), defaults to today
    pub end_date: Option<String>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct ExportChartsParams {
    pub user_id: String,
    /// Directory to write PNG files into (created if missing)
    pub output_dir: String,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct ImportCsvParams {
    pub user_id: String,
    /// Path to a CSV with header date,time,food,calories,protein,carbs,fat
    pub file_path: String,
}

// ============================================================================
// Tool Router
// ============================================================================

#[tool_router]
impl MacroTrackerService {
    // --- Status ---

    #[tool(description = "Get the current status of the Macro Tracker service including build info, database status, time zone and process information")]
    fn tracker_status(&self) -> Result<CallToolResult, McpError> {
        json_result(&self.status_tracker.get_status())
    }

    #[tool(description = "Get instructions for using the macro tracking tools. Call this when starting a session or when unsure how the tools fit together.")]
    fn usage_instructions(&self) -> Result<CallToolResult, McpError> {
        Ok(CallToolResult::success(vec![Content::text(USAGE_INSTRUCTIONS)]))
    }

    // --- Session ---

    #[tool(description = "Log in by username. Creates the user on first login. Returns the user_id every other tool needs.")]
    fn login(&self, Parameters(p): Parameters<LoginParams>) -> Result<CallToolResult, McpError> {
        json_result(&session::login(&self.database, &p.username)?)
    }

    // --- Goals ---

    #[tool(description = "Get the user's daily macro goals (defaults apply until goals are saved)")]
    fn get_goals(&self, Parameters(p): Parameters<UserParams>) -> Result<CallToolResult, McpError> {
        let ctx = self.context(&p.user_id)?;
        json_result(&goals::get_goals(&self.database, &ctx)?)
    }

    #[tool(description = "Replace the user's daily macro goals. All four values are required.")]
    fn set_goals(&self, Parameters(p): Parameters<SetGoalsParams>) -> Result<CallToolResult, McpError> {
        let ctx = self.context(&p.user_id)?;
        let targets = Macros::new(p.calories, p.protein, p.carbs, p.fat);
        json_result(&goals::set_goals(&self.database, &ctx, targets)?)
    }

    // --- Food Log ---

    #[tool(description = "Log a food eaten now, with its calories and protein/carbs/fat in grams")]
    fn log_food(&self, Parameters(p): Parameters<LogFoodParams>) -> Result<CallToolResult, McpError> {
        let ctx = self.context(&p.user_id)?;
        let macros = Macros::new(p.calories, p.protein, p.carbs, p.fat);
        json_result(&food_log::log_food(&self.database, &ctx, &p.food, macros)?)
    }

    #[tool(description = "List a day's food entries in the order eaten, with the day's totals")]
    fn list_entries(&self, Parameters(p): Parameters<ListEntriesParams>) -> Result<CallToolResult, McpError> {
        let ctx = self.context(&p.user_id)?;
        let date = parse_optional_date(p.date.as_deref())?;
        json_result(&food_log::list_entries(&self.database, &ctx, date)?)
    }

    #[tool(description = "Get a single food entry")]
    fn get_entry(&self, Parameters(p): Parameters<EntryIdParams>) -> Result<CallToolResult, McpError> {
        let ctx = self.context(&p.user_id)?;
        json_result(&food_log::get_entry(&self.database, &ctx, p.id)?)
    }

    #[tool(description = "Edit a food entry. Only the fields provided are changed.")]
    fn update_entry(&self, Parameters(p): Parameters<UpdateEntryParams>) -> Result<CallToolResult, McpError> {
        let ctx = self.context(&p.user_id)?;
        let data = EntryUpdate {
            date: parse_optional_date(p.date.as_deref())?,
            time: parse_optional_time(p.time.as_deref())?,
            food: p.food,
            calories: p.calories,
            protein: p.protein,
            carbs: p.carbs,
            fat: p.fat,
        };
        json_result(&food_log::update_entry(&self.database, &ctx, p.id, data)?)
    }

    #[tool(description = "Delete a food entry")]
    fn delete_entry(&self, Parameters(p): Parameters<EntryIdParams>) -> Result<CallToolResult, McpError> {
        let ctx = self.context(&p.user_id)?;
        json_result(&food_log::delete_entry(&self.database, &ctx, p.id)?)
    }

    // --- Recipes ---

    #[tool(description = "Save a named recipe with its foods and macros. Names are unique per user.")]
    fn create_recipe(&self, Parameters(p): Parameters<CreateRecipeParams>) -> Result<CallToolResult, McpError> {
        let ctx = self.context(&p.user_id)?;
        let data = RecipeCreate {
            name: p.name,
            foods: p.foods,
            macros: Macros::new(p.calories, p.protein, p.carbs, p.fat),
        };
        json_result(&recipes::create_recipe(&self.database, &ctx, data)?)
    }

    #[tool(description = "List the user's recipes by name")]
    fn list_recipes(&self, Parameters(p): Parameters<UserParams>) -> Result<CallToolResult, McpError> {
        let ctx = self.context(&p.user_id)?;
        json_result(&recipes::list_recipes(&self.database, &ctx)?)
    }

    #[tool(description = "Get a recipe with its foods and macros")]
    fn get_recipe(&self, Parameters(p): Parameters<RecipeIdParams>) -> Result<CallToolResult, McpError> {
        let ctx = self.context(&p.user_id)?;
        json_result(&recipes::get_recipe(&self.database, &ctx, p.id)?)
    }

    #[tool(description = "Update a recipe's foods and/or macros. The name cannot be changed. Entries already logged are not affected.")]
    fn update_recipe(&self, Parameters(p): Parameters<UpdateRecipeParams>) -> Result<CallToolResult, McpError> {
        let ctx = self.context(&p.user_id)?;
        let data = RecipeUpdate {
            foods: p.foods,
            calories: p.calories,
            protein: p.protein,
            carbs: p.carbs,
            fat: p.fat,
        };
        json_result(&recipes::update_recipe(&self.database, &ctx, p.id, data)?)
    }

    #[tool(description = "Delete a recipe. Entries already logged are not affected.")]
    fn delete_recipe(&self, Parameters(p): Parameters<RecipeIdParams>) -> Result<CallToolResult, McpError> {
        let ctx = self.context(&p.user_id)?;
        json_result(&recipes::delete_recipe(&self.database, &ctx, p.id)?)
    }

    #[tool(description = "Log a recipe as a food entry eaten now")]
    fn log_recipe(&self, Parameters(p): Parameters<RecipeIdParams>) -> Result<CallToolResult, McpError> {
        let ctx = self.context(&p.user_id)?;
        json_result(&recipes::log_recipe(&self.database, &ctx, p.id)?)
    }

    // --- Dashboard ---

    #[tool(description = "Today's totals, progress against goals, calorie breakdown, the last 7 days and today's entries")]
    fn dashboard(&self, Parameters(p): Parameters<UserParams>) -> Result<CallToolResult, McpError> {
        let ctx = self.context(&p.user_id)?;
        json_result(&dashboard::dashboard(&self.database, &ctx)?)
    }

    #[tool(description = "Per-day totals for the 7 days ending at end_date (default today), in Sun..Sat columns")]
    fn weekly_summary(&self, Parameters(p): Parameters<WeeklySummaryParams>) -> Result<CallToolResult, McpError> {
        let ctx = self.context(&p.user_id)?;
        let end_date = parse_optional_date(p.end_date.as_deref())?;
        json_result(&dashboard::weekly_summary(&self.database, &ctx, end_date)?)
    }

    // --- Charts and Import ---

    #[tool(description = "Write today's calorie breakdown donut and the weekly bar charts as PNG files into output_dir")]
    async fn export_charts(&self, Parameters(p): Parameters<ExportChartsParams>) -> Result<CallToolResult, McpError> {
        let ctx = self.context(&p.user_id)?;
        let database = self.database.clone();
        let output_dir = PathBuf::from(p.output_dir);

        let result = tokio::task::spawn_blocking(move || {
            charts::export_charts(&database, &ctx, &output_dir)
        })
        .await
        .map_err(|e| McpError::internal_error(format!("Chart task failed: {}", e), None))??;

        json_result(&result)
    }

    #[tool(description = "Import a legacy food log CSV (date,time,food,calories,protein,carbs,fat) for the user. Bad rows are reported and skipped.")]
    async fn import_food_log_csv(&self, Parameters(p): Parameters<ImportCsvParams>) -> Result<CallToolResult, McpError> {
        let ctx = self.context(&p.user_id)?;
        let database = self.database.clone();
        let path = PathBuf::from(p.file_path);

        let result = tokio::task::spawn_blocking(move || {
            import::import_food_log_csv(&database, &ctx, &path)
        })
        .await
        .map_err(|e| McpError::internal_error(format!("Import task failed: {}", e), None))??;

        json_result(&result)
    }
}

#[tool_handler]
impl ServerHandler for MacroTrackerService {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::LATEST,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: crate::build_info::NAME.into(),
                version: crate::build_info::VERSION.into(),
                title: Some("Macro Tracker".into()),
                icons: None,
                website_url: None,
            },
            instructions: Some(
                "Macro Tracker - daily calorie and macro logging against goals. \
                 Start with login(username) to get a user_id; call usage_instructions if unsure. \
                 Goals: get_goals/set_goals. \
                 Food log: log_food, list_entries, get/update/delete_entry. \
                 Recipes: create/list/get/update/delete_recipe, log_recipe. \
                 Progress: dashboard, weekly_summary, export_charts. \
                 Import: import_food_log_csv. Status: tracker_status."
                    .into(),
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_mapping() {
        let invalid: McpError = ToolError::InvalidInput("bad".to_string()).into();
        assert_eq!(invalid.code, rmcp::model::ErrorCode::INVALID_PARAMS);
        assert_eq!(invalid.message, "bad");

        let missing: McpError = ToolError::NotFound("Entry 3 not found".to_string()).into();
        assert_eq!(missing.code, rmcp::model::ErrorCode::INVALID_PARAMS);

        let chart: McpError = ToolError::Chart("no font".to_string()).into();
        assert_eq!(chart.code, rmcp::model::ErrorCode::INTERNAL_ERROR);
    }

    #[test]
    fn test_parse_optional_date() {
        assert_eq!(parse_optional_date(None).unwrap(), None);
        assert_eq!(parse_optional_date(Some("  ")).unwrap(), None);
        assert!(parse_optional_date(Some("2025-06-10")).unwrap().is_some());
        assert!(parse_optional_date(Some("yesterday")).is_err());
    }

    #[test]
    fn test_parse_optional_time() {
        assert_eq!(parse_optional_time(None).unwrap(), None);
        assert_eq!(parse_optional_time(Some("")).unwrap(), None);
        assert_eq!(
            parse_optional_time(Some(" 7:05 pm ")).unwrap(),
            chrono::NaiveTime::from_hms_opt(19, 5, 0)
        );
        assert!(parse_optional_time(Some("noon")).is_err());
    }

    #[test]
    fn test_unknown_user_is_invalid_params() {
        let service = MacroTrackerService::new(
            PathBuf::from(":memory:"),
            Database::in_memory().unwrap(),
            Clock::new(chrono_tz::US::Eastern),
        );
        let err = service.context("missing").unwrap_err();
        assert_eq!(err.code, rmcp::model::ErrorCode::INVALID_PARAMS);
    }
}
