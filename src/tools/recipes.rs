//! Recipe MCP Tools
//!
//! Tools for saving named macro templates and logging them as entries.

use serde::Serialize;

use crate::context::RequestContext;
use crate::db::Database;
use crate::models::{clean_food_list, EntryCreate, Macros, Recipe, RecipeCreate, RecipeUpdate, ValidationError};

use super::food_log::{add_entry, EntryView};
use super::{required_label, ToolError, ToolResult};

/// Recipe summary for listing
#[derive(Debug, Serialize)]
pub struct RecipeSummary {
    pub id: i64,
    pub name: String,
    pub food_count: usize,
    pub calories: f64,
}

/// Response for list_recipes
#[derive(Debug, Serialize)]
pub struct ListRecipesResponse {
    pub recipes: Vec<RecipeSummary>,
    pub count: usize,
}

/// Full recipe detail
#[derive(Debug, Serialize)]
pub struct RecipeDetail {
    pub id: i64,
    pub name: String,
    pub foods: Vec<String>,
    pub macros: Macros,
    pub created_at: String,
    pub updated_at: String,
}

impl From<Recipe> for RecipeDetail {
    fn from(recipe: Recipe) -> Self {
        Self {
            id: recipe.id,
            name: recipe.name,
            foods: recipe.foods,
            macros: recipe.macros,
            created_at: recipe.created_at,
            updated_at: recipe.updated_at,
        }
    }
}

/// Response for delete_recipe
#[derive(Debug, Serialize)]
pub struct RecipeDeleteResponse {
    pub success: bool,
    pub deleted_id: i64,
}

fn not_found(id: i64) -> ToolError {
    ToolError::NotFound(format!("Recipe {} not found", id))
}

/// Trimmed, non-empty food labels, at least one
fn validated_foods<I, S>(foods: I) -> Result<Vec<String>, ValidationError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let foods = clean_food_list(foods);
    if foods.is_empty() {
        return Err(ValidationError::Empty("foods"));
    }
    Ok(foods)
}

// ============================================================================
// Recipe Tools
// ============================================================================

/// Create a new recipe
pub fn create_recipe(
    db: &Database,
    ctx: &RequestContext,
    data: RecipeCreate,
) -> ToolResult<RecipeDetail> {
    let data = RecipeCreate {
        name: required_label(&data.name, "recipe name")?,
        foods: validated_foods(&data.foods)?,
        macros: data.macros,
    };
    data.macros.validate()?;

    let conn = db.get_conn()?;
    if Recipe::get_by_name(&conn, &ctx.user_id, &data.name)?.is_some() {
        return Err(duplicate_name(&data.name));
    }

    let recipe = Recipe::create(&conn, &ctx.user_id, &data).map_err(|e| {
        if e.is_constraint_violation() {
            duplicate_name(&data.name)
        } else {
            e.into()
        }
    })?;
    tracing::info!(user_id = %ctx.user_id, recipe_id = recipe.id, name = %recipe.name, "Created recipe");

    Ok(recipe.into())
}

fn duplicate_name(name: &str) -> ToolError {
    ToolError::Conflict(format!("A recipe named '{}' already exists", name))
}

pub fn get_recipe(db: &Database, ctx: &RequestContext, id: i64) -> ToolResult<RecipeDetail> {
    let conn = db.get_conn()?;
    Recipe::get_by_id(&conn, &ctx.user_id, id)?
        .map(RecipeDetail::from)
        .ok_or_else(|| not_found(id))
}

/// List the user's recipes by name
pub fn list_recipes(db: &Database, ctx: &RequestContext) -> ToolResult<ListRecipesResponse> {
    let conn = db.get_conn()?;
    let recipes: Vec<RecipeSummary> = Recipe::list_for_user(&conn, &ctx.user_id)?
        .into_iter()
        .map(|r| RecipeSummary {
            id: r.id,
            food_count: r.foods.len(),
            calories: r.macros.calories,
            name: r.name,
        })
        .collect();

    Ok(ListRecipesResponse {
        count: recipes.len(),
        recipes,
    })
}

/// Change a recipe's foods and/or macros
pub fn update_recipe(
    db: &Database,
    ctx: &RequestContext,
    id: i64,
    data: RecipeUpdate,
) -> ToolResult<RecipeDetail> {
    let conn = db.get_conn()?;
    let existing = Recipe::get_by_id(&conn, &ctx.user_id, id)?.ok_or_else(|| not_found(id))?;

    let foods = match &data.foods {
        Some(foods) => validated_foods(foods)?,
        None => existing.foods.clone(),
    };
    let macros = data.merged_macros(&existing.macros);
    macros.validate()?;

    let recipe = Recipe::update(&conn, &ctx.user_id, id, &foods, &macros)?
        .ok_or_else(|| not_found(id))?;
    tracing::info!(user_id = %ctx.user_id, recipe_id = id, "Updated recipe");

    Ok(recipe.into())
}

pub fn delete_recipe(
    db: &Database,
    ctx: &RequestContext,
    id: i64,
) -> ToolResult<RecipeDeleteResponse> {
    let conn = db.get_conn()?;
    if !Recipe::delete(&conn, &ctx.user_id, id)? {
        return Err(not_found(id));
    }
    tracing::info!(user_id = %ctx.user_id, recipe_id = id, "Deleted recipe");

    Ok(RecipeDeleteResponse {
        success: true,
        deleted_id: id,
    })
}

/// Log a recipe as a new entry eaten now
pub fn log_recipe(db: &Database, ctx: &RequestContext, id: i64) -> ToolResult<EntryView> {
    let recipe = {
        let conn = db.get_conn()?;
        Recipe::get_by_id(&conn, &ctx.user_id, id)?.ok_or_else(|| not_found(id))?
    };

    let data = EntryCreate {
        date: ctx.today,
        time: Some(ctx.now),
        food: recipe.name,
        macros: recipe.macros,
    };
    add_entry(db, ctx, &data)
}
