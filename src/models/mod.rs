//! Data models
//!
//! Users, food log entries, goals and recipes, with their row-level CRUD.

mod entry;
mod goals;
mod macros;
mod recipe;
mod user;

pub use entry::{display_time, Entry, EntryCreate, EntryUpdate};
pub use goals::{Goals, DEFAULT_GOALS};
pub use macros::{format_amount, MacroKind, Macros, ValidationError};
pub use recipe::{clean_food_list, Recipe, RecipeCreate, RecipeUpdate};
pub use user::User;
