//! Food Log MCP Tools
//!
//! Logging, listing, editing and deleting food entries.

use chrono::NaiveDate;
use serde::Serialize;

use crate::aggregate::{daily_totals, entries_on};
use crate::context::RequestContext;
use crate::db::Database;
use crate::models::{display_time, Entry, EntryCreate, EntryUpdate, Macros};

use super::{required_label, ToolError, ToolResult};

/// Entry as shown to the user
#[derive(Debug, Clone, Serialize)]
pub struct EntryView {
    pub id: i64,
    pub date: NaiveDate,
    pub time: Option<String>, // "2:05 PM"
    pub food: String,
    pub calories: f64,
    pub protein: f64,
    pub carbs: f64,
    pub fat: f64,
}

impl From<&Entry> for EntryView {
    fn from(entry: &Entry) -> Self {
        Self {
            id: entry.id,
            date: entry.date,
            time: entry.time.as_ref().map(display_time),
            food: entry.food.clone(),
            calories: entry.macros.calories,
            protein: entry.macros.protein,
            carbs: entry.macros.carbs,
            fat: entry.macros.fat,
        }
    }
}

/// Response for list_entries
#[derive(Debug, Serialize)]
pub struct ListEntriesResponse {
    pub date: NaiveDate,
    pub entries: Vec<EntryView>,
    pub count: usize,
    pub totals: Macros,
}

/// Response for delete_entry
#[derive(Debug, Serialize)]
pub struct DeleteEntryResponse {
    pub success: bool,
    pub deleted_id: i64,
}

fn not_found(id: i64) -> ToolError {
    ToolError::NotFound(format!("Entry {} not found", id))
}

/// Log a food eaten now
pub fn log_food(
    db: &Database,
    ctx: &RequestContext,
    food: &str,
    macros: Macros,
) -> ToolResult<EntryView> {
    let food = required_label(food, "food")?;
    macros.validate()?;

    let data = EntryCreate {
        date: ctx.today,
        time: Some(ctx.now),
        food,
        macros,
    };
    add_entry(db, ctx, &data)
}

/// Insert a fully specified entry for the context's user
pub(crate) fn add_entry(
    db: &Database,
    ctx: &RequestContext,
    data: &EntryCreate,
) -> ToolResult<EntryView> {
    let conn = db.get_conn()?;
    let entry = Entry::create(&conn, &ctx.user_id, data)?;
    tracing::info!(user_id = %ctx.user_id, entry_id = entry.id, date = %entry.date, "Logged entry");
    Ok(EntryView::from(&entry))
}

/// Entries for a day (today when absent), in the order they were eaten
pub fn list_entries(
    db: &Database,
    ctx: &RequestContext,
    date: Option<NaiveDate>,
) -> ToolResult<ListEntriesResponse> {
    let date = date.unwrap_or(ctx.today);

    let conn = db.get_conn()?;
    let entries = Entry::list_in_range(&conn, &ctx.user_id, date, date)?;

    let views: Vec<EntryView> = entries_on(&entries, date)
        .into_iter()
        .map(EntryView::from)
        .collect();

    Ok(ListEntriesResponse {
        date,
        count: views.len(),
        entries: views,
        totals: daily_totals(&entries, date),
    })
}

pub fn get_entry(db: &Database, ctx: &RequestContext, id: i64) -> ToolResult<EntryView> {
    let conn = db.get_conn()?;
    Entry::get_by_id(&conn, &ctx.user_id, id)?
        .map(|e| EntryView::from(&e))
        .ok_or_else(|| not_found(id))
}

/// Edit an entry; fields left out keep their value
pub fn update_entry(
    db: &Database,
    ctx: &RequestContext,
    id: i64,
    data: EntryUpdate,
) -> ToolResult<EntryView> {
    if data.is_empty() {
        return Err(ToolError::InvalidInput("No fields to update".to_string()));
    }

    let conn = db.get_conn()?;
    let existing = Entry::get_by_id(&conn, &ctx.user_id, id)?.ok_or_else(|| not_found(id))?;

    let mut merged = data.merged(&existing);
    merged.food = required_label(&merged.food, "food")?;
    merged.macros.validate()?;

    let entry = Entry::update(&conn, &ctx.user_id, id, &merged)?.ok_or_else(|| not_found(id))?;
    tracing::info!(user_id = %ctx.user_id, entry_id = id, "Updated entry");

    Ok(EntryView::from(&entry))
}

pub fn delete_entry(db: &Database, ctx: &RequestContext, id: i64) -> ToolResult<DeleteEntryResponse> {
    let conn = db.get_conn()?;
    if !Entry::delete(&conn, &ctx.user_id, id)? {
        return Err(not_found(id));
    }
    tracing::info!(user_id = %ctx.user_id, entry_id = id, "Deleted entry");

    Ok(DeleteEntryResponse {
        success: true,
        deleted_id: id,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::test_support::{context_for, setup, today};
    use chrono::{Days, NaiveTime};

    #[test]
    fn test_log_food_uses_context_clock() {
        let (db, ctx) = setup();

        let view = log_food(&db, &ctx, "  Greek yogurt ", Macros::new(150.0, 15.0, 8.0, 4.0)).unwrap();
        assert_eq!(view.date, today());
        assert_eq!(view.time.as_deref(), Some("12:30 PM"));
        assert_eq!(view.food, "Greek yogurt");
    }

    #[test]
    fn test_log_food_rejects_bad_input() {
        let (db, ctx) = setup();

        assert!(matches!(
            log_food(&db, &ctx, "eggs", Macros::new(-5.0, 0.0, 0.0, 0.0)),
            Err(ToolError::InvalidInput(_))
        ));
        assert!(matches!(
            log_food(&db, &ctx, " ", Macros::zero()),
            Err(ToolError::InvalidInput(_))
        ));
        assert_eq!(list_entries(&db, &ctx, None).unwrap().count, 0);
    }

    #[test]
    fn test_list_entries_sorted_with_totals() {
        let (db, ctx) = setup();
        let at = |h, m| RequestContext {
            now: NaiveTime::from_hms_opt(h, m, 0).unwrap(),
            ..ctx.clone()
        };

        log_food(&db, &at(19, 0), "dinner", Macros::new(700.0, 40.0, 80.0, 20.0)).unwrap();
        log_food(&db, &at(7, 45), "breakfast", Macros::new(300.0, 20.0, 30.0, 10.0)).unwrap();
        add_entry(
            &db,
            &ctx,
            &EntryCreate {
                date: today(),
                time: None,
                food: "snack".to_string(),
                macros: Macros::new(100.0, 0.0, 20.0, 1.0),
            },
        )
        .unwrap();

        let yesterday = today().checked_sub_days(Days::new(1)).unwrap();
        add_entry(
            &db,
            &ctx,
            &EntryCreate {
                date: yesterday,
                time: None,
                food: "old".to_string(),
                macros: Macros::new(999.0, 0.0, 0.0, 0.0),
            },
        )
        .unwrap();

        let listed = list_entries(&db, &ctx, None).unwrap();
        let foods: Vec<&str> = listed.entries.iter().map(|e| e.food.as_str()).collect();
        assert_eq!(foods, vec!["breakfast", "dinner", "snack"]);
        assert_eq!(listed.totals, Macros::new(1100.0, 60.0, 130.0, 31.0));

        let past = list_entries(&db, &ctx, Some(yesterday)).unwrap();
        assert_eq!(past.count, 1);
    }

    #[test]
    fn test_update_merges_fields() {
        let (db, ctx) = setup();
        let logged = log_food(&db, &ctx, "oats", Macros::new(300.0, 10.0, 50.0, 5.0)).unwrap();

        let updated = update_entry(
            &db,
            &ctx,
            logged.id,
            EntryUpdate {
                protein: Some(12.0),
                food: Some("steel cut oats".to_string()),
                ..Default::default()
            },
        )
        .unwrap();

        assert_eq!(updated.food, "steel cut oats");
        assert_eq!(updated.protein, 12.0);
        assert_eq!(updated.calories, 300.0);
        assert_eq!(updated.time, logged.time);
    }

    #[test]
    fn test_update_validates_and_requires_fields() {
        let (db, ctx) = setup();
        let logged = log_food(&db, &ctx, "oats", Macros::new(300.0, 10.0, 50.0, 5.0)).unwrap();

        assert!(matches!(
            update_entry(&db, &ctx, logged.id, EntryUpdate::default()),
            Err(ToolError::InvalidInput(_))
        ));
        assert!(matches!(
            update_entry(
                &db,
                &ctx,
                logged.id,
                EntryUpdate {
                    fat: Some(-1.0),
                    ..Default::default()
                }
            ),
            Err(ToolError::InvalidInput(_))
        ));
        assert_eq!(get_entry(&db, &ctx, logged.id).unwrap().fat, 5.0);
    }

    #[test]
    fn test_other_users_entries_are_not_found() {
        let (db, alice) = setup();
        let bob = context_for(&db, "bob");
        let logged = log_food(&db, &alice, "oats", Macros::new(300.0, 10.0, 50.0, 5.0)).unwrap();

        assert!(matches!(get_entry(&db, &bob, logged.id), Err(ToolError::NotFound(_))));
        assert!(matches!(delete_entry(&db, &bob, logged.id), Err(ToolError::NotFound(_))));
        assert!(matches!(
            update_entry(
                &db,
                &bob,
                logged.id,
                EntryUpdate {
                    calories: Some(1.0),
                    ..Default::default()
                }
            ),
            Err(ToolError::NotFound(_))
        ));

        assert!(delete_entry(&db, &alice, logged.id).unwrap().success);
        assert!(matches!(get_entry(&db, &alice, logged.id), Err(ToolError::NotFound(_))));
    }
}
