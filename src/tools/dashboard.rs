//! Dashboard MCP Tools
//!
//! Today's progress against goals, the calorie breakdown and the weekly
//! summary, recomputed from stored entries on every call.

use chrono::{Days, NaiveDate};
use serde::Serialize;

use crate::aggregate::{
    calorie_breakdown, compute_progress, daily_totals, entries_on, goal_caption, weekly_rollup,
    BreakdownSlice, DayBucket, WeeklyRollup, WINDOW_DAYS,
};
use crate::context::RequestContext;
use crate::db::Database;
use crate::models::{format_amount, Entry, Goals, MacroKind, Macros};

use super::food_log::EntryView;
use super::ToolResult;

/// One macro's progress tile
#[derive(Debug, Serialize)]
pub struct MacroMetric {
    pub macro_name: MacroKind,
    pub label: &'static str,
    pub total: f64,
    pub goal: f64,
    /// "500 / 2000"
    pub display: String,
    /// Uncapped percentage of goal
    pub percent: f64,
    /// Progress bar fill, 0-100
    pub bar: u32,
}

/// Calorie breakdown for the donut chart
#[derive(Debug, Serialize)]
pub struct BreakdownView {
    pub total_kcal: f64,
    pub slices: Vec<BreakdownSlice>,
}

/// Response for dashboard
#[derive(Debug, Serialize)]
pub struct DashboardResponse {
    pub date: NaiveDate,
    pub goals: Macros,
    pub goals_are_default: bool,
    pub caption: String,
    pub totals: Macros,
    pub metrics: Vec<MacroMetric>,
    /// Absent when there is nothing to chart
    pub calorie_breakdown: Option<BreakdownView>,
    pub weekly: Vec<DayBucket>,
    pub entries: Vec<EntryView>,
}

/// Response for weekly_summary
#[derive(Debug, Serialize)]
pub struct WeeklySummaryResponse {
    pub window_start: NaiveDate,
    pub window_end: NaiveDate,
    pub days: Vec<DayBucket>,
    pub totals: Macros,
}

/// Progress bar fill: whole percent, capped at 100
pub fn progress_bar(percent: f64) -> u32 {
    percent.floor().clamp(0.0, 100.0) as u32
}

/// Entries of the 7-day window ending at `end`
pub(crate) fn load_window(db: &Database, ctx: &RequestContext, end: NaiveDate) -> ToolResult<Vec<Entry>> {
    let start = end
        .checked_sub_days(Days::new(WINDOW_DAYS - 1))
        .unwrap_or(NaiveDate::MIN);
    let conn = db.get_conn()?;
    Ok(Entry::list_in_range(&conn, &ctx.user_id, start, end)?)
}

pub fn dashboard(db: &Database, ctx: &RequestContext) -> ToolResult<DashboardResponse> {
    let goals = {
        let conn = db.get_conn()?;
        Goals::get_or_default(&conn, &ctx.user_id)?
    };
    let entries = load_window(db, ctx, ctx.today)?;

    let totals = daily_totals(&entries, ctx.today);
    let progress = compute_progress(&totals, &goals.targets);

    let metrics = MacroKind::ALL
        .iter()
        .map(|&kind| {
            let total = totals.get(kind);
            let goal = goals.targets.get(kind);
            let percent = progress.get(kind);
            MacroMetric {
                macro_name: kind,
                label: kind.label(),
                total,
                goal,
                display: format!("{} / {}", format_amount(total), format_amount(goal)),
                percent,
                bar: progress_bar(percent),
            }
        })
        .collect();

    let breakdown = calorie_breakdown(&totals);
    let calorie_breakdown = (!breakdown.is_empty()).then(|| BreakdownView {
        total_kcal: breakdown.total_kcal(),
        slices: breakdown.slices(),
    });

    let weekly = weekly_rollup(&entries, ctx.today);
    let today_entries = entries_on(&entries, ctx.today)
        .into_iter()
        .map(EntryView::from)
        .collect();

    tracing::debug!(user_id = %ctx.user_id, date = %ctx.today, "Built dashboard");

    Ok(DashboardResponse {
        date: ctx.today,
        caption: goal_caption(&goals.targets),
        goals_are_default: goals.is_default(),
        goals: goals.targets,
        totals,
        metrics,
        calorie_breakdown,
        weekly: weekly.days,
        entries: today_entries,
    })
}

/// Rollup of the 7 days ending at `end_date` (today when absent)
pub fn weekly_summary(
    db: &Database,
    ctx: &RequestContext,
    end_date: Option<NaiveDate>,
) -> ToolResult<WeeklySummaryResponse> {
    let rollup = load_rollup(db, ctx, end_date.unwrap_or(ctx.today))?;
    Ok(WeeklySummaryResponse {
        totals: rollup.totals(),
        window_start: rollup.window_start,
        window_end: rollup.window_end,
        days: rollup.days,
    })
}

pub(crate) fn load_rollup(db: &Database, ctx: &RequestContext, end: NaiveDate) -> ToolResult<WeeklyRollup> {
    let entries = load_window(db, ctx, end)?;
    Ok(weekly_rollup(&entries, end))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::EntryCreate;
    use crate::tools::food_log::{add_entry, log_food};
    use crate::tools::goals::set_goals;
    use crate::tools::test_support::{context_for, setup, today};

    fn log_on(db: &Database, ctx: &RequestContext, date: NaiveDate, macros: Macros) {
        add_entry(
            db,
            ctx,
            &EntryCreate {
                date,
                time: None,
                food: "food".to_string(),
                macros,
            },
        )
        .unwrap();
    }

    #[test]
    fn test_progress_bar() {
        assert_eq!(progress_bar(14.3), 14);
        assert_eq!(progress_bar(99.99), 99);
        assert_eq!(progress_bar(150.0), 100);
        assert_eq!(progress_bar(0.0), 0);
    }

    #[test]
    fn test_single_entry_dashboard() {
        let (db, ctx) = setup();
        log_food(&db, &ctx, "lunch", Macros::new(500.0, 30.0, 60.0, 10.0)).unwrap();

        let dash = dashboard(&db, &ctx).unwrap();
        assert!(dash.goals_are_default);
        assert_eq!(dash.totals, Macros::new(500.0, 30.0, 60.0, 10.0));

        let percents: Vec<f64> = dash.metrics.iter().map(|m| m.percent).collect();
        assert_eq!(percents, vec![25.0, 20.0, 24.0, 14.3]);
        assert_eq!(dash.metrics[0].display, "500 / 2000");
        assert_eq!(dash.metrics[3].bar, 14);

        let breakdown = dash.calorie_breakdown.unwrap();
        assert_eq!(breakdown.total_kcal, 30.0 * 4.0 + 60.0 * 4.0 + 10.0 * 9.0);
        assert_eq!(dash.entries.len(), 1);
        assert_eq!(dash.weekly.len(), 7);
    }

    #[test]
    fn test_empty_day_dashboard() {
        let (db, ctx) = setup();
        let dash = dashboard(&db, &ctx).unwrap();

        assert!(dash.totals.is_zero());
        assert!(dash.calorie_breakdown.is_none());
        assert!(dash.metrics.iter().all(|m| m.percent == 0.0 && m.bar == 0));
        assert!(dash.weekly.iter().all(|b| b.totals.is_zero()));
    }

    #[test]
    fn test_zero_goal_shows_zero_progress() {
        let (db, ctx) = setup();
        set_goals(&db, &ctx, Macros::new(2000.0, 0.0, 250.0, 70.0)).unwrap();
        log_food(&db, &ctx, "rice", Macros::new(200.0, 0.0, 45.0, 0.5)).unwrap();
        log_food(&db, &ctx, "chicken", Macros::new(250.0, 40.0, 0.0, 8.0)).unwrap();

        let dash = dashboard(&db, &ctx).unwrap();
        let protein = &dash.metrics[1];
        assert_eq!(protein.macro_name, MacroKind::Protein);
        assert_eq!(protein.total, 40.0);
        assert_eq!(protein.percent, 0.0);
        assert_eq!(dash.caption, "2000 calories, 0 protein, 250 carbs, 70 fat");
    }

    #[test]
    fn test_weekly_summary_window() {
        let (db, ctx) = setup();
        let other = context_for(&db, "other");
        let back = |n| today().checked_sub_days(Days::new(n)).unwrap();

        log_on(&db, &ctx, back(0), Macros::new(100.0, 1.0, 1.0, 1.0));
        log_on(&db, &ctx, back(3), Macros::new(200.0, 2.0, 2.0, 2.0));
        log_on(&db, &ctx, back(6), Macros::new(300.0, 3.0, 3.0, 3.0));
        log_on(&db, &ctx, back(7), Macros::new(5000.0, 0.0, 0.0, 0.0));
        log_on(&db, &other, back(1), Macros::new(7000.0, 0.0, 0.0, 0.0));

        let summary = weekly_summary(&db, &ctx, None).unwrap();
        assert_eq!(summary.window_end, today());
        assert_eq!(summary.window_start, back(6));
        assert_eq!(summary.totals.calories, 600.0);

        let labels: Vec<&str> = summary.days.iter().map(|b| b.label).collect();
        assert_eq!(labels, vec!["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"]);

        let earlier = weekly_summary(&db, &ctx, Some(back(7))).unwrap();
        assert_eq!(earlier.window_start, back(13));
        assert_eq!(earlier.totals.calories, 5000.0);
    }
}
