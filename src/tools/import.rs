//! Legacy food log import
//!
//! Early versions of the tracker kept each user's log as a CSV file with the
//! header `date,time,food,calories,protein,carbs,fat`. These tools load such
//! a file into the context user's food log.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use chrono::NaiveDate;
use serde::Serialize;

use crate::context::RequestContext;
use crate::db::Database;
use crate::models::{Entry, EntryCreate, Macros};

use super::{parse_date, parse_time, required_label, ToolError, ToolResult};

const EXPECTED_FIELDS: usize = 7;
const MAX_REPORTED_ERRORS: usize = 10;

/// Response for the CSV import
#[derive(Debug, Serialize)]
pub struct ImportResponse {
    pub success: bool,
    pub source: String,
    pub total_rows: usize,
    pub imported: usize,
    pub skipped: usize,
    pub errors: Vec<String>,
    pub date_range: String,
}

/// Split one CSV line, honouring double-quoted fields
fn split_csv_line(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '"' if in_quotes && chars.peek() == Some(&'"') => {
                current.push('"');
                chars.next();
            }
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => fields.push(std::mem::take(&mut current)),
            _ => current.push(c),
        }
    }
    fields.push(current);
    fields
}

fn parse_amount(raw: &str, field: &str) -> Result<f64, String> {
    raw.trim()
        .parse::<f64>()
        .map_err(|_| format!("Invalid {} value '{}'", field, raw.trim()))
}

/// Turn one data row into an entry, or say why not
fn parse_row(line: &str) -> Result<EntryCreate, String> {
    let fields = split_csv_line(line);
    if fields.len() < EXPECTED_FIELDS {
        return Err(format!(
            "Expected {} fields, found {}",
            EXPECTED_FIELDS,
            fields.len()
        ));
    }

    let date = parse_date(&fields[0]).map_err(|e| e.to_string())?;
    let time = match fields[1].trim() {
        "" => None,
        raw => Some(parse_time(raw).map_err(|e| e.to_string())?),
    };
    let food = required_label(&fields[2], "food").map_err(|e| e.to_string())?;

    let macros = Macros::new(
        parse_amount(&fields[3], "calories")?,
        parse_amount(&fields[4], "protein")?,
        parse_amount(&fields[5], "carbs")?,
        parse_amount(&fields[6], "fat")?,
    );
    macros.validate().map_err(|e| e.to_string())?;

    Ok(EntryCreate {
        date,
        time,
        food,
        macros,
    })
}

/// Decode one raw line, dropping a trailing CR and a leading byte order mark
fn decode_line(raw: Vec<u8>) -> Result<String, String> {
    let mut line = String::from_utf8(raw)
        .map_err(|e| format!("Not valid UTF-8 (byte {})", e.utf8_error().valid_up_to()))?;
    if line.ends_with('\r') {
        line.pop();
    }
    if let Some(stripped) = line.strip_prefix('\u{feff}') {
        line = stripped.to_string();
    }
    Ok(line)
}

/// Import every valid row from `reader`; bad rows are reported and skipped
///
/// All inserts run in one transaction, so a store failure leaves the log as
/// it was.
pub fn import_food_log<R: BufRead>(
    db: &Database,
    ctx: &RequestContext,
    reader: R,
    source: &str,
) -> ToolResult<ImportResponse> {
    let mut rows = Vec::new();
    let mut errors = Vec::new();
    let mut skipped = 0;

    for (line_num, raw) in reader.split(b'\n').enumerate() {
        let row_num = line_num + 1;

        let line = match decode_line(raw?) {
            Ok(line) => line,
            Err(e) => {
                errors.push(format!("Row {}: {}", row_num, e));
                skipped += 1;
                continue;
            }
        };

        // Skip header row
        if line_num == 0 && line.trim_start().starts_with("date,") {
            continue;
        }

        // Skip empty lines
        if line.trim().is_empty() {
            continue;
        }

        match parse_row(&line) {
            Ok(data) => rows.push(data),
            Err(e) => {
                errors.push(format!("Row {}: {}", row_num, e));
                skipped += 1;
            }
        }
    }

    db.with_conn_mut(|conn| {
        let tx = conn.transaction()?;
        for data in &rows {
            Entry::create(&tx, &ctx.user_id, data)?;
        }
        tx.commit()?;
        Ok(())
    })?;

    let imported = rows.len();
    if skipped > 0 {
        tracing::warn!(user_id = %ctx.user_id, skipped, "Skipped invalid rows during import");
    }
    tracing::info!(user_id = %ctx.user_id, imported, source, "Imported food log");

    let first_date: Option<NaiveDate> = rows.iter().map(|r| r.date).min();
    let last_date: Option<NaiveDate> = rows.iter().map(|r| r.date).max();
    let date_range = match (first_date, last_date) {
        (Some(start), Some(end)) => format!("{} to {}", start, end),
        _ => "N/A".to_string(),
    };
    errors.truncate(MAX_REPORTED_ERRORS);

    Ok(ImportResponse {
        success: skipped == 0,
        source: source.to_string(),
        total_rows: imported + skipped,
        imported,
        skipped,
        errors,
        date_range,
    })
}

/// Import a legacy CSV file from disk
pub fn import_food_log_csv(
    db: &Database,
    ctx: &RequestContext,
    path: &Path,
) -> ToolResult<ImportResponse> {
    let file = File::open(path).map_err(|e| {
        ToolError::InvalidInput(format!("Failed to open file '{}': {}", path.display(), e))
    })?;
    import_food_log(db, ctx, BufReader::new(file), &path.display().to_string())
}
