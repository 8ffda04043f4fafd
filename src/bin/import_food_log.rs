//! Import a legacy per-user food log CSV into the database
//!
//! Usage: import_food_log <username> <csv-file>

use std::path::PathBuf;

use macro_tracker::config::Config;
use macro_tracker::context::Clock;
use macro_tracker::db::{migrations, Database};
use macro_tracker::tools::{import, session};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("macro_tracker=info".parse()?),
        )
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = std::env::args().collect();
    if args.len() != 3 {
        eprintln!("Usage: {} <username> <csv-file>", args[0]);
        std::process::exit(2);
    }
    let username = &args[1];
    let csv_path = PathBuf::from(&args[2]);

    let config = Config::from_env()?;
    println!("Database path: {}", config.database_path.display());

    if let Some(parent) = config.database_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let database = Database::new(&config.database_path)?;
    database.with_conn(migrations::run_migrations)?;

    let login = session::login(&database, username)?;
    if login.created {
        println!("Created user '{}' ({})", login.username, login.user_id);
    }

    let clock = Clock::new(config.timezone);
    let ctx = session::resolve_context(&database, &clock, &login.user_id)?;
    let result = import::import_food_log_csv(&database, &ctx, &csv_path)?;

    println!("Imported {} of {} rows ({})", result.imported, result.total_rows, result.date_range);
    for error in &result.errors {
        println!("  {}", error);
    }
    if result.skipped > result.errors.len() {
        println!("  ... and {} more", result.skipped - result.errors.len());
    }

    Ok(())
}
