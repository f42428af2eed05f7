use crate::db::last_updated;
use crate::error::Result;
use crate::fmt::{display_date, format_bytes, money};
use crate::logging::LOG_ENV;
use crate::models::{from_cents, sum_cents};
use crate::settings::{db_path, load_settings, settings_file_exists};
use crate::storage::{SqliteStore, EXPENSES_KEY};
use crate::store::ExpenseStore;

pub fn run() -> Result<()> {
    let settings = load_settings();
    let db_path = db_path();

    println!(
        "Settings:   {}",
        if settings_file_exists() { "saved" } else { "(defaults, run `tally init`)" }
    );
    println!("Data dir:   {}", settings.data_dir);
    println!("Database:   {}", db_path.display());
    println!("Currency:   {}", settings.currency_symbol);
    println!("Log filter: {}", std::env::var(LOG_ENV).unwrap_or_else(|_| "warn".into()));

    if !db_path.exists() {
        println!();
        println!("Database not found. Run `tally init` to set up.");
        return Ok(());
    }

    let size = std::fs::metadata(&db_path)?.len();
    println!("DB size:    {}", format_bytes(size));

    let store = ExpenseStore::open(SqliteStore::open(&db_path)?);
    let saved = last_updated(store.backend().connection(), EXPENSES_KEY)?;
    let total = from_cents(sum_cents(store.expenses().iter().map(|e| e.amount)));

    println!();
    println!("Expenses:   {}", store.len());
    println!("Total:      {}", money(&settings.currency_symbol, total));
    // Sorted newest first.
    if let (Some(newest), Some(oldest)) = (store.expenses().first(), store.expenses().last()) {
        println!(
            "Range:      {} to {}",
            display_date(&oldest.date),
            display_date(&newest.date)
        );
    }
    println!("Last saved: {}", saved.as_deref().unwrap_or("never"));
    Ok(())
}
