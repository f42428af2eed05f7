use chrono::{DateTime, Local, Utc};

use crate::cli::{open_store, warn_if_unsaved};
use crate::error::Result;
use crate::fmt::{display_date, money, short_id};
use crate::models::{Category, NewExpense};
use crate::settings::load_settings;

/// Midnight UTC of today's local calendar date, the same instant a bare
/// `--date YYYY-MM-DD` produces.
pub(crate) fn today() -> DateTime<Utc> {
    Local::now()
        .date_naive()
        .and_hms_opt(0, 0, 0)
        .map(|dt| dt.and_utc())
        .unwrap_or_else(Utc::now)
}

pub fn run(amount: f64, category: Category, note: &str, date: Option<DateTime<Utc>>) -> Result<()> {
    let mut store = open_store()?;
    let expense = store.add(NewExpense {
        amount,
        category,
        note: note.to_string(),
        date: date.unwrap_or_else(today),
    })?;

    let symbol = load_settings().currency_symbol;
    println!(
        "Added {}: {} {} on {}",
        short_id(&expense.id),
        money(&symbol, expense.amount),
        expense.category,
        display_date(&expense.date)
    );
    warn_if_unsaved(&store);
    Ok(())
}
