use chrono::{DateTime, Utc};

use crate::cli::{open_store, warn_if_unsaved};
use crate::error::{Result, TallyError};
use crate::fmt::{display_date, money, short_id};
use crate::models::Category;
use crate::settings::load_settings;

pub fn run(
    id: &str,
    amount: Option<f64>,
    category: Option<Category>,
    note: Option<String>,
    date: Option<DateTime<Utc>>,
) -> Result<()> {
    let mut store = open_store()?;
    let mut expense = store.find_by_prefix(id)?.clone();

    if let Some(a) = amount {
        expense.amount = a;
    }
    if let Some(c) = category {
        expense.category = c;
    }
    if let Some(n) = note {
        expense.note = n;
    }
    if let Some(d) = date {
        expense.date = d;
    }

    let full_id = expense.id.clone();
    if !store.update(expense)? {
        return Err(TallyError::NotFound(full_id));
    }

    let symbol = load_settings().currency_symbol;
    if let Some(updated) = store.get(&full_id) {
        println!(
            "Updated {}: {} {} on {}",
            short_id(&updated.id),
            money(&symbol, updated.amount),
            updated.category,
            display_date(&updated.date)
        );
    }
    warn_if_unsaved(&store);
    Ok(())
}
