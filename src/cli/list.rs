use comfy_table::{Cell, CellAlignment, Table};

use crate::cli::{open_store, FilterArgs};
use crate::error::Result;
use crate::filters::{apply, ExpenseFilter};
use crate::fmt::{display_date, money, short_id};
use crate::models::{from_cents, sum_cents, Expense};
use crate::settings::load_settings;

pub(crate) fn expense_table(expenses: &[&Expense], symbol: &str) -> Table {
    let mut table = Table::new();
    table.set_header(vec!["ID", "Date", "Category", "Amount", "Note"]);
    for e in expenses {
        table.add_row(vec![
            Cell::new(short_id(&e.id)),
            Cell::new(display_date(&e.date)),
            Cell::new(e.category.name()),
            Cell::new(money(symbol, e.amount)).set_alignment(CellAlignment::Right),
            Cell::new(&e.note),
        ]);
    }
    table
}

pub fn run(filters: FilterArgs) -> Result<()> {
    let store = open_store()?;
    if store.is_empty() {
        println!("No expenses yet. Add one with `tally add <amount>`.");
        return Ok(());
    }

    let filter = ExpenseFilter::from(filters);
    let hits = apply(store.expenses(), &filter);
    if hits.is_empty() {
        println!("No expenses match these filters.");
        return Ok(());
    }

    let symbol = load_settings().currency_symbol;
    let total = from_cents(sum_cents(hits.iter().map(|e| e.amount)));
    println!("Expenses\n{}", expense_table(&hits, &symbol));
    if filter.is_empty() {
        println!("{} expenses, total {}", hits.len(), money(&symbol, total));
    } else {
        println!("{} of {} expenses, total {}", hits.len(), store.len(), money(&symbol, total));
    }
    Ok(())
}
