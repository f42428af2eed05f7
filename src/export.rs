use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{Local, NaiveDate};

use crate::error::Result;
use crate::models::Expense;

pub const CSV_HEADER: [&str; 5] = ["ID", "Amount", "Category", "Note", "Date"];

fn local_datetime(expense: &Expense) -> String {
    expense
        .date
        .with_timezone(&Local)
        .format("%Y-%m-%d %H:%M:%S")
        .to_string()
}

/// Write `expenses` as CSV in the order given. Fields containing a comma,
/// quote or newline are quoted with inner quotes doubled.
pub fn write_csv<'a, W, I>(expenses: I, writer: W) -> Result<usize>
where
    W: Write,
    I: IntoIterator<Item = &'a Expense>,
{
    let mut wtr = csv::WriterBuilder::new()
        .quote_style(csv::QuoteStyle::Necessary)
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(writer);
    wtr.write_record(CSV_HEADER)?;

    let mut rows = 0usize;
    for expense in expenses {
        let amount = format!("{:.2}", expense.amount);
        let date = local_datetime(expense);
        wtr.write_record([
            expense.id.as_str(),
            amount.as_str(),
            expense.category.name(),
            expense.note.as_str(),
            date.as_str(),
        ])?;
        rows += 1;
    }
    wtr.flush()?;
    Ok(rows)
}

/// `<data_dir>/exports/expenses-YYYY-MM-DD.csv`
pub fn default_export_path(data_dir: &Path, today: NaiveDate) -> PathBuf {
    data_dir
        .join("exports")
        .join(format!("expenses-{}.csv", today.format("%Y-%m-%d")))
}

pub fn export_to_file<'a, I>(expenses: I, path: &Path) -> Result<usize>
where
    I: IntoIterator<Item = &'a Expense>,
{
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let file = std::fs::File::create(path)?;
    write_csv(expenses, file)
}
