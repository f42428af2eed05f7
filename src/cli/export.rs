use std::path::PathBuf;

use chrono::Local;

use crate::cli::{open_store, FilterArgs};
use crate::error::Result;
use crate::export::{default_export_path, export_to_file};
use crate::filters::{apply, ExpenseFilter};
use crate::settings::get_data_dir;

pub fn run(filters: FilterArgs, output: Option<String>) -> Result<()> {
    let store = open_store()?;
    let filter = ExpenseFilter::from(filters);
    let rows = apply(store.expenses(), &filter);

    let path = output
        .map(PathBuf::from)
        .unwrap_or_else(|| default_export_path(&get_data_dir(), Local::now().date_naive()));
    let written = export_to_file(rows, &path)?;

    println!("Wrote {written} expenses to {}", path.display());
    Ok(())
}
