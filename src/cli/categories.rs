use comfy_table::{Cell, Table};

use crate::error::Result;
use crate::models::Category;

pub fn list() -> Result<()> {
    let mut table = Table::new();
    table.set_header(vec!["Category", "Label (zh-CN)"]);
    for category in Category::ALL {
        table.add_row(vec![Cell::new(category.name()), Cell::new(category.zh_label())]);
    }
    println!("Categories\n{table}");
    Ok(())
}
