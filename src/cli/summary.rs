use colored::Colorize;
use comfy_table::{Cell, CellAlignment, Table};

use crate::cli::open_store;
use crate::error::Result;
use crate::fmt::{bar, money};
use crate::settings::load_settings;
use crate::summary::{MonthRef, MonthlySummary};

const BAR_WIDTH: usize = 30;

pub fn run(month: Option<String>) -> Result<()> {
    let target = match month.as_deref() {
        Some(raw) => MonthRef::parse(raw)?,
        None => MonthRef::current(),
    };
    let store = open_store()?;
    let summary = MonthlySummary::for_month(store.expenses(), target);
    let symbol = load_settings().currency_symbol;

    println!("{}", format!("Summary for {target}").bold());
    println!(
        "Total:     {}  ({} expenses)",
        money(&symbol, summary.total).bold(),
        summary.count
    );
    println!(
        "Daily avg: {}",
        money(&symbol, summary.total / f64::from(target.days().max(1)))
    );
    println!();

    if summary.categories.is_empty() {
        println!("No category totals for this month.");
    } else {
        let mut table = Table::new();
        table.set_header(vec!["Category", "Count", "Amount", "%"]);
        for item in &summary.categories {
            table.add_row(vec![
                Cell::new(item.category.name()),
                Cell::new(item.count).set_alignment(CellAlignment::Right),
                Cell::new(money(&symbol, item.total)).set_alignment(CellAlignment::Right),
                Cell::new(format!("{:.1}%", item.pct)).set_alignment(CellAlignment::Right),
            ]);
        }
        println!("By category\n{table}");
    }
    println!();

    if !summary.has_activity() {
        println!("No spending recorded for {target}.");
        return Ok(());
    }

    let max = summary.peak_day().map_or(0.0, |d| d.amount);
    println!("Daily trend");
    for day in &summary.daily {
        let amount = if day.amount > 0.0 {
            money(&symbol, day.amount)
        } else {
            "-".dimmed().to_string()
        };
        println!(
            "{:>6}  {:>12}  {}",
            day.label,
            amount,
            bar(day.amount, max, BAR_WIDTH).cyan()
        );
    }
    Ok(())
}
