use chrono::{Datelike, Local, NaiveDate};
use rand::Rng;

use crate::cli::{open_store, warn_if_unsaved};
use crate::error::Result;
use crate::models::{Category, NewExpense};
use crate::storage::SqliteStore;
use crate::store::ExpenseStore;
use crate::summary::MonthRef;

struct DemoExpense {
    day: u32,
    category: Category,
    note: &'static str,
    amount: f64,
}

/// Spending that shows up every month.
const RECURRING: &[DemoExpense] = &[
    DemoExpense { day: 1, category: Category::Transport, note: "Monthly transit pass", amount: 60.00 },
    DemoExpense { day: 3, category: Category::Entertainment, note: "Streaming subscription", amount: 12.99 },
    DemoExpense { day: 6, category: Category::Food, note: "Groceries", amount: 84.20 },
    DemoExpense { day: 13, category: Category::Food, note: "Groceries", amount: 71.45 },
    DemoExpense { day: 20, category: Category::Food, note: "Groceries", amount: 92.10 },
    DemoExpense { day: 27, category: Category::Food, note: "Groceries", amount: 66.80 },
];

/// One-off spending; each month takes every other entry, offset by month.
const ROTATING: &[DemoExpense] = &[
    DemoExpense { day: 2, category: Category::Food, note: "Lunch with team", amount: 18.50 },
    DemoExpense { day: 4, category: Category::Shopping, note: "Running shoes", amount: 89.99 },
    DemoExpense { day: 8, category: Category::Entertainment, note: "Cinema, two tickets", amount: 24.00 },
    DemoExpense { day: 9, category: Category::Transport, note: "Taxi home", amount: 21.30 },
    DemoExpense { day: 11, category: Category::Other, note: "Haircut", amount: 30.00 },
    DemoExpense { day: 15, category: Category::Food, note: "Coffee beans", amount: 16.75 },
    DemoExpense { day: 17, category: Category::Shopping, note: "Desk lamp", amount: 42.00 },
    DemoExpense { day: 22, category: Category::Entertainment, note: "Concert", amount: 65.00 },
    DemoExpense { day: 24, category: Category::Other, note: "Gift for a friend", amount: 35.00 },
    DemoExpense { day: 26, category: Category::Transport, note: "Train ticket", amount: 47.60 },
];

fn previous_month(month: MonthRef) -> MonthRef {
    if month.month == 1 {
        MonthRef { year: month.year - 1, month: 12 }
    } else {
        MonthRef { year: month.year, month: month.month - 1 }
    }
}

/// Every sample expense for `month`, skipping days after `today`.
fn month_plan(month: MonthRef, today: NaiveDate, rotation: usize) -> Vec<(NaiveDate, &'static DemoExpense)> {
    let rotating = ROTATING.iter().skip(rotation % 2).step_by(2);
    RECURRING
        .iter()
        .chain(rotating)
        .filter_map(|item| {
            let date = NaiveDate::from_ymd_opt(month.year, month.month, item.day)?;
            (date <= today).then_some((date, item))
        })
        .collect()
}

fn seed(store: &mut ExpenseStore<SqliteStore>, today: NaiveDate) -> Result<usize> {
    let current = MonthRef { year: today.year(), month: today.month() };
    let months = [previous_month(current), current];
    let mut rng = rand::thread_rng();
    let mut added = 0;

    for (rotation, month) in months.into_iter().enumerate() {
        for (date, item) in month_plan(month, today, rotation) {
            let jitter: f64 = rng.gen_range(0.85..1.15);
            let Some(midnight) = date.and_hms_opt(0, 0, 0) else {
                continue;
            };
            store.add(NewExpense {
                amount: (item.amount * jitter).max(0.01),
                category: item.category,
                note: item.note.to_string(),
                date: midnight.and_utc(),
            })?;
            added += 1;
        }
    }
    Ok(added)
}

pub fn run() -> Result<()> {
    let mut store = open_store()?;
    if !store.is_empty() {
        println!(
            "Demo data not loaded: the database already holds {} expenses.",
            store.len()
        );
        return Ok(());
    }

    let added = seed(&mut store, Local::now().date_naive())?;
    tracing::info!("seeded {added} demo expenses");

    println!("Loaded {added} sample expenses across two months.");
    warn_if_unsaved(&store);
    println!();
    println!("Next steps:");
    println!("  tally list                     browse everything, newest first");
    println!("  tally summary                  this month's totals and daily trend");
    println!("  tally list --category food     filter by category");
    println!("  tally export                   write the collection to CSV");
    Ok(())
}
