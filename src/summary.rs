use std::collections::BTreeMap;
use std::fmt;

use chrono::{Datelike, Local, NaiveDate};

use crate::error::{Result, TallyError};
use crate::models::{from_cents, sum_cents, to_cents, Category, Expense};

// ---------------------------------------------------------------------------
// Month reference
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct MonthRef {
    pub year: i32,
    pub month: u32,
}

impl MonthRef {
    pub fn new(year: i32, month: u32) -> Result<Self> {
        if !(1..=12).contains(&month) {
            return Err(TallyError::Other(format!("month must be 1-12, got {month}")));
        }
        Ok(Self { year, month })
    }

    /// Parse `YYYY-MM`.
    pub fn parse(raw: &str) -> Result<Self> {
        let invalid = || TallyError::Other(format!("expected a month as YYYY-MM, got '{raw}'"));
        let (year, month) = raw.trim().split_once('-').ok_or_else(invalid)?;
        let year: i32 = year.parse().map_err(|_| invalid())?;
        let month: u32 = month.parse().map_err(|_| invalid())?;
        Self::new(year, month)
    }

    /// The current month in local time. Only the CLI edge should call this.
    pub fn current() -> Self {
        let today = Local::now().date_naive();
        Self {
            year: today.year(),
            month: today.month(),
        }
    }

    pub fn days(&self) -> u32 {
        days_in_month(self.year, self.month)
    }
}

impl fmt::Display for MonthRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

/// Number of calendar days in `month` of `year`; 0 for an invalid month.
pub fn days_in_month(year: i32, month: u32) -> u32 {
    let (next_year, next_month) = if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };
    NaiveDate::from_ymd_opt(next_year, next_month, 1)
        .and_then(|first| first.pred_opt())
        .filter(|last| last.month() == month)
        .map_or(0, |last| last.day())
}

// ---------------------------------------------------------------------------
// Aggregations
// ---------------------------------------------------------------------------

pub fn month_expenses(expenses: &[Expense], year: i32, month: u32) -> Vec<&Expense> {
    expenses
        .iter()
        .filter(|e| e.date.year() == year && e.date.month() == month)
        .collect()
}

fn month_cents(expenses: &[Expense], year: i32, month: u32) -> i64 {
    sum_cents(month_expenses(expenses, year, month).iter().map(|e| e.amount))
}

pub fn monthly_total(expenses: &[Expense], year: i32, month: u32) -> f64 {
    from_cents(month_cents(expenses, year, month))
}

#[derive(Debug, Clone, PartialEq)]
pub struct CategoryTotal {
    pub category: Category,
    pub total: f64,
    pub count: usize,
    pub pct: f64,
}

/// Per-category totals for the month, in fixed category order. Categories
/// with no expenses that month are left out.
pub fn category_totals(expenses: &[Expense], year: i32, month: u32) -> Vec<CategoryTotal> {
    let mut by_category: BTreeMap<Category, (i64, usize)> = BTreeMap::new();
    for e in month_expenses(expenses, year, month) {
        let entry = by_category.entry(e.category).or_insert((0, 0));
        entry.0 = entry.0.saturating_add(to_cents(e.amount));
        entry.1 += 1;
    }

    let total = by_category
        .values()
        .fold(0i64, |acc, (cents, _)| acc.saturating_add(*cents));
    by_category
        .into_iter()
        .map(|(category, (cents, count))| CategoryTotal {
            category,
            total: from_cents(cents),
            count,
            pct: if total != 0 {
                cents as f64 / total as f64 * 100.0
            } else {
                0.0
            },
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq)]
pub struct DailyTotal {
    pub day: u32,
    /// `M/D`, e.g. `3/15`.
    pub label: String,
    pub amount: f64,
}

/// One entry per calendar day of the month, zero-filled.
pub fn daily_series(expenses: &[Expense], year: i32, month: u32) -> Vec<DailyTotal> {
    let days = days_in_month(year, month);
    let mut cents = vec![0i64; days as usize];
    for e in month_expenses(expenses, year, month) {
        if let Some(slot) = cents.get_mut(e.date.day0() as usize) {
            *slot = slot.saturating_add(to_cents(e.amount));
        }
    }

    cents
        .into_iter()
        .zip(1..=days)
        .map(|(c, day)| DailyTotal {
            day,
            label: format!("{month}/{day}"),
            amount: from_cents(c),
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq)]
pub struct MonthlySummary {
    pub month: MonthRef,
    pub total: f64,
    pub count: usize,
    pub categories: Vec<CategoryTotal>,
    pub daily: Vec<DailyTotal>,
}

impl MonthlySummary {
    pub fn for_month(expenses: &[Expense], month: MonthRef) -> Self {
        let MonthRef { year, month: m } = month;
        Self {
            month,
            total: monthly_total(expenses, year, m),
            count: month_expenses(expenses, year, m).len(),
            categories: category_totals(expenses, year, m),
            daily: daily_series(expenses, year, m),
        }
    }

    pub fn has_activity(&self) -> bool {
        self.daily.iter().any(|d| d.amount > 0.0)
    }

    /// Day with the largest total, if any spending happened.
    pub fn peak_day(&self) -> Option<&DailyTotal> {
        self.daily
            .iter()
            .filter(|d| d.amount > 0.0)
            .max_by(|a, b| a.amount.total_cmp(&b.amount))
    }
}
