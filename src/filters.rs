use chrono::{DateTime, Utc};

use crate::models::{Category, Expense};

/// Constraints narrowing a listed subset of expenses. Every field left as
/// `None` (or an empty string) applies no constraint.
///
/// Amount bounds are kept as the raw text the user typed; a bound that does
/// not parse as a number is ignored rather than rejected.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExpenseFilter {
    pub category: Option<Category>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub min_amount: Option<String>,
    pub max_amount: Option<String>,
    pub keyword: Option<String>,
}

impl ExpenseFilter {
    pub fn is_empty(&self) -> bool {
        self.category.is_none()
            && self.start_date.is_none()
            && self.end_date.is_none()
            && parse_bound(self.min_amount.as_deref()).is_none()
            && parse_bound(self.max_amount.as_deref()).is_none()
            && self.keyword.as_deref().map_or(true, str::is_empty)
    }
}

/// Parse an amount bound. Blank, non-numeric and non-finite input is `None`.
pub fn parse_bound(raw: Option<&str>) -> Option<f64> {
    let raw = raw?.trim();
    if raw.is_empty() {
        return None;
    }
    raw.parse::<f64>().ok().filter(|v| v.is_finite())
}

pub fn matches(expense: &Expense, filter: &ExpenseFilter) -> bool {
    if let Some(start) = filter.start_date {
        if expense.date < start {
            return false;
        }
    }

    if let Some(end) = filter.end_date {
        if expense.date > end {
            return false;
        }
    }

    if let Some(category) = filter.category {
        if expense.category != category {
            return false;
        }
    }

    if let Some(min) = parse_bound(filter.min_amount.as_deref()) {
        if expense.amount < min {
            return false;
        }
    }

    if let Some(max) = parse_bound(filter.max_amount.as_deref()) {
        if expense.amount > max {
            return false;
        }
    }

    if let Some(keyword) = filter.keyword.as_deref().filter(|k| !k.is_empty()) {
        if !expense.note.to_lowercase().contains(&keyword.to_lowercase()) {
            return false;
        }
    }

    true
}

/// Expenses passing `filter`, in input order.
pub fn apply<'a>(expenses: &'a [Expense], filter: &ExpenseFilter) -> Vec<&'a Expense> {
    expenses.iter().filter(|e| matches(e, filter)).collect()
}
