#[cfg(test)]
use std::collections::HashMap;
use std::collections::HashSet;
use std::path::Path;

use chrono::{DateTime, TimeZone, Utc};
use rusqlite::Connection;
use serde_json::{Map, Value};
use thiserror::Error;

use crate::db::{get_connection, get_value, init_db, set_value};
use crate::error::Result;
use crate::models::{parse_instant, truncate_to_millis, Category, Expense, MAX_AMOUNT};

/// Slot holding the serialized expense list.
pub const EXPENSES_KEY: &str = "tally.expenses";

/// A flat string-to-string slot store, the only thing persistence needs.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&mut self, key: &str, value: &str) -> Result<()>;
}

// ---------------------------------------------------------------------------
// Backends
// ---------------------------------------------------------------------------

pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    pub fn open(db_path: &Path) -> Result<Self> {
        let conn = get_connection(db_path)?;
        init_db(&conn)?;
        Ok(Self { conn })
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }
}

impl KeyValueStore for SqliteStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        get_value(&self.conn, key)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        set_value(&self.conn, key, value)
    }
}

#[cfg(test)]
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    slots: HashMap<String, String>,
}

#[cfg(test)]
impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[cfg(test)]
impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.slots.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.slots.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Record normalization
// ---------------------------------------------------------------------------

#[derive(Error, Debug, PartialEq)]
pub enum NormalizationError {
    #[error("record is not an object")]
    NotAnObject,

    #[error("amount is not a positive number within range: {0}")]
    Amount(String),

    #[error("unrecognised date: {0}")]
    Date(String),

    #[error("unknown category: {0}")]
    Category(String),
}

fn describe(value: Option<&Value>) -> String {
    value.map_or_else(|| "missing".to_string(), Value::to_string)
}

fn coerce_amount(value: Option<&Value>) -> std::result::Result<f64, NormalizationError> {
    let amount = match value {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    match amount {
        Some(a) if a.is_finite() && a > 0.0 && a <= MAX_AMOUNT => Ok(a),
        _ => Err(NormalizationError::Amount(describe(value))),
    }
}

fn coerce_date(value: Option<&Value>) -> std::result::Result<DateTime<Utc>, NormalizationError> {
    let date = match value {
        Some(Value::String(s)) => parse_instant(s),
        Some(Value::Number(n)) => n
            .as_i64()
            .and_then(|millis| Utc.timestamp_millis_opt(millis).single()),
        _ => None,
    };
    date.map(truncate_to_millis)
        .ok_or_else(|| NormalizationError::Date(describe(value)))
}

fn coerce_category(value: Option<&Value>) -> std::result::Result<Category, NormalizationError> {
    value
        .and_then(Value::as_str)
        .and_then(|raw| raw.parse().ok())
        .ok_or_else(|| NormalizationError::Category(describe(value)))
}

/// The id a stored record carries, if it has a usable one.
fn stored_id(obj: &Map<String, Value>) -> Option<String> {
    match obj.get("id") {
        Some(Value::String(s)) if !s.is_empty() => Some(s.clone()),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    }
}

/// Turn one stored record into an `Expense`, coercing loosely typed fields.
///
/// Notes that are not strings become empty, numeric ids are stringified and
/// records without an id get a fresh one. Amount, date and category must be
/// recoverable or the record is rejected.
pub fn normalize_record(value: &Value) -> std::result::Result<Expense, NormalizationError> {
    let obj = value.as_object().ok_or(NormalizationError::NotAnObject)?;

    let amount = coerce_amount(obj.get("amount"))?;
    let category = coerce_category(obj.get("category"))?;
    let date = coerce_date(obj.get("date"))?;
    let note = obj
        .get("note")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();
    let id = stored_id(obj).unwrap_or_else(|| uuid::Uuid::new_v4().to_string());

    Ok(Expense {
        id,
        amount,
        category,
        note,
        date,
    })
}

// ---------------------------------------------------------------------------
// Load / save
// ---------------------------------------------------------------------------

/// Result of reading the stored collection.
#[derive(Debug, Default)]
pub struct LoadedExpenses {
    pub expenses: Vec<Expense>,
    /// Records that had no usable id and were given a fresh one. Those ids
    /// only last if the collection is written back.
    pub assigned_ids: usize,
}

/// Read the stored collection. Missing, unreadable or malformed data yields
/// an empty list; individual bad records are dropped.
pub fn load_expenses<S: KeyValueStore + ?Sized>(store: &S) -> LoadedExpenses {
    let raw = match store.get(EXPENSES_KEY) {
        Ok(Some(raw)) if !raw.trim().is_empty() => raw,
        Ok(_) => return LoadedExpenses::default(),
        Err(e) => {
            tracing::error!("Failed to read expenses from storage: {e}");
            return LoadedExpenses::default();
        }
    };

    let parsed: Value = match serde_json::from_str(&raw) {
        Ok(v) => v,
        Err(e) => {
            tracing::error!("Stored expenses are not valid JSON: {e}");
            return LoadedExpenses::default();
        }
    };

    let Some(records) = parsed.as_array() else {
        tracing::warn!("Stored expenses are not a list, ignoring them");
        return LoadedExpenses::default();
    };

    let mut seen = HashSet::new();
    let mut loaded = LoadedExpenses {
        expenses: Vec::with_capacity(records.len()),
        assigned_ids: 0,
    };
    for (index, record) in records.iter().enumerate() {
        let needs_id = record.as_object().is_some_and(|obj| stored_id(obj).is_none());
        match normalize_record(record) {
            Ok(expense) if seen.insert(expense.id.clone()) => {
                if needs_id {
                    tracing::info!(index, id = %expense.id, "Assigned id to stored expense");
                    loaded.assigned_ids += 1;
                }
                loaded.expenses.push(expense);
            }
            Ok(expense) => {
                tracing::warn!(index, id = %expense.id, "Dropping stored expense with duplicate id");
            }
            Err(e) => tracing::warn!(index, "Dropping malformed stored expense: {e}"),
        }
    }
    tracing::debug!(count = loaded.expenses.len(), "Loaded expenses");
    loaded
}

/// Overwrite the stored collection. Failures are logged and reported as
/// `false`; the caller's in-memory list stays authoritative.
pub fn save_expenses<S: KeyValueStore + ?Sized>(store: &mut S, expenses: &[Expense]) -> bool {
    let json = match serde_json::to_string(expenses) {
        Ok(json) => json,
        Err(e) => {
            tracing::error!("Failed to serialize expenses: {e}");
            return false;
        }
    };
    match store.set(EXPENSES_KEY, &json) {
        Ok(()) => {
            tracing::debug!(count = expenses.len(), "Saved expenses");
            true
        }
        Err(e) => {
            tracing::error!("Failed to save expenses to storage: {e}");
            false
        }
    }
}
