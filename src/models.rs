use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, TimeZone, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::TallyError;

/// Longest note the store accepts, counted in characters.
pub const NOTE_MAX_CHARS: usize = 80;

/// Largest single amount accepted, on input and when loading stored records.
pub const MAX_AMOUNT: f64 = 1_000_000_000.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Category {
    Food,
    Transport,
    Entertainment,
    Shopping,
    Other,
}

impl Category {
    pub const ALL: [Category; 5] = [
        Self::Food,
        Self::Transport,
        Self::Entertainment,
        Self::Shopping,
        Self::Other,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Self::Food => "Food",
            Self::Transport => "Transport",
            Self::Entertainment => "Entertainment",
            Self::Shopping => "Shopping",
            Self::Other => "Other",
        }
    }

    /// Display label used by the zh-CN web client this data format came from.
    pub fn zh_label(&self) -> &'static str {
        match self {
            Self::Food => "餐饮",
            Self::Transport => "交通",
            Self::Entertainment => "娱乐",
            Self::Shopping => "购物",
            Self::Other => "其他",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Category {
    type Err = TallyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Self::ALL
            .into_iter()
            .find(|c| c.name().eq_ignore_ascii_case(s) || c.zh_label() == s)
            .ok_or_else(|| TallyError::UnknownCategory(s.to_string()))
    }
}

impl Serialize for Category {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

impl<'de> Deserialize<'de> for Category {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Expense {
    pub id: String,
    pub amount: f64,
    pub category: Category,
    pub note: String,
    #[serde(with = "iso_instant")]
    pub date: DateTime<Utc>,
}

/// Client-supplied fields for a new expense. The store assigns the id.
#[derive(Debug, Clone)]
pub struct NewExpense {
    pub amount: f64,
    pub category: Category,
    pub note: String,
    pub date: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Money and time helpers
// ---------------------------------------------------------------------------

pub fn round_to_cents(amount: f64) -> f64 {
    (amount * 100.0).round() / 100.0
}

pub fn to_cents(amount: f64) -> i64 {
    (amount * 100.0).round() as i64
}

pub fn from_cents(cents: i64) -> f64 {
    cents as f64 / 100.0
}

/// Sum amounts in whole cents. Saturates instead of overflowing.
pub fn sum_cents<I: IntoIterator<Item = f64>>(amounts: I) -> i64 {
    amounts
        .into_iter()
        .fold(0i64, |acc, amount| acc.saturating_add(to_cents(amount)))
}

/// Truncate an instant to whole milliseconds, the precision of the stored form.
pub fn truncate_to_millis(date: DateTime<Utc>) -> DateTime<Utc> {
    Utc.timestamp_millis_opt(date.timestamp_millis())
        .single()
        .unwrap_or(date)
}

/// Canonical stored form: `2024-03-01T00:00:00.000Z`.
pub fn canonical_instant(date: &DateTime<Utc>) -> String {
    date.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Parse a user- or storage-supplied date. Bare dates are midnight UTC and
/// zone-less date-times are read as UTC.
pub fn parse_instant(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return date.and_hms_opt(0, 0, 0).map(|dt| dt.and_utc());
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(dt.and_utc());
        }
    }
    None
}

mod iso_instant {
    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(date: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&super::canonical_instant(date))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        super::parse_instant(&raw)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid date: {raw}")))
    }
}
