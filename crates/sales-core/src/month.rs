//! Contract month normalization
//!
//! The upstream sheet mixes real date cells (serialized as ISO timestamps)
//! with free-text dates typed by hand. Every value is reduced to a `YYYY-MM`
//! key, or to `Unrecognized` when nothing sensible can be read from it.

use chrono::{DateTime, Datelike, FixedOffset, NaiveDate, NaiveDateTime};
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

use crate::error::MonthKeyError;

/// Date-time layouts tried after RFC 3339 / RFC 2822
const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M:%S%.f",
    "%Y/%m/%d %H:%M",
];

/// Calendar date layouts, most common first
const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%Y.%m.%d",
    "%Y年%m月%d日",
    "%m/%d/%Y",
    "%B %d, %Y",
    "%b %d, %Y",
    "%d %B %Y",
    "%d %b %Y",
];

/// A contract month of the exact shape `YYYY-MM`.
///
/// Ordering is by text, which is chronological because the format is fixed-width.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, serde::Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct MonthKey(String);

impl MonthKey {
    /// Build a key from calendar parts; `None` for years that do not fit in four digits.
    pub fn from_parts(year: i32, month: u32) -> Option<Self> {
        if !(0..=9999).contains(&year) || !(1..=12).contains(&month) {
            return None;
        }
        Some(Self(format!("{:04}-{:02}", year, month)))
    }

    pub fn from_date(date: &NaiveDate) -> Option<Self> {
        Self::from_parts(date.year(), date.month())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MonthKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Accepts `YYYY-MM` or `YYYY/MM`. Only the shape is checked, so any key
/// that can appear in the month facet can also be selected.
impl FromStr for MonthKey {
    type Err = MonthKeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        match leading_year_month(trimmed) {
            Some(key) if trimmed.len() == 7 => Ok(key),
            _ => Err(MonthKeyError {
                input: s.to_string(),
            }),
        }
    }
}

impl TryFrom<String> for MonthKey {
    type Error = MonthKeyError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<MonthKey> for String {
    fn from(key: MonthKey) -> Self {
        key.0
    }
}

/// Result of normalizing a contract date
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum NormalizedMonth {
    Recognized(MonthKey),
    Unrecognized,
}

impl NormalizedMonth {
    pub fn key(&self) -> Option<&MonthKey> {
        match self {
            NormalizedMonth::Recognized(key) => Some(key),
            NormalizedMonth::Unrecognized => None,
        }
    }

    pub fn into_key(self) -> Option<MonthKey> {
        match self {
            NormalizedMonth::Recognized(key) => Some(key),
            NormalizedMonth::Unrecognized => None,
        }
    }

    pub fn is_recognized(&self) -> bool {
        matches!(self, NormalizedMonth::Recognized(_))
    }
}

impl From<Option<MonthKey>> for NormalizedMonth {
    fn from(key: Option<MonthKey>) -> Self {
        key.map_or(NormalizedMonth::Unrecognized, NormalizedMonth::Recognized)
    }
}

/// Contract date as delivered by the source
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum DateLike {
    #[default]
    Missing,
    /// Free text, e.g. `2025/06/01` or `2025-06-01T00:00:00`
    Text(String),
    /// A point in time already placed in the reporting offset
    Instant(DateTime<FixedOffset>),
}

/// Normalize a contract date to its `YYYY-MM` month.
pub fn normalize(date: &DateLike) -> NormalizedMonth {
    match date {
        DateLike::Missing => NormalizedMonth::Unrecognized,
        DateLike::Text(text) => normalize_str(text),
        DateLike::Instant(instant) => MonthKey::from_date(&instant.date_naive()).into(),
    }
}

/// Normalize a textual date.
///
/// General date parsing is tried first; if it fails, a leading `YYYY/MM` or
/// `YYYY-MM` is taken as-is.
pub fn normalize_str(text: &str) -> NormalizedMonth {
    let text = text.trim();
    if text.is_empty() {
        return NormalizedMonth::Unrecognized;
    }

    parse_calendar_date(text)
        .and_then(|date| MonthKey::from_date(&date))
        .or_else(|| leading_year_month(text))
        .into()
}

/// Parse the common machine and locale date shapes into a calendar date.
///
/// Zoned timestamps keep the calendar date as written in their own offset.
pub fn parse_calendar_date(text: &str) -> Option<NaiveDate> {
    if let Ok(instant) = DateTime::parse_from_rfc3339(text) {
        return Some(instant.date_naive());
    }
    if let Ok(instant) = DateTime::parse_from_rfc2822(text) {
        return Some(instant.date_naive());
    }

    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(text, fmt).ok())
        .map(|dt| dt.date())
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|fmt| NaiveDate::parse_from_str(text, fmt).ok())
        })
        .or_else(|| parse_js_date_string(text))
}

/// `Sun Jun 01 2025 00:00:00 GMT+0900 (Japan Standard Time)`
fn parse_js_date_string(text: &str) -> Option<NaiveDate> {
    let head: Vec<&str> = text.split_whitespace().take(4).collect();
    if head.len() < 4 {
        return None;
    }
    NaiveDate::parse_from_str(&head.join(" "), "%a %b %d %Y").ok()
}

/// Match `^(\d{4})[/-](\d{2})` and build the key from the captured digits.
fn leading_year_month(text: &str) -> Option<MonthKey> {
    let bytes = text.as_bytes();
    if bytes.len() < 7 {
        return None;
    }

    let year_ok = bytes[..4].iter().all(u8::is_ascii_digit);
    let sep_ok = matches!(bytes[4], b'/' | b'-');
    let month_ok = bytes[5..7].iter().all(u8::is_ascii_digit);

    if year_ok && sep_ok && month_ok {
        Some(MonthKey(format!("{}-{}", &text[..4], &text[5..7])))
    } else {
        None
    }
}
