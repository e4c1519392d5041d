//! Sales records and their boundary parsing
//!
//! The endpoint returns one JSON object per sheet row, keyed by column
//! header. Values are whatever the sheet cell held: strings, numbers, dates
//! serialized as ISO strings, or nothing at all. Parsing never rejects a
//! row that is an object; missing or malformed cells fall back to defaults.

use chrono::{DateTime, FixedOffset, Offset, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::RecordError;
use crate::month::{normalize, DateLike, NormalizedMonth};

/// Referrer key used when a record has no referrer
pub const UNRECORDED_REFERRER: &str = "未記入";

/// Column headers of the four fields read from each row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldNames {
    pub contract_date: String,
    pub referrer: String,
    pub store_name: String,
    pub total_sales: String,
}

impl Default for FieldNames {
    fn default() -> Self {
        Self {
            contract_date: "契約月".to_string(),
            referrer: "紹介者".to_string(),
            store_name: "店舗名".to_string(),
            total_sales: "合計売上".to_string(),
        }
    }
}

/// How raw rows are read: which columns, and which UTC offset timestamps
/// are reported in.
#[derive(Debug, Clone, Default)]
pub struct RecordSchema {
    pub fields: FieldNames,
    /// When set, ISO timestamps and epoch-millisecond cells are converted
    /// to this offset before their month is taken.
    pub utc_offset: Option<FixedOffset>,
}

/// One sale, typed
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SalesRecord {
    pub contract_date: DateLike,
    pub referrer: Option<String>,
    pub store_name: Option<String>,
    /// `None` when the cell could not be read as a number
    pub total_sales: Option<f64>,
}

impl SalesRecord {
    /// Read a row, falling back to defaults for anything missing or malformed.
    pub fn from_raw(raw: &Map<String, Value>, schema: &RecordSchema) -> Self {
        let fields = &schema.fields;
        Self {
            contract_date: date_like(raw.get(&fields.contract_date), schema.utc_offset),
            referrer: text_field(raw.get(&fields.referrer)),
            store_name: text_field(raw.get(&fields.store_name)),
            total_sales: raw.get(&fields.total_sales).map_or(Some(0.0), coerce_amount),
        }
    }

    /// Referrer, or [`UNRECORDED_REFERRER`] when absent
    pub fn referrer_key(&self) -> &str {
        self.referrer.as_deref().unwrap_or(UNRECORDED_REFERRER)
    }

    /// Contract month, computed on demand
    pub fn month(&self) -> NormalizedMonth {
        normalize(&self.contract_date)
    }

    /// Sales amount with unparsable values counted as zero
    pub fn amount(&self) -> f64 {
        self.total_sales.unwrap_or(0.0)
    }
}

/// Records read from a payload, plus how many rows were not objects
#[derive(Debug, Clone, Default)]
pub struct ParsedRecords {
    pub records: Vec<SalesRecord>,
    pub skipped: usize,
}

/// Strict single-row conversion with the default schema
impl TryFrom<&Value> for SalesRecord {
    type Error = RecordError;

    fn try_from(value: &Value) -> Result<Self, Self::Error> {
        match value {
            Value::Object(raw) => Ok(Self::from_raw(raw, &RecordSchema::default())),
            other => Err(RecordError::NotAnObject {
                found: json_kind(other),
            }),
        }
    }
}

/// Parse every object row of a payload; other rows are counted and skipped.
pub fn parse_records(rows: &[Value], schema: &RecordSchema) -> ParsedRecords {
    let mut parsed = ParsedRecords::default();

    for row in rows {
        match row {
            Value::Object(raw) => parsed.records.push(SalesRecord::from_raw(raw, schema)),
            _ => parsed.skipped += 1,
        }
    }

    parsed
}

/// Coerce a cell to an amount.
///
/// Numbers pass through, booleans count as 1/0, null and empty text count as
/// zero. Text may carry thousands separators, a leading yen sign or a
/// trailing `円`. Anything else is `None`.
pub fn coerce_amount(value: &Value) -> Option<f64> {
    let amount = match value {
        Value::Null => Some(0.0),
        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        Value::Number(n) => n.as_f64(),
        Value::String(s) => parse_amount_text(s),
        Value::Array(_) | Value::Object(_) => None,
    };
    amount.filter(|a| a.is_finite())
}

fn parse_amount_text(text: &str) -> Option<f64> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Some(0.0);
    }

    let unsigned = trimmed
        .trim_start_matches(['¥', '￥'])
        .trim_end_matches('円')
        .trim()
        .replace(',', "");

    unsigned.parse::<f64>().ok()
}

/// Parse a `+09:00` / `-05:30` / `Z` style UTC offset.
pub fn parse_utc_offset(text: &str) -> Option<FixedOffset> {
    let text = text.trim();
    if text.eq_ignore_ascii_case("z") || text.eq_ignore_ascii_case("utc") {
        return FixedOffset::east_opt(0);
    }

    let (sign, rest) = match text.as_bytes().first()? {
        b'+' => (1, &text[1..]),
        b'-' => (-1, &text[1..]),
        _ => return None,
    };
    let (hours, minutes) = rest.split_once(':').unwrap_or((rest, "0"));
    let hours: i32 = hours.parse().ok()?;
    let minutes: i32 = minutes.parse().ok()?;
    if !(0..=23).contains(&hours) || !(0..=59).contains(&minutes) {
        return None;
    }

    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))
}

fn date_like(value: Option<&Value>, offset: Option<FixedOffset>) -> DateLike {
    match value {
        None | Some(Value::Null) => DateLike::Missing,
        Some(Value::String(s)) => {
            let s = s.trim();
            if s.is_empty() {
                return DateLike::Missing;
            }
            let instant = offset.and_then(|tz| {
                DateTime::parse_from_rfc3339(s)
                    .ok()
                    .map(|dt| dt.with_timezone(&tz))
            });
            match instant {
                Some(instant) => DateLike::Instant(instant),
                None => DateLike::Text(s.to_string()),
            }
        }
        Some(Value::Number(n)) => {
            n.as_i64()
                .or_else(|| n.as_f64().map(|f| f as i64))
                .and_then(DateTime::from_timestamp_millis)
                .map(|dt| DateLike::Instant(dt.with_timezone(&offset.unwrap_or(Utc.fix()))))
                .unwrap_or_else(|| DateLike::Text(n.to_string()))
        }
        Some(other) => DateLike::Text(other.to_string()),
    }
}

fn text_field(value: Option<&Value>) -> Option<String> {
    let text = match value? {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null | Value::Array(_) | Value::Object(_) => return None,
    };
    (!text.is_empty()).then_some(text)
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn row(value: Value) -> SalesRecord {
        SalesRecord::try_from(&value).unwrap()
    }

    #[test]
    fn test_from_raw_default_fields() {
        let record = row(json!({
            "契約月": "2025/06/01",
            "紹介者": "甲",
            "店舗名": "A店",
            "合計売上": "1000"
        }));
        assert_eq!(record.contract_date, DateLike::Text("2025/06/01".to_string()));
        assert_eq!(record.referrer.as_deref(), Some("甲"));
        assert_eq!(record.store_name.as_deref(), Some("A店"));
        assert_eq!(record.total_sales, Some(1000.0));
        assert_eq!(record.month().key().map(|k| k.as_str()), Some("2025-06"));
    }

    #[test]
    fn test_missing_fields_fall_back() {
        let record = row(json!({ "紹介者": "", "店舗名": null }));
        assert_eq!(record.contract_date, DateLike::Missing);
        assert_eq!(record.referrer, None);
        assert_eq!(record.referrer_key(), UNRECORDED_REFERRER);
        assert_eq!(record.store_name, None);
        assert_eq!(record.amount(), 0.0);
    }

    #[test]
    fn test_custom_field_names() {
        let schema = RecordSchema {
            fields: FieldNames {
                contract_date: "date".to_string(),
                referrer: "media".to_string(),
                store_name: "store".to_string(),
                total_sales: "sales".to_string(),
            },
            utc_offset: None,
        };
        let raw = json!({ "date": "2025-07-10", "media": "Web", "store": "B店", "sales": 500 });
        let record = SalesRecord::from_raw(raw.as_object().unwrap(), &schema);
        assert_eq!(record.referrer_key(), "Web");
        assert_eq!(record.total_sales, Some(500.0));
    }

    #[test]
    fn test_coerce_amount() {
        assert_eq!(coerce_amount(&json!(100)), Some(100.0));
        assert_eq!(coerce_amount(&json!("200")), Some(200.0));
        assert_eq!(coerce_amount(&json!(" 1,234,567 ")), Some(1_234_567.0));
        assert_eq!(coerce_amount(&json!("¥3,000")), Some(3000.0));
        assert_eq!(coerce_amount(&json!("4500円")), Some(4500.0));
        assert_eq!(coerce_amount(&json!("-12.5")), Some(-12.5));
        assert_eq!(coerce_amount(&json!("")), Some(0.0));
        assert_eq!(coerce_amount(&Value::Null), Some(0.0));
        assert_eq!(coerce_amount(&json!(true)), Some(1.0));
        assert_eq!(coerce_amount(&json!("x")), None);
        assert_eq!(coerce_amount(&json!("NaN")), None);
        assert_eq!(coerce_amount(&json!([1])), None);
    }

    #[test]
    fn test_numeric_text_fields() {
        let record = row(json!({ "紹介者": 42, "店舗名": "  C店  " }));
        assert_eq!(record.referrer.as_deref(), Some("42"));
        assert_eq!(record.store_name.as_deref(), Some("C店"));
    }

    #[test]
    fn test_epoch_millis_date() {
        // 2025-06-01T00:00:00Z
        let record = row(json!({ "契約月": 1_748_736_000_000_i64 }));
        assert_eq!(record.month().key().map(|k| k.as_str()), Some("2025-06"));
    }

    #[test]
    fn test_timestamps_follow_reporting_offset() {
        let raw = json!({ "契約月": "2025-05-31T15:00:00.000Z" });
        let raw = raw.as_object().unwrap();

        let utc = SalesRecord::from_raw(raw, &RecordSchema::default());
        assert_eq!(utc.month().key().map(|k| k.as_str()), Some("2025-05"));

        let jst = RecordSchema {
            utc_offset: parse_utc_offset("+09:00"),
            ..RecordSchema::default()
        };
        let local = SalesRecord::from_raw(raw, &jst);
        assert_eq!(local.month().key().map(|k| k.as_str()), Some("2025-06"));
    }

    #[test]
    fn test_parse_utc_offset() {
        assert_eq!(parse_utc_offset("+09:00").unwrap().local_minus_utc(), 9 * 3600);
        assert_eq!(parse_utc_offset("-05:30").unwrap().local_minus_utc(), -(5 * 3600 + 1800));
        assert_eq!(parse_utc_offset("+9").unwrap().local_minus_utc(), 9 * 3600);
        assert_eq!(parse_utc_offset("Z").unwrap().local_minus_utc(), 0);
        assert!(parse_utc_offset("09:00").is_none());
        assert!(parse_utc_offset("+25:00").is_none());
    }

    #[test]
    fn test_parse_records_skips_non_objects() {
        let rows = vec![json!({ "合計売上": 1 }), json!("header"), json!(null), json!({})];
        let parsed = parse_records(&rows, &RecordSchema::default());
        assert_eq!(parsed.records.len(), 2);
        assert_eq!(parsed.skipped, 2);
    }

    #[test]
    fn test_try_from_rejects_non_object() {
        let err = SalesRecord::try_from(&json!([1, 2])).unwrap_err();
        assert_eq!(err, RecordError::NotAnObject { found: "array" });
    }
}
