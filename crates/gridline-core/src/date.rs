//! Date interpretation and formatting for `datatype: date` columns.
//!
//! Interpretation is best-effort and never fails loudly: a value that cannot
//! be read as a date is shown unformatted.

use crate::value::CellValue;
use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use std::fmt::Write;

/// Smallest number treated as a millisecond timestamp (1973-03-03).
///
/// Anything below is assumed to be a plain number such as an ID.
pub const MIN_TIMESTAMP_MS: f64 = 100_000_000_000.0;

const DATE_TIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M:%S",
];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y", "%d.%m.%Y"];

/// Interpret a cell value as a date.
///
/// Tried in order: a date value, a `/Date(<millis>)/` string, a generic date
/// string, then a number above [`MIN_TIMESTAMP_MS`].
#[must_use]
pub fn interpret_date(value: &CellValue) -> Option<NaiveDateTime> {
    match value {
        CellValue::Date(d) => Some(*d),
        CellValue::Text(s) => parse_wrapped_millis(s).or_else(|| parse_date_string(s)),
        CellValue::Number(n) if *n > MIN_TIMESTAMP_MS => from_millis(*n),
        _ => None,
    }
}

/// Parse `/Date(1609459200000)/`, optionally with a `+hhmm` offset suffix.
fn parse_wrapped_millis(s: &str) -> Option<NaiveDateTime> {
    let inner = s.trim().strip_prefix("/Date(")?.strip_suffix(")/")?;
    let end = inner
        .char_indices()
        .skip(1)
        .find(|(_, c)| *c == '+' || *c == '-')
        .map_or(inner.len(), |(i, _)| i);
    let millis: i64 = inner[..end].parse().ok()?;
    DateTime::from_timestamp_millis(millis).map(|d| d.naive_utc())
}

/// Parse common date and date-time spellings.
#[must_use]
pub fn parse_date_string(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    if let Ok(d) = DateTime::parse_from_rfc3339(s) {
        return Some(d.naive_utc());
    }
    if let Some(d) = DATE_TIME_FORMATS
        .iter()
        .find_map(|f| NaiveDateTime::parse_from_str(s, f).ok())
    {
        return Some(d);
    }
    DATE_FORMATS
        .iter()
        .find_map(|f| NaiveDate::parse_from_str(s, f).ok())
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

fn from_millis(millis: f64) -> Option<NaiveDateTime> {
    if !millis.is_finite() || millis > i64::MAX as f64 {
        return None;
    }
    DateTime::from_timestamp_millis(millis as i64).map(|d| d.naive_utc())
}

/// Check that a strftime-style format string is usable.
#[must_use]
pub fn is_valid_format(format: &str) -> bool {
    !StrftimeItems::new(format).any(|item| matches!(item, Item::Error))
}

/// Format a date with a strftime-style format.
///
/// Returns `None` when the format cannot be applied to the value.
#[must_use]
pub fn format_date(date: &NaiveDateTime, format: &str) -> Option<String> {
    if !is_valid_format(format) {
        return None;
    }
    let mut out = String::new();
    write!(out, "{}", date.format(format)).ok()?;
    Some(out)
}

/// Interpret and format a value, `None` when it is not a date.
#[must_use]
pub fn format_value(value: &CellValue, format: &str) -> Option<String> {
    interpret_date(value).and_then(|d| format_date(&d, format))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
    }

    #[test]
    fn test_interpret_date_value() {
        let d = ymd(2021, 1, 1);
        assert_eq!(interpret_date(&CellValue::Date(d)), Some(d));
    }

    #[test]
    fn test_interpret_wrapped_millis() {
        let v = CellValue::Text("/Date(1609459200000)/".into());
        assert_eq!(interpret_date(&v), Some(ymd(2021, 1, 1)));

        let v = CellValue::Text("/Date(1609459200000+0100)/".into());
        assert_eq!(interpret_date(&v), Some(ymd(2021, 1, 1)));
    }

    #[test]
    fn test_interpret_date_strings() {
        assert_eq!(
            interpret_date(&CellValue::Text("2021-01-01".into())),
            Some(ymd(2021, 1, 1))
        );
        assert_eq!(
            interpret_date(&CellValue::Text("2021-01-01T00:00:00Z".into())),
            Some(ymd(2021, 1, 1))
        );
        assert_eq!(
            interpret_date(&CellValue::Text("12/31/2020".into())),
            Some(ymd(2020, 12, 31))
        );
    }

    #[test]
    fn test_interpret_timestamp_threshold() {
        assert_eq!(
            interpret_date(&CellValue::Number(1_609_459_200_000.0)),
            Some(ymd(2021, 1, 1))
        );
        assert_eq!(interpret_date(&CellValue::Number(42.0)), None);
    }

    #[test]
    fn test_interpret_garbage() {
        assert_eq!(interpret_date(&CellValue::Text("not a date".into())), None);
        assert_eq!(interpret_date(&CellValue::Text("/Date(abc)/".into())), None);
        assert_eq!(interpret_date(&CellValue::Bool(true)), None);
        assert_eq!(interpret_date(&CellValue::Empty), None);
    }

    #[test]
    fn test_format_value() {
        let v = CellValue::Text("2021-03-04".into());
        assert_eq!(format_value(&v, "%d/%m/%Y"), Some("04/03/2021".into()));
    }

    #[test]
    fn test_invalid_format_rejected() {
        assert!(!is_valid_format("%Q"));
        assert!(is_valid_format("%Y-%m-%d"));
        assert_eq!(format_date(&ymd(2021, 1, 1), "%Q"), None);
    }
}
