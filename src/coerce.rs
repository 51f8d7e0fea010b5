//! Type coercion from raw source values.
//!
//! Every function here is total: malformed input degrades to `None` and no
//! error ever leaves this module.

use crate::entity::FieldValue;
use chrono::{NaiveDate, NaiveDateTime};

/// Timestamp layouts accepted by [`coerce_timestamp`], tried in order.
const TIMESTAMP_FORMATS: &[&str] = &[
    "%m/%d/%Y %H:%M",
    "%m/%d/%Y %H:%M:%S",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M:%S",
];

const DATE_FORMATS: &[&str] = &["%m/%d/%Y", "%Y-%m-%d"];

/// Convert to a float, `None` if absent or not numeric.
///
/// Non-finite results are treated as absent.
pub fn coerce_numeric(value: &FieldValue) -> Option<f64> {
    let number = match value {
        FieldValue::Null => return None,
        FieldValue::Int(i) => *i as f64,
        FieldValue::Float(f) => *f,
        FieldValue::Text(s) => s.trim().parse::<f64>().ok()?,
    };
    number.is_finite().then_some(number)
}

/// Convert to an integer, `None` if absent or not numeric.
///
/// Goes through floating point and truncates toward zero, so `"5.0"` and
/// `"5.9"` both become `5`.
pub fn coerce_integer(value: &FieldValue) -> Option<i64> {
    match value {
        FieldValue::Int(i) => Some(*i),
        FieldValue::Text(s) if s.trim().parse::<i64>().is_ok() => s.trim().parse().ok(),
        other => {
            let number = coerce_numeric(other)?.trunc();
            // i64::MAX is not representable as f64; the upper bound is exclusive.
            (number >= i64::MIN as f64 && number < i64::MAX as f64).then(|| number as i64)
        }
    }
}

/// Integer coercion narrowed to 4-byte integer columns.
pub fn coerce_i32(value: &FieldValue) -> Option<i32> {
    coerce_integer(value).and_then(|v| i32::try_from(v).ok())
}

/// Textual rendering of a present value.
pub fn coerce_text(value: &FieldValue) -> Option<String> {
    match value {
        FieldValue::Null => None,
        FieldValue::Text(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

/// Parse a source timestamp such as `1/31/2018 22:56`.
///
/// A bare date is accepted and read as midnight.
pub fn coerce_timestamp(value: &FieldValue) -> Option<NaiveDateTime> {
    let FieldValue::Text(raw) = value else {
        return None;
    };
    let raw = raw.trim();

    TIMESTAMP_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|format| NaiveDate::parse_from_str(raw, format).ok())
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};

    fn text(s: &str) -> FieldValue {
        FieldValue::Text(s.to_string())
    }

    #[test]
    fn test_coerce_numeric() {
        assert_eq!(coerce_numeric(&text("3.14")), Some(3.14));
        assert_eq!(coerce_numeric(&text(" 42 ")), Some(42.0));
        assert_eq!(coerce_numeric(&FieldValue::Int(2)), Some(2.0));
        assert_eq!(coerce_numeric(&FieldValue::Float(-1.5)), Some(-1.5));
    }

    #[test]
    fn test_coerce_numeric_absent_or_malformed() {
        assert_eq!(coerce_numeric(&text("")), None);
        assert_eq!(coerce_numeric(&FieldValue::Null), None);
        assert_eq!(coerce_numeric(&text("abc")), None);
        assert_eq!(coerce_numeric(&FieldValue::Float(f64::NAN)), None);
        assert_eq!(coerce_numeric(&text("inf")), None);
    }

    #[test]
    fn test_coerce_integer_truncates_through_float() {
        assert_eq!(coerce_integer(&text("5.0")), Some(5));
        assert_eq!(coerce_integer(&text("5.9")), Some(5));
        assert_eq!(coerce_integer(&text("-2.5")), Some(-2));
        assert_eq!(coerce_integer(&FieldValue::Float(7.99)), Some(7));
    }

    #[test]
    fn test_coerce_integer_exact_for_large_values() {
        assert_eq!(coerce_integer(&text("9007199254740993")), Some(9_007_199_254_740_993));
        assert_eq!(coerce_integer(&FieldValue::Int(i64::MAX)), Some(i64::MAX));
    }

    #[test]
    fn test_coerce_integer_rejects_non_numeric() {
        assert_eq!(coerce_integer(&text("abc")), None);
        assert_eq!(coerce_integer(&FieldValue::Null), None);
        assert_eq!(coerce_integer(&text("1e30")), None);
    }

    #[test]
    fn test_coerce_i32_range() {
        assert_eq!(coerce_i32(&text("12")), Some(12));
        assert_eq!(coerce_i32(&text("3000000000")), None);
    }

    #[test]
    fn test_coerce_text() {
        assert_eq!(coerce_text(&text("Consumer")), Some("Consumer".to_string()));
        assert_eq!(coerce_text(&FieldValue::Int(725)), Some("725".to_string()));
        assert_eq!(coerce_text(&FieldValue::Null), None);
    }

    #[test]
    fn test_coerce_timestamp_source_format() {
        let ts = coerce_timestamp(&text("1/31/2018 22:56")).unwrap();
        assert_eq!((ts.year(), ts.month(), ts.day()), (2018, 1, 31));
        assert_eq!((ts.hour(), ts.minute()), (22, 56));
    }

    #[test]
    fn test_coerce_timestamp_iso_and_date_only() {
        assert!(coerce_timestamp(&text("2017-05-02 10:00:00")).is_some());
        let midnight = coerce_timestamp(&text("2017-05-02")).unwrap();
        assert_eq!(midnight.hour(), 0);
    }

    #[test]
    fn test_coerce_timestamp_malformed() {
        assert_eq!(coerce_timestamp(&text("yesterday")), None);
        assert_eq!(coerce_timestamp(&text("13/45/2018 10:00")), None);
        assert_eq!(coerce_timestamp(&FieldValue::Null), None);
    }
}
