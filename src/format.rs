//! Display formatting for report fields.
//!
//! Everything here is total: unparseable input degrades to a best-effort
//! string so a single odd field cannot abort a report half way through.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

use crate::{catalog::ActivityType, value::Value};

const LOCALE_DATE_TIME: &str = "%d/%m/%Y, %H:%M:%S";
const REPORT_DATE_TIME: &str = "%-d %B %Y, %H:%M";

/// `completed_at` -> "Completed At", `camelCaseField` -> "Camel Case Field".
pub fn format_key(key: &str) -> String {
    let mut spaced = String::with_capacity(key.len() + 8);
    let mut prev: Option<char> = None;
    for c in key.chars() {
        if c == '_' || c == '-' {
            spaced.push(' ');
        } else {
            if c.is_uppercase() && prev.is_some_and(|p| p.is_lowercase() || p.is_ascii_digit()) {
                spaced.push(' ');
            }
            spaced.push(c);
        }
        prev = Some(c);
    }
    spaced.split_whitespace().map(capitalize).collect::<Vec<_>>().join(" ")
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

pub fn format_value(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::Bool(true) => "Yes".to_string(),
        Value::Bool(false) => "No".to_string(),
        Value::Number(n) => format_number(*n),
        Value::Text(s) => s.clone(),
        Value::Date(dt) => dt.format(LOCALE_DATE_TIME).to_string(),
        Value::List(items) if items.iter().all(|item| !item.is_structured()) => {
            items.iter().map(format_value).collect::<Vec<_>>().join(", ")
        }
        Value::List(_) | Value::Record(_) => value.to_json_string(),
    }
}

pub fn format_number(n: f64) -> String {
    if n.is_nan() {
        "NaN".to_string()
    } else if n.is_infinite() {
        if n > 0.0 { "Infinity".to_string() } else { "-Infinity".to_string() }
    } else if n.fract() == 0.0 && n.abs() < 1.0e15 {
        format!("{}", n as i64)
    } else {
        format!("{}", n)
    }
}

/// Renders a timestamp as "5 March 2024, 09:30". Text that is not a
/// recognisable date is returned unchanged.
pub fn format_date_value(value: &Value) -> String {
    match value {
        Value::Date(dt) => dt.format(REPORT_DATE_TIME).to_string(),
        Value::Text(s) => format_date_text(s),
        other => format_value(other),
    }
}

pub fn format_date_text(raw: &str) -> String {
    parse_date(raw).map(|dt| dt.format(REPORT_DATE_TIME).to_string()).unwrap_or_else(|| raw.to_string())
}

pub fn format_date(dt: &DateTime<Utc>) -> String { dt.format(REPORT_DATE_TIME).to_string() }

pub(crate) fn parse_date(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(naive.and_utc());
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok().and_then(|d| d.and_hms_opt(0, 0, 0)).map(|n| n.and_utc())
}

/// `breathing` -> "Breathing Exercise"; unknown types fall back to [`format_key`].
pub fn format_activity_type(raw: &str) -> String {
    match raw.parse::<ActivityType>() {
        Ok(kind) => kind.label().to_string(),
        Err(_) => format_key(raw),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;
    use crate::value::strategies::arb_value;
    use proptest::prelude::*;

    #[test]
    fn keys_become_title_case() {
        assert_eq!(format_key("completed_at"), "Completed At");
        assert_eq!(format_key("camelCaseField"), "Camel Case Field");
        assert_eq!(format_key("gp-referral"), "Gp Referral");
        assert_eq!(format_key("gad7Score"), "Gad7 Score");
        assert_eq!(format_key("__weird--key__"), "Weird Key");
        assert_eq!(format_key(""), "");
    }

    #[test]
    fn values_dispatch_on_variant() {
        let dt = Utc.with_ymd_and_hms(2024, 3, 5, 9, 30, 15).unwrap();
        assert_eq!(format_value(&Value::Null), "");
        assert_eq!(format_value(&Value::Bool(true)), "Yes");
        assert_eq!(format_value(&Value::Bool(false)), "No");
        assert_eq!(format_value(&Value::Number(7.0)), "7");
        assert_eq!(format_value(&Value::Number(2.25)), "2.25");
        assert_eq!(format_value(&Value::text("calm")), "calm");
        assert_eq!(format_value(&Value::Date(dt)), "05/03/2024, 09:30:15");
        assert_eq!(format_value(&Value::from(vec!["walk", "read"])), "walk, read");
    }

    #[test]
    fn structured_values_fall_back_to_json() {
        let nested = Value::List(vec![Value::record([("x", Value::Number(1.0))])]);
        assert_eq!(format_value(&nested), r#"[{"x":1}]"#);
        let record = Value::record([("a", Value::Bool(true))]);
        assert_eq!(format_value(&record), r#"{"a":true}"#);
    }

    #[test]
    fn non_finite_numbers_render_like_javascript() {
        assert_eq!(format_number(f64::NAN), "NaN");
        assert_eq!(format_number(f64::INFINITY), "Infinity");
        assert_eq!(format_number(f64::NEG_INFINITY), "-Infinity");
    }

    #[test]
    fn dates_use_day_month_year() {
        assert_eq!(format_date_text("2024-03-05T09:30:00Z"), "5 March 2024, 09:30");
        assert_eq!(format_date_text("2024-03-05"), "5 March 2024, 00:00");
        assert_eq!(format_date_text("not a date"), "not a date");
        assert_eq!(format_date_text(""), "");
        assert_eq!(format_date_value(&Value::Null), "");
    }

    #[test]
    fn activity_types_have_labels() {
        assert_eq!(format_activity_type("breathing"), "Breathing Exercise");
        assert_eq!(format_activity_type("worksheet"), "Worksheet");
        assert_eq!(format_activity_type("guided_imagery"), "Guided Imagery");
    }

    proptest! {
        #[test]
        fn formatters_are_total(value in arb_value(), key in ".*") {
            let _ = format_value(&value);
            let _ = format_date_value(&value);
            let _ = format_key(&key);
            let _ = format_date_text(&key);
            let _ = format_activity_type(&key);
        }
    }
}
