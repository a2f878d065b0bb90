use std::sync::OnceLock;

use chrono::NaiveDate;
use regex::Regex;

use crate::models::{FieldKind, Value};

/// Tried in order on `day month year` once a month-name cell has been
/// split into its parts.
const MONTH_NAME_FORMATS: [&str; 2] = ["%d %b %Y", "%d %B %Y"];

fn decimal_re() -> &'static Regex {
    static DECIMAL_RE: OnceLock<Regex> = OnceLock::new();
    DECIMAL_RE.get_or_init(|| {
        Regex::new(r"[-+]?[0-9]+(?:\.[0-9]+)?")
            .expect("valid decimal regex")
    })
}

fn date_re() -> &'static Regex {
    static DATE_RE: OnceLock<Regex> = OnceLock::new();
    DATE_RE.get_or_init(|| {
        Regex::new(r"^([0-9]{1,4})[\s/.\-]+([0-9]{1,2})[\s/.\-]+([0-9]{1,4})(?:[\sT].*)?$")
            .expect("valid date regex")
    })
}

fn month_name_date_re() -> &'static Regex {
    static MONTH_NAME_DATE_RE: OnceLock<Regex> = OnceLock::new();
    MONTH_NAME_DATE_RE.get_or_init(|| {
        Regex::new(
            r"^([0-9]{1,2})[\s/.\-]+([A-Za-z]{3,9})\.?[\s/.\-]+([0-9]{2,4})(?:[\sT].*)?$",
        )
        .expect("valid month name date regex")
    })
}

/// Coerces one raw cell. Never fails: unparseable input becomes
/// `Value::Missing`, except free text which is passed through as-is.
pub fn coerce(raw: &str, kind: FieldKind) -> Value {
    match kind {
        FieldKind::Rating => rating(raw).map_or(Value::Missing, Value::Number),
        FieldKind::Decimal => decimal(raw).map_or(Value::Missing, Value::Number),
        FieldKind::Date => date(raw).map_or(Value::Missing, Value::Date),
        FieldKind::Text => Value::Text(raw.to_string()),
    }
}

/// First digit character in the cell. No range check.
pub fn rating(raw: &str) -> Option<f64> {
    raw.chars()
        .find(char::is_ascii_digit)
        .and_then(|c| c.to_digit(10))
        .map(f64::from)
}

pub fn decimal(raw: &str) -> Option<f64> {
    let normalized = raw.replace(',', ".");
    decimal_re()
        .find(&normalized)
        .and_then(|m| m.as_str().parse::<f64>().ok())
}

/// Day-first date. A four digit leading group is read as year-first
/// (`2024-01-15`); two digit years land in 2000-2099. Month names, full or
/// abbreviated, are accepted in place of the month number
/// (`15-Jan-2024`, `15 January 2024`). Anything after the date separated by
/// whitespace or `T` (a time of day) is ignored.
pub fn date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    numeric_date(raw).or_else(|| month_name_date(raw))
}

fn numeric_date(raw: &str) -> Option<NaiveDate> {
    let caps = date_re().captures(raw)?;
    let first = caps.get(1)?.as_str();
    let month: u32 = caps.get(2)?.as_str().parse().ok()?;
    let last = caps.get(3)?.as_str();

    let (year, day) = if first.len() == 4 {
        (first.parse::<i32>().ok()?, last.parse::<u32>().ok()?)
    } else {
        (full_year(last)?, first.parse::<u32>().ok()?)
    };

    NaiveDate::from_ymd_opt(year, month, day)
}

fn month_name_date(raw: &str) -> Option<NaiveDate> {
    let caps = month_name_date_re().captures(raw)?;
    let day = caps.get(1)?.as_str();
    let month = caps.get(2)?.as_str();
    let year = full_year(caps.get(3)?.as_str())?;

    let canonical = format!("{day} {month} {year}");
    MONTH_NAME_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(&canonical, format).ok())
}

fn full_year(raw: &str) -> Option<i32> {
    match raw.len() {
        4 => raw.parse().ok(),
        2 => raw.parse::<i32>().ok().map(|year| 2000 + year),
        _ => None,
    }
}
