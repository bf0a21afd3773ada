//! Attribute value extraction and reformatting.

use crate::attributes::{AttributeRule, ValueParser};
use crate::types::{MillisPolicy, RawRecord};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde_json::Value;
use tracing::debug;

/// Short date-time rendering shared by every date parser, e.g. `3/4/2021, 3:05 PM`
const SHORT_DATETIME_FORMAT: &str = "%-m/%-d/%Y, %-I:%M %p";

/// Look up `path` in a record.
///
/// Paths use dots for object keys and brackets for array indices or quoted
/// keys (`items[0].name`, `meta["content-type"]`). A key equal to the whole
/// path takes precedence. `None` means the path is absent, which is
/// distinct from a present `null`.
pub fn lookup_path<'a>(record: &'a RawRecord, path: &str) -> Option<&'a Value> {
    if let Some(value) = record.get(path) {
        return Some(value);
    }

    let segments = path_segments(path);
    let (first, rest) = segments.split_first()?;
    let mut current = record.get(first.as_str())?;

    for segment in rest {
        current = match current {
            Value::Object(map) => map.get(segment.as_str())?,
            Value::Array(items) => items.get(segment.parse::<usize>().ok()?)?,
            _ => return None,
        };
    }

    Some(current)
}

fn path_segments(path: &str) -> Vec<String> {
    let mut segments = Vec::new();
    let mut current = String::new();
    let mut chars = path.chars();

    while let Some(c) = chars.next() {
        match c {
            '.' => {
                if !current.is_empty() {
                    segments.push(std::mem::take(&mut current));
                }
            }
            '[' => {
                if !current.is_empty() {
                    segments.push(std::mem::take(&mut current));
                }
                let inner: String = chars.by_ref().take_while(|c| *c != ']').collect();
                let key = inner.trim().trim_matches(|c| c == '"' || c == '\'');
                segments.push(key.to_string());
            }
            _ => current.push(c),
        }
    }

    if !current.is_empty() {
        segments.push(current);
    }

    segments
}

/// Whether a value counts as present for summary tags and detail attributes.
/// `null`, `false`, `0` and `""` do not.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(true),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Render a value for a tag or title. Strings are not quoted; arrays and
/// objects render as compact JSON.
pub fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Resolve a rule against a record, applying its parser.
///
/// Absent paths yield `None` and are never handed to the parser.
pub fn resolve(record: &RawRecord, rule: &AttributeRule, millis: MillisPolicy) -> Option<Value> {
    let raw = lookup_path(record, &rule.path)?;
    Some(apply_rule_parser(raw, rule, millis))
}

/// Like [`resolve`], but values that are not truthy count as absent
pub fn resolve_truthy(
    record: &RawRecord,
    rule: &AttributeRule,
    millis: MillisPolicy,
) -> Option<Value> {
    let raw = lookup_path(record, &rule.path).filter(|v| is_truthy(v))?;
    Some(apply_rule_parser(raw, rule, millis))
}

fn apply_rule_parser(raw: &Value, rule: &AttributeRule, millis: MillisPolicy) -> Value {
    match &rule.parser {
        Some(parser) => apply_parser(raw, parser, millis),
        None => raw.clone(),
    }
}

/// Reformat a value with `parser`. Values the parser cannot interpret are
/// returned unchanged.
pub fn apply_parser(value: &Value, parser: &ValueParser, millis: MillisPolicy) -> Value {
    let parsed = match parser {
        ValueParser::DateIso => value.as_str().and_then(parse_iso),
        ValueParser::DateHttp => value.as_str().and_then(parse_http),
        ValueParser::DateRfc2822 => value.as_str().and_then(parse_rfc2822),
        ValueParser::DateSql => value.as_str().and_then(parse_sql),
        ValueParser::DateSeconds => epoch_number(value).and_then(from_epoch_seconds),
        ValueParser::DateMillis => epoch_number(value).and_then(|n| match millis {
            MillisPolicy::Seconds => {
                debug!(value = n, "date-millis value read as epoch seconds");
                from_epoch_seconds(n)
            }
            MillisPolicy::Millis => from_epoch_seconds(n / 1000.0),
        }),
        ValueParser::Other(_) => None,
    };

    match parsed {
        Some(dt) => Value::String(format_short(&dt)),
        None => value.clone(),
    }
}

fn format_short(dt: &DateTime<Utc>) -> String {
    dt.format(SHORT_DATETIME_FORMAT).to_string()
}

fn parse_iso(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    parse_naive(s, &["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M"], &["%Y-%m-%d"])
}

fn parse_http(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc2822(s) {
        return Some(dt.with_timezone(&Utc));
    }
    // RFC 850 and asctime forms
    parse_naive(s, &["%A, %d-%b-%y %H:%M:%S GMT", "%a %b %e %H:%M:%S %Y"], &[])
}

fn parse_rfc2822(s: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc2822(s.trim())
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

fn parse_sql(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();
    for format in ["%Y-%m-%d %H:%M:%S%.f %z", "%Y-%m-%d %H:%M:%S%.f %:z"] {
        if let Ok(dt) = DateTime::parse_from_str(s, format) {
            return Some(dt.with_timezone(&Utc));
        }
    }
    parse_naive(s, &["%Y-%m-%d %H:%M:%S%.f"], &["%Y-%m-%d"])
}

fn parse_naive(s: &str, datetime_formats: &[&str], date_formats: &[&str]) -> Option<DateTime<Utc>> {
    datetime_formats
        .iter()
        .find_map(|f| NaiveDateTime::parse_from_str(s, f).ok())
        .or_else(|| {
            date_formats
                .iter()
                .find_map(|f| NaiveDate::parse_from_str(s, f).ok())
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
        .map(|naive| naive.and_utc())
}

fn epoch_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}

fn from_epoch_seconds(seconds: f64) -> Option<DateTime<Utc>> {
    if !seconds.is_finite() {
        return None;
    }
    let whole = seconds.floor();
    let nanos = (((seconds - whole) * 1e9).round() as u32).min(999_999_999);
    DateTime::from_timestamp(whole as i64, nanos)
}
