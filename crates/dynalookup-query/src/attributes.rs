//! Attribute spec mini-language.
//!
//! A spec is a comma separated list of fields. Each field is one of
//!
//! - `attribute` - label and path are both `attribute`
//! - `Label:attribute`
//! - `Label:parser:attribute` - value is reformatted by `parser`
//!
//! Tokens are whitespace-trimmed and parser names are case-insensitive.

use crate::error::{DataError, Result};
use serde::{Serialize, Serializer};
use std::fmt;

/// Value parser attached to an attribute rule
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub enum ValueParser {
    DateIso,
    DateHttp,
    DateRfc2822,
    DateSql,
    DateSeconds,
    DateMillis,
    /// Unrecognized parser name; the value passes through unchanged
    Other(String),
}

impl ValueParser {
    pub fn from_name(name: &str) -> Self {
        let name = name.trim().to_lowercase();
        match name.as_str() {
            "date-iso" => ValueParser::DateIso,
            "date-http" => ValueParser::DateHttp,
            "date-rfc2822" => ValueParser::DateRfc2822,
            "date-sql" => ValueParser::DateSql,
            "date-seconds" => ValueParser::DateSeconds,
            "date-millis" => ValueParser::DateMillis,
            _ => ValueParser::Other(name),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            ValueParser::DateIso => "date-iso",
            ValueParser::DateHttp => "date-http",
            ValueParser::DateRfc2822 => "date-rfc2822",
            ValueParser::DateSql => "date-sql",
            ValueParser::DateSeconds => "date-seconds",
            ValueParser::DateMillis => "date-millis",
            ValueParser::Other(name) => name,
        }
    }
}

impl fmt::Display for ValueParser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl Serialize for ValueParser {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

/// One compiled field of an attribute spec
#[derive(Debug, Clone, Eq, PartialEq, Serialize)]
pub struct AttributeRule {
    /// Display label; an empty label renders the bare value
    pub label: String,
    /// Dotted/bracket path into the record
    pub path: String,
    pub parser: Option<ValueParser>,
}

impl AttributeRule {
    pub fn new(label: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            path: path.into(),
            parser: None,
        }
    }

    pub fn with_parser(mut self, parser: ValueParser) -> Self {
        self.parser = Some(parser);
        self
    }

    /// `"label: value"`, or the bare value when the label is empty
    pub fn render(&self, value: &str) -> String {
        if self.label.is_empty() {
            value.to_string()
        } else {
            format!("{}: {}", self.label, value)
        }
    }
}

/// Compile an attribute spec into its rules, preserving order.
///
/// A blank spec yields no rules. Fields with more than three tokens or an
/// empty attribute path are rejected.
pub fn parse_attribute_spec(spec: &str) -> Result<Vec<AttributeRule>> {
    if spec.trim().is_empty() {
        return Ok(Vec::new());
    }

    spec.split(',')
        .enumerate()
        .map(|(position, field)| parse_field(position, field))
        .collect()
}

/// Compile only the first field of a spec.
///
/// Fields after the first are never read, so they are not validated.
pub fn parse_first_rule(spec: &str) -> Result<Option<AttributeRule>> {
    match spec.split(',').next() {
        Some(field) if !field.trim().is_empty() => parse_field(0, field).map(Some),
        _ => Ok(None),
    }
}

fn parse_field(position: usize, field: &str) -> Result<AttributeRule> {
    let tokens: Vec<&str> = field.split(':').map(str::trim).collect();

    let rule = match tokens.as_slice() {
        [attribute] => AttributeRule::new(*attribute, *attribute),
        [label, attribute] => AttributeRule::new(*label, *attribute),
        [label, parser, attribute] => {
            AttributeRule::new(*label, *attribute).with_parser(ValueParser::from_name(parser))
        }
        _ => {
            return Err(DataError::invalid_configuration(format!(
                "attribute field {} ('{}') has {} ':'-separated tokens, expected 1 to 3",
                position + 1,
                field.trim(),
                tokens.len()
            )))
        }
    };

    if rule.path.is_empty() {
        return Err(DataError::invalid_configuration(format!(
            "attribute field {} ('{}') has no attribute path",
            position + 1,
            field.trim()
        )));
    }

    Ok(rule)
}
