//! Answer validation engine.
//!
//! DESIGN
//! ======
//! Each field is checked in form order against the rule set its type
//! exposes in the builder. The first failing rule wins for that field, so a
//! submission reports at most one message per field. Empty answers to
//! optional fields skip every rule after the required check.
//!
//! Answers arrive as loose JSON from HTML forms and API clients alike, so
//! `normalize_answers` runs first to coerce them into the shapes the rules
//! expect.

use std::collections::BTreeMap;
use std::fmt;

use regex::Regex;
use serde::Serialize;
use serde_json::Value;
use time::format_description::well_known::Rfc3339;
use time::macros::format_description;
use time::{Date, OffsetDateTime};

use crate::model::{Answers, FieldType, Form, FormField};

pub const MSG_REQUIRED: &str = "This field is required";
pub const MSG_INVALID_FORMAT: &str = "Invalid format";
pub const MSG_INVALID_OPTION: &str = "Invalid option";
pub const MSG_INVALID_EMAIL: &str = "Invalid email address";
pub const MSG_INVALID_DATE: &str = "Invalid date";
pub const MSG_NOT_A_NUMBER: &str = "Must be a number";
pub const MSG_INVALID_VALUE: &str = "Invalid value";

/// Recorded for a file field left empty.
pub const FILE_NOT_UPLOADED: &str = "Not uploaded";

// =============================================================================
// ERRORS
// =============================================================================

/// Per-field messages, keyed by field id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors(BTreeMap<String, String>);

impl ValidationErrors {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, field_id: impl Into<String>, message: impl Into<String>) {
        self.0.insert(field_id.into(), message.into());
    }

    #[must_use]
    pub fn get(&self, field_id: &str) -> Option<&str> {
        self.0.get(field_id).map(String::as_str)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0.len() {
            1 => write!(f, "1 field failed validation"),
            n => write!(f, "{n} fields failed validation"),
        }
    }
}

impl std::error::Error for ValidationErrors {}

// =============================================================================
// NORMALIZE
// =============================================================================

/// Coerce raw answers into the shapes each field type validates against.
///
/// Keys that are not field ids of `form` are dropped.
#[must_use]
pub fn normalize_answers(form: &Form, answers: Answers) -> Answers {
    let mut out = Answers::with_capacity(answers.len());
    for (key, value) in answers {
        let Some(field) = form.field(&key) else {
            continue;
        };
        out.insert(key, normalize_value(field.field_type, value));
    }
    out
}

/// Record `FILE_NOT_UPLOADED` for every file field without an upload. Run
/// after validation so a required upload still fails as blank.
pub fn mark_missing_uploads(form: &Form, answers: &mut Answers) {
    for field in form.fields.iter().filter(|f| f.field_type == FieldType::File) {
        let missing = answers.get(&field.id).is_none_or(is_blank);
        if missing {
            answers.insert(field.id.clone(), Value::String(FILE_NOT_UPLOADED.to_owned()));
        }
    }
}

fn normalize_value(field_type: FieldType, value: Value) -> Value {
    match (field_type, value) {
        (FieldType::Number, Value::String(raw)) => {
            let trimmed = raw.trim();
            if trimmed.is_empty() {
                return Value::Null;
            }
            if let Ok(int) = trimmed.parse::<i64>() {
                return Value::from(int);
            }
            match trimmed.parse::<f64>().ok().and_then(serde_json::Number::from_f64) {
                Some(number) => Value::Number(number),
                None => Value::String(raw),
            }
        }
        (FieldType::Checkbox, Value::String(single)) => Value::Array(vec![Value::String(single)]),
        // Uploads are simulated: keep the filename only.
        (FieldType::File, Value::Object(map)) => map.get("name").cloned().unwrap_or(Value::Null),
        (_, other) => other,
    }
}

// =============================================================================
// VALIDATE
// =============================================================================

/// Validate `answers` against every field of `form`.
///
/// # Errors
///
/// Returns the per-field messages when any field fails.
pub fn validate_answers(form: &Form, answers: &Answers) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::new();
    for field in &form.fields {
        let value = answers.get(&field.id).unwrap_or(&Value::Null);
        if let Some(message) = validate_field(field, value) {
            errors.insert(field.id.clone(), message);
        }
    }

    if errors.is_empty() { Ok(()) } else { Err(errors) }
}

/// Check one answer. Returns the first failing rule's message.
#[must_use]
pub fn validate_field(field: &FormField, value: &Value) -> Option<String> {
    let rules = &field.validation;

    if is_blank(value) {
        return rules.is_required().then(|| MSG_REQUIRED.to_owned());
    }

    if let Some(message) = check_shape(field, value) {
        return Some(message.to_owned());
    }

    let ty = field.field_type;
    if ty.supports_length_rules() {
        if let Some(text) = value.as_str() {
            let len = text.chars().count();
            if let Some(min) = rules.min_length.filter(|min| len < *min) {
                return Some(format!("Must be at least {min} characters"));
            }
            if let Some(max) = rules.max_length.filter(|max| len > *max) {
                return Some(format!("Cannot exceed {max} characters"));
            }
        }
    }

    if ty.supports_range_rules() {
        if let Some(number) = as_number(value) {
            if let Some(min) = rules.min.filter(|min| number < *min) {
                return Some(format!("Must be at least {}", format_number(min)));
            }
            if let Some(max) = rules.max.filter(|max| number > *max) {
                return Some(format!("Cannot exceed {}", format_number(max)));
            }
        }
    }

    if ty.supports_pattern() {
        if let (Some(pattern), Some(text)) = (rules.pattern.as_deref(), value.as_str()) {
            if !pattern_matches(pattern, text) {
                return Some(MSG_INVALID_FORMAT.to_owned());
            }
        }
    }

    None
}

/// Missing, null, false, whitespace-only, or an empty selection.
#[must_use]
pub fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null | Value::Bool(false) => true,
        Value::String(s) => s.trim().is_empty(),
        Value::Array(items) => items.is_empty(),
        _ => false,
    }
}

fn check_shape(field: &FormField, value: &Value) -> Option<&'static str> {
    match field.field_type {
        FieldType::Number => as_number(value).is_none().then_some(MSG_NOT_A_NUMBER),
        FieldType::Email => match value.as_str() {
            Some(text) if is_email(text) => None,
            _ => Some(MSG_INVALID_EMAIL),
        },
        FieldType::Date => match value.as_str() {
            Some(text) if is_date(text) => None,
            _ => Some(MSG_INVALID_DATE),
        },
        FieldType::Select | FieldType::Radio => match value.as_str() {
            Some(choice) if is_option(field, choice) => None,
            _ => Some(MSG_INVALID_OPTION),
        },
        FieldType::Checkbox => {
            let all_valid = match value {
                Value::String(choice) => is_option(field, choice),
                Value::Array(items) => items
                    .iter()
                    .all(|item| item.as_str().is_some_and(|choice| is_option(field, choice))),
                _ => false,
            };
            (!all_valid).then_some(MSG_INVALID_OPTION)
        }
        FieldType::Text | FieldType::Textarea | FieldType::File => {
            (!value.is_string()).then_some(MSG_INVALID_VALUE)
        }
    }
}

fn is_option(field: &FormField, choice: &str) -> bool {
    // Legacy fields saved without options accept any choice.
    let options = field.options();
    options.is_empty() || options.iter().any(|option| option == choice)
}

fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok().filter(|n| n.is_finite()),
        _ => None,
    }
}

fn is_email(text: &str) -> bool {
    if text.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = text.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }
    // At least two dot-separated labels, none of them empty.
    domain.contains('.') && domain.split('.').all(|label| !label.is_empty())
}

fn is_date(text: &str) -> bool {
    Date::parse(text, format_description!("[year]-[month]-[day]")).is_ok()
        || OffsetDateTime::parse(text, &Rfc3339).is_ok()
}

/// Unanchored search. An uncompilable pattern matches nothing.
#[must_use]
pub fn pattern_matches(pattern: &str, text: &str) -> bool {
    Regex::new(pattern).is_ok_and(|re| re.is_match(text))
}

/// Render `5.0` as `5` and `2.5` as `2.5`.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{n}")
    }
}

#[cfg(test)]
#[path = "validation_test.rs"]
mod tests;
