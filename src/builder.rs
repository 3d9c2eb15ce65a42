//! Form builder operations on a draft's field list.
//!
//! DESIGN
//! ======
//! Every operation edits a `Form` in place and leaves it to the caller to
//! persist the result. `check_schema` is the save gate: the store refuses
//! any form that fails it, so a stored form always has a title, at least one
//! field, unique field ids, and options only where the type uses them.

use std::collections::HashSet;

use regex::Regex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ErrorCode;
use crate::model::{FieldType, FieldValidation, Form, FormField};

const DEFAULT_OPTION_COUNT: usize = 3;

// =============================================================================
// ERRORS
// =============================================================================

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum BuilderError {
    #[error("field not found: {0}")]
    FieldNotFound(String),
    #[error("field index out of range: {0}")]
    IndexOutOfRange(usize),
    #[error("field {0} does not take options")]
    NotAChoiceField(String),
    #[error("option index out of range: {0}")]
    OptionOutOfRange(usize),
    #[error("a choice field needs at least one option")]
    LastOption,
}

impl ErrorCode for BuilderError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::FieldNotFound(_) => "E_FIELD_NOT_FOUND",
            Self::IndexOutOfRange(_) | Self::OptionOutOfRange(_) => "E_OUT_OF_RANGE",
            Self::NotAChoiceField(_) => "E_NOT_A_CHOICE_FIELD",
            Self::LastOption => "E_LAST_OPTION",
        }
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SchemaError {
    #[error("Form title is required")]
    MissingTitle,
    #[error("Form must have at least one field")]
    NoFields,
    #[error("duplicate field id: {0}")]
    DuplicateFieldId(String),
    #[error("field {0} has an empty id")]
    EmptyFieldId(usize),
    #[error("field {0} does not take options")]
    UnexpectedOptions(String),
    #[error("field {0} needs at least one option")]
    MissingOptions(String),
    #[error("field {field}: invalid pattern: {reason}")]
    InvalidPattern { field: String, reason: String },
    #[error("field {0}: minimum exceeds maximum")]
    InvertedBounds(String),
}

impl ErrorCode for SchemaError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::MissingTitle => "E_TITLE_REQUIRED",
            Self::NoFields => "E_NO_FIELDS",
            Self::DuplicateFieldId(_) | Self::EmptyFieldId(_) => "E_FIELD_ID",
            Self::UnexpectedOptions(_) | Self::MissingOptions(_) => "E_FIELD_OPTIONS",
            Self::InvalidPattern { .. } => "E_FIELD_PATTERN",
            Self::InvertedBounds(_) => "E_FIELD_BOUNDS",
        }
    }
}

// =============================================================================
// FIELD OPS
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Up,
    Down,
}

/// Partial update for one field. `None` leaves the attribute untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldPatch {
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub placeholder: Option<String>,
    #[serde(default)]
    pub options: Option<Vec<String>>,
    #[serde(default)]
    pub validation: Option<FieldValidation>,
}

fn new_field_id() -> String {
    format!("field-{}", Uuid::new_v4().simple())
}

/// A fresh field of `field_type` with builder defaults.
#[must_use]
pub fn new_field(field_type: FieldType) -> FormField {
    let options = field_type
        .is_choice()
        .then(|| (1..=DEFAULT_OPTION_COUNT).map(|n| format!("Option {n}")).collect());
    FormField {
        id: new_field_id(),
        field_type,
        label: format!("New {field_type} field"),
        placeholder: Some(format!("Enter {field_type}...")),
        options,
        validation: FieldValidation { required: Some(false), ..FieldValidation::default() },
    }
}

/// Append a new field and return its id.
pub fn add_field(form: &mut Form, field_type: FieldType) -> String {
    let field = new_field(field_type);
    let id = field.id.clone();
    form.fields.push(field);
    id
}

fn field_mut<'a>(form: &'a mut Form, field_id: &str) -> Result<&'a mut FormField, BuilderError> {
    form.fields
        .iter_mut()
        .find(|field| field.id == field_id)
        .ok_or_else(|| BuilderError::FieldNotFound(field_id.to_owned()))
}

/// # Errors
///
/// Returns `FieldNotFound` for an unknown id.
pub fn update_field(form: &mut Form, field_id: &str, patch: FieldPatch) -> Result<(), BuilderError> {
    let field = field_mut(form, field_id)?;
    if let Some(label) = patch.label {
        field.label = label;
    }
    if let Some(placeholder) = patch.placeholder {
        field.placeholder = Some(placeholder).filter(|p| !p.is_empty());
    }
    if let Some(options) = patch.options {
        if !field.field_type.is_choice() {
            return Err(BuilderError::NotAChoiceField(field_id.to_owned()));
        }
        field.options = Some(options);
    }
    if let Some(validation) = patch.validation {
        field.validation = validation;
    }
    Ok(())
}

/// # Errors
///
/// Returns `FieldNotFound` for an unknown id.
pub fn delete_field(form: &mut Form, field_id: &str) -> Result<FormField, BuilderError> {
    let index = form
        .field_index(field_id)
        .ok_or_else(|| BuilderError::FieldNotFound(field_id.to_owned()))?;
    Ok(form.fields.remove(index))
}

/// Copy a field to the end of the form under a new id.
///
/// # Errors
///
/// Returns `FieldNotFound` for an unknown id.
pub fn duplicate_field(form: &mut Form, field_id: &str) -> Result<String, BuilderError> {
    let source = form
        .field(field_id)
        .ok_or_else(|| BuilderError::FieldNotFound(field_id.to_owned()))?;
    let copy = FormField { id: new_field_id(), label: format!("{} (copy)", source.label), ..source.clone() };
    let id = copy.id.clone();
    form.fields.push(copy);
    Ok(id)
}

/// Swap a field with its neighbour. Moving past either end is a no-op.
///
/// # Errors
///
/// Returns `FieldNotFound` for an unknown id.
pub fn move_field(form: &mut Form, field_id: &str, direction: Direction) -> Result<(), BuilderError> {
    let index = form
        .field_index(field_id)
        .ok_or_else(|| BuilderError::FieldNotFound(field_id.to_owned()))?;
    let target = match direction {
        Direction::Up if index > 0 => index - 1,
        Direction::Down if index + 1 < form.fields.len() => index + 1,
        _ => return Ok(()),
    };
    form.fields.swap(index, target);
    Ok(())
}

/// Drag-and-drop: remove the field at `from` and insert it at `to`.
///
/// # Errors
///
/// Returns `IndexOutOfRange` if either index is past the end.
pub fn reorder(form: &mut Form, from: usize, to: usize) -> Result<(), BuilderError> {
    let len = form.fields.len();
    if from >= len {
        return Err(BuilderError::IndexOutOfRange(from));
    }
    if to >= len {
        return Err(BuilderError::IndexOutOfRange(to));
    }
    let moved = form.fields.remove(from);
    form.fields.insert(to, moved);
    Ok(())
}

// =============================================================================
// OPTION OPS
// =============================================================================

fn options_mut<'a>(form: &'a mut Form, field_id: &str) -> Result<&'a mut Vec<String>, BuilderError> {
    let field = field_mut(form, field_id)?;
    if !field.field_type.is_choice() {
        return Err(BuilderError::NotAChoiceField(field_id.to_owned()));
    }
    Ok(field.options.get_or_insert_with(Vec::new))
}

/// Append `Option {n+1}` and return its index.
///
/// # Errors
///
/// Fails for unknown or non-choice fields.
pub fn add_option(form: &mut Form, field_id: &str) -> Result<usize, BuilderError> {
    let options = options_mut(form, field_id)?;
    options.push(format!("Option {}", options.len() + 1));
    Ok(options.len() - 1)
}

/// # Errors
///
/// Fails for unknown or non-choice fields and out-of-range indexes.
pub fn update_option(form: &mut Form, field_id: &str, index: usize, value: String) -> Result<(), BuilderError> {
    let options = options_mut(form, field_id)?;
    let slot = options.get_mut(index).ok_or(BuilderError::OptionOutOfRange(index))?;
    *slot = value;
    Ok(())
}

/// # Errors
///
/// Fails for unknown or non-choice fields, out-of-range indexes, and when
/// `index` names the last remaining option.
pub fn remove_option(form: &mut Form, field_id: &str, index: usize) -> Result<String, BuilderError> {
    let options = options_mut(form, field_id)?;
    if index >= options.len() {
        return Err(BuilderError::OptionOutOfRange(index));
    }
    if options.len() <= 1 {
        return Err(BuilderError::LastOption);
    }
    Ok(options.remove(index))
}

// =============================================================================
// SCHEMA CHECK
// =============================================================================

/// Save gate for a form's metadata and fields.
///
/// # Errors
///
/// Returns the first structural problem found.
pub fn check_schema(form: &Form) -> Result<(), SchemaError> {
    if form.title.trim().is_empty() {
        return Err(SchemaError::MissingTitle);
    }
    if form.fields.is_empty() {
        return Err(SchemaError::NoFields);
    }
    check_fields(form)
}

/// The save gate for imported backups. Same as `check_schema` except that a
/// form with no fields passes.
///
/// # Errors
///
/// Returns the first problem found.
pub fn check_imported(form: &Form) -> Result<(), SchemaError> {
    if form.title.trim().is_empty() {
        return Err(SchemaError::MissingTitle);
    }
    check_fields(form)
}

fn check_fields(form: &Form) -> Result<(), SchemaError> {
    let mut seen = HashSet::with_capacity(form.fields.len());
    for (index, field) in form.fields.iter().enumerate() {
        if field.id.trim().is_empty() {
            return Err(SchemaError::EmptyFieldId(index));
        }
        if !seen.insert(field.id.as_str()) {
            return Err(SchemaError::DuplicateFieldId(field.id.clone()));
        }
        check_field(field)?;
    }
    Ok(())
}

fn check_field(field: &FormField) -> Result<(), SchemaError> {
    match (field.field_type.is_choice(), field.options.as_ref()) {
        (true, None) => return Err(SchemaError::MissingOptions(field.id.clone())),
        (true, Some(options)) if options.is_empty() => return Err(SchemaError::MissingOptions(field.id.clone())),
        (false, Some(_)) => return Err(SchemaError::UnexpectedOptions(field.id.clone())),
        _ => {}
    }

    let rules = &field.validation;
    if let Some(pattern) = rules.pattern.as_deref() {
        if let Err(e) = Regex::new(pattern) {
            return Err(SchemaError::InvalidPattern { field: field.id.clone(), reason: e.to_string() });
        }
    }
    if let (Some(min), Some(max)) = (rules.min_length, rules.max_length) {
        if min > max {
            return Err(SchemaError::InvertedBounds(field.id.clone()));
        }
    }
    if let (Some(min), Some(max)) = (rules.min, rules.max) {
        if min > max {
            return Err(SchemaError::InvertedBounds(field.id.clone()));
        }
    }
    Ok(())
}

#[cfg(test)]
#[path = "builder_test.rs"]
mod tests;
