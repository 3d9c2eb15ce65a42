//! Field schema → input widget dispatch, and the server-rendered public page.
//!
//! DESIGN
//! ======
//! `widget_for` is the single switch from a field type to the control it
//! renders as. API clients get the same decision as serializable
//! `WidgetSpec`s, and the public HTML page is produced from those specs, so
//! the JSON and HTML views cannot disagree about a field.
//!
//! Pages are Handlebars templates under `src/templates/`, compiled once into
//! a `PageRenderer` held in `AppState`.

use handlebars::Handlebars;
use serde::Serialize;
use serde_json::Value;

use crate::error::ErrorCode;
use crate::model::{Answers, FieldType, Form, FormField};
use crate::validation::ValidationErrors;

pub const SELECT_PLACEHOLDER: &str = "Select an option";
pub const DATE_PLACEHOLDER: &str = "Pick a date";

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "widget", rename_all = "snake_case")]
pub enum Widget {
    Input { input_type: &'static str },
    TextArea,
    Select { options: Vec<String> },
    CheckboxGroup { options: Vec<String> },
    RadioGroup { options: Vec<String> },
    DatePicker,
    FileInput,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WidgetSpec {
    pub field_id: String,
    pub label: String,
    pub placeholder: Option<String>,
    pub required: bool,
    #[serde(flatten)]
    pub widget: Widget,
}

#[must_use]
pub fn widget_for(field: &FormField) -> Widget {
    let options = || field.options().to_vec();
    match field.field_type {
        FieldType::Text => Widget::Input { input_type: "text" },
        FieldType::Email => Widget::Input { input_type: "email" },
        FieldType::Number => Widget::Input { input_type: "number" },
        FieldType::Textarea => Widget::TextArea,
        FieldType::Select => Widget::Select { options: options() },
        FieldType::Checkbox => Widget::CheckboxGroup { options: options() },
        FieldType::Radio => Widget::RadioGroup { options: options() },
        FieldType::Date => Widget::DatePicker,
        FieldType::File => Widget::FileInput,
    }
}

#[must_use]
pub fn describe_field(field: &FormField) -> WidgetSpec {
    let fallback = match field.field_type {
        FieldType::Select => Some(SELECT_PLACEHOLDER),
        FieldType::Date => Some(DATE_PLACEHOLDER),
        _ => None,
    };
    let placeholder = field
        .placeholder
        .clone()
        .filter(|p| !p.is_empty())
        .or_else(|| fallback.map(str::to_owned));

    WidgetSpec {
        field_id: field.id.clone(),
        label: field.label.clone(),
        placeholder,
        required: field.validation.is_required(),
        widget: widget_for(field),
    }
}

#[must_use]
pub fn describe_form(form: &Form) -> Vec<WidgetSpec> {
    form.fields.iter().map(describe_field).collect()
}

// =============================================================================
// HTML
// =============================================================================

const FORM_PAGE: &str = "form_page";
const MESSAGE_PAGE: &str = "message_page";

#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("page template error: {0}")]
    Template(#[from] Box<handlebars::TemplateError>),
    #[error("page render error: {0}")]
    Render(#[from] handlebars::RenderError),
}

impl ErrorCode for RenderError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Template(_) => "E_PAGE_TEMPLATE",
            Self::Render(_) => "E_PAGE_RENDER",
        }
    }
}

impl From<handlebars::TemplateError> for RenderError {
    fn from(err: handlebars::TemplateError) -> Self {
        Self::Template(Box::new(err))
    }
}

#[derive(Serialize)]
struct FormPageView<'a> {
    title: &'a str,
    description: &'a str,
    action: &'a str,
    fields: Vec<FieldView>,
}

#[derive(Serialize)]
struct FieldView {
    id: String,
    label: String,
    required: bool,
    placeholder: Option<String>,
    error: Option<String>,
    kind: &'static str,
    input_type: &'static str,
    value: String,
    choices: Vec<ChoiceView>,
}

#[derive(Serialize)]
struct ChoiceView {
    dom_id: String,
    name: String,
    input_type: &'static str,
    value: String,
    chosen: bool,
}

#[derive(Serialize)]
struct MessagePageView<'a> {
    title: &'a str,
    message: &'a str,
}

/// Handlebars registry holding the public pages. Every `{{value}}` is
/// HTML-escaped by the registry.
pub struct PageRenderer {
    registry: Handlebars<'static>,
}

impl PageRenderer {
    /// # Errors
    ///
    /// Returns `Template` if a bundled template fails to parse.
    pub fn new() -> Result<Self, RenderError> {
        let mut registry = Handlebars::new();
        registry.register_partial("page_head", include_str!("templates/page_head.hbs"))?;
        registry.register_partial("page_foot", include_str!("templates/page_foot.hbs"))?;
        registry.register_template_string(FORM_PAGE, include_str!("templates/form_page.hbs"))?;
        registry.register_template_string(MESSAGE_PAGE, include_str!("templates/message_page.hbs"))?;
        Ok(Self { registry })
    }

    /// Render the public submission page. `values` repopulates the inputs and
    /// `errors` adds a message under each failing field.
    ///
    /// # Errors
    ///
    /// Returns `Render` if the template cannot be filled.
    pub fn form_page(
        &self,
        form: &Form,
        action: &str,
        values: &Answers,
        errors: &ValidationErrors,
    ) -> Result<String, RenderError> {
        let view = FormPageView {
            title: &form.title,
            description: &form.description,
            action,
            fields: describe_form(form)
                .into_iter()
                .map(|spec| {
                    let error = errors.get(&spec.field_id).map(str::to_owned);
                    field_view(spec, values, error)
                })
                .collect(),
        };
        Ok(self.registry.render(FORM_PAGE, &view)?)
    }

    /// A page with a heading and one paragraph, for "not found" and "thank you".
    ///
    /// # Errors
    ///
    /// Returns `Render` if the template cannot be filled.
    pub fn message_page(&self, heading: &str, message: &str) -> Result<String, RenderError> {
        Ok(self.registry.render(MESSAGE_PAGE, &MessagePageView { title: heading, message })?)
    }
}

fn field_view(spec: WidgetSpec, values: &Answers, error: Option<String>) -> FieldView {
    let value = values.get(&spec.field_id);
    let text = value.map(display_value).unwrap_or_default();
    let (kind, input_type, options) = match spec.widget {
        Widget::Input { input_type } => ("input", input_type, Vec::new()),
        Widget::DatePicker => ("input", "date", Vec::new()),
        Widget::FileInput => ("input", "file", Vec::new()),
        Widget::TextArea => ("textarea", "", Vec::new()),
        Widget::Select { options } => ("select", "", options),
        Widget::CheckboxGroup { options } => ("group", "checkbox", options),
        Widget::RadioGroup { options } => ("group", "radio", options),
    };
    let choices = options
        .into_iter()
        .enumerate()
        .map(|(i, option)| ChoiceView {
            dom_id: format!("{}-{i}", spec.field_id),
            name: spec.field_id.clone(),
            input_type,
            chosen: is_chosen(value, &option),
            value: option,
        })
        .collect();

    FieldView {
        value: if input_type == "file" { String::new() } else { text },
        id: spec.field_id,
        label: spec.label,
        required: spec.required,
        placeholder: spec.placeholder,
        error,
        kind,
        input_type,
        choices,
    }
}

fn is_chosen(value: Option<&Value>, option: &str) -> bool {
    match value {
        Some(Value::String(s)) => s == option,
        Some(Value::Array(items)) => items.iter().any(|item| item.as_str() == Some(option)),
        _ => false,
    }
}

/// Plain-text rendering of an answer, as shown in the submissions table.
#[must_use]
pub fn display_value(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Array(items) => items.iter().map(display_value).collect::<Vec<_>>().join(", "),
        other => other.to_string(),
    }
}

#[cfg(test)]
#[path = "render_test.rs"]
mod tests;
