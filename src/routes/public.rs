//! Public share-link routes.
//!
//! DESIGN
//! ======
//! `/form/{id}` serves a plain HTML form that posts back to itself, so a
//! respondent needs nothing beyond a browser. Private and unknown forms get
//! the same "not found" page. A JSON twin of the submit endpoint lives under
//! `/api/public` for scripted clients.

use axum::Form as UrlEncoded;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Json, Response};
use serde_json::Value;

use crate::model::{Answers, FieldType, Form, FormSubmission};
use crate::render::PageRenderer;
use crate::routes::error::ApiError;
use crate::state::AppState;
use crate::store::StoreError;
use crate::validation::ValidationErrors;

pub const NOT_FOUND_HEADING: &str = "Form not found";
pub const THANK_YOU_HEADING: &str = "Thank you!";
pub const THANK_YOU_MESSAGE: &str = "Your response has been recorded.";

fn form_action(form_id: &str) -> String {
    format!("/form/{form_id}")
}

fn not_found_page(pages: &PageRenderer, err: &StoreError) -> Result<Response, ApiError> {
    let html = pages.message_page(NOT_FOUND_HEADING, &err.to_string())?;
    Ok((StatusCode::NOT_FOUND, Html(html)).into_response())
}

/// Fold urlencoded pairs into answers. Checkbox fields collect every value
/// into an array; for any other field the last value wins.
pub(crate) fn answers_from_pairs(form: &Form, pairs: Vec<(String, String)>) -> Answers {
    let mut answers = Answers::new();
    for (key, value) in pairs {
        let is_checkbox = form.field(&key).is_some_and(|f| f.field_type == FieldType::Checkbox);
        if is_checkbox {
            let slot = answers.entry(key).or_insert_with(|| Value::Array(Vec::new()));
            if let Value::Array(items) = slot {
                items.push(Value::String(value));
            }
        } else {
            answers.insert(key, Value::String(value));
        }
    }
    answers
}

/// `GET /form/:id`
pub async fn show_form(State(state): State<AppState>, Path(form_id): Path<String>) -> Result<Response, ApiError> {
    let store = state.store.read().await;
    match store.get_public_form(&form_id) {
        Ok(form) => {
            let html =
                state.pages.form_page(form, &form_action(&form_id), &Answers::new(), &ValidationErrors::new())?;
            Ok(Html(html).into_response())
        }
        Err(err) => not_found_page(&state.pages, &err),
    }
}

/// `POST /form/:id` — urlencoded submit. Failing answers re-render the form
/// with the entered values and per-field messages.
pub async fn submit_form(
    State(state): State<AppState>,
    Path(form_id): Path<String>,
    UrlEncoded(pairs): UrlEncoded<Vec<(String, String)>>,
) -> Result<Response, ApiError> {
    let mut store = state.store.write().await;
    let form = match store.get_public_form(&form_id) {
        Ok(form) => form.clone(),
        Err(err) => return not_found_page(&state.pages, &err),
    };

    let answers = answers_from_pairs(&form, pairs);
    match store.add_submission(&form_id, answers.clone()) {
        Ok(_) => Ok(Html(state.pages.message_page(THANK_YOU_HEADING, THANK_YOU_MESSAGE)?).into_response()),
        Err(StoreError::Validation(errors)) => {
            let html = state.pages.form_page(&form, &form_action(&form_id), &answers, &errors)?;
            Ok((StatusCode::UNPROCESSABLE_ENTITY, Html(html)).into_response())
        }
        Err(err) => Err(err.into()),
    }
}

/// `POST /api/public/forms/:id/submissions`
pub async fn submit_json(
    State(state): State<AppState>,
    Path(form_id): Path<String>,
    Json(answers): Json<Answers>,
) -> Result<(StatusCode, Json<FormSubmission>), ApiError> {
    let mut store = state.store.write().await;
    store.get_public_form(&form_id)?;
    let submission = store.add_submission(&form_id, answers)?;
    Ok((StatusCode::CREATED, Json(submission)))
}

#[cfg(test)]
#[path = "public_test.rs"]
mod tests;
