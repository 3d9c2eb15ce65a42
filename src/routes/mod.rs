//! Router assembly.
//!
//! SYSTEM CONTEXT
//! ==============
//! The builder UI talks to the JSON API under `/api`. Respondents reach a
//! form through its share link at `/form/{id}`, which is server-rendered
//! HTML. Everything runs against one `AppState`.

pub mod data;
pub mod error;
pub mod fields;
pub mod forms;
pub mod public;
pub mod submissions;
pub mod templates;

use axum::Router;
use axum::http::StatusCode;
use axum::http::header::{CONTENT_DISPOSITION, CONTENT_TYPE};
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get, patch, post, put};
use serde::Serialize;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::routes::error::ApiError;
use crate::state::AppState;
use crate::store::StoreError;

/// Full application router.
pub fn app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/dashboard", get(forms::dashboard))
        .route("/api/field-types", get(forms::field_types))
        .route("/api/forms", get(forms::list_forms).post(forms::create_form))
        .route(
            "/api/forms/{id}",
            get(forms::get_form)
                .put(forms::update_form)
                .delete(forms::delete_form),
        )
        .route("/api/forms/{id}/duplicate", post(forms::duplicate_form))
        .route("/api/forms/{id}/widgets", get(forms::form_widgets))
        .route("/api/forms/{id}/fields", post(fields::add_field))
        .route("/api/forms/{id}/fields/reorder", post(fields::reorder_fields))
        .route(
            "/api/forms/{id}/fields/{field_id}",
            patch(fields::update_field).delete(fields::delete_field),
        )
        .route("/api/forms/{id}/fields/{field_id}/duplicate", post(fields::duplicate_field))
        .route("/api/forms/{id}/fields/{field_id}/move", post(fields::move_field))
        .route("/api/forms/{id}/fields/{field_id}/options", post(fields::add_option))
        .route(
            "/api/forms/{id}/fields/{field_id}/options/{index}",
            put(fields::update_option).delete(fields::remove_option),
        )
        .route(
            "/api/forms/{id}/submissions",
            get(submissions::list_submissions).post(submissions::create_submission),
        )
        .route(
            "/api/forms/{id}/submissions/{submission_id}",
            delete(submissions::delete_submission),
        )
        .route("/api/forms/{id}/export", get(submissions::export_form))
        .route("/api/templates", get(templates::list_templates))
        .route("/api/templates/{slug}", post(templates::create_from_template))
        .route("/api/export", get(data::export_all))
        .route("/api/import", post(data::import_all))
        .route("/api/settings", get(data::get_settings).put(data::update_settings))
        .route("/api/public/forms/{id}/submissions", post(public::submit_json))
        .route("/form/{id}", get(public::show_form).post(public::submit_form))
        .route("/healthz", get(healthz))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

async fn healthz() -> StatusCode {
    StatusCode::OK
}

/// Keep a download name to characters that are safe inside a quoted
/// `Content-Disposition` value.
pub(crate) fn attachment_filename(raw: &str) -> String {
    let cleaned = raw
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || matches!(c, ' ' | '-' | '_' | '.') { c } else { '_' })
        .collect::<String>();
    let trimmed = cleaned.trim();
    if trimmed.is_empty() { "download.json".to_owned() } else { trimmed.to_owned() }
}

/// Pretty-printed JSON body served as a file download.
pub(crate) fn json_attachment<T: Serialize>(filename: &str, body: &T) -> Result<Response, ApiError> {
    let json = serde_json::to_string_pretty(body).map_err(StoreError::from)?;
    let disposition = format!("attachment; filename=\"{}\"", attachment_filename(filename));
    Ok((
        [(CONTENT_TYPE, "application/json; charset=utf-8".to_owned()), (CONTENT_DISPOSITION, disposition)],
        json,
    )
        .into_response())
}

#[cfg(test)]
#[path = "routes_test.rs"]
mod tests;
