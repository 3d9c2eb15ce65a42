//! Submission routes for the form detail page.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{Json, Response};

use crate::model::{Answers, FormSubmission};
use crate::routes::error::ApiError;
use crate::routes::json_attachment;
use crate::state::AppState;
use crate::store::StoreError;

/// `GET /api/forms/:id/submissions`
pub async fn list_submissions(
    State(state): State<AppState>,
    Path(form_id): Path<String>,
) -> Result<Json<Vec<FormSubmission>>, ApiError> {
    let store = state.store.read().await;
    if store.get_form(&form_id).is_none() {
        return Err(StoreError::FormNotFound(form_id).into());
    }
    Ok(Json(store.get_form_submissions(&form_id).to_vec()))
}

/// `POST /api/forms/:id/submissions` — submit as the owner, public or not.
pub async fn create_submission(
    State(state): State<AppState>,
    Path(form_id): Path<String>,
    Json(answers): Json<Answers>,
) -> Result<(StatusCode, Json<FormSubmission>), ApiError> {
    let submission = state.store.write().await.add_submission(&form_id, answers)?;
    Ok((StatusCode::CREATED, Json(submission)))
}

/// `DELETE /api/forms/:id/submissions/:submission_id`
pub async fn delete_submission(
    State(state): State<AppState>,
    Path((form_id, submission_id)): Path<(String, String)>,
) -> Result<Json<serde_json::Value>, ApiError> {
    state
        .store
        .write()
        .await
        .delete_submission(&form_id, &submission_id)?;
    Ok(Json(serde_json::json!({ "ok": true })))
}

/// `GET /api/forms/:id/export` — download `{title}-submissions.json`.
pub async fn export_form(
    State(state): State<AppState>,
    Path(form_id): Path<String>,
) -> Result<Response, ApiError> {
    let export = state.store.read().await.export_form(&form_id)?;
    let filename = format!("{}-submissions.json", export.form.title);
    json_attachment(&filename, &export)
}

#[cfg(test)]
#[path = "submissions_test.rs"]
mod tests;
