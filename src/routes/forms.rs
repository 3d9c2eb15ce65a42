//! Form CRUD and dashboard routes.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::Json;
use serde::{Deserialize, Serialize};

use crate::model::{FieldType, Form, FormDraft};
use crate::render::{self, WidgetSpec};
use crate::routes::error::ApiError;
use crate::state::AppState;
use crate::store::{DashboardStats, FormSummary, StoreError};

#[derive(Debug, Default, Deserialize)]
pub struct ListFormsQuery {
    pub q: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FormDetailResponse {
    #[serde(flatten)]
    pub form: Form,
    pub submission_count: usize,
}

/// One entry in the builder's field palette.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldTypeInfo {
    #[serde(rename = "type")]
    pub field_type: FieldType,
    pub choice: bool,
    pub length_rules: bool,
    pub range_rules: bool,
    pub pattern: bool,
}

/// `GET /api/field-types` — palette order plus the rules each type accepts.
pub async fn field_types() -> Json<Vec<FieldTypeInfo>> {
    let palette = FieldType::ALL
        .into_iter()
        .map(|ty| FieldTypeInfo {
            field_type: ty,
            choice: ty.is_choice(),
            length_rules: ty.supports_length_rules(),
            range_rules: ty.supports_range_rules(),
            pattern: ty.supports_pattern(),
        })
        .collect();
    Json(palette)
}

/// `GET /api/dashboard` — totals and the most recently edited forms.
pub async fn dashboard(State(state): State<AppState>) -> Json<DashboardStats> {
    Json(state.store.read().await.stats())
}

/// `GET /api/forms?q=` — list forms, optionally filtered.
pub async fn list_forms(
    State(state): State<AppState>,
    Query(query): Query<ListFormsQuery>,
) -> Json<Vec<FormSummary>> {
    let store = state.store.read().await;
    let summaries = store
        .list_forms(query.q.as_deref())
        .into_iter()
        .map(|form| store.summarize(form))
        .collect();
    Json(summaries)
}

/// `POST /api/forms` — create a form from a builder draft.
pub async fn create_form(
    State(state): State<AppState>,
    Json(draft): Json<FormDraft>,
) -> Result<(StatusCode, Json<Form>), ApiError> {
    let form = state
        .store
        .write()
        .await
        .create_form(draft, state.base_url())?;
    Ok((StatusCode::CREATED, Json(form)))
}

/// `GET /api/forms/:id` — fetch one form.
pub async fn get_form(
    State(state): State<AppState>,
    Path(form_id): Path<String>,
) -> Result<Json<FormDetailResponse>, ApiError> {
    let store = state.store.read().await;
    let form = store
        .get_form(&form_id)
        .cloned()
        .ok_or_else(|| StoreError::FormNotFound(form_id.clone()))?;
    let submission_count = store.get_form_submissions(&form_id).len();
    Ok(Json(FormDetailResponse { form, submission_count }))
}

/// `PUT /api/forms/:id` — save the builder draft over a stored form.
pub async fn update_form(
    State(state): State<AppState>,
    Path(form_id): Path<String>,
    Json(draft): Json<FormDraft>,
) -> Result<Json<Form>, ApiError> {
    let form = state.store.write().await.save_draft(&form_id, draft)?;
    Ok(Json(form))
}

/// `DELETE /api/forms/:id` — delete a form and its submissions.
pub async fn delete_form(
    State(state): State<AppState>,
    Path(form_id): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    state.store.write().await.delete_form(&form_id)?;
    Ok(Json(serde_json::json!({ "ok": true })))
}

/// `POST /api/forms/:id/duplicate` — copy a form under a new id.
pub async fn duplicate_form(
    State(state): State<AppState>,
    Path(form_id): Path<String>,
) -> Result<(StatusCode, Json<Form>), ApiError> {
    let form = state
        .store
        .write()
        .await
        .duplicate_form(&form_id, state.base_url())?;
    Ok((StatusCode::CREATED, Json(form)))
}

/// `GET /api/forms/:id/widgets` — the input widget each field renders as.
pub async fn form_widgets(
    State(state): State<AppState>,
    Path(form_id): Path<String>,
) -> Result<Json<Vec<WidgetSpec>>, ApiError> {
    let store = state.store.read().await;
    let form = store
        .get_form(&form_id)
        .ok_or_else(|| StoreError::FormNotFound(form_id.clone()))?;
    Ok(Json(render::describe_form(form)))
}

#[cfg(test)]
#[path = "forms_test.rs"]
mod tests;
