//! Builder routes: field and option editing on a stored form.
//!
//! Every handler runs one `builder` operation through
//! `FormStore::modify_form`, so an edit that would leave the form failing
//! its schema checks is rejected and the stored form is left untouched.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::Json;
use serde::{Deserialize, Serialize};

use crate::builder::{self, Direction, FieldPatch};
use crate::model::{FieldType, Form};
use crate::routes::error::ApiError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct AddFieldRequest {
    #[serde(rename = "type")]
    pub field_type: FieldType,
}

#[derive(Debug, Deserialize)]
pub struct MoveFieldRequest {
    pub direction: Direction,
}

#[derive(Debug, Deserialize)]
pub struct ReorderRequest {
    pub from: usize,
    pub to: usize,
}

#[derive(Debug, Deserialize)]
pub struct OptionRequest {
    pub value: String,
}

/// Form after an edit that produced a new field.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldCreatedResponse {
    pub form: Form,
    pub field_id: String,
}

/// `POST /api/forms/:id/fields`
pub async fn add_field(
    State(state): State<AppState>,
    Path(form_id): Path<String>,
    Json(req): Json<AddFieldRequest>,
) -> Result<(StatusCode, Json<FieldCreatedResponse>), ApiError> {
    let (form, field_id) = state
        .store
        .write()
        .await
        .modify_form(&form_id, |form| Ok(builder::add_field(form, req.field_type)))?;
    Ok((StatusCode::CREATED, Json(FieldCreatedResponse { form, field_id })))
}

/// `PATCH /api/forms/:id/fields/:field_id`
pub async fn update_field(
    State(state): State<AppState>,
    Path((form_id, field_id)): Path<(String, String)>,
    Json(patch): Json<FieldPatch>,
) -> Result<Json<Form>, ApiError> {
    let (form, ()) = state
        .store
        .write()
        .await
        .modify_form(&form_id, |form| builder::update_field(form, &field_id, patch))?;
    Ok(Json(form))
}

/// `DELETE /api/forms/:id/fields/:field_id`
pub async fn delete_field(
    State(state): State<AppState>,
    Path((form_id, field_id)): Path<(String, String)>,
) -> Result<Json<Form>, ApiError> {
    let (form, _removed) = state
        .store
        .write()
        .await
        .modify_form(&form_id, |form| builder::delete_field(form, &field_id))?;
    Ok(Json(form))
}

/// `POST /api/forms/:id/fields/:field_id/duplicate`
pub async fn duplicate_field(
    State(state): State<AppState>,
    Path((form_id, field_id)): Path<(String, String)>,
) -> Result<(StatusCode, Json<FieldCreatedResponse>), ApiError> {
    let (form, field_id) = state
        .store
        .write()
        .await
        .modify_form(&form_id, |form| builder::duplicate_field(form, &field_id))?;
    Ok((StatusCode::CREATED, Json(FieldCreatedResponse { form, field_id })))
}

/// `POST /api/forms/:id/fields/:field_id/move`
pub async fn move_field(
    State(state): State<AppState>,
    Path((form_id, field_id)): Path<(String, String)>,
    Json(req): Json<MoveFieldRequest>,
) -> Result<Json<Form>, ApiError> {
    let (form, ()) = state
        .store
        .write()
        .await
        .modify_form(&form_id, |form| builder::move_field(form, &field_id, req.direction))?;
    Ok(Json(form))
}

/// `POST /api/forms/:id/fields/reorder` — drag-and-drop by index.
pub async fn reorder_fields(
    State(state): State<AppState>,
    Path(form_id): Path<String>,
    Json(req): Json<ReorderRequest>,
) -> Result<Json<Form>, ApiError> {
    let (form, ()) = state
        .store
        .write()
        .await
        .modify_form(&form_id, |form| builder::reorder(form, req.from, req.to))?;
    Ok(Json(form))
}

/// `POST /api/forms/:id/fields/:field_id/options`
pub async fn add_option(
    State(state): State<AppState>,
    Path((form_id, field_id)): Path<(String, String)>,
) -> Result<Json<Form>, ApiError> {
    let (form, _index) = state
        .store
        .write()
        .await
        .modify_form(&form_id, |form| builder::add_option(form, &field_id))?;
    Ok(Json(form))
}

/// `PUT /api/forms/:id/fields/:field_id/options/:index`
pub async fn update_option(
    State(state): State<AppState>,
    Path((form_id, field_id, index)): Path<(String, String, usize)>,
    Json(req): Json<OptionRequest>,
) -> Result<Json<Form>, ApiError> {
    let (form, ()) = state
        .store
        .write()
        .await
        .modify_form(&form_id, |form| builder::update_option(form, &field_id, index, req.value))?;
    Ok(Json(form))
}

/// `DELETE /api/forms/:id/fields/:field_id/options/:index`
pub async fn remove_option(
    State(state): State<AppState>,
    Path((form_id, field_id, index)): Path<(String, String, usize)>,
) -> Result<Json<Form>, ApiError> {
    let (form, _removed) = state
        .store
        .write()
        .await
        .modify_form(&form_id, |form| builder::remove_option(form, &field_id, index))?;
    Ok(Json(form))
}

#[cfg(test)]
#[path = "fields_test.rs"]
mod tests;
