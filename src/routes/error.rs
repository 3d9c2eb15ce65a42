//! JSON error responses for API routes.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use serde::Serialize;
use tracing::error;

use crate::builder::BuilderError;
use crate::error::ErrorCode;
use crate::render::RenderError;
use crate::store::StoreError;
use crate::validation::ValidationErrors;

#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub code: &'static str,
    pub message: String,
    pub fields: Option<ValidationErrors>,
}

#[derive(Serialize)]
struct ApiErrorBody<'a> {
    code: &'a str,
    message: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    fields: Option<&'a ValidationErrors>,
}

pub(crate) fn store_error_to_status(err: &StoreError) -> StatusCode {
    match err {
        StoreError::FormNotFound(_)
        | StoreError::SubmissionNotFound(_)
        | StoreError::NotPublic(_)
        | StoreError::TemplateNotFound(_)
        | StoreError::NothingToExport(_)
        | StoreError::Builder(BuilderError::FieldNotFound(_)) => StatusCode::NOT_FOUND,
        StoreError::Schema(_) | StoreError::Builder(_) | StoreError::Validation(_) => {
            StatusCode::UNPROCESSABLE_ENTITY
        }
        StoreError::InvalidImport(_) => StatusCode::BAD_REQUEST,
        StoreError::Storage(_) | StoreError::Serialization(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        let status = store_error_to_status(&err);
        if status.is_server_error() {
            error!(error = %err, code = err.error_code(), "request failed");
        }
        let fields = match &err {
            StoreError::Validation(errors) => Some(errors.clone()),
            _ => None,
        };
        Self { status, code: err.error_code(), message: err.to_string(), fields }
    }
}

impl From<RenderError> for ApiError {
    fn from(err: RenderError) -> Self {
        error!(error = %err, code = err.error_code(), "page render failed");
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            code: err.error_code(),
            message: "Page could not be rendered".into(),
            fields: None,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ApiErrorBody { code: self.code, message: &self.message, fields: self.fields.as_ref() };
        (self.status, Json(body)).into_response()
    }
}

#[cfg(test)]
#[path = "error_test.rs"]
mod tests;
