//! Built-in form template routes.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::Json;

use crate::catalog::{FormTemplate, TemplateSummary};
use crate::model::Form;
use crate::routes::error::ApiError;
use crate::state::AppState;

/// `GET /api/templates`
pub async fn list_templates() -> Json<Vec<TemplateSummary>> {
    Json(FormTemplate::ALL.into_iter().map(FormTemplate::summary).collect())
}

/// `POST /api/templates/:slug` — create a new form from a template.
pub async fn create_from_template(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<(StatusCode, Json<Form>), ApiError> {
    let form = state
        .store
        .write()
        .await
        .create_from_template(&slug, state.base_url())?;
    Ok((StatusCode::CREATED, Json(form)))
}

#[cfg(test)]
#[path = "templates_test.rs"]
mod tests;
