//! Settings page routes: backup export, import, and app settings.

use axum::extract::State;
use axum::response::{Json, Response};
use time::OffsetDateTime;
use time::macros::format_description;

use crate::model::Settings;
use crate::routes::error::ApiError;
use crate::routes::json_attachment;
use crate::state::AppState;
use crate::store::{ImportSummary, SettingsPatch};

/// `formflow-backup-YYYY-MM-DD.json` for the given instant.
pub(crate) fn backup_filename(at: OffsetDateTime) -> String {
    let date = at
        .date()
        .format(format_description!("[year]-[month]-[day]"))
        .unwrap_or_else(|_| at.date().to_string());
    format!("formflow-backup-{date}.json")
}

/// `GET /api/export` — every form and submission as one download.
pub async fn export_all(State(state): State<AppState>) -> Result<Response, ApiError> {
    let backup = state.store.read().await.export_all();
    json_attachment(&backup_filename(OffsetDateTime::now_utc()), &backup)
}

/// `POST /api/import` — merge a backup document. The raw body is parsed by
/// the store so malformed files surface as `E_INVALID_IMPORT`.
pub async fn import_all(State(state): State<AppState>, body: String) -> Result<Json<ImportSummary>, ApiError> {
    let summary = state.store.write().await.import_all(&body)?;
    Ok(Json(summary))
}

/// `GET /api/settings`
pub async fn get_settings(State(state): State<AppState>) -> Json<Settings> {
    Json(state.store.read().await.settings().clone())
}

/// `PUT /api/settings`
pub async fn update_settings(State(state): State<AppState>, Json(patch): Json<SettingsPatch>) -> Json<Settings> {
    Json(state.store.write().await.update_settings(patch))
}

#[cfg(test)]
#[path = "data_test.rs"]
mod tests;
