//! Form store — forms, submissions, and settings with relational integrity.
//!
//! DESIGN
//! ======
//! `FormStore` is the single in-memory source of truth. Every mutation
//! replaces or filters the owning collection and marks the storage key it
//! touched as dirty; the persistence worker serializes dirty keys and writes
//! them to a `KeyValueStore` outside the state lock.
//!
//! Dirty keys carry the store revision at which they were last touched, so
//! a flush only acknowledges a key if nothing re-dirtied it while the write
//! was in flight.
//!
//! INTEGRITY
//! =========
//! - A submission can only be added for a form that exists.
//! - Deleting a form deletes its submissions.
//! - Imports can still leave orphans behind; `prune_orphans` is the manual
//!   cleanup and runs after every import.

use std::collections::{BTreeMap, HashMap, HashSet};

use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use crate::builder::{self, BuilderError, SchemaError};
use crate::catalog::FormTemplate;
use crate::error::ErrorCode;
use crate::kv::{AUTO_SAVE_KEY, FILE_STORAGE_PATH_KEY, FORMS_KEY, KeyValueStore, KvError, SUBMISSIONS_KEY};
use crate::model::{Answers, Form, FormDraft, FormSubmission, Settings, now_ms};
use crate::validation::{self, ValidationErrors};

pub const RECENT_FORMS_LIMIT: usize = 3;

// =============================================================================
// ERRORS
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Form not found")]
    FormNotFound(String),
    #[error("Submission not found")]
    SubmissionNotFound(String),
    #[error("The form you're looking for doesn't exist or is not available for public access.")]
    NotPublic(String),
    #[error("{0}")]
    Schema(#[from] SchemaError),
    #[error("{0}")]
    Builder(#[from] BuilderError),
    #[error("{0}")]
    Validation(#[from] ValidationErrors),
    #[error("Template not found")]
    TemplateNotFound(String),
    #[error("No submissions to export")]
    NothingToExport(String),
    #[error("Failed to import data: {0}")]
    InvalidImport(String),
    #[error("storage error: {0}")]
    Storage(#[from] KvError),
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl ErrorCode for StoreError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::FormNotFound(_) => "E_FORM_NOT_FOUND",
            Self::SubmissionNotFound(_) => "E_SUBMISSION_NOT_FOUND",
            Self::NotPublic(_) => "E_FORM_NOT_PUBLIC",
            Self::Schema(e) => e.error_code(),
            Self::Builder(e) => e.error_code(),
            Self::Validation(_) => "E_VALIDATION",
            Self::TemplateNotFound(_) => "E_TEMPLATE_NOT_FOUND",
            Self::NothingToExport(_) => "E_NOTHING_TO_EXPORT",
            Self::InvalidImport(_) => "E_INVALID_IMPORT",
            Self::Storage(e) => e.error_code(),
            Self::Serialization(_) => "E_SERIALIZATION",
        }
    }
}

// =============================================================================
// VIEWS
// =============================================================================

/// List/dashboard card for one form.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FormSummary {
    pub id: String,
    pub title: String,
    pub description: String,
    pub field_count: usize,
    pub submission_count: usize,
    pub created_at: i64,
    pub updated_at: i64,
    pub is_public: bool,
    pub share_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_forms: usize,
    pub total_submissions: usize,
    pub recent_forms: Vec<FormSummary>,
}

/// Single-form download: the form plus its submissions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormExport {
    pub form: Form,
    pub submissions: Vec<FormSubmission>,
}

/// Full backup document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Backup {
    pub forms: Vec<Form>,
    pub submissions: BTreeMap<String, Vec<FormSubmission>>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportSummary {
    pub forms: usize,
    pub submissions: usize,
    pub skipped: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsPatch {
    #[serde(default)]
    pub file_storage_path: Option<String>,
    #[serde(default)]
    pub auto_save: Option<bool>,
}

/// Serialized value of one dirty key, ready to write.
#[derive(Debug, Clone)]
pub struct DirtyDocument {
    pub key: &'static str,
    pub body: String,
    pub revision: u64,
}

// =============================================================================
// STORE
// =============================================================================

#[derive(Debug, Default)]
pub struct FormStore {
    forms: Vec<Form>,
    submissions: HashMap<String, Vec<FormSubmission>>,
    settings: Settings,
    revision: u64,
    dirty: HashMap<&'static str, u64>,
}

impl FormStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn mark_dirty(&mut self, key: &'static str) {
        self.revision += 1;
        self.dirty.insert(key, self.revision);
    }

    // -------------------------------------------------------------------------
    // forms
    // -------------------------------------------------------------------------

    /// Create a form from a builder draft.
    ///
    /// # Errors
    ///
    /// Returns `Schema` if the draft fails the save checks.
    pub fn create_form(&mut self, draft: FormDraft, base_url: &str) -> Result<Form, StoreError> {
        let now = now_ms();
        let id = Uuid::new_v4().to_string();
        let form = Form {
            share_url: Some(share_url(base_url, &id)),
            id,
            title: draft.title,
            description: draft.description,
            fields: draft.fields,
            created_at: now,
            updated_at: now,
            is_public: draft.is_public,
        };
        builder::check_schema(&form)?;

        self.forms.push(form.clone());
        self.mark_dirty(FORMS_KEY);
        info!(form_id = %form.id, fields = form.fields.len(), "form created");
        Ok(form)
    }

    /// Replace a stored form wholesale, bumping `updatedAt`.
    ///
    /// `createdAt` is kept from the stored copy, as is `shareUrl` when the
    /// incoming form has none.
    ///
    /// # Errors
    ///
    /// Returns `FormNotFound` or `Schema`.
    pub fn update_form(&mut self, mut form: Form) -> Result<Form, StoreError> {
        builder::check_schema(&form)?;
        let slot = self
            .forms
            .iter_mut()
            .find(|existing| existing.id == form.id)
            .ok_or_else(|| StoreError::FormNotFound(form.id.clone()))?;

        form.created_at = slot.created_at;
        if form.share_url.is_none() {
            form.share_url.clone_from(&slot.share_url);
        }
        form.updated_at = now_ms().max(slot.updated_at);
        *slot = form.clone();

        self.mark_dirty(FORMS_KEY);
        info!(form_id = %form.id, "form updated");
        Ok(form)
    }

    /// Apply a draft's user-editable attributes to a stored form.
    ///
    /// # Errors
    ///
    /// Returns `FormNotFound` or `Schema`.
    pub fn save_draft(&mut self, form_id: &str, draft: FormDraft) -> Result<Form, StoreError> {
        let existing = self.require_form(form_id)?;
        let form = Form {
            title: draft.title,
            description: draft.description,
            fields: draft.fields,
            is_public: draft.is_public,
            ..existing.clone()
        };
        self.update_form(form)
    }

    /// Run a builder operation against a copy of a stored form and save the
    /// result only if it still passes the schema checks.
    ///
    /// # Errors
    ///
    /// Returns `FormNotFound`, the operation's `Builder` error, or `Schema`.
    pub fn modify_form<T, F>(&mut self, form_id: &str, op: F) -> Result<(Form, T), StoreError>
    where
        F: FnOnce(&mut Form) -> Result<T, BuilderError>,
    {
        let mut draft = self.require_form(form_id)?.clone();
        let out = op(&mut draft)?;
        let saved = self.update_form(draft)?;
        Ok((saved, out))
    }

    /// Delete a form and every submission filed against it.
    ///
    /// # Errors
    ///
    /// Returns `FormNotFound`.
    pub fn delete_form(&mut self, form_id: &str) -> Result<Form, StoreError> {
        let index = self
            .forms
            .iter()
            .position(|form| form.id == form_id)
            .ok_or_else(|| StoreError::FormNotFound(form_id.to_owned()))?;
        let form = self.forms.remove(index);
        self.mark_dirty(FORMS_KEY);

        if let Some(removed) = self.submissions.remove(form_id) {
            self.mark_dirty(SUBMISSIONS_KEY);
            info!(form_id, submissions = removed.len(), "form deleted with submissions");
        } else {
            info!(form_id, "form deleted");
        }
        Ok(form)
    }

    /// Copy a form under a new id. Submissions are not copied.
    ///
    /// # Errors
    ///
    /// Returns `FormNotFound`.
    pub fn duplicate_form(&mut self, form_id: &str, base_url: &str) -> Result<Form, StoreError> {
        let source = self.require_form(form_id)?;
        let draft = FormDraft {
            title: format!("{} (copy)", source.title),
            description: source.description.clone(),
            fields: source.fields.clone(),
            is_public: source.is_public,
        };
        self.create_form(draft, base_url)
    }

    /// Create a form from the built-in template named `slug`.
    ///
    /// # Errors
    ///
    /// Returns `TemplateNotFound` for an unknown slug.
    pub fn create_from_template(&mut self, slug: &str, base_url: &str) -> Result<Form, StoreError> {
        let template =
            FormTemplate::from_slug(slug).ok_or_else(|| StoreError::TemplateNotFound(slug.to_owned()))?;
        self.create_form(template.draft(), base_url)
    }

    #[must_use]
    pub fn get_form(&self, form_id: &str) -> Option<&Form> {
        self.forms.iter().find(|form| form.id == form_id)
    }

    fn require_form(&self, form_id: &str) -> Result<&Form, StoreError> {
        self.get_form(form_id)
            .ok_or_else(|| StoreError::FormNotFound(form_id.to_owned()))
    }

    /// Look up a form reachable through its share link.
    ///
    /// # Errors
    ///
    /// Returns `NotPublic` for unknown and private forms alike.
    pub fn get_public_form(&self, form_id: &str) -> Result<&Form, StoreError> {
        self.get_form(form_id)
            .filter(|form| form.is_public)
            .ok_or_else(|| StoreError::NotPublic(form_id.to_owned()))
    }

    #[must_use]
    pub fn forms(&self) -> &[Form] {
        &self.forms
    }

    /// Forms in creation order, optionally filtered by a search term.
    #[must_use]
    pub fn list_forms(&self, search: Option<&str>) -> Vec<&Form> {
        let term = search.map(str::trim).filter(|t| !t.is_empty());
        self.forms
            .iter()
            .filter(|form| term.is_none_or(|t| form.matches_search(t)))
            .collect()
    }

    /// Most recently updated forms first.
    #[must_use]
    pub fn recent_forms(&self, limit: usize) -> Vec<&Form> {
        let mut forms = self.forms.iter().collect::<Vec<_>>();
        forms.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        forms.truncate(limit);
        forms
    }

    #[must_use]
    pub fn summarize(&self, form: &Form) -> FormSummary {
        FormSummary {
            id: form.id.clone(),
            title: form.title.clone(),
            description: form.description.clone(),
            field_count: form.fields.len(),
            submission_count: self.get_form_submissions(&form.id).len(),
            created_at: form.created_at,
            updated_at: form.updated_at,
            is_public: form.is_public,
            share_url: form.share_url.clone(),
        }
    }

    #[must_use]
    pub fn stats(&self) -> DashboardStats {
        DashboardStats {
            total_forms: self.forms.len(),
            total_submissions: self.submissions.values().map(Vec::len).sum(),
            recent_forms: self
                .recent_forms(RECENT_FORMS_LIMIT)
                .into_iter()
                .map(|form| self.summarize(form))
                .collect(),
        }
    }

    // -------------------------------------------------------------------------
    // submissions
    // -------------------------------------------------------------------------

    /// Validate and file a submission against an existing form.
    ///
    /// # Errors
    ///
    /// Returns `FormNotFound` or `Validation` with per-field messages.
    pub fn add_submission(&mut self, form_id: &str, answers: Answers) -> Result<FormSubmission, StoreError> {
        let form = self.require_form(form_id)?;
        let mut data = validation::normalize_answers(form, answers);
        validation::validate_answers(form, &data)?;
        validation::mark_missing_uploads(form, &mut data);

        let submission = FormSubmission {
            id: Uuid::new_v4().to_string(),
            form_id: form_id.to_owned(),
            data,
            submitted_at: now_ms(),
        };
        self.submissions
            .entry(form_id.to_owned())
            .or_default()
            .push(submission.clone());
        self.mark_dirty(SUBMISSIONS_KEY);
        info!(form_id, submission_id = %submission.id, "submission recorded");
        Ok(submission)
    }

    #[must_use]
    pub fn get_form_submissions(&self, form_id: &str) -> &[FormSubmission] {
        self.submissions.get(form_id).map_or(&[], Vec::as_slice)
    }

    /// # Errors
    ///
    /// Returns `SubmissionNotFound` if the form has no such submission.
    pub fn delete_submission(&mut self, form_id: &str, submission_id: &str) -> Result<FormSubmission, StoreError> {
        let bucket = self
            .submissions
            .get_mut(form_id)
            .ok_or_else(|| StoreError::SubmissionNotFound(submission_id.to_owned()))?;
        let index = bucket
            .iter()
            .position(|s| s.id == submission_id)
            .ok_or_else(|| StoreError::SubmissionNotFound(submission_id.to_owned()))?;
        let removed = bucket.remove(index);
        if bucket.is_empty() {
            self.submissions.remove(form_id);
        }
        self.mark_dirty(SUBMISSIONS_KEY);
        Ok(removed)
    }

    /// Drop submission buckets whose form no longer exists. Returns the
    /// number of submissions removed.
    pub fn prune_orphans(&mut self) -> usize {
        let known = self.forms.iter().map(|f| f.id.as_str()).collect::<HashSet<_>>();
        let orphaned = self
            .submissions
            .keys()
            .filter(|id| !known.contains(id.as_str()))
            .cloned()
            .collect::<Vec<_>>();

        let mut removed = 0;
        for form_id in orphaned {
            if let Some(bucket) = self.submissions.remove(&form_id) {
                removed += bucket.len();
            }
        }
        if removed > 0 {
            self.mark_dirty(SUBMISSIONS_KEY);
            warn!(removed, "pruned orphaned submissions");
        }
        removed
    }

    // -------------------------------------------------------------------------
    // export / import
    // -------------------------------------------------------------------------

    /// # Errors
    ///
    /// Returns `FormNotFound`, or `NothingToExport` when there are no
    /// submissions yet.
    pub fn export_form(&self, form_id: &str) -> Result<FormExport, StoreError> {
        let form = self.require_form(form_id)?;
        let submissions = self.get_form_submissions(form_id);
        if submissions.is_empty() {
            return Err(StoreError::NothingToExport(form_id.to_owned()));
        }
        Ok(FormExport { form: form.clone(), submissions: submissions.to_vec() })
    }

    #[must_use]
    pub fn export_all(&self) -> Backup {
        Backup {
            forms: self.forms.clone(),
            submissions: self
                .submissions
                .iter()
                .map(|(id, bucket)| (id.clone(), bucket.clone()))
                .collect(),
        }
    }

    /// Merge a backup document into the store.
    ///
    /// Forms replace stored forms with the same id and are otherwise
    /// appended. Submissions merge by id into their form's bucket; ones whose
    /// form is unknown after the merge are skipped.
    ///
    /// # Errors
    ///
    /// Returns `InvalidImport` if the document is not valid JSON, `forms` is
    /// missing or not an array, or any form fails the schema checks. Nothing
    /// is merged on error.
    pub fn import_all(&mut self, raw: &str) -> Result<ImportSummary, StoreError> {
        let backup = parse_backup(raw)?;

        let mut summary = ImportSummary { forms: backup.forms.len(), ..ImportSummary::default() };
        for form in backup.forms {
            match self.forms.iter_mut().find(|existing| existing.id == form.id) {
                Some(slot) => *slot = form,
                None => self.forms.push(form),
            }
        }
        self.mark_dirty(FORMS_KEY);

        let known = self.forms.iter().map(|f| f.id.clone()).collect::<HashSet<_>>();
        for (form_id, incoming) in backup.submissions {
            if !known.contains(&form_id) {
                summary.skipped += incoming.len();
                continue;
            }
            let bucket = self.submissions.entry(form_id.clone()).or_default();
            for mut submission in incoming {
                submission.form_id.clone_from(&form_id);
                match bucket.iter_mut().find(|s| s.id == submission.id) {
                    Some(slot) => *slot = submission,
                    None => bucket.push(submission),
                }
                summary.submissions += 1;
            }
        }
        self.mark_dirty(SUBMISSIONS_KEY);
        self.prune_orphans();

        info!(forms = summary.forms, submissions = summary.submissions, skipped = summary.skipped, "backup imported");
        Ok(summary)
    }

    // -------------------------------------------------------------------------
    // settings
    // -------------------------------------------------------------------------

    #[must_use]
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn update_settings(&mut self, patch: SettingsPatch) -> Settings {
        if let Some(path) = patch.file_storage_path {
            self.settings.file_storage_path = path;
            self.mark_dirty(FILE_STORAGE_PATH_KEY);
        }
        if let Some(auto_save) = patch.auto_save {
            self.settings.auto_save = auto_save;
            self.mark_dirty(AUTO_SAVE_KEY);
        }
        self.settings.clone()
    }

    // -------------------------------------------------------------------------
    // persistence
    // -------------------------------------------------------------------------

    /// Hydrate a store from key/value storage.
    ///
    /// A document that fails to parse is logged and treated as absent so a
    /// single corrupt key cannot keep the service from starting.
    ///
    /// # Errors
    ///
    /// Returns an error only if the storage backend itself fails.
    pub fn load(kv: &dyn KeyValueStore) -> Result<Self, KvError> {
        let mut store = Self::new();
        if let Some(forms) = read_json::<Vec<Form>>(kv, FORMS_KEY)? {
            store.forms = forms;
        }
        if let Some(submissions) = read_json::<HashMap<String, Vec<FormSubmission>>>(kv, SUBMISSIONS_KEY)? {
            store.submissions = submissions;
        }
        if let Some(path) = kv.get(FILE_STORAGE_PATH_KEY)? {
            // Older browser builds stored the raw string, not JSON.
            store.settings.file_storage_path = serde_json::from_str::<String>(&path).unwrap_or(path);
        }
        if let Some(auto_save) = kv.get(AUTO_SAVE_KEY)? {
            store.settings.auto_save = auto_save.trim() == "true";
        }

        info!(forms = store.forms.len(), submission_buckets = store.submissions.len(), "form store loaded");
        Ok(store)
    }

    #[must_use]
    pub fn is_dirty(&self) -> bool {
        !self.dirty.is_empty()
    }

    /// Serialize every dirty key. Dirty flags stay set until acknowledged.
    ///
    /// # Errors
    ///
    /// Returns a serialization error.
    pub fn snapshot_dirty(&self) -> Result<Vec<DirtyDocument>, serde_json::Error> {
        let mut docs = Vec::with_capacity(self.dirty.len());
        for (&key, &revision) in &self.dirty {
            let body = match key {
                FORMS_KEY => serde_json::to_string(&self.forms)?,
                SUBMISSIONS_KEY => serde_json::to_string(&self.submissions)?,
                FILE_STORAGE_PATH_KEY => serde_json::to_string(&self.settings.file_storage_path)?,
                AUTO_SAVE_KEY => serde_json::to_string(&self.settings.auto_save)?,
                _ => continue,
            };
            docs.push(DirtyDocument { key, body, revision });
        }
        Ok(docs)
    }

    /// Clear a dirty flag if the key was not touched again since `revision`.
    pub fn ack_flushed(&mut self, key: &str, revision: u64) {
        if self.dirty.get(key) == Some(&revision) {
            self.dirty.remove(key);
        }
    }

    /// Write every dirty key synchronously.
    ///
    /// # Errors
    ///
    /// Returns the first storage or serialization error; keys written before
    /// it are acknowledged.
    pub fn flush(&mut self, kv: &dyn KeyValueStore) -> Result<usize, StoreError> {
        let docs = self.snapshot_dirty()?;
        let count = docs.len();
        for doc in docs {
            kv.set(doc.key, &doc.body)?;
            self.ack_flushed(doc.key, doc.revision);
        }
        Ok(count)
    }
}

#[must_use]
pub fn share_url(base_url: &str, form_id: &str) -> String {
    format!("{}/form/{form_id}", base_url.trim_end_matches('/'))
}

fn read_json<T: serde::de::DeserializeOwned>(kv: &dyn KeyValueStore, key: &str) -> Result<Option<T>, KvError> {
    let Some(raw) = kv.get(key)? else {
        return Ok(None);
    };
    match serde_json::from_str(&raw) {
        Ok(value) => Ok(Some(value)),
        Err(e) => {
            warn!(key, error = %e, "stored document is corrupt; starting empty");
            Ok(None)
        }
    }
}

fn parse_backup(raw: &str) -> Result<Backup, StoreError> {
    let invalid_format = || StoreError::InvalidImport("Invalid file format".to_owned());

    let value = serde_json::from_str::<serde_json::Value>(raw).map_err(|_| invalid_format())?;
    let Some(map) = value.as_object() else {
        return Err(invalid_format());
    };
    let Some(raw_forms) = map.get("forms").filter(|forms| forms.is_array()) else {
        return Err(StoreError::InvalidImport("Invalid forms data structure".to_owned()));
    };

    let mut forms = Vec::<Form>::deserialize(raw_forms).map_err(|_| invalid_format())?;
    for form in &mut forms {
        if form.fields.is_empty() {
            restore_template_fields(form);
        }
        builder::check_imported(form)
            .map_err(|e| StoreError::InvalidImport(format!("form {}: {e}", form.id)))?;
    }

    let submissions = match map.get("submissions") {
        None | Some(serde_json::Value::Null) => BTreeMap::new(),
        Some(raw_subs) => {
            BTreeMap::<String, Vec<FormSubmission>>::deserialize(raw_subs).map_err(|_| invalid_format())?
        }
    };

    Ok(Backup { forms, submissions })
}

/// Fieldless forms come from browser builds that created the GST page's
/// form without its schema. Give a form matching a template title that
/// template's fields; keep any other fieldless form as it is.
fn restore_template_fields(form: &mut Form) {
    if let Some(template) = FormTemplate::from_title(&form.title) {
        form.fields = template.fields();
        info!(form_id = %form.id, template = template.slug(), "restored template fields on import");
    } else {
        warn!(form_id = %form.id, "imported form has no fields");
    }
}

#[cfg(test)]
#[path = "store_test.rs"]
mod tests;
