//! Shared application state.
//!
//! DESIGN
//! ======
//! `AppState` is injected into Axum handlers via the `State` extractor.
//! It holds the form store behind a single `RwLock`, the key/value backend
//! the persistence worker flushes into, the parsed config, and the compiled
//! page templates.

use std::sync::Arc;

use tokio::sync::RwLock;

use crate::config::AppConfig;
use crate::kv::KeyValueStore;
use crate::render::PageRenderer;
use crate::store::FormStore;

/// Shared application state, injected into Axum handlers via State extractor.
/// Clone is required by Axum; all inner fields are Arc-wrapped.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<RwLock<FormStore>>,
    pub kv: Arc<dyn KeyValueStore>,
    pub config: Arc<AppConfig>,
    pub pages: Arc<PageRenderer>,
}

impl AppState {
    #[must_use]
    pub fn new(store: FormStore, kv: Arc<dyn KeyValueStore>, config: AppConfig, pages: PageRenderer) -> Self {
        Self { store: Arc::new(RwLock::new(store)), kv, config: Arc::new(config), pages: Arc::new(pages) }
    }

    /// Origin for share links.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.config.public_base_url
    }
}

// =============================================================================
// TEST HELPERS
// =============================================================================

#[cfg(test)]
pub mod test_helpers {
    use super::*;
    use crate::kv::MemoryKv;
    use crate::model::{FieldType, FieldValidation, Form, FormDraft, FormField};

    #[must_use]
    pub fn test_config() -> AppConfig {
        AppConfig {
            port: 3000,
            data_dir: "unused".into(),
            public_base_url: "http://forms.test".into(),
            flush_interval_ms: 10,
        }
    }

    /// Create a test `AppState` backed by in-memory storage.
    #[must_use]
    pub fn test_app_state() -> AppState {
        app_state_with_kv(Arc::new(MemoryKv::new()))
    }

    /// Create a test `AppState` with an empty store over the given backend.
    #[must_use]
    pub fn app_state_with_kv(kv: Arc<dyn KeyValueStore>) -> AppState {
        let pages = PageRenderer::new().expect("bundled templates should parse");
        AppState::new(FormStore::new(), kv, test_config(), pages)
    }

    #[must_use]
    pub fn field(id: &str, field_type: FieldType) -> FormField {
        FormField {
            id: id.into(),
            field_type,
            label: id.to_uppercase(),
            placeholder: None,
            options: None,
            validation: FieldValidation::default(),
        }
    }

    #[must_use]
    pub fn choice_field(id: &str, field_type: FieldType, options: &[&str]) -> FormField {
        FormField {
            options: Some(options.iter().map(|o| (*o).to_owned()).collect()),
            ..field(id, field_type)
        }
    }

    #[must_use]
    pub fn form_with(fields: Vec<FormField>) -> Form {
        Form {
            id: "form-1".into(),
            title: "Test form".into(),
            description: String::new(),
            fields,
            created_at: 0,
            updated_at: 0,
            share_url: None,
            is_public: true,
        }
    }

    #[must_use]
    pub fn draft_with(title: &str, fields: Vec<FormField>) -> FormDraft {
        FormDraft { title: title.into(), description: String::new(), fields, is_public: true }
    }

    /// Seed a public form with a required `name` text field and an optional
    /// `age` number field, returning it.
    pub async fn seed_form(state: &AppState) -> Form {
        let mut name = field("name", FieldType::Text);
        name.validation.required = Some(true);
        let mut age = field("age", FieldType::Number);
        age.validation.min = Some(0.0);
        let draft = draft_with("Signup", vec![name, age]);
        let mut store = state.store.write().await;
        store
            .create_form(draft, state.base_url())
            .expect("seed form should pass schema checks")
    }
}
