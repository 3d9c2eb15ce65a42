use super::*;
use crate::model::{Answers, FieldType};
use crate::state::test_helpers::{self, draft_with, field};

#[tokio::test]
async fn create_then_get_form() {
    let state = test_helpers::test_app_state();
    let draft = draft_with("Feedback", vec![field("comments", FieldType::Textarea)]);

    let (status, Json(created)) = create_form(State(state.clone()), Json(draft)).await.unwrap();
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created.share_url.as_deref(), Some(format!("http://forms.test/form/{}", created.id).as_str()));

    let Json(detail) = get_form(State(state), Path(created.id.clone())).await.unwrap();
    assert_eq!(detail.form, created);
    assert_eq!(detail.submission_count, 0);
}

#[tokio::test]
async fn create_form_without_fields_is_unprocessable() {
    let state = test_helpers::test_app_state();
    let err = create_form(State(state), Json(FormDraft::default())).await.unwrap_err();
    assert_eq!(err.status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(err.message, "Form must have at least one field");
}

#[tokio::test]
async fn get_unknown_form_is_not_found() {
    let state = test_helpers::test_app_state();
    let err = get_form(State(state), Path("missing".into())).await.unwrap_err();
    assert_eq!(err.status, StatusCode::NOT_FOUND);
    assert_eq!(err.message, "Form not found");
}

#[tokio::test]
async fn update_form_saves_draft() {
    let state = test_helpers::test_app_state();
    let form = test_helpers::seed_form(&state).await;
    let draft = draft_with("Renamed", form.fields.clone());

    let Json(saved) = update_form(State(state.clone()), Path(form.id.clone()), Json(draft)).await.unwrap();
    assert_eq!(saved.title, "Renamed");
    assert_eq!(saved.created_at, form.created_at);
}

#[tokio::test]
async fn list_forms_filters_and_counts_submissions() {
    let state = test_helpers::test_app_state();
    let form = test_helpers::seed_form(&state).await;
    {
        let mut store = state.store.write().await;
        let answers: Answers = [("name".to_owned(), serde_json::json!("Ada"))].into_iter().collect();
        store.add_submission(&form.id, answers).unwrap();
        store
            .create_form(draft_with("Other", vec![field("x", FieldType::Text)]), state.base_url())
            .unwrap();
    }

    let Json(all) = list_forms(State(state.clone()), Query(ListFormsQuery::default())).await;
    assert_eq!(all.len(), 2);

    let Json(hits) = list_forms(State(state), Query(ListFormsQuery { q: Some("sign".into()) })).await;
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].submission_count, 1);
}

#[tokio::test]
async fn delete_and_duplicate_forms() {
    let state = test_helpers::test_app_state();
    let form = test_helpers::seed_form(&state).await;

    let (_, Json(copy)) = duplicate_form(State(state.clone()), Path(form.id.clone())).await.unwrap();
    assert_eq!(copy.title, "Signup (copy)");

    let Json(deleted) = delete_form(State(state.clone()), Path(form.id.clone())).await.unwrap();
    assert_eq!(deleted["ok"], true);
    let err = delete_form(State(state.clone()), Path(form.id)).await.unwrap_err();
    assert_eq!(err.status, StatusCode::NOT_FOUND);

    let Json(stats) = dashboard(State(state)).await;
    assert_eq!(stats.total_forms, 1);
}

#[tokio::test]
async fn form_widgets_describe_fields_in_order() {
    let state = test_helpers::test_app_state();
    let form = test_helpers::seed_form(&state).await;
    let Json(widgets) = form_widgets(State(state), Path(form.id)).await.unwrap();
    assert_eq!(widgets.len(), 2);
    assert_eq!(widgets[0].field_id, "name");
    assert!(widgets[0].required);
    assert_eq!(widgets[1].widget, render::Widget::Input { input_type: "number" });
}

#[tokio::test]
async fn field_types_follow_palette_order() {
    let Json(palette) = field_types().await;
    assert_eq!(palette.len(), FieldType::ALL.len());
    assert_eq!(palette[0].field_type, FieldType::Text);
    let number = palette.iter().find(|p| p.field_type == FieldType::Number).unwrap();
    assert!(number.range_rules && !number.length_rules && !number.choice);
}
