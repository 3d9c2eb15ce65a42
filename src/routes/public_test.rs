use super::*;
use serde_json::json;

use crate::state::test_helpers::{self, choice_field, draft_with, field};

async fn body_text(response: Response) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

fn pairs(items: &[(&str, &str)]) -> Vec<(String, String)> {
    items.iter().map(|(k, v)| ((*k).to_owned(), (*v).to_owned())).collect()
}

#[test]
fn checkbox_pairs_accumulate() {
    let form = test_helpers::form_with(vec![
        field("name", FieldType::Text),
        choice_field("tags", FieldType::Checkbox, &["a", "b", "c"]),
    ]);
    let answers = answers_from_pairs(&form, pairs(&[("tags", "a"), ("name", "x"), ("tags", "c"), ("name", "y")]));
    assert_eq!(answers["tags"], json!(["a", "c"]));
    assert_eq!(answers["name"], json!("y"));
}

#[tokio::test]
async fn show_form_renders_public_form() {
    let state = test_helpers::test_app_state();
    let form = test_helpers::seed_form(&state).await;

    let response = show_form(State(state), Path(form.id.clone())).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let html = body_text(response).await;
    assert!(html.contains("<h1>Signup</h1>"));
    assert!(html.contains(&format!("action=\"/form/{}\"", form.id)));
}

#[tokio::test]
async fn private_and_unknown_forms_look_the_same() {
    let state = test_helpers::test_app_state();
    let mut draft = draft_with("Internal", vec![field("x", FieldType::Text)]);
    draft.is_public = false;
    let private = state.store.write().await.create_form(draft, state.base_url()).unwrap();

    for id in [private.id.as_str(), "missing"] {
        let response = show_form(State(state.clone()), Path(id.to_owned())).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let html = body_text(response).await;
        assert!(html.contains(NOT_FOUND_HEADING));
        assert!(html.contains("not available for public access"));
    }
}

#[tokio::test]
async fn submit_form_thanks_on_success() {
    let state = test_helpers::test_app_state();
    let form = test_helpers::seed_form(&state).await;

    let response = submit_form(
        State(state.clone()),
        Path(form.id.clone()),
        UrlEncoded(pairs(&[("name", "Ada"), ("age", "")])),
    )
    .await
    .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_text(response).await.contains(THANK_YOU_MESSAGE));

    let store = state.store.read().await;
    let stored = store.get_form_submissions(&form.id);
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].data["name"], json!("Ada"));
}

#[tokio::test]
async fn submit_form_rerenders_with_errors() {
    let state = test_helpers::test_app_state();
    let form = test_helpers::seed_form(&state).await;

    let response = submit_form(State(state.clone()), Path(form.id.clone()), UrlEncoded(pairs(&[("age", "7")])))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let html = body_text(response).await;
    assert!(html.contains("This field is required"));
    assert!(html.contains("value=\"7\""));
    assert!(state.store.read().await.get_form_submissions(&form.id).is_empty());
}

#[tokio::test]
async fn submit_json_requires_public_form() {
    let state = test_helpers::test_app_state();
    let form = test_helpers::seed_form(&state).await;
    let answers: Answers = [("name".to_owned(), json!("Ada"))].into_iter().collect();

    let (status, Json(submission)) = submit_json(State(state.clone()), Path(form.id.clone()), Json(answers.clone()))
        .await
        .unwrap();
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(submission.form_id, form.id);

    let err = submit_json(State(state), Path("missing".into()), Json(answers)).await.unwrap_err();
    assert_eq!(err.status, StatusCode::NOT_FOUND);
    assert_eq!(err.code, "E_FORM_NOT_PUBLIC");
}
