use super::*;
use crate::model::FieldValidation;
use crate::state::test_helpers::{self, choice_field, draft_with};

#[tokio::test]
async fn add_field_appends_with_defaults() {
    let state = test_helpers::test_app_state();
    let form = test_helpers::seed_form(&state).await;

    let (status, Json(created)) = add_field(
        State(state.clone()),
        Path(form.id.clone()),
        Json(AddFieldRequest { field_type: FieldType::Radio }),
    )
    .await
    .unwrap();
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created.form.fields.len(), 3);
    let added = created.form.field(&created.field_id).unwrap();
    assert_eq!(added.options(), ["Option 1", "Option 2", "Option 3"]);

    let store = state.store.read().await;
    assert_eq!(store.get_form(&form.id).unwrap().fields.len(), 3);
}

#[tokio::test]
async fn update_field_patches_label_and_rules() {
    let state = test_helpers::test_app_state();
    let form = test_helpers::seed_form(&state).await;
    let patch = FieldPatch {
        label: Some("Full name".into()),
        validation: Some(FieldValidation { required: Some(false), ..FieldValidation::default() }),
        ..FieldPatch::default()
    };

    let Json(saved) = update_field(State(state), Path((form.id, "name".into())), Json(patch))
        .await
        .unwrap();
    let name = saved.field("name").unwrap();
    assert_eq!(name.label, "Full name");
    assert!(!name.validation.is_required());
}

#[tokio::test]
async fn update_field_rejects_invalid_pattern_and_keeps_stored_form() {
    let state = test_helpers::test_app_state();
    let form = test_helpers::seed_form(&state).await;
    let patch = FieldPatch {
        validation: Some(FieldValidation { pattern: Some("(".into()), ..FieldValidation::default() }),
        ..FieldPatch::default()
    };

    let err = update_field(State(state.clone()), Path((form.id.clone(), "name".into())), Json(patch))
        .await
        .unwrap_err();
    assert_eq!(err.status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(err.code, "E_FIELD_PATTERN");

    let store = state.store.read().await;
    assert_eq!(store.get_form(&form.id).unwrap().fields, form.fields);
}

#[tokio::test]
async fn deleting_the_last_field_is_refused() {
    let state = test_helpers::test_app_state();
    let form = test_helpers::seed_form(&state).await;

    let Json(saved) = delete_field(State(state.clone()), Path((form.id.clone(), "age".into())))
        .await
        .unwrap();
    assert_eq!(saved.fields.len(), 1);

    let err = delete_field(State(state.clone()), Path((form.id.clone(), "name".into())))
        .await
        .unwrap_err();
    assert_eq!(err.code, "E_NO_FIELDS");

    let err = delete_field(State(state), Path((form.id, "ghost".into()))).await.unwrap_err();
    assert_eq!(err.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn duplicate_move_and_reorder_fields() {
    let state = test_helpers::test_app_state();
    let form = test_helpers::seed_form(&state).await;

    let (_, Json(created)) = duplicate_field(State(state.clone()), Path((form.id.clone(), "name".into())))
        .await
        .unwrap();
    let copy = created.form.fields.last().unwrap();
    assert_eq!(copy.id, created.field_id);
    assert_eq!(copy.label, "NAME (copy)");

    let Json(moved) = move_field(
        State(state.clone()),
        Path((form.id.clone(), "age".into())),
        Json(MoveFieldRequest { direction: Direction::Up }),
    )
    .await
    .unwrap();
    assert_eq!(moved.fields[0].id, "age");

    let Json(reordered) = reorder_fields(
        State(state.clone()),
        Path(form.id.clone()),
        Json(ReorderRequest { from: 2, to: 0 }),
    )
    .await
    .unwrap();
    assert_eq!(reordered.fields[0].id, created.field_id);
    assert_eq!(reordered.fields[1].id, "age");

    let err = reorder_fields(State(state), Path(form.id), Json(ReorderRequest { from: 0, to: 9 }))
        .await
        .unwrap_err();
    assert_eq!(err.code, "E_OUT_OF_RANGE");
}

#[tokio::test]
async fn option_editing_round() {
    let state = test_helpers::test_app_state();
    let form = {
        let mut store = state.store.write().await;
        store
            .create_form(
                draft_with("Poll", vec![choice_field("pick", FieldType::Select, &["Yes"])]),
                state.base_url(),
            )
            .unwrap()
    };

    let err = remove_option(State(state.clone()), Path((form.id.clone(), "pick".into(), 0)))
        .await
        .unwrap_err();
    assert_eq!(err.code, "E_LAST_OPTION");

    let Json(saved) = add_option(State(state.clone()), Path((form.id.clone(), "pick".into())))
        .await
        .unwrap();
    assert_eq!(saved.field("pick").unwrap().options(), ["Yes", "Option 2"]);

    let Json(saved) = update_option(
        State(state.clone()),
        Path((form.id.clone(), "pick".into(), 1)),
        Json(OptionRequest { value: "No".into() }),
    )
    .await
    .unwrap();
    assert_eq!(saved.field("pick").unwrap().options(), ["Yes", "No"]);

    let Json(saved) = remove_option(State(state), Path((form.id, "pick".into(), 0)))
        .await
        .unwrap();
    assert_eq!(saved.field("pick").unwrap().options(), ["No"]);
}
