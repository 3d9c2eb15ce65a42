use super::*;
use serde_json::json;

use crate::model::Answers;
use crate::state::test_helpers;
use crate::validation::FILE_NOT_UPLOADED;

#[tokio::test]
async fn list_templates_names_gst_registration() {
    let Json(templates) = list_templates().await;
    assert_eq!(templates.len(), 1);
    assert_eq!(templates[0].slug, "gst-registration");
    assert_eq!(templates[0].title, "GST Registration for Proprietorship");
    assert_eq!(templates[0].field_count, 16);
}

#[tokio::test]
async fn create_from_template_builds_public_form() {
    let state = test_helpers::test_app_state();
    let (status, Json(form)) = create_from_template(State(state.clone()), Path("gst-registration".into()))
        .await
        .unwrap();
    assert_eq!(status, StatusCode::CREATED);
    assert!(form.is_public);
    assert_eq!(form.share_url.as_deref(), Some(format!("http://forms.test/form/{}", form.id).as_str()));

    let answers: Answers = [
        ("proprietorName", json!("Asha Rao")),
        ("panCard", json!("ABCDE1234F")),
        ("aadharCard", json!("123412341234")),
        ("addressProofType", json!("If on Rent")),
        ("businessName", json!("Rao Traders")),
        ("productService", json!("Spices")),
        ("mobileNumber", json!("9876543210")),
        ("emailId", json!("asha@example.in")),
        ("businessAddress", json!("12 Market Road, Pune")),
        ("bankAccountType", json!("Saving Bank Account of Proprietor")),
        ("rentAgreement", json!({ "name": "lease.pdf" })),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_owned(), v))
    .collect();
    let submission = state.store.write().await.add_submission(&form.id, answers).unwrap();
    assert_eq!(submission.data["rentAgreement"], json!("lease.pdf"));
    assert_eq!(submission.data["proprietorPhoto"], json!(FILE_NOT_UPLOADED));
    assert_eq!(submission.data["bankDocument"], json!(FILE_NOT_UPLOADED));
}

#[tokio::test]
async fn unknown_template_is_not_found() {
    let state = test_helpers::test_app_state();
    let err = create_from_template(State(state), Path("w-9".into())).await.unwrap_err();
    assert_eq!(err.status, StatusCode::NOT_FOUND);
    assert_eq!(err.code, "E_TEMPLATE_NOT_FOUND");
    assert_eq!(err.message, "Template not found");
}
