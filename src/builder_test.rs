use super::*;
use crate::state::test_helpers::{choice_field, field, form_with};

fn ids(form: &Form) -> Vec<&str> {
    form.fields.iter().map(|f| f.id.as_str()).collect()
}

fn abc() -> Form {
    form_with(vec![field("a", FieldType::Text), field("b", FieldType::Text), field("c", FieldType::Text)])
}

#[test]
fn new_field_uses_builder_defaults() {
    let f = new_field(FieldType::Email);
    assert!(f.id.starts_with("field-"));
    assert_eq!(f.label, "New email field");
    assert_eq!(f.placeholder.as_deref(), Some("Enter email..."));
    assert_eq!(f.validation.required, Some(false));
    assert!(f.options.is_none());
}

#[test]
fn new_choice_fields_get_three_options() {
    for ty in [FieldType::Select, FieldType::Radio, FieldType::Checkbox] {
        assert_eq!(new_field(ty).options(), ["Option 1", "Option 2", "Option 3"]);
    }
}

#[test]
fn add_field_appends_with_unique_ids() {
    let mut form = abc();
    let first = add_field(&mut form, FieldType::Number);
    let second = add_field(&mut form, FieldType::Number);
    assert_ne!(first, second);
    assert_eq!(form.fields.len(), 5);
    assert_eq!(form.fields[4].id, second);
}

#[test]
fn update_field_applies_only_set_attributes() {
    let mut form = abc();
    let patch = FieldPatch { label: Some("Full name".into()), ..FieldPatch::default() };
    update_field(&mut form, "b", patch).unwrap();
    assert_eq!(form.fields[1].label, "Full name");
    assert_eq!(form.fields[1].placeholder, None);
}

#[test]
fn update_field_rejects_options_on_text() {
    let mut form = abc();
    let patch = FieldPatch { options: Some(vec!["x".into()]), ..FieldPatch::default() };
    assert_eq!(update_field(&mut form, "a", patch), Err(BuilderError::NotAChoiceField("a".into())));
}

#[test]
fn delete_and_duplicate_unknown_field_fail() {
    let mut form = abc();
    assert_eq!(delete_field(&mut form, "zz").unwrap_err(), BuilderError::FieldNotFound("zz".into()));
    assert_eq!(duplicate_field(&mut form, "zz").unwrap_err(), BuilderError::FieldNotFound("zz".into()));
}

#[test]
fn duplicate_field_appends_copy_with_suffix() {
    let mut form = abc();
    form.fields[0].label = "Name".into();
    let id = duplicate_field(&mut form, "a").unwrap();
    let copy = form.fields.last().unwrap();
    assert_eq!(copy.id, id);
    assert_eq!(copy.label, "Name (copy)");
    assert_eq!(copy.field_type, FieldType::Text);
    assert!(check_schema(&form).is_ok());
}

#[test]
fn move_field_swaps_neighbours() {
    let mut form = abc();
    move_field(&mut form, "b", Direction::Up).unwrap();
    assert_eq!(ids(&form), ["b", "a", "c"]);
    move_field(&mut form, "b", Direction::Down).unwrap();
    assert_eq!(ids(&form), ["a", "b", "c"]);
}

#[test]
fn move_field_is_noop_at_boundaries() {
    let mut form = abc();
    move_field(&mut form, "a", Direction::Up).unwrap();
    move_field(&mut form, "c", Direction::Down).unwrap();
    assert_eq!(ids(&form), ["a", "b", "c"]);
}

#[test]
fn reorder_moves_field_to_drop_position() {
    let mut form = abc();
    reorder(&mut form, 0, 2).unwrap();
    assert_eq!(ids(&form), ["b", "c", "a"]);
    reorder(&mut form, 2, 0).unwrap();
    assert_eq!(ids(&form), ["a", "b", "c"]);
}

#[test]
fn reorder_rejects_out_of_range() {
    let mut form = abc();
    assert_eq!(reorder(&mut form, 3, 0), Err(BuilderError::IndexOutOfRange(3)));
    assert_eq!(reorder(&mut form, 0, 7), Err(BuilderError::IndexOutOfRange(7)));
    assert_eq!(ids(&form), ["a", "b", "c"]);
}

#[test]
fn option_ops_add_update_remove() {
    let mut form = form_with(vec![choice_field("pick", FieldType::Radio, &["Yes", "No"])]);
    assert_eq!(add_option(&mut form, "pick").unwrap(), 2);
    assert_eq!(form.fields[0].options(), ["Yes", "No", "Option 3"]);
    update_option(&mut form, "pick", 2, "Maybe".into()).unwrap();
    assert_eq!(remove_option(&mut form, "pick", 0).unwrap(), "Yes");
    assert_eq!(form.fields[0].options(), ["No", "Maybe"]);
    assert_eq!(update_option(&mut form, "pick", 9, "x".into()), Err(BuilderError::OptionOutOfRange(9)));
}

#[test]
fn remove_option_keeps_the_last_one() {
    let mut form = form_with(vec![choice_field("pick", FieldType::Select, &["Only"])]);
    assert_eq!(remove_option(&mut form, "pick", 0), Err(BuilderError::LastOption));
}

#[test]
fn option_ops_refuse_non_choice_fields() {
    let mut form = abc();
    assert_eq!(add_option(&mut form, "a"), Err(BuilderError::NotAChoiceField("a".into())));
}

#[test]
fn check_schema_requires_title_and_fields() {
    let mut form = abc();
    form.title = "  ".into();
    assert_eq!(check_schema(&form), Err(SchemaError::MissingTitle));
    form.title = "Survey".into();
    form.fields.clear();
    assert_eq!(check_schema(&form), Err(SchemaError::NoFields));
}

#[test]
fn check_imported_allows_no_fields_but_checks_the_rest() {
    let mut form = abc();
    form.fields.clear();
    assert_eq!(check_imported(&form), Ok(()));
    form.title = String::new();
    assert_eq!(check_imported(&form), Err(SchemaError::MissingTitle));

    let dupes = form_with(vec![field("a", FieldType::Text), field("a", FieldType::Email)]);
    assert_eq!(check_imported(&dupes), Err(SchemaError::DuplicateFieldId("a".into())));
}

#[test]
fn check_schema_rejects_duplicate_ids() {
    let form = form_with(vec![field("a", FieldType::Text), field("a", FieldType::Email)]);
    assert_eq!(check_schema(&form), Err(SchemaError::DuplicateFieldId("a".into())));
}

#[test]
fn check_schema_enforces_option_placement() {
    let mut text = field("a", FieldType::Text);
    text.options = Some(vec!["x".into()]);
    assert_eq!(check_schema(&form_with(vec![text])), Err(SchemaError::UnexpectedOptions("a".into())));

    let empty = choice_field("s", FieldType::Select, &[]);
    assert_eq!(check_schema(&form_with(vec![empty])), Err(SchemaError::MissingOptions("s".into())));
}

#[test]
fn check_schema_rejects_bad_pattern_and_inverted_bounds() {
    let mut bad = field("a", FieldType::Text);
    bad.validation.pattern = Some("[".into());
    assert!(matches!(check_schema(&form_with(vec![bad])), Err(SchemaError::InvalidPattern { .. })));

    let mut inverted = field("n", FieldType::Number);
    inverted.validation.min = Some(10.0);
    inverted.validation.max = Some(1.0);
    assert_eq!(check_schema(&form_with(vec![inverted])), Err(SchemaError::InvertedBounds("n".into())));
}

#[test]
fn schema_error_messages_are_user_facing() {
    assert_eq!(SchemaError::MissingTitle.to_string(), "Form title is required");
    assert_eq!(SchemaError::NoFields.to_string(), "Form must have at least one field");
}
