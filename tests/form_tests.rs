// Extraction and filling against synthesized AcroForm documents.

mod common;

use formfile::{extract_fields, fill_pdf, FieldType, FilerError, PdfForm};
use serde_json::json;

// ── Extraction ────────────────────────────────────────────────────────────────

#[test]
fn extracts_every_terminal_field_in_order() {
    let form = PdfForm::from_bytes("claim.pdf", &common::form_pdf()).unwrap();
    let result = form.extract_fields();

    assert_eq!(result.filename, "claim.pdf");
    assert_eq!(result.total_fields, common::FORM_FIELDS.len());
    let names: Vec<&str> = result.fields.iter().map(|f| f.name.as_str()).collect();
    assert_eq!(names, common::FORM_FIELDS);
}

#[test]
fn reports_types_values_and_flags() {
    let result = PdfForm::from_bytes("claim.pdf", &common::form_pdf())
        .unwrap()
        .extract_fields();
    let field = |name: &str| result.fields.iter().find(|f| f.name == name).unwrap();

    assert_eq!(field("first_name").field_type, FieldType::Text);
    assert_eq!(field("first_name").value, None);
    assert!(!field("first_name").required);

    assert!(field("ssn").required);
    assert_eq!(field("ssn").value.as_deref(), Some("123-45-6789"));

    assert_eq!(field("agree").field_type, FieldType::Checkbox);
    assert_eq!(field("agree").value.as_deref(), Some("Off"));

    let plan = field("plan");
    assert_eq!(plan.field_type, FieldType::Dropdown);
    assert_eq!(plan.options, vec!["Basic", "Premium"]);
    assert_eq!(plan.value.as_deref(), Some("Basic"));

    // /FT comes from the parent node
    assert_eq!(field("home.city").field_type, FieldType::Text);

    assert!(result.fields.iter().all(|f| f.page == 0));
}

#[test]
fn document_without_form_has_no_fields() {
    let result = PdfForm::from_bytes("plain.pdf", &common::plain_pdf())
        .unwrap()
        .extract_fields();
    assert_eq!(result.total_fields, 0);
    assert!(result.fields.is_empty());
}

#[test]
fn missing_document_is_not_found() {
    let err = extract_fields("/nonexistent/form.pdf").unwrap_err();
    assert!(matches!(err, FilerError::NotFound(_)));
}

#[test]
fn garbage_is_a_parse_error() {
    assert!(PdfForm::from_bytes("x.pdf", b"not a pdf").is_err());
}

#[test]
fn text_strings_follow_their_declared_encoding() {
    let result = PdfForm::from_bytes("versicherung.pdf", &common::encoded_form_pdf())
        .unwrap()
        .extract_fields();

    assert_eq!(result.total_fields, 1);
    let field = &result.fields[0];
    assert_eq!(field.name, "Ärztliche Versicherung");
    assert_eq!(field.value.as_deref(), Some("Acme\u{2122} plan \u{2014} tax"));
}

// ── Filling ───────────────────────────────────────────────────────────────────

#[test]
fn fills_matching_fields_and_counts_the_rest_as_skipped() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("out.pdf");

    let mut form = PdfForm::from_bytes("claim.pdf", &common::form_pdf()).unwrap();
    let result = form
        .fill(
            &json!({
                "First Name": "Jane",
                "agree": "yes",
                "Home.City": "Springfield",
                "not_in_form": "ignored"
            }),
            &output,
        )
        .unwrap();

    assert_eq!(result.fields_filled, 3);
    assert_eq!(result.fields_skipped, 2);
    assert_eq!(result.fields_total, 5);
    assert_eq!(result.output_path, output);

    let filled = extract_fields(&output).unwrap();
    let value = |name: &str| {
        filled
            .fields
            .iter()
            .find(|f| f.name == name)
            .and_then(|f| f.value.clone())
    };
    assert_eq!(value("first_name").as_deref(), Some("Jane"));
    assert_eq!(value("agree").as_deref(), Some("Yes"));
    assert_eq!(value("home.city").as_deref(), Some("Springfield"));
    assert_eq!(value("ssn").as_deref(), Some("123-45-6789"));
}

#[test]
fn filling_requests_appearance_regeneration() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("out.pdf");

    let mut form = PdfForm::from_bytes("claim.pdf", &common::form_pdf()).unwrap();
    form.fill(&json!({ "first_name": "Jane" }), &output).unwrap();

    let reloaded = PdfForm::from_path(&output).unwrap();
    let doc = reloaded.document();
    let acroform_id = doc
        .catalog()
        .unwrap()
        .get(b"AcroForm")
        .unwrap()
        .as_reference()
        .unwrap();
    let acroform = doc.get_object(acroform_id).unwrap().as_dict().unwrap();
    assert!(acroform.get(b"NeedAppearances").unwrap().as_bool().unwrap());
}

#[test]
fn falsy_checkbox_value_turns_it_off() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("out.pdf");

    let mut form = PdfForm::from_bytes("claim.pdf", &common::form_pdf()).unwrap();
    form.fill(&json!({ "agree": false }), &output).unwrap();

    let filled = extract_fields(&output).unwrap();
    let agree = filled.fields.iter().find(|f| f.name == "agree").unwrap();
    assert_eq!(agree.value.as_deref(), Some("Off"));
}

#[test]
fn nested_profile_values_are_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let mut form = PdfForm::from_bytes("claim.pdf", &common::form_pdf()).unwrap();
    let err = form
        .fill(&json!({ "first_name": { "given": "Jane" } }), dir.path().join("out.pdf"))
        .unwrap_err();
    assert!(matches!(err, FilerError::InvalidProfile(_)));
}

#[test]
fn fill_pdf_writes_beside_input_by_default() {
    let dir = tempfile::tempdir().unwrap();
    let pdf = common::write(dir.path(), "claim_form.pdf", &common::form_pdf());
    let profile = common::write(
        dir.path(),
        "profile.json",
        br#"{"first_name": "Jane", "plan": "Premium"}"#,
    );

    let result = fill_pdf(&pdf, &profile, None).unwrap();
    assert_eq!(result.output_path, dir.path().join("claim_form_filled.pdf"));
    assert!(result.output_path.exists());
    assert_eq!(result.fields_filled, 2);
}

#[test]
fn fill_pdf_reports_missing_inputs() {
    let dir = tempfile::tempdir().unwrap();
    let pdf = common::write(dir.path(), "claim.pdf", &common::form_pdf());

    let err = fill_pdf(dir.path().join("missing.pdf"), &pdf, None).unwrap_err();
    assert!(matches!(err, FilerError::NotFound(_)));

    let err = fill_pdf(&pdf, dir.path().join("missing.json"), None).unwrap_err();
    assert!(matches!(err, FilerError::NotFound(p) if p.ends_with("missing.json")));
}

#[test]
fn non_ascii_values_survive_a_fill() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("out.pdf");

    let mut form = PdfForm::from_bytes("versicherung.pdf", &common::encoded_form_pdf()).unwrap();
    let result = form
        .fill(&json!({ "ärztliche versicherung": "Krankenkasse Süd" }), &output)
        .unwrap();
    assert_eq!(result.fields_filled, 1);

    let filled = extract_fields(&output).unwrap();
    assert_eq!(filled.fields[0].value.as_deref(), Some("Krankenkasse Süd"));
}
