//! Integration tests for field extraction on realistic OCR output.

use cardscan_core::{extract_fields, CardForm, CardField, FieldExtractor};

#[test]
fn test_typical_card_scan() {
    let fields = extract_fields("DUPONT JEAN\n1234567890123\nCPAM REMBOURSEMENT");

    assert_eq!(fields.surname.as_deref(), Some("DUPONT JEAN"));
    assert_eq!(fields.policy_number.as_deref(), Some("1234567890123"));
    assert_eq!(fields.insurer.as_deref(), Some("CPAM"));
    // The insurer line is itself an uppercase run, so it becomes the given name.
    assert_eq!(fields.given_name.as_deref(), Some("CPAM REMBOURSEMENT"));
}

#[test]
fn test_mixed_case_text_matches_nothing() {
    let fields = extract_fields("Jean Dupont\nNo digits here\nUnknown Co");
    assert!(fields.is_empty());
    assert_eq!(fields.found(), 0);
}

#[test]
fn test_noisy_scan() {
    let text = "carte vitale\n\
                ASSURANCE MALADIE\n\
                n° 2 85 07 75 123 456 78\n\
                ref 185077512345678 / 99\n\
                MARTIN\n\
                Mgen section 75";
    let fields = extract_fields(text);

    assert_eq!(fields.policy_number.as_deref(), Some("185077512345678"));
    assert_eq!(fields.insurer.as_deref(), Some("MGEN"));
    assert_eq!(fields.surname.as_deref(), Some("ASSURANCE MALADIE"));
    assert_eq!(fields.given_name.as_deref(), Some("MARTIN"));
}

#[test]
fn test_extraction_is_idempotent() {
    let extractor = FieldExtractor::new();
    let text = "LEFÈVRE ÉMILE\n987654321098765\nHARMONIE MUTUELLE";

    let first = extractor.extract(text);
    let second = extractor.extract(text);

    assert_eq!(first, second);
    assert_eq!(first.insurer.as_deref(), Some("HARMONIE"));
}

#[test]
fn test_form_prefill_from_partial_extraction() {
    let form = CardForm::from(extract_fields("1234567890123"));

    assert_eq!(form.get(CardField::PolicyNumber), "1234567890123");
    assert_eq!(
        form.missing_fields(),
        vec![CardField::Surname, CardField::GivenName, CardField::Insurer]
    );
}
