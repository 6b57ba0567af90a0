//! Individual extraction rules.
//!
//! Each rule fills a disjoint set of fields and never looks at another rule's
//! output, so they can run in any order.

use once_cell::sync::Lazy;
use regex::Regex;

use super::{ExtractionRule, NormalizedText};
use crate::types::ExtractedFields;

/// Known insurer tokens, in priority order.
pub const INSURER_TOKENS: [&str; 6] = ["CPAM", "CNAM", "MSA", "MGEN", "HARMONIE", "MUTUELLE"];

// 13 to 15 digits between ASCII word boundaries; accented letters count as separators.
static POLICY_NUMBER_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?-u:\b)[0-9]{13,15}(?-u:\b)").expect("valid policy number pattern")
});

// Uppercase run (accented capitals included) of 3 to 31 chars, whitespace allowed after the first.
static NAME_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b[A-ZÉÈÊËÀÁÂ][A-ZÉÈÊËÀÁÂ\s]{2,30}\b").expect("valid name pattern")
});

/// Leftmost bounded run of 13 to 15 digits becomes the policy number.
#[derive(Debug, Default, Clone, Copy)]
pub struct PolicyNumberRule;

impl ExtractionRule for PolicyNumberRule {
    fn name(&self) -> &'static str {
        "policy_number"
    }

    fn apply(&self, text: &NormalizedText<'_>) -> ExtractedFields {
        ExtractedFields {
            policy_number: POLICY_NUMBER_PATTERN
                .find(text.raw())
                .map(|m| m.as_str().to_string()),
            ..Default::default()
        }
    }
}

/// First token of [`INSURER_TOKENS`] contained anywhere in the upper-cased text.
///
/// List order decides, not position in the text.
#[derive(Debug, Default, Clone, Copy)]
pub struct InsurerRule;

impl ExtractionRule for InsurerRule {
    fn name(&self) -> &'static str {
        "insurer"
    }

    fn apply(&self, text: &NormalizedText<'_>) -> ExtractedFields {
        let upper = text.upper();
        ExtractedFields {
            insurer: INSURER_TOKENS
                .iter()
                .find(|token| upper.contains(*token))
                .map(|token| token.to_string()),
            ..Default::default()
        }
    }
}

/// First uppercase run is the surname, second the given name.
#[derive(Debug, Default, Clone, Copy)]
pub struct NameRule;

impl ExtractionRule for NameRule {
    fn name(&self) -> &'static str {
        "name"
    }

    fn apply(&self, text: &NormalizedText<'_>) -> ExtractedFields {
        let mut runs = NAME_PATTERN
            .find_iter(text.raw())
            .map(|m| m.as_str().trim().to_string());

        ExtractedFields {
            surname: runs.next(),
            given_name: runs.next(),
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(rule: &dyn ExtractionRule, text: &str) -> ExtractedFields {
        rule.apply(&NormalizedText::new(text))
    }

    #[test]
    fn test_policy_number_leftmost() {
        let fields = run(&PolicyNumberRule, "n° 1234567890123 puis 999999999999999");
        assert_eq!(fields.policy_number.as_deref(), Some("1234567890123"));
    }

    #[test]
    fn test_policy_number_length_bounds() {
        assert!(run(&PolicyNumberRule, "123456789012").policy_number.is_none());
        assert!(run(&PolicyNumberRule, "1234567890123456").policy_number.is_none());
        assert_eq!(
            run(&PolicyNumberRule, "x 123456789012345 y").policy_number.as_deref(),
            Some("123456789012345")
        );
    }

    #[test]
    fn test_policy_number_needs_word_boundary() {
        assert!(run(&PolicyNumberRule, "AB1234567890123").policy_number.is_none());
        assert_eq!(
            run(&PolicyNumberRule, "No:1234567890123.").policy_number.as_deref(),
            Some("1234567890123")
        );
    }

    #[test]
    fn test_policy_number_after_accented_letter() {
        assert_eq!(
            run(&PolicyNumberRule, "é1234567890123").policy_number.as_deref(),
            Some("1234567890123")
        );
        assert_eq!(
            run(&PolicyNumberRule, "n°185077512345678É").policy_number.as_deref(),
            Some("185077512345678")
        );
    }

    #[test]
    fn test_insurer_list_order_wins() {
        let fields = run(&InsurerRule, "Mutuelle partenaire de la CPAM");
        assert_eq!(fields.insurer.as_deref(), Some("CPAM"));
    }

    #[test]
    fn test_insurer_case_insensitive_substring() {
        assert_eq!(run(&InsurerRule, "harmonie mutuelle").insurer.as_deref(), Some("HARMONIE"));
        assert!(run(&InsurerRule, "Allianz").insurer.is_none());
    }

    #[test]
    fn test_names_two_runs() {
        let fields = run(&NameRule, "NOM: MARTIN\nprénom: SOPHIE\n");
        assert_eq!(fields.surname.as_deref(), Some("NOM"));
        assert_eq!(fields.given_name.as_deref(), Some("MARTIN"));
    }

    #[test]
    fn test_names_accented_capitals() {
        let fields = run(&NameRule, "Nom LEFÈVRE et HÉLÈNE");
        assert_eq!(fields.surname.as_deref(), Some("LEFÈVRE"));
        assert_eq!(fields.given_name.as_deref(), Some("HÉLÈNE"));
    }

    #[test]
    fn test_names_keep_leading_and_trailing_accents() {
        let fields = run(&NameRule, "ÉCOLE MARTIN\nDUPONTÉ");
        assert_eq!(fields.surname.as_deref(), Some("ÉCOLE MARTIN\nDUPONTÉ"));

        let fields = run(&NameRule, "ÉCOLE MARTIN 1 DUPONTÉ");
        assert_eq!(fields.surname.as_deref(), Some("ÉCOLE MARTIN"));
        assert_eq!(fields.given_name.as_deref(), Some("DUPONTÉ"));
    }

    #[test]
    fn test_names_single_run() {
        let fields = run(&NameRule, "carte de DURAND valide");
        assert_eq!(fields.surname.as_deref(), Some("DURAND"));
        assert!(fields.given_name.is_none());
    }

    #[test]
    fn test_names_lowercase_only() {
        let fields = run(&NameRule, "jean dupont 42 Xy");
        assert!(fields.surname.is_none());
        assert!(fields.given_name.is_none());
    }

    #[test]
    fn test_names_trailing_space_counts_toward_length() {
        // "AB " is three characters long; the trailing space is trimmed afterwards.
        let fields = run(&NameRule, "AB cd EF");
        assert_eq!(fields.surname.as_deref(), Some("AB"));
        assert!(fields.given_name.is_none());
    }
}
