//! Heuristic field extraction from raw OCR text.
//!
//! OCR output from a card photo has no reliable layout, so extraction is a
//! handful of cheap, independent pattern rules whose results are merged. The
//! first match always wins; a human reviews the pre-filled form anyway.
//!
//! # Example
//!
//! ```
//! use cardscan_core::extraction::FieldExtractor;
//!
//! let fields = FieldExtractor::new().extract("DUPONT\n1234567890123\nCPAM");
//! assert_eq!(fields.policy_number.as_deref(), Some("1234567890123"));
//! assert_eq!(fields.insurer.as_deref(), Some("CPAM"));
//! ```

mod rules;

pub use rules::{InsurerRule, NameRule, PolicyNumberRule, INSURER_TOKENS};

use once_cell::sync::Lazy;
use tracing::trace;

use crate::types::ExtractedFields;

/// OCR text prepared once for every rule.
#[derive(Debug, Clone)]
pub struct NormalizedText<'a> {
    raw: &'a str,
    lines: Vec<&'a str>,
    upper: String,
}

impl<'a> NormalizedText<'a> {
    pub fn new(raw: &'a str) -> Self {
        let lines = raw
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .collect();

        Self {
            raw,
            lines,
            upper: raw.to_uppercase(),
        }
    }

    /// The text exactly as recognized.
    pub fn raw(&self) -> &'a str {
        self.raw
    }

    /// Trimmed, non-empty lines.
    pub fn lines(&self) -> &[&'a str] {
        &self.lines
    }

    /// Upper-cased copy of the raw text.
    pub fn upper(&self) -> &str {
        &self.upper
    }
}

/// A single extraction heuristic.
pub trait ExtractionRule: Send + Sync {
    /// Rule name for logs.
    fn name(&self) -> &'static str;

    /// Produce the fields this rule is responsible for.
    fn apply(&self, text: &NormalizedText<'_>) -> ExtractedFields;
}

/// Runs an ordered list of rules and merges their results.
pub struct FieldExtractor {
    rules: Vec<Box<dyn ExtractionRule>>,
}

impl FieldExtractor {
    /// Extractor with the standard policy-number, insurer and name rules.
    pub fn new() -> Self {
        Self {
            rules: vec![
                Box::new(PolicyNumberRule),
                Box::new(InsurerRule),
                Box::new(NameRule),
            ],
        }
    }

    /// Extractor with no rules.
    pub fn empty() -> Self {
        Self { rules: Vec::new() }
    }

    /// Add a rule. Earlier rules win if two rules fill the same field.
    pub fn with_rule(mut self, rule: impl ExtractionRule + 'static) -> Self {
        self.rules.push(Box::new(rule));
        self
    }

    pub fn rule_names(&self) -> Vec<&'static str> {
        self.rules.iter().map(|r| r.name()).collect()
    }

    /// Extract candidate fields. Pure: the same text always gives the same result.
    pub fn extract(&self, text: &str) -> ExtractedFields {
        let normalized = NormalizedText::new(text);
        let mut fields = ExtractedFields::default();

        for rule in &self.rules {
            let found = rule.apply(&normalized);
            trace!(rule = rule.name(), found = found.found(), "Extraction rule applied");
            fields.merge(found);
        }

        fields
    }
}

impl Default for FieldExtractor {
    fn default() -> Self {
        Self::new()
    }
}

static DEFAULT_EXTRACTOR: Lazy<FieldExtractor> = Lazy::new(FieldExtractor::new);

/// Extract fields with the standard rules.
pub fn extract_fields(text: &str) -> ExtractedFields {
    DEFAULT_EXTRACTOR.extract(text)
}
