//! OCR output and language hints.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Text transcribed from exactly one captured image.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecognizedText(String);

impl RecognizedText {
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }

    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl From<String> for RecognizedText {
    fn from(text: String) -> Self {
        Self(text)
    }
}

impl From<&str> for RecognizedText {
    fn from(text: &str) -> Self {
        Self(text.to_string())
    }
}

impl AsRef<str> for RecognizedText {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RecognizedText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Ordered, de-duplicated set of recognition language codes (e.g. `fra`, `eng`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub struct LanguageHints(Vec<String>);

impl LanguageHints {
    pub fn new<I, S>(codes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut hints = Vec::new();
        for code in codes {
            let code = code.into().trim().to_lowercase();
            if !code.is_empty() && !hints.contains(&code) {
                hints.push(code);
            }
        }
        Self(hints)
    }

    /// Parse a `+` or `,` separated list such as `fra+eng`.
    pub fn parse(list: &str) -> Self {
        Self::new(list.split(['+', ',']))
    }

    pub fn codes(&self) -> &[String] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Tesseract-style language argument.
    pub fn joined(&self) -> String {
        self.0.join("+")
    }
}

impl Default for LanguageHints {
    fn default() -> Self {
        Self::new(["fra", "eng"])
    }
}

impl From<Vec<String>> for LanguageHints {
    fn from(codes: Vec<String>) -> Self {
        Self::new(codes)
    }
}

impl From<LanguageHints> for Vec<String> {
    fn from(hints: LanguageHints) -> Self {
        hints.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_hints() {
        assert_eq!(LanguageHints::default().joined(), "fra+eng");
    }

    #[test]
    fn test_parse_dedupes_and_normalizes() {
        let hints = LanguageHints::parse("FRA + eng,fra,,deu");
        assert_eq!(hints.codes(), &["fra", "eng", "deu"]);
    }

    #[test]
    fn test_recognized_text_blank() {
        assert!(RecognizedText::new(" \n\t").is_blank());
        assert!(!RecognizedText::from("CPAM").is_blank());
    }
}
