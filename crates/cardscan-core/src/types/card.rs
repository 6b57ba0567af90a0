//! Card data types: extracted candidates, the editable form, and stored records.

use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, IntoEnumIterator};
use uuid::Uuid;

use crate::error::{CardScanError, CardScanResult};

/// The four required fields of an insurance card.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumIter,
)]
#[strum(serialize_all = "camelCase")]
#[serde(rename_all = "camelCase")]
pub enum CardField {
    Surname,
    GivenName,
    PolicyNumber,
    Insurer,
}

impl CardField {
    /// Field name as it appears on the wire.
    pub fn wire_name(&self) -> &'static str {
        match self {
            CardField::Surname => "surname",
            CardField::GivenName => "givenName",
            CardField::PolicyNumber => "policyNumber",
            CardField::Insurer => "insurer",
        }
    }
}

/// Candidate values pulled out of OCR text. Every field is optional and
/// unvalidated; a human reviews them before submission.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractedFields {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub surname: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub given_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub policy_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub insurer: Option<String>,
}

impl ExtractedFields {
    pub fn get(&self, field: CardField) -> Option<&str> {
        match field {
            CardField::Surname => self.surname.as_deref(),
            CardField::GivenName => self.given_name.as_deref(),
            CardField::PolicyNumber => self.policy_number.as_deref(),
            CardField::Insurer => self.insurer.as_deref(),
        }
    }

    fn slot(&mut self, field: CardField) -> &mut Option<String> {
        match field {
            CardField::Surname => &mut self.surname,
            CardField::GivenName => &mut self.given_name,
            CardField::PolicyNumber => &mut self.policy_number,
            CardField::Insurer => &mut self.insurer,
        }
    }

    /// Fill every field that is still absent here from `other`.
    ///
    /// Fields already present are never overwritten.
    pub fn merge(&mut self, mut other: ExtractedFields) {
        for field in CardField::iter() {
            let slot = self.slot(field);
            if slot.is_none() {
                *slot = other.slot(field).take();
            }
        }
    }

    /// True when no field was extracted.
    pub fn is_empty(&self) -> bool {
        CardField::iter().all(|f| self.get(f).is_none())
    }

    /// Number of fields present.
    pub fn found(&self) -> usize {
        CardField::iter().filter(|f| self.get(*f).is_some()).count()
    }
}

/// Editable form pre-filled from [`ExtractedFields`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardForm {
    pub surname: String,
    pub given_name: String,
    pub policy_number: String,
    pub insurer: String,
}

impl CardForm {
    pub fn get(&self, field: CardField) -> &str {
        match field {
            CardField::Surname => &self.surname,
            CardField::GivenName => &self.given_name,
            CardField::PolicyNumber => &self.policy_number,
            CardField::Insurer => &self.insurer,
        }
    }

    /// Overwrite one field with user input.
    pub fn set(&mut self, field: CardField, value: impl Into<String>) {
        let value = value.into();
        match field {
            CardField::Surname => self.surname = value,
            CardField::GivenName => self.given_name = value,
            CardField::PolicyNumber => self.policy_number = value,
            CardField::Insurer => self.insurer = value,
        }
    }

    /// Fields that are empty or whitespace-only.
    pub fn missing_fields(&self) -> Vec<CardField> {
        CardField::iter()
            .filter(|f| self.get(*f).trim().is_empty())
            .collect()
    }

    /// Trim every field and turn the form into a submission payload.
    pub fn validate(&self) -> CardScanResult<NewCard> {
        let missing = self.missing_fields();
        if !missing.is_empty() {
            return Err(CardScanError::missing_fields(missing));
        }

        Ok(NewCard::new(
            self.surname.trim(),
            self.given_name.trim(),
            self.policy_number.trim(),
            self.insurer.trim(),
        ))
    }
}

impl From<ExtractedFields> for CardForm {
    fn from(fields: ExtractedFields) -> Self {
        Self {
            surname: fields.surname.unwrap_or_default(),
            given_name: fields.given_name.unwrap_or_default(),
            policy_number: fields.policy_number.unwrap_or_default(),
            insurer: fields.insurer.unwrap_or_default(),
        }
    }
}

/// Submission payload for a persistence client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCard {
    #[serde(default)]
    pub surname: String,
    #[serde(default)]
    pub given_name: String,
    #[serde(default)]
    pub policy_number: String,
    #[serde(default)]
    pub insurer: String,
    /// Card photo as a `data:` URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_data: Option<String>,
}

impl NewCard {
    pub fn new(
        surname: impl Into<String>,
        given_name: impl Into<String>,
        policy_number: impl Into<String>,
        insurer: impl Into<String>,
    ) -> Self {
        Self {
            surname: surname.into(),
            given_name: given_name.into(),
            policy_number: policy_number.into(),
            insurer: insurer.into(),
            image_data: None,
        }
    }

    /// Attach the card photo.
    pub fn with_image_data(mut self, data_url: impl Into<String>) -> Self {
        self.image_data = Some(data_url.into());
        self
    }

    fn get(&self, field: CardField) -> &str {
        match field {
            CardField::Surname => &self.surname,
            CardField::GivenName => &self.given_name,
            CardField::PolicyNumber => &self.policy_number,
            CardField::Insurer => &self.insurer,
        }
    }

    /// Reject payloads with blank required fields.
    pub fn ensure_complete(&self) -> CardScanResult<()> {
        let missing: Vec<CardField> = CardField::iter()
            .filter(|f| self.get(*f).trim().is_empty())
            .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(CardScanError::missing_fields(missing))
        }
    }
}

/// A persisted card. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardRecord {
    pub id: String,
    pub surname: String,
    pub given_name: String,
    pub policy_number: String,
    pub insurer: String,
    pub registered_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_data: Option<String>,
}

impl CardRecord {
    /// Validate a submission and stamp it with a fresh id and the current time.
    ///
    /// Stored values are trimmed and the timestamp is truncated to microseconds.
    pub fn issue(card: NewCard) -> CardScanResult<Self> {
        card.ensure_complete()?;

        Ok(Self {
            id: Uuid::new_v4().to_string(),
            surname: card.surname.trim().to_string(),
            given_name: card.given_name.trim().to_string(),
            policy_number: card.policy_number.trim().to_string(),
            insurer: card.insurer.trim().to_string(),
            registered_at: Utc::now().trunc_subsecs(6),
            image_data: card.image_data,
        })
    }

    /// Display name, given name first.
    pub fn display_name(&self) -> String {
        format!("{} {}", self.given_name, self.surname)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_keeps_present_fields() {
        let mut fields = ExtractedFields {
            surname: Some("DUPONT".to_string()),
            ..Default::default()
        };
        fields.merge(ExtractedFields {
            surname: Some("MARTIN".to_string()),
            insurer: Some("CPAM".to_string()),
            ..Default::default()
        });

        assert_eq!(fields.surname.as_deref(), Some("DUPONT"));
        assert_eq!(fields.insurer.as_deref(), Some("CPAM"));
        assert_eq!(fields.found(), 2);
    }

    #[test]
    fn test_form_validate_trims() {
        let form = CardForm {
            surname: "  Dupont ".to_string(),
            given_name: "Jean".to_string(),
            policy_number: " 1234567890123".to_string(),
            insurer: "CPAM\n".to_string(),
        };

        let card = form.validate().unwrap();
        assert_eq!(card.surname, "Dupont");
        assert_eq!(card.policy_number, "1234567890123");
        assert_eq!(card.insurer, "CPAM");
        assert!(card.image_data.is_none());
    }

    #[test]
    fn test_form_validate_reports_whitespace_fields() {
        let form = CardForm {
            surname: "Dupont".to_string(),
            given_name: String::new(),
            policy_number: "   \t".to_string(),
            insurer: "CPAM".to_string(),
        };

        let err = form.validate().unwrap_err();
        assert_eq!(err.missing(), &[CardField::GivenName, CardField::PolicyNumber]);
    }

    #[test]
    fn test_form_from_extracted() {
        let form = CardForm::from(ExtractedFields {
            policy_number: Some("123456789012345".to_string()),
            ..Default::default()
        });
        assert_eq!(form.policy_number, "123456789012345");
        assert!(form.surname.is_empty());
    }

    #[test]
    fn test_new_card_wire_shape() {
        let card: NewCard = serde_json::from_str(
            r#"{"surname":"Dupont","givenName":"Jean","policyNumber":"1234567890123","insurer":"CPAM"}"#,
        )
        .unwrap();
        assert_eq!(card.given_name, "Jean");
        assert!(card.ensure_complete().is_ok());

        let partial: NewCard = serde_json::from_str(r#"{"surname":"Dupont"}"#).unwrap();
        assert_eq!(
            partial.ensure_complete().unwrap_err().missing(),
            &[CardField::GivenName, CardField::PolicyNumber, CardField::Insurer]
        );
    }

    #[test]
    fn test_issue_record() {
        let record = CardRecord::issue(NewCard::new(" Dupont", "Jean", "1234567890123", "CPAM"))
            .unwrap();
        assert_eq!(record.surname, "Dupont");
        assert_eq!(record.display_name(), "Jean Dupont");
        assert!(Uuid::parse_str(&record.id).is_ok());

        let json = serde_json::to_value(&record).unwrap();
        assert!(json.get("registeredAt").is_some());
        assert!(json.get("imageData").is_none());
    }

    #[test]
    fn test_card_field_display() {
        assert_eq!(CardField::PolicyNumber.to_string(), "policyNumber");
        assert_eq!(CardField::GivenName.wire_name(), "givenName");
    }
}
