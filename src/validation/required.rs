use crate::models::{MrzField, MrzFieldName};
use crate::utils::PassportError;

pub const REQUIRED_PASSPORT_FIELDS: [MrzFieldName; 4] = [
    MrzFieldName::FirstName,
    MrzFieldName::DocumentNumber,
    MrzFieldName::Nationality,
    MrzFieldName::ExpirationDate,
];

pub struct RequiredFieldsValidator;

impl RequiredFieldsValidator {
    pub fn validate(details: &[MrzField]) -> Result<(), PassportError> {
        let missing: Vec<String> = REQUIRED_PASSPORT_FIELDS
            .iter()
            .filter(|required| {
                !details
                    .iter()
                    .any(|d| d.field == Some(**required) && d.trimmed_value().is_some())
            })
            .map(|required| {
                details
                    .iter()
                    .find(|d| d.field == Some(*required))
                    .and_then(|d| d.label.clone())
                    .unwrap_or_else(|| required.as_str().to_string())
            })
            .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(PassportError::MissingRequiredFields(missing))
        }
    }
}
