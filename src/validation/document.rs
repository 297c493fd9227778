use crate::models::MRZ_FILLER;
use crate::utils::PassportError;

/// Lowercase document vocabulary in the languages passports are commonly printed in.
pub const PASSPORT_TERMS: [&str; 26] = [
    "passport",
    "passeport",
    "reisepass",
    "pasaporte",
    "passaporto",
    "паспорт",
    "republic",
    "république",
    "bundesrepublik",
    "república",
    "repubblica",
    "nationality",
    "nationalité",
    "staatsangehörigkeit",
    "nacionalidad",
    "date",
    "birth",
    "expiry",
    "mrz",
    "given",
    "surname",
    "nom",
    "name",
    "document",
    "dokument",
    "documento",
];

/// Decides whether recognized text plausibly comes from a passport.
pub struct DocumentValidator;

impl DocumentValidator {
    pub fn matched_terms(text: &str) -> Vec<&'static str> {
        let lowered = text.to_lowercase();
        PASSPORT_TERMS
            .iter()
            .copied()
            .filter(|term| lowered.contains(term))
            .collect()
    }

    /// A single filler character is accepted as evidence even without any keyword.
    pub fn validate(text: &str) -> Result<(), PassportError> {
        if text.contains(MRZ_FILLER) || !Self::matched_terms(text).is_empty() {
            Ok(())
        } else {
            Err(PassportError::NotAPassport)
        }
    }
}
