use crate::models::{MrzField, OcrResult};
use crate::utils::PassportError;
use crate::validation::{ConfidenceValidator, DocumentValidator, RequiredFieldsValidator};
use log::debug;

/// Accept/reject decisions taken before a record reaches the presentation layer.
#[derive(Debug, Clone, Copy)]
pub struct ValidationGate {
    min_confidence: f32,
}

impl ValidationGate {
    pub fn new(min_confidence: f32) -> Self {
        ValidationGate { min_confidence }
    }

    /// Checks on the raw recognition: some text, enough confidence, passport-like content.
    pub fn check_recognition(&self, ocr: &OcrResult) -> Result<(), PassportError> {
        if ocr.text.trim().is_empty() {
            return Err(PassportError::NoTextDetected);
        }
        ConfidenceValidator::validate(ocr, self.min_confidence)?;
        DocumentValidator::validate(&ocr.text)?;
        debug!(
            "Recognition accepted (confidence {:.1}, terms {:?})",
            ocr.confidence,
            DocumentValidator::matched_terms(&ocr.text)
        );
        Ok(())
    }

    /// Checks on the decoded MRZ fields.
    pub fn check_fields(&self, details: &[MrzField]) -> Result<(), PassportError> {
        RequiredFieldsValidator::validate(details)
    }
}
