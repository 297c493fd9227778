use crate::models::OcrResult;
use crate::utils::PassportError;

pub struct ConfidenceValidator;

impl ConfidenceValidator {
    /// Reject recognitions whose mean confidence is strictly below `min_confidence`.
    pub fn validate(ocr: &OcrResult, min_confidence: f32) -> Result<(), PassportError> {
        if ocr.confidence < min_confidence {
            return Err(PassportError::LowConfidence(ocr.confidence));
        }
        Ok(())
    }
}
