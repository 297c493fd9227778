use thiserror::Error;

/// Terminal outcome of a failed recognition attempt.
///
/// The `Display` text of each variant is the message shown to the user.
#[derive(Debug, Error)]
pub enum PassportError {
    #[error("Failed to load image: {0}")]
    DecodeError(String),
    #[error("Image is too large: {size} bytes exceeds the {limit} byte limit")]
    ImageTooLarge { size: usize, limit: usize },
    #[error("No text found. Try a clearer image.")]
    NoTextDetected,
    #[error("MRZ not detected. Ensure the passport is clearly visible.")]
    InsufficientLines,
    #[error("Incomplete or missing MRZ. Ensure both MRZ lines are visible.")]
    IncompleteMrz,
    #[error("Invalid MRZ: {0}. Ensure the passport is clearly visible.")]
    InvalidMrz(String),
    #[error("Image too blurry (OCR confidence {0:.0}).")]
    LowConfidence(f32),
    #[error("Invalid passport. Make sure the passport is clearly visible.")]
    NotAPassport,
    #[error("Missing required fields: {}", .0.join(", "))]
    MissingRequiredFields(Vec<String>),
    #[error("Configuration error: {0}")]
    ConfigError(String),
    #[error("Unexpected error occurred: {0}")]
    Unexpected(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_fields_message_lists_labels() {
        let err = PassportError::MissingRequiredFields(vec![
            "First name".to_string(),
            "nationality".to_string(),
        ]);
        assert_eq!(err.to_string(), "Missing required fields: First name, nationality");
    }

    #[test]
    fn test_low_confidence_message() {
        assert_eq!(
            PassportError::LowConfidence(12.4).to_string(),
            "Image too blurry (OCR confidence 12)."
        );
    }
}
