use crate::utils::PassportError;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default OCR languages, joined with `+` when handed to the engine.
pub const DEFAULT_LANGUAGES: [&str; 6] = ["eng", "fra", "spa", "ara", "chi_sim", "urd"];

/// Latin letters, digits, MRZ filler and the punctuation found on data pages.
pub const DEFAULT_CHAR_WHITELIST: &str =
    "ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789<>/-., ";

pub const DEFAULT_MAX_IMAGE_BYTES: usize = 10 * 1024 * 1024;

/// How the decoder treats a failed check digit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum CheckDigitPolicy {
    /// Any failed check digit rejects the line pair.
    #[default]
    Strict,
    /// Keep decoded fields and flag the failed ones as invalid.
    Lenient,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Recognitions with a lower mean confidence are rejected.
    pub min_confidence: f32,
    pub contrast: f64,
    pub languages: Vec<String>,
    pub char_whitelist: String,
    pub max_image_bytes: usize,
    pub check_digits: CheckDigitPolicy,
    pub tessdata_dir: Option<String>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        PipelineConfig {
            min_confidence: 30.0,
            contrast: 1.5,
            languages: DEFAULT_LANGUAGES.iter().map(|l| l.to_string()).collect(),
            char_whitelist: DEFAULT_CHAR_WHITELIST.to_string(),
            max_image_bytes: DEFAULT_MAX_IMAGE_BYTES,
            check_digits: CheckDigitPolicy::Strict,
            tessdata_dir: None,
        }
    }
}

impl PipelineConfig {
    /// Load a JSON config file. Missing keys fall back to defaults.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, PassportError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| {
            PassportError::ConfigError(format!("Failed to read {}: {}", path.display(), e))
        })?;
        Self::from_json(&raw)
    }

    pub fn from_json(raw: &str) -> Result<Self, PassportError> {
        let config: PipelineConfig = serde_json::from_str(raw)
            .map_err(|e| PassportError::ConfigError(format!("Invalid config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), PassportError> {
        if !(0.0..=100.0).contains(&self.min_confidence) {
            return Err(PassportError::ConfigError(format!(
                "min_confidence must be within 0-100, got {}",
                self.min_confidence
            )));
        }
        // 259 / 255 makes the contrast factor's denominator zero.
        if !self.contrast.is_finite() || (self.contrast * 255.0 - 259.0).abs() < f64::EPSILON {
            return Err(PassportError::ConfigError(format!(
                "contrast {} is not usable",
                self.contrast
            )));
        }
        if self.languages.is_empty() {
            return Err(PassportError::ConfigError(
                "at least one OCR language is required".to_string(),
            ));
        }
        if self.max_image_bytes == 0 {
            return Err(PassportError::ConfigError(
                "max_image_bytes must be positive".to_string(),
            ));
        }
        Ok(())
    }

    /// Tesseract language string, e.g. `eng+fra`.
    pub fn language_spec(&self) -> String {
        self.languages.join("+")
    }
}
