use crate::utils::PassportError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Characters per line in the TD3 (passport) MRZ.
pub const TD3_LINE_LENGTH: usize = 44;

/// Padding and separator character used throughout the MRZ.
pub const MRZ_FILLER: char = '<';

/// Decoded RGBA bitmap as captured, before any preprocessing.
#[derive(Debug, Clone, PartialEq)]
pub struct RawImage {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

impl RawImage {
    pub fn new(width: u32, height: u32, pixels: Vec<u8>) -> Result<Self, PassportError> {
        let expected = width as usize * height as usize * 4;
        if pixels.len() != expected {
            return Err(PassportError::DecodeError(format!(
                "RGBA buffer holds {} bytes, expected {} for {}x{}",
                pixels.len(),
                expected,
                width,
                height
            )));
        }
        Ok(RawImage { width, height, pixels })
    }
}

/// Grayscale-equivalent RGBA bitmap (R = G = B) ready for OCR.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedImage {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

/// Text and mean confidence (0-100) reported by the OCR engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OcrResult {
    pub text: String,
    pub confidence: f32,
}

impl OcrResult {
    pub fn new(text: impl Into<String>, confidence: f32) -> Self {
        OcrResult {
            text: text.into(),
            confidence,
        }
    }

    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.text.lines()
    }
}

/// The two candidate MRZ lines of a TD3 document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MrzLinePair {
    first: String,
    second: String,
}

impl MrzLinePair {
    pub fn new(first: impl Into<String>, second: impl Into<String>) -> Result<Self, PassportError> {
        let first = first.into();
        let second = second.into();
        for (index, line) in [&first, &second].into_iter().enumerate() {
            if line.is_empty() {
                return Err(PassportError::InvalidMrz(format!("line {} is empty", index + 1)));
            }
            if line.chars().count() > TD3_LINE_LENGTH {
                return Err(PassportError::InvalidMrz(format!(
                    "line {} is longer than {} characters",
                    index + 1,
                    TD3_LINE_LENGTH
                )));
            }
            if !line.contains(MRZ_FILLER) {
                return Err(PassportError::InvalidMrz(format!(
                    "line {} has no filler character",
                    index + 1
                )));
            }
        }
        Ok(MrzLinePair { first, second })
    }

    pub fn first(&self) -> &str {
        &self.first
    }

    pub fn second(&self) -> &str {
        &self.second
    }

    pub fn into_lines(self) -> [String; 2] {
        [self.first, self.second]
    }
}

/// Field identifiers produced by the TD3 decoder, plus the synthesized full name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MrzFieldName {
    DocumentCode,
    IssuingState,
    LastName,
    FirstName,
    DocumentNumber,
    DocumentNumberCheckDigit,
    Nationality,
    BirthDate,
    BirthDateCheckDigit,
    Sex,
    ExpirationDate,
    ExpirationDateCheckDigit,
    PersonalNumber,
    PersonalNumberCheckDigit,
    CompositeCheckDigit,
    FullName,
}

impl MrzFieldName {
    pub fn as_str(&self) -> &'static str {
        match self {
            MrzFieldName::DocumentCode => "documentCode",
            MrzFieldName::IssuingState => "issuingState",
            MrzFieldName::LastName => "lastName",
            MrzFieldName::FirstName => "firstName",
            MrzFieldName::DocumentNumber => "documentNumber",
            MrzFieldName::DocumentNumberCheckDigit => "documentNumberCheckDigit",
            MrzFieldName::Nationality => "nationality",
            MrzFieldName::BirthDate => "birthDate",
            MrzFieldName::BirthDateCheckDigit => "birthDateCheckDigit",
            MrzFieldName::Sex => "sex",
            MrzFieldName::ExpirationDate => "expirationDate",
            MrzFieldName::ExpirationDateCheckDigit => "expirationDateCheckDigit",
            MrzFieldName::PersonalNumber => "personalNumber",
            MrzFieldName::PersonalNumberCheckDigit => "personalNumberCheckDigit",
            MrzFieldName::CompositeCheckDigit => "compositeCheckDigit",
            MrzFieldName::FullName => "fullName",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            MrzFieldName::DocumentCode => "Document code",
            MrzFieldName::IssuingState => "Issuing state",
            MrzFieldName::LastName => "Last name",
            MrzFieldName::FirstName => "First name",
            MrzFieldName::DocumentNumber => "Document number",
            MrzFieldName::DocumentNumberCheckDigit => "Document number check digit",
            MrzFieldName::Nationality => "Nationality",
            MrzFieldName::BirthDate => "Birth date",
            MrzFieldName::BirthDateCheckDigit => "Birth date check digit",
            MrzFieldName::Sex => "Sex",
            MrzFieldName::ExpirationDate => "Expiration date",
            MrzFieldName::ExpirationDateCheckDigit => "Expiration date check digit",
            MrzFieldName::PersonalNumber => "Personal number",
            MrzFieldName::PersonalNumberCheckDigit => "Personal number check digit",
            MrzFieldName::CompositeCheckDigit => "Composite check digit",
            MrzFieldName::FullName => "Full Name",
        }
    }

    /// Display rank; `None` sorts after every ranked field.
    pub fn priority(&self) -> Option<u8> {
        match self {
            MrzFieldName::FullName => Some(0),
            MrzFieldName::DocumentNumber => Some(2),
            MrzFieldName::BirthDate => Some(3),
            MrzFieldName::Sex => Some(4),
            MrzFieldName::Nationality => Some(5),
            MrzFieldName::ExpirationDate => Some(6),
            _ => None,
        }
    }
}

impl fmt::Display for MrzFieldName {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One field as emitted by the MRZ decoder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MrzField {
    pub field: Option<MrzFieldName>,
    pub value: Option<String>,
    pub label: Option<String>,
    /// False when the field's check digit did not match.
    pub valid: bool,
}

impl MrzField {
    pub fn new(field: MrzFieldName, value: impl Into<String>) -> Self {
        MrzField {
            field: Some(field),
            value: Some(value.into()),
            label: Some(field.label().to_string()),
            valid: true,
        }
    }

    /// Value trimmed, or `None` when missing or blank.
    pub fn trimmed_value(&self) -> Option<&str> {
        self.value
            .as_deref()
            .map(str::trim)
            .filter(|value| !value.is_empty())
    }
}

/// A decoded field that survived filtering; `value` is trimmed and non-empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidField {
    pub field: MrzFieldName,
    pub value: String,
    pub label: String,
}

/// Icon shown next to a field by the presentation layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FieldIcon {
    User,
    FileText,
    Globe,
    Hash,
    ShieldCheck,
    Calendar,
    Clock,
    Venus,
    Mars,
    Fingerprint,
    BadgeCheck,
}

impl FieldIcon {
    /// Pick the icon from the field and its raw (unformatted) value.
    pub fn for_field(field: MrzFieldName, raw_value: &str) -> Self {
        match field {
            MrzFieldName::FullName => FieldIcon::User,
            MrzFieldName::DocumentCode => FieldIcon::FileText,
            MrzFieldName::IssuingState | MrzFieldName::Nationality => FieldIcon::Globe,
            MrzFieldName::DocumentNumber => FieldIcon::Hash,
            MrzFieldName::DocumentNumberCheckDigit
            | MrzFieldName::BirthDateCheckDigit
            | MrzFieldName::ExpirationDateCheckDigit
            | MrzFieldName::PersonalNumberCheckDigit => FieldIcon::ShieldCheck,
            MrzFieldName::BirthDate => FieldIcon::Calendar,
            MrzFieldName::ExpirationDate => FieldIcon::Clock,
            MrzFieldName::PersonalNumber => FieldIcon::Fingerprint,
            MrzFieldName::CompositeCheckDigit => FieldIcon::BadgeCheck,
            MrzFieldName::Sex => {
                if raw_value.is_empty() || raw_value.eq_ignore_ascii_case("female") {
                    FieldIcon::Venus
                } else {
                    FieldIcon::Mars
                }
            }
            MrzFieldName::FirstName | MrzFieldName::LastName => FieldIcon::Hash,
        }
    }
}

/// A field ready for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayField {
    pub label: String,
    pub field: MrzFieldName,
    pub value: String,
    pub raw_value: String,
    pub icon: FieldIcon,
}

/// Final output of a successful recognition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PassportRecord {
    pub fields: Vec<DisplayField>,
    pub mrz_lines: [String; 2],
    pub text: String,
}

impl PassportRecord {
    pub fn get(&self, field: MrzFieldName) -> Option<&DisplayField> {
        self.fields.iter().find(|f| f.field == field)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_image_rejects_short_buffer() {
        let err = RawImage::new(2, 2, vec![0; 15]).unwrap_err();
        assert!(matches!(err, PassportError::DecodeError(_)));
        assert!(RawImage::new(2, 2, vec![0; 16]).is_ok());
    }

    #[test]
    fn test_line_pair_invariants() {
        assert!(MrzLinePair::new("P<UTO", "L898<").is_ok());
        assert!(MrzLinePair::new("", "L898<").is_err());
        assert!(MrzLinePair::new("P<UTO", "L898902C3").is_err());
        assert!(MrzLinePair::new("<".repeat(45), "L898<").is_err());
    }

    #[test]
    fn test_trimmed_value() {
        let mut field = MrzField::new(MrzFieldName::LastName, "  ERIKSSON ");
        assert_eq!(field.trimmed_value(), Some("ERIKSSON"));
        field.value = Some("   ".to_string());
        assert_eq!(field.trimmed_value(), None);
        field.value = None;
        assert_eq!(field.trimmed_value(), None);
    }

    #[test]
    fn test_sex_icon_follows_raw_value() {
        assert_eq!(FieldIcon::for_field(MrzFieldName::Sex, "female"), FieldIcon::Venus);
        assert_eq!(FieldIcon::for_field(MrzFieldName::Sex, ""), FieldIcon::Venus);
        assert_eq!(FieldIcon::for_field(MrzFieldName::Sex, "male"), FieldIcon::Mars);
        assert_eq!(
            FieldIcon::for_field(MrzFieldName::CompositeCheckDigit, "4"),
            FieldIcon::BadgeCheck
        );
    }

    #[test]
    fn test_field_name_serializes_camel_case() {
        let json = serde_json::to_string(&MrzFieldName::ExpirationDateCheckDigit).unwrap();
        assert_eq!(json, "\"expirationDateCheckDigit\"");
    }
}
