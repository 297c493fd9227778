use crate::config::CheckDigitPolicy;
use crate::models::{MrzField, MrzFieldName, MrzLinePair, MRZ_FILLER, TD3_LINE_LENGTH};
use crate::utils::PassportError;
use log::{debug, warn};

/// Splits an MRZ line pair into fields and verifies its check digits.
pub trait MrzDecoder: Send + Sync {
    fn decode(&self, lines: &MrzLinePair) -> Result<Vec<MrzField>, PassportError>;
}

/// ICAO Doc 9303 TD3 (passport) decoder.
#[derive(Debug, Clone, Copy, Default)]
pub struct Td3Decoder {
    policy: CheckDigitPolicy,
}

// A field guarded by a check digit: value range and check digit position on line 2.
struct CheckedRange {
    field: MrzFieldName,
    check_field: MrzFieldName,
    start: usize,
    end: usize,
}

const CHECKED_RANGES: [CheckedRange; 4] = [
    CheckedRange {
        field: MrzFieldName::DocumentNumber,
        check_field: MrzFieldName::DocumentNumberCheckDigit,
        start: 0,
        end: 9,
    },
    CheckedRange {
        field: MrzFieldName::BirthDate,
        check_field: MrzFieldName::BirthDateCheckDigit,
        start: 13,
        end: 19,
    },
    CheckedRange {
        field: MrzFieldName::ExpirationDate,
        check_field: MrzFieldName::ExpirationDateCheckDigit,
        start: 21,
        end: 27,
    },
    CheckedRange {
        field: MrzFieldName::PersonalNumber,
        check_field: MrzFieldName::PersonalNumberCheckDigit,
        start: 28,
        end: 42,
    },
];

impl Td3Decoder {
    pub fn new(policy: CheckDigitPolicy) -> Self {
        Td3Decoder { policy }
    }

    /// 7-3-1 weighted checksum. `None` if `value` holds a character outside `[0-9A-Z<]`.
    pub fn check_digit(value: &str) -> Option<u32> {
        const WEIGHTS: [u32; 3] = [7, 3, 1];
        let mut sum = 0;
        for (i, c) in value.chars().enumerate() {
            sum += Self::char_value(c)? * WEIGHTS[i % 3];
        }
        Some(sum % 10)
    }

    fn char_value(c: char) -> Option<u32> {
        match c {
            '0'..='9' => c.to_digit(10),
            'A'..='Z' => Some(c as u32 - 'A' as u32 + 10),
            MRZ_FILLER => Some(0),
            _ => None,
        }
    }

    /// Ensures `line` is exactly 44 ASCII MRZ characters (`0-9`, `A-Z`, `<`).
    fn check_structure(line: &str, index: usize) -> Result<(), PassportError> {
        if line.chars().count() != TD3_LINE_LENGTH {
            return Err(PassportError::InvalidMrz(format!(
                "line {} has {} characters, TD3 requires {}",
                index,
                line.chars().count(),
                TD3_LINE_LENGTH
            )));
        }
        if let Some(bad) = line.chars().find(|c| Self::char_value(*c).is_none()) {
            return Err(PassportError::InvalidMrz(format!(
                "line {} contains unexpected character '{}'",
                index, bad
            )));
        }
        Ok(())
    }

    fn strip_filler(value: &str) -> String {
        value.chars().filter(|c| *c != MRZ_FILLER).collect()
    }

    fn split_names(name_area: &str) -> (String, String) {
        let (primary, secondary) = name_area.split_once("<<").unwrap_or((name_area, ""));
        let join = |part: &str| {
            part.split(MRZ_FILLER)
                .filter(|p| !p.is_empty())
                .collect::<Vec<_>>()
                .join(" ")
        };
        (join(primary), join(secondary))
    }

    fn decode_sex(code: &str) -> (String, bool) {
        match code {
            "M" => ("male".to_string(), true),
            "F" => ("female".to_string(), true),
            "<" | "X" => ("nonspecified".to_string(), true),
            other => (other.to_string(), false),
        }
    }

    fn check_matches(value: &str, check: &str) -> bool {
        let expected = match Self::check_digit(value) {
            Some(digit) => digit,
            None => return false,
        };
        match check {
            // An empty optional field may leave its check digit as filler.
            "<" => expected == 0 && value.chars().all(|c| c == MRZ_FILLER),
            digit => digit.parse::<u32>().map(|d| d == expected).unwrap_or(false),
        }
    }
}

impl MrzDecoder for Td3Decoder {
    fn decode(&self, lines: &MrzLinePair) -> Result<Vec<MrzField>, PassportError> {
        let line1 = lines.first();
        let line2 = lines.second();
        Self::check_structure(line1, 1)?;
        Self::check_structure(line2, 2)?;

        if !line1.starts_with('P') {
            return Err(PassportError::InvalidMrz(format!(
                "document code '{}' is not a passport",
                &line1[0..2]
            )));
        }

        let (last_name, first_name) = Self::split_names(&line1[5..]);
        let (sex, sex_valid) = Self::decode_sex(&line2[20..21]);

        let mut fields = vec![
            MrzField::new(MrzFieldName::DocumentCode, Self::strip_filler(&line1[0..2])),
            MrzField::new(MrzFieldName::IssuingState, Self::strip_filler(&line1[2..5])),
            MrzField::new(MrzFieldName::LastName, last_name),
            MrzField::new(MrzFieldName::FirstName, first_name),
            MrzField::new(MrzFieldName::DocumentNumber, Self::strip_filler(&line2[0..9])),
            MrzField::new(MrzFieldName::DocumentNumberCheckDigit, &line2[9..10]),
            MrzField::new(MrzFieldName::Nationality, Self::strip_filler(&line2[10..13])),
            MrzField::new(MrzFieldName::BirthDate, &line2[13..19]),
            MrzField::new(MrzFieldName::BirthDateCheckDigit, &line2[19..20]),
            MrzField::new(MrzFieldName::Sex, sex),
            MrzField::new(MrzFieldName::ExpirationDate, &line2[21..27]),
            MrzField::new(MrzFieldName::ExpirationDateCheckDigit, &line2[27..28]),
            MrzField::new(
                MrzFieldName::PersonalNumber,
                line2[28..42].trim_end_matches(MRZ_FILLER),
            ),
            MrzField::new(MrzFieldName::PersonalNumberCheckDigit, &line2[42..43]),
            MrzField::new(MrzFieldName::CompositeCheckDigit, &line2[43..44]),
        ];

        let mut failed: Vec<MrzFieldName> = Vec::new();
        for range in CHECKED_RANGES.iter() {
            let check_pos = range.end;
            let value = &line2[range.start..range.end];
            if !Self::check_matches(value, &line2[check_pos..check_pos + 1]) {
                failed.push(range.field);
                failed.push(range.check_field);
            }
        }

        let composite = format!("{}{}{}", &line2[0..10], &line2[13..20], &line2[21..43]);
        if !Self::check_matches(&composite, &line2[43..44]) {
            failed.push(MrzFieldName::CompositeCheckDigit);
        }
        if !sex_valid {
            failed.push(MrzFieldName::Sex);
        }

        if !failed.is_empty() {
            let names: Vec<&str> = failed.iter().map(|f| f.as_str()).collect();
            match self.policy {
                CheckDigitPolicy::Strict => {
                    return Err(PassportError::InvalidMrz(format!(
                        "check failed for {}",
                        names.join(", ")
                    )));
                }
                CheckDigitPolicy::Lenient => {
                    warn!("MRZ accepted with failed checks: {}", names.join(", "));
                    for field in fields.iter_mut() {
                        if field.field.map(|f| failed.contains(&f)).unwrap_or(false) {
                            field.valid = false;
                        }
                    }
                }
            }
        }

        debug!("Decoded {} MRZ fields", fields.len());
        Ok(fields)
    }
}
