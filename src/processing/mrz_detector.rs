use crate::models::{MrzLinePair, MRZ_FILLER, TD3_LINE_LENGTH};
use crate::utils::PassportError;
use log::debug;

/// Locates the two TD3 MRZ lines inside noisy OCR output.
///
/// The first MRZ line is recognized by its shape rather than its position:
/// long enough, filler characters present, uppercase letters present and
/// at least two `<` separators. The line right after it is taken as the
/// second MRZ line.
pub struct MrzLineDetector;

impl MrzLineDetector {
    pub fn detect(text: &str) -> Result<MrzLinePair, PassportError> {
        let lines: Vec<&str> = text
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .collect();

        match lines.len() {
            0 => return Err(PassportError::NoTextDetected),
            1 => return Err(PassportError::InsufficientLines),
            _ => {}
        }

        let anchor = lines
            .iter()
            .position(|line| Self::is_anchor_line(line))
            .ok_or(PassportError::IncompleteMrz)?;
        let following = lines.get(anchor + 1).ok_or(PassportError::IncompleteMrz)?;

        debug!("MRZ anchor found at line {} of {}", anchor + 1, lines.len());

        let first = Self::clean_line(lines[anchor]);
        let second = Self::clean_line(following);
        MrzLinePair::new(first, second)
    }

    /// Whether a line looks like the first line of a TD3 MRZ.
    pub fn is_anchor_line(line: &str) -> bool {
        let cleaned = Self::strip_whitespace(line);
        cleaned.chars().count() >= TD3_LINE_LENGTH
            && cleaned.contains(MRZ_FILLER)
            && cleaned.chars().any(|c| c.is_ascii_uppercase())
            && cleaned.split(MRZ_FILLER).count() >= 3
    }

    /// Whitespace removed, cut to the TD3 line length.
    fn clean_line(line: &str) -> String {
        Self::strip_whitespace(line)
            .chars()
            .take(TD3_LINE_LENGTH)
            .collect()
    }

    fn strip_whitespace(line: &str) -> String {
        line.chars().filter(|c| !c.is_whitespace()).collect()
    }
}
