// Display formatting for decoded MRZ values. Raw values are never modified.
use crate::models::{country_name, MrzFieldName};
use chrono::{Datelike, Local, NaiveDate};
use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref MRZ_DATE: Regex = Regex::new(r"^\d{6}$").unwrap();
}

/// Years past the current one that a two-digit year may still resolve to.
const FUTURE_YEAR_WINDOW: i32 = 10;

pub fn current_year() -> i32 {
    Local::now().year()
}

/// Resolve a two-digit year against `current_year`, never landing more than
/// ten years in the future.
pub fn resolve_year(two_digit: i32, current_year: i32) -> i32 {
    let century = current_year.div_euclid(100) * 100;
    let full_year = two_digit + century;
    if full_year > current_year + FUTURE_YEAR_WINDOW {
        full_year - 100
    } else {
        full_year
    }
}

/// `YYMMDD` to `DD Mon YYYY` (e.g. `18 Oct 2021`). Anything else is returned unchanged.
pub fn format_date(value: &str, current_year: i32) -> String {
    if !MRZ_DATE.is_match(value) {
        return value.to_string();
    }

    let parse = |range: std::ops::Range<usize>| value[range].parse::<u32>().ok();
    let (Some(yy), Some(month), Some(day)) = (parse(0..2), parse(2..4), parse(4..6)) else {
        return value.to_string();
    };

    let year = resolve_year(yy as i32, current_year);
    match NaiveDate::from_ymd_opt(year, month, day) {
        Some(date) => date.format("%d %b %Y").to_string(),
        None => value.to_string(),
    }
}

pub fn format_country(code: &str) -> String {
    country_name(code)
        .map(str::to_string)
        .unwrap_or_else(|| code.to_string())
}

pub fn format_sex(value: &str) -> String {
    match value.to_lowercase().as_str() {
        "m" | "male" => "Male".to_string(),
        "f" | "female" => "Female".to_string(),
        _ => value.to_string(),
    }
}

/// Format a value for display according to its field.
pub fn format_field_value(field: MrzFieldName, value: &str, current_year: i32) -> String {
    match field {
        MrzFieldName::BirthDate | MrzFieldName::ExpirationDate => format_date(value, current_year),
        MrzFieldName::Nationality | MrzFieldName::IssuingState => format_country(value),
        MrzFieldName::Sex => format_sex(value),
        _ => value.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_date() {
        assert_eq!(format_date("211018", 2026), "18 Oct 2021");
        assert_eq!(format_date("690806", 2026), "06 Aug 1969");
        assert_eq!(format_date("360101", 2026), "01 Jan 2036");
        assert_eq!(format_date("370101", 2026), "01 Jan 1937");
    }

    #[test]
    fn test_non_conforming_dates_pass_through() {
        assert_eq!(format_date("21101", 2026), "21101");
        assert_eq!(format_date("21A018", 2026), "21A018");
        assert_eq!(format_date("2110189", 2026), "2110189");
        assert_eq!(format_date("991345", 2026), "991345");
        assert_eq!(format_date("", 2026), "");
    }

    #[test]
    fn test_resolved_year_never_beyond_window() {
        for current in [1999, 2000, 2026, 2089, 2090, 2095, 2100] {
            for yy in 0..100 {
                let year = resolve_year(yy, current);
                assert!(year <= current + 10, "{} resolved to {} in {}", yy, year, current);
                assert_eq!(year.rem_euclid(100), yy);
            }
        }
    }

    #[test]
    fn test_format_date_is_deterministic() {
        for value in ["000101", "491231", "990228", "240229"] {
            assert_eq!(format_date(value, 2026), format_date(value, 2026));
        }
    }

    #[test]
    fn test_format_country() {
        assert_eq!(format_country("GBR"), "United Kingdom");
        assert_eq!(format_country("UTO"), "UTO");
    }

    #[test]
    fn test_format_sex() {
        assert_eq!(format_sex("M"), "Male");
        assert_eq!(format_sex("female"), "Female");
        assert_eq!(format_sex("FEMALE"), "Female");
        assert_eq!(format_sex("nonspecified"), "nonspecified");
    }

    #[test]
    fn test_other_fields_untouched() {
        assert_eq!(
            format_field_value(MrzFieldName::DocumentNumber, "L898902C3", 2026),
            "L898902C3"
        );
        assert_eq!(
            format_field_value(MrzFieldName::IssuingState, "DEU", 2026),
            "Germany"
        );
    }
}
