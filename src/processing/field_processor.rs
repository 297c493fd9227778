use crate::models::{DisplayField, FieldIcon, MrzField, MrzFieldName, ValidField};
use crate::processing::formatters::format_field_value;

/// Turns decoder output into the ordered field list shown to the user.
pub struct FieldPostProcessor;

impl FieldPostProcessor {
    /// Drop empty fields, merge the name parts into `fullName` and order by priority.
    pub fn process(details: &[MrzField]) -> Vec<ValidField> {
        let valid: Vec<ValidField> = details
            .iter()
            .filter_map(|detail| {
                let field = detail.field?;
                let value = detail.trimmed_value()?;
                Some(ValidField {
                    field,
                    value: value.to_string(),
                    label: detail
                        .label
                        .clone()
                        .unwrap_or_else(|| field.label().to_string()),
                })
            })
            .collect();

        let first_name = Self::value_of(&valid, MrzFieldName::FirstName);
        let last_name = Self::value_of(&valid, MrzFieldName::LastName);
        let full_name = [first_name, last_name]
            .into_iter()
            .flatten()
            .collect::<Vec<_>>()
            .join(" ")
            .trim()
            .to_string();

        let mut processed: Vec<ValidField> = Vec::with_capacity(valid.len());
        if !full_name.is_empty() {
            processed.push(ValidField {
                field: MrzFieldName::FullName,
                value: full_name,
                label: MrzFieldName::FullName.label().to_string(),
            });
        }
        processed.extend(valid.iter().cloned().filter(|d| {
            d.field != MrzFieldName::FirstName && d.field != MrzFieldName::LastName
        }));

        // Vec::sort_by_key is stable, so unranked fields keep their decoder order.
        processed.sort_by_key(|d| d.field.priority().map(u32::from).unwrap_or(u32::MAX));
        processed
    }

    /// Attach display values and icons.
    pub fn display_fields(fields: &[ValidField], current_year: i32) -> Vec<DisplayField> {
        fields
            .iter()
            .map(|d| DisplayField {
                label: d.label.clone(),
                field: d.field,
                value: format_field_value(d.field, &d.value, current_year),
                raw_value: d.value.clone(),
                icon: FieldIcon::for_field(d.field, &d.value),
            })
            .collect()
    }

    fn value_of(fields: &[ValidField], name: MrzFieldName) -> Option<&str> {
        fields
            .iter()
            .find(|d| d.field == name)
            .map(|d| d.value.as_str())
    }
}
