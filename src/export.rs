use crate::package::SparseEntry;
use crate::property::PropertyDescriptor;
use crate::statics;
use crate::value::PatchValue;

/// Render fully materialized entries as delimited text (CSV with the default delimiter).
///
/// Header is `$tag` followed by the column names. STRING/NAME values are written as raw
/// identifiers; array elements are joined by `array_delimiter` inside a single field.
pub fn to_delimited(
    columns: &[PropertyDescriptor],
    entries: &[SparseEntry],
    delimiter: char,
    array_delimiter: &str,
) -> String {
    let mut out = String::new();

    let header = std::iter::once(statics::KEY_TAG).chain(columns.iter().map(|c| c.name.as_str()));
    write_record(&mut out, header, delimiter);

    for entry in entries {
        let fields: Vec<String> = std::iter::once(entry.tag.clone())
            .chain(columns.iter().map(|c| match entry.get(&c.name) {
                Some(value) => field_text(value, array_delimiter),
                None => String::new(),
            }))
            .collect();
        write_record(&mut out, fields.iter().map(String::as_str), delimiter);
    }

    out
}

fn field_text(value: &PatchValue, array_delimiter: &str) -> String {
    match value {
        PatchValue::Scalar(s) => s.to_string(),
        PatchValue::Array(values) => values
            .iter()
            .map(|v| v.as_ref().map(ToString::to_string).unwrap_or_default())
            .collect::<Vec<_>>()
            .join(array_delimiter),
    }
}

fn write_record<'a>(out: &mut String, fields: impl Iterator<Item = &'a str>, delimiter: char) {
    for (i, field) in fields.enumerate() {
        if i > 0 {
            out.push(delimiter);
        }
        write_field(out, field, delimiter);
    }
    out.push('\n');
}

fn write_field(out: &mut String, field: &str, delimiter: char) {
    let needs_quotes = field
        .chars()
        .any(|c| c == delimiter || c == '"' || c == '\n' || c == '\r');
    if !needs_quotes {
        out.push_str(field);
        return;
    }
    out.push('"');
    for c in field.chars() {
        if c == '"' {
            out.push('"');
        }
        out.push(c);
    }
    out.push('"');
}
