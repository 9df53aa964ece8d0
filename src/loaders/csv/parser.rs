use crate::core::table_header::TableHeader;
use crate::errors::LoadError;
use crate::utils::file_parsing::{split_delimited_preserving_quotes, unquote};

/// Cell spellings read as a missing value. Matching is case-sensitive.
const MISSING_TOKENS: &[&str] = &[
    "", "NA", "N/A", "n/a", "NaN", "nan", "-NaN", "-nan", "NULL", "null", "None", "#N/A",
];

pub(super) fn is_blank(s: &str) -> bool {
    s.trim().is_empty()
}

/// Parses the header row and locates the target column.
pub(super) fn parse_header_line(
    relation_name: String,
    line: &str,
    separator: &str,
    target: &str,
) -> Result<TableHeader, LoadError> {
    let columns: Vec<String> = split_delimited_preserving_quotes(line.trim_end_matches(['\r', '\n']), separator)
        .iter()
        .map(|raw| unquote(raw.trim()).into_owned())
        .collect();

    let target_index = columns
        .iter()
        .position(|c| c == target)
        .ok_or_else(|| LoadError::MissingTarget(target.to_string()))?;

    Ok(TableHeader::new(relation_name, columns, target_index))
}

/// Parses one data line into a full row (target included). Missing cells become `NaN`.
pub(super) fn parse_row_values(
    header: &TableHeader,
    line: &str,
    line_number: usize,
    separator: &str,
) -> Result<Vec<f64>, LoadError> {
    let tokens = split_delimited_preserving_quotes(line.trim_end_matches(['\r', '\n']), separator);
    if tokens.len() != header.number_of_columns() {
        return Err(LoadError::RaggedRow {
            line: line_number,
            expected: header.number_of_columns(),
            found: tokens.len(),
        });
    }

    let mut values = Vec::with_capacity(tokens.len());
    for (idx, raw) in tokens.iter().enumerate() {
        let unquoted = unquote(raw.trim());
        let cell = unquoted.trim();
        if is_missing(cell) {
            values.push(f64::NAN);
            continue;
        }

        let v: f64 = cell.parse().map_err(|_| LoadError::NonNumeric {
            line: line_number,
            column: header.column_at_index(idx).unwrap_or_default().to_string(),
            value: cell.to_string(),
        })?;
        values.push(v);
    }

    Ok(values)
}

fn is_missing(cell: &str) -> bool {
    MISSING_TOKENS.contains(&cell)
}
