//! CSV/TSV dictionaries: one record line per row, grouped by table.

use hdm_model::{DictionarySection, ExtractionWarning, SectionLabel};

use crate::headers::HeaderMap;

/// Sections and skipped-row warnings produced from one tabular file.
#[derive(Debug, Default)]
pub struct TabularOutput {
    pub sections: Vec<DictionarySection>,
    pub warnings: Vec<ExtractionWarning>,
}

fn normalize_cell(raw: &[u8]) -> String {
    let text = String::from_utf8_lossy(raw);
    text.trim().trim_matches('\u{feff}').trim().to_string()
}

fn cell(row: &[String], idx: Option<usize>) -> &str {
    idx.and_then(|i| row.get(i)).map_or("", String::as_str)
}

/// Parse delimited bytes into dictionary sections.
///
/// Rows that lack a column name (or a table name when the file has a table
/// column) are skipped with a warning. Fully blank rows are ignored.
pub fn extract_tabular(bytes: &[u8], delimiter: u8) -> Result<TabularOutput, csv::Error> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(false)
        .flexible(true)
        .from_reader(bytes);

    let mut rows = Vec::new();
    for record in reader.byte_records() {
        let record = record?;
        let row: Vec<String> = record.iter().map(normalize_cell).collect();
        rows.push(row);
    }

    let mut rows = rows.into_iter().enumerate();
    let Some((_, headers)) = rows.by_ref().find(|(_, row)| row.iter().any(|c| !c.is_empty()))
    else {
        return Ok(TabularOutput::default());
    };

    let map = HeaderMap::detect(&headers);
    let mut output = TabularOutput::default();
    for (idx, row) in rows {
        if row.iter().all(String::is_empty) {
            continue;
        }
        // 1-based line numbers as a spreadsheet would show them.
        let line_number = idx + 1;
        if map.is_structured() {
            match record_line(&map, &headers, &row) {
                Ok((label, line)) => push_line(&mut output.sections, label, line),
                Err(message) => output.warnings.push(ExtractionWarning {
                    location: format!("row {line_number}"),
                    message: message.to_string(),
                }),
            }
        } else {
            let line = generic_line(&headers, &row);
            push_line(&mut output.sections, SectionLabel::Ungrouped, line);
        }
    }
    Ok(output)
}

fn push_line(sections: &mut Vec<DictionarySection>, label: SectionLabel, line: String) {
    let existing = sections.iter_mut().find(|section| match (&section.label, &label) {
        (SectionLabel::Table(a), SectionLabel::Table(b)) => a.eq_ignore_ascii_case(b),
        (a, b) => a == b,
    });
    match existing {
        Some(section) => section.lines.push(line),
        None => {
            let mut section = DictionarySection::new(label);
            section.lines.push(line);
            sections.push(section);
        }
    }
}

fn record_line(
    map: &HeaderMap,
    headers: &[String],
    row: &[String],
) -> Result<(SectionLabel, String), &'static str> {
    let column = cell(row, map.column);
    if column.is_empty() {
        return Err("missing column name");
    }
    let label = if map.table.is_some() {
        let table = cell(row, map.table);
        if table.is_empty() {
            return Err("missing table name");
        }
        SectionLabel::Table(table.to_string())
    } else {
        SectionLabel::Ungrouped
    };

    let mut line = match label.table_name() {
        Some(table) => format!("{table}.{column}"),
        None => column.to_string(),
    };
    let data_type = cell(row, map.data_type);
    if !data_type.is_empty() {
        line.push_str(": ");
        line.push_str(data_type);
    }
    let description = cell(row, map.description);
    if !description.is_empty() {
        line.push_str(" - ");
        line.push_str(description);
    }

    let extras: Vec<String> = map
        .extras
        .iter()
        .filter_map(|&idx| {
            let value = cell(row, Some(idx));
            if value.is_empty() {
                return None;
            }
            let key = headers.get(idx).map_or("", String::as_str);
            Some(if key.is_empty() {
                value.to_string()
            } else {
                format!("{key}: {value}")
            })
        })
        .collect();
    if !extras.is_empty() {
        line.push_str(" (");
        line.push_str(&extras.join("; "));
        line.push(')');
    }
    Ok((label, line))
}

fn generic_line(headers: &[String], row: &[String]) -> String {
    row.iter()
        .enumerate()
        .filter(|(_, value)| !value.is_empty())
        .map(|(idx, value)| match headers.get(idx).filter(|h| !h.is_empty()) {
            Some(key) => format!("{key}={value}"),
            None => format!("col{}={value}", idx + 1),
        })
        .collect::<Vec<_>>()
        .join("; ")
}
