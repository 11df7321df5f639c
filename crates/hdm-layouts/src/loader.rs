#![deny(unsafe_code)]

use std::path::Path;

use hdm_model::{FieldSpec, FieldType, ModelError};

use crate::error::LayoutError;

const FIELD_NAME: &str = "Field Name";
const DATA_TYPE: &str = "Data Type";
const DESCRIPTION: &str = "Description";

fn header_index(headers: &csv::StringRecord, name: &str) -> Option<usize> {
    headers
        .iter()
        .position(|h| h.trim_matches('\u{feff}').trim().eq_ignore_ascii_case(name))
}

fn get_string(row: &csv::StringRecord, idx: Option<usize>) -> Option<String> {
    idx.and_then(|i| row.get(i))
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Parse one layout reference file (`Field Name,Data Type,Description`).
///
/// Field order is preserved. A row without a field name or with an
/// unrecognised type tag fails the whole file: layouts are reference data.
pub fn parse_layout_csv(path: &Path) -> Result<Vec<FieldSpec>, LayoutError> {
    let bytes = std::fs::read(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            LayoutError::MissingFile {
                path: path.to_path_buf(),
            }
        } else {
            LayoutError::io(path, e)
        }
    })?;
    parse_layout_bytes(&bytes, path)
}

pub(crate) fn parse_layout_bytes(bytes: &[u8], path: &Path) -> Result<Vec<FieldSpec>, LayoutError> {
    let csv_error = |message: String| LayoutError::Csv {
        path: path.to_path_buf(),
        message,
    };

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(bytes);
    let headers = reader
        .headers()
        .map_err(|e| csv_error(e.to_string()))?
        .clone();

    let idx_name = header_index(&headers, FIELD_NAME)
        .ok_or_else(|| csv_error(format!("missing '{FIELD_NAME}' column")))?;
    let idx_type = header_index(&headers, DATA_TYPE)
        .ok_or_else(|| csv_error(format!("missing '{DATA_TYPE}' column")))?;
    let idx_description = header_index(&headers, DESCRIPTION);

    let mut fields = Vec::new();
    for (row_number, row) in reader.records().enumerate() {
        let row = row.map_err(|e| csv_error(e.to_string()))?;
        let name = get_string(&row, Some(idx_name))
            .ok_or_else(|| csv_error(format!("row {}: missing {FIELD_NAME}", row_number + 1)))?;
        let raw_type = get_string(&row, Some(idx_type)).unwrap_or_default();
        let data_type =
            FieldType::parse(&raw_type).ok_or_else(|| ModelError::UnknownFieldType {
                field: name.clone(),
                value: raw_type.clone(),
            })?;
        fields.push(FieldSpec {
            name,
            data_type,
            description: get_string(&row, idx_description).unwrap_or_default(),
        });
    }
    Ok(fields)
}
