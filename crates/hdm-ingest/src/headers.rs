//! Recognition of dictionary column headers.

/// What a dictionary column holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaderRole {
    Table,
    Column,
    Type,
    Description,
}

const TABLE_ALIASES: &[&str] = &[
    "table",
    "table_name",
    "tablename",
    "source_table",
    "entity",
    "entity_name",
    "dataset",
    "dataset_name",
    "file",
    "file_name",
];

const COLUMN_ALIASES: &[&str] = &[
    "column",
    "column_name",
    "columnname",
    "col",
    "field",
    "field_name",
    "fieldname",
    "variable",
    "variable_name",
    "attribute",
    "element",
    "data_element",
];

const TYPE_ALIASES: &[&str] = &[
    "type",
    "data_type",
    "datatype",
    "field_type",
    "column_type",
    "sql_type",
    "format",
];

const DESCRIPTION_ALIASES: &[&str] = &[
    "description",
    "desc",
    "definition",
    "comment",
    "comments",
    "label",
    "meaning",
    "business_definition",
];

/// Lowercase, strip a BOM, and fold spaces, hyphens and dots to `_`.
pub fn normalize_header(raw: &str) -> String {
    let trimmed = raw.trim_matches('\u{feff}').trim();
    let mut out = String::with_capacity(trimmed.len());
    let mut last_underscore = false;
    for ch in trimmed.chars() {
        let ch = if ch.is_whitespace() || ch == '-' || ch == '.' {
            '_'
        } else {
            ch.to_ascii_lowercase()
        };
        if ch == '_' {
            if last_underscore {
                continue;
            }
            last_underscore = true;
        } else {
            last_underscore = false;
        }
        out.push(ch);
    }
    out.trim_matches('_').to_string()
}

pub fn role_for(header: &str) -> Option<HeaderRole> {
    let normalized = normalize_header(header);
    let key = normalized.as_str();
    if TABLE_ALIASES.contains(&key) {
        Some(HeaderRole::Table)
    } else if COLUMN_ALIASES.contains(&key) {
        Some(HeaderRole::Column)
    } else if TYPE_ALIASES.contains(&key) {
        Some(HeaderRole::Type)
    } else if DESCRIPTION_ALIASES.contains(&key) {
        Some(HeaderRole::Description)
    } else {
        None
    }
}

/// Column positions for each recognised role; the first matching header wins.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeaderMap {
    pub table: Option<usize>,
    pub column: Option<usize>,
    pub data_type: Option<usize>,
    pub description: Option<usize>,
    /// Remaining columns, rendered as extra attributes.
    pub extras: Vec<usize>,
}

impl HeaderMap {
    pub fn detect(headers: &[String]) -> Self {
        let mut map = HeaderMap::default();
        for (idx, header) in headers.iter().enumerate() {
            let slot = match role_for(header) {
                Some(HeaderRole::Table) => &mut map.table,
                Some(HeaderRole::Column) => &mut map.column,
                Some(HeaderRole::Type) => &mut map.data_type,
                Some(HeaderRole::Description) => &mut map.description,
                None => {
                    map.extras.push(idx);
                    continue;
                }
            };
            if slot.is_none() {
                *slot = Some(idx);
            } else {
                map.extras.push(idx);
            }
        }
        map
    }

    /// Whether rows can be rendered as `table.column` records.
    pub fn is_structured(&self) -> bool {
        self.column.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_spacing_and_case() {
        assert_eq!(normalize_header("\u{feff} Column Name "), "column_name");
        assert_eq!(normalize_header("Data-Type"), "data_type");
        assert_eq!(normalize_header("Table  Name"), "table_name");
    }

    #[test]
    fn detects_roles_first_match_wins() {
        let headers: Vec<String> = [
            "Table Name",
            "Field",
            "Data Type",
            "Definition",
            "Column",
            "Nullable",
        ]
        .iter()
        .map(ToString::to_string)
        .collect();
        let map = HeaderMap::detect(&headers);
        assert_eq!(map.table, Some(0));
        assert_eq!(map.column, Some(1));
        assert_eq!(map.data_type, Some(2));
        assert_eq!(map.description, Some(3));
        assert_eq!(map.extras, vec![4, 5]);
        assert!(map.is_structured());
    }

    #[test]
    fn unrecognised_headers_are_unstructured() {
        let headers = vec!["Name".to_string(), "Kind".to_string()];
        assert!(!HeaderMap::detect(&headers).is_structured());
    }
}
