//! Parsing of raw model text into a [`MappingArtifact`].

use std::collections::BTreeMap;

use hdm_model::{
    DataQualityCheck, FieldMapping, Layout, MappingArtifact, RawModelText, UnknownTargetField,
};
use tracing::{debug, info_span};

use crate::error::{Malformed, ParseError};
use crate::markers::{LineKind, Section, classify_line};

/// Column separator inside field-mapping and quality-check rows.
const SEPARATOR: &str = " | ";

/// One body line with its 1-based line number in the raw text.
type BodyLine<'a> = (usize, &'a str);

/// Validates raw model text against the marker grammar and a layout.
///
/// Parsing is pure: the same text and layout always give the same artifact or
/// the same error.
#[derive(Debug, Clone, Copy, Default)]
pub struct MappingResponseParser;

impl MappingResponseParser {
    pub fn new() -> Self {
        Self
    }

    pub fn parse(&self, raw: &RawModelText, layout: &Layout) -> Result<MappingArtifact, ParseError> {
        let span = info_span!("parse", layout = %layout.id(), chars = raw.char_len());
        let _guard = span.enter();

        let [mappings, sql, checks, notes] = split_sections(raw.as_str())?;

        let (field_mappings, unknown_target_fields) = parse_field_mappings(&mappings, layout)?;
        let quality_checks = parse_quality_checks(&checks)?;
        let sql_statements = split_sql_statements(&join_body(&sql));
        let implementation_notes = join_body(&notes).trim().to_string();

        debug!(
            mappings = field_mappings.len(),
            unknown_targets = unknown_target_fields.len(),
            sql_statements = sql_statements.len(),
            quality_checks = quality_checks.len(),
            "response parsed"
        );
        Ok(MappingArtifact {
            field_mappings,
            sql_statements,
            quality_checks,
            implementation_notes,
            unknown_target_fields,
        })
    }
}

/// Split raw text into the four section bodies, enforcing marker order.
fn split_sections(text: &str) -> Result<[Vec<BodyLine<'_>>; 4], Malformed> {
    if text.trim().is_empty() {
        return Err(Malformed::Empty);
    }

    let mut bodies: [Vec<BodyLine<'_>>; 4] = Default::default();
    let mut current: Option<Section> = None;
    for (idx, line) in text.lines().enumerate() {
        let line_number = idx + 1;
        match classify_line(line) {
            LineKind::Fence => {}
            LineKind::Foreign(marker) => {
                return Err(Malformed::UnknownMarker {
                    line: line_number,
                    marker: marker.to_string(),
                });
            }
            LineKind::Marker(section) => {
                let expected = current.map_or(0, |s| s.index() + 1);
                if section.index() < expected {
                    return Err(Malformed::DuplicateSection {
                        section,
                        line: line_number,
                    });
                }
                if section.index() > expected {
                    return Err(Malformed::OutOfOrder {
                        found: section,
                        expected: Section::ALL[expected],
                        line: line_number,
                    });
                }
                current = Some(section);
            }
            LineKind::Content => match current {
                Some(section) => bodies[section.index()].push((line_number, line)),
                None if line.trim().is_empty() => {}
                None => {
                    return Err(Malformed::TextBeforeFirstSection { line: line_number });
                }
            },
        }
    }

    let seen = current.map_or(0, |s| s.index() + 1);
    if let Some(missing) = Section::ALL.get(seen) {
        return Err(Malformed::MissingSection(*missing));
    }
    Ok(bodies)
}

fn join_body(lines: &[BodyLine<'_>]) -> String {
    lines
        .iter()
        .map(|(_, line)| *line)
        .collect::<Vec<_>>()
        .join("\n")
}

/// Strip markdown table pipes; `None` for blank and `|---|` separator rows.
///
/// Inner whitespace is kept so an empty last column (`| X | y | |`) still
/// ends in a separator.
fn table_row(line: &str) -> Option<&str> {
    let trimmed = line.trim();
    let inner = trimmed.strip_prefix('|').unwrap_or(trimmed);
    let inner = inner.strip_suffix('|').unwrap_or(inner);
    let content = inner.trim();
    if content.is_empty() {
        return None;
    }
    let is_rule = content.contains('-')
        && content
            .chars()
            .all(|c| matches!(c, '-' | ':' | '|' | ' ' | '\t'));
    (!is_rule).then_some(inner)
}

fn clean_target(raw: &str) -> &str {
    raw.trim().trim_matches(|c| c == '`' || c == '*').trim()
}

fn parse_field_mappings(
    lines: &[BodyLine<'_>],
    layout: &Layout,
) -> Result<(Vec<FieldMapping>, Vec<UnknownTargetField>), ParseError> {
    let mut mappings = Vec::new();
    let mut unknown = Vec::new();
    let mut counts: BTreeMap<String, usize> = BTreeMap::new();
    let mut duplicated = Vec::new();

    for &(line, raw) in lines {
        let Some(row) = table_row(strip_bullet(raw)) else {
            continue;
        };
        let Some((target, rest)) = row.split_once(SEPARATOR) else {
            return Err(Malformed::MissingSeparator {
                section: Section::FieldMappings,
                line,
            }
            .into());
        };
        let target = clean_target(target);
        if target.is_empty() {
            return Err(Malformed::EmptyColumn {
                section: Section::FieldMappings,
                line,
            }
            .into());
        }
        let (source, notes) = match rest.rsplit_once(SEPARATOR) {
            Some((source, notes)) => (source.trim(), notes.trim()),
            None => (rest.trim(), ""),
        };

        let Some(field) = layout.field(target) else {
            unknown.push(UnknownTargetField {
                line,
                target: target.to_string(),
            });
            continue;
        };
        let count = counts.entry(field.name.clone()).or_default();
        *count += 1;
        if *count == 2 {
            duplicated.push(field.name.clone());
        }
        mappings.push(FieldMapping {
            target: field.name.clone(),
            source_expression: source.to_string(),
            notes: notes.to_string(),
        });
    }

    if !duplicated.is_empty() {
        return Err(ParseError::DuplicateTargetFields {
            targets: duplicated,
        });
    }
    if mappings.is_empty() {
        return Err(if unknown.is_empty() {
            ParseError::NoFieldMappings
        } else {
            ParseError::UnknownTargetFields { fields: unknown }
        });
    }
    Ok((mappings, unknown))
}

fn strip_bullet(line: &str) -> &str {
    let trimmed = line.trim_start();
    for bullet in ["- ", "* ", "• "] {
        if let Some(rest) = trimmed.strip_prefix(bullet) {
            return rest;
        }
    }
    let digits = trimmed.chars().take_while(char::is_ascii_digit).count();
    if digits > 0 {
        let rest = &trimmed[digits..];
        if let Some(rest) = rest.strip_prefix(". ").or_else(|| rest.strip_prefix(") ")) {
            return rest;
        }
    }
    trimmed
}

fn parse_quality_checks(lines: &[BodyLine<'_>]) -> Result<Vec<DataQualityCheck>, Malformed> {
    let mut checks = Vec::new();
    for &(line, raw) in lines {
        let Some(row) = table_row(strip_bullet(raw)) else {
            continue;
        };
        let Some((description, rule)) = row.split_once(SEPARATOR) else {
            return Err(Malformed::MissingSeparator {
                section: Section::QualityChecks,
                line,
            });
        };
        let description = description.trim();
        if description.is_empty() {
            return Err(Malformed::EmptyColumn {
                section: Section::QualityChecks,
                line,
            });
        }
        checks.push(DataQualityCheck {
            description: description.to_string(),
            rule: rule.trim().to_string(),
        });
    }
    Ok(checks)
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum SqlComment {
    Line,
    Block,
}

/// Split SQL text at top-level semicolons.
///
/// Semicolons inside quotes, `--` comments or `/* */` comments do not split.
/// Each statement is trimmed and keeps its terminating `;`; trailing text
/// without one is kept as a final statement.
pub fn split_sql_statements(sql: &str) -> Vec<String> {
    let mut statements = Vec::new();
    let mut current = String::new();
    let mut quote: Option<char> = None;
    let mut comment: Option<SqlComment> = None;
    let mut chars = sql.chars().peekable();

    while let Some(c) = chars.next() {
        current.push(c);
        match comment {
            Some(SqlComment::Line) => {
                if c == '\n' {
                    comment = None;
                }
                continue;
            }
            Some(SqlComment::Block) => {
                if c == '*' && chars.peek() == Some(&'/') {
                    current.extend(chars.next());
                    comment = None;
                }
                continue;
            }
            None => {}
        }
        match quote {
            Some(q) if c == q => quote = None,
            Some(_) => {}
            None => match c {
                '\'' | '"' | '`' => quote = Some(c),
                '-' if chars.peek() == Some(&'-') => comment = Some(SqlComment::Line),
                '/' if chars.peek() == Some(&'*') => {
                    current.extend(chars.next());
                    comment = Some(SqlComment::Block);
                }
                ';' => {
                    let statement = current.trim();
                    if statement != ";" {
                        statements.push(statement.to_string());
                    }
                    current.clear();
                }
                _ => {}
            },
        }
    }

    let rest = current.trim();
    if !rest.is_empty() {
        statements.push(rest.to_string());
    }
    statements
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sql_splits_at_top_level_semicolons() {
        let sql = "SELECT 'a;b' AS x FROM t;\n\
                   -- note; not a split\n\
                   INSERT INTO y VALUES (1);\n;\n  SELECT 1";
        assert_eq!(
            split_sql_statements(sql),
            vec![
                "SELECT 'a;b' AS x FROM t;",
                "-- note; not a split\nINSERT INTO y VALUES (1);",
                "SELECT 1",
            ]
        );
    }

    #[test]
    fn block_comments_do_not_split() {
        let sql = "/* load; then check */ SELECT 1;\n\
                   SELECT /* a; b */ 2 /*/ still; open */;";
        assert_eq!(
            split_sql_statements(sql),
            vec![
                "/* load; then check */ SELECT 1;",
                "SELECT /* a; b */ 2 /*/ still; open */;",
            ]
        );
    }

    #[test]
    fn bullets_are_stripped() {
        assert_eq!(strip_bullet("- a | b"), "a | b");
        assert_eq!(strip_bullet("12. a | b"), "a | b");
        assert_eq!(strip_bullet("3) a | b"), "a | b");
        assert_eq!(strip_bullet("2024 totals | b"), "2024 totals | b");
    }

    #[test]
    fn markdown_rows_are_unwrapped() {
        assert_eq!(table_row("| A | B | C |"), Some(" A | B | C "));
        assert_eq!(table_row("| A | B | |"), Some(" A | B | "));
        assert_eq!(table_row("|---|:---:|---|"), None);
        assert_eq!(table_row("   "), None);
        assert_eq!(table_row("A | B"), Some("A | B"));
    }

    #[test]
    fn missing_marker_is_reported_by_name() {
        let text = "[[HDM-V1:FIELD_MAPPINGS]]\nA | b\n[[HDM-V1:SQL_STATEMENTS]]\n";
        assert_eq!(
            split_sections(text).unwrap_err(),
            Malformed::MissingSection(Section::QualityChecks)
        );
    }
}
