//! Versioned section markers of the mapping response.
//!
//! A marker is a whole line `[[HDM-V1:<SECTION>]]`. The four sections must
//! appear exactly once each, in [`Section::ALL`] order.

use std::fmt;

/// Version of the marker grammar written into prompts and expected back.
pub const GRAMMAR_VERSION: u32 = 1;

const MARKER_PREFIX: &str = "[[HDM-";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Section {
    FieldMappings,
    SqlStatements,
    QualityChecks,
    ImplementationNotes,
}

impl Section {
    pub const ALL: [Section; 4] = [
        Section::FieldMappings,
        Section::SqlStatements,
        Section::QualityChecks,
        Section::ImplementationNotes,
    ];

    pub const fn tag(&self) -> &'static str {
        match self {
            Section::FieldMappings => "FIELD_MAPPINGS",
            Section::SqlStatements => "SQL_STATEMENTS",
            Section::QualityChecks => "QUALITY_CHECKS",
            Section::ImplementationNotes => "IMPLEMENTATION_NOTES",
        }
    }

    pub const fn index(&self) -> usize {
        match self {
            Section::FieldMappings => 0,
            Section::SqlStatements => 1,
            Section::QualityChecks => 2,
            Section::ImplementationNotes => 3,
        }
    }

    /// The full marker line, e.g. `[[HDM-V1:FIELD_MAPPINGS]]`.
    pub fn marker(&self) -> String {
        format!("{MARKER_PREFIX}V{GRAMMAR_VERSION}:{}]]", self.tag())
    }

    fn from_tag(tag: &str) -> Option<Self> {
        Section::ALL.into_iter().find(|s| s.tag() == tag)
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// How one response line relates to the marker grammar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineKind<'a> {
    /// A valid marker of the current grammar version.
    Marker(Section),
    /// A whole `[[HDM-...]]` line naming another version or an unknown section.
    Foreign(&'a str),
    /// A fenced code delimiter (```` ``` ````, ```` ```sql ````).
    Fence,
    Content,
}

pub fn classify_line(line: &str) -> LineKind<'_> {
    let trimmed = line.trim();
    if trimmed.starts_with("```") {
        return LineKind::Fence;
    }
    let Some(inner) = trimmed
        .strip_prefix(MARKER_PREFIX)
        .and_then(|rest| rest.strip_suffix("]]"))
    else {
        return LineKind::Content;
    };
    let section = inner
        .split_once(':')
        .filter(|(version, _)| *version == format!("V{GRAMMAR_VERSION}"))
        .and_then(|(_, tag)| Section::from_tag(tag));
    match section {
        Some(section) => LineKind::Marker(section),
        None => LineKind::Foreign(trimmed),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn markers_round_trip_through_classification() {
        for section in Section::ALL {
            assert_eq!(classify_line(&section.marker()), LineKind::Marker(section));
        }
        assert_eq!(Section::FieldMappings.marker(), "[[HDM-V1:FIELD_MAPPINGS]]");
    }

    #[test]
    fn rejects_other_versions_and_sections() {
        assert!(matches!(
            classify_line("[[HDM-V2:FIELD_MAPPINGS]]"),
            LineKind::Foreign(_)
        ));
        assert!(matches!(
            classify_line("[[HDM-V1:SUMMARY]]"),
            LineKind::Foreign(_)
        ));
        assert!(matches!(classify_line("[[HDM-V1]]"), LineKind::Foreign(_)));
    }

    #[test]
    fn markers_inside_prose_are_content() {
        assert_eq!(
            classify_line("Sections were delimited with [[HDM-V1:...]] markers."),
            LineKind::Content
        );
        assert_eq!(
            classify_line("## [[HDM-V1:SQL_STATEMENTS]]"),
            LineKind::Content
        );
    }

    #[test]
    fn ordinary_lines_are_content() {
        assert_eq!(classify_line("CLAIM_ID | c.claim_id | "), LineKind::Content);
        assert_eq!(classify_line("[[not a marker]]"), LineKind::Content);
        assert_eq!(classify_line("```sql"), LineKind::Fence);
        assert_eq!(
            classify_line("  [[HDM-V1:QUALITY_CHECKS]]  "),
            LineKind::Marker(Section::QualityChecks)
        );
    }
}
