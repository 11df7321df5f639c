use std::fmt;

use serde::{Deserialize, Serialize};

/// One target field and the source expression that fills it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldMapping {
    pub target: String,
    pub source_expression: String,
    pub notes: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataQualityCheck {
    pub description: String,
    pub rule: String,
}

/// A field-mapping row whose target is not part of the layout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnknownTargetField {
    /// 1-based line number within the raw model text.
    pub line: usize,
    pub target: String,
}

impl fmt::Display for UnknownTargetField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}: {}", self.line, self.target)
    }
}

/// Structured result of one mapping request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MappingArtifact {
    pub field_mappings: Vec<FieldMapping>,
    pub sql_statements: Vec<String>,
    pub quality_checks: Vec<DataQualityCheck>,
    pub implementation_notes: String,
    /// Rows rejected because their target is not in the layout.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub unknown_target_fields: Vec<UnknownTargetField>,
}

impl MappingArtifact {
    pub fn targets(&self) -> impl Iterator<Item = &str> {
        self.field_mappings.iter().map(|m| m.target.as_str())
    }

    pub fn mapping_for(&self, target: &str) -> Option<&FieldMapping> {
        self.field_mappings
            .iter()
            .find(|m| m.target.eq_ignore_ascii_case(target))
    }

    /// Mappings whose source expression mentions `needle` (case-insensitive).
    pub fn mappings_referencing<'a>(
        &'a self,
        needle: &'a str,
    ) -> impl Iterator<Item = &'a FieldMapping> + 'a {
        let needle = needle.to_ascii_lowercase();
        self.field_mappings
            .iter()
            .filter(move |m| m.source_expression.to_ascii_lowercase().contains(&needle))
    }

    pub fn has_unknown_targets(&self) -> bool {
        !self.unknown_target_fields.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_with_documented_keys() {
        let artifact = MappingArtifact {
            field_mappings: vec![FieldMapping {
                target: "CLAIM_ID".to_string(),
                source_expression: "TRIM(claims_detail.claim_id)".to_string(),
                notes: String::new(),
            }],
            sql_statements: vec!["SELECT 1;".to_string()],
            quality_checks: vec![],
            implementation_notes: "none".to_string(),
            unknown_target_fields: vec![],
        };
        let value = serde_json::to_value(&artifact).expect("serialize artifact");
        let keys: Vec<&str> = value
            .as_object()
            .unwrap()
            .keys()
            .map(String::as_str)
            .collect();
        assert_eq!(
            keys,
            vec![
                "field_mappings",
                "implementation_notes",
                "quality_checks",
                "sql_statements"
            ]
        );
        assert_eq!(value["field_mappings"][0]["source_expression"], "TRIM(claims_detail.claim_id)");
        assert_eq!(artifact.mappings_referencing("CLAIMS_DETAIL.claim_id").count(), 1);
    }
}
