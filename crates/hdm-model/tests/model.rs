//! Tests for hdm-model types.

use hdm_model::{
    DictionaryDocument, FieldMapping, FieldSpec, FieldType, Layout, LayoutId, MappingArtifact,
    UnknownTargetField,
};

#[test]
fn layout_summary_reports_field_count() {
    let layout = Layout::new(
        LayoutId::ServiceProvider,
        vec![
            FieldSpec {
                name: "PROVIDER_NPI".to_string(),
                data_type: FieldType::Code,
                description: "National Provider Identifier".to_string(),
            },
            FieldSpec {
                name: "PROVIDER_NAME".to_string(),
                data_type: FieldType::String,
                description: "Provider legal name".to_string(),
            },
        ],
    )
    .expect("build layout");
    let summary = layout.summary();
    assert_eq!(summary.id, LayoutId::ServiceProvider);
    assert_eq!(summary.name, "Service Provider");
    assert_eq!(summary.field_count, 2);
}

#[test]
fn artifact_round_trips_through_json() {
    let artifact = MappingArtifact {
        field_mappings: vec![FieldMapping {
            target: "BILLED_AMOUNT".to_string(),
            source_expression: "CAST(claims_detail.bill_amount AS DECIMAL(12,2))".to_string(),
            notes: "currency in USD".to_string(),
        }],
        sql_statements: vec![],
        quality_checks: vec![],
        implementation_notes: String::new(),
        unknown_target_fields: vec![UnknownTargetField {
            line: 4,
            target: "BILL_TOTAL".to_string(),
        }],
    };
    let json = serde_json::to_string(&artifact).expect("serialize artifact");
    assert!(json.contains("\"unknown_target_fields\""));
    let round: MappingArtifact = serde_json::from_str(&json).expect("deserialize artifact");
    assert_eq!(round, artifact);
}

#[test]
fn document_reads_from_disk() {
    let dir = std::env::temp_dir().join(format!("hdm_model_doc_{}", std::process::id()));
    std::fs::create_dir_all(&dir).expect("create temp dir");
    let path = dir.join("claims.tsv");
    std::fs::write(&path, "table\tcolumn\nclaims\tclaim_id\n").expect("write file");

    let doc = DictionaryDocument::from_path(&path).expect("read document");
    assert_eq!(doc.file_name(), "claims.tsv");
    assert_eq!(doc.format().map(|f| f.delimiter()), Some(Some(b'\t')));

    let _ = std::fs::remove_dir_all(&dir);
}
