use hdm_map::{ComposeError, PromptComposer, Section};
use hdm_model::{
    DictionarySection, ExtractedDictionaryText, FieldSpec, FieldType, FormatKind, Layout,
    LayoutId, MappingRequest, ModelSelector, SectionLabel, SourceTables,
};
use proptest::prelude::*;

fn layout() -> Layout {
    let fields = (1..=20)
        .map(|i| FieldSpec {
            name: format!("FIELD_{i:02}"),
            data_type: FieldType::String,
            description: format!("Description of field {i}"),
        })
        .collect();
    Layout::new(LayoutId::ServiceProvider, fields).expect("layout")
}

fn dictionary(tables: &[(String, Vec<String>)]) -> ExtractedDictionaryText {
    let sections = tables
        .iter()
        .map(|(table, columns)| {
            let mut section = DictionarySection::new(SectionLabel::Table(table.clone()));
            section.lines = columns
                .iter()
                .map(|column| format!("{table}.{column}: varchar - {column} value"))
                .collect();
            section
        })
        .collect();
    ExtractedDictionaryText::new(FormatKind::Tabular, sections, Vec::new())
}

fn page_dictionary() -> ExtractedDictionaryText {
    let mut cover = DictionarySection::new(SectionLabel::Page(1));
    cover.lines = vec!["Enterprise Data Dictionary".to_string(); 30];
    let mut claims = DictionarySection::new(SectionLabel::Page(2));
    claims.lines = vec!["CLAIMS_DETAIL.CLAIM_ID char(20) claim key".to_string()];
    ExtractedDictionaryText::new(FormatKind::Document, vec![cover, claims], Vec::new())
}

#[test]
fn pages_mentioning_requested_tables_survive_truncation() {
    let layout = layout();
    let dictionary = page_dictionary();
    let tables = SourceTables::parse("claims_detail");
    let model = ModelSelector::new("claude-sonnet-4");
    let request = MappingRequest::new(&layout, &dictionary, &tables, &model);

    let full = PromptComposer::default().compose(&request).expect("compose");
    let composed = PromptComposer::new(full.char_len() - 200)
        .compose_detailed(&request)
        .expect("compose");
    let text = composed.prompt.as_str();

    assert!(text.contains("### page 2\nCLAIMS_DETAIL.CLAIM_ID char(20) claim key\n"));
    let page2 = text.find("### page 2").expect("page 2");
    let page1 = text.find("### page 1").expect("page 1 partially kept");
    assert!(page2 < page1);
    assert!(composed.report.truncated());
}

#[test]
fn markers_appear_in_grammar_order() {
    let layout = layout();
    let dictionary = dictionary(&[("claims".to_string(), vec!["claim_id".to_string()])]);
    let tables = SourceTables::parse("claims");
    let model = ModelSelector::new("llama-3-70b");
    let request = MappingRequest::new(&layout, &dictionary, &tables, &model);
    let prompt = PromptComposer::default().compose(&request).expect("compose");

    let positions: Vec<usize> = Section::ALL
        .iter()
        .map(|s| prompt.as_str().find(&s.marker()).expect("marker present"))
        .collect();
    assert!(positions.windows(2).all(|w| w[0] < w[1]));
}

#[test]
fn budget_below_fixed_text_fails() {
    let layout = layout();
    let dictionary = dictionary(&[("claims".to_string(), vec!["claim_id".to_string()])]);
    let tables = SourceTables::parse("claims");
    let model = ModelSelector::new("llama-3-70b");
    let request = MappingRequest::new(&layout, &dictionary, &tables, &model);

    match PromptComposer::new(50).compose(&request).unwrap_err() {
        ComposeError::BudgetTooSmall {
            max_chars,
            required,
        } => {
            assert_eq!(max_chars, 50);
            assert!(required > 50);
        }
        other => panic!("unexpected error: {other}"),
    }
}

fn tables_strategy() -> impl Strategy<Value = Vec<(String, Vec<String>)>> {
    prop::collection::vec(
        (
            "[a-z]{3,8}",
            prop::collection::vec("[a-z_]{2,12}", 1..30),
        ),
        1..6,
    )
}

proptest! {
    #[test]
    fn compose_is_deterministic_and_bounded(
        tables in tables_strategy(),
        budget in 2_000usize..8_000,
    ) {
        let layout = layout();
        let dictionary = dictionary(&tables);
        let names = SourceTables::from_names(tables.iter().map(|(name, _)| name.as_str()));
        let model = ModelSelector::new("claude-sonnet-4");
        let request = MappingRequest::new(&layout, &dictionary, &names, &model);
        let composer = PromptComposer::new(budget);

        let first = composer.compose(&request);
        let second = composer.compose(&request);
        match (first, second) {
            (Ok(a), Ok(b)) => {
                prop_assert_eq!(a.as_str(), b.as_str());
                prop_assert!(a.char_len() <= budget);
            }
            (Err(a), Err(b)) => {
                prop_assert_eq!(&a, &b);
                let is_budget = matches!(a, ComposeError::BudgetTooSmall { .. });
                prop_assert!(is_budget);
            }
            (a, b) => prop_assert!(false, "diverged: {:?} vs {:?}", a, b),
        }
    }
}
