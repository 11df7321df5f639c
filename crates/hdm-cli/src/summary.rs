//! Terminal tables for layouts, models and mapping results.

use comfy_table::modifiers::{UTF8_ROUND_CORNERS, UTF8_SOLID_INNER_BORDERS};
use comfy_table::presets::{UTF8_FULL, UTF8_FULL_CONDENSED};
use comfy_table::{
    Attribute, Cell, CellAlignment, Color, ColumnConstraint, ContentArrangement, Table, Width,
};
use hdm_core::MappingResponse;
use hdm_llm::InvokerConfig;
use hdm_model::{LayoutPreview, LayoutSummary};

pub fn layouts_table(layouts: &[LayoutSummary]) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Layout"),
        header_cell("Name"),
        header_cell("Fields"),
    ]);
    apply_table_style(&mut table);
    align_column(&mut table, 2, CellAlignment::Right);
    for layout in layouts {
        table.add_row(vec![
            id_cell(layout.id.as_str()),
            Cell::new(&layout.name),
            Cell::new(layout.field_count),
        ]);
    }
    table
}

pub fn preview_table(preview: &LayoutPreview) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("#"),
        header_cell("Field"),
        header_cell("Type"),
        header_cell("Description"),
    ]);
    apply_wide_table_style(&mut table);
    align_column(&mut table, 0, CellAlignment::Right);
    for (index, field) in preview.preview.iter().enumerate() {
        table.add_row(vec![
            dim_cell(index + 1),
            id_cell(&field.name),
            Cell::new(&field.data_type),
            Cell::new(&field.description),
        ]);
    }
    table
}

pub fn models_table(config: &InvokerConfig) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Model"),
        header_cell("Model id"),
        header_cell("Endpoint"),
    ]);
    apply_wide_table_style(&mut table);
    for (selector, endpoint) in &config.models {
        let model_id = if endpoint.model_id.is_empty() {
            dim_cell("-")
        } else {
            Cell::new(&endpoint.model_id)
        };
        table.add_row(vec![id_cell(selector), model_id, Cell::new(&endpoint.endpoint)]);
    }
    table
}

pub fn mappings_table(response: &MappingResponse) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Target"),
        header_cell("Source"),
        header_cell("Notes"),
    ]);
    apply_wide_table_style(&mut table);
    for mapping in &response.artifact.field_mappings {
        let notes = if mapping.notes.is_empty() {
            dim_cell("-")
        } else {
            Cell::new(&mapping.notes)
        };
        table.add_row(vec![
            id_cell(&mapping.target),
            Cell::new(&mapping.source_expression),
            notes,
        ]);
    }
    for unknown in &response.artifact.unknown_target_fields {
        table.add_row(vec![
            Cell::new(&unknown.target).fg(Color::Red),
            dim_cell(format!("line {}", unknown.line)),
            Cell::new("not in layout").fg(Color::Red),
        ]);
    }
    table
}

/// Print the request summary and the mapping table.
pub fn print_mapping(response: &MappingResponse) {
    println!(
        "Layout: {} ({} fields)",
        response.layout.name, response.layout.field_count
    );
    println!("Source tables: {}", response.source_tables);
    println!("Model: {}", response.model);
    if response.entries_in_prompt < response.dictionary_entries {
        println!(
            "Dictionary: {} of {} entries sent (truncated to fit the prompt)",
            response.entries_in_prompt, response.dictionary_entries
        );
    } else {
        println!("Dictionary: {} entries", response.dictionary_entries);
    }
    for warning in &response.warnings {
        println!("  skipped {warning}");
    }
    println!("{}", mappings_table(response));
    let artifact = &response.artifact;
    println!(
        "{} mappings, {} SQL statements, {} quality checks in {} ms",
        artifact.field_mappings.len(),
        artifact.sql_statements.len(),
        artifact.quality_checks.len(),
        response.elapsed_ms
    );
}

fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic);
}

fn apply_wide_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .apply_modifier(UTF8_SOLID_INNER_BORDERS)
        .set_content_arrangement(ContentArrangement::DynamicFullWidth)
        .set_width(160);
    if table.column_count() == 3 {
        table.set_constraints(vec![
            ColumnConstraint::UpperBoundary(Width::Percentage(30)),
            ColumnConstraint::UpperBoundary(Width::Percentage(40)),
            ColumnConstraint::UpperBoundary(Width::Percentage(40)),
        ]);
    }
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

fn id_cell(value: &str) -> Cell {
    Cell::new(value)
        .fg(Color::Blue)
        .add_attribute(Attribute::Bold)
}

fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value).fg(Color::DarkGrey)
}

#[cfg(test)]
mod tests {
    use hdm_model::LayoutId;

    use super::*;

    #[test]
    fn layouts_table_lists_every_layout() {
        let layouts = vec![
            LayoutSummary {
                id: LayoutId::Member,
                name: "Member".to_string(),
                field_count: 52,
            },
            LayoutSummary {
                id: LayoutId::BillCustomDetail,
                name: "Bill Custom Detail".to_string(),
                field_count: 124,
            },
        ];
        let table = layouts_table(&layouts);
        assert_eq!(table.row_count(), 2);
        let rendered = table.to_string();
        assert!(rendered.contains("Bill Custom Detail"));
        assert!(rendered.contains("124"));
    }

    #[test]
    fn models_table_shows_endpoints() {
        let table = models_table(&InvokerConfig::default());
        assert_eq!(table.row_count(), 2);
        assert!(table.to_string().contains("llama-3-70b"));
    }
}
