//! Terminal and JSON rendering of rosters and search results.

use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL_CONDENSED;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};
use serde_json::{Value, json};

use roster_ingest::DataFile;
use roster_model::{ColumnInfo, Field, MatchType, SearchResult};

use crate::pagination::Page;

pub fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120);
}

pub fn columns_table(info: &ColumnInfo) -> Table {
    let mut table = Table::new();
    table.set_header(vec![header_cell("Column"), header_cell("Role")]);
    apply_table_style(&mut table);
    for column in &info.all_columns {
        let role = if info.identifier_column.as_ref() == Some(column) {
            Cell::new("identifier")
                .fg(Color::Blue)
                .add_attribute(Attribute::Bold)
        } else if info.name_column.as_ref() == Some(column) {
            Cell::new("name")
                .fg(Color::Green)
                .add_attribute(Attribute::Bold)
        } else {
            dim_cell("-")
        };
        table.add_row(vec![Cell::new(column), role]);
    }
    table
}

/// One row per result: position, the record's fields, then match metadata.
pub fn results_table(page: &Page<'_, SearchResult>) -> Table {
    let mut table = Table::new();
    let columns: Vec<&str> = page
        .items
        .first()
        .map(|result| result.fields.iter().map(|f| f.column.as_str()).collect())
        .unwrap_or_default();

    let mut header = vec![header_cell("#")];
    header.extend(columns.iter().map(|column| header_cell(column)));
    header.push(header_cell("Match"));
    header.push(header_cell("Similarity"));
    table.set_header(header);
    apply_table_style(&mut table);
    align_column(&mut table, 0, CellAlignment::Right);
    align_column(&mut table, columns.len() + 2, CellAlignment::Right);

    for (offset, result) in page.items.iter().enumerate() {
        let mut row = vec![dim_cell(page.first_position() + offset)];
        row.extend(result.fields.iter().map(|field| Cell::new(&field.value)));
        row.push(match_cell(result.match_type));
        row.push(Cell::new(format!("{:.0}%", result.similarity * 100.0)));
        table.add_row(row);
    }
    table
}

pub fn preview_table(columns: &[String], rows: &[Vec<Field>]) -> Table {
    let mut table = Table::new();
    table.set_header(columns.iter().map(|column| header_cell(column)));
    apply_table_style(&mut table);
    for row in rows {
        table.add_row(row.iter().map(|field| {
            if field.value.is_empty() {
                dim_cell("-")
            } else {
                Cell::new(&field.value)
            }
        }));
    }
    table
}

pub fn files_table(files: &[DataFile]) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("File"),
        header_cell("Size"),
        header_cell("Loadable"),
    ]);
    apply_table_style(&mut table);
    align_column(&mut table, 1, CellAlignment::Right);
    align_column(&mut table, 2, CellAlignment::Center);
    for file in files {
        let loadable = if file.loadable {
            Cell::new("✓").fg(Color::Green).add_attribute(Attribute::Bold)
        } else {
            dim_cell("-")
        };
        table.add_row(vec![
            Cell::new(&file.file_name),
            Cell::new(file.size_formatted()),
            loadable,
        ]);
    }
    table
}

/// `Page 2 of 3 (120 results)`, or a plain count when everything fits.
pub fn page_footer<T>(page: &Page<'_, T>) -> String {
    let noun = if page.total_items == 1 { "result" } else { "results" };
    if page.total_pages <= 1 {
        format!("{} {noun}", page.total_items)
    } else {
        format!(
            "Page {} of {} ({} {noun})",
            page.page, page.total_pages, page.total_items
        )
    }
}

pub fn results_json(page: &Page<'_, SearchResult>) -> serde_json::Result<Value> {
    Ok(json!({
        "total_results": page.total_items,
        "page": page.page,
        "total_pages": page.total_pages,
        "has_prev": page.has_prev(),
        "has_next": page.has_next(),
        "results": serde_json::to_value(page.items)?,
    }))
}

fn match_cell(match_type: MatchType) -> Cell {
    let color = match match_type {
        MatchType::Exact => Color::Green,
        MatchType::Partial => Color::Yellow,
        MatchType::Fuzzy => Color::Cyan,
    };
    Cell::new(match_type.as_str()).fg(color)
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value).fg(Color::DarkGrey)
}
