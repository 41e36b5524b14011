//! Column role detection.
//!
//! Each role is resolved by an ordered list of rules. A rule is a pure
//! function over the table; the first rule that yields a column wins.

use tracing::{debug, info, info_span};

use roster_model::{CellValue, ColumnRoles, Table};

use crate::normalize::contains_arabic;

/// Header tokens that mark a name column.
pub const NAME_HEADER_TOKENS: &[&str] = &["اسم", "أسم", "إسم", "name"];

/// Header tokens that mark an identifier column (seat number, id, ...).
pub const ID_HEADER_TOKENS: &[&str] = &["رقم", "جلوس", "id", "number"];

/// Number of non-empty values inspected by the content rules.
pub const SAMPLE_SIZE: usize = 10;

/// A name column needs strictly more Arabic samples than this.
pub const ARABIC_SAMPLE_MIN: usize = 5;

/// An identifier column needs strictly more numeric samples than this.
pub const NUMERIC_SAMPLE_MIN: usize = 7;

/// A detection rule. `exclude` is a column the rule must not return.
pub type DetectorRule = fn(&Table, Option<&str>) -> Option<String>;

/// Rules for the name column, in priority order.
pub const NAME_RULES: &[(&str, DetectorRule)] = &[
    ("name-header", name_header_rule),
    ("arabic-content", arabic_content_rule),
];

/// Rules for the identifier column, in priority order.
pub const ID_RULES: &[(&str, DetectorRule)] = &[
    ("id-header", id_header_rule),
    ("numeric-content", numeric_content_rule),
];

/// Detects the identifier and name columns of `table`.
///
/// The name column is resolved first; the identifier rules never return the
/// chosen name column. Either role may come back empty.
pub fn detect_roles(table: &Table) -> ColumnRoles {
    let span = info_span!("detect_roles", columns = table.columns.len());
    let _guard = span.enter();

    let name_column = run_rules(NAME_RULES, table, None);
    let identifier_column = run_rules(ID_RULES, table, name_column.as_deref());

    info!(
        identifier = identifier_column.as_deref().unwrap_or("-"),
        name = name_column.as_deref().unwrap_or("-"),
        "detected column roles"
    );
    ColumnRoles::new(identifier_column, name_column)
}

fn run_rules(
    rules: &[(&str, DetectorRule)],
    table: &Table,
    exclude: Option<&str>,
) -> Option<String> {
    rules.iter().find_map(|(label, rule)| {
        let column = rule(table, exclude)?;
        debug!(rule = label, column = %column, "rule matched");
        Some(column)
    })
}

fn candidate_columns<'a>(
    table: &'a Table,
    exclude: Option<&'a str>,
) -> impl Iterator<Item = (usize, &'a String)> + 'a {
    table
        .columns
        .iter()
        .enumerate()
        .filter(move |(_, column)| Some(column.as_str()) != exclude)
}

fn header_matches(header: &str, tokens: &[&str]) -> bool {
    let folded = header.trim().to_lowercase();
    tokens.iter().any(|token| folded.contains(token))
}

/// Up to [`SAMPLE_SIZE`] non-empty values from the top of a column.
fn sample_values(table: &Table, position: usize) -> impl Iterator<Item = &str> {
    table
        .rows
        .iter()
        .filter_map(move |row| row.get(position).and_then(CellValue::as_text))
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .take(SAMPLE_SIZE)
}

pub fn name_header_rule(table: &Table, exclude: Option<&str>) -> Option<String> {
    candidate_columns(table, exclude)
        .find(|(_, column)| header_matches(column, NAME_HEADER_TOKENS))
        .map(|(_, column)| column.clone())
}

pub fn id_header_rule(table: &Table, exclude: Option<&str>) -> Option<String> {
    candidate_columns(table, exclude)
        .find(|(_, column)| header_matches(column, ID_HEADER_TOKENS))
        .map(|(_, column)| column.clone())
}

pub fn arabic_content_rule(table: &Table, exclude: Option<&str>) -> Option<String> {
    candidate_columns(table, exclude)
        .find(|&(position, _)| {
            sample_values(table, position)
                .filter(|value| contains_arabic(value))
                .count()
                > ARABIC_SAMPLE_MIN
        })
        .map(|(_, column)| column.clone())
}

pub fn numeric_content_rule(table: &Table, exclude: Option<&str>) -> Option<String> {
    candidate_columns(table, exclude)
        .find(|&(position, _)| {
            sample_values(table, position)
                .filter(|value| is_numeric_literal(value))
                .count()
                > NUMERIC_SAMPLE_MIN
        })
        .map(|(_, column)| column.clone())
}

/// Whether `value` parses as a number once Arabic-Indic digits are read as
/// their ASCII counterparts.
fn is_numeric_literal(value: &str) -> bool {
    let ascii: String = value.chars().map(ascii_digit).collect();
    ascii.parse::<f64>().is_ok()
}

fn ascii_digit(ch: char) -> char {
    let zero = match ch {
        '\u{0660}'..='\u{0669}' => 0x0660,
        '\u{06F0}'..='\u{06F9}' => 0x06F0,
        _ => return ch,
    };
    char::from(b'0' + (u32::from(ch) - zero) as u8)
}
