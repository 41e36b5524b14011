#![deny(unsafe_code)]

use crate::error::{ModelError, Result};

/// Textual null marker some tabular sources emit for missing cells.
pub const NULL_MARKER: &str = "nan";

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "kind", content = "value")]
pub enum CellValue {
    Text(String),
    Missing,
}

impl CellValue {
    /// Builds a cell from raw text, mapping the empty string to `Missing`.
    pub fn from_raw(raw: &str) -> Self {
        if raw.is_empty() {
            Self::Missing
        } else {
            Self::Text(raw.to_string())
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(value) => Some(value),
            Self::Missing => None,
        }
    }

    /// Display form: the text, or an empty string for missing cells.
    pub fn as_display(&self) -> &str {
        self.as_text().unwrap_or("")
    }
}

/// One row of a table. Cells are positional and line up with `Table::columns`.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Record {
    pub cells: Vec<CellValue>,
}

impl Record {
    pub fn new(cells: Vec<CellValue>) -> Self {
        Self { cells }
    }

    pub fn get(&self, position: usize) -> Option<&CellValue> {
        self.cells.get(position)
    }
}

/// A single `column = value` pair of a record, in column order.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Field {
    pub column: String,
    pub value: String,
}

/// Ordered records plus ordered column names. A row's identity is its
/// position, which stays stable for the lifetime of the table.
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
pub struct Table {
    pub columns: Vec<String>,
    pub rows: Vec<Record>,
}

impl Table {
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    /// Builds a table from plain string rows; empty strings become `Missing`.
    pub fn from_text_rows<C, R, V>(columns: C, rows: R) -> Self
    where
        C: IntoIterator,
        C::Item: Into<String>,
        R: IntoIterator<Item = V>,
        V: IntoIterator,
        V::Item: AsRef<str>,
    {
        let mut table = Self::new(columns.into_iter().map(Into::into).collect());
        for row in rows {
            let cells = row
                .into_iter()
                .map(|value| CellValue::from_raw(value.as_ref()))
                .collect();
            table.push_row(Record::new(cells));
        }
        table
    }

    pub fn push_row(&mut self, row: Record) {
        self.rows.push(row);
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_position(&self, column: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == column)
    }

    pub fn require_column(&self, column: &str) -> Result<usize> {
        self.column_position(column)
            .ok_or_else(|| ModelError::UnknownColumn(column.to_string()))
    }

    pub fn row(&self, row: usize) -> Result<&Record> {
        self.rows.get(row).ok_or(ModelError::RowOutOfRange {
            row,
            len: self.rows.len(),
        })
    }

    /// Cell at `(row, column position)`. `None` when the row is shorter than
    /// the header or the row does not exist.
    pub fn cell(&self, row: usize, position: usize) -> Option<&CellValue> {
        self.rows.get(row).and_then(|record| record.get(position))
    }

    /// Full field mapping of a row in column order. Cells missing from a
    /// short row are reported as empty values.
    pub fn fields(&self, row: usize) -> Result<Vec<Field>> {
        let record = self.row(row)?;
        Ok(self
            .columns
            .iter()
            .enumerate()
            .map(|(idx, column)| Field {
                column: column.clone(),
                value: record
                    .get(idx)
                    .map(CellValue::as_display)
                    .unwrap_or_default()
                    .to_string(),
            })
            .collect())
    }
}
