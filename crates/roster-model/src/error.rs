use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ModelError {
    #[error("column not found in table: {0}")]
    UnknownColumn(String),
    #[error("row {row} out of range (table has {len} rows)")]
    RowOutOfRange { row: usize, len: usize },
}

pub type Result<T> = std::result::Result<T, ModelError>;
