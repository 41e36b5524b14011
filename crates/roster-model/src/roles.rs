//! Column roles detected for a table.

use serde::{Deserialize, Serialize};

use crate::error::{ModelError, Result};
use crate::table::Table;

/// Which column serves as the identifier and which as the free-text name.
///
/// Either role may be absent. An absent role disables the matching search
/// mode; it is a capability, not an error.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnRoles {
    pub identifier_column: Option<String>,
    pub name_column: Option<String>,
}

impl ColumnRoles {
    pub fn new(identifier_column: Option<String>, name_column: Option<String>) -> Self {
        Self {
            identifier_column,
            name_column,
        }
    }

    /// Checks that every assigned role names a column of `table`.
    pub fn validate(&self, table: &Table) -> Result<()> {
        for column in [&self.identifier_column, &self.name_column]
            .into_iter()
            .flatten()
        {
            if table.column_position(column).is_none() {
                return Err(ModelError::UnknownColumn(column.clone()));
            }
        }
        Ok(())
    }
}

/// Column summary handed to presentation layers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnInfo {
    pub identifier_column: Option<String>,
    pub name_column: Option<String>,
    pub total_columns: usize,
    pub all_columns: Vec<String>,
}

impl ColumnInfo {
    pub fn new(table: &Table, roles: &ColumnRoles) -> Self {
        Self {
            identifier_column: roles.identifier_column.clone(),
            name_column: roles.name_column.clone(),
            total_columns: table.columns.len(),
            all_columns: table.columns.clone(),
        }
    }
}
