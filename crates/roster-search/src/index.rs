//! Identifier and name indices.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};

use tracing::{debug, info, info_span, warn};

use roster_model::{CellValue, ColumnRoles, NULL_MARKER, Table};

use crate::error::{Result, SearchError};
use crate::normalize::normalize;

/// Progress is logged every this many rows.
const PROGRESS_INTERVAL: usize = 10_000;

/// Map from key to the row positions sharing it.
///
/// Keys iterate in first-insertion order; row positions inside a bucket keep
/// insertion order as well.
#[derive(Debug, Clone, Default)]
pub struct KeyIndex {
    slots: HashMap<String, usize>,
    buckets: Vec<(String, Vec<usize>)>,
}

/// Trimmed raw identifier -> rows.
pub type IdentifierIndex = KeyIndex;

/// Normalized name -> rows.
pub type NameIndex = KeyIndex;

impl KeyIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: String, row: usize) {
        match self.slots.get(&key) {
            Some(&slot) => self.buckets[slot].1.push(row),
            None => {
                self.slots.insert(key.clone(), self.buckets.len());
                self.buckets.push((key, vec![row]));
            }
        }
    }

    pub fn get(&self, key: &str) -> Option<&[usize]> {
        self.slots
            .get(key)
            .map(|&slot| self.buckets[slot].1.as_slice())
    }

    /// Buckets in key insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[usize])> {
        self.buckets
            .iter()
            .map(|(key, rows)| (key.as_str(), rows.as_slice()))
    }

    /// Number of distinct keys.
    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    /// Number of indexed row positions across all buckets.
    pub fn row_count(&self) -> usize {
        self.buckets.iter().map(|(_, rows)| rows.len()).sum()
    }
}

/// Counters collected while building.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize)]
pub struct BuildStats {
    pub rows_scanned: usize,
    pub identifier_keys: usize,
    pub name_keys: usize,
    /// Row/column pairs with no readable cell.
    pub skipped_cells: usize,
    /// Values left out on purpose: empty, null marker, or empty after normalization.
    pub excluded_values: usize,
}

/// Output of one build: one index per detected role.
#[derive(Debug, Clone, Default)]
pub struct BuiltIndices {
    pub identifier: Option<IdentifierIndex>,
    pub name: Option<NameIndex>,
    pub stats: BuildStats,
}

/// Builds both indices in a single pass over the table.
pub struct IndexBuilder<'a> {
    table: &'a Table,
    identifier_position: Option<usize>,
    name_position: Option<usize>,
}

impl<'a> IndexBuilder<'a> {
    /// Resolves role columns against the table. Fails if a role names a
    /// column the table does not have.
    pub fn new(table: &'a Table, roles: &ColumnRoles) -> Result<Self> {
        roles.validate(table)?;
        Ok(Self {
            table,
            identifier_position: roles
                .identifier_column
                .as_deref()
                .and_then(|c| table.column_position(c)),
            name_position: roles
                .name_column
                .as_deref()
                .and_then(|c| table.column_position(c)),
        })
    }

    pub fn build(&self) -> BuiltIndices {
        let span = info_span!("build_indices", rows = self.table.len());
        let _guard = span.enter();
        let mut built = self.empty();
        for row in 0..self.table.len() {
            self.index_row(row, &mut built);
        }
        Self::finish(built)
    }

    /// Builds the indices, checking `cancel` between rows. A cancelled build
    /// returns [`SearchError::BuildCancelled`] and discards partial work.
    pub fn build_cancellable(&self, cancel: &AtomicBool) -> Result<BuiltIndices> {
        let span = info_span!("build_indices", rows = self.table.len());
        let _guard = span.enter();
        let mut built = self.empty();
        for row in 0..self.table.len() {
            if cancel.load(Ordering::Relaxed) {
                warn!(rows_processed = row, "index build cancelled");
                return Err(SearchError::BuildCancelled {
                    rows_processed: row,
                });
            }
            self.index_row(row, &mut built);
        }
        Ok(Self::finish(built))
    }

    fn empty(&self) -> BuiltIndices {
        BuiltIndices {
            identifier: self.identifier_position.map(|_| IdentifierIndex::new()),
            name: self.name_position.map(|_| NameIndex::new()),
            stats: BuildStats::default(),
        }
    }

    fn index_row(&self, row: usize, built: &mut BuiltIndices) {
        if row > 0 && row % PROGRESS_INTERVAL == 0 {
            debug!(rows = row, "indexing progress");
        }
        let stats = &mut built.stats;
        stats.rows_scanned += 1;

        if let (Some(index), Some(position)) = (built.identifier.as_mut(), self.identifier_position)
        {
            match self.table.cell(row, position) {
                Some(cell) => match identifier_key(cell) {
                    Some(key) => index.insert(key, row),
                    None => stats.excluded_values += 1,
                },
                None => {
                    warn!(row, column = position, "row has no identifier cell; skipped");
                    stats.skipped_cells += 1;
                }
            }
        }

        if let (Some(index), Some(position)) = (built.name.as_mut(), self.name_position) {
            match self.table.cell(row, position) {
                Some(cell) => {
                    let key = normalize(cell.as_display());
                    if key.is_empty() {
                        stats.excluded_values += 1;
                    } else {
                        index.insert(key, row);
                    }
                }
                None => {
                    warn!(row, column = position, "row has no name cell; skipped");
                    stats.skipped_cells += 1;
                }
            }
        }
    }

    fn finish(mut built: BuiltIndices) -> BuiltIndices {
        built.stats.identifier_keys = built.identifier.as_ref().map_or(0, KeyIndex::len);
        built.stats.name_keys = built.name.as_ref().map_or(0, KeyIndex::len);
        info!(
            identifier_keys = built.stats.identifier_keys,
            name_keys = built.stats.name_keys,
            skipped_cells = built.stats.skipped_cells,
            "indexing complete"
        );
        built
    }
}

/// Identifier bucket key: the trimmed raw value, unless empty or the null marker.
fn identifier_key(cell: &CellValue) -> Option<String> {
    let trimmed = cell.as_text()?.trim();
    if trimmed.is_empty() || trimmed == NULL_MARKER {
        None
    } else {
        Some(trimmed.to_string())
    }
}

#[cfg(test)]
mod tests {
    use roster_model::Record;

    use super::*;

    fn roles(id: Option<&str>, name: Option<&str>) -> ColumnRoles {
        ColumnRoles::new(id.map(String::from), name.map(String::from))
    }

    #[test]
    fn buckets_keep_first_seen_order() {
        let mut index = KeyIndex::new();
        index.insert("b".to_string(), 0);
        index.insert("a".to_string(), 1);
        index.insert("b".to_string(), 2);

        let keys: Vec<&str> = index.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["b", "a"]);
        assert_eq!(index.get("b"), Some(&[0, 2][..]));
        assert_eq!(index.row_count(), 3);
        assert!(index.get("c").is_none());
    }

    #[test]
    fn identifier_keys_are_trimmed_and_filtered() {
        let table = Table::from_text_rows(
            ["id"],
            [[" 1001 "], [""], ["nan"], ["   "], ["1001"], ["1002"]],
        );
        let built = IndexBuilder::new(&table, &roles(Some("id"), None))
            .unwrap()
            .build();
        let index = built.identifier.unwrap();
        assert_eq!(index.get("1001"), Some(&[0, 4][..]));
        assert_eq!(index.get("1002"), Some(&[5][..]));
        assert_eq!(index.len(), 2);
        assert!(built.name.is_none());
        assert_eq!(built.stats.excluded_values, 3);
    }

    #[test]
    fn name_keys_are_normalized() {
        let table = Table::from_text_rows(
            ["name"],
            [["أحمد  علي"], ["احمد علي"], ["\u{064E}"], ["فاطمة"]],
        );
        let built = IndexBuilder::new(&table, &roles(None, Some("name")))
            .unwrap()
            .build();
        let index = built.name.unwrap();
        assert_eq!(index.get("احمد على"), Some(&[0, 1][..]));
        assert_eq!(index.get("فاطمه"), Some(&[3][..]));
        assert_eq!(index.len(), 2);
        assert_eq!(built.stats.name_keys, 2);
    }

    #[test]
    fn short_rows_are_skipped_not_fatal() {
        let mut table = Table::new(vec!["id".to_string(), "name".to_string()]);
        table.push_row(Record::new(vec![
            CellValue::Text("1".to_string()),
            CellValue::Text("Ali".to_string()),
        ]));
        table.push_row(Record::new(vec![CellValue::Text("2".to_string())]));
        table.push_row(Record::new(Vec::new()));

        let built = IndexBuilder::new(&table, &roles(Some("id"), Some("name")))
            .unwrap()
            .build();
        assert_eq!(built.stats.rows_scanned, 3);
        assert_eq!(built.stats.skipped_cells, 3);
        assert_eq!(built.identifier.unwrap().row_count(), 2);
        assert_eq!(built.name.unwrap().row_count(), 1);
    }

    #[test]
    fn unknown_role_column_is_rejected() {
        let table = Table::from_text_rows(["id"], [["1"]]);
        assert!(IndexBuilder::new(&table, &roles(Some("seat"), None)).is_err());
    }

    #[test]
    fn cancellable_build_matches_plain_build_when_not_cancelled() {
        let table = Table::from_text_rows(["id", "name"], [["1", "علي"], ["", "سارة"], ["3", ""]]);
        let builder = IndexBuilder::new(&table, &roles(Some("id"), Some("name"))).unwrap();
        let plain = builder.build();
        let cancellable = builder.build_cancellable(&AtomicBool::new(false)).unwrap();
        assert_eq!(plain.stats, cancellable.stats);
        assert_eq!(plain.stats.rows_scanned, 3);
        assert_eq!(plain.stats.excluded_values, 2);
        assert_eq!(plain.stats.identifier_keys, 2);
        assert_eq!(plain.stats.name_keys, 2);
    }

    #[test]
    fn cancelled_build_returns_error() {
        let table = Table::from_text_rows(["id"], [["1"], ["2"]]);
        let builder = IndexBuilder::new(&table, &roles(Some("id"), None)).unwrap();
        let cancel = AtomicBool::new(true);
        let err = builder.build_cancellable(&cancel).unwrap_err();
        assert!(matches!(
            err,
            SearchError::BuildCancelled { rows_processed: 0 }
        ));
    }
}
