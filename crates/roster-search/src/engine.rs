//! Query engine over one immutable table snapshot.

use std::sync::atomic::AtomicBool;

use tracing::{debug, info_span, warn};

use roster_model::{ColumnInfo, ColumnRoles, Field, MatchType, SearchResult, Table};

use crate::detect::detect_roles;
use crate::error::Result;
use crate::index::{BuildStats, BuiltIndices, IdentifierIndex, IndexBuilder, NameIndex};
use crate::normalize::normalize;
use crate::score::score;

/// Maximum results returned by one query.
pub const DEFAULT_MAX_RESULTS: usize = 100;

/// Name candidates scoring below this are dropped.
pub const DEFAULT_MIN_SIMILARITY: f64 = 0.3;

/// Similarity reported for identifier substring matches.
pub const PARTIAL_ID_SIMILARITY: f64 = 0.8;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SearchOptions {
    pub max_results: usize,
    /// Inclusive lower bound on name similarity.
    pub min_similarity: f64,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            max_results: DEFAULT_MAX_RESULTS,
            min_similarity: DEFAULT_MIN_SIMILARITY,
        }
    }
}

/// A loaded table with its detected roles and indices.
///
/// Built once, never mutated. Queries only read from it, so one snapshot can
/// serve any number of concurrent callers.
#[derive(Debug)]
pub struct SearchSnapshot {
    table: Table,
    roles: ColumnRoles,
    identifier_index: Option<IdentifierIndex>,
    name_index: Option<NameIndex>,
    stats: BuildStats,
    options: SearchOptions,
}

impl SearchSnapshot {
    /// Detects column roles and builds both indices.
    pub fn build(table: Table, options: SearchOptions) -> Result<Self> {
        let roles = detect_roles(&table);
        Self::build_with_roles(table, roles, options)
    }

    /// Builds indices for caller-supplied roles.
    pub fn build_with_roles(
        table: Table,
        roles: ColumnRoles,
        options: SearchOptions,
    ) -> Result<Self> {
        let built = IndexBuilder::new(&table, &roles)?.build();
        Ok(Self::assemble(table, roles, built, options))
    }

    /// Like [`SearchSnapshot::build`], but stops with
    /// [`crate::SearchError::BuildCancelled`] once `cancel` is set.
    pub fn build_cancellable(
        table: Table,
        options: SearchOptions,
        cancel: &AtomicBool,
    ) -> Result<Self> {
        let roles = detect_roles(&table);
        let built = IndexBuilder::new(&table, &roles)?.build_cancellable(cancel)?;
        Ok(Self::assemble(table, roles, built, options))
    }

    fn assemble(
        table: Table,
        roles: ColumnRoles,
        built: BuiltIndices,
        options: SearchOptions,
    ) -> Self {
        Self {
            table,
            roles,
            identifier_index: built.identifier,
            name_index: built.name,
            stats: built.stats,
            options,
        }
    }

    pub fn table(&self) -> &Table {
        &self.table
    }

    pub fn roles(&self) -> &ColumnRoles {
        &self.roles
    }

    pub fn stats(&self) -> &BuildStats {
        &self.stats
    }

    pub fn options(&self) -> &SearchOptions {
        &self.options
    }

    pub fn identifier_index(&self) -> Option<&IdentifierIndex> {
        self.identifier_index.as_ref()
    }

    pub fn name_index(&self) -> Option<&NameIndex> {
        self.name_index.as_ref()
    }

    pub fn total_records(&self) -> usize {
        self.table.len()
    }

    pub fn supports_id_search(&self) -> bool {
        self.identifier_index.is_some()
    }

    pub fn supports_name_search(&self) -> bool {
        self.name_index.is_some()
    }

    pub fn column_info(&self) -> ColumnInfo {
        ColumnInfo::new(&self.table, &self.roles)
    }

    /// Field lists of the first `n` records.
    pub fn preview(&self, n: usize) -> Vec<Vec<Field>> {
        (0..n.min(self.table.len()))
            .filter_map(|row| self.table.fields(row).ok())
            .collect()
    }

    /// Identifier lookup: exact bucket first, substring scan otherwise.
    ///
    /// The substring fallback is unranked; results come in key insertion
    /// order and the first `max_results` found are kept.
    pub fn search_by_id(&self, query: &str) -> Vec<SearchResult> {
        let Some(index) = &self.identifier_index else {
            debug!("identifier search without identifier column");
            return Vec::new();
        };
        let query = query.trim();
        if query.is_empty() {
            return Vec::new();
        }
        let span = info_span!("search_by_id", query_chars = query.chars().count());
        let _guard = span.enter();
        let limit = self.options.max_results;

        if let Some(rows) = index.get(query) {
            let results: Vec<SearchResult> = rows
                .iter()
                .take(limit)
                .filter_map(|&row| self.make_result(row, MatchType::Exact, 1.0, None))
                .collect();
            debug!(results = results.len(), "exact identifier match");
            return results;
        }

        let mut results = Vec::new();
        'keys: for (key, rows) in index.iter() {
            if !(key.contains(query) || query.contains(key)) {
                continue;
            }
            for &row in rows {
                if results.len() >= limit {
                    break 'keys;
                }
                if let Some(result) =
                    self.make_result(row, MatchType::Partial, PARTIAL_ID_SIMILARITY, None)
                {
                    results.push(result);
                }
            }
        }
        debug!(results = results.len(), "partial identifier matches");
        results
    }

    /// Fuzzy, word-order-insensitive name lookup.
    ///
    /// Every indexed name is scored; candidates at or above `min_similarity`
    /// are stably sorted by descending score and capped at `max_results`.
    pub fn search_by_name(&self, query: &str) -> Vec<SearchResult> {
        let Some(index) = &self.name_index else {
            debug!("name search without name column");
            return Vec::new();
        };
        let normalized = normalize(query);
        if normalized.is_empty() {
            return Vec::new();
        }
        let span = info_span!("search_by_name", query_words = normalized.split(' ').count());
        let _guard = span.enter();
        let query_words: Vec<&str> = normalized.split(' ').collect();

        let mut candidates: Vec<(usize, f64, &str)> = Vec::new();
        for (key, rows) in index.iter() {
            let similarity = score(&query_words, key);
            if similarity >= self.options.min_similarity {
                candidates.extend(rows.iter().map(|&row| (row, similarity, key)));
            }
        }
        debug!(candidates = candidates.len(), "scored name keys");

        // stable: equal scores keep key order, then bucket order
        candidates.sort_by(|a, b| b.1.total_cmp(&a.1));
        candidates.truncate(self.options.max_results);

        candidates
            .into_iter()
            .filter_map(|(row, similarity, key)| {
                let match_type = if similarity == 1.0 {
                    MatchType::Exact
                } else {
                    MatchType::Fuzzy
                };
                self.make_result(row, match_type, similarity, Some(key.to_string()))
            })
            .collect()
    }

    fn make_result(
        &self,
        row: usize,
        match_type: MatchType,
        similarity: f64,
        matched_key: Option<String>,
    ) -> Option<SearchResult> {
        match self.table.fields(row) {
            Ok(fields) => Some(SearchResult {
                row,
                fields,
                match_type,
                similarity,
                matched_key,
            }),
            Err(error) => {
                warn!(%error, "indexed row not in table");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(columns: [&str; 2], rows: &[[&str; 2]]) -> SearchSnapshot {
        let table = Table::from_text_rows(columns, rows.iter().copied());
        SearchSnapshot::build(table, SearchOptions::default()).unwrap()
    }

    #[test]
    fn exact_identifier_hits_keep_row_order() {
        let snap = snapshot(
            ["id", "name"],
            &[["1001", "a"], ["1002", "b"], ["1002", "c"]],
        );
        let results = snap.search_by_id(" 1002 ");
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].row, 1);
        assert_eq!(results[1].row, 2);
        assert!(results.iter().all(|r| r.match_type == MatchType::Exact));
        assert!(results.iter().all(|r| r.similarity == 1.0));
    }

    #[test]
    fn identifier_fallback_matches_substrings_both_ways() {
        let snap = snapshot(
            ["id", "name"],
            &[["1001", "a"], ["2100", "b"], ["10", "c"], ["999", "d"]],
        );
        let results = snap.search_by_id("100");
        let rows: Vec<usize> = results.iter().map(|r| r.row).collect();
        // "1001" and "2100" contain the query, the query contains "10"
        assert_eq!(rows, vec![0, 1, 2]);
        assert!(results.iter().all(|r| r.match_type == MatchType::Partial));
        assert!(results.iter().all(|r| r.similarity == PARTIAL_ID_SIMILARITY));
        assert!(results.iter().all(|r| r.matched_key.is_none()));
    }

    #[test]
    fn blank_queries_return_nothing() {
        let snap = snapshot(["id", "name"], &[["1", "علي"]]);
        assert!(snap.search_by_id("   ").is_empty());
        assert!(snap.search_by_name(" \u{064E} ").is_empty());
    }

    #[test]
    fn name_results_carry_matched_key() {
        let snap = snapshot(["id", "name"], &[["1", "أحمد محمد"], ["2", "سارة"]]);
        let results = snap.search_by_name("احمد محمد");
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].match_type, MatchType::Exact);
        assert_eq!(results[0].matched_key.as_deref(), Some("احمد محمد"));
        assert_eq!(results[0].field("name"), Some("أحمد محمد"));
    }

    #[test]
    fn preview_is_bounded_by_table_length() {
        let snap = snapshot(["id", "name"], &[["1", "a"], ["2", "b"]]);
        assert_eq!(snap.preview(5).len(), 2);
        assert_eq!(snap.preview(1)[0][0].value, "1");
        assert_eq!(snap.total_records(), 2);
    }
}
