use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

use csv::ReaderBuilder;
use serde::Serialize;
use tracing::{debug, info, info_span, warn};

use roster_model::{CellValue, Record, Table};

use crate::error::{IngestError, Result};

/// Files above this size are capped unless an explicit row limit is given.
pub const DEFAULT_LARGE_FILE_BYTES: u64 = 25 * 1024 * 1024;

/// Row cap applied to large files.
pub const DEFAULT_LARGE_FILE_MAX_ROWS: usize = 50_000;

/// Extensions recognised as tabular sources but decoded elsewhere.
const SPREADSHEET_EXTENSIONS: &[&str] = &["xlsx", "xls"];

#[derive(Debug, Clone)]
pub struct IngestOptions {
    /// Hard row limit. Overrides the large-file cap when set.
    pub max_rows: Option<usize>,
    /// Size above which `large_file_max_rows` applies.
    pub large_file_bytes: u64,
    pub large_file_max_rows: usize,
}

impl Default for IngestOptions {
    fn default() -> Self {
        Self {
            max_rows: None,
            large_file_bytes: DEFAULT_LARGE_FILE_BYTES,
            large_file_max_rows: DEFAULT_LARGE_FILE_MAX_ROWS,
        }
    }
}

impl IngestOptions {
    #[must_use]
    pub fn with_max_rows(mut self, max_rows: Option<usize>) -> Self {
        self.max_rows = max_rows;
        self
    }

    fn row_limit(&self, file_size: u64) -> Option<usize> {
        if self.max_rows.is_some() {
            return self.max_rows;
        }
        (file_size > self.large_file_bytes).then_some(self.large_file_max_rows)
    }
}

/// Non-fatal conditions found while loading. Reported, never hidden.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum IngestWarning {
    /// The source had more data rows than the limit; only `limit` were kept.
    Truncated { limit: usize },
    /// Rows with more cells than headers; the extra cells were dropped.
    ExtraCells { rows: usize },
    /// Header names that repeated and were renamed with a numeric suffix.
    DuplicateHeaders { renamed: Vec<String> },
}

impl fmt::Display for IngestWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Truncated { limit } => {
                write!(f, "source truncated to the first {limit} rows")
            }
            Self::ExtraCells { rows } => {
                write!(f, "{rows} rows had more cells than headers; extra cells dropped")
            }
            Self::DuplicateHeaders { renamed } => {
                write!(f, "duplicate headers renamed: {}", renamed.join(", "))
            }
        }
    }
}

/// A decoded table plus the warnings produced while decoding it.
#[derive(Debug, Clone)]
pub struct LoadedTable {
    pub table: Table,
    pub warnings: Vec<IngestWarning>,
}

impl LoadedTable {
    pub fn was_truncated(&self) -> bool {
        self.warnings
            .iter()
            .any(|w| matches!(w, IngestWarning::Truncated { .. }))
    }
}

pub(crate) fn normalize_header(raw: &str) -> String {
    let trimmed = raw.trim().trim_matches('\u{feff}');
    let mut parts = trimmed.split_whitespace();
    let mut normalized = String::new();
    if let Some(first) = parts.next() {
        normalized.push_str(first);
        for part in parts {
            normalized.push(' ');
            normalized.push_str(part);
        }
    }
    normalized
}

fn normalize_cell(raw: &str) -> &str {
    raw.trim_matches('\u{feff}')
}

/// Renames repeated headers `a`, `a` to `a`, `a.1`, skipping suffixes that
/// would collide with an existing header.
pub(crate) fn dedupe_headers(headers: Vec<String>) -> (Vec<String>, Vec<String>) {
    let mut seen: BTreeMap<String, usize> = BTreeMap::new();
    for header in &headers {
        seen.entry(header.clone()).or_insert(0);
    }
    let mut taken: Vec<String> = Vec::with_capacity(headers.len());
    let mut renamed = Vec::new();
    for header in headers {
        if !taken.contains(&header) {
            taken.push(header);
            continue;
        }
        let mut counter = seen.get(&header).copied().unwrap_or(0);
        let candidate = loop {
            counter += 1;
            let candidate = format!("{header}.{counter}");
            if !seen.contains_key(&candidate) && !taken.contains(&candidate) {
                break candidate;
            }
        };
        seen.insert(header, counter);
        renamed.push(candidate.clone());
        taken.push(candidate);
    }
    (taken, renamed)
}

fn extension_of(path: &Path) -> String {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default()
}

/// Returns true for sources [`load_table`] can decode.
pub fn is_supported_source(path: &Path) -> bool {
    extension_of(path) == "csv"
}

/// Returns true for any recognised tabular source, decodable or not.
pub fn is_tabular_source(path: &Path) -> bool {
    let ext = extension_of(path);
    ext == "csv" || SPREADSHEET_EXTENSIONS.contains(&ext.as_str())
}

/// Decodes a tabular source into a [`Table`].
///
/// Column names are trimmed, rows keep source order, empty cells become
/// [`CellValue::Missing`] and rows with no content are dropped. Row capping
/// is reported through [`IngestWarning::Truncated`].
pub fn load_table(path: &Path, options: &IngestOptions) -> Result<LoadedTable> {
    let span = info_span!("load_table", path = %path.display());
    let _guard = span.enter();

    if !path.is_file() {
        return Err(IngestError::FileNotFound {
            path: path.to_path_buf(),
        });
    }
    if !is_supported_source(path) {
        return Err(IngestError::UnsupportedFormat {
            path: path.to_path_buf(),
            extension: extension_of(path),
        });
    }

    let file_size = std::fs::metadata(path)
        .map_err(|source| IngestError::FileRead {
            path: path.to_path_buf(),
            source,
        })?
        .len();
    let limit = options.row_limit(file_size);
    if let Some(limit) = limit {
        debug!(file_size, limit, "row limit in effect");
    }

    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path)
        .map_err(|e| csv_error(path, &e))?;
    let raw_headers: Vec<String> = reader
        .headers()
        .map_err(|e| csv_error(path, &e))?
        .iter()
        .map(normalize_header)
        .collect();
    if raw_headers.iter().all(String::is_empty) {
        return Err(IngestError::EmptyTable {
            path: path.to_path_buf(),
        });
    }

    let mut warnings = Vec::new();
    let (columns, renamed) = dedupe_headers(raw_headers);
    if !renamed.is_empty() {
        warn!(renamed = ?renamed, "duplicate headers renamed");
        warnings.push(IngestWarning::DuplicateHeaders { renamed });
    }

    let width = columns.len();
    let mut table = Table::new(columns);
    let mut extra_cell_rows = 0usize;
    let mut truncated = false;

    for record in reader.records() {
        let record = record.map_err(|e| csv_error(path, &e))?;
        if record.iter().all(|value| normalize_cell(value).trim().is_empty()) {
            continue;
        }
        if limit.is_some_and(|limit| table.len() >= limit) {
            truncated = true;
            break;
        }
        if record.len() > width {
            extra_cell_rows += 1;
        }
        let mut cells: Vec<CellValue> = record
            .iter()
            .take(width)
            .map(|value| CellValue::from_raw(normalize_cell(value)))
            .collect();
        cells.resize(width, CellValue::Missing);
        table.push_row(Record::new(cells));
    }

    if table.is_empty() {
        return Err(IngestError::EmptyTable {
            path: path.to_path_buf(),
        });
    }
    if extra_cell_rows > 0 {
        warn!(rows = extra_cell_rows, "rows with extra cells");
        warnings.push(IngestWarning::ExtraCells {
            rows: extra_cell_rows,
        });
    }
    if truncated {
        let limit = limit.unwrap_or(table.len());
        warn!(limit, "source truncated");
        warnings.push(IngestWarning::Truncated { limit });
    }

    info!(
        rows = table.len(),
        columns = table.columns.len(),
        "loaded table"
    );
    Ok(LoadedTable { table, warnings })
}

fn csv_error(path: &Path, error: &csv::Error) -> IngestError {
    IngestError::CsvParse {
        path: path.to_path_buf(),
        message: error.to_string(),
    }
}
