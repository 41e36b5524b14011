//! Data file discovery.

use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::csv_table::{is_supported_source, is_tabular_source};
use crate::error::{IngestError, Result};

/// A tabular file found in a data directory.
#[derive(Debug, Clone, Serialize)]
pub struct DataFile {
    /// File name without the directory.
    pub file_name: String,
    pub path: PathBuf,
    /// Size in bytes.
    pub size: u64,
    /// Whether [`crate::load_table`] can decode this file.
    pub loadable: bool,
}

impl DataFile {
    pub fn size_formatted(&self) -> String {
        format_file_size(self.size)
    }
}

/// Lists tabular files in a directory.
///
/// Returns files sorted by filename. Subdirectories are not searched.
pub fn list_data_files(dir: &Path) -> Result<Vec<DataFile>> {
    if !dir.is_dir() {
        return Err(IngestError::DirectoryNotFound {
            path: dir.to_path_buf(),
        });
    }

    let entries = std::fs::read_dir(dir).map_err(|e| IngestError::DirectoryRead {
        path: dir.to_path_buf(),
        source: e,
    })?;

    let mut files = Vec::new();
    for entry_result in entries {
        let entry = entry_result.map_err(|e| IngestError::DirectoryRead {
            path: dir.to_path_buf(),
            source: e,
        })?;

        let path = entry.path();
        if !path.is_file() || !is_tabular_source(&path) {
            continue;
        }

        let size = entry
            .metadata()
            .map_err(|e| IngestError::FileRead {
                path: path.clone(),
                source: e,
            })?
            .len();
        let file_name = entry.file_name().to_string_lossy().into_owned();
        files.push(DataFile {
            file_name,
            loadable: is_supported_source(&path),
            path,
            size,
        });
    }

    files.sort_by(|a, b| a.file_name.cmp(&b.file_name));
    Ok(files)
}

/// Formats a byte count with binary units, e.g. `0 B`, `512 B`, `1.50 KB`.
pub fn format_file_size(size_bytes: u64) -> String {
    const UNITS: [&str; 4] = ["KB", "MB", "GB", "TB"];
    if size_bytes < 1024 {
        return format!("{size_bytes} B");
    }
    let mut value = size_bytes as f64 / 1024.0;
    let mut unit = 0;
    while value >= 1024.0 && unit + 1 < UNITS.len() {
        value /= 1024.0;
        unit += 1;
    }
    format!("{value:.2} {}", UNITS[unit])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_sizes() {
        assert_eq!(format_file_size(0), "0 B");
        assert_eq!(format_file_size(512), "512 B");
        assert_eq!(format_file_size(1536), "1.50 KB");
        assert_eq!(format_file_size(2 * 1024 * 1024), "2.00 MB");
        assert_eq!(format_file_size(3 * 1024 * 1024 * 1024), "3.00 GB");
    }
}
