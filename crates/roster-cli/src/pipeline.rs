//! Load and index stages shared by the one-shot commands and the shell.

use std::path::Path;
use std::time::Instant;

use anyhow::{Context, Result};
use tracing::{info, info_span, warn};

use roster_ingest::{IngestOptions, IngestWarning, load_table};
use roster_search::{SearchOptions, SearchSnapshot};

/// A built snapshot plus whatever ingestion had to say about the file.
#[derive(Debug)]
pub struct LoadOutcome {
    pub snapshot: SearchSnapshot,
    pub warnings: Vec<IngestWarning>,
}

/// Reads `path`, detects column roles and builds both indices.
pub fn load_snapshot(
    path: &Path,
    ingest: &IngestOptions,
    search: SearchOptions,
) -> Result<LoadOutcome> {
    let span = info_span!("load", path = %path.display());
    let _guard = span.enter();
    let start = Instant::now();

    let loaded = load_table(path, ingest)
        .with_context(|| format!("load roster {}", path.display()))?;
    for warning in &loaded.warnings {
        warn!(%warning, "ingestion warning");
    }
    let snapshot = SearchSnapshot::build(loaded.table, search).context("build search index")?;

    info!(
        records = snapshot.total_records(),
        identifier = snapshot.roles().identifier_column.as_deref().unwrap_or("-"),
        name = snapshot.roles().name_column.as_deref().unwrap_or("-"),
        elapsed_ms = start.elapsed().as_millis() as u64,
        "roster ready"
    );
    Ok(LoadOutcome {
        snapshot,
        warnings: loaded.warnings,
    })
}
