use std::io::{self, IsTerminal};

use anyhow::{Context, Result, bail};
use tracing::{debug, info_span};

use roster_cli::logging::redact_value;
use roster_cli::pagination::Page;
use roster_cli::pipeline::{LoadOutcome, load_snapshot};
use roster_cli::render::{
    columns_table, files_table, page_footer, preview_table, results_json, results_table,
};
use roster_cli::shell::{Shell, ShellCommand};
use roster_ingest::{IngestOptions, list_data_files};
use roster_search::SearchOptions;

use crate::cli::{FilesArgs, LoadArgs, PreviewArgs, SearchArgs, SearchByArg, ShellArgs};

fn ingest_options(args: &LoadArgs) -> IngestOptions {
    IngestOptions::default().with_max_rows(args.max_rows)
}

fn load(args: &LoadArgs, search: SearchOptions) -> Result<LoadOutcome> {
    let outcome = load_snapshot(&args.file, &ingest_options(args), search)?;
    for warning in &outcome.warnings {
        eprintln!("warning: {warning}");
    }
    Ok(outcome)
}

pub fn run_columns(args: &LoadArgs) -> Result<()> {
    let outcome = load(args, SearchOptions::default())?;
    let snapshot = &outcome.snapshot;
    println!("File: {}", args.file.display());
    println!("Records: {}", snapshot.total_records());
    println!("{}", columns_table(&snapshot.column_info()));
    if !snapshot.supports_id_search() {
        println!("No identifier column detected; identifier search is unavailable.");
    }
    if !snapshot.supports_name_search() {
        println!("No name column detected; name search is unavailable.");
    }
    Ok(())
}

pub fn run_search(args: &SearchArgs) -> Result<()> {
    if !(0.0..=1.0).contains(&args.min_similarity) {
        bail!("--min-similarity must be within [0, 1]");
    }
    let search = SearchOptions {
        max_results: args.max_results,
        min_similarity: args.min_similarity,
    };
    let outcome = load(&args.load, search)?;
    let snapshot = &outcome.snapshot;

    let span = info_span!("search");
    let _guard = span.enter();
    debug!(query = redact_value(&args.query), "running query");
    let results = match args.by {
        SearchByArg::Id => {
            if !snapshot.supports_id_search() {
                bail!("no identifier column detected in {}", args.load.file.display());
            }
            snapshot.search_by_id(&args.query)
        }
        SearchByArg::Name => {
            if !snapshot.supports_name_search() {
                bail!("no name column detected in {}", args.load.file.display());
            }
            snapshot.search_by_name(&args.query)
        }
    };

    let page = Page::of(&results, args.page as usize, args.per_page as usize);
    if args.json {
        let value = results_json(&page).context("serialize results")?;
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }
    if results.is_empty() {
        println!("No matches.");
        return Ok(());
    }
    println!("{}", results_table(&page));
    println!("{}", page_footer(&page));
    Ok(())
}

pub fn run_preview(args: &PreviewArgs) -> Result<()> {
    let outcome = load(&args.load, SearchOptions::default())?;
    let snapshot = &outcome.snapshot;
    let rows = snapshot.preview(args.rows);
    println!("{}", preview_table(&snapshot.table().columns, &rows));
    println!("{} of {} records", rows.len(), snapshot.total_records());
    Ok(())
}

pub fn run_files(args: &FilesArgs) -> Result<()> {
    let files = list_data_files(&args.dir)
        .with_context(|| format!("list {}", args.dir.display()))?;
    if files.is_empty() {
        println!("No tabular files in {}", args.dir.display());
        return Ok(());
    }
    println!("{}", files_table(&files));
    Ok(())
}

pub fn run_shell(args: &ShellArgs) -> Result<()> {
    let shell = Shell::new(IngestOptions::default(), SearchOptions::default());
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    if let Some(file) = &args.file {
        shell.execute(ShellCommand::Load(file.clone()), &mut stdout)?;
    }
    if stdin.is_terminal() {
        println!("Type `help` for commands.");
    }
    shell.run(stdin.lock(), &mut stdout)
}
