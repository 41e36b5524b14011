//! Line-oriented interactive session over a [`SnapshotStore`].

use std::io::{BufRead, Write};
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Result, bail};
use rapidfuzz::distance::jaro_winkler;
use tracing::{debug, warn};

use roster_ingest::IngestOptions;
use roster_model::SearchResult;
use roster_search::{SearchOptions, SearchSnapshot, SnapshotStore};

use crate::logging::redact_value;
use crate::pagination::{DEFAULT_PER_PAGE, Page};
use crate::pipeline::load_snapshot;
use crate::render::{columns_table, page_footer, preview_table, results_table};

const PROMPT: &str = "roster> ";
const DEFAULT_PREVIEW_ROWS: usize = 5;

/// Command words offered as suggestions for a mistyped command.
const COMMAND_WORDS: &[&str] = &[
    "load", "id", "name", "columns", "preview", "clear", "help", "quit",
];

const SUGGESTION_MIN_SIMILARITY: f64 = 0.8;

const HELP: &str = "\
commands:
  load <path>     load a CSV roster, replacing the current one
  id <query>      search by identifier
  name <query>    search by name
  columns         show detected columns
  preview [n]     show the first n records (default 5)
  clear           unload the current roster
  help            show this help
  quit            leave the shell";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellCommand {
    Load(PathBuf),
    Id(String),
    Name(String),
    Columns,
    Preview(usize),
    Clear,
    Help,
    Quit,
    /// Blank input line.
    Nothing,
}

/// Whether the session continues after a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// Parses one input line. The command word is case-insensitive; the rest of
/// the line is taken verbatim as the argument.
pub fn parse_command(line: &str) -> Result<ShellCommand> {
    let line = line.trim();
    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (line, ""),
    };
    let command = match word.to_lowercase().as_str() {
        "" => ShellCommand::Nothing,
        "load" | "open" => {
            if rest.is_empty() {
                bail!("usage: load <path>");
            }
            ShellCommand::Load(PathBuf::from(rest))
        }
        "id" => {
            if rest.is_empty() {
                bail!("usage: id <query>");
            }
            ShellCommand::Id(rest.to_string())
        }
        "name" => {
            if rest.is_empty() {
                bail!("usage: name <query>");
            }
            ShellCommand::Name(rest.to_string())
        }
        "columns" | "cols" => ShellCommand::Columns,
        "preview" => {
            let rows = if rest.is_empty() {
                DEFAULT_PREVIEW_ROWS
            } else {
                match rest.parse() {
                    Ok(rows) => rows,
                    Err(_) => bail!("preview expects a row count, got `{rest}`"),
                }
            };
            ShellCommand::Preview(rows)
        }
        "clear" => ShellCommand::Clear,
        "help" | "?" => ShellCommand::Help,
        "quit" | "exit" => ShellCommand::Quit,
        other => match suggest_command(other) {
            Some(suggestion) => {
                bail!("unknown command `{other}`; did you mean `{suggestion}`?")
            }
            None => bail!("unknown command `{other}`; type `help`"),
        },
    };
    Ok(command)
}

/// Closest command word by Jaro-Winkler similarity, if any is close enough.
fn suggest_command(word: &str) -> Option<&'static str> {
    COMMAND_WORDS
        .iter()
        .map(|&candidate| {
            let similarity = jaro_winkler::similarity(word.chars(), candidate.chars());
            (candidate, similarity)
        })
        .filter(|&(_, similarity)| similarity >= SUGGESTION_MIN_SIMILARITY)
        .max_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(candidate, _)| candidate)
}

pub struct Shell {
    store: SnapshotStore,
    ingest: IngestOptions,
    search: SearchOptions,
    per_page: usize,
}

impl Shell {
    pub fn new(ingest: IngestOptions, search: SearchOptions) -> Self {
        Self {
            store: SnapshotStore::new(),
            ingest,
            search,
            per_page: DEFAULT_PER_PAGE,
        }
    }

    pub fn store(&self) -> &SnapshotStore {
        &self.store
    }

    /// Reads commands until `quit` or end of input. Command failures are
    /// reported to `out` and the session continues.
    pub fn run<R: BufRead, W: Write>(&self, input: R, out: &mut W) -> Result<()> {
        write!(out, "{PROMPT}")?;
        out.flush()?;
        for line in input.lines() {
            let line = line?;
            let flow = match parse_command(&line).and_then(|command| self.execute(command, out)) {
                Ok(flow) => flow,
                Err(err) => {
                    warn!(error = %err, "shell command failed");
                    writeln!(out, "error: {err:#}")?;
                    Flow::Continue
                }
            };
            if flow == Flow::Quit {
                return Ok(());
            }
            write!(out, "{PROMPT}")?;
            out.flush()?;
        }
        writeln!(out)?;
        Ok(())
    }

    pub fn execute<W: Write>(&self, command: ShellCommand, out: &mut W) -> Result<Flow> {
        match command {
            ShellCommand::Nothing => {}
            ShellCommand::Help => writeln!(out, "{HELP}")?,
            ShellCommand::Quit => return Ok(Flow::Quit),
            ShellCommand::Load(path) => {
                let mut warnings = Vec::new();
                let snapshot = self.store.load_with(|| {
                    let outcome = load_snapshot(&path, &self.ingest, self.search)?;
                    warnings = outcome.warnings;
                    Ok::<_, anyhow::Error>(outcome.snapshot)
                })?;
                for warning in &warnings {
                    writeln!(out, "warning: {warning}")?;
                }
                writeln!(
                    out,
                    "loaded {} records from {}",
                    snapshot.total_records(),
                    path.display()
                )?;
            }
            ShellCommand::Clear => {
                if self.store.clear() {
                    writeln!(out, "roster cleared")?;
                } else {
                    writeln!(out, "nothing loaded")?;
                }
            }
            ShellCommand::Columns => {
                let snapshot = self.require_snapshot()?;
                writeln!(out, "{}", columns_table(&snapshot.column_info()))?;
                writeln!(out, "{} records", snapshot.total_records())?;
            }
            ShellCommand::Preview(rows) => {
                let snapshot = self.require_snapshot()?;
                let preview = snapshot.preview(rows);
                writeln!(out, "{}", preview_table(&snapshot.table().columns, &preview))?;
            }
            ShellCommand::Id(query) => {
                let snapshot = self.require_snapshot()?;
                if !snapshot.supports_id_search() {
                    bail!("no identifier column detected in this roster");
                }
                debug!(query = redact_value(&query), "identifier query");
                let results = snapshot.search_by_id(&query);
                self.print_results(&results, out)?;
            }
            ShellCommand::Name(query) => {
                let snapshot = self.require_snapshot()?;
                if !snapshot.supports_name_search() {
                    bail!("no name column detected in this roster");
                }
                debug!(query = redact_value(&query), "name query");
                let results = snapshot.search_by_name(&query);
                self.print_results(&results, out)?;
            }
        }
        Ok(Flow::Continue)
    }

    fn require_snapshot(&self) -> Result<Arc<SearchSnapshot>> {
        match self.store.current() {
            Some(snapshot) => Ok(snapshot),
            None => bail!("no roster loaded; use `load <path>`"),
        }
    }

    fn print_results<W: Write>(
        &self,
        results: &[SearchResult],
        out: &mut W,
    ) -> Result<()> {
        if results.is_empty() {
            writeln!(out, "no matches")?;
            return Ok(());
        }
        let page = Page::of(results, 1, self.per_page);
        writeln!(out, "{}", results_table(&page))?;
        writeln!(out, "{}", page_footer(&page))?;
        Ok(())
    }
}
