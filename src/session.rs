//! Interactive dashboard session.
//!
//! Every command re-reads the input file and re-renders from scratch, the way
//! a page reload would. Ingestion and cleaning go through an [`IngestCache`]
//! so unchanged content is only parsed once per session.

use std::{
    io::{self, BufRead, Write},
    path::{Path, PathBuf},
    sync::Arc,
};

use anyhow::{Context, Result, anyhow, bail};
use clap::ValueEnum;
use log::{info, warn};

use crate::{
    cache::IngestCache,
    cli::{DashboardArgs, OutputFormat},
    config::PipelineConfig,
    correlation, dashboard,
    dashboard::Tab,
    io_utils,
    pipeline::CleanedTable,
};

const HELP: &str = "\
Commands:
  overview | rides | cancellations | revenue | people   show one tab
  all                                                   show every tab
  json <tab>                                            show one tab as JSON
  correlate                                             correlation matrix
  export <path>                                         write the cleaned CSV
  help                                                  this message
  quit                                                  end the session
";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionCommand {
    Show(Vec<Tab>, OutputFormat),
    Correlate,
    Export(PathBuf),
    Help,
    Quit,
    Blank,
}

impl SessionCommand {
    pub fn parse(line: &str) -> Result<Self> {
        let line = line.trim();
        let (word, rest) = match line.split_once(char::is_whitespace) {
            Some((word, rest)) => (word, rest.trim()),
            None => (line, ""),
        };
        let command = match word.to_ascii_lowercase().as_str() {
            "" => SessionCommand::Blank,
            "all" => SessionCommand::Show(Tab::ALL.to_vec(), OutputFormat::Text),
            "json" => SessionCommand::Show(vec![parse_tab(rest)?], OutputFormat::Json),
            "correlate" => SessionCommand::Correlate,
            "export" => {
                if rest.is_empty() {
                    bail!("export needs a destination path");
                }
                SessionCommand::Export(PathBuf::from(rest))
            }
            "help" | "?" => SessionCommand::Help,
            "quit" | "exit" | "q" => SessionCommand::Quit,
            other => SessionCommand::Show(vec![parse_tab(other)?], OutputFormat::Text),
        };
        Ok(command)
    }
}

fn parse_tab(value: &str) -> Result<Tab> {
    Tab::from_str(value, true).map_err(|_| anyhow!("Unknown command or tab '{value}' (try 'help')"))
}

pub struct Session {
    input: PathBuf,
    delimiter: u8,
    cache: IngestCache,
}

impl Session {
    pub fn new(input: &Path, delimiter: u8, config: PipelineConfig) -> Self {
        Self {
            input: input.to_path_buf(),
            delimiter,
            cache: IngestCache::new(delimiter, config),
        }
    }

    pub fn cache(&self) -> &IngestCache {
        &self.cache
    }

    /// Re-reads the input and returns its cleaned table, cached by content.
    pub fn load(&mut self) -> Result<Arc<CleanedTable>> {
        let bytes = io_utils::read_input_bytes(&self.input)?;
        let cleaned = self
            .cache
            .load(&bytes)
            .with_context(|| format!("Ingesting {:?}", self.input))?;
        Ok(cleaned)
    }

    /// Runs one command. Returns `false` once the session should end.
    pub fn handle<W: Write>(&mut self, command: SessionCommand, out: &mut W) -> Result<bool> {
        match command {
            SessionCommand::Blank => {}
            SessionCommand::Help => out.write_all(HELP.as_bytes())?,
            SessionCommand::Quit => return Ok(false),
            SessionCommand::Show(tabs, format) => {
                let cleaned = self.load()?;
                let rendered = dashboard::render_tabs(&tabs, &cleaned, self.cache.config(), format)?;
                out.write_all(rendered.as_bytes())?;
            }
            SessionCommand::Correlate => {
                let cleaned = self.load()?;
                let matrix = correlation::correlation_matrix(&cleaned.frame);
                out.write_all(correlation::render_text(&matrix).as_bytes())?;
            }
            SessionCommand::Export(path) => {
                let cleaned = self.load()?;
                let delimiter = io_utils::resolve_output_delimiter(Some(path.as_path()), None, self.delimiter);
                let mut writer = io_utils::open_csv_writer(Some(path.as_path()), delimiter)?;
                io_utils::write_frame(&mut writer, &cleaned.frame)?;
                writeln!(
                    out,
                    "Exported {} row(s) to {}",
                    cleaned.frame.row_count(),
                    path.display()
                )?;
            }
        }
        Ok(true)
    }

    /// Reads commands line by line until `quit` or end of input. Command
    /// failures are reported to `out` and the session continues.
    pub fn run<R: BufRead, W: Write>(&mut self, reader: R, out: &mut W) -> Result<()> {
        for line in reader.lines() {
            let line = line.context("Reading session command")?;
            let outcome = SessionCommand::parse(&line).and_then(|command| self.handle(command, out));
            match outcome {
                Ok(true) => {}
                Ok(false) => break,
                Err(err) => {
                    warn!("Command '{}' failed: {err:#}", line.trim());
                    writeln!(out, "error: {err:#}")?;
                }
            }
            out.flush()?;
        }
        Ok(())
    }
}

pub fn execute(args: &DashboardArgs) -> Result<()> {
    if io_utils::is_dash(&args.input) {
        bail!("The dashboard reads commands from stdin; pass the data file with --input <path>");
    }
    let delimiter = io_utils::resolve_input_delimiter(&args.input, args.delimiter);
    let config = PipelineConfig::resolve(args.config.as_deref())?;
    let mut session = Session::new(&args.input, delimiter, config);

    let cleaned = session.load()?;
    let stdout = io::stdout();
    let mut out = stdout.lock();
    writeln!(
        out,
        "Loaded {} row(s) x {} column(s) from {}. Type 'help' for commands.",
        cleaned.frame.row_count(),
        cleaned.frame.column_count(),
        args.input.display()
    )?;

    session.run(io::stdin().lock(), &mut out)?;
    let stats = session.cache().stats();
    info!(
        "Session ended ({} cache hit(s), {} miss(es))",
        stats.hits, stats.misses
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_recognizes_tabs_and_keywords() {
        assert_eq!(
            SessionCommand::parse("  Revenue ").unwrap(),
            SessionCommand::Show(vec![Tab::Revenue], OutputFormat::Text)
        );
        assert_eq!(
            SessionCommand::parse("json people").unwrap(),
            SessionCommand::Show(vec![Tab::People], OutputFormat::Json)
        );
        assert_eq!(
            SessionCommand::parse("export out/clean.csv").unwrap(),
            SessionCommand::Export(PathBuf::from("out/clean.csv"))
        );
        assert_eq!(SessionCommand::parse("").unwrap(), SessionCommand::Blank);
        assert_eq!(SessionCommand::parse("q").unwrap(), SessionCommand::Quit);
        assert!(SessionCommand::parse("export").is_err());
        assert!(SessionCommand::parse("drivers").is_err());
    }
}
