use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::dashboard::Tab;

#[derive(Debug, Parser)]
#[command(
    author,
    version,
    about = "Clean ride-booking CSV exports and explore them as a terminal dashboard",
    long_about = None
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Write the cleaned, feature-augmented table as CSV
    Clean(CleanArgs),
    /// Render one or more dashboard tabs
    Report(ReportArgs),
    /// Show the first rows of the cleaned table
    Preview(PreviewArgs),
    /// Produce summary statistics for numeric columns
    Stats(StatsArgs),
    /// Print the correlation matrix of numeric columns
    Correlate(CorrelateArgs),
    /// Start an interactive dashboard session reading commands from stdin
    Dashboard(DashboardArgs),
}

#[derive(Debug, Clone, Copy, Default, ValueEnum, PartialEq, Eq)]
#[value(rename_all = "kebab-case")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Args)]
pub struct CleanArgs {
    /// Input CSV file (`-` for stdin)
    #[arg(short = 'i', long = "input")]
    pub input: PathBuf,
    /// Output CSV file (stdout if omitted)
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,
    /// CSV delimiter character for reading input
    #[arg(long, value_parser = parse_delimiter)]
    pub delimiter: Option<u8>,
    /// Delimiter to use for output (defaults to input delimiter)
    #[arg(long = "output-delimiter", value_parser = parse_delimiter)]
    pub output_delimiter: Option<u8>,
    /// YAML file overriding the pipeline tables
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}

#[derive(Debug, Args)]
pub struct ReportArgs {
    /// Input CSV file (`-` for stdin)
    #[arg(short = 'i', long = "input")]
    pub input: PathBuf,
    /// Tabs to render (all tabs when omitted)
    #[arg(short = 't', long = "tab", value_enum, action = clap::ArgAction::Append)]
    pub tabs: Vec<Tab>,
    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
    /// CSV delimiter character
    #[arg(long, value_parser = parse_delimiter)]
    pub delimiter: Option<u8>,
    /// YAML file overriding the pipeline tables
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}

#[derive(Debug, Args)]
pub struct PreviewArgs {
    /// Input CSV file (`-` for stdin)
    #[arg(short = 'i', long = "input")]
    pub input: PathBuf,
    /// Number of rows to display (defaults to the configured `preview_rows`)
    #[arg(long)]
    pub rows: Option<usize>,
    /// CSV delimiter character
    #[arg(long, value_parser = parse_delimiter)]
    pub delimiter: Option<u8>,
    /// YAML file overriding the pipeline tables
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}

#[derive(Debug, Args)]
pub struct StatsArgs {
    /// Input CSV file (`-` for stdin)
    #[arg(short = 'i', long = "input")]
    pub input: PathBuf,
    /// CSV delimiter character
    #[arg(long, value_parser = parse_delimiter)]
    pub delimiter: Option<u8>,
    /// YAML file overriding the pipeline tables
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}

#[derive(Debug, Args)]
pub struct CorrelateArgs {
    /// Input CSV file (`-` for stdin)
    #[arg(short = 'i', long = "input")]
    pub input: PathBuf,
    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
    /// CSV delimiter character
    #[arg(long, value_parser = parse_delimiter)]
    pub delimiter: Option<u8>,
    /// YAML file overriding the pipeline tables
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}

#[derive(Debug, Args)]
pub struct DashboardArgs {
    /// Input CSV file, re-read on every command
    #[arg(short = 'i', long = "input")]
    pub input: PathBuf,
    /// CSV delimiter character
    #[arg(long, value_parser = parse_delimiter)]
    pub delimiter: Option<u8>,
    /// YAML file overriding the pipeline tables
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}

pub fn parse_delimiter(value: &str) -> Result<u8, String> {
    match value {
        "tab" | "\t" => Ok(b'\t'),
        "comma" | "," => Ok(b','),
        "|" | "pipe" => Ok(b'|'),
        ";" | "semicolon" => Ok(b';'),
        other => {
            let mut chars = other.chars();
            let first = chars
                .next()
                .ok_or_else(|| "Delimiter cannot be empty".to_string())?;
            if chars.next().is_some() {
                return Err("Delimiter must be a single character".to_string());
            }
            if !first.is_ascii() {
                return Err("Delimiter must be ASCII".to_string());
            }
            Ok(first as u8)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_delimiter_accepts_names_and_characters() {
        assert_eq!(parse_delimiter("tab"), Ok(b'\t'));
        assert_eq!(parse_delimiter(";"), Ok(b';'));
        assert_eq!(parse_delimiter("#"), Ok(b'#'));
        assert!(parse_delimiter("").is_err());
        assert!(parse_delimiter("ab").is_err());
        assert!(parse_delimiter("→").is_err());
    }

    #[test]
    fn report_accepts_repeated_tabs() {
        let cli = Cli::try_parse_from([
            "ride-insights",
            "report",
            "-i",
            "rides.csv",
            "--tab",
            "rides",
            "-t",
            "people",
            "--format",
            "json",
        ])
        .expect("parse");
        let Commands::Report(args) = cli.command else {
            panic!("expected report");
        };
        assert_eq!(args.tabs, vec![Tab::Rides, Tab::People]);
        assert_eq!(args.format, OutputFormat::Json);
    }

    #[test]
    fn preview_rows_are_optional() {
        let cli = Cli::try_parse_from(["ride-insights", "preview", "-i", "rides.csv"]).expect("parse");
        let Commands::Preview(args) = cli.command else {
            panic!("expected preview");
        };
        assert_eq!(args.rows, None);
    }
}
