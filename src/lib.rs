pub mod cache;
pub mod chart;
pub mod clean;
pub mod cli;
pub mod columns;
pub mod config;
pub mod correlation;
pub mod dashboard;
pub mod data;
pub mod error;
pub mod frame;
pub mod frequency;
pub mod io_utils;
pub mod pipeline;
pub mod preview;
pub mod session;
pub mod stats;
pub mod table;

use std::{env, sync::OnceLock};

use anyhow::Result;
use clap::Parser;
use log::{LevelFilter, debug};

use crate::cli::{Cli, Commands};

pub use crate::{
    cache::IngestCache,
    config::PipelineConfig,
    error::IngestError,
    frame::{ColumnData, Frame},
    pipeline::CleanedTable,
};

static LOGGER: OnceLock<()> = OnceLock::new();

fn init_logging() {
    LOGGER.get_or_init(|| {
        let mut builder = env_logger::Builder::from_env(env_logger::Env::default());
        if env::var("RUST_LOG").is_err() {
            builder.filter_module("ride_insights", LevelFilter::Info);
        }
        let _ = builder.format_timestamp_millis().try_init();
    });
}

pub fn run() -> Result<()> {
    init_logging();
    let cli = Cli::parse();
    debug!("Parsed command: {:?}", cli.command);
    match cli.command {
        Commands::Clean(args) => clean::execute(&args),
        Commands::Report(args) => dashboard::execute(&args),
        Commands::Preview(args) => preview::execute(&args),
        Commands::Stats(args) => stats::execute(&args),
        Commands::Correlate(args) => correlation::execute(&args),
        Commands::Dashboard(args) => session::execute(&args),
    }
}
