use anyhow::Result;
use log::info;

use crate::{cli::PreviewArgs, config::PipelineConfig, io_utils, pipeline, table};

pub fn execute(args: &PreviewArgs) -> Result<()> {
    let delimiter = io_utils::resolve_input_delimiter(&args.input, args.delimiter);
    let config = PipelineConfig::resolve(args.config.as_deref())?;
    let cleaned = pipeline::load_and_clean(&args.input, delimiter, &config)?;
    let names = cleaned.frame.column_names();
    let headers = names.iter().map(String::as_str).collect::<Vec<_>>();
    let rows = cleaned.frame.head(args.rows.unwrap_or(config.preview_rows));

    table::print_table(&headers, &rows);
    info!("Displayed {} cleaned row(s) from {:?}", rows.len(), args.input);
    Ok(())
}
