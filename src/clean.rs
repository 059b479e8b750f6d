use anyhow::Result;
use log::info;

use crate::{cli::CleanArgs, config::PipelineConfig, io_utils, pipeline};

pub fn execute(args: &CleanArgs) -> Result<()> {
    let input_delimiter = io_utils::resolve_input_delimiter(&args.input, args.delimiter);
    let config = PipelineConfig::resolve(args.config.as_deref())?;
    let cleaned = pipeline::load_and_clean(&args.input, input_delimiter, &config)?;

    let output_delimiter = io_utils::resolve_output_delimiter(
        args.output.as_deref(),
        args.output_delimiter,
        input_delimiter,
    );
    let mut writer = io_utils::open_csv_writer(args.output.as_deref(), output_delimiter)?;
    io_utils::write_frame(&mut writer, &cleaned.frame)?;

    let destination = args
        .output
        .as_ref()
        .map(|path| path.display().to_string())
        .unwrap_or_else(|| "stdout".to_string());
    let imputed: usize = cleaned.imputations.iter().map(|record| record.filled).sum();
    info!(
        "Wrote {} row(s) x {} column(s) ({} imputed cell(s)) -> {}",
        cleaned.frame.row_count(),
        cleaned.frame.column_count(),
        imputed,
        destination
    );
    Ok(())
}
