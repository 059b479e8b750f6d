//! Pairwise Pearson correlation over the numeric columns of a cleaned table.

use anyhow::Result;
use log::info;
use serde::Serialize;

use crate::{
    cli::{CorrelateArgs, OutputFormat},
    config::PipelineConfig,
    frame::Frame,
    io_utils, pipeline, table,
};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CorrelationMatrix {
    pub columns: Vec<String>,
    /// Row-major; `None` where fewer than two complete pairs exist or a side
    /// has zero variance.
    pub values: Vec<Vec<Option<f64>>>,
}

impl CorrelationMatrix {
    pub fn get(&self, left: &str, right: &str) -> Option<f64> {
        let row = self.columns.iter().position(|c| c == left)?;
        let col = self.columns.iter().position(|c| c == right)?;
        self.values[row][col]
    }

    pub fn render_rows(&self) -> Vec<Vec<String>> {
        self.columns
            .iter()
            .zip(&self.values)
            .map(|(name, row)| {
                std::iter::once(name.clone())
                    .chain(row.iter().map(|v| v.map(|v| format!("{v:.2}")).unwrap_or_default()))
                    .collect()
            })
            .collect()
    }
}

pub fn correlation_matrix(frame: &Frame) -> CorrelationMatrix {
    let numeric: Vec<(String, Vec<Option<f64>>)> = frame
        .columns()
        .iter()
        .filter_map(|column| Some((column.name.clone(), column.data.as_numbers()?)))
        .collect();
    let values = numeric
        .iter()
        .map(|(_, left)| numeric.iter().map(|(_, right)| pearson(left, right)).collect())
        .collect();
    CorrelationMatrix {
        columns: numeric.into_iter().map(|(name, _)| name).collect(),
        values,
    }
}

/// Pearson coefficient over rows where both sides are present.
pub fn pearson(left: &[Option<f64>], right: &[Option<f64>]) -> Option<f64> {
    let pairs: Vec<(f64, f64)> = left
        .iter()
        .zip(right)
        .filter_map(|(l, r)| Some(((*l)?, (*r)?)))
        .collect();
    if pairs.len() < 2 {
        return None;
    }
    let n = pairs.len() as f64;
    let mean_l = pairs.iter().map(|(l, _)| l).sum::<f64>() / n;
    let mean_r = pairs.iter().map(|(_, r)| r).sum::<f64>() / n;
    let (mut cov, mut var_l, mut var_r) = (0.0, 0.0, 0.0);
    for (l, r) in &pairs {
        let dl = l - mean_l;
        let dr = r - mean_r;
        cov += dl * dr;
        var_l += dl * dl;
        var_r += dr * dr;
    }
    if var_l == 0.0 || var_r == 0.0 {
        return None;
    }
    Some((cov / (var_l.sqrt() * var_r.sqrt())).clamp(-1.0, 1.0))
}

pub fn execute(args: &CorrelateArgs) -> Result<()> {
    let delimiter = io_utils::resolve_input_delimiter(&args.input, args.delimiter);
    let config = PipelineConfig::resolve(args.config.as_deref())?;
    let cleaned = pipeline::load_and_clean(&args.input, delimiter, &config)?;
    let matrix = correlation_matrix(&cleaned.frame);
    match args.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&matrix)?),
        OutputFormat::Text => print!("{}", render_text(&matrix)),
    }
    info!("Correlated {} numeric column(s)", matrix.columns.len());
    Ok(())
}

pub fn render_text(matrix: &CorrelationMatrix) -> String {
    if matrix.columns.is_empty() {
        return "No numeric columns to correlate.\n".to_string();
    }
    let mut headers = vec![String::new()];
    headers.extend(matrix.columns.iter().cloned());
    let headers = headers.iter().map(String::as_str).collect::<Vec<_>>();
    table::render_table(&headers, &matrix.render_rows())
}
