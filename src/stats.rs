//! Read-only aggregate queries over a cleaned table, plus the `stats`
//! command that profiles every numeric column.
//!
//! Each query returns `None` when the columns it reads are absent.

use std::collections::BTreeMap;

use anyhow::{Result, anyhow};
use chrono::NaiveDate;
use itertools::Itertools;
use log::info;
use serde::Serialize;

use crate::{
    cli::StatsArgs,
    columns::{DATE, HOUR, IS_CANCELLED},
    config::PipelineConfig,
    data::{format_number, mean, median},
    frame::{ColumnData, ColumnKind, Frame},
    io_utils,
    pipeline::{self, CleanedTable},
    table,
};

pub const HOURS_PER_DAY: usize = 24;

/// Number of distinct non-missing values.
pub fn distinct_count(frame: &Frame, column: &str) -> Option<usize> {
    let data = frame.column(column)?;
    Some(
        (0..frame.row_count())
            .filter_map(|row| data.display(row))
            .unique()
            .count(),
    )
}

pub fn column_sum(frame: &Frame, column: &str) -> Option<f64> {
    Some(frame.column(column)?.present_numbers().iter().sum())
}

pub fn column_mean(frame: &Frame, column: &str) -> Option<f64> {
    mean(&frame.column(column)?.present_numbers())
}

pub fn column_median(frame: &Frame, column: &str) -> Option<f64> {
    median(&frame.column(column)?.present_numbers())
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MissingCount {
    pub column: String,
    /// Missing cells before median imputation.
    pub missing: usize,
    /// Of those, how many the pipeline filled with the median.
    pub imputed: usize,
}

/// Per-column missing counts, largest first (ties keep column order), capped
/// at `top`. Imputed cells count as missing.
pub fn missing_counts(cleaned: &CleanedTable, top: usize) -> Vec<MissingCount> {
    cleaned
        .frame
        .columns()
        .iter()
        .map(|column| {
            let imputed = cleaned.imputed_count(&column.name);
            MissingCount {
                column: column.name.clone(),
                missing: column.data.missing_count() + imputed,
                imputed,
            }
        })
        .sorted_by(|a, b| b.missing.cmp(&a.missing))
        .take(top)
        .collect()
}

fn dates(frame: &Frame) -> Option<&[Option<NaiveDate>]> {
    match frame.column(DATE)? {
        ColumnData::Date(dates) => Some(dates),
        _ => None,
    }
}

pub fn date_range(frame: &Frame) -> Option<(NaiveDate, NaiveDate)> {
    let (min, max) = dates(frame)?.iter().flatten().minmax().into_option()?;
    Some((*min, *max))
}

/// Bookings per calendar date, ascending. Rows without a date are dropped.
pub fn daily_counts(frame: &Frame) -> Option<Vec<(NaiveDate, usize)>> {
    let mut counts: BTreeMap<NaiveDate, usize> = BTreeMap::new();
    for date in dates(frame)?.iter().flatten() {
        *counts.entry(*date).or_insert(0) += 1;
    }
    Some(counts.into_iter().collect())
}

/// Sum of `value_column` per calendar date, ascending.
pub fn daily_sums(frame: &Frame, value_column: &str) -> Option<Vec<(NaiveDate, f64)>> {
    let dates = dates(frame)?;
    let values = frame.column(value_column)?.coerce_numbers();
    let mut sums: BTreeMap<NaiveDate, f64> = BTreeMap::new();
    for (date, value) in dates.iter().zip(values) {
        if let Some(date) = date {
            *sums.entry(*date).or_insert(0.0) += value.unwrap_or(0.0);
        }
    }
    Some(sums.into_iter().collect())
}

/// Bookings per hour of day over the full 0–23 domain.
pub fn hourly_counts(frame: &Frame) -> Option<[usize; HOURS_PER_DAY]> {
    let hours = frame.column(HOUR)?.coerce_numbers();
    let mut counts = [0usize; HOURS_PER_DAY];
    for hour in hours.into_iter().flatten() {
        if (0.0..HOURS_PER_DAY as f64).contains(&hour) {
            counts[hour as usize] += 1;
        }
    }
    Some(counts)
}

/// The `n` busiest hours, busiest first (ties: earlier hour first).
pub fn peak_hours(counts: &[usize; HOURS_PER_DAY], n: usize) -> Vec<(usize, usize)> {
    counts
        .iter()
        .copied()
        .enumerate()
        .sorted_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)))
        .take(n)
        .collect()
}

/// Share of rows flagged `Is_Cancelled`, in percent.
pub fn cancellation_rate(frame: &Frame) -> Option<f64> {
    match frame.column(IS_CANCELLED)? {
        ColumnData::Boolean(flags) if !flags.is_empty() => {
            Some(flags.iter().filter(|f| **f).count() as f64 / flags.len() as f64 * 100.0)
        }
        _ => None,
    }
}

/// Text-based truthiness for "cancelled by" columns: present values count as
/// a cancellation unless they are one of the configured "not cancelled"
/// tokens (compared trimmed and lower-cased).
pub fn is_cancellation_marker(value: Option<&str>, config: &PipelineConfig) -> bool {
    match value {
        Some(raw) => !config.is_not_cancelled_token(&raw.trim().to_lowercase()),
        None => false,
    }
}

/// Share of all rows whose `column` value is a cancellation marker, in
/// percent.
pub fn actor_cancellation_rate(frame: &Frame, column: &str, config: &PipelineConfig) -> Option<f64> {
    let data = frame.column(column)?;
    if frame.row_count() == 0 {
        return None;
    }
    let cancelled = (0..frame.row_count())
        .filter(|row| is_cancellation_marker(data.display(*row).as_deref(), config))
        .count();
    Some(cancelled as f64 / frame.row_count() as f64 * 100.0)
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Spread {
    pub mean: f64,
    pub median: f64,
}

pub fn spread(frame: &Frame, column: &str) -> Option<Spread> {
    let values = frame.column(column)?.present_numbers();
    Some(Spread {
        mean: mean(&values)?,
        median: median(&values)?,
    })
}

/// Median of `value_column` per `group_column` value, highest first.
pub fn median_by_group(frame: &Frame, group_column: &str, value_column: &str) -> Option<Vec<(String, f64)>> {
    let groups = frame.column(group_column)?;
    let values = frame.column(value_column)?.coerce_numbers();
    let mut buckets: BTreeMap<String, Vec<f64>> = BTreeMap::new();
    for (row, value) in values.into_iter().enumerate() {
        if let (Some(group), Some(value)) = (groups.display(row), value) {
            buckets.entry(group).or_default().push(value);
        }
    }
    Some(
        buckets
            .into_iter()
            .filter_map(|(group, values)| median(&values).map(|m| (group, m)))
            .sorted_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(&b.0)))
            .collect(),
    )
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistogramBin {
    pub lower: f64,
    pub upper: f64,
    pub count: usize,
}

/// Equal-width histogram over `[min, max]`; the last bin is closed.
pub fn histogram(values: &[f64], bins: usize) -> Vec<HistogramBin> {
    let Some((min, max)) = values.iter().copied().minmax_by(f64::total_cmp).into_option() else {
        return Vec::new();
    };
    if bins == 0 {
        return Vec::new();
    }
    if min == max {
        return vec![HistogramBin {
            lower: min,
            upper: max,
            count: values.len(),
        }];
    }
    let width = (max - min) / bins as f64;
    let mut counts = vec![0usize; bins];
    for value in values {
        let idx = (((value - min) / width) as usize).min(bins - 1);
        counts[idx] += 1;
    }
    counts
        .into_iter()
        .enumerate()
        .map(|(idx, count)| HistogramBin {
            lower: min + width * idx as f64,
            upper: min + width * (idx + 1) as f64,
            count,
        })
        .collect()
}

pub fn execute(args: &StatsArgs) -> Result<()> {
    let delimiter = io_utils::resolve_input_delimiter(&args.input, args.delimiter);
    let config = PipelineConfig::resolve(args.config.as_deref())?;
    let cleaned = pipeline::load_and_clean(&args.input, delimiter, &config)?;
    let summaries = summary_statistics(&cleaned.frame);
    if summaries.is_empty() {
        return Err(anyhow!("No numeric columns available in {:?}", args.input));
    }
    let rows = summaries.iter().map(ColumnSummary::render_row).collect::<Vec<_>>();
    let headers = ["column", "count", "min", "max", "mean", "median", "std_dev"];
    table::print_table(&headers, &rows);
    info!("Computed summary statistics for {} column(s)", rows.len());
    Ok(())
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnSummary {
    pub column: String,
    pub count: usize,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub mean: Option<f64>,
    pub median: Option<f64>,
    pub std_dev: Option<f64>,
}

impl ColumnSummary {
    fn render_row(&self) -> Vec<String> {
        let metric = |value: Option<f64>| value.map(format_metric).unwrap_or_default();
        vec![
            self.column.clone(),
            self.count.to_string(),
            metric(self.min),
            metric(self.max),
            metric(self.mean),
            metric(self.median),
            metric(self.std_dev),
        ]
    }
}

/// Summary statistics for every numeric column, in column order.
pub fn summary_statistics(frame: &Frame) -> Vec<ColumnSummary> {
    frame
        .columns()
        .iter()
        .filter(|column| matches!(column.data.kind(), ColumnKind::Number | ColumnKind::Integer | ColumnKind::Text))
        .filter_map(|column| {
            let values = column.data.as_numbers()?;
            let mut stats = ColumnStats::default();
            for value in values.into_iter().flatten() {
                stats.add_value(value);
            }
            Some(stats.summary(&column.name))
        })
        .collect()
}

#[derive(Debug, Default)]
struct ColumnStats {
    values: Vec<f64>,
    sum: f64,
    sum_squares: f64,
    min: Option<f64>,
    max: Option<f64>,
}

impl ColumnStats {
    fn add_value(&mut self, value: f64) {
        self.sum += value;
        self.sum_squares += value * value;
        self.min = Some(self.min.map_or(value, |current| current.min(value)));
        self.max = Some(self.max.map_or(value, |current| current.max(value)));
        self.values.push(value);
    }

    fn count(&self) -> usize {
        self.values.len()
    }

    fn mean(&self) -> Option<f64> {
        (self.count() > 0).then(|| self.sum / self.count() as f64)
    }

    fn std_dev(&self) -> Option<f64> {
        if self.count() < 2 {
            return None;
        }
        let mean = self.mean()?;
        let n = self.count() as f64;
        let variance = (self.sum_squares - n * mean * mean) / (n - 1.0);
        Some(variance.max(0.0).sqrt())
    }

    fn summary(&self, column: &str) -> ColumnSummary {
        ColumnSummary {
            column: column.to_string(),
            count: self.count(),
            min: self.min,
            max: self.max,
            mean: self.mean(),
            median: median(&self.values),
            std_dev: self.std_dev(),
        }
    }
}

fn format_metric(value: f64) -> String {
    if value.fract() == 0.0 {
        format_number(value)
    } else {
        format!("{value:.4}")
    }
}
