//! Cleaning and feature derivation.
//!
//! [`clean`] runs one linear pass over a raw [`Frame`]. Each step checks for
//! the columns it reads and is skipped when they are absent, so the pass never
//! fails. Per-cell parse failures become missing cells.
//!
//! Missing values in the imputed numeric columns are silently replaced with
//! the column median. Reports that need the original missingness read it from
//! [`CleanedTable::imputations`].

use std::path::Path;

use anyhow::{Context, Result};
use log::{debug, info};
use serde::Serialize;

use crate::{
    columns::{
        BOOKING_STATUS, DATE, DAY, DAY_OF_WEEK, DROP_LOCATION, HOUR, IS_CANCELLED, IS_COMPLETED,
        IS_INCOMPLETE, MONTH, PICKUP_LOCATION, ROUTE, ROUTE_SEPARATOR, STATUS_CANCELED_VARIANT,
        STATUS_CANCELLED, STATUS_COMPLETED, STATUS_INCOMPLETE, TIME, UNKNOWN_ENDPOINT,
    },
    config::PipelineConfig,
    data::{self, extract_leading_hour, parse_naive_date, parse_time_hour, title_case, weekday_name},
    frame::{ColumnData, Frame},
    io_utils,
};

/// Cells filled in one column by median imputation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImputationRecord {
    pub column: String,
    pub filled: usize,
    pub median: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HourSource {
    /// Parsed as a time of day.
    ClockTime,
    /// Every value failed to parse; hours came from leading digits.
    LeadingDigits,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CleanedTable {
    pub frame: Frame,
    pub imputations: Vec<ImputationRecord>,
    pub hour_source: Option<HourSource>,
}

impl CleanedTable {
    pub fn imputed_count(&self, column: &str) -> usize {
        self.imputations
            .iter()
            .find(|record| record.column == column)
            .map_or(0, |record| record.filled)
    }
}

pub fn clean(raw: Frame, config: &PipelineConfig) -> CleanedTable {
    let mut frame = raw;
    trim_column_names(&mut frame);
    apply_aliases(&mut frame, config);
    parse_dates(&mut frame);
    let hour_source = derive_hour(&mut frame);
    coerce_numeric(&mut frame, config);
    let imputations = impute_medians(&mut frame, config);
    derive_calendar_fields(&mut frame);
    derive_route(&mut frame);
    normalize_status(&mut frame);
    CleanedTable {
        frame,
        imputations,
        hour_source,
    }
}

/// Reads, decodes, and cleans the file at `path`.
pub fn load_and_clean(path: &Path, delimiter: u8, config: &PipelineConfig) -> Result<CleanedTable> {
    let bytes = io_utils::read_input_bytes(path)?;
    let raw = io_utils::ingest_bytes(&bytes, delimiter)
        .with_context(|| format!("Ingesting {path:?}"))?;
    info!(
        "Loaded {} row(s) x {} column(s) from {:?}",
        raw.row_count(),
        raw.column_count(),
        path
    );
    Ok(clean(raw, config))
}

fn trim_column_names(frame: &mut Frame) {
    frame.map_column_names(|name| name.trim().to_string());
}

fn apply_aliases(frame: &mut Frame, config: &PipelineConfig) {
    for (alias, canonical) in config.alias_table() {
        if frame.has_column(&alias) && !frame.has_column(&canonical) {
            debug!("Renaming column '{alias}' to '{canonical}'");
            frame.rename_column(&alias, &canonical);
        }
    }
}

fn parse_dates(frame: &mut Frame) {
    let parsed = match frame.column(DATE) {
        Some(ColumnData::Date(_)) => return,
        Some(data) => data
            .to_text()
            .iter()
            .map(|cell| cell.as_deref().and_then(parse_naive_date))
            .collect(),
        None => {
            debug!("No '{DATE}' column; skipping date parsing");
            return;
        }
    };
    frame.set_column(DATE, ColumnData::Date(parsed));
}

fn derive_hour(frame: &mut Frame) -> Option<HourSource> {
    let Some(times) = frame.column(TIME).map(ColumnData::to_text) else {
        debug!("No '{TIME}' column; skipping hour derivation");
        return None;
    };
    let clock: Vec<Option<i64>> = times
        .iter()
        .map(|cell| cell.as_deref().and_then(parse_time_hour).map(i64::from))
        .collect();
    let (hours, source) = if clock.iter().any(Option::is_some) {
        (clock, HourSource::ClockTime)
    } else {
        let fallback = times
            .iter()
            .map(|cell| cell.as_deref().and_then(extract_leading_hour).map(i64::from))
            .collect();
        debug!("No '{TIME}' value parsed as a clock time; using leading digits");
        (fallback, HourSource::LeadingDigits)
    };
    frame.set_column(HOUR, ColumnData::Integer(hours));
    Some(source)
}

fn coerce_numeric(frame: &mut Frame, config: &PipelineConfig) {
    for name in &config.numeric_columns {
        let coerced = match frame.column(name) {
            Some(ColumnData::Number(_)) => continue,
            Some(data) => data.coerce_numbers(),
            None => continue,
        };
        frame.set_column(name, ColumnData::Number(coerced));
    }
}

fn impute_medians(frame: &mut Frame, config: &PipelineConfig) -> Vec<ImputationRecord> {
    let mut records = Vec::new();
    for name in &config.impute_columns {
        let mut values = match frame.column(name) {
            Some(data) => data.coerce_numbers(),
            None => continue,
        };
        let present: Vec<f64> = values.iter().flatten().copied().collect();
        let Some(median) = data::median(&present) else {
            debug!("Column '{name}' has no numeric values; nothing to impute");
            continue;
        };
        let mut filled = 0usize;
        for cell in values.iter_mut().filter(|cell| cell.is_none()) {
            *cell = Some(median);
            filled += 1;
        }
        if filled > 0 {
            debug!("Filled {filled} missing value(s) in '{name}' with median {median}");
        }
        frame.set_column(name, ColumnData::Number(values));
        records.push(ImputationRecord {
            column: name.clone(),
            filled,
            median,
        });
    }
    records
}

fn derive_calendar_fields(frame: &mut Frame) {
    let Some(ColumnData::Date(dates)) = frame.column(DATE) else {
        return;
    };
    let dates = dates.clone();
    let weekdays = dates
        .iter()
        .map(|d| d.map(|d| weekday_name(d).to_string()))
        .collect();
    let months = dates
        .iter()
        .map(|d| d.map(|d| d.format("%Y-%m").to_string()))
        .collect();
    frame.set_column(DAY, ColumnData::Date(dates));
    frame.set_column(DAY_OF_WEEK, ColumnData::Text(weekdays));
    frame.set_column(MONTH, ColumnData::Text(months));
}

fn derive_route(frame: &mut Frame) {
    let (Some(pickup), Some(dropoff)) = (frame.column(PICKUP_LOCATION), frame.column(DROP_LOCATION))
    else {
        debug!("Pickup or drop location missing; skipping route derivation");
        return;
    };
    let routes = pickup
        .to_text()
        .into_iter()
        .zip(dropoff.to_text())
        .map(|(from, to)| {
            Some(format!(
                "{}{ROUTE_SEPARATOR}{}",
                from.as_deref().unwrap_or(UNKNOWN_ENDPOINT),
                to.as_deref().unwrap_or(UNKNOWN_ENDPOINT)
            ))
        })
        .collect();
    frame.set_column(ROUTE, ColumnData::Text(routes));
}

pub fn normalize_status_value(raw: &str) -> String {
    let titled = title_case(raw);
    if titled == STATUS_CANCELED_VARIANT {
        STATUS_CANCELLED.to_string()
    } else {
        titled
    }
}

fn normalize_status(frame: &mut Frame) {
    let Some(statuses) = frame.column(BOOKING_STATUS).map(ColumnData::to_text) else {
        debug!("No '{BOOKING_STATUS}' column; skipping status flags");
        return;
    };
    let statuses: Vec<Option<String>> = statuses
        .into_iter()
        .map(|cell| cell.map(|s| normalize_status_value(&s)))
        .collect();
    let flag = |target: &str| -> ColumnData {
        ColumnData::Boolean(statuses.iter().map(|s| s.as_deref() == Some(target)).collect())
    };
    let completed = flag(STATUS_COMPLETED);
    let cancelled = flag(STATUS_CANCELLED);
    let incomplete = flag(STATUS_INCOMPLETE);
    frame.set_column(BOOKING_STATUS, ColumnData::Text(statuses));
    frame.set_column(IS_COMPLETED, completed);
    frame.set_column(IS_CANCELLED, cancelled);
    frame.set_column(IS_INCOMPLETE, incomplete);
}
