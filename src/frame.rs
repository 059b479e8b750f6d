//! In-memory columnar table.
//!
//! A [`Frame`] is an ordered list of named, equal-length columns. Each column
//! stores one cell type; `None` marks a missing cell. Ingestion produces
//! all-text frames, the pipeline swaps columns for typed ones in place.

use chrono::NaiveDate;

use crate::data::{format_number, parse_number};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Text,
    Number,
    Integer,
    Date,
    Boolean,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ColumnData {
    Text(Vec<Option<String>>),
    Number(Vec<Option<f64>>),
    Integer(Vec<Option<i64>>),
    Date(Vec<Option<NaiveDate>>),
    Boolean(Vec<bool>),
}

impl ColumnData {
    pub fn len(&self) -> usize {
        match self {
            ColumnData::Text(cells) => cells.len(),
            ColumnData::Number(cells) => cells.len(),
            ColumnData::Integer(cells) => cells.len(),
            ColumnData::Date(cells) => cells.len(),
            ColumnData::Boolean(cells) => cells.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn kind(&self) -> ColumnKind {
        match self {
            ColumnData::Text(_) => ColumnKind::Text,
            ColumnData::Number(_) => ColumnKind::Number,
            ColumnData::Integer(_) => ColumnKind::Integer,
            ColumnData::Date(_) => ColumnKind::Date,
            ColumnData::Boolean(_) => ColumnKind::Boolean,
        }
    }

    pub fn is_missing(&self, row: usize) -> bool {
        match self {
            ColumnData::Text(cells) => matches!(cells.get(row), Some(None)),
            ColumnData::Number(cells) => matches!(cells.get(row), Some(None)),
            ColumnData::Integer(cells) => matches!(cells.get(row), Some(None)),
            ColumnData::Date(cells) => matches!(cells.get(row), Some(None)),
            ColumnData::Boolean(_) => false,
        }
    }

    pub fn missing_count(&self) -> usize {
        (0..self.len()).filter(|row| self.is_missing(*row)).count()
    }

    /// Text form of a cell, `None` when missing.
    pub fn display(&self, row: usize) -> Option<String> {
        match self {
            ColumnData::Text(cells) => cells.get(row)?.clone(),
            ColumnData::Number(cells) => cells.get(row)?.map(format_number),
            ColumnData::Integer(cells) => cells.get(row)?.map(|v| v.to_string()),
            ColumnData::Date(cells) => cells.get(row)?.map(|d| d.format("%Y-%m-%d").to_string()),
            ColumnData::Boolean(cells) => cells
                .get(row)
                .map(|b| if *b { "True" } else { "False" }.to_string()),
        }
    }

    /// Every cell rendered as text.
    pub fn to_text(&self) -> Vec<Option<String>> {
        match self {
            ColumnData::Text(cells) => cells.clone(),
            _ => (0..self.len()).map(|row| self.display(row)).collect(),
        }
    }

    /// Numeric view that requires every present cell to be numeric. Text
    /// columns qualify only when each non-missing value parses.
    pub fn as_numbers(&self) -> Option<Vec<Option<f64>>> {
        match self {
            ColumnData::Number(cells) => Some(cells.clone()),
            ColumnData::Integer(cells) => Some(cells.iter().map(|v| v.map(|v| v as f64)).collect()),
            ColumnData::Text(cells) => {
                let mut parsed = Vec::with_capacity(cells.len());
                let mut any_present = false;
                for cell in cells {
                    match cell {
                        Some(raw) => {
                            parsed.push(Some(parse_number(raw)?));
                            any_present = true;
                        }
                        None => parsed.push(None),
                    }
                }
                any_present.then_some(parsed)
            }
            ColumnData::Date(_) | ColumnData::Boolean(_) => None,
        }
    }

    /// Numeric view where unparsable cells become missing.
    pub fn coerce_numbers(&self) -> Vec<Option<f64>> {
        match self {
            ColumnData::Number(cells) => cells.clone(),
            ColumnData::Integer(cells) => cells.iter().map(|v| v.map(|v| v as f64)).collect(),
            ColumnData::Text(cells) => cells
                .iter()
                .map(|cell| cell.as_deref().and_then(parse_number))
                .collect(),
            ColumnData::Boolean(cells) => cells
                .iter()
                .map(|b| Some(if *b { 1.0 } else { 0.0 }))
                .collect(),
            ColumnData::Date(cells) => vec![None; cells.len()],
        }
    }

    /// Present numeric values, missing cells dropped.
    pub fn present_numbers(&self) -> Vec<f64> {
        self.coerce_numbers().into_iter().flatten().collect()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub data: ColumnData,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Frame {
    columns: Vec<Column>,
    row_count: usize,
}

impl Frame {
    pub fn new(row_count: usize) -> Self {
        Self {
            columns: Vec::new(),
            row_count,
        }
    }

    /// Builds a frame from text columns. Columns shorter than the longest one
    /// are padded with missing cells.
    pub fn from_text_columns(columns: Vec<(String, Vec<Option<String>>)>) -> Self {
        let row_count = columns.iter().map(|(_, cells)| cells.len()).max().unwrap_or(0);
        let columns = columns
            .into_iter()
            .map(|(name, mut cells)| {
                cells.resize(row_count, None);
                Column {
                    name,
                    data: ColumnData::Text(cells),
                }
            })
            .collect();
        Self { columns, row_count }
    }

    pub fn row_count(&self) -> usize {
        self.row_count
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column_names(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.name.clone()).collect()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    pub fn has_columns(&self, names: &[&str]) -> bool {
        names.iter().all(|name| self.has_column(name))
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == name)
    }

    pub fn column(&self, name: &str) -> Option<&ColumnData> {
        self.columns.iter().find(|c| c.name == name).map(|c| &c.data)
    }

    /// Replaces the named column in place, or appends it when absent.
    pub fn set_column(&mut self, name: &str, data: ColumnData) {
        debug_assert_eq!(data.len(), self.row_count, "column '{name}' length");
        match self.position(name) {
            Some(idx) => self.columns[idx].data = data,
            None => self.columns.push(Column {
                name: name.to_string(),
                data,
            }),
        }
    }

    pub fn rename_column(&mut self, from: &str, to: &str) -> bool {
        match self.position(from) {
            Some(idx) => {
                self.columns[idx].name = to.to_string();
                true
            }
            None => false,
        }
    }

    /// Applies `rename` to every column name.
    pub fn map_column_names<F>(&mut self, mut rename: F)
    where
        F: FnMut(&str) -> String,
    {
        for column in &mut self.columns {
            column.name = rename(&column.name);
        }
    }

    pub fn row_display(&self, row: usize) -> Vec<String> {
        self.columns
            .iter()
            .map(|c| c.data.display(row).unwrap_or_default())
            .collect()
    }

    /// First `rows` rows rendered as text, missing cells empty.
    pub fn head(&self, rows: usize) -> Vec<Vec<String>> {
        (0..rows.min(self.row_count))
            .map(|row| self.row_display(row))
            .collect()
    }
}
