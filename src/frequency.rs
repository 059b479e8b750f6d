use std::collections::HashMap;

use serde::Serialize;

use crate::frame::Frame;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FrequencyRow {
    pub value: String,
    pub count: usize,
    /// Share of the non-missing cells, in percent.
    pub percent: f64,
}

/// Counts of distinct non-missing values in `column`, most frequent first
/// (ties by value), truncated to `top` entries when `top > 0`. `None` when the
/// column is absent.
pub fn value_counts(frame: &Frame, column: &str, top: usize) -> Option<Vec<FrequencyRow>> {
    let data = frame.column(column)?;
    let mut accumulator = FrequencyAccumulator::default();
    for row in 0..frame.row_count() {
        if let Some(value) = data.display(row) {
            accumulator.ingest(value);
        }
    }
    Some(accumulator.into_rows(top))
}

#[derive(Debug, Default)]
struct FrequencyAccumulator {
    total: usize,
    counts: HashMap<String, usize>,
}

impl FrequencyAccumulator {
    fn ingest(&mut self, value: String) {
        self.total += 1;
        *self.counts.entry(value).or_insert(0) += 1;
    }

    fn into_rows(self, top: usize) -> Vec<FrequencyRow> {
        if self.total == 0 {
            return Vec::new();
        }
        let total = self.total;
        let mut items = self.counts.into_iter().collect::<Vec<_>>();
        items.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        if top > 0 && items.len() > top {
            items.truncate(top);
        }
        items
            .into_iter()
            .map(|(value, count)| FrequencyRow {
                value,
                count,
                percent: (count as f64 / total as f64) * 100.0,
            })
            .collect()
    }
}

/// Table rows (`value`, `count`, `percent`) for terminal rendering.
pub fn render_rows(rows: &[FrequencyRow]) -> Vec<Vec<String>> {
    rows.iter()
        .map(|row| {
            vec![
                row.value.clone(),
                row.count.to_string(),
                format!("{:.2}%", row.percent),
            ]
        })
        .collect()
}
