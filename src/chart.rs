//! Text charts: horizontal bars, sparklines, and histograms.

use std::fmt::Write as _;

const BAR_CHAR: char = '█';
const SPARK_LEVELS: &[char] = &['▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];
pub const NO_DATA: &str = "No data to plot.";

/// One bar per `(label, value)`, scaled so the largest value spans `width`
/// cells. Labels are left-padded to a common width.
pub fn bar_chart(title: &str, items: &[(String, f64)], width: usize) -> String {
    let mut output = String::new();
    let _ = writeln!(output, "{title}");
    if items.is_empty() {
        let _ = writeln!(output, "  {NO_DATA}");
        return output;
    }
    let label_width = items.iter().map(|(label, _)| label.chars().count()).max().unwrap_or(0);
    let max = items.iter().map(|(_, v)| *v).fold(0.0_f64, f64::max);
    for (label, value) in items {
        let cells = if max > 0.0 {
            ((value / max) * width as f64).round() as usize
        } else {
            0
        };
        let pad = label_width - label.chars().count();
        let _ = writeln!(
            output,
            "  {label}{}  {} {}",
            " ".repeat(pad),
            BAR_CHAR.to_string().repeat(cells),
            crate::data::format_number(*value)
        );
    }
    output
}

/// Eight-level sparkline of `values`, scaled between their min and max.
pub fn sparkline(values: &[f64]) -> String {
    if values.is_empty() {
        return String::new();
    }
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let span = max - min;
    values
        .iter()
        .map(|value| {
            if span <= 0.0 {
                SPARK_LEVELS[SPARK_LEVELS.len() / 2]
            } else {
                let level = ((value - min) / span * (SPARK_LEVELS.len() - 1) as f64).round() as usize;
                SPARK_LEVELS[level.min(SPARK_LEVELS.len() - 1)]
            }
        })
        .collect()
}

/// A titled series: sparkline plus its first/last labels and extremes.
pub fn line_chart(title: &str, labels: &[String], values: &[f64]) -> String {
    let mut output = String::new();
    let _ = writeln!(output, "{title}");
    if values.is_empty() {
        let _ = writeln!(output, "  {NO_DATA}");
        return output;
    }
    let _ = writeln!(output, "  {}", sparkline(values));
    if let (Some(first), Some(last)) = (labels.first(), labels.last()) {
        let _ = writeln!(output, "  {first} .. {last}");
    }
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let _ = writeln!(
        output,
        "  min {}  max {}",
        crate::data::format_number(min),
        crate::data::format_number(max)
    );
    output
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sparkline_spans_lowest_to_highest_level() {
        assert_eq!(sparkline(&[0.0, 7.0]), "▁█");
        assert_eq!(sparkline(&[3.0, 3.0]), "▅▅");
        assert_eq!(sparkline(&[]), "");
    }

    #[test]
    fn bar_chart_scales_to_width() {
        let chart = bar_chart(
            "Vehicle Type",
            &[("Auto".to_string(), 4.0), ("Bike".to_string(), 2.0)],
            8,
        );
        let lines = chart.lines().collect::<Vec<_>>();
        assert_eq!(lines[0], "Vehicle Type");
        assert_eq!(lines[1], "  Auto  ████████ 4");
        assert_eq!(lines[2], "  Bike  ████ 2");
    }

    #[test]
    fn empty_chart_reports_no_data() {
        assert!(bar_chart("x", &[], 10).contains(NO_DATA));
        assert!(line_chart("x", &[], &[]).contains(NO_DATA));
    }
}
