//! The five dashboard tabs.
//!
//! Each tab is built as a serializable report model from the read-only
//! queries, then rendered either as terminal text or as JSON. Missing source
//! columns show up as `None` fields in the model and as an informational line
//! in the text rendering.

use std::fmt::Write as _;

use anyhow::Result;
use chrono::NaiveDate;
use clap::ValueEnum;
use log::info;
use serde::Serialize;

use crate::{
    chart,
    cli::{OutputFormat, ReportArgs},
    columns::{
        BOOKING_ID, BOOKING_STATUS, BOOKING_VALUE, CANCELLED_BY_CUSTOMER, CANCELLED_BY_DRIVER,
        CUSTOMER_CANCEL_REASON, CUSTOMER_ID, DAY_OF_WEEK, DRIVER_CANCEL_REASON, DRIVER_ID,
        PAYMENT_METHOD, RIDE_DISTANCE, ROUTE, VALUE_PER_KM, VEHICLE_TYPE,
    },
    config::PipelineConfig,
    data::{format_fixed, format_number, format_thousands},
    frequency::{self, FrequencyRow},
    io_utils,
    pipeline::{self, CleanedTable, HourSource, ImputationRecord},
    stats::{self, HistogramBin, MissingCount, Spread},
    table,
};

const BAR_WIDTH: usize = 40;
const HISTOGRAM_BINS: usize = 30;
const PEAK_HOUR_COUNT: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum, Serialize)]
#[value(rename_all = "kebab-case")]
#[serde(rename_all = "snake_case")]
pub enum Tab {
    Overview,
    Rides,
    Cancellations,
    Revenue,
    People,
}

impl Tab {
    pub const ALL: [Tab; 5] = [
        Tab::Overview,
        Tab::Rides,
        Tab::Cancellations,
        Tab::Revenue,
        Tab::People,
    ];

    pub fn title(self) -> &'static str {
        match self {
            Tab::Overview => "Overview",
            Tab::Rides => "Rides Overview",
            Tab::Cancellations => "Cancellations Analysis",
            Tab::Revenue => "Revenue & Payment Insights",
            Tab::People => "Top Drivers & Customers (Activity)",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyPoint<T> {
    pub date: NaiveDate,
    pub value: T,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct HourCount {
    pub hour: usize,
    pub bookings: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupMedian {
    pub group: String,
    pub median: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OverviewReport {
    pub rows: usize,
    pub columns: usize,
    pub unique_customers: Option<usize>,
    pub unique_bookings: Option<usize>,
    pub total_revenue: Option<f64>,
    pub average_booking_value: Option<f64>,
    pub date_range: Option<DateRange>,
    pub preview_columns: Vec<String>,
    pub preview: Vec<Vec<String>>,
    pub missing: Vec<MissingCount>,
    pub imputations: Vec<ImputationRecord>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RidesReport {
    pub status_distribution: Option<Vec<FrequencyRow>>,
    pub daily_rides: Option<Vec<DailyPoint<usize>>>,
    pub hourly: Option<Vec<HourCount>>,
    pub hour_source: Option<HourSource>,
    pub peak_hours: Vec<HourCount>,
    pub weekday_distribution: Option<Vec<FrequencyRow>>,
    pub vehicle_types: Option<Vec<FrequencyRow>>,
    pub top_routes: Option<Vec<FrequencyRow>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CancellationsReport {
    pub overall_rate: Option<f64>,
    pub customer_rate: Option<f64>,
    pub driver_rate: Option<f64>,
    pub customer_reasons: Option<Vec<FrequencyRow>>,
    pub driver_reasons: Option<Vec<FrequencyRow>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RevenueReport {
    pub booking_value_histogram: Option<Vec<HistogramBin>>,
    pub daily_revenue: Option<Vec<DailyPoint<f64>>>,
    pub payment_methods: Option<Vec<FrequencyRow>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PeopleReport {
    pub top_customers: Option<Vec<FrequencyRow>>,
    pub top_drivers: Option<Vec<FrequencyRow>>,
    pub ride_distance: Option<Spread>,
    pub value_per_km_by_vehicle: Option<Vec<GroupMedian>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "tab", rename_all = "snake_case")]
pub enum TabReport {
    Overview(OverviewReport),
    Rides(RidesReport),
    Cancellations(CancellationsReport),
    Revenue(RevenueReport),
    People(PeopleReport),
}

pub fn build_report(tab: Tab, cleaned: &CleanedTable, config: &PipelineConfig) -> TabReport {
    match tab {
        Tab::Overview => TabReport::Overview(build_overview(cleaned, config)),
        Tab::Rides => TabReport::Rides(build_rides(cleaned, config)),
        Tab::Cancellations => TabReport::Cancellations(build_cancellations(cleaned, config)),
        Tab::Revenue => TabReport::Revenue(build_revenue(cleaned, config)),
        Tab::People => TabReport::People(build_people(cleaned, config)),
    }
}

fn build_overview(cleaned: &CleanedTable, config: &PipelineConfig) -> OverviewReport {
    let frame = &cleaned.frame;
    OverviewReport {
        rows: frame.row_count(),
        columns: frame.column_count(),
        unique_customers: stats::distinct_count(frame, CUSTOMER_ID),
        unique_bookings: stats::distinct_count(frame, BOOKING_ID),
        total_revenue: stats::column_sum(frame, BOOKING_VALUE),
        average_booking_value: stats::column_mean(frame, BOOKING_VALUE),
        date_range: stats::date_range(frame).map(|(start, end)| DateRange { start, end }),
        preview_columns: frame.column_names(),
        preview: frame.head(config.preview_rows),
        missing: stats::missing_counts(cleaned, config.missing_top),
        imputations: cleaned.imputations.clone(),
    }
}

fn build_rides(cleaned: &CleanedTable, config: &PipelineConfig) -> RidesReport {
    let frame = &cleaned.frame;
    let hourly = stats::hourly_counts(frame);
    let to_hour_counts = |pairs: Vec<(usize, usize)>| {
        pairs
            .into_iter()
            .map(|(hour, bookings)| HourCount { hour, bookings })
            .collect::<Vec<_>>()
    };
    RidesReport {
        status_distribution: frequency::value_counts(frame, BOOKING_STATUS, config.top_categories),
        daily_rides: stats::daily_counts(frame).map(|days| {
            days.into_iter()
                .map(|(date, value)| DailyPoint { date, value })
                .collect()
        }),
        hourly: hourly.map(|counts| to_hour_counts(counts.into_iter().enumerate().collect())),
        hour_source: cleaned.hour_source,
        peak_hours: hourly
            .map(|counts| to_hour_counts(stats::peak_hours(&counts, PEAK_HOUR_COUNT)))
            .unwrap_or_default(),
        weekday_distribution: frequency::value_counts(frame, DAY_OF_WEEK, 7),
        vehicle_types: frequency::value_counts(frame, VEHICLE_TYPE, config.top_categories),
        top_routes: frequency::value_counts(frame, ROUTE, config.top_entities),
    }
}

fn build_cancellations(cleaned: &CleanedTable, config: &PipelineConfig) -> CancellationsReport {
    let frame = &cleaned.frame;
    CancellationsReport {
        overall_rate: stats::cancellation_rate(frame),
        customer_rate: stats::actor_cancellation_rate(frame, CANCELLED_BY_CUSTOMER, config),
        driver_rate: stats::actor_cancellation_rate(frame, CANCELLED_BY_DRIVER, config),
        customer_reasons: frequency::value_counts(frame, CUSTOMER_CANCEL_REASON, config.top_categories),
        driver_reasons: frequency::value_counts(frame, DRIVER_CANCEL_REASON, config.top_categories),
    }
}

fn build_revenue(cleaned: &CleanedTable, config: &PipelineConfig) -> RevenueReport {
    let frame = &cleaned.frame;
    RevenueReport {
        booking_value_histogram: frame
            .column(BOOKING_VALUE)
            .map(|data| stats::histogram(&data.present_numbers(), HISTOGRAM_BINS)),
        daily_revenue: stats::daily_sums(frame, BOOKING_VALUE).map(|days| {
            days.into_iter()
                .map(|(date, value)| DailyPoint { date, value })
                .collect()
        }),
        payment_methods: frequency::value_counts(frame, PAYMENT_METHOD, config.top_categories),
    }
}

fn build_people(cleaned: &CleanedTable, config: &PipelineConfig) -> PeopleReport {
    let frame = &cleaned.frame;
    PeopleReport {
        top_customers: frequency::value_counts(frame, CUSTOMER_ID, config.top_entities),
        top_drivers: frequency::value_counts(frame, DRIVER_ID, config.top_entities),
        ride_distance: stats::spread(frame, RIDE_DISTANCE),
        value_per_km_by_vehicle: stats::median_by_group(frame, VEHICLE_TYPE, VALUE_PER_KM).map(
            |groups| {
                groups
                    .into_iter()
                    .map(|(group, median)| GroupMedian { group, median })
                    .collect()
            },
        ),
    }
}

pub fn render_text(report: &TabReport, config: &PipelineConfig) -> String {
    let mut out = String::new();
    match report {
        TabReport::Overview(r) => render_overview(&mut out, r, config),
        TabReport::Rides(r) => render_rides(&mut out, r),
        TabReport::Cancellations(r) => render_cancellations(&mut out, r),
        TabReport::Revenue(r) => render_revenue(&mut out, r, config),
        TabReport::People(r) => render_people(&mut out, r),
    }
    out
}

pub fn render_json(reports: &[TabReport]) -> Result<String> {
    Ok(match reports {
        [single] => serde_json::to_string_pretty(single)?,
        many => serde_json::to_string_pretty(many)?,
    })
}

impl TabReport {
    pub fn tab(&self) -> Tab {
        match self {
            TabReport::Overview(_) => Tab::Overview,
            TabReport::Rides(_) => Tab::Rides,
            TabReport::Cancellations(_) => Tab::Cancellations,
            TabReport::Revenue(_) => Tab::Revenue,
            TabReport::People(_) => Tab::People,
        }
    }
}

fn heading(out: &mut String, tab: Tab) {
    let _ = writeln!(out, "== {} ==", tab.title());
}

fn subheading(out: &mut String, text: &str) {
    let _ = writeln!(out, "\n-- {text} --");
}

fn metric(out: &mut String, label: &str, value: Option<String>) {
    let _ = writeln!(out, "{label}: {}", value.unwrap_or_else(|| "N/A".to_string()));
}

fn money(config: &PipelineConfig, value: String) -> String {
    format!("{}{value}", config.currency_symbol)
}

fn frequency_chart(out: &mut String, title: &str, rows: &[FrequencyRow]) {
    let items = rows
        .iter()
        .map(|row| (row.value.clone(), row.count as f64))
        .collect::<Vec<_>>();
    out.push_str(&chart::bar_chart(title, &items, BAR_WIDTH));
}

fn render_overview(out: &mut String, r: &OverviewReport, config: &PipelineConfig) {
    heading(out, Tab::Overview);
    metric(out, "Rows", Some(format_thousands(r.rows as f64)));
    metric(out, "Columns", Some(r.columns.to_string()));
    metric(out, "Unique Customers", r.unique_customers.map(|n| format_thousands(n as f64)));
    metric(out, "Unique Bookings", r.unique_bookings.map(|n| format_thousands(n as f64)));
    metric(out, "Total Revenue", r.total_revenue.map(|v| money(config, format_thousands(v))));
    metric(
        out,
        "Avg Booking Value",
        r.average_booking_value.map(|v| money(config, format_fixed(v))),
    );
    if let Some(range) = &r.date_range {
        let _ = writeln!(out, "Date range: {} → {}", range.start, range.end);
    }

    subheading(out, "Sample preview");
    let headers = r.preview_columns.iter().map(String::as_str).collect::<Vec<_>>();
    out.push_str(&table::render_table(&headers, &r.preview));

    subheading(out, "Missing values (top columns)");
    let rows = r
        .missing
        .iter()
        .map(|m| vec![m.column.clone(), m.missing.to_string(), m.imputed.to_string()])
        .collect::<Vec<_>>();
    out.push_str(&table::render_table(&["column", "missing_count", "imputed"], &rows));
}

fn render_rides(out: &mut String, r: &RidesReport) {
    heading(out, Tab::Rides);
    match &r.status_distribution {
        Some(rows) => {
            subheading(out, "Booking Status Distribution");
            frequency_chart(out, "Booking Status", rows);
        }
        None => {
            let _ = writeln!(out, "No Booking Status column found.");
        }
    }
    match &r.daily_rides {
        Some(days) => {
            subheading(out, "Daily Rides");
            let labels = days.iter().map(|p| p.date.to_string()).collect::<Vec<_>>();
            let values = days.iter().map(|p| p.value as f64).collect::<Vec<_>>();
            out.push_str(&chart::line_chart("Rides per day", &labels, &values));
        }
        None => {
            let _ = writeln!(out, "No Date column found — cannot show time trends.");
        }
    }
    if let Some(hourly) = &r.hourly {
        subheading(out, "Hourly demand (0–23)");
        let values = hourly.iter().map(|h| h.bookings as f64).collect::<Vec<_>>();
        let _ = writeln!(out, "Bookings by Hour");
        let _ = writeln!(out, "  {}", chart::sparkline(&values));
        let _ = writeln!(out, "  0{:>23}", "23");
        if r.hour_source == Some(HourSource::LeadingDigits) {
            let _ = writeln!(out, "  (hours read from leading digits of Time)");
        }
        let peaks = r
            .peak_hours
            .iter()
            .map(|p| format!("{:02}:00 ({})", p.hour, p.bookings))
            .collect::<Vec<_>>();
        let _ = writeln!(out, "Peak hours: {}", peaks.join(", "));
    }
    if let Some(rows) = &r.weekday_distribution {
        subheading(out, "Rides by day of week");
        frequency_chart(out, "Day of week", rows);
    }
    if let Some(rows) = &r.vehicle_types {
        subheading(out, "Vehicle Type mix");
        frequency_chart(out, "Vehicle Type", rows);
    }
    if let Some(rows) = &r.top_routes {
        subheading(out, "Top routes");
        out.push_str(&table::render_table(
            &["Route", "count", "percent"],
            &frequency::render_rows(rows),
        ));
    }
}

fn render_cancellations(out: &mut String, r: &CancellationsReport) {
    heading(out, Tab::Cancellations);
    match r.overall_rate {
        Some(rate) => {
            let _ = writeln!(out, "Overall cancellation rate: {rate:.2}%");
        }
        None => {
            let _ = writeln!(out, "No Booking Status -> cannot compute cancellation rate.");
        }
    }
    if let Some(rate) = r.customer_rate {
        let _ = writeln!(out, "Customer-initiated cancellation (% of rows): {rate:.2}%");
    }
    if let Some(rate) = r.driver_rate {
        let _ = writeln!(out, "Driver-initiated cancellation (% of rows): {rate:.2}%");
    }
    if let Some(rows) = &r.customer_reasons {
        subheading(out, "Top customer cancellation reasons");
        frequency_chart(out, "Customer cancellation reasons", rows);
    }
    if let Some(rows) = &r.driver_reasons {
        subheading(out, "Top driver cancellation reasons");
        frequency_chart(out, "Driver cancellation reasons", rows);
    }
}

fn render_revenue(out: &mut String, r: &RevenueReport, config: &PipelineConfig) {
    heading(out, Tab::Revenue);
    match &r.booking_value_histogram {
        Some(bins) => {
            subheading(out, "Booking value distribution");
            let items = bins
                .iter()
                .map(|bin| {
                    (
                        format!("{}–{}", format_fixed(bin.lower), format_fixed(bin.upper)),
                        bin.count as f64,
                    )
                })
                .collect::<Vec<_>>();
            out.push_str(&chart::bar_chart("Booking Value distribution", &items, BAR_WIDTH));
            if let Some(days) = &r.daily_revenue {
                subheading(out, "Revenue trend (daily)");
                let labels = days.iter().map(|p| p.date.to_string()).collect::<Vec<_>>();
                let values = days.iter().map(|p| p.value).collect::<Vec<_>>();
                let total: f64 = values.iter().sum();
                out.push_str(&chart::line_chart("Daily Revenue", &labels, &values));
                let _ = writeln!(out, "  total {}", money(config, format_thousands(total)));
            }
        }
        None => {
            let _ = writeln!(out, "No Booking Value column present.");
        }
    }
    if let Some(rows) = &r.payment_methods {
        subheading(out, "Payment Method mix");
        frequency_chart(out, "Payment Method", rows);
    }
}

fn render_people(out: &mut String, r: &PeopleReport) {
    heading(out, Tab::People);
    let entity_table = |out: &mut String, title: &str, column: &str, rows: &[FrequencyRow]| {
        subheading(out, title);
        let rows = rows
            .iter()
            .map(|row| vec![row.value.clone(), row.count.to_string()])
            .collect::<Vec<_>>();
        out.push_str(&table::render_table(&[column, "ride_count"], &rows));
    };
    if let Some(rows) = &r.top_customers {
        entity_table(out, "Top Customers by number of rides", CUSTOMER_ID, rows);
    }
    if let Some(rows) = &r.top_drivers {
        entity_table(out, "Top Drivers by number of rides", DRIVER_ID, rows);
    }
    if let Some(spread) = &r.ride_distance {
        subheading(out, "Avg ride distance");
        let _ = writeln!(
            out,
            "{:.2} km (mean) — {:.2} km (median)",
            spread.mean, spread.median
        );
    }
    if let Some(groups) = &r.value_per_km_by_vehicle {
        subheading(out, "Value per km (median by vehicle)");
        let rows = groups
            .iter()
            .map(|g| vec![g.group.clone(), format_number(g.median)])
            .collect::<Vec<_>>();
        out.push_str(&table::render_table(&[VEHICLE_TYPE, "median_value_per_km"], &rows));
    }
}

/// Builds and renders `tabs` (all tabs when empty) for one cleaned table.
pub fn render_tabs(
    tabs: &[Tab],
    cleaned: &CleanedTable,
    config: &PipelineConfig,
    format: OutputFormat,
) -> Result<String> {
    let tabs = if tabs.is_empty() { &Tab::ALL[..] } else { tabs };
    let reports = tabs
        .iter()
        .map(|tab| build_report(*tab, cleaned, config))
        .collect::<Vec<_>>();
    match format {
        OutputFormat::Json => Ok(render_json(&reports)? + "\n"),
        OutputFormat::Text => Ok(reports
            .iter()
            .map(|report| render_text(report, config))
            .collect::<Vec<_>>()
            .join("\n")),
    }
}

pub fn execute(args: &ReportArgs) -> Result<()> {
    let delimiter = io_utils::resolve_input_delimiter(&args.input, args.delimiter);
    let config = PipelineConfig::resolve(args.config.as_deref())?;
    let cleaned = pipeline::load_and_clean(&args.input, delimiter, &config)?;
    print!("{}", render_tabs(&args.tabs, &cleaned, &config, args.format)?);
    info!(
        "Rendered {} tab(s) for {:?}",
        if args.tabs.is_empty() { Tab::ALL.len() } else { args.tabs.len() },
        args.input
    );
    Ok(())
}
