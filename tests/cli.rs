mod common;

use std::fs;

use assert_cmd::Command;
use predicates::{prelude::PredicateBooleanExt, str::contains};

use common::TestWorkspace;

fn ride_insights() -> Command {
    Command::cargo_bin("ride-insights").expect("binary exists")
}

#[test]
fn clean_writes_augmented_csv() {
    let workspace = TestWorkspace::new();
    let input = workspace.rides();
    let output = workspace.path().join("cleaned.csv");

    ride_insights()
        .args(["clean", "-i", input.to_str().unwrap(), "-o", output.to_str().unwrap()])
        .assert()
        .success();

    let mut reader = csv::Reader::from_path(&output).expect("open cleaned csv");
    let headers = reader.headers().expect("headers").clone();
    let names = headers.iter().collect::<Vec<_>>();
    assert_eq!(names[0], "Date");
    for derived in ["Hour", "Day", "DayOfWeek", "Month", "Route", "Is_Completed", "Is_Cancelled", "Is_Incomplete"] {
        assert!(names.contains(&derived), "missing {derived}");
    }
    let status_idx = names.iter().position(|n| *n == "Booking Status").unwrap();
    let value_idx = names.iter().position(|n| *n == "Booking Value").unwrap();
    let cancelled_idx = names.iter().position(|n| *n == "Is_Cancelled").unwrap();
    let rows = reader.records().collect::<Result<Vec<_>, _>>().expect("records");
    assert_eq!(rows.len(), 6);
    assert_eq!(&rows[2][status_idx], "Cancelled");
    assert_eq!(&rows[2][value_idx], "250");
    assert_eq!(&rows[2][cancelled_idx], "True");
    assert_eq!(&rows[0][cancelled_idx], "False");
}

#[test]
fn clean_writes_to_stdout_with_output_delimiter() {
    let workspace = TestWorkspace::new();
    let input = workspace.write("mini.csv", "Pickup Location,Drop Location\nA,\n");

    ride_insights()
        .args(["clean", "-i", input.to_str().unwrap(), "--output-delimiter", "tab"])
        .assert()
        .success()
        .stdout(contains("Pickup Location\tDrop Location\tRoute"))
        .stdout(contains("A\t\tA → Unknown"));
}

#[test]
fn report_renders_every_tab_by_default() {
    let workspace = TestWorkspace::new();
    let input = workspace.rides();

    ride_insights()
        .args(["report", "-i", input.to_str().unwrap()])
        .assert()
        .success()
        .stdout(contains("== Overview =="))
        .stdout(contains("Rows: 6"))
        .stdout(contains("Unique Customers: 4"))
        .stdout(contains("Total Revenue: ₹1,500"))
        .stdout(contains("Avg Booking Value: ₹250.00"))
        .stdout(contains("Date range: 2024-03-04 → 2024-03-06"))
        .stdout(contains("== Rides Overview =="))
        .stdout(contains("Peak hours: 09:00 (2), 17:00 (2), 08:00 (1)"))
        .stdout(contains("== Cancellations Analysis =="))
        .stdout(contains("Overall cancellation rate: 33.33%"))
        .stdout(contains("Customer-initiated cancellation (% of rows): 16.67%"))
        .stdout(contains("Driver-initiated cancellation (% of rows): 16.67%"))
        .stdout(contains("== Revenue & Payment Insights =="))
        .stdout(contains("== Top Drivers & Customers (Activity) =="))
        .stdout(contains("12.50 km (mean) — 12.50 km (median)"));
}

#[test]
fn report_json_for_selected_tabs() {
    let workspace = TestWorkspace::new();
    let input = workspace.rides();

    let output = ride_insights()
        .args([
            "report",
            "-i",
            input.to_str().unwrap(),
            "--tab",
            "rides",
            "--tab",
            "people",
            "--format",
            "json",
        ])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let value: serde_json::Value = serde_json::from_slice(&output).expect("json output");
    let tabs = value.as_array().expect("array of tabs");
    assert_eq!(tabs.len(), 2);
    assert_eq!(tabs[0]["tab"], "rides");
    assert_eq!(tabs[0]["hourly"].as_array().map(Vec::len), Some(24));
    assert_eq!(tabs[0]["hourly"][9]["bookings"], 2);
    assert_eq!(tabs[1]["tab"], "people");
    assert_eq!(tabs[1]["top_customers"][0]["value"], "C1");
    assert_eq!(tabs[1]["top_customers"][0]["count"], 3);
    assert!(tabs[1]["value_per_km_by_vehicle"].is_null());
}

#[test]
fn report_on_bare_file_explains_missing_columns() {
    let workspace = TestWorkspace::new();
    let input = workspace.write("bare.csv", "Notes\nhello\n");

    ride_insights()
        .args(["report", "-i", input.to_str().unwrap()])
        .assert()
        .success()
        .stdout(contains("Unique Customers: N/A"))
        .stdout(contains("No Booking Status column found."))
        .stdout(contains("No Booking Value column present."))
        .stdout(contains("Hourly demand").not());
}

#[test]
fn latin1_upload_is_read_through_fallback() {
    let workspace = TestWorkspace::new();
    let input = workspace.write_bytes("latin1.csv", b"Pickup Location,Drop Location\nS\xE3o Paulo,Rio\n");

    ride_insights()
        .args(["clean", "-i", input.to_str().unwrap()])
        .assert()
        .success()
        .stdout(contains("São Paulo → Rio"));
}

#[test]
fn unreadable_upload_fails_without_output() {
    let workspace = TestWorkspace::new();
    let input = workspace.write("broken.csv", "a,b\n1,2,3\n");

    ride_insights()
        .args(["report", "-i", input.to_str().unwrap()])
        .assert()
        .failure()
        .stdout("")
        .stderr(contains("could not read uploaded file"));
}

#[test]
fn preview_stats_and_correlate_render_tables() {
    let workspace = TestWorkspace::new();
    let input = workspace.rides();

    ride_insights()
        .args(["preview", "-i", input.to_str().unwrap(), "--rows", "2"])
        .assert()
        .success()
        .stdout(contains("Booking Status"))
        .stdout(contains("B2"))
        .stdout(contains("B3").not());

    ride_insights()
        .args(["stats", "-i", input.to_str().unwrap()])
        .assert()
        .success()
        .stdout(contains("Booking Value"))
        .stdout(contains("std_dev"));

    ride_insights()
        .args(["correlate", "-i", input.to_str().unwrap(), "--format", "json"])
        .assert()
        .success()
        .stdout(contains("\"columns\""))
        .stdout(contains("Ride Distance"));
}

#[test]
fn preview_defaults_to_configured_row_count() {
    let workspace = TestWorkspace::new();
    let mut csv = String::from("Booking ID,Vehicle Type\n");
    for i in 1..=8 {
        csv.push_str(&format!("B{i},Auto\n"));
    }
    let input = workspace.write("eight.csv", &csv);

    ride_insights()
        .args(["preview", "-i", input.to_str().unwrap()])
        .assert()
        .success()
        .stdout(contains("B6"))
        .stdout(contains("B7").not());

    let config = workspace.write("preview.yml", "preview_rows: 2\n");
    ride_insights()
        .args(["preview", "-i", input.to_str().unwrap(), "-c", config.to_str().unwrap()])
        .assert()
        .success()
        .stdout(contains("B2"))
        .stdout(contains("B3").not());
}

#[test]
fn config_file_changes_currency_symbol() {
    let workspace = TestWorkspace::new();
    let input = workspace.rides();
    let config = workspace.write("dashboard.yml", "currency_symbol: \"$\"\n");

    ride_insights()
        .args([
            "report",
            "-i",
            input.to_str().unwrap(),
            "-t",
            "overview",
            "-c",
            config.to_str().unwrap(),
        ])
        .assert()
        .success()
        .stdout(contains("Total Revenue: $1,500"));
}

#[test]
fn dashboard_session_reads_commands_from_stdin() {
    let workspace = TestWorkspace::new();
    let input = workspace.rides();
    let export = workspace.path().join("export.csv");

    ride_insights()
        .args(["dashboard", "-i", input.to_str().unwrap()])
        .write_stdin(format!(
            "cancellations\nbogus\nexport {}\nquit\nrevenue\n",
            export.display()
        ))
        .assert()
        .success()
        .stdout(contains("Loaded 6 row(s)"))
        .stdout(contains("Overall cancellation rate: 33.33%"))
        .stdout(contains("error: Unknown command or tab 'bogus'"))
        .stdout(contains("Exported 6 row(s)"))
        .stdout(contains("Revenue & Payment Insights").not());

    let exported = fs::read_to_string(&export).expect("exported csv");
    assert!(exported.starts_with("Date,Time,Booking ID"));
}
