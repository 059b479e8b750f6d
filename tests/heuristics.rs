use proptest::prelude::*;

use ride_insights::{
    PipelineConfig,
    columns::{HOUR, NOT_CANCELLED_TOKENS},
    data::title_case,
    io_utils,
    pipeline::{self, normalize_status_value},
    stats::{self, is_cancellation_marker},
};

fn scramble_case(token: &str, flips: &[bool]) -> String {
    token
        .chars()
        .zip(flips.iter().cycle())
        .map(|(ch, flip)| if *flip { ch.to_ascii_uppercase() } else { ch })
        .collect()
}

fn not_cancelled_token() -> impl Strategy<Value = String> {
    (
        proptest::sample::select(NOT_CANCELLED_TOKENS.to_vec()),
        proptest::collection::vec(any::<bool>(), 1..6),
        " {0,3}",
        "[ \t]{0,3}",
    )
        .prop_map(|(token, flips, left, right)| {
            format!("{left}{}{right}", scramble_case(token, &flips))
        })
}

proptest! {
    #[test]
    fn not_cancelled_tokens_never_mark_a_cancellation(value in not_cancelled_token()) {
        prop_assert!(!is_cancellation_marker(Some(&value), &PipelineConfig::default()));
    }

    #[test]
    fn other_present_values_mark_a_cancellation(value in "[A-Za-z1-9][A-Za-z0-9 ]{0,12}") {
        let normalized = value.trim().to_lowercase();
        prop_assume!(!NOT_CANCELLED_TOKENS.contains(&normalized.as_str()));
        prop_assert!(is_cancellation_marker(Some(&value), &PipelineConfig::default()));
    }

    #[test]
    fn hourly_counts_cover_the_whole_day(
        hours in proptest::collection::vec(proptest::option::of(0u32..40), 1..60)
    ) {
        let mut csv = String::from("Time\n");
        for hour in &hours {
            match hour {
                Some(hour) => csv.push_str(&format!("{hour:02}:30\n")),
                None => csv.push_str("NA\n"),
            }
        }
        let raw = io_utils::ingest_bytes(csv.as_bytes(), b',').expect("ingest");
        let cleaned = pipeline::clean(raw, &PipelineConfig::default());
        prop_assert!(cleaned.frame.has_column(HOUR));

        let counts = stats::hourly_counts(&cleaned.frame).expect("hour column");
        let valid = hours.iter().flatten().filter(|hour| **hour < 24).count();
        prop_assert_eq!(counts.len(), 24);
        prop_assert_eq!(counts.iter().sum::<usize>(), valid);
        for hour in hours.iter().flatten().filter(|hour| **hour < 24) {
            prop_assert!(counts[*hour as usize] > 0);
        }
    }

    #[test]
    fn title_case_is_idempotent(value in "[A-Za-z0-9 ,.'_-]{0,30}") {
        let once = title_case(&value);
        prop_assert_eq!(title_case(&once), once);
    }

    #[test]
    fn status_normalization_is_idempotent(value in "[A-Za-z ]{0,20}") {
        let once = normalize_status_value(&value);
        prop_assert_eq!(normalize_status_value(&once), once);
    }
}
