//! Recognized column names and the static tables that drive the cleaning
//! pipeline.
//!
//! Every table here is the built-in default; [`crate::config::PipelineConfig`]
//! can extend or replace them from a YAML file.

pub const DATE: &str = "Date";
pub const TIME: &str = "Time";
pub const BOOKING_ID: &str = "Booking ID";
pub const BOOKING_STATUS: &str = "Booking Status";
pub const BOOKING_VALUE: &str = "Booking Value";
pub const RIDE_DISTANCE: &str = "Ride Distance";
pub const DRIVER_RATINGS: &str = "Driver Ratings";
pub const CUSTOMER_RATING: &str = "Customer Rating";
pub const CANCELLED_BY_CUSTOMER: &str = "Cancelled Rides by Customer";
pub const CANCELLED_BY_DRIVER: &str = "Cancelled Rides by Driver";
pub const INCOMPLETE_RIDES: &str = "Incomplete Rides";
pub const PICKUP_LOCATION: &str = "Pickup Location";
pub const DROP_LOCATION: &str = "Drop Location";
pub const PAYMENT_METHOD: &str = "Payment Method";
pub const CUSTOMER_ID: &str = "Customer ID";
pub const DRIVER_ID: &str = "Driver ID";
pub const VEHICLE_TYPE: &str = "Vehicle Type";
pub const CUSTOMER_CANCEL_REASON: &str = "Reason for cancelling by Customer";
pub const DRIVER_CANCEL_REASON: &str = "Driver Cancellation Reason";
pub const VALUE_PER_KM: &str = "Value_per_km";

// Derived by the pipeline.
pub const HOUR: &str = "Hour";
pub const DAY: &str = "Day";
pub const DAY_OF_WEEK: &str = "DayOfWeek";
pub const MONTH: &str = "Month";
pub const ROUTE: &str = "Route";
pub const IS_COMPLETED: &str = "Is_Completed";
pub const IS_CANCELLED: &str = "Is_Cancelled";
pub const IS_INCOMPLETE: &str = "Is_Incomplete";

pub const STATUS_COMPLETED: &str = "Completed";
pub const STATUS_CANCELLED: &str = "Cancelled";
pub const STATUS_INCOMPLETE: &str = "Incomplete";
/// Alternate spelling folded into [`STATUS_CANCELLED`] after title-casing.
pub const STATUS_CANCELED_VARIANT: &str = "Canceled";

pub const UNKNOWN_ENDPOINT: &str = "Unknown";
pub const ROUTE_SEPARATOR: &str = " → ";

/// Lower-case header → canonical header. Applied only when the canonical
/// header is absent.
pub static COLUMN_ALIASES: &[(&str, &str)] = &[
    ("date", DATE),
    ("time", TIME),
    ("booking value", BOOKING_VALUE),
];

/// Columns coerced to numbers; cells that fail to parse become missing.
pub static NUMERIC_COLUMNS: &[&str] = &[
    BOOKING_VALUE,
    RIDE_DISTANCE,
    DRIVER_RATINGS,
    CUSTOMER_RATING,
    CANCELLED_BY_CUSTOMER,
    CANCELLED_BY_DRIVER,
    INCOMPLETE_RIDES,
];

/// Numeric columns whose missing cells are filled with the column median.
pub static IMPUTED_COLUMNS: &[&str] = &[DRIVER_RATINGS, CUSTOMER_RATING, BOOKING_VALUE, RIDE_DISTANCE];

/// Lower-cased, trimmed values of a "cancelled by" column that do NOT mark a
/// cancellation. Any other present value does.
pub static NOT_CANCELLED_TOKENS: &[&str] = &["0", "0.0", "nan", "none", "", "false"];

/// Raw cell values read as missing at ingestion.
pub static NA_TOKENS: &[&str] = &[
    "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

pub fn is_na_token(value: &str) -> bool {
    NA_TOKENS.contains(&value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aliases_target_recognized_columns() {
        for (alias, canonical) in COLUMN_ALIASES {
            assert_eq!(alias.to_lowercase(), canonical.to_lowercase());
        }
    }

    #[test]
    fn imputed_columns_are_numeric() {
        for column in IMPUTED_COLUMNS {
            assert!(NUMERIC_COLUMNS.contains(column), "{column} is not coerced");
        }
    }

    #[test]
    fn na_tokens_match_exactly() {
        assert!(is_na_token("NA"));
        assert!(is_na_token(""));
        assert!(!is_na_token(" NA"));
        assert!(!is_na_token("na"));
    }
}
