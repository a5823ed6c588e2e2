use chrono::{NaiveDateTime, Timelike};

pub const DATE_FORMAT: &str = "%d-%m-%Y %H:%M:%S";
pub const LEGACY_DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
pub const DATE_INPUT_HINT: &str = "DD-MM-YYYY HH:MM:SS";

/// Parses a work-order timestamp, trying `DD-MM-YYYY HH:MM:SS` first and the
/// legacy `YYYY-MM-DD HH:MM:SS` second. Leap seconds (`:60`) are rejected.
pub fn parse_work_date(value: &str) -> Option<NaiveDateTime> {
    let text = value.trim();
    [DATE_FORMAT, LEGACY_DATE_FORMAT]
        .into_iter()
        .find_map(|format| NaiveDateTime::parse_from_str(text, format).ok())
        .filter(|parsed| parsed.nanosecond() < 1_000_000_000)
}
