use crate::error::{Result, SalesInsightsError};
use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime};

/// Sales figures are bucketed to the nearest multiple of this.
pub const ROUNDING_BUCKET: f64 = 5.0;

const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%Y.%m.%d",
    "%m/%d/%Y",
    "%m-%d-%Y",
    "%d %b %Y",
    "%d %B %Y",
    "%b %d %Y",
    "%B %d %Y",
    "%b %d, %Y",
    "%B %d, %Y",
    "%Y%m%d",
];

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
];

/// Calendar month key in `YYYY-MM` form. Lexicographic order of these keys is
/// chronological order.
pub fn month_key(date: NaiveDate) -> String {
    format!("{:04}-{:02}", date.year(), date.month())
}

/// Parses a `YYYY-MM` key back into the first day of that month.
pub fn parse_month_key(key: &str) -> Result<NaiveDate> {
    let start_str = format!("{}-01", key.trim());
    NaiveDate::parse_from_str(&start_str, "%Y-%m-%d").map_err(|_| {
        SalesInsightsError::DateError(format!("Invalid month key: {}. Expected YYYY-MM", key))
    })
}

/// Rounds half-way cases towards positive infinity, so `-2.5` becomes `-2`
/// and `2.5` becomes `3`. Sheet exports were produced with this rule.
pub fn round_half_up(value: f64) -> f64 {
    let floor = value.floor();
    if value - floor >= 0.5 {
        floor + 1.0
    } else {
        floor
    }
}

/// Nearest multiple of [`ROUNDING_BUCKET`].
pub fn round_to_bucket(value: f64) -> f64 {
    round_half_up(value / ROUNDING_BUCKET) * ROUNDING_BUCKET
}

pub fn is_bucketed(value: f64) -> bool {
    value % ROUNDING_BUCKET == 0.0
}

/// Growth of `current` over `previous` in percent. Zero when there is no base.
pub fn percent_change(current: f64, previous: f64) -> f64 {
    if previous == 0.0 {
        0.0
    } else {
        (current - previous) / previous * 100.0
    }
}

/// Lenient date parsing for sheet cells. Accepts ISO dates, slash and dot
/// separated dates, compact `YYYYMMDD`, US month-first dates, spelled-out month names, timestamps
/// and bare `YYYY-MM` month keys.
pub fn parse_date_cell(raw: &str) -> Option<NaiveDate> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(trimmed, format) {
            return Some(date);
        }
    }

    for format in DATETIME_FORMATS {
        if let Ok(datetime) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Some(datetime.date());
        }
    }

    if let Ok(datetime) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(datetime.date_naive());
    }

    parse_month_key(trimmed).ok()
}
