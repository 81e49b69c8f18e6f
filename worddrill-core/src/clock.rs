use chrono::{NaiveDate, Utc};

/// Calendar-day key for all due-date comparisons. Scheduling functions
/// take the day as a parameter; this is the only wall-clock read.
pub fn today() -> NaiveDate {
    Utc::now().date_naive()
}

pub fn days_between(from: NaiveDate, to: NaiveDate) -> i64 {
    to.signed_duration_since(from).num_days()
}
