//! Date ranges for the time series queries.

use std::ops::RangeInclusive;

use time::{Date, Month};

/// The inclusive range from `months` calendar months before `today` up to `today`.
///
/// The start keeps the day of month of `today`, clamped to the length of the
/// start month, e.g. three months back from 31 May is 28 February. Ranges that
/// would start before the earliest representable date start at [Date::MIN].
pub fn months_back(today: Date, months: u32) -> RangeInclusive<Date> {
    let month_index = i64::from(today.year()) * 12 + i64::from(u8::from(today.month())) - 1
        - i64::from(months);
    let year = i32::try_from(month_index.div_euclid(12)).unwrap_or(i32::MIN);
    let month = u8::try_from(month_index.rem_euclid(12) + 1)
        .ok()
        .and_then(|month| Month::try_from(month).ok())
        .unwrap_or(Month::January);

    let mut day = today.day();
    let start = loop {
        match Date::from_calendar_date(year, month, day) {
            Ok(start) => break start,
            Err(_) if day > 28 => day -= 1,
            Err(_) => break Date::MIN,
        }
    };

    start..=today
}

/// The `YYYY-MM` key a date is grouped under. Keys sort chronologically.
pub fn month_key(date: Date) -> String {
    format!("{:04}-{:02}", date.year(), u8::from(date.month()))
}
