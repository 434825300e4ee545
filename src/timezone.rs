use time::{Date, OffsetDateTime, UtcOffset, format_description::well_known::Rfc3339};
use time_tz::{Offset, TimeZone};

use crate::Error;

pub fn get_local_offset(canonical_timezone: &str) -> Option<UtcOffset> {
    time_tz::timezones::get_by_name(canonical_timezone)
        .map(|tz| tz.get_offset_utc(&OffsetDateTime::now_utc()).to_utc())
}

/// Get the current date in `canonical_timezone`, e.g. "Europe/Berlin".
///
/// # Errors
/// Returns [Error::InvalidTimezoneError] if the timezone is not known.
pub fn local_today(canonical_timezone: &str) -> Result<Date, Error> {
    let offset = get_local_offset(canonical_timezone)
        .ok_or_else(|| Error::InvalidTimezoneError(canonical_timezone.to_owned()))?;

    Ok(OffsetDateTime::now_utc().to_offset(offset).date())
}

/// The current UTC time as an RFC 3339 timestamp, e.g. "2025-06-01T09:30:00.123Z".
pub(crate) fn utc_timestamp() -> String {
    let now = OffsetDateTime::now_utc();

    now.format(&Rfc3339).unwrap_or_else(|_| now.to_string())
}
