//! Calendar date <-> day-number conversion.
//!
//! A day-number is `floor(epoch_millis / MS_PER_DAY)` with no timezone or
//! daylight-saving correction, so every day starts at UTC midnight.

use crate::{error::Error, Day, Result};
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};

pub const MS_PER_DAY: i64 = 86_400_000;

pub fn day_of_instant(instant: DateTime<Utc>) -> Day {
    instant.timestamp_millis().div_euclid(MS_PER_DAY)
}

pub fn day_of(date: NaiveDate) -> Day {
    day_of_instant(date.and_time(NaiveTime::default()).and_utc())
}

pub fn today() -> Day {
    day_of_instant(Utc::now())
}

/// Parses `YYYY-MM-DD`, an RFC 3339 timestamp, or `today`.
pub fn parse_day(text: &str) -> Result<Day> {
    let text = text.trim();
    if text.eq_ignore_ascii_case("today") {
        return Ok(today());
    }
    if let Ok(date) = NaiveDate::parse_from_str(text, "%Y-%m-%d") {
        return Ok(day_of(date));
    }
    if let Ok(instant) = DateTime::parse_from_rfc3339(text) {
        return Ok(day_of_instant(instant.with_timezone(&Utc)));
    }
    Err(Error::InvalidDate(text.to_string()))
}

/// UTC midnight of `day`.
pub fn instant_of(day: Day) -> Result<DateTime<Utc>> {
    day.checked_mul(MS_PER_DAY)
        .and_then(DateTime::from_timestamp_millis)
        .ok_or(Error::DayOutOfRange(day))
}

pub fn date_of(day: Day) -> Result<NaiveDate> {
    Ok(instant_of(day)?.date_naive())
}
