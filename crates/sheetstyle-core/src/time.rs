//! Serial date conversion
//!
//! Spreadsheet dates are stored as a day count from 1899-12-30, with the
//! fractional part holding the time of day. Dates before 1900-03-01 are
//! shifted by one day to reproduce the fictitious 1900-02-29 that the
//! format inherited from early spreadsheet programs.

use crate::error::{Error, Result};
use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime, Timelike};

const SECONDS_PER_DAY: f64 = 86_400.0;

/// First serial that no longer fits in a four digit year
const MAX_SERIAL: f64 = 2_958_466.0;

fn midnight(year: i32, month: u32, day: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(year, month, day)
        .unwrap_or_default()
        .and_time(NaiveTime::default())
}

/// Day zero of the serial scale
pub fn epoch() -> NaiveDateTime {
    midnight(1899, 12, 30)
}

/// Dates before this one carry the one day correction
pub fn correction_date() -> NaiveDateTime {
    midnight(1900, 3, 1)
}

/// Convert a serial number to a date and time
///
/// Hours and minutes are truncated, seconds are rounded. Serials in the
/// fictitious 1900-02-29 collapse onto 1900-03-01.
pub fn to_date_time(serial: f64) -> Result<NaiveDateTime> {
    if !serial.is_finite() || serial < 0.0 || serial >= MAX_SERIAL {
        return Err(Error::InvalidSerialDate(serial));
    }

    let days = serial.floor();
    let mut time_part = (serial - days) * 24.0;
    let hours = time_part.floor();
    time_part = (time_part - hours) * 60.0;
    let minutes = time_part.floor();
    let seconds = ((time_part - minutes) * 60.0).round();

    let value = epoch()
        + Duration::days(days as i64)
        + Duration::hours(hours as i64)
        + Duration::minutes(minutes as i64)
        + Duration::seconds(seconds as i64);

    if value < correction_date() {
        Ok(value + Duration::days(1))
    } else {
        Ok(value)
    }
}

/// Convert a date and time to its serial number, to the whole second
pub fn from_date_time(value: NaiveDateTime) -> f64 {
    let value = if value < correction_date() {
        value - Duration::days(1)
    } else {
        value
    };
    (value - epoch()).num_seconds() as f64 / SECONDS_PER_DAY
}

/// Convert a date to its serial number
pub fn from_date(value: NaiveDate) -> f64 {
    from_date_time(value.and_time(NaiveTime::default()))
}

/// Convert a time of day to its fraction of a day
pub fn from_time(value: NaiveTime) -> f64 {
    value.num_seconds_from_midnight() as f64 / SECONDS_PER_DAY
}
